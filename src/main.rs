//! ttyline - raw-mode line input demo shell
//!
//! Puts the local terminal in raw mode and runs an interactive session on
//! it: keystrokes are edited by the line reader, submitted lines run through
//! the shell, and every command is logged with its parsed output.
//!
//! # Quick Start
//!
//! ```text
//! ttyline                     # Default prompt
//! ttyline --prompt "db> "     # Custom prompt
//! ttyline web-1 web-2 db-1    # Targets listed by `p`, searched by `/text`
//! ```

use std::env;
use std::io;
use std::path::PathBuf;

use crossterm::terminal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ttyline::config::Config as TtylineConfig;
use ttyline::{IoPeer, Session, ShellExecutor};

/// Command line options
#[derive(Default)]
struct Config {
    /// Config file overriding ~/.ttyline/config.toml
    config_path: Option<PathBuf>,
    /// Prompt text
    prompt: Option<String>,
    /// Mask echoed input
    sensitive: bool,
    /// Names listed by `p`
    targets: Vec<String>,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("ttyline {}", VERSION);
}

fn print_help() {
    eprintln!("ttyline {} - raw-mode line input demo shell", VERSION);
    eprintln!();
    eprintln!("Usage: ttyline [OPTIONS] [TARGET...]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --config <PATH>   Config file (default: ~/.ttyline/config.toml)");
    eprintln!("  -p, --prompt <TEXT>   Prompt text");
    eprintln!("  -s, --sensitive       Mask typed characters");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Keys:");
    eprintln!("  Backspace             Erase last character");
    eprintln!("  Ctrl+C                Discard the line");
    eprintln!("  Ctrl+D                Quit");
    eprintln!("  Enter                 Submit");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  p                     List targets");
    eprintln!("  /<text>               Search targets");
    eprintln!("  h                     Help");
    eprintln!("  q                     Quit");
    eprintln!();
    eprintln!("Log file: ~/.ttyline/ttyline.log (level via config or RUST_LOG)");
}

fn parse_args() -> Result<Config, String> {
    let args: Vec<String> = env::args().collect();
    let mut config = Config::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing config path".to_string());
                }
                config.config_path = Some(PathBuf::from(&args[i]));
            }
            "-p" | "--prompt" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing prompt text".to_string());
                }
                config.prompt = Some(args[i].clone());
            }
            "-s" | "--sensitive" => {
                config.sensitive = true;
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
            target => {
                config.targets.push(target.to_string());
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Log to ~/.ttyline/ttyline.log; RUST_LOG overrides the configured level
fn init_logging(level: &str) {
    let log_path = TtylineConfig::config_dir()
        .map(|dir| dir.join("ttyline.log"))
        .unwrap_or_else(|| PathBuf::from("ttyline.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

/// Restores cooked mode even if the session panics
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = match parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    // Command line args override the config file
    let mut config = match &cli.config_path {
        Some(path) => TtylineConfig::load_from(path)?,
        None => TtylineConfig::load(),
    };
    if let Some(prompt) = cli.prompt {
        config.prompt.text = prompt;
    }
    if cli.sensitive {
        config.input.sensitive = true;
    }

    init_logging(&config.log.level);
    info!("ttyline starting...");

    let reader = config.input_reader()?;
    let peer = IoPeer::new(io::stdin(), io::stdout());
    let mut session = Session::new(peer, reader, ShellExecutor).with_targets(cli.targets);

    let guard = match RawModeGuard::enable() {
        Ok(guard) => guard,
        Err(e) => {
            error!("failed to enable raw mode: {}", e);
            return Err(e.into());
        }
    };
    session.run();
    drop(guard);

    info!(commands = session.records().len(), "ttyline exiting");
    Ok(())
}
