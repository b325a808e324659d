//! Binary entrypoint for the quicknote app.
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use capability::CapabilityChecker;
use clap::{Parser, Subcommand};
use hotkey::{Action, ActionSource, HotkeyManager, NativeBackend};
use keybind::{Platform, Resolver};
use parking_lot::Mutex;
use tracing::{error, info, warn};
use winit::{error::EventLoopError, event_loop::EventLoop};

/// Hotkey action posting to the event loop.
mod action;
/// Event-loop application.
mod app;
/// RON configuration.
mod config;
mod host;

use crate::{
    action::{AppEvent, QuickNote},
    app::App,
    config::Config,
};

#[derive(Parser, Debug)]
#[command(name = "quicknote", about = "A quick-note window on a global hotkey", version)]
/// Command-line interface for the `quicknote` binary.
struct Cli {
    /// Optional subcommand.
    #[command(subcommand)]
    command: Option<Command>,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,

    /// Optional path to the config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load the configuration, resolve the hotkey, then exit.
    Check {
        /// Path to configuration file to check (defaults to ~/.quicknote/config.ron)
        path: Option<PathBuf>,

        /// Dump the resolved binding as JSON to stdout
        #[arg(long)]
        dump: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log.spec());

    if let Some(Command::Check { path, dump }) = &cli.command {
        let explicit = path.as_deref().or(cli.config.as_deref());
        return check(&config::resolve_config_path(explicit), *dump);
    }

    let path = config::resolve_config_path(cli.config.as_deref());
    let cfg = match config::load(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.pretty());
            return ExitCode::FAILURE;
        }
    };
    info!(path = %path.display(), hotkey = %cfg.hotkey, "quicknote_config_loaded");

    match run(&cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "quicknote_event_loop_failed");
            ExitCode::FAILURE
        }
    }
}

/// Validate the configuration at `path` and resolve its hotkey.
fn check(path: &Path, dump: bool) -> ExitCode {
    let cfg = match config::load(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.pretty());
            return ExitCode::FAILURE;
        }
    };
    let mut resolver = Resolver::new(Platform::current());
    if let Some(code) = cfg.alt_code {
        resolver = resolver.with_alt_code(code);
    }
    let resolved = match resolver.resolve(&cfg.hotkey) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Invalid hotkey {}: {e}", cfg.hotkey);
            return ExitCode::FAILURE;
        }
    };
    let status = capability::check_support();
    if let Some(reason) = status.blocker() {
        eprintln!(
            "Warning: global hotkeys unavailable on {}: {reason}",
            status.platform
        );
    }
    if dump {
        match serde_json::to_string_pretty(&resolved) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize binding: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("OK");
    }
    ExitCode::SUCCESS
}

/// Arm the hotkey and run the event loop until the user quits.
fn run(cfg: &Config) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
    let proxy = Mutex::new(event_loop.create_proxy());

    let hotkey = match CapabilityChecker::system().check() {
        Err(reason) => {
            warn!(%reason, "quicknote_hotkey_unsupported");
            None
        }
        Ok(()) => match NativeBackend::new() {
            Ok(backend) => {
                let manager = HotkeyManager::new(backend, cfg.manager_config());
                let factory = move || {
                    let sink = Mutex::new(proxy.lock().clone());
                    Arc::new(QuickNote::new(sink)) as Arc<dyn Action>
                };
                host::arm(
                    &manager,
                    cfg.hotkey.clone(),
                    ActionSource::Factory(Box::new(factory)),
                );
                Some(manager)
            }
            Err(e) => {
                warn!(error = %e, "quicknote_hotkey_backend_unavailable");
                None
            }
        },
    };

    let mut app = App::new(hotkey);
    event_loop.run_app(&mut app)
}
