use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use gesture_shell::actor::gestures::{self, GestureActor, replay};
use gesture_shell::common::config::{Config, config_file};
use gesture_shell::common::log;
use gesture_shell::sys::headless;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(version, about = "Touchpad gestures driving shell animations")]
struct Cli {
    /// Config file to use instead of ~/.config/gesture-shell.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Check the config and exit. Exits non-zero if there are issues.
    #[arg(long)]
    validate: bool,

    /// Replay a recorded event stream (JSON lines) against a headless shell.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::read(&path),
        None if config_file().exists() => Config::read(&config_file()),
        None => Ok(Config::default()),
    }
}

fn main() -> ExitCode {
    let opt: Cli = Parser::parse();

    let mut config = match load_config(opt.config.clone()) {
        Ok(config) => config,
        Err(err) => {
            log::init_logging("info");
            error!("{err:#}");
            return ExitCode::FAILURE;
        }
    };
    log::init_logging(if opt.verbose { "debug" } else { &config.settings.log_level });

    let (fixes, issues) = config.repair();
    if fixes > 0 {
        info!(fixes, "auto-fixed out-of-range config values");
    }
    if opt.validate {
        for issue in &issues {
            println!("{issue}");
        }
        return if issues.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE };
    }
    for issue in &issues {
        warn!("config: {issue}");
    }

    let Some(recording) = opt.replay else {
        for registration in config.registrations() {
            info!(
                feature = %registration.feature,
                fingers = ?registration.fingers,
                "gesture enabled"
            );
        }
        info!("no shell to attach to; pass --replay to run a recording");
        return ExitCode::SUCCESS;
    };

    match run_replay(&config, &recording) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_replay(config: &Config, recording: &std::path::Path) -> anyhow::Result<()> {
    let records = replay::read(recording)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("starting runtime")?;

    runtime.block_on(async {
        let (tx, rx) = gestures::channel();
        let (caps, _windows) = headless::capabilities(tx.clone());
        let actor = GestureActor::new(config, caps)?;
        info!(events = records.len(), "replaying {}", recording.display());
        tokio::join!(actor.run(rx), replay::feed(records, tx));
        Ok::<_, anyhow::Error>(())
    })
}
