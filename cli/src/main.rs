use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use narrator_cli::{CliContext, commands, logging, readline};
use narrator_core::{AppConfig, AppConfigExt, Player, parse_timecode};
use narrator_types::{OverlapPolicy, ResumePolicy};

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Cues { script } => commands::list_cues(&script).await,
        Commands::Config => {
            let config = load_config(cli.config.as_deref())?;
            let path = match cli.config {
                Some(path) => Some(path),
                None => AppConfig::config_path().ok(),
            };
            commands::show_config(&config, path.as_deref());
            Ok(())
        }
        Commands::Run(args) => {
            let mut config = load_config(cli.config.as_deref())?;
            args.apply(&mut config);
            run(args, config).await
        }
    }
}

#[derive(Parser)]
#[command(version, about = "Timed narration for video playback")]
struct Cli {
    /// Use this config file instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a script and print its cues
    Cues { script: PathBuf },
    /// Narrate a script against a simulated player
    Run(RunArgs),
    /// Show the effective configuration
    Config,
}

#[derive(Args)]
struct RunArgs {
    script: PathBuf,
    /// Simulated video length in seconds
    #[arg(long)]
    duration: Option<f64>,
    #[arg(long)]
    poll_ms: Option<u64>,
    /// Trigger window in seconds
    #[arg(long)]
    window: Option<f64>,
    /// Resume after each cue's pause, without waiting for speech to end
    #[arg(long)]
    fixed_delay: bool,
    /// Narrate overlapping cues immediately instead of queueing them
    #[arg(long)]
    no_queue: bool,
    /// Start playing right away
    #[arg(long)]
    autoplay: bool,
}

impl RunArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(ms) = self.poll_ms {
            config.engine.poll_interval_ms = ms;
        }
        if let Some(window) = self.window {
            config.engine.trigger_window_secs = window;
        }
        if self.fixed_delay {
            config.engine.resume_policy = ResumePolicy::FixedDelay;
        }
        if self.no_queue {
            config.engine.overlap_policy = OverlapPolicy::Concurrent;
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, String> {
    match path {
        Some(path) => AppConfig::load_from(path).map_err(|e| e.to_string()),
        None => Ok(AppConfig::load()),
    }
}

async fn run(args: RunArgs, config: AppConfig) -> Result<(), String> {
    let mut ctx = CliContext::start(&args.script, config, args.duration).await?;
    if args.autoplay {
        ctx.player.play().map_err(|e| e.to_string())?;
    }

    let result = repl(&ctx).await;
    ctx.shutdown().await;
    result
}

async fn repl(ctx: &CliContext) -> Result<(), String> {
    loop {
        let line = tokio::task::spawn_blocking(readline)
            .await
            .map_err(|e| e.to_string())??;
        let Some(line) = line else {
            commands::exit();
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, ctx).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(err) => println!("{err}"),
        }
    }
}

#[derive(Parser)]
#[command(about = "narrator session")]
struct Repl {
    #[command(subcommand)]
    command: ReplCommand,
}

#[derive(Subcommand)]
enum ReplCommand {
    Play,
    Pause,
    /// Jump to a timecode (`90`, `01:30`, `00:01:30.5`)
    Seek {
        position: String,
    },
    /// Playback speed factor
    Rate {
        rate: f64,
    },
    Status,
    /// Re-read the script file
    Reload,
    Cues,
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "narrator".to_string());
    let repl = Repl::try_parse_from(args).map_err(|e| e.to_string())?;

    match repl.command {
        ReplCommand::Play => commands::play(ctx)?,
        ReplCommand::Pause => commands::pause(ctx)?,
        ReplCommand::Seek { position } => commands::seek(ctx, parse_timecode(&position))?,
        ReplCommand::Rate { rate } => commands::set_rate(ctx, rate)?,
        ReplCommand::Status => commands::show_status(ctx).await?,
        ReplCommand::Reload => commands::reload(ctx),
        ReplCommand::Cues => commands::show_cues(ctx).await,
        ReplCommand::Exit => {
            commands::exit();
            return Ok(true);
        }
    }
    Ok(false)
}
