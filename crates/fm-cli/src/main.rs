mod simulate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fm_core::{
    HapticPattern, HapticSynchronizer, Session, SessionHistory, SessionRecorder, TracingDevice,
    encode_sessions, format_duration,
};
use fm_store::{ProfileStore, Settings};

#[derive(Parser)]
#[command(name = "fm", about = "Fear Meter: horror-session recorder and haptic engine")]
struct Cli {
    /// Profile to use (one history and settings set per profile)
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Override the data directory (default: $FM_DATA_DIR or ~/.fear-meter)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a session fed by the built-in heart-rate simulator
    Simulate {
        /// Number of samples to record
        #[arg(long, default_value_t = 50)]
        samples: u32,

        /// Milliseconds between samples
        #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(u64).range(1..))]
        rate_ms: u64,

        /// Simulate a scare every K samples
        #[arg(long)]
        tap_every: Option<u32>,

        /// Disable haptics for this run regardless of settings
        #[arg(long)]
        no_haptics: bool,
    },

    /// List stored sessions, most recent first
    History {
        /// Print the stored JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one session in detail
    Show {
        id: i64,

        /// Print the stored JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Delete one session
    Delete { id: i64 },

    /// Delete every stored session
    Clear,

    /// Show or update persisted settings
    Settings {
        #[arg(long)]
        haptics: Option<Toggle>,

        #[arg(long)]
        sound: Option<Toggle>,

        /// UI language code, e.g. EN
        #[arg(long)]
        language: Option<String>,
    },

    /// Fire a catalogue pattern (see `fm patterns`)
    Haptic { pattern: String },

    /// List the haptic pattern catalogue
    Patterns,
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn is_on(self) -> bool {
        matches!(self, Toggle::On)
    }
}

fn open_profile(cli: &Cli) -> Result<ProfileStore> {
    let base_dir = cli
        .data_dir
        .clone()
        .or_else(|| std::env::var("FM_DATA_DIR").ok().map(PathBuf::from));
    ProfileStore::open(cli.profile.as_deref(), base_dir.as_deref())
        .context("failed to open profile store")
}

fn open_recorder(cli: &Cli) -> Result<SessionRecorder> {
    let store = open_profile(cli)?.into_store();
    Ok(SessionRecorder::new(SessionHistory::load(Box::new(store))))
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Simulate {
            samples,
            rate_ms,
            tap_every,
            no_haptics,
        } => {
            let opts = simulate::Options {
                samples: *samples,
                rate_ms: *rate_ms,
                tap_every: *tap_every,
                haptics: !*no_haptics,
            };
            cmd_simulate(&cli, opts).await
        }
        Commands::History { json } => cmd_history(&cli, *json),
        Commands::Show { id, json } => cmd_show(&cli, *id, *json),
        Commands::Delete { id } => cmd_delete(&cli, *id),
        Commands::Clear => cmd_clear(&cli),
        Commands::Settings {
            haptics,
            sound,
            language,
        } => cmd_settings(&cli, *haptics, *sound, language.as_deref()),
        Commands::Haptic { pattern } => cmd_haptic(&cli, pattern),
        Commands::Patterns => cmd_patterns(),
    }
}

async fn cmd_simulate(cli: &Cli, mut opts: simulate::Options) -> Result<()> {
    let profile = open_profile(cli)?;
    let settings = profile
        .store()
        .load_settings()
        .context("failed to load settings")?;
    opts.haptics &= settings.haptic_enabled;

    let history = SessionHistory::load(Box::new(profile.into_store()));
    let session = simulate::run(SessionRecorder::new(history), opts).await?;
    print_summary(&session);
    Ok(())
}

fn cmd_history(cli: &Cli, json: bool) -> Result<()> {
    let store = open_profile(cli)?.into_store();
    let history = SessionHistory::load(Box::new(store));

    if json {
        let encoded = encode_sessions(history.sessions()).context("failed to encode sessions")?;
        println!("{encoded}");
        return Ok(());
    }
    if history.is_empty() {
        println!("(no sessions recorded)");
        return Ok(());
    }
    for s in history.sessions() {
        println!(
            "{:<14} {:<24} {:<17} {:>7}  avg {:>3}  max {:>3}  panics {}",
            s.id,
            s.date,
            s.display_name(),
            s.duration_text,
            s.avg_bpm,
            s.max_bpm.round(),
            s.panic_count,
        );
    }
    Ok(())
}

fn cmd_show(cli: &Cli, id: i64, json: bool) -> Result<()> {
    let store = open_profile(cli)?.into_store();
    let history = SessionHistory::load(Box::new(store));
    let session = history
        .get(id)
        .with_context(|| format!("no session with id {id}"))?;

    if json {
        let encoded =
            serde_json::to_string_pretty(session).context("failed to encode session")?;
        println!("{encoded}");
        return Ok(());
    }

    print_summary(session);
    println!("samples:    {}", session.bpm_history.len());
    for event in &session.panic_events {
        println!(
            "  panic at +{:<8} bpm {:>3}  stress {:>3}",
            format_duration(event.timestamp - session.start_time),
            event.bpm.round(),
            event.stress.round(),
        );
    }
    Ok(())
}

fn cmd_delete(cli: &Cli, id: i64) -> Result<()> {
    let mut recorder = open_recorder(cli)?;
    if recorder.delete_session(id) {
        println!("deleted session {id}");
    } else {
        println!("no session with id {id}");
    }
    Ok(())
}

fn cmd_clear(cli: &Cli) -> Result<()> {
    let mut recorder = open_recorder(cli)?;
    let count = recorder.sessions().len();
    recorder.clear_history();
    println!("cleared {count} session(s)");
    Ok(())
}

fn cmd_settings(
    cli: &Cli,
    haptics: Option<Toggle>,
    sound: Option<Toggle>,
    language: Option<&str>,
) -> Result<()> {
    let profile = open_profile(cli)?;
    let store = profile.store();
    let mut settings = store.load_settings().context("failed to load settings")?;
    let before = settings.clone();

    if let Some(t) = haptics {
        settings.haptic_enabled = t.is_on();
    }
    if let Some(t) = sound {
        settings.sound_enabled = t.is_on();
    }
    if let Some(code) = language {
        let code = code.trim().to_ascii_uppercase();
        anyhow::ensure!(!code.is_empty(), "language code must not be empty");
        settings.language = code;
    }

    if settings != before {
        store
            .save_settings(&settings)
            .context("failed to save settings")?;
    }
    print_settings(profile.profile(), &settings);
    Ok(())
}

fn cmd_haptic(cli: &Cli, name: &str) -> Result<()> {
    let pattern: HapticPattern = name.parse().map_err(anyhow::Error::msg)?;
    let settings = open_profile(cli)?
        .store()
        .load_settings()
        .context("failed to load settings")?;

    let haptics = HapticSynchronizer::new(Arc::new(TracingDevice), settings.haptic_enabled);
    if haptics.trigger(pattern) {
        println!("{pattern} {:?}", pattern.steps());
    } else {
        println!("haptics disabled; {pattern} not played");
    }
    Ok(())
}

fn cmd_patterns() -> Result<()> {
    for pattern in HapticPattern::ALL {
        let total: u32 = pattern.steps().iter().sum();
        println!("{:<22} {:>5}ms  {:?}", pattern.name(), total, pattern.steps());
    }
    Ok(())
}

fn print_summary(s: &Session) {
    println!("session:    {} ({})", s.display_name(), s.id);
    println!("date:       {}", s.date);
    println!("duration:   {}", s.duration_text);
    println!("avg bpm:    {}", s.avg_bpm);
    println!("max bpm:    {}", s.max_bpm.round());
    println!("max stress: {}", s.max_stress.round());
    println!("panics:     {}", s.panic_count);
}

fn print_settings(profile: &str, s: &Settings) {
    let on_off = |b: bool| if b { "on" } else { "off" };
    println!("profile:    {profile}");
    println!("haptics:    {}", on_off(s.haptic_enabled));
    println!("sound:      {}", on_off(s.sound_enabled));
    println!("disclaimer: {}", on_off(s.show_disclaimer));
    println!("language:   {}", s.language);
}
