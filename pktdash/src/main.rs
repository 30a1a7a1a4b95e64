//! Entry point for the pktdash TUI. Parses args, resolves the profile, and runs the App.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use pktdash::app::App;
use pktdash::config::{
    load_profiles, profiles_path, save_profiles, upsert_profile, ProfileEntry, ProfileRequest,
    ProfileWrite, ResolveProfile, Settings, DEFAULT_URL,
};
use pktdash::error::ConfigError;
use pktdash::logging::init_logging;
use pktdash::view::DisplayMode;
use pktdash::HttpSource;

#[derive(Parser, Debug)]
#[command(author, version, about = "Live packet-capture dashboard for the terminal")]
struct Args {
    /// Analyzer base URL, e.g. http://localhost:8003
    url: Option<String>,

    /// Named connection profile (created on first use with a URL)
    #[arg(short = 'P', long)]
    profile: Option<String>,

    /// Overwrite an existing profile that differs from the given values
    #[arg(long)]
    save: bool,

    /// Poll interval in milliseconds
    #[arg(short, long, value_name = "MS")]
    interval: Option<u64>,

    /// Per-request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Start in dark mode
    #[arg(long)]
    dark: bool,

    /// Log file (default: <cache dir>/pktdash/pktdash.log)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Resolve settings, persist the profile, print, and exit
    #[arg(long)]
    dry_run: bool,
}

fn resolve_settings(args: &Args) -> Result<Settings, ConfigError> {
    let mode = if args.dark { DisplayMode::Dark } else { DisplayMode::Light };
    let req = ProfileRequest {
        profile_name: args.profile.clone(),
        url: args.url.clone(),
        interval_ms: args.interval,
        timeout_ms: args.timeout,
    };
    let mut profiles = load_profiles();

    let entry = match req.resolve(&profiles) {
        ResolveProfile::Direct(entry) => {
            // Validate before anything is persisted
            Settings::from_entry(&entry, args.interval, args.timeout, mode)?;
            if let Some(name) = args.profile.as_deref() {
                match upsert_profile(&mut profiles, name, &entry, args.save) {
                    ProfileWrite::Created | ProfileWrite::Overwritten => save_profiles(&profiles)?,
                    ProfileWrite::Skipped => eprintln!(
                        "Profile '{name}' differs from the given values; \
                         pass --save to overwrite it."
                    ),
                    ProfileWrite::Unchanged => {}
                }
            }
            entry
        }
        ResolveProfile::Loaded(entry) => entry,
        ResolveProfile::Unknown(name) => return Err(ConfigError::UnknownProfile(name)),
        ResolveProfile::Default => ProfileEntry {
            url: DEFAULT_URL.to_string(),
            ..Default::default()
        },
    };
    Settings::from_entry(&entry, args.interval, args.timeout, mode)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = resolve_settings(&args)?;

    if args.dry_run {
        println!("url: {}", settings.base_url);
        println!("interval_ms: {}", settings.interval.as_millis());
        println!("timeout_ms: {}", settings.timeout.as_millis());
        println!("mode: {}", if settings.mode.is_dark() { "dark" } else { "light" });
        println!("profiles: {}", profiles_path().display());
        return Ok(());
    }

    let log_path = init_logging(args.log_file.as_deref()).context("opening log file")?;
    info!(
        url = %settings.base_url,
        interval_ms = settings.interval.as_millis() as u64,
        log = %log_path.display(),
        "starting pktdash"
    );

    let source = HttpSource::new(settings.base_url.clone(), settings.timeout)?;
    let mut app = App::new(settings.mode);
    app.run(source, settings.interval).await
}
