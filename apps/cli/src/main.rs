//! gsegen command-line entry point.
//!
//! Wires the library crates into the two pipelines: emulator
//! provisioning and achievement acquisition. The pipelines run and
//! fail independently within one invocation.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gsegen_achievements::{Acquisition, Source};
use gsegen_dlc::DlcEnricher;
use gsegen_progress::{ProgressSink, StdoutSink};
use gsegen_provision::{
    EmulatorCache, GenerateInterfacesTool, ProvisionRequest, Provisioner, SETTINGS_DIR, SevenZip,
    UserConfig, write_user_configs,
};

#[derive(Parser)]
#[command(
    name = "gsegen",
    about = "Generates Goldberg Steam Emulator settings for a game",
    version
)]
struct Cli {
    /// Steam app id of the title.
    app_id: u32,

    /// Directory label for the provisioned game.
    #[arg(long, default_value = "Game")]
    name: String,

    /// Prefer the Steam Community source over SteamDB.
    #[arg(long)]
    steam: bool,

    /// Only fetch achievements, skip emulator provisioning.
    #[arg(long)]
    achievements_only: bool,

    /// Path to the game's original steam_api(64).dll.
    #[arg(long, required_unless_present = "achievements_only")]
    dll: Option<PathBuf>,

    /// Disable the in-game overlay.
    #[arg(long)]
    disable_overlay: bool,

    /// Allow the emulator to reach the internet instead of LAN only.
    #[arg(long)]
    disable_lan_only: bool,

    /// Keep save games next to the game directory.
    #[arg(long)]
    local_save: bool,

    /// Account name written into the user configuration.
    #[arg(long)]
    account: Option<String>,

    /// Directory the game root is created under.
    #[arg(long, default_value = ".")]
    output: PathBuf,

    /// Assets directory holding 7-Zip, the emulator cache and the
    /// static steam_settings templates.
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let sink = StdoutSink;

    let game_dir = cli.output.join(format!("{} ({})", cli.name, cli.app_id));
    let settings_dir = game_dir.join(SETTINGS_DIR);
    std::fs::create_dir_all(&settings_dir)
        .with_context(|| format!("creating {}", settings_dir.display()))?;

    let mut failures: Vec<String> = Vec::new();

    // Emulator provisioning.
    if !cli.achievements_only {
        let dll = cli
            .dll
            .clone()
            .context("--dll is required unless --achievements-only is set")?;
        let extractor = SevenZip::new(cli.assets.join("7zip").join("7z.exe"));
        let cache = EmulatorCache::new(cli.assets.join("goldberg_emu"), &extractor);
        let provisioner = Provisioner::new(cache, &GenerateInterfacesTool, &cli.assets);

        let request = ProvisionRequest {
            app_id: cli.app_id,
            game_name: cli.name.clone(),
            api_binary: dll,
            output_dir: cli.output.clone(),
            disable_overlay: cli.disable_overlay,
        };

        sink.line("Generating emulator files...");
        let client = gsegen_http::plain_client()?;
        if let Err(e) = provisioner.provision(&request, &client, &sink).await {
            tracing::error!(error = %e, "provisioning failed");
            sink.line(&format!("Provisioning failed: {e}"));
            failures.push(format!("provisioning: {e}"));
        }
    }

    // Achievement acquisition, independent of provisioning.
    sink.line("Generating achievements...");
    let browser = gsegen_http::browser_client()?;
    let preferred = if cli.steam {
        Source::SteamCommunity
    } else {
        Source::SteamDb
    };
    let acquisition = Acquisition::new(browser.clone());
    if let Err(e) = acquisition
        .run(cli.app_id, preferred, &settings_dir, &sink)
        .await
    {
        tracing::error!(error = %e, "achievement acquisition failed");
        sink.line(&format!("Achievements fetch failed: {e}"));
        failures.push(format!("achievements: {e}"));
    }

    // DLC enrichment and user configuration belong to the emulator
    // setup, not to an achievements-only run.
    if !cli.achievements_only {
        let enricher = DlcEnricher::new(browser);
        if let Err(e) = enricher.enrich(cli.app_id, &settings_dir, &sink).await {
            tracing::warn!(error = %e, "DLC enrichment failed");
            sink.line(&format!("DLC lookup failed: {e}"));
        }

        let user_config = UserConfig {
            account_name: cli.account.clone(),
            local_save: cli.local_save,
            disable_lan_only: cli.disable_lan_only,
        };
        write_user_configs(&settings_dir, &user_config)?;
    }

    if failures.is_empty() {
        sink.line("Done generating GSE!");
        Ok(())
    } else {
        anyhow::bail!("completed with errors: {}", failures.join("; "))
    }
}
