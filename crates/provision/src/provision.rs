//! The provisioning pipeline for one game directory.

use std::path::PathBuf;

use gsegen_progress::ProgressSink;

use crate::cache::EmulatorCache;
use crate::error::ProvisionError;
use crate::tools::{Bitness, INTERFACES_FILE, InterfaceGenerator};
use crate::{fsutil, locate};

/// Settings subdirectory inside the game root.
pub const SETTINGS_DIR: &str = "steam_settings";

/// Overlay configuration filename in the settings directory.
pub const OVERLAY_CONFIG_FILE: &str = "configs.overlay.ini";

/// Directory name of the emulator build variant that is installed.
const BUILD_ROOT: &str = "experimental";

/// Inputs for one provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub app_id: u32,
    /// Human-readable title, used for the game directory name.
    pub game_name: String,
    /// The game's original `steam_api(64).dll`.
    pub api_binary: PathBuf,
    /// Directory the game root is created under.
    pub output_dir: PathBuf,
    /// Copy the overlay-disabling template instead of the enabling one.
    pub disable_overlay: bool,
}

/// On-disk result of a successful provisioning run.
#[derive(Debug)]
pub struct ProvisionedGame {
    pub game_dir: PathBuf,
    pub settings_dir: PathBuf,
    pub bitness: Bitness,
}

/// Runs the provisioning state sequence against a cached emulator
/// release.
///
/// Failures abort the run and leave partial directory state in place;
/// nothing is rolled back.
pub struct Provisioner<'a> {
    cache: EmulatorCache<'a>,
    generator: &'a dyn InterfaceGenerator,
    /// Static assets shipped with the application (fonts, sounds,
    /// overlay templates) under a `steam_settings/` subdirectory.
    assets_dir: PathBuf,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        cache: EmulatorCache<'a>,
        generator: &'a dyn InterfaceGenerator,
        assets_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            cache,
            generator,
            assets_dir: assets_dir.into(),
        }
    }

    /// Provisions the game directory end to end.
    pub async fn provision(
        &self,
        request: &ProvisionRequest,
        client: &reqwest::Client,
        sink: &dyn ProgressSink,
    ) -> Result<ProvisionedGame, ProvisionError> {
        let bitness = Bitness::from_api_binary(&request.api_binary)
            .ok_or_else(|| ProvisionError::InvalidBinary(request.api_binary.clone()))?;

        let game_dir = request
            .output_dir
            .join(format!("{} ({})", request.game_name, request.app_id));
        let settings_dir = game_dir.join(SETTINGS_DIR);
        std::fs::create_dir_all(&settings_dir)?;

        let emu_root = self.cache.ensure(client, sink).await?;

        let build_root =
            locate::find_dir_named(emu_root, BUILD_ROOT).ok_or(ProvisionError::PayloadNotFound)?;
        let payload = build_root.join(bitness.payload_dir());
        if !payload.is_dir() {
            return Err(ProvisionError::PayloadNotFound);
        }

        let copied = fsutil::copy_regular_files(&payload, &game_dir)?;
        tracing::info!(files = copied, dir = %game_dir.display(), "emulator payload installed");

        // Back up the original module so the emulator can take its place.
        let binary_name = request
            .api_binary
            .file_name()
            .ok_or_else(|| ProvisionError::InvalidBinary(request.api_binary.clone()))?;
        let backup = game_dir.join(format!("{}.o", binary_name.to_string_lossy()));
        std::fs::copy(&request.api_binary, &backup)?;

        std::fs::write(
            settings_dir.join("steam_appid.txt"),
            request.app_id.to_string(),
        )?;

        let tools_dir = locate::find_tools_dir(emu_root).ok_or(ProvisionError::ToolsNotFound)?;
        let artifact = self
            .generator
            .generate(&request.api_binary, bitness, &tools_dir)?;
        fsutil::move_file(&artifact, &settings_dir.join(INTERFACES_FILE))?;

        self.merge_static_assets(&settings_dir, request.disable_overlay)?;

        sink.line("Done generating emulator files.");
        Ok(ProvisionedGame {
            game_dir,
            settings_dir,
            bitness,
        })
    }

    /// Copies the shipped font/sound assets and one of the two overlay
    /// templates into the settings directory.
    fn merge_static_assets(
        &self,
        settings_dir: &std::path::Path,
        disable_overlay: bool,
    ) -> Result<(), ProvisionError> {
        let base = self.assets_dir.join(SETTINGS_DIR);
        if !base.is_dir() {
            return Ok(());
        }

        for folder in ["fonts", "sounds"] {
            let src = base.join(folder);
            if src.is_dir() {
                fsutil::replace_dir(&src, &settings_dir.join(folder))?;
            }
        }

        let template = base.join(if disable_overlay {
            "disabled.ini"
        } else {
            "enabled.ini"
        });
        if template.is_file() {
            std::fs::copy(&template, settings_dir.join(OVERLAY_CONFIG_FILE))?;
        }
        Ok(())
    }
}
