//! Game directory provisioning with the Goldberg emulator runtime.
//!
//! Ensures a cached copy of the emulator release archive, extracts it
//! once, installs the platform payload matching the user-supplied
//! `steam_api(64).dll`, generates the interface description through an
//! external tool, and merges static configuration assets. External
//! executables sit behind capability traits so the pipeline is testable
//! without them.

mod cache;
mod config;
mod error;
mod fsutil;
mod locate;
mod provision;
mod tools;

pub use cache::{ARCHIVE_NAME, EmulatorCache, GOLDBERG_URL};
pub use config::{UserConfig, write_user_configs};
pub use error::ProvisionError;
pub use provision::{
    OVERLAY_CONFIG_FILE, ProvisionRequest, ProvisionedGame, Provisioner, SETTINGS_DIR,
};
pub use tools::{
    ArchiveExtractor, Bitness, GenerateInterfacesTool, INTERFACES_FILE, InterfaceGenerator,
    SevenZip,
};
