//! Bitness selection and the external tool capability traits.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::ProvisionError;

/// Word size of the supplied API binary, derived from its filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitness {
    X86,
    X64,
}

impl Bitness {
    /// Classifies a `steam_api(64).dll` path; `None` for anything else.
    pub fn from_api_binary(path: &Path) -> Option<Bitness> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        match name.as_str() {
            "steam_api.dll" => Some(Bitness::X86),
            "steam_api64.dll" => Some(Bitness::X64),
            _ => None,
        }
    }

    /// Payload subdirectory inside the emulator build root.
    pub fn payload_dir(self) -> &'static str {
        match self {
            Bitness::X86 => "x32",
            Bitness::X64 => "x64",
        }
    }

    /// Matching interface generator executable.
    pub fn generator_exe(self) -> &'static str {
        match self {
            Bitness::X86 => "generate_interfaces_x32.exe",
            Bitness::X64 => "generate_interfaces_x64.exe",
        }
    }
}

/// Extracts a release archive into a target directory, overwriting.
pub trait ArchiveExtractor: Send + Sync {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ProvisionError>;
}

/// Produces the interface description artifact for a supplied binary.
///
/// Returns the path of the produced artifact, left in the binary's
/// directory.
pub trait InterfaceGenerator: Send + Sync {
    fn generate(
        &self,
        binary: &Path,
        bitness: Bitness,
        tools_dir: &Path,
    ) -> Result<PathBuf, ProvisionError>;
}

/// `ArchiveExtractor` backed by the bundled 7-Zip executable.
pub struct SevenZip {
    exe: PathBuf,
}

impl SevenZip {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }
}

impl ArchiveExtractor for SevenZip {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ProvisionError> {
        let mut cmd = Command::new(&self.exe);
        cmd.arg("x")
            .arg(format!("-o{}", dest.display()))
            .arg("-y")
            .arg(archive)
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        hide_console(&mut cmd);

        let status = cmd.status()?;
        if !status.success() {
            return Err(ProvisionError::Extract(format!("7z exited with {status}")));
        }
        Ok(())
    }
}

/// `InterfaceGenerator` backed by the emulator's bundled
/// `generate_interfaces_x{32,64}.exe` tools.
pub struct GenerateInterfacesTool;

/// Filename of the produced interface description artifact.
pub const INTERFACES_FILE: &str = "steam_interfaces.txt";

impl InterfaceGenerator for GenerateInterfacesTool {
    fn generate(
        &self,
        binary: &Path,
        bitness: Bitness,
        tools_dir: &Path,
    ) -> Result<PathBuf, ProvisionError> {
        let work_dir = binary.parent().ok_or_else(|| {
            ProvisionError::InterfaceGeneration("binary has no parent directory".into())
        })?;

        let mut cmd = Command::new(tools_dir.join(bitness.generator_exe()));
        cmd.arg(binary)
            .current_dir(work_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        hide_console(&mut cmd);

        let status = cmd.status()?;
        if !status.success() {
            return Err(ProvisionError::InterfaceGeneration(format!(
                "generator exited with {status}"
            )));
        }

        let artifact = work_dir.join(INTERFACES_FILE);
        if !artifact.is_file() {
            return Err(ProvisionError::InterfaceGeneration(format!(
                "no {INTERFACES_FILE} produced"
            )));
        }
        Ok(artifact)
    }
}

#[cfg(windows)]
fn hide_console(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_console(_cmd: &mut Command) {}
