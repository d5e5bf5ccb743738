//! User-facing emulator configuration files.

use std::io;
use std::path::Path;

/// Options for `configs.user.ini` and `configs.main.ini`.
#[derive(Debug, Default, Clone)]
pub struct UserConfig {
    /// Account name for `[user::general]`; no section when empty.
    pub account_name: Option<String>,
    /// Write a `[user::saves]` section keeping saves next to the game.
    pub local_save: bool,
    /// Allow the emulator to reach the internet instead of LAN only.
    pub disable_lan_only: bool,
}

/// Writes the optional config files into the settings directory.
///
/// Files are only created for the sections actually requested.
pub fn write_user_configs(settings_dir: &Path, config: &UserConfig) -> io::Result<()> {
    if config.disable_lan_only {
        std::fs::write(
            settings_dir.join("configs.main.ini"),
            "[main::connectivity]\ndisable_lan_only=1\n",
        )?;
    }

    let mut content = String::new();
    if let Some(account) = config.account_name.as_deref().filter(|a| !a.is_empty()) {
        content.push_str(&format!(
            "[user::general]\naccount_name={account}\nlanguage=english\n"
        ));
    }
    if config.local_save {
        content.push_str("[user::saves]\nlocal_save_path=./GSE Saves\n");
    }
    if !content.is_empty() {
        std::fs::write(settings_dir.join("configs.user.ini"), content)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_write_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        write_user_configs(tmp.path(), &UserConfig::default()).unwrap();
        assert!(!tmp.path().join("configs.user.ini").exists());
        assert!(!tmp.path().join("configs.main.ini").exists());
    }

    #[test]
    fn account_name_writes_general_section() {
        let tmp = tempfile::tempdir().unwrap();
        let config = UserConfig {
            account_name: Some("player1".into()),
            ..Default::default()
        };
        write_user_configs(tmp.path(), &config).unwrap();

        let ini = std::fs::read_to_string(tmp.path().join("configs.user.ini")).unwrap();
        assert_eq!(ini, "[user::general]\naccount_name=player1\nlanguage=english\n");
    }

    #[test]
    fn local_save_appends_saves_section() {
        let tmp = tempfile::tempdir().unwrap();
        let config = UserConfig {
            account_name: Some("player1".into()),
            local_save: true,
            ..Default::default()
        };
        write_user_configs(tmp.path(), &config).unwrap();

        let ini = std::fs::read_to_string(tmp.path().join("configs.user.ini")).unwrap();
        assert!(ini.ends_with("[user::saves]\nlocal_save_path=./GSE Saves\n"));
    }

    #[test]
    fn empty_account_name_is_no_section() {
        let tmp = tempfile::tempdir().unwrap();
        let config = UserConfig {
            account_name: Some(String::new()),
            ..Default::default()
        };
        write_user_configs(tmp.path(), &config).unwrap();
        assert!(!tmp.path().join("configs.user.ini").exists());
    }

    #[test]
    fn disable_lan_only_writes_main_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = UserConfig {
            disable_lan_only: true,
            ..Default::default()
        };
        write_user_configs(tmp.path(), &config).unwrap();

        let ini = std::fs::read_to_string(tmp.path().join("configs.main.ini")).unwrap();
        assert_eq!(ini, "[main::connectivity]\ndisable_lan_only=1\n");
    }
}
