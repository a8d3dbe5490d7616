use crate::common::SETTINGS_FILE;
use std::path::{Path, PathBuf};

pub use super::settings::*;

pub fn settings_path() -> PathBuf {
    PathBuf::from(SETTINGS_FILE)
}

/// Reads the explicit settings file, or the default one when it exists.
/// No file at all yields empty settings.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    match explicit {
        Some(path) => Settings::load(path),
        None => {
            let default = settings_path();
            if default.exists() {
                Settings::load(default)
            } else {
                Ok(Settings::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_settings(Some(dir.path().join("missing.toml").as_path())).is_err());
    }

    #[test]
    fn explicit_path_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[policy]\nboost = 75\ncoder = true\n").unwrap();

        let settings = load_settings(Some(path.as_path())).unwrap();
        assert_eq!(settings.policy.boost, Some(75));
        assert_eq!(settings.policy.coder, Some(true));
    }
}
