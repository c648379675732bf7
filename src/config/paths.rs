//! Where starcat keeps its configuration file

use std::path::{Path, PathBuf};

/// Environment variable that pins the configuration directory
pub const CONFIG_DIR_ENV: &str = "STARCAT_CONFIG_DIR";

/// Directory holding `config.yaml`
///
/// `STARCAT_CONFIG_DIR` wins when set; otherwise the platform's per-user
/// config location for starcat, or `.starcat` in the working directory when
/// no home directory can be found.
pub fn config_dir() -> PathBuf {
    resolve_config_dir(std::env::var(CONFIG_DIR_ENV).ok().as_deref())
}

fn resolve_config_dir(pinned: Option<&str>) -> PathBuf {
    match pinned.map(str::trim).filter(|p| !p.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => directories::ProjectDirs::from("", "", "starcat")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".starcat")),
    }
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_config_path_file_name() {
        assert!(root_config_path().ends_with("config.yaml"));
    }

    #[test]
    fn test_pinned_config_dir_wins() {
        assert_eq!(resolve_config_dir(Some("/srv/starcat")), PathBuf::from("/srv/starcat"));
    }

    #[test]
    fn test_blank_pin_falls_back_to_platform_dir() {
        let dir = resolve_config_dir(Some("  "));
        assert_eq!(dir, resolve_config_dir(None));
        assert!(dir.to_string_lossy().contains("starcat"));
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }
}
