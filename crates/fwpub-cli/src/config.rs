//! Config file loading and environment overrides.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::Context;
use fwpub_sdk::PublisherConfig;

/// Read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "fwpub.toml";

/// Overrides `github.repo`.
pub const REPO_ENV: &str = "GITHUB_REPO";

/// Any non-empty value enables debug diagnostics.
pub const DEBUG_ENV: &str = "DEBUG";

/// Load the config: an explicit path must exist; the default file is
/// optional. Environment overrides are applied last.
pub fn load(path: Option<&Path>) -> anyhow::Result<PublisherConfig> {
    let mut config = match path {
        Some(path) => read(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => read(Path::new(DEFAULT_CONFIG_FILE))?,
        None => PublisherConfig::default(),
    };
    apply_overrides(&mut config, |key| env::var(key).ok());
    Ok(config)
}

fn read(path: &Path) -> anyhow::Result<PublisherConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("invalid config file {}", path.display()))
}

pub fn apply_overrides(config: &mut PublisherConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(repo) = lookup(REPO_ENV).filter(|r| !r.trim().is_empty()) {
        config.github.repo = repo.trim().to_string();
    }
}

pub fn debug_enabled() -> bool {
    env::var(DEBUG_ENV).is_ok_and(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fwpub.toml");
        fs::write(
            &path,
            r#"
source_file = "firmware/ho_relay3.ino"

[storage]
primary_bucket = "staging-fw"

[records]
script_dir = "tools/admin"
"#,
        )
        .unwrap();

        let config = read(&path).unwrap();
        assert_eq!(config.source_file, PathBuf::from("firmware/ho_relay3.ino"));
        assert_eq!(config.storage.primary_bucket, "staging-fw");
        assert_eq!(config.storage.fallback_bucket, "hoctrl.appspot.com");
        assert_eq!(config.records.script_dir, PathBuf::from("tools/admin"));
        assert_eq!(config.records.collection, "firmware_updates");
        assert_eq!(config.github.repo, "maotou316/hoctrl-firmware");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/fwpub.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("cannot read config file"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fwpub.toml");
        fs::write(&path, "[github\nrepo = 1").unwrap();
        assert!(read(&path).is_err());
    }

    #[test]
    fn repo_env_override() {
        let mut config = PublisherConfig::default();
        apply_overrides(&mut config, |key| {
            (key == REPO_ENV).then(|| "acme/relay-firmware".to_string())
        });
        assert_eq!(config.github.repo, "acme/relay-firmware");

        apply_overrides(&mut config, |_| Some("  ".to_string()));
        assert_eq!(config.github.repo, "acme/relay-firmware");
    }
}
