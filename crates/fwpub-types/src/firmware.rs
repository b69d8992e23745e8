use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Characters that would break a storage key, a release tag, or a URL path.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', ' ', '\t', '\n', '\r', '?', '#', '"'];

/// Identity of the firmware being published.
///
/// Parsed once from the firmware source and immutable for the run. Every
/// name the publisher derives (artifact file name, storage key, release tag,
/// record key) is a pure function of `(model, version)`, which is what makes
/// re-publishing the same version idempotent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FirmwareInfo {
    /// Version string as written in the source, e.g. `1.2.2`.
    pub version: String,
    /// Device model identifier, e.g. `hoRelay2`.
    pub model: String,
}

impl FirmwareInfo {
    /// Create firmware info, rejecting values that cannot be used in paths.
    ///
    /// The version format itself is not validated beyond that; devices
    /// compare versions on their side.
    pub fn new(model: impl Into<String>, version: impl Into<String>) -> Result<Self, TypeError> {
        let model = model.into();
        let version = version.into();
        check_component("model", &model)?;
        check_component("version", &version)?;
        Ok(Self { version, model })
    }

    /// Release file name: `{model}_v{version}.bin`.
    pub fn artifact_file_name(&self) -> String {
        format!("{}_v{}.bin", self.model, self.version)
    }

    /// Object storage key: `firmware/{model}/{model}_v{version}.bin`.
    pub fn storage_path(&self) -> String {
        format!("firmware/{}/{}", self.model, self.artifact_file_name())
    }

    /// Release tag: `v{version}`.
    pub fn release_tag(&self) -> String {
        format!("v{}", self.version)
    }

    /// Release title: `{model} v{version}`.
    pub fn release_title(&self) -> String {
        format!("{} v{}", self.model, self.version)
    }

    /// Key of the version record document.
    pub fn record_key(&self) -> &str {
        &self.model
    }
}

impl fmt::Display for FirmwareInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.model, self.version)
    }
}

fn check_component(field: &'static str, value: &str) -> Result<(), TypeError> {
    if value.trim().is_empty() {
        return Err(TypeError::Empty { field });
    }
    if let Some(ch) = value.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(TypeError::ForbiddenChar {
            field,
            value: value.to_string(),
            ch,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn relay() -> FirmwareInfo {
        FirmwareInfo::new("hoRelay2", "1.2.2").unwrap()
    }

    #[test]
    fn names_for_known_release() {
        let info = relay();
        assert_eq!(info.artifact_file_name(), "hoRelay2_v1.2.2.bin");
        assert_eq!(info.storage_path(), "firmware/hoRelay2/hoRelay2_v1.2.2.bin");
        assert_eq!(info.release_tag(), "v1.2.2");
        assert_eq!(info.release_title(), "hoRelay2 v1.2.2");
        assert_eq!(info.record_key(), "hoRelay2");
    }

    #[test]
    fn display() {
        assert_eq!(relay().to_string(), "hoRelay2 v1.2.2");
    }

    #[test]
    fn rejects_empty_model() {
        assert_eq!(
            FirmwareInfo::new("  ", "1.0.0").unwrap_err(),
            TypeError::Empty { field: "model" }
        );
    }

    #[test]
    fn rejects_path_separator_in_version() {
        let err = FirmwareInfo::new("hoRelay2", "1.0/evil").unwrap_err();
        assert!(matches!(err, TypeError::ForbiddenChar { field: "version", ch: '/', .. }));
    }

    #[test]
    fn non_semver_versions_are_accepted() {
        assert!(FirmwareInfo::new("hoRelay2", "2024.10-rc1").is_ok());
    }

    proptest! {
        #[test]
        fn names_are_deterministic(model in "[A-Za-z][A-Za-z0-9_]{0,15}", version in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}") {
            let a = FirmwareInfo::new(model.clone(), version.clone()).unwrap();
            let b = FirmwareInfo::new(model.clone(), version.clone()).unwrap();
            prop_assert_eq!(a.storage_path(), b.storage_path());
            prop_assert_eq!(a.record_key(), b.record_key());
            prop_assert_eq!(a.storage_path(), format!("firmware/{model}/{model}_v{version}.bin"));
        }
    }
}
