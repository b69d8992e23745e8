use std::fs;
use std::path::PathBuf;

use fwpub_types::FirmwareInfo;
use tracing::debug;

use crate::error::{SourceError, SourceResult};

/// Name of the version constant.
pub const VERSION_CONSTANT: &str = "firmwareVersion";

/// Name of the model constant.
pub const MODEL_CONSTANT: &str = "deviceModel";

/// Reads [`FirmwareInfo`] from a firmware source file.
#[derive(Clone, Debug)]
pub struct MetadataReader {
    path: PathBuf,
}

impl MetadataReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the file and extract model and version.
    pub fn read(&self) -> SourceResult<FirmwareInfo> {
        let content = fs::read_to_string(&self.path).map_err(|source| SourceError::Unreadable {
            path: self.path.clone(),
            source,
        })?;
        self.parse(&content)
    }

    /// Extract model and version from already-loaded source text.
    pub fn parse(&self, content: &str) -> SourceResult<FirmwareInfo> {
        let missing = |name| SourceError::MissingConstant {
            name,
            path: self.path.clone(),
        };
        let version = extract_constant(content, VERSION_CONSTANT)
            .ok_or_else(|| missing(VERSION_CONSTANT))?;
        let model =
            extract_constant(content, MODEL_CONSTANT).ok_or_else(|| missing(MODEL_CONSTANT))?;

        debug!(%model, %version, path = %self.path.display(), "read firmware metadata");

        FirmwareInfo::new(model, version).map_err(|source| SourceError::Invalid {
            path: self.path.clone(),
            source,
        })
    }
}

/// Find `const char* <name> = "<value>"` and return `value`.
///
/// The declaration may appear anywhere on a line. Whitespace around `*` and
/// `=` is flexible, and lines commented out with `//` are ignored. The first
/// declaration wins.
pub fn extract_constant(content: &str, name: &str) -> Option<String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content.lines().find_map(|line| scan_line(line, name))
}

fn scan_line(line: &str, name: &str) -> Option<String> {
    if line.trim_start().starts_with("//") {
        return None;
    }
    line.match_indices("const").find_map(|(at, _)| {
        let before = line[..at].chars().next_back();
        if before.is_some_and(is_ident_char) {
            return None;
        }
        parse_declaration(&line[at + "const".len()..], name)
    })
}

/// Parse what follows a `const` keyword.
fn parse_declaration(rest: &str, name: &str) -> Option<String> {
    if rest.starts_with(is_ident_char) {
        return None;
    }
    let rest = rest.trim_start().strip_prefix("char")?.trim_start();
    let rest = rest.strip_prefix('*')?.trim_start();
    let rest = rest.strip_prefix(name)?;
    // `firmwareVersionOld` must not match `firmwareVersion`.
    if rest.starts_with(is_ident_char) {
        return None;
    }
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let rest = rest.strip_prefix('"')?;
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKETCH: &str = r#"
#include <WiFi.h>

// const char* firmwareVersion = "0.0.1";
const char* firmwareVersion = "1.2.2";
const char *deviceModel="hoRelay2";

void setup() {}
"#;

    #[test]
    fn extracts_both_constants() {
        let info = MetadataReader::new("ho_relay2.ino").parse(SKETCH).unwrap();
        assert_eq!(info.version, "1.2.2");
        assert_eq!(info.model, "hoRelay2");
    }

    #[test]
    fn commented_declaration_is_ignored() {
        assert_eq!(extract_constant(SKETCH, "firmwareVersion").as_deref(), Some("1.2.2"));
    }

    #[test]
    fn static_qualifier_is_allowed() {
        let src = r#"static const char* deviceModel = "hoPlug";"#;
        assert_eq!(extract_constant(src, "deviceModel").as_deref(), Some("hoPlug"));
    }

    #[test]
    fn longer_identifier_does_not_match() {
        let src = r#"const char* deviceModelName = "x";"#;
        assert_eq!(extract_constant(src, "deviceModel"), None);
    }

    #[test]
    fn byte_order_mark_is_skipped() {
        let src = "\u{feff}const char* firmwareVersion = \"1.2.2\";\nconst char* deviceModel = \"hoRelay2\";\n";
        let info = MetadataReader::new("ho_relay2.ino").parse(src).unwrap();
        assert_eq!(info.version, "1.2.2");
        assert_eq!(info.model, "hoRelay2");
    }

    #[test]
    fn declaration_inside_a_line() {
        let src = r#"
namespace fw { const char* firmwareVersion = "1.2.2"; }
namespace fw { const char* deviceModel = "hoRelay2"; }
"#;
        let info = MetadataReader::new("ho_relay2.ino").parse(src).unwrap();
        assert_eq!(info.version, "1.2.2");
        assert_eq!(info.model, "hoRelay2");
    }

    #[test]
    fn const_must_be_a_whole_word() {
        let src = r#"myconst char* deviceModel = "x"; constexpr char* deviceModel = "y";"#;
        assert_eq!(extract_constant(src, "deviceModel"), None);
    }

    #[test]
    fn missing_model_is_parse_error() {
        let src = r#"const char* firmwareVersion = "1.2.2";"#;
        let err = MetadataReader::new("x.ino").parse(src).unwrap_err();
        match err {
            SourceError::MissingConstant { name, .. } => assert_eq!(name, MODEL_CONSTANT),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = MetadataReader::new("/nonexistent/fw.ino").read().unwrap_err();
        assert!(matches!(err, SourceError::Unreadable { .. }));
        assert!(err.to_string().contains("/nonexistent/fw.ino"));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ho_relay2.ino");
        std::fs::write(&path, SKETCH).unwrap();
        let info = MetadataReader::new(&path).read().unwrap();
        assert_eq!(info.storage_path(), "firmware/hoRelay2/hoRelay2_v1.2.2.bin");
    }

    #[test]
    fn empty_value_is_invalid() {
        let src = "const char* firmwareVersion = \"\";\nconst char* deviceModel = \"hoRelay2\";";
        let err = MetadataReader::new("x.ino").parse(src).unwrap_err();
        assert!(matches!(err, SourceError::Invalid { .. }));
    }
}
