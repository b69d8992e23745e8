use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

/// Resolves tool names (`arduino-cli`, `gh`) to executable paths.
///
/// Well-known install locations registered for a tool are checked first, in
/// registration order; then each `PATH` directory. On Windows every
/// `PATHEXT` extension is tried as well.
#[derive(Clone, Debug, Default)]
pub struct ToolLocator {
    search_path: Vec<PathBuf>,
    extensions: Vec<String>,
    known: HashMap<String, Vec<PathBuf>>,
}

impl ToolLocator {
    /// A locator over the current process `PATH`, with the platform's
    /// default install locations registered.
    pub fn from_env() -> Self {
        let search_path = env::var_os("PATH")
            .map(|p| env::split_paths(&p).collect())
            .unwrap_or_default();

        let extensions = if cfg!(windows) {
            env::var("PATHEXT")
                .unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string())
                .split(';')
                .filter(|e| !e.is_empty())
                .map(|e| e.to_ascii_lowercase())
                .collect()
        } else {
            Vec::new()
        };

        let mut locator = Self {
            search_path,
            extensions,
            known: HashMap::new(),
        };
        if cfg!(windows) {
            locator.register_windows_defaults();
        }
        locator
    }

    /// A locator that only searches the given directories.
    pub fn with_search_path(paths: Vec<PathBuf>) -> Self {
        Self {
            search_path: paths,
            ..Default::default()
        }
    }

    /// Register a well-known location for `tool`, checked before `PATH`.
    pub fn with_known_location(mut self, tool: &str, path: impl Into<PathBuf>) -> Self {
        self.known
            .entry(tool.to_string())
            .or_default()
            .push(path.into());
        self
    }

    fn register_windows_defaults(&mut self) {
        let mut arduino = vec![
            PathBuf::from(r"C:\Program Files\Arduino CLI\arduino-cli.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Arduino CLI\arduino-cli.exe"),
        ];
        if let Some(local) = env::var_os("LOCALAPPDATA") {
            arduino.push(Path::new(&local).join("Arduino15").join("arduino-cli.exe"));
        }
        if let Some(profile) = env::var_os("USERPROFILE") {
            arduino.push(
                Path::new(&profile)
                    .join("AppData")
                    .join("Local")
                    .join("Programs")
                    .join("Arduino CLI")
                    .join("arduino-cli.exe"),
            );
        }
        self.known.insert("arduino-cli".into(), arduino);
        self.known.insert(
            "gh".into(),
            vec![PathBuf::from(r"C:\Program Files\GitHub CLI\gh.exe")],
        );
    }

    /// Find an executable for `tool`.
    pub fn locate(&self, tool: &str) -> Option<PathBuf> {
        if let Some(found) = self
            .known
            .get(tool)
            .and_then(|paths| paths.iter().find(|p| p.is_file()))
        {
            return Some(found.clone());
        }

        for dir in &self.search_path {
            let candidate = dir.join(tool);
            if candidate.is_file() {
                return Some(candidate);
            }
            for ext in &self.extensions {
                let candidate = dir.join(format!("{tool}{ext}"));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Returns `true` if `tool` can be found.
    pub fn is_available(&self, tool: &str) -> bool {
        self.locate(tool).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_tool_on_search_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("gsutil"), b"").unwrap();
        let locator = ToolLocator::with_search_path(vec![dir.path().to_path_buf()]);
        assert_eq!(locator.locate("gsutil"), Some(dir.path().join("gsutil")));
        assert!(!locator.is_available("gh"));
    }

    #[test]
    fn known_location_beats_path() {
        let on_path = tempfile::tempdir().unwrap();
        let installed = tempfile::tempdir().unwrap();
        fs::write(on_path.path().join("gh"), b"").unwrap();
        let known = installed.path().join("gh.exe");
        fs::write(&known, b"").unwrap();

        let locator = ToolLocator::with_search_path(vec![on_path.path().to_path_buf()])
            .with_known_location("gh", &known);
        assert_eq!(locator.locate("gh"), Some(known));
    }

    #[test]
    fn missing_known_location_falls_back_to_path() {
        let on_path = tempfile::tempdir().unwrap();
        fs::write(on_path.path().join("gh"), b"").unwrap();
        let locator = ToolLocator::with_search_path(vec![on_path.path().to_path_buf()])
            .with_known_location("gh", "/nonexistent/gh");
        assert_eq!(locator.locate("gh"), Some(on_path.path().join("gh")));
    }

    #[test]
    fn directories_are_not_tools() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("node")).unwrap();
        let locator = ToolLocator::with_search_path(vec![dir.path().to_path_buf()]);
        assert!(locator.locate("node").is_none());
    }
}
