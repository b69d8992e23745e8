use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, BuildResult};

/// Images the toolchain writes next to the application that are not
/// themselves flashable over the air.
const AUXILIARY_SUFFIXES: &[&str] = &[".bootloader.bin", ".partitions.bin", ".merged.bin"];

/// Find the single application image directly inside `dir`.
///
/// Subdirectories are not searched. Zero candidates or more than one is an
/// error; the builder never picks one arbitrarily.
pub fn find_artifact(dir: &Path) -> BuildResult<PathBuf> {
    let io_err = |source| BuildError::OutputDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_application_image(&name) && entry.file_type().map_err(io_err)?.is_file() {
            candidates.push(name);
        }
    }
    candidates.sort();

    match candidates.len() {
        0 => Err(BuildError::NoArtifact(dir.to_path_buf())),
        1 => Ok(dir.join(&candidates[0])),
        _ => Err(BuildError::AmbiguousArtifact {
            dir: dir.to_path_buf(),
            names: candidates,
        }),
    }
}

fn is_application_image(name: &str) -> bool {
    name.ends_with(".bin") && !AUXILIARY_SUFFIXES.iter().any(|s| name.ends_with(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"\xe9firmware").unwrap();
    }

    #[test]
    fn single_image_among_auxiliaries() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ho_relay2.ino.bin");
        touch(dir.path(), "ho_relay2.ino.bootloader.bin");
        touch(dir.path(), "ho_relay2.ino.partitions.bin");
        touch(dir.path(), "ho_relay2.ino.merged.bin");
        touch(dir.path(), "ho_relay2.ino.elf");
        touch(dir.path(), "ho_relay2.ino.map");

        let found = find_artifact(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("ho_relay2.ino.bin"));
    }

    #[test]
    fn two_images_is_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.bin");
        touch(dir.path(), "b.bin");
        match find_artifact(dir.path()).unwrap_err() {
            BuildError::AmbiguousArtifact { names, .. } => assert_eq!(names, vec!["a.bin", "b.bin"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_dir_has_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "sketch.ino.elf");
        assert!(matches!(
            find_artifact(dir.path()).unwrap_err(),
            BuildError::NoArtifact(_)
        ));
    }

    #[test]
    fn subdirectories_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ho_relay2.ino.bin");
        fs::create_dir(dir.path().join("release")).unwrap();
        touch(&dir.path().join("release"), "hoRelay2_v1.2.2.bin");
        assert!(find_artifact(dir.path()).is_ok());
    }

    #[test]
    fn directory_named_like_image_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ho_relay2.ino.bin");
        fs::create_dir(dir.path().join("weird.bin")).unwrap();
        assert!(find_artifact(dir.path()).is_ok());
    }
}
