use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use fwpub_exec::{CommandRunner, Invocation};
use fwpub_types::{Artifact, ArtifactDigest, FirmwareInfo};
use tracing::info;

use crate::discover::find_artifact;
use crate::error::{BuildError, BuildResult};
use crate::target::TargetDescriptor;

/// Tool name of the board toolchain.
pub const COMPILER_TOOL: &str = "arduino-cli";

/// Compiles the firmware sketch into a binary artifact.
pub struct Builder {
    runner: Arc<dyn CommandRunner>,
    compiler: PathBuf,
    sketch_dir: PathBuf,
    output_dir: PathBuf,
    target: Option<TargetDescriptor>,
}

impl Builder {
    /// `compiler` is the resolved path of the toolchain executable.
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        compiler: impl Into<PathBuf>,
        sketch_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            compiler: compiler.into(),
            sketch_dir: sketch_dir.into(),
            output_dir: output_dir.into(),
            target: None,
        }
    }

    /// Override the target descriptor (default: per-model descriptor).
    pub fn with_target(mut self, target: TargetDescriptor) -> Self {
        self.target = Some(target);
        self
    }

    /// The compiler invocation for `model`.
    pub fn invocation(&self, model: &str) -> Invocation {
        let target = self
            .target
            .clone()
            .unwrap_or_else(|| TargetDescriptor::for_model(model));
        Invocation::new(&self.compiler)
            .args(["compile", "--fqbn"])
            .arg(target.fqbn())
            .arg("--output-dir")
            .arg(self.output_dir.to_string_lossy())
            .arg(self.sketch_dir.to_string_lossy())
            .inherit_output()
    }

    /// Compile and return the artifact.
    ///
    /// The compiler's output streams straight to the terminal while it runs.
    pub fn build(&self, info: &FirmwareInfo) -> BuildResult<Artifact> {
        fs::create_dir_all(&self.output_dir).map_err(|source| BuildError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let invocation = self.invocation(&info.model);
        info!(model = %info.model, command = %invocation.display(), "compiling firmware");

        let output = self.runner.run(&invocation)?;
        if !output.is_success() {
            return Err(BuildError::CompileFailed {
                status: output.status_text(),
            });
        }

        let path = find_artifact(&self.output_dir)?;
        let bytes = fs::read(&path).map_err(|source| BuildError::ArtifactUnreadable {
            path: path.clone(),
            source,
        })?;

        let artifact = Artifact {
            size_bytes: bytes.len() as u64,
            digest: ArtifactDigest::from_bytes(&bytes),
            local_path: path,
        };
        info!(
            path = %artifact.local_path.display(),
            size = artifact.size_bytes,
            digest = %artifact.digest.short_hex(),
            "build complete"
        );
        Ok(artifact)
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("compiler", &self.compiler)
            .field("sketch_dir", &self.sketch_dir)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwpub_exec::{CommandOutput, OutputMode, ScriptedRunner};

    fn info() -> FirmwareInfo {
        FirmwareInfo::new("hoRelay2", "1.2.2").unwrap()
    }

    /// A compiler that writes the given files into `--output-dir`.
    fn compiler_writing(files: &'static [&'static str]) -> ScriptedRunner {
        ScriptedRunner::new().respond_with("arduino-cli", &["compile"], move |inv| {
            let pos = inv.args.iter().position(|a| a == "--output-dir").unwrap();
            let out = PathBuf::from(&inv.args[pos + 1]);
            for f in files {
                fs::write(out.join(f), vec![0u8; 1536]).unwrap();
            }
            Ok(CommandOutput::success())
        })
    }

    #[test]
    fn builds_single_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("build");
        let runner = Arc::new(compiler_writing(&["ho_relay2.ino.bin", "ho_relay2.ino.bootloader.bin"]));
        let builder = Builder::new(runner.clone(), "arduino-cli", dir.path(), &out);

        let artifact = builder.build(&info()).unwrap();
        assert_eq!(artifact.local_path, out.join("ho_relay2.ino.bin"));
        assert_eq!(artifact.size_bytes, 1536);
        assert_eq!(artifact.digest, ArtifactDigest::from_bytes(&[0u8; 1536]));

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].output, OutputMode::Inherit);
        assert_eq!(calls[0].args[0], "compile");
        assert!(calls[0].args[2].starts_with("esp32:esp32:esp32c3:"));
    }

    #[test]
    fn creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("build");
        let runner = Arc::new(compiler_writing(&["fw.ino.bin"]));
        Builder::new(runner, "arduino-cli", dir.path(), &out)
            .build(&info())
            .unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn compiler_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new().respond(
            "arduino-cli",
            &["compile"],
            CommandOutput::failure(1, ""),
        ));
        let err = Builder::new(runner, "arduino-cli", dir.path(), dir.path().join("build"))
            .build(&info())
            .unwrap_err();
        assert!(matches!(err, BuildError::CompileFailed { .. }));
        assert!(err.to_string().contains("exit code 1"));
    }

    #[test]
    fn two_images_is_build_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(compiler_writing(&["a.bin", "b.bin"]));
        let err = Builder::new(runner, "arduino-cli", dir.path(), dir.path().join("build"))
            .build(&info())
            .unwrap_err();
        assert!(matches!(err, BuildError::AmbiguousArtifact { .. }));
    }

    #[test]
    fn missing_compiler_is_build_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new());
        let err = Builder::new(runner, "arduino-cli", dir.path(), dir.path().join("build"))
            .build(&info())
            .unwrap_err();
        assert!(matches!(err, BuildError::Compiler(_)));
    }

    #[test]
    fn custom_target() {
        let runner: Arc<dyn CommandRunner> = Arc::new(ScriptedRunner::new());
        let builder = Builder::new(runner, "arduino-cli", ".", "build")
            .with_target(TargetDescriptor::new("esp32:esp32:esp32"));
        let inv = builder.invocation("hoRelay2");
        assert_eq!(inv.args, vec!["compile", "--fqbn", "esp32:esp32:esp32", "--output-dir", "build", "."]);
    }
}
