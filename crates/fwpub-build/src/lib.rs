//! Firmware compilation.
//!
//! [`Builder`] runs the board toolchain (`arduino-cli compile`) with a fixed
//! [`TargetDescriptor`], streaming the compiler's progress to the terminal,
//! then picks the single application image out of the output directory.

pub mod builder;
pub mod discover;
pub mod error;
pub mod target;

pub use builder::{Builder, COMPILER_TOOL};
pub use discover::find_artifact;
pub use error::{BuildError, BuildResult};
pub use target::TargetDescriptor;
