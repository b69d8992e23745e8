//! External process plumbing for fwpub.
//!
//! The publisher shells out to a compiler, a release tool, a storage tool,
//! and a script runtime. All of them go through the [`CommandRunner`] trait
//! so the fallback logic above can be tested without any of those tools
//! installed:
//!
//! - [`SystemRunner`] -- spawns real processes
//! - [`ScriptedRunner`] -- records invocations and replays canned outputs
//!
//! [`ToolLocator`] resolves a tool name to an executable path, checking
//! well-known install locations before `PATH`.

pub mod error;
pub mod invocation;
pub mod locator;
pub mod runner;
pub mod scripted;

pub use error::{ExecError, ExecResult};
pub use invocation::{CommandOutput, Invocation, OutputMode};
pub use locator::ToolLocator;
pub use runner::{CommandRunner, SystemRunner};
pub use scripted::ScriptedRunner;
