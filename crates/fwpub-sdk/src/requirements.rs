use std::collections::BTreeMap;
use std::path::PathBuf;

use fwpub_build::COMPILER_TOOL;
use fwpub_exec::ToolLocator;
use fwpub_types::{Operator, Tone};
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};

/// An external tool the release may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Requirement {
    pub tool: &'static str,
    /// A missing required tool stops the run.
    pub required: bool,
    /// Install hint for required tools, purpose for optional ones.
    pub note: &'static str,
}

pub const REQUIREMENTS: &[Requirement] = &[
    Requirement {
        tool: COMPILER_TOOL,
        required: true,
        note: "https://arduino.github.io/arduino-cli/",
    },
    Requirement {
        tool: "gh",
        required: false,
        note: "publishes GitHub releases",
    },
    Requirement {
        tool: "gsutil",
        required: false,
        note: "recommended for storage uploads",
    },
    Requirement {
        tool: "node",
        required: false,
        note: "updates the version record through the admin SDK",
    },
];

/// Located tools, by name.
#[derive(Clone, Debug, Default)]
pub struct ToolSet {
    found: BTreeMap<&'static str, PathBuf>,
}

impl ToolSet {
    pub fn get(&self, tool: &str) -> Option<PathBuf> {
        self.found.get(tool).cloned()
    }
}

/// Look up every tool in `requirements`, reporting each one.
///
/// Fails with [`PipelineError::ToolMissing`] after the whole list has been
/// reported if any required tool is absent.
pub fn check_requirements(
    requirements: &[Requirement],
    locator: &ToolLocator,
    operator: &dyn Operator,
) -> PipelineResult<ToolSet> {
    operator.header("Check required tools");
    let mut tools = ToolSet::default();
    let mut missing = Vec::new();

    for req in requirements {
        match locator.locate(req.tool) {
            Some(path) => {
                debug!(tool = req.tool, path = %path.display(), "tool found");
                operator.say(Tone::Success, &format!("{} is installed", req.tool));
                tools.found.insert(req.tool, path);
            }
            None if req.required => {
                operator.say(Tone::Error, &format!("{} is not installed", req.tool));
                operator.say(Tone::Warning, &format!("   Install: {}", req.note));
                missing.push(req.tool.to_string());
            }
            None => {
                operator.say(
                    Tone::Warning,
                    &format!("{} is not installed (optional, {})", req.tool, req.note),
                );
            }
        }
    }

    if missing.is_empty() {
        Ok(tools)
    } else {
        Err(PipelineError::ToolMissing(missing))
    }
}
