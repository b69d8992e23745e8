use std::io;
use std::sync::Mutex;

use crate::error::{ExecError, ExecResult};
use crate::invocation::{CommandOutput, Invocation};
use crate::runner::CommandRunner;

type Handler = Box<dyn Fn(&Invocation) -> ExecResult<CommandOutput> + Send + Sync>;

struct Rule {
    program: String,
    prefix: Vec<String>,
    handler: Handler,
}

/// A [`CommandRunner`] that replays canned results and records every call.
///
/// Rules match on program name (file stem, so `gh` matches `/usr/bin/gh`)
/// and a leading slice of the arguments; the rule with the longest matching
/// prefix wins. An invocation with no matching rule fails as if the program
/// were not installed.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer matching invocations with a fixed output.
    pub fn respond(self, program: &str, prefix: &[&str], output: CommandOutput) -> Self {
        self.respond_with(program, prefix, move |_| Ok(output.clone()))
    }

    /// Answer matching invocations by calling `handler` (which may also
    /// produce side effects such as writing build outputs).
    pub fn respond_with<F>(mut self, program: &str, prefix: &[&str], handler: F) -> Self
    where
        F: Fn(&Invocation) -> ExecResult<CommandOutput> + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            program: program.to_string(),
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            handler: Box::new(handler),
        });
        self
    }

    /// Every invocation seen so far, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Invocations of one program, in order.
    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|inv| inv.program_name() == program)
            .collect()
    }

    /// Returns `true` if `program` was invoked with arguments starting with `prefix`.
    pub fn was_called(&self, program: &str, prefix: &[&str]) -> bool {
        self.calls_to(program).iter().any(|inv| starts_with(&inv.args, prefix))
    }
}

fn starts_with<S: AsRef<str>>(args: &[String], prefix: &[S]) -> bool {
    args.len() >= prefix.len() && args.iter().zip(prefix).all(|(a, p)| a == p.as_ref())
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> ExecResult<CommandOutput> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push(invocation.clone());

        let name = invocation.program_name();
        let rule = self
            .rules
            .iter()
            .filter(|r| r.program == name && starts_with(&invocation.args, &r.prefix[..]))
            .max_by_key(|r| r.prefix.len());

        match rule {
            Some(rule) => (rule.handler)(invocation),
            None => Err(ExecError::Spawn {
                program: name,
                source: io::Error::new(io::ErrorKind::NotFound, "no scripted response"),
            }),
        }
    }
}

impl std::fmt::Debug for ScriptedRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedRunner")
            .field("rules", &self.rules.len())
            .field("calls", &self.calls.lock().map(|c| c.len()).unwrap_or(0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_prefix_wins() {
        let runner = ScriptedRunner::new()
            .respond("gh", &["release"], CommandOutput::failure(1, "generic"))
            .respond("gh", &["release", "view"], CommandOutput::success());

        let view = Invocation::new("/usr/bin/gh").args(["release", "view", "v1"]);
        assert!(runner.run(&view).unwrap().is_success());

        let create = Invocation::new("gh").args(["release", "create", "v1"]);
        assert_eq!(runner.run(&create).unwrap().stderr, "generic");

        assert_eq!(runner.calls().len(), 2);
        assert!(runner.was_called("gh", &["release", "create"]));
    }

    #[test]
    fn unmatched_is_not_found() {
        let runner = ScriptedRunner::new();
        let err = runner.run(&Invocation::new("gsutil")).unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
        assert_eq!(runner.calls_to("gsutil").len(), 1);
    }

    #[test]
    fn handler_sees_invocation() {
        let runner = ScriptedRunner::new().respond_with("node", &[], |inv| {
            Ok(CommandOutput::success().with_stdout(inv.args.join(",")))
        });
        let out = runner.run(&Invocation::new("node").args(["a.js", "b"])).unwrap();
        assert_eq!(out.stdout, "a.js,b");
    }
}
