use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

/// How an operator-facing message should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Plain,
    /// Secondary detail (paths, repository names).
    Detail,
    /// A step is starting.
    Progress,
    Success,
    Warning,
    Error,
}

/// The person running the publish.
///
/// Components report progress and manual-recovery instructions through this
/// trait and ask it questions. The console implementation lives in the
/// binary; tests use [`ScriptedOperator`].
pub trait Operator: Send + Sync {
    /// Start a new section of output.
    fn header(&self, title: &str);

    /// Show a message.
    fn say(&self, tone: Tone, message: &str);

    /// Ask a question and return the trimmed answer (possibly empty).
    fn ask(&self, question: &str) -> io::Result<String>;
}

/// An [`Operator`] that records every message and answers from a script.
///
/// Once the scripted answers run out, every question is answered with an
/// empty string (the operator just pressed Enter).
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: Mutex<VecDeque<String>>,
    transcript: Mutex<Vec<(Tone, String)>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedOperator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue answers, returned in order.
    pub fn with_answers<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let op = Self::default();
        op.answers
            .lock()
            .expect("lock poisoned")
            .extend(answers.into_iter().map(Into::into));
        op
    }

    /// Every message shown so far, headers included as `Tone::Plain`.
    pub fn transcript(&self) -> Vec<(Tone, String)> {
        self.transcript.lock().expect("lock poisoned").clone()
    }

    /// Every question asked so far.
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().expect("lock poisoned").clone()
    }

    /// Returns `true` if any message contains `needle`.
    pub fn saw(&self, needle: &str) -> bool {
        self.transcript
            .lock()
            .expect("lock poisoned")
            .iter()
            .any(|(_, m)| m.contains(needle))
    }
}

impl Operator for ScriptedOperator {
    fn header(&self, title: &str) {
        self.say(Tone::Plain, title);
    }

    fn say(&self, tone: Tone, message: &str) {
        self.transcript
            .lock()
            .expect("lock poisoned")
            .push((tone, message.to_string()));
    }

    fn ask(&self, question: &str) -> io::Result<String> {
        self.questions
            .lock()
            .expect("lock poisoned")
            .push(question.to_string());
        let answer = self
            .answers
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .unwrap_or_default();
        Ok(answer.trim().to_string())
    }
}
