//! Terminal [`Operator`].

use std::io::{self, BufRead, Write};

use colored::Colorize;
use fwpub_types::{Operator, Tone};

const RULE_WIDTH: usize = 50;

/// Writes to stdout and reads answers from stdin.
#[derive(Debug, Default)]
pub struct ConsoleOperator;

impl ConsoleOperator {
    pub fn new() -> Self {
        Self
    }
}

/// Text of a message as printed, before coloring.
fn decorate(tone: Tone, message: &str) -> String {
    match tone {
        Tone::Success => format!("✓ {message}"),
        Tone::Warning => format!("⚠ {message}"),
        Tone::Error => format!("✗ {message}"),
        Tone::Plain | Tone::Detail | Tone::Progress => message.to_string(),
    }
}

impl Operator for ConsoleOperator {
    fn header(&self, title: &str) {
        let rule = "=".repeat(RULE_WIDTH);
        println!();
        println!("{}", rule.cyan());
        println!("{}", title.cyan().bold());
        println!("{}", rule.cyan());
    }

    fn say(&self, tone: Tone, message: &str) {
        let text = decorate(tone, message);
        match tone {
            Tone::Plain => println!("{text}"),
            Tone::Detail => println!("{}", text.dimmed()),
            Tone::Progress => println!("{}", text.yellow()),
            Tone::Success => println!("{}", text.green().bold()),
            Tone::Warning => println!("{}", text.yellow()),
            Tone::Error => eprintln!("{}", text.red().bold()),
        }
    }

    fn ask(&self, question: &str) -> io::Result<String> {
        print!("{question}");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tones_carry_symbols() {
        assert_eq!(decorate(Tone::Success, "done"), "✓ done");
        assert_eq!(decorate(Tone::Warning, "slow"), "⚠ slow");
        assert_eq!(decorate(Tone::Error, "broken"), "✗ broken");
        assert_eq!(decorate(Tone::Detail, "path"), "path");
    }
}
