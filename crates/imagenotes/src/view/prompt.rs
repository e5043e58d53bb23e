//! Blocking user prompts: alerts and yes/no confirmations.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use tracing::warn;

/// Blocking prompts shown to the user.
pub trait Prompter {
    /// Tell the user something went wrong.
    fn alert(&mut self, message: &str);

    /// Ask a yes/no question. Anything but an explicit yes is a no.
    fn confirm(&mut self, question: &str) -> bool;
}

impl<P: Prompter + ?Sized> Prompter for Box<P> {
    fn alert(&mut self, message: &str) {
        (**self).alert(message);
    }

    fn confirm(&mut self, question: &str) -> bool {
        (**self).confirm(question)
    }
}

/// Prompts on a terminal.
#[derive(Debug)]
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stderr> {
    /// Read answers from stdin and write prompts to stderr.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    /// Prompt on arbitrary streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn alert(&mut self, message: &str) {
        if let Err(e) = writeln!(self.output, "{message}") {
            warn!("Failed to show alert: {}", e);
        }
    }

    fn confirm(&mut self, question: &str) -> bool {
        if write!(self.output, "{question} [y/N] ")
            .and_then(|()| self.output.flush())
            .is_err()
        {
            return false;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }
}

/// Confirms everything; alerts go to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn alert(&mut self, message: &str) {
        warn!("{}", message);
    }

    fn confirm(&mut self, _question: &str) -> bool {
        true
    }
}

/// Answers confirmations from a queue and records every prompt.
///
/// Once the queue runs out, confirmations are declined.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<bool>,
    /// Alerts shown so far.
    pub alerts: Vec<String>,
    /// Questions asked so far.
    pub questions: Vec<String>,
}

impl ScriptedPrompter {
    /// Answer confirmations with `answers`, in order.
    #[must_use]
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn confirm(&mut self, question: &str) -> bool {
        self.questions.push(question.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}
