use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Synchronous yes/no boundary between the workflow and the operator.
pub trait OperatorPrompt {
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Only `y` and `yes` proceed; anything else, including EOF, declines.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Prompts on a writer and reads one line from a reader.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> OperatorPrompt for LinePrompt<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.output, "\n{question}").context("failed to write prompt")?;
        self.output.flush().context("failed to flush prompt")?;
        let mut answer = String::new();
        self.input
            .read_line(&mut answer)
            .context("failed to read answer from stdin")?;
        Ok(is_affirmative(&answer))
    }
}
