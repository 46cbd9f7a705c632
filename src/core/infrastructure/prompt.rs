//! Interactive confirmation used before destructive operations.

use crate::core::domain::error::PrtgResult;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Question asked before deleting an object.
pub const DELETE_QUESTION: &str = "Would you like to continue?(Y/[N])  ";

/// Asks the operator to confirm an action.
///
/// Deletions take the prompt as a parameter so tests and non-interactive
/// callers can answer without a terminal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    /// Returns `true` only on an affirmative answer.
    async fn confirm(&self, question: &str) -> PrtgResult<bool>;
}

/// Reads the answer from standard input.
///
/// Re-asks until the answer is `Y` or `N` (case-insensitive); an empty line
/// counts as `N`, and so does end of input.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

#[async_trait]
impl ConfirmPrompt for StdinPrompt {
    async fn confirm(&self, question: &str) -> PrtgResult<bool> {
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            stdout.write_all(question.as_bytes()).await?;
            stdout.flush().await?;
            let Some(answer) = lines.next_line().await? else {
                return Ok(false);
            };
            if let Some(decision) = parse_answer(&answer) {
                return Ok(decision);
            }
        }
    }
}

/// `Some(true)` for Y, `Some(false)` for N or an empty answer, `None` otherwise.
pub(crate) fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_uppercase().as_str() {
        "Y" => Some(true),
        "" | "N" => Some(false),
        _ => None,
    }
}
