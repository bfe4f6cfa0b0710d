//! The remote question-answering endpoint, as seen by the controller.

use crate::error::AskError;
use async_trait::async_trait;

/// Sends one question and waits for its answer.
///
/// Implementations perform a single attempt; the controller never retries.
#[async_trait]
pub trait AskEndpoint: Send + Sync {
    /// Asks `question` and returns the answer text.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-2xx response, an unparsable body, or a
    /// transport failure.
    async fn ask(&self, question: &str) -> Result<String, AskError>;
}
