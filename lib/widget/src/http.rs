//! HTTP client for the question-answering endpoint.
//!
//! Wire format: `POST <api_url>` with `{"question": "..."}`; a 2xx response
//! carries `{"answer": "..."}`. Anything else is a failure.

use async_trait::async_trait;
use qa_chat_conversation::{AskEndpoint, AskError};
use qa_chat_core::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

#[derive(Debug, Serialize)]
struct QuestionRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnswerResponse {
    answer: String,
}

/// [`AskEndpoint`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpAskClient {
    client: reqwest::Client,
    url: String,
}

impl HttpAskClient {
    /// Creates a client for `url`. Requests never time out unless `timeout` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, AskError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| AskError::Transport {
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AskEndpoint for HttpAskClient {
    #[instrument(skip(self, question), fields(url = %self.url))]
    async fn ask(&self, question: &str) -> std::result::Result<String, AskError> {
        let response = self
            .client
            .post(&self.url)
            .json(&QuestionRequest { question })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, timeout = e.is_timeout(), "failed to reach endpoint");
                AskError::Transport {
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "endpoint returned error");
            return Err(AskError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AnswerResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "failed to parse endpoint response");
            AskError::MalformedResponse {
                reason: e.to_string(),
            }
        })?;

        tracing::debug!(answer_len = parsed.answer.len(), "endpoint answered");
        Ok(parsed.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        format!("http://{addr}/qa")
    }

    #[tokio::test]
    async fn posts_question_and_returns_answer() {
        let url = serve(Router::new().route(
            "/qa",
            post(|Json(body): Json<Value>| async move {
                let question = body["question"].as_str().unwrap_or_default().to_string();
                Json(json!({ "answer": format!("you asked: {question}"), "sources": [] }))
            }),
        ))
        .await;
        let client = HttpAskClient::new(url, None).expect("client");

        let answer = client.ask("What is X?").await.expect("answer");

        assert_eq!(answer, "you asked: What is X?");
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let url = serve(Router::new().route(
            "/qa",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "server error") }),
        ))
        .await;
        let client = HttpAskClient::new(url, None).expect("client");

        let err = client.ask("foo").await.unwrap_err();

        assert_eq!(
            err,
            AskError::Status {
                status: 500,
                body: "server error".to_string()
            }
        );
        assert_eq!(err.to_string(), "500: server error");
    }

    #[tokio::test]
    async fn body_without_answer_is_malformed() {
        let url = serve(Router::new().route(
            "/qa",
            post(|| async { Json(json!({ "result": "nope" })) }),
        ))
        .await;
        let client = HttpAskClient::new(url, None).expect("client");

        let err = client.ask("foo").await.unwrap_err();

        assert!(matches!(err, AskError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        let client =
            HttpAskClient::new(format!("http://{addr}/qa"), Some(Duration::from_secs(2)))
                .expect("client");

        let err = client.ask("foo").await.unwrap_err();

        assert!(matches!(err, AskError::Transport { .. }));
    }
}
