//! Rehabilitation plan consultation.
//!
//! A free-text description goes to the consultation service; the reply is
//! turned into exactly one assistant message. The transcript is kept per
//! user in the local cache.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::{ChatMessage, ConsultResponse, PlannedExercise};
use crate::store::user_data::{load_json, save_json, Dataset, UserDataRepository};
use crate::store::StoreError;

pub const GREETING: &str = "Hello! I'm your AI Physiotherapist. Describe your pain or goal, and I'll generate a professional 7-Day Rehabilitation Plan for you.";
pub const NO_PLAN_REPLY: &str = "I couldn't generate a plan. Please try again.";
pub const CONNECTION_ERROR_REPLY: &str = "Connection Error.";

#[derive(Error, Debug)]
pub enum ConsultError {
    #[error("Cannot reach consultation service at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Consultation service error ({status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Unreadable consultation response: {0}")]
    ResponseParsing(String),
}

pub trait ConsultClient {
    fn consult(&self, message: &str) -> Result<ConsultResponse, ConsultError>;
}

#[derive(Serialize)]
struct ConsultRequest<'a> {
    message: &'a str,
}

/// Blocking client for `POST /api/physio/consult`.
pub struct HttpConsultClient {
    endpoint: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpConsultClient {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, ConsultError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ConsultError::HttpClient(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConsultError> {
        Self::new(&config.endpoints().consult, config.http_timeout_secs)
    }
}

impl ConsultClient for HttpConsultClient {
    fn consult(&self, message: &str) -> Result<ConsultResponse, ConsultError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ConsultRequest { message })
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ConsultError::Connection(self.endpoint.clone())
                } else if e.is_timeout() {
                    ConsultError::Timeout(self.timeout_secs)
                } else {
                    ConsultError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return error_reply(status.as_u16(), body);
        }

        response
            .json::<ConsultResponse>()
            .map_err(|e| ConsultError::ResponseParsing(e.to_string()))
    }
}

/// A non-2xx answer whose body is a JSON object is still a reply (usually
/// `{detail}`, so no plan). Anything else is a service error.
fn error_reply(status: u16, body: String) -> Result<ConsultResponse, ConsultError> {
    let parsed = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .filter(serde_json::Value::is_object)
        .and_then(|value| serde_json::from_value::<ConsultResponse>(value).ok());

    match parsed {
        Some(reply) => {
            tracing::warn!(status, body = %body, "Consultation service returned an error body");
            Ok(reply)
        }
        None => Err(ConsultError::Service { status, body }),
    }
}

/// Reply message for a consultation result.
///
/// A reply without a plan gets the retry prompt; failing to get a reply at
/// all collapses to the connection error text.
pub fn reply_for(result: Result<ConsultResponse, ConsultError>) -> ChatMessage {
    match result {
        Ok(ConsultResponse {
            diagnosis_note,
            weekly_plan: Some(plan),
            recovery_tips,
        }) => ChatMessage::weekly_plan(diagnosis_note, plan, recovery_tips),
        Ok(_) => ChatMessage::ai(NO_PLAN_REPLY),
        Err(e) => {
            tracing::warn!(error = %e, "Plan consultation failed");
            ChatMessage::ai(CONNECTION_ERROR_REPLY)
        }
    }
}

/// A user's consultation transcript.
pub struct PlanConversation {
    repo: Arc<dyn UserDataRepository>,
    user_key: String,
    messages: Vec<ChatMessage>,
}

impl PlanConversation {
    /// Load the transcript, or start one with the greeting.
    pub fn load(repo: Arc<dyn UserDataRepository>, user_key: &str) -> Result<Self, StoreError> {
        let messages = load_json::<Vec<ChatMessage>>(repo.as_ref(), user_key, Dataset::PlanChat)?
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| vec![ChatMessage::ai(GREETING)]);
        Ok(Self {
            repo,
            user_key: user_key.to_string(),
            messages,
        })
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Send one user message and record the single reply. Blank input is
    /// ignored and returns None.
    pub fn send(&mut self, client: &dyn ConsultClient, input: &str) -> Result<Option<&ChatMessage>, StoreError> {
        let text = input.trim();
        if text.is_empty() {
            return Ok(None);
        }

        self.messages.push(ChatMessage::user(text));
        let reply = reply_for(client.consult(text));
        self.messages.push(reply);
        self.persist()?;
        Ok(self.messages.last())
    }

    /// Every exercise of every plan in the transcript, in order.
    pub fn exercises(&self) -> Vec<&PlannedExercise> {
        self.messages
            .iter()
            .filter_map(|m| m.plan.as_ref())
            .flat_map(|plan| plan.iter().flat_map(|day| day.exercises.iter()))
            .collect()
    }

    fn persist(&self) -> Result<(), StoreError> {
        save_json(self.repo.as_ref(), &self.user_key, Dataset::PlanChat, &self.messages)
    }
}
