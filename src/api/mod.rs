//! Chat server protocol surface used by background tasks.
//!
//! [`ChatClient`] is the seam between the UI core and the network. The
//! production implementation is [`client::HttpChatClient`]; tests use a
//! scripted fake.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::users::{ChannelId, UserId, UserInfo};

pub use client::HttpChatClient;

/// A posted message as echoed back by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub id: String,
    pub channel_id: ChannelId,
    pub user_id: UserId,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePostRequest<'a> {
    pub channel_id: &'a ChannelId,
    pub message: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddMemberRequest<'a> {
    pub user_id: &'a UserId,
}

#[derive(Debug)]
pub enum ApiError {
    /// The request never produced a response.
    Transport(reqwest::Error),
    /// The server answered with a non-success status.
    Status { status: u16, body: String },
    /// The requested entity does not exist.
    NotFound(String),
    /// The response body could not be decoded.
    Decode(String),
    /// The configured server URL cannot carry API paths.
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_)) || matches!(self, ApiError::Status { status: 404, .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(err) => write!(f, "Request failed: {err}"),
            ApiError::Status { status, body } if body.is_empty() => {
                write!(f, "Server returned status {status}")
            }
            ApiError::Status { status, body } => {
                write!(f, "Server returned status {status}: {body}")
            }
            ApiError::NotFound(what) => write!(f, "Not found: {what}"),
            ApiError::Decode(detail) => write!(f, "Malformed server response: {detail}"),
            ApiError::InvalidUrl(base) => write!(f, "Invalid server URL: {base}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err)
        }
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn get_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserInfo>, ApiError>;

    async fn get_user_by_username(&self, username: &str) -> Result<UserInfo, ApiError>;

    async fn add_channel_member(&self, channel: &ChannelId, user: &UserId) -> Result<(), ApiError>;

    async fn create_post(&self, channel: &ChannelId, message: &str) -> Result<Post, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_covers_404_status() {
        assert!(ApiError::NotFound("user".into()).is_not_found());
        assert!(ApiError::Status {
            status: 404,
            body: String::new()
        }
        .is_not_found());
        assert!(!ApiError::Status {
            status: 500,
            body: "oops".into()
        }
        .is_not_found());
    }

    #[test]
    fn status_error_message_includes_body() {
        let err = ApiError::Status {
            status: 403,
            body: "forbidden".into(),
        };
        assert_eq!(err.to_string(), "Server returned status 403: forbidden");
    }

    #[test]
    fn create_post_request_serializes_wire_names() {
        let channel = ChannelId("c1".into());
        let body = serde_json::to_value(CreatePostRequest {
            channel_id: &channel,
            message: "hi",
        })
        .expect("serialize");
        assert_eq!(body, serde_json::json!({"channel_id": "c1", "message": "hi"}));
    }
}
