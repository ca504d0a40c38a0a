use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{AddMemberRequest, ApiError, ChatClient, CreatePostRequest, Post};
use crate::core::users::{ChannelId, UserId, UserInfo};

/// REST client for a Mattermost-compatible v4 API.
#[derive(Clone)]
pub struct HttpChatClient {
    http: Client,
    base_url: String,
    token: String,
}

impl HttpChatClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// `{base}/api/v4/` followed by `segments`, each escaped as a single
    /// path component.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let invalid = || ApiError::InvalidUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["api", "v4"])
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    async fn check(response: Response, what: &str) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(what.to_string()));
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ApiError> {
        let response = Self::check(response, what).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn get_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserInfo>, ApiError> {
        debug!(count = ids.len(), "fetching users by id");
        let response = self
            .authorized(self.http.post(self.endpoint(&["users", "ids"])?))
            .json(ids)
            .send()
            .await?;
        Self::decode(response, "users").await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<UserInfo, ApiError> {
        // Dot segments would be dropped from the path, leaving a different endpoint.
        if username.is_empty() || username == "." || username == ".." {
            return Err(ApiError::NotFound(format!("user {username}")));
        }
        let url = self.endpoint(&["users", "username", username])?;
        let response = self.authorized(self.http.get(url)).send().await?;
        Self::decode(response, &format!("user {username}")).await
    }

    async fn add_channel_member(&self, channel: &ChannelId, user: &UserId) -> Result<(), ApiError> {
        let response = self
            .authorized(
                self.http
                    .post(self.endpoint(&["channels", channel.0.as_str(), "members"])?),
            )
            .json(&AddMemberRequest { user_id: user })
            .send()
            .await?;
        Self::check(response, &format!("channel {channel}")).await?;
        Ok(())
    }

    async fn create_post(&self, channel: &ChannelId, message: &str) -> Result<Post, ApiError> {
        let response = self
            .authorized(self.http.post(self.endpoint(&["posts"])?))
            .json(&CreatePostRequest {
                channel_id: channel,
                message,
            })
            .send()
            .await?;
        Self::decode(response, &format!("channel {channel}")).await
    }
}
