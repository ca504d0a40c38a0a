#[cfg(test)]
use crate::api::{ApiError, ChatClient, Post};
#[cfg(test)]
use crate::core::app::App;
#[cfg(test)]
use crate::core::config::Config;
#[cfg(test)]
use crate::core::tasks::TaskRunner;
#[cfg(test)]
use crate::core::users::{ChannelId, UserId, UserInfo};
#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
pub fn create_test_user(id: &str, username: &str) -> UserInfo {
    UserInfo {
        id: UserId(id.to_string()),
        username: username.to_string(),
        delete_at: 0,
    }
}

/// Calls observed by [`FakeChatClient`], in the order they were made.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    UsersByIds(Vec<UserId>),
    UserByUsername(String),
    AddMember { channel: ChannelId, user: UserId },
    CreatePost { channel: ChannelId, message: String },
}

/// In-memory server: knows a fixed set of users and echoes posts back.
#[cfg(test)]
#[derive(Default)]
pub struct FakeChatClient {
    users: HashMap<UserId, UserInfo>,
    fail_posts: bool,
    calls: Mutex<Vec<FakeCall>>,
}

#[cfg(test)]
impl FakeChatClient {
    pub fn with_users(users: Vec<UserInfo>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
            ..Self::default()
        }
    }

    pub fn failing_posts(mut self) -> Self {
        self.fail_posts = true;
        self
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: FakeCall) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[cfg(test)]
#[async_trait]
impl ChatClient for FakeChatClient {
    async fn get_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserInfo>, ApiError> {
        self.record(FakeCall::UsersByIds(ids.to_vec()));
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).cloned())
            .collect())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<UserInfo, ApiError> {
        self.record(FakeCall::UserByUsername(username.to_string()));
        self.users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("user {username}")))
    }

    async fn add_channel_member(&self, channel: &ChannelId, user: &UserId) -> Result<(), ApiError> {
        self.record(FakeCall::AddMember {
            channel: channel.clone(),
            user: user.clone(),
        });
        Ok(())
    }

    async fn create_post(&self, channel: &ChannelId, message: &str) -> Result<Post, ApiError> {
        self.record(FakeCall::CreatePost {
            channel: channel.clone(),
            message: message.to_string(),
        });
        if self.fail_posts {
            return Err(ApiError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(Post {
            id: "post-1".to_string(),
            channel_id: channel.clone(),
            user_id: UserId("me".to_string()),
            message: message.to_string(),
        })
    }
}

/// App wired to `client` with channel `town-square` selected. Must be called
/// inside a Tokio runtime since it starts the task queue.
#[cfg(test)]
pub fn create_test_app(client: Arc<FakeChatClient>) -> (App, TaskRunner<App>) {
    let config = Config {
        channel_id: Some("town-square".to_string()),
        ..Config::default()
    };
    let runner = TaskRunner::spawn(config.task_workers);
    let app = App::new(&config, client, runner.scheduler());
    (app, runner)
}
