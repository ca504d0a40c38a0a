//! Application state shared by the UI loop and background task completions.
//!
//! The UI loop owns the single [`App`]. Background tasks never touch it
//! directly; their completions are queued and applied by the loop, so every
//! mutation here happens on one thread, one at a time.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use tracing::{debug, info};

use crate::api::{ChatClient, Post};
use crate::commands::{self, CommandResult};
use crate::core::config::Config;
use crate::core::editing::EditingSession;
use crate::core::message::{ClientMessage, ClientMessageKind, ClientMessages};
use crate::core::tasks::{TaskErrorSink, TaskPriority, TaskScheduler};
use crate::core::users::{ChannelId, UserId, UserInfo, UserTable, UsernameLookup};
use crate::utils::editor::ExternalEditOutcome;


/// How many sent posts are kept for display.
const RECENT_POST_LIMIT: usize = 100;

pub struct App {
    pub session: EditingSession,
    pub users: UserTable,
    pub current_channel: Option<ChannelId>,
    pub exit_requested: bool,
    messages: ClientMessages,
    recent_posts: VecDeque<Post>,
    client: Arc<dyn ChatClient>,
    tasks: TaskScheduler<App>,
}

impl App {
    pub fn new(config: &Config, client: Arc<dyn ChatClient>, tasks: TaskScheduler<App>) -> Self {
        Self {
            session: EditingSession::new(config.editor_settings()),
            users: UserTable::default(),
            current_channel: config.channel_id.clone().map(ChannelId),
            exit_requested: false,
            messages: ClientMessages::with_capacity(config.max_client_messages),
            recent_posts: VecDeque::new(),
            client,
            tasks,
        }
    }

    pub fn client_messages(&self) -> &ClientMessages {
        &self.messages
    }

    pub fn recent_posts(&self) -> impl DoubleEndedIterator<Item = &Post> {
        self.recent_posts.iter()
    }

    pub fn post_info(&mut self, text: impl Into<String>) {
        self.messages
            .push(ClientMessage::new(ClientMessageKind::Info, text));
    }

    pub fn post_error(&mut self, text: impl Into<String>) {
        self.messages
            .push(ClientMessage::new(ClientMessageKind::Error, text));
    }

    pub fn handle_paste(&mut self, bytes: &[u8]) {
        self.session.handle_paste(bytes);
    }

    /// Completes the `@mention` before the cursor from known usernames.
    pub fn complete_mention(&mut self) -> bool {
        let users = &self.users;
        self.session
            .complete_mention(|prefix| users.usernames_with_prefix(prefix))
    }

    /// Takes the draft and either runs it as a command or sends it.
    pub fn submit_input(&mut self) {
        let Some(text) = self.session.take_submission() else {
            return;
        };
        match commands::process_input(self, &text) {
            CommandResult::Continue => {}
            CommandResult::ProcessAsMessage(message) => self.send_message(message),
        }
    }

    pub fn send_message(&mut self, message: String) {
        let Some(channel) = self.current_channel.clone() else {
            self.post_error("No channel selected; set channel_id or pass --channel");
            return;
        };
        let client = Arc::clone(&self.client);
        self.tasks.schedule(
            "send message",
            TaskPriority::Normal,
            move || async move { client.create_post(&channel, &message).await },
            |app: &mut App, post: Post| app.record_post(post),
        );
    }

    fn record_post(&mut self, post: Post) {
        let author = post.user_id.clone();
        if self.recent_posts.len() == RECENT_POST_LIMIT {
            self.recent_posts.pop_front();
        }
        self.recent_posts.push_back(post);
        self.handle_new_users([author]);
    }

    /// Fetches any of `ids` the user table does not know yet. Runs ahead of
    /// queued normal work since the ids are usually about to be displayed.
    pub fn handle_new_users<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = UserId>,
    {
        let missing = self.users.missing(ids);
        if missing.is_empty() {
            return;
        }
        debug!(count = missing.len(), "resolving unknown users");
        let client = Arc::clone(&self.client);
        self.tasks.schedule(
            "fetch users",
            TaskPriority::Preemptive,
            move || async move { client.get_users_by_ids(&missing).await },
            |app: &mut App, users: Vec<UserInfo>| {
                for user in users {
                    app.users.insert(user);
                }
            },
        );
    }

    /// Adds `username` to the current channel, asking the server about the
    /// name when the local table does not know it.
    pub fn add_user_to_current_channel(&mut self, username: &str) {
        let username = username.trim().trim_start_matches('@').to_string();
        if username.is_empty() {
            self.post_error("Usage: /add-user <username>");
            return;
        }
        let Some(channel) = self.current_channel.clone() else {
            self.post_error("No channel selected");
            return;
        };

        match self.users.find_by_username(&username) {
            UsernameLookup::Found(user) => {
                let user = user.clone();
                self.schedule_add_member(channel, user);
            }
            UsernameLookup::Ambiguous(count) => {
                self.post_error(format!(
                    "Username {username} is ambiguous ({count} matching users)"
                ));
            }
            UsernameLookup::Unknown => {
                let client = Arc::clone(&self.client);
                let lookup_name = username.clone();
                self.tasks.schedule(
                    "look up user",
                    TaskPriority::Preemptive,
                    move || async move {
                        match client.get_user_by_username(&lookup_name).await {
                            Ok(user) => Ok(Some(user)),
                            Err(err) if err.is_not_found() => Ok(None),
                            Err(err) => Err(err),
                        }
                    },
                    move |app: &mut App, found: Option<UserInfo>| match found {
                        Some(user) => {
                            app.users.insert(user.clone());
                            app.schedule_add_member(channel, user);
                        }
                        None => app.post_error(format!("No such user: {username}")),
                    },
                );
            }
        }
    }

    fn schedule_add_member(&mut self, channel: ChannelId, user: UserInfo) {
        let client = Arc::clone(&self.client);
        let user_id = user.id.clone();
        self.tasks.schedule(
            "add channel member",
            TaskPriority::Normal,
            move || async move { client.add_channel_member(&channel, &user_id).await },
            move |app: &mut App, ()| {
                info!(username = %user.username, "added user to channel");
                app.post_info(format!("Added @{} to the channel", user.username));
            },
        );
    }

    /// Applies what came back from the external editor.
    pub fn apply_external_edit(&mut self, result: io::Result<ExternalEditOutcome>) {
        match result {
            Ok(ExternalEditOutcome::Replaced(lines)) => self.session.replace_lines(lines),
            Ok(ExternalEditOutcome::Cancelled { code }) => {
                debug!(?code, "external edit abandoned");
            }
            Ok(ExternalEditOutcome::DecodeFailed(detail)) => {
                self.post_error(format!("Could not decode the edited file as UTF-8: {detail}"));
            }
            Err(err) => self.post_error(format!("Editor error: {err}")),
        }
    }
}

impl TaskErrorSink for App {
    fn report_task_error(&mut self, label: &str, error: &str) {
        self.post_error(format!("Failed to {label}: {error}"));
    }
}
