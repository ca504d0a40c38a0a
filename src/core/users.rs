//! Known users, keyed by server id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user record as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub username: String,
    /// Milliseconds since the epoch; zero for active accounts.
    #[serde(default)]
    pub delete_at: i64,
}

impl UserInfo {
    pub fn is_deleted(&self) -> bool {
        self.delete_at > 0
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum UsernameLookup<'a> {
    Found(&'a UserInfo),
    Ambiguous(usize),
    Unknown,
}

#[derive(Debug, Clone, Default)]
pub struct UserTable {
    users: HashMap<UserId, UserInfo>,
}

impl UserTable {
    pub fn insert(&mut self, user: UserInfo) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn get(&self, id: &UserId) -> Option<&UserInfo> {
        self.users.get(id)
    }

    /// Ids from `ids` not yet in the table, deduplicated and sorted.
    pub fn missing<I>(&self, ids: I) -> Vec<UserId>
    where
        I: IntoIterator<Item = UserId>,
    {
        let mut missing: Vec<UserId> = ids
            .into_iter()
            .filter(|id| !self.users.contains_key(id))
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }

    /// Exact username match first, then a case-insensitive one. A leading
    /// `@` is ignored.
    pub fn find_by_username(&self, username: &str) -> UsernameLookup<'_> {
        let wanted = username.trim_start_matches('@');
        if let Some(user) = self.users.values().find(|u| u.username == wanted) {
            return UsernameLookup::Found(user);
        }
        let folded: Vec<&UserInfo> = self
            .users
            .values()
            .filter(|u| u.username.eq_ignore_ascii_case(wanted))
            .collect();
        match folded.as_slice() {
            [] => UsernameLookup::Unknown,
            [user] => UsernameLookup::Found(user),
            many => UsernameLookup::Ambiguous(many.len()),
        }
    }

    /// Usernames of active users starting with `prefix`.
    pub fn usernames_with_prefix(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        let mut names: Vec<String> = self
            .users
            .values()
            .filter(|u| !u.is_deleted() && u.username.to_lowercase().starts_with(&prefix))
            .map(|u| u.username.clone())
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::create_test_user;

    #[test]
    fn user_info_parses_server_json() {
        let json = r#"{
            "id": "u1",
            "username": "ada",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "delete_at": 0,
            "roles": "system_user"
        }"#;
        let user: UserInfo = serde_json::from_str(json).expect("parse user");
        assert_eq!(user.id, UserId("u1".into()));
        assert_eq!(user.username, "ada");
        assert!(!user.is_deleted());
    }

    #[test]
    fn missing_skips_known_and_duplicates() {
        let mut table = UserTable::default();
        table.insert(create_test_user("u1", "ada"));
        let missing = table.missing(
            ["u2", "u1", "u2", "u0"]
                .into_iter()
                .map(|id| UserId(id.to_string())),
        );
        assert_eq!(missing, vec![UserId("u0".into()), UserId("u2".into())]);
    }

    #[test]
    fn username_lookup_prefers_exact_match() {
        let mut table = UserTable::default();
        table.insert(create_test_user("u1", "Bob"));
        table.insert(create_test_user("u2", "bob"));
        table.insert(create_test_user("u3", "BOB"));

        assert_eq!(
            table.find_by_username("@bob"),
            UsernameLookup::Found(table.get(&UserId("u2".into())).unwrap())
        );
        assert_eq!(table.find_by_username("bOb"), UsernameLookup::Ambiguous(3));
        assert_eq!(table.find_by_username("carol"), UsernameLookup::Unknown);
    }

    #[test]
    fn prefix_search_skips_deleted_users() {
        let mut table = UserTable::default();
        table.insert(create_test_user("u1", "alice"));
        table.insert(create_test_user("u2", "alfred"));
        let mut gone = create_test_user("u3", "alma");
        gone.delete_at = 1_700_000_000_000;
        table.insert(gone);

        assert_eq!(table.usernames_with_prefix("Al"), vec!["alfred", "alice"]);
    }
}
