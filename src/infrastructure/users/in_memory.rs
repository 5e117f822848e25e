//! Process-local user directory.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::user::{User, UserDirectory, UserDirectoryError};

/// A user directory kept in memory for the life of the process.
///
/// Unknown usernames are created on first sight with the next sequential id,
/// starting at 1.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, i64>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users seen so far.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_or_create(&self, username: &str) -> Result<User, UserDirectoryError> {
        if username.is_empty() {
            return Err(UserDirectoryError::EmptyUsername);
        }

        if let Some(id) = self.users.read().await.get(username) {
            return Ok(User::Authenticated {
                id: *id,
                username: username.to_string(),
            });
        }

        let mut users = self.users.write().await;
        // Another request may have created it between the two locks.
        let next_id = users.len() as i64 + 1;
        let id = *users.entry(username.to_string()).or_insert_with(|| {
            info!(username, id = next_id, "Created remote user");
            next_id
        });

        Ok(User::Authenticated {
            id,
            username: username.to_string(),
        })
    }
}
