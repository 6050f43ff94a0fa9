use anyhow::Result;
use async_trait::async_trait;
use shared::domain::User;
use storage::Storage;
use tokio::sync::Mutex;

use crate::SessionStore;

#[async_trait]
impl SessionStore for Storage {
    async fn stored_session_id(&self) -> Result<Option<String>> {
        Storage::stored_session_id(self).await
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        Storage::save_user(self, user).await
    }
}

/// Keeps the session in memory only; nothing survives a restart.
#[derive(Default)]
pub struct MemorySessionStore {
    saved: Mutex<Option<User>>,
}

impl MemorySessionStore {
    pub fn with_user(user: User) -> Self {
        Self {
            saved: Mutex::new(Some(user)),
        }
    }

    pub async fn saved_user(&self) -> Option<User> {
        self.saved.lock().await.clone()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn stored_session_id(&self) -> Result<Option<String>> {
        Ok(self
            .saved
            .lock()
            .await
            .as_ref()
            .map(|user| user.session_id.clone())
            .filter(|session_id| !session_id.is_empty()))
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        *self.saved.lock().await = Some(user.clone());
        Ok(())
    }
}
