// src/state.rs
use crate::services::storage_service::AvatarStore;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_cookies::Key;

/// Changes to who is signed in, or to what they look like to the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user_id: String },
    SignedOut { user_id: String },
    ProfileUpdated { user_id: String },
}

/// Process-wide publish/subscribe channel for auth events.
#[derive(Debug, Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        let (tx, _rx) = broadcast::channel(64);
        Self { tx }
    }
}

impl AuthEvents {
    pub fn publish(&self, event: AuthEvent) {
        // No subscribers is fine: nobody is listening yet.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub avatar_store: AvatarStore,
    pub cookie_key: Key,
    pub auth_events: AuthEvents,
}

impl axum::extract::FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> SqlitePool {
        state.db_pool.clone()
    }
}

impl axum::extract::FromRef<AppState> for AuthEvents {
    fn from_ref(state: &AppState) -> AuthEvents {
        state.auth_events.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let events = AuthEvents::default();
        // Publishing before anyone subscribes must not panic.
        events.publish(AuthEvent::SignedOut { user_id: "ghost".into() });

        let mut rx = events.subscribe();
        events.publish(AuthEvent::SignedIn { user_id: "u1".into() });
        events.publish(AuthEvent::ProfileUpdated { user_id: "u1".into() });

        assert_eq!(rx.recv().await.unwrap(), AuthEvent::SignedIn { user_id: "u1".into() });
        assert_eq!(rx.recv().await.unwrap(), AuthEvent::ProfileUpdated { user_id: "u1".into() });
    }
}
