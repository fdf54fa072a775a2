//! `oauth.start` / `oauth.poll`: a thin state machine around account
//! credential files appearing in the Store.
//!
//! Actually driving a provider's login flow (opening a browser, running
//! the provider's own OAuth dance, writing the resulting credential file)
//! is one of the "individual provider SDK peculiarities" this daemon
//! deliberately treats as a thin collaborator it doesn't implement itself —
//! some out-of-process flow (a provider CLI, a companion browser window)
//! is assumed to perform the login and drop a `<provider>-*.json` file in
//! the auth directory. This module's job is only to hand out a `state`
//! token the caller can poll, and to report `success` once a new account
//! for that provider shows up.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use quotio_core::ProviderKind;
use quotio_store::AuthStore;
use tokio::sync::RwLock;
use ulid::Ulid;

/// How long a session is polled for before it's reported as failed.
const SESSION_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Outcome of polling one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthStatus {
    /// Still waiting for a matching account file to appear.
    Pending,
    /// A new account for this provider was found.
    Success,
    /// The session timed out with no account appearing.
    Error(String),
}

struct Session {
    provider: ProviderKind,
    started_at: DateTime<Utc>,
    known_keys: Vec<String>,
}

/// Tracks in-flight login sessions started by `oauth.start`.
#[derive(Default)]
pub struct OAuthSessions {
    sessions: RwLock<HashMap<String, Session>>,
}

impl OAuthSessions {
    /// Starts a session for `provider`, snapshotting the accounts already
    /// on disk so `poll` can tell a pre-existing account from a freshly
    /// completed login. Returns the session's `state` token.
    pub async fn start(&self, store: &AuthStore, provider: ProviderKind) -> String {
        let known_keys = store
            .list(Some(provider))
            .await
            .map(|accounts| accounts.into_iter().map(|a| a.id).collect())
            .unwrap_or_default();

        let state = Ulid::new().to_string();
        self.sessions.write().await.insert(
            state.clone(),
            Session {
                provider,
                started_at: Utc::now(),
                known_keys,
            },
        );
        state
    }

    /// Polls a session by its `state` token.
    pub async fn poll(&self, store: &AuthStore, state: &str) -> Option<OAuthStatus> {
        let provider = {
            let sessions = self.sessions.read().await;
            let session = sessions.get(state)?;

            if Utc::now() - session.started_at > chrono::Duration::from_std(SESSION_TIMEOUT).unwrap() {
                return Some(OAuthStatus::Error("timed out waiting for login".to_string()));
            }
            session.provider
        };

        let current = store.list(Some(provider)).await.unwrap_or_default();
        let known = &self.sessions.read().await[state].known_keys;
        if current.iter().any(|a| !known.contains(&a.id)) {
            self.sessions.write().await.remove(state);
            return Some(OAuthStatus::Success);
        }

        Some(OAuthStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, AuthStore) {
        let dir = tempfile::tempdir().unwrap();
        (dir, AuthStore::at(dir.path()))
    }

    #[tokio::test]
    async fn poll_is_pending_before_any_account_appears() {
        let (_dir, store) = store();
        let sessions = OAuthSessions::default();
        let state = sessions.start(&store, ProviderKind::Codex).await;

        assert_eq!(sessions.poll(&store, &state).await, Some(OAuthStatus::Pending));
    }

    #[tokio::test]
    async fn poll_succeeds_once_a_new_account_appears() {
        let (_dir, store) = store();
        let sessions = OAuthSessions::default();
        let state = sessions.start(&store, ProviderKind::Codex).await;

        store.write("codex-new", ProviderKind::Codex, |r| r).await.unwrap();

        assert_eq!(sessions.poll(&store, &state).await, Some(OAuthStatus::Success));
        // The session is consumed on success.
        assert_eq!(sessions.poll(&store, &state).await, None);
    }

    #[tokio::test]
    async fn preexisting_accounts_do_not_count_as_success() {
        let (_dir, store) = store();
        store.write("codex-old", ProviderKind::Codex, |r| r).await.unwrap();

        let sessions = OAuthSessions::default();
        let state = sessions.start(&store, ProviderKind::Codex).await;

        assert_eq!(sessions.poll(&store, &state).await, Some(OAuthStatus::Pending));
    }

    #[tokio::test]
    async fn unknown_state_polls_to_none() {
        let (_dir, store) = store();
        let sessions = OAuthSessions::default();
        assert_eq!(sessions.poll(&store, "nope").await, None);
    }
}
