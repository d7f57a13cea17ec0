use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

pub mod store;

/// Holds the one live session token. Reads reflect whatever a prior process
/// persisted; `set` writes through to disk so the token survives restarts.
pub struct SessionStore {
    path: PathBuf,
    token: Mutex<Option<String>>,
}

impl SessionStore {
    pub fn open_default() -> Self {
        Self::open(store::default_session_path())
    }

    pub fn open(path: PathBuf) -> Self {
        let (token, warning) = store::read_token(&path);
        if let Some(warning) = warning {
            log::warn!("session restore: {warning}");
        }
        Self {
            path,
            token: Mutex::new(token),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.lock().clone()
    }

    pub fn is_present(&self) -> bool {
        self.lock().is_some()
    }

    pub fn set(&self, token: &str) -> io::Result<()> {
        *self.lock() = Some(token.to_string());
        store::write_token(&self.path, token)
    }

    pub fn clear(&self) {
        *self.lock() = None;
        if let Err(err) = store::remove_token(&self.path) {
            log::warn!("failed to remove session file: {err}");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::SessionStore;

    #[test]
    fn set_then_clear_round_trips_through_a_fresh_store() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let path = dir.path().join("session.json");

        let sessions = SessionStore::open(path.clone());
        assert_eq!(sessions.token(), None);

        sessions.set("tok-123").expect("persist should succeed");
        assert_eq!(sessions.token().as_deref(), Some("tok-123"));

        let reopened = SessionStore::open(path.clone());
        assert_eq!(reopened.token().as_deref(), Some("tok-123"));

        reopened.clear();
        assert_eq!(reopened.token(), None);
        assert!(!path.exists());
    }

    #[test]
    fn clear_is_a_no_op_when_nothing_was_persisted() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let sessions = SessionStore::open(dir.path().join("session.json"));
        sessions.clear();
        assert_eq!(sessions.token(), None);
    }
}
