use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use shared::DoctorIdentity;
use uuid::Uuid;

use crate::chat::ChatHistory;

/// Per-login state: who is signed in, their chat, and the reports they may
/// download.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub id: Uuid,
    pub identity: DoctorIdentity,
    pub chat: ChatHistory,
    pub expires_at: DateTime<Utc>,
    reports: HashSet<String>,
}

impl SessionContext {
    pub fn new(identity: DoctorIdentity, lifetime: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            chat: ChatHistory::default(),
            expires_at: Utc::now() + lifetime,
            reports: HashSet::new(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn grant_report(&mut self, file_name: impl Into<String>) {
        self.reports.insert(file_name.into());
    }

    pub fn owns_report(&self, file_name: &str) -> bool {
        self.reports.contains(file_name)
    }
}

/// Live sessions. An entry lives as long as the token issued for it and is
/// dropped on logout or once expired.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, SessionContext>>>,
    lifetime: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_lifetime(Duration::hours(24))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            lifetime,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SessionContext>> {
        // A panic while holding the lock leaves plain data behind; keep serving.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn create(&self, identity: DoctorIdentity) -> Uuid {
        let session = SessionContext::new(identity, self.lifetime);
        let id = session.id;
        let mut sessions = self.lock();
        prune_expired(&mut sessions);
        sessions.insert(id, session);
        log::debug!("Session {} created", id);
        id
    }

    pub fn contains(&self, id: Uuid) -> bool {
        live_session(&mut self.lock(), id).is_some()
    }

    pub fn identity(&self, id: Uuid) -> Option<DoctorIdentity> {
        let mut sessions = self.lock();
        prune_expired(&mut sessions);
        sessions.get(&id).map(|s| s.identity.clone())
    }

    /// Runs `f` against the session under the store lock. Never hold the
    /// result of this across an `.await`.
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionContext) -> R) -> Option<R> {
        live_session(&mut self.lock(), id).map(f)
    }

    pub fn remove(&self, id: Uuid) -> Option<SessionContext> {
        let removed = self.lock().remove(&id);
        if removed.is_some() {
            log::debug!("Session {} removed", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn prune_expired(sessions: &mut HashMap<Uuid, SessionContext>) {
    let now = Utc::now();
    sessions.retain(|id, session| {
        let live = !session.is_expired(now);
        if !live {
            log::debug!("Session {} expired", id);
        }
        live
    });
}

/// Looks up `id`, evicting it first if it has expired.
fn live_session(
    sessions: &mut HashMap<Uuid, SessionContext>,
    id: Uuid,
) -> Option<&mut SessionContext> {
    if sessions.get(&id).is_some_and(|s| s.is_expired(Utc::now())) {
        sessions.remove(&id);
        log::debug!("Session {} expired", id);
    }
    sessions.get_mut(&id)
}
