//! In-process session store.
//!
//! Owned by the composition root and injected into the orchestrator. The
//! outer map lock is held only to look up or insert a record; each record
//! has its own mutex, so distinct sessions never contend and updates to one
//! session are applied one at a time.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Local};
use tracing::{debug, info};

use triage_core::error::{Result, TriageError};
use triage_core::types::{ChatMessage, SessionToken, Stage};

use crate::token::{make_token, DEFAULT_TOKEN_BYTES};

type TokenGenerator = Box<dyn Fn(usize) -> String + Send + Sync>;

/// Shared handle to one session's record.
pub type SessionHandle = Arc<Mutex<SessionRecord>>;

/// Conversation state held for one token.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub stage: Stage,
    /// Matched vocabulary symptoms for the current diagnostic cycle.
    pub symptoms: BTreeSet<String>,
    pub history: Vec<ChatMessage>,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

impl SessionRecord {
    fn new() -> Self {
        let now = Local::now();
        Self {
            stage: Stage::New,
            symptoms: BTreeSet::new(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the stage forward. Requesting the current stage is a no-op;
    /// requesting an earlier one is an error.
    pub fn advance(&mut self, requested: Stage) -> Result<Stage> {
        if requested < self.stage {
            return Err(TriageError::StageRegression {
                current: self.stage,
                requested,
            });
        }
        self.stage = requested;
        self.updated_at = Local::now();
        Ok(self.stage)
    }

    /// Begin a fresh diagnostic cycle. The transcript is kept.
    pub fn reset(&mut self) {
        self.stage = Stage::New;
        self.symptoms.clear();
        self.updated_at = Local::now();
    }
}

/// Lock a session record, mapping a poisoned mutex to an error.
pub fn lock_record(handle: &SessionHandle) -> Result<MutexGuard<'_, SessionRecord>> {
    handle
        .lock()
        .map_err(|e| TriageError::LockPoisoned(format!("session record: {}", e)))
}

/// Process-wide mapping from session token to conversation record.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionToken, SessionHandle>>,
    token_bytes: usize,
    generator: TokenGenerator,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("token_bytes", &self.token_bytes)
            .field("sessions", &self.len().ok())
            .finish()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_BYTES)
    }
}

impl SessionStore {
    /// Create an empty store issuing tokens of `token_bytes` random bytes.
    pub fn new(token_bytes: usize) -> Self {
        Self::with_generator(token_bytes, make_token)
    }

    /// Create a store with a custom token source.
    pub fn with_generator<F>(token_bytes: usize, generator: F) -> Self
    where
        F: Fn(usize) -> String + Send + Sync + 'static,
    {
        Self {
            sessions: RwLock::new(HashMap::new()),
            token_bytes,
            generator: Box::new(generator),
        }
    }

    /// Issue a new token, retrying on collision, and register it at
    /// [`Stage::New`].
    pub fn create_session(&self) -> Result<SessionToken> {
        let mut sessions = self.write_map()?;

        let token = loop {
            let candidate = SessionToken::new((self.generator)(self.token_bytes));
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
            debug!(prefix = candidate.redacted(), "Session token collision, regenerating");
        };

        sessions.insert(token.clone(), Arc::new(Mutex::new(SessionRecord::new())));
        info!(
            session = token.redacted(),
            live_sessions = sessions.len(),
            "Session created"
        );
        Ok(token)
    }

    /// Shared handle to a session's record.
    pub fn session(&self, token: &str) -> Result<SessionHandle> {
        let sessions = self.read_map()?;
        sessions
            .get(token)
            .cloned()
            .ok_or_else(|| TriageError::InvalidSession(redact(token)))
    }

    /// Current stage. An unknown token is `InvalidSession`.
    pub fn get_stage(&self, token: &str) -> Result<Stage> {
        let handle = self.session(token)?;
        let record = lock_record(&handle)?;
        Ok(record.stage)
    }

    /// Move a session forward to `stage`, returning the stored stage.
    pub fn advance_stage(&self, token: &str, stage: Stage) -> Result<Stage> {
        let handle = self.session(token)?;
        let mut record = lock_record(&handle)?;
        let previous = record.stage;
        let current = record.advance(stage)?;
        if previous != current {
            debug!(session = %redact(token), from = %previous, to = %current, "Stage advanced");
        }
        Ok(current)
    }

    /// Start a new diagnostic cycle for an existing session.
    pub fn reset_session(&self, token: &str) -> Result<()> {
        let handle = self.session(token)?;
        lock_record(&handle)?.reset();
        debug!(session = %redact(token), "Session reset");
        Ok(())
    }

    pub fn contains(&self, token: &str) -> Result<bool> {
        Ok(self.read_map()?.contains_key(token))
    }

    /// Remove a session. Returns whether it existed.
    pub fn remove_session(&self, token: &str) -> Result<bool> {
        Ok(self.write_map()?.remove(token).is_some())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read_map()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop every session (service shutdown).
    pub fn clear(&self) -> Result<()> {
        let mut sessions = self.write_map()?;
        let dropped = sessions.len();
        sessions.clear();
        info!(dropped, "Session store cleared");
        Ok(())
    }

    // -- Private helpers --

    fn read_map(&self) -> Result<RwLockReadGuard<'_, HashMap<SessionToken, SessionHandle>>> {
        self.sessions
            .read()
            .map_err(|e| TriageError::LockPoisoned(format!("session map: {}", e)))
    }

    fn write_map(&self) -> Result<RwLockWriteGuard<'_, HashMap<SessionToken, SessionHandle>>> {
        self.sessions
            .write()
            .map_err(|e| TriageError::LockPoisoned(format!("session map: {}", e)))
    }
}

fn redact(token: &str) -> String {
    SessionToken::new(token).redacted().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_create_session_starts_at_new() {
        let store = SessionStore::default();
        let token = store.create_session().unwrap();
        assert!(store.contains(token.as_str()).unwrap());
        assert_eq!(store.get_stage(token.as_str()).unwrap(), Stage::New);
        assert_eq!(store.get_stage(token.as_str()).unwrap().code(), 0);
        assert_eq!(token.as_str().len(), 22);
    }

    #[test]
    fn test_create_session_retries_on_collision() {
        let calls = AtomicUsize::new(0);
        let store = SessionStore::with_generator(16, move |_| {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => "duplicate".to_string(),
                _ => "fresh".to_string(),
            }
        });

        let first = store.create_session().unwrap();
        let second = store.create_session().unwrap();
        assert_eq!(first.as_str(), "duplicate");
        assert_eq!(second.as_str(), "fresh");
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_get_stage_unknown_token() {
        let store = SessionStore::default();
        let err = store.get_stage("missing-token").unwrap_err();
        assert!(matches!(err, TriageError::InvalidSession(_)));
    }

    #[test]
    fn test_get_stage_is_idempotent() {
        let store = SessionStore::default();
        let token = store.create_session().unwrap();
        store.advance_stage(token.as_str(), Stage::Collecting).unwrap();
        for _ in 0..5 {
            assert_eq!(store.get_stage(token.as_str()).unwrap(), Stage::Collecting);
        }
    }

    #[test]
    fn test_advance_stage_forward_and_same() {
        let store = SessionStore::default();
        let token = store.create_session().unwrap();
        assert_eq!(
            store.advance_stage(token.as_str(), Stage::Collecting).unwrap(),
            Stage::Collecting
        );
        assert_eq!(
            store.advance_stage(token.as_str(), Stage::Collecting).unwrap(),
            Stage::Collecting
        );
        assert_eq!(
            store.advance_stage(token.as_str(), Stage::Diagnosed).unwrap(),
            Stage::Diagnosed
        );
    }

    #[test]
    fn test_advance_stage_rejects_regression() {
        let store = SessionStore::default();
        let token = store.create_session().unwrap();
        store.advance_stage(token.as_str(), Stage::Diagnosed).unwrap();
        let err = store
            .advance_stage(token.as_str(), Stage::Collecting)
            .unwrap_err();
        assert!(matches!(err, TriageError::StageRegression { .. }));
        assert_eq!(store.get_stage(token.as_str()).unwrap(), Stage::Diagnosed);
    }

    #[test]
    fn test_advance_stage_unknown_token() {
        let store = SessionStore::default();
        let err = store.advance_stage("nope", Stage::Collecting).unwrap_err();
        assert!(matches!(err, TriageError::InvalidSession(_)));
    }

    #[test]
    fn test_reset_session_clears_cycle() {
        let store = SessionStore::default();
        let token = store.create_session().unwrap();
        {
            let handle = store.session(token.as_str()).unwrap();
            let mut record = lock_record(&handle).unwrap();
            record.symptoms.insert("fever".to_string());
            record.history.push(ChatMessage::user("fever"));
        }
        store.advance_stage(token.as_str(), Stage::Diagnosed).unwrap();

        store.reset_session(token.as_str()).unwrap();

        let handle = store.session(token.as_str()).unwrap();
        let record = lock_record(&handle).unwrap();
        assert_eq!(record.stage, Stage::New);
        assert!(record.symptoms.is_empty());
        assert_eq!(record.history.len(), 1);
    }

    #[test]
    fn test_sessions_are_independent() {
        let store = SessionStore::default();
        let a = store.create_session().unwrap();
        let b = store.create_session().unwrap();
        assert_ne!(a, b);
        store.advance_stage(a.as_str(), Stage::Diagnosed).unwrap();
        assert_eq!(store.get_stage(b.as_str()).unwrap(), Stage::New);
    }

    #[test]
    fn test_remove_and_clear() {
        let store = SessionStore::default();
        let a = store.create_session().unwrap();
        let _b = store.create_session().unwrap();
        assert!(store.remove_session(a.as_str()).unwrap());
        assert!(!store.remove_session(a.as_str()).unwrap());
        assert_eq!(store.len().unwrap(), 1);
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_concurrent_advance_never_loses_highest_stage() {
        for _ in 0..50 {
            let store = Arc::new(SessionStore::default());
            let token = store.create_session().unwrap();

            let handles: Vec<_> = [Stage::Collecting, Stage::Diagnosed]
                .into_iter()
                .map(|stage| {
                    let store = Arc::clone(&store);
                    let token = token.clone();
                    thread::spawn(move || {
                        let _ = store.advance_stage(token.as_str(), stage);
                    })
                })
                .collect();
            for h in handles {
                h.join().unwrap();
            }

            assert_eq!(store.get_stage(token.as_str()).unwrap(), Stage::Diagnosed);
        }
    }

    #[test]
    fn test_concurrent_session_creation_yields_unique_tokens() {
        let store = Arc::new(SessionStore::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..25)
                        .map(|_| store.create_session().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = BTreeSet::new();
        for h in handles {
            all.extend(h.join().unwrap());
        }
        assert_eq!(all.len(), 200);
        assert_eq!(store.len().unwrap(), 200);
    }

    #[test]
    fn test_poisoned_map_is_reported_by_every_query() {
        let store = Arc::new(SessionStore::default());
        let token = store.create_session().unwrap();

        let poisoner = Arc::clone(&store);
        let _ = thread::spawn(move || {
            let _guard = poisoner.sessions.write().unwrap();
            panic!("writer died holding the session map");
        })
        .join();

        assert!(matches!(
            store.contains(token.as_str()),
            Err(TriageError::LockPoisoned(_))
        ));
        assert!(matches!(store.len(), Err(TriageError::LockPoisoned(_))));
        assert!(matches!(store.is_empty(), Err(TriageError::LockPoisoned(_))));
        assert!(matches!(
            store.get_stage(token.as_str()),
            Err(TriageError::LockPoisoned(_))
        ));
        assert!(store.create_session().is_err());
    }
}
