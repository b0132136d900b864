use rand::Rng;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub const SESSION_COOKIE: &str = "dashboard_sid";

/// Opaque bearer credential returned by the auth endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// Token slot for one browser session.
#[derive(Debug, Default)]
pub struct Session {
    token: Option<SessionToken>,
}

impl Session {
    pub fn set(&mut self, token: SessionToken) {
        self.token = Some(token);
    }

    pub fn get(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    pub fn clear(&mut self) {
        self.token = None;
    }
}

/// Upper bound on live sessions; the oldest is evicted past it.
pub const MAX_SESSIONS: usize = 10_000;

#[derive(Default)]
struct Sessions {
    by_id: HashMap<String, Session>,
    /// Ids in the order they were first stored.
    order: VecDeque<String>,
}

/// All live browser sessions, keyed by the id carried in the session cookie.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<Sessions>>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(Sessions::default())),
            capacity: capacity.max(1),
        }
    }

    pub fn new_id() -> String {
        let bytes: [u8; 16] = rand::thread_rng().r#gen();
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub async fn set(&self, id: &str, token: SessionToken) {
        let mut sessions = self.sessions.lock().await;
        if !sessions.by_id.contains_key(id) {
            while sessions.by_id.len() >= self.capacity {
                let Some(oldest) = sessions.order.pop_front() else {
                    break;
                };
                sessions.by_id.remove(&oldest);
                debug!("evicted oldest session");
            }
            sessions.order.push_back(id.to_string());
        }
        sessions.by_id.entry(id.to_string()).or_default().set(token);
    }

    pub async fn get(&self, id: &str) -> Option<SessionToken> {
        let sessions = self.sessions.lock().await;
        sessions.by_id.get(id).and_then(|session| session.get().cloned())
    }

    pub async fn clear(&self, id: &str) {
        let mut sessions = self.sessions.lock().await;
        if let Some(mut session) = sessions.by_id.remove(id) {
            session.clear();
            sessions.order.retain(|stored| stored != id);
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.by_id.len()
    }
}

/// Pulls the session id out of a raw `Cookie` header value.
pub fn session_id_from_cookie(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
    })
}

/// Cookie without an expiry so it dies with the browser session.
pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Strict")
}
