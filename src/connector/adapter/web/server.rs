use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Form, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::{ChatContext, InteractionLoop};
use crate::domain::SessionState;

use super::render_page;

/// Cookie carrying the per-browser session id.
pub const SESSION_COOKIE: &str = "mkchat_session";
pub const INDEX_PATH: &str = "/";
pub const SEND_PATH: &str = "/send";
pub const HEALTH_PATH: &str = "/health";

/// Sessions untouched for this long are dropped.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

type SharedContext = Arc<Mutex<ChatContext>>;

struct SessionEntry {
    context: SharedContext,
    last_seen: Instant,
}

/// Shared state of the web UI: the interaction loop plus one context per
/// browser session. Each context has its own lock, so a slow reply in one
/// session never blocks another.
///
/// A context is only allocated once a browser sends something. Contexts idle
/// for longer than the TTL are swept on every access, and the map never
/// holds more than `max_sessions` entries.
#[derive(Clone)]
pub struct WebState {
    interaction: Arc<InteractionLoop>,
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl WebState {
    pub fn new(interaction: Arc<InteractionLoop>) -> Self {
        Self {
            interaction,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_ttl: DEFAULT_IDLE_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// The context of an existing session, without creating one.
    async fn existing(&self, session_id: &str) -> Option<SharedContext> {
        let mut sessions = self.sessions.lock().await;
        self.sweep(&mut sessions);
        sessions.get_mut(session_id).map(|entry| {
            entry.last_seen = Instant::now();
            entry.context.clone()
        })
    }

    /// The context of `session_id`, created if needed.
    async fn context(&self, session_id: &str) -> SharedContext {
        let mut sessions = self.sessions.lock().await;
        self.sweep(&mut sessions);

        if !sessions.contains_key(session_id) && sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                debug!("Session limit reached, dropping the least recently used one");
                sessions.remove(&oldest);
            }
        }

        let entry = sessions.entry(session_id.to_string()).or_insert_with(|| {
            debug!("Creating chat context for a new session");
            SessionEntry {
                context: Arc::new(Mutex::new(ChatContext::new())),
                last_seen: Instant::now(),
            }
        });
        entry.last_seen = Instant::now();
        entry.context.clone()
    }

    fn sweep(&self, sessions: &mut HashMap<String, SessionEntry>) {
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() < self.idle_ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} idle sessions", evicted);
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[derive(Debug, Deserialize)]
pub struct SendForm {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub input_key: u64,
}

/// Build the chat UI routes.
pub fn router(state: WebState) -> Router {
    Router::new()
        .route(INDEX_PATH, get(index))
        .route(SEND_PATH, post(send))
        .route(HEALTH_PATH, get(health))
        .with_state(state)
}

/// Serve the chat UI until the process is stopped.
pub async fn serve(interaction: Arc<InteractionLoop>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("MK Chatbot listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(WebState::new(interaction))).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn index(State(st): State<WebState>, headers: HeaderMap) -> Response {
    let (session_id, is_new) = resolve_session(&headers);

    let html = match st.existing(&session_id).await {
        Some(ctx) => {
            let ctx = ctx.lock().await;
            render_page(ctx.state())
        }
        None => render_page(&SessionState::new()),
    };

    with_session_cookie(Html(html).into_response(), &session_id, is_new)
}

async fn send(
    State(st): State<WebState>,
    headers: HeaderMap,
    Form(form): Form<SendForm>,
) -> Response {
    let (session_id, is_new) = resolve_session(&headers);
    let ctx = st.context(&session_id).await;

    {
        let mut ctx = ctx.lock().await;
        st.interaction
            .handle_submission(&mut ctx, &form.prompt, form.input_key)
            .await;
    }

    with_session_cookie(Redirect::to(INDEX_PATH).into_response(), &session_id, is_new)
}

/// Session id from the request cookie, or a fresh one.
fn resolve_session(headers: &HeaderMap) -> (String, bool) {
    match session_from_cookies(headers) {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    }
}

fn session_from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
        .map(|id| id.to_string())
}

fn with_session_cookie(mut response: Response, session_id: &str, is_new: bool) -> Response {
    if is_new {
        let cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(SET_COOKIE, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MockGenerativeService;

    fn web_state() -> WebState {
        let service = Arc::new(MockGenerativeService::new());
        WebState::new(Arc::new(InteractionLoop::new(service, Some("key".to_string()))))
    }

    #[tokio::test]
    async fn test_lookup_does_not_allocate() {
        let state = web_state();

        assert!(state.existing("unknown").await.is_none());
        assert_eq!(state.session_count().await, 0);

        state.context("known").await;
        assert!(state.existing("known").await.is_some());
        assert_eq!(state.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let state = web_state().with_idle_ttl(Duration::ZERO);

        state.context("a").await;
        state.context("b").await;

        assert!(state.existing("a").await.is_none());
        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_session_cap_drops_least_recently_used() {
        let state = web_state().with_max_sessions(2);

        state.context("a").await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        state.context("b").await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        state.context("c").await;

        assert_eq!(state.session_count().await, 2);
        assert!(state.existing("a").await.is_none());
        assert!(state.existing("b").await.is_some());
        assert!(state.existing("c").await.is_some());
    }

    #[test]
    fn test_session_from_cookies_finds_valid_id() {
        let id = Uuid::new_v4().to_string();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}")).unwrap(),
        );

        assert_eq!(session_from_cookies(&headers), Some(id));
    }

    #[test]
    fn test_session_from_cookies_rejects_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}=../../etc")).unwrap(),
        );

        assert!(session_from_cookies(&headers).is_none());
        let (_, is_new) = resolve_session(&headers);
        assert!(is_new);
    }

    #[test]
    fn test_new_sessions_get_a_cookie() {
        let response = with_session_cookie(StatusCode::OK.into_response(), "abc", true);
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("mkchat_session=abc;"));

        let response = with_session_cookie(StatusCode::OK.into_response(), "abc", false);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
}
