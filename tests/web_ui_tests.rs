//! Browser-level behaviour of the chat page, served on a loopback port.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use reqwest::redirect::Policy;
use reqwest::StatusCode;

use mkchat::connector::adapter::web::{router, WebState, SESSION_COOKIE};
use mkchat::{InteractionLoop, MockGenerativeService, STALE_SUBMISSION_BANNER};

struct Browser {
    base: String,
    http: reqwest::Client,
    cookie: Option<String>,
}

impl Browser {
    async fn get_index(&mut self) -> (StatusCode, String) {
        let mut request = self.http.get(format!("{}/", self.base));
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie.clone());
        }
        let response = request.send().await.unwrap();
        self.remember_cookie(&response);
        let status = response.status();
        (status, response.text().await.unwrap())
    }

    async fn submit(&mut self, prompt: &str, input_key: u64) -> reqwest::Response {
        let body = format!("prompt={prompt}&input_key={input_key}");
        let mut request = self
            .http
            .post(format!("{}/send", self.base))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie.clone());
        }
        let response = request.send().await.unwrap();
        self.remember_cookie(&response);
        response
    }

    fn remember_cookie(&mut self, response: &reqwest::Response) {
        if let Some(value) = response.headers().get(SET_COOKIE) {
            let pair = value.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
    }
}

fn web_state(service: Arc<MockGenerativeService>) -> WebState {
    WebState::new(Arc::new(InteractionLoop::new(service, Some("key".to_string()))))
}

async fn start(service: Arc<MockGenerativeService>) -> Browser {
    start_with(web_state(service)).await
}

async fn start_with(state: WebState) -> Browser {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Browser {
        base: format!("http://{addr}"),
        http: reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .unwrap(),
        cookie: None,
    }
}

#[tokio::test]
async fn first_visit_renders_empty_conversation_and_sets_cookie() {
    let mut browser = start(Arc::new(MockGenerativeService::new())).await;

    let (status, html) = browser.get_index().await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Chatbot conversation:"));
    assert!(html.contains("id=\"user_input_0\""));
    assert!(!html.contains("class=\"turn\""));
    assert!(browser
        .cookie
        .as_deref()
        .unwrap()
        .starts_with(&format!("{SESSION_COOKIE}=")));
}

#[tokio::test]
async fn send_redirects_and_page_shows_exchange_with_fresh_input() {
    let service = Arc::new(
        MockGenerativeService::new().with_replies(vec!["{\"text\": \"Hi there\"}".to_string()]),
    );
    let mut browser = start(service).await;
    browser.get_index().await;

    let response = browser.submit("Hello", 0).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/");

    let (_, html) = browser.get_index().await;
    assert!(html.contains("You: Hello"));
    assert!(html.contains("MK Chatbot: {\"text\": \"Hi there\"}"));
    assert!(html.contains("id=\"user_input_1\""));
    assert!(!html.contains("role=\"alert\""));
}

#[tokio::test]
async fn cookieless_page_views_do_not_allocate_sessions() {
    let state = web_state(Arc::new(MockGenerativeService::new()));
    let mut browser = start_with(state.clone()).await;

    for _ in 0..50 {
        browser.cookie = None;
        let (status, html) = browser.get_index().await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("id=\"user_input_0\""));
    }
    assert_eq!(state.session_count().await, 0);

    browser.submit("Hello", 0).await;
    assert_eq!(state.session_count().await, 1);
}

#[tokio::test]
async fn stale_submission_is_not_sent_and_shows_banner() {
    let service = Arc::new(MockGenerativeService::new());
    let mut browser = start(service.clone()).await;
    browser.get_index().await;

    browser.submit("Hello", 0).await;
    browser.submit("Hello", 0).await;

    assert_eq!(service.generate_calls(), 1);
    let (_, html) = browser.get_index().await;
    assert_eq!(html.matches("You: Hello").count(), 1);
    assert!(html.contains(STALE_SUBMISSION_BANNER));
}

#[tokio::test]
async fn failure_shows_banner_and_keeps_input_key() {
    let service = Arc::new(MockGenerativeService::new());
    service.fail_generation("503 UNAVAILABLE");
    let mut browser = start(service).await;
    browser.get_index().await;

    browser.submit("Hello", 0).await;

    let (_, html) = browser.get_index().await;
    assert!(html.contains("role=\"alert\""));
    assert!(html.contains("Error: Remote call failed"));
    assert!(html.contains("id=\"user_input_0\""));
    assert!(!html.contains("class=\"turn\""));
}

#[tokio::test]
async fn sessions_are_isolated_per_cookie() {
    let service = Arc::new(MockGenerativeService::new());
    let mut first = start(service).await;
    first.get_index().await;
    first.submit("Hello", 0).await;

    let mut other = Browser {
        base: first.base.clone(),
        http: first.http.clone(),
        cookie: None,
    };
    let (_, html) = other.get_index().await;

    assert!(!html.contains("You: Hello"));
    assert_ne!(other.cookie, first.cookie);
}

#[tokio::test]
async fn health_endpoint_answers() {
    let browser = start(Arc::new(MockGenerativeService::new())).await;

    let response = browser
        .http
        .get(format!("{}/health", browser.base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
