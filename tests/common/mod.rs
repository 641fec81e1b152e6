//! Test helpers for E2E tests.
//!
//! Provides loopback HTTP servers standing in for the feed host and the
//! webhook endpoint.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;

use galnet_publisher::config::Config;

/// One RSS item as served by [`FeedServer`].
pub struct TestArticle {
    pub guid: &'static str,
    pub title: &'static str,
    pub body: String,
}

impl TestArticle {
    pub fn new(guid: &'static str, title: &'static str, body: impl Into<String>) -> Self {
        Self {
            guid,
            title,
            body: body.into(),
        }
    }
}

/// Render an RSS 2.0 document, items in the given order.
pub fn rss_document(articles: &[TestArticle]) -> String {
    let items: String = articles
        .iter()
        .map(|a| {
            format!(
                "<item><guid isPermaLink=\"false\">{}</guid><title>{}</title>\
                 <description><![CDATA[{}]]></description></item>",
                a.guid, a.title, a.body
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rss version=\"2.0\"><channel><title>GalNet News</title>\
         <link>https://community.elitedangerous.com/galnet</link>\
         <description>Test feed</description>{items}</channel></rss>"
    )
}

/// Spawn a router on an ephemeral loopback port.
async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}

/// Serves a fixed feed document at `/feed`, or a fixed error status.
pub struct FeedServer {
    pub addr: SocketAddr,
}

impl FeedServer {
    pub async fn start(document: String) -> Self {
        let app = Router::new().route(
            "/feed",
            get(move || {
                let document = document.clone();
                async move { ([(header::CONTENT_TYPE, "application/rss+xml")], document) }
            }),
        );
        Self {
            addr: spawn(app).await,
        }
    }

    pub async fn start_failing(status: StatusCode) -> Self {
        let app = Router::new().route("/feed", get(move || async move { status }));
        Self {
            addr: spawn(app).await,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/feed", self.addr)
    }
}

type Captured = Arc<Mutex<Vec<String>>>;

async fn capture_hook(State(captured): State<Captured>, Json(body): Json<Value>) -> impl IntoResponse {
    let content = body["content"].as_str().unwrap_or_default().to_string();
    captured.lock().unwrap().push(content);
    StatusCode::NO_CONTENT
}

/// Webhook endpoint at `/hook` capturing each message's `content`.
pub struct HookServer {
    pub addr: SocketAddr,
    captured: Captured,
}

impl HookServer {
    pub async fn start() -> Self {
        let captured: Captured = Arc::default();
        let app = Router::new()
            .route("/hook", post(capture_hook))
            .with_state(captured.clone());
        Self {
            addr: spawn(app).await,
            captured,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/hook", self.addr)
    }

    pub fn messages(&self) -> Vec<String> {
        self.captured.lock().unwrap().clone()
    }
}

/// Configuration pointing at the loopback servers with local state.
pub fn local_config(feed_url: String, hook_url: String, state_path: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.feed.url = feed_url;
    config.webhook.target = hook_url;
    config.webhook.chunk_delay_ms = 0;
    config.state.local = true;
    config.state.path = state_path.to_string_lossy().into_owned();
    config
}
