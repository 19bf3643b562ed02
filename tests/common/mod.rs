//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, HeaderMap, Response, StatusCode, Uri};
use axum::Router;
use edge_gateway::config::{FamilyConfig, GatewayConfig, ResponseShape};
use edge_gateway::{HttpServer, Shutdown};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// A request observed by a mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub uri: String,
    pub headers: HeaderMap,
}

/// Handle to a running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    hits: Arc<AtomicU32>,
    seen: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.seen.lock().unwrap().clone()
    }
}

/// Start a programmable mock backend on an ephemeral loopback port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> MockBackend
where
    F: Fn(Uri) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response<Body>> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let (h, s) = (hits.clone(), seen.clone());
    let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap| {
        let (f, h, s) = (f.clone(), h.clone(), s.clone());
        async move {
            h.fetch_add(1, Ordering::SeqCst);
            s.lock().unwrap().push(Recorded {
                uri: uri.to_string(),
                headers,
            });
            f(uri).await
        }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, hits, seen }
}

/// Mock backend that always answers with the same status and JSON body.
pub async fn start_json_backend(status: u16, body: Value) -> MockBackend {
    let body = body.to_string();
    start_programmable_backend(move |_| {
        let body = body.clone();
        async move { respond(status, Some("application/json"), body.into_bytes()) }
    })
    .await
}

/// Mock backend that never answers within any reasonable deadline.
pub async fn start_hanging_backend() -> MockBackend {
    start_programmable_backend(|_| async {
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        respond(200, Some("application/json"), b"[]".to_vec())
    })
    .await
}

pub fn respond(status: u16, content_type: Option<&str>, body: Vec<u8>) -> Response<Body> {
    let mut builder = Response::builder().status(StatusCode::from_u16(status).unwrap());
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn invidious_videos(ids: &[&str]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| {
                json!({
                    "type": "video",
                    "videoId": id,
                    "title": format!("title {id}"),
                    "author": format!("author {id}"),
                    "videoThumbnails": [{ "quality": "default", "url": format!("https://i.ytimg.com/vi/{id}/default.jpg") }],
                    "lengthSeconds": 212,
                    "viewCount": 1234,
                })
            })
            .collect(),
    )
}

pub fn piped_videos(ids: &[&str]) -> Value {
    json!({
        "items": ids.iter().map(|id| json!({
            "type": "stream",
            "url": format!("/watch?v={id}"),
            "title": format!("title {id}"),
            "uploaderName": format!("uploader {id}"),
            "thumbnail": format!("https://pipedproxy.example/vi/{id}/hq.jpg"),
            "duration": 99,
            "views": 5,
        })).collect::<Vec<_>>(),
        "nextpage": null,
    })
}

pub fn family(name: &str, shape: ResponseShape, backends: &[&MockBackend]) -> FamilyConfig {
    FamilyConfig {
        name: name.to_string(),
        shape,
        instances: backends.iter().map(|b| b.base_url()).collect(),
    }
}

/// Config bound to loopback with no default families or allowlist.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.allowlist.entries.clear();
    config.families.clear();
    config.search.attempt_timeout_ms = 1_000;
    config
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, shutdown)
}

/// Client that talks to the gateway directly and never follows redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
