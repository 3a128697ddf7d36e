//! # Common Test Utilities
//!
//! Test harnesses and helper functions shared by the `sparky-server`
//! integration tests:
//!
//! - `TestApp`: spawns a real server on a random port. With [`TestApp::spawn`]
//!   every hosted service (completion, embeddings, Pinecone) is pointed at an
//!   `httpmock::MockServer`; [`TestApp::spawn_with_state`] accepts a
//!   hand-built state, e.g. one wired to the `sparky-test-utils` doubles.
//! - Helpers for programming the mock upstream services.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::{Method, Mock, MockServer};
use reqwest::Client;
use serde_json::{json, Value};
use sparky::Orchestrator;
use sparky_server::{
    config::{self, AppConfig},
    router,
    state::{build_app_state, AppState},
};
use std::{
    fs::{self, File},
    io::Write,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub const PINECONE_TEST_KEY: &str = "test-pinecone-key";

// --- Full Application Test Harness ---

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub books_dir: PathBuf,
    pub app_state: AppState,
    _books: TempDir,
    _config_dir: Option<TempDir>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server with every upstream service mocked by `mock_server`.
    pub async fn spawn() -> Result<Self> {
        let mock_server = MockServer::start();
        let books = tempdir()?;

        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
books_dir: "{}"
completion:
  provider: "local"
  api_url: "{}"
  api_key: null
  model_name: "mock-chat-model"
embedding:
  api_url: "{}"
  model_name: "mock-embedding-model"
  dimension: 3
vector_index:
  provider: "pinecone"
  host: "{}"
  api_key: "{}"
"#,
            books.path().display(),
            mock_server.url("/v1/chat/completions"),
            mock_server.url("/v1/embeddings"),
            mock_server.base_url(),
            PINECONE_TEST_KEY,
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = config::get_config(config_path.to_str())?;
        let app_state = build_app_state(config).await?;

        let mut app = TestApp::spawn_with_state(app_state, mock_server, books).await?;
        app._config_dir = Some(config_dir);
        Ok(app)
    }

    /// Spawns the server from default configuration: no provider is configured.
    pub async fn spawn_unconfigured() -> Result<Self> {
        let books = tempdir()?;
        let config = AppConfig {
            books_dir: books.path().to_path_buf(),
            ..Default::default()
        };
        let app_state = build_app_state(config).await?;
        TestApp::spawn_with_state(app_state, MockServer::start(), books).await
    }

    /// Spawns the server around a pre-built orchestrator.
    pub async fn spawn_with_orchestrator(orchestrator: Orchestrator) -> Result<Self> {
        let books = tempdir()?;
        let app_state = AppState {
            config: Arc::new(AppConfig {
                books_dir: books.path().to_path_buf(),
                ..Default::default()
            }),
            orchestrator: Arc::new(orchestrator),
        };
        TestApp::spawn_with_state(app_state, MockServer::start(), books).await
    }

    pub async fn spawn_with_state(
        app_state: AppState,
        mock_server: MockServer,
        books: TempDir,
    ) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let app_state_for_harness = app_state.clone();
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            books_dir: app_state_for_harness.config.books_dir.clone(),
            app_state: app_state_for_harness,
            _books: books,
            _config_dir: None,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Creates `books/<grade>/<subject>/` in the library.
    pub fn add_subject(&self, grade: &str, subject: &str) -> Result<PathBuf> {
        let dir = self.books_dir.join(grade).join(subject);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    // --- Upstream mocks ---

    /// Every completion request is answered with `reply`.
    pub fn mock_chat_reply(&self, reply: &str) -> Mock<'_> {
        let body = chat_body(reply);
        self.mock_server.mock(|when, then| {
            when.method(Method::POST).path("/v1/chat/completions");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(body);
        })
    }

    pub fn mock_embeddings(&self) -> Mock<'_> {
        self.mock_server.mock(|when, then| {
            when.method(Method::POST).path("/v1/embeddings");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({ "data": [{ "embedding": [0.1, 0.2, 0.3] }] }));
        })
    }

    /// A Pinecone `/query` endpoint returning `(id, score, text)` matches from
    /// the Grade1/Science shelf.
    pub fn mock_pinecone_query(&self, matches: &[(&str, f32, &str)]) -> Mock<'_> {
        let matches: Vec<Value> = matches
            .iter()
            .map(|(id, score, text)| {
                json!({
                    "id": id,
                    "score": score,
                    "metadata": {
                        "text": text,
                        "source": "light.pdf",
                        "grade": "Grade1",
                        "subject": "Science"
                    }
                })
            })
            .collect();
        self.mock_server.mock(|when, then| {
            when.method(Method::POST).path("/query");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({ "matches": matches }));
        })
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// An OpenAI-compatible chat completion body carrying `reply`.
pub fn chat_body(reply: &str) -> Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": reply } }]
    })
}

/// A tutor-mode `/ask` payload with the greeting followed by `question`.
pub fn tutor_ask(question: &str) -> Value {
    json!({
        "messages": [
            { "role": "assistant", "content": "Hi Mia! I'm Sparky! 🤖 What do you want to learn about today?" },
            { "role": "user", "content": question }
        ],
        "grade": "Grade1",
        "subject": "Science",
        "language": "en",
        "child_name": "Mia",
        "mode": "tutor"
    })
}
