//! End-to-end tests for the Iqra Academy API.
//!
//! Each test spawns the real router on an ephemeral port with in-memory
//! storage and talks to it over HTTP with a cookie-holding client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p iqra-integration-tests
//! ```

use std::net::SocketAddr;

use reqwest::Client;
use secrecy::SecretString;
use thiserror::Error;
use tokio::task::JoinHandle;
use tower_sessions::MemoryStore;

use iqra_server::build_app;
use iqra_server::config::{AcademyConfig, PasswordHashingConfig};
use iqra_server::db::Repositories;
use iqra_server::state::AppState;

/// Admin access key configured on every test server.
pub const ACCESS_KEY: &str = "Zr4!kT9#qLm2$Wx7&Pb5*Hn8@Dv3^Cs6";

/// Password used for every account the tests create.
pub const PASSWORD: &str = "correct horse battery";

/// Errors that can occur while starting a test server.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("failed to bind: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid password hashing parameters: {0}")]
    PasswordHashing(#[from] argon2::Error),
}

/// A running server, stopped on drop.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with in-memory storage and cheap password hashing.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind.
    pub async fn spawn() -> Result<Self, SpawnError> {
        let mut config = AcademyConfig::in_memory();
        config.password_hashing = PasswordHashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        config.admin_access_key = Some(SecretString::from(ACCESS_KEY));

        let state = AppState::new(config, Repositories::in_memory())?;
        let app = build_app(state, MemoryStore::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, handle })
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A fresh client with its own cookie jar, i.e. a separate browser.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn client() -> reqwest::Result<Client> {
        Client::builder().cookie_store(true).build()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Create an account through public signup. The client is logged in on
/// success.
///
/// # Errors
///
/// Returns an error if the request cannot be sent.
pub async fn sign_up(
    client: &Client,
    server: &TestServer,
    email: &str,
    role: &str,
) -> reqwest::Result<reqwest::Response> {
    client
        .post(server.url("/auth/signup"))
        .json(&serde_json::json!({
            "name": email.split('@').next().unwrap_or(email),
            "email": email,
            "password": PASSWORD,
            "role": role,
        }))
        .send()
        .await
}
