//! Test helpers for integration tests
//!
//! Provides a spawned test server, token minting, and response assertions.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use kingdom_api::{create_app, create_app_state, AppState};
use kingdom_common::{AppConfig, JwtService};
use kingdom_core::{RealmPolicy, Snowflake, SnowflakeGenerator, UserRole};
use kingdom_db::MemoryStore;
use kingdom_service::{ServiceContext, UploadService};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";
pub const TEST_KINGDOM: &str = "1042";

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    jwt: JwtService,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server on a fresh in-memory store
    pub async fn start() -> Result<Self> {
        let state = create_app_state(test_config()?).await?;
        Self::serve(state).await
    }

    /// Start a server over a store the test keeps a handle to
    pub async fn start_with_store(store: Arc<MemoryStore>) -> Result<Self> {
        Self::start_with_store_config(store, test_config()?).await
    }

    /// Same as [`TestServer::start_with_store`], with a caller-built config
    ///
    /// Runs the startup upload recovery the real server runs.
    pub async fn start_with_store_config(store: Arc<MemoryStore>, config: AppConfig) -> Result<Self> {
        let realm_policy = RealmPolicy::new(config.realm.power_floor, config.realm.stale_days)
            .ok_or_else(|| anyhow::anyhow!("REALM_STALE_DAYS out of range"))?;
        let context = ServiceContext::builder()
            .memory_store(store)
            .jwt_service(Arc::new(JwtService::new(
                &config.jwt.secret,
                config.jwt.access_token_expiry,
            )))
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
            .ingestion(config.ingestion.clone())
            .realm_policy(realm_policy)
            .build()?;
        UploadService::new(&context).fail_interrupted().await?;

        Self::serve(AppState::new(context, config)).await
    }

    async fn serve(state: AppState) -> Result<Self> {
        let jwt = state.jwt_service().clone();
        let app = create_app(state)?;

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            jwt,
            _handle: handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/api/v1{}", self.addr, path)
    }

    /// Mint an access token for a caller with the given role
    pub fn token(&self, role: UserRole) -> String {
        self.jwt
            .issue_access_token(Snowflake::new(4242), role)
            .expect("token encoding")
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn post_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.post(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn put_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.delete(self.url(path)).bearer_auth(token).send().await?)
    }

    /// Submit a spreadsheet as multipart form data
    pub async fn upload(
        &self,
        token: &str,
        filename: &str,
        contents: impl Into<Vec<u8>>,
        fields: &[(&str, &str)],
    ) -> Result<Response> {
        let mut form = Form::new().part("file", Part::bytes(contents.into()).file_name(filename.to_string()));
        for (name, value) in fields {
            form = form.text((*name).to_string(), (*value).to_string());
        }

        Ok(self
            .client
            .post(self.url("/uploads"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?)
    }
}

/// Configuration for the in-memory backend with generous rate limits
pub fn test_config() -> Result<AppConfig> {
    test_config_with(&[])
}

/// [`test_config`] with some variables overridden
pub fn test_config_with(overrides: &[(&str, &str)]) -> Result<AppConfig> {
    let mut vars: HashMap<&str, &str> = HashMap::from([
        ("APP_ENV", "development"),
        ("API_PORT", "0"),
        ("STORE_BACKEND", "memory"),
        ("JWT_SECRET", TEST_JWT_SECRET),
        ("DEFAULT_KINGDOM", TEST_KINGDOM),
        ("RATE_LIMIT_REQUESTS_PER_SECOND", "1000"),
        ("RATE_LIMIT_BURST", "1000"),
        ("MAX_UPLOAD_SIZE_MB", "1"),
    ]);
    vars.extend(overrides.iter().copied());

    AppConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()))
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
