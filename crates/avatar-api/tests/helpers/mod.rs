//! Test helpers: build the router over an in-memory or temp-dir backend.
//!
//! Run from workspace root: `cargo test -p avatar-api`.

#![allow(dead_code)]

pub mod fixtures;

use avatar_api::auth::{OWNER_ID_HEADER, OWNER_NAME_HEADER};
use avatar_api::setup::{routes, services};
use avatar_core::{AvatarConfig, Config, OwnerId, StorageBackend};
use avatar_services::{LocalStorage, MemoryStorage, Storage};
use axum_test::{TestRequest, TestServer};
use std::sync::Arc;
use tempfile::TempDir;

pub const BASE_URL: &str = "http://localhost:3000/media";

/// Test application: server plus the backend it writes to.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<dyn Storage>,
    pub memory: Option<MemoryStorage>,
    pub _temp_dir: Option<TempDir>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

fn test_config(backend: StorageBackend, path: Option<&TempDir>) -> Config {
    let mut inner = AvatarConfig::default();
    inner.storage_backend = backend;
    inner.local_storage_base_url = BASE_URL.to_string();
    if let Some(dir) = path {
        inner.local_storage_path = dir.path().to_string_lossy().to_string();
    }
    Config(Box::new(inner))
}

fn build(config: &Config, storage: Arc<dyn Storage>) -> TestServer {
    let state = services::initialize_services(config, storage);
    let router = routes::setup_routes(config, state).unwrap();
    TestServer::new(router).unwrap()
}

/// App over the memory backend.
pub async fn setup_test_app() -> TestApp {
    let config = test_config(StorageBackend::Memory, None);
    let memory = MemoryStorage::new(BASE_URL);
    let storage: Arc<dyn Storage> = Arc::new(memory.clone());

    TestApp {
        server: build(&config, storage.clone()),
        storage,
        memory: Some(memory),
        _temp_dir: None,
    }
}

/// App over local storage in a temp dir. Returns the dir so a second app can reopen it.
pub async fn setup_local_test_app(dir: Option<TempDir>) -> TestApp {
    let dir = match dir {
        Some(dir) => dir,
        None => TempDir::new().unwrap(),
    };
    let config = test_config(StorageBackend::Local, Some(&dir));
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(dir.path(), BASE_URL.to_string())
            .await
            .unwrap(),
    );

    TestApp {
        server: build(&config, storage.clone()),
        storage,
        memory: None,
        _temp_dir: Some(dir),
    }
}

/// Attach owner identity headers the upstream gateway would set.
pub fn as_owner(request: TestRequest, owner: OwnerId, name: &str) -> TestRequest {
    request
        .add_header(OWNER_ID_HEADER, owner.to_string())
        .add_header(OWNER_NAME_HEADER, urlencoding::encode(name).into_owned())
}

/// Storage key behind a media URL.
pub fn key_from_url(url: &str) -> String {
    url.strip_prefix(&format!("{}/", BASE_URL))
        .unwrap_or_else(|| panic!("not a media url: {}", url))
        .to_string()
}
