//! Shared test doubles for the tracker crate.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

use crate::client::{Client, ClientNotify, Notice};
use crate::dispatch::{Transport, TransportError};
use crate::store::{MemoryVisitorStore, Scope, StoreError, VisitorStore};

/// Transport that records every request and optionally fails them all.
pub struct MockTransport {
    requests: Mutex<Vec<Url>>,
    failing: bool,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            failing: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            failing: true,
        })
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &Url) -> Result<(), TransportError> {
        self.requests.lock().unwrap().push(url.clone());
        if self.failing {
            return Err(TransportError::Network("mock transport failure".to_string()));
        }
        Ok(())
    }
}

/// Notifier that keeps notices for assertions.
#[derive(Default)]
pub struct RecordingNotify {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotify {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl ClientNotify for RecordingNotify {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Store that counts writes on top of the in-memory implementation.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryVisitorStore,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl VisitorStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str, scope: Scope) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, scope)
    }
}

/// Store where every operation fails.
pub struct FailingStore;

impl VisitorStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Read("backing store unavailable".to_string()))
    }

    fn set(&self, _key: &str, _value: &str, _scope: Scope) -> Result<(), StoreError> {
        Err(StoreError::Write("backing store unavailable".to_string()))
    }
}

pub fn client_with_store(page_url: &str, store: Arc<dyn VisitorStore>) -> Client {
    Client::new(
        Url::parse(page_url).unwrap(),
        store,
        Arc::new(crate::client::NoopNotify),
    )
}

pub fn test_client(page_url: &str) -> Client {
    client_with_store(page_url, Arc::new(MemoryVisitorStore::new()))
}
