use serde::Serialize;
use std::sync::Arc;
use url::Url;

use crate::store::{Scope, StoreError, VisitorStore};

/// Notification addressed to the originating browser context.
///
/// Informational only. The host collaborator decides how and whether to
/// surface it; dropping notices is always safe.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    ClickReported {
        visitor_id: String,
    },
    ConversionReported {
        conversion_type: String,
        revenue: String,
    },
}

/// Sink for client-facing notices.
pub trait ClientNotify: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that drops every notice.
pub struct NoopNotify;

impl ClientNotify for NoopNotify {
    fn notify(&self, _notice: Notice) {}
}

/// Per-event client context handed in by the host runtime.
///
/// Carries the page URL the event originated from, the visitor-scoped
/// store handle, and the notice sink for that browser context.
#[derive(Clone)]
pub struct Client {
    page_url: Url,
    store: Arc<dyn VisitorStore>,
    notifier: Arc<dyn ClientNotify>,
}

impl Client {
    pub fn new(page_url: Url, store: Arc<dyn VisitorStore>, notifier: Arc<dyn ClientNotify>) -> Self {
        Self {
            page_url,
            store,
            notifier,
        }
    }

    /// URL of the page the event originated from.
    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.store.get(key)
    }

    pub fn set(&self, key: &str, value: &str, scope: Scope) -> Result<(), StoreError> {
        self.store.set(key, value, scope)
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }
}
