//! Event pipeline.
//!
//! One inbound event moves through identity resolution, an optional
//! normalization step, endpoint construction, and dispatch:
//!
//! ```text
//! pageview:  identity -> campaign qualifier? -> click url -> detached dispatch
//! ecommerce: identity -> conversion record   -> pixel url -> awaited dispatch
//! ```
//!
//! Every failure stops at the handler boundary. The host runtime only
//! ever sees a terminal [`Outcome`], never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::client::{Client, Notice};
use crate::config::Settings;
use crate::conversion;
use crate::dispatch::{Dispatcher, Transport};
use crate::endpoint;
use crate::errors::Result;
use crate::identity;
use crate::metrics_defs;
use crate::payload::Payload;

/// Event kinds consumed from the host event system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Pageview,
    Ecommerce,
}

impl EventKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventKind::Pageview => "pageview",
            EventKind::Ecommerce => "ecommerce",
        }
    }
}

/// Terminal state of one event's handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The dispatch path ran to the end
    Completed,
    /// Campaign qualifier absent, click not reported
    Skipped,
    /// No listener registered for this event kind
    Unhandled,
    /// An error was caught and logged at the handler boundary
    Failed,
}

struct PageviewListener {
    settings: Arc<Settings>,
    dispatcher: Dispatcher,
}

impl PageviewListener {
    async fn handle(&self, client: &Client, payload: &Payload) -> Result<Outcome> {
        let visitor_id = identity::get_or_create_visitor_id(client)?;

        // Only report a click when the campaign qualifier is present
        if !endpoint::has_campaign_qualifier(client.page_url()) {
            tracing::debug!(page_url = %client.page_url(), "campaign qualifier absent, click not reported");
            return Ok(Outcome::Skipped);
        }

        let url = endpoint::click_url(&self.settings.tracker_url, client.page_url(), &visitor_id);
        self.dispatcher.send_detached(url.clone());

        client.notify(Notice::ClickReported {
            visitor_id: visitor_id.clone(),
        });
        tracing::info!(url = %url, payload = %payload.as_value(), "click reported");
        Ok(Outcome::Completed)
    }
}

/// Conversion-reporting half of the pipeline.
///
/// Only constructed when the e-commerce flag is set, so a disabled
/// component has no listener to invoke rather than a branch to skip.
struct EcommerceListener {
    settings: Arc<Settings>,
    dispatcher: Dispatcher,
}

impl EcommerceListener {
    async fn handle(&self, client: &Client, payload: &Payload) -> Result<Outcome> {
        let visitor_id = identity::get_or_create_visitor_id(client)?;
        let conversion = conversion::resolve(payload);

        let url = endpoint::conversion_url(
            &self.settings.tracker_url,
            &self.settings.profile_token,
            &visitor_id,
            &conversion,
        );
        self.dispatcher.send(&url).await?;

        client.notify(Notice::ConversionReported {
            conversion_type: conversion.conversion_type,
            revenue: conversion.revenue,
        });
        tracing::info!(url = %url, payload = %payload.as_value(), "conversion reported");
        Ok(Outcome::Completed)
    }
}

/// The event listeners registered by one component instance.
pub struct Pipeline {
    pageview: PageviewListener,
    ecommerce: Option<EcommerceListener>,
}

impl Pipeline {
    pub fn new(settings: Settings, transport: Arc<dyn Transport>) -> Self {
        if settings.ecommerce && settings.profile_token.is_empty() {
            tracing::warn!("ecommerce reporting enabled without a profile token");
        }

        let settings = Arc::new(settings);
        let dispatcher = Dispatcher::new(transport);

        let ecommerce = settings.ecommerce.then(|| EcommerceListener {
            settings: settings.clone(),
            dispatcher: dispatcher.clone(),
        });

        Self {
            pageview: PageviewListener {
                settings,
                dispatcher,
            },
            ecommerce,
        }
    }

    /// Event kinds this instance subscribed to at construction time.
    pub fn subscriptions(&self) -> Vec<EventKind> {
        let mut kinds = vec![EventKind::Pageview];
        if self.ecommerce.is_some() {
            kinds.push(EventKind::Ecommerce);
        }
        kinds
    }

    /// Deliver one event.
    ///
    /// Never returns an error to the host; failures are logged to the
    /// audit channel and collapse into [`Outcome::Failed`].
    pub async fn deliver(&self, kind: EventKind, client: &Client, payload: Value) -> Outcome {
        metrics::counter!(metrics_defs::EVENTS_RECEIVED.name, "kind" => kind.as_str()).increment(1);
        let payload = Payload::new(payload);

        let result = match kind {
            EventKind::Pageview => self.pageview.handle(client, &payload).await,
            EventKind::Ecommerce => match &self.ecommerce {
                Some(listener) => listener.handle(client, &payload).await,
                None => {
                    tracing::debug!("no ecommerce listener registered, event dropped");
                    return Outcome::Unhandled;
                }
            },
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                metrics::counter!(metrics_defs::EVENTS_FAILED.name, "kind" => kind.as_str())
                    .increment(1);
                tracing::error!(kind = kind.as_str(), error = %e, "event handling failed");
                Outcome::Failed
            }
        }
    }
}
