//! Event intake service.
//!
//! Bridges the host-runtime boundary: events arrive as JSON over HTTP,
//! get a per-client context attached, and are delivered to the pipeline.
//! The acknowledgment carries the terminal outcome plus any notices the
//! component addressed to the browser context. Delivery guarantees and
//! retries stay with the caller; this service only translates.

use http_body_util::{BodyExt, Full, combinators::BoxBody};
use hyper::body::{Bytes, Incoming};
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

use tracker::client::{Client, ClientNotify, Notice};
use tracker::pipeline::{EventKind, Outcome, Pipeline};
use tracker::store::MemoryVisitorStore;

type IntakeBody = BoxBody<Bytes, IntakeError>;

#[derive(thiserror::Error, Debug)]
pub enum IntakeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] hyper::Error),
}

/// One event as posted by the host runtime.
#[derive(Deserialize, Debug)]
pub struct EventEnvelope {
    pub event: EventKind,
    pub client_id: String,
    pub page_url: Url,
    #[serde(default)]
    pub payload: Value,
}

/// Acknowledgment returned to the host runtime.
#[derive(Serialize, Debug)]
pub struct EventAck {
    pub outcome: Outcome,
    pub notices: Vec<Notice>,
}

/// Hands out per-client store handles keyed by the host's client id.
///
/// Backing storage is in-memory; identifiers survive for the lifetime of
/// the process. A durable deployment would swap in its own store here.
#[derive(Default)]
pub struct ClientRegistry {
    stores: Mutex<HashMap<String, Arc<MemoryVisitorStore>>>,
}

impl ClientRegistry {
    fn store_for(&self, client_id: &str) -> Arc<MemoryVisitorStore> {
        let mut stores = self.stores.lock().unwrap_or_else(|e| e.into_inner());
        stores
            .entry(client_id.to_string())
            .or_insert_with(|| Arc::new(MemoryVisitorStore::new()))
            .clone()
    }
}

/// Collects notices addressed to the browser context so they can ride
/// back on the acknowledgment.
#[derive(Default)]
struct NoticeBuffer {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeBuffer {
    fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl ClientNotify for NoticeBuffer {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notice);
    }
}

pub struct IntakeService {
    pipeline: Arc<Pipeline>,
    clients: Arc<ClientRegistry>,
}

impl IntakeService {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            clients: Arc::new(ClientRegistry::default()),
        }
    }
}

impl Service<Request<Incoming>> for IntakeService {
    type Response = Response<IntakeBody>;
    type Error = IntakeError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let pipeline = self.pipeline.clone();
        let clients = self.clients.clone();
        Box::pin(async move { handle(pipeline, clients, req).await })
    }
}

async fn handle(
    pipeline: Arc<Pipeline>,
    clients: Arc<ClientRegistry>,
    req: Request<Incoming>,
) -> Result<Response<IntakeBody>, IntakeError> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/health") => Ok(text_response(StatusCode::OK, "ok\n")),
        (&Method::POST, "/event") => {
            let body = req.into_body().collect().await?.to_bytes();
            match serde_json::from_slice::<EventEnvelope>(&body) {
                Ok(envelope) => {
                    let ack = deliver(&pipeline, &clients, envelope).await;
                    Ok(json_response(StatusCode::OK, &ack))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "rejected malformed event envelope");
                    Ok(text_response(
                        StatusCode::BAD_REQUEST,
                        format!("malformed event envelope: {e}\n"),
                    ))
                }
            }
        }
        _ => Ok(text_response(StatusCode::NOT_FOUND, "no route matched\n")),
    }
}

async fn deliver(
    pipeline: &Pipeline,
    clients: &ClientRegistry,
    envelope: EventEnvelope,
) -> EventAck {
    let store = clients.store_for(&envelope.client_id);
    let notices = Arc::new(NoticeBuffer::default());
    let client = Client::new(envelope.page_url, store, notices.clone());

    let outcome = pipeline
        .deliver(envelope.event, &client, envelope.payload)
        .await;

    EventAck {
        outcome,
        notices: notices.drain(),
    }
}

fn full_body(bytes: Bytes) -> IntakeBody {
    Full::new(bytes).map_err(|e| match e {}).boxed()
}

fn text_response(status: StatusCode, text: impl Into<String>) -> Response<IntakeBody> {
    let mut response = Response::new(full_body(Bytes::from(text.into())));
    *response.status_mut() = status;
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<IntakeBody> {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(full_body(Bytes::from(bytes)));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize acknowledgment");
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "serialization failed\n")
        }
    }
}

/// Bind the intake listener and serve until the process exits.
pub async fn run(host: &str, port: u16, service: IntakeService) -> Result<(), IntakeError> {
    let listener = TcpListener::bind(format!("{host}:{port}")).await?;
    tracing::info!(addr = %listener.local_addr()?, "intake listener started");
    serve(listener, service).await
}

/// Accept loop over an already-bound listener.
pub async fn serve(listener: TcpListener, service: IntakeService) -> Result<(), IntakeError> {
    let service_arc = Arc::new(service);

    loop {
        let (stream, _peer_addr) = listener.accept().await?;
        let _ = stream.set_nodelay(true);
        let io = TokioIo::new(stream);
        let svc = service_arc.clone();

        // Hand the connection to hyper; auto-detect h1/h2 on this socket
        tokio::spawn(async move {
            let _ = Builder::new(TokioExecutor::new())
                .serve_connection(io, svc)
                .await;
        });
    }
}
