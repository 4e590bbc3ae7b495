//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use cyberfish::domain::shared::value_objects::WhepEndpoint;
use cyberfish::domain::stream::{
    MediaTransport, SignalingClient, StreamError, TransportFactory, TransportListener,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Transport that records whether it was closed
pub struct FakeTransport {
    pub listener: TransportListener,
    closed: AtomicBool,
    answers_applied: AtomicUsize,
    open_count: Arc<AtomicUsize>,
}

impl FakeTransport {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn answers_applied(&self) -> usize {
        self.answers_applied.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaTransport for FakeTransport {
    async fn create_offer(&self) -> Result<String, StreamError> {
        Ok(format!(
            "v=0\r\no=- {} 0 IN IP4 127.0.0.1\r\n",
            self.listener.generation().value()
        ))
    }

    async fn apply_answer(&self, sdp: String) -> Result<(), StreamError> {
        self.answers_applied.fetch_add(1, Ordering::SeqCst);
        if sdp.starts_with("v=0") {
            Ok(())
        } else {
            Err(StreamError::Negotiation("malformed answer".to_string()))
        }
    }

    async fn close(&self) -> Result<(), StreamError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.open_count.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Factory that keeps every transport it built
#[derive(Default)]
pub struct FakeTransportFactory {
    transports: Mutex<Vec<Arc<FakeTransport>>>,
    open_count: Arc<AtomicUsize>,
    max_open: AtomicUsize,
    requested: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeTransportFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn created(&self) -> usize {
        self.transports.lock().len()
    }

    /// Number of `create` calls, including ones still held
    pub fn requested(&self) -> usize {
        self.requested.load(Ordering::SeqCst)
    }

    /// Hold every following `create` until the returned gate is notified
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn transport(&self, index: usize) -> Arc<FakeTransport> {
        Arc::clone(&self.transports.lock()[index])
    }

    pub fn latest(&self) -> Arc<FakeTransport> {
        let transports = self.transports.lock();
        Arc::clone(transports.last().expect("no transport created"))
    }

    pub fn open(&self) -> usize {
        self.open_count.load(Ordering::SeqCst)
    }

    /// Highest number of transports that were open at the same time
    pub fn max_open(&self) -> usize {
        self.max_open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportFactory for FakeTransportFactory {
    async fn create(
        &self,
        listener: TransportListener,
    ) -> Result<Arc<dyn MediaTransport>, StreamError> {
        self.requested.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let open = self.open_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open.fetch_max(open, Ordering::SeqCst);

        let transport = Arc::new(FakeTransport {
            listener,
            closed: AtomicBool::new(false),
            answers_applied: AtomicUsize::new(0),
            open_count: Arc::clone(&self.open_count),
        });
        self.transports.lock().push(Arc::clone(&transport));
        Ok(transport)
    }
}

/// Signaling endpoint answering from a script; once the script runs out it
/// repeats the fallback response
pub struct ScriptedSignaling {
    script: Mutex<VecDeque<Result<String, StreamError>>>,
    fallback: Result<String, StreamError>,
    offers: Mutex<Vec<String>>,
    endpoints: Mutex<Vec<WhepEndpoint>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedSignaling {
    pub fn answering() -> Arc<Self> {
        Self::with_fallback(Ok(answer()))
    }

    pub fn failing() -> Arc<Self> {
        Self::with_fallback(Err(server_error()))
    }

    pub fn with_fallback(fallback: Result<String, StreamError>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            offers: Mutex::new(Vec::new()),
            endpoints: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
        })
    }

    pub fn push(&self, response: Result<String, StreamError>) {
        self.script.lock().push_back(response);
    }

    /// Hold every following exchange until the returned gate is notified
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn exchanges(&self) -> usize {
        self.offers.lock().len()
    }

    pub fn endpoints(&self) -> Vec<WhepEndpoint> {
        self.endpoints.lock().clone()
    }
}

#[async_trait]
impl SignalingClient for ScriptedSignaling {
    async fn exchange(&self, offer: &str) -> Result<String, StreamError> {
        self.offers.lock().push(offer.to_string());
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let scripted = self.script.lock().pop_front();
        scripted.unwrap_or_else(|| self.fallback.clone())
    }

    fn retarget(&self, endpoint: WhepEndpoint) {
        self.endpoints.lock().push(endpoint);
    }
}

pub fn answer() -> String {
    "v=0\r\no=- 1 0 IN IP4 10.10.10.10\r\n".to_string()
}

pub fn server_error() -> StreamError {
    StreamError::Signaling("500 Internal Server Error".to_string())
}
