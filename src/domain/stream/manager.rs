//! Stream connection manager
//!
//! Owns the lifecycle of the single live video session: negotiate, play,
//! detect failure, retry, tear down.
//!
//! All mutable state sits in one [`SessionSlot`] behind a mutex that is only
//! held for short synchronous sections. Each attempt bumps the
//! [`AttemptGeneration`]; anything that completes later (transport callbacks,
//! negotiation results, the retry timer) is applied only if it still belongs
//! to the current generation and the manager has not been disposed.

use crate::domain::shared::value_objects::{AttemptGeneration, WhepEndpoint};
use crate::domain::stream::error::StreamError;
use crate::domain::stream::event::StreamEvent;
use crate::domain::stream::signaling::SignalingClient;
use crate::domain::stream::transport::{MediaTransport, TransportFactory};
use crate::domain::stream::value_object::{ConnectivityState, StreamState};
use metrics::{counter, gauge};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Delay between a failure and the next attempt
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(5000);

/// Manager tuning
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    pub retry_delay: Duration,
    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
            event_capacity: 64,
        }
    }
}

/// Snapshot of the manager for the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStatus {
    pub state: StreamState,
    pub generation: AttemptGeneration,
    pub last_error: Option<StreamError>,
    pub overlay: Option<String>,
    pub retry_pending: bool,
    pub transport_open: bool,
}

struct PendingRetry {
    id: u64,
    handle: JoinHandle<()>,
}

struct SessionSlot {
    state: StreamState,
    generation: AttemptGeneration,
    transport: Option<Arc<dyn MediaTransport>>,
    retry: Option<PendingRetry>,
    next_retry_id: u64,
    last_error: Option<StreamError>,
    disposed: bool,
}

impl SessionSlot {
    fn is_current(&self, generation: AttemptGeneration) -> bool {
        !self.disposed && self.generation == generation
    }

    fn cancel_retry(&mut self) {
        if let Some(pending) = self.retry.take() {
            pending.handle.abort();
            debug!("Cancelled pending retry {}", pending.id);
        }
    }
}

struct Shared {
    session: Mutex<SessionSlot>,
    factory: Arc<dyn TransportFactory>,
    signaling: Arc<dyn SignalingClient>,
    options: ManagerOptions,
    events: broadcast::Sender<StreamEvent>,
}

impl Shared {
    fn is_current(&self, generation: AttemptGeneration) -> bool {
        self.session.lock().is_current(generation)
    }

    fn publish(&self, event: StreamEvent) {
        // Ignore send errors (no receivers)
        let _ = self.events.send(event);
    }

    fn transition(&self, session: &mut SessionSlot, to: StreamState) -> bool {
        let from = session.state;
        if from == to {
            return false;
        }

        if !from.can_transition_to(to) {
            warn!("Refusing stream transition {} -> {}", from, to);
            return false;
        }

        session.state = to;
        gauge!("stream_state", "state" => from.as_str()).set(0.0);
        gauge!("stream_state", "state" => to.as_str()).set(1.0);
        info!("Stream {}: {} -> {}", session.generation, from, to);
        self.publish(StreamEvent::state_changed(session.generation, from, to));
        true
    }

    fn fail(self: &Arc<Self>, generation: AttemptGeneration, error: StreamError) {
        let mut session = self.session.lock();
        if !session.is_current(generation) {
            debug!("Ignoring failure from stale attempt {}: {}", generation, error);
            return;
        }

        warn!("Stream attempt {} failed: {}", generation, error);
        counter!("stream_failures_total", "kind" => error.kind()).increment(1);

        session.last_error = Some(error.clone());
        self.transition(&mut session, StreamState::Failed);
        self.publish(StreamEvent::attempt_failed(generation, error));
        self.schedule_retry(&mut session);
    }

    fn schedule_retry(self: &Arc<Self>, session: &mut SessionSlot) {
        if session.disposed {
            return;
        }

        // At most one pending retry: a newer failure replaces the older timer
        session.cancel_retry();
        session.next_retry_id += 1;
        let id = session.next_retry_id;
        let delay = self.options.retry_delay;
        let weak = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let Some(shared) = weak.upgrade() else {
                return;
            };
            if !shared.claim_retry(id) {
                return;
            }

            counter!("stream_retries_total").increment(1);
            StreamConnectionManager { shared }.start().await;
        });

        session.retry = Some(PendingRetry { id, handle });
        debug!("Scheduled retry {} in {:?}", id, delay);
        self.publish(StreamEvent::retry_scheduled(
            session.generation,
            delay.as_millis() as u64,
        ));
    }

    /// Take ownership of retry `id` from the slot before it fires.
    ///
    /// Returns false if the retry was cancelled or superseded meanwhile.
    fn claim_retry(&self, id: u64) -> bool {
        let mut session = self.session.lock();
        if session.disposed {
            return false;
        }

        match &session.retry {
            Some(pending) if pending.id == id => {
                // Detach rather than abort: this task is the one running
                session.retry = None;
                true
            }
            _ => false,
        }
    }

    fn media_playing(&self, generation: AttemptGeneration) {
        let mut session = self.session.lock();
        if !session.is_current(generation) {
            debug!("Ignoring media from stale attempt {}", generation);
            return;
        }

        if session.state == StreamState::Negotiating {
            session.last_error = None;
            self.transition(&mut session, StreamState::Playing);
        }
    }
}

/// Callback sink handed to a transport at creation time.
///
/// Holds only a weak reference to the manager, so a transport that outlives
/// the manager cannot keep it alive or drive it.
#[derive(Clone)]
pub struct TransportListener {
    generation: AttemptGeneration,
    shared: Weak<Shared>,
}

impl TransportListener {
    pub fn generation(&self) -> AttemptGeneration {
        self.generation
    }

    /// Whether callbacks through this listener still reach a live attempt
    pub fn is_current(&self) -> bool {
        self.shared
            .upgrade()
            .map(|shared| shared.is_current(self.generation))
            .unwrap_or(false)
    }

    /// A remote track was attached; media may still be buffering
    pub fn on_track(&self) {
        debug!("Stream {}: remote track received", self.generation);
    }

    /// The first media frame of the received track was delivered
    pub fn on_media_playing(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.media_playing(self.generation);
        }
    }

    /// ICE connectivity changed
    pub fn on_connectivity_change(&self, state: ConnectivityState) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };

        if state.is_failure() {
            shared.fail(
                self.generation,
                StreamError::Transport(format!("ICE connection {}", state)),
            );
        } else {
            debug!("Stream {}: ICE connection {}", self.generation, state);
        }
    }
}

/// Stream connection manager
#[derive(Clone)]
pub struct StreamConnectionManager {
    shared: Arc<Shared>,
}

impl StreamConnectionManager {
    /// Create a manager in the `Idle` state
    pub fn new(
        factory: Arc<dyn TransportFactory>,
        signaling: Arc<dyn SignalingClient>,
        options: ManagerOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(options.event_capacity.max(1));

        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(SessionSlot {
                    state: StreamState::Idle,
                    generation: AttemptGeneration::INITIAL,
                    transport: None,
                    retry: None,
                    next_retry_id: 0,
                    last_error: None,
                    disposed: false,
                }),
                factory,
                signaling,
                options,
                events,
            }),
        }
    }

    /// Start a new attempt.
    ///
    /// Closes the previous transport, then negotiates a new one. Returns once
    /// the offer/answer exchange has finished or failed; `Playing` is only
    /// reached later, when the transport reports the first media frame.
    /// A no-op after [`dispose`](Self::dispose).
    pub async fn start(&self) {
        let begun = {
            let mut session = self.shared.session.lock();
            if session.disposed {
                None
            } else {
                session.cancel_retry();
                session.generation = session.generation.next();
                let previous = session.transport.take();
                self.shared.transition(&mut session, StreamState::Negotiating);
                Some((session.generation, previous))
            }
        };

        let Some((generation, previous)) = begun else {
            debug!("Ignoring start on disposed stream manager");
            return;
        };

        if let Some(previous) = previous {
            close_transport(previous).await;
        }

        counter!("stream_attempts_total").increment(1);
        info!("Starting stream attempt {}", generation);

        match self.negotiate(generation).await {
            Ok(()) => debug!("Stream {}: negotiated, waiting for media", generation),
            Err(error) => self.shared.fail(generation, error),
        }
    }

    async fn negotiate(&self, generation: AttemptGeneration) -> Result<(), StreamError> {
        let listener = TransportListener {
            generation,
            shared: Arc::downgrade(&self.shared),
        };
        let transport = self.shared.factory.create(listener).await?;

        // A newer attempt or dispose may have happened while creating
        let installed = {
            let mut session = self.shared.session.lock();
            if session.is_current(generation) {
                session.transport = Some(Arc::clone(&transport));
                true
            } else {
                false
            }
        };
        if !installed {
            debug!("Stream {}: superseded during setup", generation);
            close_transport(transport).await;
            return Ok(());
        }

        let offer = transport.create_offer().await?;
        let answer = self.shared.signaling.exchange(&offer).await?;

        if !self.shared.is_current(generation) {
            debug!("Stream {}: dropping answer for superseded attempt", generation);
            return Ok(());
        }

        transport.apply_answer(answer).await
    }

    /// Schedule a single retry after the configured delay, replacing any
    /// pending one
    pub fn schedule_retry(&self) {
        let mut session = self.shared.session.lock();
        self.shared.schedule_retry(&mut session);
    }

    /// Cancel the pending retry and close the transport.
    ///
    /// Safe to call repeatedly and before any attempt was made.
    pub async fn dispose(&self) {
        let transport = {
            let mut session = self.shared.session.lock();
            session.cancel_retry();
            if !session.disposed {
                session.disposed = true;
                self.shared.transition(&mut session, StreamState::Closed);
                info!("Stream manager disposed");
            }
            session.transport.take()
        };

        if let Some(transport) = transport {
            close_transport(transport).await;
        }
    }

    /// Point signaling at a new endpoint without restarting
    pub fn set_endpoint(&self, endpoint: WhepEndpoint) {
        info!("Retargeting stream to {}", endpoint);
        self.shared.signaling.retarget(endpoint);
    }

    /// Point signaling at a new endpoint and restart the session
    pub async fn retarget(&self, endpoint: WhepEndpoint) {
        self.set_endpoint(endpoint);
        self.start().await;
    }

    pub fn state(&self) -> StreamState {
        self.shared.session.lock().state
    }

    pub fn generation(&self) -> AttemptGeneration {
        self.shared.session.lock().generation
    }

    pub fn status(&self) -> StreamStatus {
        let session = self.shared.session.lock();

        StreamStatus {
            state: session.state,
            generation: session.generation,
            last_error: session.last_error.clone(),
            overlay: session.state.overlay_message().map(str::to_string),
            retry_pending: session.retry.is_some(),
            transport_open: session.transport.is_some(),
        }
    }

    /// Subscribe to stream events
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.shared.events.subscribe()
    }
}

async fn close_transport(transport: Arc<dyn MediaTransport>) {
    if let Err(e) = transport.close().await {
        warn!("Failed to close media transport: {}", e);
    }
}
