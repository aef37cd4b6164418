//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `voice-core` (pure Rust).
//! Implementations live in `voice-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use futures::stream::LocalBoxStream;
use serde_json::Value;
use voice_types::{
    Result,
    session::{CandidatePairStats, SessionCredential},
    tool::ToolOutput,
};

// ─── Credential Port ─────────────────────────────────────────

#[async_trait(?Send)]
pub trait CredentialPort {
    /// Mint an ephemeral credential for one realtime session
    async fn create_session(&self) -> Result<SessionCredential>;
}

// ─── Transport Port ──────────────────────────────────────────

/// Notifications from the realtime transport, in delivery order
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Data channel is open and ready to send
    Opened,
    /// One text frame from the remote agent
    Message(String),
    /// Data channel closed
    Closed,
    /// Peer connectivity established, or restored after a disconnect
    Connected,
    /// Peer connectivity lost (may recover on its own)
    Disconnected,
    /// Unrecoverable transport failure
    Failed(String),
}

/// Outbound half of an established connection
#[async_trait(?Send)]
pub trait RealtimeLink {
    /// Send one text frame. Fails if the channel is not open.
    fn send(&self, frame: &str) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Candidate-pair entries from the transport's stats report
    async fn candidate_pairs(&self) -> Result<Vec<CandidatePairStats>>;

    /// Close the data channel and the underlying transport
    fn close(&self);
}

/// Local microphone pipeline attached to the connection
pub trait AudioPipeline {
    /// Number of samples in one analysis window
    fn window_size(&self) -> usize;

    /// Fill `window` with the latest time-domain samples in [-1, 1]
    fn read_waveform(&self, window: &mut [f32]) -> Result<()>;

    /// Stop capture and release audio resources
    fn release(&self);
}

/// Everything `TransportPort::connect` hands back
pub struct Connection {
    pub link: Rc<dyn RealtimeLink>,
    pub audio: Rc<dyn AudioPipeline>,
    pub events: LocalBoxStream<'static, ChannelEvent>,
}

#[async_trait(?Send)]
pub trait TransportPort {
    /// Negotiate the media + data transport with the remote agent
    async fn connect(&self, credential: &SessionCredential) -> Result<Connection>;
}

// ─── Tool Ports ──────────────────────────────────────────────

#[async_trait(?Send)]
pub trait ToolExecutorPort {
    /// Run a tool with already-parsed arguments
    async fn execute(&self, tool_name: &str, args: Value) -> Result<ToolOutput>;
}

#[async_trait(?Send)]
pub trait WeatherPort {
    /// Fetch a wttr.in `format=j1` document for a location
    async fn forecast(&self, location: &str) -> Result<Value>;
}

// ─── Scheduling Ports ────────────────────────────────────────

pub trait TimerPort {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;

    /// Resolves on the next animation frame
    fn next_frame(&self) -> LocalBoxFuture<'static, ()>;
}

pub trait SpawnPort {
    /// Run a task on the local event loop without awaiting it
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}
