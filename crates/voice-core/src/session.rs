//! Session lifecycle manager: the single entry point for a voice session.
//!
//! `VoiceSession` is a cheap `Rc` handle. It owns the conversation state,
//! the transport resources and the telemetry monitors, and routes channel
//! events into the event processor and tool orchestrator.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use futures::future::{abortable, AbortHandle};
use futures::stream::LocalBoxStream;
use futures::{FutureExt, StreamExt};
use uuid::Uuid;
use voice_types::{
    Result,
    config::TelemetryConfig,
    event::{ClientEvent, SessionEvent},
    message::{Message, MessageStatus, MessageUpdate, Role},
    session::SessionStatus,
};

use crate::event_bus::EventBus;
use crate::orchestrator::ToolOrchestrator;
use crate::ports::{
    AudioPipeline, ChannelEvent, Connection, CredentialPort, SpawnPort, TimerPort, ToolExecutorPort,
    TransportPort,
};
use crate::processor::{Dispatch, EventProcessor};
use crate::state::SessionState;
use crate::telemetry::{LevelMonitor, RttMonitor};

/// External collaborators a session is wired to
pub struct SessionPorts {
    pub credentials: Rc<dyn CredentialPort>,
    pub transport: Rc<dyn TransportPort>,
    pub tools: Rc<dyn ToolExecutorPort>,
    pub timer: Rc<dyn TimerPort>,
    pub spawner: Rc<dyn SpawnPort>,
}

/// Resources that exist only while a session is live
struct Resources {
    audio: Option<Rc<dyn AudioPipeline>>,
    pump: Option<AbortHandle>,
    level: LevelMonitor,
    rtt: RttMonitor,
}

struct Shared {
    telemetry: TelemetryConfig,
    credentials: Rc<dyn CredentialPort>,
    transport: Rc<dyn TransportPort>,
    timer: Rc<dyn TimerPort>,
    spawner: Rc<dyn SpawnPort>,
    orchestrator: ToolOrchestrator,
    state: RefCell<SessionState>,
    resources: RefCell<Resources>,
    bus: EventBus,
}

#[derive(Clone)]
pub struct VoiceSession {
    shared: Rc<Shared>,
}

impl VoiceSession {
    pub fn new(ports: SessionPorts, telemetry: TelemetryConfig) -> Self {
        let bus = EventBus::new();
        let shared = Shared {
            telemetry,
            credentials: ports.credentials,
            transport: ports.transport,
            timer: ports.timer,
            spawner: ports.spawner,
            orchestrator: ToolOrchestrator::new(ports.tools),
            state: RefCell::new(SessionState::new(bus.clone())),
            resources: RefCell::new(Resources {
                audio: None,
                pump: None,
                level: LevelMonitor::new(),
                rtt: RttMonitor::new(bus.clone()),
            }),
            bus,
        };
        Self {
            shared: Rc::new(shared),
        }
    }

    // ─── Queries ─────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.shared.state.borrow().status
    }

    pub fn last_error(&self) -> Option<String> {
        self.shared.state.borrow().last_error.clone()
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.shared.state.borrow().transcript.messages().to_vec()
    }

    pub fn input_level(&self) -> f32 {
        self.shared.resources.borrow().level.level()
    }

    pub fn round_trip_ms(&self) -> Option<u32> {
        self.shared.resources.borrow().rtt.round_trip_ms()
    }

    pub fn pending_tool_calls(&self) -> usize {
        self.shared.state.borrow().tool_calls.len()
    }

    /// True while either telemetry monitor has a live task
    pub fn is_monitoring(&self) -> bool {
        let resources = self.shared.resources.borrow();
        resources.level.is_running() || resources.rtt.is_running()
    }

    /// Read-only view of the conversation state
    pub fn with_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.shared.state.borrow())
    }

    pub fn events(&self) -> EventBus {
        self.shared.bus.clone()
    }

    pub fn drain_events(&self) -> Vec<SessionEvent> {
        self.shared.bus.drain()
    }

    // ─── Lifecycle ───────────────────────────────────────────

    /// Open a session. Does nothing unless the session is idle.
    ///
    /// Credential and transport failures are recorded as the last error,
    /// tear the session down, and are returned to the caller.
    pub async fn start(&self) -> Result<()> {
        let epoch = {
            let mut state = self.shared.state.borrow_mut();
            if state.status != SessionStatus::Idle {
                log::debug!("Ignoring start: session is {}", state.status.label());
                return Ok(());
            }
            state.epoch += 1;
            state.set_error(None);
            state.set_status(SessionStatus::Connecting);
            state.epoch
        };

        log::info!("Starting realtime session");
        match self.connect(epoch).await {
            Ok(()) => Ok(()),
            Err(e) => {
                if self.is_current(epoch) {
                    self.fail(e.user_message());
                }
                Err(e)
            }
        }
    }

    /// Tear the session down. Safe to call in any state, any number of times.
    pub fn stop(&self) {
        log::info!("Stopping realtime session");
        self.reset();
    }

    /// Send a typed user message followed by a response request.
    pub fn send_text(&self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let item_id = format!("msg_{}", Uuid::new_v4());
        let mut state = self.shared.state.borrow_mut();
        state.send(&ClientEvent::user_text(item_id.clone(), text))?;
        state.send(&ClientEvent::ResponseCreate)?;
        state.upsert(
            MessageUpdate::new(item_id)
                .role(Role::User)
                .content(text)
                .status(MessageStatus::Complete),
        );
        Ok(())
    }

    async fn connect(&self, epoch: u64) -> Result<()> {
        let credential = self.shared.credentials.create_session().await?;
        if !self.is_current(epoch) {
            log::debug!("Session credential arrived after stop; discarding");
            return Ok(());
        }

        let Connection { link, audio, events } = self.shared.transport.connect(&credential).await?;
        if !self.is_current(epoch) {
            log::debug!("Transport connected after stop; closing it");
            link.close();
            audio.release();
            return Ok(());
        }

        self.shared.state.borrow_mut().attach_link(link);
        {
            let mut resources = self.shared.resources.borrow_mut();
            resources.audio = Some(audio.clone());
            resources
                .level
                .start(audio, self.shared.timer.clone(), self.shared.spawner.as_ref());
        }
        self.spawn_pump(epoch, events);
        Ok(())
    }

    /// Release every resource and return to idle. The last error survives.
    fn reset(&self) {
        let link = {
            let mut state = self.shared.state.borrow_mut();
            state.epoch += 1;
            state.detach_link()
        };

        let audio = {
            let mut resources = self.shared.resources.borrow_mut();
            if let Some(pump) = resources.pump.take() {
                pump.abort();
            }
            resources.level.stop();
            resources.rtt.stop();
            resources.audio.take()
        };

        if let Some(link) = link {
            link.close();
        }
        if let Some(audio) = audio {
            audio.release();
        }

        let mut state = self.shared.state.borrow_mut();
        state.clear_conversation();
        state.set_status(SessionStatus::Idle);
    }

    fn fail(&self, message: String) {
        log::error!("Realtime session failed: {}", message);
        self.shared.state.borrow_mut().set_error(Some(message));
        self.reset();
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.shared.state.borrow().epoch == epoch
    }

    // ─── Channel events ──────────────────────────────────────

    fn spawn_pump(&self, epoch: u64, mut events: LocalBoxStream<'static, ChannelEvent>) {
        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        let pump = async move {
            while let Some(event) = events.next().await {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                let session = VoiceSession { shared };
                if !session.is_current(epoch) {
                    return;
                }
                session.handle_channel_event(event);
            }

            // The transport dropped its sender without a close notification
            if let Some(shared) = weak.upgrade() {
                let session = VoiceSession { shared };
                if session.is_current(epoch) {
                    session.handle_channel_event(ChannelEvent::Closed);
                }
            }
        };

        let (pump, handle) = abortable(pump);
        self.shared.resources.borrow_mut().pump = Some(handle);
        self.shared.spawner.spawn(pump.map(|_| ()).boxed_local());
    }

    fn handle_channel_event(&self, event: ChannelEvent) {
        match event {
            ChannelEvent::Opened => {
                log::info!("Realtime channel open");
                {
                    let mut state = self.shared.state.borrow_mut();
                    state.set_status(SessionStatus::Connected);
                    state.set_error(None);
                    state.clear_conversation();
                }
                self.resume_round_trip();
            }
            ChannelEvent::Connected => {
                // Before the channel opens the session is still connecting
                if self.status() == SessionStatus::Connected {
                    log::info!("Realtime transport connected");
                    self.resume_round_trip();
                }
            }
            ChannelEvent::Message(frame) => {
                let dispatch = EventProcessor::handle_frame(&mut self.shared.state.borrow_mut(), &frame);
                if let Dispatch::ExecuteTool(call_id) = dispatch {
                    self.spawn_tool(call_id);
                }
            }
            ChannelEvent::Closed => {
                log::info!("Realtime channel closed");
                self.reset();
            }
            ChannelEvent::Disconnected => {
                log::warn!("Realtime transport disconnected");
                self.shared.resources.borrow_mut().rtt.stop();
            }
            ChannelEvent::Failed(reason) => self.fail(reason),
        }
    }

    /// Start round-trip sampling unless it is already running
    fn resume_round_trip(&self) {
        let Some(link) = self.shared.state.borrow().link() else {
            return;
        };
        let mut resources = self.shared.resources.borrow_mut();
        if resources.rtt.is_running() {
            return;
        }
        let interval = Duration::from_millis(u64::from(self.shared.telemetry.rtt_interval_ms));
        resources.rtt.start(
            link,
            self.shared.timer.clone(),
            self.shared.spawner.as_ref(),
            interval,
        );
    }

    fn spawn_tool(&self, call_id: String) {
        let weak = Rc::downgrade(&self.shared);
        let task = async move {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            shared.orchestrator.execute(&shared.state, &call_id).await;
        };
        self.shared.spawner.spawn(task.boxed_local());
    }
}
