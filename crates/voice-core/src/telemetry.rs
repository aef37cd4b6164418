//! Input level and round-trip telemetry.
//!
//! Both monitors run as abortable tasks on the local executor. At most one
//! task per monitor is alive; starting again stops the previous one.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{abortable, AbortHandle};
use futures::FutureExt;
use voice_types::{event::SessionEvent, session::CandidatePairStats};

use crate::event_bus::EventBus;
use crate::ports::{AudioPipeline, RealtimeLink, SpawnPort, TimerPort};

/// Weight kept from the previous level on each update
const LEVEL_DECAY: f32 = 0.7;

/// Root mean square of a waveform window
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

pub fn smooth_level(previous: f32, rms: f32) -> f32 {
    previous * LEVEL_DECAY + rms * (1.0 - LEVEL_DECAY)
}

/// Lowest round trip among succeeded candidate pairs, in whole milliseconds
pub fn best_round_trip_ms(pairs: &[CandidatePairStats]) -> Option<u32> {
    pairs
        .iter()
        .filter(|pair| pair.succeeded)
        .filter_map(|pair| pair.current_round_trip_time)
        .filter(|rtt| rtt.is_finite() && *rtt >= 0.0)
        .map(|rtt| rtt * 1000.0)
        .min_by(|a, b| a.total_cmp(b))
        .map(|ms| ms.round() as u32)
}

/// A spawned loop that is aborted when dropped
struct MonitorTask {
    handle: AbortHandle,
    alive: Rc<Cell<bool>>,
}

impl MonitorTask {
    fn spawn(spawner: &dyn SpawnPort, task: impl std::future::Future<Output = ()> + 'static) -> Self {
        let alive = Rc::new(Cell::new(true));
        let exited = alive.clone();
        let (task, handle) = abortable(task);
        spawner.spawn(
            async move {
                // Only a natural exit marks the task finished
                if task.await.is_ok() {
                    exited.set(false);
                }
            }
            .boxed_local(),
        );
        Self { handle, alive }
    }

    fn is_alive(&self) -> bool {
        self.alive.get()
    }
}

impl Drop for MonitorTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ─── Level Monitor ───────────────────────────────────────────

/// Smoothed microphone input level, sampled once per animation frame
pub struct LevelMonitor {
    task: Option<MonitorTask>,
    level: Rc<Cell<f32>>,
}

impl LevelMonitor {
    pub fn new() -> Self {
        Self {
            task: None,
            level: Rc::new(Cell::new(0.0)),
        }
    }

    pub fn start(&mut self, audio: Rc<dyn AudioPipeline>, timer: Rc<dyn TimerPort>, spawner: &dyn SpawnPort) {
        self.stop();

        let level = self.level.clone();
        let sampler = async move {
            let mut window = vec![0.0f32; audio.window_size()];
            loop {
                if let Err(e) = audio.read_waveform(&mut window) {
                    log::warn!("Unable to read input level: {}", e);
                    level.set(0.0);
                    return;
                }
                level.set(smooth_level(level.get(), rms(&window)));
                timer.next_frame().await;
            }
        };
        self.task = Some(MonitorTask::spawn(spawner, sampler));
        log::debug!("Level monitor started");
    }

    pub fn stop(&mut self) {
        if self.task.take().is_some() {
            log::debug!("Level monitor stopped");
        }
        self.level.set(0.0);
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(MonitorTask::is_alive)
    }

    pub fn level(&self) -> f32 {
        self.level.get()
    }
}

impl Default for LevelMonitor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Round-trip Monitor ──────────────────────────────────────

/// Periodic round-trip sampling from transport statistics
pub struct RttMonitor {
    task: Option<MonitorTask>,
    round_trip_ms: Rc<Cell<Option<u32>>>,
    bus: EventBus,
}

impl RttMonitor {
    pub fn new(bus: EventBus) -> Self {
        Self {
            task: None,
            round_trip_ms: Rc::new(Cell::new(None)),
            bus,
        }
    }

    pub fn start(
        &mut self,
        link: Rc<dyn RealtimeLink>,
        timer: Rc<dyn TimerPort>,
        spawner: &dyn SpawnPort,
        interval: Duration,
    ) {
        self.stop();

        let round_trip_ms = self.round_trip_ms.clone();
        let bus = self.bus.clone();
        let sampler = async move {
            loop {
                timer.sleep(interval).await;
                match link.candidate_pairs().await {
                    Ok(pairs) => {
                        // No succeeded pair keeps the last reading
                        let Some(best) = best_round_trip_ms(&pairs) else {
                            continue;
                        };
                        if round_trip_ms.get() != Some(best) {
                            round_trip_ms.set(Some(best));
                            bus.emit(SessionEvent::RoundTripChanged { round_trip_ms: Some(best) });
                        }
                    }
                    Err(e) => log::warn!("Failed to read connection stats: {}", e),
                }
            }
        };
        self.task = Some(MonitorTask::spawn(spawner, sampler));
        log::debug!("Round-trip monitor started");
    }

    pub fn stop(&mut self) {
        if self.task.take().is_some() {
            log::debug!("Round-trip monitor stopped");
        }
        if self.round_trip_ms.take().is_some() {
            self.bus.emit(SessionEvent::RoundTripChanged { round_trip_ms: None });
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(MonitorTask::is_alive)
    }

    pub fn round_trip_ms(&self) -> Option<u32> {
        self.round_trip_ms.get()
    }
}
