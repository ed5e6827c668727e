//! Sensor subscriptions.
//!
//! The backend gets a [`SensorSink`] per attached sensor and pushes readings
//! into a bounded channel owned by the session. Sinks hold no reference to
//! the session: once the session drops its receiver every send fails and
//! the backend's callback becomes a no-op.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use simdrive_scoring::InfractionEvent;

/// Readings buffered between two ticks before new ones are dropped.
pub const SENSOR_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Collision,
    LaneInvasion,
    Gnss,
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] = [
        SensorKind::Collision,
        SensorKind::LaneInvasion,
        SensorKind::Gnss,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SensorKind::Collision => "collision",
            SensorKind::LaneInvasion => "lane_invasion",
            SensorKind::Gnss => "gnss",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Backend sensor handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SensorId(pub u64);

/// Latitude/longitude fix in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GnssFix {
    pub latitude: f64,
    pub longitude: f64,
}

/// One reading delivered by a sensor callback.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    Collision(InfractionEvent),
    LaneInvasion(InfractionEvent),
    Gnss(GnssFix),
}

impl SensorEvent {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorEvent::Collision(_) => SensorKind::Collision,
            SensorEvent::LaneInvasion(_) => SensorKind::LaneInvasion,
            SensorEvent::Gnss(_) => SensorKind::Gnss,
        }
    }
}

/// Sending half handed to the backend for one sensor.
#[derive(Clone)]
pub struct SensorSink {
    kind: SensorKind,
    tx: Sender<SensorEvent>,
    dropped: Arc<AtomicU64>,
    open: Arc<AtomicBool>,
}

impl SensorSink {
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Deliver a reading. Never blocks.
    ///
    /// Returns `false` when the reading was discarded: the queue is full, the
    /// reading belongs to another sensor kind, or the session is gone.
    pub fn send(&self, event: SensorEvent) -> bool {
        if event.kind() != self.kind {
            return false;
        }
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Whether the owning session still listens.
    pub fn is_connected(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

impl fmt::Debug for SensorSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorSink")
            .field("kind", &self.kind)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Receiving side owned by the session.
#[derive(Debug)]
pub(crate) struct SensorHub {
    tx: Sender<SensorEvent>,
    rx: Receiver<SensorEvent>,
    dropped: Arc<AtomicU64>,
    open: Arc<AtomicBool>,
}

impl SensorHub {
    pub(crate) fn new() -> Self {
        let (tx, rx) = channel::bounded(SENSOR_QUEUE_CAPACITY);
        Self {
            tx,
            rx,
            dropped: Arc::new(AtomicU64::new(0)),
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    pub(crate) fn sink(&self, kind: SensorKind) -> SensorSink {
        SensorSink {
            kind,
            tx: self.tx.clone(),
            dropped: Arc::clone(&self.dropped),
            open: Arc::clone(&self.open),
        }
    }

    /// Everything delivered since the last drain, in arrival order.
    pub(crate) fn drain(&self) -> Vec<SensorEvent> {
        self.rx.try_iter().collect()
    }

    /// Readings discarded because the queue was full.
    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for SensorHub {
    fn drop(&mut self) {
        self.open.store(false, Ordering::Release);
    }
}
