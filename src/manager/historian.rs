// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic recording of house state.
//!
//! A [`Historian`] reads a house on a fixed period and hands every known
//! snapshot to a [`Recorder`]. It runs as a tokio task and stops
//! deterministically through [`Historian::stop`].

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::error::RecordError;
use crate::evaluator::StateEvaluator;
use crate::protocol::DeviceLink;

use super::{ControlManager, HouseSnapshot};

/// Destination of recorded snapshots.
pub trait Recorder: Send + Sync + 'static {
    /// Records one snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if the snapshot could not be stored.
    fn record(&self, snapshot: &HouseSnapshot) -> Result<(), RecordError>;
}

// ============================================================================
// ChannelRecorder - Hands snapshots to an async consumer
// ============================================================================

/// Forwards snapshots over a bounded channel.
///
/// When the channel is full the snapshot is dropped with a warning so a
/// slow consumer never stalls the house.
#[derive(Debug, Clone)]
pub struct ChannelRecorder {
    tx: mpsc::Sender<HouseSnapshot>,
}

impl ChannelRecorder {
    /// Creates a recorder and the receiving end of its channel.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<HouseSnapshot>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl Recorder for ChannelRecorder {
    fn record(&self, snapshot: &HouseSnapshot) -> Result<(), RecordError> {
        match self.tx.try_send(snapshot.clone()) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(house = %snapshot.house, "Recorder channel full, dropping snapshot");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(RecordError::ChannelClosed),
        }
    }
}

// ============================================================================
// JsonLinesRecorder - One JSON document per line
// ============================================================================

/// Writes each snapshot as one line of JSON.
#[derive(Debug)]
pub struct JsonLinesRecorder<W> {
    writer: parking_lot::Mutex<W>,
}

impl<W: Write + Send + 'static> JsonLinesRecorder<W> {
    /// Creates a recorder writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: parking_lot::Mutex::new(writer),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send + 'static> Recorder for JsonLinesRecorder<W> {
    fn record(&self, snapshot: &HouseSnapshot) -> Result<(), RecordError> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, snapshot)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl<R: Recorder> Recorder for Arc<R> {
    fn record(&self, snapshot: &HouseSnapshot) -> Result<(), RecordError> {
        (**self).record(snapshot)
    }
}

// ============================================================================
// Historian - The background task
// ============================================================================

/// Handle to a running periodic recorder.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use hearth_lib::manager::{ChannelRecorder, ControlManager, Historian, Settings};
/// use hearth_lib::protocol::LinkConfig;
///
/// # async fn example() -> hearth_lib::Result<()> {
/// let house = Arc::new(ControlManager::tcp(LinkConfig::new("127.0.0.1"), Settings::new()));
/// house.connect().await?;
///
/// let (recorder, mut snapshots) = ChannelRecorder::new(16);
/// let historian = Historian::spawn(Arc::clone(&house), recorder, Duration::from_secs(60));
///
/// if let Some(snapshot) = snapshots.recv().await {
///     println!("{:?}", snapshot.state);
/// }
///
/// let recorded = historian.stop().await;
/// println!("recorded {recorded} snapshots");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Historian {
    stop: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl Historian {
    /// Starts recording `manager` every `period`.
    ///
    /// The first read happens immediately. Unknown snapshots are skipped;
    /// failed reads and recorder errors are logged and the loop continues.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn spawn<L, E, R>(manager: Arc<ControlManager<L, E>>, recorder: R, period: Duration) -> Self
    where
        L: DeviceLink + 'static,
        E: StateEvaluator + 'static,
        R: Recorder,
    {
        let (stop, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut recorded = 0u64;

            tracing::debug!(house = %manager.id(), ?period, "Historian started");
            loop {
                tokio::select! {
                    biased;

                    _ = stop_rx.changed() => break,

                    _ = ticker.tick() => {
                        match manager.current_state().await {
                            Ok(snapshot) if snapshot.is_known() => match recorder.record(&snapshot) {
                                Ok(()) => recorded += 1,
                                Err(e) => {
                                    tracing::warn!(house = %manager.id(), error = %e, "Failed to record snapshot");
                                }
                            },
                            Ok(_) => {
                                tracing::debug!(house = %manager.id(), "Skipping unknown snapshot");
                            }
                            Err(e) => {
                                tracing::error!(house = %manager.id(), error = %e, "Failed to read house state");
                            }
                        }
                    }
                }
            }
            tracing::debug!(house = %manager.id(), recorded, "Historian stopped");
            recorded
        });

        Self { stop, task }
    }

    /// Stops the task and waits for it to finish.
    ///
    /// Returns the number of snapshots recorded.
    pub async fn stop(self) -> u64 {
        // The task may already be gone; that is a stop too
        let _ = self.stop.send(true);
        match self.task.await {
            Ok(recorded) => recorded,
            Err(e) => {
                tracing::error!(error = %e, "Historian task failed");
                0
            }
        }
    }
}
