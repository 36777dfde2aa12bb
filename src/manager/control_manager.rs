// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control manager for one house.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Local, NaiveDateTime};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{Error, ProtocolError};
use crate::evaluator::{EvaluationLog, RuleEvaluator, StateEvaluator};
use crate::protocol::{DeviceLink, LinkConfig, TcpDeviceLink, fetch_state, push_state};
use crate::state::{RawState, StateKey};

use super::usage::{IntruderTracker, LightUsage};
use super::{HouseId, HouseSnapshot, Settings};

/// Source of the wall-clock time handed to the evaluator.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// The outcome of one processed state update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// The state pushed to the device, without entered passcodes.
    pub state: RawState,
    /// What the evaluator decided.
    pub log: EvaluationLog,
}

/// Everything guarded by the house lock.
struct Inner<L> {
    link: L,
    settings: Settings,
    /// Settings changed while disconnected and still need pushing.
    settings_pending: bool,
    last_state: Option<RawState>,
    lights: LightUsage,
    intruders: IntruderTracker,
}

/// Orchestrates reads and writes of one house.
///
/// Every operation that talks to the device runs under a single
/// per-house lock, so operations on one house are totally ordered and
/// never interleave. Independent houses share nothing.
///
/// [`is_connected`](Self::is_connected) and
/// [`log_messages`](Self::log_messages) never wait for the lock.
///
/// # Examples
///
/// ```no_run
/// use hearth_lib::manager::{ControlManager, Settings};
/// use hearth_lib::protocol::LinkConfig;
/// use hearth_lib::state::{RawState, StateKey};
///
/// #[tokio::main]
/// async fn main() -> hearth_lib::Result<()> {
///     let settings = Settings::new()
///         .with_target_temperature(70)
///         .with_alarm_passcode("1234");
///     let house = ControlManager::tcp(LinkConfig::new("127.0.0.1"), settings)
///         .with_name("cabin");
///
///     house.connect().await?;
///
///     let mut update = RawState::new();
///     update.set(StateKey::LightState, true)?;
///     let evaluation = house.process_state_update(&update).await?;
///     for line in evaluation.log.lines() {
///         println!("{line}");
///     }
///
///     let snapshot = house.current_state().await?;
///     println!("light on for {} minutes", snapshot.light_minutes());
///     Ok(())
/// }
/// ```
pub struct ControlManager<L = TcpDeviceLink, E = RuleEvaluator> {
    id: HouseId,
    name: String,
    evaluator: E,
    inner: Mutex<Inner<L>>,
    connected: AtomicBool,
    log: RwLock<Vec<String>>,
    clock: Clock,
}

impl ControlManager {
    /// Creates a manager for a house reached over TCP, using the standard
    /// rule evaluator.
    #[must_use]
    pub fn tcp(config: LinkConfig, settings: Settings) -> Self {
        Self::new(TcpDeviceLink::new(config), RuleEvaluator::new(), settings)
    }
}

impl<L: DeviceLink, E: StateEvaluator> ControlManager<L, E> {
    /// Creates a manager over a link and an evaluator.
    ///
    /// The link is not connected; call [`connect`](Self::connect).
    #[must_use]
    pub fn new(link: L, evaluator: E, settings: Settings) -> Self {
        let id = HouseId::new();
        Self {
            id,
            name: format!("house-{}", id.short()),
            evaluator,
            inner: Mutex::new(Inner {
                link,
                settings,
                settings_pending: true,
                last_state: None,
                lights: LightUsage::new(),
                intruders: IntruderTracker::new(),
            }),
            connected: AtomicBool::new(false),
            log: RwLock::new(Vec::new()),
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Sets a human-readable house name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces the wall clock used to stamp evaluations.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Returns the house identifier.
    #[must_use]
    pub fn id(&self) -> HouseId {
        self.id
    }

    /// Returns the house name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    // =========================================================================
    // Connection
    // =========================================================================

    /// Connects to the device and pushes any settings that changed while
    /// disconnected.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the device cannot be reached or the
    /// settings push fails.
    pub async fn connect(&self) -> Result<(), Error> {
        let mut inner = self.inner.lock().await;

        let result = inner.link.connect().await;
        self.track(&inner, result)?;
        tracing::info!(house = %self.id, name = %self.name, "House connected");

        if inner.settings_pending {
            self.push_settings(&mut inner).await?;
        }
        Ok(())
    }

    /// Disconnects from the device.
    pub async fn disconnect(&self) {
        let mut inner = self.inner.lock().await;
        inner.link.disconnect().await;
        self.connected.store(false, Ordering::Release);
        tracing::info!(house = %self.id, "House disconnected");
    }

    /// Returns `true` if the device link was connected after the last
    /// operation.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Replaces the cached settings and pushes them to the device.
    ///
    /// While disconnected the push is deferred until the next
    /// [`connect`](Self::connect).
    ///
    /// # Errors
    ///
    /// Returns an error if a passcode is not representable on the wire or
    /// the push fails.
    pub async fn initialize_settings(&self, settings: Settings) -> Result<(), Error> {
        let mut inner = self.inner.lock().await;
        inner.settings = settings;
        self.push_or_defer(&mut inner).await
    }

    /// Merges settings keys from `update` into the cached settings and
    /// pushes them to the device.
    ///
    /// While disconnected the push is deferred until the next
    /// [`connect`](Self::connect).
    ///
    /// # Errors
    ///
    /// Returns an error if a passcode is not representable on the wire or
    /// the push fails.
    pub async fn update_settings(&self, update: &RawState) -> Result<(), Error> {
        let mut inner = self.inner.lock().await;
        inner.settings.merge(update);
        self.push_or_defer(&mut inner).await
    }

    /// Returns a copy of the cached settings.
    pub async fn settings(&self) -> Settings {
        self.inner.lock().await.settings.clone()
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Applies a caller-proposed partial state to the house.
    ///
    /// Settings carried by the update are merged into the cached settings
    /// and pushed if they changed. The device's current state, the settings
    /// and the update are then merged (later wins), evaluated, and the
    /// result is pushed to the device.
    ///
    /// Given passcodes are only honored when `update` carries them; they
    /// are dropped from the device state and from the pushed result.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` while disconnected, or the first error
    /// of the device round trips.
    pub async fn process_state_update(&self, update: &RawState) -> Result<Evaluation, Error> {
        let mut inner = self.inner.lock().await;

        let changed = inner.settings.absorb_update(update);
        inner.settings_pending |= changed;

        if !inner.link.is_connected() {
            self.connected.store(false, Ordering::Release);
            tracing::warn!(house = %self.id, "Rejected state update while disconnected");
            return Err(Error::NotConnected);
        }

        if inner.settings_pending {
            self.push_settings(&mut inner).await?;
        }

        let result = fetch_state(&mut inner.link).await;
        let mut merged = self.track(&inner, result)?;
        // Entered passcodes only count for the request that carries them
        merged.strip_transient();
        merged.merge(&inner.settings.to_raw_state()?);
        merged.merge(update);

        let mut log = EvaluationLog::new();
        let mut state = self.evaluator.evaluate(&merged, &mut log, (self.clock)());
        state.strip_transient();
        tracing::debug!(house = %self.id, entries = log.len(), "Evaluated state update");

        let result = push_state(&mut inner.link, state.clone()).await;
        self.track(&inner, result)?;

        inner.last_state = Some(state.clone());
        *self.log.write() = log.lines();

        Ok(Evaluation { state, log })
    }

    /// Reads the house state from the device.
    ///
    /// No rules run. The read updates the light-usage and intruder
    /// accounting. While disconnected an unknown snapshot is returned.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the read fails or the reply cannot be
    /// decoded.
    pub async fn current_state(&self) -> Result<HouseSnapshot, Error> {
        let mut inner = self.inner.lock().await;

        if !inner.link.is_connected() {
            self.connected.store(false, Ordering::Release);
            return Ok(self.snapshot(&inner, None));
        }

        let result = fetch_state(&mut inner.link).await;
        let mut state = self.track(&inner, result)?;
        state.strip_transient();

        let light_on = state.bool(StateKey::LightState).unwrap_or(false);
        inner.lights.observe(light_on, Instant::now());
        if inner.intruders.observe(state.bool(StateKey::IntruderState).unwrap_or(false)) {
            tracing::warn!(
                house = %self.id,
                occurrences = inner.intruders.occurrences(),
                "Intruder detected"
            );
        }

        inner.last_state = Some(state.clone());
        Ok(self.snapshot(&inner, Some(state)))
    }

    /// Returns the last state read from or pushed to the device.
    pub async fn last_known_state(&self) -> Option<RawState> {
        self.inner.lock().await.last_state.clone()
    }

    /// Returns the log lines of the most recent evaluation.
    #[must_use]
    pub fn log_messages(&self) -> Vec<String> {
        self.log.read().clone()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Mirrors the link's connection flag and lifts link errors.
    fn track<T>(&self, inner: &Inner<L>, result: Result<T, ProtocolError>) -> Result<T, Error> {
        self.connected
            .store(inner.link.is_connected(), Ordering::Release);
        result.map_err(|e| {
            tracing::warn!(house = %self.id, error = %e, "Device exchange failed");
            Error::from(e)
        })
    }

    async fn push_or_defer(&self, inner: &mut Inner<L>) -> Result<(), Error> {
        inner.settings_pending = true;
        if inner.link.is_connected() {
            self.push_settings(inner).await
        } else {
            tracing::debug!(house = %self.id, "Deferred settings push until connected");
            Ok(())
        }
    }

    async fn push_settings(&self, inner: &mut Inner<L>) -> Result<(), Error> {
        let settings = inner.settings.to_raw_state()?;
        let result = push_state(&mut inner.link, settings).await;
        self.track(inner, result)?;

        inner.settings_pending = false;
        tracing::info!(house = %self.id, "Pushed settings to device");
        Ok(())
    }

    fn snapshot(&self, inner: &Inner<L>, state: Option<RawState>) -> HouseSnapshot {
        HouseSnapshot {
            house: self.id,
            taken_at: (self.clock)(),
            state,
            settings: inner.settings.clone(),
            log: self.log_messages(),
            lights_on: inner.lights.total(),
            intruder_occurrences: inner.intruders.occurrences(),
            connected: inner.link.is_connected(),
        }
    }
}

impl<L, E> fmt::Debug for ControlManager<L, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlManager")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("connected", &self.connected.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
