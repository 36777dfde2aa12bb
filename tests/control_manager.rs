// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the control manager and historian over an
//! in-memory device.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use hearth_lib::manager::{
    ChannelRecorder, ControlManager, Historian, JsonLinesRecorder, Recorder, Settings,
};
use hearth_lib::protocol::{DeviceLink, Frame};
use hearth_lib::state::{RawState, StateKey};
use hearth_lib::{Error, ProtocolError, RuleEvaluator};
use parking_lot::Mutex;

// ============================================================================
// In-memory device
// ============================================================================

/// Shared view of what the fake device holds and was sent.
#[derive(Debug, Clone, Default)]
struct Device {
    state: Arc<Mutex<RawState>>,
    sent: Arc<Mutex<Vec<Frame>>>,
}

impl Device {
    fn with_state(state: RawState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            sent: Arc::default(),
        }
    }

    fn set(&self, key: StateKey, value: bool) {
        self.state.lock().set(key, value).unwrap();
    }

    fn state(&self) -> RawState {
        self.state.lock().clone()
    }

    fn sent(&self) -> Vec<Frame> {
        self.sent.lock().clone()
    }
}

/// Link answering `GS` with the stored state and applying `SS`.
struct StubLink {
    device: Device,
    connected: bool,
}

impl StubLink {
    fn new(device: &Device) -> Self {
        Self {
            device: device.clone(),
            connected: false,
        }
    }
}

impl DeviceLink for StubLink {
    async fn connect(&mut self) -> Result<(), ProtocolError> {
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn exchange(&mut self, frame: &Frame) -> Result<Frame, ProtocolError> {
        if !self.connected {
            return Err(ProtocolError::NotConnected);
        }
        self.device.sent.lock().push(frame.clone());

        // Give other tasks a chance to run mid-operation
        tokio::task::yield_now().await;

        match frame {
            Frame::GetState => Ok(Frame::StateUpdate(self.device.state())),
            Frame::SetState(state) => {
                self.device.state.lock().merge(state);
                Ok(Frame::Ack)
            }
            Frame::StateUpdate(_) | Frame::Ack => Ok(Frame::Ack),
        }
    }
}

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn settings() -> Settings {
    // Equal bounds keep the night lock out of the way
    Settings::new()
        .with_target_temperature(70)
        .with_night_window(0, 0)
        .with_alarm_passcode("1234")
        .with_door_lock_passcode("0000")
}

fn house(device: &Device) -> ControlManager<StubLink> {
    ControlManager::new(StubLink::new(device), RuleEvaluator::new(), settings()).with_clock(noon)
}

fn update(pairs: &[(StateKey, bool)]) -> RawState {
    let mut state = RawState::new();
    for &(key, value) in pairs {
        state.set(key, value).unwrap();
    }
    state
}

fn initial_state() -> RawState {
    let mut state = RawState::new();
    state.set(StateKey::TempReading, 70).unwrap();
    state.set(StateKey::DoorState, false).unwrap();
    state.set(StateKey::LightState, false).unwrap();
    state.set(StateKey::ProximityState, false).unwrap();
    state
}

// ============================================================================
// State updates
// ============================================================================

#[tokio::test]
async fn connect_pushes_settings_then_update_round_trips() {
    let device = Device::with_state(initial_state());
    let house = house(&device);
    house.connect().await.unwrap();
    assert!(house.is_connected());

    let evaluation = house
        .process_state_update(&update(&[
            (StateKey::ProximityState, true),
            (StateKey::LightState, true),
        ]))
        .await
        .unwrap();

    assert_eq!(evaluation.state.bool(StateKey::LightState), Some(true));
    assert!(evaluation.log.contains("Light on"));

    let sent = device.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0], Frame::SetState(settings().to_raw_state().unwrap()));
    assert_eq!(sent[1], Frame::GetState);
    assert_eq!(sent[2], Frame::SetState(evaluation.state.clone()));

    assert_eq!(device.state().bool(StateKey::LightState), Some(true));
    assert_eq!(house.last_known_state().await, Some(evaluation.state));
    assert_eq!(house.log_messages(), evaluation.log.lines());
}

#[tokio::test]
async fn update_is_evaluated_against_device_state() {
    let device = Device::with_state(initial_state());
    let house = house(&device);
    house.connect().await.unwrap();

    // Nobody home, so the light stays off
    let evaluation = house
        .process_state_update(&update(&[(StateKey::LightState, true)]))
        .await
        .unwrap();

    assert_eq!(evaluation.state.bool(StateKey::LightState), Some(false));
    assert!(evaluation.log.contains("Cannot turn on light because user not home"));
    assert_eq!(device.state().bool(StateKey::LightState), Some(false));
}

#[tokio::test]
async fn settings_in_update_are_absorbed_and_pushed_first() {
    let device = Device::with_state(initial_state());
    let house = house(&device);
    house.connect().await.unwrap();
    device.sent.lock().clear();

    let mut change = RawState::new();
    change.set(StateKey::TargetTemp, 65).unwrap();
    house.process_state_update(&change).await.unwrap();

    assert_eq!(house.settings().await.target_temperature, Some(65));

    let sent = device.sent();
    assert_eq!(sent.len(), 3);
    match &sent[0] {
        Frame::SetState(pushed) => assert_eq!(pushed.int(StateKey::TargetTemp), Some(65)),
        other => panic!("expected a settings push, got {other:?}"),
    }
    assert_eq!(sent[1], Frame::GetState);
}

#[tokio::test]
async fn concurrent_updates_match_a_serial_order() {
    let arrive = update(&[
        (StateKey::ProximityState, true),
        (StateKey::LightState, true),
    ]);
    let leave = update(&[(StateKey::ProximityState, false)]);

    let serial = |first: RawState, second: RawState| async move {
        let device = Device::with_state(initial_state());
        let house = house(&device);
        house.connect().await.unwrap();
        house.process_state_update(&first).await.unwrap();
        house.process_state_update(&second).await.unwrap();
        device.state()
    };
    let arrive_then_leave = serial(arrive.clone(), leave.clone()).await;
    let leave_then_arrive = serial(leave.clone(), arrive.clone()).await;
    assert_ne!(arrive_then_leave, leave_then_arrive);

    for _ in 0..16 {
        let device = Device::with_state(initial_state());
        let house = Arc::new(house(&device));
        house.connect().await.unwrap();

        let (a, b) = tokio::join!(
            house.process_state_update(&arrive),
            house.process_state_update(&leave)
        );
        a.unwrap();
        b.unwrap();

        let state = device.state();
        assert!(
            state == arrive_then_leave || state == leave_then_arrive,
            "interleaved result: {state:?}"
        );
    }
}

// ============================================================================
// Passcodes
// ============================================================================

#[tokio::test]
async fn entered_lock_passcode_is_not_reused() {
    let device = Device::with_state(initial_state());
    let house = house(&device);
    house.connect().await.unwrap();

    let mut unlock = update(&[
        (StateKey::ProximityState, true),
        (StateKey::DoorLockState, true),
    ]);
    unlock.set(StateKey::GivenDoorLockPasscode, "0000").unwrap();
    unlock.set(StateKey::GivenPasscode, "1234").unwrap();
    let evaluation = house.process_state_update(&unlock).await.unwrap();
    assert_eq!(evaluation.state.bool(StateKey::DoorLockState), Some(false));

    // Neither entered code is left on the device
    let stored = device.state();
    assert!(!stored.contains(StateKey::GivenDoorLockPasscode));
    assert!(!stored.contains(StateKey::GivenPasscode));
    assert_eq!(stored.text(StateKey::DoorLockPasscode), Some("0000"));

    let evaluation = house
        .process_state_update(&update(&[(StateKey::DoorLockState, true)]))
        .await
        .unwrap();
    assert_eq!(evaluation.state.bool(StateKey::DoorLockState), Some(true));
    assert!(evaluation.log.contains("Invalid door lock passcode"));
    assert_eq!(device.state().bool(StateKey::DoorLockState), Some(true));
}

#[tokio::test]
async fn stale_passcode_on_device_is_ignored() {
    let mut stale = initial_state();
    stale.set(StateKey::ProximityState, true).unwrap();
    stale.set(StateKey::GivenDoorLockPasscode, "0000").unwrap();
    let device = Device::with_state(stale);
    let house = house(&device);
    house.connect().await.unwrap();

    let evaluation = house
        .process_state_update(&update(&[(StateKey::DoorLockState, true)]))
        .await
        .unwrap();

    assert_eq!(evaluation.state.bool(StateKey::DoorLockState), Some(true));
    assert!(!evaluation.state.contains(StateKey::GivenDoorLockPasscode));
}

#[tokio::test]
async fn recorded_snapshot_carries_no_passcodes() {
    let device = Device::with_state(initial_state());
    let house = house(&device);
    house.connect().await.unwrap();

    let snapshot = house.current_state().await.unwrap();
    // The codes are on the device and in the snapshot's state
    let state = snapshot.state.as_ref().unwrap();
    assert_eq!(state.text(StateKey::AlarmPasscode), Some("1234"));

    let recorder = JsonLinesRecorder::new(Vec::new());
    recorder.record(&snapshot).unwrap();
    let line = String::from_utf8(recorder.into_inner()).unwrap();

    assert!(!line.contains("PASSCODE"));
    assert!(!line.contains("passcode"));
    assert!(!line.contains("\"1234\""));
    assert!(!line.contains("\"0000\""));
    assert!(line.contains("\"TT\":70"));
}

// ============================================================================
// Connection handling
// ============================================================================

#[tokio::test]
async fn settings_changed_offline_are_pushed_on_connect() {
    let device = Device::with_state(initial_state());
    let house = house(&device);

    let mut change = RawState::new();
    change.set(StateKey::AlarmDelay, 30).unwrap();
    house.update_settings(&change).await.unwrap();
    assert!(device.sent().is_empty());

    house.connect().await.unwrap();

    let sent = device.sent();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        Frame::SetState(pushed) => {
            assert_eq!(pushed.int(StateKey::AlarmDelay), Some(30));
            assert_eq!(pushed.int(StateKey::TargetTemp), Some(70));
            assert_eq!(pushed.text(StateKey::AlarmPasscode), Some("1234"));
        }
        other => panic!("expected a settings push, got {other:?}"),
    }

    // Nothing left pending: a reconnect does not push again
    house.connect().await.unwrap();
    assert_eq!(device.sent().len(), 1);
}

#[tokio::test]
async fn settings_push_immediately_while_connected() {
    let device = Device::with_state(initial_state());
    let house = house(&device);
    house.connect().await.unwrap();

    house
        .initialize_settings(Settings::new().with_target_temperature(75))
        .await
        .unwrap();

    assert_eq!(device.sent().len(), 2);
    assert_eq!(device.state().int(StateKey::TargetTemp), Some(75));
}

#[tokio::test]
async fn disconnected_house_reads_unknown_and_rejects_updates() {
    let device = Device::with_state(initial_state());
    let house = house(&device);
    house.connect().await.unwrap();
    house.disconnect().await;
    assert!(!house.is_connected());

    let snapshot = house.current_state().await.unwrap();
    assert!(!snapshot.is_known());
    assert!(!snapshot.connected);
    assert_eq!(snapshot.taken_at, noon());

    let result = house
        .process_state_update(&update(&[(StateKey::LightState, true)]))
        .await;
    assert!(matches!(result, Err(Error::NotConnected)));
}

// ============================================================================
// Accounting
// ============================================================================

#[tokio::test]
async fn intruder_alerts_count_rising_edges() {
    let device = Device::with_state(initial_state());
    let house = house(&device);
    house.connect().await.unwrap();

    device.set(StateKey::IntruderState, true);
    assert_eq!(house.current_state().await.unwrap().intruder_occurrences, 1);
    assert_eq!(house.current_state().await.unwrap().intruder_occurrences, 1);

    device.set(StateKey::IntruderState, false);
    assert_eq!(house.current_state().await.unwrap().intruder_occurrences, 1);

    device.set(StateKey::IntruderState, true);
    assert_eq!(house.current_state().await.unwrap().intruder_occurrences, 2);
}

#[tokio::test(start_paused = true)]
async fn light_usage_accumulates_between_reads() {
    let device = Device::with_state(initial_state());
    let house = house(&device);
    house.connect().await.unwrap();

    device.set(StateKey::LightState, true);
    house.current_state().await.unwrap();

    tokio::time::advance(Duration::from_secs(180)).await;
    let snapshot = house.current_state().await.unwrap();
    assert_eq!(snapshot.lights_on, Duration::from_secs(180));

    device.set(StateKey::LightState, false);
    tokio::time::advance(Duration::from_secs(60)).await;
    let snapshot = house.current_state().await.unwrap();
    assert_eq!(snapshot.lights_on, Duration::from_secs(240));

    tokio::time::advance(Duration::from_secs(600)).await;
    let snapshot = house.current_state().await.unwrap();
    assert_eq!(snapshot.lights_on, Duration::from_secs(240));
    assert_eq!(snapshot.light_minutes(), 4);
}

// ============================================================================
// Historian
// ============================================================================

#[tokio::test(start_paused = true)]
async fn historian_records_until_stopped() {
    let device = Device::with_state(initial_state());
    let house = Arc::new(house(&device));
    house.connect().await.unwrap();

    let (recorder, mut snapshots) = ChannelRecorder::new(64);
    let historian = Historian::spawn(Arc::clone(&house), recorder, Duration::from_secs(60));

    for _ in 0..3 {
        let snapshot = snapshots.recv().await.unwrap();
        assert!(snapshot.is_known());
        assert_eq!(snapshot.house, house.id());
    }

    let recorded = historian.stop().await;
    assert!(recorded >= 3);
}

#[tokio::test(start_paused = true)]
async fn historian_skips_unknown_snapshots() {
    let device = Device::with_state(initial_state());
    let house = Arc::new(house(&device));

    let recorder = Arc::new(JsonLinesRecorder::new(Vec::new()));
    let historian = Historian::spawn(Arc::clone(&house), Arc::clone(&recorder), Duration::from_secs(1));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(historian.stop().await, 0);

    let recorder = Arc::try_unwrap(recorder).unwrap();
    assert!(recorder.into_inner().is_empty());
}
