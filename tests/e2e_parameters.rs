//! E2E tests for reading and writing parameters
//!
//! Writes go out as scripts and are only visible after the settle
//! window; reads pick the float or string call by property.

use approx::assert_relative_eq;
use std::time::{Duration, Instant};
use vmremote::mock::MockEngine;
use vmremote::properties::{
    BusProperty, CommandAction, CommandButton, CommandEq, RecorderProperty, StripProperty,
    VbanStreamProperty, VmState,
};
use vmremote::{LevelType, ParameterValue, Remote, RemoteConfig, RemoteError, Value};

fn connected(settle_delay_ms: u64) -> (Remote, MockEngine) {
    let engine = MockEngine::new();
    let config = RemoteConfig {
        poll_interval_ms: 1,
        settle_delay_ms,
        ..Default::default()
    };
    let remote = Remote::with_api(engine.clone(), config);
    remote.connect().unwrap();
    (remote, engine)
}

#[test]
fn test_strip_gain_round_trip_after_settle() {
    let (remote, _engine) = connected(20);

    let start = Instant::now();
    remote
        .set_strip_parameter(0, StripProperty::Gain, -6.0)
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(20));

    let gain = remote.get_strip_parameter(0, StripProperty::Gain).unwrap();
    assert_relative_eq!(gain.as_f32().unwrap(), -6.0);
}

#[test]
fn test_setters_emit_scripts() {
    let (remote, engine) = connected(0);

    remote.set_bus_parameter(1, BusProperty::Mute, true).unwrap();
    remote
        .set_strip_parameter(2, StripProperty::Label, "Mic")
        .unwrap();
    remote
        .set_strip_parameter(0, StripProperty::FadeTo, ParameterValue::fade(-12.0, 500))
        .unwrap();
    remote
        .set_recorder_parameter(RecorderProperty::Play, 1)
        .unwrap();
    remote
        .execute_command_action(CommandAction::Restart, 1)
        .unwrap();
    remote
        .execute_button_action(5, CommandButton::Trigger, 1)
        .unwrap();
    remote.execute_eq_action(0, CommandEq::SaveBus, 1).unwrap();

    assert_eq!(
        engine.scripts(),
        vec![
            "Bus[1].Mute=1;",
            "Strip[2].Label=\"Mic\";",
            "Strip[0].FadeTo=(-12.0, 500);",
            "Recorder.play=1;",
            "Command.Restart=1;",
            "Command.Button[5].Trigger=1;",
            "Command.SaveBUSEQ[0]=1;",
        ]
    );
}

#[test]
fn test_string_reads_use_string_call() {
    let (remote, engine) = connected(0);
    engine.set_text("Bus[0].device.name", "Speakers");

    let value = remote
        .get_bus_parameter(0, BusProperty::DeviceName)
        .unwrap();
    assert_eq!(value, Value::Text("Speakers".into()));
    assert!(engine.calls().contains(&"VBVMR_GetParameterStringA"));
}

#[test]
fn test_command_state_reads() {
    let (remote, engine) = connected(0);
    engine.set_float("Command.Lock", 1.0);
    engine.set_float("Command.Button[2].State", 0.0);

    assert_eq!(remote.get_vm_state(VmState::Lock).unwrap().as_bool(), Some(true));
    assert_eq!(
        remote
            .get_button_parameter(2, CommandButton::State)
            .unwrap()
            .as_bool(),
        Some(false)
    );
}

#[test]
fn test_vban_parameters() {
    let (remote, engine) = connected(0);

    remote.set_vban_enabled(true).unwrap();
    assert!(remote.get_vban_enabled().unwrap());

    remote
        .set_vban_outstream_parameter(1, VbanStreamProperty::Port, 6980)
        .unwrap();
    let port = remote
        .get_vban_outstream_parameter(1, VbanStreamProperty::Port)
        .unwrap();
    assert_relative_eq!(port.as_f32().unwrap(), 6980.0);

    engine.set_float("vban.instream[0].quality", 2.0);
    let quality = remote
        .get_vban_instream_parameter(0, VbanStreamProperty::Quality)
        .unwrap();
    assert_relative_eq!(quality.as_f32().unwrap(), 2.0);
}

#[test]
fn test_unknown_parameter_is_native_error() {
    let (remote, _engine) = connected(0);
    let err = remote
        .get_strip_parameter(9, StripProperty::Gain)
        .unwrap_err();
    assert!(matches!(
        err,
        RemoteError::NativeCall {
            call: "VBVMR_GetParameterFloat",
            ..
        }
    ));
}

#[test]
fn test_rejected_script_is_not_an_error() {
    let (remote, engine) = connected(0);
    remote.set_raw("no statements here").unwrap();
    assert_eq!(engine.scripts(), vec!["no statements here"]);
}

#[test]
fn test_level_read() {
    let (remote, engine) = connected(0);
    engine.set_level(3, 4, 0.25);
    let level = remote.level(LevelType::Output, 4).unwrap();
    assert_relative_eq!(level, 0.25);
}
