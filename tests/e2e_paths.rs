//! E2E tests for parameter path building
//!
//! Every entity kind, the string/float classification, and the order in
//! which command properties are resolved.

use vmremote::path::{build, EntityKind, ValueEncoding};
use vmremote::properties::{
    BusProperty, CommandAction, CommandButton, CommandEq, RecorderProperty, StripProperty,
    VbanStreamProperty, VmState,
};
use vmremote::ParameterAddress;

#[test]
fn test_strip_and_bus_paths() {
    assert_eq!(
        build(EntityKind::Strip, 0, "Gain"),
        ("Strip[0].Gain".to_string(), ValueEncoding::FloatValue)
    );
    assert_eq!(
        build(EntityKind::Strip, 7, "Label"),
        ("Strip[7].Label".to_string(), ValueEncoding::StringValue)
    );
    assert_eq!(
        build(EntityKind::Bus, 3, "EQ.on"),
        ("Bus[3].EQ.on".to_string(), ValueEncoding::FloatValue)
    );
    assert_eq!(
        build(EntityKind::Bus, 1, "device.name"),
        ("Bus[1].device.name".to_string(), ValueEncoding::StringValue)
    );
}

#[test]
fn test_recorder_ignores_index() {
    assert_eq!(
        build(EntityKind::Recorder, 5, "play"),
        ("Recorder.play".to_string(), ValueEncoding::FloatValue)
    );
    assert_eq!(
        ParameterAddress::recorder(RecorderProperty::FastForward).path(),
        "Recorder.FF"
    );
}

#[test]
fn test_command_resolution() {
    assert_eq!(
        build(EntityKind::Command, 0, "Restart").0,
        "Command.Restart"
    );
    assert_eq!(
        ParameterAddress::vm_state(VmState::Lock).path(),
        "Command.Lock"
    );
    assert_eq!(
        ParameterAddress::button(4, CommandButton::StateOnly).path(),
        "Command.Button[4].StateOnly"
    );
}

#[test]
fn test_eq_actions_map_to_command_names() {
    let cases = [
        (CommandEq::SaveBus, "Command.SaveBUSEQ[2]"),
        (CommandEq::LoadBus, "Command.LoadBUSEQ[2]"),
        (CommandEq::SaveStrip, "Command.SaveStripEQ[2]"),
        (CommandEq::LoadStrip, "Command.LoadStripEQ[2]"),
    ];
    for (action, expected) in cases {
        let addr = ParameterAddress::eq(2, action);
        assert_eq!(addr.path(), expected);
        assert_eq!(addr.encoding(), ValueEncoding::FloatValue);
    }
}

#[test]
fn test_button_color_wins_over_generic_command() {
    // "Color" is a button property; it never becomes Command.Color
    let (path, encoding) = build(EntityKind::Command, 3, "Color");
    assert_eq!(path, "Command.Button[3].Color");
    assert_eq!(encoding, ValueEncoding::FloatValue);
}

#[test]
fn test_vban_paths() {
    assert_eq!(ParameterAddress::vban_enable().path(), "vban.Enable");
    assert_eq!(
        build(EntityKind::VbanGlobal, 9, "anything").0,
        "vban.Enable"
    );
    assert_eq!(
        ParameterAddress::vban_instream(2, VbanStreamProperty::Port).path(),
        "vban.instream[2].port"
    );
    assert_eq!(
        ParameterAddress::vban_outstream(0, VbanStreamProperty::SampleRate).path(),
        "vban.outstream[0].sr"
    );
}

#[test]
fn test_string_classification_is_exact() {
    for property in ["Label", "FadeTo", "FadeBy", "AppGain", "AppMute", "device.name"] {
        assert_eq!(
            build(EntityKind::Strip, 0, property).1,
            ValueEncoding::StringValue,
            "{property}"
        );
    }
    for property in ["Gain", "label", "device.sr", "name", "ip", "Mute"] {
        assert_eq!(
            build(EntityKind::Strip, 0, property).1,
            ValueEncoding::FloatValue,
            "{property}"
        );
    }
}

#[test]
fn test_typed_enums_agree_with_text() {
    assert_eq!(
        ParameterAddress::strip(1, StripProperty::PanX).path(),
        build(EntityKind::Strip, 1, "Pan_x").0
    );
    assert_eq!(
        ParameterAddress::bus(0, BusProperty::ModeAmix).path(),
        build(EntityKind::Bus, 0, "mode.Amix").0
    );
    assert_eq!(
        ParameterAddress::command(CommandAction::Shutdown).path(),
        "Command.Shutdown"
    );
}

#[test]
fn test_parse_round_trips_cli_paths() {
    for text in [
        "Strip[0].Gain",
        "Bus[4].device.name",
        "Recorder.stop",
        "Command.Button[1].State",
        "Command.SaveBUSEQ[0]",
        "vban.outstream[7].name",
    ] {
        let addr = ParameterAddress::parse(text).unwrap();
        assert_eq!(addr.path(), text);
    }
}
