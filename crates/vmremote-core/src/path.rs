//! Parameter path builder
//!
//! Maps a logical address (entity kind, index, property) to the engine's
//! textual parameter path and decides whether the value is read as a float
//! or as a string.
//!
//! | Kind | Path |
//! |------|------|
//! | Strip, Bus | `Strip[i].Gain` |
//! | Recorder | `Recorder.play` |
//! | Command | `Command.Restart` |
//! | Command button | `Command.Button[i].State` |
//! | Command EQ | `Command.SaveBUSEQ[i]` |
//! | VBAN | `vban.Enable`, `vban.instream[i].on` |

use crate::properties::{
    BusProperty, CommandAction, CommandButton, CommandEq, RecorderProperty, StripProperty,
    VbanStreamProperty, VmState,
};
use std::borrow::Cow;

/// Properties read with `VBVMR_GetParameterStringA`; everything else is a float
pub const STRING_PROPERTIES: [&str; 6] =
    ["Label", "FadeTo", "FadeBy", "AppGain", "AppMute", "device.name"];

const BUTTON_PROPERTIES: [&str; 4] = ["State", "StateOnly", "Trigger", "Color"];

/// Logical target of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Strip,
    Bus,
    Recorder,
    Command,
    Button,
    Eq,
    VbanGlobal,
    VbanInstream,
    VbanOutstream,
}

/// How a parameter value crosses the native boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueEncoding {
    FloatValue,
    StringValue,
}

/// Classify a property by exact, case-sensitive name
pub fn encoding_of(property: &str) -> ValueEncoding {
    if STRING_PROPERTIES.iter().any(|p| *p == property) {
        ValueEncoding::StringValue
    } else {
        ValueEncoding::FloatValue
    }
}

/// Resolve an address to its engine path and value encoding
pub fn build(kind: EntityKind, index: usize, property: &str) -> (String, ValueEncoding) {
    let path = match kind {
        EntityKind::Strip => format!("Strip[{index}].{property}"),
        EntityKind::Bus => format!("Bus[{index}].{property}"),
        EntityKind::Recorder => format!("Recorder.{property}"),
        EntityKind::Command | EntityKind::Eq => command_path(index, property),
        EntityKind::Button => format!("Command.Button[{index}].{property}"),
        EntityKind::VbanGlobal => "vban.Enable".to_string(),
        EntityKind::VbanInstream => format!("vban.instream[{index}].{property}"),
        EntityKind::VbanOutstream => format!("vban.outstream[{index}].{property}"),
    };
    (path, encoding_of(property))
}

/// First match wins: button leaves, then EQ actions, then the generic form
fn command_path(index: usize, property: &str) -> String {
    if BUTTON_PROPERTIES.iter().any(|p| *p == property) {
        return format!("Command.Button[{index}].{property}");
    }
    if let Some(action) = eq_action(property) {
        return format!("Command.{action}[{index}]");
    }
    format!("Command.{property}")
}

fn eq_action(property: &str) -> Option<&'static str> {
    match property {
        "SaveBus" => Some("SaveBUSEQ"),
        "LoadBus" => Some("LoadBUSEQ"),
        "SaveStrip" => Some("SaveStripEQ"),
        "LoadStrip" => Some("LoadStripEQ"),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

/// Split `Name[3].leaf` into `(3, Some("leaf"))` and `Name[3]` into `(3, None)`
fn indexed<'a>(text: &'a str, name: &str) -> Option<(usize, Option<&'a str>)> {
    let rest = text.strip_prefix(name)?.strip_prefix('[')?;
    let (index, rest) = rest.split_once(']')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = index.parse().ok()?;
    if rest.is_empty() {
        return Some((index, None));
    }
    let leaf = non_empty(rest.strip_prefix('.')?)?;
    Some((index, Some(leaf)))
}

/// Address of one engine parameter, built per call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterAddress {
    pub kind: EntityKind,
    /// Zero-based ordinal; ignored by kinds without an index
    pub index: usize,
    pub property: Cow<'static, str>,
}

impl ParameterAddress {
    pub fn new(kind: EntityKind, index: usize, property: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            index,
            property: property.into(),
        }
    }

    pub fn strip(index: usize, property: StripProperty) -> Self {
        Self::new(EntityKind::Strip, index, property)
    }

    pub fn bus(index: usize, property: BusProperty) -> Self {
        Self::new(EntityKind::Bus, index, property)
    }

    pub fn recorder(property: RecorderProperty) -> Self {
        Self::new(EntityKind::Recorder, 0, property)
    }

    pub fn command(action: CommandAction) -> Self {
        Self::new(EntityKind::Command, 0, action)
    }

    pub fn vm_state(state: VmState) -> Self {
        Self::new(EntityKind::Command, 0, state)
    }

    pub fn button(index: usize, property: CommandButton) -> Self {
        Self::new(EntityKind::Button, index, property)
    }

    pub fn eq(index: usize, action: CommandEq) -> Self {
        Self::new(EntityKind::Eq, index, action)
    }

    pub fn vban_enable() -> Self {
        Self::new(EntityKind::VbanGlobal, 0, "Enable")
    }

    pub fn vban_instream(index: usize, property: VbanStreamProperty) -> Self {
        Self::new(EntityKind::VbanInstream, index, property)
    }

    pub fn vban_outstream(index: usize, property: VbanStreamProperty) -> Self {
        Self::new(EntityKind::VbanOutstream, index, property)
    }

    /// Parse an engine path back into an address
    ///
    /// Accepts exactly the forms [`build`] produces.
    pub fn parse(path: &str) -> Option<Self> {
        let owned = |s: &str| Cow::Owned(s.to_string());

        if path == "vban.Enable" {
            return Some(Self::vban_enable());
        }
        if let Some(rest) = path.strip_prefix("Recorder.") {
            return non_empty(rest).map(|p| Self::new(EntityKind::Recorder, 0, owned(p)));
        }
        if let Some(rest) = path.strip_prefix("Command.") {
            if let Some((index, leaf)) = indexed(rest, "Button") {
                return Some(Self::new(EntityKind::Button, index, owned(leaf?)));
            }
            for (action, property) in [
                ("SaveBUSEQ", "SaveBus"),
                ("LoadBUSEQ", "LoadBus"),
                ("SaveStripEQ", "SaveStrip"),
                ("LoadStripEQ", "LoadStrip"),
            ] {
                if let Some((index, None)) = indexed(rest, action) {
                    return Some(Self::new(EntityKind::Eq, index, property));
                }
            }
            // Button and EQ leaves never build to the generic form
            return non_empty(rest)
                .filter(|p| !BUTTON_PROPERTIES.iter().any(|b| b == p) && eq_action(p).is_none())
                .map(|p| Self::new(EntityKind::Command, 0, owned(p)));
        }
        for (prefix, kind) in [
            ("Strip", EntityKind::Strip),
            ("Bus", EntityKind::Bus),
            ("vban.instream", EntityKind::VbanInstream),
            ("vban.outstream", EntityKind::VbanOutstream),
        ] {
            if let Some((index, Some(leaf))) = indexed(path, prefix) {
                return Some(Self::new(kind, index, owned(leaf)));
            }
        }
        None
    }

    /// Engine path and encoding for this address
    pub fn resolve(&self) -> (String, ValueEncoding) {
        build(self.kind, self.index, &self.property)
    }

    /// Engine path only
    pub fn path(&self) -> String {
        self.resolve().0
    }

    pub fn encoding(&self) -> ValueEncoding {
        encoding_of(&self.property)
    }
}

impl std::fmt::Display for ParameterAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}
