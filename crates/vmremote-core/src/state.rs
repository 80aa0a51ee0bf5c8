//! Connection lifecycle and engine identity

use crate::error::{RemoteError, Result};
use serde::Serialize;
use std::fmt;

/// Lifecycle of a [`crate::Remote`]
///
/// `Uninitialised -> Initialised -> Connected`, and back to `Initialised`
/// on disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No remote library bound yet
    Uninitialised,
    /// Library bound, not logged in
    Initialised,
    /// Logged in; parameter access allowed
    Connected,
}

/// Which Voicemeeter edition is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Standard,
    Banana,
    Potato,
}

impl EngineKind {
    /// Map the code reported by `VBVMR_GetVoicemeeterType`
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(Self::Standard),
            2 => Ok(Self::Banana),
            3 => Ok(Self::Potato),
            _ => Err(RemoteError::EngineNotInstalled { code }),
        }
    }

    /// Code accepted by `VBVMR_RunVoicemeeter`
    pub fn code(self) -> i32 {
        match self {
            Self::Standard => 1,
            Self::Banana => 2,
            Self::Potato => 3,
        }
    }

    /// Number of (strips, buses) this edition exposes
    pub fn layout(self) -> (usize, usize) {
        match self {
            Self::Standard => (3, 2),
            Self::Banana => (5, 5),
            Self::Potato => (8, 8),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "Voicemeeter",
            Self::Banana => "Voicemeeter Banana",
            Self::Potato => "Voicemeeter Potato",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" | "voicemeeter" | "1" => Ok(Self::Standard),
            "banana" | "2" => Ok(Self::Banana),
            "potato" | "3" => Ok(Self::Potato),
            other => Err(format!("unknown Voicemeeter type: {other}")),
        }
    }
}

/// Engine version, one byte per component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct EngineVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub build: u8,
}

impl EngineVersion {
    /// Decode `major << 24 | minor << 16 | patch << 8 | build`
    pub fn from_packed(packed: i32) -> Self {
        let [major, minor, patch, build] = (packed as u32).to_be_bytes();
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    pub fn packed(self) -> i32 {
        u32::from_be_bytes([self.major, self.minor, self.patch, self.build]) as i32
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.build
        )
    }
}

/// Metering point for `VBVMR_GetLevel`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelType {
    PreFaderInput = 0,
    PostFaderInput = 1,
    PostMuteInput = 2,
    Output = 3,
}

impl LevelType {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::PreFaderInput),
            1 => Some(Self::PostFaderInput),
            2 => Some(Self::PostMuteInput),
            3 => Some(Self::Output),
            _ => None,
        }
    }
}
