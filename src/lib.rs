//! vmremote - Voicemeeter remote control client
//!
//! This library re-exports the remote client, parameter addressing,
//! and device directory from `vmremote-core`.
//!
//! The `vmremote` binary is a thin command-line front end over it.

pub use vmremote_core::properties;
pub use vmremote_core::{config, discovery, mock, path};

pub use vmremote_core::{
    ConnectionState, Device, DeviceDirectory, EngineKind, EngineVersion, LevelType,
    ParameterAddress, ParameterValue, Remote, RemoteConfig, RemoteError, RemoteHandle,
    SettleStrategy, Subscription, Value,
};
pub use vmremote_core::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_SETTLE_DELAY_MS, VERSION};
