//! vmremote Core - Voicemeeter Remote API client
//!
//! This library drives a running Voicemeeter engine through its native
//! remote interface. It resolves typed parameter addresses to the engine's
//! textual paths, guards every call with the connection lifecycle, and
//! fans out change notifications from a background poller.

pub mod config;
pub mod devices;
pub mod discovery;
pub mod error;
pub mod handle;
pub mod mock;
pub mod native;
pub mod path;
pub mod poller;
pub mod properties;
pub mod remote;
pub mod state;
pub mod value;

pub use config::{RemoteConfig, SettleStrategy};
pub use devices::{Device, DeviceDirectory};
pub use error::{RemoteError, Result};
pub use handle::RemoteHandle;
pub use native::RemoteApi;
pub use path::{EntityKind, ParameterAddress, ValueEncoding};
pub use poller::{ListenerId, Subscription};
pub use remote::Remote;
pub use state::{ConnectionState, EngineKind, EngineVersion, LevelType};
pub use value::{ParameterValue, Value};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default change poll period in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Default settle window after a script write, in milliseconds
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 200;

/// Size of the device name and hardware id buffers
pub const DEVICE_TEXT_LEN: usize = 256;

/// Size of the string parameter buffer
pub const PARAMETER_TEXT_LEN: usize = 512;
