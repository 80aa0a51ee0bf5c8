//! Remote facade and connection state machine
//!
//! [`Remote`] owns the bound remote library and every piece of session
//! state. All native calls, including the poller's dirty checks, go through
//! one lock, and the lifecycle guard is checked under that same lock so
//! the check and the call cannot be split by a concurrent disconnect.
//!
//! ```no_run
//! use vmremote_core::properties::StripProperty;
//! use vmremote_core::{Remote, RemoteConfig};
//!
//! # fn main() -> vmremote_core::Result<()> {
//! let remote = Remote::init(RemoteConfig::load())?;
//! remote.connect()?;
//! remote.set_strip_parameter(0, StripProperty::Gain, -6.0)?;
//! let gain = remote.get_strip_parameter(0, StripProperty::Gain)?;
//! println!("Strip 0 gain: {gain}");
//! remote.disconnect()?;
//! # Ok(())
//! # }
//! ```

use crate::config::{RemoteConfig, SettleStrategy};
use crate::devices::{Device, DeviceDirectory};
use crate::discovery;
use crate::error::{RemoteError, Result};
use crate::native::{ParameterText, RemoteApi, RemoteLibrary};
use crate::path::{ParameterAddress, ValueEncoding};
use crate::poller::{ChangePoller, ListenerId, ListenerRegistry, Subscription};
use crate::properties::{
    BusProperty, CommandAction, CommandButton, CommandEq, RecorderProperty, StripProperty,
    VbanStreamProperty, VmState,
};
use crate::state::{ConnectionState, EngineKind, EngineVersion, LevelType};
use crate::value::{assignment, ParameterValue, Value};
use std::ffi::CString;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Everything guarded by the gateway lock
struct Session {
    api: Option<Box<dyn RemoteApi>>,
    state: ConnectionState,
    kind: Option<EngineKind>,
    version: Option<EngineVersion>,
    devices: DeviceDirectory,
}

impl Session {
    /// Gateway, only while connected
    fn connected_api(&mut self) -> Result<&mut (dyn RemoteApi + 'static)> {
        match self.state {
            ConnectionState::Uninitialised => Err(RemoteError::NotInitialised),
            ConnectionState::Initialised => Err(RemoteError::NotConnected),
            ConnectionState::Connected => self
                .api
                .as_deref_mut()
                .ok_or(RemoteError::NotInitialised),
        }
    }

    fn poll_dirty(&mut self) -> Result<bool> {
        let code = self.connected_api()?.is_parameters_dirty();
        if code < 0 {
            return Err(RemoteError::NativeCall {
                call: "VBVMR_IsParametersDirty",
                code,
            });
        }
        Ok(code > 0)
    }

    /// Engine type and version, queried right after login
    fn resolve_identity(api: &mut dyn RemoteApi) -> Result<(EngineKind, EngineVersion)> {
        let mut code = 0;
        let status = api.voicemeeter_type(&mut code);
        if status != 0 {
            return Err(RemoteError::NativeCall {
                call: "VBVMR_GetVoicemeeterType",
                code: status,
            });
        }
        let kind = EngineKind::from_code(code)?;

        let mut packed = 0;
        let status = api.voicemeeter_version(&mut packed);
        if status != 0 {
            return Err(RemoteError::NativeCall {
                call: "VBVMR_GetVoicemeeterVersion",
                code: status,
            });
        }
        Ok((kind, EngineVersion::from_packed(packed)))
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

fn c_text(text: String) -> Result<CString> {
    CString::new(text).map_err(|e| {
        let bytes = e.into_vec();
        RemoteError::InteriorNul(String::from_utf8_lossy(&bytes).into_owned())
    })
}

/// Client for one Voicemeeter engine
pub struct Remote {
    config: RemoteConfig,
    settle: SettleStrategy,
    session: Arc<Mutex<Session>>,
    listeners: Arc<ListenerRegistry>,
    poller: Mutex<Option<ChangePoller>>,
}

impl Remote {
    /// Create an unbound remote; call [`Remote::initialise`] next
    pub fn new(config: RemoteConfig) -> Self {
        Self::build(config, None)
    }

    /// Discover and bind the remote library in one step
    pub fn init(config: RemoteConfig) -> Result<Self> {
        let remote = Self::new(config);
        remote.initialise()?;
        Ok(remote)
    }

    /// Create a remote already bound to `api`
    pub fn with_api(api: impl RemoteApi + 'static, config: RemoteConfig) -> Self {
        Self::build(config, Some(Box::new(api)))
    }

    fn build(config: RemoteConfig, api: Option<Box<dyn RemoteApi>>) -> Self {
        let state = if api.is_some() {
            ConnectionState::Initialised
        } else {
            ConnectionState::Uninitialised
        };
        Self {
            settle: config.settle(),
            config,
            session: Arc::new(Mutex::new(Session {
                api,
                state,
                kind: None,
                version: None,
                devices: DeviceDirectory::default(),
            })),
            listeners: Arc::new(ListenerRegistry::default()),
            poller: Mutex::new(None),
        }
    }

    /// Bind the remote library
    ///
    /// A remote that is already bound keeps its library; the DLL is never
    /// loaded twice. Discovery or load failures leave it `Uninitialised`.
    pub fn initialise(&self) -> Result<()> {
        let mut session = lock(&self.session);
        if session.api.is_some() {
            tracing::debug!("Remote library already bound");
            return Ok(());
        }

        let path = discovery::library_path(&self.config)?;
        let library = RemoteLibrary::load(&path)?;
        session.api = Some(Box::new(library));
        session.state = ConnectionState::Initialised;
        Ok(())
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub fn settle_strategy(&self) -> SettleStrategy {
        self.settle
    }

    pub fn state(&self) -> ConnectionState {
        lock(&self.session).state
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Log in to the engine
    ///
    /// No-op when already connected. On success the engine type and version
    /// are resolved and the change poller starts.
    pub fn connect(&self) -> Result<()> {
        let previous = {
            let mut guard = lock(&self.session);
            let session = &mut *guard;
            let api = match session.state {
                ConnectionState::Uninitialised => return Err(RemoteError::NotInitialised),
                ConnectionState::Connected => return Ok(()),
                ConnectionState::Initialised => session
                    .api
                    .as_deref_mut()
                    .ok_or(RemoteError::NotInitialised)?,
            };

            let code = api.login();
            if code != 0 {
                tracing::warn!(code, "Voicemeeter login failed");
                return Err(RemoteError::ConnectionFailed { code });
            }

            let (kind, version) = match Session::resolve_identity(api) {
                Ok(identity) => identity,
                Err(e) => {
                    let code = api.logout();
                    tracing::warn!(error = %e, logout = code, "Engine identity unavailable, logged out");
                    return Err(e);
                }
            };

            session.state = ConnectionState::Connected;
            session.kind = Some(kind);
            session.version = Some(version);
            tracing::info!(%kind, %version, "Connected to Voicemeeter");

            if self.config.refresh_devices_on_connect {
                session.devices.clear();
                let api = session.connected_api()?;
                match DeviceDirectory::enumerate(api) {
                    Ok(devices) => session.devices = devices,
                    Err(e) => tracing::warn!(error = %e, "Device refresh after connect failed"),
                }
            }

            // Installed under the session lock so a racing disconnect always sees it
            self.install_poller()
        };

        if let Some(mut previous) = previous {
            previous.stop();
        }
        Ok(())
    }

    /// Log out of the engine
    ///
    /// The remote returns to `Initialised` even when the native logout
    /// reports a failure, so a failed logout never leaves it stuck.
    pub fn disconnect(&self) -> Result<()> {
        let (code, poller) = {
            let mut session = lock(&self.session);
            let code = session.connected_api().map_err(|e| match e {
                RemoteError::NotInitialised => e,
                _ => RemoteError::NotConnected,
            })?.logout();
            session.state = ConnectionState::Initialised;
            (code, self.take_poller())
        };

        // Joined outside the session lock; the poller thread takes it on every tick
        if let Some(mut poller) = poller {
            poller.stop();
        }

        if code != 0 {
            tracing::warn!(code, "Voicemeeter logout failed, session dropped anyway");
            return Err(RemoteError::DisconnectFailed { code });
        }
        tracing::info!("Disconnected from Voicemeeter");
        Ok(())
    }

    /// Start the engine application of the given edition
    ///
    /// Needs a bound library but no login.
    pub fn launch(&self, kind: EngineKind) -> Result<()> {
        let mut session = lock(&self.session);
        let api = session
            .api
            .as_deref_mut()
            .ok_or(RemoteError::NotInitialised)?;
        let code = api.run_voicemeeter(kind.code());
        if code != 0 {
            return Err(RemoteError::NativeCall {
                call: "VBVMR_RunVoicemeeter",
                code,
            });
        }
        tracing::info!(%kind, "Launched Voicemeeter");
        Ok(())
    }

    /// Edition resolved at the last successful connect
    pub fn engine_kind(&self) -> Option<EngineKind> {
        lock(&self.session).kind
    }

    /// Version resolved at the last successful connect
    pub fn version(&self) -> Option<EngineVersion> {
        lock(&self.session).version
    }

    /// Rebuild the device directory from the engine
    pub fn refresh_devices(&self) -> Result<DeviceDirectory> {
        let mut session = lock(&self.session);
        session.connected_api()?;
        session.devices.clear();
        let devices = DeviceDirectory::enumerate(session.connected_api()?)?;
        tracing::info!(
            outputs = devices.outputs.len(),
            inputs = devices.inputs.len(),
            "Device list refreshed"
        );
        session.devices = devices.clone();
        Ok(devices)
    }

    /// Devices from the last refresh
    pub fn devices(&self) -> DeviceDirectory {
        lock(&self.session).devices.clone()
    }

    pub fn output_devices(&self) -> Vec<Device> {
        lock(&self.session).devices.outputs.clone()
    }

    pub fn input_devices(&self) -> Vec<Device> {
        lock(&self.session).devices.inputs.clone()
    }

    /// Ask the engine whether anything changed since the last check
    ///
    /// This consumes the engine's dirty flag, so it competes with the
    /// background poller.
    pub fn is_parameters_dirty(&self) -> Result<bool> {
        lock(&self.session).poll_dirty()
    }

    /// Read one parameter, as a float or as text depending on the property
    pub fn get(&self, address: &ParameterAddress) -> Result<Value> {
        let (path, encoding) = address.resolve();
        let name = c_text(path)?;

        let mut session = lock(&self.session);
        let api = session.connected_api()?;
        let value = match encoding {
            ValueEncoding::FloatValue => {
                let mut value = 0.0f32;
                let code = api.get_parameter_float(&name, &mut value);
                if code != 0 {
                    return Err(RemoteError::NativeCall {
                        call: "VBVMR_GetParameterFloat",
                        code,
                    });
                }
                Value::Float(value)
            }
            ValueEncoding::StringValue => {
                let mut text = ParameterText::new();
                let code = api.get_parameter_string(&name, &mut text);
                if code != 0 {
                    return Err(RemoteError::NativeCall {
                        call: "VBVMR_GetParameterStringA",
                        code,
                    });
                }
                Value::Text(text.decode())
            }
        };
        tracing::debug!(parameter = ?name, %value, "Read parameter");
        Ok(value)
    }

    /// Write one parameter and wait out the settle window
    pub fn set(&self, address: &ParameterAddress, value: impl Into<ParameterValue>) -> Result<()> {
        let script = assignment(&address.path(), &value.into());
        self.set_raw(&script)
    }

    /// Issue a raw script and wait out the settle window
    pub fn set_raw(&self, script: &str) -> Result<()> {
        self.issue_script(script)?;
        self.settle.wait();
        Ok(())
    }

    /// Issue a raw script without waiting
    ///
    /// The engine applies scripts asynchronously; a status other than 0 is
    /// logged but not returned.
    pub fn issue_script(&self, script: &str) -> Result<()> {
        let text = c_text(script.to_string())?;
        let mut session = lock(&self.session);
        let code = session.connected_api()?.set_parameters(&text);
        if code != 0 {
            tracing::warn!(code, script, "VBVMR_SetParameters reported an error");
        } else {
            tracing::debug!(script, "Script issued");
        }
        Ok(())
    }

    /// Current meter level of one channel
    pub fn level(&self, level_type: LevelType, channel: usize) -> Result<f32> {
        let mut session = lock(&self.session);
        let api = session.connected_api()?;
        let mut value = 0.0f32;
        let channel = i32::try_from(channel).map_err(|_| RemoteError::NativeCall {
            call: "VBVMR_GetLevel",
            code: -1,
        })?;
        let code = api.get_level(level_type as i32, channel, &mut value);
        if code != 0 {
            return Err(RemoteError::NativeCall {
                call: "VBVMR_GetLevel",
                code,
            });
        }
        Ok(value)
    }

    /// Register a listener run whenever the engine reports a change
    pub fn on_change<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.listeners.register(Arc::new(listener));
        Subscription::new(id, &self.listeners)
    }

    /// Remove a listener by id
    pub fn detach(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Spawn a fresh poller and return the one it replaces
    fn install_poller(&self) -> Option<ChangePoller> {
        let session = Arc::clone(&self.session);
        let check = move || {
            let mut session = lock(&session);
            if session.state != ConnectionState::Connected {
                return Ok(false);
            }
            session.poll_dirty()
        };

        let poller = ChangePoller::spawn(
            self.config.poll_interval(),
            Arc::clone(&self.listeners),
            check,
        );
        self.poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(poller)
    }

    fn take_poller(&self) -> Option<ChangePoller> {
        self.poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn get_strip_parameter(&self, index: usize, property: StripProperty) -> Result<Value> {
        self.get(&ParameterAddress::strip(index, property))
    }

    pub fn set_strip_parameter(
        &self,
        index: usize,
        property: StripProperty,
        value: impl Into<ParameterValue>,
    ) -> Result<()> {
        self.set(&ParameterAddress::strip(index, property), value)
    }

    pub fn get_bus_parameter(&self, index: usize, property: BusProperty) -> Result<Value> {
        self.get(&ParameterAddress::bus(index, property))
    }

    pub fn set_bus_parameter(
        &self,
        index: usize,
        property: BusProperty,
        value: impl Into<ParameterValue>,
    ) -> Result<()> {
        self.set(&ParameterAddress::bus(index, property), value)
    }

    pub fn get_recorder_parameter(&self, property: RecorderProperty) -> Result<Value> {
        self.get(&ParameterAddress::recorder(property))
    }

    pub fn set_recorder_parameter(
        &self,
        property: RecorderProperty,
        value: impl Into<ParameterValue>,
    ) -> Result<()> {
        self.set(&ParameterAddress::recorder(property), value)
    }

    pub fn execute_command_action(
        &self,
        action: CommandAction,
        value: impl Into<ParameterValue>,
    ) -> Result<()> {
        self.set(&ParameterAddress::command(action), value)
    }

    pub fn execute_button_action(
        &self,
        index: usize,
        property: CommandButton,
        value: impl Into<ParameterValue>,
    ) -> Result<()> {
        self.set(&ParameterAddress::button(index, property), value)
    }

    pub fn execute_eq_action(
        &self,
        index: usize,
        action: CommandEq,
        value: impl Into<ParameterValue>,
    ) -> Result<()> {
        self.set(&ParameterAddress::eq(index, action), value)
    }

    /// `Command.Lock` or `Command.Show`
    pub fn get_vm_state(&self, state: VmState) -> Result<Value> {
        self.get(&ParameterAddress::vm_state(state))
    }

    pub fn get_button_parameter(&self, index: usize, property: CommandButton) -> Result<Value> {
        self.get(&ParameterAddress::button(index, property))
    }

    pub fn get_vban_enabled(&self) -> Result<bool> {
        let value = self.get(&ParameterAddress::vban_enable())?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub fn set_vban_enabled(&self, enabled: bool) -> Result<()> {
        self.set(&ParameterAddress::vban_enable(), enabled)
    }

    pub fn get_vban_instream_parameter(
        &self,
        index: usize,
        property: VbanStreamProperty,
    ) -> Result<Value> {
        self.get(&ParameterAddress::vban_instream(index, property))
    }

    pub fn set_vban_instream_parameter(
        &self,
        index: usize,
        property: VbanStreamProperty,
        value: impl Into<ParameterValue>,
    ) -> Result<()> {
        self.set(&ParameterAddress::vban_instream(index, property), value)
    }

    pub fn get_vban_outstream_parameter(
        &self,
        index: usize,
        property: VbanStreamProperty,
    ) -> Result<Value> {
        self.get(&ParameterAddress::vban_outstream(index, property))
    }

    pub fn set_vban_outstream_parameter(
        &self,
        index: usize,
        property: VbanStreamProperty,
        value: impl Into<ParameterValue>,
    ) -> Result<()> {
        self.set(&ParameterAddress::vban_outstream(index, property), value)
    }
}

impl Drop for Remote {
    fn drop(&mut self) {
        if let Some(mut poller) = self.take_poller() {
            poller.stop();
        }
        let mut session = lock(&self.session);
        if session.state == ConnectionState::Connected {
            if let Some(api) = session.api.as_deref_mut() {
                let code = api.logout();
                tracing::debug!(code, "Logged out on drop");
            }
            session.state = ConnectionState::Initialised;
        }
    }
}

impl std::fmt::Debug for Remote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = lock(&self.session);
        f.debug_struct("Remote")
            .field("state", &session.state)
            .field("kind", &session.kind)
            .field("version", &session.version)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
