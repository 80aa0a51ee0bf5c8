//! In-memory engine for tests and offline development
//!
//! [`MockEngine`] implements [`RemoteApi`] over a parameter map. It is a
//! cheap handle: clones share state, so a test can keep one clone for
//! inspection after handing another to a [`crate::Remote`].
//!
//! Scripts passed to `set_parameters` are parsed (`path=value;` statements)
//! and applied immediately, and any applied script raises the dirty flag.

use crate::native::{DeviceText, ParameterText, RemoteApi};
use crate::value::Value;
use std::collections::HashMap;
use std::ffi::CStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Status returned for unknown parameters
pub const UNKNOWN_PARAMETER: i32 = -3;

#[derive(Debug, Clone)]
struct MockDevice {
    name: String,
    hardware_id: String,
    kind: i32,
}

#[derive(Debug)]
struct MockState {
    login_status: i32,
    logout_status: i32,
    type_status: i32,
    type_code: i32,
    version: i32,
    logged_in: bool,
    dirty: bool,
    dirty_polls: u64,
    parameters: HashMap<String, Value>,
    levels: HashMap<(i32, i32), f32>,
    outputs: Vec<MockDevice>,
    inputs: Vec<MockDevice>,
    input_count_override: Option<i32>,
    scripts: Vec<String>,
    launched: Vec<i32>,
    calls: Vec<&'static str>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            login_status: 0,
            logout_status: 0,
            type_status: 0,
            type_code: 2,
            version: 0x0200_0105,
            logged_in: false,
            dirty: false,
            dirty_polls: 0,
            parameters: HashMap::new(),
            levels: HashMap::new(),
            outputs: Vec::new(),
            inputs: Vec::new(),
            input_count_override: None,
            scripts: Vec::new(),
            launched: Vec::new(),
            calls: Vec::new(),
        }
    }
}

/// Scriptable stand-in for the remote library
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    inner: Arc<Mutex<MockState>>,
}

impl MockEngine {
    /// Banana 2.0.1.5 with no devices and no parameters
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_login_status(&self, status: i32) {
        self.state().login_status = status;
    }

    pub fn set_logout_status(&self, status: i32) {
        self.state().logout_status = status;
    }

    /// Code reported by `VBVMR_GetVoicemeeterType`
    pub fn set_type_code(&self, code: i32) {
        self.state().type_code = code;
    }

    /// Status returned by `VBVMR_GetVoicemeeterType`
    pub fn set_type_status(&self, status: i32) {
        self.state().type_status = status;
    }

    pub fn set_version(&self, packed: i32) {
        self.state().version = packed;
    }

    pub fn set_float(&self, path: &str, value: f32) {
        self.state()
            .parameters
            .insert(path.to_string(), Value::Float(value));
    }

    pub fn set_text(&self, path: &str, value: &str) {
        self.state()
            .parameters
            .insert(path.to_string(), Value::Text(value.to_string()));
    }

    pub fn parameter(&self, path: &str) -> Option<Value> {
        self.state().parameters.get(path).cloned()
    }

    pub fn set_level(&self, level_type: i32, channel: i32, value: f32) {
        self.state().levels.insert((level_type, channel), value);
    }

    pub fn add_output_device(&self, name: &str, hardware_id: &str, kind: i32) {
        self.state().outputs.push(MockDevice {
            name: name.to_string(),
            hardware_id: hardware_id.to_string(),
            kind,
        });
    }

    pub fn add_input_device(&self, name: &str, hardware_id: &str, kind: i32) {
        self.state().inputs.push(MockDevice {
            name: name.to_string(),
            hardware_id: hardware_id.to_string(),
            kind,
        });
    }

    pub fn clear_devices(&self) {
        let mut state = self.state();
        state.outputs.clear();
        state.inputs.clear();
    }

    /// Force the value returned by `VBVMR_Input_GetDeviceNumber`
    pub fn set_input_device_count_override(&self, count: Option<i32>) {
        self.state().input_count_override = count;
    }

    /// Raise the dirty flag as if the engine UI changed something
    pub fn mark_dirty(&self) {
        self.state().dirty = true;
    }

    pub fn is_logged_in(&self) -> bool {
        self.state().logged_in
    }

    /// Number of `VBVMR_IsParametersDirty` calls so far
    pub fn dirty_polls(&self) -> u64 {
        self.state().dirty_polls
    }

    /// Every script received, in order
    pub fn scripts(&self) -> Vec<String> {
        self.state().scripts.clone()
    }

    /// Edition codes passed to `VBVMR_RunVoicemeeter`
    pub fn launched(&self) -> Vec<i32> {
        self.state().launched.clone()
    }

    /// Entry points called, in order; dirty polls are not logged
    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }
}

/// Parse `path=value;` statements; malformed statements are skipped
pub fn parse_script(script: &str) -> Vec<(String, Value)> {
    script
        .split(';')
        .filter_map(|statement| {
            let (path, value) = statement.split_once('=')?;
            let path = path.trim();
            let value = value.trim();
            if path.is_empty() {
                return None;
            }
            let value = if let Some(quoted) = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
            {
                Value::Text(quoted.to_string())
            } else if let Ok(v) = value.parse::<f32>() {
                Value::Float(v)
            } else {
                Value::Text(value.to_string())
            };
            Some((path.to_string(), value))
        })
        .collect()
}

fn write_device(
    devices: &[MockDevice],
    index: i32,
    kind: &mut i32,
    name: &mut DeviceText,
    hardware_id: &mut DeviceText,
) -> i32 {
    match usize::try_from(index).ok().and_then(|i| devices.get(i)) {
        Some(device) => {
            *kind = device.kind;
            name.write(&device.name);
            hardware_id.write(&device.hardware_id);
            0
        }
        None => -1,
    }
}

impl RemoteApi for MockEngine {
    fn login(&mut self) -> i32 {
        let mut state = self.state();
        state.calls.push("VBVMR_Login");
        if state.login_status == 0 {
            state.logged_in = true;
        }
        state.login_status
    }

    fn logout(&mut self) -> i32 {
        let mut state = self.state();
        state.calls.push("VBVMR_Logout");
        if state.logout_status == 0 {
            state.logged_in = false;
        }
        state.logout_status
    }

    fn run_voicemeeter(&mut self, kind: i32) -> i32 {
        let mut state = self.state();
        state.calls.push("VBVMR_RunVoicemeeter");
        if !(1..=3).contains(&kind) {
            return -1;
        }
        state.launched.push(kind);
        state.type_code = kind;
        0
    }

    fn is_parameters_dirty(&mut self) -> i32 {
        let mut state = self.state();
        state.dirty_polls += 1;
        if !state.logged_in {
            return -1;
        }
        i32::from(std::mem::take(&mut state.dirty))
    }

    fn get_level(&mut self, level_type: i32, channel: i32, value: &mut f32) -> i32 {
        let mut state = self.state();
        state.calls.push("VBVMR_GetLevel");
        if !(0..=3).contains(&level_type) {
            return -3;
        }
        *value = state
            .levels
            .get(&(level_type, channel))
            .copied()
            .unwrap_or(0.0);
        0
    }

    fn get_parameter_float(&mut self, name: &CStr, value: &mut f32) -> i32 {
        let mut state = self.state();
        state.calls.push("VBVMR_GetParameterFloat");
        let key = name.to_string_lossy();
        match state.parameters.get(key.as_ref()) {
            Some(Value::Float(v)) => {
                *value = *v;
                0
            }
            _ => UNKNOWN_PARAMETER,
        }
    }

    fn get_parameter_string(&mut self, name: &CStr, value: &mut ParameterText) -> i32 {
        let mut state = self.state();
        state.calls.push("VBVMR_GetParameterStringA");
        let key = name.to_string_lossy();
        match state.parameters.get(key.as_ref()) {
            Some(Value::Text(s)) => {
                value.write(s);
                0
            }
            _ => UNKNOWN_PARAMETER,
        }
    }

    fn set_parameters(&mut self, script: &CStr) -> i32 {
        let mut state = self.state();
        state.calls.push("VBVMR_SetParameters");
        let script = script.to_string_lossy().into_owned();
        let statements = parse_script(&script);
        state.scripts.push(script);
        if statements.is_empty() {
            return -2;
        }
        for (path, value) in statements {
            state.parameters.insert(path, value);
        }
        state.dirty = true;
        0
    }

    fn output_device_count(&mut self) -> i32 {
        let mut state = self.state();
        state.calls.push("VBVMR_Output_GetDeviceNumber");
        state.outputs.len() as i32
    }

    fn output_device_desc(
        &mut self,
        index: i32,
        kind: &mut i32,
        name: &mut DeviceText,
        hardware_id: &mut DeviceText,
    ) -> i32 {
        let mut state = self.state();
        state.calls.push("VBVMR_Output_GetDeviceDescA");
        write_device(&state.outputs, index, kind, name, hardware_id)
    }

    fn input_device_count(&mut self) -> i32 {
        let mut state = self.state();
        state.calls.push("VBVMR_Input_GetDeviceNumber");
        state
            .input_count_override
            .unwrap_or(state.inputs.len() as i32)
    }

    fn input_device_desc(
        &mut self,
        index: i32,
        kind: &mut i32,
        name: &mut DeviceText,
        hardware_id: &mut DeviceText,
    ) -> i32 {
        let mut state = self.state();
        state.calls.push("VBVMR_Input_GetDeviceDescA");
        write_device(&state.inputs, index, kind, name, hardware_id)
    }

    fn voicemeeter_type(&mut self, kind: &mut i32) -> i32 {
        let mut state = self.state();
        state.calls.push("VBVMR_GetVoicemeeterType");
        *kind = state.type_code;
        state.type_status
    }

    fn voicemeeter_version(&mut self, version: &mut i32) -> i32 {
        let mut state = self.state();
        state.calls.push("VBVMR_GetVoicemeeterVersion");
        *version = state.version;
        0
    }
}
