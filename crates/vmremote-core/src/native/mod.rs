//! Native call gateway
//!
//! [`RemoteApi`] is the fixed call surface of the engine's remote library.
//! Methods mirror the `VBVMR_*` entry points one to one and return the raw
//! status code; interpreting those codes is the caller's job. Output
//! parameters are written through `&mut` slots and bounded [`TextBuffer`]s.
//!
//! - [`library`] binds the real DLL (Windows only)
//! - [`buffer`] holds the fixed-size text arenas used across the boundary

pub mod buffer;
pub mod library;

pub use buffer::TextBuffer;
pub use library::RemoteLibrary;

use crate::{DEVICE_TEXT_LEN, PARAMETER_TEXT_LEN};
use std::ffi::CStr;

/// Buffer for device names and hardware ids
pub type DeviceText = TextBuffer<DEVICE_TEXT_LEN>;

/// Buffer for string parameter values
pub type ParameterText = TextBuffer<PARAMETER_TEXT_LEN>;

/// The engine's remote call surface
///
/// Implementations are not required to be thread safe beyond `Send`: the
/// remote layer serializes every call behind a single lock, including the
/// calls made by the change poller.
pub trait RemoteApi: Send {
    /// `VBVMR_Login`: 0 on success, 1 when logged in but the engine is not running
    fn login(&mut self) -> i32;

    /// `VBVMR_Logout`
    fn logout(&mut self) -> i32;

    /// `VBVMR_RunVoicemeeter`: launch the engine application of the given type
    fn run_voicemeeter(&mut self, kind: i32) -> i32;

    /// `VBVMR_IsParametersDirty`: 1 if something changed since the last call
    fn is_parameters_dirty(&mut self) -> i32;

    /// `VBVMR_GetLevel`
    fn get_level(&mut self, level_type: i32, channel: i32, value: &mut f32) -> i32;

    /// `VBVMR_GetParameterFloat`
    fn get_parameter_float(&mut self, name: &CStr, value: &mut f32) -> i32;

    /// `VBVMR_GetParameterStringA`
    fn get_parameter_string(&mut self, name: &CStr, value: &mut ParameterText) -> i32;

    /// `VBVMR_SetParameters`: apply a `path=value;` script
    fn set_parameters(&mut self, script: &CStr) -> i32;

    /// `VBVMR_Output_GetDeviceNumber`
    fn output_device_count(&mut self) -> i32;

    /// `VBVMR_Output_GetDeviceDescA`
    fn output_device_desc(
        &mut self,
        index: i32,
        kind: &mut i32,
        name: &mut DeviceText,
        hardware_id: &mut DeviceText,
    ) -> i32;

    /// `VBVMR_Input_GetDeviceNumber`
    fn input_device_count(&mut self) -> i32;

    /// `VBVMR_Input_GetDeviceDescA`
    fn input_device_desc(
        &mut self,
        index: i32,
        kind: &mut i32,
        name: &mut DeviceText,
        hardware_id: &mut DeviceText,
    ) -> i32;

    /// `VBVMR_GetVoicemeeterType`
    fn voicemeeter_type(&mut self, kind: &mut i32) -> i32;

    /// `VBVMR_GetVoicemeeterVersion`: packed as one byte per component
    fn voicemeeter_version(&mut self, version: &mut i32) -> i32;
}
