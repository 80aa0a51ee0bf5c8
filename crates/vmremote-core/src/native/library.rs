//! Binding to `VoicemeeterRemote.dll`
//!
//! The DLL is loaded once with `LoadLibraryW` and all fourteen entry points
//! are resolved up front, so a missing symbol fails the load instead of a
//! later call. The module is released when the library is dropped.
//!
//! Only Windows ships the engine. On other targets [`RemoteLibrary::load`]
//! always fails and the type cannot be constructed.

use super::{DeviceText, ParameterText, RemoteApi};
use crate::error::{RemoteError, Result};
use std::ffi::CStr;
use std::path::{Path, PathBuf};

#[cfg(windows)]
use std::os::raw::c_char;

#[cfg(windows)]
type NoArgFn = unsafe extern "system" fn() -> i32;
#[cfg(windows)]
type RunFn = unsafe extern "system" fn(i32) -> i32;
#[cfg(windows)]
type LevelFn = unsafe extern "system" fn(i32, i32, *mut f32) -> i32;
#[cfg(windows)]
type GetFloatFn = unsafe extern "system" fn(*const c_char, *mut f32) -> i32;
#[cfg(windows)]
type GetStringFn = unsafe extern "system" fn(*const c_char, *mut c_char) -> i32;
#[cfg(windows)]
type SetParametersFn = unsafe extern "system" fn(*const c_char) -> i32;
#[cfg(windows)]
type DeviceDescFn = unsafe extern "system" fn(i32, *mut i32, *mut c_char, *mut c_char) -> i32;
#[cfg(windows)]
type LongOutFn = unsafe extern "system" fn(*mut i32) -> i32;

/// Resolved entry points
#[cfg(windows)]
struct Symbols {
    login: NoArgFn,
    logout: NoArgFn,
    run_voicemeeter: RunFn,
    is_parameters_dirty: NoArgFn,
    get_level: LevelFn,
    get_parameter_float: GetFloatFn,
    get_parameter_string: GetStringFn,
    set_parameters: SetParametersFn,
    output_device_count: NoArgFn,
    output_device_desc: DeviceDescFn,
    input_device_count: NoArgFn,
    input_device_desc: DeviceDescFn,
    voicemeeter_type: LongOutFn,
    voicemeeter_version: LongOutFn,
}

/// Loaded remote library
pub struct RemoteLibrary {
    path: PathBuf,
    #[cfg(windows)]
    module: windows::Win32::Foundation::HMODULE,
    #[cfg(windows)]
    symbols: Symbols,
    #[cfg(not(windows))]
    never: std::convert::Infallible,
}

// The module handle is only touched behind the remote's lock.
#[cfg(windows)]
unsafe impl Send for RemoteLibrary {}

impl RemoteLibrary {
    /// Path the library was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(windows)]
macro_rules! resolve {
    ($module:expr, $name:literal) => {{
        let proc = windows::Win32::System::LibraryLoader::GetProcAddress(
            $module,
            windows::core::PCSTR(concat!($name, "\0").as_ptr()),
        )
        .ok_or(RemoteError::MissingSymbol($name))?;
        std::mem::transmute(proc)
    }};
}

#[cfg(windows)]
impl RemoteLibrary {
    /// Load the DLL at `path` and resolve every entry point
    pub fn load(path: &Path) -> Result<Self> {
        use std::os::windows::ffi::OsStrExt;
        use windows::core::PCWSTR;
        use windows::Win32::System::LibraryLoader::{FreeLibrary, LoadLibraryW};

        let wide: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        // SAFETY: `wide` is NUL-terminated and outlives the call.
        let module = unsafe { LoadLibraryW(PCWSTR(wide.as_ptr())) }.map_err(|e| {
            RemoteError::LibraryLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        // SAFETY: every symbol is transmuted to the signature documented in
        // VoicemeeterRemote.h.
        let symbols = unsafe { Self::resolve_symbols(module) };
        let symbols = match symbols {
            Ok(symbols) => symbols,
            Err(e) => {
                // SAFETY: module came from LoadLibraryW above and nothing borrowed it.
                let _ = unsafe { FreeLibrary(module) };
                return Err(e);
            }
        };

        tracing::info!(path = %path.display(), "Loaded Voicemeeter remote library");

        Ok(Self {
            path: path.to_path_buf(),
            module,
            symbols,
        })
    }

    unsafe fn resolve_symbols(module: windows::Win32::Foundation::HMODULE) -> Result<Symbols> {
        Ok(Symbols {
            login: resolve!(module, "VBVMR_Login"),
            logout: resolve!(module, "VBVMR_Logout"),
            run_voicemeeter: resolve!(module, "VBVMR_RunVoicemeeter"),
            is_parameters_dirty: resolve!(module, "VBVMR_IsParametersDirty"),
            get_level: resolve!(module, "VBVMR_GetLevel"),
            get_parameter_float: resolve!(module, "VBVMR_GetParameterFloat"),
            get_parameter_string: resolve!(module, "VBVMR_GetParameterStringA"),
            set_parameters: resolve!(module, "VBVMR_SetParameters"),
            output_device_count: resolve!(module, "VBVMR_Output_GetDeviceNumber"),
            output_device_desc: resolve!(module, "VBVMR_Output_GetDeviceDescA"),
            input_device_count: resolve!(module, "VBVMR_Input_GetDeviceNumber"),
            input_device_desc: resolve!(module, "VBVMR_Input_GetDeviceDescA"),
            voicemeeter_type: resolve!(module, "VBVMR_GetVoicemeeterType"),
            voicemeeter_version: resolve!(module, "VBVMR_GetVoicemeeterVersion"),
        })
    }
}

#[cfg(not(windows))]
impl RemoteLibrary {
    /// The remote library only exists on Windows
    pub fn load(path: &Path) -> Result<Self> {
        Err(RemoteError::LibraryLoad {
            path: path.to_path_buf(),
            reason: "the Voicemeeter remote library is only available on Windows".to_string(),
        })
    }
}

#[cfg(windows)]
impl Drop for RemoteLibrary {
    fn drop(&mut self) {
        // SAFETY: the module is owned by this value and no symbol outlives it.
        let _ = unsafe { windows::Win32::System::LibraryLoader::FreeLibrary(self.module) };
    }
}

// SAFETY (all calls below): pointers come from live Rust borrows, text
// buffers are at least as large as the engine's documented maximum and
// names/scripts are NUL-terminated `CStr`s.
#[cfg(windows)]
impl RemoteApi for RemoteLibrary {
    fn login(&mut self) -> i32 {
        unsafe { (self.symbols.login)() }
    }

    fn logout(&mut self) -> i32 {
        unsafe { (self.symbols.logout)() }
    }

    fn run_voicemeeter(&mut self, kind: i32) -> i32 {
        unsafe { (self.symbols.run_voicemeeter)(kind) }
    }

    fn is_parameters_dirty(&mut self) -> i32 {
        unsafe { (self.symbols.is_parameters_dirty)() }
    }

    fn get_level(&mut self, level_type: i32, channel: i32, value: &mut f32) -> i32 {
        unsafe { (self.symbols.get_level)(level_type, channel, value) }
    }

    fn get_parameter_float(&mut self, name: &CStr, value: &mut f32) -> i32 {
        unsafe { (self.symbols.get_parameter_float)(name.as_ptr(), value) }
    }

    fn get_parameter_string(&mut self, name: &CStr, value: &mut ParameterText) -> i32 {
        value.clear();
        unsafe { (self.symbols.get_parameter_string)(name.as_ptr(), value.as_mut_ptr()) }
    }

    fn set_parameters(&mut self, script: &CStr) -> i32 {
        unsafe { (self.symbols.set_parameters)(script.as_ptr()) }
    }

    fn output_device_count(&mut self) -> i32 {
        unsafe { (self.symbols.output_device_count)() }
    }

    fn output_device_desc(
        &mut self,
        index: i32,
        kind: &mut i32,
        name: &mut DeviceText,
        hardware_id: &mut DeviceText,
    ) -> i32 {
        name.clear();
        hardware_id.clear();
        unsafe {
            (self.symbols.output_device_desc)(
                index,
                kind,
                name.as_mut_ptr(),
                hardware_id.as_mut_ptr(),
            )
        }
    }

    fn input_device_count(&mut self) -> i32 {
        unsafe { (self.symbols.input_device_count)() }
    }

    fn input_device_desc(
        &mut self,
        index: i32,
        kind: &mut i32,
        name: &mut DeviceText,
        hardware_id: &mut DeviceText,
    ) -> i32 {
        name.clear();
        hardware_id.clear();
        unsafe {
            (self.symbols.input_device_desc)(
                index,
                kind,
                name.as_mut_ptr(),
                hardware_id.as_mut_ptr(),
            )
        }
    }

    fn voicemeeter_type(&mut self, kind: &mut i32) -> i32 {
        unsafe { (self.symbols.voicemeeter_type)(kind) }
    }

    fn voicemeeter_version(&mut self, version: &mut i32) -> i32 {
        unsafe { (self.symbols.voicemeeter_version)(version) }
    }
}

#[cfg(not(windows))]
impl RemoteApi for RemoteLibrary {
    fn login(&mut self) -> i32 {
        match self.never {}
    }

    fn logout(&mut self) -> i32 {
        match self.never {}
    }

    fn run_voicemeeter(&mut self, _kind: i32) -> i32 {
        match self.never {}
    }

    fn is_parameters_dirty(&mut self) -> i32 {
        match self.never {}
    }

    fn get_level(&mut self, _level_type: i32, _channel: i32, _value: &mut f32) -> i32 {
        match self.never {}
    }

    fn get_parameter_float(&mut self, _name: &CStr, _value: &mut f32) -> i32 {
        match self.never {}
    }

    fn get_parameter_string(&mut self, _name: &CStr, _value: &mut ParameterText) -> i32 {
        match self.never {}
    }

    fn set_parameters(&mut self, _script: &CStr) -> i32 {
        match self.never {}
    }

    fn output_device_count(&mut self) -> i32 {
        match self.never {}
    }

    fn output_device_desc(
        &mut self,
        _index: i32,
        _kind: &mut i32,
        _name: &mut DeviceText,
        _hardware_id: &mut DeviceText,
    ) -> i32 {
        match self.never {}
    }

    fn input_device_count(&mut self) -> i32 {
        match self.never {}
    }

    fn input_device_desc(
        &mut self,
        _index: i32,
        _kind: &mut i32,
        _name: &mut DeviceText,
        _hardware_id: &mut DeviceText,
    ) -> i32 {
        match self.never {}
    }

    fn voicemeeter_type(&mut self, _kind: &mut i32) -> i32 {
        match self.never {}
    }

    fn voicemeeter_version(&mut self, _version: &mut i32) -> i32 {
        match self.never {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_fails() {
        let path = Path::new("definitely-not-here/VoicemeeterRemote64.dll");
        match RemoteLibrary::load(path) {
            Err(RemoteError::LibraryLoad { path: p, .. }) => assert_eq!(p, path),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("load should fail"),
        }
    }
}
