//! Device directory
//!
//! Snapshot of the audio devices the engine can see. Rebuilt wholesale on
//! every refresh: no diffing, no identity carried across refreshes.

use crate::error::{RemoteError, Result};
use crate::native::{DeviceText, RemoteApi};
use serde::Serialize;

/// Audio device as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    /// Display name
    pub name: String,
    /// Driver-level hardware identifier
    pub hardware_id: String,
    /// Driver type code (1 = MME, 3 = WDM, 4 = KS, 5 = ASIO)
    pub kind: i32,
}

/// Output and input devices in engine enumeration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceDirectory {
    pub outputs: Vec<Device>,
    pub inputs: Vec<Device>,
}

#[derive(Clone, Copy)]
enum Direction {
    Output,
    Input,
}

impl DeviceDirectory {
    /// Query outputs, then inputs
    pub fn enumerate(api: &mut dyn RemoteApi) -> Result<Self> {
        let outputs = enumerate_direction(api, Direction::Output)?;
        let inputs = enumerate_direction(api, Direction::Input)?;
        Ok(Self { outputs, inputs })
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty() && self.inputs.is_empty()
    }

    pub fn clear(&mut self) {
        self.outputs.clear();
        self.inputs.clear();
    }

    /// Find an output by exact name
    pub fn output(&self, name: &str) -> Option<&Device> {
        self.outputs.iter().find(|d| d.name == name)
    }

    /// Find an input by exact name
    pub fn input(&self, name: &str) -> Option<&Device> {
        self.inputs.iter().find(|d| d.name == name)
    }
}

fn enumerate_direction(api: &mut dyn RemoteApi, direction: Direction) -> Result<Vec<Device>> {
    let (count_call, desc_call) = match direction {
        Direction::Output => (
            "VBVMR_Output_GetDeviceNumber",
            "VBVMR_Output_GetDeviceDescA",
        ),
        Direction::Input => ("VBVMR_Input_GetDeviceNumber", "VBVMR_Input_GetDeviceDescA"),
    };

    let count = match direction {
        Direction::Output => api.output_device_count(),
        Direction::Input => api.input_device_count(),
    };
    if count < 0 {
        return Err(RemoteError::NativeCall {
            call: count_call,
            code: count,
        });
    }

    let mut devices = Vec::with_capacity(count as usize);
    let mut name = DeviceText::new();
    let mut hardware_id = DeviceText::new();

    for index in 0..count {
        let mut kind = 0;
        name.clear();
        hardware_id.clear();
        let status = match direction {
            Direction::Output => {
                api.output_device_desc(index, &mut kind, &mut name, &mut hardware_id)
            }
            Direction::Input => api.input_device_desc(index, &mut kind, &mut name, &mut hardware_id),
        };
        if status != 0 {
            return Err(RemoteError::NativeCall {
                call: desc_call,
                code: status,
            });
        }
        devices.push(Device {
            name: name.decode(),
            hardware_id: hardware_id.decode(),
            kind,
        });
    }

    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEngine;

    #[test]
    fn test_enumerate_in_engine_order() {
        let mut engine = MockEngine::new();
        engine.add_output_device("Speakers", "{0.0.0.00000000}.{out-1}", 3);
        engine.add_output_device("Headphones", "{0.0.0.00000000}.{out-2}", 5);
        engine.add_input_device("Mic", "{0.0.1.00000000}.{in-1}", 3);

        let dir = DeviceDirectory::enumerate(&mut engine).unwrap();
        assert_eq!(dir.outputs.len(), 2);
        assert_eq!(dir.outputs[0].name, "Speakers");
        assert_eq!(dir.outputs[1].kind, 5);
        assert_eq!(dir.inputs[0].hardware_id, "{0.0.1.00000000}.{in-1}");
        assert_eq!(dir.output("Headphones").map(|d| d.kind), Some(5));
        assert!(dir.input("Speakers").is_none());
    }

    #[test]
    fn test_empty_engine() {
        let mut engine = MockEngine::new();
        let dir = DeviceDirectory::enumerate(&mut engine).unwrap();
        assert!(dir.is_empty());
    }

    #[test]
    fn test_negative_count_is_native_error() {
        let mut engine = MockEngine::new();
        engine.set_input_device_count_override(Some(-2));
        match DeviceDirectory::enumerate(&mut engine) {
            Err(RemoteError::NativeCall { call, code }) => {
                assert_eq!(call, "VBVMR_Input_GetDeviceNumber");
                assert_eq!(code, -2);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
