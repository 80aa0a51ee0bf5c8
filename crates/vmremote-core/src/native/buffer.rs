//! Fixed-size text buffers for the native boundary
//!
//! The engine writes ANSI strings into caller-provided arrays and does not
//! promise anything about the bytes past the terminator. Buffers start
//! zeroed and decoding stops at the first NUL.

use std::os::raw::c_char;

/// Bounded byte arena handed to the engine for string outputs
#[derive(Clone)]
pub struct TextBuffer<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> TextBuffer<N> {
    /// Create a zero-filled buffer
    pub fn new() -> Self {
        Self { bytes: [0; N] }
    }

    /// Capacity in bytes, terminator included
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Zero the whole buffer
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Pointer for the native call
    pub fn as_mut_ptr(&mut self) -> *mut c_char {
        self.bytes.as_mut_ptr().cast()
    }

    /// Raw contents, padding included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Copy `text` in, truncated so a terminator always fits
    pub fn write(&mut self, text: &str) {
        self.clear();
        let len = text.len().min(N.saturating_sub(1));
        self.bytes[..len].copy_from_slice(&text.as_bytes()[..len]);
    }

    /// Length of the text before the first NUL
    pub fn text_len(&self) -> usize {
        self.bytes.iter().position(|&b| b == 0).unwrap_or(N)
    }

    /// Decode the text up to the first NUL
    ///
    /// Invalid UTF-8 (the engine speaks the ANSI code page) is replaced
    /// rather than rejected.
    pub fn decode(&self) -> String {
        String::from_utf8_lossy(&self.bytes[..self.text_len()]).into_owned()
    }
}

impl<const N: usize> Default for TextBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> std::fmt::Debug for TextBuffer<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field("capacity", &N)
            .field("text", &self.decode())
            .finish()
    }
}
