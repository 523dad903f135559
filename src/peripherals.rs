//! Stand-in memory-mapped devices.
//!
//! Grounded on `original_source/plugins.py`: `RandomNumberGenerator.read`
//! returns a random byte and ignores writes, and `BitmapDisplay` captures
//! every write it receives across its registered range while serving the
//! last key code at a separate read-only address. These are reshaped here
//! into small, host-inspectable devices rather than a Tk canvas, since this
//! crate has no windowing layer of its own.

use rand::Rng as _;

use crate::cpu::io::IoHandler;

/// Captures every byte written to its mapped range into a flat buffer a
/// host program can inspect afterwards. Reads always return 0; a real
/// display has no readable framebuffer on the 6502 side.
pub struct Framebuffer {
    start_address: u16,
    width: usize,
    pixels: Vec<u8>,
}

impl Framebuffer {
    pub fn new(start_address: u16, width: usize, height: usize) -> Framebuffer {
        Framebuffer {
            start_address,
            width,
            pixels: vec![0; width * height],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }
}

impl IoHandler for Framebuffer {
    fn read(&mut self, _address: u16) -> u8 {
        0
    }

    fn write(&mut self, address: u16, value: u8) {
        let offset = address.wrapping_sub(self.start_address) as usize;
        if offset < self.pixels.len() {
            self.pixels[offset] = value;
        }
    }
}

/// Holds the most recent key code a host delivered via `press`. Writes are
/// ignored, matching `BitmapDisplay`'s read-only key register.
#[derive(Default)]
pub struct KeyInput {
    last_key: u8,
}

impl KeyInput {
    pub fn new() -> KeyInput {
        KeyInput::default()
    }

    pub fn press(&mut self, key: u8) {
        self.last_key = key;
    }
}

impl IoHandler for KeyInput {
    fn read(&mut self, _address: u16) -> u8 {
        self.last_key
    }

    fn write(&mut self, _address: u16, _value: u8) {}
}

/// A byte source backed by `rand`, standing in for `RandomNumberGenerator`.
pub struct RandomSource {
    rng: rand::rngs::ThreadRng,
}

impl RandomSource {
    pub fn new() -> RandomSource {
        RandomSource {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RandomSource {
    fn default() -> RandomSource {
        RandomSource::new()
    }
}

impl IoHandler for RandomSource {
    fn read(&mut self, _address: u16) -> u8 {
        self.rng.gen_range(0, 0x100) as u8
    }

    fn write(&mut self, _address: u16, _value: u8) {}
}

/// Appends every write as raw bytes to an in-memory sink, for programs that
/// want a simple character/byte output port rather than a bitmap display.
#[derive(Default)]
pub struct TextOutput {
    buffer: Vec<u8>,
}

impl TextOutput {
    pub fn new() -> TextOutput {
        TextOutput::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl IoHandler for TextOutput {
    fn read(&mut self, _address: u16) -> u8 {
        0
    }

    fn write(&mut self, _address: u16, value: u8) {
        self.buffer.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framebuffer_captures_writes_by_offset() {
        let mut fb = Framebuffer::new(0x0200, 4, 4);
        fb.write(0x0205, 9);
        assert_eq!(fb.pixel(1, 1), 9);
    }

    #[test]
    fn key_input_reports_the_most_recent_press() {
        let mut keys = KeyInput::new();
        assert_eq!(keys.read(0x00ff), 0);
        keys.press(0x41);
        assert_eq!(keys.read(0x00ff), 0x41);
    }

    #[test]
    fn text_output_accumulates_every_write() {
        let mut out = TextOutput::new();
        out.write(0x6000, b'h');
        out.write(0x6000, b'i');
        assert_eq!(out.as_bytes(), b"hi");
    }
}
