//! Shared frame buffer with atomic pixel storage.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use candela_core::Color;
use image::RgbaImage;

/// Quantize one channel to a byte. Values are unclamped until this point.
fn quantize(v: f64) -> u8 {
    if v <= 0.0 {
        0
    } else if v >= 1.0 {
        255
    } else {
        (v * 255.0) as u8
    }
}

/// Pack a traced color into an RGBA pixel word (alpha fixed at 255).
pub fn pack_color(color: Color) -> u32 {
    u32::from_le_bytes([
        quantize(color.x),
        quantize(color.y),
        quantize(color.z),
        255,
    ])
}

/// Unpack a pixel word back into RGBA bytes.
pub fn unpack_color(pixel: u32) -> [u8; 4] {
    pixel.to_le_bytes()
}

/// Width x height grid of packed RGBA pixels.
///
/// Pixels are atomic words, so render workers write and a display shell
/// reads through a shared reference concurrently; only resizing needs
/// exclusive access.
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<AtomicU32>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        let mut frame = Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        };
        frame.resize(width, height);
        frame
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocate the pixel grid; all pixels reset to transparent black.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = (0..width as usize * height as usize)
            .map(|_| AtomicU32::new(0))
            .collect();
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&self) {
        for p in &self.pixels {
            p.store(0, Ordering::Relaxed);
        }
    }

    pub fn put_pixel(&self, x: u32, y: u32, pixel: u32) {
        self.pixels[(y * self.width + x) as usize].store(pixel, Ordering::Relaxed);
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[(y * self.width + x) as usize].load(Ordering::Relaxed)
    }

    /// Snapshot the buffer into raw RGBA bytes, row-major.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for p in &self.pixels {
            bytes.extend_from_slice(&p.load(Ordering::Relaxed).to_le_bytes());
        }
        bytes
    }

    /// Encode the current contents to an image file; the format follows the
    /// path extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> image::ImageResult<()> {
        let img = RgbaImage::from_raw(self.width, self.height, self.to_rgba_bytes())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height));
        img.save(path)
    }
}
