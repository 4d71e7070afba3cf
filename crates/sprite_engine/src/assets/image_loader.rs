//! Image loading utilities for texture data
//!
//! Decodes image files into tightly packed RGBA8 pixels for upload through
//! the render backend.

use std::path::Path;

use image::DynamicImage;

use crate::assets::{AssetError, AssetResult};

/// Decoded image data ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Pixel data, rows top to bottom, `channels` bytes per pixel
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Bytes per pixel (4 for anything decoded from a file)
    pub channels: u8,
}

impl ImageData {
    /// Wrap raw pixels, checking the buffer matches the dimensions
    pub fn from_pixels(data: Vec<u8>, width: u32, height: u32, channels: u8) -> AssetResult<Self> {
        if !(1..=4).contains(&channels) {
            return Err(AssetError::LoadFailed(format!("Unsupported channel count {}", channels)));
        }

        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(AssetError::LoadFailed(format!(
                "Pixel buffer is {} bytes, expected {} for {}x{}x{}",
                data.len(),
                expected,
                width,
                height,
                channels
            )));
        }

        Ok(Self { data, width, height, channels })
    }

    /// Load an image from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> AssetResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading image from: {:?}", path);

        let img = image::open(path)
            .map_err(|e| AssetError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        let data = Self::from_dynamic(img);

        log::info!("Loaded image {}x{} from {:?}", data.width, data.height, path);
        Ok(data)
    }

    /// Decode an image held in memory
    pub fn from_bytes(bytes: &[u8]) -> AssetResult<Self> {
        let img = image::load_from_memory(bytes).map_err(|e| {
            AssetError::LoadFailed(format!("Failed to decode image from bytes: {}", e))
        })?;
        Ok(Self::from_dynamic(img))
    }

    fn from_dynamic(img: DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            data: rgba.into_raw(),
            width,
            height,
            channels: 4,
        }
    }

    /// Single-colour RGBA image
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let data = color.repeat(width as usize * height as usize);
        Self { data, width, height, channels: 4 }
    }

    /// Two-colour RGBA checkerboard with square cells
    pub fn checkerboard(width: u32, height: u32, cell: u32, even: [u8; 4], odd: [u8; 4]) -> Self {
        let cell = cell.max(1);
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let color = if (x / cell + y / cell) % 2 == 0 { even } else { odd };
                data.extend_from_slice(&color);
            }
        }
        Self { data, width, height, channels: 4 }
    }

    /// Size of the pixel data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}
