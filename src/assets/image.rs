use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ToonError, ToonResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// The stylized still that is both backdrop and source of the part sprites.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, tightly packed, row-major.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl BaseImage {
    /// Decode any format the `image` crate understands.
    pub fn decode(bytes: &[u8]) -> ToonResult<Self> {
        let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_straight_rgba8(width, height, rgba.into_raw())
    }

    /// Read and decode an image file.
    pub fn from_path(path: impl AsRef<Path>) -> ToonResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read image '{}'", path.display()))?;
        Self::decode(&bytes)
    }

    /// Wrap straight-alpha RGBA8 pixels.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> ToonResult<Self> {
        let canvas = Canvas::new(width, height)?;
        if rgba.len() != canvas.rgba_len()? {
            return Err(ToonError::validation(format!(
                "image buffer is {} bytes, expected {}x{}x4",
                rgba.len(),
                width,
                height
            )));
        }
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Canvas with the image's dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Premultiplied pixel at `(x, y)`; transparent outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = &self.rgba8_premul[i..i + 4];
        [px[0], px[1], px[2], px[3]]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image.rs"]
mod tests;
