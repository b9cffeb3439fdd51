use crate::foundation::math::unpremultiply_rgba8_in_place;

/// A rendered frame as RGBA8 pixels.
///
/// Frames leave the compositor with **premultiplied alpha**; the flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixels, as image encoders expect.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }
}

/// One output frame with its display time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Raster.
    pub image: FrameRGBA,
    /// Display time in milliseconds.
    pub duration_ms: u32,
}

/// Ordered frames plus playback metadata, handed verbatim to an encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Animation {
    /// Frames in playback order.
    pub frames: Vec<Frame>,
    /// Number of loops; 0 means forever.
    pub loop_count: u16,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl Animation {
    /// Sum of all frame durations.
    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.duration_ms)).sum()
    }

    /// Per-frame durations in playback order.
    pub fn durations_ms(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.duration_ms).collect()
    }
}
