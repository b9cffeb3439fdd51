use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ToonError, ToonResult};
use crate::render::frame::{Animation, Frame};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Loop count for the encoder, 0 = infinite.
    pub loop_count: u16,
    /// Number of frames that will be pushed.
    pub frame_count: u64,
}

/// Consumer of rendered frames in playback order.
///
/// Ordering contract: `push_frame` is called in strictly increasing [`FrameIndex`] order.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ToonResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> ToonResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> ToonResult<()>;
}

#[derive(Debug, Default)]
struct OrderGuard {
    last: Option<FrameIndex>,
}

impl OrderGuard {
    fn check(&mut self, idx: FrameIndex) -> ToonResult<()> {
        if let Some(last) = self.last
            && idx <= last
        {
            return Err(ToonError::validation(format!(
                "frames must be pushed in increasing order: got {} after {}",
                idx.0, last.0
            )));
        }
        self.last = Some(idx);
        Ok(())
    }
}

/// Sink that keeps every frame in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    order: OrderGuard,
    frames: Vec<(FrameIndex, Frame)>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, Frame)] {
        &self.frames
    }

    /// Package the captured frames as an [`Animation`].
    pub fn into_animation(self) -> ToonResult<Animation> {
        let cfg = self
            .cfg
            .ok_or_else(|| ToonError::validation("sink was never started"))?;
        Ok(Animation {
            frames: self.frames.into_iter().map(|(_, f)| f).collect(),
            loop_count: cfg.loop_count,
            width: cfg.width,
            height: cfg.height,
        })
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ToonResult<()> {
        self.cfg = Some(cfg);
        self.order = OrderGuard::default();
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> ToonResult<()> {
        self.order.check(idx)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ToonResult<()> {
        Ok(())
    }
}

/// Timing sidecar written next to a PNG sequence.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SequenceManifest {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// 0 = infinite.
    pub loop_count: u16,
    /// File names in playback order.
    pub frames: Vec<String>,
    /// Per-frame display time.
    pub durations_ms: Vec<u32>,
}

/// Writes `frame_0000.png`, `frame_0001.png`, ... and a `manifest.json` for an external encoder.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    order: OrderGuard,
    manifest: Option<SequenceManifest>,
}

impl PngSequenceSink {
    /// Manifest file name inside the output directory.
    pub const MANIFEST: &'static str = "manifest.json";

    /// Sink writing into `dir`, created on `begin` if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            order: OrderGuard::default(),
            manifest: None,
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> ToonResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output directory '{}'", self.dir.display()))?;
        self.cfg = Some(cfg);
        self.order = OrderGuard::default();
        self.manifest = Some(SequenceManifest {
            width: cfg.width,
            height: cfg.height,
            loop_count: cfg.loop_count,
            frames: Vec::new(),
            durations_ms: Vec::new(),
        });
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> ToonResult<()> {
        let manifest = self
            .manifest
            .as_mut()
            .ok_or_else(|| ToonError::validation("push_frame called before begin"))?;
        self.order.check(idx)?;
        let img = &frame.image;
        if (img.width, img.height) != (manifest.width, manifest.height) {
            return Err(ToonError::render(format!(
                "frame {} is {}x{}, sink expects {}x{}",
                idx.0, img.width, img.height, manifest.width, manifest.height
            )));
        }

        let name = format!("frame_{:04}.png", idx.0);
        let path = self.dir.join(&name);
        let straight = img.to_straight_rgba();
        image::save_buffer_with_format(
            &path,
            &straight,
            img.width,
            img.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write '{}'", path.display()))?;

        manifest.frames.push(name);
        manifest.durations_ms.push(frame.duration_ms);
        Ok(())
    }

    fn end(&mut self) -> ToonResult<()> {
        let manifest = self
            .manifest
            .take()
            .ok_or_else(|| ToonError::validation("end called before begin"))?;
        if let Some(cfg) = self.cfg
            && manifest.frames.len() as u64 != cfg.frame_count
        {
            tracing::warn!(
                expected = cfg.frame_count,
                written = manifest.frames.len(),
                "png sequence ended with an unexpected frame count"
            );
        }
        let json = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| ToonError::serde(format!("encode manifest: {e}")))?;
        let path = self.dir.join(Self::MANIFEST);
        std::fs::write(&path, json).with_context(|| format!("write '{}'", path.display()))?;
        tracing::debug!(
            dir = %self.dir.display(),
            frames = manifest.frames.len(),
            "wrote png sequence"
        );
        Ok(())
    }
}

/// Push a whole animation through `sink`.
pub fn write_animation(anim: &Animation, sink: &mut dyn FrameSink) -> ToonResult<()> {
    sink.begin(SinkConfig {
        width: anim.width,
        height: anim.height,
        loop_count: anim.loop_count,
        frame_count: anim.frames.len() as u64,
    })?;
    for (i, frame) in anim.frames.iter().enumerate() {
        sink.push_frame(FrameIndex(i as u64), frame)?;
    }
    sink.end()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
