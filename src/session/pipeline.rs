//! Fused parse, compose and render.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rayon::prelude::*;

use crate::assets::image::BaseImage;
use crate::compose::sequence::{FramePlan, MAX_FRAME_COUNT, Sequence, compose};
use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
use crate::foundation::error::{ToonError, ToonResult};
use crate::render::compositor::{Compositor, CompositorOpts};
use crate::render::frame::{Animation, Frame};
use crate::rig::parts::PartSet;
use crate::rig::synth::SynthOpts;
use crate::script::model::ActionPlan;
use crate::script::parser::Parser;

/// Frame-level parallelism settings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    /// Render frames on a dedicated rayon pool.
    pub parallel: bool,
    /// Frames rendered per batch before they are handed to the sink.
    pub chunk_size: usize,
    /// Override the number of worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 16,
            threads: None,
        }
    }
}

/// Everything a caller can tune for one animation.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimateOpts {
    /// Total frame override; the plan's suggestion otherwise.
    pub frame_count: Option<u32>,
    /// Per-frame duration override; the plan's suggestion otherwise.
    pub frame_duration_ms: Option<u32>,
    /// 0 = loop forever.
    pub loop_count: u16,
    /// Pose synthesis knobs.
    pub synth: SynthOpts,
    /// Raster knobs.
    pub compositor: CompositorOpts,
    /// Parallelism.
    pub threading: RenderThreading,
}

impl AnimateOpts {
    /// Structural validation; nothing is coerced.
    pub fn validate(&self) -> ToonResult<()> {
        if self.frame_count == Some(0) {
            return Err(ToonError::validation("frame_count must be > 0 when set"));
        }
        if let Some(n) = self.frame_count
            && n > MAX_FRAME_COUNT
        {
            return Err(ToonError::validation(format!(
                "frame_count {n} exceeds the limit of {MAX_FRAME_COUNT}"
            )));
        }
        if self.frame_duration_ms == Some(0) {
            return Err(ToonError::validation(
                "frame_duration_ms must be > 0 when set",
            ));
        }
        if self.threading.threads == Some(0) {
            return Err(ToonError::validation(
                "render threading 'threads' must be >= 1 when set",
            ));
        }
        self.synth.validate()?;
        self.compositor.validate()
    }

    /// Parse options from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> ToonResult<Self> {
        let opts: Self = serde_json::from_reader(r)
            .map_err(|e| ToonError::config(format!("parse animate options JSON: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Parse options from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ToonResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ToonError::config(format!("open animate options '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

/// Render `plan` over `base` into an in-memory [`Animation`].
pub fn render_animation(
    base: &BaseImage,
    parts: &PartSet,
    plan: &ActionPlan,
    opts: &AnimateOpts,
) -> ToonResult<Animation> {
    let mut sink = InMemorySink::new();
    render_to_sink(base, parts, plan, opts, &mut sink)?;
    sink.into_animation()
}

/// Parse `text` and render it. `parts = None` runs the whole-image fallback rig.
pub fn animate_text(
    base: &BaseImage,
    parts: Option<&PartSet>,
    text: &str,
    parser: &Parser,
    opts: &AnimateOpts,
) -> ToonResult<Animation> {
    let plan = parser.parse(text);
    match parts {
        Some(parts) => render_animation(base, parts, &plan, opts),
        None => render_animation(base, &PartSet::whole_image(base.canvas()), &plan, opts),
    }
}

/// Render `plan` and stream the frames into `sink` in increasing index order.
#[tracing::instrument(
    skip(base, parts, plan, opts, sink),
    fields(width = base.width, height = base.height)
)]
pub fn render_to_sink(
    base: &BaseImage,
    parts: &PartSet,
    plan: &ActionPlan,
    opts: &AnimateOpts,
    sink: &mut dyn FrameSink,
) -> ToonResult<()> {
    opts.validate()?;
    let sequence = compose(
        plan,
        parts,
        opts.frame_count,
        opts.frame_duration_ms,
        &opts.synth,
    )?;
    let compositor = Compositor::new(base, parts, opts.compositor.clone())?;

    sink.begin(SinkConfig {
        width: base.width,
        height: base.height,
        loop_count: opts.loop_count,
        frame_count: sequence.len() as u64,
    })?;

    let chunk_size = opts.threading.chunk_size.max(1);
    let pool = if opts.threading.parallel {
        Some(build_thread_pool(opts.threading.threads)?)
    } else {
        None
    };
    for chunk in sequence.frames().chunks(chunk_size) {
        let frames = match &pool {
            Some(pool) => render_chunk_parallel(&compositor, chunk, pool)?,
            None => chunk
                .iter()
                .map(|f| render_one(&compositor, f))
                .collect::<ToonResult<Vec<_>>>()?,
        };
        for (plan, frame) in chunk.iter().zip(&frames) {
            sink.push_frame(plan.index, frame)?;
        }
    }
    sink.end()?;

    tracing::info!(
        frames = sequence.len(),
        parallel = opts.threading.parallel,
        "rendered animation"
    );
    Ok(())
}

/// Compose only; useful for previewing timing without rasterizing.
pub fn plan_sequence(
    parts: &PartSet,
    plan: &ActionPlan,
    opts: &AnimateOpts,
) -> ToonResult<Sequence> {
    opts.validate()?;
    compose(
        plan,
        parts,
        opts.frame_count,
        opts.frame_duration_ms,
        &opts.synth,
    )
}

fn render_one(compositor: &Compositor, plan: &FramePlan) -> ToonResult<Frame> {
    Ok(Frame {
        image: compositor.render(plan)?,
        duration_ms: plan.duration_ms,
    })
}

fn render_chunk_parallel(
    compositor: &Compositor,
    chunk: &[FramePlan],
    pool: &rayon::ThreadPool,
) -> ToonResult<Vec<Frame>> {
    let rendered = pool.install(|| {
        chunk
            .par_iter()
            .enumerate()
            .map_init(
                || compositor.clone(),
                |worker, (i, plan)| -> ToonResult<(usize, Frame)> {
                    Ok((i, render_one(worker, plan)?))
                },
            )
            .collect::<Vec<_>>()
    });

    let mut out = vec![None::<Frame>; chunk.len()];
    for r in rendered {
        let (i, frame) = r?;
        out[i] = Some(frame);
    }
    out.into_iter()
        .map(|f| {
            f.ok_or_else(|| {
                ToonError::render("internal error: frame missing after parallel render")
            })
        })
        .collect()
}

fn build_thread_pool(threads: Option<usize>) -> ToonResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ToonError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ToonError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/pipeline.rs"]
mod tests;
