//! Toonloop turns a single stylized still and a short text description into a looping cartoon
//! animation.
//!
//! The pipeline is a chain of pure stages:
//!
//! - [`parse`] a description into an [`ActionPlan`]
//! - [`compose`] the plan into per-frame poses and prop poses ([`Sequence`])
//! - rasterize each frame with a [`Compositor`]
//! - hand the frames to an encoder through a [`FrameSink`]
//!
//! [`render_animation`] and [`animate_text`] fuse the stages, optionally rendering frames on a
//! rayon pool.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod assets;
pub(crate) mod compose;
pub(crate) mod encode;
pub(crate) mod props;
pub(crate) mod render;
pub(crate) mod rig;
pub(crate) mod script;
pub(crate) mod session;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, FrameIndex, FrameRange, Point, Rect, Vec2,
};
pub use crate::foundation::error::{ToonError, ToonResult};

pub use crate::animation::ease::{Ease, ease_between, lerp, smoothstep, window};
pub use crate::animation::noise::jitter;
pub use crate::assets::image::BaseImage;
pub use crate::compose::sequence::{
    ActionSpan, BADGE_PHASE, FAILURE_SQUINT_PHASE, FramePlan, MAX_FRAME_COUNT, SUCCESS_STAR_PHASE,
    Sequence, allocate_ranges, compose,
};
pub use crate::encode::sink::{
    FrameSink, InMemorySink, PngSequenceSink, SequenceManifest, SinkConfig, write_animation,
};
pub use crate::props::animator::{DICE_REST_PHASE, ObjectPose, animate};
pub use crate::render::compositor::{Backdrop, Compositor, CompositorOpts, PART_Z_ORDER};
pub use crate::render::frame::{Animation, Frame, FrameRGBA};
pub use crate::render::smear::smear_rgba8_premul;
pub use crate::rig::parts::{PartId, PartRegion, PartSet, RegionShape};
pub use crate::rig::pose::{EyeState, PartTransform, Pose};
pub use crate::rig::synth::{SynthOpts, synthesize};
pub use crate::script::builder::{ActionBuilder, ActionPlanBuilder};
pub use crate::script::model::{
    Action, ActionKind, ActionPlan, Condition, Emotion, MAX_SUGGESTED_FRAMES,
    MIN_SUGGESTED_FRAMES, ObjectKind, ObjectSpec, suggest_frame_count, suggest_frame_duration_ms,
};
pub use crate::script::parser::{MAX_NUMERIC_RESULT, Parser, parse};
pub use crate::script::vocab::{
    BUILTIN_VOCABULARY_VERSION, CompiledVocabulary, VocabEntry, Vocabulary,
};
pub use crate::session::pipeline::{
    AnimateOpts, RenderThreading, animate_text, plan_sequence, render_animation, render_to_sink,
};
