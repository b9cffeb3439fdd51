pub(crate) mod parts;
pub(crate) mod pose;
pub(crate) mod synth;
