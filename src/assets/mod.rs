pub(crate) mod image;
