//! Asset IO: decoding photos and overlays, encoding outputs, and overlay sources.

pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod source;
