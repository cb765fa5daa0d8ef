pub(crate) mod decode;
pub(crate) mod loader;
pub(crate) mod media;
pub(crate) mod source;
