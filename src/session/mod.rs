pub(crate) mod cancel;
pub(crate) mod config;
pub(crate) mod progress;
pub(crate) mod render_session;
