//! The booth session state machine.

pub(crate) mod photo_session;
pub(crate) mod state;
