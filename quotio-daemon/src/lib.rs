//! Library surface for `quotiod`, split out so black-box integration
//! tests can build an [`AppState`] and drive the method registry without
//! going through `main`.

pub mod error;
pub mod handlers;
pub mod oauth;
pub mod pidfile;
pub mod scheduler;
pub mod state;

pub use error::DaemonError;
pub use state::AppState;
