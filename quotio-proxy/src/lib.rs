//! Supervises the child proxy process: locating its binary, starting and
//! stopping it, and watching its health.
//!
//! The daemon owns exactly one [`supervisor::ProxySupervisor`], wrapped in
//! an `Arc` so both the IPC handlers and the background health-monitor
//! task can share it.

pub mod error;
pub mod locator;
pub mod supervisor;

pub use error::ProxyError;
pub use locator::{sniff_version, BinaryLocator, DEFAULT_BINARY_NAME};
pub use quotio_core::ProxyProcessState;
pub use supervisor::ProxySupervisor;
