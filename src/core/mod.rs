//! Long-running service pieces: HTTP API, job runtime, scheduler and snapshot cache

pub mod http;
pub mod runtime;
pub mod scheduler;
pub mod snapshot;

pub use http::*;
pub use runtime::*;
pub use scheduler::*;
pub use snapshot::*;
