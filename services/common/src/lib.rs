//! Support code shared by the Asteria services: tracing setup, typed env
//! lookups, listener binding and shutdown signalling.

mod env;
mod logging;
mod net;

pub use env::env_or;
pub use logging::{init_tracing, TracingGuards};
pub use net::{bind_listener, shutdown_signal, BindError};
