//! Utility modules

pub mod net;

pub use net::bind_tcp_listener;
