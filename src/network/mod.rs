// src/network/mod.rs
//! Network communication components
//!
//! Everything that touches the node connection:
//! - `node`: connection settings and `connect`
//! - `framing`: newline-delimited message reassembly
//! - `listener`: the template receive loop and the submission writer

/// Newline-delimited message reassembly
pub mod framing;

/// Inbound template loop and outbound submission loop
pub mod listener;

/// Node connection settings and transport setup
pub mod node;

// Re-export main components for cleaner imports
pub use framing::Framer;
pub use listener::{Listener, submit_loop};
pub use node::{NodeConfig, connect};
