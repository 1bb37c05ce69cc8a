//! Core type definitions for Skillbridge.
//!
//! Broken down into submodules: tool descriptors, skill descriptors,
//! invocation outcomes, and routing types.

pub mod invocation;
pub mod request;
pub mod skill;
pub mod tool;

pub use invocation::*;
pub use request::*;
pub use skill::*;
pub use tool::*;
