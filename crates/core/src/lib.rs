#![deny(unused)]
//! Core types, traits, and error definitions for Skillbridge.
//!
//! This crate provides the foundational building blocks shared across the
//! three roles of the system: the tool host, the protocol bridge, and the
//! request delegator.

pub mod config;
pub mod error;
pub mod mocks;
pub mod observability;
pub mod retry;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::*;
pub use types::*;
