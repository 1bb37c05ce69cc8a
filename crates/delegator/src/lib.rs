#![deny(unused)]
//! Router/delegator role for Skillbridge.
//!
//! Discovers a remote agent's skill catalog, builds a classification index,
//! and for each incoming request either delegates to a matching remote
//! skill or answers locally through the response generator. Downstream
//! failures are always contained: the caller gets a natural-language
//! answer, never raw protocol errors.

pub mod client;
pub mod delegate;
pub mod generator;
pub mod index;
pub mod server;

pub use client::HttpAgentClient;
pub use delegate::Delegator;
pub use generator::OllamaGenerator;
pub use index::ClassificationIndex;
pub use server::{DelegatorServer, DelegatorServerConfig};
