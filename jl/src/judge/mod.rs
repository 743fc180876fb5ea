//! Judge client module
//!
//! One authenticated channel to the remote judge. The client is transport
//! only: it executes a single query or mutation and classifies the
//! response; retry and back-off policy belong to the engine.

pub mod client;
mod error;
mod leetcode;

pub use client::JudgeClient;
pub use error::JudgeError;
pub use leetcode::LeetCodeClient;
