//! Command handlers.
//!
//! Handlers are thin wrappers that:
//! 1. Turn CLI input into pipeline requests
//! 2. Call the downloader or the failure store
//! 3. Format output for the terminal

pub mod download;
pub mod failures;
pub mod paths;
