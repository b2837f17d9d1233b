//! Pipeline error taxonomy.
//!
//! Each recoverable condition is its own variant so retry policy can be
//! attached per kind:
//!
//! - `ChallengeDetected` - retried in place with a long backoff
//! - `RedirectAmbiguity`, `PlaceholderArtifact` - deferred to the failure store
//! - `Structural` - fatal for the whole invocation

pub mod errors;

pub use errors::{DownloadError, DownloadResult};
