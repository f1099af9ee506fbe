//! XSS detection and input sanitization
//!
//! **Security Features**:
//! - Fixed signature set for script/markup injection vectors
//! - Combined matcher compiled once at startup, lock-free shared reads
//! - Idempotent sanitization (encode + strip + control-character removal)
//! - `SanitizeStrings` capability trait for request DTOs
//!
//! The matcher is built on the `regex` crate, whose linear-time engine
//! guarantees scanning cost proportional to input length regardless of
//! the payload; catastrophic backtracking is structurally impossible.

pub mod detector;
pub mod sanitize;
pub mod sanitizer;

pub use detector::{detector, ThreatDetector};
pub use sanitize::{sanitize_field, sanitize_opt, SanitizeStrings};
pub use sanitizer::sanitize;
