//! # Actix Middleware Library
//!
//! Request-security middleware for the Base API service
//!
//! ## Modules
//! - `pipeline`: explicit request-scan stage model and runner
//! - `xss_scan`: header/query/body scanning middleware (buffers + rewinds the payload)
//! - `sanitize`: `Sanitized<T>` JSON extractor for `SanitizeStrings` DTOs
//! - `token_revocation`: `RevocationStore` seam and revocation-check middleware
//! - `security_headers`: fixed protective response headers
//! - `logging`: request/response audit logging
//!
//! Stage ordering is a behavioral contract: scanning runs before the
//! revocation check, the revocation check runs before dispatch, and the
//! security headers wrap every response including short-circuits. With
//! actix the last `wrap` call is the outermost layer, so services register:
//!
//! ```text
//! App::new()
//!     .wrap(TokenRevocationMiddleware::new(store))
//!     .wrap(XssScanMiddleware::new())
//!     .wrap(SecurityHeaders)
//! ```

pub mod logging;
pub mod pipeline;
pub mod sanitize;
pub mod security_headers;
pub mod token_revocation;
pub mod xss_scan;

pub use logging::Logging;
pub use pipeline::{Rejection, ScanPipeline, ScanRequest, ScanStage, StageOutcome};
pub use sanitize::Sanitized;
pub use security_headers::SecurityHeaders;
pub use token_revocation::{
    InMemoryRevocationStore, RevocationStore, StoreError, TokenRevocationMiddleware,
};
pub use xss_scan::XssScanMiddleware;
