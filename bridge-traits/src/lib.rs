//! # Host Bridge Traits
//!
//! Platform abstraction traits that each host must implement before the
//! session core can run.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP used for token verification and authenticated calls
//! - [`SessionStorage`](storage::SessionStorage) - Session-scoped persistence of the raw token
//! - [`NavigationContext`](navigation::NavigationContext) - Query parameters of the current location
//! - [`Clock`](time::Clock) - Time source for deterministic expiry checks
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Web      | TBD                 | 📋 Planned |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with a descriptive error when a required capability
//! is missing:
//!
//! ```ignore
//! let http_client = deps.http_client
//!     .ok_or_else(|| ServiceError::CapabilityMissing {
//!         capability: "HttpClient".to_string(),
//!         message: "No HTTP client implementation provided. \
//!                  Desktop: ensure default feature is enabled.".to_string(),
//!     })?;
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! convert platform errors into it with an actionable message.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single adapter can be shared
//! across tasks behind an `Arc`.

pub mod error;
pub mod http;
pub mod navigation;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use navigation::NavigationContext;
pub use storage::SessionStorage;
pub use time::{Clock, LogLevel, SystemClock};
