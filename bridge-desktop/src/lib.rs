//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` with retry and backoff
//! - `SessionStorage` in memory, or as a JSON file under the app data directory
//! - `NavigationContext` over a parsed launch or deep-link URL
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{MemorySessionStorage, ReqwestHttpClient, UrlNavigation};
//!
//! let http_client = ReqwestHttpClient::new()?;
//! let storage = MemorySessionStorage::new();
//! let navigation = UrlNavigation::parse("myapp://callback?token=eyJ...")?;
//! ```

mod http;
mod navigation;
mod session_storage;

pub use http::ReqwestHttpClient;
pub use navigation::UrlNavigation;
pub use session_storage::{FileSessionStorage, MemorySessionStorage};
