//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the session core:
//! - Logging and tracing infrastructure
//! - Authentication configuration and validation
//! - Event bus for session lifecycle notifications
//!
//! ## Overview
//!
//! Nothing in this crate knows about tokens. It establishes the logging
//! conventions, the fail-fast configuration rules and the broadcast channel
//! that `core-auth` builds on.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{AuthConfig, AuthConfigBuilder};
pub use error::{Error, Result};
pub use events::{AuthEvent, EventBus, EventStream};
