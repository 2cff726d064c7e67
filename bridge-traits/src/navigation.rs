//! Navigation Context Abstraction
//!
//! Read-only view of the location the host is currently navigating to.

/// Current navigation target
///
/// The web host backs this with `window.location`; native hosts back it
/// with the deep link or launch URL that opened the app.
///
/// Query parameters are read, never consumed: the core does not rewrite
/// the host's location.
pub trait NavigationContext: Send + Sync {
    /// Value of a query parameter on the current location, if present.
    fn query_param(&self, name: &str) -> Option<String>;

    /// The full current location, for diagnostics.
    fn current_location(&self) -> Option<String> {
        None
    }
}
