//! Navigation context over a parsed URL

use bridge_traits::{
    error::{BridgeError, Result},
    navigation::NavigationContext,
};
use std::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

/// [`NavigationContext`] backed by the URL the app was opened or
/// navigated with (launch argument, deep link, OAuth-style callback).
///
/// The host calls [`UrlNavigation::navigate`] whenever the current location
/// changes.
#[derive(Debug, Default)]
pub struct UrlNavigation {
    current: RwLock<Option<Url>>,
}

impl UrlNavigation {
    /// No current location; every query parameter reads as absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts at `location`.
    pub fn parse(location: &str) -> Result<Self> {
        let navigation = Self::new();
        navigation.navigate(location)?;
        Ok(navigation)
    }

    /// Replaces the current location.
    pub fn navigate(&self, location: &str) -> Result<()> {
        let url = Url::parse(location).map_err(|e| {
            BridgeError::OperationFailed(format!("Invalid navigation URL: {}", e))
        })?;

        debug!(path = url.path(), "Navigation updated");
        match self.current.write() {
            Ok(mut current) => *current = Some(url),
            Err(poisoned) => *poisoned.into_inner() = Some(url),
        }
        Ok(())
    }

    /// Forgets the current location.
    pub fn clear(&self) {
        match self.current.write() {
            Ok(mut current) => *current = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    fn with_current<T>(&self, f: impl FnOnce(&Url) -> Option<T>) -> Option<T> {
        let guard = match self.current.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Navigation lock poisoned, reading last known location");
                poisoned.into_inner()
            }
        };
        guard.as_ref().and_then(f)
    }
}

impl NavigationContext for UrlNavigation {
    fn query_param(&self, name: &str) -> Option<String> {
        self.with_current(|url| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        })
    }

    fn current_location(&self) -> Option<String> {
        // Query string omitted: it may carry a token.
        self.with_current(|url| {
            let mut location = url.clone();
            location.set_query(None);
            Some(location.to_string())
        })
    }
}
