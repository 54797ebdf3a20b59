//! Collaborators the session manager calls out to.
//!
//! Each hook is a small synchronous trait so it can be stored as
//! `Arc<dyn Hook>` and called from inside the actor without awaiting:
//!
//! - [`RouteRegistry`]: computes the routes and menu an identity may see
//! - [`Notifier`]: shows fire-and-forget messages to the user
//! - [`CredentialStore`]: erases persisted token material on logout
//!
//! The defaults ([`StaticRoutes`], [`LogNotifier`], [`NoCredentialStore`])
//! are enough to run headless.

use std::sync::{PoisonError, RwLock};

use sessionward_protocol::{FrontConfig, Identity, Notice, RouteTable};

/// Regenerates the navigation routes and menu for an identity.
///
/// Called after every installed login and every logout.
pub trait RouteRegistry: Send + Sync + 'static {
    fn reset(&self, identity: &Identity) -> RouteTable;

    /// Replaces the front configuration. The manager calls
    /// [`reset`](Self::reset) right after.
    fn set_config(&self, config: FrontConfig) {
        let _ = config;
    }
}

/// Shows a message to the user. Must not block.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notice: Notice);
}

/// Erases persisted credential material (cookies, keychain entries...).
pub trait CredentialStore: Send + Sync + 'static {
    fn clear(&self);
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// A [`RouteRegistry`] that filters a [`FrontConfig`] by credentials.
#[derive(Debug, Default)]
pub struct StaticRoutes {
    config: RwLock<FrontConfig>,
}

impl StaticRoutes {
    pub fn new(config: FrontConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }
}

impl RouteRegistry for StaticRoutes {
    fn reset(&self, identity: &Identity) -> RouteTable {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(identity)
    }

    fn set_config(&self, config: FrontConfig) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
    }
}

/// A [`Notifier`] that only logs. Used when no UI is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::SessionExpired => {
                tracing::warn!(key = notice.message_key(), "session expired");
            }
            Notice::RenewalFailed { reason } => {
                tracing::warn!(key = notice.message_key(), %reason, "token renewal failed");
            }
        }
    }
}

/// A [`CredentialStore`] with nothing to clear.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentialStore;

impl CredentialStore for NoCredentialStore {
    fn clear(&self) {
        tracing::trace!("no credential store wired, nothing to clear");
    }
}

#[cfg(test)]
mod tests {
    use sessionward_protocol::Route;

    use super::*;

    #[test]
    fn test_static_routes_reset_filters_by_identity() {
        let routes = StaticRoutes::new(FrontConfig {
            routes: vec![
                Route::new("/", "home"),
                Route::new("/users", "users").requiring(["user-read"]),
            ],
            ..FrontConfig::default()
        });

        let anonymous = routes.reset(&Identity::anonymous());
        let reader = routes.reset(
            &Identity::new("urn:user:r", "r@x.y").with_credentials(["user-read"]),
        );

        assert_eq!(anonymous.routes.len(), 1);
        assert_eq!(reader.routes.len(), 2);
    }

    #[test]
    fn test_static_routes_set_config_replaces_table() {
        let routes = StaticRoutes::default();
        assert!(routes.reset(&Identity::anonymous()).routes.is_empty());

        routes.set_config(FrontConfig {
            routes: vec![Route::new("/about", "about")],
            ..FrontConfig::default()
        });

        assert!(routes.reset(&Identity::anonymous()).contains_path("/about"));
    }
}
