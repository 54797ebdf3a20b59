//! The identity store: the single entry point UI code mutates.
//!
//! [`IdentityStore`] wraps the session manager handle and adds the
//! UI-facing state that has nothing to do with timers: the loading
//! indicator and menu visibility. Cloning the store is cheap and every
//! clone shares the same state.

use std::sync::Arc;

use sessionward_activity::ActivitySource;
use sessionward_protocol::FrontConfig;
use sessionward_session::{
    CredentialStore, LoginOutcome, Notifier, RouteRegistry, Session, SessionManager,
    SessionManagerBuilder, SessionSnapshot, TokenRenewer,
};
use sessionward_timer::Clock;
use tokio::sync::watch;
use tracing::debug;

use crate::{LoaderCounter, SessionwardError, StoreConfig};

/// Handle to the identity store.
#[derive(Clone)]
pub struct IdentityStore {
    sessions: SessionManager,
    loader: Arc<LoaderCounter>,
    menu_visible: Arc<watch::Sender<bool>>,
}

impl IdentityStore {
    pub fn builder() -> IdentityStoreBuilder {
        IdentityStoreBuilder::new()
    }

    // -- Session ------------------------------------------------------------

    /// Logs `session` in. See [`SessionManager::login`].
    pub async fn login(&self, session: Session) -> Result<LoginOutcome, SessionwardError> {
        Ok(self.sessions.login(session).await?)
    }

    /// Logs out. Safe to call when already logged out.
    pub async fn logout(&self) -> Result<(), SessionwardError> {
        Ok(self.sessions.logout().await?)
    }

    /// Changes the current identity's locale and the process language.
    pub async fn set_language(&self, locale: impl Into<String>) -> Result<(), SessionwardError> {
        Ok(self.sessions.set_language(locale).await?)
    }

    /// The process-wide language.
    pub async fn language(&self) -> Result<String, SessionwardError> {
        Ok(self.sessions.snapshot().await?.language)
    }

    pub async fn set_config(&self, config: FrontConfig) -> Result<(), SessionwardError> {
        Ok(self.sessions.set_config(config).await?)
    }

    /// Regenerates routes and menu for the current identity.
    pub async fn refresh(&self) -> Result<(), SessionwardError> {
        Ok(self.sessions.refresh().await?)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionwardError> {
        Ok(self.sessions.snapshot().await?)
    }

    /// Stops the session manager. Loader and menu state stay readable.
    pub async fn shutdown(&self) -> Result<(), SessionwardError> {
        Ok(self.sessions.shutdown().await?)
    }

    /// Where UI code publishes pointer, click and key activity.
    pub fn activity(&self) -> &ActivitySource {
        self.sessions.activity()
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    // -- Loader -------------------------------------------------------------

    /// Registers one busy operation. Returns the visibility afterwards.
    pub fn show_loader(&self) -> bool {
        self.loader.show()
    }

    /// Ends one busy operation. Returns the visibility afterwards.
    pub fn hide_loader(&self) -> bool {
        self.loader.hide()
    }

    pub fn loader(&self) -> &LoaderCounter {
        &self.loader
    }

    // -- Menu ---------------------------------------------------------------

    /// Flips menu visibility and returns the new value.
    pub fn toggle_menu(&self) -> bool {
        let mut visible = false;
        self.menu_visible.send_modify(|v| {
            *v = !*v;
            visible = *v;
        });
        debug!(visible, "menu toggled");
        visible
    }

    pub fn show_menu(&self) {
        self.menu_visible.send_replace(true);
    }

    pub fn hide_menu(&self) {
        self.menu_visible.send_replace(false);
    }

    pub fn menu_visible(&self) -> bool {
        *self.menu_visible.borrow()
    }

    /// Subscribes to menu visibility changes.
    pub fn watch_menu(&self) -> watch::Receiver<bool> {
        self.menu_visible.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for an [`IdentityStore`].
///
/// # Example
///
/// ```rust,ignore
/// let store = IdentityStore::builder()
///     .config(StoreConfig::from_json(&settings)?)
///     .router(StaticRoutes::new(front_config))
///     .spawn(HttpRenewer::new(client));
/// ```
pub struct IdentityStoreBuilder {
    config: StoreConfig,
    sessions: SessionManagerBuilder,
}

impl IdentityStoreBuilder {
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            sessions: SessionManagerBuilder::new(),
        }
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn router(mut self, router: impl RouteRegistry) -> Self {
        self.sessions = self.sessions.router(router);
        self
    }

    pub fn notifier(mut self, notifier: impl Notifier) -> Self {
        self.sessions = self.sessions.notifier(notifier);
        self
    }

    pub fn credentials(mut self, credentials: impl CredentialStore) -> Self {
        self.sessions = self.sessions.credentials(credentials);
        self
    }

    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.sessions = self.sessions.clock(clock);
        self
    }

    /// Spawns the session manager and returns the store.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn spawn<R: TokenRenewer>(self, renewer: R) -> IdentityStore {
        let config = self.config.validated();
        let sessions = self
            .sessions
            .config(config.session)
            .language(config.default_language)
            .activity_source(ActivitySource::new(config.activity_capacity))
            .spawn(renewer);
        let (menu_visible, _) = watch::channel(config.menu_visible);

        IdentityStore {
            sessions,
            loader: Arc::new(LoaderCounter::new()),
            menu_visible: Arc::new(menu_visible),
        }
    }
}

impl Default for IdentityStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
