//! The session manager: one actor task owning the current session, its
//! timers and the activity gate.
//!
//! Everything that mutates session state (login, logout, timer firings,
//! activity signals, renewal results) is processed by a single Tokio task,
//! one message at a time. Callers hold a cheap, cloneable
//! [`SessionManager`] handle and talk to the task over a channel, the same
//! way a room handle talks to its room actor.
//!
//! # Message sources
//!
//! ```text
//!  SessionManager handle ──(SessionCommand, mpsc)──┐
//!  SessionTimers tasks ───(SessionEvent)───────────┤
//!  renewal task ──────────(SessionEvent)───────────┼──→ SessionActor::run
//!  ActivitySource ────────(broadcast, when armed)──┘
//! ```
//!
//! # Generations
//!
//! Every login and logout bumps `generation`. A renewal task is tagged with
//! the generation it started in; when its result comes back under a newer
//! generation, a login or logout happened in between and the result is
//! dropped. That is what makes logout win over an in-flight renewal.

use std::sync::Arc;
use std::time::Duration;

use sessionward_activity::{ActivityGate, ActivitySignal, ActivitySource, GateState, SignalOutcome};
use sessionward_protocol::{FrontConfig, Identity, Notice, RenewedToken, RouteTable};
use sessionward_timer::{Clock, SessionTimers, SystemClock, TimerId, TimerKind};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::hooks::{CredentialStore, LogNotifier, NoCredentialStore, Notifier, RouteRegistry, StaticRoutes};
use crate::{Session, SessionConfig, SessionError, SessionState, TokenRenewer};

// ---------------------------------------------------------------------------
// Public result types
// ---------------------------------------------------------------------------

/// What [`SessionManager::login`] did with the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The session is now current.
    Installed,
    /// The session was flagged as awaiting renewal: its timers are armed
    /// but the previous identity stays current.
    Pending,
    /// The token was already expired; the manager logged out instead.
    Expired,
}

/// A read-only view of the manager's state.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// The installed identity. The anonymous sentinel when logged out.
    pub identity: Identity,
    /// Token of the current session. Empty when anonymous.
    pub token: String,
    /// Anonymous or authenticated, derived from `identity`.
    pub state: SessionState,
    /// Where the activity gate is in its idle/armed/renewing cycle.
    pub gate: GateState,
    /// Process-wide display language.
    pub language: String,
    /// Routes and menu the current identity may see.
    pub routes: RouteTable,
    /// `true` after a logout until the next installed login.
    pub disconnected: bool,
    /// An expiration timer is pending.
    pub expiration_scheduled: bool,
    /// A rearm timer is pending.
    pub rearm_scheduled: bool,
    /// A renewal started in the current generation has not answered yet.
    pub renewal_in_flight: bool,
    /// Bumped on every login and logout.
    pub generation: u64,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Requests from [`SessionManager`] handles.
pub(crate) enum SessionCommand {
    /// Install or park a session and arm its timers.
    Login {
        session: Session,
        reply: oneshot::Sender<LoginOutcome>,
    },
    /// Drop to the anonymous session.
    Logout {
        reply: oneshot::Sender<()>,
    },
    /// Change the identity's locale and the process language.
    SetLanguage {
        locale: String,
        reply: oneshot::Sender<()>,
    },
    /// Replace the router's front configuration, then regenerate routes.
    SetConfig {
        config: FrontConfig,
        reply: oneshot::Sender<()>,
    },
    /// Regenerate routes for the current identity.
    Refresh {
        reply: oneshot::Sender<()>,
    },
    /// Read the current state.
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    /// Cancel timers and listeners and stop the actor.
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Notifications from tasks the actor spawned itself.
enum SessionEvent {
    /// A timer task slept out its delay.
    TimerFired {
        kind: TimerKind,
        id: TimerId,
    },
    /// The renewal RPC answered, tagged with the generation it started in.
    RenewalFinished {
        generation: u64,
        result: Result<RenewedToken, SessionError>,
    },
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to a running session manager.
///
/// Cheap to clone; every clone talks to the same actor. The actor stops on
/// [`shutdown`](Self::shutdown) or once every handle is dropped, cancelling
/// its timers and activity listeners either way.
#[derive(Clone)]
pub struct SessionManager {
    sender: mpsc::Sender<SessionCommand>,
    activity: ActivitySource,
}

impl SessionManager {
    /// Creates a builder with default collaborators.
    pub fn builder() -> SessionManagerBuilder {
        SessionManagerBuilder::new()
    }

    /// Installs `session` (or parks it, if flagged) and arms its timers.
    ///
    /// Any timers from the previous session are cancelled first, and any
    /// renewal still in flight becomes stale.
    pub async fn login(&self, session: Session) -> Result<LoginOutcome, SessionError> {
        self.request(|reply| SessionCommand::Login { session, reply })
            .await
    }

    /// Cancels timers and listeners, clears stored credentials and installs
    /// the anonymous session. Safe to call when already logged out.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Logout { reply }).await
    }

    /// Sets the current identity's locale and the process-wide language.
    pub async fn set_language(&self, locale: impl Into<String>) -> Result<(), SessionError> {
        let locale = locale.into();
        self.request(|reply| SessionCommand::SetLanguage { locale, reply })
            .await
    }

    /// Hands a new front configuration to the router and regenerates the
    /// routes for the current identity.
    pub async fn set_config(&self, config: FrontConfig) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::SetConfig { config, reply })
            .await
    }

    /// Regenerates the routes for the current identity.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Refresh { reply }).await
    }

    /// Returns the current state.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| SessionCommand::Snapshot { reply }).await
    }

    /// Cancels every timer and listener and stops the actor. Later calls
    /// on any handle return [`SessionError::Unavailable`].
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Shutdown { reply }).await
    }

    /// The source UI code publishes pointer, click and key signals to.
    pub fn activity(&self) -> &ActivitySource {
        &self.activity
    }

    /// Sends a command built around a fresh reply channel and waits for
    /// the answer.
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| SessionError::Unavailable)?;
        reply_rx.await.map_err(|_| SessionError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring and spawning a [`SessionManager`].
///
/// # Example
///
/// ```rust,ignore
/// let manager = SessionManager::builder()
///     .router(StaticRoutes::new(front_config))
///     .notifier(MyToasts::new())
///     .spawn(MyRenewer::new(http_client));
/// manager.login(session).await?;
/// ```
pub struct SessionManagerBuilder {
    config: SessionConfig,
    language: String,
    router: Arc<dyn RouteRegistry>,
    notifier: Arc<dyn Notifier>,
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    activity: Option<ActivitySource>,
}

impl SessionManagerBuilder {
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            language: "en".to_string(),
            router: Arc::new(StaticRoutes::default()),
            notifier: Arc::new(LogNotifier),
            credentials: Arc::new(NoCredentialStore),
            clock: Arc::new(SystemClock),
            activity: None,
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Initial process-wide language.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn router(self, router: impl RouteRegistry) -> Self {
        self.shared_router(Arc::new(router))
    }

    /// Like [`router`](Self::router) for a registry the caller also keeps.
    pub fn shared_router(mut self, router: Arc<dyn RouteRegistry>) -> Self {
        self.router = router;
        self
    }

    pub fn notifier(self, notifier: impl Notifier) -> Self {
        self.shared_notifier(Arc::new(notifier))
    }

    pub fn shared_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn credentials(self, credentials: impl CredentialStore) -> Self {
        self.shared_credentials(Arc::new(credentials))
    }

    pub fn shared_credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Clock used to turn `expires_at_ms` into a delay. Defaults to
    /// [`SystemClock`]; paused-time tests pass a `TokioClock`.
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Activity source to listen on. A private one is created otherwise.
    pub fn activity_source(mut self, source: ActivitySource) -> Self {
        self.activity = Some(source);
        self
    }

    /// Spawns the actor with `renewer` as the renewal RPC.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn spawn<R: TokenRenewer>(self, renewer: R) -> SessionManager {
        let config = self.config.validated();
        let activity = self.activity.unwrap_or_default();
        let (sender, commands) = mpsc::channel(config.command_channel_size);
        let (events_tx, events) = mpsc::unbounded_channel();

        let current = Session::anonymous();
        let routes = self.router.reset(&current.identity);

        let actor = SessionActor {
            config,
            current,
            pending: None,
            language: self.language,
            routes,
            disconnected: false,
            generation: 0,
            in_flight: None,
            timers: SessionTimers::new(),
            gate: ActivityGate::new(activity.clone()),
            renewer: Arc::new(renewer),
            router: self.router,
            notifier: self.notifier,
            credentials: self.credentials,
            clock: self.clock,
            commands,
            events_tx,
            events,
        };

        tokio::spawn(actor.run());

        SessionManager { sender, activity }
    }
}

impl Default for SessionManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// The internal session state. Runs inside a Tokio task.
struct SessionActor<R: TokenRenewer> {
    config: SessionConfig,
    /// The installed session. Anonymous when logged out.
    current: Session,
    /// A session logged in with `needs_renew_already`: timers armed, not
    /// installed.
    pending: Option<Session>,
    language: String,
    routes: RouteTable,
    disconnected: bool,
    generation: u64,
    /// Generation of the renewal request still awaiting an answer.
    in_flight: Option<u64>,
    timers: SessionTimers,
    gate: ActivityGate,
    renewer: Arc<R>,
    router: Arc<dyn RouteRegistry>,
    notifier: Arc<dyn Notifier>,
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    commands: mpsc::Receiver<SessionCommand>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl<R: TokenRenewer> SessionActor<R> {
    /// Processes commands, timer firings, renewal results and activity
    /// signals until shutdown.
    async fn run(mut self) {
        info!("session manager started");

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(SessionCommand::Shutdown { reply }) => {
                        self.teardown();
                        let _ = reply.send(());
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd),
                    None => {
                        self.teardown();
                        break;
                    }
                },
                Some(event) = self.events.recv() => self.handle_event(event),
                signal = self.gate.next_signal() => self.handle_signal(signal),
            }
        }

        info!("session manager stopped");
    }

    fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Login { session, reply } => {
                let outcome = self.login(session);
                let _ = reply.send(outcome);
            }
            SessionCommand::Logout { reply } => {
                self.logout();
                let _ = reply.send(());
            }
            SessionCommand::SetLanguage { locale, reply } => {
                self.set_language(locale);
                let _ = reply.send(());
            }
            SessionCommand::SetConfig { config, reply } => {
                self.router.set_config(config);
                self.reset_routes();
                let _ = reply.send(());
            }
            SessionCommand::Refresh { reply } => {
                self.reset_routes();
                let _ = reply.send(());
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            // Handled in `run` because it ends the loop.
            SessionCommand::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::TimerFired { kind, id } => {
                if !self.timers.complete(kind, id) {
                    return;
                }
                match kind {
                    TimerKind::Expiration => {
                        info!(identity = %self.current.identity, "session token expired");
                        self.expire();
                    }
                    TimerKind::Rearm => {
                        debug!("inactivity delay elapsed, watching for activity");
                        self.gate.arm();
                    }
                }
            }
            SessionEvent::RenewalFinished { generation, result } => {
                self.finish_renewal(generation, result);
            }
        }
    }

    fn handle_signal(&mut self, signal: ActivitySignal) {
        let generation = self.generation;
        let token = self.renewal_token().to_string();
        let renewer = Arc::clone(&self.renewer);
        let events = self.events_tx.clone();

        let outcome = self.gate.handle_signal(&signal, move || {
            spawn_renewal(renewer, token, generation, events);
        });

        if outcome == SignalOutcome::Fired {
            self.in_flight = Some(generation);
        }
    }

    // -- Transitions -------------------------------------------------------

    fn login(&mut self, session: Session) -> LoginOutcome {
        info!(
            identity = %session.identity,
            expires_at_ms = session.expires_at_ms,
            needs_renew = session.needs_renew_already,
            "login"
        );

        self.timers.cancel_all();
        self.generation += 1;
        self.in_flight = None;

        let now_ms = self.clock.now_ms();
        let Some(until_expiry) = session.delay_until_expiration(now_ms) else {
            warn!(
                identity = %session.identity,
                expires_at_ms = session.expires_at_ms,
                now_ms,
                "token already expired at login"
            );
            self.expire();
            return LoginOutcome::Expired;
        };

        self.schedule(TimerKind::Expiration, until_expiry);
        if let Some(delay) = session.inactivity_renew_delay() {
            self.schedule(TimerKind::Rearm, delay);
        }

        if session.needs_renew_already {
            debug!(
                current = %self.current.identity,
                "session awaiting renewal, previous identity stays installed"
            );
            self.pending = Some(session);
            return LoginOutcome::Pending;
        }

        self.pending = None;
        self.current = session;
        self.disconnected = false;
        self.reset_routes();
        self.gate.reset();
        LoginOutcome::Installed
    }

    fn logout(&mut self) {
        info!(identity = %self.current.identity, "logout");

        self.timers.cancel_all();
        self.gate.reset();
        self.generation += 1;
        self.in_flight = None;
        self.pending = None;
        self.credentials.clear();
        self.current = Session::anonymous();
        self.disconnected = true;
        self.reset_routes();
    }

    /// The forced-logout path: log out, then tell the user why.
    fn expire(&mut self) {
        self.logout();
        if self.config.notify_on_expiry {
            self.notifier.notify(Notice::SessionExpired);
        }
    }

    fn set_language(&mut self, locale: String) {
        info!(%locale, "language changed");
        self.current.identity.locale = locale.clone();
        self.language = locale;
    }

    fn finish_renewal(&mut self, generation: u64, result: Result<RenewedToken, SessionError>) {
        if self.in_flight == Some(generation) {
            self.in_flight = None;
        }
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "discarding renewal result from a previous session"
            );
            return;
        }

        let renewed = result.and_then(|renewed| {
            renewed.validate()?;
            Ok(renewed)
        });

        match renewed {
            Ok(renewed) => {
                info!(
                    identity = %self.renewal_base().identity,
                    expires_at_ms = renewed.expires_at_ms,
                    "token renewed"
                );
                let session = self.renewal_base().renewed(renewed);
                self.login(session);
            }
            Err(e) => {
                warn!(error = %e, "token renewal failed, session left to expire");
                self.notifier.notify(Notice::RenewalFailed {
                    reason: e.to_string(),
                });
            }
        }
    }

    // -- Helpers -----------------------------------------------------------

    /// The token sent for renewal: the parked session's if there is one,
    /// the installed session's otherwise.
    fn renewal_token(&self) -> &str {
        self.pending.as_ref().unwrap_or(&self.current).token.as_str()
    }

    /// The session a renewed token is grafted onto. The installed identity
    /// is kept; a parked session only stands in when nobody is installed.
    fn renewal_base(&self) -> &Session {
        match &self.pending {
            Some(pending) if self.current.is_anonymous() => pending,
            _ => &self.current,
        }
    }

    fn schedule(&mut self, kind: TimerKind, delay: Duration) {
        let events = self.events_tx.clone();
        self.timers.schedule(kind, delay, move |id| {
            let _ = events.send(SessionEvent::TimerFired { kind, id });
        });
    }

    fn reset_routes(&mut self) {
        self.routes = self.router.reset(&self.current.identity);
        debug!(
            identity = %self.current.identity,
            routes = self.routes.routes.len(),
            menu = self.routes.menu.len(),
            "routes regenerated"
        );
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            identity: self.current.identity.clone(),
            token: self.current.token.clone(),
            state: self.current.state(),
            gate: self.gate.state(),
            language: self.language.clone(),
            routes: self.routes.clone(),
            disconnected: self.disconnected,
            expiration_scheduled: self.timers.is_scheduled(TimerKind::Expiration),
            rearm_scheduled: self.timers.is_scheduled(TimerKind::Rearm),
            renewal_in_flight: self.in_flight.is_some(),
            generation: self.generation,
        }
    }

    fn teardown(&mut self) {
        self.timers.cancel_all();
        self.gate.reset();
        debug!("session timers and activity listeners released");
    }
}

/// Runs one renewal RPC on its own task and reports back, tagged with the
/// generation it started in.
fn spawn_renewal<R: TokenRenewer>(
    renewer: Arc<R>,
    token: String,
    generation: u64,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    tokio::spawn(async move {
        debug!(generation, "renewal request sent");
        let result = renewer.renew_token(&token).await;
        let _ = events.send(SessionEvent::RenewalFinished { generation, result });
    });
}
