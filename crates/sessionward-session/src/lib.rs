//! Authentication session lifecycle for sessionward.
//!
//! This crate holds a client's logged-in session and keeps it honest:
//!
//! 1. **Expiration**: every login schedules a forced logout at the token's
//!    expiration time.
//! 2. **Inactivity renewal**: after the session's inactivity delay the
//!    activity gate is armed; the first real user input triggers one
//!    renewal RPC, and a successful answer logs the user back in with the
//!    fresh token.
//! 3. **Logout**: cancels everything, clears stored credentials and
//!    installs the anonymous session.
//!
//! # How it fits in the stack
//!
//! ```text
//! Identity store (above)   ← exposes login/logout/set_language to the UI
//!     ↕
//! Session layer (this crate) ← SessionManager actor: timers + gate + renewal
//!     ↕
//! Timer / Activity / Protocol (below)
//! ```
//!
//! Collaborators the session layer calls out to (renewal RPC, router,
//! notifier, credential storage) are traits in [`hooks`] and
//! [`TokenRenewer`]; plug in real ones or the provided defaults.

#![allow(async_fn_in_trait)]

mod error;
pub mod hooks;
mod manager;
mod renewer;
mod session;

pub use error::SessionError;
pub use hooks::{CredentialStore, LogNotifier, NoCredentialStore, Notifier, RouteRegistry, StaticRoutes};
pub use manager::{LoginOutcome, SessionManager, SessionManagerBuilder, SessionSnapshot};
pub use renewer::{TokenRenewer, decode_renewal};
pub use session::{Session, SessionConfig, SessionState};
