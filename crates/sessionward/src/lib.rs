//! # sessionward
//!
//! Client-side authentication session lifecycle.
//!
//! sessionward holds the token a client already has and keeps it honest:
//! it logs the user out when the token expires, renews it once per
//! inactivity episode when the user comes back, and gives the UI one place
//! to log in, log out and change language.
//!
//! ## Layers
//!
//! ```text
//! sessionward          ← IdentityStore, LoaderCounter, StoreConfig, logging
//!     ↕
//! sessionward-session  ← SessionManager actor, TokenRenewer, hooks
//!     ↕
//! sessionward-timer · sessionward-activity · sessionward-protocol
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sessionward::prelude::*;
//!
//! struct Renewer;
//!
//! impl TokenRenewer for Renewer {
//!     async fn renew_token(&self, _token: &str) -> Result<RenewedToken, SessionError> {
//!         Err(SessionError::RenewalFailed("offline".into()))
//!     }
//! }
//!
//! # async fn run() -> Result<(), SessionwardError> {
//! let store = IdentityStore::builder().spawn(Renewer);
//! let session = Session::new(Identity::new("urn:user:ada", "ada@example.org"), "tok", 0);
//! store.login(session).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod loader;
pub mod logging;
mod store;

pub use config::StoreConfig;
pub use error::SessionwardError;
pub use loader::LoaderCounter;
pub use store::{IdentityStore, IdentityStoreBuilder};

/// Re-exports of the types most applications need.
pub mod prelude {
    pub use crate::{IdentityStore, LoaderCounter, SessionwardError, StoreConfig};
    pub use sessionward_activity::{ActivitySignal, ActivitySource, GateState, Modifiers};
    pub use sessionward_protocol::{
        Codec, FrontConfig, Identity, JsonCodec, MenuItem, Notice, RenewedToken, Route, RouteTable,
    };
    pub use sessionward_session::{
        CredentialStore, LoginOutcome, Notifier, RouteRegistry, Session, SessionConfig,
        SessionError, SessionSnapshot, SessionState, StaticRoutes, TokenRenewer, decode_renewal,
    };
    pub use sessionward_timer::{Clock, SystemClock, TokioClock};
}
