//! Data types shared by every sessionward layer.
//!
//! This crate defines what crosses the boundary between the session
//! manager and its collaborators:
//!
//! - **Types** ([`Identity`], [`RenewedToken`], [`RouteTable`], [`Notice`],
//!   etc.): the structures handed to routers, notifiers and renewers.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how a renewal response
//!   body is turned into a [`RenewedToken`].
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! ```text
//! Renewal RPC (bytes) → Protocol (RenewedToken) → Session (timers, gate)
//! ```
//!
//! Nothing in here knows about timers or activity; it only describes data.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{FrontConfig, Identity, MenuItem, Notice, RenewedToken, Route, RouteTable};
