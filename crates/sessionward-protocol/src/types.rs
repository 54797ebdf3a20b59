//! Core types that travel between the session manager and its collaborators.
//!
//! Field names are camelCase on the wire so that payloads coming from a
//! browser-facing authentication service decode without adapters.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The user a session belongs to.
///
/// The session layer treats this as opaque: it only ever asks whether an
/// identity is anonymous, and hands it to the router so the permitted
/// routes can be computed from `credentials`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable URI of the user. [`Identity::ANONYMOUS_URI`] for the
    /// logged-out sentinel.
    pub uri: String,

    /// Login e-mail. Empty for anonymous.
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    /// Display locale (`"en"`, `"fr"`, ...). Changed by `set_language`.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Administrators are granted every route regardless of credentials.
    #[serde(default)]
    pub admin: bool,

    /// Credential ids granted to this user, e.g. `"experiment-read"`.
    #[serde(default)]
    pub credentials: Vec<String>,
}

fn default_locale() -> String {
    "en".to_string()
}

impl Identity {
    /// URI carried by the anonymous sentinel identity.
    pub const ANONYMOUS_URI: &'static str = "anonymous";

    /// Creates a non-admin identity with no credentials.
    pub fn new(uri: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            locale: default_locale(),
            admin: false,
            credentials: Vec::new(),
        }
    }

    /// The logged-out sentinel. Installed at startup and after every logout.
    pub fn anonymous() -> Self {
        Self::new(Self::ANONYMOUS_URI, "")
    }

    /// Returns `true` for the logged-out sentinel.
    pub fn is_anonymous(&self) -> bool {
        self.uri == Self::ANONYMOUS_URI
    }

    /// Replaces the credential list.
    pub fn with_credentials<I, S>(mut self, credentials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.credentials = credentials.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Marks the identity as an administrator.
    pub fn as_admin(mut self) -> Self {
        self.admin = true;
        self
    }

    /// Returns `true` if the identity holds `credential` (admins hold all).
    pub fn has_credential(&self, credential: &str) -> bool {
        self.admin || self.credentials.iter().any(|c| c == credential)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

// ---------------------------------------------------------------------------
// RenewedToken
// ---------------------------------------------------------------------------

/// The result of a successful renewal RPC.
///
/// Only token material comes back; the identity stays whatever it was when
/// renewal started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewedToken {
    /// The new opaque credential.
    pub token: String,

    /// Absolute Unix timestamp (ms) after which `token` is invalid.
    pub expires_at_ms: i64,

    /// Inactivity delay before renewal is armed again. `<= 0` disables it.
    #[serde(default)]
    pub inactivity_renew_delay_ms: i64,
}

impl RenewedToken {
    /// Checks the payload is usable as a session token.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidPayload`] for an empty token.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.token.trim().is_empty() {
            return Err(ProtocolError::InvalidPayload(
                "renewed token is empty".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Routes and menu
// ---------------------------------------------------------------------------

/// A client-side route and the credentials needed to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub path: String,
    pub component: String,
    /// Every listed credential is required. Empty means public.
    #[serde(default)]
    pub credentials: Vec<String>,
}

impl Route {
    pub fn new(path: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            component: component.into(),
            credentials: Vec::new(),
        }
    }

    pub fn requiring<I, S>(mut self, credentials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.credentials = credentials.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if `identity` may navigate to this route.
    pub fn permits(&self, identity: &Identity) -> bool {
        self.credentials.iter().all(|c| identity.has_credential(c))
    }
}

/// One entry of the navigation menu tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    /// Path of the route this entry opens. Group entries have none.
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    /// A leaf entry opening `route`.
    pub fn link(id: impl Into<String>, label: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            route: Some(route.into()),
            children: Vec::new(),
        }
    }

    /// A group entry holding `children`.
    pub fn group(id: impl Into<String>, label: impl Into<String>, children: Vec<MenuItem>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            route: None,
            children,
        }
    }
}

/// Routes and menu permitted for one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    pub routes: Vec<Route>,
    pub menu: Vec<MenuItem>,
}

impl RouteTable {
    /// Returns `true` if a route with this path is present.
    pub fn contains_path(&self, path: &str) -> bool {
        self.routes.iter().any(|r| r.path == path)
    }
}

// ---------------------------------------------------------------------------
// FrontConfig
// ---------------------------------------------------------------------------

/// Front-end configuration: layout components plus the full, unfiltered
/// route table and menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontConfig {
    pub home_component: String,
    pub not_found_component: String,
    pub header_component: String,
    pub login_component: String,
    pub menu_component: String,
    pub footer_component: String,
    #[serde(default)]
    pub menu: Vec<MenuItem>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl Default for FrontConfig {
    fn default() -> Self {
        let placeholder = || "front-ToDoComponent".to_string();
        Self {
            home_component: placeholder(),
            not_found_component: placeholder(),
            header_component: placeholder(),
            login_component: placeholder(),
            menu_component: placeholder(),
            footer_component: placeholder(),
            menu: Vec::new(),
            routes: Vec::new(),
        }
    }
}

impl FrontConfig {
    /// Computes the routes and menu `identity` is allowed to see.
    ///
    /// A menu link survives if its route is permitted; a group survives if
    /// at least one of its children does.
    pub fn resolve(&self, identity: &Identity) -> RouteTable {
        let routes: Vec<Route> = self
            .routes
            .iter()
            .filter(|r| r.permits(identity))
            .cloned()
            .collect();
        let allowed: HashSet<&str> = routes.iter().map(|r| r.path.as_str()).collect();
        let menu = prune_menu(&self.menu, &allowed);
        RouteTable { routes, menu }
    }
}

fn prune_menu(items: &[MenuItem], allowed: &HashSet<&str>) -> Vec<MenuItem> {
    items
        .iter()
        .filter_map(|item| {
            let children = prune_menu(&item.children, allowed);
            let keep = match &item.route {
                Some(path) => allowed.contains(path.as_str()),
                None => !children.is_empty(),
            };
            keep.then(|| MenuItem {
                children,
                ..item.clone()
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

/// A user-facing message the session layer asks the notifier to display.
///
/// Rendering (translation, toast styling) is the notifier's business; the
/// session layer only picks which message applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notice {
    /// The token reached its expiration time and the user was logged out.
    SessionExpired,

    /// The renewal RPC failed. The session stays until it expires.
    RenewalFailed { reason: String },
}

impl Notice {
    /// Translation key for the message.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::SessionExpired => "component.common.errors.unauthorized-error",
            Self::RenewalFailed { .. } => "component.common.errors.renew-token-error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> FrontConfig {
        FrontConfig {
            routes: vec![
                Route::new("/", "home"),
                Route::new("/users", "users").requiring(["user-read"]),
                Route::new("/groups", "groups").requiring(["group-read"]),
            ],
            menu: vec![
                MenuItem::link("home", "Home", "/"),
                MenuItem::group(
                    "admin",
                    "Administration",
                    vec![
                        MenuItem::link("users", "Users", "/users"),
                        MenuItem::link("groups", "Groups", "/groups"),
                    ],
                ),
            ],
            ..FrontConfig::default()
        }
    }

    #[test]
    fn test_identity_anonymous_is_anonymous() {
        assert!(Identity::anonymous().is_anonymous());
        assert!(!Identity::new("urn:user:1", "a@b.c").is_anonymous());
    }

    #[test]
    fn test_identity_admin_has_every_credential() {
        let admin = Identity::new("urn:user:root", "root@b.c").as_admin();
        assert!(admin.has_credential("anything-at-all"));
    }

    #[test]
    fn test_identity_decode_fills_defaults() {
        let identity: Identity =
            serde_json::from_str(r#"{"uri":"urn:user:7"}"#).expect("decodes");
        assert_eq!(identity.locale, "en");
        assert!(identity.credentials.is_empty());
        assert!(!identity.admin);
    }

    #[test]
    fn test_renewed_token_validate_rejects_blank_token() {
        let renewed = RenewedToken {
            token: "  ".into(),
            expires_at_ms: 1,
            inactivity_renew_delay_ms: 0,
        };
        assert!(matches!(
            renewed.validate(),
            Err(ProtocolError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_resolve_anonymous_sees_only_public_routes() {
        let table = sample_config().resolve(&Identity::anonymous());

        assert_eq!(table.routes.len(), 1);
        assert!(table.contains_path("/"));
        // The admin group has no visible child, so it disappears.
        assert_eq!(table.menu.len(), 1);
        assert_eq!(table.menu[0].id, "home");
    }

    #[test]
    fn test_resolve_prunes_group_children_without_credentials() {
        let reader = Identity::new("urn:user:r", "r@b.c").with_credentials(["user-read"]);

        let table = sample_config().resolve(&reader);

        assert!(table.contains_path("/users"));
        assert!(!table.contains_path("/groups"));
        let admin_group = table.menu.iter().find(|m| m.id == "admin").expect("group kept");
        assert_eq!(admin_group.children.len(), 1);
        assert_eq!(admin_group.children[0].id, "users");
    }

    #[test]
    fn test_resolve_admin_sees_everything() {
        let admin = Identity::new("urn:user:root", "root@b.c").as_admin();

        let table = sample_config().resolve(&admin);

        assert_eq!(table.routes.len(), 3);
        assert_eq!(table.menu[1].children.len(), 2);
    }

    #[test]
    fn test_notice_message_keys() {
        assert_eq!(
            Notice::SessionExpired.message_key(),
            "component.common.errors.unauthorized-error"
        );
        let json = serde_json::to_string(&Notice::RenewalFailed { reason: "503".into() })
            .expect("encodes");
        assert_eq!(json, r#"{"type":"renewalFailed","reason":"503"}"#);
    }
}
