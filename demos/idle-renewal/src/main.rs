//! Walks one session through a full lifecycle against an in-memory auth
//! service: login, inactivity, renewal on activity, then expiry.
//!
//! Run with `RUST_LOG=sessionward_session=debug` to watch the timers.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use sessionward::prelude::*;
use tracing::info;

// ---------------------------------------------------------------------------
// In-memory auth service
// ---------------------------------------------------------------------------

/// Issues tokens valid for `lifetime_ms`, answering with the same JSON
/// body an HTTP endpoint would.
struct InMemoryAuth {
    clock: SystemClock,
    lifetime_ms: i64,
    inactivity_ms: i64,
    issued: AtomicU32,
}

impl InMemoryAuth {
    fn response_body(&self, token: &str) -> Result<Vec<u8>, SessionError> {
        let serial = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let body = serde_json::json!({
            "token": format!("{token}#{serial}"),
            "expiresAtMs": self.clock.now_ms() + self.lifetime_ms,
            "inactivityRenewDelayMs": self.inactivity_ms,
        });
        JsonCodec
            .encode(&body)
            .map_err(|e| SessionError::RenewalFailed(e.to_string()))
    }
}

impl TokenRenewer for InMemoryAuth {
    async fn renew_token(&self, token: &str) -> Result<RenewedToken, SessionError> {
        // Network round trip.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let body = self.response_body(token)?;
        decode_renewal(&JsonCodec, &body)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

async fn report(store: &IdentityStore, step: &str) -> Result<(), SessionwardError> {
    let snap = store.snapshot().await?;
    info!(
        step,
        identity = %snap.identity,
        state = %snap.state,
        gate = %snap.gate,
        generation = snap.generation,
        "snapshot"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), SessionwardError> {
    sessionward::logging::init("sessionward=debug,sessionward_session=debug,idle_renewal=info");

    let clock = SystemClock;
    let front = FrontConfig {
        routes: vec![
            Route::new("/", "HomeComponent"),
            Route::new("/users", "UsersComponent").requiring(["user-admin"]),
        ],
        menu: vec![MenuItem::link("users", "Users", "/users")],
        ..FrontConfig::default()
    };
    let store = IdentityStore::builder()
        .config(StoreConfig::from_json(r#"{"defaultLanguage":"en"}"#)?)
        .router(StaticRoutes::new(front))
        .spawn(InMemoryAuth {
            clock,
            lifetime_ms: 1_500,
            inactivity_ms: 400,
            issued: AtomicU32::new(0),
        });

    let identity = Identity::new("urn:user:ada", "ada@example.org")
        .with_name("Ada", "Lovelace")
        .with_credentials(["user-admin"]);
    let session = Session::new(identity, "initial", clock.now_ms() + 1_500)
        .with_inactivity_renew_delay_ms(400);

    store.show_loader();
    store.login(session).await?;
    store.hide_loader();
    report(&store, "logged in").await?;

    // Idle long enough to arm the gate, then come back.
    tokio::time::sleep(Duration::from_millis(500)).await;
    report(&store, "idle").await?;
    store.activity().emit(ActivitySignal::Click);
    tokio::time::sleep(Duration::from_millis(100)).await;
    report(&store, "renewed").await?;

    // A modifier chord is not activity.
    tokio::time::sleep(Duration::from_millis(500)).await;
    store
        .activity()
        .emit(ActivitySignal::key_with(Modifiers::CTRL));

    // Stay away past the renewed token's expiry.
    tokio::time::sleep(Duration::from_millis(1_600)).await;
    report(&store, "expired").await?;

    store.shutdown().await?;
    Ok(())
}
