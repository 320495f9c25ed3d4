mod breakout;
mod directory;
mod event;
mod scheduler;
mod session;
mod shared;

use axum::{routing::post, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use breakout::repository::InMemoryBreakoutStore;
use directory::InMemoryRoomDirectory;
use event::NotificationBus;
use scheduler::{DurationScheduler, DurationTracker, SchedulerConfig};
use session::{JwtJoinTokenIssuer, TokenConfig};
use shared::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "breakout_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting breakout room coordination server");

    // Shared infrastructure: one bus and one duration tracker per process
    let bus = NotificationBus::new();
    let tracker = Arc::new(DurationTracker::new());

    // In-memory implementations for development. A production deployment
    // swaps these for the real key-value store and room directory.
    let store = Arc::new(InMemoryBreakoutStore::new());
    let directory = Arc::new(InMemoryRoomDirectory::new(
        Arc::clone(&tracker),
        bus.clone(),
    ));
    let token_issuer = Arc::new(JwtJoinTokenIssuer::new(TokenConfig::new()));

    // Per-process duration scheduler: sweep + event subscription
    let scheduler = DurationScheduler::new(
        Arc::clone(&tracker),
        directory.clone(),
        bus.clone(),
        SchedulerConfig::from_env(),
    );
    let _scheduler_handle = scheduler.start();

    let app_state = AppState::new(store, directory, token_issuer, bus);

    let app = Router::new()
        .route(
            "/breakout-room/create",
            post(breakout::create_breakout_rooms),
        )
        .route("/breakout-room/join", post(breakout::join_breakout_room))
        .route("/breakout-room/list", post(breakout::get_breakout_rooms))
        .route(
            "/breakout-room/increase-duration",
            post(breakout::increase_breakout_room_duration),
        )
        .route(
            "/breakout-room/send-msg",
            post(breakout::send_breakout_room_msg),
        )
        .route("/breakout-room/end", post(breakout::end_breakout_room))
        .route(
            "/breakout-room/end-all",
            post(breakout::end_breakout_rooms),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind listen address");
    info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app).await.expect("server error");
}
