use tracing_subscriber::EnvFilter;
use waypath_server::config::Config;
use waypath_server::{build_router, AppState, SHUTDOWN_GRACE_PERIOD};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::from_env();
    let port = config.port;
    let state = AppState::new(&config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .unwrap_or_else(|err| panic!("failed to bind port {port}: {err}"));

    tracing::info!(port, "waypath-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!(grace_period_secs = SHUTDOWN_GRACE_PERIOD.as_secs(), "shutting down");
}
