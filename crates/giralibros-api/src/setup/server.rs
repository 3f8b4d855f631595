//! HTTP listener lifecycle.

use anyhow::Result;
use axum::Router;
use giralibros_core::Config;

/// Bind the listener and serve until SIGINT or SIGTERM.
pub async fn serve(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        addr = %addr,
        media_root = %config.storage_path,
        upload_cap_mb = config.max_upload_bytes / 1024 / 1024,
        cover_envelope = format!("{}x{}", config.cover_max_width, config.cover_max_height),
        jpeg_quality = config.cover_jpeg_quality,
        pending_ttl_hours = config.pending_ttl_hours,
        content_types = %config.allowed_content_types.join(","),
        "Listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves when the process receives SIGINT or SIGTERM.
///
/// # Panics
/// Panics if a signal handler cannot be installed.
async fn wait_for_shutdown() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("SIGINT handler installation failed");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation failed")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => tracing::info!("SIGINT received, draining connections"),
        _ = terminate => tracing::info!("SIGTERM received, draining connections"),
    }
}
