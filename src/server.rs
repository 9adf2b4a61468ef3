//! HTTPサーバー起動とグレースフルシャットダウン

use crate::{api, AppState};
use tracing::info;

/// サーバーを起動し、シャットダウンシグナルまで待ち受ける
pub async fn run(state: AppState, bind_addr: &str) -> std::io::Result<()> {
    let app = api::create_app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Shard monitor listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// シャットダウンシグナルを待機
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
