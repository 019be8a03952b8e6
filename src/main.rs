use fie_relay::{build_router, AppState, RelayConfig};

use log::{error, info, warn};
use tokio::net::TcpListener;
use tokio::signal;

async fn shutdown_signal()
{   let ctrl_c = async {
      if let Err(e) = signal::ctrl_c().await
      {   error!("Failed to install Ctrl+C handler: {}", e);
          std::future::pending::<()>().await;
      }
    };

    #[cfg(unix)]
    let terminate = async {
      match signal::unix::signal(signal::unix::SignalKind::terminate())
      {   Ok(mut sig) => { sig.recv().await; }
        , Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
          }
      }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select!
    {   _ = ctrl_c => {}
      , _ = terminate => {}
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> std::io::Result<()>
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = RelayConfig::from_env();
    if config.api_key.is_none()
    {   warn!("CLAUDE_API_KEY not set; generation requests will be refused");
    }

    let bind_addr = config.bind_addr.clone();
    let app = build_router(AppState::new(config));

    let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
      error!("Failed to bind {}: {}", bind_addr, e);
      e
    })?;
    info!("fie-relay listening on {}", bind_addr);

    axum::serve(listener, app)
      .with_graceful_shutdown(shutdown_signal())
      .await
}
