use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::{signal, sync::watch};
use tracing::{error, info, warn};

use car_rental::build_router;
use car_rental::config::EnvironmentConfig;
use car_rental::database::DatabaseConnection;
use car_rental::routes::ROUTE_TABLE;
use car_rental::services::scheduler::spawn_reconciliation;
use car_rental::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .init();

    info!("🚗 Car Rental - Motor de reservas");
    info!("================================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };
    let pool = db_connection.pool().clone();

    let addr: SocketAddr = config.server_url().parse()?;
    let reconcile_every = Duration::from_secs(config.reconcile_interval_secs.max(1));
    let app_state = AppState::new(pool, config);

    // Job de reconciliación en segundo plano
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reconciler = spawn_reconciliation(app_state.reconciliation_job(), reconcile_every, shutdown_rx);

    let app = build_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    for (method, path) in ROUTE_TABLE {
        info!("   {:<6} {}", method, path);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
    }

    // Parar el job antes de salir
    let _ = shutdown_tx.send(true);
    if let Err(e) = reconciler.await {
        warn!("⚠️ El job de reconciliación terminó con error: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo escuchar SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
