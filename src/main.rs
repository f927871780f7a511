use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn, Level};

use restaurant_pos::config::database::DatabaseConfig;
use restaurant_pos::config::{EnvironmentConfig, StorageBackend};
use restaurant_pos::database::connect_and_migrate;
use restaurant_pos::repositories::Repositories;
use restaurant_pos::services::bootstrap_service::bootstrap;
use restaurant_pos::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    let level = Level::from_str(&config.log_level).unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🍽️  Restaurant POS - API de comandas");
    info!("==================================");

    let repos = match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_environment(&config)
                .context("DATABASE_URL es requerido con STORAGE_BACKEND=postgres")?;
            let pool = match connect_and_migrate(&db_config).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {:#}", e);
                    return Err(e);
                }
            };
            info!("✅ PostgreSQL conectado");
            Repositories::postgres(pool, config.folio_max_retries)
        }
        StorageBackend::Memory => {
            warn!("⚠️  Almacenamiento en memoria: los datos se pierden al reiniciar");
            Repositories::memory()
        }
    };

    bootstrap(&repos, config.seed_products)
        .await
        .map_err(|e| anyhow::anyhow!("Error en el arranque: {}", e))?;

    if config.ticket_spool_dir.is_none() {
        warn!("🖨️  TICKET_SPOOL_DIR no configurado: los tickets no se imprimirán");
    }

    let addr: SocketAddr = config.server_url().parse()?;
    let app = build_router(AppState::new(config, repos));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   POST /api/auth/login · GET /api/auth/me");
    info!("   /api/products · /api/users · /api/orders · /api/tables");
    info!("   /api/accounts · /api/kitchen · /api/tickets");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Servidor terminó con error: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("No se pudo escuchar Ctrl+C: {}", e);
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
                error!("No se pudo escuchar SIGTERM: {}", e);
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
