//! Seeds the parking lot with its initial spaces.
//!
//! Idempotent: does nothing if spaces already exist. Creates 20 spaces, 10
//! per floor; the first 15 are car spaces and the last 5 motorcycle spaces.
//!
//! ```bash
//! cargo run -p parqueo-api --bin seed_espacios
//! ```

use parqueo_api::config::Config;
use parqueo_shared::db::{migrations, pool};
use parqueo_shared::models::space::ParkingSpace;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TOTAL_ESPACIOS: i32 = 20;
const ESPACIOS_POR_PISO: i32 = 10;
const ESPACIOS_AUTOMOVIL: i32 = 15;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed_espacios=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    let existing = ParkingSpace::count(&db).await?;
    tracing::info!(existing, "Existing spaces");

    if existing > 0 {
        tracing::info!("Spaces already seeded, nothing to do");
        return Ok(());
    }

    for i in 1..=TOTAL_ESPACIOS {
        let numero = format!("E-{:03}", i);
        let piso = (i + ESPACIOS_POR_PISO - 1) / ESPACIOS_POR_PISO;
        let tipo = if i <= ESPACIOS_AUTOMOVIL {
            "automovil"
        } else {
            "moto"
        };

        let espacio = ParkingSpace::create(&db, &numero, piso, tipo).await?;
        tracing::info!(
            numero = %espacio.numero,
            piso = espacio.piso,
            tipo = %espacio.tipo,
            "Created space"
        );
    }

    tracing::info!("Seeded {} spaces", TOTAL_ESPACIOS);
    Ok(())
}
