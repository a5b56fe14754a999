use std::env;
use std::path::PathBuf;

use anyhow::Context;
use foundation_server::{db, import};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foundation_server=info,foundation_import=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let dir: PathBuf = env::args()
        .nth(1)
        .context("usage: foundation-import <legacy-store-dir>")?
        .into();
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = db::create_pool(&database_url, 2).await?;
    db::migrate(&pool).await?;

    let reports = import::run(&pool, &dir).await?;
    if reports.is_empty() {
        tracing::warn!(dir = %dir.display(), "No legacy files found");
    }
    for report in reports {
        tracing::info!(
            file = report.file,
            imported = report.imported,
            skipped = report.skipped,
            "Import finished"
        );
    }

    Ok(())
}
