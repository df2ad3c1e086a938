use anyhow::Result;

use crate::core::AppConfig;
use crate::core::db::{async_db, initialize_db};

/// Create the context store schema ahead of the first boot.
pub async fn run() -> Result<()> {
    let config = AppConfig::default();
    let db = async_db(&config.db_path).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    println!("Initialized context store in {}", config.db_path);
    Ok(())
}
