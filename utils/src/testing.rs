use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::db::migrate;

/// Connects to `db_url` and brings the schema up to date.
///
/// In-memory SQLite lives per connection, so the pool is pinned to a single
/// connection that is never recycled.
pub async fn setup_test_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(1)
        .min_connections(1)
        .idle_timeout(std::time::Duration::from_secs(3600))
        .max_lifetime(std::time::Duration::from_secs(3600))
        .sqlx_logging(false);

    let conn = Database::connect(opt).await?;
    migrate(&conn).await?;
    Ok(conn)
}
