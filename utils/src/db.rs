use migration::{DbErr, Migrator, MigratorTrait, SchemaManager, sea_orm::DatabaseConnection};

const BRACKET_TABLES: [&str; 4] = ["tournaments", "registrations", "rounds", "matches"];

pub async fn migrate(conn: &DatabaseConnection) -> Result<(), DbErr> {
    let schema_manager = SchemaManager::new(conn);
    Migrator::up(conn, None).await?;
    for table in BRACKET_TABLES {
        if !schema_manager.has_table(table).await? {
            return Err(DbErr::Custom(format!("table {table} missing after migration")));
        }
    }
    Ok(())
}
