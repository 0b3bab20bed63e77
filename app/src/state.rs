use sea_orm::DatabaseConnection;

use crate::{config::Config, core::BracketEngine};

#[derive(Clone)]
pub struct AppState {
    pub conn: DatabaseConnection,
    pub config: Config,
    pub engine: BracketEngine,
}

impl AppState {
    pub fn new(conn: DatabaseConnection, config: Config) -> Self {
        let engine = BracketEngine::new(conn.clone(), config.seeding.strategy());
        Self {
            conn,
            config,
            engine,
        }
    }
}
