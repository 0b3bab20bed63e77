use std::{ops::Deref, str::FromStr, sync::Arc};

use anyhow::{Context, anyhow};

use crate::core::{RegistrationOrder, Seeding, Shuffled};

const DEFAULT_ACTOR: &str = "cli";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedingMode {
    Shuffled,
    Registration,
}

impl SeedingMode {
    pub fn strategy(self) -> Arc<dyn Seeding> {
        match self {
            SeedingMode::Shuffled => Arc::new(Shuffled),
            SeedingMode::Registration => Arc::new(RegistrationOrder),
        }
    }
}

impl FromStr for SeedingMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shuffled" | "random" => Ok(SeedingMode::Shuffled),
            "registration" => Ok(SeedingMode::Registration),
            other => Err(anyhow!("unknown seeding mode `{other}`")),
        }
    }
}

pub struct ConfigInner {
    pub db_url: String,
    pub seeding: SeedingMode,
    /// Identity attached to actions taken through the admin binary.
    pub actor: String,
}

#[derive(Clone)]
pub struct Config(Arc<ConfigInner>);

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set in .env file")?;
        let seeding = match std::env::var("BRACKET_SEEDING") {
            Ok(value) => value.parse().context("BRACKET_SEEDING is invalid")?,
            Err(_) => SeedingMode::Shuffled,
        };
        let actor = std::env::var("BRACKET_ACTOR").unwrap_or_else(|_| DEFAULT_ACTOR.into());

        Ok(Self::new(ConfigInner {
            db_url,
            seeding,
            actor,
        }))
    }

    pub fn new(inner: ConfigInner) -> Config {
        Self(Arc::new(inner))
    }
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
