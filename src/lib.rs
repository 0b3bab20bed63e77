use anyhow::Context;
use clap::{Parser, Subcommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use app::{config::Config, state::AppState};
use models::{
    params::{registration::RegisterParticipantParams, tournament::CreateTournamentParams},
    schemas::{
        registration::{RegistrationListSchema, RegistrationSchema},
        tournament::TournamentSchema,
    },
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "bracketd")]
#[command(about = "Single-elimination bracket admin", long_about = None)]
pub struct Cli {
    // Migrations only when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Admin commands run against the configured database.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Bring the database schema up to date
    Migrate,
    /// Create a draft tournament
    Create { title: String, max_participants: i32 },
    /// Register a participant while the tournament is a draft
    Register {
        tournament: String,
        name: String,
        contact: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// List registrations in id order
    Registrations { tournament: String },
    /// Generate the bracket and its first round
    #[command(name = "init")]
    Initialize { tournament: String },
    /// Record the winner of a match
    Result {
        match_id: i32,
        winner_id: i32,
        score: Option<String>,
    },
    /// Take back a recorded result
    Reopen { match_id: i32 },
    /// Generate the next round from the current one
    Advance { tournament: String },
    /// Print the bracket as JSON
    Show { tournament: String },
    Cancel { tournament: String },
    Archive { tournament: String },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn setup_config() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    Config::from_env()
}

pub async fn setup_db(db_url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(db_url);
    opt.max_lifetime(std::time::Duration::from_secs(60))
        .sqlx_logging(false);

    let conn = Database::connect(opt)
        .await
        .context("Database connection failed")?;
    utils::db::migrate(&conn).await.context("Migration failed")?;
    Ok(conn)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = setup_config()?;
    let conn = setup_db(&config.db_url).await?;
    let state = AppState::new(conn, config);
    let actor = state.config.actor.clone();

    let engine = &state.engine;
    match cli.command.unwrap_or(Command::Migrate) {
        Command::Migrate => {
            tracing::info!("Database is up to date");
        }
        Command::Create {
            title,
            max_participants,
        } => {
            let tournament = engine
                .create_tournament(CreateTournamentParams {
                    title,
                    max_participants,
                    seed: None,
                })
                .await?;
            print_json(&TournamentSchema::from(tournament))?;
        }
        Command::Register {
            tournament,
            name,
            contact,
            category,
        } => {
            let registration = engine
                .register_participant(
                    &tournament,
                    RegisterParticipantParams {
                        name,
                        contact,
                        category,
                    },
                )
                .await?;
            print_json(&RegistrationSchema::from(registration))?;
        }
        Command::Registrations { tournament } => {
            let registrations = engine.list_registrations(&tournament).await?;
            print_json(&RegistrationListSchema::from(registrations))?;
        }
        Command::Initialize { tournament } => {
            let created = engine.initialize(&tournament, &actor).await?;
            tracing::info!(
                rounds = created.rounds.len(),
                matches = created.matches.len(),
                "Bracket created"
            );
        }
        Command::Result {
            match_id,
            winner_id,
            score,
        } => {
            let recorded = engine
                .record_result(match_id, winner_id, score, &actor)
                .await?;
            tracing::info!(match_code = %recorded.match_code, "Result saved");
        }
        Command::Reopen { match_id } => {
            let reopened = engine.reopen_match(match_id, &actor).await?;
            tracing::info!(match_code = %reopened.match_code, "Match open again");
        }
        Command::Advance { tournament } => {
            let advanced = engine.advance_round(&tournament, &actor).await?;
            tracing::info!(
                round = %advanced.next.round.name,
                matches = advanced.next.matches.len(),
                "Round generated"
            );
        }
        Command::Show { tournament } => {
            print_json(&engine.get_bracket_state(&tournament).await?)?;
        }
        Command::Cancel { tournament } => {
            let tournament = engine.cancel_tournament(&tournament, &actor).await?;
            print_json(&TournamentSchema::from(tournament))?;
        }
        Command::Archive { tournament } => {
            let tournament = engine.archive_tournament(&tournament, &actor).await?;
            print_json(&TournamentSchema::from(tournament))?;
        }
    }

    Ok(())
}
