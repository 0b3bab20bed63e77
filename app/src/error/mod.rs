use axum::http::StatusCode;
use models::domains::sea_orm_active_enums::TournamentStatus;
use sea_orm::DbErr;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("tournament {0} not found")]
    TournamentNotFound(String),
    #[error("match {0} not found")]
    MatchNotFound(i32),
    #[error("registration {0} not found")]
    RegistrationNotFound(i32),
    #[error("operation is not valid while the tournament is {status}")]
    InvalidState { status: TournamentStatus },
    #[error("at least 2 registrations are required, found {count}")]
    InsufficientParticipants { count: usize },
    #[error("match {0} is already completed")]
    AlreadyCompleted(String),
    #[error("registration {winner} is not a player of match {match_code}")]
    InvalidWinner { winner: i32, match_code: String },
    #[error("round {0} is not complete")]
    RoundNotComplete(String),
    #[error("no round follows {0}")]
    NoNextRound(String),
    #[error("round {0} has already been generated")]
    AlreadyAdvanced(String),
    #[error("tournament is full ({max} participants)")]
    TournamentFull { max: i32 },
    #[error("{0} is already registered")]
    DuplicateRegistration(String),
    #[error(transparent)]
    InvalidParams(#[from] ValidationErrors),
    #[error("inconsistent bracket: {0}")]
    InconsistentBracket(String),
    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] DbErr),
}

impl EngineError {
    /// The HTTP status a route handler should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            EngineError::TournamentNotFound(_)
            | EngineError::MatchNotFound(_)
            | EngineError::RegistrationNotFound(_) => StatusCode::NOT_FOUND,
            EngineError::InvalidState { .. }
            | EngineError::AlreadyCompleted(_)
            | EngineError::RoundNotComplete(_)
            | EngineError::NoNextRound(_)
            | EngineError::AlreadyAdvanced(_)
            | EngineError::TournamentFull { .. }
            | EngineError::DuplicateRegistration(_) => StatusCode::CONFLICT,
            EngineError::InsufficientParticipants { .. } | EngineError::InvalidWinner { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            EngineError::InvalidParams(_) => StatusCode::BAD_REQUEST,
            EngineError::InconsistentBracket(_) | EngineError::PersistenceFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
