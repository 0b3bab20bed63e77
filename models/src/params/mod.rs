pub mod registration;
pub mod tournament;
