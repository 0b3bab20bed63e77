pub mod bracket;
pub mod registration;
pub mod tournament;
