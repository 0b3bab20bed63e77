pub mod bracket;
mod dtos;
mod engine;
mod seeding;

pub use dtos::*;
pub use engine::*;
pub use seeding::*;
