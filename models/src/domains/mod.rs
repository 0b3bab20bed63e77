//! `SeaORM` entities for the bracket tables.

pub mod matches;
pub mod registrations;
pub mod rounds;
pub mod sea_orm_active_enums;
pub mod tournaments;
