pub mod db;
pub mod testing;
