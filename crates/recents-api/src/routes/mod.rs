pub mod health;
pub mod recent;
