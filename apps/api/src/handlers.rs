pub mod authorization;
pub mod health;
pub mod security;
