pub mod admin;
pub mod detect;
pub mod health;
pub mod humanize;
pub mod usage;
