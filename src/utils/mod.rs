pub mod config;
pub mod error;
pub mod helpers;
pub mod password_validation;
pub mod uploads;
