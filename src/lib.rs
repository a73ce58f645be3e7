//! passgate - password signup and login with server-side sessions
//!
//! Users and sessions live in an embedded SQLite database. A successful
//! signup or login creates a session row, sets a signed http-only cookie
//! carrying its id and redirects to the training catalog.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod training;
pub mod utils;
pub mod web;

pub use error::{AppError, Result};
