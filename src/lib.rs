//! A JSON REST API over a single Postgres `todos` table.
//!
//! Each route parses its input, issues one statement through a [`TodoStore`]
//! and maps the outcome to one status code.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;

pub use config::Config;
pub use db::driver::Db;
pub use error::ApiError;
pub use models::{Todo, TodoId};
pub use repository::{StoreError, TodoStore};
