pub mod auth;
pub mod components;
pub mod cookies;
pub mod cron;
pub mod db;
pub mod errors;
pub mod password;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod uploads;
pub mod user;
pub mod validation;

pub use state::AppState;

#[cfg(test)]
pub(crate) mod test_support;

pub type Result<T, E = color_eyre::Report> = std::result::Result<T, E>;
