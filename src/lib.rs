pub mod auth;
pub mod configuration;
pub mod connectors;
pub mod db;
pub mod errors;
pub mod forms;
pub mod guard;
pub mod health;
mod helpers;
mod middleware;
pub mod models;
pub mod routes;
pub mod secrets;
pub mod services;
pub mod startup;
pub mod telemetry;
pub mod validators;
