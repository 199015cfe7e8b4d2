pub mod app_error;
pub mod app_state;
pub mod bootstrap;
pub mod carts;
pub mod config;
pub mod db;
pub mod models;
pub mod orders;
pub mod routes;
pub mod schema;
pub mod store;
pub mod swagger;
