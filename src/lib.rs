pub mod client;
pub mod config;
pub mod form;
pub mod models;
pub mod routes;
pub mod stations;
pub mod submission;
