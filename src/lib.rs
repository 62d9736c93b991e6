pub mod app;
pub mod client;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;
pub mod platform;
pub mod session;
pub mod usecase;
