pub mod app;
pub mod cdc;
pub mod cli;
pub mod config;
pub mod filter;
pub mod pipeline;
pub mod record;
pub mod resource;
