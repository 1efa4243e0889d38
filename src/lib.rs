pub mod api;
pub mod config;
pub mod google;
pub mod report;
pub mod server;
