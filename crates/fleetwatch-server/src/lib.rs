pub mod app;
pub mod config;
pub mod ha;
pub mod logging;
pub mod runtime;
pub mod seed;
pub mod state;
