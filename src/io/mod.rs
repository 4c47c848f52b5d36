pub mod config_io;
pub mod logging;
pub mod runner;
pub mod schema;
