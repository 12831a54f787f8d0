pub mod config;
pub mod diagnostics;
pub mod logging;
pub mod monitor;
pub mod reporter;
pub mod system;
