pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod measures;
pub mod names;
pub mod pipeline;
pub mod profiles;
pub mod scrape;
