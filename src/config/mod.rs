pub mod app_config;
pub mod model;
pub mod probe_config;
