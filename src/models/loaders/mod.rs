pub mod csv_loader;
pub mod toml_loader;

pub use csv_loader::load_questions;
pub use toml_loader::load_batch_config;
