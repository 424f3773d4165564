pub mod chart;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod operation;
pub mod prelude;
pub mod registry;

mod utils;
static UA: &str = concat!("zestra-dashboard/", env!("CARGO_PKG_VERSION"));

pub use crate::models::*;

pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;
pub use utils::gen_dashboard_id;
