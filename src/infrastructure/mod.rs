pub mod container;
pub mod database;
pub mod external_services;
pub mod messaging;

pub use container::AppContainer;
pub use database::{create_connection_pool, run_migrations};
