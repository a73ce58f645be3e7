mod schema;
mod store;

pub use schema::{AppConfig, AuthConfig, WebConfig};
pub use store::ConfigStore;
