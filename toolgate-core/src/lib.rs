pub mod config;
pub mod credential;
pub mod error;
pub mod executor;
pub mod http;
pub mod policy;
pub mod resource;

pub use config::ProxyConfig;
pub use credential::Credential;
pub use error::GateError;
pub use executor::CliResult;
