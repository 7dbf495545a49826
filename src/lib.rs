pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod context;
pub mod docker;
pub mod envfile;
pub mod error;
pub mod fetch;
pub mod host;
pub mod process;
pub mod report;
pub mod resolve;
pub mod tools;

// Convenience re-exports
pub use bootstrap::{Action, BootstrapSummary, Bootstrapper, Step};
pub use config::Config;
pub use context::ContextEnv;
pub use error::BootstrapError;
