pub mod client;
pub mod config;
pub mod logging;
pub mod model;
pub mod output;
pub mod server;
pub mod tool;

pub use client::{OsvClient, VulnerabilitySource};
pub use config::Config;
pub use model::{PackageCoordinate, QueryResponse, Vulnerability};
pub use server::ToolServer;
