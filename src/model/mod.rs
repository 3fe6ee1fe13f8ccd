//! Core data types for package coordinates and OSV query results.
//!
//! - [`PackageCoordinate`] - What to query (name, ecosystem, optional version)
//! - [`QueryResponse`] - The body returned by the OSV query endpoint
//! - [`Vulnerability`] - A single vulnerability record
//!
//! Every field OSV may omit is an `Option` or defaults to empty, so decoding
//! tolerates partial records. Only [`Vulnerability::id`] is required.
//!
//! # Example
//!
//! ```
//! use vulnquery::PackageCoordinate;
//!
//! let coordinate = PackageCoordinate::new("lodash", "npm").with_version("4.17.20");
//! assert_eq!(coordinate.version.as_deref(), Some("4.17.20"));
//! ```

mod package;
mod vulnerability;

pub use package::*;
pub(crate) use package::OsvQuery;
pub use vulnerability::*;
