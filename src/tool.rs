//! The `query_vulnerabilities` tool.
//!
//! Ties the query client to the report formatter and describes the tool to
//! the host (name, description, input schema).

use crate::client::VulnerabilitySource;
use crate::model::PackageCoordinate;
use crate::output::render_report;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

pub const TOOL_NAME: &str = "query_vulnerabilities";

const TOOL_DESCRIPTION: &str = "Get vulnerabilities for a package from an ecosystem.\n\n\
Args:\n    \
package_name (str): Name of the package\n    \
ecosystem (str): Package ecosystem (PyPI, npm, etc.)\n    \
version (str, optional): Specific version to check";

/// Arguments accepted by [`TOOL_NAME`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryVulnerabilitiesArgs {
    pub package_name: String,
    pub ecosystem: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl From<QueryVulnerabilitiesArgs> for PackageCoordinate {
    fn from(args: QueryVulnerabilitiesArgs) -> Self {
        PackageCoordinate {
            name: args.package_name,
            ecosystem: args.ecosystem,
            version: args.version,
        }
    }
}

/// Runs the tool and returns its text output.
///
/// Never fails: a failed query yields the fixed "unable to fetch" message.
pub async fn query_vulnerabilities(
    source: &dyn VulnerabilitySource,
    args: QueryVulnerabilitiesArgs,
) -> String {
    let coordinate = PackageCoordinate::from(args);
    debug!(package = %coordinate, source = source.name(), "Querying vulnerabilities");

    let response = source.query(&coordinate).await;
    render_report(response.as_ref())
}

/// Tool descriptor returned from `tools/list`.
pub fn tool_definition() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": TOOL_DESCRIPTION,
        "inputSchema": {
            "type": "object",
            "properties": {
                "package_name": { "type": "string", "title": "Package Name" },
                "ecosystem": { "type": "string", "title": "Ecosystem" },
                "version": { "type": "string", "title": "Version", "default": null }
            },
            "required": ["package_name", "ecosystem"]
        }
    })
}
