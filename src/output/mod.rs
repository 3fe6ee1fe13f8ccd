//! Plain-text rendering of OSV query results.
//!
//! [`render_report`] is the tool's final output: every record rendered by
//! [`format_vulnerability`] and joined with [`REPORT_SEPARATOR`], or
//! [`NO_RESULTS_MESSAGE`] when there is nothing to render.

mod date;
mod text;

pub use date::format_date;
pub use text::format_vulnerability;

use crate::model::QueryResponse;

/// Returned when the query failed or the response carried no `vulns` key.
///
/// The two cases are deliberately indistinguishable to the caller.
pub const NO_RESULTS_MESSAGE: &str = "Unable to fetch vulnerabilities or no vulnerabilities found.";

/// Placed between consecutive vulnerability reports.
pub const REPORT_SEPARATOR: &str = "\n---\n";

/// Renders a query outcome as the text handed back to the caller.
///
/// An empty `vulns` list renders as an empty string, not as
/// [`NO_RESULTS_MESSAGE`].
pub fn render_report(response: Option<&QueryResponse>) -> String {
    let Some(vulns) = response.and_then(|r| r.vulns.as_ref()) else {
        return NO_RESULTS_MESSAGE.to_string();
    };

    vulns
        .iter()
        .map(format_vulnerability)
        .collect::<Vec<_>>()
        .join(REPORT_SEPARATOR)
}
