use super::date::format_date;
use crate::model::Vulnerability;

const UNKNOWN: &str = "Unknown";
const NO_URL: &str = "No URL provided";

/// Renders one vulnerability record as a plain-text report.
pub fn format_vulnerability(vuln: &Vulnerability) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Vulnerability ID: {}", vuln.id));
    if !vuln.aliases.is_empty() {
        lines.push(format!("Also known as: {}", vuln.aliases.join(", ")));
    }

    if let Some(published) = &vuln.published {
        lines.push(format!("Published: {}", format_date(published)));
    }
    if let Some(modified) = &vuln.modified {
        lines.push(format!("Last modified: {}", format_date(modified)));
    }

    if let Some(details) = &vuln.details {
        lines.push(format!("\nDescription:\n{}", details));
    }

    if !vuln.affected.is_empty() {
        lines.push("\nAffected Packages:".to_string());
        for affected in &vuln.affected {
            lines.push(format!(
                "- {} ({})",
                affected.package.name.as_deref().unwrap_or(UNKNOWN),
                affected.package.ecosystem.as_deref().unwrap_or(UNKNOWN)
            ));

            if !affected.versions.is_empty() {
                lines.push(format!(
                    "  Affected versions: {}",
                    affected.versions.join(", ")
                ));
            }

            let fixed = affected.fixed_versions();
            if !fixed.is_empty() {
                lines.push(format!("  Fixed in versions: {}", fixed.join(", ")));
            }
        }
    }

    if !vuln.references.is_empty() {
        lines.push("\nReferences:".to_string());
        for reference in &vuln.references {
            lines.push(format!(
                "- {}: {}",
                reference.reference_type.as_deref().unwrap_or(UNKNOWN),
                reference.url.as_deref().unwrap_or(NO_URL)
            ));
        }
    }

    lines.join("\n")
}
