use serde::{Deserialize, Serialize};

/// Identifies a package within an ecosystem, optionally pinned to a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCoordinate {
    pub name: String,
    pub ecosystem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PackageCoordinate {
    pub fn new(name: impl Into<String>, ecosystem: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ecosystem: ecosystem.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// The version to send upstream. Empty strings count as no version.
    pub fn effective_version(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.is_empty())
    }
}

impl std::fmt::Display for PackageCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.effective_version() {
            Some(version) => write!(f, "{}/{}@{}", self.ecosystem, self.name, version),
            None => write!(f, "{}/{}", self.ecosystem, self.name),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct OsvPackage<'a> {
    pub name: &'a str,
    pub ecosystem: &'a str,
}

/// Request body for `POST /v1/query`.
#[derive(Serialize)]
pub(crate) struct OsvQuery<'a> {
    pub package: OsvPackage<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'a str>,
}

impl<'a> From<&'a PackageCoordinate> for OsvQuery<'a> {
    fn from(coordinate: &'a PackageCoordinate) -> Self {
        Self {
            package: OsvPackage {
                name: &coordinate.name,
                ecosystem: &coordinate.ecosystem,
            },
            version: coordinate.effective_version(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_body_without_version() {
        let coordinate = PackageCoordinate::new("requests", "PyPI");
        let body = serde_json::to_value(OsvQuery::from(&coordinate)).unwrap();
        assert_eq!(
            body,
            json!({ "package": { "name": "requests", "ecosystem": "PyPI" } })
        );
    }

    #[test]
    fn test_query_body_with_version() {
        let coordinate = PackageCoordinate::new("left-pad", "npm").with_version("1.1.0");
        let body = serde_json::to_value(OsvQuery::from(&coordinate)).unwrap();
        assert_eq!(
            body,
            json!({
                "package": { "name": "left-pad", "ecosystem": "npm" },
                "version": "1.1.0"
            })
        );
    }

    #[test]
    fn test_empty_version_is_omitted() {
        let coordinate = PackageCoordinate::new("left-pad", "npm").with_version("");
        assert_eq!(coordinate.effective_version(), None);
        let body = serde_json::to_value(OsvQuery::from(&coordinate)).unwrap();
        assert!(body.get("version").is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(PackageCoordinate::new("serde", "crates.io").to_string(), "crates.io/serde");
        assert_eq!(
            PackageCoordinate::new("serde", "crates.io")
                .with_version("1.0.0")
                .to_string(),
            "crates.io/serde@1.0.0"
        );
    }
}
