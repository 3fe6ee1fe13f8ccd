use super::VulnerabilitySource;
use crate::model::{PackageCoordinate, QueryResponse};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

/// Returns a canned response and records every coordinate it was asked for.
pub(crate) struct FakeSource {
    response: Option<QueryResponse>,
    pub seen: Mutex<Vec<PackageCoordinate>>,
}

impl FakeSource {
    pub fn new(response: Option<Value>) -> Self {
        Self {
            response: response.map(|v| serde_json::from_value(v).unwrap()),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VulnerabilitySource for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn query(&self, coordinate: &PackageCoordinate) -> Option<QueryResponse> {
        self.seen.lock().unwrap().push(coordinate.clone());
        self.response.clone()
    }
}
