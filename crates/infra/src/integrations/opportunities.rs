//! Opportunity retrieval

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::client::CrmApiClient;
use crate::api::errors::ApiError;

/// One CRM opportunity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "monetaryValue", default, skip_serializing_if = "Option::is_none")]
    pub monetary_value: Option<f64>,
    #[serde(rename = "pipelineId", default, skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpportunityList {
    #[serde(default)]
    opportunities: Vec<Opportunity>,
}

/// Opportunities passthrough service
pub struct OpportunitiesService {
    client: Arc<CrmApiClient>,
}

impl OpportunitiesService {
    #[must_use]
    pub fn new(client: Arc<CrmApiClient>) -> Self {
        Self { client }
    }

    /// List opportunities up to `limit`
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be
    /// decoded
    pub async fn list(&self, principal: &str, limit: u32) -> Result<Vec<Opportunity>, ApiError> {
        let query = [("limit", limit.to_string())];
        let list: OpportunityList =
            self.client.get_json(principal, "/opportunities", &query).await?;
        Ok(list.opportunities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opportunity_wire_shape() {
        let json = r#"{"opportunities": [
            {"id": "o1", "name": "Roof quote", "monetaryValue": 4200.0, "status": "open"}
        ]}"#;
        let list: OpportunityList = serde_json::from_str(json).unwrap();
        assert_eq!(list.opportunities.len(), 1);
        assert_eq!(list.opportunities[0].monetary_value, Some(4200.0));
    }
}
