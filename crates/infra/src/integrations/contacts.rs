//! Contact retrieval and creation
//!
//! Thin passthrough over the platform's `/contacts` endpoint. The
//! platform has no free-text search on this endpoint, so `search`
//! filters the listed page client-side by name or email.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::client::CrmApiClient;
use crate::api::errors::ApiError;

/// One CRM contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(rename = "firstName", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "locationId", default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

impl Contact {
    fn matches(&self, needle: &str) -> bool {
        let full_name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .to_lowercase();
        let email = self.email.as_deref().unwrap_or("").to_lowercase();

        full_name.contains(needle) || email.contains(needle)
    }
}

/// Fields for a new contact
#[derive(Debug, Clone, Serialize)]
pub struct NewContact {
    #[serde(rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "locationId", skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContactList {
    #[serde(default)]
    contacts: Vec<Contact>,
}

#[derive(Debug, Deserialize)]
struct ContactEnvelope {
    contact: Contact,
}

/// Contacts passthrough service
pub struct ContactsService {
    client: Arc<CrmApiClient>,
}

impl ContactsService {
    #[must_use]
    pub fn new(client: Arc<CrmApiClient>) -> Self {
        Self { client }
    }

    /// List contacts, newest first, up to `limit`
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be
    /// decoded
    pub async fn list(&self, principal: &str, limit: u32) -> Result<Vec<Contact>, ApiError> {
        let query = [("limit", limit.to_string())];
        let list: ContactList = self.client.get_json(principal, "/contacts", &query).await?;
        Ok(list.contacts)
    }

    /// List contacts and filter client-side by name or email
    ///
    /// An empty query returns the unfiltered list.
    ///
    /// # Errors
    /// Returns error if the underlying list request fails
    pub async fn search(
        &self,
        principal: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Contact>, ApiError> {
        let mut contacts = self.list(principal, limit).await?;

        if !query.is_empty() {
            let needle = query.to_lowercase();
            contacts.retain(|contact| contact.matches(&needle));
        }

        debug!(query = %query, matched = contacts.len(), "contact search complete");
        Ok(contacts)
    }

    /// Create a contact
    ///
    /// # Errors
    /// Returns error if the request fails or is rejected upstream
    pub async fn create(&self, principal: &str, contact: &NewContact) -> Result<Contact, ApiError> {
        let envelope: ContactEnvelope =
            self.client.post_json(principal, "/contacts", contact).await?;
        Ok(envelope.contact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(first: &str, last: &str, email: &str) -> Contact {
        Contact {
            id: "c1".to_string(),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            email: Some(email.to_string()),
            phone: None,
            location_id: None,
        }
    }

    #[test]
    fn test_query_matches_name_and_email() {
        let c = contact("Ada", "Lovelace", "ada@example.com");
        assert!(c.matches("ada love"));
        assert!(c.matches("example.com"));
        assert!(!c.matches("babbage"));
    }

    #[test]
    fn test_contact_wire_shape() {
        let json = r#"{"id": "c2", "firstName": "Grace", "email": "grace@example.com"}"#;
        let c: Contact = serde_json::from_str(json).unwrap();
        assert_eq!(c.first_name.as_deref(), Some("Grace"));
        assert!(c.last_name.is_none());
    }
}
