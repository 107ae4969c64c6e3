use super::resource_manager::ResourceManager;
use crate::clients::HttpClient;
use crate::error::Result;
use crate::Resource;
use serde_json::{json, Map, Value};

/// Optional organization attributes.
#[derive(Debug, Clone, Default)]
pub struct OrganizationDetails {
    /// Defaults to the organization name.
    pub display_name: Option<String>,
    pub picture: Option<String>,
    pub url: Option<String>,
    pub phone: Option<String>,
}

impl OrganizationDetails {
    fn body(&self, name: &str) -> Value {
        let mut body = Map::new();
        body.insert("Name".into(), json!(name));
        body.insert(
            "DisplayName".into(),
            json!(self
                .display_name
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(name)),
        );
        for (key, value) in [
            ("Picture", &self.picture),
            ("Url", &self.url),
            ("Phone", &self.phone),
        ] {
            if let Some(value) = value.as_deref().filter(|s| !s.is_empty()) {
                body.insert(key.into(), json!(value));
            }
        }
        Value::Object(body)
    }
}

#[derive(Debug, Clone)]
pub struct OrganizationManager {
    http_client: HttpClient,
}

impl ResourceManager for OrganizationManager {
    type Item = Resource;

    fn kind(&self) -> &'static str {
        "Organization"
    }

    fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

impl OrganizationManager {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    pub async fn create(&self, name: &str, details: &OrganizationDetails) -> Result<Resource> {
        self.ensure_not_empty(&[("name", Some(name))])?;
        self.create_resource("/org", &details.body(name), None)
            .await
    }

    pub async fn update(
        &self,
        id: &str,
        name: &str,
        details: &OrganizationDetails,
    ) -> Result<Resource> {
        self.ensure_not_empty(&[("id", Some(id)), ("name", Some(name))])?;
        self.update_resource(&format!("/org/{}", id), &details.body(name), None)
            .await
    }

    pub async fn list(&self) -> Result<Vec<Resource>> {
        self.list_resources("/org", None).await
    }

    pub async fn get(&self, identifier: &str) -> Result<Resource> {
        self.ensure_not_empty(&[("identifier", Some(identifier))])?;
        self.get_resource(&format!("/org/{}", identifier), None)
            .await
    }

    /// Delete an organization. Some deployments require the name again as `confirm`.
    pub async fn delete(&self, identifier: &str, confirm: Option<&str>) -> Result<()> {
        self.ensure_not_empty(&[("identifier", Some(identifier))])?;
        self.delete_resource(&with_confirm(format!("/org/{}", identifier), confirm))
            .await
    }
}

pub(crate) fn with_confirm(url: String, confirm: Option<&str>) -> String {
    match confirm.filter(|s| !s.is_empty()) {
        Some(confirm) => format!("{}?confirm={}", url, confirm),
        None => url,
    }
}
