use super::resource_manager::{check, Accept, ResourceManager};
use crate::clients::HttpClient;
use crate::error::Result;
use crate::Resource;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;

/// Manages workspaces, the top-level namespaces that own projects, applications and charts.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    http_client: HttpClient,
}

impl ResourceManager for WorkspaceManager {
    type Item = Resource;

    fn kind(&self) -> &'static str {
        "Workspace"
    }

    fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

impl WorkspaceManager {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    pub async fn list(&self) -> Result<Vec<Resource>> {
        self.list_resources("/workspace", None).await
    }

    pub async fn get(&self, identifier: &str) -> Result<Resource> {
        self.ensure_not_empty(&[("identifier", Some(identifier))])?;
        self.get_resource(&format!("/workspace/{}", identifier), None)
            .await
    }

    /// Create a workspace from its definition.
    pub async fn create(&self, definition: &Value) -> Result<Resource> {
        self.create_resource("/workspace", definition, None).await
    }

    /// Send a raw workspace definition as `text/plain`. With an `id` the updated workspace is
    /// returned; without one the server answers with every workspace under `workspaces`.
    pub async fn update(&self, definition: &str, id: Option<&str>) -> Result<Vec<Resource>> {
        self.ensure_not_empty(&[("definition", Some(definition))])?;
        let url = match id {
            Some(id) => format!("/workspace/{}", id),
            None => "/workspace".to_string(),
        };
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let response = check(
            self.http_client.put(&url, definition, Some(headers)).await?,
            Accept::Only200,
        )?;
        match id {
            Some(_) => Ok(vec![self.build(response.json()?)?]),
            None => self.build_all(response.json_at(Some("workspaces"))?),
        }
    }

    pub async fn delete(&self, identifier: &str) -> Result<()> {
        self.ensure_not_empty(&[("identifier", Some(identifier))])?;
        self.delete_resource(&format!("/workspace/{}", identifier))
            .await
    }
}
