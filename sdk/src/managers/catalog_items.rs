use super::organizations::with_confirm;
use super::resource_manager::ResourceManager;
use crate::clients::HttpClient;
use crate::error::Result;
use crate::{CatalogQuery, Resource};
use serde_json::{json, Map, Value};

/// Attributes for a new dataset or model.
#[derive(Debug, Clone, Default)]
pub struct CatalogItemSpec {
    pub name: String,
    /// Defaults to `name`.
    pub display_name: Option<String>,
    pub picture: Option<String>,
    pub published: Option<bool>,
}

impl CatalogItemSpec {
    fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("Name".into(), json!(self.name));
        let display_name = self
            .display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.name);
        body.insert("DisplayName".into(), json!(display_name));
        if let Some(picture) = self.picture.as_deref().filter(|s| !s.is_empty()) {
            body.insert("Picture".into(), json!(picture));
        }
        if let Some(published) = self.published {
            body.insert("Published".into(), json!(published));
        }
        Value::Object(body)
    }
}

/// Changes to an existing dataset or model. Only the fields that are set are sent.
#[derive(Debug, Clone, Default)]
pub struct CatalogItemUpdate {
    pub description: Option<String>,
    pub display_name: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl CatalogItemUpdate {
    fn body(&self) -> Value {
        let mut body = Map::new();
        if let Some(keywords) = self.keywords.as_ref().filter(|k| !k.is_empty()) {
            body.insert("Keywords".into(), json!(keywords));
        }
        if let Some(description) = self.description.as_deref().filter(|s| !s.is_empty()) {
            body.insert("Description".into(), json!(description));
        }
        if let Some(display_name) = self.display_name.as_deref().filter(|s| !s.is_empty()) {
            body.insert("DisplayName".into(), json!(display_name));
        }
        Value::Object(body)
    }
}

/// Datasets and models are both published, versioned catalog items and share one set of
/// operations; they differ only in their path segment.
#[derive(Debug, Clone)]
pub struct CatalogItemManager {
    http_client: HttpClient,
    kind: &'static str,
    segment: &'static str,
    catalog: Option<&'static str>,
}

impl ResourceManager for CatalogItemManager {
    type Item = Resource;

    fn kind(&self) -> &'static str {
        self.kind
    }

    fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

impl CatalogItemManager {
    /// Manages `/workspace/{ws}/dataset` with the `/catalog/dataset` catalog.
    pub fn datasets(http_client: HttpClient) -> Self {
        Self {
            http_client,
            kind: "Dataset",
            segment: "dataset",
            catalog: Some("/catalog/dataset"),
        }
    }

    /// Manages `/workspace/{ws}/mlmodels`.
    pub fn models(http_client: HttpClient) -> Self {
        Self {
            http_client,
            kind: "Model",
            segment: "mlmodels",
            catalog: None,
        }
    }

    fn base(&self, workspace: &str) -> String {
        format!("/workspace/{}/{}", workspace, self.segment)
    }

    pub async fn create(&self, workspace: &str, spec: &CatalogItemSpec) -> Result<Resource> {
        self.ensure_not_empty(&[
            ("workspace", Some(workspace)),
            ("name", Some(spec.name.as_str())),
        ])?;
        self.create_resource(&self.base(workspace), &spec.body(), None)
            .await
    }

    pub async fn update(
        &self,
        workspace: &str,
        name: &str,
        update: &CatalogItemUpdate,
    ) -> Result<Resource> {
        self.ensure_not_empty(&[("workspace", Some(workspace)), ("name", Some(name))])?;
        let url = format!("{}/{}", self.base(workspace), name);
        self.update_resource(&url, &update.body(), None).await
    }

    /// Search the public catalog. Kinds without a catalog return an empty list.
    pub async fn catalog(&self, query: &CatalogQuery) -> Result<Vec<Resource>> {
        match self.catalog {
            Some(url) => self.catalog_resources(url, query).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn list(&self, workspace: &str) -> Result<Vec<Resource>> {
        self.ensure_not_empty(&[("workspace", Some(workspace))])?;
        self.list_resources(&self.base(workspace), None).await
    }

    pub async fn get(&self, workspace: &str, name: &str) -> Result<Resource> {
        self.ensure_not_empty(&[("workspace", Some(workspace)), ("name", Some(name))])?;
        self.get_resource(&format!("{}/{}", self.base(workspace), name), None)
            .await
    }

    pub async fn delete(&self, workspace: &str, name: &str, confirm: Option<&str>) -> Result<()> {
        self.ensure_not_empty(&[("workspace", Some(workspace)), ("name", Some(name))])?;
        let url = with_confirm(format!("{}/{}", self.base(workspace), name), confirm);
        self.delete_resource(&url).await
    }
}
