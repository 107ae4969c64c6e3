use super::resource_manager::ResourceManager;
use crate::clients::HttpClient;
use crate::constants::DEFAULT_REPOSITORY_DIR;
use crate::error::Result;
use crate::Resource;
use serde::Serialize;

/// The definition of a project: a source repository bound to an environment (branch).
#[derive(Debug, Clone, Default)]
pub struct ProjectSpec {
    pub name: String,
    /// Defaults to `name`.
    pub display_name: Option<String>,
    pub environment: String,
    pub repository_url: String,
    /// Defaults to `/`.
    pub repository_dir: Option<String>,
}

#[derive(Serialize)]
struct ProjectBody<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "DisplayName")]
    display_name: &'a str,
    #[serde(rename = "Environment")]
    environment: &'a str,
    #[serde(rename = "RepositoryURL")]
    repository_url: &'a str,
    #[serde(rename = "RepositoryDir")]
    repository_dir: &'a str,
}

impl ProjectSpec {
    fn body(&self) -> ProjectBody<'_> {
        ProjectBody {
            name: &self.name,
            display_name: non_empty_or(&self.display_name, &self.name),
            environment: &self.environment,
            repository_url: &self.repository_url,
            repository_dir: non_empty_or(&self.repository_dir, DEFAULT_REPOSITORY_DIR),
        }
    }
}

fn non_empty_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
}

#[derive(Debug, Clone)]
pub struct ProjectManager {
    http_client: HttpClient,
}

impl ResourceManager for ProjectManager {
    type Item = Resource;

    fn kind(&self) -> &'static str {
        "Project"
    }

    fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

impl ProjectManager {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    fn ensure_spec(&self, workspace: &str, spec: &ProjectSpec) -> Result<()> {
        self.ensure_not_empty(&[
            ("workspace", Some(workspace)),
            ("name", Some(spec.name.as_str())),
            ("env", Some(spec.environment.as_str())),
            ("repo_url", Some(spec.repository_url.as_str())),
        ])
    }

    pub async fn create(&self, workspace: &str, spec: &ProjectSpec) -> Result<Resource> {
        self.ensure_spec(workspace, spec)?;
        let url = format!("/workspace/{}/projects", workspace);
        self.create_resource(&url, &spec.body(), None).await
    }

    pub async fn update(&self, workspace: &str, spec: &ProjectSpec) -> Result<Resource> {
        self.ensure_spec(workspace, spec)?;
        self.update_resource(
            &format!("/workspace/{}/projects/{}", workspace, spec.name),
            &spec.body(),
            None,
        )
        .await
    }

    pub async fn list(&self, workspace: &str) -> Result<Vec<Resource>> {
        self.ensure_not_empty(&[("workspace", Some(workspace))])?;
        self.list_resources(&format!("/workspace/{}/projects", workspace), None)
            .await
    }

    pub async fn get(&self, workspace: &str, name: &str) -> Result<Resource> {
        self.ensure_not_empty(&[("workspace", Some(workspace)), ("name", Some(name))])?;
        self.get_resource(&format!("/workspace/{}/projects/{}", workspace, name), None)
            .await
    }

    pub async fn delete(&self, workspace: &str, name: &str) -> Result<()> {
        self.ensure_not_empty(&[("workspace", Some(workspace)), ("name", Some(name))])?;
        self.delete_resource(&format!("/workspace/{}/projects/{}", workspace, name))
            .await
    }
}
