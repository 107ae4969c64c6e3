use super::resource_manager::ResourceManager;
use crate::clients::HttpClient;
use crate::constants::{DEFAULT_CHART_VERSION, DEFAULT_ENVIRONMENT, DEFAULT_REPOSITORY_DIR};
use crate::error::{self, Result};
use crate::resource::from_array;
use crate::{CatalogQuery, Resource};
use serde::Serialize;
use serde_json::{json, Value};
use snafu::ResultExt;

/// Values to install a chart with.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartValues {
    /// A YAML document sent as-is.
    Yaml(String),
    /// A mapping that is dumped to YAML before it is sent.
    Mapping(Value),
}

impl ChartValues {
    fn to_yaml(&self) -> Result<String> {
        let values = match self {
            ChartValues::Yaml(yaml) => return Ok(yaml.clone()),
            ChartValues::Mapping(values) => values,
        };
        serde_yaml::to_string(values).context(error::YamlSnafu {
            action: "dump chart values",
        })
    }
}

/// A request to install a chart version into a workspace as an application.
///
/// The target cluster is chosen by the first of `cluster_id`, `cluster_name` and
/// `shared_cluster_id` that is set.
#[derive(Debug, Clone, Default)]
pub struct InstallChart {
    pub target_application: String,
    pub target_workspace: String,
    pub values: Option<ChartValues>,
    pub project: Option<String>,
    /// Defaults to `latest`.
    pub version: Option<String>,
    pub cluster_id: Option<String>,
    pub cluster_name: Option<String>,
    pub shared_cluster_id: Option<String>,
    /// Defaults to `master`.
    pub environment: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
struct InstallChartBody {
    target_application: String,
    environment: String,
    workspace_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    values_yaml: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cluster_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clusters: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shared_cluster_id: Option<String>,
}

fn set(value: &Option<String>) -> Option<String> {
    value.clone().filter(|s| !s.is_empty())
}

impl InstallChart {
    pub fn new<S1, S2>(target_application: S1, target_workspace: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            target_application: target_application.into(),
            target_workspace: target_workspace.into(),
            ..Default::default()
        }
    }

    pub fn version(&self) -> &str {
        self.version
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CHART_VERSION)
    }

    fn body(&self) -> Result<InstallChartBody> {
        let mut body = InstallChartBody {
            target_application: self.target_application.clone(),
            environment: set(&self.environment).unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            workspace_name: self.target_workspace.clone(),
            project_name: set(&self.project),
            values_yaml: self.values.as_ref().map(ChartValues::to_yaml).transpose()?,
            cluster_id: None,
            clusters: None,
            shared_cluster_id: None,
        };
        if let Some(cluster_id) = set(&self.cluster_id) {
            body.cluster_id = Some(cluster_id);
        } else if let Some(cluster_name) = set(&self.cluster_name) {
            body.clusters = Some(vec![cluster_name]);
        } else {
            body.shared_cluster_id = set(&self.shared_cluster_id);
        }
        Ok(body)
    }
}

/// Version-scoped chart operations shared by plain charts (`charts`) and application charts
/// (`chart-mlapp-v2` or `chart-app`). `M` decides what an installed chart is built into.
pub(crate) struct ChartRoutes<'a, M> {
    pub(crate) manager: &'a M,
    pub(crate) segment: &'a str,
}

impl<'a, M: ResourceManager> ChartRoutes<'a, M> {
    fn chart_url(&self, workspace: &str, chart: &str) -> String {
        format!("/workspace/{}/{}/{}", workspace, self.segment, chart)
    }

    fn ensure(&self, workspace: &str, chart: &str) -> Result<()> {
        self.manager
            .ensure_not_empty(&[("workspace", Some(workspace)), ("chart", Some(chart))])
    }

    fn version_url(&self, workspace: &str, chart: &str, version: Option<&str>) -> String {
        let version = version
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CHART_VERSION);
        format!("{}/versions/{}", self.chart_url(workspace, chart), version)
    }

    pub(crate) async fn yaml(
        &self,
        workspace: &str,
        chart: &str,
        version: Option<&str>,
    ) -> Result<String> {
        self.ensure(workspace, chart)?;
        let base = self.version_url(workspace, chart, version);
        let url = format!("{}/yaml", base);
        self.manager.read_text(&url).await
    }

    pub(crate) async fn versions(&self, workspace: &str, chart: &str) -> Result<Vec<Resource>> {
        self.ensure(workspace, chart)?;
        let url = format!("{}/versions", self.chart_url(workspace, chart));
        from_array("ChartVersion", self.manager.read_json(&url).await?)
    }

    pub(crate) async fn values(
        &self,
        workspace: &str,
        chart: &str,
        version: Option<&str>,
    ) -> Result<String> {
        self.ensure(workspace, chart)?;
        let base = self.version_url(workspace, chart, version);
        let url = format!("{}/values/yaml", base);
        self.manager.read_text(&url).await
    }

    pub(crate) async fn install(
        &self,
        from_workspace: &str,
        chart: &str,
        request: &InstallChart,
    ) -> Result<M::Item> {
        self.ensure(from_workspace, chart)?;
        let target_application = request.target_application.as_str();
        let target_workspace = request.target_workspace.as_str();
        self.manager.ensure_not_empty(&[
            ("target_application", Some(target_application)),
            ("target_workspace", Some(target_workspace)),
        ])?;
        let url = format!(
            "{}/versions/{}/install",
            self.chart_url(from_workspace, chart),
            request.version()
        );
        self.manager
            .create_resource(&url, &request.body()?, None)
            .await
    }
}

/// Manages chart templates in the public catalog and in workspaces.
#[derive(Debug, Clone)]
pub struct ChartManager {
    http_client: HttpClient,
}

impl ResourceManager for ChartManager {
    type Item = Resource;

    fn kind(&self) -> &'static str {
        "Chart"
    }

    fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

impl ChartManager {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    fn routes(&self) -> ChartRoutes<'_, Self> {
        ChartRoutes {
            manager: self,
            segment: "charts",
        }
    }

    pub async fn catalog(&self, query: &CatalogQuery) -> Result<Vec<Resource>> {
        self.catalog_resources("/catalog/charts", query).await
    }

    pub async fn list(&self, workspace: &str, query: &CatalogQuery) -> Result<Vec<Resource>> {
        self.ensure_not_empty(&[("workspace", Some(workspace))])?;
        let url = format!("/workspace/{}/charts", workspace);
        self.catalog_resources(&url, query).await
    }

    /// Get a chart, or one specific version of it.
    pub async fn get(
        &self,
        workspace: &str,
        chart: &str,
        version: Option<&str>,
    ) -> Result<Resource> {
        self.ensure_not_empty(&[("workspace", Some(workspace)), ("chart", Some(chart))])?;
        let mut url = format!("/workspace/{}/charts/{}", workspace, chart);
        if let Some(version) = version.filter(|s| !s.is_empty()) {
            url.push_str(&format!("/versions/{}", version));
        }
        self.get_resource(&url, None).await
    }

    pub async fn get_yaml(
        &self,
        workspace: &str,
        chart: &str,
        version: Option<&str>,
    ) -> Result<String> {
        self.routes().yaml(workspace, chart, version).await
    }

    pub async fn get_values(
        &self,
        workspace: &str,
        chart: &str,
        version: Option<&str>,
    ) -> Result<String> {
        self.routes().values(workspace, chart, version).await
    }

    pub async fn list_versions(&self, workspace: &str, chart: &str) -> Result<Vec<Resource>> {
        self.routes().versions(workspace, chart).await
    }

    /// Register a chart from a source repository. `repository_dir` defaults to `/`.
    pub async fn create(
        &self,
        workspace: &str,
        name: &str,
        repository_url: &str,
        repository_dir: Option<&str>,
    ) -> Result<Resource> {
        self.ensure_not_empty(&[
            ("workspace", Some(workspace)),
            ("name", Some(name)),
            ("repo_url", Some(repository_url)),
        ])?;
        let body = json!({
            "Name": name,
            "RepositoryURL": repository_url,
            "RepositoryDir": repository_dir
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_REPOSITORY_DIR),
        });
        let url = format!("/workspace/{}/charts", workspace);
        self.create_resource(&url, &body, None).await
    }

    pub async fn delete(&self, workspace: &str, chart: &str) -> Result<()> {
        self.ensure_not_empty(&[("workspace", Some(workspace)), ("chart", Some(chart))])?;
        let url = format!("/workspace/{}/charts/{}", workspace, chart);
        self.delete_resource(&url).await
    }

    pub async fn install(
        &self,
        from_workspace: &str,
        chart: &str,
        request: &InstallChart,
    ) -> Result<Resource> {
        self.routes().install(from_workspace, chart, request).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clients::TlsOptions;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn manager() -> (MockServer, ChartManager) {
        let server = MockServer::start().await;
        let http_client = HttpClient::new(server.uri(), None, &TlsOptions::default()).unwrap();
        (server, ChartManager::new(http_client))
    }

    #[test]
    fn cluster_precedence() {
        let mut request = InstallChart::new("tf", "demo");
        request.cluster_name = Some("minikube".into());
        request.shared_cluster_id = Some("221".into());
        let body = serde_json::to_value(request.body().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "target_application": "tf",
                "environment": "master",
                "workspace_name": "demo",
                "clusters": ["minikube"]
            })
        );

        request.cluster_id = Some("7".into());
        let body = request.body().unwrap();
        assert_eq!(body.cluster_id.as_deref(), Some("7"));
        assert!(body.clusters.is_none());

        request.cluster_id = None;
        request.cluster_name = None;
        assert_eq!(
            request.body().unwrap().shared_cluster_id.as_deref(),
            Some("221")
        );
    }

    #[test]
    fn values_as_mapping() {
        let mut request = InstallChart::new("tf", "demo");
        request.values = Some(ChartValues::Mapping(json!({"replicas": 2})));
        let yaml = request.body().unwrap().values_yaml.unwrap();
        assert!(yaml.contains("replicas: 2"));

        request.values = Some(ChartValues::Yaml("replicas: 3\n".into()));
        assert_eq!(
            request.body().unwrap().values_yaml.as_deref(),
            Some("replicas: 3\n")
        );
    }

    #[tokio::test]
    async fn install_defaults_to_latest() {
        let (server, charts) = manager().await;
        Mock::given(method("POST"))
            .and(path("/workspace/kuberlab/charts/tensorflow/versions/latest/install"))
            .and(body_json(json!({
                "target_application": "tf",
                "environment": "master",
                "workspace_name": "demo",
                "project_name": "p"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Name": "tf"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = InstallChart::new("tf", "demo");
        request.project = Some("p".into());
        let app = charts
            .install("kuberlab", "tensorflow", &request)
            .await
            .unwrap();
        assert_eq!(app.name(), Some("tf"));
    }

    #[tokio::test]
    async fn catalog_yaml_and_versions() {
        let (server, charts) = manager().await;
        Mock::given(method("GET"))
            .and(path("/catalog/charts"))
            .and(query_param("type", "mlapp-v2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"Name": "tensorflow"}])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/workspace/kuberlab/charts/tensorflow/versions/1.2.0/yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("kind: MLApp\n"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/workspace/kuberlab/charts/tensorflow/versions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"Version": "1.2.0"},
                {"Version": "1.1.0"}
            ])))
            .mount(&server)
            .await;

        let catalog = charts
            .catalog(&CatalogQuery::new().chart_type("mlapp-v2"))
            .await
            .unwrap();
        assert_eq!(catalog[0].name(), Some("tensorflow"));
        assert_eq!(
            charts
                .get_yaml("kuberlab", "tensorflow", Some("1.2.0"))
                .await
                .unwrap(),
            "kind: MLApp\n"
        );
        let versions = charts
            .list_versions("kuberlab", "tensorflow")
            .await
            .unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].kind(), "ChartVersion");
    }

    #[tokio::test]
    async fn get_versioned_and_create() {
        let (server, charts) = manager().await;
        Mock::given(method("GET"))
            .and(path("/workspace/demo/charts/tf/versions/1.0.0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"Name": "tf", "Version": "1.0.0"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/workspace/demo/charts"))
            .and(body_json(json!({
                "Name": "tf",
                "RepositoryURL": "https://github.com/kuberlab/charts",
                "RepositoryDir": "/"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"Name": "tf"})))
            .expect(1)
            .mount(&server)
            .await;

        let chart = charts.get("demo", "tf", Some("1.0.0")).await.unwrap();
        assert_eq!(chart.get_str("Version"), Some("1.0.0"));
        charts
            .create("demo", "tf", "https://github.com/kuberlab/charts", None)
            .await
            .unwrap();
    }
}
