use super::charts::{ChartRoutes, InstallChart};
use super::resource_manager::{check, to_body, Accept, ResourceManager};
use crate::clients::HttpClient;
use crate::error::{self, Result};
use crate::resource::{from_array, FromPayload};
use crate::task::AppTask;
use crate::{ApiVariant, CatalogQuery, Resource, StatusShape};
use serde::Serialize;
use serde_json::{json, Map, Value};
use snafu::{OptionExt, ResultExt};
use std::fmt::{Display, Formatter};

/// An installed application. Its `Configuration` holds the declared volumes (sources) and tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct App {
    resource: Resource,
}

impl App {
    pub fn name(&self) -> Option<&str> {
        self.resource.name()
    }

    pub fn workspace_name(&self) -> Option<&str> {
        self.resource.get_str("WorkspaceName")
    }

    pub fn configuration(&self) -> Option<&Value> {
        self.resource.get("Configuration").filter(|c| !c.is_null())
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn into_resource(self) -> Resource {
        self.resource
    }

    fn spec(&self, key: &str) -> Vec<Value> {
        self.configuration()
            .and_then(|config| config.get("spec"))
            .and_then(|spec| spec.get(key))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    /// The data volumes declared by the application.
    pub fn sources(&self) -> Result<Vec<Resource>> {
        self.spec("volumes")
            .into_iter()
            .map(|volume| Resource::from_payload("AppSource", volume))
            .collect()
    }

    /// One unstarted [`AppTask`] per task declared by the application, carrying the task's own
    /// configuration and the full application document as YAML.
    pub fn config_tasks(&self) -> Result<Vec<AppTask>> {
        let app_config = serde_yaml::to_string(self.resource.data()).context(error::YamlSnafu {
            action: "dump application config",
        })?;
        let app = self.name().unwrap_or_default();
        let workspace = self.workspace_name().unwrap_or_default();
        self.spec("tasks")
            .iter()
            .map(|task| {
                let config = serde_yaml::to_string(task).context(error::YamlSnafu {
                    action: "dump task config",
                })?;
                let name = task.get("name").and_then(Value::as_str).unwrap_or_default();
                Ok(AppTask::new(workspace, app, name)
                    .with_config(Some(config), Some(app_config.clone())))
            })
            .collect()
    }

    pub fn config_task(&self, name: &str) -> Result<AppTask> {
        self.config_tasks()?
            .into_iter()
            .find(|task| task.name == name)
            .context(error::NotFoundSnafu {
                what: format!("App task [name={}]", name),
            })
    }

    /// A copy of the application document with `Configuration` replaced.
    fn with_configuration(&self, config: Value) -> Value {
        let mut data = self.resource.data().clone();
        data.insert("Configuration".into(), config);
        Value::Object(data)
    }
}

impl FromPayload for App {
    fn from_payload(kind: &'static str, payload: Value) -> Result<Self> {
        Ok(Self {
            resource: Resource::from_payload(kind, payload)?,
        })
    }
}

impl Display for App {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.resource, f)
    }
}

/// The state of an application and of each of its components, whichever shape the server reports
/// it in.
#[derive(Debug, Clone, PartialEq)]
pub struct AppStatus {
    /// The summary object, when the server sends one.
    pub summary: Option<Resource>,
    pub components: Vec<Resource>,
}

impl AppStatus {
    fn from_payload(shape: StatusShape, payload: Value) -> Result<Self> {
        let components = match shape {
            StatusShape::Summary => payload.get("component_states").cloned(),
            StatusShape::Components => Some(payload.clone()),
        };
        let components = match components {
            Some(Value::Null) | None => Vec::new(),
            Some(components) => from_array("AppComponentStatus", components)?,
        };
        let summary = match shape {
            StatusShape::Summary => Some(Resource::from_payload("AppStatus", payload)?),
            StatusShape::Components => None,
        };
        Ok(Self {
            summary,
            components,
        })
    }

    /// The summary's `status` field, if any.
    pub fn status(&self) -> Option<&str> {
        self.summary.as_ref().and_then(|s| s.get_str("status"))
    }
}

#[derive(Serialize)]
struct PackagesInstall<'a> {
    manager: &'a str,
    packages: &'a [String],
}

/// Manages installed applications. Paths that differ between the Kuberlab and Dealer
/// deployments are taken from the [`ApiVariant`].
#[derive(Debug, Clone)]
pub struct AppManager {
    http_client: HttpClient,
    variant: ApiVariant,
}

impl ResourceManager for AppManager {
    type Item = App;

    fn kind(&self) -> &'static str {
        "App"
    }

    fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

impl AppManager {
    pub fn new(http_client: HttpClient, variant: ApiVariant) -> Self {
        Self {
            http_client,
            variant,
        }
    }

    fn routes(&self) -> ChartRoutes<'_, Self> {
        ChartRoutes {
            manager: self,
            segment: self.variant.app_chart_segment(),
        }
    }

    fn app_url(&self, workspace: &str, name: &str) -> Result<String> {
        self.ensure_not_empty(&[("workspace", Some(workspace)), ("name", Some(name))])?;
        Ok(format!("/workspace/{}/application/{}", workspace, name))
    }

    fn identity(app: &App) -> (&str, &str) {
        (
            app.workspace_name().unwrap_or_default(),
            app.name().unwrap_or_default(),
        )
    }

    /// Search the application chart catalog.
    pub async fn catalog(&self, query: &CatalogQuery) -> Result<Vec<Resource>> {
        let url = query.apply(&format!("/catalog/{}", self.variant.app_chart_segment()));
        from_array("CatalogChart", self.read_json(&url).await?)
    }

    pub async fn list(&self, workspace: &str) -> Result<Vec<App>> {
        self.ensure_not_empty(&[("workspace", Some(workspace))])?;
        self.list_resources(&format!("/workspace/{}/application", workspace), None)
            .await
    }

    pub async fn get(&self, workspace: &str, name: &str) -> Result<App> {
        self.get_resource(&self.app_url(workspace, name)?, None)
            .await
    }

    pub async fn status(&self, workspace: &str, name: &str) -> Result<AppStatus> {
        let payload = self
            .read_json(&format!("{}/status", self.app_url(workspace, name)?))
            .await?;
        AppStatus::from_payload(self.variant.app_status_shape(), payload)
    }

    pub async fn packages_list(
        &self,
        workspace: &str,
        name: &str,
        all: bool,
    ) -> Result<Vec<Resource>> {
        let url = format!("{}/packages?all={}", self.app_url(workspace, name)?, all);
        from_array("AppPackage", self.read_json(&url).await?)
    }

    /// Install packages with the named package manager (`pip`, `apt`, ...) and return the
    /// installer's output lines.
    pub async fn packages_install(
        &self,
        workspace: &str,
        name: &str,
        manager: &str,
        packages: &[String],
    ) -> Result<Vec<String>> {
        let url = format!("{}/packages", self.app_url(workspace, name)?);
        let body = to_body("packages", &PackagesInstall { manager, packages })?;
        let response = check(
            self.http_client.post(&url, body, None).await?,
            Accept::Below400,
        )?;
        Ok(response.body.lines().map(str::to_string).collect())
    }

    pub async fn delete(&self, workspace: &str, name: &str, force: bool) -> Result<()> {
        let url = format!("{}?force={}", self.app_url(workspace, name)?, force);
        self.delete_resource(&url).await
    }

    pub async fn enable(&self, workspace: &str, name: &str) -> Result<App> {
        let url = format!("{}/enable", self.app_url(workspace, name)?);
        self.create_resource(&url, &json!({}), None).await
    }

    pub async fn disable(&self, workspace: &str, name: &str, force: bool) -> Result<App> {
        let url = format!("{}/disable?force={}", self.app_url(workspace, name)?, force);
        self.create_resource(&url, &json!({}), None).await
    }

    /// Replace the application document.
    pub async fn update(&self, workspace: &str, name: &str, app: &Value) -> Result<App> {
        self.update_resource(&self.app_url(workspace, name)?, app, None)
            .await
    }

    /// Replace the application's `Configuration` and send the whole document back.
    pub async fn update_with_config(&self, app: &App, config: Value) -> Result<App> {
        if !config.is_object() {
            return error::IllegalArgumentSnafu {
                message: "App config must be a mapping.",
            }
            .fail();
        }
        let (workspace, name) = Self::identity(app);
        self.update(workspace, name, &app.with_configuration(config))
            .await
    }

    /// Add a task to the application's configuration, replacing any task with the same name.
    pub async fn set_config_task(&self, app: &App, task_config: Value) -> Result<App> {
        let name = task_config
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .context(error::IllegalArgumentSnafu {
                message: "App task config name required, missing \"name\" key.",
            })?;
        let mut config = app
            .configuration()
            .cloned()
            .context(error::IllegalArgumentSnafu {
                message: "App has no configuration.",
            })?;
        let tasks = config
            .as_object_mut()
            .map(|config| {
                config
                    .entry("spec")
                    .or_insert_with(|| Value::Object(Map::new()))
            })
            .and_then(Value::as_object_mut)
            .map(|spec| spec.entry("tasks").or_insert_with(|| json!([])))
            .and_then(Value::as_array_mut)
            .context(error::IllegalArgumentSnafu {
                message: "App configuration has no task list.",
            })?;
        match tasks
            .iter_mut()
            .find(|task| task.get("name").and_then(Value::as_str) == Some(name.as_str()))
        {
            Some(existing) => *existing = task_config,
            None => tasks.push(task_config),
        }
        self.update_with_config(app, config).await
    }

    /// Upload `data` into the application source `source` as `target_path` and return the
    /// server's reply.
    pub async fn upload_data(
        &self,
        app: &App,
        source: &str,
        target_path: &str,
        data: Vec<u8>,
    ) -> Result<String> {
        let (workspace, name) = Self::identity(app);
        let url = format!("{}/upload", self.app_url(workspace, name)?);
        let response = self
            .http_client
            .post_file(&url, &[("source", source)], target_path, data)
            .await?;
        Ok(check(response, Accept::Below400)?.body)
    }

    pub async fn destinations(&self, workspace: &str) -> Result<Vec<Resource>> {
        self.ensure_not_empty(&[("workspace", Some(workspace))])?;
        let url = format!("/workspace/{}/appdestinations", workspace);
        from_array("AppDestination", self.read_json(&url).await?)
    }

    pub async fn get_yaml(
        &self,
        workspace: &str,
        chart: &str,
        version: Option<&str>,
    ) -> Result<String> {
        self.routes().yaml(workspace, chart, version).await
    }

    pub async fn list_versions(&self, workspace: &str, chart: &str) -> Result<Vec<Resource>> {
        self.routes().versions(workspace, chart).await
    }

    pub async fn get_values(
        &self,
        workspace: &str,
        chart: &str,
        version: Option<&str>,
    ) -> Result<String> {
        self.routes().values(workspace, chart, version).await
    }

    /// Install an application chart.
    pub async fn install(
        &self,
        from_workspace: &str,
        chart: &str,
        request: &InstallChart,
    ) -> Result<App> {
        self.routes().install(from_workspace, chart, request).await
    }
}
