use super::resource_manager::ResourceManager;
use crate::clients::HttpClient;
use crate::error::Result;
use crate::resource::from_array;
use crate::task::AppTask;
use crate::{ApiVariant, Resource};
use serde_json::{json, Value};

/// Manages task builds of an application.
#[derive(Debug, Clone)]
pub struct AppTaskManager {
    http_client: HttpClient,
    variant: ApiVariant,
}

impl ResourceManager for AppTaskManager {
    type Item = AppTask;

    fn kind(&self) -> &'static str {
        "AppTask"
    }

    fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

impl AppTaskManager {
    pub fn new(http_client: HttpClient, variant: ApiVariant) -> Self {
        Self {
            http_client,
            variant,
        }
    }

    pub fn variant(&self) -> ApiVariant {
        self.variant
    }

    fn build_url(workspace: &str, app: &str, task: &str, build: &str) -> String {
        format!(
            "/workspace/{}/application/{}/tasks/{}/build/{}",
            workspace, app, task, build
        )
    }

    fn ensure_build(&self, workspace: &str, app: &str, task: &str, build: &str) -> Result<()> {
        self.ensure_not_empty(&[
            ("workspace", Some(workspace)),
            ("app", Some(app)),
            ("task", Some(task)),
            ("build", Some(build)),
        ])
    }

    /// Start a new build of `task`. The server answers with the build id and initial status.
    pub async fn create(
        &self,
        workspace: &str,
        app: &str,
        task: &str,
        config: Option<&Value>,
    ) -> Result<AppTask> {
        self.ensure_not_empty(&[
            ("workspace", Some(workspace)),
            ("app_name", Some(app)),
            ("task", Some(task)),
        ])?;
        let empty = json!({});
        let body = config.filter(|c| !c.is_null()).unwrap_or(&empty);
        let url = format!(
            "/workspace/{}/application/{}/build/{}",
            workspace, app, task
        );
        self.create_resource(&url, body, None).await
    }

    pub async fn list(&self, workspace: &str, app: &str) -> Result<Vec<AppTask>> {
        self.ensure_not_empty(&[("workspace", Some(workspace)), ("app", Some(app))])?;
        let url = format!("/workspace/{}/application/{}/tasks", workspace, app);
        let mut tasks = self.list_resources(&url, None).await?;
        for task in &mut tasks {
            task.workspace = workspace.to_string();
        }
        Ok(tasks)
    }

    pub async fn get(
        &self,
        workspace: &str,
        app: &str,
        task: &str,
        build: &str,
    ) -> Result<AppTask> {
        self.ensure_build(workspace, app, task, build)?;
        let mut task = self
            .get_resource(&Self::build_url(workspace, app, task, build), None)
            .await?;
        task.workspace = workspace.to_string();
        Ok(task)
    }

    pub async fn get_pods(
        &self,
        workspace: &str,
        app: &str,
        task: &str,
        build: &str,
    ) -> Result<Vec<Resource>> {
        self.ensure_build(workspace, app, task, build)?;
        let url = format!("{}/pods", Self::build_url(workspace, app, task, build));
        from_array("AppTaskPod", self.read_json(&url).await?)
    }

    /// The log output of one pod of a build, if the server has any.
    pub async fn get_pod_logs(
        &self,
        workspace: &str,
        app: &str,
        task: &str,
        build: &str,
        pod: &str,
    ) -> Result<Option<String>> {
        self.ensure_build(workspace, app, task, build)?;
        self.ensure_not_empty(&[("pod", Some(pod))])?;
        let log = self
            .read_json(&format!(
                "{}/pods/{}/log",
                Self::build_url(workspace, app, task, build),
                pod
            ))
            .await?;
        let output = log.get("output").and_then(Value::as_str);
        Ok(output.map(str::to_string))
    }

    pub async fn delete(&self, workspace: &str, app: &str, task: &str, build: &str) -> Result<()> {
        self.ensure_build(workspace, app, task, build)?;
        self.delete_resource(&Self::build_url(workspace, app, task, build))
            .await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clients::TlsOptions;
    use crate::Error;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn manager() -> (MockServer, AppTaskManager) {
        let server = MockServer::start().await;
        let http_client = HttpClient::new(server.uri(), None, &TlsOptions::default()).unwrap();
        let tasks = AppTaskManager::new(http_client, ApiVariant::Kuberlab);
        (server, tasks)
    }

    #[tokio::test]
    async fn create_without_config_sends_empty_object() {
        let (server, tasks) = manager().await;
        Mock::given(method("POST"))
            .and(path("/workspace/demo/application/styles-set/build/prepare-data"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "build": "1", "status": "Starting", "completed": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let task = tasks
            .create("demo", "styles-set", "prepare-data", None)
            .await
            .unwrap();
        assert_eq!(task.build.as_deref(), Some("1"));
        assert_eq!(task.status, "Starting");
    }

    #[tokio::test]
    async fn list_and_get_fill_workspace() {
        let (server, tasks) = manager().await;
        Mock::given(method("GET"))
            .and(path("/workspace/demo/application/styles-set/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "prepare-data", "build": "1", "app": "styles-set", "completed": true},
                {"name": "train", "build": "2", "app": "styles-set", "completed": false}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/workspace/demo/application/styles-set/tasks/train/build/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "train", "build": "2", "status": "Running"
            })))
            .mount(&server)
            .await;

        let list = tasks.list("demo", "styles-set").await.unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|t| t.workspace == "demo"));

        let task = tasks.get("demo", "styles-set", "train", "2").await.unwrap();
        assert_eq!(task.workspace, "demo");
        assert_eq!(task.status, "Running");
    }

    #[tokio::test]
    async fn pods_and_logs() {
        let (server, tasks) = manager().await;
        let build = "/workspace/demo/application/styles-set/tasks/train/build/2";
        Mock::given(method("GET"))
            .and(path(format!("{}/pods", build)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"Name": "train-2-worker-0", "Status": "Running"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{}/pods/train-2-worker-0/log", build)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": "step 1\n"})))
            .mount(&server)
            .await;

        let pods = tasks
            .get_pods("demo", "styles-set", "train", "2")
            .await
            .unwrap();
        assert_eq!(pods[0].kind(), "AppTaskPod");
        let pod = pods[0].name().unwrap();
        let logs = tasks
            .get_pod_logs("demo", "styles-set", "train", "2", pod)
            .await
            .unwrap();
        assert_eq!(logs.as_deref(), Some("step 1\n"));
    }

    #[tokio::test]
    async fn delete_requires_build() {
        let (_server, tasks) = manager().await;
        let error = tasks
            .delete("demo", "styles-set", "train", "")
            .await
            .unwrap_err();
        assert!(matches!(error, Error::MissingField { ref field, .. } if field == "build"));
    }
}
