use super::resource_manager::ResourceManager;
use crate::clients::HttpClient;
use crate::error::{self, Result};
use crate::Resource;
use serde_json::{json, Map, Value};

/// Clusters shared between workspaces. A workspace owns the clusters it shares out and sees the
/// ones shared with it as available.
#[derive(Debug, Clone)]
pub struct SharedClusterManager {
    http_client: HttpClient,
}

impl ResourceManager for SharedClusterManager {
    type Item = Resource;

    fn kind(&self) -> &'static str {
        "SharedCluster"
    }

    fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

impl SharedClusterManager {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    /// Share an owned cluster with users (by email) and/or workspaces (by name).
    pub async fn share<S: AsRef<str>>(
        &self,
        id: &str,
        emails: &[S],
        workspaces: &[S],
    ) -> Result<Resource> {
        self.ensure_not_empty(&[("id", Some(id))])?;
        if emails.is_empty() && workspaces.is_empty() {
            return error::IllegalArgumentSnafu {
                message: "Provide either emails or workspace names.",
            }
            .fail();
        }
        let mut body = Map::new();
        if !emails.is_empty() {
            body.insert("Emails".into(), json!(join(emails)));
        }
        if !workspaces.is_empty() {
            body.insert("WorkspaceNames".into(), json!(join(workspaces)));
        }
        self.create_resource(
            &format!("/sharedclusters/own/{}/share", id),
            &Value::Object(body),
            None,
        )
        .await
    }

    pub async fn list_available(&self) -> Result<Vec<Resource>> {
        self.list_resources("/sharedclusters/available", None).await
    }

    pub async fn list_own(&self) -> Result<Vec<Resource>> {
        self.list_resources("/sharedclusters/own", None).await
    }

    pub async fn get_available(&self, workspace: &str, id: &str) -> Result<Resource> {
        self.ensure_not_empty(&[("workspace", Some(workspace)), ("id", Some(id))])?;
        let url = format!("/sharedclusters/available/{}/{}", workspace, id);
        self.get_resource(&url, None).await
    }

    pub async fn get_own(&self, id: &str) -> Result<Resource> {
        self.ensure_not_empty(&[("id", Some(id))])?;
        self.get_resource(&format!("/sharedclusters/own/{}", id), None)
            .await
    }

    pub async fn delete_available(&self, workspace: &str, id: &str) -> Result<()> {
        self.ensure_not_empty(&[("workspace", Some(workspace)), ("id", Some(id))])?;
        self.delete_resource(&format!("/sharedclusters/available/{}/{}", workspace, id))
            .await
    }

    pub async fn delete_own(&self, id: &str) -> Result<()> {
        self.ensure_not_empty(&[("id", Some(id))])?;
        self.delete_resource(&format!("/sharedclusters/own/{}", id))
            .await
    }
}

fn join<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clients::TlsOptions;
    use crate::Error;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn share_joins_names() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sharedclusters/own/221/share"))
            .and(body_json(json!({"Emails": "a@x.io,b@x.io"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ID": "221",
                "DisplayName": "testshare",
                "From": {"WorkspaceName": "kuberlab-demo", "ClusterName": "minikube"},
                "Active": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let shared = SharedClusterManager::new(
            HttpClient::new(server.uri(), None, &TlsOptions::default()).unwrap(),
        );
        let cluster = shared
            .share("221", &["a@x.io", "b@x.io"], &[])
            .await
            .unwrap();
        assert_eq!(cluster.get_bool("Active"), Some(true));
    }

    #[tokio::test]
    async fn share_needs_a_target() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let shared = SharedClusterManager::new(
            HttpClient::new(server.uri(), None, &TlsOptions::default()).unwrap(),
        );
        let none: [&str; 0] = [];
        let error = shared.share("221", &none, &none).await.unwrap_err();
        assert!(matches!(error, Error::IllegalArgument { .. }));
    }

    #[tokio::test]
    async fn own_and_available() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sharedclusters/available/demo/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ID": "5"})))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/sharedclusters/own/5"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let shared = SharedClusterManager::new(
            HttpClient::new(server.uri(), None, &TlsOptions::default()).unwrap(),
        );
        assert_eq!(
            shared
                .get_available("demo", "5")
                .await
                .unwrap()
                .get_str("ID"),
            Some("5")
        );
        shared.delete_own("5").await.unwrap();
    }
}
