use super::resource_manager::ResourceManager;
use crate::clients::HttpClient;
use crate::error::Result;
use crate::Resource;

/// Read-only access to the clusters a workspace can deploy to.
#[derive(Debug, Clone)]
pub struct ClusterManager {
    http_client: HttpClient,
}

impl ResourceManager for ClusterManager {
    type Item = Resource;

    fn kind(&self) -> &'static str {
        "Cluster"
    }

    fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

impl ClusterManager {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    pub async fn list(&self, workspace: &str) -> Result<Vec<Resource>> {
        self.ensure_not_empty(&[("workspace", Some(workspace))])?;
        self.list_resources(&format!("/workspace/{}/clusters", workspace), None)
            .await
    }

    pub async fn get(&self, workspace: &str, identifier: &str) -> Result<Resource> {
        self.ensure_not_empty(&[
            ("workspace", Some(workspace)),
            ("identifier", Some(identifier)),
        ])?;
        self.get_resource(
            &format!("/workspace/{}/clusters/{}", workspace, identifier),
            None,
        )
        .await
    }
}

/// The storage classes offered by one cluster.
#[derive(Debug, Clone)]
pub struct StorageManager {
    http_client: HttpClient,
}

impl ResourceManager for StorageManager {
    type Item = Resource;

    fn kind(&self) -> &'static str {
        "Storage"
    }

    fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

impl StorageManager {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    pub async fn list(&self, workspace: &str, cluster_id: &str) -> Result<Vec<Resource>> {
        self.ensure_not_empty(&[
            ("workspace", Some(workspace)),
            ("cluster_id", Some(cluster_id)),
        ])?;
        self.list_resources(
            &format!("/workspace/{}/clusters/{}/storage", workspace, cluster_id),
            None,
        )
        .await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clients::TlsOptions;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn clusters_and_storage() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/workspace/demo/clusters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"ID": "7", "Name": "minikube"},
                {"ID": "9", "Name": "gke"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/workspace/demo/clusters/7/storage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"Name": "standard", "Type": "nfs"}
            ])))
            .mount(&server)
            .await;

        let http_client = HttpClient::new(server.uri(), None, &TlsOptions::default()).unwrap();
        let clusters = ClusterManager::new(http_client.clone())
            .list("demo")
            .await
            .unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[1].kind(), "Cluster");

        let id = clusters[0].get_str("ID").unwrap();
        let storage = StorageManager::new(http_client)
            .list("demo", id)
            .await
            .unwrap();
        assert_eq!(storage[0].get_str("Type"), Some("nfs"));
        assert_eq!(storage[0].kind(), "Storage");
    }

    #[tokio::test]
    async fn get_requires_identifier() {
        let clusters = ClusterManager::new(
            HttpClient::new("http://localhost", None, &TlsOptions::default()).unwrap(),
        );
        assert!(clusters.get("demo", "").await.is_err());
    }
}
