use crate::clients::{create_session_with, Credentials, HttpClient, Session, TlsOptions};
use crate::error::Result;
use crate::managers::{
    AppManager, AppTaskManager, CatalogItemManager, ChartManager, ClusterManager,
    OrganizationManager, ProjectManager, SharedClusterManager, StorageManager, WorkspaceManager,
};
use crate::task::{AppTask, TaskController};
use crate::ApiVariant;
use log::debug;

/// Everything needed to construct a [`Client`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub variant: ApiVariant,
    /// Defaults to the variant's URL.
    pub base_url: Option<String>,
    /// When set, a session is opened with these credentials while the client is constructed.
    pub credentials: Option<Credentials>,
    pub tls: TlsOptions,
    /// An externally configured session. It takes precedence over `credentials` and `tls`.
    pub session: Option<Session>,
    /// The log target for request logs. Defaults to `kuberlab_sdk::http`.
    pub log_target: Option<String>,
}

impl ClientConfig {
    pub fn new(variant: ApiVariant) -> Self {
        Self {
            variant,
            ..Default::default()
        }
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn tls(mut self, tls: TlsOptions) -> Self {
        self.tls = tls;
        self
    }

    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn log_target<S: Into<String>>(mut self, log_target: S) -> Self {
        self.log_target = Some(log_target.into());
        self
    }

    /// The configured base URL, or the variant default.
    pub fn url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.variant.default_url())
    }
}

/// The entry point to the API: one shared transport and a manager per resource kind.
#[derive(Debug, Clone)]
pub struct Client {
    variant: ApiVariant,
    http_client: HttpClient,
    apps: AppManager,
    app_tasks: AppTaskManager,
    charts: ChartManager,
    clusters: ClusterManager,
    datasets: CatalogItemManager,
    models: CatalogItemManager,
    organizations: OrganizationManager,
    projects: ProjectManager,
    shared_clusters: SharedClusterManager,
    storage: StorageManager,
    workspaces: WorkspaceManager,
}

impl Client {
    /// Construct a client. TLS problems and incomplete credentials are reported here, before any
    /// manager is used. With credentials, a username/password login is performed now.
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let url = config.url().to_string();
        let session = match (config.session, &config.credentials) {
            (Some(session), _) => Some(session),
            (None, Some(credentials)) => {
                let builder = config.tls.client_builder(&url)?;
                Some(create_session_with(&url, credentials, builder).await?)
            }
            (None, None) => None,
        };
        let mut http_client = HttpClient::new(url, session, &config.tls)?;
        if let Some(log_target) = config.log_target {
            http_client = http_client.with_log_target(log_target);
        }
        debug!(
            "Created {} client for {}",
            config.variant,
            http_client.base_url()
        );
        Ok(Self::from_http_client(http_client, config.variant))
    }

    /// Construct a client around an existing `HttpClient`.
    pub fn from_http_client(http_client: HttpClient, variant: ApiVariant) -> Self {
        Self {
            variant,
            apps: AppManager::new(http_client.clone(), variant),
            app_tasks: AppTaskManager::new(http_client.clone(), variant),
            charts: ChartManager::new(http_client.clone()),
            clusters: ClusterManager::new(http_client.clone()),
            datasets: CatalogItemManager::datasets(http_client.clone()),
            models: CatalogItemManager::models(http_client.clone()),
            organizations: OrganizationManager::new(http_client.clone()),
            projects: ProjectManager::new(http_client.clone()),
            shared_clusters: SharedClusterManager::new(http_client.clone()),
            storage: StorageManager::new(http_client.clone()),
            workspaces: WorkspaceManager::new(http_client.clone()),
            http_client,
        }
    }

    pub fn variant(&self) -> ApiVariant {
        self.variant
    }

    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    pub fn apps(&self) -> &AppManager {
        &self.apps
    }

    pub fn app_tasks(&self) -> &AppTaskManager {
        &self.app_tasks
    }

    pub fn charts(&self) -> &ChartManager {
        &self.charts
    }

    pub fn clusters(&self) -> &ClusterManager {
        &self.clusters
    }

    pub fn datasets(&self) -> &CatalogItemManager {
        &self.datasets
    }

    pub fn models(&self) -> &CatalogItemManager {
        &self.models
    }

    pub fn organizations(&self) -> &OrganizationManager {
        &self.organizations
    }

    pub fn projects(&self) -> &ProjectManager {
        &self.projects
    }

    pub fn shared_clusters(&self) -> &SharedClusterManager {
        &self.shared_clusters
    }

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    pub fn workspaces(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    /// A controller for `task`, backed by this client's task manager.
    pub fn task_controller(&self, task: AppTask) -> TaskController<'_> {
        TaskController::new(&self.app_tasks, task)
    }
}
