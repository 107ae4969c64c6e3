//! One manager per resource kind. Every manager builds on [`ResourceManager`], which supplies the
//! shared request, status-check and projection logic.

mod app_tasks;
mod apps;
mod catalog_items;
mod charts;
mod clusters;
mod organizations;
mod projects;
pub(crate) mod resource_manager;
mod shared_clusters;
mod workspaces;

pub use app_tasks::AppTaskManager;
pub use apps::{App, AppManager, AppStatus};
pub use catalog_items::{CatalogItemManager, CatalogItemSpec, CatalogItemUpdate};
pub use charts::{ChartManager, ChartValues, InstallChart};
pub use clusters::{ClusterManager, StorageManager};
pub use organizations::{OrganizationDetails, OrganizationManager};
pub use projects::{ProjectManager, ProjectSpec};
pub use resource_manager::ResourceManager;
pub use shared_clusters::SharedClusterManager;
pub use workspaces::WorkspaceManager;
