use std::time::Duration;

// Default endpoints
pub const KUBERLAB_URL: &str = "https://go.kuberlab.io/api/v0.2";
pub const DEALER_URL: &str = "https://dev.kuberlab.io/api/v0.2";

// Application chart segments
pub const KUBERLAB_APP_SEGMENT: &str = "chart-mlapp-v2";
pub const DEALER_APP_SEGMENT: &str = "chart-app";

// Task polling
pub const TASK_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const TASK_DEFAULT_TIMEOUT: Duration = Duration::from_secs(1800);
pub const TASK_UNDEFINED_STATUS: &str = "undefined";

// Chart installation defaults
pub const DEFAULT_CHART_VERSION: &str = "latest";
pub const DEFAULT_ENVIRONMENT: &str = "master";
pub const DEFAULT_REPOSITORY_DIR: &str = "/";
