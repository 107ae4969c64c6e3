use crate::constants::{DEALER_APP_SEGMENT, DEALER_URL, KUBERLAB_APP_SEGMENT, KUBERLAB_URL};
use serde::{Deserialize, Serialize};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};

/// The two deployments of the API. They share almost every path and payload; the differences are
/// collected here instead of in two copies of the client.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVariant {
    #[default]
    Kuberlab,
    Dealer,
}

derive_display_from_serialize!(ApiVariant);
derive_fromstr_from_deserialize!(ApiVariant);

/// How an application status payload is shaped.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StatusShape {
    /// A summary object whose `component_states` holds the components.
    Summary,
    /// A bare array of component states.
    Components,
}

impl ApiVariant {
    /// The base URL used when none is configured.
    pub fn default_url(&self) -> &'static str {
        match self {
            ApiVariant::Kuberlab => KUBERLAB_URL,
            ApiVariant::Dealer => DEALER_URL,
        }
    }

    /// The chart path segment that application charts live under.
    pub fn app_chart_segment(&self) -> &'static str {
        match self {
            ApiVariant::Kuberlab => KUBERLAB_APP_SEGMENT,
            ApiVariant::Dealer => DEALER_APP_SEGMENT,
        }
    }

    pub fn app_status_shape(&self) -> StatusShape {
        match self {
            ApiVariant::Kuberlab => StatusShape::Summary,
            ApiVariant::Dealer => StatusShape::Components,
        }
    }

    /// Whether starting a task sends the owning application's full configuration (when the task
    /// knows it) instead of the task's own configuration.
    pub fn starts_tasks_with_app_config(&self) -> bool {
        matches!(self, ApiVariant::Kuberlab)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_and_display() {
        assert_eq!("dealer".parse::<ApiVariant>().unwrap(), ApiVariant::Dealer);
        assert_eq!(ApiVariant::Kuberlab.to_string(), "kuberlab");
        assert!("other".parse::<ApiVariant>().is_err());
    }

    #[test]
    fn compatibility_table() {
        assert_eq!(ApiVariant::Kuberlab.app_chart_segment(), "chart-mlapp-v2");
        assert_eq!(ApiVariant::Dealer.app_chart_segment(), "chart-app");
        assert_eq!(
            ApiVariant::Dealer.app_status_shape(),
            StatusShape::Components
        );
        assert_eq!(ApiVariant::default().default_url(), KUBERLAB_URL);
    }
}
