use crate::error::{self, Result};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use snafu::ResultExt;
use std::fmt::{Display, Formatter};

/// Types that a manager can build from one JSON object in a response.
pub trait FromPayload: Sized {
    fn from_payload(kind: &'static str, payload: Value) -> Result<Self>;
}

/// A client-side snapshot of one server-side entity (workspace, project, chart, cluster, ...).
///
/// The JSON object's own keys are kept in their original order and exposed through typed
/// accessors. Unknown fields are never dropped, so `to_dict()` gives back what the server sent
/// (plus any per-kind defaults that were missing).
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    kind: &'static str,
    data: Map<String, Value>,
}

impl Resource {
    pub fn new(kind: &'static str, data: Map<String, Value>) -> Self {
        Self { kind, data }
    }

    /// Create a resource, back-filling any key of `defaults` that `data` does not have.
    pub fn with_defaults(
        kind: &'static str,
        mut data: Map<String, Value>,
        defaults: &Map<String, Value>,
    ) -> Self {
        backfill(&mut data, defaults);
        Self { kind, data }
    }

    /// The resource kind, e.g. `Workspace`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(Value::as_i64)
    }

    /// The conventional `Name` attribute.
    pub fn name(&self) -> Option<&str> {
        self.get_str("Name")
    }

    pub fn set<S: Into<String>>(&mut self, key: S, value: Value) {
        self.data.insert(key.into(), value);
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }

    /// A deep copy of the attributes as a JSON object.
    pub fn to_dict(&self) -> Value {
        Value::Object(self.data.clone())
    }

    /// `true` if every `(attribute, value)` pair is present and equal. A missing attribute never
    /// matches.
    pub fn matches(&self, searches: &[(&str, Value)]) -> bool {
        searches
            .iter()
            .all(|(key, value)| self.data.get(*key) == Some(value))
    }
}

impl FromPayload for Resource {
    fn from_payload(kind: &'static str, payload: Value) -> Result<Self> {
        let data = serde_json::from_value(payload).context(error::DeserializeSnafu { what: kind })?;
        Ok(Self::new(kind, data))
    }
}

/// One `kind` resource per element of a JSON array, in the array's order.
pub(crate) fn from_array(kind: &'static str, payload: Value) -> Result<Vec<Resource>> {
    let items: Vec<Value> =
        serde_json::from_value(payload).context(error::DeserializeSnafu { what: kind })?;
    items
        .into_iter()
        .map(|item| Resource::from_payload(kind, item))
        .collect()
}

impl Serialize for Resource {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.data.serialize(serializer)
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let values = self
            .data
            .iter()
            .map(|(key, value)| format!("{}='{}'", key, display_value(value)))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} [{}]", self.kind, values)
    }
}

/// Strings are shown without their JSON quotes, everything else as JSON.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn backfill(data: &mut Map<String, Value>, defaults: &Map<String, Value>) {
    for (key, value) in defaults {
        if !data.contains_key(key) {
            data.insert(key.clone(), value.clone());
        }
    }
}

/// Keep only the resources matching every search pair; see [`Resource::matches`].
pub fn find(resources: Vec<Resource>, searches: &[(&str, Value)]) -> Vec<Resource> {
    resources
        .into_iter()
        .filter(|resource| resource.matches(searches))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn workspace() -> Value {
        json!({
            "Type": "private",
            "Name": "my",
            "DisplayName": "my",
            "Picture": "url",
            "Can": ["read", "manage"]
        })
    }

    #[test]
    fn round_trips_payload() {
        let resource = Resource::from_payload("Workspace", workspace()).unwrap();
        assert_eq!(resource.name(), Some("my"));
        assert_eq!(resource.get("Can"), Some(&json!(["read", "manage"])));
        assert_eq!(resource.to_dict(), workspace());
        assert_eq!(serde_json::to_value(&resource).unwrap(), workspace());
    }

    #[test]
    fn keeps_key_order_in_display() {
        let resource = Resource::from_payload("Workspace", workspace()).unwrap();
        assert_eq!(
            resource.to_string(),
            "Workspace [Type='private', Name='my', DisplayName='my', Picture='url', \
             Can='[\"read\",\"manage\"]']"
        );
    }

    #[test]
    fn defaults_do_not_override() {
        let data = json!({"Name": "my", "Enabled": false});
        let defaults = json!({"Enabled": true, "Environment": "master"});
        let resource = Resource::with_defaults(
            "App",
            serde_json::from_value(data).unwrap(),
            defaults.as_object().unwrap(),
        );
        assert_eq!(resource.get_bool("Enabled"), Some(false));
        assert_eq!(resource.get_str("Environment"), Some("master"));
    }

    #[test]
    fn rejects_non_object() {
        assert!(Resource::from_payload("Workspace", json!(["a"])).is_err());
    }

    #[test]
    fn find_by_attributes() {
        let resources = vec![
            Resource::from_payload("Workspace", workspace()).unwrap(),
            Resource::from_payload("Workspace", json!({"Name": "other", "Type": "org"})).unwrap(),
        ];
        let found = find(resources.clone(), &[("Type", json!("org"))]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), Some("other"));
        assert!(find(resources, &[("Missing", json!(1))]).is_empty());
    }
}
