use url::form_urlencoded;

/// Optional filters for catalog and listing endpoints.
///
/// Only values that are set and non-empty (non-zero for numbers) reach the query string, always in
/// the order `search`, `type`, `limit`, `page`, so equal queries produce equal URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub chart_type: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search<S: Into<String>>(mut self, search: S) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn chart_type<S: Into<String>>(mut self, chart_type: S) -> Self {
        self.chart_type = Some(chart_type.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The encoded query string including the leading `?`, or an empty string.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(search) = self.search.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.clone()));
        }
        if let Some(chart_type) = self.chart_type.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("type", chart_type.clone()));
        }
        if let Some(limit) = self.limit.filter(|n| *n != 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(page) = self.page.filter(|n| *n != 0) {
            pairs.push(("page", page.to_string()));
        }
        if pairs.is_empty() {
            return String::new();
        }
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("?{}", encoded)
    }

    /// Append the query string to `path`.
    pub fn apply(&self, path: &str) -> String {
        format!("{}{}", path, self.to_query_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn only_set_values() {
        let query = CatalogQuery::new().limit(5).search("x");
        assert_eq!(query.to_query_string(), "?search=x&limit=5");
    }

    #[test]
    fn stable_order() {
        let a = CatalogQuery::new()
            .page(2)
            .chart_type("mlapp-v2")
            .limit(10)
            .search("tf");
        let b = CatalogQuery::new()
            .search("tf")
            .limit(10)
            .chart_type("mlapp-v2")
            .page(2);
        assert_eq!(a.to_query_string(), b.to_query_string());
        assert_eq!(
            a.to_query_string(),
            "?search=tf&type=mlapp-v2&limit=10&page=2"
        );
    }

    #[test]
    fn empty_and_zero_values_are_skipped() {
        let query = CatalogQuery::new().search("").page(0);
        assert_eq!(query.to_query_string(), "");
        assert_eq!(query.apply("/catalog/charts"), "/catalog/charts");
    }

    #[test]
    fn values_are_encoded() {
        let query = CatalogQuery::new().search("style transfer&more");
        assert_eq!(query.to_query_string(), "?search=style+transfer%26more");
    }
}
