use crate::clients::{ApiResponse, HttpClient};
use crate::error::{self, Result};
use crate::resource::{backfill, FromPayload};
use crate::CatalogQuery;
use serde::Serialize;
use serde_json::{Map, Value};
use snafu::ResultExt;

/// Which status codes a call accepts as success.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Accept {
    /// Anything below 400.
    Below400,
    /// Exactly 200.
    Only200,
}

/// Fail with `Error::Api` unless `response` has an accepted status.
pub(crate) fn check(response: ApiResponse, accept: Accept) -> Result<ApiResponse> {
    let ok = match accept {
        Accept::Below400 => response.is_ok(),
        Accept::Only200 => response.status.as_u16() == 200,
    };
    if ok {
        Ok(response)
    } else {
        Err(response.api_error())
    }
}

pub(crate) fn to_body<T: Serialize + ?Sized>(what: &str, body: &T) -> Result<String> {
    serde_json::to_string(body).context(error::SerializeSnafu { what })
}

/// The operations shared by every resource manager. A manager only has to say which kind of
/// resource it builds and which `HttpClient` it uses; the request/response handling is provided.
///
/// Path parameters must go through [`ensure_not_empty`] before they are interpolated into a URL.
///
/// [`ensure_not_empty`]: ResourceManager::ensure_not_empty
#[async_trait::async_trait]
pub trait ResourceManager: Sized + Sync {
    type Item: FromPayload + Send;

    fn kind(&self) -> &'static str;
    fn http_client(&self) -> &HttpClient;

    /// Values back-filled into each payload before it becomes an `Item`.
    fn defaults(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Fail with `Error::MissingField` naming the first field that is `None` or empty.
    fn ensure_not_empty(&self, fields: &[(&str, Option<&str>)]) -> Result<()> {
        match fields
            .iter()
            .find(|(_, value)| value.map(str::is_empty).unwrap_or(true))
        {
            Some((field, _)) => error::MissingFieldSnafu {
                kind: self.kind(),
                field: *field,
            }
            .fail(),
            None => Ok(()),
        }
    }

    /// Build one `Item` from a JSON object.
    fn build(&self, mut payload: Value) -> Result<Self::Item> {
        if let Value::Object(data) = &mut payload {
            backfill(data, &self.defaults());
        }
        Self::Item::from_payload(self.kind(), payload)
    }

    /// Build one `Item` per element of a JSON array, keeping the array's order.
    fn build_all(&self, payload: Value) -> Result<Vec<Self::Item>> {
        let items: Vec<Value> = serde_json::from_value(payload).context(error::DeserializeSnafu {
            what: format!("{} list", self.kind()),
        })?;
        items.into_iter().map(|item| self.build(item)).collect()
    }

    async fn list_resources(
        &self,
        url: &str,
        response_key: Option<&str>,
    ) -> Result<Vec<Self::Item>> {
        let response = check(self.http_client().get(url, None).await?, Accept::Below400)?;
        self.build_all(response.json_at(response_key)?)
    }

    async fn catalog_resources(&self, url: &str, query: &CatalogQuery) -> Result<Vec<Self::Item>> {
        self.list_resources(&query.apply(url), None).await
    }

    async fn get_resource(&self, url: &str, response_key: Option<&str>) -> Result<Self::Item> {
        let response = check(self.http_client().get(url, None).await?, Accept::Only200)?;
        self.build(response.json_at(response_key)?)
    }

    async fn create_resource<B>(
        &self,
        url: &str,
        body: &B,
        response_key: Option<&str>,
    ) -> Result<Self::Item>
    where
        B: Serialize + Sync + ?Sized,
    {
        let body = to_body(self.kind(), body)?;
        let response = check(
            self.http_client().post(url, body, None).await?,
            Accept::Below400,
        )?;
        self.build(response.json_at(response_key)?)
    }

    async fn update_resource<B>(
        &self,
        url: &str,
        body: &B,
        response_key: Option<&str>,
    ) -> Result<Self::Item>
    where
        B: Serialize + Sync + ?Sized,
    {
        let body = to_body(self.kind(), body)?;
        let response = check(
            self.http_client().put(url, body, None).await?,
            Accept::Only200,
        )?;
        self.build(response.json_at(response_key)?)
    }

    async fn delete_resource(&self, url: &str) -> Result<()> {
        check(
            self.http_client().delete(url, None).await?,
            Accept::Below400,
        )?;
        Ok(())
    }

    /// GET `url` and return the body text (YAML documents, logs and so on).
    async fn read_text(&self, url: &str) -> Result<String> {
        Ok(check(self.http_client().get(url, None).await?, Accept::Below400)?.body)
    }

    /// GET `url` and return the parsed JSON body without building resources.
    async fn read_json(&self, url: &str) -> Result<Value> {
        check(self.http_client().get(url, None).await?, Accept::Below400)?.json()
    }
}
