use std::fmt::Display;

use log::{debug, error};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::utils::config::AppConfig;
use crate::utils::error::CustomError;

/// Client for the hosted backend: table queries, auth and storage share it
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.supabase_url, &config.supabase_anon_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a table query as the anonymous role
    pub fn from(&self, table: &str) -> TableQuery<'_> {
        TableQuery::new(self, table, None)
    }

    /// Start a table query on behalf of a signed-in user so row-level security applies
    pub fn from_as(&self, table: &str, access_token: &str) -> TableQuery<'_> {
        TableQuery::new(self, table, Some(access_token.to_string()))
    }

    /// `from_as` when a user token is at hand, `from` otherwise
    pub fn from_optional(&self, table: &str, access_token: Option<&str>) -> TableQuery<'_> {
        TableQuery::new(self, table, access_token.map(str::to_string))
    }

    /// Build a request against `{base_url}{path}` carrying the project key
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        access_token: Option<&str>,
    ) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token.unwrap_or(&self.anon_key))
    }
}

/// Error body shapes returned by the REST, auth and storage endpoints
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ApiErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Turn a non-success response into a `CustomError` carrying the backend message
pub(crate) async fn ensure_success(response: Response) -> Result<Response, CustomError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown backend error")
                .to_string()
        });

    error!("Backend responded {}: {}", status, message);
    Err(CustomError::from_backend(status, message))
}

/// Filtered query against one table, in the style of the hosted query builder
pub struct TableQuery<'a> {
    client: &'a SupabaseClient,
    table: String,
    access_token: Option<String>,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<usize>,
}

impl<'a> TableQuery<'a> {
    fn new(client: &'a SupabaseClient, table: &str, access_token: Option<String>) -> Self {
        Self {
            client,
            table: table.to_string(),
            access_token,
            select: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Columns to return; embedded joins use `alias:table(cols)` syntax
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn gt(mut self, column: &str, value: impl Display) -> Self {
        self.filters
            .push((column.to_string(), format!("gt.{}", value)));
        self
    }

    /// "in-set" filter; values are rendered comma separated
    pub fn in_list<V: Display>(mut self, column: &str, values: &[V]) -> Self {
        let joined = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.filters
            .push((column.to_string(), format!("in.({})", joined)));
        self
    }

    /// Ordering terms accumulate in call order
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order.push(format!("{}.{}", column, direction));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    /// Query-string pairs in the order they are sent
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(select) = &self.select {
            pairs.push(("select".to_string(), select.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            pairs.push(("order".to_string(), self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    fn build(&self, method: Method) -> RequestBuilder {
        let path = format!("/rest/v1/{}", self.table);
        self.client
            .request(method, &path, self.access_token.as_deref())
            .query(&self.query_pairs())
    }

    fn require_filters(&self, action: &str) -> Result<(), CustomError> {
        if self.filters.is_empty() {
            return Err(CustomError::InternalServerError(format!(
                "Refusing to {} every row of '{}'",
                action, self.table
            )));
        }
        Ok(())
    }

    /// Run the query and decode every returned row
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, CustomError> {
        debug!("GET {} {:?}", self.table, self.query_pairs());
        let response = self.build(Method::GET).send().await?;
        let rows = ensure_success(response).await?.json::<Vec<T>>().await?;
        Ok(rows)
    }

    /// First matching row, if any
    pub async fn maybe_single<T: DeserializeOwned>(self) -> Result<Option<T>, CustomError> {
        let rows = self.limit(1).fetch::<T>().await?;
        Ok(rows.into_iter().next())
    }

    /// Insert a row without asking for it back
    pub async fn insert<B: Serialize + ?Sized>(self, body: &B) -> Result<(), CustomError> {
        debug!("INSERT {}", self.table);
        let response = self
            .build(Method::POST)
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Insert a row and decode the stored representation (restricted by `select`)
    pub async fn insert_returning<B, T>(self, body: &B) -> Result<T, CustomError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("INSERT {} (returning)", self.table);
        let table = self.table.clone();
        let response = self
            .build(Method::POST)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let rows = ensure_success(response).await?.json::<Vec<T>>().await?;
        rows.into_iter().next().ok_or_else(|| {
            CustomError::UpstreamError(format!("Insert into '{}' returned no row", table))
        })
    }

    /// Patch every row matching the filters
    pub async fn update<B: Serialize + ?Sized>(self, patch: &B) -> Result<(), CustomError> {
        self.require_filters("update")?;
        debug!("UPDATE {} {:?}", self.table, self.filters);
        let response = self
            .build(Method::PATCH)
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Delete every row matching the filters
    pub async fn delete(self) -> Result<(), CustomError> {
        self.require_filters("delete")?;
        debug!("DELETE {} {:?}", self.table, self.filters);
        let response = self.build(Method::DELETE).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}
