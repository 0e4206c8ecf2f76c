//! Data-store client for the hosted REST interface (`/rest/v1/{table}`).
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Native/SSR builds return [`DataError::Unavailable`]; query rendering and id
//! validation are pure and work everywhere.
//!
//! DESIGN
//! ======
//! Every table goes through the same [`Query`] builder (equality filters,
//! ordering, limit), so the profile lookup and the CRUD pages share one code
//! path. Values are form-encoded the way the hosted client library does.
//!
//! ERROR HANDLING
//! ==============
//! Transport, status and decode failures map to [`DataError`]. Malformed ids
//! are rejected before any request is built.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "rest_test.rs"]
mod rest_test;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::PublicConfig;
use crate::net::auth_api::{AuthApi, fresh_access_token, now_secs};
use crate::net::types::Profile;
use crate::state::profile::ProfileSource;
use crate::state::session::SessionStore;

/// Table holding one routing profile per auth user.
pub const PROFILES_TABLE: &str = "profiles";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("data store returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("invalid record id: {0}")]
    InvalidId(String),
    #[error("data store is not available outside the browser")]
    Unavailable,
}

/// Filtered read against one table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    table: String,
    select: String,
    filters: Vec<(String, String)>,
    order: Vec<(String, bool)>,
    limit: Option<usize>,
}

impl Query {
    #[must_use]
    pub fn table(name: &str) -> Self {
        Self { table: name.to_owned(), select: "*".to_owned(), filters: Vec::new(), order: Vec::new(), limit: None }
    }

    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        columns.clone_into(&mut self.select);
        self
    }

    /// Keep rows where `column` equals `value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.filters.push((column.to_owned(), format!("eq.{value}")));
        self
    }

    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push((column.to_owned(), ascending));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Render the query string, e.g. `select=*&id=eq.42&order=name.asc`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut out = url::form_urlencoded::Serializer::new(String::new());
        out.append_pair("select", &self.select);
        for (column, filter) in &self.filters {
            out.append_pair(column, filter);
        }
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(column, asc)| format!("{column}.{}", if *asc { "asc" } else { "desc" }))
                .collect::<Vec<_>>()
                .join(",");
            out.append_pair("order", &order);
        }
        if let Some(limit) = self.limit {
            out.append_pair("limit", &limit.to_string());
        }
        out.finish()
    }

    #[must_use]
    pub fn url(&self, rest_base: &str) -> String {
        format!("{}?{}", table_endpoint(rest_base, &self.table), self.to_query_string())
    }
}

/// Primary-key value accepted by the write helpers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordId(String);

impl RecordId {
    /// Accept only non-blank JSON strings.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidId`] naming the offending JSON type.
    pub fn parse(value: &Value) -> Result<Self, DataError> {
        match value {
            Value::String(raw) if !raw.trim().is_empty() => Ok(Self(raw.trim().to_owned())),
            Value::String(_) => Err(DataError::InvalidId("id must not be blank".to_owned())),
            other => Err(DataError::InvalidId(format!("id must be a string, got {}", json_kind(other)))),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn table_endpoint(rest_base: &str, table: &str) -> String {
    format!("{rest_base}/{table}")
}

/// Query string selecting a single row by id, e.g. `id=eq.42`.
#[must_use]
pub fn by_id_filter(id: &RecordId) -> String {
    let mut out = url::form_urlencoded::Serializer::new(String::new());
    out.append_pair("id", &format!("eq.{}", id.as_str()));
    out.finish()
}

/// Lookup used by the profile resolver.
#[must_use]
pub fn profile_query(user_id: &str) -> Query {
    Query::table(PROFILES_TABLE).eq("id", user_id).limit(1)
}

/// Pull a human-readable message out of an error body.
#[cfg(any(test, feature = "hydrate"))]
fn error_message(body: &Value) -> String {
    ["message", "msg", "error_description", "error", "hint"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map_or_else(|| body.to_string(), str::to_owned)
}

/// REST client bound to the public config and the current session token.
#[derive(Clone, Debug)]
pub struct RestClient {
    config: PublicConfig,
    session: SessionStore,
    refresher: Option<AuthApi>,
}

impl RestClient {
    #[must_use]
    pub fn new(config: PublicConfig, session: SessionStore) -> Self {
        Self { config, session, refresher: None }
    }

    /// Refresh expiring sessions through `auth` before each request.
    #[must_use]
    pub fn with_refresher(mut self, auth: AuthApi) -> Self {
        self.refresher = Some(auth);
        self
    }

    /// Bearer token: the user's access token, or the anon key when signed out.
    /// With a refresher installed, a token about to expire is renewed first.
    pub async fn bearer(&self) -> String {
        let token = match &self.refresher {
            Some(auth) => fresh_access_token(auth, &self.session, now_secs()).await,
            None => self.session.access_token(),
        };
        token.unwrap_or_else(|| self.config.supabase_anon_key.clone())
    }

    /// Fetch at most one row. An empty result is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] on transport, status or decode failure.
    pub async fn fetch_one<T: DeserializeOwned>(&self, query: &Query) -> Result<Option<T>, DataError> {
        let rows: Vec<T> = self.fetch_list(&query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Fetch every row matching `query`.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] on transport, status or decode failure.
    pub async fn fetch_list<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>, DataError> {
        #[cfg(feature = "hydrate")]
        {
            let url = query.url(&self.config.rest_base());
            let request = self.authorize(gloo_net::http::Request::get(&url)).await;
            let body = send(request.build().map_err(|e| DataError::Http(e.to_string()))?).await?;
            serde_json::from_value(body).map_err(|e| DataError::Decode(e.to_string()))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = query;
            Err(DataError::Unavailable)
        }
    }

    /// Insert `row` into `table`, returning the stored rows.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] on transport, status or decode failure.
    pub async fn insert<B: Serialize, T: DeserializeOwned>(&self, table: &str, row: &B) -> Result<Vec<T>, DataError> {
        #[cfg(feature = "hydrate")]
        {
            let url = table_endpoint(&self.config.rest_base(), table);
            let request = self
                .authorize(gloo_net::http::Request::post(&url))
                .await
                .header("Prefer", "return=representation")
                .json(row)
                .map_err(|e| DataError::Http(e.to_string()))?;
            let body = send(request).await?;
            serde_json::from_value(body).map_err(|e| DataError::Decode(e.to_string()))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (table, row);
            Err(DataError::Unavailable)
        }
    }

    /// Patch the row whose primary key is `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidId`] synchronously when `id` is not a
    /// non-blank string; otherwise transport, status or decode failures.
    pub async fn update_by_id<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        id: &Value,
        patch: &B,
    ) -> Result<Vec<T>, DataError> {
        let id = RecordId::parse(id)?;
        #[cfg(feature = "hydrate")]
        {
            let url = format!("{}?{}", table_endpoint(&self.config.rest_base(), table), by_id_filter(&id));
            let request = self
                .authorize(gloo_net::http::Request::patch(&url))
                .await
                .header("Prefer", "return=representation")
                .json(patch)
                .map_err(|e| DataError::Http(e.to_string()))?;
            let body = send(request).await?;
            serde_json::from_value(body).map_err(|e| DataError::Decode(e.to_string()))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (table, id, patch);
            Err(DataError::Unavailable)
        }
    }

    /// Delete the row whose primary key is `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidId`] synchronously for a malformed id;
    /// otherwise transport or status failures.
    pub async fn delete_by_id(&self, table: &str, id: &Value) -> Result<(), DataError> {
        let id = RecordId::parse(id)?;
        #[cfg(feature = "hydrate")]
        {
            let url = format!("{}?{}", table_endpoint(&self.config.rest_base(), table), by_id_filter(&id));
            let request = self.authorize(gloo_net::http::Request::delete(&url)).await;
            send(request.build().map_err(|e| DataError::Http(e.to_string()))?).await?;
            Ok(())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (table, id);
            Err(DataError::Unavailable)
        }
    }

    #[cfg(feature = "hydrate")]
    async fn authorize(&self, request: gloo_net::http::RequestBuilder) -> gloo_net::http::RequestBuilder {
        let bearer = self.bearer().await;
        request
            .header("apikey", &self.config.supabase_anon_key)
            .header("Authorization", &format!("Bearer {bearer}"))
    }
}

#[cfg(feature = "hydrate")]
async fn send(request: gloo_net::http::Request) -> Result<Value, DataError> {
    let resp = request.send().await.map_err(|e| DataError::Http(e.to_string()))?;
    let status = resp.status();
    let ok = resp.ok();
    let text = resp.text().await.map_err(|e| DataError::Decode(e.to_string()))?;
    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).map_err(|e| DataError::Decode(e.to_string()))?
    };
    if !ok {
        return Err(DataError::Status { status, message: error_message(&body) });
    }
    Ok(body)
}

impl ProfileSource for RestClient {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, DataError> {
        self.fetch_one(&profile_query(user_id)).await
    }
}
