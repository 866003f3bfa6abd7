//! Sheets v4 client.
//!
//! Blocking reqwest client; no async runtime required. Implements the four
//! calls a [`SyncSession`](gridsync_core::SyncSession) makes.

use std::time::Duration;

use gridsync_common::RawGrid;
use gridsync_core::{HttpError, ResolvedTarget, SheetInfo, SheetTransport, WriteRequest};
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::SheetsClientConfig;
use crate::wire::{
    BatchUpdate, ErrorBody, GRID_FIELDS, SHEET_LIST_FIELDS, Spreadsheet, UpdateValuesResponse,
    ValueRange,
};

/// Failures building a client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL `{0}`")]
    InvalidBaseUrl(String),
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Status reported for failures that never produced an HTTP response.
pub const NO_RESPONSE_STATUS: u16 = 0;

pub struct SheetsClient {
    http: Client,
    base: Url,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("base", &self.base.as_str())
            .field("api_key", &self.api_key.is_some())
            .field("access_token", &self.access_token.is_some())
            .finish()
    }
}

fn network_error(e: reqwest::Error) -> HttpError {
    HttpError::new(NO_RESPONSE_STATUS, e.to_string())
}

fn read_body<T: DeserializeOwned>(response: Response) -> Result<T, HttpError> {
    let status = response.status().as_u16();
    response
        .json::<T>()
        .map_err(|e| HttpError::new(status, format!("malformed response: {e}")))
}

/// Turn a non-2xx response into an [`HttpError`] carrying `error.message`.
fn check(response: Response) -> Result<Response, HttpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .map(|body| body.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or(text);
    Err(HttpError::new(status.as_u16(), message))
}

impl SheetsClient {
    pub fn new(config: SheetsClientConfig) -> Result<Self, ClientError> {
        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base = Url::parse(&base_url).map_err(|_| ClientError::InvalidBaseUrl(config.base_url))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }
        let http = Client::builder()
            .user_agent(concat!("gridsync/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base,
            api_key: config.api_key,
            access_token: config.access_token,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn with_key(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.query(&[("key", key.as_str())]),
            None => builder,
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// GET without credentials first; retry with the bearer token on 403.
    fn get(&self, url: Url, query: &[(&str, &str)]) -> Result<Response, HttpError> {
        let request = || self.with_key(self.http.get(url.clone()).query(query));

        #[cfg(feature = "tracing")]
        tracing::debug!(url = %url, "GET");

        let response = request().send().map_err(network_error)?;
        if response.status().as_u16() == 403 && self.access_token.is_some() {
            #[cfg(feature = "tracing")]
            tracing::debug!(url = %url, "anonymous read refused, retrying with token");

            let retried = self.authorized(request()).send().map_err(network_error)?;
            return check(retried);
        }
        check(response)
    }

    fn fetch_spreadsheet(
        &self,
        spreadsheet_id: &str,
        query: &[(&str, &str)],
    ) -> Result<Spreadsheet, HttpError> {
        let response = self.get(self.url(&[spreadsheet_id]), query)?;
        read_body(response)
    }
}

impl SheetTransport for SheetsClient {
    fn fetch_grid(&mut self, target: &ResolvedTarget) -> Result<RawGrid, HttpError> {
        let a1 = target.a1();
        let mut query = vec![("includeGridData", "true"), ("fields", GRID_FIELDS)];
        if !a1.is_empty() {
            query.push(("ranges", a1.as_str()));
        }
        let spreadsheet = self.fetch_spreadsheet(&target.spreadsheet_id, &query)?;
        Ok(spreadsheet.into_grid())
    }

    fn fetch_sheet_list(&mut self, spreadsheet_id: &str) -> Result<Vec<SheetInfo>, HttpError> {
        let spreadsheet =
            self.fetch_spreadsheet(spreadsheet_id, &[("fields", SHEET_LIST_FIELDS)])?;
        Ok(spreadsheet.sheet_list())
    }

    fn write_grid(&mut self, request: &WriteRequest<'_>) -> Result<RawGrid, HttpError> {
        let a1 = request.target.a1();
        let url = self.url(&[request.target.spreadsheet_id.as_str(), "values", a1.as_str()]);
        let render = if request.render_formatted {
            "FORMATTED_VALUE"
        } else {
            "UNFORMATTED_VALUE"
        };
        let body = ValueRange {
            range: &a1,
            major_dimension: request.orientation.api_name(),
            values: request.grid,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(range = %a1, rows = request.grid.len(), "PUT values");

        let builder = self.http.put(url).query(&[
            ("valueInputOption", "USER_ENTERED"),
            ("includeValuesInResponse", "true"),
            ("responseValueRenderOption", render),
        ]);
        let response = self.authorized(builder).json(&body).send().map_err(network_error)?;
        let response = check(response)?;
        Ok(read_body::<UpdateValuesResponse>(response)?.into_grid())
    }

    fn create_sheet(&mut self, spreadsheet_id: &str, title: &str) -> Result<(), HttpError> {
        let endpoint = format!("{spreadsheet_id}:batchUpdate");
        let url = self.url(&[endpoint.as_str()]);

        #[cfg(feature = "tracing")]
        tracing::debug!(sheet = %title, "adding sheet");

        let builder = self.http.post(url).json(&BatchUpdate::add_sheet(title));
        let response = self.authorized(builder).send().map_err(network_error)?;
        check(response).map(|_| ())
    }
}
