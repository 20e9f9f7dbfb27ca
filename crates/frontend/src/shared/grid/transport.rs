use async_trait::async_trait;
use contracts::shared::grid::{
    ColumnDescriptor, DataRequest, ExportParams, ExportQuery, PageResult, UniqueValuesRequest,
    UpdateCellRequest, UpdateCellResponse,
};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;

use super::error::GridError;
use crate::shared::api_utils::api_url;

/// Server side of one grid.
#[async_trait(?Send)]
pub trait GridTransport {
    async fn load_columns(&self) -> Result<Vec<ColumnDescriptor>, GridError>;
    async fn partitions(&self) -> Result<Vec<String>, GridError>;
    async fn fetch_page(&self, request: &DataRequest) -> Result<PageResult, GridError>;
    async fn unique_values(&self, request: &UniqueValuesRequest)
        -> Result<Vec<String>, GridError>;
    async fn update_cell(
        &self,
        request: &UpdateCellRequest,
    ) -> Result<UpdateCellResponse, GridError>;
    /// Download URL; the browser fetches the file itself.
    fn export_url(&self, query: &ExportQuery) -> Result<String, GridError>;
}

#[async_trait(?Send)]
pub trait GridTimer {
    async fn sleep(&self, ms: u32);
}

pub struct HttpTransport {
    base: String,
}

impl HttpTransport {
    pub fn new(grid: &str) -> Self {
        Self {
            base: api_url(&format!("/api/grid/{}", grid)),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GridError> {
        let response = Request::get(&self.url(path))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| GridError::Network(e.to_string()))?;
        read_json(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, GridError>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let response = Request::post(&self.url(path))
            .json(body)
            .map_err(|e| GridError::Decode(e.to_string()))?
            .send()
            .await
            .map_err(|e| GridError::Network(e.to_string()))?;
        read_json(response).await
    }
}

/// Error answers of `data` and `update` still carry a JSON body, so the body
/// is parsed first and the status only decides how a parse failure reads.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GridError> {
    let status = response.status();
    let ok = response.ok();
    let text = response
        .text()
        .await
        .map_err(|e| GridError::Network(e.to_string()))?;
    match serde_json::from_str::<T>(&text) {
        Ok(value) => Ok(value),
        Err(_) if !ok => Err(GridError::Rejected(if text.trim().is_empty() {
            format!("Errore del server: HTTP {}", status)
        } else {
            format!("Errore del server: HTTP {} {}", status, text.trim())
        })),
        Err(e) => Err(GridError::Decode(e.to_string())),
    }
}

#[async_trait(?Send)]
impl GridTransport for HttpTransport {
    async fn load_columns(&self) -> Result<Vec<ColumnDescriptor>, GridError> {
        self.get("columns").await
    }

    async fn partitions(&self) -> Result<Vec<String>, GridError> {
        self.get("partitions").await
    }

    async fn fetch_page(&self, request: &DataRequest) -> Result<PageResult, GridError> {
        self.post("data", request).await
    }

    async fn unique_values(
        &self,
        request: &UniqueValuesRequest,
    ) -> Result<Vec<String>, GridError> {
        self.post("unique_values", request).await
    }

    async fn update_cell(
        &self,
        request: &UpdateCellRequest,
    ) -> Result<UpdateCellResponse, GridError> {
        self.post("update", request).await
    }

    fn export_url(&self, query: &ExportQuery) -> Result<String, GridError> {
        let params = ExportParams::try_from(query).map_err(GridError::Decode)?;
        let qs = serde_qs::to_string(&params).map_err(|e| GridError::Decode(e.to_string()))?;
        Ok(format!("{}?{}", self.url("export"), qs))
    }
}

pub struct BrowserTimer;

#[async_trait(?Send)]
impl GridTimer for BrowserTimer {
    async fn sleep(&self, ms: u32) {
        gloo_timers::future::TimeoutFuture::new(ms).await;
    }
}
