use crate::core::{
    domain::{
        error::PrtgResult,
        model::historic_data::{HistoricData, HistoricDate},
    },
    infrastructure::{api_client::ApiClient, api_request::ApiRequest},
};
use std::sync::Arc;
use tracing::debug;

/// Downloads averaged historic readings of one object as CSV.
#[derive(Debug, Clone)]
pub struct HistoricDataFetcher {
    api: Arc<ApiClient>,
}

impl HistoricDataFetcher {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Fetches readings of `object_id` between `start` and `end`, averaged
    /// over `average` seconds (`0` for raw values).
    pub async fn fetch(
        &self,
        object_id: &str,
        start: impl Into<HistoricDate>,
        end: impl Into<HistoricDate>,
        average: u32,
    ) -> PrtgResult<HistoricData> {
        let request = ApiRequest::new("historicdata.csv")
            .param("id", object_id)
            .param("avg", average)
            .param("sdate", start.into().to_param())
            .param("edate", end.into().to_param());
        let body = self.api.get_text(&request).await?;
        let data = HistoricData::from_csv(&body)?;
        debug!(object = %object_id, rows = data.len(), "Fetched historic data");
        Ok(data)
    }
}
