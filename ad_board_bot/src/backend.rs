use std::time::Duration;

use ad_board_commons::record::AdRecord;
use serde::Deserialize;
use url::Url;

use crate::types::SubmitOutcome;

/// Shape of the backend's answer to a submission.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    status: String,
}

/// HTTP client for the board's ingestion endpoint.
pub struct BackendClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl BackendClient {
    /// Build a client with bounded timeouts for the given `/ads` endpoint.
    pub fn new(endpoint: Url) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(BackendClient { client, endpoint })
    }

    /// Submit one record. Transport trouble and non-OK answers all come
    /// back as [`SubmitOutcome::Failed`]; there is nothing for the caller
    /// to retry.
    pub async fn submit(&self, record: &AdRecord) -> SubmitOutcome {
        let response = match self
            .client
            .post(self.endpoint.clone())
            .json(record)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Failed to reach the backend: {e}");
                return SubmitOutcome::Failed;
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            log::warn!("Backend refused a record: {}", response.status());
            return SubmitOutcome::Failed;
        }

        match response.json::<SubmitResponse>().await {
            Ok(body) if body.status == "duplicate" => SubmitOutcome::Duplicate,
            Ok(_) => SubmitOutcome::Accepted,
            Err(e) => {
                // A 200 means the record landed; the body is just garnish.
                log::warn!("Backend sent an unreadable response: {e}");
                SubmitOutcome::Accepted
            }
        }
    }
}
