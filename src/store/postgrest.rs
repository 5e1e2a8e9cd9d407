use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::schema::StoreConfig;
use crate::store::error::StoreError;
use crate::store::filter::TokenFilter;
use crate::store::repository::TokenStore;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Token store reached through a PostgREST endpoint (as exposed by Supabase).
pub struct PostgrestStore {
    base_url: String,
    api_key: String,
    table: String,
    token_column: String,
    client: Client,
}

impl PostgrestStore {
    pub fn new(config: &StoreConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build token store client; using defaults");
                Client::new()
            });

        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            table: config.table.clone(),
            token_column: config.token_column.clone(),
            client,
        }
    }

    fn query_url(&self, filter: &TokenFilter) -> Result<Url, StoreError> {
        let endpoint = format!("{}/rest/v1/{}", self.base_url, self.table);
        Url::parse_with_params(
            &endpoint,
            [
                ("select", self.token_column.clone()),
                (filter.field.as_str(), filter.operand()),
            ],
        )
        .map_err(|err| StoreError::Request {
            message: format!("invalid store URL {endpoint}: {err}"),
        })
    }
}

#[async_trait]
impl TokenStore for PostgrestStore {
    async fn select_tokens(&self, filter: &TokenFilter) -> Result<Vec<Option<String>>, StoreError> {
        let url = self.query_url(filter)?;
        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|err| StoreError::Request {
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let rows: Vec<Value> = response.json().await.map_err(|err| StoreError::Decode {
            message: err.to_string(),
        })?;
        debug!(table = %self.table, rows = rows.len(), "Token store query returned");

        Ok(rows
            .iter()
            .map(|row| {
                row.get(&self.token_column)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect())
    }
}
