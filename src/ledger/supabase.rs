use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::models::{InsertOutcome, LikeRecord};
use super::{LedgerError, LikeStore};

/// SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Ledger backed by a Supabase (PostgREST) table.
///
/// Duplicate protection comes from a unique index on
/// `(photo_id, user_fingerprint)` when the table has one; without it the
/// check-then-insert in the ledger service can race and store duplicates.
pub struct SupabaseStore {
    api_key: String,
    client: Client,
    table_url: String,
}

#[derive(Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

impl SupabaseStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self, anyhow::Error> {
        let client = Client::builder().build()?;

        Ok(Self {
            api_key: api_key.to_string(),
            client,
            table_url: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn pair_filter(photo_id: &str, user_fingerprint: &str) -> [(&'static str, String); 2] {
        [
            ("photo_id", format!("eq.{photo_id}")),
            ("user_fingerprint", format!("eq.{user_fingerprint}")),
        ]
    }

    async fn send(&self, builder: RequestBuilder, action: &str) -> Result<Response, LedgerError> {
        let resp = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| LedgerError::Backend(e.to_string()))?;

        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<PostgrestError>(&body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| format!("Supabase {action} failed ({status})"));
        Err(LedgerError::Backend(message))
    }
}

#[async_trait]
impl LikeStore for SupabaseStore {
    async fn exists(&self, photo_id: &str, user_fingerprint: &str) -> Result<bool, LedgerError> {
        let request = self
            .client
            .get(&self.table_url)
            .query(&[("select", "id"), ("limit", "1")])
            .query(&Self::pair_filter(photo_id, user_fingerprint));

        let rows: Vec<serde_json::Value> = self
            .send(request, "lookup")
            .await?
            .json()
            .await
            .map_err(|e| LedgerError::Backend(e.to_string()))?;

        Ok(!rows.is_empty())
    }

    async fn insert(
        &self,
        photo_id: &str,
        user_fingerprint: &str,
    ) -> Result<InsertOutcome, LedgerError> {
        let resp = self
            .authorized(self.client.post(&self.table_url))
            .header("Prefer", "return=minimal")
            .json(&json!({
                "photo_id": photo_id,
                "user_fingerprint": user_fingerprint,
            }))
            .send()
            .await
            .map_err(|e| LedgerError::Backend(e.to_string()))?;

        if resp.status().is_success() {
            return Ok(InsertOutcome::Inserted);
        }

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let error = serde_json::from_str::<PostgrestError>(&body).ok();

        let unique_violation = error
            .as_ref()
            .and_then(|e| e.code.as_deref())
            .is_some_and(|code| code == UNIQUE_VIOLATION);
        if status == StatusCode::CONFLICT || unique_violation {
            return Ok(InsertOutcome::Duplicate);
        }

        Err(LedgerError::Backend(
            error
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("Supabase insert failed ({status})")),
        ))
    }

    async fn delete(&self, photo_id: &str, user_fingerprint: &str) -> Result<u64, LedgerError> {
        let request = self
            .client
            .delete(&self.table_url)
            .header("Prefer", "return=representation")
            .query(&Self::pair_filter(photo_id, user_fingerprint));

        let rows: Vec<serde_json::Value> = self
            .send(request, "delete")
            .await?
            .json()
            .await
            .map_err(|e| LedgerError::Backend(e.to_string()))?;

        Ok(rows.len() as u64)
    }

    async fn count(&self, photo_id: Option<&str>) -> Result<u64, LedgerError> {
        let mut request = self
            .client
            .head(&self.table_url)
            .header("Prefer", "count=exact")
            .query(&[("select", "*")]);
        if let Some(photo_id) = photo_id {
            request = request.query(&[("photo_id", format!("eq.{photo_id}"))]);
        }

        let resp = self.send(request, "count").await?;
        let range = resp
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| LedgerError::Backend("Supabase count missing Content-Range".into()))?;

        parse_content_range_total(range)
            .ok_or_else(|| LedgerError::Backend(format!("Unexpected Content-Range: {range}")))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<LikeRecord>, LedgerError> {
        let limit = limit.to_string();
        let request = self.client.get(&self.table_url).query(&[
            ("select", "photo_id,user_fingerprint,created_at"),
            ("order", "created_at.desc"),
            ("limit", limit.as_str()),
        ]);

        self.send(request, "query")
            .await?
            .json()
            .await
            .map_err(|e| LedgerError::Backend(e.to_string()))
    }
}

/// Extract the total from a PostgREST `Content-Range` header (`0-9/42`, `*/0`).
pub fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}
