//! Newswire content API client implementation
//!
//! The API only accepts persisted queries: every request names an operation
//! and carries the sha256 hash the server cached it under.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use urlencoding::encode;

use crate::domain::entities::{ContentNode, Credential, Entry, EntryDetail};
use crate::domain::ports::NewswireApi;
use crate::error::ApiError;

pub const LIST_OPERATION: &str = "NewswireList";
pub const DETAIL_OPERATION: &str = "NewswirePost";

/// The detail query's hash is stable, unlike the list query's
pub const DETAIL_QUERY_HASH: &str =
    "555658813abe5acc8010de1a1feddd6fd8fddffbdc35d3723d4dc0fe4ded6810";

const STALE_QUERY_MESSAGE: &str = "PersistedQueryNotFound";
const LOCALE: &str = "en_us";
const META_URL: &str = "/newswire";

/// Implementation of the newswire content API client
pub struct GraphClient {
    http: Client,
    base_url: String,
}

impl GraphClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn query_url(&self, operation: &str, variables: &Value, hash: &str) -> String {
        let extensions = json!({
            "persistedQuery": {
                "version": 1,
                "sha256Hash": hash,
            }
        });

        format!(
            "{}?operationName={}&variables={}&extensions={}",
            self.base_url,
            encode(operation),
            encode(&variables.to_string()),
            encode(&extensions.to_string()),
        )
    }

    fn list_url(&self, topic_id: Option<u32>, page: u32, credential: &Credential) -> String {
        let variables = json!({
            "page": page,
            "tagId": topic_id,
            "metaUrl": META_URL,
            "locale": LOCALE,
        });
        self.query_url(LIST_OPERATION, &variables, credential.as_str())
    }

    fn detail_url(&self, entry_id: &str) -> String {
        let variables = json!({
            "locale": LOCALE,
            "id_hash": entry_id,
        });
        self.query_url(DETAIL_OPERATION, &variables, DETAIL_QUERY_HASH)
    }

    async fn post(&self, url: &str) -> Result<(reqwest::StatusCode, String), ApiError> {
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::from_transport)?;
        Ok((status, body))
    }
}

#[async_trait]
impl NewswireApi for GraphClient {
    async fn list_entries(
        &self,
        topic_id: Option<u32>,
        page: u32,
        credential: &Credential,
    ) -> Result<Vec<Entry>, ApiError> {
        let url = self.list_url(topic_id, page, credential);
        let (status, body) = self.post(&url).await?;

        if status.is_success() {
            return parse_list_response(&body);
        }

        // Some gateways report the stale query with an error status
        match parse_list_response(&body) {
            Err(ApiError::StaleCredential) => Err(ApiError::StaleCredential),
            _ => Err(ApiError::Status {
                status: status.as_u16(),
                message: body,
            }),
        }
    }

    async fn get_entry_detail(&self, entry_id: &str) -> Option<EntryDetail> {
        let url = self.detail_url(entry_id);
        match self.post(&url).await {
            Ok((status, body)) if status.is_success() => parse_detail_response(&body),
            Ok((status, _)) => {
                tracing::warn!("Detail request for entry {} returned {}", entry_id, status);
                None
            }
            Err(e) => {
                tracing::warn!("Detail request for entry {} failed: {}", entry_id, e);
                None
            }
        }
    }
}

/// Response types from the content API
#[derive(Deserialize)]
struct GraphResponse<T> {
    data: Option<T>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    errors: Vec<GraphError>,
}

#[derive(Deserialize)]
struct GraphError {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct PostsData {
    posts: Option<Posts>,
}

#[derive(Deserialize)]
struct Posts {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    results: Vec<PostSummary>,
}

#[derive(Deserialize)]
struct PostSummary {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    title: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    url: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    created: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    primary_tags: Vec<PostTag>,
    preview_images_parsed: Option<PreviewImages>,
}

#[derive(Deserialize)]
struct PostTag {
    name: String,
}

#[derive(Deserialize)]
struct PreviewImages {
    newswire_block: Option<NewswireBlock>,
}

#[derive(Deserialize)]
struct NewswireBlock {
    d16x9: Option<String>,
}

impl From<PostSummary> for Entry {
    fn from(p: PostSummary) -> Self {
        Entry {
            id: p.id,
            title: p.title,
            url: p.url,
            created: p.created,
            tags: p.primary_tags.into_iter().map(|t| t.name).collect(),
            preview_image: p
                .preview_images_parsed
                .and_then(|i| i.newswire_block)
                .and_then(|b| b.d16x9)
                .filter(|url| !url.is_empty()),
        }
    }
}

#[derive(Deserialize)]
struct PostData {
    post: Option<PostDetail>,
}

#[derive(Deserialize)]
struct PostDetail {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    title: String,
    subtitle: Option<String>,
    tina: Option<Tina>,
}

#[derive(Deserialize)]
struct Tina {
    payload: Option<TinaPayload>,
}

#[derive(Deserialize)]
struct TinaPayload {
    content: Option<ContentNode>,
    meta: Option<TinaMeta>,
}

#[derive(Deserialize)]
struct TinaMeta {
    subtitle: Option<String>,
}

impl From<PostDetail> for EntryDetail {
    fn from(p: PostDetail) -> Self {
        let payload = p.tina.and_then(|t| t.payload);
        let meta_subtitle = payload
            .as_ref()
            .and_then(|pl| pl.meta.as_ref())
            .and_then(|m| m.subtitle.clone());

        EntryDetail {
            title: p.title,
            subtitle: p
                .subtitle
                .filter(|s| !s.is_empty())
                .or(meta_subtitle)
                .filter(|s| !s.is_empty()),
            content: payload.and_then(|pl| pl.content),
        }
    }
}

/// Helper to deserialize null as default (empty vec, empty string)
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Entry ids arrive as numbers from some endpoints and strings from others
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "unexpected entry id: {}",
            other
        ))),
    }
}

/// Interpret a list response body.
///
/// Only an error payload with null data whose first message is
/// `PersistedQueryNotFound` counts as a stale credential.
pub(crate) fn parse_list_response(body: &str) -> Result<Vec<Entry>, ApiError> {
    let response: GraphResponse<PostsData> =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    if let Some(first) = response.errors.first() {
        if response.data.is_none() && first.message == STALE_QUERY_MESSAGE {
            return Err(ApiError::StaleCredential);
        }
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(ApiError::Upstream(messages.join("; ")));
    }

    response
        .data
        .and_then(|d| d.posts)
        .map(|posts| posts.results.into_iter().map(Entry::from).collect())
        .ok_or_else(|| ApiError::Deserialization("response carried no posts".to_string()))
}

/// Interpret a detail response body; anything unusable is `None`
pub(crate) fn parse_detail_response(body: &str) -> Option<EntryDetail> {
    match serde_json::from_str::<GraphResponse<PostData>>(body) {
        Ok(response) => response.data.and_then(|d| d.post).map(EntryDetail::from),
        Err(e) => {
            tracing::warn!("Unreadable detail response: {}", e);
            None
        }
    }
}
