use super::{RawTimestamp, SeriesPoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ustr::Ustr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

/// Envelope every AJAX action answers with.
#[derive(Debug, Clone, Deserialize)]
pub struct AjaxResponse<T> {
    pub status: ResponseStatus,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> AjaxResponse<T> {
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IndicatorRef {
    #[serde(default)]
    pub name: String,
    pub slug: Ustr,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorData {
    pub indicator: IndicatorRef,
    #[serde(default)]
    pub series: Vec<SeriesPoint>,
    #[serde(
        default,
        alias = "last_update",
        deserialize_with = "deserialize_last_update"
    )]
    pub last_update: Option<DateTime<Utc>>,
}

fn deserialize_last_update<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawTimestamp> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| {
        let parsed = raw.resolve();
        if parsed.is_none() {
            tracing::warn!("ignoring unparseable lastUpdate");
        }
        parsed
    }))
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LlmAnswer {
    pub text: String,
}

/// Form fields of an LLM query. Prompt text is built by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, bon::Builder)]
pub struct LlmPrompt {
    #[builder(into)]
    pub system_prompt: String,
    #[builder(into)]
    pub user_query: String,
    #[builder(default)]
    pub use_external_search: bool,
}
