use crate::{
    Error, Result,
    config::{DEFAULT_DATA_ACTION, DEFAULT_LLM_ACTION, DashboardConfig},
    models::{AjaxResponse, IndicatorData, LlmAnswer, LlmPrompt, NamedSeries},
    utils::build_client,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;
use ustr::Ustr;

pub mod retry;

pub use retry::{AttemptBackoff, RetryPolicy, retry_transient};

/// The two AJAX actions a dashboard depends on.
#[async_trait]
pub trait DashboardBackend: Send + Sync {
    /// Full series for `slug`. Errors or empty series are `FetchFailure`.
    async fn fetch_indicator(&self, slug: Ustr) -> Result<NamedSeries>;

    /// Answer text for a prompt built by the caller.
    async fn query_llm(&self, prompt: &LlmPrompt) -> Result<String>;
}

/// Client for the WordPress `admin-ajax.php` contract.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    endpoint: Url,
    nonce: String,
    data_action: String,
    llm_action: String,
    llm_retry: RetryPolicy,
}

#[bon::bon]
impl DashboardClient {
    #[builder]
    pub fn new(
        endpoint: Url,
        #[builder(into)] nonce: String,
        #[builder(default = Duration::from_secs(30))] timeout: Duration,
        #[builder(into, default = DEFAULT_DATA_ACTION.to_string())] data_action: String,
        #[builder(into, default = DEFAULT_LLM_ACTION.to_string())] llm_action: String,
        #[builder(default)] llm_retry: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            endpoint,
            nonce,
            data_action,
            llm_action,
            llm_retry,
        })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        Self::builder()
            .endpoint(config.ajax_url.clone())
            .nonce(config.resolve_nonce()?)
            .timeout(config.request_timeout())
            .data_action(config.data_action.clone())
            .llm_action(config.llm.action.clone())
            .llm_retry(config.llm.retry_policy())
            .build()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post<T: DeserializeOwned>(&self, form: &[(&str, &str)]) -> Result<AjaxResponse<T>> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn query_llm_once(&self, prompt: &LlmPrompt) -> Result<String> {
        let use_search = if prompt.use_external_search { "1" } else { "0" };
        let response: AjaxResponse<LlmAnswer> = self
            .post(&[
                ("action", self.llm_action.as_str()),
                ("nonce", self.nonce.as_str()),
                ("system_prompt", prompt.system_prompt.as_str()),
                ("user_query", prompt.user_query.as_str()),
                ("use_google_search", use_search),
            ])
            .await?;

        if response.is_success() {
            if let Some(answer) = response.data {
                return Ok(answer.text);
            }
        }
        Err(Error::LlmRejected(response.message.unwrap_or_else(|| {
            "llm server response format is invalid".to_string()
        })))
    }
}

#[async_trait]
impl DashboardBackend for DashboardClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_indicator(&self, slug: Ustr) -> Result<NamedSeries> {
        let response: AjaxResponse<IndicatorData> = self
            .post(&[
                ("action", self.data_action.as_str()),
                ("nonce", self.nonce.as_str()),
                ("slug", slug.as_str()),
            ])
            .await
            .map_err(|e| Error::fetch_failure(slug, e.with_causes()))?;

        if !response.is_success() {
            let reason = response
                .message
                .unwrap_or_else(|| "backend reported an error".to_string());
            return Err(Error::fetch_failure(slug, reason));
        }
        let Some(data) = response.data else {
            return Err(Error::fetch_failure(slug, "response has no data"));
        };
        if data.series.is_empty() {
            return Err(Error::fetch_failure(slug, "empty series"));
        }

        let series = NamedSeries::from(data);
        debug!("fetched {} with {} points", series.slug, series.full().len());
        Ok(series)
    }

    #[tracing::instrument(skip(self, prompt), fields(search = prompt.use_external_search))]
    async fn query_llm(&self, prompt: &LlmPrompt) -> Result<String> {
        retry_transient(self.llm_retry, move || self.query_llm_once(prompt)).await
    }
}
