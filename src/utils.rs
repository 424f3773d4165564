use rand::Rng;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::time::Duration;

pub fn build_client(timeout: Duration) -> crate::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(crate::UA)
        .timeout(timeout)
        .gzip(true)
        .build()?;
    Ok(client)
}

/// Container id for a dashboard created without one:
/// `zestra-dashboard-<unix millis>-<9 alphanumerics>`.
pub fn gen_dashboard_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!(
        "zestra-dashboard-{}-{}",
        chrono::Utc::now().timestamp_millis(),
        suffix.to_lowercase()
    )
}
