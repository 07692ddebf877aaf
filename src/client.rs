use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};

use crate::config::FetcherConfig;
use crate::error::{FetchError, RetrieveError};
use crate::models::{parse_rows, DayReport, RawResponse, Record};

/// Blocking client for the interval report of the analytics API.
///
/// Holds one connection pool; clone or share it across threads instead of
/// building a new one per call.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Fetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(config.connector_timeout())
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client, config })
    }

    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(FetcherConfig::default())
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// URL for one day's minute-resolution interval report.
    pub fn request_url(&self, day: &str, api_key: &str) -> Result<Url, FetchError> {
        let params = [
            ("pv", "interval"),
            ("rb", day),
            ("re", day),
            ("key", api_key),
            ("format", "json"),
            ("rs", "minute"),
        ];

        Url::parse_with_params(&self.config.data_url(), &params)
            .map_err(|e| FetchError::Client(format!("URL parse error: {}", e)))
    }

    /// Fetches and converts every five-minute record of `day` (`YYYY-MM-DD`).
    ///
    /// `day` is passed through unchecked. On a bad row the error carries
    /// the records converted before it.
    pub fn retrieve_day(&self, day: &str, api_key: &str) -> Result<Vec<Record>, RetrieveError> {
        self.retrieve_report(day, api_key).map(|report| report.records)
    }

    pub fn retrieve_date(
        &self,
        date: NaiveDate,
        api_key: &str,
    ) -> Result<Vec<Record>, RetrieveError> {
        let day = date.format("%Y-%m-%d").to_string();
        self.retrieve_day(&day, api_key)
    }

    /// Same as [`retrieve_day`](Self::retrieve_day) but keeps the `notes`
    /// and `row_headers` blobs of the response.
    pub fn retrieve_report(&self, day: &str, api_key: &str) -> Result<DayReport, RetrieveError> {
        let body = self.fetch_body(day, api_key)?;

        let raw: RawResponse = serde_json::from_str(&body)?;
        log::debug!("Decoded {} rows for {}", raw.rows.len(), day);

        let records = parse_rows(raw.rows)?;

        Ok(DayReport {
            notes: raw.notes,
            row_headers: raw.row_headers,
            records,
        })
    }

    fn fetch_body(&self, day: &str, api_key: &str) -> Result<String, FetchError> {
        let url = self.request_url(day, api_key)?;
        log::debug!("Requesting interval report for {}", day);

        let response = self.client.get(url).send()?;
        let status = response.status();
        let text = response.text()?;

        if status != StatusCode::OK {
            log::warn!("Interval report for {} failed ({}): {}", day, status, text);
            return Err(FetchError::BadStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}
