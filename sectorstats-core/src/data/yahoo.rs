//! Yahoo Finance data provider.
//!
//! Fetches daily closes and split history from Yahoo's v8 chart API.
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; parse failures surface as `DataError::ResponseFormatChanged`.
//!
//! Timestamps are converted to exchange-local calendar dates using the
//! `gmtoffset` the API reports for the listing, then the offset is dropped.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, SplitRecord};
use crate::domain::PricePoint;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Upper bound on a single retry delay.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
    events: Option<Events>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct Events {
    splits: Option<HashMap<String, SplitData>>,
}

#[derive(Debug, Deserialize)]
struct SplitData {
    date: i64,
    numerator: f64,
    denominator: f64,
}

/// Provider settings.
#[derive(Debug, Clone)]
pub struct YahooSettings {
    pub timeout: Duration,
    /// Extra attempts after the first failed request.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for YahooSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 0,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
/// capped at [`MAX_BACKOFF`].
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    2u32.checked_pow(attempt.saturating_sub(1))
        .and_then(|factor| base.checked_mul(factor))
        .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    settings: YahooSettings,
    /// Latched on HTTP 403; every later request fails fast.
    blocked: AtomicBool,
}

impl YahooProvider {
    pub fn new(settings: YahooSettings) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            settings,
            blocked: AtomicBool::new(false),
        })
    }

    /// Chart URL for daily closes over `[start, end)`.
    fn closes_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end.and_time(NaiveTime::MIN).and_utc().timestamp();
        format!("{BASE_URL}/{symbol}?period1={start_ts}&period2={end_ts}&interval=1d")
    }

    /// Chart URL carrying the full split history. Monthly bars keep the payload small.
    fn splits_url(symbol: &str) -> String {
        format!("{BASE_URL}/{symbol}?range=max&interval=1mo&events=split")
    }

    fn first_result(symbol: &str, resp: ChartResponse) -> Result<ChartData, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))
    }

    fn local_date(ts: i64, gmtoffset: i64) -> Result<NaiveDate, DataError> {
        chrono::DateTime::from_timestamp(ts + gmtoffset, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))
    }

    /// Parse a chart response body into close observations.
    fn parse_closes(symbol: &str, body: &str) -> Result<Vec<PricePoint>, DataError> {
        let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;
        let data = Self::first_result(symbol, resp)?;
        let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        // No timestamps means no trading days in range.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let closes = data
            .indicators
            .and_then(|i| i.quote.into_iter().next())
            .map(|q| q.close)
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut points = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            // Holidays and halted sessions come back as null closes.
            let Some(close) = closes.get(i).copied().flatten() else {
                continue;
            };
            points.push(PricePoint::new(Self::local_date(ts, offset)?, close));
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    /// Parse a chart response body into split records, ordered by date.
    fn parse_splits(symbol: &str, body: &str) -> Result<Vec<SplitRecord>, DataError> {
        let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse splits for {symbol}: {e}"))
        })?;
        let data = Self::first_result(symbol, resp)?;
        let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        let raw = data.events.and_then(|e| e.splits).unwrap_or_default();
        let mut splits = Vec::with_capacity(raw.len());
        for split in raw.into_values() {
            if split.denominator == 0.0 {
                return Err(DataError::ResponseFormatChanged(format!(
                    "split with zero denominator for {symbol}"
                )));
            }
            splits.push(SplitRecord {
                date: Self::local_date(split.date, offset)?,
                ratio: split.numerator / split.denominator,
            });
        }
        splits.sort_by_key(|s| s.date);
        Ok(splits)
    }

    /// GET `url` and return the body, retrying transient failures.
    fn get_with_retry(&self, symbol: &str, url: &str) -> Result<String, DataError> {
        if self.blocked.load(Ordering::Relaxed) {
            return Err(DataError::CircuitBreakerTripped);
        }

        let mut last_error = None;
        for attempt in 0..=self.settings.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.settings.base_delay, attempt);
                tracing::info!(symbol, attempt, ?delay, "retrying request");
                std::thread::sleep(delay);
            }

            let resp = match self.client.get(url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();
            if status == reqwest::StatusCode::FORBIDDEN {
                self.blocked.store(true, Ordering::Relaxed);
                return Err(DataError::CircuitBreakerTripped);
            }
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(DataError::AuthenticationRequired(
                    "Yahoo Finance requires authentication".into(),
                ));
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }
            if !status.is_success() {
                last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }

            return resp
                .text()
                .map_err(|e| DataError::NetworkUnreachable(e.to_string()));
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let body = self.get_with_retry(symbol, &Self::closes_url(symbol, start, end))?;
        let points = Self::parse_closes(symbol, &body)?;
        tracing::debug!(symbol, rows = points.len(), "fetched closes");
        Ok(FetchResult {
            symbol: symbol.to_string(),
            points,
            source: DataSource::YahooFinance,
        })
    }

    fn fetch_splits(&self, symbol: &str) -> Result<Vec<SplitRecord>, DataError> {
        let body = self.get_with_retry(symbol, &Self::splits_url(symbol))?;
        Self::parse_splits(symbol, &body)
    }

    fn is_available(&self) -> bool {
        !self.blocked.load(Ordering::Relaxed)
    }
}
