//! HTTP client for the skin backend, plus the boundary adapter that maps every
//! response shape into the canonical [`SkinListing`].
//!
//! `/search` records carry `sell_price_text` / `sell_listings`, while the
//! optimizer and loadout endpoints send `price` / `listings`, sometimes as a
//! preformatted string and sometimes as a number. Everything past this module
//! only sees `SkinListing`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::{BudgetReport, Loadout, LoadoutRequest, SkinListing};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumOrText {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListing {
    #[serde(default)]
    pub name: String,
    pub sell_price_text: Option<String>,
    pub price: Option<NumOrText>,
    pub sell_listings: Option<NumOrText>,
    pub listings: Option<NumOrText>,
    pub icon_url: Option<String>,
    pub market_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawListing>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct OptimizeRequest<'a> {
    budget: f64,
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct OptimizeResponse {
    #[serde(default)]
    skins: Vec<RawListing>,
    budget: Option<f64>,
    total_spent: Option<f64>,
    remaining: Option<f64>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSlots {
    primary: Option<Vec<RawListing>>,
    secondary: Option<Vec<RawListing>>,
    knife: Option<Vec<RawListing>>,
    gloves: Option<Vec<RawListing>>,
}

#[derive(Debug, Deserialize)]
struct LoadoutResponse {
    #[serde(default)]
    slots: RawSlots,
    error: Option<String>,
}

/// Body of the backend's `GET /health`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Boundary adapter
// ---------------------------------------------------------------------------

impl From<RawListing> for SkinListing {
    fn from(raw: RawListing) -> Self {
        // the numeric price always follows whichever field supplied the text
        let (price_text, price) = match raw.sell_price_text.filter(|s| !s.trim().is_empty()) {
            Some(text) => {
                let price = parse_price_text(&text);
                (text, price)
            }
            None => match raw.price {
                Some(NumOrText::Number(n)) => (format!("${n:.2}"), Some(n)),
                Some(NumOrText::Text(text)) if !text.trim().is_empty() => {
                    let price = parse_price_text(&text);
                    (text, price)
                }
                _ => (String::new(), None),
            },
        };

        let listings = raw
            .sell_listings
            .as_ref()
            .and_then(count_of)
            .or_else(|| raw.listings.as_ref().and_then(count_of));

        SkinListing {
            name: raw.name,
            price_text,
            price,
            listings,
            icon_url: raw.icon_url,
            market_url: raw.market_url,
        }
    }
}

fn count_of(c: &NumOrText) -> Option<u64> {
    match c {
        NumOrText::Number(n) if *n >= 0.0 => Some(n.round() as u64),
        NumOrText::Number(_) => None,
        NumOrText::Text(s) => {
            let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        }
    }
}

/// Dollar value of a display price such as `$1,234.50` or `1.23 USD`.
/// Everything except digits and `.` is dropped; a second `.` ends the number.
pub fn parse_price_text(s: &str) -> Option<f64> {
    let kept: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    let number = match kept.match_indices('.').nth(1) {
        Some((second_dot, _)) => &kept[..second_dot],
        None => kept.as_str(),
    };
    number.parse().ok()
}

pub fn adapt_all(raw: Vec<RawListing>) -> Vec<SkinListing> {
    raw.into_iter().map(SkinListing::from).collect()
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /search`. Results come back in server relevance order.
    pub async fn search(&self, query: &str, min_price: f64, max_price: f64) -> Result<Vec<SkinListing>> {
        let url = format!("{}/search", self.base_url);
        let min = min_price.to_string();
        let max = max_price.to_string();
        debug!(query, min = %min, max = %max, "search request");

        let resp = self
            .http
            .get(&url)
            .query(&[("q", query), ("min", min.as_str()), ("max", max.as_str())])
            .send()
            .await?;
        let body: SearchResponse = read_json(resp).await?;

        if let Some(err) = body.error {
            return Err(AppError::Server(err));
        }
        info!(query, results = body.results.len(), "search complete");
        Ok(adapt_all(body.results))
    }

    /// `POST /budget/optimize`.
    pub async fn optimize_budget(&self, budget: f64, query: &str) -> Result<BudgetReport> {
        let url = format!("{}/budget/optimize", self.base_url);
        debug!(budget, query, "optimize request");

        let resp = self
            .http
            .post(&url)
            .json(&OptimizeRequest { budget, query })
            .send()
            .await?;
        let body: OptimizeResponse = read_json(resp).await?;

        if let Some(err) = body.error {
            return Err(AppError::Server(err));
        }
        info!(budget, query, skins = body.skins.len(), "optimize complete");
        Ok(BudgetReport {
            skins: adapt_all(body.skins),
            budget: body.budget.unwrap_or(budget),
            total_spent: body.total_spent,
            remaining: body.remaining,
        })
    }

    /// `POST /loadout/build`.
    pub async fn build_loadout(&self, req: &LoadoutRequest) -> Result<Loadout> {
        let url = format!("{}/loadout/build", self.base_url);
        debug!(side = %req.side, total = req.total(), "loadout request");

        let resp = self.http.post(&url).json(req).send().await?;
        let body: LoadoutResponse = read_json(resp).await?;

        if let Some(err) = body.error {
            return Err(AppError::Server(err));
        }
        let slots = body.slots;
        let loadout = Loadout {
            primary: slots.primary.map(adapt_all),
            secondary: slots.secondary.map(adapt_all),
            knife: slots.knife.map(adapt_all),
            gloves: slots.gloves.map(adapt_all),
        };
        info!(side = %req.side, "loadout complete");
        Ok(loadout)
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        let resp = self.http.get(&url).send().await?;
        read_json(resp).await
    }
}

/// The body is parsed whatever the status code; error payloads carry an `error` field.
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    match serde_json::from_slice(&bytes) {
        Ok(v) => Ok(v),
        Err(e) => {
            warn!(%status, bytes = bytes.len(), "backend response was not the expected JSON: {e}");
            Err(AppError::Json(e))
        }
    }
}
