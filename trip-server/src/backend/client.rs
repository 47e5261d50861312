//! HTTP client for the trip backend.
//!
//! Covers the three collaborators the planner needs: the places catalogue,
//! trip storage (GET/PUT) and per-city daily weather.

use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{Trip, Weather};
use crate::search::{DEFAULT_PAGE_SIZE, SearchPage, SearchPaging, SearchTicket};

use super::convert::{search_page_from_response, trip_from_dto, weather_from_dto};
use super::error::BackendError;
use super::types::{PlacesResponse, TripDto, TripUpdate, WeatherDto};

/// Default base URL for a locally running backend.
const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend, without a trailing slash
    pub base_url: String,
    /// Bearer token sent with every request
    pub api_token: Option<String>,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Places requested per search page
    pub page_size: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl BackendConfig {
    /// Create a config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the search page size.
    pub fn with_page_size(mut self, n: u32) -> Self {
        self.page_size = n;
        self
    }

    /// Paging settings for candidate pools fed by this backend.
    pub fn paging(&self) -> SearchPaging {
        SearchPaging {
            page_size: self.page_size,
        }
    }
}

/// Backend HTTP client.
///
/// Uses a semaphore to limit concurrent requests, so a burst of per-day
/// weather lookups cannot flood the backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl HttpBackend {
    /// Create a new client with the given configuration.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                BackendError::ApiError {
                    status: 0,
                    message: "Invalid API token format".to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Send a request and return the body of a successful response.
    ///
    /// `what` names the resource for `NotFound` errors.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        what: impl FnOnce() -> String,
    ) -> Result<String, BackendError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| BackendError::ApiError {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(BackendError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::RateLimited);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(what()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }

    /// Fetch one page of catalogue search results for a ticket.
    pub async fn search_places(&self, ticket: &SearchTicket) -> Result<SearchPage, BackendError> {
        let url = format!("{}/api/places", self.base_url);

        let mut params = vec![
            ("page", ticket.page.to_string()),
            ("limit", ticket.limit.to_string()),
        ];
        if let Some(text) = &ticket.query.text {
            params.push(("search", text.clone()));
        }
        if let Some(category) = &ticket.query.category {
            params.push(("category", category.clone()));
        }
        if let Some(city) = &ticket.query.city {
            params.push(("city", city.clone()));
        }

        debug!(seq = ticket.seq, page = ticket.page, "searching places");
        let body = self
            .send(self.http.get(&url).query(&params), || "places".to_string())
            .await?;

        let response: PlacesResponse =
            serde_json::from_str(&body).map_err(|e| BackendError::json(&e, &body))?;

        Ok(search_page_from_response(&response))
    }

    /// Load a trip with its days and visits.
    pub async fn get_trip(&self, id: &str) -> Result<Trip, BackendError> {
        let url = format!("{}/api/trips/{}", self.base_url, id);
        let body = self
            .send(self.http.get(&url), || format!("trip {id}"))
            .await?;

        let dto: TripDto = serde_json::from_str(&body).map_err(|e| BackendError::json(&e, &body))?;

        trip_from_dto(&dto).map_err(|e| BackendError::Json {
            message: e.to_string(),
            body: None,
        })
    }

    /// Save a trip.
    pub async fn put_trip(&self, id: &str, update: &TripUpdate) -> Result<(), BackendError> {
        let url = format!("{}/api/trips/{}", self.base_url, id);
        self.send(self.http.put(&url).json(update), || format!("trip {id}"))
            .await?;
        Ok(())
    }

    /// Weather for a city on a date, or `None` when the backend has none.
    pub async fn get_weather(
        &self,
        city_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Weather>, BackendError> {
        let url = format!("{}/api/cities/{}/weather", self.base_url, city_id);
        let result = self
            .send(
                self.http
                    .get(&url)
                    .query(&[("date", date.format("%Y-%m-%d").to_string())]),
                || format!("weather for city {city_id} on {date}"),
            )
            .await;

        let body = match result {
            Ok(body) => body,
            Err(BackendError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }

        let dto: WeatherDto =
            serde_json::from_str(&body).map_err(|e| BackendError::json(&e, &body))?;
        Ok(Some(weather_from_dto(&dto)))
    }
}
