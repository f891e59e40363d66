use std::{num::NonZeroU32, time::Duration};

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{
    Client, Url,
    header::{self, HeaderValue},
};
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use tracing::debug;

use crate::{
    config::Credentials,
    models::{Bar, BarSeries, BarsRequestParams},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidApiKeySnafu, InvalidBaseUrlSnafu,
        MissingEnvVarSnafu, ProviderError, ProviderInitError, ReqwestSnafu,
        alpaca_rest::{
            params::{MAX_PAGE_SIZE, construct_params, validate_params},
            response::AlpacaResponse,
        },
    },
};

const BARS_PATH: &str = "v2/stocks/bars";

/// Alpaca's documented request ceiling for the free data plan.
pub const DEFAULT_REQUESTS_PER_MINUTE: NonZeroU32 = nonzero!(200u32);

pub struct AlpacaProvider {
    client: Client,
    bars_url: Url,
    limiter: DefaultDirectRateLimiter,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads the API key, secret and base URL from the `API_KEY`, `API_SECRET`
    /// and `BASE_URL` environment variables.
    pub fn new() -> Result<Self, ProviderInitError> {
        let credentials = Credentials::from_env().context(MissingEnvVarSnafu)?;
        Self::with_credentials(credentials)
    }

    /// Creates a provider from credentials that were loaded up front.
    ///
    /// `base_url` is the market data host, e.g. `https://data.alpaca.markets`.
    pub fn with_credentials(credentials: Credentials) -> Result<Self, ProviderInitError> {
        let bars_url = bars_url(&credentials.base_url)?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            HeaderValue::from_str(credentials.api_key.expose_secret())
                .context(InvalidApiKeySnafu)?,
        );
        let mut secret = HeaderValue::from_str(credentials.api_secret.expose_secret())
            .context(InvalidApiKeySnafu)?;
        secret.set_sensitive(true);
        headers.insert("APCA-API-SECRET-KEY", secret);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            bars_url,
            limiter: RateLimiter::direct(Quota::per_minute(DEFAULT_REQUESTS_PER_MINUTE)),
            _api_key: credentials.api_key,
            _secret_key: credentials.api_secret,
        })
    }

    /// Replaces the client-side request quota shared by every page and chunk.
    pub fn with_quota(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.limiter = RateLimiter::direct(Quota::per_minute(requests_per_minute));
        self
    }

    pub fn bars_url(&self) -> &Url {
        &self.bars_url
    }
}

fn bars_url(base_url: &str) -> Result<Url, ProviderInitError> {
    let invalid = |message: String| {
        InvalidBaseUrlSnafu {
            url: base_url,
            message,
        }
        .build()
    };

    let mut base = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path".to_string()));
    }
    // `join` replaces the last segment unless the base ends with a slash.
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(BARS_PATH).map_err(|e| invalid(e.to_string()))
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    fn name(&self) -> &str {
        "alpaca_rest"
    }

    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        validate_params(&params)?;

        let cap = params.limit;
        let mut bars: Vec<Bar> = Vec::new();
        let mut next_page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page_size = cap.map_or(MAX_PAGE_SIZE, |c| c.saturating_sub(bars.len() as u32));
            let query = construct_params(&params, page_size, next_page_token.as_deref());

            self.limiter.until_ready().await;
            let response = self
                .client
                .get(self.bars_url.clone())
                .query(&query)
                .send()
                .await
                .context(ReqwestSnafu)?;

            let status = response.status();
            if !status.is_success() {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown API error".to_string());
                return ApiSnafu {
                    status: status.as_u16(),
                    message,
                }
                .fail();
            }

            let page = response
                .json::<AlpacaResponse>()
                .await
                .context(ReqwestSnafu)?;
            pages += 1;

            // Only one symbol is requested, but the endpoint keys by symbol.
            for (_, page_bars) in page.bars.unwrap_or_default() {
                bars.extend(page_bars.into_iter().map(Bar::from));
            }

            if let Some(cap) = cap {
                if bars.len() >= cap as usize {
                    bars.truncate(cap as usize);
                    break;
                }
            }

            match page.next_page_token {
                Some(token) => next_page_token = Some(token),
                None => break,
            }
        }

        debug!(
            symbol = %params.symbol,
            pages,
            bars = bars.len(),
            "alpaca bars request complete"
        );

        Ok(BarSeries {
            symbol: params.symbol,
            resolution: params.resolution,
            bars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(base_url: &str, key: &str) -> Credentials {
        Credentials {
            api_key: SecretString::from(key.to_string()),
            api_secret: SecretString::from("secret".to_string()),
            base_url: base_url.to_string(),
        }
    }

    #[test]
    fn bars_url_is_joined_onto_the_host() {
        let provider =
            AlpacaProvider::with_credentials(credentials("https://data.alpaca.markets", "key"))
                .unwrap();
        assert_eq!(
            provider.bars_url().as_str(),
            "https://data.alpaca.markets/v2/stocks/bars"
        );
    }

    #[test]
    fn bars_url_keeps_a_path_prefix() {
        let provider =
            AlpacaProvider::with_credentials(credentials("http://localhost:8080/proxy", "key"))
                .unwrap();
        assert_eq!(
            provider.bars_url().as_str(),
            "http://localhost:8080/proxy/v2/stocks/bars"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = AlpacaProvider::with_credentials(credentials("not a url", "key"))
            .err()
            .unwrap();
        assert!(matches!(err, ProviderInitError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn rejects_key_with_control_characters() {
        let err = AlpacaProvider::with_credentials(credentials(
            "https://data.alpaca.markets",
            "bad\nkey",
        ))
        .err()
        .unwrap();
        assert!(matches!(err, ProviderInitError::InvalidApiKey { .. }));
    }
}
