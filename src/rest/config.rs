use url::Url;

use crate::error::Error;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1/";

/// Identity-toolkit REST configuration.
///
/// The API key is a constructor parameter. Everything else has a default and a
/// `with_*` override.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct RestConfig {
    pub(crate) api_key: String,
    pub(crate) base_url: Url,
}

impl RestConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.parse().expect("valid default URL"),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `IDENTITY_API_KEY`: project API key sent as the `key` query parameter
    ///
    /// # Optional env vars
    /// - `IDENTITY_BASE_URL`: override the API root (e.g. a local emulator)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the key is missing or the URL is invalid.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("IDENTITY_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("IDENTITY_API_KEY is required".into()))?;

        let mut config = Self::new(api_key);

        if let Ok(url_str) = std::env::var("IDENTITY_BASE_URL") {
            let url: Url = url_str
                .parse()
                .map_err(|e| Error::Config(format!("IDENTITY_BASE_URL: {e}")))?;
            config = config.with_base_url(url);
        }

        Ok(config)
    }

    /// Override the API root. A trailing `/` is added if missing so endpoint
    /// names resolve beneath it.
    #[must_use]
    pub fn with_base_url(mut self, mut url: Url) -> Self {
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        self
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for an `accounts:*` method, API key included.
    pub(crate) fn endpoint(&self, method: &str) -> Result<Url, Error> {
        let mut url = self
            .base_url
            .join(&format!("./accounts:{method}"))
            .map_err(|e| Error::Config(format!("endpoint {method}: {e}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}
