use crate::{Error, Result};
use core::time::Duration;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://forkify-api.herokuapp.com/api/v2/recipes/";
pub const DEFAULT_RESULTS_PER_PAGE: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BOOKMARKS_KEY: &str = "bookmarks";

/// Application settings.
///
/// Missing fields fall back to their defaults when deserialising.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
	/// Catalog collection URL. Single recipes live directly below it.
	pub api_url: Url,
	/// Sent as `key` query parameter when present. The catalog echoes it on recipes submitted with it.
	pub api_key: Option<String>,
	pub results_per_page: usize,
	pub timeout_secs: u64,
	/// Name of the durable storage slot that holds the serialised bookmarks.
	pub bookmarks_key: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			api_url: Url::parse(DEFAULT_API_URL).expect("valid default catalog URL"),
			api_key: None,
			results_per_page: DEFAULT_RESULTS_PER_PAGE,
			timeout_secs: DEFAULT_TIMEOUT_SECS,
			bookmarks_key: DEFAULT_BOOKMARKS_KEY.to_owned(),
		}
	}
}

impl Config {
	/// Parses and [validates](`Config::validate`) a JSON settings object.
	///
	/// # Errors
	///
	/// [`Error::Decode`] for malformed JSON, [`Error::Validation`] for unusable values.
	#[instrument(skip(json))]
	pub fn from_json(json: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	/// # Errors
	///
	/// [`Error::Validation`] if pagination or the request timeout could never work.
	pub fn validate(&self) -> Result<()> {
		if self.results_per_page == 0 {
			return Err(Error::Validation("results per page must be positive".to_owned()));
		}
		if self.timeout_secs == 0 {
			return Err(Error::Validation("request timeout must be positive".to_owned()));
		}
		if self.api_url.cannot_be_a_base() {
			return Err(Error::Validation(format!("catalog URL {} cannot be a base", self.api_url)));
		}
		Ok(())
	}

	#[must_use]
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}
}
