//! Client configuration.
//!
//! Values come from CLI flags with `VELITHRA_*` environment fallbacks (see
//! [`crate::cli`]); this module only validates and normalizes them.

use std::path::PathBuf;

use chrono::Duration;
use reqwest::Url;

use velithra_auth::RouteMatching;
use velithra_core::FileStorage;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_MODULE_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    pub data_dir: PathBuf,
    pub module_ttl: Duration,
    /// How role UI route prefixes are compared against routes.
    pub route_matching: RouteMatching,
}

impl ClientConfig {
    pub fn resolve(
        api_url: &str,
        data_dir: Option<PathBuf>,
        module_ttl_secs: u64,
    ) -> Result<Self, ConfigError> {
        let api_url = normalize_api_url(api_url)?;

        let module_ttl = i64::try_from(module_ttl_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds)
            .ok_or(ConfigError::InvalidTtl(module_ttl_secs))?;

        let data_dir = match data_dir {
            Some(dir) => dir,
            None => FileStorage::default_dir()?,
        };

        Ok(Self {
            api_url,
            data_dir,
            module_ttl,
            route_matching: RouteMatching::default(),
        })
    }

    pub fn with_route_matching(mut self, route_matching: RouteMatching) -> Self {
        self.route_matching = route_matching;
        self
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("base URL must not carry a query or fragment"));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_defaults_with_explicit_dir() {
        let config = ClientConfig::resolve(
            DEFAULT_API_URL,
            Some(PathBuf::from("/tmp/velithra")),
            DEFAULT_MODULE_TTL_SECS,
        )
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/velithra"));
        assert_eq!(config.module_ttl.num_milliseconds(), 300_000);
        assert_eq!(config.route_matching, RouteMatching::Segment);
    }

    #[test]
    fn route_matching_can_be_relaxed() {
        let config = ClientConfig::resolve(DEFAULT_API_URL, Some(PathBuf::from("d")), 60)
            .unwrap()
            .with_route_matching(RouteMatching::Raw);
        assert_eq!(config.route_matching, RouteMatching::Raw);
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config =
            ClientConfig::resolve("https://api.velithra.io/v2/", Some(PathBuf::from("d")), 60).unwrap();
        assert_eq!(config.api_url, "https://api.velithra.io/v2");
    }

    #[test]
    fn rejects_bad_urls() {
        for raw in ["not a url", "ftp://files.velithra.io", "http://x.io/?a=1"] {
            let err = ClientConfig::resolve(raw, Some(PathBuf::from("d")), 60).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidUrl { .. }), "{raw}: {err}");
        }
    }

    #[test]
    fn rejects_zero_and_overflowing_ttl() {
        for secs in [0, u64::MAX] {
            let err = ClientConfig::resolve(DEFAULT_API_URL, Some(PathBuf::from("d")), secs).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTtl(s) if s == secs));
        }
    }
}
