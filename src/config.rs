// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Base URLs, endpoint paths, and limits used by connections.
//!
//! Every URL a connection touches is assembled from these values, so pointing the client at a
//! different host (a proxy, a mock server) is a matter of changing `base_url` and
//! `base_upload_url`. The defaults target the public Twitter API.
//!
//! Values can be read and written by key with `get` and `set`, and loaded from a JSON document of
//! key/value pairs with `from_json` or `load`. Keys are case-insensitive, so `BASE_URL` and
//! `base_url` name the same value. Asking for a key that doesn't exist fails with
//! `InvalidConfigKey`.
//!
//! ```
//! use twitter_connect::Config;
//!
//! let config = Config::from_json(r#"{ "BASE_URL": "http://localhost:8080/", "max_media_ids": 2 }"#)
//!     .unwrap();
//!
//! assert_eq!(config.get("base_url").unwrap(), "http://localhost:8080/");
//! assert_eq!(config.max_media_ids, 2);
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{self, Error::*};

/// The set of values used to build requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the REST API, e.g. `https://api.twitter.com/`.
    pub base_url: String,
    /// Root of the media upload API, e.g. `https://upload.twitter.com/`.
    pub base_upload_url: String,
    /// The API version prepended to every versioned endpoint, e.g. `1.1`.
    pub api_version: String,
    /// Path (under `base_url`) of the bearer token exchange.
    pub oauth2_token: String,
    /// Path (under `base_url`) used to invalidate a bearer token.
    pub oauth2_invalidate_token: String,
    /// Versioned path of the OAuth request token endpoint.
    pub oauth_request_token: String,
    /// Path (under `base_url`) of the page users sign in on.
    pub oauth_authenticate: String,
    /// Versioned path of the OAuth access token endpoint.
    pub oauth_access_token: String,
    /// The most media files that can be uploaded for a single tweet.
    pub max_media_ids: usize,
    /// Seconds to wait on a single request before giving up. Never zero.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            base_url: "https://api.twitter.com/".to_string(),
            base_upload_url: "https://upload.twitter.com/".to_string(),
            api_version: "1.1".to_string(),
            oauth2_token: "oauth2/token".to_string(),
            oauth2_invalidate_token: "oauth2/invalidate_token".to_string(),
            oauth_request_token: "oauth/request_token".to_string(),
            oauth_authenticate: "oauth/authenticate".to_string(),
            oauth_access_token: "oauth/access_token".to_string(),
            max_media_ids: 4,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Loads a configuration from a JSON object of key/value pairs. Keys that aren't present keep
    /// their default value.
    pub fn from_json(text: &str) -> error::Result<Config> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(text)?;
        let mut config = Config::default();

        for (key, value) in raw {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            config.set(&key, value)?;
        }

        Ok(config)
    }

    /// Loads a configuration from the JSON file at the given path.
    pub fn load(path: impl AsRef<Path>) -> error::Result<Config> {
        let text = std::fs::read_to_string(path)?;
        Config::from_json(&text)
    }

    /// Looks up the value for the given key, rendered as a string.
    pub fn get(&self, key: &str) -> error::Result<String> {
        let value = match key.to_ascii_lowercase().as_str() {
            "base_url" => self.base_url.clone(),
            "base_upload_url" => self.base_upload_url.clone(),
            "api_version" => self.api_version.clone(),
            "oauth2_token" => self.oauth2_token.clone(),
            "oauth2_invalidate_token" => self.oauth2_invalidate_token.clone(),
            "oauth_request_token" => self.oauth_request_token.clone(),
            "oauth_authenticate" => self.oauth_authenticate.clone(),
            "oauth_access_token" => self.oauth_access_token.clone(),
            "max_media_ids" => self.max_media_ids.to_string(),
            "timeout_secs" => self.timeout_secs.to_string(),
            _ => return Err(InvalidConfigKey(key.to_string())),
        };

        Ok(value)
    }

    /// Sets the value for the given key. Numeric keys must parse as unsigned integers, and
    /// `timeout_secs` must be at least 1.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> error::Result<()> {
        let value = value.into();
        match key.to_ascii_lowercase().as_str() {
            "base_url" => self.base_url = value,
            "base_upload_url" => self.base_upload_url = value,
            "api_version" => self.api_version = value,
            "oauth2_token" => self.oauth2_token = value,
            "oauth2_invalidate_token" => self.oauth2_invalidate_token = value,
            "oauth_request_token" => self.oauth_request_token = value,
            "oauth_authenticate" => self.oauth_authenticate = value,
            "oauth_access_token" => self.oauth_access_token = value,
            "max_media_ids" => {
                self.max_media_ids = value
                    .parse()
                    .map_err(|_| InvalidConfigValue("max_media_ids", value))?
            }
            "timeout_secs" => {
                self.timeout_secs = value
                    .parse()
                    .ok()
                    .filter(|&secs: &u64| secs > 0)
                    .ok_or(InvalidConfigValue("timeout_secs", value))?
            }
            _ => return Err(InvalidConfigKey(key.to_string())),
        }

        Ok(())
    }

    /// The per-request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Prepends the configured API version to the given endpoint path.
    pub fn versioned_endpoint(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.api_version.trim_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::load_file;
    use crate::error::Error;

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.get("base_url").unwrap(), "https://api.twitter.com/");
        assert_eq!(config.get("MAX_MEDIA_IDS").unwrap(), "4");
        assert_eq!(config.versioned_endpoint("users/show.json"), "1.1/users/show.json");
    }

    #[test]
    fn unknown_key() {
        match Config::default().get("base_uri") {
            Err(Error::InvalidConfigKey(key)) => assert_eq!(key, "base_uri"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn load_payload() {
        let config = Config::from_json(&load_file("sample_payloads/config.json")).unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/");
        assert_eq!(config.base_upload_url, "http://localhost:8081/");
        assert_eq!(config.api_version, "2");
        assert_eq!(config.max_media_ids, 4);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.oauth_authenticate, "oauth/authenticate");
    }

    #[test]
    fn unknown_key_in_document() {
        let err = Config::from_json(r#"{ "base_url": "x", "endpoint": "y" }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigKey(ref key) if key == "endpoint"));
    }

    #[test]
    fn bad_number() {
        let mut config = Config::default();
        let err = config.set("max_media_ids", "four").unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue("max_media_ids", _)));
        assert_eq!(config.max_media_ids, 4);
    }

    #[test]
    fn zero_timeout() {
        let mut config = Config::default();
        let err = config.set("TIMEOUT_SECS", "0").unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue("timeout_secs", ref v) if v == "0"));
        assert_eq!(config.timeout_secs, 30);

        let err = Config::from_json(r#"{ "timeout_secs": 0 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue("timeout_secs", _)));
    }
}
