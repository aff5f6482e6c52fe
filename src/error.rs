// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A composite error type for errors that can occur while talking to Twitter.
//!
//! Most of the variants here come from the pieces this crate sits on top of: `hyper` for the
//! network, `serde_json` for token responses, `std::io` for reading media files. The rest describe
//! misuse that is caught before a request ever leaves the machine (`MissingBearerToken`,
//! `MediaUploadLimitExceeded`, `InvalidConfigKey`), or the status-code wrappers that media uploads
//! report (`ClientRequestFailed`, `ServerUnavailable`).
//!
//! Note that plain `get`/`post` calls never look at the status code of the response; a 404 from
//! one of those comes back as an `Ok` response for you to inspect.

use hyper::StatusCode;
use thiserror::Error;

use crate::common::RawResponse;

/// Convenient alias to a Result containing a local Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Represents the kinds of errors that can occur when calling the Twitter API.
#[derive(Debug, Error)]
pub enum Error {
    /// A credentials document named a credential kind that isn't `app` or `user`. The enclosed
    /// value is the kind that was given, or an empty string if none was.
    #[error("Invalid credentials type: {:?}", _0)]
    InvalidCredentialsType(String),
    /// A configuration key was requested or set that this crate doesn't know about.
    #[error("Invalid config key: {}", _0)]
    InvalidConfigKey(String),
    /// A configuration value couldn't be parsed for its key. The enclosed values are the key and
    /// the rejected value.
    #[error("Invalid value for config key {}: {:?}", _0, _1)]
    InvalidConfigValue(&'static str, String),
    /// An application-only call was attempted before a bearer token was loaded into the
    /// credentials.
    #[error("No bearer token is available for this connection")]
    MissingBearerToken,
    /// More files were given to a media upload than Twitter allows to be attached at once. No
    /// requests were made.
    #[error("Tried to upload {} media files, but the limit is {}", count, max)]
    MediaUploadLimitExceeded {
        /// The number of files that were given.
        count: usize,
        /// The configured `max_media_ids`.
        max: usize,
    },
    /// Twitter answered a media upload with a 4xx status. The full response is enclosed.
    #[error("Media upload was rejected: {}", _0)]
    ClientRequestFailed(RawResponse),
    /// Twitter answered a media upload with a 5xx status. The full response is enclosed.
    #[error("Twitter is unavailable: {}", _0)]
    ServerUnavailable(RawResponse),
    /// The response from Twitter returned a non-success status code. The enclosed value was the
    /// response code.
    #[error("Error status received: {}", _0)]
    BadStatus(StatusCode),
    /// The response from Twitter was formatted incorrectly or in an unexpected manner. The
    /// enclosed values are an explanatory string and, if applicable, the input that caused the
    /// error.
    #[error("Invalid response received: {} ({:?})", _0, _1)]
    InvalidResponse(&'static str, Option<String>),
    /// The response from Twitter was missing an expected value. The enclosed value was the
    /// expected parameter.
    #[error("Value missing from response: {}", _0)]
    MissingValue(&'static str),
    /// The web request experienced an error. The enclosed error was returned from hyper.
    #[error("Network error: {}", _0)]
    NetError(#[from] hyper::Error),
    /// A request couldn't be assembled from the given parts. The enclosed error was returned from
    /// the `http` crate.
    #[error("Invalid request: {}", _0)]
    HttpError(#[from] hyper::http::Error),
    /// The request didn't complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,
    /// An error was experienced while reading a file. The enclosed error was returned from libstd.
    #[error("IO error: {}", _0)]
    IOError(#[from] std::io::Error),
    /// An error occurred while loading the JSON response. The enclosed error was returned from
    /// `serde_json`.
    #[error("JSON deserialize error: {}", _0)]
    DeserializeError(#[from] serde_json::Error),
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Error {
        Error::Timeout
    }
}

impl Error {
    /// Returns the enclosed response if this error came from a media upload that Twitter
    /// rejected.
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            Error::ClientRequestFailed(resp) | Error::ServerUnavailable(resp) => Some(resp),
            _ => None,
        }
    }
}
