// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Infrastructure for buffering responses from Twitter and checking their status.

use std::fmt;

use hyper::body::Bytes;
use hyper::{Body, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::Headers;
use crate::error::{self, Error::*};

/// A response from Twitter with its body fully loaded.
///
/// This is what media uploads hand back inside `ClientRequestFailed` and `ServerUnavailable`, so
/// the status, headers and error payload Twitter sent can still be inspected.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The status code of the response.
    pub status: StatusCode,
    /// The headers sent with the response.
    pub headers: Headers,
    /// The response body.
    pub body: Bytes,
}

impl RawResponse {
    /// Buffers the body of the given response.
    pub async fn from_response(resp: Response<Body>) -> error::Result<RawResponse> {
        let (parts, body) = resp.into_parts();
        let body = hyper::body::to_bytes(body).await?;
        Ok(RawResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> error::Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// The `Display` impl shows the status and, if present, the body Twitter sent along with it.
impl fmt::Display for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.body.is_empty() {
            write!(f, "{}", self.status)
        } else {
            write!(f, "{} ({})", self.status, self.text())
        }
    }
}

/// Buffers the given response, returning `BadStatus` if it didn't come back with a success code.
pub async fn raw_request(resp: Response<Body>) -> error::Result<RawResponse> {
    let resp = RawResponse::from_response(resp).await?;
    log::trace!("response status: {}", resp.status);

    if !resp.status.is_success() {
        return Err(BadStatus(resp.status));
    }

    Ok(resp)
}

/// Buffers the given response and parses the body as JSON, after checking the status code.
pub async fn json_response<T: DeserializeOwned>(resp: Response<Body>) -> error::Result<T> {
    raw_request(resp).await?.json()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16, body: &'static str) -> Response<Body> {
        Response::builder()
            .status(status)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn bad_status_is_reported() {
        match raw_request(reply(403, "{}")).await {
            Err(BadStatus(status)) => assert_eq!(status, StatusCode::FORBIDDEN),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn display_includes_body() {
        let resp = RawResponse::from_response(reply(503, "over capacity")).await.unwrap();
        assert_eq!(resp.to_string(), "503 Service Unavailable (over capacity)");
    }
}
