// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Set of structs and methods that act as a sort of internal prelude.
//!
//! The other modules glob-import this one, so it holds the small building blocks they share.
//!
//! ## `ParamList`
//!
//! `ParamList` is the collection of parameters handed to a web call. It's consumed by the request
//! builder in `auth::raw`, both to assemble the query string or form body and to feed the OAuth
//! signature.
//!
//! ## URL helpers
//!
//! `join_url` glues a configured base URL to a path with exactly one `/` between them, since the
//! configuration is free to include or omit trailing and leading slashes.
//!
//! `parse_urlencoded` turns an `application/x-www-form-urlencoded` body (what the OAuth token
//! endpoints answer with) into a map.
//!
//! ## `RawResponse`
//!
//! In its own module, `RawResponse` is a fully-buffered response: status, headers and body. The
//! module also has the functions that buffer a `hyper` response and check its status code.

use std::borrow::Cow;
use std::collections::HashMap;

use hyper::header::{HeaderMap, HeaderValue};
use percent_encoding::{utf8_percent_encode, AsciiSet, PercentEncode};

mod response;

pub use crate::common::response::*;

/// A set of headers returned with a response.
pub type Headers = HeaderMap<HeaderValue>;

/// Represents a list of parameters to a Twitter API call.
///
/// This type is a wrapper around a `HashMap<Cow<'static, str>, Cow<'static, str>>` to collect a
/// set of parameter key/value pairs. These are then used to assemble and sign a Twitter API
/// request. The `Cow` type is used to avoid having to allocate a `String` if a string literal is
/// used for a parameter.
///
/// The functions to add parameters follow a builder pattern, so that you can assemble a
/// `ParamList` in a single statement:
///
/// ```
/// use twitter_connect::ParamList;
///
/// let params = ParamList::new()
///     .add_param("screen_name", "rustlang")
///     .add_opt_param("count", Some(5.to_string()));
/// ```
#[derive(Debug, Clone, Default, derive_more::Deref, derive_more::DerefMut, derive_more::From)]
pub struct ParamList(HashMap<Cow<'static, str>, Cow<'static, str>>);

impl ParamList {
    /// Creates a new, empty `ParamList`.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Adds the given key/value parameter to this `ParamList`.
    pub fn add_param(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.insert(key.into(), value.into());
        self
    }

    /// Adds the given key/value parameter to this `ParamList` only if the given value is `Some`.
    pub fn add_opt_param(
        self,
        key: impl Into<Cow<'static, str>>,
        value: Option<impl Into<Cow<'static, str>>>,
    ) -> Self {
        match value {
            Some(val) => self.add_param(key.into(), val.into()),
            None => self,
        }
    }

    /// Merge the parameters from the given `ParamList` into this one.
    pub(crate) fn combine(&mut self, other: ParamList) {
        self.0.extend(other.0);
    }

    /// Renders this `ParamList` as an `application/x-www-form-urlencoded` string.
    ///
    /// The key/value pairs are printed as `key1=value1&key2=value2`, with all keys and values
    /// being percent-encoded according to Twitter's requirements. Pairs are sorted by key so the
    /// output is stable.
    pub fn to_urlencoded(&self) -> String {
        let mut pairs = self
            .0
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>();
        pairs.sort();
        pairs.join("&")
    }
}

impl<K, V> std::iter::FromIterator<(K, V)> for ParamList
where
    K: Into<Cow<'static, str>>,
    V: Into<Cow<'static, str>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ParamList(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Percent-encodes the given string based on the Twitter API specification.
///
/// Twitter bases its encoding scheme on RFC 3986, Section 2.1: every *byte* that is not an ASCII
/// number or letter, or the ASCII characters `-`, `.`, `_`, or `~` must be replaced with a percent
/// sign (`%`) and the byte value in hexadecimal.
pub fn percent_encode(src: &str) -> PercentEncode {
    lazy_static::lazy_static! {
        static ref ENCODER: AsciiSet = percent_encoding::NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');
    }
    utf8_percent_encode(src, &*ENCODER)
}

/// Joins a base URL and a path with exactly one `/` between them.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Parses an `application/x-www-form-urlencoded` body into its key/value pairs.
pub(crate) fn parse_urlencoded(body: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(body.trim().as_bytes())
        .into_owned()
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::fs::File;
    use std::io::Read;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use hyper::{Body, Method, Request, Response, StatusCode};

    use crate::error;
    use crate::transport::HttpSend;

    pub(crate) fn load_file(path: &str) -> String {
        let mut file = File::open(path).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    /// A request as seen by `MockSend`, with its body already buffered.
    #[derive(Debug, Clone)]
    pub(crate) struct SeenRequest {
        pub method: Method,
        pub uri: String,
        pub headers: Headers,
        pub body: Vec<u8>,
    }

    impl SeenRequest {
        pub fn header(&self, name: &str) -> &str {
            self.headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
        }

        pub fn body_str(&self) -> String {
            String::from_utf8_lossy(&self.body).into_owned()
        }
    }

    /// Transport that replays queued responses in order and records every request it sees.
    #[derive(Debug, Default)]
    pub(crate) struct MockSend {
        replies: Mutex<VecDeque<(StatusCode, String)>>,
        seen: Mutex<Vec<SeenRequest>>,
    }

    impl MockSend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, status: u16, body: impl Into<String>) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back((StatusCode::from_u16(status).unwrap(), body.into()));
            self
        }

        pub fn requests(&self) -> Vec<SeenRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpSend for MockSend {
        async fn http_send(&self, req: Request<Body>) -> error::Result<Response<Body>> {
            let (parts, body) = req.into_parts();
            let body = hyper::body::to_bytes(body).await?;
            self.seen.lock().unwrap().push(SeenRequest {
                method: parts.method,
                uri: parts.uri.to_string(),
                headers: parts.headers,
                body: body.to_vec(),
            });

            let (status, body) = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("MockSend ran out of queued replies");
            Ok(Response::builder()
                .status(status)
                .body(Body::from(body))
                .unwrap())
        }
    }

    #[test]
    fn urlencoded_is_sorted_and_escaped() {
        let params = ParamList::new()
            .add_param("status", "hello, world!")
            .add_param("media_ids", "111,222");

        assert_eq!(
            params.to_urlencoded(),
            "media_ids=111%2C222&status=hello%2C%20world%21"
        );
    }

    #[test]
    fn join_url_collapses_slashes() {
        assert_eq!(join_url("https://api.twitter.com/", "/1.1/x.json"), "https://api.twitter.com/1.1/x.json");
        assert_eq!(join_url("https://api.twitter.com", "1.1/x.json"), "https://api.twitter.com/1.1/x.json");
    }

    #[test]
    fn parse_token_body() {
        let parsed = parse_urlencoded("oauth_token=abc123&oauth_token_secret=xyz&oauth_callback_confirmed=true\n");

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed["oauth_token"], "abc123");
        assert_eq!(parsed["oauth_token_secret"], "xyz");
    }

    #[test]
    fn percent_encode_keeps_unreserved() {
        assert_eq!(percent_encode("a-b.c_d~e f+g/h").to_string(), "a-b.c_d~e%20f%2Bg%2Fh");
    }
}
