// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Internal mechanisms for the `auth` module: assembling requests and signing them.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac, NewMac};
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Method, Request};
use rand::{self, Rng};
use sha1::Sha1;

use crate::common::*;
use crate::error;

use super::KeyPair;

/// The authorization scheme to attach to a request.
#[derive(Clone, Debug)]
pub enum Authorization {
    /// HTTP Basic authorization built from the consumer key pair. Only accepted by the bearer
    /// token endpoints.
    Basic(KeyPair),
    /// An application-only bearer token.
    Bearer(String),
    /// An OAuth 1.0a signature. `token` is absent when asking for a request token; it's the
    /// request token when asking for an access token, and the access token otherwise.
    OAuth {
        /// The consumer key pair of the app making the request.
        consumer: KeyPair,
        /// The token representing the user, if any.
        token: Option<KeyPair>,
        /// A callback or verifier, for the token endpoints.
        addon: OAuthAddOn,
    },
}

pub struct RequestBuilder<'a> {
    base_uri: &'a str,
    method: Method,
    params: Option<ParamList>,
    query: Option<String>,
    body: Option<(Body, String)>,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(method: Method, base_uri: &'a str) -> Self {
        RequestBuilder {
            base_uri,
            method,
            params: None,
            query: None,
            body: None,
        }
    }

    pub fn with_query_params(self, params: &ParamList) -> Self {
        let total_params = if let Some(mut my_params) = self.params {
            my_params.combine(params.clone());
            my_params
        } else {
            params.clone()
        };
        RequestBuilder {
            query: Some(params.to_urlencoded()),
            params: Some(total_params),
            ..self
        }
    }

    pub fn with_body_params(self, params: &ParamList) -> Self {
        let total_params = if let Some(mut my_params) = self.params {
            my_params.combine(params.clone());
            my_params
        } else {
            params.clone()
        };
        RequestBuilder {
            body: Some((
                Body::from(params.to_urlencoded()),
                "application/x-www-form-urlencoded".to_string(),
            )),
            params: Some(total_params),
            ..self
        }
    }

    /// Attaches a body that is not part of the OAuth signature, like a multipart upload.
    pub fn with_body(self, body: impl Into<Body>, content: impl Into<String>) -> Self {
        RequestBuilder {
            body: Some((body.into(), content.into())),
            ..self
        }
    }

    pub fn request(self, authorization: &Authorization) -> error::Result<Request<Body>> {
        let header = match authorization {
            Authorization::Basic(consumer) => bearer_request(consumer),
            Authorization::Bearer(token) => format!("Bearer {}", token),
            Authorization::OAuth { consumer, token, addon } => {
                OAuthParams::from_keys(consumer.clone(), token.clone())
                    .with_addon(addon.clone())
                    .sign_request(self.method.clone(), self.base_uri, self.params.as_ref())
                    .to_string()
            }
        };
        self.request_authorization(header)
    }

    fn request_authorization(self, authorization: String) -> error::Result<Request<Body>> {
        let full_url = if let Some(query) = self.query.filter(|q| !q.is_empty()) {
            format!("{}?{}", self.base_uri, query)
        } else {
            self.base_uri.to_string()
        };
        log::debug!("{} {}", self.method, full_url);

        let request = Request::builder()
            .method(self.method)
            .uri(full_url)
            .header(AUTHORIZATION, authorization);

        let request = if let Some((body, content)) = self.body {
            request.header(CONTENT_TYPE, content).body(body)?
        } else {
            request.body(Body::empty())?
        };

        Ok(request)
    }
}

/// The `oauth_*` protocol values for one request, before signing.
#[derive(Clone, Debug)]
struct OAuthParams {
    /// Consumer key pair from the app or user credentials.
    consumer_key: KeyPair,
    /// The user's access token, or the request token while finishing sign-in. Absent while
    /// asking for a request token.
    token: Option<KeyPair>,
    /// 32 random alphanumerics, fresh for every request.
    nonce: String,
    /// Seconds since the Unix epoch.
    timestamp: u64,
    addon: OAuthAddOn,
}

impl OAuthParams {
    /// Stamps the given keys with the current time and a new nonce.
    fn from_keys(consumer_key: KeyPair, token: Option<KeyPair>) -> OAuthParams {
        let timestamp = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(dur) => dur,
            Err(err) => err.duration(),
        }
        .as_secs();
        let mut rng = rand::thread_rng();
        let nonce = ::std::iter::repeat(())
            .map(|()| char::from(rng.sample(rand::distributions::Alphanumeric)))
            .take(32)
            .collect::<String>();
        OAuthParams {
            consumer_key,
            token,
            nonce,
            timestamp,
            addon: OAuthAddOn::None,
        }
    }

    fn with_addon(self, addon: OAuthAddOn) -> OAuthParams {
        OAuthParams { addon, ..self }
    }

    /// Computes the HMAC-SHA1 signature over the method, the URL without its query, and every
    /// request parameter merged with the `oauth_*` values. The signing key is the consumer secret
    /// and token secret joined by `&`, with an empty token secret if there's no token.
    fn sign_request(self, method: Method, uri: &str, params: Option<&ParamList>) -> SignedHeader {
        let query_string = {
            let sig_params = params
                .cloned()
                .unwrap_or_default()
                .add_param("oauth_consumer_key", self.consumer_key.key.clone())
                .add_param("oauth_nonce", self.nonce.clone())
                .add_param("oauth_signature_method", "HMAC-SHA1")
                .add_param("oauth_timestamp", self.timestamp.to_string())
                .add_param("oauth_version", "1.0")
                .add_opt_param("oauth_token", self.token.clone().map(|k| k.key))
                .add_opt_param("oauth_callback", self.addon.as_callback().map(|s| s.to_string()))
                .add_opt_param("oauth_verifier", self.addon.as_verifier().map(|s| s.to_string()));

            sig_params.to_urlencoded()
        };

        let base_str = format!(
            "{}&{}&{}",
            percent_encode(method.as_str()),
            percent_encode(uri),
            percent_encode(&query_string)
        );
        let key = format!(
            "{}&{}",
            percent_encode(&self.consumer_key.secret),
            percent_encode(self.token.as_ref().map_or("", |t| &t.secret))
        );

        let mut digest =
            Hmac::<Sha1>::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
        digest.update(base_str.as_bytes());

        let mut params: BTreeMap<&'static str, Cow<'static, str>> = BTreeMap::new();
        params.insert("oauth_signature_method", "HMAC-SHA1".into());
        params.insert("oauth_version", "1.0".into());

        params.insert("oauth_consumer_key", self.consumer_key.key);
        if let Some(token) = self.token {
            params.insert("oauth_token", token.key);
        }

        params.insert("oauth_nonce", self.nonce.into());
        params.insert("oauth_timestamp", self.timestamp.to_string().into());

        match self.addon {
            OAuthAddOn::Callback(c) => {
                params.insert("oauth_callback", c.into());
            }
            OAuthAddOn::Verifier(v) => {
                params.insert("oauth_verifier", v.into());
            }
            OAuthAddOn::None => (),
        }

        params.insert(
            "oauth_signature",
            base64::encode(&digest.finalize().into_bytes()).into(),
        );

        SignedHeader { params }
    }
}

/// The extra sign-in parameter a signed request may carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OAuthAddOn {
    /// `oauth_callback`, sent by `redirect_url_for_auth`.
    Callback(String),
    /// `oauth_verifier`, sent by `access_token`.
    Verifier(String),
    /// Every other signed call.
    None,
}

impl OAuthAddOn {
    fn as_callback(&self) -> Option<&str> {
        match self {
            OAuthAddOn::Callback(c) => Some(c),
            _ => None,
        }
    }

    fn as_verifier(&self) -> Option<&str> {
        match self {
            OAuthAddOn::Verifier(v) => Some(v),
            _ => None,
        }
    }
}

/// The `oauth_*` values plus `oauth_signature`, sorted by name.
struct SignedHeader {
    params: BTreeMap<&'static str, Cow<'static, str>>,
}

/// Renders the `Authorization` header value: `OAuth k1="v1", k2="v2"`, values percent-encoded.
impl fmt::Display for SignedHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let fields = self
            .params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, percent_encode(v)))
            .collect::<Vec<_>>();
        write!(f, "OAuth {}", fields.join(", "))
    }
}

/// Creates the Basic credential for the bearer token endpoints: the percent-encoded consumer key
/// and secret joined by a colon, then base64-encoded.
pub(crate) fn bearer_credentials(con_token: &KeyPair) -> String {
    let text = format!(
        "{}:{}",
        percent_encode(&con_token.key),
        percent_encode(&con_token.secret)
    );
    base64::encode(&text)
}

/// Creates a basic `Authorization` header based on the given consumer token.
///
/// The authorization created by this function can only be used with requests to generate or
/// invalidate a bearer token. Using this authorization with any other endpoint will result in an
/// invalid request.
fn bearer_request(con_token: &KeyPair) -> String {
    format!("Basic {}", bearer_credentials(con_token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header() {
        let con_key = "xvz1evFS4wEEPTGEFPHBog";
        let con_secret = "L8qq9PZyRg6ieKGEKhZolGC0vJWLw8iEJ88DRdyOg";
        let con_token = KeyPair::new(con_key, con_secret);

        let output = bearer_request(&con_token);

        assert_eq!(output, "Basic eHZ6MWV2RlM0d0VFUFRHRUZQSEJvZzpMOHFxOVBaeVJnNmllS0dFS2hab2xHQzB2SldMdzhpRUo4OERSZHlPZw==");
    }

    #[test]
    fn bearer_credentials_are_percent_encoded() {
        let pairs = [("key", "secret"), ("a b", "c:d"), ("ünï", "+/=")];
        for (key, secret) in pairs.iter() {
            let expected = base64::encode(format!(
                "{}:{}",
                percent_encode(key),
                percent_encode(secret)
            ));
            assert_eq!(bearer_credentials(&KeyPair::new(*key, *secret)), expected);
        }

        let decoded = base64::decode(bearer_credentials(&KeyPair::new("a b", "c:d"))).unwrap();
        assert_eq!(decoded, b"a%20b:c%3Ad");
    }

    #[test]
    fn signature_matches_reference() {
        let header = OAuthParams {
            consumer_key: KeyPair::new(
                "xvz1evFS4wEEPTGEFPHBog",
                "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            ),
            token: Some(KeyPair::new(
                "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
                "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
            )),
            nonce: "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg".to_string(),
            timestamp: 1318622958,
            addon: OAuthAddOn::None,
        };
        let params = ParamList::new()
            .add_param("status", "Hello Ladies + Gentlemen, a signed OAuth request!")
            .add_param("include_entities", "true");

        let signed = header.sign_request(
            Method::POST,
            "https://api.twitter.com/1.1/statuses/update.json",
            Some(&params),
        );

        assert_eq!(signed.params["oauth_signature"], "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
        assert!(signed
            .to_string()
            .contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
    }

    #[test]
    fn callback_lands_in_header() {
        let req = RequestBuilder::new(Method::POST, "https://api.twitter.com/1.1/oauth/request_token")
            .request(&Authorization::OAuth {
                consumer: KeyPair::new("key", "secret"),
                token: None,
                addon: OAuthAddOn::Callback("oob".to_string()),
            })
            .unwrap();

        let header = req.headers()[AUTHORIZATION].to_str().unwrap();
        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_callback=\"oob\""));
        assert!(!header.contains("oauth_token="));
    }

    #[test]
    fn query_params_go_to_uri() {
        let params = ParamList::new().add_param("screen_name", "rustlang");
        let req = RequestBuilder::new(Method::GET, "https://api.twitter.com/1.1/users/show.json")
            .with_query_params(&params)
            .request(&Authorization::Bearer("abc".to_string()))
            .unwrap();

        assert_eq!(
            req.uri().to_string(),
            "https://api.twitter.com/1.1/users/show.json?screen_name=rustlang"
        );
        assert_eq!(req.headers()[AUTHORIZATION], "Bearer abc");
        assert!(req.headers().get(CONTENT_TYPE).is_none());
    }
}
