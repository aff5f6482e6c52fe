// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Authenticated connections to the Twitter API.
//!
//! A connection pairs a set of credentials with an HTTP client and knows how to authorize
//! requests with them. There are two kinds, matching the two kinds of credentials:
//!
//! * `AppConnection` authorizes requests with a bearer token, and can trade the consumer keys for
//!   one with `create_bearer_token`.
//! * `UserConnection` signs requests with OAuth 1.0a, can walk a user through signing in with
//!   `redirect_url_for_auth` and `access_token`, and can upload media.
//!
//! Both implement `Connect`, which is where `get` and `post` live. The only thing the two differ
//! on there is `request_options`, which decides how a request gets authorized. `Connection` is
//! the sum of the two, as handed out by `Client::connect`.
//!
//! ```rust,no_run
//! use twitter_connect::{AppCredentials, Client, Connect, ParamList};
//!
//! # #[tokio::main]
//! # async fn main() -> twitter_connect::error::Result<()> {
//! let mut client = Client::new(AppCredentials::new("consumer key", "consumer secret"));
//! let conn = client.connect();
//!
//! conn.as_app().unwrap().create_bearer_token().await?;
//!
//! let params = ParamList::new().add_param("screen_name", "rustlang");
//! let resp = conn.get("users/show.json", Some(params)).await?;
//! println!("{}", resp.status());
//! # Ok(())
//! # }
//! ```
//!
//! The response of `get` and `post` is handed back as-is, whatever its status code.

use std::sync::Arc;

use async_trait::async_trait;
use hyper::{Body, Method, Request, Response};

use crate::auth::raw::RequestBuilder;
use crate::auth::{Authorization, Credentials};
use crate::common::*;
use crate::config::Config;
use crate::error;
use crate::transport::HttpSend;

mod app;
mod user;

pub use self::app::AppConnection;
pub use self::user::UserConnection;

/// How a request should be authorized, along with the parameters to send with it.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Parameters for the query string (GET) or form body (POST).
    pub params: Option<ParamList>,
    /// The authorization scheme to attach.
    pub authorization: Authorization,
}

impl RequestOptions {
    /// Pairs an authorization with the parameters to send.
    pub fn new(authorization: Authorization, params: Option<ParamList>) -> RequestOptions {
        RequestOptions {
            params,
            authorization,
        }
    }

    /// Assembles and authorizes a request to the given URL.
    ///
    /// GET requests carry the parameters in the query string; every other method carries them in
    /// an `application/x-www-form-urlencoded` body.
    pub fn into_request(self, method: Method, url: &str) -> error::Result<Request<Body>> {
        let mut builder = RequestBuilder::new(method.clone(), url);
        if let Some(params) = &self.params {
            builder = if method == Method::GET {
                builder.with_query_params(params)
            } else {
                builder.with_body_params(params)
            };
        }
        builder.request(&self.authorization)
    }
}

/// The parts every connection shares: configuration and the HTTP client.
#[derive(Debug, Clone)]
pub struct ConnectionBase {
    config: Arc<Config>,
    transport: Arc<dyn HttpSend>,
}

impl ConnectionBase {
    /// Creates a base sharing the given configuration and HTTP client.
    pub fn new(config: Arc<Config>, transport: Arc<dyn HttpSend>) -> ConnectionBase {
        ConnectionBase { config, transport }
    }

    /// The configuration URLs are built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The HTTP client requests are sent through.
    pub fn transport(&self) -> &Arc<dyn HttpSend> {
        &self.transport
    }

    /// Swaps out the HTTP client used by this connection.
    pub fn set_transport(&mut self, transport: Arc<dyn HttpSend>) {
        self.transport = transport;
    }

    /// The full URL of a versioned endpoint: `{base_url}/{api_version}/{endpoint}`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        join_url(&self.config.base_url, &self.config.versioned_endpoint(endpoint))
    }

    /// The full URL of an unversioned path under `base_url`.
    pub fn url(&self, path: &str) -> String {
        join_url(&self.config.base_url, path)
    }

    /// Hands the request to the HTTP client.
    pub async fn send(&self, req: Request<Body>) -> error::Result<Response<Body>> {
        self.transport.http_send(req).await
    }
}

/// The operations shared by both kinds of connection.
///
/// Implementors only supply `base` and `request_options`; `get` and `post` are built on top of
/// them.
#[async_trait]
pub trait Connect: Send + Sync {
    /// The configuration and HTTP client of this connection.
    fn base(&self) -> &ConnectionBase;

    /// Mutable access to the configuration and HTTP client of this connection.
    fn base_mut(&mut self) -> &mut ConnectionBase;

    /// Decides how a request with the given parameters should be authorized.
    ///
    /// This is read fresh from the credentials on every call, so tokens written into the
    /// credentials take effect on the next request.
    fn request_options(&self, params: Option<ParamList>) -> error::Result<RequestOptions>;

    /// Sends an authorized request to the given versioned endpoint, e.g. `"users/show.json"`.
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        params: Option<ParamList>,
    ) -> error::Result<Response<Body>> {
        let url = self.base().endpoint_url(endpoint);
        let req = self.request_options(params)?.into_request(method, &url)?;
        self.base().send(req).await
    }

    /// Sends an authorized GET request to the given versioned endpoint.
    async fn get(&self, endpoint: &str, params: Option<ParamList>) -> error::Result<Response<Body>> {
        self.request(Method::GET, endpoint, params).await
    }

    /// Sends an authorized POST request to the given versioned endpoint.
    async fn post(&self, endpoint: &str, params: Option<ParamList>) -> error::Result<Response<Body>> {
        self.request(Method::POST, endpoint, params).await
    }
}

/// A connection of either kind, as created by `Client::connect`.
#[derive(Debug, Clone)]
pub enum Connection {
    /// An application-only connection.
    App(AppConnection),
    /// A user-context connection.
    User(UserConnection),
}

impl Connection {
    /// Creates the connection that matches the given credentials.
    pub fn new(
        credentials: &Credentials,
        config: Arc<Config>,
        transport: Arc<dyn HttpSend>,
    ) -> Connection {
        let base = ConnectionBase::new(config, transport);
        match credentials {
            Credentials::App(creds) => Connection::App(AppConnection::new(creds.clone(), base)),
            Credentials::User(creds) => Connection::User(UserConnection::new(creds.clone(), base)),
        }
    }

    /// The application-only connection, if that's the variant.
    pub fn as_app(&self) -> Option<&AppConnection> {
        match self {
            Connection::App(conn) => Some(conn),
            Connection::User(_) => None,
        }
    }

    /// Mutable access to the application-only connection.
    pub fn as_app_mut(&mut self) -> Option<&mut AppConnection> {
        match self {
            Connection::App(conn) => Some(conn),
            Connection::User(_) => None,
        }
    }

    /// The user-context connection, if that's the variant.
    pub fn as_user(&self) -> Option<&UserConnection> {
        match self {
            Connection::User(conn) => Some(conn),
            Connection::App(_) => None,
        }
    }

    /// Mutable access to the user-context connection.
    pub fn as_user_mut(&mut self) -> Option<&mut UserConnection> {
        match self {
            Connection::User(conn) => Some(conn),
            Connection::App(_) => None,
        }
    }

    /// The credentials this connection authorizes with.
    pub fn credentials(&self) -> Credentials {
        match self {
            Connection::App(conn) => Credentials::App(conn.credentials().clone()),
            Connection::User(conn) => Credentials::User(conn.credentials().clone()),
        }
    }
}

#[async_trait]
impl Connect for Connection {
    fn base(&self) -> &ConnectionBase {
        match self {
            Connection::App(conn) => conn.base(),
            Connection::User(conn) => conn.base(),
        }
    }

    fn base_mut(&mut self) -> &mut ConnectionBase {
        match self {
            Connection::App(conn) => conn.base_mut(),
            Connection::User(conn) => conn.base_mut(),
        }
    }

    fn request_options(&self, params: Option<ParamList>) -> error::Result<RequestOptions> {
        match self {
            Connection::App(conn) => conn.request_options(params),
            Connection::User(conn) => conn.request_options(params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AppCredentials, UserCredentials};
    use crate::common::tests::MockSend;
    use hyper::header::{AUTHORIZATION, CONTENT_TYPE};

    fn connect(credentials: Credentials, mock: &Arc<MockSend>) -> Connection {
        Connection::new(&credentials, Arc::new(Config::default()), mock.clone())
    }

    #[test]
    fn variant_follows_credentials() {
        let mock = Arc::new(MockSend::new());

        let app = connect(AppCredentials::new("k", "s").into(), &mock);
        assert!(app.as_app().is_some());
        assert!(app.as_user().is_none());

        let user = connect(UserCredentials::new("k", "s").into(), &mock);
        assert!(user.as_user().is_some());
        assert!(user.as_app().is_none());
    }

    #[test]
    fn endpoint_is_versioned() {
        let mock = Arc::new(MockSend::new());
        let conn = connect(AppCredentials::new("k", "s").into(), &mock);

        assert_eq!(
            conn.base().endpoint_url("users/show.json"),
            "https://api.twitter.com/1.1/users/show.json"
        );
        assert_eq!(conn.base().url("oauth2/token"), "https://api.twitter.com/oauth2/token");
    }

    #[tokio::test]
    async fn app_get_carries_bearer_and_query() {
        let mock = Arc::new(MockSend::new().reply(200, r#"{"screen_name":"rustlang"}"#));
        let creds = AppCredentials::new("k", "s").with_bearer_token("AAAA");
        let conn = connect(creds.into(), &mock);

        let params = ParamList::new().add_param("screen_name", "rustlang");
        let resp = conn.get("users/show.json", Some(params)).await.unwrap();
        assert_eq!(resp.status(), 200);

        let seen = mock.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, Method::GET);
        assert_eq!(
            seen[0].uri,
            "https://api.twitter.com/1.1/users/show.json?screen_name=rustlang"
        );
        assert_eq!(seen[0].header(AUTHORIZATION.as_str()), "Bearer AAAA");
    }

    #[tokio::test]
    async fn error_status_is_passed_through() {
        let mock = Arc::new(MockSend::new().reply(404, r#"{"errors":[{"code":34}]}"#));
        let creds = AppCredentials::new("k", "s").with_bearer_token("AAAA");
        let conn = connect(creds.into(), &mock);

        let resp = conn.get("users/show.json", None).await.unwrap();
        assert_eq!(resp.status(), 404);
        let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
        assert_eq!(&body[..], br#"{"errors":[{"code":34}]}"#);
    }

    #[tokio::test]
    async fn user_post_is_signed_form() {
        let mock = Arc::new(MockSend::new().reply(200, "{}"));
        let creds = UserCredentials::new("k", "s").with_access_token("tok", "sec");
        let conn = connect(creds.into(), &mock);

        let params = ParamList::new().add_param("status", "Test status!");
        conn.post("statuses/update.json", Some(params)).await.unwrap();

        let seen = mock.requests();
        assert_eq!(seen[0].method, Method::POST);
        assert_eq!(seen[0].uri, "https://api.twitter.com/1.1/statuses/update.json");
        assert_eq!(seen[0].header(CONTENT_TYPE.as_str()), "application/x-www-form-urlencoded");
        assert_eq!(seen[0].body_str(), "status=Test%20status%21");

        let auth = seen[0].header(AUTHORIZATION.as_str());
        assert!(auth.starts_with("OAuth "));
        assert!(auth.contains("oauth_consumer_key=\"k\""));
        assert!(auth.contains("oauth_token=\"tok\""));
        assert!(auth.contains("oauth_signature="));
    }
}
