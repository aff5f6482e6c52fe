// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A library for making authenticated calls to the Twitter REST API.
//!
//! This crate handles the part of talking to Twitter that every call has in common: holding the
//! keys, getting the tokens, and authorizing each request the right way. What you do with the
//! response is up to you; `get` and `post` return the `hyper::Response` that Twitter sent back.
//!
//! # Getting started
//!
//! Everything starts from a [`Client`] built with one of two kinds of credentials:
//!
//! * [`AppCredentials`] for application-only calls. The connection trades your consumer keys for
//!   a bearer token with `create_bearer_token`.
//! * [`UserCredentials`] for calls made on behalf of a user. The connection walks the user
//!   through signing in with `redirect_url_for_auth` and `access_token`, or you can load an access
//!   token you saved earlier.
//!
//! `Client::connect` hands back a [`Connection`] that matches the credentials:
//!
//! ```rust,no_run
//! use twitter_connect::{AppCredentials, Client, Connect, ParamList};
//!
//! # #[tokio::main]
//! # async fn main() -> twitter_connect::error::Result<()> {
//! let creds = AppCredentials::new("consumer key", "consumer secret").into_handle();
//! let mut client = Client::new(creds.clone());
//! let conn = client.connect();
//!
//! conn.as_app().unwrap().create_bearer_token().await?;
//! println!("save this for next time: {:?}", creds.read().bearer_token());
//!
//! let params = ParamList::new().add_param("screen_name", "rustlang");
//! let resp = conn.get("users/show.json", Some(params)).await?;
//! let body = hyper::body::to_bytes(resp.into_body()).await?;
//! println!("{}", String::from_utf8_lossy(&body));
//! # Ok(())
//! # }
//! ```
//!
//! Endpoints are given relative to the API version, so `"users/show.json"` goes to
//! `https://api.twitter.com/1.1/users/show.json`. The hosts, the version and the token endpoints
//! all come from a [`Config`], which can be loaded from a JSON file.
//!
//! # Logging
//!
//! Each request is logged at `debug` level through the `log` crate, with its method and URL.
//! Credentials never appear in the logs.

pub mod auth;
mod client;
mod common;
pub mod config;
pub mod connection;
pub mod error;
pub mod media;
pub mod transport;

pub use crate::auth::{AppCredentials, CredentialHandle, Credentials, KeyPair, UserCredentials};
pub use crate::client::Client;
pub use crate::common::{percent_encode, Headers, ParamList, RawResponse};
pub use crate::config::Config;
pub use crate::connection::{AppConnection, Connect, Connection, RequestOptions, UserConnection};
