// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Application-only connections, authorized with a bearer token.

use hyper::Method;
use serde::Deserialize;

use crate::auth::raw::{bearer_credentials, RequestBuilder};
use crate::auth::{AppCredentials, Authorization, CredentialHandle};
use crate::common::*;
use crate::error::{self, Error::*};

use super::{Connect, ConnectionBase, RequestOptions};

/// The body of a successful bearer token exchange.
#[derive(Debug, Deserialize)]
struct BearerToken {
    access_token: String,
}

/// A connection that calls the API on behalf of the app itself.
///
/// Before any call can be made, the connection needs a bearer token: either one loaded into the
/// credentials from an earlier session, or a fresh one from `create_bearer_token`. Calls made
/// without one fail with `MissingBearerToken` before anything is sent.
#[derive(Debug, Clone)]
pub struct AppConnection {
    base: ConnectionBase,
    credentials: CredentialHandle<AppCredentials>,
}

impl AppConnection {
    /// Creates a connection that reads its bearer token from `credentials`.
    pub fn new(credentials: CredentialHandle<AppCredentials>, base: ConnectionBase) -> Self {
        AppConnection { base, credentials }
    }

    /// The credentials this connection reads its bearer token from.
    pub fn credentials(&self) -> &CredentialHandle<AppCredentials> {
        &self.credentials
    }

    /// The HTTP Basic credential used to ask for (or invalidate) a bearer token.
    pub(crate) fn bearer_credentials(&self) -> String {
        bearer_credentials(&self.credentials.read().consumer())
    }

    /// Trades the consumer key and secret for a bearer token, and stores it in the credentials.
    ///
    /// Returns this connection, so a call can be chained on directly. A non-success status from
    /// Twitter is returned as `BadStatus`.
    pub async fn create_bearer_token(&self) -> error::Result<&Self> {
        let consumer = self.credentials.read().consumer();
        let url = self.base.url(&self.base.config().oauth2_token);

        let req = RequestBuilder::new(Method::POST, &url)
            .with_body(
                "grant_type=client_credentials",
                "application/x-www-form-urlencoded;charset=UTF-8",
            )
            .request(&Authorization::Basic(consumer))?;

        let token: BearerToken = json_response(self.base.send(req).await?).await?;
        log::debug!("obtained bearer token");

        self.credentials
            .write()
            .set_bearer_token(Some(token.access_token));

        Ok(self)
    }

    /// Invalidates the bearer token held in the credentials, and clears it on success.
    pub async fn invalidate_bearer_token(&self) -> error::Result<()> {
        let (consumer, token) = {
            let creds = self.credentials.read();
            let token = creds
                .bearer_token()
                .filter(|t| !t.is_empty())
                .ok_or(MissingBearerToken)?
                .to_string();
            (creds.consumer(), token)
        };
        let url = self.base.url(&self.base.config().oauth2_invalidate_token);
        let params = ParamList::new().add_param("access_token", token);

        let req = RequestBuilder::new(Method::POST, &url)
            .with_body_params(&params)
            .request(&Authorization::Basic(consumer))?;

        raw_request(self.base.send(req).await?).await?;
        log::debug!("invalidated bearer token");

        self.credentials.write().set_bearer_token(None);

        Ok(())
    }
}

impl Connect for AppConnection {
    fn base(&self) -> &ConnectionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConnectionBase {
        &mut self.base
    }

    fn request_options(&self, params: Option<ParamList>) -> error::Result<RequestOptions> {
        let token = self
            .credentials
            .read()
            .bearer_token()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or(MissingBearerToken)?;

        Ok(RequestOptions::new(Authorization::Bearer(token), params))
    }
}
