// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! User-context connections, signed with OAuth 1.0a.
//!
//! Signing in a user takes three steps:
//!
//! 1. `redirect_url_for_auth` asks Twitter for a request token and returns the URL to send the
//!    user to.
//! 2. The user signs in there and approves the app. Twitter then sends them to the callback URL
//!    (or shows them a PIN, for `"oob"`) with an `oauth_token` and `oauth_verifier`.
//! 3. `access_token` trades those for the user's access token, which is written into the
//!    credentials. Every call made after that is on the user's behalf.
//!
//! The access token doesn't expire until the user revokes it, so it's worth saving (see
//! `CredentialHandle::snapshot`) and loading back with `UserCredentials::with_access_token`.

use std::collections::HashMap;
use std::path::Path;

use hyper::{Body, Method, Response};

use crate::auth::raw::RequestBuilder;
use crate::auth::{Authorization, CredentialHandle, KeyPair, OAuthAddOn, UserCredentials};
use crate::common::*;
use crate::error::{self, Error::*};
use crate::media;
use crate::transport::HttpSend;

use super::{Connect, ConnectionBase, RequestOptions};

/// A connection that calls the API on behalf of a user.
#[derive(Debug, Clone)]
pub struct UserConnection {
    base: ConnectionBase,
    credentials: CredentialHandle<UserCredentials>,
}

impl UserConnection {
    /// Creates a connection that signs with `credentials`.
    pub fn new(credentials: CredentialHandle<UserCredentials>, base: ConnectionBase) -> Self {
        UserConnection { base, credentials }
    }

    /// The credentials this connection signs with.
    pub fn credentials(&self) -> &CredentialHandle<UserCredentials> {
        &self.credentials
    }

    /// Posts a signed request to one of the token endpoints and parses the URL-encoded reply.
    async fn token_request(
        &self,
        endpoint: &str,
        authorization: Authorization,
    ) -> error::Result<HashMap<String, String>> {
        let url = self.base.endpoint_url(endpoint);
        let req = RequestBuilder::new(Method::POST, &url).request(&authorization)?;
        let resp = raw_request(self.base.send(req).await?).await?;

        Ok(parse_urlencoded(&resp.text()))
    }

    /// Asks Twitter for a request token, and returns the URL the user should visit to approve
    /// the app.
    ///
    /// The credentials' callback URL is sent along as `oauth_callback`; if none is set, `"oob"`
    /// is sent instead, and the user will be shown a PIN to use as the verifier.
    pub async fn redirect_url_for_auth(&self) -> error::Result<String> {
        let (consumer, callback) = {
            let creds = self.credentials.read();
            let callback = creds.callback_url().unwrap_or("oob").to_string();
            (creds.consumer(), callback)
        };

        let config = self.base.config();
        let reply = self
            .token_request(
                &config.oauth_request_token,
                Authorization::OAuth {
                    consumer,
                    token: None,
                    addon: OAuthAddOn::Callback(callback),
                },
            )
            .await?;
        let token = reply.get("oauth_token").ok_or(MissingValue("oauth_token"))?;

        Ok(format!(
            "{}?oauth_token={}",
            join_url(&config.base_url, &config.oauth_authenticate),
            percent_encode(token)
        ))
    }

    /// Trades the `oauth_token` and `oauth_verifier` from the sign-in redirect for the user's
    /// access token.
    ///
    /// The access token and secret are written into the credentials. The full reply is returned,
    /// which also holds Twitter's `user_id` and `screen_name` for the user.
    pub async fn access_token(
        &self,
        oauth_token: &str,
        oauth_verifier: &str,
    ) -> error::Result<HashMap<String, String>> {
        let consumer = self.credentials.read().consumer();
        let reply = self
            .token_request(
                &self.base.config().oauth_access_token,
                Authorization::OAuth {
                    consumer,
                    token: Some(KeyPair::new(oauth_token.to_string(), "")),
                    addon: OAuthAddOn::Verifier(oauth_verifier.to_string()),
                },
            )
            .await?;

        let token = reply.get("oauth_token").ok_or(MissingValue("oauth_token"))?;
        let secret = reply
            .get("oauth_token_secret")
            .ok_or(MissingValue("oauth_token_secret"))?;

        {
            let mut creds = self.credentials.write();
            creds.set_access_token(Some(token.clone()));
            creds.set_access_token_secret(Some(secret.clone()));
        }
        log::debug!("obtained access token for {:?}", reply.get("screen_name"));

        Ok(reply)
    }

    /// Checks the access token against `account/verify_credentials.json`, returning the response
    /// as-is. A 200 carries the signed-in user's profile; a 401 means the token is no good.
    pub async fn verify_credentials(&self) -> error::Result<Response<Body>> {
        self.get("account/verify_credentials.json", None).await
    }

    /// Uploads the given files and returns their media IDs joined by commas, in the order the
    /// files were given.
    ///
    /// More files than the configured `max_media_ids` fails with `MediaUploadLimitExceeded`
    /// before anything is read or sent. If any upload fails, the error is returned and the IDs of
    /// the files uploaded before it are dropped.
    pub async fn upload_media<P>(&self, paths: &[P]) -> error::Result<String>
    where
        P: AsRef<Path> + Sync,
    {
        let transport = self.base.transport().clone();
        self.upload_media_via(paths, &*transport).await
    }

    /// Like `upload_media`, but sends the uploads through the given HTTP client.
    pub async fn upload_media_via<P>(
        &self,
        paths: &[P],
        transport: &dyn HttpSend,
    ) -> error::Result<String>
    where
        P: AsRef<Path> + Sync,
    {
        let config = self.base.config();
        if paths.len() > config.max_media_ids {
            return Err(MediaUploadLimitExceeded {
                count: paths.len(),
                max: config.max_media_ids,
            });
        }

        let url = join_url(
            &config.base_upload_url,
            &config.versioned_endpoint(media::UPLOAD_ENDPOINT),
        );
        let mut ids = Vec::with_capacity(paths.len());

        for path in paths {
            let options = self.request_options(None)?;
            let media =
                media::upload_file(path.as_ref(), &url, &options.authorization, transport).await?;
            ids.push(media.id);
        }

        Ok(ids.join(","))
    }
}

impl Connect for UserConnection {
    fn base(&self) -> &ConnectionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConnectionBase {
        &mut self.base
    }

    fn request_options(&self, params: Option<ParamList>) -> error::Result<RequestOptions> {
        let creds = self.credentials.read();
        let authorization = Authorization::OAuth {
            consumer: creds.consumer(),
            token: creds.access(),
            addon: OAuthAddOn::None,
        };

        Ok(RequestOptions::new(authorization, params))
    }
}
