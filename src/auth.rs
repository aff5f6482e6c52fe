// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Types and functions for holding the keys Twitter hands out.
//!
//! There are two ways to call the Twitter API, and each needs its own set of keys:
//!
//! * **Application-only**: the app acts on its own behalf. Only the consumer key and secret are
//!   needed up front; they're traded for a *bearer token* that authorizes every later call. This
//!   is what `AppCredentials` holds. Application-only calls can't post anything or see anything
//!   private.
//! * **User context**: the app acts on behalf of a user who has signed in through the OAuth 1.0a
//!   three-legged flow. On top of the consumer key and secret, this needs an *access token* and
//!   *access token secret* for the user, and optionally a callback URL for the sign-in flow. This
//!   is what `UserCredentials` holds.
//!
//! Both are wrapped in a `CredentialHandle` when they're handed to a `Client`. The handle is
//! shared: when a connection obtains a bearer token or an access token, it writes it into the
//! same credentials the caller is holding. Keep a clone of the handle if you want to save the
//! tokens afterward.
//!
//! ```rust
//! use twitter_connect::{AppCredentials, Client};
//!
//! let creds = AppCredentials::new("consumer key", "consumer secret").into_handle();
//! let _client = Client::new(creds.clone());
//!
//! // ...after `create_bearer_token` on the connection, `creds` sees the new token:
//! assert_eq!(creds.read().bearer_token(), None);
//! ```
//!
//! Writes to a handle go through a lock, so a token pair is always seen whole. Two connections
//! racing to write tokens into the same handle still leave whichever wrote last.

use std::borrow::Cow;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::{self, Error::*};

pub(crate) mod raw;

pub use self::raw::{Authorization, OAuthAddOn};

/// A key/secret pair representing an OAuth token.
///
/// This struct is used as part of the signing process for API calls, and holds the consumer key
/// pair of an app, a request token during the sign-in flow, or the access token of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    /// A key used to identify an application or user.
    pub key: Cow<'static, str>,
    /// A private key used to sign messages from an application or user.
    pub secret: Cow<'static, str>,
}

impl KeyPair {
    /// Creates a KeyPair with the given key and secret.
    ///
    /// This can be called with either `&'static str` (a string literal) or `String` for either
    /// parameter.
    pub fn new<K, S>(key: K, secret: S) -> KeyPair
    where
        K: Into<Cow<'static, str>>,
        S: Into<Cow<'static, str>>,
    {
        KeyPair {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

/// Consumer keys plus the bearer token for application-only calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppCredentials {
    consumer_key: String,
    consumer_secret: String,
    #[serde(default)]
    bearer_token: Option<String>,
}

impl AppCredentials {
    /// Creates a new set of app credentials with no bearer token.
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        AppCredentials {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            bearer_token: None,
        }
    }

    /// Sets a bearer token that was saved from an earlier session.
    pub fn with_bearer_token(self, token: impl Into<String>) -> Self {
        AppCredentials {
            bearer_token: Some(token.into()),
            ..self
        }
    }

    /// The app's consumer key.
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    /// The app's consumer secret.
    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }

    /// The bearer token, if one has been obtained or loaded.
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    /// Replaces the bearer token. `None` clears it.
    pub fn set_bearer_token(&mut self, token: Option<String>) {
        self.bearer_token = token;
    }

    /// The consumer key and secret as a `KeyPair`.
    pub fn consumer(&self) -> KeyPair {
        KeyPair::new(self.consumer_key.clone(), self.consumer_secret.clone())
    }

    /// Wraps these credentials in a shareable handle.
    pub fn into_handle(self) -> CredentialHandle<AppCredentials> {
        CredentialHandle::new(self)
    }
}

/// Consumer keys plus the user's access token, for calls made on a user's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserCredentials {
    consumer_key: String,
    consumer_secret: String,
    #[serde(default)]
    callback_url: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    access_token_secret: Option<String>,
}

impl UserCredentials {
    /// Creates a new set of user credentials with no callback URL or access token.
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        UserCredentials {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            callback_url: None,
            access_token: None,
            access_token_secret: None,
        }
    }

    /// Sets the URL Twitter sends the user back to after signing in. Use `"oob"` for PIN-based
    /// sign-in.
    pub fn with_callback_url(self, callback_url: impl Into<String>) -> Self {
        UserCredentials {
            callback_url: Some(callback_url.into()),
            ..self
        }
    }

    /// Sets an access token pair that was saved from an earlier sign-in.
    pub fn with_access_token(self, token: impl Into<String>, secret: impl Into<String>) -> Self {
        UserCredentials {
            access_token: Some(token.into()),
            access_token_secret: Some(secret.into()),
            ..self
        }
    }

    /// The app's consumer key.
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    /// The app's consumer secret.
    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }

    /// Where Twitter sends the user after signing in, if set.
    pub fn callback_url(&self) -> Option<&str> {
        self.callback_url.as_deref()
    }

    /// Replaces the callback URL. `None` falls back to PIN sign-in.
    pub fn set_callback_url(&mut self, callback_url: Option<String>) {
        self.callback_url = callback_url;
    }

    /// The user's access token, if signed in.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Replaces the access token.
    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    /// The secret paired with the access token.
    pub fn access_token_secret(&self) -> Option<&str> {
        self.access_token_secret.as_deref()
    }

    /// Replaces the access token secret.
    pub fn set_access_token_secret(&mut self, secret: Option<String>) {
        self.access_token_secret = secret;
    }

    /// The consumer key and secret as a `KeyPair`.
    pub fn consumer(&self) -> KeyPair {
        KeyPair::new(self.consumer_key.clone(), self.consumer_secret.clone())
    }

    /// The access token and secret as a `KeyPair`, if a token has been set. A missing secret is
    /// treated as empty.
    pub fn access(&self) -> Option<KeyPair> {
        self.access_token.clone().map(|token| {
            KeyPair::new(token, self.access_token_secret.clone().unwrap_or_default())
        })
    }

    /// Wraps these credentials in a shareable handle.
    pub fn into_handle(self) -> CredentialHandle<UserCredentials> {
        CredentialHandle::new(self)
    }
}

/// Shared, lockable access to a set of credentials.
///
/// Cloning a handle gives another reference to the same credentials.
#[derive(Debug, Default)]
pub struct CredentialHandle<T>(Arc<RwLock<T>>);

impl<T> Clone for CredentialHandle<T> {
    fn clone(&self) -> Self {
        CredentialHandle(Arc::clone(&self.0))
    }
}

impl<T> CredentialHandle<T> {
    /// Wraps the given credentials in a new handle.
    pub fn new(creds: T) -> Self {
        CredentialHandle(Arc::new(RwLock::new(creds)))
    }

    /// Locks the credentials for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the credentials for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns whether both handles point at the same credentials.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone> CredentialHandle<T> {
    /// Copies out the current state of the credentials.
    pub fn snapshot(&self) -> T {
        self.read().clone()
    }
}

/// The credentials a `Client` is built with. The variant decides which kind of connection
/// `Client::connect` produces.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Application-only credentials, for an `AppConnection`.
    App(CredentialHandle<AppCredentials>),
    /// User-context credentials, for a `UserConnection`.
    User(CredentialHandle<UserCredentials>),
}

impl Credentials {
    /// Loads credentials from a JSON document.
    ///
    /// The document's `type` field picks the variant: `"app"` (or `"application"`) for
    /// `AppCredentials`, `"user"` for `UserCredentials`. The other fields are named after the
    /// credential fields, e.g. `consumer_key` or `access_token_secret`. Any other `type`, or none
    /// at all, fails with `InvalidCredentialsType`.
    pub fn from_json(text: &str) -> error::Result<Credentials> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();

        match kind.as_str() {
            "app" | "application" => Ok(AppCredentials::deserialize(value)?.into()),
            "user" => Ok(UserCredentials::deserialize(value)?.into()),
            _ => Err(InvalidCredentialsType(kind)),
        }
    }

    /// The consumer key and secret, whichever the variant.
    pub fn consumer(&self) -> KeyPair {
        match self {
            Credentials::App(creds) => creds.read().consumer(),
            Credentials::User(creds) => creds.read().consumer(),
        }
    }

    /// The app credentials, if that's the variant.
    pub fn as_app(&self) -> Option<&CredentialHandle<AppCredentials>> {
        match self {
            Credentials::App(creds) => Some(creds),
            Credentials::User(_) => None,
        }
    }

    /// The user credentials, if that's the variant.
    pub fn as_user(&self) -> Option<&CredentialHandle<UserCredentials>> {
        match self {
            Credentials::User(creds) => Some(creds),
            Credentials::App(_) => None,
        }
    }
}

impl From<AppCredentials> for Credentials {
    fn from(creds: AppCredentials) -> Credentials {
        Credentials::App(creds.into_handle())
    }
}

impl From<UserCredentials> for Credentials {
    fn from(creds: UserCredentials) -> Credentials {
        Credentials::User(creds.into_handle())
    }
}

impl From<CredentialHandle<AppCredentials>> for Credentials {
    fn from(creds: CredentialHandle<AppCredentials>) -> Credentials {
        Credentials::App(creds)
    }
}

impl From<CredentialHandle<UserCredentials>> for Credentials {
    fn from(creds: CredentialHandle<UserCredentials>) -> Credentials {
        Credentials::User(creds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::load_file;
    use crate::error::Error;

    #[test]
    fn load_app_credentials() {
        let creds = Credentials::from_json(&load_file("sample_payloads/app_credentials.json")).unwrap();
        let app = creds.as_app().expect("expected app credentials").snapshot();

        assert_eq!(app.consumer_key(), "xvz1evFS4wEEPTGEFPHBog");
        assert_eq!(app.bearer_token(), None);
        assert!(creds.as_user().is_none());
    }

    #[test]
    fn load_user_credentials() {
        let creds = Credentials::from_json(&load_file("sample_payloads/user_credentials.json")).unwrap();
        let user = creds.as_user().expect("expected user credentials").snapshot();

        assert_eq!(user.callback_url(), Some("http://localhost/sign-in-with-twitter/"));
        assert_eq!(
            user.access(),
            Some(KeyPair::new(
                "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
                "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"
            ))
        );
    }

    #[test]
    fn unknown_credentials_type() {
        let err = Credentials::from_json(r#"{"type": "bot", "consumer_key": "k", "consumer_secret": "s"}"#)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentialsType(ref kind) if kind == "bot"));

        let err = Credentials::from_json(r#"{"consumer_key": "k", "consumer_secret": "s"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidCredentialsType(ref kind) if kind.is_empty()));
    }

    #[test]
    fn handle_is_shared() {
        let handle = AppCredentials::new("k", "s").into_handle();
        let other = handle.clone();

        other.write().set_bearer_token(Some("token".to_string()));

        assert!(handle.ptr_eq(&other));
        assert_eq!(handle.read().bearer_token(), Some("token"));
    }
}
