// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The entry point: a set of credentials plus the configuration to connect with.

use std::sync::Arc;

use crate::auth::Credentials;
use crate::config::Config;
use crate::connection::Connection;
use crate::transport::{HttpSend, HyperSend};

/// Holds credentials and hands out connections that match them.
///
/// `connect` looks at which kind of credentials the client was built with and returns an
/// application-only connection for `AppCredentials`, or a user-context connection for
/// `UserCredentials`:
///
/// ```rust
/// use twitter_connect::{Client, UserCredentials};
///
/// let mut client = Client::new(UserCredentials::new("consumer key", "consumer secret"));
/// let conn = client.connect();
///
/// assert!(conn.as_user().is_some());
/// assert!(client.connection().is_some());
/// ```
#[derive(Debug)]
pub struct Client {
    credentials: Credentials,
    config: Arc<Config>,
    transport: Arc<dyn HttpSend>,
    connection: Option<Connection>,
}

impl Client {
    /// Creates a client using the default configuration.
    pub fn new(credentials: impl Into<Credentials>) -> Client {
        Client::with_config(credentials, Config::default())
    }

    /// Creates a client using the given configuration. Requests go through a `HyperSend` using
    /// the configured timeout.
    pub fn with_config(credentials: impl Into<Credentials>, config: Config) -> Client {
        let transport = Arc::new(HyperSend::new(config.timeout()));
        Client {
            credentials: credentials.into(),
            config: Arc::new(config),
            transport,
            connection: None,
        }
    }

    /// Replaces the HTTP client given to connections created from now on.
    pub fn with_transport(self, transport: Arc<dyn HttpSend>) -> Client {
        Client { transport, ..self }
    }

    /// Creates a new connection matching the kind of credentials this client holds, and keeps a
    /// copy of it as the current connection.
    pub fn connect(&mut self) -> Connection {
        let connection = Connection::new(
            &self.credentials,
            Arc::clone(&self.config),
            Arc::clone(&self.transport),
        );
        self.connection = Some(connection.clone());
        connection
    }

    /// The credentials new connections are created with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Replaces the credentials used by connections created from now on. The current connection,
    /// if any, keeps the credentials it was created with.
    pub fn set_credentials(&mut self, credentials: impl Into<Credentials>) {
        self.credentials = credentials.into();
    }

    /// The connection most recently created by `connect`, or set with `set_connection`.
    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    /// Replaces the current connection.
    pub fn set_connection(&mut self, connection: Connection) {
        self.connection = Some(connection);
    }

    /// The configuration handed to each connection.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AppCredentials, UserCredentials};
    use crate::common::tests::MockSend;
    use crate::connection::Connect;

    #[test]
    fn connect_matches_credentials() {
        let mut client = Client::new(AppCredentials::new("k", "s"));
        let conn = client.connect();
        assert!(conn.as_app().is_some());
        assert!(client.connection().and_then(Connection::as_app).is_some());

        client.set_credentials(UserCredentials::new("k", "s"));
        // the stored connection is left alone until the next connect
        assert!(client.connection().and_then(Connection::as_app).is_some());

        let conn = client.connect();
        assert!(conn.as_user().is_some());
        assert!(client.connection().and_then(Connection::as_user).is_some());
    }

    #[tokio::test]
    async fn token_is_visible_through_caller_handle() {
        let mock = Arc::new(MockSend::new().reply(200, r#"{"access_token":"shared"}"#));
        let creds = AppCredentials::new("k", "s").into_handle();
        let mut client = Client::new(creds.clone()).with_transport(mock.clone());

        client
            .connect()
            .as_app()
            .unwrap()
            .create_bearer_token()
            .await
            .unwrap();

        assert_eq!(creds.read().bearer_token(), Some("shared"));
        assert_eq!(
            client.credentials().as_app().unwrap().read().bearer_token(),
            Some("shared")
        );
        assert!(client.connection().unwrap().request_options(None).is_ok());
    }

    #[test]
    fn config_reaches_connection() {
        let mut config = Config::default();
        config.set("base_url", "http://localhost:8080").unwrap();
        let mut client = Client::with_config(UserCredentials::new("k", "s"), config);

        let conn = client.connect();
        assert_eq!(
            conn.base().endpoint_url("statuses/update.json"),
            "http://localhost:8080/1.1/statuses/update.json"
        );
    }
}
