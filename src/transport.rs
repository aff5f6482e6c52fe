// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The HTTP client that connections hand their requests to.
//!
//! Connections never open sockets themselves. They build a `hyper::Request` and give it to an
//! `HttpSend`, which returns the response. `HyperSend` is the implementation used by default; it
//! wraps a `hyper::Client` over TLS (native-tls by default, or rustls with the `rustls` and
//! `rustls_webpki` features) and applies a timeout to every request.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::{Body, Request, Response};

use crate::error;

#[cfg(feature = "native_tls")]
type Connector = hyper_tls::HttpsConnector<HttpConnector>;

#[cfg(all(not(feature = "native_tls"), any(feature = "rustls", feature = "rustls_webpki")))]
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

#[cfg(not(any(feature = "native_tls", feature = "rustls", feature = "rustls_webpki")))]
compile_error!("one of the `native_tls`, `rustls` or `rustls_webpki` features must be enabled");

#[cfg(feature = "native_tls")]
fn new_https_connector() -> Connector {
    hyper_tls::HttpsConnector::new()
}

#[cfg(all(not(feature = "native_tls"), feature = "rustls"))]
fn new_https_connector() -> Connector {
    hyper_rustls::HttpsConnector::with_native_roots()
}

#[cfg(all(not(feature = "native_tls"), not(feature = "rustls"), feature = "rustls_webpki"))]
fn new_https_connector() -> Connector {
    hyper_rustls::HttpsConnector::with_webpki_roots()
}

/// HttpSend is used to send every request a connection makes.
///
/// Implementations are expected to return whatever response the server gave, whatever its status
/// code. Interpreting the status is left to the caller.
#[async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send http request and return the response.
    async fn http_send(&self, req: Request<Body>) -> error::Result<Response<Body>>;
}

/// `HttpSend` backed by a pooled `hyper::Client`.
#[derive(Debug, Clone)]
pub struct HyperSend {
    client: hyper::Client<Connector, Body>,
    timeout: Duration,
}

impl HyperSend {
    /// Creates a new client that gives up on requests after `timeout`.
    pub fn new(timeout: Duration) -> HyperSend {
        HyperSend {
            client: hyper::Client::builder().build(new_https_connector()),
            timeout,
        }
    }

    /// Returns the timeout applied to each request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl HttpSend for HyperSend {
    async fn http_send(&self, req: Request<Body>) -> error::Result<Response<Body>> {
        let resp = tokio::time::timeout(self.timeout, self.client.request(req)).await??;
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    use tokio::net::TcpListener;

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            // accept, then hold the socket open without ever answering
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let send = HyperSend::new(Duration::from_millis(100));
        let req = Request::get(format!("http://{}/", addr))
            .body(Body::empty())
            .unwrap();

        let result = send.http_send(req).await;
        assert!(matches!(result, Err(Error::Timeout)));
        assert_eq!(send.timeout(), Duration::from_millis(100));

        server.abort();
    }
}
