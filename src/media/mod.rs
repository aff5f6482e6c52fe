// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Functionality to upload images that can be attached to tweets.
//!
//! Tweet media is uploaded separately from the act of posting the tweet itself. In order to attach
//! an image to a new tweet, you need to upload it first, then take the Media ID that Twitter
//! generates and reference that when posting the tweet. `UserConnection::upload_media` does the
//! first half and hands back the IDs already joined the way `media_ids` expects them:
//!
//! ```rust,no_run
//! use twitter_connect::{Client, Connect, ParamList, UserCredentials};
//!
//! # #[tokio::main]
//! # async fn main() -> twitter_connect::error::Result<()> {
//! let creds = UserCredentials::new("consumer key", "consumer secret")
//!     .with_access_token("access token", "access token secret");
//! let mut client = Client::new(creds);
//! let conn = client.connect();
//! let user = conn.as_user().unwrap();
//!
//! let media_ids = user.upload_media(&["cat.png", "dog.png"]).await?;
//! let params = ParamList::new()
//!     .add_param("status", "Hey, check out these cute pets!")
//!     .add_param("media_ids", media_ids);
//! user.post("statuses/update.json", Some(params)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Each file goes up in its own `multipart/form-data` request. Files are uploaded one after the
//! other, in the order given.

use std::io::Cursor;
use std::path::Path;

use common_multipart_rfc7578::client::multipart::{Body as MultipartBody, Form};
use hyper::{Body, Method, Response};
use serde::Deserialize;

use crate::auth::raw::RequestBuilder;
use crate::auth::Authorization;
use crate::common::*;
use crate::error::{self, Error::*};
use crate::transport::HttpSend;

/// The endpoint, relative to the API version, that media is posted to.
pub(crate) const UPLOAD_ENDPOINT: &str = "media/upload.json";

///Represents media file that is uploaded on twitter.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaHandle {
    ///ID that can be used in API calls (e.g. attach to tweet).
    #[serde(rename = "media_id_string")]
    pub id: String,
    ///Number of second the media can be used in other API calls.
    //We can miss this field on failed upload in which case 0 is pretty reasonable value.
    #[serde(default)]
    #[serde(rename = "expires_after_secs")]
    pub expires_after: u64,
}

/// Builds a `multipart/form-data` body holding one file part named `media`. Returns the body
/// along with the `Content-Type` header value that carries its boundary.
pub(crate) fn multipart_body(filename: &str, content: Vec<u8>) -> (Body, String) {
    let mut form = Form::default();
    form.add_reader_file_with_mime(
        "media",
        Cursor::new(content),
        filename,
        mime::APPLICATION_OCTET_STREAM,
    );
    let content_type = form.content_type();

    (Body::wrap_stream(MultipartBody::from(form)), content_type)
}

/// Buffers an upload response, sorting failures by status class: 4xx is `ClientRequestFailed`,
/// 5xx is `ServerUnavailable`.
pub(crate) async fn upload_response(resp: Response<Body>) -> error::Result<RawResponse> {
    let resp = RawResponse::from_response(resp).await?;

    if resp.status.is_client_error() {
        log::warn!("media upload rejected: {}", resp.status);
        Err(ClientRequestFailed(resp))
    } else if resp.status.is_server_error() {
        log::warn!("media upload failed on Twitter's end: {}", resp.status);
        Err(ServerUnavailable(resp))
    } else if !resp.status.is_success() {
        Err(BadStatus(resp.status))
    } else {
        Ok(resp)
    }
}

/// Reads the file at `path` and posts it to `url` as a single-part multipart upload.
pub(crate) async fn upload_file(
    path: &Path,
    url: &str,
    authorization: &Authorization,
    transport: &dyn HttpSend,
) -> error::Result<MediaHandle> {
    let content = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().replace('"', ""))
        .unwrap_or_else(|| "media".to_string());
    log::debug!("uploading {} ({} bytes)", path.display(), content.len());

    let (body, content_type) = multipart_body(&filename, content);
    let req = RequestBuilder::new(Method::POST, url)
        .with_body(body, content_type)
        .request(authorization)?;

    let resp = upload_response(transport.http_send(req).await?).await?;
    resp.json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::load_file;

    #[test]
    fn parse_media() {
        let media = serde_json::from_str::<MediaHandle>(&load_file("sample_payloads/media.json")).unwrap();

        assert_eq!(media.id, "710511363345354753");
        assert_eq!(media.expires_after, 86400);
    }

    #[tokio::test]
    async fn multipart_holds_one_media_part() {
        let (body, content_type) = multipart_body("cat.png", b"PNG bytes".to_vec());
        let body = hyper::body::to_bytes(body).await.unwrap();
        let body = String::from_utf8_lossy(&body);

        assert!(content_type.starts_with("multipart/form-data; boundary="));
        assert!(body.contains("name=\"media\""));
        assert!(body.contains("filename=\"cat.png\""));
        assert!(body.contains("application/octet-stream"));
        assert!(body.contains("\r\n\r\nPNG bytes\r\n"));
        assert_eq!(body.matches("Content-Disposition").count(), 1);
    }

    #[tokio::test]
    async fn status_classes() {
        fn reply(status: u16) -> Response<Body> {
            Response::builder().status(status).body(Body::from("{}")).unwrap()
        }

        assert!(matches!(upload_response(reply(400)).await, Err(ClientRequestFailed(_))));
        assert!(matches!(upload_response(reply(503)).await, Err(ServerUnavailable(_))));
        assert!(matches!(upload_response(reply(304)).await, Err(BadStatus(_))));
        assert!(upload_response(reply(200)).await.is_ok());
    }
}
