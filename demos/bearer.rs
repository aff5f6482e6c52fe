// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Application-only access: trade the consumer keys for a bearer token, then look up a user.
//!
//! Usage: `cargo run --example bearer -- app_credentials.json [screen_name]`, where the JSON file
//! looks like `sample_payloads/app_credentials.json`.

use twitter_connect::{Client, Connect, Credentials, ParamList};

#[tokio::main]
async fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "app_credentials.json".to_string());
    let screen_name = args.next().unwrap_or_else(|| "rustlang".to_string());

    let text = std::fs::read_to_string(&path).unwrap();
    let creds = Credentials::from_json(&text).unwrap();
    let mut client = Client::new(creds);
    let conn = client.connect();

    println!("Pulling up the bearer token...");
    let app = conn.as_app().expect("these examples need app credentials");
    app.create_bearer_token().await.unwrap();
    println!("Bearer token: {:?}", app.credentials().read().bearer_token());

    println!("Pulling up @{}...", screen_name);
    let params = ParamList::new().add_param("screen_name", screen_name);
    let resp = conn.get("users/show.json", Some(params)).await.unwrap();

    println!("{}", resp.status());
    let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    println!("{}", String::from_utf8_lossy(&body));
}
