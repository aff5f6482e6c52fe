// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sign in as a user, upload some pictures, and post them in a tweet.
//!
//! Usage: `cargo run --example user_auth -- user_credentials.json [picture...]`, where the JSON
//! file looks like `sample_payloads/user_credentials.json`. If the file has no access token, you
//! will be walked through signing in. Leave out `callback_url` to sign in with a PIN; with one
//! set, copy `oauth_verifier` from the address Twitter redirects you to.

use std::io::Write;

use twitter_connect::{Client, Connect, Credentials, ParamList};

#[tokio::main]
async fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "user_credentials.json".to_string());
    let pictures = args.collect::<Vec<_>>();

    let text = std::fs::read_to_string(&path).unwrap();
    let creds = Credentials::from_json(&text).unwrap();
    let mut client = Client::new(creds);
    let conn = client.connect();
    let user = conn.as_user().expect("these examples need user credentials");

    if user.credentials().read().access_token().is_none() {
        let url = user.redirect_url_for_auth().await.unwrap();
        let oauth_token = url::Url::parse(&url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "oauth_token")
            .map(|(_, v)| v.into_owned())
            .unwrap();

        let has_callback = user.credentials().read().callback_url().is_some();
        println!("Go to the following URL and sign in:");
        println!("{}", url);
        if has_callback {
            // Twitter redirects to the callback with `oauth_verifier` in the query string
            print!("oauth_verifier from the page you were sent to: ");
        } else {
            print!("PIN: ");
        }
        std::io::stdout().flush().unwrap();
        let mut verifier = String::new();
        std::io::stdin().read_line(&mut verifier).unwrap();

        let reply = user.access_token(&oauth_token, verifier.trim()).await.unwrap();
        println!("Welcome, {}!", reply.get("screen_name").map_or("", |s| s.as_str()));
        println!("Save these to skip signing in next time: {:?}", user.credentials().snapshot());
    }

    let resp = user.verify_credentials().await.unwrap();
    println!("verify_credentials: {}", resp.status());

    let media_ids = match user.upload_media(&pictures).await {
        Ok(ids) => ids,
        Err(e) => match e.response() {
            Some(resp) if resp.status.is_client_error() => panic!("You made an error! {}", resp),
            Some(resp) => panic!("Twitter's servers are under load, try again later: {}", resp),
            None => panic!("{}", e),
        },
    };

    let params = ParamList::new()
        .add_param("status", "Test status!")
        .add_opt_param("media_ids", Some(media_ids).filter(|ids| !ids.is_empty()));
    let resp = user.post("statuses/update.json", Some(params)).await.unwrap();
    println!("statuses/update: {}", resp.status());
}
