//! OAuth 1.0a request signing (HMAC-SHA1), as required by the v1.1 API.
//!
//! The signature covers the HTTP method, the base URL and every query and
//! `oauth_*` parameter (RFC 5849 §3.4). Percent-encoding follows RFC 3986:
//! only `A-Z a-z 0-9 - . _ ~` pass through unescaped.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Length of the random `oauth_nonce`.
const NONCE_LENGTH: usize = 32;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// User-context credentials for a Twitter app.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuth10aTokens {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for OAuth10aTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth10aTokens")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Build the `Authorization` header value for a request, with a fresh
/// nonce and the current time.
pub fn authorization_header(
    method: &str,
    url: &str,
    request_params: &[(&str, String)],
    tokens: &OAuth10aTokens,
) -> String {
    let nonce: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect();
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    sign(method, url, request_params, tokens, &nonce, timestamp)
}

/// Deterministic core of [`authorization_header`].
///
/// `url` must not carry a query string; query parameters go in
/// `request_params` so they are covered by the signature.
pub fn sign(
    method: &str,
    url: &str,
    request_params: &[(&str, String)],
    tokens: &OAuth10aTokens,
    nonce: &str,
    timestamp: u64,
) -> String {
    let timestamp = timestamp.to_string();
    let mut oauth_params = vec![
        ("oauth_consumer_key", tokens.consumer_key.clone()),
        ("oauth_nonce", nonce.to_string()),
        ("oauth_signature_method", SIGNATURE_METHOD.to_string()),
        ("oauth_timestamp", timestamp),
        ("oauth_token", tokens.access_token.clone()),
        ("oauth_version", OAUTH_VERSION.to_string()),
    ];

    let mut all_params: Vec<(&str, String)> = request_params.to_vec();
    all_params.extend(oauth_params.iter().cloned());

    let base = signature_base_string(method, url, &all_params);
    let signature = signature(&base, tokens);
    oauth_params.push(("oauth_signature", signature));

    let fields: Vec<String> = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect();
    format!("OAuth {}", fields.join(", "))
}

/// `METHOD&url&params`, each part percent-encoded, with parameters sorted
/// by encoded key then encoded value.
pub fn signature_base_string(method: &str, url: &str, params: &[(&str, String)]) -> String {
    let mut encoded: Vec<(String, String)> =
        params.iter().map(|(k, v)| (encode(k), encode(v))).collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&param_string)
    )
}

/// Base64 HMAC-SHA1 of the base string keyed by both secrets.
pub fn signature(base_string: &str, tokens: &OAuth10aTokens) -> String {
    let key = format!(
        "{}&{}",
        encode(&tokens.consumer_secret),
        encode(&tokens.access_token_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(base_string.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}
