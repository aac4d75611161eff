//! URL helpers for the webhook endpoint.

use reqwest::Url;

/// Name of the query parameter (GET) and JSON field (POST) carrying the message.
pub const CHAT_INPUT_PARAM: &str = "chatInput";

/// Parse the configured endpoint, accepting only http(s) URLs.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, String> {
    let url = Url::parse(endpoint.trim()).map_err(|err| format!("invalid webhook URL: {err}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported webhook URL scheme: {other}")),
    }
}

/// Append `chatInput=<message>` to the endpoint, keeping any existing query.
///
/// ```
/// use matrix_terminal::utils::url::{parse_endpoint, with_chat_input};
///
/// let endpoint = parse_endpoint("https://n8n.example.com/webhook/chat").unwrap();
/// assert_eq!(
///     with_chat_input(&endpoint, "hi there").as_str(),
///     "https://n8n.example.com/webhook/chat?chatInput=hi+there"
/// );
/// ```
pub fn with_chat_input(endpoint: &Url, message: &str) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut().append_pair(CHAT_INPUT_PARAM, message);
    url
}

/// True for endpoints on this machine (`localhost`, loopback) or unparseable ones.
pub fn is_local_host(endpoint: &str) -> bool {
    match Url::parse(endpoint.trim()) {
        Ok(url) => match url.host_str() {
            None | Some("") => true,
            Some(host) => {
                host.eq_ignore_ascii_case("localhost")
                    || host == "127.0.0.1"
                    || host == "[::1]"
                    || host == "::1"
            }
        },
        Err(_) => true,
    }
}
