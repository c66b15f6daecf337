//! Outbound collaborators: identity providers and the text generator used
//! for skill matching.

pub mod gemini;
pub mod gotrue;
pub mod local_auth;

pub use gemini::GeminiClient;
pub use gotrue::GoTrueIdentity;
pub use local_auth::LocalIdentity;

use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
