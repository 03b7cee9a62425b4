//! Lichess HTTP client implementation

use crate::error::{ClientError, ClientResult};
use crate::events::Profile;
use crate::stream::HttpLineSource;
use crate::traits::LichessService;
use async_trait::async_trait;
use chess_common::LineSource;

pub const DEFAULT_BASE_URL: &str = "https://lichess.org";

/// Network client for a bot account.
///
/// The bearer token is fixed at construction and sent with every request.
#[derive(Clone)]
pub struct LichessClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl LichessClient {
    pub fn new(token: impl Into<String>, base_url: &str) -> ClientResult<Self> {
        let base_url = base_url.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidAddress(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("chessbridge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_status(&self, path: &str) -> ClientResult<u16> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }

    async fn open_stream(&self, path: &str) -> ClientResult<Box<dyn LineSource>> {
        let url = self.url(path);
        tracing::debug!("Opening stream {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        Ok(Box::new(HttpLineSource::new(response)))
    }
}

#[async_trait]
impl LichessService for LichessClient {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn fetch_account(&self) -> ClientResult<Profile> {
        let response = self
            .http
            .get(self.url("/api/account"))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let body = response.text().await?;
        let profile: Profile = serde_json::from_str(&body)?;
        profile.validated()
    }

    async fn accept_challenge(&self, challenge_id: &str) -> ClientResult<u16> {
        self.post_status(&format!("/api/challenge/{}/accept", challenge_id))
            .await
    }

    async fn decline_challenge(&self, challenge_id: &str) -> ClientResult<u16> {
        self.post_status(&format!("/api/challenge/{}/decline", challenge_id))
            .await
    }

    async fn make_move(&self, game_id: &str, mv: &str) -> ClientResult<u16> {
        self.post_status(&format!(
            "/api/bot/game/{}/move/{}?offeringDraw=false",
            game_id, mv
        ))
        .await
    }

    async fn stream_events(&self) -> ClientResult<Box<dyn LineSource>> {
        self.open_stream("/api/stream/event").await
    }

    async fn stream_game(&self, game_id: &str) -> ClientResult<Box<dyn LineSource>> {
        self.open_stream(&format!("/api/bot/game/stream/{}", game_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_address() {
        assert!(matches!(
            LichessClient::new("token", "lichess.org"),
            Err(ClientError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = LichessClient::new("token", "https://lichess.org/").unwrap();
        assert_eq!(client.base_url(), "https://lichess.org");
        assert_eq!(client.url("/api/account"), "https://lichess.org/api/account");
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let client = LichessClient::new("token", "http://127.0.0.1:9").unwrap();
        let result = tokio_test::block_on(client.accept_challenge("abc"));
        assert!(matches!(result, Err(ClientError::Http(_))));
    }
}
