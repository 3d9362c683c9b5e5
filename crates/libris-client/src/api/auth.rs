//! Auth API.

use crate::client::LibrisClient;
use crate::error::Result;
use crate::types::{LoginResponse, WxLoginRequest};

/// Auth API client.
///
/// Only performs the exchange. Persisting the result is the job of
/// [`AuthFlow`](crate::auth::AuthFlow).
pub struct AuthApi {
    client: LibrisClient,
}

impl AuthApi {
    pub(crate) fn new(client: LibrisClient) -> Self {
        Self { client }
    }

    /// Exchange a one-time provider login code for an access token.
    pub async fn wx_login(&self, code: &str) -> Result<LoginResponse> {
        self.client
            .post(
                "/auth/wx-login",
                &WxLoginRequest {
                    code: code.to_string(),
                },
            )
            .await
    }
}
