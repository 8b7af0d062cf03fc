use super::KeyRing;
use ignite::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub struct TokenIssuer {
    key_id: String,
    lifetime_secs: u64,
}

impl TokenIssuer {
    pub fn issue(&self, subject: &str) -> TokenResponse {
        TokenResponse {
            token: format!("{}.{}", self.key_id, subject),
            expires_in: self.lifetime_secs,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub subject: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: u64,
}

pub struct TokenSettings;

#[bootstrapper(priority = 20)]
impl TokenSettings {
    #[hook]
    fn configure_builder(
        builder: &mut AppBuilder,
        config: Arc<ConfigService>,
        keys: Arc<KeyRing>,
    ) -> anyhow::Result<()> {
        let lifetime_secs = config.get_parsed::<u64>("Auth:TokenLifetimeSecs")?.unwrap_or(3600);

        builder.container_mut().register(TokenIssuer {
            key_id: keys.key_id.clone(),
            lifetime_secs,
        });
        Ok(())
    }

    #[hook]
    fn decorate_app(app: &mut App) -> anyhow::Result<()> {
        app.merge(Router::new().route("/token", post(Self::issue)));
        Ok(())
    }

    async fn issue(
        Inject(issuer): Inject<TokenIssuer>,
        Json(request): Json<TokenRequest>,
    ) -> ApiResponse<TokenResponse> {
        if request.subject.trim().is_empty() {
            return ApiResponse::error(StatusCode::BAD_REQUEST, "subject must not be empty");
        }
        ApiResponse::success(issuer.issue(&request.subject))
    }
}
