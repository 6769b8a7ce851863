//! Identity provider integration
//!
//! Exchanges OAuth authorization codes for user profiles. Google wants the
//! client credentials as HTTP Basic auth on a query-string request; Discord
//! wants them in a form body. Both then serve the profile from a bearer-
//! authorized user endpoint.

use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::db::ProviderProfile;
use crate::error::Result;

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const DISCORD_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";
const DISCORD_ME_URL: &str = "https://discord.com/api/users/@me";
const DISCORD_CDN: &str = "https://cdn.discordapp.com";

/// Client for the supported identity providers
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    name: String,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
    username: String,
    discriminator: String,
    avatar: Option<String>,
}

impl IdentityClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Exchange a Google authorization code for a profile
    pub async fn exchange_google(&self, code: &str, redirect_uri: &str) -> Result<ProviderProfile> {
        let token: TokenResponse = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .query(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .basic_auth(
                &self.config.google_client_id,
                Some(&self.config.google_client_secret),
            )
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let userinfo: GoogleUserInfo = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(ProviderProfile {
            provider: "google".to_string(),
            uid: userinfo.sub,
            name: userinfo.name,
            avatar_url: userinfo.picture,
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        })
    }

    /// Exchange a Discord authorization code for a profile
    pub async fn exchange_discord(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ProviderProfile> {
        let token: TokenResponse = self
            .http
            .post(DISCORD_TOKEN_URL)
            .form(&[
                ("client_id", self.config.discord_client_id.as_str()),
                ("client_secret", self.config.discord_client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let me: DiscordUser = self
            .http
            .get(DISCORD_ME_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let avatar_url = match &me.avatar {
            Some(hash) => format!("{}/avatars/{}/{}.png", DISCORD_CDN, me.id, hash),
            None => {
                // Discord's default avatars cycle on the discriminator
                let index = me.discriminator.parse::<u32>().unwrap_or(0) % 5;
                format!("{}/embed/avatars/{}.png", DISCORD_CDN, index)
            }
        };

        Ok(ProviderProfile {
            provider: "discord".to_string(),
            uid: me.id,
            name: format!("{}#{}", me.username, me.discriminator),
            avatar_url: Some(avatar_url),
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        })
    }
}
