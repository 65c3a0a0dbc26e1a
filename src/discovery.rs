/*!
 * Channel discovery over the chat server's REST API.
 *
 * Lists the teams the configured user belongs to and, for each team, the
 * channels the user is a member of. The result can be written back into the
 * configuration as the watch list and the channel display names.
 */

use log::{debug, info};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::{Config, ServerConfig};
use crate::errors::DiscoveryError;
use crate::providers::preview;

/// A team as returned by `/users/me/teams`
#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

impl Team {
    fn label(&self) -> &str {
        if self.display_name.trim().is_empty() { &self.name } else { &self.display_name }
    }
}

#[derive(Debug, Deserialize)]
struct ChannelRecord {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    display_name: String,
}

/// A channel the user can watch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredChannel {
    /// Team display name
    pub team: String,
    pub id: String,
    /// Channel display name, or its handle when the display name is blank
    pub name: String,
}

impl DiscoveredChannel {
    /// `Team / channel`
    pub fn label(&self) -> String {
        format!("{} / {}", self.team, self.name)
    }
}

/// REST client for team and channel listings
#[derive(Debug, Clone)]
pub struct ChannelDirectory {
    client: Client,
    base_url: String,
    token: String,
    user_id: String,
}

impl ChannelDirectory {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        user_id: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            token: token.into(),
            user_id: user_id.into(),
        }
    }

    /// Client for the server section of the config, sharing its credentials
    pub fn from_config(server: &ServerConfig) -> Self {
        Self::new(
            server.base_url.clone(),
            server.token.clone(),
            server.user_id.clone(),
            server.connect_timeout(),
        )
    }

    /// Teams the user belongs to
    pub async fn teams(&self) -> Result<Vec<Team>, DiscoveryError> {
        self.get("/users/me/teams").await
    }

    /// Channels the user is a member of in `team`
    pub async fn channels(&self, team: &Team) -> Result<Vec<DiscoveredChannel>, DiscoveryError> {
        let records: Vec<ChannelRecord> = self
            .get(&format!("/users/me/teams/{}/channels", team.id))
            .await?;

        Ok(records
            .into_iter()
            .map(|record| DiscoveredChannel {
                team: team.label().to_string(),
                name: if record.display_name.trim().is_empty() {
                    record.name
                } else {
                    record.display_name
                },
                id: record.id,
            })
            .collect())
    }

    /// Every channel across every team, in server order
    pub async fn discover(&self) -> Result<Vec<DiscoveredChannel>, DiscoveryError> {
        let teams = self.teams().await?;
        let mut all = Vec::new();

        for team in &teams {
            let channels = self.channels(team).await?;
            debug!("Team {}: {} channel(s)", team.label(), channels.len());
            all.extend(channels);
        }

        info!("Discovered {} channel(s) in {} team(s)", all.len(), teams.len());
        Ok(all)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DiscoveryError> {
        if self.base_url.trim().is_empty() {
            return Err(DiscoveryError::NotConfigured("server base_url is empty".to_string()));
        }
        if self.token.trim().is_empty() {
            return Err(DiscoveryError::NotConfigured("server token is empty".to_string()));
        }

        let url = format!("{}/api/v4{}", self.base_url.trim_end_matches('/'), path);
        let mut request = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Cookie", format!("MMUSERID={}; MMAUTHTOKEN={}", self.user_id, self.token));
        if !self.user_id.is_empty() {
            request = request.header("X-User-Id", &self.user_id);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DiscoveryError::ApiError {
                status_code: status.as_u16(),
                message: preview(&message, 300),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DiscoveryError::ParseError(format!("{}: {}", url, e)))
    }
}

/// Parse a 1-based selection such as `"1, 3,5"` into 0-based indexes.
///
/// Entries that are not numbers or fall outside `1..=count` are skipped;
/// repeats keep their first position.
pub fn parse_selection(input: &str, count: usize) -> Vec<usize> {
    let mut picked = Vec::new();
    for index in input
        .split(',')
        .filter_map(|part| part.trim().parse::<usize>().ok())
        .filter(|n| (1..=count).contains(n))
        .map(|n| n - 1)
    {
        if !picked.contains(&index) {
            picked.push(index);
        }
    }
    picked
}

/// Make `channels` the watch list and record their display names
pub fn apply_to_config(config: &mut Config, channels: &[DiscoveredChannel]) {
    config.watch_channels = channels.iter().map(|c| c.id.clone()).collect();
    for channel in channels {
        config.channel_names.insert(channel.id.clone(), channel.name.clone());
    }
}
