use crate::config::Config;
use crate::error::AppError;
use crate::rate_limit::ApiBudget;
use std::thread;
use std::time::Duration;

use super::models::*;

/// Games shorter than this are remakes and carry no LP change.
const REMAKE_CUTOFF_SECS: i64 = 5 * 60;

const MAX_RETRIES: u32 = 3;

pub struct RiotApiClient {
    config: Config,
    agent: ureq::Agent,
    budget: ApiBudget,
}

impl RiotApiClient {
    pub fn new(config: Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build();
        // Conservative global budget, well under the 20 req/sec dev limit.
        let budget = ApiBudget::new(10);
        RiotApiClient {
            config,
            agent,
            budget,
        }
    }

    fn get_regional_routing(&self) -> &str {
        match self.config.region.as_str() {
            "na1" | "br1" | "la1" | "la2" => "americas",
            "euw1" | "eun1" | "tr1" | "ru" => "europe",
            "kr" | "jp1" => "asia",
            "oc1" | "ph2" | "sg2" | "th2" | "vn2" => "sea",
            _ => "americas", // default
        }
    }

    /// One GET with the shared token bucket plus a bounded retry loop.
    /// 429 and transient server/transport failures back off exponentially;
    /// other statuses surface immediately.
    fn execute_request(&self, url: &str) -> Result<String, AppError> {
        let mut retry_count = 0;

        loop {
            self.budget.acquire();

            let response = self
                .agent
                .get(url)
                .set("User-Agent", "lp_tracker/0.1.0")
                .set("X-Riot-Token", &self.config.api_key)
                .call();

            let retryable = match response {
                Ok(resp) => {
                    return resp
                        .into_string()
                        .map_err(|e| AppError::HttpError(e.to_string()));
                }
                Err(ureq::Error::Status(429, _)) => true,
                Err(ureq::Error::Status(status, _)) if status >= 500 => true,
                Err(ureq::Error::Status(404, _)) => {
                    return Err(AppError::PlayerNotFound(url.to_string()));
                }
                Err(ureq::Error::Status(status, _)) => {
                    return Err(AppError::HttpError(format!("status {} from {}", status, url)));
                }
                Err(ureq::Error::Transport(t)) => {
                    if retry_count >= MAX_RETRIES {
                        return Err(AppError::HttpError(t.to_string()));
                    }
                    true
                }
            };

            if retryable {
                if retry_count >= MAX_RETRIES {
                    return Err(AppError::RateLimited);
                }
                let wait_ms = 2000 * (1 << retry_count) as u64;
                thread::sleep(Duration::from_millis(wait_ms));
                retry_count += 1;
            }
        }
    }

    pub fn get_account(&self, game_name: &str, tag_line: &str) -> Result<AccountDto, AppError> {
        let url = format!(
            "https://americas.api.riotgames.com/riot/account/v1/accounts/by-riot-id/{}/{}",
            game_name, tag_line
        );

        let body = self.execute_request(&url)?;
        serde_json::from_str(&body)
            .map_err(|_| AppError::PlayerNotFound(format!("{}#{}", game_name, tag_line)))
    }

    /// Current rank for every queue the player has placed in.
    pub fn get_league_entries(&self, puuid: &str) -> Result<Vec<LeagueEntryDto>, AppError> {
        let url = format!(
            "https://{}.api.riotgames.com/lol/league/v4/entries/by-puuid/{}",
            self.config.region, puuid
        );

        let body = self.execute_request(&url)?;
        serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))
    }

    pub fn get_match_ids(&self, puuid: &str, count: usize) -> Result<Vec<String>, AppError> {
        let regional_routing = self.get_regional_routing();
        let url = format!(
            "https://{}.api.riotgames.com/lol/match/v5/matches/by-puuid/{}/ids?type=ranked&count={}",
            regional_routing, puuid, count
        );

        let body = self.execute_request(&url)?;
        serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))
    }

    /// Full match detail. `None` means the game should be discarded
    /// entirely (an early-surrender remake).
    pub fn get_match(&self, match_id: &str) -> Result<Option<MatchDto>, AppError> {
        let regional_routing = self.get_regional_routing();
        let url = format!(
            "https://{}.api.riotgames.com/lol/match/v5/matches/{}",
            regional_routing, match_id
        );

        let body = self.execute_request(&url)?;
        let detail: MatchDto =
            serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))?;

        if detail.info.game_duration < REMAKE_CUTOFF_SECS {
            return Ok(None);
        }
        Ok(Some(detail))
    }
}
