//! Adapter to the External Application Service: fetches challenge metadata
//! by game id and posts the final result. Concretized from
//! `original_source/game_server/graph.py` and `server.py`, which speak a
//! GraphQL endpoint over plain HTTP POST with templated query strings,
//! reimplemented here over `reqwest` rather than a typed GraphQL client
//! crate, since the original has no schema-introspected client either and
//! spec.md treats the app service as an external black box.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};

/// One participant of a challenge, as reported by the app service.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeUser {
    pub username: String,
    pub elo: f64,
}

#[derive(Debug, Clone)]
pub struct Challenge {
    pub from_user: ChallengeUser,
    pub to_user: ChallengeUser,
}

impl Challenge {
    pub fn participant(&self, username: &str) -> Option<&ChallengeUser> {
        if self.from_user.username == username {
            Some(&self.from_user)
        } else if self.to_user.username == username {
            Some(&self.to_user)
        } else {
            None
        }
    }

    pub fn opponent_of(&self, username: &str) -> Option<&ChallengeUser> {
        if self.from_user.username == username {
            Some(&self.to_user)
        } else if self.to_user.username == username {
            Some(&self.from_user)
        } else {
            None
        }
    }
}

/// Queries the app service for challenge metadata and reports final
/// results. A trait so session/connection-handler tests can swap in a
/// canned implementation instead of a live HTTP endpoint.
#[async_trait]
pub trait AppService: Send + Sync {
    async fn fetch_challenge(&self, game_id: Uuid) -> ServerResult<Challenge>;
    async fn post_result(&self, game_id: Uuid, winner_username: Option<&str>) -> ServerResult<()>;
}

/// Mirrors `config.py`'s `QUERY_GET_CHALLANGE` / `graph.py`'s `send_result`
/// mutation template, just written as Rust `const`s instead of Python
/// module-level strings.
const QUERY_GET_CHALLENGE: &str =
    r#"query {{ challange (gameId: "{}") {{ id fromUser {{ username elo }} toUser {{ username elo }} }} }}"#;
const MUTATION_END_GAME: &str =
    r#"mutation {{ endGame(winnerUsername: "{}", challangeId: "{}") {{ challange {{ id }} }} }}"#;

pub struct GraphQlAppService {
    client: reqwest::Client,
    url: String,
}

impl GraphQlAppService {
    pub fn new(url: String, timeout: Duration) -> GraphQlAppService {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client configuration is static and always valid");
        GraphQlAppService { client, url }
    }

    async fn post_graphql(&self, query: String) -> ServerResult<serde_json::Value> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "query": query }))
            .send()
            .await?;
        let body: serde_json::Value = response.json().await?;
        Ok(body)
    }
}

#[async_trait]
impl AppService for GraphQlAppService {
    async fn fetch_challenge(&self, game_id: Uuid) -> ServerResult<Challenge> {
        let query = QUERY_GET_CHALLENGE.replacen("{}", &game_id.to_string(), 1);
        let body = self.post_graphql(query).await?;

        let challenge = body
            .get("data")
            .and_then(|d| d.get("challange"))
            .filter(|c| !c.is_null())
            .ok_or(ServerError::UnknownGame(game_id))?;

        let parse_user = |key: &str| -> ServerResult<ChallengeUser> {
            let node = challenge.get(key).ok_or_else(|| {
                ServerError::AppServiceMalformed(format!("challenge response is missing `{key}`"))
            })?;
            serde_json::from_value(node.clone())
                .map_err(|e| ServerError::AppServiceMalformed(e.to_string()))
        };

        Ok(Challenge {
            from_user: parse_user("fromUser")?,
            to_user: parse_user("toUser")?,
        })
    }

    async fn post_result(&self, game_id: Uuid, winner_username: Option<&str>) -> ServerResult<()> {
        let mutation = MUTATION_END_GAME
            .replacen("{}", winner_username.unwrap_or(""), 1)
            .replacen("{}", &game_id.to_string(), 1);

        const MAX_ATTEMPTS: u32 = 3;
        let mut last_err = None;
        for attempt in 0..MAX_ATTEMPTS {
            match self.post_graphql(mutation.clone()).await {
                Ok(_) => return Ok(()),
                Err(err) => {
                    tracing::warn!(
                        game_id = %game_id,
                        attempt = attempt + 1,
                        error = %err,
                        "app-service result post failed, retrying"
                    );
                    last_err = Some(err);
                    if attempt + 1 < MAX_ATTEMPTS {
                        tokio::time::sleep(Duration::from_millis(200 * 2u64.pow(attempt))).await;
                    }
                }
            }
        }
        Err(last_err.expect("loop runs at least once"))
    }
}

/// A canned [`AppService`] double, kept as a regular (non-`cfg(test)`)
/// module so both this crate's unit tests and `backend/tests/` integration
/// tests (a separate compilation unit) can depend on it.
pub mod mock {
    use std::sync::Mutex;

    use super::*;

    /// Canned app-service double: fixed challenges keyed by game id, and a
    /// record of every `post_result` call for assertions.
    #[derive(Default)]
    pub struct MockAppService {
        pub challenges: std::collections::HashMap<Uuid, Challenge>,
        pub posted_results: Mutex<Vec<(Uuid, Option<String>)>>,
    }

    impl MockAppService {
        pub fn with_challenge(game_id: Uuid, challenge: Challenge) -> MockAppService {
            let mut challenges = std::collections::HashMap::new();
            challenges.insert(game_id, challenge);
            MockAppService { challenges, posted_results: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl AppService for MockAppService {
        async fn fetch_challenge(&self, game_id: Uuid) -> ServerResult<Challenge> {
            self.challenges.get(&game_id).cloned().ok_or(ServerError::UnknownGame(game_id))
        }

        async fn post_result(&self, game_id: Uuid, winner_username: Option<&str>) -> ServerResult<()> {
            self.posted_results.lock().unwrap().push((game_id, winner_username.map(str::to_string)));
            Ok(())
        }
    }
}
