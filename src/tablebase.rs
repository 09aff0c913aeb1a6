use std::time::Duration;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

/// Probing applies when the total piece count is at or below this.
pub const PROBE_PIECE_LIMIT: usize = 7;

pub const DEFAULT_ENDPOINT: &str = "http://tablebase.lichess.ovh/standard";

const RETRY_BACKOFF: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TablebaseError {
    #[error("tablebase rate limit persisted after retry")]
    RateLimited,
    #[error("tablebase request failed: {0}")]
    Transport(String),
    #[error("malformed tablebase response: {0}")]
    Malformed(String),
}

/// Win/draw/loss source for sparse endgames, signed for the side to move.
/// `Ok(None)` means the probe answered but does not know the position.
pub trait WdlProbe: Send + Sync {
    fn probe_wdl(&self, fen: &str) -> Result<Option<i32>, TablebaseError>;
}

#[derive(Debug, Deserialize)]
struct WdlBody {
    wdl: Option<i32>,
}

/// Client for the Lichess standard-chess tablebase endpoint.
#[derive(Clone)]
pub struct LichessTablebase {
    endpoint: String,
    agent: ureq::Agent,
}

impl LichessTablebase {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self { endpoint: endpoint.into(), agent }
    }

    /// Endpoint plus the FEN with its spaces flattened to underscores.
    pub fn probe_url(&self, fen: &str) -> String {
        format!("{}?fen={}", self.endpoint, fen.replace(' ', "_"))
    }

    fn fetch(&self, url: &str) -> Result<Option<i32>, TablebaseError> {
        let response = self.agent.get(url).call().map_err(|err| match err {
            ureq::Error::Status(429, _) => TablebaseError::RateLimited,
            ureq::Error::Status(code, _) => TablebaseError::Transport(format!("HTTP {code}")),
            other => TablebaseError::Transport(other.to_string()),
        })?;
        let body: WdlBody = response
            .into_json()
            .map_err(|err| TablebaseError::Malformed(err.to_string()))?;
        Ok(body.wdl)
    }
}

impl Default for LichessTablebase {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl WdlProbe for LichessTablebase {
    /// One request, and on any failure exactly one retry after a fixed
    /// backoff. Callers treat a final error as an unknown result.
    fn probe_wdl(&self, fen: &str) -> Result<Option<i32>, TablebaseError> {
        let url = self.probe_url(fen);
        match self.fetch(&url) {
            Ok(wdl) => Ok(wdl),
            Err(first) => {
                debug!("tablebase probe {url} failed ({first}); retrying once");
                std::thread::sleep(RETRY_BACKOFF);
                self.fetch(&url)
            }
        }
    }
}
