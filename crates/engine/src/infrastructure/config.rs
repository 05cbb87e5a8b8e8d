//! Engine configuration loaded from the environment.
//!
//! Values come from `.env.local`, then `.env` at the repository root, then the
//! process environment. Unparseable numbers fall back to their defaults.

use std::time::Duration;

const SEASON_ID: &str = "QUIZSPRINT_SEASON_ID";
const ONLINE_TTL_SECS: &str = "QUIZSPRINT_ONLINE_TTL_SECS";
const MATCHMAKING_POLL_MS: &str = "QUIZSPRINT_MATCHMAKING_POLL_MS";
const CHALLENGE_SWEEP_SECS: &str = "QUIZSPRINT_CHALLENGE_SWEEP_SECS";
const DEMO_SEED: &str = "QUIZSPRINT_DEMO_SEED";

pub const DEFAULT_SEASON_ID: &str = "season-1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Season used when no season row is active
    pub season_id: String,
    /// How long a user counts as online after their last action
    pub online_ttl: Duration,
    pub matchmaking_poll: Duration,
    pub challenge_sweep: Duration,
    /// Seed for demo content and the demo random source; system randomness when unset
    pub demo_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            season_id: DEFAULT_SEASON_ID.to_string(),
            online_ttl: Duration::from_secs(60),
            matchmaking_poll: Duration::from_millis(500),
            challenge_sweep: Duration::from_secs(30),
            demo_seed: None,
        }
    }
}

impl EngineConfig {
    /// Load `.env` files from the repo root, then read the process environment.
    pub fn from_env() -> Self {
        load_dotenv_from_repo_root();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Missing keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let season_id = lookup(SEASON_ID)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.season_id);

        Self {
            season_id,
            online_ttl: Duration::from_secs(parse_or(&lookup, ONLINE_TTL_SECS, 60)),
            matchmaking_poll: Duration::from_millis(parse_or(&lookup, MATCHMAKING_POLL_MS, 500)),
            challenge_sweep: Duration::from_secs(parse_or(&lookup, CHALLENGE_SWEEP_SECS, 30)),
            demo_seed: lookup(DEMO_SEED).and_then(|raw| match raw.trim().parse() {
                Ok(seed) => Some(seed),
                Err(_) => {
                    tracing::warn!(key = DEMO_SEED, value = %raw, "Ignoring invalid seed");
                    None
                }
            }),
        }
    }
}

fn parse_or(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: u64) -> u64 {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default, "Invalid number, using default");
            default
        }),
    }
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
