use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    pub engine: EngineEnvConfig,
}

/// Engine knobs settable from the environment. A config saved through the API takes precedence.
#[derive(Debug, Clone)]
pub struct EngineEnvConfig {
    pub max_recommendations: usize,
    pub min_challenges_completed: u32,
    pub min_completion_rate: f64,
    pub min_mastery_level: String,
    pub require_all_challenges: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/quest-engine.sled"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            engine: EngineEnvConfig {
                max_recommendations: env_or_parse("MAX_RECOMMENDATIONS", 10_usize),
                min_challenges_completed: env_or_parse("PROGRESSION_MIN_CHALLENGES", 12_u32),
                min_completion_rate: env_or_parse("PROGRESSION_MIN_COMPLETION_RATE", 75.0_f64),
                min_mastery_level: env_or("PROGRESSION_MIN_MASTERY", "developing"),
                require_all_challenges: env_or_bool("PROGRESSION_REQUIRE_ALL", false),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
