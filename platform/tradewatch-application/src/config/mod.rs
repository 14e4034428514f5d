use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    #[default]
    Websocket,
    Replay,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub feed: FeedConfig,
    pub reconnect: ReconnectConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    pub source: FeedSource,
    pub url: String,
    pub replay_path: Option<String>,
    pub replay_delay_ms: u64,
    pub request_balance_event: String,
    pub read_timeout_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            source: FeedSource::Websocket,
            url: "ws://127.0.0.1:5001/feed".to_string(),
            replay_path: None,
            replay_delay_ms: 250,
            request_balance_event: "request_balance".to_string(),
            read_timeout_ms: 200,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ReconnectConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: f64,
    /// Consecutive failed attempts before giving up; 0 keeps trying forever.
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            max_delay_ms: 5000,
            jitter: 0.5,
            max_attempts: 0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct UiConfig {
    pub tick_ms: u64,
    pub console_lines: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: 33,
            console_lines: 2000,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))?;
    validate(&config).map_err(|err| format!("invalid config {}: {}", path.display(), err))?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<(), String> {
    match config.feed.source {
        FeedSource::Websocket => {
            let url = config.feed.url.trim();
            if !(url.starts_with("ws://") || url.starts_with("wss://")) {
                return Err(format!("feed.url must be a ws:// or wss:// url (got '{url}')"));
            }
        }
        FeedSource::Replay => {
            let has_path = config
                .feed
                .replay_path
                .as_deref()
                .is_some_and(|path| !path.trim().is_empty());
            if !has_path {
                return Err("feed.replay_path is required when feed.source = \"replay\"".to_string());
            }
        }
    }
    if config.feed.request_balance_event.trim().is_empty() {
        return Err("feed.request_balance_event must not be empty".to_string());
    }
    if config.reconnect.initial_delay_ms == 0 {
        return Err("reconnect.initial_delay_ms must be > 0".to_string());
    }
    if config.reconnect.max_delay_ms < config.reconnect.initial_delay_ms {
        return Err("reconnect.max_delay_ms must be >= reconnect.initial_delay_ms".to_string());
    }
    if !(0.0..=1.0).contains(&config.reconnect.jitter) {
        return Err("reconnect.jitter must be within [0, 1]".to_string());
    }
    if config.ui.tick_ms == 0 {
        return Err("ui.tick_ms must be > 0".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_config, validate, Config, FeedSource};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn parse_config(toml_str: &str) -> Config {
        toml::from_str(toml_str).expect("config should parse")
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse_config("");
        assert_eq!(config.feed.source, FeedSource::Websocket);
        assert_eq!(config.reconnect.initial_delay_ms, 1000);
        assert_eq!(config.reconnect.max_delay_ms, 5000);
        assert_eq!(config.reconnect.max_attempts, 0);
        assert_eq!(config.ui.tick_ms, 33);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn parse_config_rejects_unknown_fields() {
        let toml_str = r#"
[feed]
url = "ws://localhost:5001/feed"
unknown_field = 123
"#;
        let err = toml::from_str::<Config>(toml_str).expect_err("unknown field should fail");
        assert!(err.to_string().to_lowercase().contains("unknown field"));
    }

    #[test]
    fn parse_config_rejects_unknown_sections() {
        let err = toml::from_str::<Config>("[db]\nurl = \"x\"\n").expect_err("unknown section");
        assert!(err.to_string().to_lowercase().contains("unknown field"));
    }

    #[test]
    fn parse_replay_config() {
        let toml_str = r#"
[feed]
source = "replay"
replay_path = "feeds/sample.jsonl"
replay_delay_ms = 0

[reconnect]
initial_delay_ms = 500
max_delay_ms = 2000
jitter = 0.0
max_attempts = 3
"#;
        let config = parse_config(toml_str);
        assert_eq!(config.feed.source, FeedSource::Replay);
        assert_eq!(config.feed.replay_path.as_deref(), Some("feeds/sample.jsonl"));
        assert_eq!(config.reconnect.max_attempts, 3);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_catches_inconsistent_values() {
        let mut config = Config::default();
        config.feed.url = "http://localhost".to_string();
        assert!(validate(&config).unwrap_err().contains("feed.url"));

        let mut config = Config::default();
        config.feed.source = FeedSource::Replay;
        assert!(validate(&config).unwrap_err().contains("replay_path"));

        let mut config = Config::default();
        config.reconnect.max_delay_ms = 10;
        assert!(validate(&config).unwrap_err().contains("max_delay_ms"));

        let mut config = Config::default();
        config.reconnect.jitter = 1.5;
        assert!(validate(&config).unwrap_err().contains("jitter"));
    }

    #[test]
    fn load_config_reads_and_validates_the_file() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir();
        let good = dir.join(format!("tradewatch_config_ok_{nanos}.toml"));
        let bad = dir.join(format!("tradewatch_config_bad_{nanos}.toml"));
        std::fs::write(&good, "[ui]\ntick_ms = 50\n").unwrap();
        std::fs::write(&bad, "[reconnect]\njitter = 2.0\n").unwrap();

        let config = load_config(&good).expect("load");
        assert_eq!(config.ui.tick_ms, 50);
        let err = load_config(&bad).unwrap_err();
        assert!(err.starts_with("invalid config"));
        assert!(err.contains("jitter"));
        let missing = load_config(&dir.join(format!("tradewatch_config_none_{nanos}.toml")));
        assert!(missing.unwrap_err().starts_with("failed to read config"));

        let _ = std::fs::remove_file(good);
        let _ = std::fs::remove_file(bad);
    }
}
