//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Every tuning knob of the service lives here: the listen address, the
//! WebDriver endpoint and its delays, the per-URL cooldown, and the
//! extraction heuristics (contact keywords, contact path segments, email
//! denylist). The heuristic tables ship with defaults that preserve the
//! production matching semantics; deployments override them per market.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct ProspectConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub heuristics: HeuristicsConfig,
}

impl Default for ProspectConfig {
    fn default() -> Self {
        Self {
            version: None,
            server: ServerConfig::default(),
            browser: BrowserConfig::default(),
            throttle: ThrottleConfig::default(),
            heuristics: HeuristicsConfig::default(),
        }
    }
}

/// HTTP listen address for the service binary.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// WebDriver endpoint plus the per-navigation delays.
///
/// `settle_delay_ms` gives in-page scripts time to finish rendering before
/// the page source is read; `navigation_timeout_ms` bounds a single fetch
/// and never aborts the surrounding batch.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

/// Outbound request throttling.
#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleConfig {
    /// Pause inserted after each URL finishes, before the next one starts.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

/// Hand-curated pattern tables used by the contact-page scorer and the
/// email filter. Matching is case-insensitive; the keyword entries are
/// regular expressions, the path entries are literal path segments.
#[derive(Debug, Clone, Deserialize)]
pub struct HeuristicsConfig {
    #[serde(default = "default_contact_keywords")]
    pub contact_keywords: Vec<String>,
    #[serde(default = "default_contact_paths")]
    pub contact_paths: Vec<String>,
    #[serde(default = "default_email_denylist")]
    pub email_denylist: Vec<String>,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            contact_keywords: default_contact_keywords(),
            contact_paths: default_contact_paths(),
            email_denylist: default_email_denylist(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3333
}
fn default_webdriver_url() -> String {
    "http://localhost:9515".into()
}
fn default_headless() -> bool {
    true
}
fn default_navigation_timeout_ms() -> u64 {
    30_000
}
fn default_settle_delay_ms() -> u64 {
    2_000
}
fn default_cooldown_ms() -> u64 {
    500
}

// English, Slovak, Czech and Hungarian contact phrases, plus the
// about/imprint pages that usually carry contact details.
fn default_contact_keywords() -> Vec<String> {
    [
        "contact",
        "get.?in.?touch",
        "reach.?us",
        "write.?us",
        "talk.?to.?us",
        "kontakt",
        "napíšte.?nám",
        "spojte.?sa",
        "kontaktujte",
        "napište.?nám",
        "spojte.?se",
        "kapcsolat",
        "elérhetőség",
        "írjon.?nekünk",
        "keressen.?minket",
        "about.?us",
        "impressum",
        "rólunk",
        "o.?nás",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_contact_paths() -> Vec<String> {
    [
        "contact",
        "kontakt",
        "kapcsolat",
        "elérhetőség",
        "elerhetoseg",
        "impressum",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// Placeholder and third-party service domains that show up in page markup
// but never belong to the scraped organization.
fn default_email_denylist() -> Vec<String> {
    ["example.com", "domain.com", "sentry.io", "wixpress.com"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct ProspectConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ProspectConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ProspectConfigLoader {
    /// Start with sensible defaults: YAML file + `PROSPECT_` env overrides.
    ///
    /// ```
    /// use prospect_config::ProspectConfigLoader;
    ///
    /// let config = ProspectConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.server.port, 3333);
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("PROSPECT").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`with_file`](Self::with_file), but a missing file is not an
    /// error, so headless deployments can rely purely on environment
    /// variables and built-in defaults.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use prospect_config::ProspectConfigLoader;
    ///
    /// let cfg = ProspectConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// browser:
    ///   headless: false
    ///   settle_delay_ms: 250
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(!cfg.browser.headless);
    /// assert_eq!(cfg.browser.settle_delay_ms, 250);
    /// assert_eq!(cfg.browser.navigation_timeout_ms, 30_000);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// The loader combines YAML snippets with `PROSPECT_`-prefixed environment
    /// variables and expands `${VAR}` placeholders before materialising
    /// strongly typed structs.
    pub fn load(self) -> Result<ProspectConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        // Recursively expand environment variables
        expand_env_in_value(&mut v);

        // Deserialize into the strongly-typed config
        let typed: ProspectConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use temp_env;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("WEBDRIVER_HOST", Some("grid.internal"), || {
            let mut v = json!("http://${WEBDRIVER_HOST}:9515");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("http://grid.internal:9515"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("TLD", Some("example.com")), ("SUB", Some("mail"))], || {
            let mut v = json!([
                "noreply@$TLD",
                { "domain": "${SUB}.${TLD}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!([
                    "noreply@example.com",
                    { "domain": "mail.example.com" },
                    42,
                    true,
                    null
                ])
            );
        });
    }

    #[test]
    fn leaves_unset_variables_alone() {
        let mut v = json!("${PROSPECT_DEFINITELY_UNSET_VAR}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("${PROSPECT_DEFINITELY_UNSET_VAR}"));
    }

    #[test]
    fn default_tables_are_populated() {
        let cfg = HeuristicsConfig::default();
        assert!(cfg.contact_keywords.iter().any(|k| k == "kapcsolat"));
        assert!(cfg.contact_paths.iter().any(|p| p == "impressum"));
        assert!(cfg.email_denylist.iter().any(|d| d == "example.com"));
    }
}
