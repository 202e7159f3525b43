use crate::error::ConfigError;
use crate::types::PainKeywords;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CLIENT_ID_VAR: &str = "REDDIT_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "REDDIT_CLIENT_SECRET";
pub const USER_AGENT_VAR: &str = "REDDIT_USER_AGENT";

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "painpoint.toml";

pub const DEFAULT_SUBREDDITS: &[&str] = &[
    "healthcare",
    "HealthIT",
    "medicine",
    "medical",
    "nursing",
    "digitalhealth",
    "HealthTech",
    "Construction",
    "ConstructionIndustry",
    "ConstructionManagement",
    "civilengineering",
    "architecture",
    "skilledtrades",
    "education",
    "Teachers",
    "EdTech",
    "teaching",
    "OnlineLearning",
    "homeschool",
    "personalfinance",
    "Finance",
    "FinancialPlanning",
    "FinTech",
    "investing",
    "accounting",
    "ecommerce",
    "retail",
    "Entrepreneur",
    "smallbusiness",
    "Shopify",
    "AmazonFBA",
];

pub const DEFAULT_KEYWORDS: &[&str] = &[
    "pain point",
    "problem",
    "struggle",
    "challenge",
    "frustration",
    "issue",
    "difficult",
    "hard",
    "need help",
    "solution",
    "feature request",
    "wish",
    "improve",
    "broken",
    "bug",
    "limitation",
    "missing",
];

/// Reddit script-app credentials. Loaded once at startup and passed to the
/// client explicitly.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl RedditCredentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves every credential through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var_name: &str| {
            lookup(var_name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                    var_name: var_name.to_string(),
                })
        };

        Ok(Self {
            client_id: require(CLIENT_ID_VAR)?,
            client_secret: require(CLIENT_SECRET_VAR)?,
            user_agent: require(USER_AGENT_VAR)?,
        })
    }
}

/// Engagement thresholds applied by the record cleaner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleaningConfig {
    pub min_upvotes: i64,
    pub min_comments: u64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            min_upvotes: 1,
            min_comments: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    pub top_n: usize,
    pub posts_per_pain: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_n: 5,
            posts_per_pain: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub subreddits: Vec<String>,
    pub keywords: Vec<String>,
    pub fetch_limit: u32,
    pub min_upvotes: i64,
    pub min_comments: u64,
    pub data_dir: PathBuf,
    pub report: ReportSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        let cleaning = CleaningConfig::default();
        Self {
            subreddits: DEFAULT_SUBREDDITS.iter().map(|s| s.to_string()).collect(),
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            fetch_limit: 100,
            min_upvotes: cleaning.min_upvotes,
            min_comments: cleaning.min_comments,
            data_dir: PathBuf::from("data"),
            report: ReportSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads settings from `path`, or from [`DEFAULT_CONFIG_FILE`] when it
    /// exists, or falls back to defaults. An explicit path that does not
    /// exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                Self::from_file(path)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subreddits.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed {
                reason: "at least one subreddit is required".to_string(),
            });
        }
        if self.pain_keywords().is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "at least one non-empty keyword is required".to_string(),
            });
        }
        if self.fetch_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch_limit".to_string(),
                value: self.fetch_limit.to_string(),
            });
        }
        if self.report.top_n == 0 {
            return Err(ConfigError::InvalidValue {
                field: "report.top_n".to_string(),
                value: self.report.top_n.to_string(),
            });
        }
        Ok(())
    }

    pub fn pain_keywords(&self) -> PainKeywords {
        PainKeywords::new(&self.keywords)
    }

    pub fn cleaning(&self) -> CleaningConfig {
        CleaningConfig {
            min_upvotes: self.min_upvotes,
            min_comments: self.min_comments,
        }
    }

    pub fn subreddits(&self) -> Vec<String> {
        self.subreddits
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_credentials_from_lookup() {
        let creds = RedditCredentials::from_lookup(lookup_from(&[
            (CLIENT_ID_VAR, "id"),
            (CLIENT_SECRET_VAR, "secret"),
            (USER_AGENT_VAR, "painpoint/0.1 by tester"),
        ]))
        .unwrap();

        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.client_secret, "secret");
        assert_eq!(creds.user_agent, "painpoint/0.1 by tester");
        assert!(!format!("{:?}", creds).contains("secret\""));
    }

    #[test]
    fn test_missing_credential_is_reported_by_name() {
        let result = RedditCredentials::from_lookup(lookup_from(&[
            (CLIENT_ID_VAR, "id"),
            (USER_AGENT_VAR, "agent"),
        ]));

        match result {
            Err(ConfigError::MissingEnvironmentVariable { var_name }) => {
                assert_eq!(var_name, CLIENT_SECRET_VAR)
            }
            other => panic!("Expected missing env var error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let result = RedditCredentials::from_lookup(lookup_from(&[
            (CLIENT_ID_VAR, "   "),
            (CLIENT_SECRET_VAR, "secret"),
            (USER_AGENT_VAR, "agent"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingEnvironmentVariable { .. })
        ));
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.subreddits.len(), 31);
        assert_eq!(config.keywords.len(), 17);
        assert_eq!(config.fetch_limit, 100);
        assert_eq!(config.cleaning(), CleaningConfig::default());
        assert_eq!(config.report.top_n, 5);
        assert_eq!(config.report.posts_per_pain, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            subreddits = ["rust", "programming"]
            min_upvotes = 10

            [report]
            top_n = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.subreddits, vec!["rust", "programming"]);
        assert_eq!(config.min_upvotes, 10);
        assert_eq!(config.min_comments, 0);
        assert_eq!(config.report.top_n, 3);
        assert_eq!(config.report.posts_per_pain, 3);
        assert_eq!(config.keywords.len(), 17);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = AppConfig::from_toml_str("subredits = [\"typo\"]");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_rejects_empty_keywords() {
        let config = AppConfig {
            keywords: vec!["!!!".to_string(), "".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_zero_fetch_limit() {
        let config = AppConfig {
            fetch_limit: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let result = AppConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("painpoint.toml");
        std::fs::write(&path, "keywords = [\"Broken\", \"bug\"]\nfetch_limit = 25\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.fetch_limit, 25);
        let pain_keywords = config.pain_keywords();
        let keywords: Vec<&str> = pain_keywords.iter().collect();
        assert_eq!(keywords, vec!["broken", "bug"]);
    }

    #[test]
    fn test_pain_keywords_normalize_and_dedup() {
        let keywords = PainKeywords::new(["Need Help", "need help", "can't", "", "bug"]);
        let collected: Vec<&str> = keywords.iter().collect();
        assert_eq!(collected, vec!["need help", "cant", "bug"]);
    }
}
