// ABOUTME: Typed settings document: output paths, navigation bounds, per-artifact ignore columns, and teams.
// ABOUTME: Settings are validated once at load and global ignore sets are merged into every team.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Top-level settings document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub navigation: NavigationSettings,
    #[serde(default)]
    pub roster: ArtifactColumns,
    #[serde(default)]
    pub schedule: ArtifactColumns,
    #[serde(default)]
    pub stats: StatsSettings,
    #[serde(default)]
    pub box_scores: BoxScoreSettings,
    pub teams: BTreeMap<String, TeamIdentity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default)]
    pub wkhtmltopdf: Option<String>,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            output: default_output(),
            wkhtmltopdf: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationSettings {
    #[serde(default = "default_timeout_secs")]
    pub page_load_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub script_timeout_secs: u64,
    #[serde(default = "default_settle_millis")]
    pub settle_millis: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            page_load_timeout_secs: default_timeout_secs(),
            script_timeout_secs: default_timeout_secs(),
            settle_millis: default_settle_millis(),
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactColumns {
    #[serde(default)]
    pub ignore_columns: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsSettings {
    #[serde(default)]
    pub prompts: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoxScoreSettings {
    /// Default number of most recent box scores; must be positive when present.
    #[serde(default)]
    pub count: Option<i64>,
}

/// Conference calendar vendor. Selects the box-score resolution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Boost,
    Sidearm,
}

/// How a team site exposes printable roster and schedule pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteLayout {
    /// `/roster/print` and `/schedule?view=table&print=auto`
    #[default]
    PrintPath,
    /// `?print=true` on both pages
    PrintQuery,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleDisplay {
    Table,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conference {
    pub base_url: String,
    pub provider: Provider,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub url: String,
    pub display: ArticleDisplay,
}

/// Column names suppressed per artifact type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreColumns {
    #[serde(default)]
    pub roster: BTreeSet<String>,
    #[serde(default)]
    pub schedule: BTreeSet<String>,
}

/// One team's identity. Immutable once settings are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamIdentity {
    /// Display name, matched exactly against calendar team labels.
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
    pub base_url: String,
    #[serde(default)]
    pub site_layout: SiteLayout,
    #[serde(default = "default_sport_path")]
    pub sport_path: String,
    #[serde(default = "default_sport_label")]
    pub sport_label: String,
    pub conference: Conference,
    #[serde(default)]
    pub articles: Option<ArticleSource>,
    /// Stats page template; `{year}` is replaced with the season.
    #[serde(default)]
    pub stats_url: Option<String>,
    #[serde(default)]
    pub ignore: IgnoreColumns,
}

fn default_output() -> String {
    "output".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_settle_millis() -> u64 {
    1000
}

fn default_sport_path() -> String {
    "msoc".to_string()
}

fn default_sport_label() -> String {
    "Mens Soccer".to_string()
}

impl Settings {
    /// Parse, validate and normalize a settings document.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let mut settings: Settings = serde_json::from_str(text)
            .map_err(|e| EngineError::config("settings.json", e))?;
        settings.validate()?;
        settings.merge_ignore_sets();
        Ok(settings)
    }

    /// Look up a team by its settings key.
    pub fn team(&self, key: &str) -> Result<&TeamIdentity, EngineError> {
        self.teams.get(key).ok_or_else(|| {
            EngineError::invalid_request(
                "team",
                format!(
                    "unknown team '{}' (known: {})",
                    key,
                    self.teams.keys().cloned().collect::<Vec<_>>().join(", ")
                ),
            )
        })
    }

    fn validate(&mut self) -> Result<(), EngineError> {
        if self.teams.is_empty() {
            return Err(EngineError::config("teams", "at least one team is required"));
        }
        if let Some(count) = self.box_scores.count {
            if count <= 0 {
                return Err(EngineError::config(
                    "box_scores.count",
                    format!("must be positive, got {}", count),
                ));
            }
        }
        for (key, team) in self.teams.iter_mut() {
            team.validate(key)?;
        }
        Ok(())
    }

    fn merge_ignore_sets(&mut self) {
        for team in self.teams.values_mut() {
            team.ignore
                .roster
                .extend(self.roster.ignore_columns.iter().cloned());
            team.ignore
                .schedule
                .extend(self.schedule.ignore_columns.iter().cloned());
        }
    }
}

impl TeamIdentity {
    fn validate(&mut self, key: &str) -> Result<(), EngineError> {
        if self.name.trim().is_empty() {
            return Err(EngineError::config(
                format!("teams.{}.name", key),
                "must not be empty",
            ));
        }
        self.base_url = normalize_base(&self.base_url, &format!("teams.{}.base_url", key))?;
        self.conference.base_url = normalize_base(
            &self.conference.base_url,
            &format!("teams.{}.conference.base_url", key),
        )?;
        if self.conference.provider == Provider::Boost && self.abbreviation.trim().is_empty() {
            return Err(EngineError::config(
                format!("teams.{}.abbreviation", key),
                "required for boost calendars",
            ));
        }
        if let Some(articles) = &self.articles {
            normalize_base(&articles.url, &format!("teams.{}.articles.url", key))?;
        }
        Ok(())
    }

    pub fn roster_url(&self) -> String {
        match self.site_layout {
            SiteLayout::PrintPath => format!("{}/roster/print", self.base_url),
            SiteLayout::PrintQuery => format!("{}/roster?print=true", self.base_url),
            SiteLayout::Plain => format!("{}/roster", self.base_url),
        }
    }

    pub fn schedule_url(&self) -> String {
        match self.site_layout {
            SiteLayout::PrintPath => format!("{}/schedule?view=table&print=auto", self.base_url),
            SiteLayout::PrintQuery => format!("{}/schedule?print=true", self.base_url),
            SiteLayout::Plain => format!("{}/schedule", self.base_url),
        }
    }

    pub fn stats_url(&self, year: i32) -> String {
        match &self.stats_url {
            Some(template) => template.replace("{year}", &year.to_string()),
            None => format!("{}/stats/{}/pdf", self.base_url, year),
        }
    }
}

/// Requires an absolute http(s) URL and strips any trailing slash.
fn normalize_base(raw: &str, field: &str) -> Result<String, EngineError> {
    let parsed = url::Url::parse(raw.trim()).map_err(|e| EngineError::config(field, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(EngineError::config(field, "scheme must be http or https"));
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SETTINGS: &str = r#"{
        "paths": {"output": "out", "wkhtmltopdf": "/usr/bin/wkhtmltopdf"},
        "roster": {"ignore_columns": ["Hometown"]},
        "schedule": {"ignore_columns": ["Tickets", "Video"]},
        "box_scores": {"count": 3},
        "teams": {
            "nu": {
                "name": "Northwestern",
                "abbreviation": "NU",
                "base_url": "https://nusports.com/",
                "conference": {"base_url": "https://bigten.org", "provider": "boost"},
                "ignore": {"roster": ["Major"]}
            },
            "uic": {
                "name": "UIC",
                "base_url": "https://uicflames.com",
                "site_layout": "print_query",
                "conference": {"base_url": "https://horizonleague.org/", "provider": "sidearm"},
                "stats_url": "https://uicflames.com/documents/{year}/stats.pdf"
            }
        }
    }"#;

    #[test]
    fn loads_and_merges_global_ignore_sets() {
        let settings = Settings::from_json(SETTINGS).unwrap();
        let nu = settings.team("nu").unwrap();
        let roster: Vec<&str> = nu.ignore.roster.iter().map(String::as_str).collect();
        assert_eq!(roster, vec!["Hometown", "Major"]);
        let uic = settings.team("uic").unwrap();
        assert!(uic.ignore.schedule.contains("Tickets"));
        assert_eq!(uic.sport_path, "msoc");
    }

    #[test]
    fn base_urls_lose_trailing_slash() {
        let settings = Settings::from_json(SETTINGS).unwrap();
        assert_eq!(settings.team("nu").unwrap().base_url, "https://nusports.com");
        assert_eq!(
            settings.team("uic").unwrap().conference.base_url,
            "https://horizonleague.org"
        );
    }

    #[test]
    fn page_urls_follow_site_layout() {
        let settings = Settings::from_json(SETTINGS).unwrap();
        let nu = settings.team("nu").unwrap();
        assert_eq!(nu.roster_url(), "https://nusports.com/roster/print");
        assert_eq!(
            nu.schedule_url(),
            "https://nusports.com/schedule?view=table&print=auto"
        );
        assert_eq!(nu.stats_url(2023), "https://nusports.com/stats/2023/pdf");

        let uic = settings.team("uic").unwrap();
        assert_eq!(uic.roster_url(), "https://uicflames.com/roster?print=true");
        assert_eq!(uic.schedule_url(), "https://uicflames.com/schedule?print=true");
        assert_eq!(
            uic.stats_url(2024),
            "https://uicflames.com/documents/2024/stats.pdf"
        );
    }

    #[test]
    fn unknown_team_is_invalid_request() {
        let settings = Settings::from_json(SETTINGS).unwrap();
        let err = settings.team("osu").unwrap_err();
        assert!(err.is_invalid_request());
        assert!(err.reason().contains("nu, uic"));
    }

    #[test]
    fn non_positive_default_count_is_rejected() {
        let text = SETTINGS.replace("\"count\": 3", "\"count\": 0");
        let err = Settings::from_json(&text).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::Config);
        assert_eq!(err.target, "box_scores.count");
    }

    #[test]
    fn boost_team_requires_abbreviation() {
        let text = SETTINGS.replace("\"abbreviation\": \"NU\",", "");
        let err = Settings::from_json(&text).unwrap_err();
        assert_eq!(err.target, "teams.nu.abbreviation");
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let text = SETTINGS.replace("https://uicflames.com\"", "uicflames.com\"");
        let err = Settings::from_json(&text).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.target, "teams.uic.base_url");
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = Settings::from_json("{ not json").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::Config);
    }
}
