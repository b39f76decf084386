use std::str::FromStr;

use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Reconciliation parameters, usually read from a `.recon.toml` file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    /// Base URL of the collection management server.
    pub cdm_url: String,
    /// Collection alias.
    pub alias: String,
    /// Field nick used to join rows to records.
    pub identifier: String,
    #[serde(default)]
    pub mode: MatchMode,
    /// Table column holding 1-based page positions (page mode only).
    #[serde(default)]
    pub page_position_column: Option<String>,
}

// ---------------------------------------------------------------------------
// Match mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// One merged edit per identifier.
    #[default]
    Object,
    /// One merged edit per row, resolved to a child page by position.
    Page,
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Object => write!(f, "object"),
            Self::Page => write!(f, "page"),
        }
    }
}

impl FromStr for MatchMode {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "object" => Ok(Self::Object),
            "page" => Ok(Self::Page),
            other => Err(ReconError::ConfigValidation(format!(
                "unknown match mode '{other}' (expected 'object' or 'page')"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.cdm_url.trim().is_empty() {
            return Err(ReconError::ConfigValidation("cdm_url is required".into()));
        }
        if !self.cdm_url.starts_with("http://") && !self.cdm_url.starts_with("https://") {
            return Err(ReconError::ConfigValidation(format!(
                "cdm_url must be an http(s) URL, got '{}'",
                self.cdm_url
            )));
        }
        if self.alias().is_empty() {
            return Err(ReconError::ConfigValidation("alias is required".into()));
        }
        if self.identifier.trim().is_empty() {
            return Err(ReconError::ConfigValidation("identifier is required".into()));
        }

        let has_page_column = self
            .page_position_column
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        if self.mode == MatchMode::Page && !has_page_column {
            return Err(ReconError::ConfigValidation(
                "page mode requires page_position_column".into(),
            ));
        }

        Ok(())
    }

    /// Collection alias without the leading slash the server sometimes reports.
    pub fn alias(&self) -> &str {
        self.alias.trim().trim_start_matches('/')
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_OBJECT: &str = r#"
cdm_url = "https://cdm.example.org"
alias = "/p15999coll1"
identifier = "identi"
"#;

    #[test]
    fn parse_defaults_to_object_mode() {
        let config = ReconConfig::from_toml(VALID_OBJECT).unwrap();
        assert_eq!(config.mode, MatchMode::Object);
        assert_eq!(config.alias(), "p15999coll1");
        assert_eq!(config.identifier, "identi");
        assert!(config.page_position_column.is_none());
    }

    #[test]
    fn parse_page_mode() {
        let input = format!(
            r#"{VALID_OBJECT}
mode = "page"
page_position_column = "Page"
"#
        );
        let config = ReconConfig::from_toml(&input).unwrap();
        assert_eq!(config.mode, MatchMode::Page);
        assert_eq!(config.page_position_column.as_deref(), Some("Page"));
    }

    #[test]
    fn reject_page_mode_without_column() {
        let input = format!("{VALID_OBJECT}\nmode = \"page\"\n");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("page_position_column"));
    }

    #[test]
    fn reject_unknown_mode() {
        let input = format!("{VALID_OBJECT}\nmode = \"item\"\n");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_missing_alias() {
        let input = r#"
cdm_url = "https://cdm.example.org"
alias = " / "
identifier = "identi"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("alias is required"));
    }

    #[test]
    fn reject_non_http_url() {
        let input = r#"
cdm_url = "cdm.example.org"
alias = "coll"
identifier = "identi"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("http(s)"));
    }

    #[test]
    fn match_mode_from_str() {
        assert_eq!("page".parse::<MatchMode>().unwrap(), MatchMode::Page);
        assert!("pages".parse::<MatchMode>().is_err());
    }
}
