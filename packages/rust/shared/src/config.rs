//! Application configuration for reeltab.
//!
//! User config lives at `~/.reeltab/reeltab.toml`.
//! CLI flags override config file values, which override defaults.
//!
//! The scrape profile (selectors, expected record count, sentinel insertion
//! positions, record drops, chart fields) is configuration data tied to one
//! fixed snapshot of one listing page. The bundled defaults describe the
//! 2016 feature-film search page and do not generalize to other pages or
//! page revisions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReeltabError, Result};
use crate::types::FieldKind;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "reeltab.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".reeltab";

// ---------------------------------------------------------------------------
// Config structs (matching reeltab.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// The active scrape profile.
    #[serde(default)]
    pub profile: ScrapeProfile,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory where chart artifacts are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// HTTP timeout for the page fetch, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_output_dir() -> String {
    "reeltab-out".into()
}
fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Scrape profile
// ---------------------------------------------------------------------------

/// `[profile]` section: everything that ties a run to one page snapshot.
///
/// Omitted keys fall back to the bundled snapshot profile, so a partial
/// profile file only needs to state what differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeProfile {
    /// Human-readable profile name.
    #[serde(default = "default_profile_name")]
    pub name: String,

    /// The listing page URL.
    #[serde(default = "default_profile_url")]
    pub url: String,

    /// Number of records the listing is expected to yield after alignment.
    #[serde(default = "default_expected_records")]
    pub expected_records: usize,

    /// 0-based record indices to drop, in lockstep, before the chart.
    #[serde(default = "default_drop_records")]
    pub drop_records: Vec<usize>,

    /// Per-field extraction specs, in output column order.
    #[serde(default = "default_fields")]
    pub fields: Vec<FieldSpec>,

    /// Chart configuration.
    #[serde(default)]
    pub chart: ChartSpec,
}

impl Default for ScrapeProfile {
    fn default() -> Self {
        Self {
            name: default_profile_name(),
            url: default_profile_url(),
            expected_records: default_expected_records(),
            fields: default_fields(),
            drop_records: default_drop_records(),
            chart: ChartSpec::default(),
        }
    }
}

fn default_profile_name() -> String {
    "imdb-feature-2016".into()
}
fn default_profile_url() -> String {
    "https://www.imdb.com/search/title?release_date=2016&sort=num_votes,desc&page=1".into()
}
fn default_expected_records() -> usize {
    30
}
fn default_drop_records() -> Vec<usize> {
    // Record 17 of the snapshot is a TV entry that slipped into the listing.
    vec![17]
}

fn default_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("title", "h3.lister-item-header a"),
        FieldSpec::number("year", "span.lister-item-year"),
        FieldSpec::number("runtime", "span.runtime"),
        FieldSpec::text("genre", "span.genre"),
        FieldSpec::number("rating", "div.ratings-imdb-rating strong"),
        // Five of the snapshot's thirty movies carry no metascore.
        FieldSpec::number("metascore", "span.metascore")
            .with_missing(vec![1, 1, 1, 13, 24]),
        FieldSpec::number("votes", r#"span[name="nv"]"#),
    ]
}

/// One extracted field: a name, a CSS selector, and how to normalize it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Column name in the assembled dataset.
    pub name: String,

    /// CSS selector yielding the field's text fragments in document order.
    pub selector: String,

    /// Normalization applied to each fragment.
    pub kind: FieldKind,

    /// Where to insert missing-value sentinels during alignment, if the
    /// field is structurally absent for some records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<MissingSpec>,
}

impl FieldSpec {
    /// A text field with no expected gaps.
    pub fn text(name: &str, selector: &str) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            kind: FieldKind::Text,
            missing: None,
        }
    }

    /// A numeric field with no expected gaps.
    pub fn number(name: &str, selector: &str) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            kind: FieldKind::Number,
            missing: None,
        }
    }

    /// Attach sentinel insertion positions for a field with gaps.
    pub fn with_missing(mut self, positions: Vec<usize>) -> Self {
        self.missing = Some(MissingSpec { positions });
        self
    }
}

/// Sentinel insertion positions for one field.
///
/// Each position `p` places a sentinel immediately after the `p`-th source
/// element (`p = 0` puts it before the first). Repeated positions keep the
/// order in which they are listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingSpec {
    pub positions: Vec<usize>,
}

/// `[profile.chart]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Categorical axis field.
    #[serde(default = "default_chart_x")]
    pub x_field: String,

    /// Numeric field summarized by each box.
    #[serde(default = "default_chart_y")]
    pub y_field: String,

    /// Optional sub-grouping field (colored boxes per category).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_field: Option<String>,

    /// Output file name inside the output directory.
    #[serde(default = "default_chart_file")]
    pub file_name: String,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            x_field: default_chart_x(),
            y_field: default_chart_y(),
            group_field: None,
            file_name: default_chart_file(),
        }
    }
}

fn default_chart_x() -> String {
    "year".into()
}
fn default_chart_y() -> String {
    "rating".into()
}
fn default_chart_file() -> String {
    "rating-by-year.html".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.reeltab/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ReeltabError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.reeltab/reeltab.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ReeltabError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ReeltabError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Load a standalone scrape profile from a TOML file.
pub fn load_profile_from(path: &Path) -> Result<ScrapeProfile> {
    let content = std::fs::read_to_string(path).map_err(|e| ReeltabError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ReeltabError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ReeltabError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ReeltabError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ReeltabError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("expected_records = 30"));
        assert!(toml_str.contains("metascore"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.timeout_secs, 30);
        assert_eq!(parsed.profile.expected_records, 30);
        assert_eq!(parsed.profile.fields.len(), 7);
        assert_eq!(parsed.profile.drop_records, vec![17]);
    }

    #[test]
    fn default_profile_metascore_gaps() {
        let profile = ScrapeProfile::default();
        let metascore = profile
            .fields
            .iter()
            .find(|f| f.name == "metascore")
            .expect("metascore field");
        let missing = metascore.missing.as_ref().expect("missing spec");
        assert_eq!(missing.positions, vec![1, 1, 1, 13, 24]);
    }

    #[test]
    fn partial_profile_file_parses() {
        let toml_str = r#"
name = "local-fixture"
url = "https://example.com/listing"
expected_records = 5
drop_records = [3]

[[fields]]
name = "title"
selector = "h3 a"
kind = "text"

[[fields]]
name = "metascore"
selector = "span.metascore"
kind = "number"
missing = { positions = [1] }

[chart]
x_field = "title"
y_field = "metascore"
"#;
        let profile: ScrapeProfile = toml::from_str(toml_str).expect("parse");
        assert_eq!(profile.name, "local-fixture");
        assert_eq!(profile.expected_records, 5);
        assert_eq!(profile.fields.len(), 2);
        assert_eq!(
            profile.fields[1].missing.as_ref().unwrap().positions,
            vec![1]
        );
        assert_eq!(profile.chart.y_field, "metascore");
        // Unstated chart keys fall back to the snapshot defaults.
        assert_eq!(profile.chart.file_name, "rating-by-year.html");
    }

    #[test]
    fn custom_chart_group_field() {
        let toml_str = r#"
[profile.chart]
x_field = "genre"
y_field = "metascore"
group_field = "year"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.profile.chart.group_field.as_deref(), Some("year"));
        // The rest of the profile keeps the bundled snapshot values.
        assert_eq!(config.profile.fields.len(), 7);
    }
}
