//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` references are expanded in:
//! - `site.url`
//! - `server.host`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override build output directory.
    pub output_dir: Option<PathBuf>,
    /// Override file watching in `serve`.
    pub watch: Option<bool>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "folio.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site-wide presentation settings.
    pub site: SiteConfig,
    /// Documentation layout (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Dev server configuration.
    pub server: ServerConfig,
    /// Version switcher entries.
    pub versions: Option<VersionsConfig>,
    /// Locale switcher entries.
    pub i18n: Option<I18nConfig>,
    /// Extra redirect rules written to `_redirects`.
    pub redirects: BTreeMap<String, String>,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site settings exposed to the `config` hook channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Book title shown in the header and `og:site_name`.
    pub title: String,
    /// Absolute base URL; enables canonical links when non-empty.
    pub url: String,
    /// Theme directory name under `themes/`.
    pub theme: Option<String>,
    /// Minify generated HTML.
    pub minify: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_owned(),
            url: String::new(),
            theme: None,
            minify: false,
        }
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Rebuild on file changes.
    pub watch: bool,
    /// Quiet period after the last file event before rebuilding.
    pub debounce_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 4000,
            watch: true,
            debounce_ms: 300,
        }
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    plugins_dir: Option<String>,
    plugins: Vec<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Project root (directory holding `folio.toml`).
    pub root_dir: PathBuf,
    /// Source directory for markdown files.
    pub source_dir: PathBuf,
    /// Output directory for the generated site.
    pub output_dir: PathBuf,
    /// Directory scanned for `*.lua` plugins.
    pub plugins_dir: PathBuf,
    /// Explicitly declared plugin scripts, in declaration order.
    pub plugins: Vec<PathBuf>,
}

/// Version switcher configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VersionsConfig {
    /// Name of the version being built. Defaults to the first entry.
    pub current: Option<String>,
    /// Available versions.
    pub list: Vec<VersionEntry>,
}

/// One entry of the version switcher.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub name: String,
    pub url: String,
}

/// Locale switcher configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    pub current: Option<String>,
    pub default: Option<String>,
    pub locales: Vec<LocaleEntry>,
}

/// One entry of the locale switcher.
#[derive(Debug, Clone, Deserialize)]
pub struct LocaleEntry {
    pub code: String,
    pub name: String,
    /// Defaults to `/<code>/`.
    pub url: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.url`").
        field: String,
        /// Error message (e.g., "${`DOCS_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.docs_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(watch) = settings.watch {
            self.server.watch = watch;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    pub fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            docs: DocsConfigRaw::default(),
            server: ServerConfig::default(),
            versions: None,
            i18n: None,
            redirects: BTreeMap::new(),
            docs_resolved: DocsConfig {
                root_dir: base.to_path_buf(),
                source_dir: base.join("docs"),
                output_dir: base.join("_book"),
                plugins_dir: base.join("plugins"),
                plugins: Vec::new(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_docs()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        const MAX_DEBOUNCE_MS: u64 = 10_000;

        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }
        if self.server.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Validation(format!(
                "server.debounce_ms cannot exceed {MAX_DEBOUNCE_MS}"
            )));
        }

        Ok(())
    }

    fn validate_docs(&self) -> Result<(), ConfigError> {
        if self.docs_resolved.output_dir == self.docs_resolved.source_dir {
            return Err(ConfigError::Validation(
                "docs.output_dir must differ from docs.source_dir".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.url = expand::expand_env(&self.site.url, "site.url")?;
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.docs_resolved = DocsConfig {
            root_dir: config_dir.to_path_buf(),
            source_dir: resolve(self.docs.source_dir.as_deref(), "docs"),
            output_dir: resolve(self.docs.output_dir.as_deref(), "_book"),
            plugins_dir: resolve(self.docs.plugins_dir.as_deref(), "plugins"),
            plugins: self.docs.plugins.iter().map(|p| config_dir.join(p)).collect(),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.site.title, "Folio");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4000);
        assert!(config.server.watch);
        assert_eq!(config.server.debounce_ms, 300);
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
        assert_eq!(config.docs_resolved.output_dir, PathBuf::from("/test/_book"));
        assert_eq!(
            config.docs_resolved.plugins_dir,
            PathBuf::from("/test/plugins")
        );
        assert!(config.docs_resolved.plugins.is_empty());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 4000);
        assert!(!config.site.minify);
        assert!(config.versions.is_none());
    }

    #[test]
    fn test_parse_site_config() {
        let toml = r#"
[site]
title = "Handbook"
url = "https://docs.example.com/"
theme = "dark"
minify = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.site,
            SiteConfig {
                title: "Handbook".to_owned(),
                url: "https://docs.example.com/".to_owned(),
                theme: Some("dark".to_owned()),
                minify: true,
            }
        );
    }

    #[test]
    fn test_parse_versions_and_i18n() {
        let toml = r#"
[versions]
current = "v2"
list = [
    { name = "v2", url = "/v2/" },
    { name = "v1", url = "/v1/" },
]

[i18n]
default = "en"
locales = [
    { code = "en", name = "English" },
    { code = "de", name = "Deutsch", url = "https://de.example.com/" },
]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let versions = config.versions.unwrap();
        assert_eq!(versions.current.as_deref(), Some("v2"));
        assert_eq!(versions.list.len(), 2);
        let i18n = config.i18n.unwrap();
        assert_eq!(i18n.default.as_deref(), Some("en"));
        assert_eq!(i18n.locales[0].url, None);
        assert_eq!(
            i18n.locales[1].url.as_deref(),
            Some("https://de.example.com/")
        );
    }

    #[test]
    fn test_parse_redirects() {
        let toml = r#"
[redirects]
"/old.html" = "/new.html"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.redirects.get("/old.html").map(String::as_str),
            Some("/new.html")
        );
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[docs]
source_dir = "content"
output_dir = "public"
plugins = ["vendor/analytics.lua", "toc-extra.lua"]
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.docs_resolved.root_dir, PathBuf::from("/project"));
        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/content")
        );
        assert_eq!(
            config.docs_resolved.output_dir,
            PathBuf::from("/project/public")
        );
        assert_eq!(
            config.docs_resolved.plugins_dir,
            PathBuf::from("/project/plugins")
        );
        assert_eq!(
            config.docs_resolved.plugins,
            vec![
                PathBuf::from("/project/vendor/analytics.lua"),
                PathBuf::from("/project/toc-extra.lua"),
            ]
        );
    }

    #[test]
    fn test_apply_cli_settings_multiple() {
        let mut config = Config::default_with_base(Path::new("/test"));

        let overrides = CliSettings {
            host: Some("0.0.0.0".to_owned()),
            port: Some(9000),
            output_dir: Some(PathBuf::from("/tmp/out")),
            watch: Some(false),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert!(!config.server.watch);
        assert_eq!(config.docs_resolved.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let before = Config::default_with_base(Path::new("/test"));
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.server.host, before.server.host);
        assert_eq!(config.server.port, before.server.port);
        assert_eq!(
            config.docs_resolved.source_dir,
            before.docs_resolved.source_dir
        );
    }

    #[test]
    fn test_expand_env_vars_site_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("FOLIO_TEST_SITE_HOST", "docs.example.com");
        }

        let toml = r#"
[site]
url = "https://${FOLIO_TEST_SITE_HOST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.site.url, "https://docs.example.com");

        unsafe {
            std::env::remove_var("FOLIO_TEST_SITE_HOST");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("FOLIO_MISSING_HOST_TEST");
        }

        let toml = r#"
[server]
host = "${FOLIO_MISSING_HOST_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_validate_debounce_too_long() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.debounce_ms = 60_000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("debounce_ms"));
    }

    #[test]
    fn test_validate_output_equals_source() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.docs_resolved.output_dir = PathBuf::from("/test/docs");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/folio.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[site]\ntitle = \"Guide\"\n\n[docs]\nsource_dir = \"src\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.site.title, "Guide");
        assert_eq!(config.docs_resolved.source_dir, dir.path().join("src"));
        assert_eq!(config.docs_resolved.output_dir, dir.path().join("_book"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_discover_from_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        let nested = dir.path().join("docs").join("guide");
        std::fs::create_dir_all(&nested).unwrap();

        let found = Config::discover_from(&nested).unwrap();

        assert_eq!(found, dir.path().join(CONFIG_FILENAME));
    }
}
