//! Configuration management for docgen.
//!
//! Parses `docgen.toml` with serde and discovers it in the current directory
//! or its parents. Relative paths are resolved against the directory holding
//! the config file. CLI settings are applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values support `${VAR}` and `${VAR:-default}`. Expanded fields:
//! - `site.root`, `site.output_dir`
//! - `export.path`
//! - `bibliography.path`
//! - `resolve.roots`
//! - `deps.command`
//! - `docs.root`, every `docs.pages` source and `docs.data_files` entry
//! - every `sources` URL

mod expand;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override `site.root`.
    pub site_root: Option<String>,
    /// Override `site.output_dir`.
    pub output_dir: Option<PathBuf>,
    /// Override `export.path`.
    pub export_path: Option<PathBuf>,
}

const CONFIG_FILENAME: &str = "docgen.toml";

const DEFAULT_ROOT: &str = "/";
const DEFAULT_OUTPUT_DIR: &str = "html";
const DEFAULT_TEST_PROJECT: &str = "docgen_test";
const DEFAULT_EXPORT: &str = "export.json";
const DEFAULT_SELF_PROJECT: &str = ".";

/// Standalone pages published when `docs.root` is set: `(name, title, source)`.
const DEFAULT_DOC_PAGES: [(&str, &str, &str); 9] = [
    ("overview", "mathlib overview", "docs/mathlib-overview.md"),
    ("tactic_writing", "tactic writing", "docs/extras/tactic_writing.md"),
    ("calc", "calc mode", "docs/extras/calc.md"),
    ("conv", "conv mode", "docs/extras/conv.md"),
    ("simp", "simplification", "docs/extras/simp.md"),
    (
        "well_founded_recursion",
        "well founded recursion",
        "docs/extras/well_founded_recursion.md",
    ),
    ("style", "style guide", "docs/contribute/style.md"),
    ("doc_style", "documentation style guide", "docs/contribute/doc.md"),
    ("naming", "naming conventions", "docs/contribute/naming.md"),
];

const DEFAULT_DATA_FILES: [&str; 3] =
    ["docs/100.yaml", "docs/undergrad.yaml", "docs/overview.yaml"];

/// Page names the site generates itself.
const GENERATED_PAGES: [&str; 8] = [
    "index",
    "404",
    "notes",
    "references",
    "tactics",
    "commands",
    "hole_commands",
    "attributes",
];

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    site: SiteConfigRaw,
    export: ExportConfigRaw,
    bibliography: Option<BibliographyConfigRaw>,
    resolve: ResolveConfigRaw,
    docs: DocsConfigRaw,
    /// Dependency listing command.
    pub deps: DepsConfig,
    /// Source URL root per project name.
    pub sources: BTreeMap<String, String>,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Resolved export configuration (set after loading).
    #[serde(skip)]
    pub export_resolved: ExportConfig,
    /// Resolved bibliography path, if configured.
    #[serde(skip)]
    pub bibliography_resolved: Option<PathBuf>,
    /// Resolved project roots, in configuration order.
    #[serde(skip)]
    pub roots: Vec<PathBuf>,
    /// Resolved standalone pages and data files.
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SiteConfigRaw {
    root: Option<String>,
    output_dir: Option<String>,
    test_project: Option<String>,
}

/// Resolved site output configuration.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SiteConfig {
    /// URL prefix of every link, ending in `/`.
    pub root: String,
    pub output_dir: PathBuf,
    /// Project whose modules do not record backreferences.
    pub test_project: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ExportConfigRaw {
    path: Option<String>,
    self_project: Option<String>,
}

/// Resolved export input configuration.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportConfig {
    pub path: PathBuf,
    /// Project of the generator's own declarations, which are not documented.
    pub self_project: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BibliographyConfigRaw {
    path: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ResolveConfigRaw {
    roots: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DocsConfigRaw {
    root: Option<String>,
    pages: Option<Vec<DocPageRaw>>,
    data_files: Option<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocPageRaw {
    name: String,
    title: String,
    source: String,
}

/// Standalone content copied from the library checkout.
///
/// Both lists are empty unless `docs.root` is set.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DocsConfig {
    pub pages: Vec<DocPage>,
    /// Files copied into the output root, such as `100.yaml`.
    pub data_files: Vec<PathBuf>,
}

/// A markdown file published as `{name}.html`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocPage {
    pub name: String,
    pub title: String,
    pub source: PathBuf,
}

/// Dependency listing configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DepsConfig {
    /// Program and arguments; the module source path is appended. Empty
    /// means no dependency edges.
    pub command: Vec<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.root`").
        field: String,
        /// Error message (e.g., "${`MATHLIB_REV`} not set").
        message: String,
    },
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `docgen.toml` in the current directory and its parents, falling
    /// back to defaults relative to the current directory.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.site_root {
            self.site_resolved.root.clone_from(root);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.site_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(export_path) = &settings.export_path {
            self.export_resolved.path.clone_from(export_path);
        }
    }

    /// Search `start` and its parents for `docgen.toml`.
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

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Defaults with paths relative to `base`.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self::default();
        // Nothing to expand or fail on in an empty config.
        config.resolve_paths(base);
        config
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Check resolved values. Called by [`Config::load`] after CLI settings
    /// are applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.site_resolved.root.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "site.root must end with '/', got {:?}",
                self.site_resolved.root
            )));
        }
        if self.site_resolved.test_project.is_empty() {
            return Err(ConfigError::Validation(
                "site.test_project cannot be empty".to_owned(),
            ));
        }
        for (project, url) in &self.sources {
            require_http_url(url, &format!("sources.{project}"))?;
        }
        if self.deps.command.first().is_some_and(String::is_empty) {
            return Err(ConfigError::Validation(
                "deps.command program cannot be empty".to_owned(),
            ));
        }
        let mut seen = BTreeSet::new();
        for page in &self.docs_resolved.pages {
            let name = page.name.as_str();
            if name.is_empty() || name.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "docs.pages name {name:?} must be a non-empty file stem"
                )));
            }
            if GENERATED_PAGES.contains(&name) || !seen.insert(name) {
                return Err(ConfigError::Validation(format!(
                    "docs.pages name {name:?} is already in use"
                )));
            }
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let env = expand::from_env();
        env.expand_all(&mut self.site.root, "site.root")?;
        env.expand_all(&mut self.site.output_dir, "site.output_dir")?;
        env.expand_all(&mut self.export.path, "export.path")?;
        env.expand_all(
            self.bibliography.as_mut().map(|b| &mut b.path),
            "bibliography.path",
        )?;
        env.expand_all(&mut self.resolve.roots, "resolve.roots")?;
        env.expand_all(&mut self.deps.command, "deps.command")?;
        env.expand_all(&mut self.docs.root, "docs.root")?;
        env.expand_all(
            self.docs.pages.iter_mut().flatten().map(|p| &mut p.source),
            "docs.pages",
        )?;
        env.expand_all(self.docs.data_files.iter_mut().flatten(), "docs.data_files")?;
        for (project, url) in &mut self.sources {
            env.expand(url, &format!("sources.{project}"))?;
        }
        Ok(())
    }

    /// Resolve relative paths against `config_dir` and fill in defaults.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.site_resolved = SiteConfig {
            root: self.site.root.clone().unwrap_or_else(|| DEFAULT_ROOT.to_owned()),
            output_dir: resolve(self.site.output_dir.as_deref(), DEFAULT_OUTPUT_DIR),
            test_project: self
                .site
                .test_project
                .clone()
                .unwrap_or_else(|| DEFAULT_TEST_PROJECT.to_owned()),
        };
        self.export_resolved = ExportConfig {
            path: resolve(self.export.path.as_deref(), DEFAULT_EXPORT),
            self_project: self
                .export
                .self_project
                .clone()
                .unwrap_or_else(|| DEFAULT_SELF_PROJECT.to_owned()),
        };
        self.bibliography_resolved = self
            .bibliography
            .as_ref()
            .map(|b| config_dir.join(&b.path));
        self.roots = self.resolve.roots.iter().map(|r| config_dir.join(r)).collect();
        self.docs_resolved = self.resolve_docs(config_dir);
    }

    fn resolve_docs(&self, config_dir: &Path) -> DocsConfig {
        let Some(root) = &self.docs.root else {
            return DocsConfig::default();
        };
        let root = config_dir.join(root);
        let pages = match &self.docs.pages {
            Some(pages) => pages
                .iter()
                .map(|p| DocPage {
                    name: p.name.clone(),
                    title: p.title.clone(),
                    source: root.join(&p.source),
                })
                .collect(),
            None => DEFAULT_DOC_PAGES
                .iter()
                .map(|&(name, title, source)| DocPage {
                    name: name.to_owned(),
                    title: title.to_owned(),
                    source: root.join(source),
                })
                .collect(),
        };
        let data_files = match &self.docs.data_files {
            Some(files) => files.iter().map(|f| root.join(f)).collect(),
            None => DEFAULT_DATA_FILES.iter().map(|f| root.join(f)).collect(),
        };
        DocsConfig { pages, data_files }
    }
}
