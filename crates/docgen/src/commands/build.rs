//! `docgen build` command implementation.

use std::path::PathBuf;

use clap::Args;
use docgen_bib::Bibliography;
use docgen_config::{CliSettings, Config};
use docgen_export::Export;
use docgen_resolve::{Corpus, RootResolver};
use docgen_site::{
    ASSETS_DIR, AssetMode, BuildConfig, CommandDependencyQuery, DependencyQuery, ExtraDoc,
    NoDependencies, SiteBuilder, SiteInputs, SourceLinks, build_dependency_graph,
};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    pub(crate) output_dir: Option<PathBuf>,

    /// URL prefix of every generated link, ending in `/` (overrides config).
    #[arg(long, env = "DOCGEN_SITE_ROOT")]
    pub(crate) site_root: Option<String>,

    /// Declaration export JSON (overrides config).
    #[arg(short, long)]
    pub(crate) export: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover docgen.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Symlink style.css and nav.js to the docgen source tree instead of
    /// writing copies.
    #[arg(short = 'l', long)]
    pub(crate) symlink: bool,

    /// Log progress at info level.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            site_root: self.site_root,
            output_dir: self.output_dir,
            export_path: self.export,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(
            config = ?config.config_path,
            roots = config.roots.len(),
            "Loaded configuration"
        );

        output.plan(&config.export_resolved.path, &config.site_resolved.output_dir);

        let export = Export::load(&config.export_resolved.path)?;
        let resolver = RootResolver::sorted_by_depth(config.roots.clone())?;
        let corpus = Corpus::separate(
            export.decls,
            export.mod_docs,
            &resolver,
            &config.export_resolved.self_project,
        )?;

        let query: Box<dyn DependencyQuery> =
            match CommandDependencyQuery::new(config.deps.command.clone()) {
                Some(command) => Box::new(command),
                None => Box::new(NoDependencies),
            };
        let graph = build_dependency_graph(&corpus, query.as_ref())?;

        let bibliography = match &config.bibliography_resolved {
            Some(path) => Bibliography::load(path)?,
            None => Bibliography::default(),
        };

        let builder = SiteBuilder::new(BuildConfig {
            output_dir: config.site_resolved.output_dir.clone(),
            site_root: config.site_resolved.root.clone(),
            test_project: config.site_resolved.test_project.clone(),
            sources: SourceLinks::new(config.sources.clone()),
            extra_docs: config
                .docs_resolved
                .pages
                .iter()
                .map(|page| ExtraDoc {
                    name: page.name.clone(),
                    title: page.title.clone(),
                    source: page.source.clone(),
                })
                .collect(),
            data_files: config.docs_resolved.data_files.clone(),
            assets: if self.symlink {
                AssetMode::Symlink(PathBuf::from(ASSETS_DIR))
            } else {
                AssetMode::Embedded
            },
        });
        let summary = builder.build(SiteInputs {
            corpus,
            graph,
            notes: export.notes,
            instances: export.instances,
            tactic_docs: export.tactic_docs,
            bibliography,
        })?;

        output.built(&summary, &config.site_resolved.output_dir);
        Ok(())
    }
}
