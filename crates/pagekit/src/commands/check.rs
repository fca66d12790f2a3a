//! `pagekit check` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use pagekit_config::Config;
use pagekit_page::{AssetsCollection, Topology};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file (default: auto-discover pagekit.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails to load or a bundle
    /// references an unknown asset.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;

        match &config.config_path {
            Some(path) => output.status("Loaded", &path.display().to_string()),
            None => output.warning("no pagekit.toml found, using defaults"),
        }

        let topology = Topology::from(&config.topology);
        let assets = AssetsCollection::from_config(&config.assets)?;
        output.heading("Assets");
        for line in summarize(&topology, &assets) {
            output.detail(&line);
        }

        output.heading("Template paths");
        let mut missing = 0;
        for path in topology.template_paths() {
            if Path::new(path).is_dir() {
                output.status("Template", path);
            } else {
                missing += 1;
                output.status("Template", &format!("{path} (missing)"));
            }
        }

        if config.cache_resolved.enabled {
            output.status("Cache", &config.cache_resolved.dir.display().to_string());
        } else {
            output.status("Cache", "disabled");
        }

        if missing == 0 {
            output.status("Checked", "configuration OK");
        } else {
            output.warning(&format!("{missing} template path(s) not found"));
        }
        Ok(())
    }
}

/// Human-readable summary of registered assets and bundles.
fn summarize(topology: &Topology, assets: &AssetsCollection) -> Vec<String> {
    let mut lines = vec![
        format!("Base URL: {}", display_or_unset(topology.base_url())),
        format!("Libs URL: {}", display_or_unset(topology.libs_url())),
        format!(
            "Assets: {} script(s), {} style(s)",
            assets.script_count(),
            assets.style_count()
        ),
    ];
    for name in assets.collection_names() {
        if let Ok(bundle) = assets.collection(name) {
            lines.push(format!(
                "  {name}: {} header, {} footer, {} style(s)",
                bundle.scripts_header.len(),
                bundle.scripts_footer.len(),
                bundle.styles.len()
            ));
        }
    }
    lines
}

fn display_or_unset(url: &str) -> &str {
    if url.is_empty() { "(unset)" } else { url }
}
