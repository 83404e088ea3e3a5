//! Path resolution and handlers for the `config` subcommands.

use std::path::{Path, PathBuf};

use sift_core::{Error, Result, SearchOptions};

use crate::cli::{Args, ConfigAction};

/// Directory name under the platform config directory.
pub const PROJECT_NAME: &str = "sift";

/// Options file name.
pub const OPTIONS_FILE: &str = "sift.toml";

/// Facet registry file name.
pub const FACETS_FILE: &str = "facets.json";

/// Addon descriptor directory name.
pub const ADDONS_DIR: &str = "addons";

/// Resolved locations of everything the plugin persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Options file.
    pub options: PathBuf,
    /// Addon descriptor directory.
    pub addons: PathBuf,
    /// Facet registry file.
    pub facets: PathBuf,
}

impl Paths {
    /// Resolve paths from the command line, falling back to the platform
    /// config directory.
    pub fn resolve(args: &Args) -> Result<Self> {
        let base = default_config_dir();
        let pick = |explicit: &Option<PathBuf>, name: &str| -> Result<PathBuf> {
            match (explicit, &base) {
                (Some(path), _) => Ok(path.clone()),
                (None, Some(dir)) => Ok(dir.join(name)),
                (None, None) => Err(Error::config(
                    "Could not determine config directory for this platform",
                )),
            }
        };

        Ok(Self {
            options: pick(&args.config, OPTIONS_FILE)?,
            addons: pick(&args.addons, ADDONS_DIR)?,
            facets: pick(&args.facets, FACETS_FILE)?,
        })
    }
}

/// `~/.config/sift` or the platform equivalent.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(PROJECT_NAME))
}

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
pub fn handle_config_command(paths: &Paths, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(&paths.options),
        ConfigAction::Show => {
            let options = SearchOptions::load(Some(paths.options.as_path()))?;
            print!("{}", render_options(&options)?);
            Ok(())
        }
        ConfigAction::Init { force } => {
            cmd_config_init(&paths.options, *force)?;
            println!("Options file created at {}", paths.options.display());
            Ok(())
        }
    }
}

/// Show the resolved options file path.
pub fn cmd_config_path(path: &Path) -> Result<()> {
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(file does not exist, run `{PROJECT_NAME} config init` to create it)");
    }
    Ok(())
}

/// Create a default options file.
pub fn cmd_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::config(format!(
            "Options file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }
    SearchOptions::default().save(path)
}

/// Options as TOML followed by their environment variables.
pub fn render_options(options: &SearchOptions) -> Result<String> {
    let mut out = options.to_toml_string()?;
    out.push('\n');
    for (key, value) in options.to_env_vars() {
        out.push_str(&format!("{key}={value}\n"));
    }
    Ok(out)
}
