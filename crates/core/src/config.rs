use crate::error::ConfigError;
use crate::renamer::{Renamer, DEFAULT_TEMPLATE};
use crate::replacement::Replacements;
use crate::sanitize::PlatformMode;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The persisted "File Rename" settings group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameSettings {
    pub template: String,
    pub issue_number_padding: usize,
    pub use_smart_string_cleanup: bool,
    pub dir: Option<PathBuf>,
    pub move_to_dir: bool,
    pub strict: bool,
    pub replacements: Replacements,
}

impl Default for RenameSettings {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            issue_number_padding: 3,
            use_smart_string_cleanup: true,
            dir: None,
            move_to_dir: false,
            strict: false,
            replacements: Replacements::recommended(),
        }
    }
}

impl RenameSettings {
    /// Builds a renamer through its setters, so an out-of-range padding is
    /// rejected here rather than on the first render.
    pub fn to_renamer(&self) -> Result<Renamer, ConfigError> {
        let mut renamer = Renamer::default();
        renamer.set_template(self.template.clone());
        renamer.set_issue_zero_padding(self.issue_number_padding)?;
        renamer.set_smart_cleanup(self.use_smart_string_cleanup);
        renamer.set_move_to_dir(self.move_to_dir);
        renamer.set_platform_mode(if self.strict {
            PlatformMode::Universal
        } else {
            PlatformMode::Auto
        });
        renamer.set_replacements(self.replacements.clone());
        Ok(renamer)
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub settings_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("org", "comictagger", "comic-renamer")
        .context("could not determine the OS configuration directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        settings_path: config_dir.join("rename.toml"),
        config_dir,
    })
}

pub fn load_settings() -> Result<RenameSettings> {
    let paths = app_paths()?;
    load_settings_from(&paths.settings_path)
}

/// Missing files yield the default settings.
pub fn load_settings_from(path: &Path) -> Result<RenameSettings> {
    if !path.exists() {
        return Ok(RenameSettings::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read settings file: {}", path.display()))?;
    let settings = toml::from_str::<RenameSettings>(&raw)
        .with_context(|| format!("could not parse settings file: {}", path.display()))?;
    Ok(settings)
}

pub fn save_settings(settings: &RenameSettings) -> Result<()> {
    let paths = app_paths()?;
    save_settings_to(&paths.settings_path, settings)
}

pub fn save_settings_to(path: &Path, settings: &RenameSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("could not create settings directory: {}", parent.display())
        })?;
    }
    let body = toml::to_string_pretty(settings).context("could not serialize settings")?;
    fs::write(path, body)
        .with_context(|| format!("could not write settings file: {}", path.display()))?;
    Ok(())
}
