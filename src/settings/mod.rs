//! Tool settings: named profiles describing one base/snippets/target set each.
//!
//! The settings file is INI, one section per profile:
//!
//! ```ini
//! [php]
//! base = /usr/share/php/php.ini-production
//! target = /etc/php/php.ini
//! snippets = /etc/php/conf.d
//! suffix = .ini
//! ```
//!
//! Values from the file are overridden by `UPDATE_CONF_<PROFILE>__<KEY>`
//! environment variables, which are in turn overridden by command-line flags.

mod env;
mod sample;

pub use env::{ENV_PREFIX, EnvOverrides};
pub use sample::{InstallOutcome, SAMPLE_SETTINGS, install_sample};

use crate::core::{UpdaterBuilder, default_snippet_dir};
use crate::error::{Result, UpdateError};
use crate::sources::DEFAULT_SNIPPET_SUFFIX;
use crate::writer::DEFAULT_BACKUP_SUFFIX;
use config::{File, FileFormat};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One named profile. Every key is optional until resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    /// Base file
    pub base: Option<PathBuf>,
    /// Target file
    pub target: Option<PathBuf>,
    /// Snippet directory
    pub snippets: Option<PathBuf>,
    /// Snippet filename suffix
    pub suffix: Option<String>,
    /// Backup filename suffix
    pub backup_suffix: Option<String>,
}

impl Profile {
    /// Layer `over` on top of this profile; keys set in `over` win.
    pub fn overlay(self, over: Profile) -> Profile {
        Profile {
            base: over.base.or(self.base),
            target: over.target.or(self.target),
            snippets: over.snippets.or(self.snippets),
            suffix: over.suffix.or(self.suffix),
            backup_suffix: over.backup_suffix.or(self.backup_suffix),
        }
    }

    /// Fill in defaults and check that required keys are present.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::Settings`] if `base` or `target` is missing.
    pub fn resolve(self) -> Result<Invocation> {
        let base = non_empty_path(self.base)
            .ok_or_else(|| UpdateError::Settings("no base file configured".to_string()))?;
        let target = non_empty_path(self.target)
            .ok_or_else(|| UpdateError::Settings("no target file configured".to_string()))?;
        let snippet_dir =
            non_empty_path(self.snippets).unwrap_or_else(|| default_snippet_dir(&target));

        Ok(Invocation {
            base,
            snippet_dir,
            target,
            suffix: non_empty(self.suffix).unwrap_or_else(|| DEFAULT_SNIPPET_SUFFIX.to_string()),
            backup_suffix: non_empty(self.backup_suffix)
                .unwrap_or_else(|| DEFAULT_BACKUP_SUFFIX.to_string()),
        })
    }
}

fn non_empty_path(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Fully resolved paths for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Base file
    pub base: PathBuf,
    /// Snippet directory
    pub snippet_dir: PathBuf,
    /// Target file
    pub target: PathBuf,
    /// Snippet filename suffix
    pub suffix: String,
    /// Backup filename suffix
    pub backup_suffix: String,
}

impl Invocation {
    /// Updater builder pre-filled with these paths.
    pub fn builder(&self) -> UpdaterBuilder {
        UpdaterBuilder::new()
            .with_base(&self.base)
            .with_snippet_dir(&self.snippet_dir)
            .with_target(&self.target)
            .with_suffix(&self.suffix)
            .with_backup_suffix(&self.backup_suffix)
    }
}

/// All profiles from the settings file and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    profiles: BTreeMap<String, Profile>,
}

impl Settings {
    /// Load settings from an INI file plus environment overrides.
    ///
    /// When `required` is false a missing file is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::Settings`] if a required file is missing, the
    /// file is malformed, or a profile contains an unknown key.
    pub fn load(path: &Path, required: bool, env: EnvOverrides) -> Result<Self> {
        tracing::debug!(
            file = %path.display(),
            required,
            env = %env.name(),
            "loading settings"
        );

        let config = config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Ini).required(required))
            .add_source(env.into_source())
            .build()?;
        let profiles: BTreeMap<String, Profile> = config.try_deserialize()?;

        // Environment keys always arrive lowercased, so `[PHP]` from the file
        // and `php` from the environment can show up as separate tables.
        // Uppercase sorts first, which lets the lowercase one win.
        let mut folded: BTreeMap<String, Profile> = BTreeMap::new();
        for (name, profile) in profiles {
            let name = name.to_lowercase();
            let merged = match folded.remove(&name) {
                Some(existing) => existing.overlay(profile),
                None => profile,
            };
            folded.insert(name, merged);
        }

        Ok(Self { profiles: folded })
    }

    /// Look up a profile by name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::UnknownProfile`] if there is no such profile.
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(&name.to_lowercase())
            .ok_or_else(|| UpdateError::UnknownProfile(name.to_string()))
    }

    /// Profile names in sorted order.
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}
