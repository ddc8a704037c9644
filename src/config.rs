use std::path::{Path, PathBuf};

use crate::error::Error;

/// Project configuration loaded from `.texflat.toml`.
/// Keep patterns are path prefixes, relative to the project root, that the
/// cleanup pass never deletes.
pub struct Config {
    /// Fallback directory for include resolution, resolved relative to the
    /// directory holding the config file.
    pub bib_dir: Option<PathBuf>,
    /// Directories searched for referenced PDF assets, relative to the
    /// project root.
    pub graphics_dirs: Vec<String>,
    keep: Vec<String>,
}

/// Raw TOML structure for `.texflat.toml`.
#[derive(serde::Deserialize)]
struct TexflatTomlConfig {
    bib_dir: Option<String>,
    graphics_dirs: Option<Vec<String>>,
    #[serde(default)]
    keep: Vec<String>,
}

impl Config {
    /// Load config from `.texflat.toml` in the given directory.
    /// Returns conventional defaults if the file doesn't exist. Returns an
    /// error if the file exists but is malformed, never a silent fallback
    /// to defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let path = dir.join(".texflat.toml");
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::conventional_defaults());
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: TexflatTomlConfig = toml::from_str(&content)?;
        Ok(Self {
            bib_dir: raw.bib_dir.map(|d| dir.join(d)),
            graphics_dirs: raw.graphics_dirs.unwrap_or_else(default_graphics_dirs),
            keep: raw.keep,
        })
    }

    /// Defaults used when no config file exists: no bib fallback, the
    /// conventional graphics directories, nothing kept.
    fn conventional_defaults() -> Self {
        Self {
            bib_dir: None,
            graphics_dirs: default_graphics_dirs(),
            keep: Vec::new(),
        }
    }

    /// Check whether cleanup may delete a file at this root-relative path.
    /// A path survives when it starts with at least one keep prefix.
    pub fn should_delete(&self, relative_path: &str) -> bool {
        !self.keep.iter().any(|p| relative_path.starts_with(p.as_str()))
    }
}

/// Directories conventionally holding figures in a LaTeX project. The
/// project root itself is searched first.
fn default_graphics_dirs() -> Vec<String> {
    vec![
        ".".to_string(),
        "figures".to_string(),
        "images".to_string(),
        "img".to_string(),
        "graphics".to_string(),
    ]
}
