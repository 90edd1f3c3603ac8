//! API key sources.
//!
//! The request pipeline only needs a [`CredentialProvider`]. Persisting a
//! key is the job of a [`KeyStore`]; the file-backed one is what the binary
//! uses.

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Keys this short are almost certainly truncated pastes.
pub const MIN_KEY_LEN: usize = 11;

/// Supplies the API key for the next request, if one is available.
pub trait CredentialProvider: Send + Sync {
    fn api_key(&self) -> Option<String>;
}

/// Local persistent string store for the API key.
pub trait KeyStore: Send + Sync {
    fn get_key(&self) -> Result<Option<String>>;
    fn set_key(&self, key: &str) -> Result<()>;
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A key known up front, such as one given on the command line.
pub struct StaticCredentials {
    key: Option<String>,
}

impl StaticCredentials {
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: non_blank(key),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> Option<String> {
        self.key.clone()
    }
}

/// Reads the key from an environment variable on every request.
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(API_KEY_ENV)
    }
}

impl CredentialProvider for EnvCredentials {
    fn api_key(&self) -> Option<String> {
        non_blank(std::env::var(&self.var).ok())
    }
}

/// First provider that yields a key wins.
pub struct ChainedCredentials {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainedCredentials {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }
}

impl CredentialProvider for ChainedCredentials {
    fn api_key(&self) -> Option<String> {
        self.providers.iter().find_map(|p| p.api_key())
    }
}

/// Key store backed by a single file.
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `$XDG_CONFIG_HOME/gemini-workbench/api_key`, else
    /// `~/.config/gemini-workbench/api_key`.
    pub fn default_path() -> Result<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| Path::new(&home).join(".config")))
            .ok_or_else(|| {
                Error::Config("cannot locate a config directory (HOME is not set)".to_string())
            })?;
        Ok(base.join("gemini-workbench").join("api_key"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyStore for FileKeyStore {
    fn get_key(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(non_blank(Some(contents))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_key(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.chars().count() < MIN_KEY_LEN {
            return Err(Error::Auth(
                "API key looks too short; check that it was pasted completely".to_string(),
            ));
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_private(&self.path, key)?;

        tracing::info!("Saved API key to {}", self.path.display());
        Ok(())
    }
}

impl CredentialProvider for FileKeyStore {
    fn api_key(&self) -> Option<String> {
        self.get_key().unwrap_or_else(|e| {
            tracing::warn!("Could not read API key from {}: {}", self.path.display(), e);
            None
        })
    }
}

/// Write `contents` to a file only the owner can read. New files are
/// created with mode 0600; an existing file is tightened before it is
/// truncated and rewritten.
#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.set_len(0)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)?;
    Ok(())
}
