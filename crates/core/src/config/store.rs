//! Persistence of the provider mapping.
//!
//! The registry treats load and save as opaque operations on an associative
//! structure. [`FileProviderStore`] keeps it in a JSON or YAML file,
//! [`MemoryProviderStore`] keeps it in memory for tests and embedding.

use crate::config::{ConfigFormat, RegistryConfig};
use crate::errors::CoreError;
use crate::providers::ProviderMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Durable storage for the provider mapping
pub trait ProviderStore: Send {
    /// Read the persisted mapping; `None` when nothing has been persisted yet
    fn load(&self) -> Result<Option<ProviderMap>, CoreError>;

    /// Replace the persisted mapping
    fn save(&mut self, providers: &ProviderMap) -> Result<(), CoreError>;

    /// Human-readable location for log messages
    fn location(&self) -> String;
}

/// Provider mapping stored in a single file
#[derive(Debug, Clone)]
pub struct FileProviderStore {
    path: PathBuf,
    format: ConfigFormat,
    pretty: bool,
}

impl FileProviderStore {
    /// Store at `path`, format inferred from the extension (JSON by default)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_config(&RegistryConfig::new(path))
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self {
            path: config.providers_path.clone(),
            format: config.resolved_format(),
            pretty: config.pretty,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    fn parse(&self, content: &str) -> Result<ProviderMap, CoreError> {
        let providers: ProviderMap = match self.format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        };
        Ok(providers)
    }

    fn render(&self, providers: &ProviderMap) -> Result<String, CoreError> {
        let content = match self.format {
            ConfigFormat::Json if self.pretty => serde_json::to_string_pretty(providers)?,
            ConfigFormat::Json => serde_json::to_string(providers)?,
            ConfigFormat::Yaml => serde_yaml::to_string(providers)?,
        };
        Ok(content)
    }

    fn temp_path(&self) -> PathBuf {
        let mut file_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }
}

impl ProviderStore for FileProviderStore {
    fn load(&self) -> Result<Option<ProviderMap>, CoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CoreError::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        self.parse(&content).map(Some)
    }

    fn save(&mut self, providers: &ProviderMap) -> Result<(), CoreError> {
        let content = self.render(providers)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Readers never see a half-written file.
        let temp_path = self.temp_path();
        fs::write(&temp_path, content)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    providers: Option<ProviderMap>,
    fail_saves: bool,
    save_count: usize,
}

/// In-memory store. Clones share the same state, so a test can keep a handle
/// after moving the store into a container.
#[derive(Debug, Clone, Default)]
pub struct MemoryProviderStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryProviderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a mapping
    pub fn with_providers(providers: ProviderMap) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.write() {
            state.providers = Some(providers);
        }
        store
    }

    /// Make subsequent saves fail
    pub fn set_fail_saves(&self, fail: bool) {
        if let Ok(mut state) = self.state.write() {
            state.fail_saves = fail;
        }
    }

    /// Currently persisted mapping
    pub fn snapshot(&self) -> Option<ProviderMap> {
        self.state.read().ok().and_then(|state| state.providers.clone())
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.state.read().map(|state| state.save_count).unwrap_or(0)
    }
}

impl ProviderStore for MemoryProviderStore {
    fn load(&self) -> Result<Option<ProviderMap>, CoreError> {
        let state = self.state.read().map_err(|_| CoreError::LockError {
            resource: "memory_provider_store".to_string(),
        })?;
        Ok(state.providers.clone())
    }

    fn save(&mut self, providers: &ProviderMap) -> Result<(), CoreError> {
        let mut state = self.state.write().map_err(|_| CoreError::LockError {
            resource: "memory_provider_store".to_string(),
        })?;

        if state.fail_saves {
            return Err(CoreError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "memory store is read-only",
            )));
        }

        state.providers = Some(providers.clone());
        state.save_count += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}
