//! Directory-based command loading.
//!
//! Layout: `<root>/<group>/<command>.toml`, one [`CommandInfo`] manifest
//! per file. The manifest's `group` defaults to its directory name, and its
//! handler is looked up in a [`HandlerCatalog`] by `handler` or, failing
//! that, by command name.

use super::Registry;
use crate::commands::{Command, CommandHandler, CommandInfo, CommandSource};
use crate::error::RegistrationError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Handlers available to manifests, by key.
#[derive(Default, Clone)]
pub struct HandlerCatalog {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `handler`, replacing any previous binding.
    pub fn bind(mut self, key: impl Into<String>, handler: impl CommandHandler + 'static) -> Self {
        self.handlers.insert(key.into(), Arc::new(handler));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(key.into(), handler);
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.handlers.keys().collect();
        keys.sort();
        f.debug_struct("HandlerCatalog").field("keys", &keys).finish()
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, RegistrationError> {
    let io_err = |source| RegistrationError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = std::fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    paths.sort();
    Ok(paths)
}

/// Read one manifest, filling the group from its directory.
fn read_manifest(path: &Path, group: &str) -> Result<CommandInfo, RegistrationError> {
    let content = std::fs::read_to_string(path).map_err(|source| RegistrationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut info: CommandInfo =
        toml::from_str(&content).map_err(|source| RegistrationError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
    if info.group.is_empty() {
        info.group = group.to_string();
    }
    Ok(info)
}

impl Registry {
    /// Register every command manifest under `dir`.
    ///
    /// Directories and files are visited in sorted order. The first failure
    /// stops loading; commands registered before it stay registered.
    pub fn register_commands_in(
        &self,
        dir: impl AsRef<Path>,
        catalog: &HandlerCatalog,
    ) -> Result<Vec<Arc<Command>>, RegistrationError> {
        let dir = dir.as_ref();
        let mut registered = Vec::new();

        for group_dir in sorted_entries(dir)?.into_iter().filter(|p| p.is_dir()) {
            let Some(group) = group_dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let group = group.to_string();
            for path in sorted_entries(&group_dir)? {
                if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                    debug!(path = %path.display(), "skipping non-manifest file");
                    continue;
                }
                let info = read_manifest(&path, &group)?;
                let key = info.handler.clone().unwrap_or_else(|| info.name.clone());
                let handler = catalog
                    .get(&key)
                    .ok_or_else(|| RegistrationError::UnboundHandler(info.name.clone()))?;
                registered.push(self.register_command(CommandSource::from_parts(info, handler))?);
            }
        }

        info!(dir = %dir.display(), count = registered.len(), "loaded command manifests");
        Ok(registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{ArgumentValues, CommandContext};
    use crate::config::ArgumentsConfig;
    use crate::error::CommandResult;
    use crate::events::EventBus;
    use crate::framework::Owners;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl CommandHandler for Noop {
        async fn run(&self, _ctx: &CommandContext, _args: ArgumentValues) -> CommandResult {
            Ok(())
        }
    }

    fn registry() -> Registry {
        let registry = Registry::new(
            ArgumentsConfig::default(),
            Arc::new(Owners::default()),
            EventBus::new(),
        );
        registry.register_default_types().unwrap();
        registry.register_group(("util", "Utility")).unwrap();
        registry
    }

    #[test]
    fn test_loads_manifests_by_directory() {
        let dir = tempfile::tempdir().unwrap();
        let util = dir.path().join("util");
        std::fs::create_dir(&util).unwrap();
        std::fs::write(
            util.join("echo.toml"),
            "name = \"echo\"\ndescription = \"Repeats you.\"\nhandler = \"say\"\n",
        )
        .unwrap();
        std::fs::write(util.join("notes.txt"), "ignored").unwrap();

        let registry = registry();
        let catalog = HandlerCatalog::new().bind("say", Noop);
        let loaded = registry.register_commands_in(dir.path(), &catalog).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].group_id, "util");
        assert!(registry.resolve_command("echo").is_some());
    }

    #[test]
    fn test_unbound_handler_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let util = dir.path().join("util");
        std::fs::create_dir(&util).unwrap();
        std::fs::write(util.join("echo.toml"), "name = \"echo\"\ndescription = \"x\"\n").unwrap();

        let err = registry()
            .register_commands_in(dir.path(), &HandlerCatalog::new())
            .unwrap_err();
        assert!(matches!(err, RegistrationError::UnboundHandler(ref n) if n == "echo"));
    }

    #[test]
    fn test_unreadable_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = registry()
            .register_commands_in(&missing, &HandlerCatalog::new())
            .unwrap_err();
        assert_eq!(err.error_code(), "io_error");
    }

    #[test]
    fn test_malformed_manifest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let util = dir.path().join("util");
        std::fs::create_dir(&util).unwrap();
        std::fs::write(util.join("bad.toml"), "name = ").unwrap();
        let err = registry()
            .register_commands_in(dir.path(), &HandlerCatalog::new().bind("bad", Noop))
            .unwrap_err();
        assert_eq!(err.error_code(), "manifest_error");
    }
}
