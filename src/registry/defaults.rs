//! Built-in groups, types and commands.

use super::Registry;
use crate::builtin;
use crate::config::DefaultsConfig;
use crate::error::RegistrationError;
use tracing::info;

impl Registry {
    /// Register the `commands` and `util` groups.
    pub fn register_default_groups(&self) -> Result<(), RegistrationError> {
        self.register_groups(builtin::groups())?;
        Ok(())
    }

    /// Register the built-in commands switched on in `defaults`.
    ///
    /// Their groups must already exist.
    pub fn register_default_commands(&self, defaults: &DefaultsConfig) -> Result<(), RegistrationError> {
        if defaults.help {
            self.register_command(builtin::help::source())?;
        }
        if defaults.prefix {
            self.register_command(builtin::prefix::source())?;
        }
        if defaults.ping {
            self.register_command(builtin::ping::source())?;
        }
        if defaults.command_state {
            self.register_commands([
                builtin::enable::source(),
                builtin::disable::source(),
                builtin::groups::source(),
            ])?;
        }
        if defaults.unknown_command {
            self.register_command(builtin::unknown_command::source())?;
        }
        Ok(())
    }

    /// Register types, groups and commands per `defaults`.
    pub fn register_defaults(&self, defaults: &DefaultsConfig) -> Result<(), RegistrationError> {
        if defaults.types {
            self.register_default_types()?;
        }
        if defaults.groups {
            self.register_default_groups()?;
        }
        self.register_default_commands(defaults)?;
        info!(
            commands = self.commands().len(),
            groups = self.groups().len(),
            types = self.type_ids().len(),
            "registered defaults"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArgumentsConfig;
    use crate::events::EventBus;
    use crate::framework::Owners;
    use std::sync::Arc;

    fn registry() -> Registry {
        Registry::new(
            ArgumentsConfig::default(),
            Arc::new(Owners::default()),
            EventBus::new(),
        )
    }

    #[test]
    fn test_full_defaults() {
        let registry = registry();
        registry.register_defaults(&DefaultsConfig::default()).unwrap();
        for name in ["help", "prefix", "ping", "enable", "disable", "groups", "unknown-command"] {
            assert!(registry.resolve_command(name).is_some(), "{name} missing");
        }
        assert!(registry.resolve_group("commands").unwrap().guarded);
        assert_eq!(registry.unknown_command().unwrap().name, "unknown-command");
        assert_eq!(registry.type_ids().len(), 15);
    }

    #[test]
    fn test_toggles_are_honoured() {
        let registry = registry();
        let defaults = DefaultsConfig {
            ping: false,
            unknown_command: false,
            ..DefaultsConfig::default()
        };
        registry.register_defaults(&defaults).unwrap();
        assert!(registry.resolve_command("ping").is_none());
        assert!(registry.unknown_command().is_none());
        assert!(registry.resolve_command("help").is_some());
    }

    #[test]
    fn test_types_only() {
        let registry = registry();
        let defaults = DefaultsConfig {
            types: true,
            ..DefaultsConfig::none()
        };
        registry.register_defaults(&defaults).unwrap();
        assert!(registry.commands().is_empty());
        assert!(registry.resolve_type("integer").is_some());
    }
}
