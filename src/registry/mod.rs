//! Command, group and argument-type registry.
//!
//! All three collections are insertion-ordered and keyed by identity.
//! Registration validates every invariant before touching state, so a
//! rejected call leaves the registry exactly as it was.
//!
//! Locks are always taken in the order commands, groups, unknown, types.

mod defaults;
mod loader;

pub use loader::HandlerCatalog;

use crate::commands::{Command, CommandSource, Group, GroupInfo};
use crate::config::ArgumentsConfig;
use crate::error::{RegistrationError, ValidationError};
use crate::events::{EventBus, FrameworkEvent};
use crate::framework::Owners;
use crate::types::ArgumentType;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Deferred construction of an argument type.
pub type TypeFactory = Box<dyn FnOnce(&Registry) -> Arc<dyn ArgumentType> + Send>;

/// What a registry accepts as an argument type.
pub enum TypeSource {
    Instance(Arc<dyn ArgumentType>),
    Factory(TypeFactory),
}

impl TypeSource {
    pub fn new(ty: impl ArgumentType + 'static) -> Self {
        Self::Instance(Arc::new(ty))
    }

    fn build(self, registry: &Registry) -> Arc<dyn ArgumentType> {
        match self {
            Self::Instance(ty) => ty,
            Self::Factory(factory) => factory(registry),
        }
    }
}

impl From<Arc<dyn ArgumentType>> for TypeSource {
    fn from(ty: Arc<dyn ArgumentType>) -> Self {
        Self::Instance(ty)
    }
}

/// Registry of commands, groups and argument types.
pub struct Registry {
    commands: RwLock<Vec<Arc<Command>>>,
    groups: RwLock<Vec<Arc<Group>>>,
    unknown: RwLock<Option<Arc<Command>>>,
    types: RwLock<Vec<Arc<dyn ArgumentType>>>,
    arguments: ArgumentsConfig,
    owners: Arc<Owners>,
    events: EventBus,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("commands", &self.commands.read().len())
            .field("groups", &self.groups.read().len())
            .field("types", &self.types.read().len())
            .finish()
    }
}

impl Registry {
    pub fn new(arguments: ArgumentsConfig, owners: Arc<Owners>, events: EventBus) -> Self {
        Self {
            commands: RwLock::new(Vec::new()),
            groups: RwLock::new(Vec::new()),
            unknown: RwLock::new(None),
            types: RwLock::new(Vec::new()),
            arguments,
            owners,
            events,
        }
    }

    pub fn arguments(&self) -> &ArgumentsConfig {
        &self.arguments
    }

    pub fn owners(&self) -> &Arc<Owners> {
        &self.owners
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ========================================================================
    // Groups
    // ========================================================================

    /// Register a group. A duplicate id is logged and the existing group
    /// returned.
    pub fn register_group(&self, info: impl Into<GroupInfo>) -> Result<Arc<Group>, RegistrationError> {
        let info = info.into();
        if info.id.is_empty() || info.id.to_lowercase() != info.id {
            return Err(ValidationError::GroupNotLowercase(info.id).into());
        }

        let mut groups = self.groups.write();
        if let Some(existing) = groups.iter().find(|g| g.id == info.id) {
            warn!(group = %info.id, "group is already registered, skipping");
            return Ok(existing.clone());
        }
        let group = Arc::new(Group::new(info, self.events.clone()));
        groups.push(group.clone());
        drop(groups);

        info!(group = %group.id, "group registered");
        self.events.emit(FrameworkEvent::GroupRegistered {
            group: group.id.clone(),
        });
        Ok(group)
    }

    /// Register several groups. Stops at the first failure; earlier
    /// registrations are kept.
    pub fn register_groups<I, G>(&self, groups: I) -> Result<Vec<Arc<Group>>, RegistrationError>
    where
        I: IntoIterator<Item = G>,
        G: Into<GroupInfo>,
    {
        groups.into_iter().map(|g| self.register_group(g)).collect()
    }

    /// Look up a group by exact (lowercased) id.
    pub fn resolve_group(&self, id: &str) -> Option<Arc<Group>> {
        let id = id.to_lowercase();
        self.groups.read().iter().find(|g| g.id == id).cloned()
    }

    /// Groups in registration order.
    pub fn groups(&self) -> Vec<Arc<Group>> {
        self.groups.read().clone()
    }

    /// Search groups by id or display name.
    ///
    /// With `exact`, only full matches count. Otherwise substrings match,
    /// but a single full match among them wins. An empty search returns
    /// every group.
    pub fn find_groups(&self, search: &str, exact: bool) -> Vec<Arc<Group>> {
        let groups = self.groups.read();
        if search.is_empty() {
            return groups.clone();
        }
        let search = search.to_lowercase();
        let is_exact = |g: &Group| g.id == search || g.name.to_lowercase() == search;

        let matched: Vec<Arc<Group>> = groups
            .iter()
            .filter(|g| {
                if exact {
                    is_exact(g)
                } else {
                    g.id.contains(&search) || g.name.to_lowercase().contains(&search)
                }
            })
            .cloned()
            .collect();
        if !exact && let Some(hit) = matched.iter().find(|g| is_exact(g)) {
            return vec![hit.clone()];
        }
        matched
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Build and register a command.
    pub fn register_command(
        &self,
        source: impl Into<CommandSource>,
    ) -> Result<Arc<Command>, RegistrationError> {
        let command = Arc::new(source.into().build(self)?);

        let mut commands = self.commands.write();
        for name in std::iter::once(&command.name).chain(&command.aliases) {
            if commands.iter().any(|c| c.answers_to(name)) {
                return Err(RegistrationError::DuplicateName(name.clone()));
            }
        }

        let groups = self.groups.read();
        let group = groups
            .iter()
            .find(|g| g.id == command.group_id)
            .cloned()
            .ok_or_else(|| RegistrationError::MissingGroup {
                command: command.name.clone(),
                group: command.group_id.clone(),
            })?;
        drop(groups);
        if group
            .commands()
            .iter()
            .any(|c| c.member_name == command.member_name)
        {
            return Err(RegistrationError::DuplicateMemberName {
                group: group.id.clone(),
                member: command.member_name.clone(),
            });
        }

        let mut unknown = self.unknown.write();
        if command.unknown {
            if let Some(existing) = unknown.as_ref() {
                return Err(RegistrationError::DuplicateUnknown(existing.name.clone()));
            }
            *unknown = Some(command.clone());
        }
        drop(unknown);

        command.attach_group(group.clone());
        group.push(&command);
        commands.push(command.clone());
        drop(commands);

        info!(command = %command.name, group = %command.group_id, "command registered");
        self.events.emit(FrameworkEvent::CommandRegistered {
            command: command.name.clone(),
        });
        Ok(command)
    }

    /// Register several commands. Stops at the first failure; earlier
    /// registrations are kept.
    pub fn register_commands<I, S>(&self, sources: I) -> Result<Vec<Arc<Command>>, RegistrationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<CommandSource>,
    {
        sources.into_iter().map(|s| self.register_command(s)).collect()
    }

    /// Swap a registered command for a new build with the same name and group.
    pub fn reregister_command(
        &self,
        source: impl Into<CommandSource>,
        old: &Arc<Command>,
    ) -> Result<Arc<Command>, RegistrationError> {
        let command = Arc::new(source.into().build(self)?);
        if command.name != old.name || command.group_id != old.group_id {
            return Err(RegistrationError::ReregisterMismatch {
                expected: format!("{}:{}", old.group_id, old.name),
            });
        }

        let mut commands = self.commands.write();
        let Some(index) = commands.iter().position(|c| Arc::ptr_eq(c, old)) else {
            return Err(RegistrationError::NotRegistered(old.name.clone()));
        };
        for alias in &command.aliases {
            if commands
                .iter()
                .any(|c| !Arc::ptr_eq(c, old) && c.answers_to(alias))
            {
                return Err(RegistrationError::DuplicateName(alias.clone()));
            }
        }

        let mut unknown = self.unknown.write();
        let old_was_unknown = unknown.as_ref().is_some_and(|u| Arc::ptr_eq(u, old));
        if command.unknown && unknown.is_some() && !old_was_unknown {
            let existing = unknown.as_ref().map(|u| u.name.clone()).unwrap_or_default();
            return Err(RegistrationError::DuplicateUnknown(existing));
        }
        if command.unknown {
            *unknown = Some(command.clone());
        } else if old_was_unknown {
            *unknown = None;
        }
        drop(unknown);

        if let Some(group) = old.group() {
            command.attach_group(group.clone());
            group.replace(old, &command);
        }
        commands[index] = command.clone();
        drop(commands);
        old.clear_throttles();

        info!(command = %command.name, "command reregistered");
        self.events.emit(FrameworkEvent::CommandReregistered {
            command: command.name.clone(),
        });
        Ok(command)
    }

    /// Remove a command, cancelling its throttle timers.
    pub fn unregister_command(&self, command: &Arc<Command>) -> Result<(), RegistrationError> {
        let mut commands = self.commands.write();
        let Some(index) = commands.iter().position(|c| Arc::ptr_eq(c, command)) else {
            return Err(RegistrationError::NotRegistered(command.name.clone()));
        };
        commands.remove(index);
        drop(commands);

        if let Some(group) = command.group() {
            group.remove(command);
        }
        let mut unknown = self.unknown.write();
        if unknown.as_ref().is_some_and(|u| Arc::ptr_eq(u, command)) {
            *unknown = None;
        }
        drop(unknown);
        command.clear_throttles();

        info!(command = %command.name, "command unregistered");
        self.events.emit(FrameworkEvent::CommandUnregistered {
            command: command.name.clone(),
        });
        Ok(())
    }

    /// Look up a command by exact name or alias, case-insensitively.
    pub fn resolve_command(&self, name: &str) -> Option<Arc<Command>> {
        let name = name.to_lowercase();
        let commands = self.commands.read();
        commands
            .iter()
            .find(|c| c.name == name)
            .or_else(|| commands.iter().find(|c| c.aliases.contains(&name)))
            .cloned()
    }

    /// Commands in registration order.
    pub fn commands(&self) -> Vec<Arc<Command>> {
        self.commands.read().clone()
    }

    /// The fallback command, if one is registered.
    pub fn unknown_command(&self) -> Option<Arc<Command>> {
        self.unknown.read().clone()
    }

    /// Search commands by name, alias or `group:member`.
    ///
    /// With `exact`, only full matches count. Otherwise substrings of names
    /// and aliases match, but a single full match among them wins. An
    /// empty search returns every command.
    pub fn find_commands(&self, search: &str, exact: bool) -> Vec<Arc<Command>> {
        let commands = self.commands.read();
        if search.is_empty() {
            return commands.clone();
        }
        let search = search.to_lowercase();
        let qualified = |c: &Command| format!("{}:{}", c.group_id, c.member_name) == search;

        let matched: Vec<Arc<Command>> = commands
            .iter()
            .filter(|c| {
                if exact {
                    c.answers_to(&search) || qualified(c)
                } else {
                    c.name.contains(&search)
                        || qualified(c)
                        || c.aliases.iter().any(|a| a.contains(&search))
                }
            })
            .cloned()
            .collect();
        if !exact && let Some(hit) = matched.iter().find(|c| c.answers_to(&search)) {
            return vec![hit.clone()];
        }
        matched
    }

    // ========================================================================
    // Argument types
    // ========================================================================

    /// Register an argument type. Duplicate ids are rejected.
    pub fn register_type(&self, source: impl Into<TypeSource>) -> Result<(), RegistrationError> {
        let ty = source.into().build(self);
        let id = ty.id().to_string();

        let mut types = self.types.write();
        if types.iter().any(|t| t.id() == id) {
            return Err(RegistrationError::DuplicateType(id));
        }
        types.push(ty);
        drop(types);

        debug!(id = %id, "argument type registered");
        self.events.emit(FrameworkEvent::TypeRegistered { id });
        Ok(())
    }

    /// Register several types. Stops at the first failure.
    pub fn register_types<I, T>(&self, sources: I) -> Result<(), RegistrationError>
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeSource>,
    {
        sources.into_iter().try_for_each(|s| self.register_type(s))
    }

    /// Register every built-in argument type.
    pub fn register_default_types(&self) -> Result<(), RegistrationError> {
        self.register_types(crate::types::builtin())
    }

    pub fn resolve_type(&self, id: &str) -> Option<Arc<dyn ArgumentType>> {
        self.types.read().iter().find(|t| t.id() == id).cloned()
    }

    /// Ids of the registered types in registration order.
    pub fn type_ids(&self) -> Vec<String> {
        self.types.read().iter().map(|t| t.id().to_string()).collect()
    }
}
