//! SQLite-backed settings provider.
//!
//! One row per scope (`"global"` or a guild id) holding a JSON object.
//! Reads come from an in-memory cache loaded at `init`; writes replace the
//! whole row. The provider listens on the framework's event bus to persist
//! prefix and enable-flag changes, and re-applies stored flags to commands
//! and groups registered after it started.

use super::sync::{SettingBroadcaster, SettingChange};
use super::{PREFIX_KEY, Scope, SettingProvider, SettingsError, command_key, group_key};
use crate::events::FrameworkEvent;
use crate::framework::Framework;
use async_trait::async_trait;
use commando_model::GuildId;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);
static ORIGIN_COUNTER: AtomicU64 = AtomicU64::new(0);

type Cache = DashMap<Scope, Map<String, Value>>;

/// Settings stored in a SQLite `settings` table.
pub struct SqliteProvider {
    store: Store,
    tasks: Mutex<Vec<AbortHandle>>,
}

/// The parts shared with listener tasks.
#[derive(Clone)]
struct Store {
    pool: SqlitePool,
    cache: Arc<Cache>,
    broadcaster: Option<Arc<dyn SettingBroadcaster>>,
    origin: u64,
    /// Serialises cache mutation and the row write that follows it.
    write: Arc<tokio::sync::Mutex<()>>,
}

impl SqliteProvider {
    /// Connection acquire timeout.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Open (or create) the database at `path` and run migrations.
    ///
    /// `":memory:"` opens a private in-memory database.
    pub async fn connect(path: &str) -> Result<Self, SettingsError> {
        let pool = if path == ":memory:" {
            // Each call gets its own shared-cache database so parallel
            // tests never see each other's rows.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:commando-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );
            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                warn!(path = %parent.display(), error = %e, "Failed to create settings directory");
            }
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        };

        info!(path = %path, "Settings database connected");

        sqlx::migrate!("./migrations").run(&pool).await?;
        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous=NORMAL").execute(&pool).await?;

        let origin = (u64::from(std::process::id()) << 32)
            | (ORIGIN_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF_FFFF);

        Ok(Self {
            store: Store {
                pool,
                cache: Arc::new(DashMap::new()),
                broadcaster: None,
                origin,
                write: Arc::new(tokio::sync::Mutex::new(())),
            },
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Share global-scope changes with sibling processes.
    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn SettingBroadcaster>) -> Self {
        self.store.broadcaster = Some(broadcaster);
        self
    }

    /// Number of stored scopes (rows).
    pub async fn row_count(&self) -> Result<i64, SettingsError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM settings")
            .fetch_one(&self.store.pool)
            .await?;
        Ok(count)
    }

    /// Apply a change written by a sibling process.
    ///
    /// The sibling already persisted it, so only the cache and the
    /// framework's in-memory state are touched.
    pub fn apply_remote(&self, framework: &Framework, change: &SettingChange) {
        self.store.apply_remote(framework, change);
    }
}

impl std::fmt::Debug for SqliteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteProvider")
            .field("scopes", &self.store.cache.len())
            .field("origin", &self.store.origin)
            .finish()
    }
}

impl Store {
    async fn load(&self) -> Result<Vec<Scope>, SettingsError> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT guild, settings FROM settings")
            .fetch_all(&self.pool)
            .await?;

        let mut scopes = Vec::with_capacity(rows.len());
        for (guild, settings) in rows {
            let scope = match guild.parse::<Scope>() {
                Ok(scope) => scope,
                Err(e) => {
                    warn!(guild = %guild, error = %e, "Skipping settings row with bad scope");
                    continue;
                }
            };
            match serde_json::from_str::<Value>(&settings) {
                Ok(Value::Object(map)) => {
                    self.cache.insert(scope, map);
                    scopes.push(scope);
                }
                Ok(_) => warn!(scope = %scope, "Skipping settings row that is not an object"),
                Err(e) => warn!(scope = %scope, error = %e, "Skipping malformed settings row"),
            }
        }
        Ok(scopes)
    }

    async fn write_row(&self, scope: Scope, json: Option<String>) -> Result<(), SettingsError> {
        match json {
            Some(json) => {
                sqlx::query("INSERT OR REPLACE INTO settings (guild, settings) VALUES (?, ?)")
                    .bind(scope.to_string())
                    .bind(json)
                    .execute(&self.pool)
                    .await?;
            }
            None => {
                sqlx::query("DELETE FROM settings WHERE guild = ?")
                    .bind(scope.to_string())
                    .execute(&self.pool)
                    .await?;
            }
        }
        Ok(())
    }

    fn broadcast(&self, scope: Scope, key: &str, value: Option<Value>) -> Result<(), SettingsError> {
        if scope != Scope::Global {
            return Ok(());
        }
        let Some(broadcaster) = &self.broadcaster else {
            return Ok(());
        };
        broadcaster.publish(SettingChange {
            origin: self.origin,
            scope,
            key: key.to_string(),
            value,
        })
    }

    fn get(&self, scope: Scope, key: &str) -> Option<Value> {
        self.cache.get(&scope).and_then(|m| m.get(key).cloned())
    }

    async fn set(&self, scope: Scope, key: &str, value: Value) -> Result<Value, SettingsError> {
        {
            let _write = self.write.lock().await;
            let json = {
                let mut entry = self.cache.entry(scope).or_default();
                entry.insert(key.to_string(), value.clone());
                serde_json::to_string(&*entry)?
            };
            self.write_row(scope, Some(json)).await?;
        }
        self.broadcast(scope, key, Some(value.clone()))?;
        Ok(value)
    }

    async fn remove(&self, scope: Scope, key: &str) -> Result<Option<Value>, SettingsError> {
        let previous = {
            let _write = self.write.lock().await;
            let (previous, json) = {
                let Some(mut entry) = self.cache.get_mut(&scope) else {
                    return Ok(None);
                };
                let Some(previous) = entry.remove(key) else {
                    return Ok(None);
                };
                (previous, serde_json::to_string(&*entry)?)
            };
            self.write_row(scope, Some(json)).await?;
            previous
        };
        self.broadcast(scope, key, None)?;
        Ok(Some(previous))
    }

    async fn clear(&self, scope: Scope) -> Result<(), SettingsError> {
        let removed = {
            let _write = self.write.lock().await;
            let removed = self.cache.remove(&scope).map(|(_, map)| map);
            self.write_row(scope, None).await?;
            removed
        };
        for key in removed.into_iter().flat_map(|map| map.into_iter().map(|(k, _)| k)) {
            self.broadcast(scope, &key, None)?;
        }
        Ok(())
    }

    fn apply_remote(&self, framework: &Framework, change: &SettingChange) {
        if change.origin == self.origin {
            return;
        }
        match &change.value {
            Some(value) => {
                self.cache
                    .entry(change.scope)
                    .or_default()
                    .insert(change.key.clone(), value.clone());
            }
            None => {
                if let Some(mut entry) = self.cache.get_mut(&change.scope) {
                    entry.remove(&change.key);
                }
            }
        }
        debug!(scope = %change.scope, key = %change.key, "Applied remote setting change");
        apply_setting(framework, change.scope.guild_id(), &change.key, change.value.as_ref());
    }

    /// Push one scope's stored state into the framework.
    fn apply_scope(&self, framework: &Framework, scope: Scope) {
        let Some(settings) = self.cache.get(&scope).map(|m| m.value().clone()) else {
            return;
        };
        for (key, value) in &settings {
            apply_setting(framework, scope.guild_id(), key, Some(value));
        }
    }

    /// Re-apply stored flags for one key across every scope.
    fn apply_key(&self, framework: &Framework, key: &str) {
        let stored: Vec<(Scope, Value)> = self
            .cache
            .iter()
            .filter_map(|entry| entry.value().get(key).map(|v| (*entry.key(), v.clone())))
            .collect();
        for (scope, value) in stored {
            apply_setting(framework, scope.guild_id(), key, Some(&value));
        }
    }

    /// Persist a framework state change.
    async fn persist(&self, framework: &Framework, event: FrameworkEvent) -> Result<(), SettingsError> {
        match event {
            FrameworkEvent::CommandPrefixChange { guild, prefix } => {
                let scope = Scope::guild(guild);
                match prefix {
                    Some(prefix) => {
                        self.set(scope, PREFIX_KEY, Value::String(prefix)).await?;
                    }
                    None => {
                        self.remove(scope, PREFIX_KEY).await?;
                    }
                }
            }
            FrameworkEvent::CommandStatusChange { guild, command, enabled } => {
                self.set(Scope::guild(guild), &command_key(&command), Value::Bool(enabled))
                    .await?;
            }
            FrameworkEvent::GroupStatusChange { guild, group, enabled } => {
                self.set(Scope::guild(guild), &group_key(&group), Value::Bool(enabled))
                    .await?;
            }
            FrameworkEvent::CommandRegistered { command }
            | FrameworkEvent::CommandReregistered { command } => {
                self.apply_key(framework, &command_key(&command));
            }
            FrameworkEvent::GroupRegistered { group } => {
                self.apply_key(framework, &group_key(&group));
            }
            _ => {}
        }
        Ok(())
    }
}

/// Apply a stored value without emitting change events.
fn apply_setting(framework: &Framework, guild: Option<GuildId>, key: &str, value: Option<&Value>) {
    if key == PREFIX_KEY {
        let prefix = value.and_then(Value::as_str).map(str::to_string);
        framework.apply_prefix(guild, prefix);
        return;
    }
    let enabled = match value {
        Some(Value::Bool(enabled)) => *enabled,
        _ => return,
    };
    if let Some(name) = key.strip_prefix("cmd-") {
        if let Some(command) = framework.registry().resolve_command(name) {
            command.apply_enabled_in(guild, enabled);
        }
    } else if let Some(id) = key.strip_prefix("grp-")
        && let Some(group) = framework.registry().resolve_group(id)
    {
        group.apply_enabled_in(guild, enabled);
    }
}

#[async_trait]
impl SettingProvider for SqliteProvider {
    async fn init(&self, framework: &Arc<Framework>) -> Result<(), SettingsError> {
        // Subscribe before loading so no change slips between the two.
        let mut events = framework.events().subscribe_state();

        let scopes = self.store.load().await?;
        for scope in &scopes {
            self.store.apply_scope(framework, *scope);
        }
        info!(scopes = scopes.len(), "Settings loaded");

        let store = self.store.clone();
        let weak: Weak<Framework> = Arc::downgrade(framework);
        let listener = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(framework) = weak.upgrade() else {
                    break;
                };
                let name = event.name();
                if let Err(e) = store.persist(&framework, event).await {
                    warn!(event = name, error = %e, "Failed to persist setting");
                }
            }
        });

        let mut tasks = vec![listener.abort_handle()];

        if let Some(broadcaster) = &self.store.broadcaster {
            let mut changes = broadcaster.subscribe();
            let store = self.store.clone();
            let weak = Arc::downgrade(framework);
            let remote = tokio::spawn(async move {
                loop {
                    let change = match changes.recv().await {
                        Ok(change) => change,
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Missed remote setting changes");
                            continue;
                        }
                        Err(RecvError::Closed) => break,
                    };
                    let Some(framework) = weak.upgrade() else {
                        break;
                    };
                    store.apply_remote(&framework, &change);
                }
            });
            tasks.push(remote.abort_handle());
        }

        self.tasks.lock().extend(tasks);
        Ok(())
    }

    async fn destroy(&self) -> Result<(), SettingsError> {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        Ok(())
    }

    fn get(&self, scope: Scope, key: &str, default: Value) -> Value {
        self.store.get(scope, key).unwrap_or(default)
    }

    async fn set(&self, scope: Scope, key: &str, value: Value) -> Result<Value, SettingsError> {
        self.store.set(scope, key, value).await
    }

    async fn remove(&self, scope: Scope, key: &str) -> Result<Option<Value>, SettingsError> {
        self.store.remove(scope, key).await
    }

    async fn clear(&self, scope: Scope) -> Result<(), SettingsError> {
        self.store.clear(scope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_remove() {
        let provider = SqliteProvider::connect(":memory:").await.unwrap();
        let scope = Scope::Guild(GuildId(1));
        assert_eq!(provider.get(scope, "prefix", json!("!")), json!("!"));

        provider.set(scope, "prefix", json!("?")).await.unwrap();
        assert_eq!(provider.get(scope, "prefix", json!("!")), json!("?"));

        assert_eq!(provider.remove(scope, "prefix").await.unwrap(), Some(json!("?")));
        assert_eq!(provider.remove(scope, "prefix").await.unwrap(), None);
        assert_eq!(provider.get(scope, "prefix", json!("!")), json!("!"));
    }

    #[tokio::test]
    async fn test_one_row_per_scope() {
        let provider = SqliteProvider::connect(":memory:").await.unwrap();
        let scope = Scope::Guild(GuildId(1));
        provider.set(scope, "prefix", json!("?")).await.unwrap();
        provider.set(scope, "prefix", json!("?")).await.unwrap();
        provider.set(scope, "cmd-ping", json!(false)).await.unwrap();
        provider.set(Scope::Global, "prefix", json!("$")).await.unwrap();
        assert_eq!(provider.row_count().await.unwrap(), 2);

        provider.clear(scope).await.unwrap();
        assert_eq!(provider.row_count().await.unwrap(), 1);
        assert_eq!(provider.get(scope, "cmd-ping", json!(true)), json!(true));
    }

    #[tokio::test]
    async fn test_rows_survive_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.sqlite3");
        let path = path.to_str().unwrap();

        let provider = SqliteProvider::connect(path).await.unwrap();
        provider.set(Scope::Guild(GuildId(5)), "prefix", json!(">")).await.unwrap();
        drop(provider);

        let provider = SqliteProvider::connect(path).await.unwrap();
        let scopes = provider.store.load().await.unwrap();
        assert_eq!(scopes, vec![Scope::Guild(GuildId(5))]);
        assert_eq!(provider.get(Scope::Guild(GuildId(5)), "prefix", Value::Null), json!(">"));
    }

    #[tokio::test]
    async fn test_malformed_rows_are_skipped() {
        let provider = SqliteProvider::connect(":memory:").await.unwrap();
        sqlx::query("INSERT INTO settings (guild, settings) VALUES ('7', 'not json'), ('8', '{\"prefix\":\"+\"}')")
            .execute(&provider.store.pool)
            .await
            .unwrap();
        let scopes = provider.store.load().await.unwrap();
        assert_eq!(scopes, vec![Scope::Guild(GuildId(8))]);
    }

    #[tokio::test]
    async fn test_only_global_changes_are_broadcast() {
        let broadcaster = Arc::new(crate::settings::ChannelBroadcaster::new());
        let mut rx = broadcaster.subscribe();
        let provider = SqliteProvider::connect(":memory:")
            .await
            .unwrap()
            .with_broadcaster(broadcaster);

        provider.set(Scope::Guild(GuildId(1)), "prefix", json!("?")).await.unwrap();
        provider.set(Scope::Global, "userBlacklist", json!(["3"])).await.unwrap();

        let change = rx.recv().await.unwrap();
        assert_eq!(change.scope, Scope::Global);
        assert_eq!(change.key, "userBlacklist");
        assert!(rx.try_recv().is_err());
    }
}
