//! Engine - the owned stead store and the account-level operations.
//!
//! The store maps usernames to `Arc<Mutex<Stead>>`. Every operation and the
//! tick hold a stead's mutex for the whole of their mutation, so a stead is
//! never observed half-updated. Lock order is always: sweep, store, then
//! steads in username order, then the activity log.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hkgi_logic::config::{ConfigError, EngineConfig};
use hkgi_logic::kinds::ItemKind;
use hkgi_logic::manifest::Manifest;
use hkgi_logic::stead::Stead;
use hkgi_logic::GameError;
use parking_lot::{Mutex, MutexGuard, RwLock};
use serde_json::{json, Value};

use crate::activity::{ActivityEntry, ActivityKind, ActivityLog};
use crate::snapshot::{serialize_stead, SteadView};

/// Shared handle to one user's stead
pub type SteadHandle = Arc<Mutex<Stead>>;

/// Main simulation engine
pub struct Engine {
    config: EngineConfig,
    manifest: Manifest,
    steads: RwLock<BTreeMap<String, SteadHandle>>,
    activity: Mutex<ActivityLog>,
    /// Held for a whole tick and while a save is cut
    sweep: Mutex<()>,
    /// Simulation clock in ms, advanced one period per tick
    clock_ms: AtomicU64,
}

impl Engine {
    /// Create an engine with no accounts
    pub fn new(config: EngineConfig, manifest: Manifest) -> Result<Self, ConfigError> {
        Self::with_steads(config, manifest, BTreeMap::new(), 0)
    }

    /// Create an engine around existing steads, e.g. from a save
    pub fn with_steads(
        config: EngineConfig,
        manifest: Manifest,
        steads: BTreeMap<String, Stead>,
        clock_ms: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let activity = ActivityLog::new(config.activity_retention_ms, config.activity_capacity);
        let steads = steads
            .into_iter()
            .map(|(name, stead)| (name, Arc::new(Mutex::new(stead))))
            .collect();
        Ok(Self {
            config,
            manifest,
            steads: RwLock::new(steads),
            activity: Mutex::new(activity),
            sweep: Mutex::new(()),
            clock_ms: AtomicU64::new(clock_ms),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Current simulation clock (ms)
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms.load(Ordering::Acquire)
    }

    /// Create an account with a fresh stead.
    pub fn signup(&self, username: &str) -> Result<(), GameError> {
        if username.trim().is_empty() {
            return Err(GameError::InvalidReference("empty username".into()));
        }
        {
            let mut steads = self.steads.write();
            if steads.contains_key(username) {
                return Err(GameError::UserExists(username.to_string()));
            }
            steads.insert(username.to_string(), Arc::new(Mutex::new(Stead::new())));
        }
        log::info!("new stead for {username}");
        self.activity_push(ActivityKind::Signup, json!({ "who": username }));
        Ok(())
    }

    /// Look up a user's stead handle.
    pub fn stead(&self, username: &str) -> Result<SteadHandle, GameError> {
        self.steads
            .read()
            .get(username)
            .cloned()
            .ok_or_else(|| GameError::UnknownUser(username.to_string()))
    }

    /// All usernames, sorted
    pub fn usernames(&self) -> Vec<String> {
        self.steads.read().keys().cloned().collect()
    }

    pub fn user_count(&self) -> usize {
        self.steads.read().len()
    }

    /// Move `items` from one stead to another, all or nothing.
    pub fn gift(
        &self,
        from: &str,
        to: &str,
        items: &BTreeMap<ItemKind, u64>,
    ) -> Result<(), GameError> {
        if from == to {
            return Err(GameError::InvalidReference(format!(
                "{from} can't gift to themselves"
            )));
        }
        if items.values().all(|qty| *qty == 0) {
            return Err(GameError::InvalidReference("empty gift".into()));
        }
        let giver = self.stead(from)?;
        let receiver = self.stead(to)?;

        {
            // Username order, so two crossing gifts can't deadlock.
            let (mut giver, mut receiver) = if from < to {
                let g = giver.lock();
                let r = receiver.lock();
                (g, r)
            } else {
                let r = receiver.lock();
                let g = giver.lock();
                (g, r)
            };
            if !giver.inventory.try_debit(items) {
                return Err(GameError::InsufficientFunds);
            }
            receiver.inventory.credit(items);
        }

        log::info!("{from} gifted {} item kinds to {to}", items.len());
        let items: BTreeMap<String, u64> = items.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        self.activity_push(
            ActivityKind::Gift,
            json!({ "from": from, "to": to, "items": items }),
        );
        Ok(())
    }

    /// Client-facing read model of a user's stead.
    pub fn serialize_stead(&self, username: &str) -> Result<SteadView, GameError> {
        let handle = self.stead(username)?;
        let stead = handle.lock();
        Ok(serialize_stead(&stead, &self.config))
    }

    /// Append an entry to the activity feed at the current clock.
    pub fn activity_push(&self, kind: ActivityKind, fields: Value) {
        let now = self.clock_ms();
        self.activity.lock().push(now, kind, fields);
    }

    /// Activity entries at or after `since_ms`
    pub fn recent_activity(&self, since_ms: u64) -> Vec<ActivityEntry> {
        self.activity.lock().since(since_ms)
    }

    /// Snapshot of every handle, so callers can lock steads one at a time
    /// without holding the store lock.
    pub(crate) fn handles(&self) -> Vec<(String, SteadHandle)> {
        self.steads
            .read()
            .iter()
            .map(|(name, handle)| (name.clone(), Arc::clone(handle)))
            .collect()
    }

    /// Advance the clock by one tick period and return the new time.
    pub(crate) fn advance_clock(&self) -> u64 {
        let period = self.config.tick_ms;
        self.clock_ms.fetch_add(period, Ordering::AcqRel) + period
    }

    pub(crate) fn sweep(&self) -> MutexGuard<'_, ()> {
        self.sweep.lock()
    }

    pub(crate) fn activity(&self) -> &Mutex<ActivityLog> {
        &self.activity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hkgi_logic::kinds::Family;

    fn engine() -> Engine {
        let manifest = Manifest::bundled().expect("bundled manifest");
        Engine::new(EngineConfig::default(), manifest).expect("default config")
    }

    #[test]
    fn test_signup() {
        let engine = engine();
        engine.signup("orpheus").unwrap();
        assert_eq!(engine.usernames(), vec!["orpheus".to_string()]);
        assert_eq!(
            engine.signup("orpheus"),
            Err(GameError::UserExists("orpheus".into()))
        );
        assert!(engine.signup("  ").is_err());
        assert_eq!(engine.recent_activity(0).len(), 1);
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = EngineConfig {
            tick_ms: 0,
            ..Default::default()
        };
        let manifest = Manifest::bundled().unwrap();
        assert!(Engine::new(config, manifest).is_err());
    }

    #[test]
    fn test_gift_moves_items() {
        let engine = engine();
        engine.signup("a").unwrap();
        engine.signup("b").unwrap();
        let seed = ItemKind::Seed(Family::Bbc);
        let items = BTreeMap::from([(seed, 1)]);

        engine.gift("b", "a", &items).unwrap();
        assert_eq!(engine.stead("a").unwrap().lock().inventory.count(seed), 2);
        assert_eq!(engine.stead("b").unwrap().lock().inventory.count(seed), 0);

        assert_eq!(engine.gift("b", "a", &items), Err(GameError::InsufficientFunds));
    }

    #[test]
    fn test_gift_errors() {
        let engine = engine();
        engine.signup("a").unwrap();
        let items = BTreeMap::from([(ItemKind::NestEgg, 1)]);
        assert!(matches!(
            engine.gift("a", "a", &items),
            Err(GameError::InvalidReference(_))
        ));
        assert_eq!(
            engine.gift("a", "nobody", &items),
            Err(GameError::UnknownUser("nobody".into()))
        );
        assert_eq!(
            engine.gift("nobody", "a", &items),
            Err(GameError::UnknownUser("nobody".into()))
        );
    }

    #[test]
    fn test_unknown_user_snapshot() {
        let engine = engine();
        assert!(matches!(
            engine.serialize_stead("ghost"),
            Err(GameError::UnknownUser(_))
        ));
    }
}
