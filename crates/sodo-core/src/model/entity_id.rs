// ── Core identity types ──
//
// Every device and connection carries an opaque string id. Ids minted
// in-process come from a millisecond clock that never repeats a value.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

// ── EntityId ────────────────────────────────────────────────────────

/// Opaque identifier for a device or connection.
///
/// Imported projects may carry ids in any shape; only freshly minted ids
/// follow the `cam_<millis>` / `conn_<millis>` pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ── IdGenerator ─────────────────────────────────────────────────────

pub const DEVICE_ID_PREFIX: &str = "cam";
pub const CONNECTION_ID_PREFIX: &str = "conn";

static GLOBAL: IdGenerator = IdGenerator::new();

/// Mints `<prefix>_<millis>` ids that are strictly increasing for the
/// lifetime of the generator, even when called twice within one millisecond.
#[derive(Debug)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Process-wide generator shared by every editor in this process.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Next tick: wall-clock millis, bumped past the previous tick if the
    /// clock stalled or went backwards.
    pub fn next_tick(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(current + 1);
            match self
                .last
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }

    /// Mint an id with `prefix`, skipping any value for which `taken` is true.
    pub fn mint(&self, prefix: &str, taken: impl Fn(&EntityId) -> bool) -> EntityId {
        loop {
            let id = EntityId(format!("{prefix}_{}", self.next_tick()));
            if !taken(&id) {
                return id;
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn entity_id_display_is_raw_string() {
        let id = EntityId::from("cam_1700000000000");
        assert_eq!(id.to_string(), "cam_1700000000000");
    }

    #[test]
    fn entity_id_serializes_transparently() {
        let id = EntityId::new("conn_42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"conn_42\"");
        let back: EntityId = serde_json::from_str("\"conn_42\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ticks_are_strictly_increasing() {
        let ids = IdGenerator::new();
        let mut previous = ids.next_tick();
        for _ in 0..1000 {
            let tick = ids.next_tick();
            assert!(tick > previous);
            previous = tick;
        }
    }

    #[test]
    fn mint_never_repeats() {
        let ids = IdGenerator::new();
        let minted: HashSet<_> = (0..500).map(|_| ids.mint("cam", |_| false)).collect();
        assert_eq!(minted.len(), 500);
    }

    #[test]
    fn mint_skips_taken_ids() {
        let ids = IdGenerator::new();
        let first = ids.mint("cam", |_| false);
        let tick: u64 = first.as_str().trim_start_matches("cam_").parse().unwrap();
        let blocked = EntityId::new(format!("cam_{}", tick + 1));
        let blocked_too = EntityId::new(format!("cam_{}", tick + 2));
        let next = ids.mint("cam", |id| *id == blocked || *id == blocked_too);
        assert_ne!(next, blocked);
        assert_ne!(next, blocked_too);
        assert!(next.as_str().starts_with("cam_"));
    }
}
