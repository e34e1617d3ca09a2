use serde::{Deserialize, Serialize};

/// One (name, symbol) pair the feed monitors. Each entity is searched twice
/// upstream: once by name ("Bitcoin") and once by symbol ("BTC").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackedEntity {
    pub name: String,
    pub symbol: String,
}

impl TrackedEntity {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }

    /// The two search queries issued for this entity, name first.
    pub fn queries(&self) -> [&str; 2] {
        [&self.name, &self.symbol]
    }
}

/// The catalog shipped with the feed.
pub fn default_catalog() -> Vec<TrackedEntity> {
    vec![
        TrackedEntity::new("Bitcoin", "BTC"),
        TrackedEntity::new("XRP", "XRP"),
        TrackedEntity::new("Dogecoin", "DOGE"),
    ]
}

/// Parse a catalog from `Name:SYM,Name:SYM`.
///
/// Pairs missing either half are skipped. Symbols are upper-cased.
/// Returns the default catalog when nothing usable remains.
pub fn parse_catalog(raw: &str) -> Vec<TrackedEntity> {
    let parsed: Vec<TrackedEntity> = raw
        .split(',')
        .filter_map(|pair| {
            let (name, symbol) = pair.split_once(':')?;
            let (name, symbol) = (name.trim(), symbol.trim());
            if name.is_empty() || symbol.is_empty() {
                return None;
            }
            Some(TrackedEntity::new(name, symbol.to_uppercase()))
        })
        .collect();

    if parsed.is_empty() {
        default_catalog()
    } else {
        parsed
    }
}
