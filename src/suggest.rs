use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use rusqlite::Connection;

use crate::error::Result;
use crate::models::CategoryMapping;
use crate::statement::normalize_description;

// ---------------------------------------------------------------------------
// Token similarity
// ---------------------------------------------------------------------------

/// Tokens with no letters at all (store numbers, card fragments, transaction
/// IDs like "#4521") carry no category signal and are dropped before
/// comparison.
fn numeric_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\W*\d[\d\W]*$").expect("valid regex"))
}

pub fn tokenize(normalized: &str) -> HashSet<String> {
    normalized
        .split_whitespace()
        .filter(|t| !numeric_id_re().is_match(t))
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity over stop-token-stripped whitespace tokens. Both inputs
/// must already be normalized descriptions.
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let ta = tokenize(a);
    let tb = tokenize(b);
    let union = ta.union(&tb).count();
    if union == 0 {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count();
    shared as f64 / union as f64
}

// ---------------------------------------------------------------------------
// Mapping repository
// ---------------------------------------------------------------------------

/// Storage seam for the learned dictionary. The engine only ever reads the
/// full mapping set and upserts single confirmations through this trait.
pub trait MappingStore {
    fn all(&self) -> Result<Vec<CategoryMapping>>;
    fn upsert(&mut self, pattern_key: &str, category: &str, subcategory: &str) -> Result<()>;
}

pub struct SqliteMappingStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteMappingStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl MappingStore for SqliteMappingStore<'_> {
    fn all(&self) -> Result<Vec<CategoryMapping>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, pattern_key, category, subcategory, usage_count, last_used_at \
             FROM category_mappings",
        )?;
        let mappings = stmt
            .query_map([], |row| CategoryMapping::from_row(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(mappings)
    }

    fn upsert(&mut self, pattern_key: &str, category: &str, subcategory: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO category_mappings (pattern_key, category, subcategory, usage_count, last_used_at) \
             VALUES (?1, ?2, ?3, 1, datetime('now')) \
             ON CONFLICT(pattern_key, category, subcategory) \
             DO UPDATE SET usage_count = usage_count + 1, last_used_at = datetime('now')",
            rusqlite::params![pattern_key, category, subcategory],
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Suggestion engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub category: String,
    pub subcategory: String,
    pub confidence: f64,
}

pub struct SuggestionEngine<S: MappingStore> {
    store: S,
    threshold: f64,
}

impl<S: MappingStore> SuggestionEngine<S> {
    pub fn new(store: S, threshold: f64) -> Self {
        Self { store, threshold }
    }

    /// Two-stage lookup: exact pattern-key match, then similarity-ranked
    /// fuzzy match over the whole dictionary. Read-only; returns None when
    /// the best candidate falls below the configured threshold.
    pub fn suggest(&self, description: &str) -> Result<Option<Suggestion>> {
        let key = normalize_description(description);
        let mappings = self.store.all()?;

        if let Some(m) = mappings
            .iter()
            .filter(|m| m.pattern_key == key)
            .max_by(|a, b| {
                a.usage_count
                    .cmp(&b.usage_count)
                    .then_with(|| a.last_used_at.cmp(&b.last_used_at))
            })
        {
            let confidence = clamp01(0.6 + 0.05 * m.usage_count as f64);
            return Ok(Some(Suggestion {
                category: m.category.clone(),
                subcategory: m.subcategory.clone(),
                confidence,
            }));
        }

        let mut best: Option<(f64, &CategoryMapping)> = None;
        for m in &mappings {
            let sim = token_similarity(&key, &m.pattern_key);
            best = match best {
                None => Some((sim, m)),
                Some((best_sim, best_m)) => {
                    if better_fuzzy_candidate(sim, m, best_sim, best_m) {
                        Some((sim, m))
                    } else {
                        Some((best_sim, best_m))
                    }
                }
            };
        }

        match best {
            Some((sim, m)) if sim >= self.threshold => {
                let confidence = clamp01(sim * (0.5 + 0.05 * m.usage_count as f64).min(1.0));
                Ok(Some(Suggestion {
                    category: m.category.clone(),
                    subcategory: m.subcategory.clone(),
                    confidence,
                }))
            }
            _ => Ok(None),
        }
    }

    /// Record a user-confirmed category for a description. The only write
    /// path into the dictionary.
    pub fn confirm(&mut self, description: &str, category: &str, subcategory: &str) -> Result<()> {
        self.store
            .upsert(&normalize_description(description), category, subcategory)
    }
}

/// Highest similarity wins; on a similarity tie, higher usage_count, then the
/// more recently used mapping.
fn better_fuzzy_candidate(
    sim: f64,
    m: &CategoryMapping,
    best_sim: f64,
    best: &CategoryMapping,
) -> bool {
    const EPS: f64 = 1e-9;
    if sim > best_sim + EPS {
        return true;
    }
    if sim < best_sim - EPS {
        return false;
    }
    match m.usage_count.cmp(&best.usage_count) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => m.last_used_at > best.last_used_at,
    }
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
pub(crate) struct InMemoryMappingStore {
    mappings: Vec<CategoryMapping>,
    tick: u64,
}

#[cfg(test)]
impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self {
            mappings: Vec::new(),
            tick: 0,
        }
    }
}

#[cfg(test)]
impl MappingStore for InMemoryMappingStore {
    fn all(&self) -> Result<Vec<CategoryMapping>> {
        Ok(self.mappings.clone())
    }

    fn upsert(&mut self, pattern_key: &str, category: &str, subcategory: &str) -> Result<()> {
        self.tick += 1;
        let stamp = format!("{:020}", self.tick);
        if let Some(m) = self.mappings.iter_mut().find(|m| {
            m.pattern_key == pattern_key && m.category == category && m.subcategory == subcategory
        }) {
            m.usage_count += 1;
            m.last_used_at = stamp;
        } else {
            self.mappings.push(CategoryMapping {
                id: self.mappings.len() as i64 + 1,
                pattern_key: pattern_key.to_string(),
                category: category.to_string(),
                subcategory: subcategory.to_string(),
                usage_count: 1,
                last_used_at: stamp,
            });
        }
        Ok(())
    }
}
