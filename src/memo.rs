//! Reuse of packings for remaining-panel compositions already seen.
//!
//! The key is structural: which sizes remain and how many of each, never which
//! instances or in what order. Cached sheets are re-bound onto the caller's
//! instances before they are handed back, so ids always refer to the current
//! arena.
//!
//! Within one call every remaining set is strictly smaller than the last, so a
//! fresh cache never hits. A cache kept across calls does, but then equal-area
//! panels of different shapes requested in another order get the tail packed
//! for the order seen first, which can differ from what a fresh fill produces.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::types::{PanelInstance, PlacedPanel, Rect, StockSheet};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositionKey {
    stock: Rect,
    /// `(width, height, count)` sorted by size.
    panels: Vec<(u32, u32, u32)>,
}

impl CompositionKey {
    pub fn new(stock: Rect, remaining: &[PanelInstance]) -> Self {
        let mut counts: BTreeMap<Rect, u32> = BTreeMap::new();
        for p in remaining {
            *counts.entry(p.rect).or_insert(0) += 1;
        }
        Self {
            stock,
            panels: counts
                .into_iter()
                .map(|(r, count)| (r.width, r.height, count))
                .collect(),
        }
    }
}

/// Sheets packed from some remaining set, plus whatever could not be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedTail {
    pub sheets: Vec<StockSheet>,
    pub rejected: Vec<PanelInstance>,
}

#[derive(Debug, Default)]
pub struct SheetCache {
    entries: HashMap<CompositionKey, CachedTail>,
    hits: u64,
    misses: u64,
}

impl SheetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `remaining` and, on a hit, returns the cached tail re-bound
    /// onto `remaining`'s instances.
    pub fn lookup(&mut self, key: &CompositionKey, remaining: &[PanelInstance]) -> Option<CachedTail> {
        let found = self
            .entries
            .get(key)
            .and_then(|tail| rebind(tail, remaining));
        match found {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        found
    }

    pub fn insert(&mut self, key: CompositionKey, tail: CachedTail) {
        self.entries.insert(key, tail);
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// Substitutes the instances of `remaining` into `tail`, matching by size and
/// handing out same-size instances in sheet then placement order. The result is
/// a valid packing of `remaining`, not necessarily the one a fresh fill of
/// `remaining` in its own order would produce.
fn rebind(tail: &CachedTail, remaining: &[PanelInstance]) -> Option<CachedTail> {
    let mut pool: HashMap<Rect, VecDeque<PanelInstance>> = HashMap::new();
    for p in remaining {
        pool.entry(p.rect).or_default().push_back(*p);
    }
    let mut take = |rect: Rect| pool.get_mut(&rect).and_then(VecDeque::pop_front);

    let mut sheets = Vec::with_capacity(tail.sheets.len());
    for sheet in &tail.sheets {
        let mut panels = Vec::with_capacity(sheet.panels.len());
        for p in &sheet.panels {
            let instance = take(p.rect)?;
            panels.push(PlacedPanel::new(instance, p.x, p.y, p.rotated));
        }
        sheets.push(StockSheet {
            width: sheet.width,
            height: sheet.height,
            panels,
        });
    }
    let rejected = tail
        .rejected
        .iter()
        .map(|p| take(p.rect))
        .collect::<Option<Vec<_>>>()?;

    Some(CachedTail { sheets, rejected })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(id: usize, w: u32, h: u32) -> PanelInstance {
        PanelInstance {
            id,
            source: id,
            rect: Rect::new(w, h),
        }
    }

    #[test]
    fn test_key_ignores_order_and_identity() {
        let stock = Rect::new(4, 7);
        let a = [instance(0, 2, 6), instance(1, 1, 3), instance(2, 1, 3)];
        let b = [instance(7, 1, 3), instance(9, 2, 6), instance(3, 1, 3)];
        let key = CompositionKey::new(stock, &a);
        assert_eq!(key, CompositionKey::new(stock, &b));

        let fewer = [instance(0, 2, 6), instance(1, 1, 3)];
        assert_ne!(key, CompositionKey::new(stock, &fewer));
    }

    #[test]
    fn test_key_separates_stock_sizes() {
        let panels = [instance(0, 1, 1)];
        assert_ne!(
            CompositionKey::new(Rect::new(4, 7), &panels),
            CompositionKey::new(Rect::new(7, 4), &panels)
        );
    }

    #[test]
    fn test_lookup_rebinds_ids() {
        let stock = Rect::new(4, 7);
        let first = [instance(0, 2, 6), instance(1, 1, 3)];
        let mut sheet = StockSheet::new(stock);
        sheet.panels.push(PlacedPanel::new(first[0], 0, 0, false));
        sheet.panels.push(PlacedPanel::new(first[1], 2, 0, false));

        let mut cache = SheetCache::new();
        let key = CompositionKey::new(stock, &first);
        cache.insert(
            key.clone(),
            CachedTail {
                sheets: vec![sheet],
                rejected: vec![],
            },
        );

        let second = [instance(10, 2, 6), instance(11, 1, 3)];
        let tail = cache.lookup(&key, &second).unwrap();
        let ids: Vec<usize> = tail.sheets[0].panels.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(tail.sheets[0].panels[1].x, 2);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_lookup_miss_counts() {
        let mut cache = SheetCache::new();
        let key = CompositionKey::new(Rect::new(4, 7), &[instance(0, 1, 1)]);
        assert!(cache.lookup(&key, &[instance(0, 1, 1)]).is_none());
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 0);
    }
}
