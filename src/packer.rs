use tracing::{debug, trace, warn};

use crate::error::{PackError, validate};
use crate::memo::{CachedTail, CompositionKey, SheetCache};
use crate::types::{Layout, PanelInstance, PanelRequest, PlacedPanel, Rect, StockSheet};

/// What to do with panels that fit the stock in neither orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnplaceablePolicy {
    /// Stop with [`PackError::UnplaceablePanel`].
    #[default]
    Fail,
    /// Pack everything else and list the offenders in [`Layout::rejected`].
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackOptions {
    /// Use the recursive fill backed by a [`SheetCache`].
    pub memoize: bool,
    pub unplaceable: UnplaceablePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
    pub position: Position,
    pub rotated: bool,
}

pub struct Packer {
    stock: Rect,
    requests: Vec<PanelRequest>,
    options: PackOptions,
}

/// Packs `requests` onto as few `stock_width` x `stock_height` sheets as the
/// greedy fill manages, failing on panels that can never fit.
pub fn optimize(
    stock_width: u32,
    stock_height: u32,
    requests: &[PanelRequest],
) -> Result<Layout, PackError> {
    Packer::new(Rect::new(stock_width, stock_height), requests.to_vec()).solve()
}

impl Packer {
    pub fn new(stock: Rect, requests: Vec<PanelRequest>) -> Self {
        Self {
            stock,
            requests,
            options: PackOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PackOptions) -> Self {
        self.options = options;
        self
    }

    pub fn solve(&self) -> Result<Layout, PackError> {
        if self.options.memoize {
            let mut cache = SheetCache::new();
            let layout = self.solve_with_cache(&mut cache);
            debug!(hits = cache.hits(), misses = cache.misses(), "sheet cache");
            return layout;
        }

        validate(self.stock, &self.requests)?;
        let panels = expand_requests(&self.requests);
        if panels.is_empty() {
            return Ok(Layout::empty(self.stock));
        }
        self.fill_sheets(panels)
    }

    /// Recursive fill that consults and populates `cache`. The cache may be
    /// shared between calls; entries are keyed by stock size and composition.
    pub fn solve_with_cache(&self, cache: &mut SheetCache) -> Result<Layout, PackError> {
        validate(self.stock, &self.requests)?;
        let panels = expand_requests(&self.requests);
        let tail = pack_remaining(self.stock, self.options.unplaceable, panels, cache)?;
        Ok(Layout {
            sheets: tail.sheets,
            stock: self.stock,
            rejected: tail.rejected,
        })
    }

    fn fill_sheets(&self, mut remaining: Vec<PanelInstance>) -> Result<Layout, PackError> {
        let mut layout = Layout::empty(self.stock);

        while !remaining.is_empty() {
            let (sheet, leftover) = fill_sheet(self.stock, remaining);
            if sheet.panels.is_empty() {
                layout.rejected = stalled(self.stock, self.options.unplaceable, leftover)?;
                break;
            }
            debug!(
                sheet = layout.sheets.len() + 1,
                placed = sheet.panels.len(),
                remaining = leftover.len(),
                "filled sheet"
            );
            layout.sheets.push(sheet);
            remaining = leftover;
        }

        Ok(layout)
    }
}

/// Expands every request into single instances, largest area first. Ties keep
/// request order. Instance ids are positions in the returned arena.
pub fn expand_requests(requests: &[PanelRequest]) -> Vec<PanelInstance> {
    let mut pieces: Vec<(usize, Rect)> = Vec::new();
    for (source, r) in requests.iter().enumerate() {
        for _ in 0..r.quantity {
            pieces.push((source, r.rect()));
        }
    }
    pieces.sort_by(|a, b| b.1.area().cmp(&a.1.area()));

    pieces
        .into_iter()
        .enumerate()
        .map(|(id, (source, rect))| PanelInstance { id, source, rect })
        .collect()
}

/// Topmost, then leftmost position where `rect` (turned 90° if `rotated`) fits
/// on `sheet` without overlapping anything already placed.
pub fn find_best_position(sheet: &StockSheet, rect: Rect, rotated: bool) -> Option<Position> {
    let size = if rotated { rect.rotated() } else { rect };
    if !size.fits_in(&sheet.stock()) {
        return None;
    }

    let max_x = sheet.width - size.width;
    let max_y = sheet.height - size.height;
    for y in 0..=max_y {
        let mut x = 0;
        while x <= max_x {
            match sheet.panels.iter().find(|p| p.overlaps(x, y, size)) {
                None => return Some(Position { x, y }),
                // Every x short of the blocker's right edge still hits it.
                Some(blocker) => x = blocker.x + blocker.effective().width,
            }
        }
    }
    None
}

/// Picks the orientation whose best position is higher, then further left.
/// Equal positions go to the un-rotated orientation.
pub fn choose_fit(sheet: &StockSheet, rect: Rect) -> Option<Fit> {
    let upright = find_best_position(sheet, rect, false).map(|position| Fit {
        position,
        rotated: false,
    });
    if rect.is_square() {
        return upright;
    }
    let turned = find_best_position(sheet, rect, true).map(|position| Fit {
        position,
        rotated: true,
    });

    match (upright, turned) {
        (Some(u), Some(t)) => {
            if (t.position.y, t.position.x) < (u.position.y, u.position.x) {
                Some(t)
            } else {
                Some(u)
            }
        }
        (u, t) => u.or(t),
    }
}

/// Places as many `candidates` as fit on one fresh sheet, in order. Returns the
/// sheet and the candidates that did not fit, in their original order.
pub fn fill_sheet(stock: Rect, candidates: Vec<PanelInstance>) -> (StockSheet, Vec<PanelInstance>) {
    let mut sheet = StockSheet::new(stock);
    let mut leftover = Vec::new();

    for panel in candidates {
        match choose_fit(&sheet, panel.rect) {
            Some(fit) => sheet.panels.push(PlacedPanel::new(
                panel,
                fit.position.x,
                fit.position.y,
                fit.rotated,
            )),
            None => leftover.push(panel),
        }
    }

    (sheet, leftover)
}

fn pack_remaining(
    stock: Rect,
    policy: UnplaceablePolicy,
    remaining: Vec<PanelInstance>,
    cache: &mut SheetCache,
) -> Result<CachedTail, PackError> {
    if remaining.is_empty() {
        return Ok(CachedTail {
            sheets: Vec::new(),
            rejected: Vec::new(),
        });
    }

    let key = CompositionKey::new(stock, &remaining);
    if let Some(tail) = cache.lookup(&key, &remaining) {
        trace!(panels = remaining.len(), sheets = tail.sheets.len(), "sheet cache hit");
        return Ok(tail);
    }

    let (sheet, leftover) = fill_sheet(stock, remaining);
    let tail = if sheet.panels.is_empty() {
        CachedTail {
            sheets: Vec::new(),
            rejected: stalled(stock, policy, leftover)?,
        }
    } else {
        debug!(
            placed = sheet.panels.len(),
            remaining = leftover.len(),
            "filled sheet"
        );
        let mut tail = pack_remaining(stock, policy, leftover, cache)?;
        tail.sheets.insert(0, sheet);
        tail
    };

    cache.insert(key, tail.clone());
    Ok(tail)
}

/// An empty sheet accepted none of `panels`, so none of them can ever be placed.
fn stalled(
    stock: Rect,
    policy: UnplaceablePolicy,
    panels: Vec<PanelInstance>,
) -> Result<Vec<PanelInstance>, PackError> {
    match policy {
        UnplaceablePolicy::Fail => match panels.first() {
            Some(panel) => Err(PackError::unplaceable(panel, stock)),
            None => Ok(panels),
        },
        UnplaceablePolicy::Reject => {
            for p in &panels {
                warn!(panel = %p.rect, %stock, "panel does not fit stock, rejecting");
            }
            Ok(panels)
        }
    }
}
