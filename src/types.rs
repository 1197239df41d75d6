use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rect {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub height: u32,
}

impl Rect {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn rotated(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    pub fn fits_in(&self, other: &Rect) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Accepts any JSON number that is a whole, non-negative value fitting in a `u32`,
/// so that clients sending `3.0` instead of `3` are not rejected.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a whole number between 0 and {}, got {}",
            u32::MAX,
            value
        )));
    }
    Ok(value as u32)
}

/// A requested panel size and how many of it to cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelRequest {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub height: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub quantity: u32,
}

impl PanelRequest {
    pub fn new(width: u32, height: u32, quantity: u32) -> Self {
        Self {
            width,
            height,
            quantity,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.width, self.height)
    }
}

/// One physical panel expanded from a request.
///
/// `id` is the instance's index in the arena built by one optimize call and
/// `source` the index of the request it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelInstance {
    pub id: usize,
    pub source: usize,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlacedPanel {
    pub id: usize,
    pub source: usize,
    /// Un-rotated extents, as requested.
    pub rect: Rect,
    pub x: u32,
    pub y: u32,
    pub rotated: bool,
}

impl PlacedPanel {
    pub fn new(panel: PanelInstance, x: u32, y: u32, rotated: bool) -> Self {
        Self {
            id: panel.id,
            source: panel.source,
            rect: panel.rect,
            x,
            y,
            rotated,
        }
    }

    /// Extents actually occupied on the sheet.
    pub fn effective(&self) -> Rect {
        if self.rotated {
            self.rect.rotated()
        } else {
            self.rect
        }
    }

    /// Strict interior intersection with the rectangle at `(x, y)` of size `size`.
    /// Shared edges do not count.
    pub fn overlaps(&self, x: u32, y: u32, size: Rect) -> bool {
        let own = self.effective();
        x < self.x + own.width
            && x + size.width > self.x
            && y < self.y + own.height
            && y + size.height > self.y
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockSheet {
    pub width: u32,
    pub height: u32,
    pub panels: Vec<PlacedPanel>,
}

impl StockSheet {
    pub fn new(stock: Rect) -> Self {
        Self {
            width: stock.width,
            height: stock.height,
            panels: Vec::new(),
        }
    }

    pub fn stock(&self) -> Rect {
        Rect::new(self.width, self.height)
    }

    pub fn used_area(&self) -> u64 {
        self.panels.iter().map(|p| p.rect.area()).sum()
    }

    pub fn waste_area(&self) -> u64 {
        self.stock().area() - self.used_area()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub sheets: Vec<StockSheet>,
    pub stock: Rect,
    /// Panels that fit the stock in neither orientation. Only populated under
    /// [`UnplaceablePolicy::Reject`](crate::packer::UnplaceablePolicy::Reject).
    pub rejected: Vec<PanelInstance>,
}

impl Layout {
    pub fn empty(stock: Rect) -> Self {
        Self {
            sheets: Vec::new(),
            stock,
            rejected: Vec::new(),
        }
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn panel_count(&self) -> usize {
        self.sheets.iter().map(|s| s.panels.len()).sum()
    }

    pub fn total_waste_percent(&self) -> f64 {
        let total_stock_area = self.stock.area() * self.sheets.len() as u64;
        let total_used: u64 = self.sheets.iter().map(StockSheet::used_area).sum();
        if total_stock_area == 0 {
            return 0.0;
        }
        (total_stock_area - total_used) as f64 / total_stock_area as f64 * 100.0
    }
}
