use thiserror::Error;

use crate::types::{PanelInstance, PanelRequest, Rect};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("{what} must be non-zero, got {value}")]
    InvalidDimension { what: String, value: u32 },

    /// A panel fits the stock in neither orientation.
    #[error(
        "panel {width}x{height} (request {source_index}) does not fit in stock {stock_width}x{stock_height}"
    )]
    UnplaceablePanel {
        id: usize,
        source_index: usize,
        width: u32,
        height: u32,
        stock_width: u32,
        stock_height: u32,
    },
}

impl PackError {
    pub fn unplaceable(panel: &PanelInstance, stock: Rect) -> Self {
        Self::UnplaceablePanel {
            id: panel.id,
            source_index: panel.source,
            width: panel.rect.width,
            height: panel.rect.height,
            stock_width: stock.width,
            stock_height: stock.height,
        }
    }
}

/// Rejects zero stock or panel extents. Zero quantities are allowed and simply
/// contribute no panels.
pub fn validate(stock: Rect, requests: &[PanelRequest]) -> Result<(), PackError> {
    check_non_zero("stock width", stock.width)?;
    check_non_zero("stock height", stock.height)?;
    for (i, r) in requests.iter().enumerate() {
        check_non_zero(&format!("panel {} width", i + 1), r.width)?;
        check_non_zero(&format!("panel {} height", i + 1), r.height)?;
    }
    Ok(())
}

fn check_non_zero(what: &str, value: u32) -> Result<(), PackError> {
    if value == 0 {
        return Err(PackError::InvalidDimension {
            what: what.to_string(),
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_stock_rejected() {
        let err = validate(Rect::new(0, 7), &[]).unwrap_err();
        assert_eq!(
            err,
            PackError::InvalidDimension {
                what: "stock width".to_string(),
                value: 0
            }
        );
    }

    #[test]
    fn test_zero_panel_height_rejected() {
        let requests = [PanelRequest::new(1, 3, 1), PanelRequest::new(2, 0, 1)];
        let err = validate(Rect::new(4, 7), &requests).unwrap_err();
        assert_eq!(err.to_string(), "panel 2 height must be non-zero, got 0");
    }

    #[test]
    fn test_zero_quantity_allowed() {
        assert!(validate(Rect::new(4, 7), &[PanelRequest::new(1, 3, 0)]).is_ok());
    }

    #[test]
    fn test_unplaceable_message() {
        let panel = PanelInstance {
            id: 0,
            source: 0,
            rect: Rect::new(5, 12),
        };
        let err = PackError::unplaceable(&panel, Rect::new(4, 7));
        assert_eq!(
            err.to_string(),
            "panel 5x12 (request 0) does not fit in stock 4x7"
        );
    }
}
