pub mod error;
pub mod memo;
pub mod packer;
pub mod render;
pub mod types;

pub use error::PackError;
pub use packer::{PackOptions, Packer, UnplaceablePolicy, optimize};
pub use types::{Layout, PanelRequest, PlacedPanel, Rect, StockSheet};
