use crate::types::StockSheet;

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 40.0;

/// Draws `sheet` as ASCII art scaled to fit an 80x40 character box, each panel
/// labelled with the extents it occupies.
pub fn render_sheet(sheet: &StockSheet) -> String {
    let scale = f64::min(
        MAX_WIDTH / sheet.width as f64,
        MAX_HEIGHT / sheet.height as f64,
    );
    let grid_w = (sheet.width as f64 * scale).round() as usize;
    let grid_h = (sheet.height as f64 * scale).round() as usize;

    if grid_w == 0 || grid_h == 0 {
        return String::new();
    }

    let mut grid = vec![vec![' '; grid_w + 1]; grid_h + 1];

    draw_rect(&mut grid, 0, 0, grid_w, grid_h);

    for p in &sheet.panels {
        let size = p.effective();
        let sx = (p.x as f64 * scale).round() as usize;
        let sy = (p.y as f64 * scale).round() as usize;
        let sw = (size.width as f64 * scale).round() as usize;
        let sh = (size.height as f64 * scale).round() as usize;

        if sw == 0 || sh == 0 {
            continue;
        }

        draw_rect(&mut grid, sx, sy, sw, sh);

        // Label only if it fits inside the border
        let label: Vec<char> = size.to_string().chars().collect();
        if sw > label.len() + 1 && sh > 1 {
            let cy = sy + sh / 2;
            let start_x = sx + (sw - label.len()) / 2;
            for (i, &ch) in label.iter().enumerate() {
                if let Some(cell) = grid.get_mut(cy).and_then(|row| row.get_mut(start_x + i)) {
                    *cell = ch;
                }
            }
        }
    }

    let mut result = String::new();
    for row in &grid {
        let line: String = row.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    let rows = grid.len();
    let cols = match grid.first() {
        Some(row) => row.len(),
        None => return,
    };

    let mut mark = |r: usize, c: usize, edge: char| {
        if r >= rows || c >= cols {
            return;
        }
        let cell = &mut grid[r][c];
        *cell = match (*cell, edge) {
            ('+', _) => '+',
            ('|', '-') | ('-', '|') => '+',
            _ => edge,
        };
    };

    for i in x..=x + w {
        mark(y, i, '-');
        mark(y + h, i, '-');
    }
    for j in y..=y + h {
        mark(j, x, '|');
        mark(j, x + w, '|');
    }
    for &cx in &[x, x + w] {
        for &cy in &[y, y + h] {
            if cy < rows && cx < cols {
                grid[cy][cx] = '+';
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PanelInstance, PlacedPanel, Rect};

    fn sheet_with(stock: Rect, panels: &[(u32, u32, u32, u32, bool)]) -> StockSheet {
        let mut sheet = StockSheet::new(stock);
        for (id, &(w, h, x, y, rotated)) in panels.iter().enumerate() {
            let instance = PanelInstance {
                id,
                source: id,
                rect: Rect::new(w, h),
            };
            sheet.panels.push(PlacedPanel::new(instance, x, y, rotated));
        }
        sheet
    }

    #[test]
    fn test_render_single_panel() {
        let sheet = sheet_with(Rect::new(100, 50), &[(100, 50, 0, 0, false)]);
        let output = render_sheet(&sheet);
        assert!(output.contains('+'));
        assert!(output.contains('-'));
        assert!(output.contains('|'));
        assert!(output.contains("100x50"));
    }

    #[test]
    fn test_render_rotated_label_uses_effective_size() {
        let sheet = sheet_with(Rect::new(100, 100), &[(30, 100, 0, 0, true)]);
        let output = render_sheet(&sheet);
        assert!(output.contains("100x30"));
        assert!(!output.contains("30x100"));
    }

    #[test]
    fn test_render_empty() {
        let sheet = StockSheet::new(Rect::new(100, 100));
        let output = render_sheet(&sheet);
        assert!(output.contains('+'));
        assert_eq!(output.lines().count(), 41);
    }
}
