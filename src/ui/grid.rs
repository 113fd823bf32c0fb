use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

pub const HORIZONTAL_MARGIN: u16 = 5;
pub const VERTICAL_MARGIN: u16 = 1;

/// Regions of the in-round screen. Shared by rendering and mouse hit-testing
/// so a click lands on the cell that was drawn there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundLayout {
    pub status: Rect,
    pub grid: Rect,
    pub timer: Rect,
    pub legend: Rect,
}

impl RoundLayout {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // status
                Constraint::Length(1), // padding
                Constraint::Min(3),    // grid
                Constraint::Length(1), // timer
                Constraint::Length(1), // legend
            ])
            .split(area);

        Self {
            status: chunks[0],
            grid: chunks[2],
            timer: chunks[3],
            legend: chunks[4],
        }
    }
}

/// Splits `area` into `rows * cols` cells, row-major.
pub fn cell_rects(area: Rect, rows: usize, cols: usize) -> Vec<Rect> {
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    row_areas
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, cols as u32); cols])
                .split(*row)
                .to_vec()
        })
        .collect()
}

/// Which cell, if any, sits under terminal position `(column, row)` on a
/// screen of size `area`.
pub fn cell_at(area: Rect, rows: usize, cols: usize, column: u16, row: u16) -> Option<usize> {
    let grid = RoundLayout::new(area).grid;
    cell_rects(grid, rows, cols)
        .iter()
        .position(|cell| cell.contains(Position::new(column, row)))
}
