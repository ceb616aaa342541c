use crate::foundation::core::{Canvas, Edges, Rect};

/// One of the four fixed photo positions, in drawing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl SlotPosition {
    pub const ALL: [SlotPosition; 4] = [
        SlotPosition::TopLeft,
        SlotPosition::TopRight,
        SlotPosition::BottomLeft,
        SlotPosition::BottomRight,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomLeft => 2,
            Self::BottomRight => 3,
        }
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    fn col(self) -> f64 {
        match self {
            Self::TopLeft | Self::BottomLeft => 0.0,
            Self::TopRight | Self::BottomRight => 1.0,
        }
    }

    fn row(self) -> f64 {
        match self {
            Self::TopLeft | Self::TopRight => 0.0,
            Self::BottomLeft | Self::BottomRight => 1.0,
        }
    }
}

/// Where a slot's photo goes, if anywhere.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellPlacement {
    /// Padded destination rectangle for the photo.
    Draw(Rect),
    /// Padding consumed the whole quadrant.
    Skip,
}

impl CellPlacement {
    pub fn rect(self) -> Option<Rect> {
        match self {
            Self::Draw(r) => Some(r),
            Self::Skip => None,
        }
    }
}

/// A valid 2×2 grid.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct GridLayout {
    /// Canvas minus margins.
    pub interior: Rect,
    /// Unpadded quadrants, indexed by [`SlotPosition::index`].
    pub quadrants: [Rect; 4],
    /// Padded photo placements, indexed by [`SlotPosition::index`].
    pub cells: [CellPlacement; 4],
}

impl GridLayout {
    pub fn cell(&self, slot: SlotPosition) -> CellPlacement {
        self.cells[slot.index()]
    }
}

/// Result of laying out the photo grid.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GridOutcome {
    Grid(GridLayout),
    /// Margins leave no interior on at least one axis; no photo rectangles exist.
    Degenerate { interior_width: f64, interior_height: f64 },
}

impl GridOutcome {
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate { .. })
    }

    /// Photo placement for `slot`; a degenerate grid skips every slot.
    pub fn cell(&self, slot: SlotPosition) -> CellPlacement {
        match self {
            Self::Grid(g) => g.cell(slot),
            Self::Degenerate { .. } => CellPlacement::Skip,
        }
    }
}

/// Split the canvas interior into four equal quadrants and inset each by `padding`.
///
/// All math is `f64`; sub-pixel rectangles are valid draw targets.
pub fn compute_grid(canvas: Canvas, margins: Edges, padding: Edges) -> GridOutcome {
    let x0 = f64::from(margins.left);
    let y0 = f64::from(margins.top);
    let interior_width = f64::from(canvas.width) - margins.horizontal();
    let interior_height = f64::from(canvas.height) - margins.vertical();

    if interior_width <= 0.0 || interior_height <= 0.0 {
        return GridOutcome::Degenerate {
            interior_width,
            interior_height,
        };
    }

    let qw = interior_width / 2.0;
    let qh = interior_height / 2.0;

    let mut quadrants = [Rect::ZERO; 4];
    let mut cells = [CellPlacement::Skip; 4];
    for slot in SlotPosition::ALL {
        let quad = Rect::from_origin_size(
            (x0 + slot.col() * qw, y0 + slot.row() * qh),
            (qw, qh),
        );
        quadrants[slot.index()] = quad;
        cells[slot.index()] = pad_cell(quad, padding);
    }

    GridOutcome::Grid(GridLayout {
        interior: Rect::from_origin_size((x0, y0), (interior_width, interior_height)),
        quadrants,
        cells,
    })
}

fn pad_cell(quad: Rect, padding: Edges) -> CellPlacement {
    let w = quad.width() - padding.horizontal();
    let h = quad.height() - padding.vertical();
    if w <= 0.0 || h <= 0.0 {
        return CellPlacement::Skip;
    }
    CellPlacement::Draw(Rect::from_origin_size(
        (
            quad.x0 + f64::from(padding.left),
            quad.y0 + f64::from(padding.top),
        ),
        (w, h),
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;
