use crate::Coordinates;

/// Square snapping grid for drag
/// positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    cell: i32,
}

impl Grid {
    pub const DEFAULT_CELL: i32 = 25;

    /// Returns `None` for a non-positive cell size.
    pub fn new(cell: i32) -> Option<Self> {
        (cell > 0).then_some(Self { cell })
    }

    pub fn cell(&self) -> i32 {
        self.cell
    }

    /// Rounds each axis to the nearest multiple of the cell size; exact
    /// halves go toward positive infinity.
    pub fn snap(&self, raw: Coordinates) -> Coordinates {
        Coordinates::new(self.snap_axis(raw.x), self.snap_axis(raw.y))
    }

    fn snap_axis(&self, value: i32) -> i32 {
        let cell = i64::from(self.cell);
        let shifted = i64::from(value) + cell / 2;
        let snapped = shifted.div_euclid(cell) * cell;
        snapped.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            cell: Self::DEFAULT_CELL,
        }
    }
}
