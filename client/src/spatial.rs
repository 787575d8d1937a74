use crate::projection::Bounds;

const GRID_COLS: usize = 32;
const GRID_ROWS: usize = 32;

/// A flat 2D spatial grid over world space for hit-testing shapes by bounding box.
/// Built once per layer, since layers never change after creation.
pub struct SpatialGrid {
    cells: Vec<Vec<usize>>,
    min_x: f64,
    min_y: f64,
    cell_w: f64,
    cell_h: f64,
}

impl SpatialGrid {
    /// Index entries by their bounds. Entry ids are positions in `bounds`.
    pub fn build(bounds: &[Bounds]) -> Self {
        let Some(world) = bounds
            .iter()
            .copied()
            .reduce(|acc, next| acc.union(&next))
        else {
            return Self {
                cells: Vec::new(),
                min_x: 0.0,
                min_y: 0.0,
                cell_w: 1.0,
                cell_h: 1.0,
            };
        };

        // Padding keeps single-point worlds from having zero-sized cells
        let world = world.expanded(1e-6);
        let cell_w = world.width() / GRID_COLS as f64;
        let cell_h = world.height() / GRID_ROWS as f64;

        let mut grid = Self {
            cells: vec![Vec::new(); GRID_COLS * GRID_ROWS],
            min_x: world.min_x,
            min_y: world.min_y,
            cell_w,
            cell_h,
        };

        for (idx, entry) in bounds.iter().enumerate() {
            let (col_start, col_end, row_start, row_end) = grid.cell_range(entry);
            for row in row_start..=row_end {
                for col in col_start..=col_end {
                    grid.cells[row * GRID_COLS + col].push(idx);
                }
            }
        }

        grid
    }

    /// Entries whose bounds may intersect `query`, ascending and without duplicates.
    pub fn candidates(&self, query: &Bounds) -> Vec<usize> {
        if self.cells.is_empty() || !self.world().intersects(query) {
            return Vec::new();
        }

        let (col_start, col_end, row_start, row_end) = self.cell_range(query);
        let mut found = Vec::new();
        for row in row_start..=row_end {
            for col in col_start..=col_end {
                found.extend_from_slice(&self.cells[row * GRID_COLS + col]);
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    fn world(&self) -> Bounds {
        Bounds {
            min_x: self.min_x,
            min_y: self.min_y,
            max_x: self.min_x + self.cell_w * GRID_COLS as f64,
            max_y: self.min_y + self.cell_h * GRID_ROWS as f64,
        }
    }

    fn cell_range(&self, bounds: &Bounds) -> (usize, usize, usize, usize) {
        let col = |x: f64| {
            ((x - self.min_x) / self.cell_w)
                .floor()
                .clamp(0.0, (GRID_COLS - 1) as f64) as usize
        };
        let row = |y: f64| {
            ((y - self.min_y) / self.cell_h)
                .floor()
                .clamp(0.0, (GRID_ROWS - 1) as f64) as usize
        };
        (
            col(bounds.min_x),
            col(bounds.max_x),
            row(bounds.min_y),
            row(bounds.max_y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Bounds {
        Bounds {
            min_x: x,
            min_y: y,
            max_x: x + size,
            max_y: y + size,
        }
    }

    #[test]
    fn finds_only_nearby_entries() {
        let grid = SpatialGrid::build(&[
            square(0.0, 0.0, 1.0),
            square(90.0, 90.0, 10.0),
            square(45.0, 45.0, 2.0),
        ]);

        assert_eq!(grid.candidates(&square(95.0, 95.0, 0.5)), vec![1]);
        assert_eq!(grid.candidates(&square(0.5, 0.5, 0.1)), vec![0]);
        assert!(grid.candidates(&square(500.0, 500.0, 1.0)).is_empty());
    }

    #[test]
    fn large_queries_return_each_entry_once() {
        let grid = SpatialGrid::build(&[square(0.0, 0.0, 100.0), square(10.0, 10.0, 1.0)]);
        assert_eq!(grid.candidates(&square(-10.0, -10.0, 200.0)), vec![0, 1]);
    }

    #[test]
    fn single_point_world_is_searchable() {
        let grid = SpatialGrid::build(&[Bounds::from_point((3.0, 4.0))]);
        assert_eq!(grid.candidates(&square(2.9, 3.9, 0.2)), vec![0]);
    }

    #[test]
    fn empty_grid_finds_nothing() {
        let grid = SpatialGrid::build(&[]);
        assert!(grid.candidates(&square(0.0, 0.0, 1.0)).is_empty());
    }
}
