//! The hex grid: exclusive owner of all surface cells.

use std::collections::{HashMap, HashSet, VecDeque};

use telluria_data::{Axial, HexCell};

/// Rectangular map stored as axial coordinates (odd-row offset fold).
/// The grid owns its cells; everything else refers back by coordinate.
#[derive(Debug, Clone)]
pub struct HexGrid {
    pub width: u32,
    pub height: u32,
    cells: HashMap<Axial, HexCell>,
}

impl HexGrid {
    pub fn new(width: u32, height: u32) -> Self {
        let mut cells = HashMap::with_capacity((width * height) as usize);
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let coord = Self::offset_to_axial(col, row);
                cells.insert(coord, HexCell::new(coord));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn offset_to_axial(col: i32, row: i32) -> Axial {
        Axial::new(col - row / 2, row)
    }

    pub fn axial_to_offset(coord: Axial) -> (i32, i32) {
        (coord.q + coord.r / 2, coord.r)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: Axial) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn cell(&self, coord: Axial) -> Option<&HexCell> {
        self.cells.get(&coord)
    }

    pub fn cell_mut(&mut self, coord: Axial) -> Option<&mut HexCell> {
        self.cells.get_mut(&coord)
    }

    pub fn cells(&self) -> impl Iterator<Item = &HexCell> {
        self.cells.values()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut HexCell> {
        self.cells.values_mut()
    }

    pub fn coords(&self) -> impl Iterator<Item = Axial> + '_ {
        self.cells.keys().copied()
    }

    /// Neighbours that exist on the map.
    pub fn neighbors(&self, coord: Axial) -> Vec<Axial> {
        coord
            .neighbors()
            .into_iter()
            .filter(|n| self.cells.contains_key(n))
            .collect()
    }

    /// Breadth-first shortest path over cells satisfying `passable`.
    /// Returns the path including both endpoints, or empty when
    /// unreachable or when either endpoint is off-grid or blocked.
    pub fn find_path<F>(&self, start: Axial, goal: Axial, passable: F) -> Vec<Axial>
    where
        F: Fn(&HexCell) -> bool,
    {
        let start_ok = self.cell(start).map(&passable).unwrap_or(false);
        let goal_ok = self.cell(goal).map(&passable).unwrap_or(false);
        if !start_ok || !goal_ok {
            return Vec::new();
        }
        if start == goal {
            return vec![start];
        }

        let mut frontier = VecDeque::new();
        let mut came_from: HashMap<Axial, Axial> = HashMap::new();
        let mut visited: HashSet<Axial> = HashSet::new();
        frontier.push_back(start);
        visited.insert(start);

        while let Some(current) = frontier.pop_front() {
            for next in current.neighbors() {
                if visited.contains(&next) {
                    continue;
                }
                let Some(cell) = self.cell(next) else { continue };
                if !passable(cell) {
                    continue;
                }
                visited.insert(next);
                came_from.insert(next, current);
                if next == goal {
                    let mut path = vec![goal];
                    let mut cursor = goal;
                    while let Some(prev) = came_from.get(&cursor) {
                        path.push(*prev);
                        cursor = *prev;
                    }
                    path.reverse();
                    return path;
                }
                frontier.push_back(next);
            }
        }
        Vec::new()
    }

    /// Default passability: land that is not high mountain or volcanic.
    pub fn find_land_path(&self, start: Axial, goal: Axial) -> Vec<Axial> {
        self.find_path(start, goal, |cell| cell.is_land && cell.terrain.is_passable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telluria_data::TerrainKind;

    fn grid_with_land_strip() -> HexGrid {
        let mut grid = HexGrid::new(10, 10);
        for q in 0..5 {
            let cell = grid.cell_mut(Axial::new(q, 0)).unwrap();
            cell.is_land = true;
            cell.terrain = TerrainKind::Plains;
        }
        grid
    }

    #[test]
    fn grid_has_width_times_height_cells() {
        let grid = HexGrid::new(10, 10);
        assert_eq!(grid.len(), 100);
    }

    #[test]
    fn path_along_passable_strip() {
        let grid = grid_with_land_strip();
        let path = grid.find_land_path(Axial::new(0, 0), Axial::new(4, 0));
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], Axial::new(0, 0));
        assert_eq!(path[4], Axial::new(4, 0));
    }

    #[test]
    fn path_to_offgrid_goal_is_empty() {
        let grid = grid_with_land_strip();
        assert!(grid
            .find_land_path(Axial::new(0, 0), Axial::new(10, 10))
            .is_empty());
    }

    #[test]
    fn ocean_blocks_pathfinding() {
        let mut grid = grid_with_land_strip();
        // Sink the middle of the strip.
        let cell = grid.cell_mut(Axial::new(2, 0)).unwrap();
        cell.is_land = false;
        cell.terrain = TerrainKind::Ocean;
        let path = grid.find_land_path(Axial::new(0, 0), Axial::new(4, 0));
        assert!(path.is_empty());
    }

    #[test]
    fn offset_round_trip() {
        for row in 0..8 {
            for col in 0..8 {
                let axial = HexGrid::offset_to_axial(col, row);
                assert_eq!(HexGrid::axial_to_offset(axial), (col, row));
            }
        }
    }
}
