/// The eight grid directions, in the order growth visits them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Neighbor {
    West,
    East,
    North,
    South,
    NorthWest,
    SouthEast,
    SouthWest,
    NorthEast,
}

impl Neighbor {
    pub const ALL: [Neighbor; 8] = [
        Neighbor::West,
        Neighbor::East,
        Neighbor::North,
        Neighbor::South,
        Neighbor::NorthWest,
        Neighbor::SouthEast,
        Neighbor::SouthWest,
        Neighbor::NorthEast,
    ];

    pub fn offset(self) -> (i64, i64) {
        match self {
            Neighbor::West => (-1, 0),
            Neighbor::East => (1, 0),
            Neighbor::North => (0, -1),
            Neighbor::South => (0, 1),
            Neighbor::NorthWest => (-1, -1),
            Neighbor::SouthEast => (1, 1),
            Neighbor::SouthWest => (-1, 1),
            Neighbor::NorthEast => (1, -1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockCoord {
    pub x: u32,
    pub y: u32,
}

impl BlockCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &BlockCoord) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Partition of a canvas into square cells of `cell` pixels. The last row and
/// column may be partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    blocks_wide: u32,
    blocks_high: u32,
    cell: u32,
}

impl BlockGrid {
    pub fn new(width: u32, height: u32, cell: u32) -> Self {
        let cell = cell.max(1);
        Self {
            blocks_wide: width.div_ceil(cell),
            blocks_high: height.div_ceil(cell),
            cell,
        }
    }

    pub fn blocks_wide(&self) -> u32 {
        self.blocks_wide
    }

    pub fn blocks_high(&self) -> u32 {
        self.blocks_high
    }

    pub fn block_count(&self) -> usize {
        self.blocks_wide as usize * self.blocks_high as usize
    }

    pub fn origin(&self, block: BlockCoord) -> (u32, u32) {
        (block.x * self.cell, block.y * self.cell)
    }

    /// In-bounds 8-connected neighbors of `block`.
    pub fn neighbors(&self, block: BlockCoord) -> impl Iterator<Item = BlockCoord> + '_ {
        Neighbor::ALL.into_iter().filter_map(move |n| {
            let (dx, dy) = n.offset();
            let x = block.x as i64 + dx;
            let y = block.y as i64 + dy;
            if x < 0 || y < 0 || x >= self.blocks_wide as i64 || y >= self.blocks_high as i64 {
                return None;
            }
            Some(BlockCoord::new(x as u32, y as u32))
        })
    }

    pub fn visited(&self) -> VisitedBlocks {
        VisitedBlocks {
            marks: vec![false; self.block_count()],
            blocks_wide: self.blocks_wide,
            count: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisitedBlocks {
    marks: Vec<bool>,
    blocks_wide: u32,
    count: usize,
}

impl VisitedBlocks {
    fn slot(&self, block: BlockCoord) -> usize {
        block.y as usize * self.blocks_wide as usize + block.x as usize
    }

    pub fn contains(&self, block: BlockCoord) -> bool {
        self.marks[self.slot(block)]
    }

    /// Marks `block`, returning `false` if it was already marked.
    pub fn insert(&mut self, block: BlockCoord) -> bool {
        let slot = self.slot(block);
        if self.marks[slot] {
            return false;
        }
        self.marks[slot] = true;
        self.count += 1;
        true
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_rounds_partial_cells_up() {
        let grid = BlockGrid::new(45, 20, 20);
        assert_eq!((grid.blocks_wide(), grid.blocks_high()), (3, 1));
        assert_eq!(grid.origin(BlockCoord::new(2, 0)), (40, 0));
    }

    #[test]
    fn corner_has_three_neighbors() {
        let grid = BlockGrid::new(100, 100, 20);
        let found: Vec<_> = grid.neighbors(BlockCoord::new(0, 0)).collect();
        assert_eq!(
            found,
            vec![
                BlockCoord::new(1, 0),
                BlockCoord::new(0, 1),
                BlockCoord::new(1, 1)
            ]
        );
    }

    #[test]
    fn interior_neighbors_follow_fixed_order() {
        let grid = BlockGrid::new(100, 100, 20);
        let found: Vec<_> = grid.neighbors(BlockCoord::new(2, 2)).collect();
        assert_eq!(found.len(), 8);
        assert_eq!(found[0], BlockCoord::new(1, 2));
        assert_eq!(found[7], BlockCoord::new(3, 1));
    }

    #[test]
    fn single_cell_grid_has_no_neighbors() {
        let grid = BlockGrid::new(5, 5, 20);
        assert_eq!(grid.neighbors(BlockCoord::new(0, 0)).count(), 0);
    }

    #[test]
    fn visited_insert_reports_novelty() {
        let grid = BlockGrid::new(40, 40, 20);
        let mut visited = grid.visited();
        assert!(visited.insert(BlockCoord::new(1, 1)));
        assert!(!visited.insert(BlockCoord::new(1, 1)));
        assert!(visited.contains(BlockCoord::new(1, 1)));
        assert!(!visited.contains(BlockCoord::new(0, 1)));
        assert_eq!(visited.count(), 1);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = BlockCoord::new(0, 0);
        assert_eq!(a.distance(&BlockCoord::new(3, 4)), 5.0);
    }
}
