use crate::error::GameError;
use crate::types::{Color, Coord};

/// One slot of the bounding rectangle.
///
/// Cells outside the star are kept but marked non-playable so every in-range
/// coordinate has a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Occupant, `Color::None` when empty.
    pub current: Color,
    /// Arm this cell was carved out for. Fixed after setup.
    pub native: Color,
    /// Colour whose pieces count as "home" here.
    pub target: Color,
    pub playable: bool,
    pub king: bool,
}

impl Cell {
    pub const OFF_BOARD: Cell = Cell {
        current: Color::None,
        native: Color::None,
        target: Color::None,
        playable: false,
        king: false,
    };

    /// An empty cell of the central hexagon.
    pub const NEUTRAL: Cell = Cell {
        current: Color::None,
        native: Color::None,
        target: Color::None,
        playable: true,
        king: false,
    };

    pub fn arm(native: Color, target: Color, occupant: Color) -> Self {
        Cell {
            current: occupant,
            native,
            target,
            playable: true,
            king: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}

/// Offsets to every cell reachable by one hop, for (even row, odd row).
/// Rows are staggered, so the diagonal short steps depend on row parity while
/// the two-row jumps always land one column over.
const NEIGHBOR_OFFSETS: [[(i32, i32); 12]; 2] = [
    [
        (-1, 0),
        (1, 0),
        (0, -1),
        (1, -1),
        (0, 1),
        (1, 1),
        (-2, 0),
        (2, 0),
        (-1, -2),
        (1, -2),
        (-1, 2),
        (1, 2),
    ],
    [
        (-1, 0),
        (1, 0),
        (-1, -1),
        (0, -1),
        (-1, 1),
        (0, 1),
        (-2, 0),
        (2, 0),
        (-1, -2),
        (1, -2),
        (-1, 2),
        (1, 2),
    ],
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    columns: i32,
    rows: i32,
    cells: Vec<Cell>,
}

impl Board {
    pub const COLUMNS: i32 = 13;
    pub const ROWS: i32 = 17;

    /// A board with every cell off-board; the factory carves the star out.
    pub fn new(columns: i32, rows: i32) -> Self {
        let len = (columns.max(0) * rows.max(0)) as usize;
        Board {
            columns,
            rows,
            cells: vec![Cell::OFF_BOARD; len],
        }
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn contains(&self, c: Coord) -> bool {
        (1..=self.columns).contains(&c.x) && (1..=self.rows).contains(&c.y)
    }

    fn index(&self, c: Coord) -> Option<usize> {
        if self.contains(c) {
            Some(((c.y - 1) * self.columns + (c.x - 1)) as usize)
        } else {
            None
        }
    }

    /// The cell at `c`, or `None` when out of range.
    pub fn cell(&self, c: Coord) -> Option<&Cell> {
        self.index(c).map(|i| &self.cells[i])
    }

    fn playable_cell_mut(&mut self, c: Coord) -> Result<&mut Cell, GameError> {
        match self.index(c) {
            Some(i) if self.cells[i].playable => Ok(&mut self.cells[i]),
            _ => Err(GameError::IllegalCell { coord: c }),
        }
    }

    /// Replace the cell at `c` wholesale. Only board construction does this.
    pub fn set_cell(&mut self, c: Coord, cell: Cell) -> Result<(), GameError> {
        let i = self.index(c).ok_or(GameError::IllegalCell { coord: c })?;
        self.cells[i] = cell;
        Ok(())
    }

    pub fn is_playable(&self, c: Coord) -> bool {
        self.cell(c).is_some_and(|cell| cell.playable)
    }

    pub fn color_at(&self, c: Coord) -> Result<Color, GameError> {
        match self.cell(c) {
            Some(cell) if cell.playable => Ok(cell.current),
            _ => Err(GameError::IllegalCell { coord: c }),
        }
    }

    /// True only for a playable cell holding a piece.
    pub fn is_occupied(&self, c: Coord) -> bool {
        self.cell(c)
            .is_some_and(|cell| cell.playable && !cell.is_empty())
    }

    pub fn is_king(&self, c: Coord) -> bool {
        self.cell(c).is_some_and(|cell| cell.playable && cell.king)
    }

    pub fn place(&mut self, c: Coord, color: Color) -> Result<(), GameError> {
        self.playable_cell_mut(c)?.current = color;
        Ok(())
    }

    pub fn clear(&mut self, c: Coord) -> Result<(), GameError> {
        let cell = self.playable_cell_mut(c)?;
        cell.current = Color::None;
        cell.king = false;
        Ok(())
    }

    pub fn set_king(&mut self, c: Coord, king: bool) -> Result<(), GameError> {
        self.playable_cell_mut(c)?.king = king;
        Ok(())
    }

    /// Every in-grid coordinate one hop away from `c`. Occupancy and
    /// playability are left to the caller.
    pub fn neighbors(&self, c: Coord) -> Vec<Coord> {
        let parity = if c.is_even_row() { 0 } else { 1 };
        NEIGHBOR_OFFSETS[parity]
            .iter()
            .map(|&(dx, dy)| c.offset(dx, dy))
            .filter(|&n| self.contains(n))
            .collect()
    }

    /// All coordinates, column by column.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (1..=self.columns).flat_map(move |x| (1..=self.rows).map(move |y| Coord::new(x, y)))
    }

    pub fn playable_coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.coords().filter(move |&c| self.is_playable(c))
    }

    /// Occupied playable cells in dump order.
    pub fn pieces(&self) -> Vec<(Color, Coord)> {
        self.playable_coords()
            .filter_map(|c| {
                let color = self.cell(c)?.current;
                (!color.is_none()).then_some((color, c))
            })
            .collect()
    }

    pub fn pieces_of(&self, color: Color) -> Vec<Coord> {
        self.playable_coords()
            .filter(|&c| self.cell(c).is_some_and(|cell| cell.current == color))
            .collect()
    }

    pub fn kings(&self) -> Vec<Coord> {
        self.playable_coords()
            .filter(|&c| self.is_king(c))
            .collect()
    }

    /// Empty every playable cell, then place the listed pieces.
    pub fn load_pieces(&mut self, pieces: &[(Color, Coord)]) -> Result<(), GameError> {
        for cell in self.cells.iter_mut().filter(|cell| cell.playable) {
            cell.current = Color::None;
            cell.king = false;
        }
        for &(color, c) in pieces {
            self.place(c, color)?;
        }
        Ok(())
    }

    /// Mark exactly the listed cells as holding kings.
    pub fn load_kings(&mut self, kings: &[Coord]) -> Result<(), GameError> {
        for cell in self.cells.iter_mut() {
            cell.king = false;
        }
        for &c in kings {
            self.set_king(c, true)?;
        }
        Ok(())
    }

    /// The `BOARD` payload: `COLOR x y` per piece, column by column.
    pub fn dump(&self) -> String {
        self.pieces()
            .iter()
            .map(|(color, c)| format!("{color} {c}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Reload occupancy from a [`Board::dump`] payload. Kings are cleared.
    pub fn load_dump(&mut self, dump: &str) -> Result<(), GameError> {
        let tokens: Vec<&str> = dump.split_whitespace().collect();
        if tokens.len() % 3 != 0 {
            return Err(GameError::malformed(dump));
        }
        let pieces = tokens
            .chunks_exact(3)
            .map(|t| {
                let color: Color = t[0].parse().map_err(|_| GameError::malformed(dump))?;
                let x = t[1].parse().map_err(|_| GameError::malformed(dump))?;
                let y = t[2].parse().map_err(|_| GameError::malformed(dump))?;
                Ok((color, Coord::new(x, y)))
            })
            .collect::<Result<Vec<_>, GameError>>()?;
        self.load_pieces(&pieces)
    }

    /// Every piece of `color` sits on a cell targeted at `color`.
    pub fn is_winner(&self, color: Color) -> bool {
        self.cells
            .iter()
            .filter(|cell| cell.playable && cell.current == color)
            .all(|cell| cell.target == color)
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
