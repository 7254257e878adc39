//! # Reachability
//!
//! Breadth-first search over stand cells, used to reject unsolvable draws.
//!
//! ## Moves
//!
//! - **Walk / fall**: step one column sideways into a passable cell, then
//!   drop straight down to the first stand. Dropping into lava fails.
//! - **Jump**: reach any stand at most `max_span` columns away and at most
//!   `max_rise` rows higher (any distance lower), provided the corridor is
//!   clear: straight up the take-off column to the higher of the two rows,
//!   across that row, then straight down the landing column.
//!
//! The corridor is deliberately conservative. A path the solver accepts is
//! one the physics can always execute; the reverse need not hold.

use std::collections::VecDeque;

use crate::config::JumpArc;
use crate::tile::Cell;
use crate::tilemap::Tilemap;

/// The set of stands reachable from a starting stand.
#[derive(Clone, Debug)]
pub struct StandSet {
    width: u32,
    /// Indexed `y * width + x`.
    reached: Vec<bool>,
    /// BFS depth of each reached cell.
    depth: Vec<u32>,
    count: usize,
}

impl StandSet {
    fn new(map: &Tilemap) -> Self {
        let cells = (map.width() * map.height()) as usize;
        Self {
            width: map.width(),
            reached: vec![false; cells],
            depth: vec![u32::MAX; cells],
            count: 0,
        }
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.width as i32 {
            return None;
        }
        let i = cell.y as usize * self.width as usize + cell.x as usize;
        (i < self.reached.len()).then_some(i)
    }

    /// Marks a cell; returns `false` if it was already reached.
    fn insert(&mut self, cell: Cell, depth: u32) -> bool {
        let Some(i) = self.index(cell) else {
            return false;
        };
        if self.reached[i] {
            return false;
        }
        self.reached[i] = true;
        self.depth[i] = depth;
        self.count += 1;
        true
    }

    /// Returns `true` if `cell` is reachable.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| self.reached[i])
    }

    /// Minimum number of moves to `cell`, if reachable.
    #[must_use]
    pub fn moves_to(&self, cell: Cell) -> Option<u32> {
        self.index(cell)
            .filter(|&i| self.reached[i])
            .map(|i| self.depth[i])
    }

    /// Number of reachable stands.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if nothing is reachable (the start was not a stand).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Every stand reachable from `start` under `jump`.
#[must_use]
pub fn reachable_stands(map: &Tilemap, start: Cell, jump: JumpArc) -> StandSet {
    let mut set = StandSet::new(map);
    if !map.is_stand(start.x, start.y) {
        return set;
    }

    let mut queue = VecDeque::new();
    set.insert(start, 0);
    queue.push_back((start, 0u32));

    let mut next = Vec::new();
    while let Some((cell, depth)) = queue.pop_front() {
        next.clear();
        neighbours(map, cell, jump, &mut next);
        for &n in &next {
            if set.insert(n, depth + 1) {
                queue.push_back((n, depth + 1));
            }
        }
    }

    set
}

/// Returns `true` if `goal` can be reached from `start`.
#[must_use]
pub fn is_reachable(map: &Tilemap, start: Cell, goal: Cell, jump: JumpArc) -> bool {
    reachable_stands(map, start, jump).contains(goal)
}

fn neighbours(map: &Tilemap, from: Cell, jump: JumpArc, out: &mut Vec<Cell>) {
    // Walk or fall off a ledge.
    for dx in [-1, 1] {
        let x = from.x + dx;
        if map.get(x, from.y).is_passable() {
            if let Some(landing) = drop_from(map, Cell::new(x, from.y)) {
                out.push(landing);
            }
        }
    }

    let span = jump.max_span as i32;
    let rise = jump.max_rise as i32;
    let bottom = map.height() as i32 - 1;

    for dx in -span..=span {
        if dx == 0 {
            continue;
        }
        let x = from.x + dx;
        if !map.in_bounds(x, 0) {
            continue;
        }
        for y in (from.y - rise).max(0)..=bottom {
            let to = Cell::new(x, y);
            if map.is_stand(x, y) && corridor_clear(map, from, to) {
                out.push(to);
            }
        }
    }
}

/// Falls from a passable cell to the first stand below it.
fn drop_from(map: &Tilemap, start: Cell) -> Option<Cell> {
    let mut y = start.y;
    while map.in_bounds(start.x, y) {
        if !map.get(start.x, y).is_passable() {
            return None;
        }
        if map.is_solid(start.x, y + 1) {
            return Some(Cell::new(start.x, y));
        }
        y += 1;
    }
    None
}

/// Up the take-off column, across the higher row, down the landing column.
fn corridor_clear(map: &Tilemap, from: Cell, to: Cell) -> bool {
    let top = from.y.min(to.y);
    let clear = |x: i32, y: i32| map.get(x, y).is_passable();

    (top..=from.y).all(|y| clear(from.x, y))
        && (top..=to.y).all(|y| clear(to.x, y))
        && (from.x.min(to.x)..=from.x.max(to.x)).all(|x| clear(x, top))
}
