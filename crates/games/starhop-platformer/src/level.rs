use rand::Rng;
use serde::{Deserialize, Serialize};

use starhop_core::error::LevelError;

use crate::collision::Rect;
use crate::entities::{Enemy, Pickup};

/// Cell types for the level grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellKind {
    #[default]
    Empty,
    Solid,
    Hazard,
    /// Base of the goal portal. Walkable like `Solid`.
    PortalAnchor,
}

impl CellKind {
    /// Whether bodies collide with this cell.
    pub fn is_blocking(self) -> bool {
        matches!(self, CellKind::Solid | CellKind::PortalAnchor)
    }
}

/// A static grid of cells, stored row-major (y * cols + x), row 0 at the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    pub cols: u32,
    pub rows: u32,
    /// Edge length of one cell in world units.
    pub tile_size: f32,
    cells: Vec<CellKind>,
}

impl TileGrid {
    pub(crate) fn filled(cols: u32, rows: u32, tile_size: f32, kind: CellKind) -> Self {
        Self {
            cols,
            rows,
            tile_size,
            cells: vec![kind; (cols * rows) as usize],
        }
    }

    pub(crate) fn set(&mut self, x: u32, y: u32, kind: CellKind) {
        if x < self.cols && y < self.rows {
            self.cells[y as usize * self.cols as usize + x as usize] = kind;
        }
    }

    /// Cell lookup by grid coordinate. Anything outside the grid is `Empty`.
    pub fn get(&self, x: i32, y: i32) -> CellKind {
        if x < 0 || y < 0 || x >= self.cols as i32 || y >= self.rows as i32 {
            return CellKind::Empty;
        }
        self.cells[y as usize * self.cols as usize + x as usize]
    }

    /// Cell lookup by world position.
    pub fn tile_at(&self, x: f32, y: f32) -> CellKind {
        self.get(
            (x / self.tile_size).floor() as i32,
            (y / self.tile_size).floor() as i32,
        )
    }

    pub fn cell_rect(&self, x: i32, y: i32) -> Rect {
        Rect::new(
            x as f32 * self.tile_size,
            y as f32 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    pub fn world_width(&self) -> f32 {
        self.cols as f32 * self.tile_size
    }

    pub fn world_height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    /// Non-empty cells touching `view`, for renderers that only draw what the
    /// camera sees. Yields `(col, row, kind)`.
    pub fn visible_cells(&self, view: Rect) -> impl Iterator<Item = (u32, u32, CellKind)> + '_ {
        let ts = self.tile_size;
        let span = |lo: f32, hi: f32, len: u32| {
            let first = (lo / ts).floor().max(0.0) as u32;
            let last = ((hi / ts).ceil().max(0.0) as u32).min(len);
            first..last
        };
        let cols = span(view.x, view.right(), self.cols);
        let rows = span(view.y, view.bottom(), self.rows);
        rows.flat_map(move |y| cols.clone().map(move |x| (x, y)))
            .filter_map(move |(x, y)| {
                let kind = self.get(x as i32, y as i32);
                (kind != CellKind::Empty).then_some((x, y, kind))
            })
    }
}

/// Default edge length of a level cell in world units.
pub const DEFAULT_TILE_SIZE: f32 = 32.0;
/// Horizontal patrol speed enemies start with (units/s).
pub const ENEMY_SPEED: f32 = 120.0;
/// Spawn cell used when a level has no `'p'` marker.
const FALLBACK_SPAWN_CELL: (u32, u32) = (1, 1);

/// The built-in level: 40x17 cells, six hearts, three patrols, one portal.
pub const DEFAULT_LEVEL: &[&str] = &[
    "1111111111111111111111111111111111111111",
    "1......................................1",
    "1......................................1",
    "1....................h.................1",
    "1..................11111...............1",
    "1......................................1",
    "1...............................h......1",
    "1..............h..e...........11111....1",
    "1............1111111...................1",
    "1......................................1",
    "1......h................h..............1",
    "1....11111............111111...........1",
    "1......................................1",
    "1......................................1",
    "1.p.....h..e...............e...........1",
    "1111111111111111ss111111111111ss11111411",
    "1111111111111111111111111111111111111111",
];

/// A loaded level: the static grid plus the entities and goal it spawned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub grid: TileGrid,
    pub pickups: Vec<Pickup>,
    pub enemies: Vec<Enemy>,
    pub portal: Rect,
    /// Top-left corner of the spawn cell in world units.
    pub spawn_x: f32,
    pub spawn_y: f32,
}

/// Build a level from rows of marker characters.
///
/// `'1'` solid, `'s'` hazard, `'4'` portal anchor, `'h'` heart pickup,
/// `'e'` patrol enemy, `'p'` player spawn; anything else is empty. Enemy
/// patrol direction is drawn from `rng`.
pub fn load_level<S: AsRef<str>>(
    rows: &[S],
    tile_size: f32,
    enemy_speed: f32,
    rng: &mut impl Rng,
) -> Result<Level, LevelError> {
    if !tile_size.is_finite() || tile_size <= 0.0 {
        return Err(LevelError::InvalidTileSize(tile_size));
    }
    let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
    if width == 0 {
        return Err(LevelError::EmptyGrid);
    }

    let mut grid = TileGrid::filled(width as u32, rows.len() as u32, tile_size, CellKind::Empty);
    let mut pickups = Vec::new();
    let mut enemies = Vec::new();
    let mut portal = None;
    let mut spawn = None;

    for (y, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        let found = row.chars().count();
        if found != width {
            return Err(LevelError::IrregularRow {
                row: y,
                expected: width,
                found,
            });
        }
        for (x, marker) in row.chars().enumerate() {
            let (cx, cy) = (x as u32, y as u32);
            let cell = grid.cell_rect(cx as i32, cy as i32);
            match marker {
                '1' => grid.set(cx, cy, CellKind::Solid),
                's' => grid.set(cx, cy, CellKind::Hazard),
                '4' => {
                    grid.set(cx, cy, CellKind::PortalAnchor);
                    portal.get_or_insert(Rect::new(
                        cell.x,
                        cell.y - tile_size,
                        tile_size,
                        tile_size * 2.0,
                    ));
                },
                'h' => pickups.push(Pickup::in_cell(cell)),
                'e' => {
                    let vx = if rng.random_bool(0.5) {
                        enemy_speed
                    } else {
                        -enemy_speed
                    };
                    enemies.push(Enemy::in_cell(cell, vx));
                },
                'p' => {
                    spawn.get_or_insert((cell.x, cell.y));
                },
                _ => {},
            }
        }
    }

    let portal = portal.ok_or(LevelError::MissingPortal)?;
    let (spawn_x, spawn_y) = spawn.unwrap_or((
        FALLBACK_SPAWN_CELL.0 as f32 * tile_size,
        FALLBACK_SPAWN_CELL.1 as f32 * tile_size,
    ));

    tracing::debug!(
        cols = grid.cols,
        rows = grid.rows,
        pickups = pickups.len(),
        enemies = enemies.len(),
        "Level loaded"
    );

    Ok(Level {
        grid,
        pickups,
        enemies,
        portal,
        spawn_x,
        spawn_y,
    })
}

/// On-disk level description, stored as TOML.
///
/// ```toml
/// tile_size = 32.0
/// rows = [
///     "1111",
///     "1p.1",
///     "1141",
/// ]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelFile {
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    pub rows: Vec<String>,
}

fn default_tile_size() -> f32 {
    DEFAULT_TILE_SIZE
}

impl LevelFile {
    /// The level compiled into the crate.
    pub fn builtin() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            rows: DEFAULT_LEVEL.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn parse(content: &str) -> Result<Self, LevelError> {
        toml::from_str(content).map_err(|e| LevelError::Parse(e.to_string()))
    }

    pub fn from_path(path: &str) -> Result<Self, LevelError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LevelError::Io(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    pub fn load(&self, enemy_speed: f32, rng: &mut impl Rng) -> Result<Level, LevelError> {
        load_level(&self.rows, self.tile_size, enemy_speed, rng)
    }
}
