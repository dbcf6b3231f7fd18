//! Data-driven level table
//!
//! Levels are plain records: score goal, spawn mix, per-type boosts and an
//! optional maze. The simulation reads them and never generates them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maze wall bits, top(8) right(4) bottom(2) left(1)
pub const WALL_TOP: u8 = 0b1000;
pub const WALL_RIGHT: u8 = 0b0100;
pub const WALL_BOTTOM: u8 = 0b0010;
pub const WALL_LEFT: u8 = 0b0001;

/// Errors from ingesting a level table
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("level table is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("level table has no levels")]
    Empty,

    #[error("level {level}: score goal must be positive")]
    ZeroGoal { level: usize },

    #[error("level {level}: spawn ratio {ratio} outside 0..=1")]
    BadRatio { level: usize, ratio: f32 },

    #[error("level {level}: maze grid is empty")]
    EmptyMaze { level: usize },

    #[error("level {level}: maze row {row} has {found} cells, expected {expected}")]
    RaggedMaze {
        level: usize,
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("level {level}: maze {what} ({col}, {row}) is outside the {cols}x{rows} grid")]
    OutOfGrid {
        level: usize,
        what: &'static str,
        col: usize,
        row: usize,
        cols: usize,
        rows: usize,
    },
}

/// Gravity/speed multipliers for one body family
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    #[serde(default = "one")]
    pub grav: f32,
    #[serde(default = "one")]
    pub speed: f32,
}

fn one() -> f32 {
    1.0
}

impl Default for Boost {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl Boost {
    pub const NEUTRAL: Boost = Boost {
        grav: 1.0,
        speed: 1.0,
    };

    pub fn uniform(factor: f32) -> Self {
        Self {
            grav: factor,
            speed: factor,
        }
    }
}

/// Per-family boosts. Missing families stay neutral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeBoost {
    pub coin: Boost,
    pub hazard: Boost,
    pub elite: Boost,
}

impl TypeBoost {
    pub fn uniform(factor: f32) -> Self {
        Self {
            coin: Boost::uniform(factor),
            hazard: Boost::uniform(factor),
            elite: Boost::uniform(factor),
        }
    }
}

/// Which face of a cell a wall sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn bit(self) -> u8 {
        match self {
            Side::Top => WALL_TOP,
            Side::Right => WALL_RIGHT,
            Side::Bottom => WALL_BOTTOM,
            Side::Left => WALL_LEFT,
        }
    }

    /// Grid step (col, row) to the neighbour across this face
    pub fn offset(self) -> (isize, isize) {
        match self {
            Side::Top => (0, -1),
            Side::Right => (1, 0),
            Side::Bottom => (0, 1),
            Side::Left => (-1, 0),
        }
    }
}

/// A grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
}

impl Cell {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Neighbour across `side`, if it stays non-negative
    pub fn neighbor(self, side: Side) -> Option<Cell> {
        let (dc, dr) = side.offset();
        Some(Cell {
            col: self.col.checked_add_signed(dc)?,
            row: self.row.checked_add_signed(dr)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MazeItemKind {
    Health,
}

/// An item placed at the centre of a maze cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeItem {
    pub cell: Cell,
    pub kind: MazeItemKind,
}

/// A wall face that pulls the ship when it is in an adjacent cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttractorWall {
    pub cell: Cell,
    pub side: Side,
}

/// Maze layout: rows of 4-bit wall masks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeDefinition {
    pub grid: Vec<Vec<u8>>,
    pub entry: Cell,
    pub exit: Cell,
    #[serde(default)]
    pub items: Vec<MazeItem>,
    #[serde(default)]
    pub attractor_walls: Vec<AttractorWall>,
}

impl MazeDefinition {
    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn cols(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    /// Wall mask of a cell; out-of-range cells have no walls
    pub fn walls(&self, cell: Cell) -> u8 {
        self.grid
            .get(cell.row)
            .and_then(|row| row.get(cell.col))
            .copied()
            .unwrap_or(0)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows() && cell.col < self.cols()
    }

    fn validate(&self, level: usize) -> Result<(), TuningError> {
        let expected = self.cols();
        if self.rows() == 0 || expected == 0 {
            return Err(TuningError::EmptyMaze { level });
        }
        for (row, cells) in self.grid.iter().enumerate() {
            if cells.len() != expected {
                return Err(TuningError::RaggedMaze {
                    level,
                    row,
                    found: cells.len(),
                    expected,
                });
            }
        }
        let check = |what: &'static str, cell: Cell| {
            if self.contains(cell) {
                Ok(())
            } else {
                Err(TuningError::OutOfGrid {
                    level,
                    what,
                    col: cell.col,
                    row: cell.row,
                    cols: self.cols(),
                    rows: self.rows(),
                })
            }
        };
        check("entry", self.entry)?;
        check("exit", self.exit)?;
        for item in &self.items {
            check("item", item.cell)?;
        }
        for wall in &self.attractor_walls {
            check("attractor wall", wall.cell)?;
        }
        Ok(())
    }
}

/// Health pickup spawn interval range (seconds), sampled on level entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalRange {
    pub min: f32,
    pub max: f32,
}

impl Default for IntervalRange {
    fn default() -> Self {
        Self {
            min: 40.0,
            max: 60.0,
        }
    }
}

/// One level's configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub score_goal: u32,
    /// Share of coin spawns among coin/hazard spawns
    #[serde(default = "default_ratio")]
    pub spawn_ratio: f32,
    /// None disables timed health spawns
    #[serde(default)]
    pub health_interval: Option<IntervalRange>,
    #[serde(default = "default_ice_chance")]
    pub ice_star_chance: f32,
    /// Hazards may turn into ice stars from this level index on
    #[serde(default = "default_ice_level")]
    pub ice_star_from_level: usize,
    #[serde(default)]
    pub type_boost: TypeBoost,
    /// Elite hits also flip the ship's spin
    #[serde(default)]
    pub elite_reverse_spin: bool,
    #[serde(default)]
    pub maze: Option<MazeDefinition>,
}

fn default_ratio() -> f32 {
    0.7
}

fn default_ice_chance() -> f32 {
    0.25
}

fn default_ice_level() -> usize {
    4
}

impl LevelConfig {
    pub fn open(score_goal: u32, spawn_ratio: f32, boost: f32) -> Self {
        Self {
            score_goal,
            spawn_ratio,
            health_interval: Some(IntervalRange {
                min: 30.0,
                max: 60.0,
            }),
            ice_star_chance: default_ice_chance(),
            ice_star_from_level: default_ice_level(),
            type_boost: TypeBoost::uniform(boost),
            elite_reverse_spin: false,
            maze: None,
        }
    }
}

/// Level-start quotes shown after the between-levels countdown
pub const LEVEL_START_QUOTES: &[&str] = &[
    "Are you ready...",
    "Break a leg...",
    "Time to kick ass...",
    "Let's do this...",
    "Watch and learn...",
    "Brace yourself...",
    "Show 'em how it's done...",
    "Let's make it look easy...",
    "Piece o' cake...",
    "Here we go...",
    "You got this....",
    "Y'all ready for this...",
    "Let's crush it...",
    "Let's GO!",
    "Get ready...",
    "Make it so...",
    "Never quit...",
    "Hold tight...",
    "Prepare for battle...",
];

/// The campaign's levels, indexed from 0
///
/// Deserialization goes through [`LevelTable::new`], so an empty or invalid
/// table never gets built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LevelConfig>", into = "Vec<LevelConfig>")]
pub struct LevelTable {
    levels: Vec<LevelConfig>,
}

impl TryFrom<Vec<LevelConfig>> for LevelTable {
    type Error = TuningError;

    fn try_from(levels: Vec<LevelConfig>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<LevelTable> for Vec<LevelConfig> {
    fn from(table: LevelTable) -> Self {
        table.levels
    }
}

impl LevelTable {
    /// Build a table, validating every level
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, TuningError> {
        if levels.is_empty() {
            return Err(TuningError::Empty);
        }
        for (index, level) in levels.iter().enumerate() {
            if level.score_goal == 0 {
                return Err(TuningError::ZeroGoal { level: index });
            }
            if !(0.0..=1.0).contains(&level.spawn_ratio) {
                return Err(TuningError::BadRatio {
                    level: index,
                    ratio: level.spawn_ratio,
                });
            }
            if let Some(maze) = &level.maze {
                maze.validate(index)?;
            }
        }
        Ok(Self { levels })
    }

    /// Parse a JSON array of level records
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let levels: Vec<LevelConfig> = serde_json::from_str(json)?;
        let table = Self::new(levels)?;
        log::info!("Loaded level table ({} levels)", table.len());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level config; indices past the end repeat the last level
    pub fn get(&self, index: usize) -> &LevelConfig {
        let last = self.levels.len() - 1;
        &self.levels[index.min(last)]
    }

    /// Divide every goal (end-of-level testing)
    pub fn with_quick_goals(mut self, divisor: u32) -> Self {
        let divisor = divisor.max(1);
        for level in &mut self.levels {
            level.score_goal = (level.score_goal / divisor).max(10);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelConfig> {
        self.levels.iter()
    }
}

/// The built-in first-level maze (5 x 9)
pub fn default_maze() -> MazeDefinition {
    MazeDefinition {
        grid: vec![
            vec![0b1010, 0b1010, 0b1010, 0b1010, 0b1100],
            vec![0b1001, 0b1010, 0b1010, 0b1010, 0b0110],
            vec![0b0011, 0b1010, 0b1100, 0b1001, 0b1100],
            vec![0b1001, 0b1110, 0b0101, 0b0011, 0b0100],
            vec![0b0101, 0b1001, 0b0000, 0b1100, 0b0101],
            vec![0b0101, 0b0011, 0b0000, 0b0110, 0b0101],
            vec![0b0001, 0b1100, 0b0001, 0b1010, 0b0110],
            vec![0b0011, 0b0110, 0b0011, 0b1010, 0b1100],
            vec![0b1001, 0b1010, 0b1010, 0b1010, 0b0110],
        ],
        entry: Cell::new(4, 0),
        exit: Cell::new(0, 8),
        items: vec![MazeItem {
            cell: Cell::new(3, 3),
            kind: MazeItemKind::Health,
        }],
        attractor_walls: vec![AttractorWall {
            cell: Cell::new(2, 3),
            side: Side::Left,
        }],
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        let maze = LevelConfig {
            score_goal: 100,
            spawn_ratio: 0.0,
            health_interval: None,
            ice_star_chance: 0.0,
            ice_star_from_level: usize::MAX,
            type_boost: TypeBoost::default(),
            elite_reverse_spin: false,
            maze: Some(default_maze()),
        };
        let mut levels = vec![
            maze,
            LevelConfig::open(200, 0.7, 1.0),
            LevelConfig::open(250, 0.66, 1.1),
            LevelConfig::open(300, 0.62, 1.22),
            LevelConfig::open(350, 0.58, 1.34),
            LevelConfig::open(400, 0.54, 1.45),
            LevelConfig::open(450, 0.5, 1.5),
        ];
        for level in levels.iter_mut().skip(5) {
            level.elite_reverse_spin = true;
        }
        Self { levels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        let table = LevelTable::default();
        assert_eq!(table.len(), 7);
        assert!(table.get(0).maze.is_some());
        assert!(table.get(1).maze.is_none());
        LevelTable::new(table.iter().cloned().collect()).unwrap();
    }

    #[test]
    fn test_get_past_end_repeats_last() {
        let table = LevelTable::default();
        assert_eq!(table.get(100).score_goal, 450);
    }

    #[test]
    fn test_from_json_partial_boost_falls_back_to_neutral() {
        let json = r#"[{"score_goal": 120, "type_boost": {"hazard": {"grav": 2.0}}}]"#;
        let table = LevelTable::from_json(json).unwrap();
        let level = table.get(0);
        assert_eq!(level.type_boost.hazard.grav, 2.0);
        assert_eq!(level.type_boost.hazard.speed, 1.0);
        assert_eq!(level.type_boost.coin, Boost::NEUTRAL);
        assert_eq!(level.spawn_ratio, 0.7);
        assert!(level.maze.is_none());
    }

    #[test]
    fn test_rejects_empty_and_ragged() {
        assert!(matches!(LevelTable::from_json("[]"), Err(TuningError::Empty)));
        assert!(matches!(
            LevelTable::from_json("not json"),
            Err(TuningError::Json(_))
        ));

        let mut maze = default_maze();
        maze.grid[2].pop();
        let mut level = LevelConfig::open(100, 0.5, 1.0);
        level.maze = Some(maze);
        assert!(matches!(
            LevelTable::new(vec![level]),
            Err(TuningError::RaggedMaze { row: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_exit_outside_grid() {
        let mut maze = default_maze();
        maze.exit = Cell::new(9, 9);
        let mut level = LevelConfig::open(100, 0.5, 1.0);
        level.maze = Some(maze);
        assert!(matches!(
            LevelTable::new(vec![level]),
            Err(TuningError::OutOfGrid { what: "exit", .. })
        ));
    }

    #[test]
    fn test_cell_neighbors() {
        let cell = Cell::new(0, 0);
        assert_eq!(cell.neighbor(Side::Top), None);
        assert_eq!(cell.neighbor(Side::Left), None);
        assert_eq!(cell.neighbor(Side::Right), Some(Cell::new(1, 0)));
        assert_eq!(cell.neighbor(Side::Bottom), Some(Cell::new(0, 1)));
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<LevelTable>("[]").is_err());
        let json = serde_json::to_string(&LevelTable::default()).unwrap();
        let table: LevelTable = serde_json::from_str(&json).unwrap();
        assert_eq!(table, LevelTable::default());
    }

    #[test]
    fn test_quick_goals() {
        let table = LevelTable::default().with_quick_goals(8);
        assert_eq!(table.get(0).score_goal, 12);
        assert_eq!(table.get(1).score_goal, 25);
    }
}
