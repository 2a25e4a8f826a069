//! Game-wide constants.

/// Map width in tiles
pub const MAP_WIDTH: usize = 80;

/// Map height in tiles
pub const MAP_HEIGHT: usize = 24;

/// Deepest dungeon floor (0-based); the floor at this depth uses the
/// prefabricated layout instead of a generated one.
pub const MAX_DEPTH: usize = 8;

/// Default player sight radius for field-of-view calculation
pub const SIGHT_RANGE: i32 = 8;

/// Lattice cell dimensions for the grid generation method
pub const GRID_CELL_WIDTH: usize = 13;
pub const GRID_CELL_HEIGHT: usize = 8;

/// Minimum region side for a BSP split; regions smaller than twice this
/// are leaves.
pub const BSP_MIN_REGION: usize = 6;

/// Percent chance per step that a tunnel flips its horizontal/vertical bias
pub const TUNNEL_TURN_CHANCE: u32 = 30;

/// Initiative consumed by a turn when a unit's speed is zero
pub const BASE_INITIATIVE: i64 = 100;

/// Upper bound on (quality, enchantment) re-rolls during item generation
pub const ITEM_ROLL_LIMIT: u32 = 100;

/// Radius inside which a visible monster or item interrupts auto-run
pub const AUTOMOVE_SCAN_RADIUS: i32 = 3;

/// Hit points regenerated per this many elapsed turns
pub const REGEN_INTERVAL: u64 = 10;

/// Items (and the monster-count base) stocked on each new floor
pub const LEVEL_SPAWN_COUNT: usize = 5;

/// Turns a timed potion effect lasts
pub const EFFECT_DURATION: u32 = 20;
