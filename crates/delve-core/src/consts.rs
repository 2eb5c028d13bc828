//! Engine constants shared across generation and runtime.

/// Room interior size bounds used by the generator.
pub const ROOM_MIN_W: usize = 4;
pub const ROOM_MAX_W: usize = 9;
pub const ROOM_MIN_H: usize = 4;
pub const ROOM_MAX_H: usize = 7;

/// Placement attempts per wanted room.
pub const ROOM_ATTEMPT_FACTOR: usize = 5;

/// Chance (percent) a valid door segment is skipped entirely.
pub const DOOR_SKIP_PERCENT: u32 = 30;

/// Chance (percent) a non-entrance room carries a fixed encounter.
pub const FIXED_ENCOUNTER_PERCENT: u32 = 35;

/// Chance (percent) a secret-room reward chest holds a cursed item.
pub const CURSED_CHEST_PERCENT: u32 = 8;

/// Detection caps. Secret doors are harder to find than traps.
pub const TRAP_DETECT_CAP: i32 = 90;
pub const SECRET_DETECT_CAP: i32 = 60;

/// Disarm roll: base chance and cap.
pub const DISARM_BASE: i32 = 40;
pub const DISARM_CAP: i32 = 95;

/// Enemy tuning.
pub const ENEMY_ALERT_RANGE: i32 = 5;
pub const ENEMY_CHASE_SPEED: u8 = 1;
pub const PATROL_COOLDOWN: u8 = 2;
pub const CHASE_COOLDOWN: u8 = 1;
/// Chance (percent) a patrolling enemy re-rolls its direction each tick.
pub const PATROL_TURN_PERCENT: u32 = 20;

/// Manhattan radius around the entrance and stairs kept free of spawns.
pub const SPAWN_BUFFER: i32 = 4;

/// Cardinal directions (dx, dy).
pub const CARDINALS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
