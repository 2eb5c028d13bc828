//! Dungeon floors: tiles, rooms, and the generation passes that build them.

pub mod door;
pub mod floor;
pub mod generation;
pub mod interactable;
pub mod room;
pub mod secret;
pub mod tile;
pub mod trap;

pub use floor::Floor;
pub use generation::{generate_floor, FloorParams};
pub use room::Room;
pub use tile::{Event, InteractableKind, Tile, TileFlags, TileKind, TrapEvent, TrapScope};
pub use trap::{resolve_save, save_band, save_bonus, save_threshold, SaveBand, SaveOutcome};
