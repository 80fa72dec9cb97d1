pub mod rejection;
pub mod save;
pub mod state;

pub use rejection::Rejection;
pub use save::{
    load_from_file, save_to_file, snapshot_from_json, snapshot_to_json, GameSnapshot, SaveError,
    SaveFile, SAVE_FORMAT_VERSION,
};
pub use state::{ActiveCombat, GameState, TurnReport};
