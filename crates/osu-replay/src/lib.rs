// Decoded per-frame input streams: replay container, frame cursor, autoplay

pub mod autoplay;
mod cursor;
mod frame;
mod replay_data;

pub use cursor::{ReplayCursor, drive};
pub use frame::ReplayFrame;
pub use replay_data::{ReplayData, read_orp, write_orp};
