pub mod blob;
pub mod matches;
pub mod players;
pub mod snapshots;
