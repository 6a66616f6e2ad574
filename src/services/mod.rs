pub mod roster;

pub use roster::RosterService;
