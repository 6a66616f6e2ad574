pub mod leave;
pub(crate) mod macros;
pub mod night_allocation;
pub mod on_call;
pub mod preference;
pub mod schedule;
pub mod shift;
pub mod staff;
pub mod stats;

// Re-export all models for easy importing
pub use leave::*;
pub use night_allocation::*;
pub use on_call::*;
pub use preference::*;
pub use schedule::*;
pub use shift::*;
pub use staff::*;
pub use stats::*;
