pub mod leave;
pub mod night_allocation;
pub mod on_call;
pub mod preference;
pub mod schedule;
pub mod shift;
pub mod staff;

// Re-export all repositories for easy importing
pub use leave::LeaveRepository;
pub use night_allocation::NightAllocationRepository;
pub use on_call::OnCallRepository;
pub use preference::PreferenceRepository;
pub use schedule::ScheduleRepository;
pub use shift::ShiftRepository;
pub use staff::StaffRepository;
