pub mod clamp;
pub mod controller;
pub mod solver;
pub mod types;

pub use clamp::clamp_cpu_vid;
pub use controller::PStateController;
pub use solver::{solve_power_target, PowerMatch};
pub use types::{
    CpuOverrides, CpuSlotReport, CpuUpdate, NbOverrides, NbQuantities, NbSlotReport, NbUpdate,
    PStateQuantities, PStateSelection, SlotLabel,
};
