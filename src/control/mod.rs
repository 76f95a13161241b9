//! Level control: next-cycle bound estimation and the pump policy that
//! steers those bounds toward the middle of the normal band.

pub mod estimator;
pub mod pump_policy;
