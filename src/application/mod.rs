pub mod convergence_controller;

pub use convergence_controller::{ControllerState, ConvergenceController, StopPolicy, Toolset};
