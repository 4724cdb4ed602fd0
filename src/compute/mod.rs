use crate::simulation::{SimulationState, SteeringParams};
use anyhow::Result;

pub mod cpu;
pub mod parallel;

pub use cpu::*;
pub use parallel::*;

pub trait SimulationBackend {
    fn update(&mut self, state: &mut SimulationState) -> Result<()>;
    fn get_name(&self) -> &'static str;
    fn supports_parallel(&self) -> bool;
}

/// Which backend a [`ComputeBackend`] should be built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Cpu,
    Parallel,
}

pub enum ComputeBackend {
    Cpu(CpuBackend),
    Parallel(ParallelBackend),
}

impl ComputeBackend {
    pub fn new(kind: BackendKind, params: SteeringParams) -> Self {
        match kind {
            BackendKind::Cpu => Self::new_cpu(params),
            BackendKind::Parallel => Self::new_parallel(params),
        }
    }

    pub fn new_cpu(params: SteeringParams) -> Self {
        ComputeBackend::Cpu(CpuBackend::new(params))
    }

    pub fn new_parallel(params: SteeringParams) -> Self {
        ComputeBackend::Parallel(ParallelBackend::new(params))
    }
}

impl SimulationBackend for ComputeBackend {
    fn update(&mut self, state: &mut SimulationState) -> Result<()> {
        match self {
            ComputeBackend::Cpu(backend) => backend.update(state),
            ComputeBackend::Parallel(backend) => backend.update(state),
        }
    }

    fn get_name(&self) -> &'static str {
        match self {
            ComputeBackend::Cpu(backend) => backend.get_name(),
            ComputeBackend::Parallel(backend) => backend.get_name(),
        }
    }

    fn supports_parallel(&self) -> bool {
        match self {
            ComputeBackend::Cpu(backend) => backend.supports_parallel(),
            ComputeBackend::Parallel(backend) => backend.supports_parallel(),
        }
    }
}
