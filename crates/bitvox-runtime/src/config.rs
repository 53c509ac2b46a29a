use bitvox_mesh_cpu::MesherKind;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    #[serde(default)]
    pub mesher: MesherKind,
    /// New chunk generations started per tick. Edit refreshes are not throttled.
    #[serde(default = "default_max_jobs_per_tick")]
    pub max_jobs_per_tick: usize,
    /// 0 picks `available_parallelism - 1`, at least one.
    #[serde(default)]
    pub worker_threads: usize,
    #[serde(default = "default_world_radius")]
    pub world_radius: i32,
}

fn default_max_jobs_per_tick() -> usize {
    8
}
fn default_world_radius() -> i32 {
    2
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mesher: MesherKind::Greedy,
            max_jobs_per_tick: default_max_jobs_per_tick(),
            worker_threads: 0,
            world_radius: default_world_radius(),
        }
    }
}

impl EngineConfig {
    pub fn resolved_workers(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(1)
            .max(1)
    }
}
