use loam_chunk::ObjectMesher;
use loam_mesh_cpu::MeshBuildAdapter;

use crate::StreamingEngine;

/// Snapshot of queue sizes and lifetime counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub known: usize,
    pub to_request: usize,
    pub pending: usize,
    pub to_mesh: usize,
    pub to_mesh_first: usize,
    pub to_remove: usize,
    pub invalidated: usize,
    pub chunks_loaded: usize,
    pub chunks_added: u64,
    pub chunks_removed: u64,
    pub meshes_built: u64,
    pub requests_issued: u64,
    pub stale_results: u64,
}

impl<M: MeshBuildAdapter, O: ObjectMesher> StreamingEngine<M, O> {
    pub fn stats(&self) -> EngineStats {
        let q = &self.queues;
        EngineStats {
            known: q.known.len(),
            to_request: q.to_request.len(),
            pending: q.pending.len(),
            to_mesh: q.to_mesh.len(),
            to_mesh_first: q.to_mesh_first.len(),
            to_remove: q.to_remove.len(),
            invalidated: q.invalidated.len(),
            chunks_loaded: self.arena.len(),
            chunks_added: self.counters.chunks_added,
            chunks_removed: self.counters.chunks_removed,
            meshes_built: self.counters.meshes_built,
            requests_issued: self.counters.requests_issued,
            stale_results: self.counters.stale_results,
        }
    }

    /// Logs [`stats`](Self::stats) at info level.
    pub fn report(&self) {
        let s = self.stats();
        log::info!(
            target: "stream",
            "known {} (request {}, pending {}, mesh {}+{}, remove {}, invalid {}), \
             loaded {}, added {}, removed {}, meshed {}",
            s.known,
            s.to_request,
            s.pending,
            s.to_mesh_first,
            s.to_mesh,
            s.to_remove,
            s.invalidated,
            s.chunks_loaded,
            s.chunks_added,
            s.chunks_removed,
            s.meshes_built
        );
    }
}
