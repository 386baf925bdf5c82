use loam_chunk::ObjectMesher;
use loam_mesh_cpu::MeshBuildAdapter;

use crate::StreamingEngine;
use crate::error::EngineError;

impl<M: MeshBuildAdapter, O: ObjectMesher> StreamingEngine<M, O> {
    fn ensure_manual(&self) -> Result<(), EngineError> {
        if self.cfg.manually_control_chunk_loading {
            Ok(())
        } else {
            Err(EngineError::ManualLoadingDisabled)
        }
    }

    /// Queues the chunk containing world voxel `(x, y, z)` for loading.
    pub fn manually_load_chunk(&mut self, x: i32, y: i32, z: i32) -> Result<(), EngineError> {
        self.ensure_manual()?;
        let c = self.indexer.chunk_of(x, y, z);
        if self.queues.known.add(c) {
            self.queues.to_request.add(c);
            log::debug!(target: "stream", "manual load of {}", c);
        }
        Ok(())
    }

    /// Queues the chunk containing world voxel `(x, y, z)` for removal.
    pub fn manually_unload_chunk(&mut self, x: i32, y: i32, z: i32) -> Result<(), EngineError> {
        self.ensure_manual()?;
        let c = self.indexer.chunk_of(x, y, z);
        log::debug!(target: "stream", "manual unload of {}", c);
        self.queue_removal(c);
        Ok(())
    }
}
