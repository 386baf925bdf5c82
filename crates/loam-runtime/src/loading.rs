use loam_blocks::{AIR, BlockId};
use loam_chunk::{Chunk, ObjectMesher, UserData, VoxelBuffer};
use loam_mesh_cpu::MeshBuildAdapter;
use loam_world::{Aabb, ChunkCoord};

use crate::StreamingEngine;
use crate::error::EngineError;
use crate::events::WorldEvent;
use crate::generator::{CancelToken, Completion, GenerateRequest, GeneratedChunk};
use crate::request::RequestId;

impl<M: MeshBuildAdapter, O: ObjectMesher> StreamingEngine<M, O> {
    /// Issues a request for `c`, through the generator when one is
    /// registered and as a `ChunkDataNeeded` event otherwise.
    pub(crate) fn request_chunk(&mut self, c: ChunkCoord) {
        let id = RequestId::new(c, self.active_world.clone());
        let token = CancelToken::new();
        self.queues.pending.add(c);
        self.tokens.insert(c, token.clone());
        self.counters.requests_issued += 1;
        log::trace!(target: "stream", "requesting {}", id);
        let size = self.cfg.chunk_size;
        match self.generator.as_mut() {
            Some(generator) => {
                let tx = self.completions_tx.clone();
                generator.generate(GenerateRequest::new(id, size, token, tx));
            }
            None => self.events.push_back(WorldEvent::ChunkDataNeeded {
                request_id: id,
                coord: c,
                world_name: self.active_world.clone(),
                voxels: VoxelBuffer::new(size),
            }),
        }
    }

    /// Applies generator answers that are still current.
    pub(crate) fn drain_completions(&mut self) {
        let done: Vec<Completion> = self.completions_rx.try_iter().collect();
        for Completion {
            request_id,
            token,
            result,
        } in done
        {
            let c = request_id.coord;
            let current = request_id.world == self.active_world
                && !token.is_cancelled()
                && self.queues.pending.contains(c)
                && self.tokens.get(&c).is_some_and(|t| t.same_as(&token));
            if !current {
                self.counters.stale_results += 1;
                log::debug!(target: "stream", "dropping stale result for {}", request_id);
                continue;
            }
            let size = self.cfg.chunk_size;
            let data = match result {
                Ok(Some(data)) => data,
                Ok(None) => GeneratedChunk::filled(size, AIR),
                Err(e) => {
                    log::warn!(
                        target: "stream",
                        "generator rejected {}: {}; loading it as air",
                        request_id,
                        e
                    );
                    GeneratedChunk::filled(size, AIR)
                }
            };
            self.apply_chunk_data(c, data);
        }
    }

    /// Answers a `ChunkDataNeeded` event. Returns `Ok(false)` when the
    /// request belongs to a world that is no longer active.
    pub fn set_chunk_data(
        &mut self,
        request_id: &str,
        voxels: VoxelBuffer,
        user_data: Option<UserData>,
        fill: Option<BlockId>,
    ) -> Result<bool, EngineError> {
        let id: RequestId = request_id.parse()?;
        if id.world != self.active_world {
            self.counters.stale_results += 1;
            log::debug!(target: "stream", "ignoring data for {} from another world", id);
            return Ok(false);
        }
        if !self.queues.pending.contains(id.coord) {
            return Err(EngineError::UnknownRequest(request_id.to_string()));
        }
        self.apply_chunk_data(
            id.coord,
            GeneratedChunk {
                voxels,
                user_data,
                fill,
            },
        );
        Ok(true)
    }

    fn apply_chunk_data(&mut self, c: ChunkCoord, data: GeneratedChunk) {
        self.tokens.remove(&c);
        self.queues.pending.remove(c);
        if self.arena.contains(c) {
            log::warn!(target: "stream", "chunk {} resolved twice; keeping the loaded one", c);
            return;
        }
        let chunk = Chunk::new(
            c,
            self.cfg.chunk_size,
            data.voxels,
            data.fill,
            data.user_data,
            &self.registry,
            &mut self.objects,
        );
        let (_, dirtied) = self.arena.insert(chunk);
        self.counters.chunks_added += 1;
        self.events.push_back(WorldEvent::ChunkAdded { coord: c });
        log::trace!(
            target: "stream",
            "chunk {} added, {} neighbors need remeshing",
            c,
            dirtied.len()
        );
    }

    /// Moves a known location out of its work queue and into `invalidated`.
    /// A pending request is cancelled.
    pub(crate) fn invalidate(&mut self, c: ChunkCoord) {
        if !self.queues.known.contains(c) {
            return;
        }
        if let Some(token) = self.tokens.remove(&c) {
            token.cancel();
        }
        self.queues.unqueue(c);
        self.queues.invalidated.add(c);
    }

    /// Queues a known location for removal. Locations without a chunk yet
    /// are forgotten immediately and their requests cancelled.
    pub(crate) fn queue_removal(&mut self, c: ChunkCoord) {
        if !self.queues.known.contains(c) || self.is_queued_for_removal(c) {
            return;
        }
        if self.queues.to_request.contains(c) {
            self.forget_location(c);
            return;
        }
        if self.queues.pending.contains(c) {
            if let Some(token) = self.tokens.remove(&c) {
                token.cancel();
            }
            log::debug!(target: "stream", "cancelled pending request for {}", c);
            self.forget_location(c);
            return;
        }
        self.queues.to_mesh.remove(c);
        self.queues.to_mesh_first.remove(c);
        self.queues.to_remove.add(c);
    }

    pub(crate) fn dispose_chunk_at(&mut self, c: ChunkCoord) {
        let Some(mut chunk) = self.arena.remove(c) else {
            return;
        };
        self.events.push_back(WorldEvent::ChunkBeingRemoved {
            coord: c,
            user_data: chunk.take_user_data(),
        });
        let handles = chunk.dispose(&self.registry, &mut self.objects);
        self.adapter.dispose(handles);
        self.counters.chunks_removed += 1;
        log::trace!(target: "stream", "chunk {} removed", c);
    }

    /// Drops every trace of `c`. The add scan restarts when the location
    /// is still within reach so it gets requested again.
    pub(crate) fn forget_location(&mut self, c: ChunkCoord) {
        self.queues.forget(c);
        if let Some(token) = self.tokens.remove(&c) {
            token.cancel();
        }
        if let Some(v) = self.viewer_chunk {
            let (dx, dy, dz) = c.delta(v);
            if self.add_distance.contains(dx, dy, dz) {
                self.add_scan.reset();
            }
        }
    }

    pub(crate) fn sort_invalidated(&mut self) {
        if let Some(v) = self.viewer_chunk {
            self.queues
                .invalidated
                .sort_by_distance([v.cx, v.cy, v.cz], &*self.distance, false);
        }
    }

    /// Invalidates every known chunk overlapping `aabb` (world units).
    /// Infinite bounds cover the whole known range on that axis.
    pub fn invalidate_voxels_in_aabb(&mut self, aabb: &Aabb) {
        let mut lo = [i32::MAX; 3];
        let mut hi = [i32::MIN; 3];
        for c in self.queues.known.iter() {
            for (a, v) in [c.cx, c.cy, c.cz].into_iter().enumerate() {
                lo[a] = lo[a].min(v);
                hi[a] = hi[a].max(v);
            }
        }
        if lo[0] > hi[0] {
            return;
        }
        let (min, max) = aabb.chunk_range(self.cfg.chunk_size as i32, (lo, hi));
        let hits: Vec<ChunkCoord> = self
            .queues
            .known
            .iter()
            .filter(|c| {
                let p = [c.cx, c.cy, c.cz];
                (0..3).all(|a| (min[a]..=max[a]).contains(&p[a]))
            })
            .collect();
        log::debug!(target: "stream", "invalidating {} chunks in {:?}", hits.len(), aabb);
        for c in hits {
            self.invalidate(c);
        }
        self.sort_invalidated();
        self.add_scan.reset();
    }
}
