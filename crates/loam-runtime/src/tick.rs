use std::time::{Duration, Instant};

use loam_chunk::ObjectMesher;
use loam_mesh_cpu::MeshBuildAdapter;
use loam_world::ChunkCoord;

use crate::StreamingEngine;
use crate::events::WorldEvent;

/// Neighbor count of a chunk with every surrounding slot filled.
const ALL_NEIGHBORS: usize = 26;

impl<M: MeshBuildAdapter, O: ObjectMesher> StreamingEngine<M, O> {
    /// One simulation step: applies generator results, follows the viewer,
    /// scans for work, then drains removal, request and mesh queues in turn
    /// until they run dry or the tick budget is spent.
    pub fn tick(&mut self) {
        let budget = Duration::from_millis(self.cfg.max_processing_per_tick_ms);
        let deadline = Instant::now() + budget;
        self.drain_completions();
        let center = self.update_viewer_chunk();
        if self.world_name != self.active_world {
            self.switch_world();
        }
        if !self.cfg.manually_control_chunk_loading {
            self.scan_for_removals(center);
            self.scan_for_additions(center);
        }
        self.scan_for_meshing();
        loop {
            let removed = self.process_removal_step();
            let requested = self.process_request_step();
            let meshed = self.process_mesh_step();
            if !(removed || requested || meshed) || Instant::now() >= deadline {
                break;
            }
        }
        self.update_readiness();
    }

    /// Render-time variant: only drains the mesh queues, under the render
    /// budget.
    pub fn render(&mut self) {
        let budget = Duration::from_millis(self.cfg.max_processing_per_render_ms);
        let deadline = Instant::now() + budget;
        while self.process_mesh_step() {
            if Instant::now() >= deadline {
                break;
            }
        }
    }

    fn update_viewer_chunk(&mut self) -> ChunkCoord {
        let c = self.indexer.chunk_of_f64(self.viewer_pos);
        if self.viewer_chunk != Some(c) {
            log::debug!(target: "stream", "viewer entered chunk {}", c);
            self.viewer_chunk = Some(c);
            self.add_scan.reset();
            self.queues.sort_all(c, &*self.distance);
            self.events.push_back(WorldEvent::PlayerEnteredChunk { coord: c });
        }
        c
    }

    fn switch_world(&mut self) {
        log::info!(
            target: "stream",
            "world changed from `{}` to `{}`; invalidating {} chunks",
            self.active_world,
            self.world_name,
            self.queues.known.len()
        );
        self.active_world = self.world_name.clone();
        let known: Vec<ChunkCoord> = self.queues.known.iter().collect();
        for c in known {
            self.invalidate(c);
        }
        self.sort_invalidated();
        // Reload the closest chunk right away.
        self.process_removal_step();
    }

    /// Queues known chunks that drifted outside the remove ellipsoid.
    fn scan_for_removals(&mut self, center: ChunkCoord) {
        let len = self.queues.known.len();
        if len == 0 {
            return;
        }
        let mut doomed = Vec::new();
        for _ in 0..self.cfg.remove_scan_per_tick.min(len) {
            if self.remove_cursor >= len {
                self.remove_cursor = 0;
            }
            if let Some(c) = self.queues.known.get(self.remove_cursor) {
                let (dx, dy, dz) = c.delta(center);
                if !self.remove_distance.contains(dx, dy, dz) {
                    doomed.push(c);
                }
            }
            self.remove_cursor += 1;
        }
        if doomed.is_empty() {
            return;
        }
        log::debug!(target: "stream", "{} chunks out of range", doomed.len());
        for c in doomed {
            self.queue_removal(c);
        }
        let o = [center.cx, center.cy, center.cz];
        self.queues.to_remove.sort_by_distance(o, &*self.distance, false);
    }

    /// Walks the next slice of the add wedge, queueing unknown in-range
    /// locations for request.
    fn scan_for_additions(&mut self, center: ChunkCoord) {
        if self.add_scan.is_complete() {
            return;
        }
        let known = &self.queues.known;
        let bounds = self.cfg.world_bounds.as_ref();
        let mut found = Vec::new();
        self.add_scan.advance(center, self.cfg.add_scan_per_tick, |c| {
            if !known.contains(c) && bounds.is_none_or(|b| b.contains(c)) {
                found.push(c);
            }
        });
        if found.is_empty() {
            return;
        }
        for &c in &found {
            self.queues.known.add(c);
            self.queues.to_request.add(c);
        }
        let o = [center.cx, center.cy, center.cz];
        self.queues.to_request.sort_by_distance(o, &*self.distance, false);
        log::trace!(target: "stream", "queued {} locations for request", found.len());
    }

    /// Walks the next slice of `known`, queueing dirty chunks with enough
    /// neighbors for meshing.
    fn scan_for_meshing(&mut self) {
        let len = self.queues.known.len();
        if len == 0 {
            return;
        }
        let mut ready = Vec::new();
        for _ in 0..self.cfg.mesh_scan_per_tick.min(len) {
            if self.mesh_cursor >= len {
                self.mesh_cursor = 0;
            }
            let at = self.mesh_cursor;
            self.mesh_cursor += 1;
            let Some(c) = self.queues.known.get(at) else {
                continue;
            };
            if self.queues.is_queued_for_mesh(c) || self.is_queued_for_removal(c) {
                continue;
            }
            if let Some(chunk) = self.arena.chunk_at(c) {
                let n = chunk.neighbor_count();
                if chunk.is_dirty() && n >= self.cfg.min_neighbors_to_mesh {
                    ready.push((c, n == ALL_NEIGHBORS));
                }
            }
        }
        for (c, complete) in ready {
            self.enqueue_mesh(c, complete);
        }
    }

    pub(crate) fn enqueue_mesh(&mut self, c: ChunkCoord, complete: bool) {
        if self.queues.enqueue_mesh(c, complete) {
            let center = self.viewer_chunk.unwrap_or(c);
            self.queues.sort_mesh(center, &*self.distance);
        }
    }

    /// Queues a chunk changed by an edit, regardless of its neighbor count.
    pub(crate) fn enqueue_edited(&mut self, c: ChunkCoord) {
        let complete = self
            .arena
            .chunk_at(c)
            .is_some_and(|ch| ch.neighbor_count() == ALL_NEIGHBORS);
        self.enqueue_mesh(c, complete);
    }

    /// Disposes the closest invalidated chunk, or failing that the closest
    /// out-of-range one. Under manual control an invalidated location is
    /// queued for request again, since no add scan will find it.
    fn process_removal_step(&mut self) -> bool {
        let (c, stale) = match self.queues.invalidated.pop() {
            Some(c) => (c, true),
            None => match self.queues.to_remove.pop() {
                Some(c) => (c, false),
                None => return false,
            },
        };
        self.dispose_chunk_at(c);
        self.forget_location(c);
        if stale && self.cfg.manually_control_chunk_loading {
            log::debug!(target: "stream", "reloading invalidated {}", c);
            self.queues.known.add(c);
            self.queues.to_request.add(c);
        }
        true
    }

    fn process_request_step(&mut self) -> bool {
        if self.queues.to_request.is_empty()
            || self.queues.pending.len() >= self.cfg.max_chunks_pending_creation
        {
            return false;
        }
        let Some(c) = self.queues.to_request.pop() else {
            return false;
        };
        self.request_chunk(c);
        true
    }

    fn process_mesh_step(&mut self) -> bool {
        let Some(c) = self
            .queues
            .to_mesh_first
            .pop()
            .or_else(|| self.queues.to_mesh.pop())
        else {
            return false;
        };
        if self.is_queued_for_removal(c) {
            return true;
        }
        self.update_chunk_meshes(c);
        true
    }

    fn update_readiness(&mut self) {
        if let Some(v) = self.viewer_chunk {
            self.viewer_chunk_loaded = self.arena.contains(v);
        }
        if self.initial_load_complete || self.queues.known.is_empty() || !self.queues.is_settled() {
            return;
        }
        if !self.cfg.manually_control_chunk_loading && !self.add_scan.is_complete() {
            return;
        }
        let min = self.cfg.min_neighbors_to_mesh;
        let unmeshed = self
            .arena
            .iter()
            .any(|(_, ch)| ch.is_dirty() && ch.neighbor_count() >= min);
        if unmeshed {
            return;
        }
        self.initial_load_complete = true;
        log::info!(
            target: "stream",
            "initial load complete: {} chunks loaded",
            self.arena.len()
        );
        self.events.push_back(WorldEvent::InitialLoadComplete);
    }
}
