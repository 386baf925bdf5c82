use loam_world::{ChunkCoord, LocationQueue};

/// Mesh queues are re-sorted after this many insertions.
pub(crate) const MESH_RESORT_INTERVAL: usize = 20;

/// Per-location bookkeeping. A location in `known` sits in at most one of
/// the work queues; a meshed, clean chunk sits in none.
#[derive(Default, Debug)]
pub(crate) struct Queues {
    pub known: LocationQueue,
    pub to_request: LocationQueue,
    pub invalidated: LocationQueue,
    pub to_remove: LocationQueue,
    pub pending: LocationQueue,
    pub to_mesh: LocationQueue,
    pub to_mesh_first: LocationQueue,
    mesh_inserts: usize,
}

impl Queues {
    /// Queues `c` for meshing; returns whether the mesh queues should be
    /// re-sorted.
    pub fn enqueue_mesh(&mut self, c: ChunkCoord, complete: bool) -> bool {
        if self.to_remove.contains(c) || self.invalidated.contains(c) {
            return false;
        }
        let added = if complete {
            self.to_mesh.remove(c);
            self.to_mesh_first.add(c)
        } else if self.to_mesh_first.contains(c) {
            false
        } else {
            self.to_mesh.add(c)
        };
        if !added {
            return false;
        }
        self.mesh_inserts += 1;
        self.mesh_inserts % MESH_RESORT_INTERVAL == 0
    }

    pub fn is_queued_for_mesh(&self, c: ChunkCoord) -> bool {
        self.to_mesh.contains(c) || self.to_mesh_first.contains(c)
    }

    /// Takes `c` out of every work queue. `known` is left alone.
    pub fn unqueue(&mut self, c: ChunkCoord) {
        self.to_request.remove(c);
        self.invalidated.remove(c);
        self.to_remove.remove(c);
        self.pending.remove(c);
        self.to_mesh.remove(c);
        self.to_mesh_first.remove(c);
    }

    pub fn forget(&mut self, c: ChunkCoord) {
        self.unqueue(c);
        self.known.remove(c);
    }

    pub fn sort_all(&mut self, origin: ChunkCoord, dist: &dyn Fn(i32, i32, i32) -> i64) {
        let o = [origin.cx, origin.cy, origin.cz];
        for q in [
            &mut self.to_request,
            &mut self.invalidated,
            &mut self.to_remove,
            &mut self.to_mesh,
            &mut self.to_mesh_first,
        ] {
            q.sort_by_distance(o, dist, false);
        }
    }

    pub fn sort_mesh(&mut self, origin: ChunkCoord, dist: &dyn Fn(i32, i32, i32) -> i64) {
        let o = [origin.cx, origin.cy, origin.cz];
        self.to_mesh.sort_by_distance(o, dist, false);
        self.to_mesh_first.sort_by_distance(o, dist, false);
    }

    /// Nothing waits on generation or meshing.
    pub fn is_settled(&self) -> bool {
        self.to_request.is_empty()
            && self.pending.is_empty()
            && self.to_mesh.is_empty()
            && self.to_mesh_first.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_chunks_move_to_the_first_queue() {
        let mut q = Queues::default();
        let c = ChunkCoord::new(1, 0, 0);
        q.enqueue_mesh(c, false);
        assert!(q.to_mesh.contains(c));
        q.enqueue_mesh(c, true);
        assert!(!q.to_mesh.contains(c));
        assert!(q.to_mesh_first.contains(c));
        assert!(!q.enqueue_mesh(c, false));
        assert_eq!(q.to_mesh.len(), 0);
    }

    #[test]
    fn removal_blocks_meshing() {
        let mut q = Queues::default();
        let c = ChunkCoord::new(0, 0, 0);
        q.to_remove.add(c);
        q.enqueue_mesh(c, true);
        assert!(!q.is_queued_for_mesh(c));
    }

    #[test]
    fn resort_requested_every_interval() {
        let mut q = Queues::default();
        let hits = (0..MESH_RESORT_INTERVAL as i32 * 2)
            .filter(|&i| q.enqueue_mesh(ChunkCoord::new(i, 0, 0), false))
            .count();
        assert_eq!(hits, 2);
    }
}
