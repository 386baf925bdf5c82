//! World streaming engine: chunk queues, async generation, and meshing.
#![forbid(unsafe_code)]

mod config;
mod error;
mod events;
mod generator;
mod loading;
mod manual;
mod meshing;
mod queues;
mod request;
mod scan;
mod stats;
mod tick;
mod voxels;

use std::collections::VecDeque;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::HashMap;
use loam_blocks::BlockRegistry;
use loam_chunk::{Chunk, ChunkArena, NoObjects, ObjectMesher};
use loam_mesh_cpu::{CpuMeshAdapter, GreedyMesher, MeshBuildAdapter, MesherOptions};
use loam_world::{ChunkCoord, ChunkIndexer, DistanceFn, Ellipsoid, squared_euclidean};

pub use config::EngineConfig;
pub use error::EngineError;
pub use events::WorldEvent;
pub use generator::{
    CancelToken, ChunkGenerator, GenerateError, GenerateRequest, GeneratedChunk, Responder,
    ThreadedGenerator,
};
pub use request::RequestId;
pub use stats::EngineStats;

use crate::generator::Completion;
use crate::queues::Queues;
use crate::scan::AddScan;

#[derive(Default, Debug, Clone, Copy)]
struct Counters {
    chunks_added: u64,
    chunks_removed: u64,
    meshes_built: u64,
    requests_issued: u64,
    stale_results: u64,
}

/// Keeps the chunks around a viewer loaded and meshed. Single-threaded:
/// every mutation happens in `&mut self` calls; generators may answer from
/// other threads and their results are applied on the next [`tick`].
///
/// [`tick`]: StreamingEngine::tick
pub struct StreamingEngine<M: MeshBuildAdapter = CpuMeshAdapter, O: ObjectMesher = NoObjects> {
    cfg: EngineConfig,
    registry: Arc<BlockRegistry>,
    indexer: ChunkIndexer,
    arena: ChunkArena,
    mesher: GreedyMesher,
    adapter: M,
    objects: O,
    queues: Queues,
    add_distance: Ellipsoid,
    remove_distance: Ellipsoid,
    distance: DistanceFn,
    add_scan: AddScan,
    remove_cursor: usize,
    mesh_cursor: usize,
    viewer_pos: [f64; 3],
    viewer_chunk: Option<ChunkCoord>,
    /// Requested world; applied at the start of the next tick.
    world_name: String,
    active_world: String,
    generator: Option<Box<dyn ChunkGenerator>>,
    tokens: HashMap<ChunkCoord, CancelToken>,
    completions_tx: Sender<Completion>,
    completions_rx: Receiver<Completion>,
    events: VecDeque<WorldEvent>,
    viewer_chunk_loaded: bool,
    initial_load_complete: bool,
    counters: Counters,
}

impl<M: MeshBuildAdapter, O: ObjectMesher> StreamingEngine<M, O> {
    pub fn new(
        cfg: EngineConfig,
        registry: Arc<BlockRegistry>,
        adapter: M,
        objects: O,
    ) -> Result<Self, EngineError> {
        cfg.validate()?;
        let add_distance = Ellipsoid::from_pair(cfg.chunk_add_distance);
        let remove_distance =
            Ellipsoid::from_pair(cfg.chunk_remove_distance).at_least_outside(add_distance);
        let mesher = GreedyMesher::new(
            cfg.chunk_size,
            MesherOptions {
                ambient_occlusion: cfg.ambient_occlusion,
                reverse_ao: cfg.reverse_ao,
            },
        );
        let (completions_tx, completions_rx) = unbounded();
        log::info!(
            target: "stream",
            "engine ready: chunk size {}, add {:?}, remove {:?}, world `{}`",
            cfg.chunk_size,
            add_distance,
            remove_distance,
            cfg.world_name
        );
        Ok(Self {
            indexer: ChunkIndexer::new(cfg.chunk_size),
            arena: ChunkArena::new(),
            mesher,
            adapter,
            objects,
            queues: Queues::default(),
            add_distance,
            remove_distance,
            distance: Box::new(squared_euclidean),
            add_scan: AddScan::new(add_distance, squared_euclidean),
            remove_cursor: 0,
            mesh_cursor: 0,
            viewer_pos: [0.0; 3],
            viewer_chunk: None,
            world_name: cfg.world_name.clone(),
            active_world: cfg.world_name.clone(),
            generator: None,
            tokens: HashMap::new(),
            completions_tx,
            completions_rx,
            events: VecDeque::new(),
            viewer_chunk_loaded: false,
            initial_load_complete: false,
            counters: Counters::default(),
            registry,
            cfg,
        })
    }

    /// Routes future requests to `generator` instead of `ChunkDataNeeded`
    /// events. Requests already issued keep their original route.
    pub fn register_chunk_generator(&mut self, generator: Box<dyn ChunkGenerator>) {
        self.generator = Some(generator);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.cfg.chunk_size
    }

    pub fn indexer(&self) -> &ChunkIndexer {
        &self.indexer
    }

    pub fn set_viewer_position(&mut self, pos: [f64; 3]) {
        self.viewer_pos = pos;
    }

    pub fn viewer_position(&self) -> [f64; 3] {
        self.viewer_pos
    }

    /// The viewer's chunk as of the last tick.
    pub fn viewer_chunk(&self) -> Option<ChunkCoord> {
        self.viewer_chunk
    }

    /// Switches the generation context. Every known chunk is invalidated on
    /// the next tick.
    pub fn set_world_name(&mut self, name: impl Into<String>) {
        self.world_name = name.into();
    }

    pub fn world_name(&self) -> &str {
        &self.world_name
    }

    pub fn set_add_remove_distance(&mut self, add: [i32; 2], remove: [i32; 2]) {
        self.add_distance = Ellipsoid::from_pair(add);
        self.remove_distance = Ellipsoid::from_pair(remove).at_least_outside(self.add_distance);
        self.cfg.chunk_add_distance = [self.add_distance.horizontal, self.add_distance.vertical];
        self.cfg.chunk_remove_distance =
            [self.remove_distance.horizontal, self.remove_distance.vertical];
        self.add_scan = AddScan::new(self.add_distance, &*self.distance);
        self.remove_cursor = 0;
        log::debug!(
            target: "stream",
            "distances now add {:?}, remove {:?}",
            self.add_distance,
            self.remove_distance
        );
    }

    pub fn add_distance(&self) -> Ellipsoid {
        self.add_distance
    }

    pub fn remove_distance(&self) -> Ellipsoid {
        self.remove_distance
    }

    /// Replaces the queue ordering metric (squared Euclidean by default).
    pub fn set_distance_fn(&mut self, distance: DistanceFn) {
        self.distance = distance;
        self.add_scan = AddScan::new(self.add_distance, &*self.distance);
        if let Some(c) = self.viewer_chunk {
            self.queues.sort_all(c, &*self.distance);
        }
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = WorldEvent> + '_ {
        self.events.drain(..)
    }

    pub fn chunk_at(&self, c: ChunkCoord) -> Option<&Chunk> {
        self.arena.chunk_at(c)
    }

    pub fn arena(&self) -> &ChunkArena {
        &self.arena
    }

    pub fn adapter(&self) -> &M {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut M {
        &mut self.adapter
    }

    pub fn objects(&self) -> &O {
        &self.objects
    }

    pub fn is_known(&self, c: ChunkCoord) -> bool {
        self.queues.known.contains(c)
    }

    pub fn is_pending(&self, c: ChunkCoord) -> bool {
        self.queues.pending.contains(c)
    }

    pub fn is_queued_for_mesh(&self, c: ChunkCoord) -> bool {
        self.queues.is_queued_for_mesh(c)
    }

    pub fn is_queued_for_removal(&self, c: ChunkCoord) -> bool {
        self.queues.to_remove.contains(c) || self.queues.invalidated.contains(c)
    }

    pub fn known_chunks(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.queues.known.iter()
    }

    pub fn is_viewer_chunk_loaded(&self) -> bool {
        self.viewer_chunk_loaded
    }

    pub fn initial_load_complete(&self) -> bool {
        self.initial_load_complete
    }
}
