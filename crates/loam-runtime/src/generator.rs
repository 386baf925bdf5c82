use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::Sender;
use loam_blocks::BlockId;
use loam_chunk::{UserData, VoxelBuffer};
use loam_world::ChunkCoord;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::EngineError;
use crate::request::RequestId;

/// Cancellation flag shared between the engine and one outstanding
/// request. Identity (not value) decides whether a result is current.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn same_as(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Voxel data for one chunk. With `fill`, `voxels` content is ignored and
/// the chunk is filled with that id.
pub struct GeneratedChunk {
    pub voxels: VoxelBuffer,
    pub user_data: Option<UserData>,
    pub fill: Option<BlockId>,
}

impl GeneratedChunk {
    pub fn new(voxels: VoxelBuffer) -> Self {
        Self {
            voxels,
            user_data: None,
            fill: None,
        }
    }

    pub fn filled(size: usize, id: BlockId) -> Self {
        Self {
            voxels: VoxelBuffer::new(size),
            user_data: None,
            fill: Some(id),
        }
    }

    pub fn with_user_data(mut self, data: UserData) -> Self {
        self.user_data = Some(data);
        self
    }
}

impl fmt::Debug for GeneratedChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedChunk")
            .field("size", &self.voxels.size())
            .field("fill", &self.fill)
            .field("has_user_data", &self.user_data.is_some())
            .finish()
    }
}

pub(crate) struct Completion {
    pub request_id: RequestId,
    pub token: CancelToken,
    pub result: Result<Option<GeneratedChunk>, String>,
}

/// One-shot answer channel for a [`GenerateRequest`]. Usable from any
/// thread; the engine applies the answer on its next tick.
pub struct Responder {
    tx: Sender<Completion>,
    request_id: RequestId,
    token: CancelToken,
}

impl Responder {
    /// `None` resolves the location as all air.
    pub fn resolve(self, chunk: Option<GeneratedChunk>) {
        self.send(Ok(chunk));
    }

    /// Logged by the engine; the location resolves as all air.
    pub fn reject(self, err: impl fmt::Display) {
        self.send(Err(err.to_string()));
    }

    fn send(self, result: Result<Option<GeneratedChunk>, String>) {
        let msg = Completion {
            request_id: self.request_id,
            token: self.token,
            result,
        };
        // The engine may be gone; nothing left to tell.
        let _ = self.tx.send(msg);
    }
}

pub struct GenerateRequest {
    pub request_id: RequestId,
    pub coord: ChunkCoord,
    pub chunk_size: usize,
    pub cancel: CancelToken,
    pub responder: Responder,
}

impl GenerateRequest {
    pub(crate) fn new(
        request_id: RequestId,
        chunk_size: usize,
        cancel: CancelToken,
        tx: Sender<Completion>,
    ) -> Self {
        Self {
            coord: request_id.coord,
            chunk_size,
            responder: Responder {
                tx,
                request_id: request_id.clone(),
                token: cancel.clone(),
            },
            cancel,
            request_id,
        }
    }
}

/// Source of chunk voxel data, answered through the request's responder.
pub trait ChunkGenerator {
    fn generate(&mut self, request: GenerateRequest);
}

pub type GenerateError = Box<dyn std::error::Error + Send + Sync>;

type GenerateResult = Result<Option<GeneratedChunk>, GenerateError>;

type GenerateFn = dyn Fn(ChunkCoord, usize) -> GenerateResult + Send + Sync;

/// Runs a synchronous generate function on a worker pool.
pub struct ThreadedGenerator {
    pool: ThreadPool,
    generate: Arc<GenerateFn>,
}

impl ThreadedGenerator {
    pub fn new<F>(threads: usize, generate: F) -> Result<Self, EngineError>
    where
        F: Fn(ChunkCoord, usize) -> GenerateResult + Send + Sync + 'static,
    {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("loam-gen-{i}"))
            .build()?;
        Ok(Self {
            pool,
            generate: Arc::new(generate),
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl ChunkGenerator for ThreadedGenerator {
    fn generate(&mut self, request: GenerateRequest) {
        let generate = Arc::clone(&self.generate);
        self.pool.spawn(move || {
            let GenerateRequest {
                coord,
                chunk_size,
                cancel,
                responder,
                ..
            } = request;
            if cancel.is_cancelled() {
                return;
            }
            match generate(coord, chunk_size) {
                Ok(chunk) => responder.resolve(chunk),
                Err(e) => responder.reject(e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    #[test]
    fn tokens_compare_by_identity() {
        let a = CancelToken::new();
        let b = a.clone();
        let c = CancelToken::new();
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
        b.cancel();
        assert!(a.is_cancelled());
        assert!(!c.is_cancelled());
    }

    #[test]
    fn threaded_generator_answers_through_responder() {
        let (tx, rx) = unbounded();
        let mut generator = ThreadedGenerator::new(2, |coord, size| {
            if coord.cy < 0 {
                Ok(Some(GeneratedChunk::filled(size, 1)))
            } else {
                Err("no sky today".into())
            }
        })
        .unwrap();
        let below = RequestId::new(ChunkCoord::new(0, -1, 0), "w");
        let above = RequestId::new(ChunkCoord::new(0, 1, 0), "w");
        generator.generate(GenerateRequest::new(below.clone(), 8, CancelToken::new(), tx.clone()));
        generator.generate(GenerateRequest::new(above.clone(), 8, CancelToken::new(), tx));
        let mut got = Vec::new();
        for _ in 0..2 {
            got.push(rx.recv_timeout(Duration::from_secs(5)).unwrap());
        }
        got.sort_by_key(|c| c.request_id.coord.cy);
        assert_eq!(got[0].request_id, below);
        assert_eq!(got[0].result.as_ref().unwrap().as_ref().unwrap().fill, Some(1));
        assert_eq!(got[1].result.as_ref().unwrap_err(), "no sky today");
    }

    #[test]
    fn cancelled_requests_are_skipped() {
        let (tx, rx) = unbounded();
        let mut generator =
            ThreadedGenerator::new(1, |_, size| Ok(Some(GeneratedChunk::filled(size, 1)))).unwrap();
        let id = RequestId::new(ChunkCoord::new(0, 0, 0), "w");
        let req = GenerateRequest::new(id, 4, CancelToken::new(), tx);
        req.cancel.cancel();
        generator.generate(req);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }
}
