use std::fmt;
use std::sync::Arc;

/// Lifecycle callback; receives world-absolute voxel coordinates.
pub type HandlerFn = Arc<dyn Fn(i32, i32, i32) + Send + Sync>;

/// Optional per-block lifecycle callbacks.
///
/// `on_load`/`on_unload` fire when a chunk containing the block is created or
/// disposed; `on_set`/`on_unset` fire when a single voxel changes to or away
/// from the block.
#[derive(Clone, Default)]
pub struct BlockHandlers {
    pub on_load: Option<HandlerFn>,
    pub on_unload: Option<HandlerFn>,
    pub on_set: Option<HandlerFn>,
    pub on_unset: Option<HandlerFn>,
}

impl BlockHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_load(mut self, f: impl Fn(i32, i32, i32) + Send + Sync + 'static) -> Self {
        self.on_load = Some(Arc::new(f));
        self
    }

    pub fn on_unload(mut self, f: impl Fn(i32, i32, i32) + Send + Sync + 'static) -> Self {
        self.on_unload = Some(Arc::new(f));
        self
    }

    pub fn on_set(mut self, f: impl Fn(i32, i32, i32) + Send + Sync + 'static) -> Self {
        self.on_set = Some(Arc::new(f));
        self
    }

    pub fn on_unset(mut self, f: impl Fn(i32, i32, i32) + Send + Sync + 'static) -> Self {
        self.on_unset = Some(Arc::new(f));
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.on_load.is_none()
            && self.on_unload.is_none()
            && self.on_set.is_none()
            && self.on_unset.is_none()
    }

    #[inline]
    pub fn fire_load(&self, x: i32, y: i32, z: i32) {
        if let Some(f) = &self.on_load {
            f(x, y, z);
        }
    }

    #[inline]
    pub fn fire_unload(&self, x: i32, y: i32, z: i32) {
        if let Some(f) = &self.on_unload {
            f(x, y, z);
        }
    }

    #[inline]
    pub fn fire_set(&self, x: i32, y: i32, z: i32) {
        if let Some(f) = &self.on_set {
            f(x, y, z);
        }
    }

    #[inline]
    pub fn fire_unset(&self, x: i32, y: i32, z: i32) {
        if let Some(f) = &self.on_unset {
            f(x, y, z);
        }
    }
}

impl fmt::Debug for BlockHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockHandlers")
            .field("on_load", &self.on_load.is_some())
            .field("on_unload", &self.on_unload.is_some())
            .field("on_set", &self.on_set.is_some())
            .field("on_unset", &self.on_unset.is_some())
            .finish()
    }
}
