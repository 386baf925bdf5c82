use std::sync::Arc;

use hashbrown::HashMap;
use loam_blocks::{BlockRegistry, FaceDir, TerrainMaterialId};
use loam_chunk::DrawHandle;
use loam_world::ChunkCoord;

use crate::ao::decide_tri_dir;
use crate::batch::{Quad, TerrainBatches};

/// Renderer boundary: turns face batches into drawables the chunk holds
/// until its next remesh or disposal.
pub trait MeshBuildAdapter {
    fn build(
        &mut self,
        chunk: ChunkCoord,
        origin: [i32; 3],
        batches: &TerrainBatches,
    ) -> Vec<DrawHandle>;
    fn dispose(&mut self, handles: Vec<DrawHandle>);
}

/// Vertex brightness per AO level: `levels[n-1]` for level `n` in 1..=3,
/// `reverse` for level 0.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AoShading {
    pub levels: [f32; 3],
    pub reverse: f32,
}

impl Default for AoShading {
    fn default() -> Self {
        Self {
            levels: [0.93, 0.8, 0.5],
            reverse: 1.05,
        }
    }
}

impl AoShading {
    #[inline]
    pub fn factor(&self, level: u8) -> f32 {
        match level {
            0 => self.reverse,
            n => self.levels[(n as usize - 1).min(2)],
        }
    }
}

#[derive(Default, Clone, Debug)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u32>,
    pub col: Vec<u8>,
}

impl MeshBuild {
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.pos.reserve(n_quads * 4 * 3);
        self.norm.reserve(n_quads * 4 * 3);
        self.uv.reserve(n_quads * 4 * 2);
        self.col.reserve(n_quads * 4 * 4);
        self.idx.reserve(n_quads * 6);
    }

    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    /// Emits one face-aligned rectangle. Corners are ordered
    /// `c00, c10, c11, c01` in the face's (u, v) frame; `ao` is
    /// `[a00, a01, a10, a11]`.
    pub fn add_face_rect(
        &mut self,
        dir: FaceDir,
        origin: [f32; 3],
        w: f32,
        h: f32,
        rgba: [f32; 4],
        ao: [u8; 4],
        shading: &AoShading,
    ) {
        let d = dir.axis();
        let (u, v) = ((d + 1) % 3, (d + 2) % 3);
        let corner = |du: f32, dv: f32| {
            let mut p = origin;
            p[u] += du;
            p[v] += dv;
            p
        };
        let [a00, a01, a10, a11] = ao;
        let verts = [
            (corner(0.0, 0.0), (0.0, 0.0), a00),
            (corner(w, 0.0), (w, 0.0), a10),
            (corner(w, h), (w, h), a11),
            (corner(0.0, h), (0.0, h), a01),
        ];
        let n = dir.normal();
        let base = self.vertex_count() as u32;
        for (p, (tu, tv), level) in verts {
            self.pos.extend_from_slice(&p);
            self.norm.extend_from_slice(&n);
            // Flip V so textures aren't upside-down
            self.uv.extend_from_slice(&[tu, -tv]);
            let f = shading.factor(level);
            self.col.extend_from_slice(&[
                to_u8(rgba[0] * f),
                to_u8(rgba[1] * f),
                to_u8(rgba[2] * f),
                to_u8(rgba[3]),
            ]);
        }
        let mut tris = if decide_tri_dir(a00, a01, a11, a10) {
            [0, 1, 2, 0, 2, 3]
        } else {
            [0, 1, 3, 1, 2, 3]
        };
        // (u, v, d) is right-handed, so c00→c10→c11 winds toward +d.
        if !dir.is_positive() {
            tris.swap(1, 2);
            tris.swap(4, 5);
        }
        self.idx.extend(tris.iter().map(|t| base + t));
    }

    pub fn add_quad(&mut self, origin: [i32; 3], q: &Quad, rgba: [f32; 4], shading: &AoShading) {
        let o = [
            (origin[0] + q.base[0]) as f32,
            (origin[1] + q.base[1]) as f32,
            (origin[2] + q.base[2]) as f32,
        ];
        self.add_face_rect(
            q.dir,
            o,
            q.width as f32,
            q.height as f32,
            rgba,
            q.ao_corners(),
            shading,
        );
    }

    /// Returns a slice of interleaved vertex positions (x,y,z per vertex).
    pub fn positions(&self) -> &[f32] {
        &self.pos
    }

    /// Returns a slice of interleaved vertex normals (x,y,z per vertex).
    pub fn normals(&self) -> &[f32] {
        &self.norm
    }
}

#[inline]
fn to_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// One built terrain mesh, keyed by its batch.
#[derive(Clone, Debug)]
pub struct CpuMesh {
    pub chunk: ChunkCoord,
    pub terrain: TerrainMaterialId,
    pub build: MeshBuild,
}

/// Reference adapter that keeps vertex arrays in memory. Handles index
/// into its own table.
pub struct CpuMeshAdapter {
    registry: Arc<BlockRegistry>,
    shading: AoShading,
    meshes: HashMap<DrawHandle, CpuMesh>,
    next: u64,
    built: u64,
}

impl CpuMeshAdapter {
    pub fn new(registry: Arc<BlockRegistry>) -> Self {
        Self {
            registry,
            shading: AoShading::default(),
            meshes: HashMap::new(),
            next: 1,
            built: 0,
        }
    }

    pub fn with_shading(mut self, shading: AoShading) -> Self {
        self.shading = shading;
        self
    }

    pub fn mesh(&self, handle: DrawHandle) -> Option<&CpuMesh> {
        self.meshes.get(&handle)
    }

    /// Meshes currently alive (built and not yet disposed).
    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    pub fn total_built(&self) -> u64 {
        self.built
    }

    pub fn total_triangles(&self) -> usize {
        self.meshes.values().map(|m| m.build.triangle_count()).sum()
    }
}

impl MeshBuildAdapter for CpuMeshAdapter {
    fn build(
        &mut self,
        chunk: ChunkCoord,
        origin: [i32; 3],
        batches: &TerrainBatches,
    ) -> Vec<DrawHandle> {
        let mut handles = Vec::with_capacity(batches.batches.len());
        for (terrain, batch) in batches.iter() {
            if batch.is_empty() {
                continue;
            }
            let mut mb = MeshBuild::default();
            mb.reserve_quads(batch.len());
            for q in &batch.quads {
                let rgba = self
                    .registry
                    .material(q.material)
                    .map_or([1.0; 4], |m| m.color);
                mb.add_quad(origin, q, rgba, &self.shading);
            }
            let handle = DrawHandle(self.next);
            self.next += 1;
            self.built += 1;
            self.meshes.insert(
                handle,
                CpuMesh {
                    chunk,
                    terrain,
                    build: mb,
                },
            );
            handles.push(handle);
        }
        log::trace!(target: "mesh", "built {} meshes for {}", handles.len(), chunk);
        handles
    }

    fn dispose(&mut self, handles: Vec<DrawHandle>) {
        for h in handles {
            if self.meshes.remove(&h).is_none() {
                log::warn!(target: "mesh", "dispose of unknown draw handle {:?}", h);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ao::pack_ao_mask;

    #[test]
    fn face_rect_winds_toward_normal() {
        for dir in FaceDir::ALL {
            let mut mb = MeshBuild::default();
            let shading = AoShading::default();
            mb.add_face_rect(dir, [0.0; 3], 2.0, 3.0, [1.0; 4], [1, 1, 1, 1], &shading);
            assert_eq!(mb.vertex_count(), 4);
            assert_eq!(mb.triangle_count(), 2);
            let p = |i: u32| {
                let i = i as usize * 3;
                [mb.pos[i], mb.pos[i + 1], mb.pos[i + 2]]
            };
            let n = dir.normal();
            for t in mb.idx.chunks(3) {
                let (a, b, c) = (p(t[0]), p(t[1]), p(t[2]));
                let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
                let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
                let cross = [
                    e1[1] * e2[2] - e1[2] * e2[1],
                    e1[2] * e2[0] - e1[0] * e2[2],
                    e1[0] * e2[1] - e1[1] * e2[0],
                ];
                let dot = cross[0] * n[0] + cross[1] * n[1] + cross[2] * n[2];
                assert!(dot > 0.0, "{dir:?} triangle winds away from its normal");
            }
        }
    }

    #[test]
    fn ao_darkens_vertex_colors() {
        let mut mb = MeshBuild::default();
        let shading = AoShading::default();
        mb.add_face_rect(FaceDir::PosY, [0.0; 3], 1.0, 1.0, [1.0; 4], [3, 1, 1, 1], &shading);
        // c00 carries a00
        assert_eq!(mb.col[0], to_u8(0.5));
        assert_eq!(mb.col[4], to_u8(0.93));
    }

    #[test]
    fn adapter_tracks_and_releases_handles() {
        let reg = Arc::new(BlockRegistry::with_defaults());
        let stone = reg.material_id_by_name("stone").unwrap();
        let mut batches = TerrainBatches::default();
        batches.push(
            reg.terrain_material(stone),
            Quad {
                material: stone,
                dir: FaceDir::PosY,
                base: [0, 1, 0],
                width: 4,
                height: 2,
                ao: pack_ao_mask(1, 1, 1, 1),
            },
        );
        let mut adapter = CpuMeshAdapter::new(reg);
        let handles = adapter.build(ChunkCoord::new(1, 0, 0), [16, 0, 0], &batches);
        assert_eq!(handles.len(), 1);
        let mesh = adapter.mesh(handles[0]).unwrap();
        assert_eq!(&mesh.build.pos[..3], &[16.0, 1.0, 0.0]);
        assert_eq!(adapter.live_meshes(), 1);
        adapter.dispose(handles);
        assert_eq!(adapter.live_meshes(), 0);
        assert_eq!(adapter.total_built(), 1);
    }
}
