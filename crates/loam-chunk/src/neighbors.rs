/// Slot of the chunk itself in its 27-entry neighbor table.
pub const SELF_SLOT: usize = 13;
pub const NEIGHBOR_SLOTS: usize = 27;

/// `(di+1)*9 + (dj+1)*3 + (dk+1)` for offsets in `-1..=1`.
#[inline]
pub const fn slot_index(di: i32, dj: i32, dk: i32) -> usize {
    ((di + 1) * 9 + (dj + 1) * 3 + (dk + 1)) as usize
}

#[inline]
pub const fn slot_offset(slot: usize) -> (i32, i32, i32) {
    let s = slot as i32;
    (s / 9 - 1, (s / 3) % 3 - 1, s % 3 - 1)
}

/// Offsets of every neighbor chunk that shares the face, edge, or corner a
/// local voxel lies on. Empty for interior voxels.
pub fn edge_offsets(local: [usize; 3], size: usize) -> Vec<(i32, i32, i32)> {
    let axis = |v: usize| -> ([i32; 2], usize) {
        let mut out = [0; 2];
        let mut n = 0;
        if v == 0 {
            out[n] = -1;
            n += 1;
        }
        if v + 1 == size {
            out[n] = 1;
            n += 1;
        }
        (out, n)
    };
    let (xs, nx) = axis(local[0]);
    let (ys, ny) = axis(local[1]);
    let (zs, nz) = axis(local[2]);
    if nx + ny + nz == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(7);
    for di in std::iter::once(0).chain(xs[..nx].iter().copied()) {
        for dj in std::iter::once(0).chain(ys[..ny].iter().copied()) {
            for dk in std::iter::once(0).chain(zs[..nz].iter().copied()) {
                if (di, dj, dk) != (0, 0, 0) {
                    out.push((di, dj, dk));
                }
            }
        }
    }
    out
}
