/// Packs four 2-bit corner levels as `a11<<6 | a10<<4 | a01<<2 | a00`.
#[inline]
pub const fn pack_ao_mask(a00: u8, a01: u8, a10: u8, a11: u8) -> u8 {
    (a11 & 3) << 6 | (a10 & 3) << 4 | (a01 & 3) << 2 | (a00 & 3)
}

/// Inverse of [`pack_ao_mask`]: `[a00, a01, a10, a11]`.
#[inline]
pub fn unpack_ao_mask(mask: u8) -> [u8; 4] {
    [mask & 3, (mask >> 2) & 3, (mask >> 4) & 3, (mask >> 6) & 3]
}

/// Chooses the quad triangulation from corner AO levels. `true` puts the
/// seam on the `a00`–`a11` diagonal.
#[inline]
pub fn decide_tri_dir(a00: u8, a01: u8, a11: u8, a10: u8) -> bool {
    if a00 == a11 {
        if a01 == a10 { a01 == 2 } else { true }
    } else if a01 == a10 {
        false
    } else {
        a00 + a11 > a01 + a10
    }
}

/// Corner occlusion for one face in an axis-transposed frame.
///
/// `solid(i, j, k)` answers for depth `i` along the face normal axis and
/// `j`/`k` along its u/v axes. `ipos` is the open layer the face looks into,
/// `ineg` the layer of the block that owns the face.
pub fn compute_ao(
    solid: impl Fn(i32, i32, i32) -> bool,
    ipos: i32,
    ineg: i32,
    j: i32,
    k: i32,
    reverse_ao: bool,
) -> u8 {
    let (mut a00, mut a01, mut a10, mut a11) = (1u8, 1u8, 1u8, 1u8);
    if solid(ipos, j + 1, k) {
        a10 += 1;
        a11 += 1;
    }
    if solid(ipos, j - 1, k) {
        a00 += 1;
        a01 += 1;
    }
    if solid(ipos, j, k + 1) {
        a01 += 1;
        a11 += 1;
    }
    if solid(ipos, j, k - 1) {
        a00 += 1;
        a10 += 1;
    }

    if solid(ipos, j, k) {
        // Face looks into a solid voxel: every corner is at least partly dark.
        let corner = |a: u8, dj: i32, dk: i32| {
            if a == 3 || solid(ipos, j + dj, k + dk) { 3 } else { 2 }
        };
        a00 = corner(a00, -1, -1);
        a01 = corner(a01, -1, 1);
        a10 = corner(a10, 1, -1);
        a11 = corner(a11, 1, 1);
        return pack_ao_mask(a00, a01, a10, a11);
    }

    let open_corner = |a: u8, dj: i32, dk: i32| -> u8 {
        if a != 1 {
            return a;
        }
        if solid(ipos, j + dj, k + dk) {
            return 2;
        }
        if reverse_ao
            && !(solid(ineg, j + dj, k) && solid(ineg, j, k + dk) && solid(ineg, j + dj, k + dk))
        {
            return 0;
        }
        1
    };
    a00 = open_corner(a00, -1, -1);
    a01 = open_corner(a01, -1, 1);
    a10 = open_corner(a10, 1, -1);
    a11 = open_corner(a11, 1, 1);
    pack_ao_mask(a00, a01, a10, a11)
}
