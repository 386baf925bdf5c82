use loam_world::{ChunkCoord, Ellipsoid};

/// Offsets inside the add ellipsoid, restricted to the wedge
/// `x >= z >= 0, y >= 0` and sorted nearest first. Each entry stands for
/// all of its reflections.
#[derive(Clone, Debug, Default)]
pub(crate) struct AddScan {
    wedge: Vec<[i32; 3]>,
    cursor: usize,
}

impl AddScan {
    pub fn new(add: Ellipsoid, dist: impl Fn(i32, i32, i32) -> i64) -> Self {
        let mut wedge = Vec::new();
        for x in 0..=add.horizontal {
            for z in 0..=x {
                for y in 0..=add.vertical {
                    if add.contains(x, y, z) {
                        wedge.push([x, y, z]);
                    }
                }
            }
        }
        wedge.sort_by_cached_key(|&[x, y, z]| (dist(x, y, z), [x, y, z]));
        Self { wedge, cursor: 0 }
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.wedge.len()
    }

    pub fn len(&self) -> usize {
        self.wedge.len()
    }

    /// Visits up to `budget` wedge entries from the cursor, calling `visit`
    /// with every reflected location around `center`.
    pub fn advance(
        &mut self,
        center: ChunkCoord,
        budget: usize,
        mut visit: impl FnMut(ChunkCoord),
    ) {
        let end = (self.cursor + budget).min(self.wedge.len());
        for &[x, y, z] in &self.wedge[self.cursor..end] {
            for [dx, dy, dz] in reflections(x, y, z) {
                visit(center.offset(dx, dy, dz));
            }
        }
        self.cursor = end;
    }
}

/// Distinct images of a wedge offset under sign flips and the x/z swap.
fn reflections(x: i32, y: i32, z: i32) -> impl Iterator<Item = [i32; 3]> {
    let mut out: Vec<[i32; 3]> = Vec::with_capacity(16);
    for (a, b) in [(x, z), (z, x)] {
        for sa in [1, -1] {
            for sy in [1, -1] {
                for sb in [1, -1] {
                    let p = [a * sa, y * sy, b * sb];
                    if !out.contains(&p) {
                        out.push(p);
                    }
                }
            }
        }
    }
    out.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;
    use loam_world::squared_euclidean;

    #[test]
    fn reflections_cover_ellipsoid_exactly_once() {
        let add = Ellipsoid::new(3, 2);
        let mut scan = AddScan::new(add, squared_euclidean);
        let mut seen = Vec::new();
        scan.advance(ChunkCoord::new(0, 0, 0), usize::MAX, |c| seen.push(c));
        assert!(scan.is_complete());
        let unique: HashSet<_> = seen.iter().copied().collect();
        assert_eq!(unique.len(), seen.len());
        let mut want = 0;
        for x in -3..=3 {
            for y in -2..=2 {
                for z in -3..=3 {
                    if add.contains(x, y, z) {
                        want += 1;
                        assert!(unique.contains(&ChunkCoord::new(x, y, z)));
                    }
                }
            }
        }
        assert_eq!(seen.len(), want);
    }

    #[test]
    fn nearest_offsets_come_first() {
        let mut scan = AddScan::new(Ellipsoid::new(4, 4), squared_euclidean);
        let mut first = Vec::new();
        scan.advance(ChunkCoord::new(5, 5, 5), 1, |c| first.push(c));
        assert_eq!(first, vec![ChunkCoord::new(5, 5, 5)]);
        assert!(!scan.is_complete());
        scan.reset();
        let mut again = Vec::new();
        scan.advance(ChunkCoord::new(0, 0, 0), 2, |c| again.push(c));
        // [0, 1, 0] sorts before [1, 0, 0] at equal distance.
        assert_eq!(
            again,
            vec![ChunkCoord::new(0, 0, 0), ChunkCoord::new(0, 1, 0), ChunkCoord::new(0, -1, 0)]
        );
    }
}
