use std::fmt;
use std::str::FromStr;

use loam_world::ChunkCoord;

use crate::error::EngineError;

/// Join key between a chunk request and its late-arriving data.
/// Displays and parses as `i|j|k|world`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestId {
    pub coord: ChunkCoord,
    pub world: String,
}

impl RequestId {
    pub fn new(coord: ChunkCoord, world: impl Into<String>) -> Self {
        Self {
            coord,
            world: world.into(),
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.coord;
        write!(f, "{}|{}|{}|{}", c.cx, c.cy, c.cz, self.world)
    }
}

impl FromStr for RequestId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || EngineError::BadRequestId(s.to_string());
        // World names may themselves contain '|'.
        let mut parts = s.splitn(4, '|');
        let mut next = || -> Result<i32, EngineError> {
            parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)
        };
        let (i, j, k) = (next()?, next()?, next()?);
        let world = parts.next().ok_or_else(bad)?;
        Ok(Self::new(ChunkCoord::new(i, j, k), world))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_agree() {
        let id = RequestId::new(ChunkCoord::new(-3, 0, 12), "overworld");
        assert_eq!(id.to_string(), "-3|0|12|overworld");
        assert_eq!(id.to_string().parse::<RequestId>().unwrap(), id);
    }

    #[test]
    fn world_name_may_contain_separator() {
        let id: RequestId = "1|2|3|a|b".parse().unwrap();
        assert_eq!(id.world, "a|b");
    }

    #[test]
    fn malformed_ids_are_rejected() {
        for s in ["", "1|2", "1|x|3|w", "1|2|3"] {
            assert!(matches!(s.parse::<RequestId>(), Err(EngineError::BadRequestId(_))), "{s}");
        }
    }
}
