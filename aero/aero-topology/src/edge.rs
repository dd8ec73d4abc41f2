//! Edge records and signed edge references.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Order an edge's endpoints so that `lo <= hi`.
#[inline]
#[must_use]
pub const fn normalize_edge(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

/// A unique undirected edge of a triangle mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    /// End nodes with `nodes[0] <= nodes[1]`.
    pub nodes: [u32; 2],
    /// First two neighbouring triangles, in triangle order.
    pub tris: [Option<u32>; 2],
    /// Neighbours beyond the second.
    pub extra_tris: u32,
    /// Edge has exactly one neighbour.
    pub boundary: bool,
    /// Edge is a trailing (Kutta) edge.
    pub kutta: bool,
}

impl Edge {
    pub(crate) const fn new(lo: u32, hi: u32, tri: u32) -> Self {
        Self {
            nodes: [lo, hi],
            tris: [Some(tri), None],
            extra_tris: 0,
            boundary: false,
            kutta: false,
        }
    }

    pub(crate) const fn attach(&mut self, tri: u32) {
        if self.tris[1].is_none() {
            self.tris[1] = Some(tri);
        } else {
            self.extra_tris += 1;
        }
    }

    /// Number of triangles using this edge.
    #[must_use]
    pub const fn neighbour_count(&self) -> u32 {
        match self.tris {
            [None, _] => 0,
            [Some(_), None] => 1,
            [Some(_), Some(_)] => 2 + self.extra_tris,
        }
    }

    /// Edge has a single neighbour.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.neighbour_count() == 1
    }

    /// Edge has more than two neighbours.
    #[must_use]
    pub const fn is_overloaded(&self) -> bool {
        self.extra_tris > 0
    }

    /// The neighbour across the edge from `tri`, if any.
    #[must_use]
    pub fn other_tri(&self, tri: u32) -> Option<u32> {
        match self.tris {
            [Some(a), b] if a == tri => b,
            [a, Some(b)] if b == tri => a,
            _ => None,
        }
    }

    /// Whether the edge joins `a` and `b` in either direction.
    #[must_use]
    pub const fn joins(&self, a: u32, b: u32) -> bool {
        let (lo, hi) = normalize_edge(a, b);
        self.nodes[0] == lo && self.nodes[1] == hi
    }
}

/// A triangle's reference to one of its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeRef {
    /// Index into the edge list.
    pub edge: u32,
    /// The triangle walks the edge from `hi` to `lo`.
    pub reversed: bool,
}

impl EdgeRef {
    /// Signed, 1-based form: `edge + 1`, negated when reversed.
    ///
    /// # Example
    ///
    /// ```
    /// use aero_topology::EdgeRef;
    ///
    /// assert_eq!(EdgeRef { edge: 4, reversed: false }.signed(), 5);
    /// assert_eq!(EdgeRef { edge: 4, reversed: true }.signed(), -5);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn signed(self) -> i64 {
        let id = self.edge as i64 + 1;
        if self.reversed { -id } else { id }
    }

    /// Inverse of [`EdgeRef::signed`]. Returns `None` for 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_signed(value: i64) -> Option<Self> {
        if value == 0 {
            return None;
        }
        Some(Self {
            edge: (value.unsigned_abs() - 1) as u32,
            reversed: value < 0,
        })
    }
}

/// The three edges of a triangle in the order (n1,n2), (n2,n3), (n1,n3),
/// each with the direction it is walked in.
#[inline]
#[must_use]
pub(crate) const fn tri_edges(tri: [u32; 3]) -> [(u32, u32); 3] {
    [(tri[0], tri[1]), (tri[1], tri[2]), (tri[0], tri[2])]
}
