//! Edge topology construction.

use hashbrown::HashMap;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::diagnostics::TopologyDiagnostics;
use crate::edge::{Edge, EdgeRef, normalize_edge, tri_edges};

/// Unique edges of a triangle list and each triangle's signed references
/// to them.
#[derive(Debug, Clone, Default)]
pub struct EdgeTopology {
    edges: Vec<Edge>,
    tri_edges: Vec<[EdgeRef; 3]>,
    lookup: HashMap<(u32, u32), u32>,
    diagnostics: TopologyDiagnostics,
}

#[allow(clippy::cast_possible_truncation)]
const fn idx(i: usize) -> u32 {
    i as u32
}

/// Build edge topology in a single pass.
///
/// Edges are numbered in order of first encounter, visiting each triangle's
/// edges as (n1,n2), (n2,n3), (n1,n3). An edge seen by a third or later
/// triangle is kept and counted in [`Edge::extra_tris`].
///
/// # Example
///
/// ```
/// use aero_topology::build_topology;
///
/// let topo = build_topology(&[[0, 1, 2], [1, 3, 2]]);
/// assert_eq!(topo.edge_count(), 5);
/// assert_eq!(topo.diagnostics().open_edge_count(), 4);
///
/// // Edge (1,2) is slot 1 of the first triangle and slot 2 of the second.
/// let shared = topo.tri_edges()[0][1];
/// assert_eq!(topo.edge(shared.edge).tris, [Some(0), Some(1)]);
/// ```
#[must_use]
pub fn build_topology(tris: &[[u32; 3]]) -> EdgeTopology {
    let mut lookup: HashMap<(u32, u32), u32> = HashMap::with_capacity(tris.len() * 3 / 2 + 1);
    let mut edges: Vec<Edge> = Vec::with_capacity(tris.len() * 3 / 2 + 1);
    let mut refs = Vec::with_capacity(tris.len());

    for (t, tri) in tris.iter().enumerate() {
        let t = idx(t);
        let mut slots = [EdgeRef {
            edge: 0,
            reversed: false,
        }; 3];
        for (slot, (a, b)) in slots.iter_mut().zip(tri_edges(*tri)) {
            let key = normalize_edge(a, b);
            let edge = match lookup.get(&key) {
                Some(&e) => {
                    edges[e as usize].attach(t);
                    e
                }
                None => {
                    let e = idx(edges.len());
                    edges.push(Edge::new(key.0, key.1, t));
                    lookup.insert(key, e);
                    e
                }
            };
            *slot = EdgeRef {
                edge,
                reversed: a > b,
            };
        }
        refs.push(slots);
    }

    EdgeTopology::finish(edges, refs, lookup, tris)
}

/// Build edge topology by sorting edge keys in parallel.
///
/// Produces the same edges and adjacency as [`build_topology`], numbered in
/// `(lo, hi)` key order instead of encounter order.
#[must_use]
pub fn build_topology_sorted(tris: &[[u32; 3]]) -> EdgeTopology {
    // (key, tri, slot, reversed)
    let mut keyed: Vec<((u32, u32), u32, u8, bool)> = tris
        .par_iter()
        .enumerate()
        .flat_map_iter(|(t, tri)| {
            tri_edges(*tri)
                .into_iter()
                .zip(0u8..)
                .map(move |((a, b), slot)| (normalize_edge(a, b), idx(t), slot, a > b))
        })
        .collect();
    keyed.par_sort_unstable();

    let mut edges: Vec<Edge> = Vec::new();
    let mut lookup: HashMap<(u32, u32), u32> = HashMap::new();
    let mut refs = vec![
        [EdgeRef {
            edge: 0,
            reversed: false
        }; 3];
        tris.len()
    ];

    for group in keyed.chunk_by(|a, b| a.0 == b.0) {
        let (key, first_tri, ..) = group[0];
        let e = idx(edges.len());
        let mut edge = Edge::new(key.0, key.1, first_tri);
        for &(_, t, slot, reversed) in group {
            refs[t as usize][usize::from(slot)] = EdgeRef { edge: e, reversed };
        }
        for &(_, t, ..) in &group[1..] {
            edge.attach(t);
        }
        edges.push(edge);
        lookup.insert(key, e);
    }

    EdgeTopology::finish(edges, refs, lookup, tris)
}

impl EdgeTopology {
    fn finish(
        mut edges: Vec<Edge>,
        tri_edges: Vec<[EdgeRef; 3]>,
        lookup: HashMap<(u32, u32), u32>,
        tris: &[[u32; 3]],
    ) -> Self {
        let mut diagnostics = TopologyDiagnostics::default();
        for (i, edge) in edges.iter_mut().enumerate() {
            edge.boundary = edge.is_open();
            if edge.boundary {
                diagnostics.open_edges.push(idx(i));
            }
            if edge.is_overloaded() {
                diagnostics.overloaded_edges.push(idx(i));
            }
        }
        diagnostics.degenerate_tris = tris
            .iter()
            .enumerate()
            .filter(|(_, t)| t[0] == t[1] || t[1] == t[2] || t[0] == t[2])
            .map(|(i, _)| idx(i))
            .collect();

        debug!(
            tris = tris.len(),
            edges = edges.len(),
            "Built edge topology"
        );
        if !diagnostics.overloaded_edges.is_empty() || !diagnostics.degenerate_tris.is_empty() {
            warn!(
                overloaded = diagnostics.overloaded_edges.len(),
                degenerate = diagnostics.degenerate_tris.len(),
                "Mesh is not a manifold"
            );
        }
        if !diagnostics.open_edges.is_empty() {
            warn!(open = diagnostics.open_edges.len(), "Mesh has open edges");
        }

        Self {
            edges,
            tri_edges,
            lookup,
            diagnostics,
        }
    }

    /// Number of unique edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edge by index.
    ///
    /// # Panics
    ///
    /// Panics if `edge` is out of range.
    #[must_use]
    pub fn edge(&self, edge: u32) -> &Edge {
        &self.edges[edge as usize]
    }

    /// Per-triangle edge references, parallel to the input triangle list.
    #[must_use]
    pub fn tri_edges(&self) -> &[[EdgeRef; 3]] {
        &self.tri_edges
    }

    /// Index of the edge joining `a` and `b`, if it exists.
    #[must_use]
    pub fn find_edge(&self, a: u32, b: u32) -> Option<u32> {
        self.lookup.get(&normalize_edge(a, b)).copied()
    }

    /// Defects found during the build.
    #[must_use]
    pub const fn diagnostics(&self) -> &TopologyDiagnostics {
        &self.diagnostics
    }

    /// Mark the edges joining each node pair as Kutta edges.
    ///
    /// Pairs that match no edge are skipped. Returns how many edges were
    /// flagged.
    pub fn flag_kutta(&mut self, pairs: &[[u32; 2]]) -> usize {
        let mut flagged = 0;
        for &[a, b] in pairs {
            if let Some(e) = self.find_edge(a, b) {
                self.edges[e as usize].kutta = true;
                flagged += 1;
            }
        }
        if flagged < pairs.len() {
            warn!(
                requested = pairs.len(),
                flagged, "Some Kutta edges are not in the mesh"
            );
        }
        flagged
    }

    /// Iterate over Kutta edges.
    pub fn kutta_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(|e| e.kutta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Closed octahedron, consistently wound.
    fn octahedron() -> Vec<[u32; 3]> {
        vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ]
    }

    #[test]
    fn single_triangle_has_three_open_edges() {
        let topo = build_topology(&[[0, 1, 2]]);
        assert_eq!(topo.edge_count(), 3);
        assert_eq!(topo.diagnostics().open_edge_count(), 3);
        assert!(topo.edges().iter().all(|e| e.boundary));
    }

    #[test]
    fn edge_order_and_signs() {
        let topo = build_topology(&[[2, 0, 1]]);
        let refs = topo.tri_edges()[0];
        // (2,0) walked hi->lo, (0,1) lo->hi, (2,1) hi->lo
        assert_eq!(topo.edge(refs[0].edge).nodes, [0, 2]);
        assert!(refs[0].reversed);
        assert_eq!(topo.edge(refs[1].edge).nodes, [0, 1]);
        assert!(!refs[1].reversed);
        assert_eq!(topo.edge(refs[2].edge).nodes, [1, 2]);
        assert!(refs[2].reversed);
        assert_eq!(refs[0].signed(), -1);
        assert_eq!(refs[1].signed(), 2);
    }

    #[test]
    fn closed_manifold_counts() {
        let tris = octahedron();
        let topo = build_topology(&tris);
        assert_eq!(topo.edge_count(), tris.len() * 3 / 2);
        assert!(topo.diagnostics().is_closed_manifold());
        assert!(topo.edges().iter().all(|e| e.neighbour_count() == 2));
    }

    #[test]
    fn third_triangle_is_overloaded() {
        let topo = build_topology(&[[0, 1, 2], [1, 0, 3], [0, 1, 4]]);
        let e = topo.find_edge(0, 1).unwrap();
        assert_eq!(topo.edge(e).extra_tris, 1);
        assert_eq!(topo.diagnostics().overloaded_edges, vec![e]);
    }

    #[test]
    fn degenerate_triangle_is_reported() {
        let topo = build_topology(&[[0, 1, 1], [0, 1, 2]]);
        assert_eq!(topo.diagnostics().degenerate_tris, vec![0]);
        assert!(!topo.diagnostics().is_clean());
    }

    #[test]
    fn sorted_build_matches_sequential() {
        let tris = octahedron();
        let a = build_topology(&tris);
        let b = build_topology_sorted(&tris);
        assert_eq!(a.edge_count(), b.edge_count());
        for (t, (ra, rb)) in a.tri_edges().iter().zip(b.tri_edges()).enumerate() {
            for (x, y) in ra.iter().zip(rb) {
                let (ea, eb) = (a.edge(x.edge), b.edge(y.edge));
                assert_eq!(ea.nodes, eb.nodes, "tri {t}");
                assert_eq!(ea.tris, eb.tris, "tri {t}");
                assert_eq!(x.reversed, y.reversed);
            }
        }
    }

    #[test]
    fn kutta_flags() {
        let mut topo = build_topology(&[[0, 1, 2], [1, 3, 2]]);
        assert_eq!(topo.flag_kutta(&[[1, 0], [7, 8]]), 1);
        let kutta: Vec<_> = topo.kutta_edges().map(|e| e.nodes).collect();
        assert_eq!(kutta, vec![[0, 1]]);
    }

    mod logging {
        use std::fmt;
        use std::sync::{Arc, Mutex};

        use tracing::field::{Field, Visit};
        use tracing::span::{Attributes, Id, Record};
        use tracing::{Event, Level, Metadata, Subscriber};

        use crate::build_topology;

        /// Keeps the level and message of every event.
        #[derive(Clone, Default)]
        struct Recorder(Arc<Mutex<Vec<(Level, String)>>>);

        struct Message(String);

        impl Visit for Message {
            fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
                if field.name() == "message" {
                    self.0 = format!("{value:?}");
                }
            }
        }

        impl Subscriber for Recorder {
            fn enabled(&self, _: &Metadata<'_>) -> bool {
                true
            }
            fn new_span(&self, _: &Attributes<'_>) -> Id {
                Id::from_u64(1)
            }
            fn record(&self, _: &Id, _: &Record<'_>) {}
            fn record_follows_from(&self, _: &Id, _: &Id) {}
            fn event(&self, event: &Event<'_>) {
                let mut message = Message(String::new());
                event.record(&mut message);
                self.0
                    .lock()
                    .unwrap()
                    .push((*event.metadata().level(), message.0));
            }
            fn enter(&self, _: &Id) {}
            fn exit(&self, _: &Id) {}
        }

        #[test]
        fn open_edges_are_warned() {
            let recorder = Recorder::default();
            tracing::subscriber::with_default(recorder.clone(), || {
                build_topology(&[[0, 1, 2]]);
            });
            let events = recorder.0.lock().unwrap();
            assert!(
                events
                    .iter()
                    .any(|(level, msg)| *level == Level::WARN && msg == "Mesh has open edges")
            );
        }
    }
}
