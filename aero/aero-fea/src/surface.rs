//! Skin triangles of a deck as an interpolation target.

use aero_interp::InterpMesh;
use hashbrown::{HashMap, HashSet};
use tracing::info;

use crate::deck::{Deck, SetKind};
use crate::error::{FeaError, FeaResult};

/// Element set holding the wetted skin by convention.
pub const DEFAULT_SKIN_ELSET: &str = "ESkin";

impl Deck {
    /// Triangles over the corner nodes 1-3 of every element in `elset`.
    ///
    /// Each triangle carries its element id so interpolated loads can be
    /// written back as `*DLOAD` entries. Only nodes used by the set are
    /// included.
    ///
    /// # Errors
    ///
    /// [`FeaError::MalformedDeck`] for `*ELEMENT` when the set is empty or
    /// absent, or for `*NODE` when an element names an undefined node.
    ///
    /// # Example
    ///
    /// ```
    /// use aero_fea::Deck;
    ///
    /// let deck = Deck::parse(
    ///     "*NODE\n1, 0, 0, 0\n2, 1, 0, 0\n3, 0, 1, 0\n4, 0.5, 0, 0\n5, 0.5, 0.5, 0\n6, 0, 0.5, 0\n\
    ///      *ELEMENT, TYPE=S6, ELSET=ESkin\n17, 1, 2, 3, 4, 5, 6\n",
    /// )
    /// .unwrap();
    /// let mesh = deck.surface_mesh("ESkin").unwrap();
    /// assert_eq!(mesh.tri_count(), 1);
    /// assert_eq!(mesh.element_ids, vec![17]);
    /// assert_eq!(mesh.nodes.len(), 3);
    /// ```
    pub fn surface_mesh(&self, elset: &str) -> FeaResult<InterpMesh> {
        let members: HashSet<u32> =
            self.set_members(SetKind::Element, elset).into_iter().collect();
        if members.is_empty() {
            return Err(FeaError::malformed(
                "*ELEMENT",
                0,
                format!("no elements in set {elset}"),
            ));
        }

        let positions = self.node_positions();
        let mut index: HashMap<u32, u32> = HashMap::new();
        let mut nodes = Vec::new();
        let mut tris = Vec::new();
        let mut ids = Vec::new();

        for (_, element) in self.elements().filter(|(_, e)| members.contains(&e.id)) {
            let [a, b, c, ..] = element.nodes[..] else {
                return Err(FeaError::malformed(
                    "*ELEMENT",
                    0,
                    format!("element {} has fewer than 3 nodes", element.id),
                ));
            };
            let mut tri = [0u32; 3];
            for (slot, id) in tri.iter_mut().zip([a, b, c]) {
                *slot = match index.get(&id) {
                    Some(&i) => i,
                    None => {
                        let position = positions.get(&id).ok_or_else(|| {
                            FeaError::malformed(
                                "*NODE",
                                0,
                                format!("element {} uses undefined node {id}", element.id),
                            )
                        })?;
                        let i = u32::try_from(nodes.len()).map_err(|_| {
                            FeaError::malformed("*NODE", 0, "too many skin nodes")
                        })?;
                        nodes.push(*position);
                        index.insert(id, i);
                        i
                    }
                };
            }
            tris.push(tri);
            ids.push(element.id);
        }

        info!(elset, tris = tris.len(), nodes = nodes.len(), "Extracted skin mesh");
        Ok(InterpMesh::new(nodes, tris).with_element_ids(ids))
    }
}
