//! Id offsets and dense renumbering.

use hashbrown::HashMap;
use tracing::{info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::deck::{Card, Deck, IdRef, Section, SetEntry, SetKind};

/// Margin added above the rounded maximum id.
pub const OFFSET_MARGIN: u32 = 20_000;

/// Rounding granularity for offsets.
pub const OFFSET_ROUNDING: u32 = 10_000;

/// Image of a `GENERATE` range under an [`IdMap`].
enum RangeImage {
    /// Still a range.
    Range([u32; 3]),
    /// Listed member by member.
    Ids(Vec<u32>),
}

/// Rewrites ids in place. `None` drops the reference.
trait IdMap {
    fn node(&self, id: u32) -> Option<u32>;
    fn element(&self, id: u32) -> Option<u32>;
    fn range(&self, kind: SetKind, range: [u32; 3]) -> RangeImage;
}

fn in_range(id: u32, [start, end, step]: [u32; 3]) -> bool {
    (start..=end).contains(&id) && (id - start) % step.max(1) == 0
}

/// Rewrite the entries of one set card. Expanded ranges turn the card into
/// an explicit list, unless the new members are contiguous. Returns the
/// number of dropped ids.
fn remap_set(card: &mut Card<SetEntry>, map: &impl IdMap) -> usize {
    let kind = card.kind();
    let mut dropped = 0;
    let mut listed = false;
    let mut entries = Vec::with_capacity(card.entries.len());
    for entry in card.entries.drain(..) {
        match entry {
            SetEntry::Id(id) => {
                let mapped = match kind {
                    SetKind::Node => map.node(id),
                    SetKind::Element => map.element(id),
                };
                match mapped {
                    Some(new) => entries.push(SetEntry::Id(new)),
                    None => dropped += 1,
                }
            }
            SetEntry::Range(range) => match map.range(kind, range) {
                RangeImage::Range(range) => entries.push(SetEntry::Range(range)),
                RangeImage::Ids(ids) => {
                    listed = true;
                    entries.extend(ids.into_iter().map(SetEntry::Id));
                }
            },
            SetEntry::Set(name) => entries.push(SetEntry::Set(name)),
        }
    }
    if !listed {
        card.entries = entries;
        return dropped;
    }

    let mut ids: Vec<u32> = entries
        .iter()
        .filter_map(|e| match e {
            SetEntry::Id(id) => Some(*id),
            _ => None,
        })
        .collect();
    ids.sort_unstable();
    ids.dedup();
    let block = match (ids.first(), ids.last()) {
        (Some(&first), Some(&last))
            if usize::try_from(last - first).is_ok_and(|span| span + 1 == ids.len()) =>
        {
            Some([first, last, 1])
        }
        _ => None,
    };
    card.entries = if let Some(range) = block {
        vec![SetEntry::Range(range)]
    } else {
        card.keyword.remove("GENERATE");
        ids.into_iter().map(SetEntry::Id).collect()
    };
    dropped
}

fn map_ref(target: &mut IdRef, f: impl Fn(u32) -> Option<u32>) -> bool {
    match target {
        IdRef::Id(id) => match f(*id) {
            Some(new) => {
                *id = new;
                true
            }
            None => false,
        },
        IdRef::Set(_) => true,
    }
}

/// Apply `map` to every id definition and reference. Returns the number
/// of references dropped because they had no image.
fn remap(deck: &mut Deck, map: &impl IdMap) -> usize {
    let mut dropped = 0;
    let mut count = |before: usize, after: usize| dropped += before - after;
    deck.for_each_section_mut(&mut |section| match section {
        Section::Nodes(card) => {
            let before = card.entries.len();
            card.entries.retain_mut(|n| map.node(n.id).map(|id| n.id = id).is_some());
            count(before, card.entries.len());
        }
        Section::Elements(card) => {
            let before = card.entries.len();
            card.entries.retain_mut(|e| {
                let Some(id) = map.element(e.id) else {
                    return false;
                };
                let nodes: Option<Vec<u32>> = e.nodes.iter().map(|n| map.node(*n)).collect();
                nodes.map(|nodes| {
                    e.id = id;
                    e.nodes = nodes;
                })
                .is_some()
            });
            count(before, card.entries.len());
        }
        Section::Set(card) => count(remap_set(card, map), 0),
        Section::Dload(card) => {
            let before = card.entries.len();
            card.entries
                .retain_mut(|d| map_ref(&mut d.target, |id| map.element(id)));
            count(before, card.entries.len());
        }
        Section::Cload(card) => {
            let before = card.entries.len();
            card.entries
                .retain_mut(|c| map_ref(&mut c.target, |id| map.node(id)));
            count(before, card.entries.len());
        }
        Section::Boundary(card) => {
            let before = card.entries.len();
            card.entries
                .retain_mut(|b| map_ref(&mut b.target, |id| map.node(id)));
            count(before, card.entries.len());
        }
        Section::Equation(card) => {
            let before = card.entries.len();
            card.entries.retain_mut(|eq| {
                let nodes: Option<Vec<u32>> = eq.terms.iter().map(|t| map.node(t.node)).collect();
                nodes
                    .map(|nodes| {
                        for (term, node) in eq.terms.iter_mut().zip(nodes) {
                            term.node = node;
                        }
                    })
                    .is_some()
            });
            count(before, card.entries.len());
        }
        Section::Comment(_)
        | Section::ShellSection(_)
        | Section::Material(_)
        | Section::Step(_)
        | Section::Raw(_) => {}
    });
    dropped
}

/// Constant shifts applied to node and element ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IdOffsets {
    /// Added to every node id.
    pub node: u32,
    /// Added to every element id.
    pub element: u32,
}

impl IdOffsets {
    /// Create offsets.
    #[must_use]
    pub const fn new(node: u32, element: u32) -> Self {
        Self { node, element }
    }

    /// Offsets that clear a deck's ids: the maximum rounded down to a
    /// multiple of 10000, plus 20000.
    ///
    /// A second deck shifted by these offsets can share a file with
    /// `deck` without id collisions.
    ///
    /// # Example
    ///
    /// ```
    /// use aero_fea::{Deck, IdOffsets};
    ///
    /// let deck = Deck::parse("*NODE\n12345, 0, 0, 0\n*ELEMENT, TYPE=S3\n7, 12345, 12345, 12345\n")
    ///     .unwrap();
    /// assert_eq!(IdOffsets::recommended(&deck), IdOffsets::new(30_000, 20_000));
    /// ```
    #[must_use]
    pub fn recommended(deck: &Deck) -> Self {
        let offset = |max: u32| (max / OFFSET_ROUNDING) * OFFSET_ROUNDING + OFFSET_MARGIN;
        Self {
            node: offset(deck.max_node_id()),
            element: offset(deck.max_element_id()),
        }
    }

    /// Whether both offsets are zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.node == 0 && self.element == 0
    }
}

impl IdMap for IdOffsets {
    fn node(&self, id: u32) -> Option<u32> {
        Some(id.saturating_add(self.node))
    }

    fn element(&self, id: u32) -> Option<u32> {
        Some(id.saturating_add(self.element))
    }

    fn range(&self, kind: SetKind, [start, end, step]: [u32; 3]) -> RangeImage {
        let shift = match kind {
            SetKind::Node => self.node,
            SetKind::Element => self.element,
        };
        RangeImage::Range([start.saturating_add(shift), end.saturating_add(shift), step])
    }
}

impl Deck {
    /// Shift every node and element id, and every reference to one.
    ///
    /// `GENERATE` ranges shift with their ids.
    pub fn apply_offsets(&mut self, offsets: IdOffsets) {
        if offsets.is_zero() {
            return;
        }
        remap(self, &offsets);
        info!(
            node_offset = offsets.node,
            element_offset = offsets.element,
            "Applied id offsets"
        );
    }
}

/// Old-to-new id maps produced by [`renumber`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Renumbering {
    /// Old node id to new node id.
    pub nodes: HashMap<u32, u32>,
    /// Old element id to new element id.
    pub elements: HashMap<u32, u32>,
    /// References to undefined ids that were removed.
    pub dropped_references: usize,
    /// Definitions repeated under an id already seen.
    pub duplicate_definitions: usize,
}

impl Renumbering {
    /// New id of an old node.
    #[must_use]
    pub fn node(&self, old: u32) -> Option<u32> {
        self.nodes.get(&old).copied()
    }

    /// New id of an old element.
    #[must_use]
    pub fn element(&self, old: u32) -> Option<u32> {
        self.elements.get(&old).copied()
    }
}

impl IdMap for Renumbering {
    fn node(&self, id: u32) -> Option<u32> {
        self.nodes.get(&id).copied()
    }

    fn element(&self, id: u32) -> Option<u32> {
        self.elements.get(&id).copied()
    }

    /// Members are the defined ids inside the range, so a range that
    /// covers every id (such as `NALL`) collapses to `1..=N`.
    fn range(&self, kind: SetKind, range: [u32; 3]) -> RangeImage {
        let ids = match kind {
            SetKind::Node => &self.nodes,
            SetKind::Element => &self.elements,
        };
        RangeImage::Ids(
            ids.iter()
                .filter(|(old, _)| in_range(**old, range))
                .map(|(_, new)| *new)
                .collect(),
        )
    }
}

fn dense(ids: impl Iterator<Item = u32>, duplicates: &mut usize) -> HashMap<u32, u32> {
    let mut map = HashMap::new();
    let mut next = 1;
    for id in ids {
        if map.contains_key(&id) {
            *duplicates += 1;
        } else {
            map.insert(id, next);
            next += 1;
        }
    }
    map
}

/// Renumber nodes and elements densely onto `1..=N`.
///
/// New ids follow first definition order. Connectivity, set lists, loads,
/// boundary conditions and equations are rewritten to match; references
/// to ids the deck never defines are dropped and counted. `*NORMAL`
/// cards are removed because they name the old ids. A `GENERATE` set keeps
/// the defined ids inside its ranges: it stays a range when they map onto
/// a contiguous block and becomes an explicit list otherwise.
///
/// # Example
///
/// ```
/// use aero_fea::{Deck, renumber};
///
/// let deck = Deck::parse(
///     "*NODE\n100, 0, 0, 0\n250, 1, 0, 0\n900, 0, 1, 0\n*ELEMENT, TYPE=S3\n42, 900, 100, 250\n",
/// )
/// .unwrap();
/// let (dense, map) = renumber(&deck);
/// assert_eq!(map.node(900), Some(3));
/// let (_, element) = dense.elements().next().unwrap();
/// assert_eq!(element.id, 1);
/// assert_eq!(element.nodes, vec![3, 1, 2]);
/// ```
#[must_use]
pub fn renumber(deck: &Deck) -> (Deck, Renumbering) {
    let mut duplicates = 0;
    let nodes = dense(deck.nodes().map(|n| n.id), &mut duplicates);
    let elements = dense(deck.elements().map(|(_, e)| e.id), &mut duplicates);
    let mut map = Renumbering {
        nodes,
        elements,
        dropped_references: 0,
        duplicate_definitions: duplicates,
    };

    let mut out = deck.clone();
    let normals = |s: &Section| matches!(s, Section::Raw(card) if card.keyword.is("NORMAL"));
    out.sections.retain(|s| !normals(s));
    for section in &mut out.sections {
        if let Section::Step(step) = section {
            step.cards.retain(|s| !normals(s));
        }
    }
    map.dropped_references = remap(&mut out, &map);

    if map.dropped_references > 0 || map.duplicate_definitions > 0 {
        warn!(
            dropped = map.dropped_references,
            duplicates = map.duplicate_definitions,
            "Renumbering dropped references to undefined ids"
        );
    }
    info!(
        nodes = map.nodes.len(),
        elements = map.elements.len(),
        "Renumbered deck"
    );
    (out, map)
}
