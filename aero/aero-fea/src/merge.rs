//! Combining two decks into one analysis.

use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::analysis::{ALL_NODES, all_nodes_set};
use crate::deck::{Card, Deck, Section, Step};
use crate::ids::IdOffsets;

/// Parameters for [`merge_decks`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MergeParams {
    /// Optional name labels for the first and second deck.
    pub labels: [Option<String>; 2],
    /// Source names quoted in the section comments.
    pub sources: [String; 2],
    /// Id shifts applied to the second deck.
    pub second_offsets: IdOffsets,
}

impl MergeParams {
    /// Set both labels.
    #[must_use]
    pub fn with_labels(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.labels = [Some(first.into()), Some(second.into())];
        self
    }

    /// Set the source names used in comments.
    #[must_use]
    pub fn with_sources(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.sources = [first.into(), second.into()];
        self
    }

    /// Shift the second deck's ids, e.g. by [`IdOffsets::recommended`] of
    /// the first.
    #[must_use]
    pub const fn with_second_offsets(mut self, offsets: IdOffsets) -> Self {
        self.second_offsets = offsets;
        self
    }
}

fn is_all_nodes(section: &Section) -> bool {
    matches!(section, Section::Set(card) if card.name().is_some_and(|n| n.eq_ignore_ascii_case(ALL_NODES)))
}

fn prepare(deck: &Deck, label: Option<&str>, offsets: IdOffsets) -> Deck {
    let mut out = deck.clone();
    out.sections.retain(|s| !is_all_nodes(s));
    out.apply_offsets(offsets);
    if let Some(label) = label {
        out.relabel(label);
    }
    out
}

fn union<T: Clone + PartialEq>(into: &mut Card<T>, from: &Card<T>) {
    for entry in &from.entries {
        if !into.entries.contains(entry) {
            into.entries.push(entry.clone());
        }
    }
}

/// Fold the load cards of `from` into the matching cards of `into`.
fn union_loads(into: &mut Step, from: &Step) {
    for card in &from.cards {
        let target = into.cards.iter_mut().find_map(|c| match (c, card) {
            (Section::Dload(a), Section::Dload(b)) => {
                union(a, b);
                Some(())
            }
            (Section::Cload(a), Section::Cload(b)) => {
                union(a, b);
                Some(())
            }
            (Section::Boundary(a), Section::Boundary(b)) => {
                union(a, b);
                Some(())
            }
            _ => None,
        });
        let is_load = matches!(
            card,
            Section::Dload(_) | Section::Cload(_) | Section::Boundary(_)
        );
        if target.is_none() && is_load {
            into.cards.push(card.clone());
        }
    }
}

/// Merge two decks into one model with a single step.
///
/// The result holds the first deck's model sections, then the second's,
/// each after a comment naming its source; then an `NALL` set covering
/// every node; then the first deck's first step with the second deck's
/// `*DLOAD`, `*CLOAD` and `*BOUNDARY` entries unioned into the matching
/// cards. When only the second deck has a step, that step is used.
///
/// Ids are not checked for collisions; shift the second deck with
/// [`MergeParams::second_offsets`] or renumber the result.
///
/// # Example
///
/// ```
/// use aero_fea::{Deck, MergeParams, merge_decks};
///
/// let wing = Deck::parse("*NODE\n1, 0, 0, 0\n*STEP\n*STATIC\n*CLOAD\n1, 3, 5.0\n*END STEP\n").unwrap();
/// let tail = Deck::parse("*NODE\n2, 9, 0, 0\n*STEP\n*STATIC\n*CLOAD\n2, 3, 1.0\n*END STEP\n").unwrap();
/// let merged = merge_decks(&wing, &tail, &MergeParams::default());
/// assert_eq!(merged.nodes().count(), 2);
/// let text = merged.to_inp_string();
/// assert!(text.contains("*CLOAD\n1, 3, 5.0\n2, 3, 1.0\n"));
/// ```
#[must_use]
pub fn merge_decks(first: &Deck, second: &Deck, params: &MergeParams) -> Deck {
    let a = prepare(first, params.labels[0].as_deref(), IdOffsets::default());
    let b = prepare(second, params.labels[1].as_deref(), params.second_offsets);

    let mut sections = Vec::new();
    for (deck, source) in [(&a, &params.sources[0]), (&b, &params.sources[1])] {
        sections.push(Section::Comment(format!(
            "Element, Node, Shell, and Material Data from File: {source}"
        )));
        sections.extend(deck.model().cloned());
    }
    sections.push(all_nodes_set());

    let mut a_steps = a.steps();
    let mut b_steps = b.steps();
    let merged = match (a_steps.next(), b_steps.next()) {
        (Some(sa), Some(sb)) => {
            let mut step = sa.clone();
            union_loads(&mut step, sb);
            Some(step)
        }
        (Some(s), None) | (None, Some(s)) => Some(s.clone()),
        (None, None) => None,
    };
    if let Some(step) = merged {
        sections.push(Section::Comment(format!(
            "LOAD Data from Files: {}, {}",
            params.sources[0], params.sources[1]
        )));
        sections.push(Section::Step(step));
    }
    let extra = a_steps.count() + b_steps.count();
    if extra > 0 {
        debug!(extra, "Only the first step of each deck is merged");
    }

    let out = Deck::new(sections);
    info!(
        nodes = out.nodes().count(),
        elements = out.elements().count(),
        "Merged structural decks"
    );
    out
}
