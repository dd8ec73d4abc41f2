//! One thickness-sizing pass: stresses in, grouped shell sections out.

use hashbrown::{HashMap, HashSet};
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::deck::{Card, Deck, FeaElement, Section, SetEntry, SetKind, ShellSection};
use crate::error::{FeaError, FeaResult};
use crate::frd::{FrdElement, FrdResults};
use crate::keyword::Keyword;
use crate::sizing::{Binning, SizingParams, size_thickness, smooth_thickness};

/// Shell offset written on every resized section.
const RESIZED_OFFSET: f64 = -0.5;

/// Element type used when the sized set has no typed element card.
const DEFAULT_SHELL_TYPE: &str = "S6";

/// Thickness assigned to one element.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SizedElement {
    /// Element id.
    pub id: u32,
    /// Thickness.
    pub thickness: f64,
}

/// Summary of a sizing pass.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SizingReport {
    /// `Σ area · t` before sizing.
    pub old_volume: f64,
    /// `Σ area · t` after smoothing.
    pub new_volume: f64,
    /// `Σ area`.
    pub wetted_area: f64,
    /// Thinnest smoothed element.
    pub min_thickness: f64,
    /// Thickest smoothed element.
    pub max_thickness: f64,
    /// Elements per thickness group.
    pub group_counts: Vec<usize>,
    /// Set members without usable results; they keep the section thickness.
    pub skipped: Vec<u32>,
}

/// Output of [`optimize`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Optimization {
    /// Stress-sized thickness per element.
    pub sized: Vec<SizedElement>,
    /// Thickness after smoothing.
    pub smoothed: Vec<SizedElement>,
    /// The deck with the set split into thickness groups.
    pub deck: Deck,
    /// Totals.
    pub report: SizingReport,
}

/// `.sized` text: `"<id> <t>"` per line.
#[must_use]
pub fn format_sized(sized: &[SizedElement]) -> String {
    sized
        .iter()
        .map(|e| format!("{} {:.6}\n", e.id, e.thickness))
        .collect()
}

struct Measured {
    id: u32,
    corners: [u32; 3],
    area: f64,
    thickness: f64,
    stress: f64,
}

fn measure(results: &FrdResults, frd: Option<&&FrdElement>, element: &FeaElement) -> Option<Measured> {
    let frd = *frd?;
    let geometry = results.element_geometry(frd)?;
    let stress = results.element_stress(frd)?;
    let [a, b, c, ..] = element.nodes[..] else {
        return None;
    };
    Some(Measured {
        id: element.id,
        corners: [a, b, c],
        area: geometry.area,
        thickness: geometry.thickness,
        stress,
    })
}

/// Size, smooth and group the shell thickness of `elset`.
///
/// Each element of the set is matched by id to the results mesh. Its
/// current thickness and area come from the expanded solid and its stress
/// is the mean corner magnitude. The sized thickness is smoothed over
/// shared corner nodes and binned into [`SizingParams::groups`] levels.
///
/// The returned deck replaces the set's elements with one
/// `*ELEMENT, ELSET=<elset>.<g>` card per non-empty group followed by an
/// `*ELSET, ELSET=<elset>` listing every member, and replaces the set's
/// `*SHELL SECTION` with one section per group at `min + g · dT`.
///
/// # Errors
///
/// [`FeaError::MalformedDeck`] when the set has no elements or no
/// `*SHELL SECTION`.
pub fn optimize(
    deck: &Deck,
    results: &FrdResults,
    params: &SizingParams,
    elset: &str,
) -> FeaResult<Optimization> {
    let members: HashSet<u32> = deck
        .set_members(SetKind::Element, elset)
        .into_iter()
        .collect();
    if members.is_empty() {
        return Err(FeaError::malformed(
            "*ELSET",
            0,
            format!("no elements in set {elset}"),
        ));
    }
    let section = deck
        .model()
        .find_map(|s| match s {
            Section::ShellSection(sec) if sec.elset().is_some_and(|e| e.eq_ignore_ascii_case(elset)) => {
                Some(sec)
            }
            _ => None,
        })
        .ok_or_else(|| {
            FeaError::malformed("*SHELL SECTION", 0, format!("no section for set {elset}"))
        })?;
    let material = section.material().unwrap_or_default().to_string();

    let frd: HashMap<u32, &FrdElement> = results.elements.iter().map(|e| (e.id, e)).collect();
    let mut measured = Vec::new();
    let mut skipped = Vec::new();
    let mut element_type = None;
    for (card, element) in deck.elements().filter(|(_, e)| members.contains(&e.id)) {
        element_type = element_type.or_else(|| card.element_type().map(str::to_string));
        match measure(results, frd.get(&element.id), element) {
            Some(m) => measured.push(m),
            None => skipped.push(element.id),
        }
    }
    if !skipped.is_empty() {
        warn!(elset, skipped = skipped.len(), "Elements without results keep the section thickness");
    }

    let sized: Vec<SizedElement> = measured
        .iter()
        .map(|m| SizedElement {
            id: m.id,
            thickness: size_thickness(m.thickness, m.stress, params),
        })
        .collect();
    let corners: Vec<[u32; 3]> = measured.iter().map(|m| m.corners).collect();
    let areas: Vec<f64> = measured.iter().map(|m| m.area).collect();
    let thickness: Vec<f64> = sized.iter().map(|s| s.thickness).collect();
    let smoothed: Vec<SizedElement> =
        smooth_thickness(&thickness, &corners, &areas, params.smoothing_iterations)
            .into_iter()
            .zip(&sized)
            .map(|(t, s)| SizedElement {
                id: s.id,
                thickness: t,
            })
            .collect();

    let binning = Binning::new(params.min_thickness, params.max_thickness, params.groups);
    let mut group_of: HashMap<u32, usize> = smoothed
        .iter()
        .map(|s| (s.id, binning.group_of(s.thickness)))
        .collect();
    let fallback = binning.group_of(params.bound(section.thickness));
    for id in &skipped {
        group_of.insert(*id, fallback);
    }

    let mut report = SizingReport {
        old_volume: measured.iter().map(|m| m.area * m.thickness).sum(),
        new_volume: measured
            .iter()
            .zip(&smoothed)
            .map(|(m, s)| m.area * s.thickness)
            .sum(),
        wetted_area: areas.iter().sum(),
        min_thickness: smoothed.iter().map(|s| s.thickness).fold(f64::INFINITY, f64::min),
        max_thickness: smoothed.iter().map(|s| s.thickness).fold(0.0, f64::max),
        group_counts: vec![0; binning.groups],
        skipped,
    };
    if smoothed.is_empty() {
        report.min_thickness = 0.0;
    }
    for g in group_of.values() {
        report.group_counts[*g] += 1;
    }

    let element_type = element_type.unwrap_or_else(|| DEFAULT_SHELL_TYPE.to_string());
    let resized = regroup(deck, elset, &group_of, &binning, &element_type, &material);

    info!(
        elset,
        sized = sized.len(),
        old_volume = report.old_volume,
        new_volume = report.new_volume,
        "Sized shell thickness"
    );
    Ok(Optimization {
        sized,
        smoothed,
        deck: resized,
        report,
    })
}

/// Rebuild the model with `elset` split into thickness groups.
fn regroup(
    deck: &Deck,
    elset: &str,
    group_of: &HashMap<u32, usize>,
    binning: &Binning,
    element_type: &str,
    material: &str,
) -> Deck {
    let mut grouped: Vec<Vec<FeaElement>> = vec![Vec::new(); binning.groups];
    let mut order = Vec::new();
    let mut placed = HashSet::new();
    for (_, element) in deck.elements() {
        if let Some(&g) = group_of.get(&element.id) {
            if placed.insert(element.id) {
                order.push(element.id);
                grouped[g].push(element.clone());
            }
        }
    }

    let mut element_cards = Vec::new();
    for (g, elements) in grouped.into_iter().enumerate().filter(|(_, e)| !e.is_empty()) {
        element_cards.push(Section::Elements(Card::new(
            Keyword::new("ELEMENT")
                .with("TYPE", element_type)
                .with("ELSET", format!("{elset}.{g}")),
            elements,
        )));
    }
    element_cards.push(Section::Set(Card::new(
        Keyword::new("ELSET").with("ELSET", elset),
        order.iter().copied().map(SetEntry::Id).collect(),
    )));
    let shell_cards: Vec<Section> = (0..binning.groups)
        .filter(|g| group_of.values().any(|v| v == g))
        .map(|g| {
            Section::ShellSection(ShellSection::new(
                &format!("{elset}.{g}"),
                material,
                Some(RESIZED_OFFSET),
                binning.thickness(g),
            ))
        })
        .collect();

    let mut element_cards = Some(element_cards);
    let mut shell_cards = Some(shell_cards);
    let mut sections = Vec::with_capacity(deck.sections.len());
    for section in &deck.sections {
        match section {
            Section::Elements(card) => {
                let kept: Vec<FeaElement> = card
                    .entries
                    .iter()
                    .filter(|e| !group_of.contains_key(&e.id))
                    .cloned()
                    .collect();
                let touched = kept.len() < card.entries.len();
                if !kept.is_empty() {
                    sections.push(Section::Elements(Card::new(card.keyword.clone(), kept)));
                }
                if touched {
                    sections.extend(element_cards.take().into_iter().flatten());
                }
            }
            Section::Set(card)
                if card.kind() == SetKind::Element
                    && card.name().is_some_and(|n| n.eq_ignore_ascii_case(elset)) =>
            {
                debug!(elset, "Replacing element set definition");
            }
            Section::ShellSection(sec)
                if sec.elset().is_some_and(|e| e.eq_ignore_ascii_case(elset)) =>
            {
                sections.extend(shell_cards.take().into_iter().flatten());
            }
            other => sections.push(other.clone()),
        }
    }
    sections.extend(element_cards.into_iter().flatten());
    sections.extend(shell_cards.into_iter().flatten());
    Deck::new(sections)
}
