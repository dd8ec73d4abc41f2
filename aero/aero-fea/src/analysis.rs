//! Static and buckling analysis decks carrying interpolated pressures.

use std::io::Write;

use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::deck::{BoundaryCondition, Card, Deck, Dload, RawCard, Section, SetEntry, Step};
use crate::error::FeaResult;
use crate::ids::IdOffsets;
use crate::keyword::Keyword;

/// Name of the synthetic set covering every node.
pub const ALL_NODES: &str = "NALL";

/// Upper id of the `NALL` generate range.
pub const ALL_NODES_END: u32 = 10_000_000;

/// Comment text before which boundary conditions are inserted.
const MATERIALS_MARKER: &str = "Materials";

/// `*NSET, NSET=NALL, GENERATE` over `1..=ALL_NODES_END`.
#[must_use]
pub fn all_nodes_set() -> Section {
    Section::Set(Card::new(
        Keyword::new("NSET")
            .with("NSET", ALL_NODES)
            .with_flag("GENERATE"),
        vec![SetEntry::Range([1, ALL_NODES_END, 1])],
    ))
}

/// Analysis procedure of the appended step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnalysisKind {
    /// Linear static response.
    #[default]
    Static,
    /// Linear buckling eigenvalues.
    Buckle,
}

impl AnalysisKind {
    /// File-name tag: `static` or `buckle`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Buckle => "buckle",
        }
    }
}

/// Parameters for [`analysis_deck`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisParams {
    /// Step procedure.
    pub kind: AnalysisKind,
    /// Suffix appended to set, section and material names.
    pub label: Option<String>,
    /// Dynamic pressure `q`; the element pressure is `-q · Cp`.
    pub dynamic_pressure: f64,
    /// Nodes with `y` at or below this are clamped.
    pub boundary_tolerance: f64,
    /// Shifts applied to node and element ids.
    pub offsets: IdOffsets,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self::static_step()
    }
}

impl AnalysisParams {
    /// Linear static step, `q = 1`, tolerance `1e-4`, no label or offsets.
    #[must_use]
    pub fn static_step() -> Self {
        Self {
            kind: AnalysisKind::Static,
            label: None,
            dynamic_pressure: 1.0,
            boundary_tolerance: 1.0e-4,
            offsets: IdOffsets::default(),
        }
    }

    /// As [`static_step`](Self::static_step) with a buckling step.
    #[must_use]
    pub fn buckle_step() -> Self {
        Self {
            kind: AnalysisKind::Buckle,
            ..Self::static_step()
        }
    }

    /// Set the name label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the dynamic pressure.
    #[must_use]
    pub const fn with_dynamic_pressure(mut self, q: f64) -> Self {
        self.dynamic_pressure = q;
        self
    }

    /// Set the clamping tolerance on `y`.
    #[must_use]
    pub const fn with_boundary_tolerance(mut self, tolerance: f64) -> Self {
        self.boundary_tolerance = tolerance;
        self
    }

    /// Set the id offsets.
    #[must_use]
    pub const fn with_offsets(mut self, offsets: IdOffsets) -> Self {
        self.offsets = offsets;
        self
    }
}

fn step_cards(kind: AnalysisKind, loads: Vec<Dload>) -> Vec<Section> {
    let raw = |keyword: Keyword, data: &[&str]| Section::Raw(RawCard::new(keyword, data));
    let mut cards = Vec::new();
    cards.push(match kind {
        AnalysisKind::Static => raw(Keyword::new("STATIC").with_flag("DIRECT"), &[]),
        AnalysisKind::Buckle => raw(Keyword::new("BUCKLE"), &["10,0.01"]),
    });
    cards.push(Section::Dload(Card::new(Keyword::new("DLOAD"), loads)));
    cards.push(raw(Keyword::new("NODE FILE"), &["U"]));
    cards.push(raw(Keyword::new("EL FILE").with("OUTPUT", "3D"), &["S"]));
    match kind {
        AnalysisKind::Static => {
            cards.push(raw(Keyword::new("NODE PRINT").with("NSET", ALL_NODES), &["U,RF"]));
        }
        AnalysisKind::Buckle => {
            cards.push(raw(Keyword::new("EL PRINT").with("FREQUENCY", "0"), &[]));
            cards.push(raw(
                Keyword::new("NODE PRINT")
                    .with("FREQUENCY", "0")
                    .with("NSET", ALL_NODES),
                &["U,RF"],
            ));
        }
    }
    cards
}

/// The model re-emitted with symmetry-plane clamps and one loaded step.
///
/// `pressures` pairs original element ids with their pressure
/// coefficient. The result:
///
/// 1. copies every model section, with ids shifted by `params.offsets`
///    and names relabeled when `params.label` is set; existing steps are
///    dropped
/// 2. inserts `*BOUNDARY` clamping all six degrees of freedom of every
///    node with `y <= boundary_tolerance`, before the `**Materials`
///    comment, else before the first material, else at the end
/// 3. adds the `NALL` set when the model does not define one
/// 4. appends a static or buckling step whose `*DLOAD` gives each element
///    `P1 = -q · Cp`
///
/// # Example
///
/// ```
/// use aero_fea::{AnalysisParams, Deck, analysis_deck};
///
/// let deck = Deck::parse(
///     "*NODE\n1, 0, 0, 0\n2, 1, 0, 0\n3, 0, 1, 0\n*ELEMENT, TYPE=S3, ELSET=ESkin\n5, 1, 2, 3\n",
/// )
/// .unwrap();
/// let params = AnalysisParams::static_step().with_dynamic_pressure(100.0);
/// let text = analysis_deck(&deck, &[(5, 0.25)], &params).to_inp_string();
/// assert!(text.contains("*BOUNDARY\n1, 1, 6\n2, 1, 6\n"));
/// assert!(text.contains("5, P1, -25.0"));
/// ```
#[must_use]
pub fn analysis_deck(deck: &Deck, pressures: &[(u32, f64)], params: &AnalysisParams) -> Deck {
    let mut model = Deck::new(deck.model().cloned().collect());
    if deck.steps().next().is_some() {
        debug!("Dropping existing steps from analysis model");
    }
    model.apply_offsets(params.offsets);
    if let Some(label) = &params.label {
        model.relabel(label);
    }

    let clamped: Vec<BoundaryCondition> = model
        .nodes()
        .filter(|n| n.position.y <= params.boundary_tolerance)
        .map(|n| BoundaryCondition::clamped(n.id))
        .collect();
    let clamped_count = clamped.len();
    let boundary = Section::Boundary(Card::new(Keyword::new("BOUNDARY"), clamped));
    let at = model
        .sections
        .iter()
        .position(|s| matches!(s, Section::Comment(c) if c.trim().eq_ignore_ascii_case(MATERIALS_MARKER)))
        .or_else(|| {
            model
                .sections
                .iter()
                .position(|s| matches!(s, Section::Material(_)))
        })
        .unwrap_or(model.sections.len());
    model.sections.insert(at, boundary);

    if !model.has_set(ALL_NODES) {
        model.sections.push(all_nodes_set());
    }

    let q = params.dynamic_pressure;
    let loads: Vec<Dload> = pressures
        .iter()
        .map(|&(element, cp)| {
            Dload::pressure(element.saturating_add(params.offsets.element), -q * cp)
        })
        .collect();
    let load_count = loads.len();

    model.sections.push(Section::Comment("Analysis".to_string()));
    model.sections.push(Section::Step(Step {
        keyword: Keyword::new("STEP"),
        cards: step_cards(params.kind, loads),
    }));

    info!(
        kind = params.kind.tag(),
        clamped = clamped_count,
        loads = load_count,
        "Built analysis deck"
    );
    model
}

/// Write [`analysis_deck`] to `out`.
///
/// # Errors
///
/// [`FeaError::Io`](crate::FeaError::Io) on stream failure.
pub fn write_analysis_deck<W: Write>(
    out: &mut W,
    deck: &Deck,
    pressures: &[(u32, f64)],
    params: &AnalysisParams,
) -> FeaResult<()> {
    analysis_deck(deck, pressures, params).write_to(out)
}
