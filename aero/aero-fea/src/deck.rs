//! Typed model of a keyword-sectioned structural deck.

use std::fmt;

use aero_types::Point3;
use hashbrown::{HashMap, HashSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::keyword::Keyword;

/// A structural node.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeaNode {
    /// Node id as written in the deck.
    pub id: u32,
    /// Position.
    pub position: Point3<f64>,
}

impl FeaNode {
    /// Create a node.
    #[must_use]
    pub const fn new(id: u32, position: Point3<f64>) -> Self {
        Self { id, position }
    }
}

/// A structural element: id plus connectivity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeaElement {
    /// Element id as written in the deck.
    pub id: u32,
    /// Node ids in element order; corners first.
    pub nodes: Vec<u32>,
}

impl FeaElement {
    /// Create an element.
    #[must_use]
    pub const fn new(id: u32, nodes: Vec<u32>) -> Self {
        Self { id, nodes }
    }

    /// Whether any node appears twice.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        !self.nodes.iter().all(|n| seen.insert(*n))
    }
}

/// Reference to a single id or to a named set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IdRef {
    /// A node or element id.
    Id(u32),
    /// A set name.
    Set(String),
}

impl IdRef {
    pub(crate) fn parse(token: &str) -> Self {
        token
            .parse()
            .map_or_else(|_| Self::Set(token.to_string()), Self::Id)
    }
}

impl fmt::Display for IdRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Set(name) => f.write_str(name),
        }
    }
}

/// Whether a set holds nodes or elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SetKind {
    /// `*NSET`.
    Node,
    /// `*ELSET`.
    Element,
}

impl SetKind {
    /// Keyword name, which is also the name of its set parameter.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Node => "NSET",
            Self::Element => "ELSET",
        }
    }
}

/// One entry of a set card.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SetEntry {
    /// A single id.
    Id(u32),
    /// Another set, included by name.
    Set(String),
    /// `start, end, step` of a `GENERATE` set.
    Range([u32; 3]),
}

/// `*DLOAD` entry: `target, label, magnitude[, extra...]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dload {
    /// Loaded element or element set.
    pub target: IdRef,
    /// Load label, e.g. `P1`.
    pub label: String,
    /// Magnitude.
    pub magnitude: f64,
    /// Trailing values such as a gravity direction.
    pub extra: Vec<f64>,
}

impl Dload {
    /// A face pressure on one element.
    #[must_use]
    pub fn pressure(element: u32, magnitude: f64) -> Self {
        Self {
            target: IdRef::Id(element),
            label: "P1".to_string(),
            magnitude,
            extra: Vec::new(),
        }
    }

    /// Whether this is a `P1` face pressure.
    #[must_use]
    pub fn is_face_pressure(&self) -> bool {
        self.label.eq_ignore_ascii_case("P1")
    }
}

/// `*CLOAD` entry: `target, dof, value`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cload {
    /// Loaded node or node set.
    pub target: IdRef,
    /// Degree of freedom.
    pub dof: u32,
    /// Value.
    pub value: f64,
}

/// `*BOUNDARY` entry: `target, first[, last[, value]]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundaryCondition {
    /// Constrained node or node set.
    pub target: IdRef,
    /// First constrained degree of freedom.
    pub first: u32,
    /// Last constrained degree of freedom.
    pub last: Option<u32>,
    /// Prescribed value, zero when absent.
    pub value: Option<f64>,
}

impl BoundaryCondition {
    /// Clamp all six degrees of freedom of one node.
    #[must_use]
    pub const fn clamped(node: u32) -> Self {
        Self {
            target: IdRef::Id(node),
            first: 1,
            last: Some(6),
            value: None,
        }
    }
}

/// One `node, dof, coefficient` term of a multi-point constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EquationTerm {
    /// Node id.
    pub node: u32,
    /// Degree of freedom.
    pub dof: u32,
    /// Coefficient.
    pub coefficient: f64,
}

/// A linear multi-point constraint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Equation {
    /// Terms; their weighted sum is zero.
    pub terms: Vec<EquationTerm>,
}

/// A keyword line followed by typed data entries.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Card<T> {
    /// The keyword line.
    pub keyword: Keyword,
    /// Parsed data lines.
    pub entries: Vec<T>,
}

impl<T> Card<T> {
    /// Create a card.
    #[must_use]
    pub const fn new(keyword: Keyword, entries: Vec<T>) -> Self {
        Self { keyword, entries }
    }
}

impl Card<FeaNode> {
    /// The `NSET` this block defines, if any.
    #[must_use]
    pub fn nset(&self) -> Option<&str> {
        self.keyword.param("NSET")
    }
}

impl Card<FeaElement> {
    /// Element type, e.g. `S6`.
    #[must_use]
    pub fn element_type(&self) -> Option<&str> {
        self.keyword.param("TYPE")
    }

    /// The `ELSET` this block defines, if any.
    #[must_use]
    pub fn elset(&self) -> Option<&str> {
        self.keyword.param("ELSET")
    }
}

impl Card<SetEntry> {
    /// Node or element set.
    #[must_use]
    pub fn kind(&self) -> SetKind {
        if self.keyword.is("NSET") {
            SetKind::Node
        } else {
            SetKind::Element
        }
    }

    /// Set name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.keyword.param(self.kind().keyword())
    }

    /// Whether entries are `GENERATE` ranges.
    #[must_use]
    pub fn is_generate(&self) -> bool {
        self.keyword.has("GENERATE")
    }
}

/// `*SHELL SECTION` plus its thickness line.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShellSection {
    /// The keyword line.
    pub keyword: Keyword,
    /// Shell thickness.
    pub thickness: f64,
}

impl ShellSection {
    /// Build `*SHELL SECTION, ELSET=…, MATERIAL=…[, OFFSET=…]`.
    #[must_use]
    pub fn new(elset: &str, material: &str, offset: Option<f64>, thickness: f64) -> Self {
        let mut keyword = Keyword::new("SHELL SECTION")
            .with("ELSET", elset)
            .with("MATERIAL", material);
        if let Some(offset) = offset {
            keyword.set("OFFSET", format!("{offset}"));
        }
        Self { keyword, thickness }
    }

    /// Element set the section applies to.
    #[must_use]
    pub fn elset(&self) -> Option<&str> {
        self.keyword.param("ELSET")
    }

    /// Material name.
    #[must_use]
    pub fn material(&self) -> Option<&str> {
        self.keyword.param("MATERIAL")
    }

    /// Offset of the reference surface, if given.
    #[must_use]
    pub fn offset(&self) -> Option<f64> {
        self.keyword.param("OFFSET").and_then(|v| v.parse().ok())
    }
}

/// A card kept verbatim: keyword plus trimmed data lines.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawCard {
    /// The keyword line.
    pub keyword: Keyword,
    /// Data lines as written.
    pub data: Vec<String>,
}

impl RawCard {
    /// Create a raw card.
    #[must_use]
    pub fn new(keyword: Keyword, data: &[&str]) -> Self {
        Self {
            keyword,
            data: data.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// `*MATERIAL, NAME=…` with its property cards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Material {
    /// The keyword line.
    pub keyword: Keyword,
    /// Property cards such as `*ELASTIC` and `*DENSITY`.
    pub properties: Vec<RawCard>,
}

impl Material {
    /// Material name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.keyword.param("NAME")
    }
}

/// A `*STEP` … `*END STEP` block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Step {
    /// The `*STEP` line.
    pub keyword: Keyword,
    /// Cards inside the step.
    pub cards: Vec<Section>,
}

impl Step {
    /// An empty `*STEP`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keyword: Keyword::new("STEP"),
            cards: Vec::new(),
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::new()
    }
}

/// One section of a deck.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Section {
    /// `**` comment, text after the two stars.
    Comment(String),
    /// `*NODE`.
    Nodes(Card<FeaNode>),
    /// `*ELEMENT`.
    Elements(Card<FeaElement>),
    /// `*NSET` or `*ELSET`.
    Set(Card<SetEntry>),
    /// `*SHELL SECTION`.
    ShellSection(ShellSection),
    /// `*MATERIAL` and its properties.
    Material(Material),
    /// `*DLOAD`.
    Dload(Card<Dload>),
    /// `*CLOAD`.
    Cload(Card<Cload>),
    /// `*BOUNDARY`.
    Boundary(Card<BoundaryCondition>),
    /// `*EQUATION`.
    Equation(Card<Equation>),
    /// `*STEP` … `*END STEP`.
    Step(Step),
    /// Any other card.
    Raw(RawCard),
}

/// A structural deck: sections in file order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Deck {
    /// Sections in file order.
    pub sections: Vec<Section>,
}

impl Deck {
    /// Wrap sections.
    #[must_use]
    pub const fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Every node defined by a `*NODE` card.
    pub fn nodes(&self) -> impl Iterator<Item = &FeaNode> {
        self.sections.iter().flat_map(|s| match s {
            Section::Nodes(card) => card.entries.as_slice(),
            _ => &[],
        })
    }

    /// Every element with the card that defines it.
    pub fn elements(&self) -> impl Iterator<Item = (&Card<FeaElement>, &FeaElement)> {
        self.sections
            .iter()
            .filter_map(|s| match s {
                Section::Elements(card) => Some(card),
                _ => None,
            })
            .flat_map(|card| card.entries.iter().map(move |e| (card, e)))
    }

    /// Node id to position.
    #[must_use]
    pub fn node_positions(&self) -> HashMap<u32, Point3<f64>> {
        self.nodes().map(|n| (n.id, n.position)).collect()
    }

    /// Largest node id, 0 for a deck without nodes.
    #[must_use]
    pub fn max_node_id(&self) -> u32 {
        self.nodes().map(|n| n.id).max().unwrap_or(0)
    }

    /// Largest element id, 0 for a deck without elements.
    #[must_use]
    pub fn max_element_id(&self) -> u32 {
        self.elements().map(|(_, e)| e.id).max().unwrap_or(0)
    }

    /// Sections outside any step.
    pub fn model(&self) -> impl Iterator<Item = &Section> {
        self.sections
            .iter()
            .filter(|s| !matches!(s, Section::Step(_)))
    }

    /// Steps in order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.sections.iter().filter_map(|s| match s {
            Section::Step(step) => Some(step),
            _ => None,
        })
    }

    /// Whether a set of either kind, or an element or node block, carries
    /// `name`.
    #[must_use]
    pub fn has_set(&self, name: &str) -> bool {
        self.sections.iter().any(|s| {
            let defined = match s {
                Section::Nodes(card) => card.nset(),
                Section::Elements(card) => card.elset(),
                Section::Set(card) => card.name(),
                _ => None,
            };
            defined.is_some_and(|d| d.eq_ignore_ascii_case(name))
        })
    }

    /// Ids in the named set, in deck order, without duplicates.
    ///
    /// Includes blocks that define the set through their `NSET`/`ELSET`
    /// parameter, explicit set cards, `GENERATE` ranges, and nested sets.
    #[must_use]
    pub fn set_members(&self, kind: SetKind, name: &str) -> Vec<u32> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut visited = HashSet::new();
        self.collect_set(kind, name, &mut out, &mut seen, &mut visited);
        out
    }

    fn collect_set(
        &self,
        kind: SetKind,
        name: &str,
        out: &mut Vec<u32>,
        seen: &mut HashSet<u32>,
        visited: &mut HashSet<String>,
    ) {
        if !visited.insert(name.to_ascii_uppercase()) {
            return;
        }
        let matches = |n: Option<&str>| n.is_some_and(|n| n.eq_ignore_ascii_case(name));
        for section in &self.sections {
            match section {
                Section::Nodes(card) if kind == SetKind::Node && matches(card.nset()) => {
                    for node in &card.entries {
                        push_unique(node.id, out, seen);
                    }
                }
                Section::Elements(card) if kind == SetKind::Element && matches(card.elset()) => {
                    for element in &card.entries {
                        push_unique(element.id, out, seen);
                    }
                }
                Section::Set(card) if card.kind() == kind && matches(card.name()) => {
                    for entry in &card.entries {
                        match entry {
                            SetEntry::Id(id) => push_unique(*id, out, seen),
                            SetEntry::Range([start, end, step]) => {
                                for id in (*start..=*end).step_by((*step).max(1) as usize) {
                                    push_unique(id, out, seen);
                                }
                            }
                            SetEntry::Set(inner) => {
                                self.collect_set(kind, inner, out, seen, visited);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Apply `f` to every section, including the cards inside steps.
    pub(crate) fn for_each_section_mut(&mut self, f: &mut impl FnMut(&mut Section)) {
        for section in &mut self.sections {
            if let Section::Step(step) = section {
                for card in &mut step.cards {
                    f(card);
                }
            }
            f(section);
        }
    }

    /// Visit every section, including the cards inside steps.
    pub(crate) fn for_each_section(&self, f: &mut impl FnMut(&Section)) {
        for section in &self.sections {
            if let Section::Step(step) = section {
                for card in &step.cards {
                    f(card);
                }
            }
            f(section);
        }
    }
}

fn push_unique(id: u32, out: &mut Vec<u32>, seen: &mut HashSet<u32>) {
    if seen.insert(id) {
        out.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> Deck {
        Deck::new(vec![
            Section::Nodes(Card::new(
                Keyword::new("NODE").with("NSET", "NALL"),
                vec![
                    FeaNode::new(10, Point3::new(0.0, 0.0, 0.0)),
                    FeaNode::new(20, Point3::new(1.0, 0.0, 0.0)),
                    FeaNode::new(30, Point3::new(0.0, 1.0, 0.0)),
                ],
            )),
            Section::Elements(Card::new(
                Keyword::new("ELEMENT").with("TYPE", "S3").with("ELSET", "ESkin"),
                vec![FeaElement::new(7, vec![10, 20, 30])],
            )),
            Section::Set(Card::new(
                Keyword::new("ELSET").with("ELSET", "Both"),
                vec![SetEntry::Set("ESKIN".into()), SetEntry::Id(9)],
            )),
            Section::Set(Card::new(
                Keyword::new("NSET").with("NSET", "Gen").with_flag("GENERATE"),
                vec![SetEntry::Range([1, 9, 4])],
            )),
        ])
    }

    #[test]
    fn maxima() {
        let deck = deck();
        assert_eq!(deck.max_node_id(), 30);
        assert_eq!(deck.max_element_id(), 7);
        assert_eq!(Deck::default().max_node_id(), 0);
    }

    #[test]
    fn nested_and_generated_sets() {
        let deck = deck();
        assert_eq!(deck.set_members(SetKind::Element, "both"), vec![7, 9]);
        assert_eq!(deck.set_members(SetKind::Node, "GEN"), vec![1, 5, 9]);
        assert_eq!(deck.set_members(SetKind::Node, "NALL"), vec![10, 20, 30]);
        assert!(deck.set_members(SetKind::Element, "absent").is_empty());
        assert!(deck.has_set("eskin"));
    }

    #[test]
    fn degenerate_element() {
        assert!(FeaElement::new(1, vec![1, 2, 1]).is_degenerate());
        assert!(!FeaElement::new(1, vec![1, 2, 3]).is_degenerate());
    }
}
