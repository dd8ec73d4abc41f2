//! In-place deck edits: cleaning, load scaling, relabeling, node lookup.

use aero_types::Point3;
use hashbrown::HashSet;
use tracing::{info, warn};

use crate::deck::{Deck, IdRef, Section, SetEntry, SetKind};
use crate::keyword::Keyword;

/// Names of sets holding skin nodes contain this, case-insensitively.
const SKIN_MARKER: &str = "skin";

fn labeled(name: &str, label: &str) -> String {
    format!("{name}_{label}")
}

fn relabel_param(keyword: &mut Keyword, key: &str, label: &str) {
    if let Some(name) = keyword.param(key) {
        let name = labeled(name, label);
        keyword.set(key, name);
    }
}

fn relabel_ref(target: &mut IdRef, label: &str) {
    if let IdRef::Set(name) = target {
        *name = labeled(name, label);
    }
}

impl Deck {
    /// Drop elements that list any node twice. Returns their ids.
    ///
    /// # Example
    ///
    /// ```
    /// use aero_fea::Deck;
    ///
    /// let mut deck = Deck::parse("*ELEMENT, TYPE=S3\n1, 1, 2, 3\n2, 4, 4, 5\n").unwrap();
    /// assert_eq!(deck.clean_degenerate_elements(), vec![2]);
    /// assert_eq!(deck.elements().count(), 1);
    /// ```
    pub fn clean_degenerate_elements(&mut self) -> Vec<u32> {
        let mut dropped = Vec::new();
        for section in &mut self.sections {
            if let Section::Elements(card) = section {
                card.entries.retain(|e| {
                    let degenerate = e.is_degenerate();
                    if degenerate {
                        warn!(element = e.id, nodes = ?e.nodes, "Dropping degenerate element");
                        dropped.push(e.id);
                    }
                    !degenerate
                });
            }
        }
        info!(dropped = dropped.len(), "Cleaned degenerate elements");
        dropped
    }

    /// Multiply every `P1` face pressure by `factor`. Returns how many
    /// loads were scaled.
    pub fn scale_pressures(&mut self, factor: f64) -> usize {
        let mut scaled = 0;
        self.for_each_section_mut(&mut |section| {
            if let Section::Dload(card) = section {
                for load in card.entries.iter_mut().filter(|d| d.is_face_pressure()) {
                    load.magnitude *= factor;
                    scaled += 1;
                }
            }
        });
        info!(factor, scaled, "Scaled pressure loads");
        scaled
    }

    /// Append `_<label>` to every set, section and material name, and to
    /// every reference to one.
    ///
    /// Output requests inside steps are left alone so they keep naming
    /// the shared `NALL` set.
    pub fn relabel(&mut self, label: &str) {
        self.for_each_section_mut(&mut |section| match section {
            Section::Nodes(card) => relabel_param(&mut card.keyword, "NSET", label),
            Section::Elements(card) => relabel_param(&mut card.keyword, "ELSET", label),
            Section::Set(card) => {
                let key = card.kind().keyword();
                relabel_param(&mut card.keyword, key, label);
                for entry in &mut card.entries {
                    if let SetEntry::Set(name) = entry {
                        *name = labeled(name, label);
                    }
                }
            }
            Section::ShellSection(shell) => {
                relabel_param(&mut shell.keyword, "ELSET", label);
                relabel_param(&mut shell.keyword, "MATERIAL", label);
            }
            Section::Material(material) => relabel_param(&mut material.keyword, "NAME", label),
            Section::Dload(card) => {
                for d in &mut card.entries {
                    relabel_ref(&mut d.target, label);
                }
            }
            Section::Cload(card) => {
                for c in &mut card.entries {
                    relabel_ref(&mut c.target, label);
                }
            }
            Section::Boundary(card) => {
                for b in &mut card.entries {
                    relabel_ref(&mut b.target, label);
                }
            }
            Section::Comment(_) | Section::Equation(_) | Section::Step(_) | Section::Raw(_) => {}
        });
    }

    /// The closest node that belongs to a node set whose name does not
    /// mark it as skin.
    ///
    /// Used to attach point loads to internal structure rather than to
    /// the wetted surface. Returns `None` when no such node exists.
    #[must_use]
    pub fn nearest_node(&self, point: &Point3<f64>) -> Option<u32> {
        let not_skin = |name: &str| !name.to_ascii_lowercase().contains(SKIN_MARKER);
        let mut eligible: HashSet<u32> = HashSet::new();
        for section in &self.sections {
            match section {
                Section::Nodes(card) if card.nset().is_some_and(not_skin) => {
                    eligible.extend(card.entries.iter().map(|n| n.id));
                }
                Section::Set(card) if card.kind() == SetKind::Node => {
                    if let Some(name) = card.name().filter(|n| not_skin(n)) {
                        eligible.extend(self.set_members(SetKind::Node, name));
                    }
                }
                _ => {}
            }
        }

        self.nodes()
            .filter(|n| eligible.contains(&n.id))
            .map(|n| (n.id, (n.position - point).norm_squared()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DECK: &str = "\
*NODE, NSET=NSkin
1, 0, 0, 0
2, 1, 0, 0
3, 0, 1, 0
*NODE, NSET=NSpar
4, 0.4, 0.4, 0.1
5, 5.0, 5.0, 0.0
*ELEMENT, TYPE=S3, ELSET=ESkin
1, 1, 2, 3
2, 1, 1, 2
*ELSET, ELSET=All
ESkin,
*SHELL SECTION, ELSET=ESkin, MATERIAL=Al
0.01
*MATERIAL, NAME=Al
*ELASTIC
7.0e10, 0.33
*STEP
*STATIC
*DLOAD
1, P1, 2.0
ESkin, P1, 1.0
1, GRAV, 9.81, 0.0, 0.0, -1.0
*BOUNDARY
NSpar, 1, 6
*NODE PRINT, NSET=NALL
U
*END STEP
";

    #[test]
    fn clean_reports_dropped_ids() {
        let mut deck = Deck::parse(DECK).unwrap();
        assert_eq!(deck.clean_degenerate_elements(), vec![2]);
        assert!(deck.elements().all(|(_, e)| e.id == 1));
    }

    #[test]
    fn scale_touches_only_face_pressures() {
        let mut deck = Deck::parse(DECK).unwrap();
        assert_eq!(deck.scale_pressures(-2.0), 2);
        let step = deck.steps().next().unwrap();
        let Section::Dload(card) = &step.cards[1] else {
            panic!("expected *DLOAD");
        };
        assert_relative_eq!(card.entries[0].magnitude, -4.0);
        assert_relative_eq!(card.entries[1].magnitude, -2.0);
        assert_relative_eq!(card.entries[2].magnitude, 9.81);
    }

    #[test]
    fn nearest_node_skips_skin() {
        let deck = Deck::parse(DECK).unwrap();
        assert_eq!(deck.nearest_node(&Point3::new(0.0, 0.0, 0.0)), Some(4));
        assert_eq!(deck.nearest_node(&Point3::new(4.0, 6.0, 0.0)), Some(5));
        assert_eq!(Deck::default().nearest_node(&Point3::origin()), None);
    }

    #[test]
    fn relabel_renames_names_and_references() {
        let mut deck = Deck::parse(DECK).unwrap();
        deck.relabel("wing");
        let text = deck.to_inp_string();
        assert!(text.contains("*NODE, NSET=NSkin_wing"));
        assert!(text.contains("*ELEMENT, TYPE=S3, ELSET=ESkin_wing"));
        assert!(text.contains("*ELSET, ELSET=All_wing\nESkin_wing,"));
        assert!(text.contains("*SHELL SECTION, ELSET=ESkin_wing, MATERIAL=Al_wing"));
        assert!(text.contains("*MATERIAL, NAME=Al_wing"));
        assert!(text.contains("ESkin_wing, P1, 1.0"));
        assert!(text.contains("NSpar_wing, 1, 6"));
        assert!(text.contains("*NODE PRINT, NSET=NALL"));
    }
}
