//! Deck text to [`Deck`].

use std::path::Path;

use aero_types::Point3;
use tracing::{debug, info, warn};

use crate::deck::{
    BoundaryCondition, Card, Cload, Deck, Dload, Equation, EquationTerm, FeaElement, FeaNode,
    IdRef, Material, RawCard, Section, SetEntry, ShellSection, Step,
};
use crate::error::{FeaError, FeaResult};
use crate::keyword::Keyword;

/// Cards that belong to the preceding `*MATERIAL`.
const MATERIAL_PROPERTIES: &[&str] = &[
    "ELASTIC",
    "DENSITY",
    "EXPANSION",
    "PLASTIC",
    "CONDUCTIVITY",
    "SPECIFIC HEAT",
    "DAMPING",
    "HYPERELASTIC",
    "CREEP",
    "DEFORMATION PLASTICITY",
    "USER MATERIAL",
    "DEPVAR",
];

/// A data line with its 1-based line number.
type DataLine<'a> = (usize, &'a str);

struct Lines<'a> {
    inner: std::iter::Peekable<std::iter::Enumerate<std::str::Lines<'a>>>,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.lines().enumerate().peekable(),
        }
    }

    fn next_line(&mut self) -> Option<DataLine<'a>> {
        self.inner.next().map(|(i, l)| (i + 1, l))
    }

    /// Data lines up to the next card, a blank line, or a line shorter
    /// than two characters.
    fn data_block(&mut self) -> Vec<DataLine<'a>> {
        let mut block = Vec::new();
        while let Some(&(i, line)) = self.inner.peek() {
            let content = line.trim_end();
            if content.trim_start().starts_with('*') {
                break;
            }
            self.inner.next();
            let visible = content.trim();
            if visible.is_empty() {
                break;
            }
            // A lone digit is still data, e.g. an equation term count.
            if content.len() < 2 && !visible.bytes().all(|b| b.is_ascii_digit()) {
                warn!(line = i + 1, text = content, "Short line ends data block");
                break;
            }
            block.push((i + 1, visible));
        }
        block
    }
}

fn fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(str::trim).filter(|f| !f.is_empty())
}

fn number<T: std::str::FromStr>(
    keyword: &Keyword,
    line: usize,
    field: Option<&str>,
    what: &str,
) -> FeaResult<T> {
    let field = field.ok_or_else(|| bad(keyword, line, format!("missing {what}")))?;
    field
        .parse()
        .map_err(|_| bad(keyword, line, format!("bad {what} '{field}'")))
}

fn bad(keyword: &Keyword, line: usize, detail: impl Into<String>) -> FeaError {
    FeaError::malformed(format!("*{}", keyword.name), line, detail)
}

fn parse_nodes(keyword: &Keyword, data: &[DataLine<'_>]) -> FeaResult<Vec<FeaNode>> {
    data.iter()
        .map(|&(line, text)| {
            let mut f = fields(text);
            let id = number(keyword, line, f.next(), "node id")?;
            let x = number(keyword, line, f.next(), "x")?;
            let y = number(keyword, line, f.next(), "y")?;
            let z = match f.next() {
                Some(z) => number(keyword, line, Some(z), "z")?,
                None => 0.0,
            };
            Ok(FeaNode::new(id, Point3::new(x, y, z)))
        })
        .collect()
}

fn parse_elements(keyword: &Keyword, data: &[DataLine<'_>]) -> FeaResult<Vec<FeaElement>> {
    let mut elements = Vec::new();
    let mut pending: Vec<u32> = Vec::new();
    let mut start = 0;
    for &(line, text) in data {
        if pending.is_empty() {
            start = line;
        }
        for field in fields(text) {
            pending.push(number(keyword, line, Some(field), "id")?);
        }
        // A trailing comma continues the element on the next line.
        if text.ends_with(',') {
            continue;
        }
        if pending.len() < 2 {
            return Err(bad(keyword, start, "element without nodes"));
        }
        let id = pending[0];
        elements.push(FeaElement::new(id, pending.split_off(1)));
        pending.clear();
    }
    if !pending.is_empty() {
        return Err(bad(keyword, start, "element continues past end of block"));
    }
    Ok(elements)
}

fn parse_set(keyword: &Keyword, data: &[DataLine<'_>]) -> FeaResult<Vec<SetEntry>> {
    let generate = keyword.has("GENERATE");
    let mut entries = Vec::new();
    for &(line, text) in data {
        if generate {
            let mut f = fields(text);
            let start = number(keyword, line, f.next(), "range start")?;
            let end = number(keyword, line, f.next(), "range end")?;
            let step = match f.next() {
                Some(s) => number(keyword, line, Some(s), "range step")?,
                None => 1,
            };
            entries.push(SetEntry::Range([start, end, step]));
        } else {
            entries.extend(fields(text).map(|f| match IdRef::parse(f) {
                IdRef::Id(id) => SetEntry::Id(id),
                IdRef::Set(name) => SetEntry::Set(name),
            }));
        }
    }
    Ok(entries)
}

fn parse_dloads(keyword: &Keyword, data: &[DataLine<'_>]) -> FeaResult<Vec<Dload>> {
    data.iter()
        .map(|&(line, text)| {
            let mut f = fields(text);
            let target = IdRef::parse(f.next().ok_or_else(|| bad(keyword, line, "missing element"))?);
            let label = f
                .next()
                .ok_or_else(|| bad(keyword, line, "missing load label"))?
                .to_ascii_uppercase();
            let magnitude = number(keyword, line, f.next(), "magnitude")?;
            let extra = f
                .map(|v| number(keyword, line, Some(v), "load value"))
                .collect::<FeaResult<_>>()?;
            Ok(Dload {
                target,
                label,
                magnitude,
                extra,
            })
        })
        .collect()
}

fn parse_cloads(keyword: &Keyword, data: &[DataLine<'_>]) -> FeaResult<Vec<Cload>> {
    data.iter()
        .map(|&(line, text)| {
            let mut f = fields(text);
            let target = IdRef::parse(f.next().ok_or_else(|| bad(keyword, line, "missing node"))?);
            Ok(Cload {
                target,
                dof: number(keyword, line, f.next(), "degree of freedom")?,
                value: number(keyword, line, f.next(), "value")?,
            })
        })
        .collect()
}

fn parse_boundary(keyword: &Keyword, data: &[DataLine<'_>]) -> FeaResult<Vec<BoundaryCondition>> {
    data.iter()
        .map(|&(line, text)| {
            let mut f = fields(text);
            let target = IdRef::parse(f.next().ok_or_else(|| bad(keyword, line, "missing node"))?);
            let first = number(keyword, line, f.next(), "first degree of freedom")?;
            let last = f
                .next()
                .map(|v| number(keyword, line, Some(v), "last degree of freedom"))
                .transpose()?;
            let value = f
                .next()
                .map(|v| number(keyword, line, Some(v), "value"))
                .transpose()?;
            Ok(BoundaryCondition {
                target,
                first,
                last,
                value,
            })
        })
        .collect()
}

fn parse_equations(keyword: &Keyword, data: &[DataLine<'_>]) -> FeaResult<Vec<Equation>> {
    let mut equations = Vec::new();
    let mut lines = data.iter();
    while let Some(&(line, text)) = lines.next() {
        let count: usize = number(keyword, line, fields(text).next(), "term count")?;
        let mut values: Vec<&str> = Vec::with_capacity(3 * count);
        let mut last = line;
        while values.len() < 3 * count {
            let &(line, text) = lines
                .next()
                .ok_or_else(|| bad(keyword, last, format!("expected {count} terms")))?;
            values.extend(fields(text));
            last = line;
        }
        if values.len() != 3 * count {
            return Err(bad(keyword, last, format!("expected {count} terms")));
        }
        let terms = values
            .chunks_exact(3)
            .map(|t| {
                Ok(EquationTerm {
                    node: number(keyword, last, Some(t[0]), "node")?,
                    dof: number(keyword, last, Some(t[1]), "degree of freedom")?,
                    coefficient: number(keyword, last, Some(t[2]), "coefficient")?,
                })
            })
            .collect::<FeaResult<_>>()?;
        equations.push(Equation { terms });
    }
    Ok(equations)
}

fn parse_card(keyword: Keyword, line: usize, data: &[DataLine<'_>]) -> FeaResult<Section> {
    let section = match keyword.name.as_str() {
        "NODE" => Section::Nodes(Card::new(keyword.clone(), parse_nodes(&keyword, data)?)),
        "ELEMENT" => {
            if keyword.param("TYPE").is_none() {
                return Err(bad(&keyword, line, "missing TYPE"));
            }
            Section::Elements(Card::new(keyword.clone(), parse_elements(&keyword, data)?))
        }
        "NSET" | "ELSET" => {
            if keyword.param(&keyword.name).is_none() {
                return Err(bad(&keyword, line, format!("missing {}", keyword.name)));
            }
            Section::Set(Card::new(keyword.clone(), parse_set(&keyword, data)?))
        }
        "SHELL SECTION" => {
            let &(at, text) = data
                .first()
                .ok_or_else(|| bad(&keyword, line, "missing thickness line"))?;
            let thickness = number(&keyword, at, fields(text).next(), "thickness")?;
            Section::ShellSection(ShellSection { keyword, thickness })
        }
        "MATERIAL" => {
            if keyword.param("NAME").is_none() {
                return Err(bad(&keyword, line, "missing NAME"));
            }
            Section::Material(Material {
                keyword,
                properties: Vec::new(),
            })
        }
        "DLOAD" => Section::Dload(Card::new(keyword.clone(), parse_dloads(&keyword, data)?)),
        "CLOAD" => Section::Cload(Card::new(keyword.clone(), parse_cloads(&keyword, data)?)),
        "BOUNDARY" => {
            Section::Boundary(Card::new(keyword.clone(), parse_boundary(&keyword, data)?))
        }
        "EQUATION" => {
            Section::Equation(Card::new(keyword.clone(), parse_equations(&keyword, data)?))
        }
        _ => Section::Raw(RawCard {
            keyword,
            data: data.iter().map(|(_, t)| (*t).to_string()).collect(),
        }),
    };
    Ok(section)
}

impl Deck {
    /// Parse deck text.
    ///
    /// A data block ends at the next card, a blank line, or a line shorter
    /// than two characters. Cards the model does not type are kept as
    /// [`RawCard`]s, so unknown input survives a rewrite.
    ///
    /// # Errors
    ///
    /// [`FeaError::MalformedDeck`] naming the card for bad data, a card
    /// missing its required parameter, or unbalanced `*STEP`/`*END STEP`.
    ///
    /// # Example
    ///
    /// ```
    /// use aero_fea::Deck;
    ///
    /// let deck = Deck::parse(
    ///     "*NODE, NSET=NALL\n1, 0.0, 0.0, 0.0\n2, 1.0, 0.0, 0.0\n3, 0.0, 1.0, 0.0\n\
    ///      *ELEMENT, TYPE=S3, ELSET=ESkin\n1, 1, 2, 3\n",
    /// )
    /// .unwrap();
    /// assert_eq!(deck.nodes().count(), 3);
    /// assert_eq!(deck.max_element_id(), 1);
    /// ```
    pub fn parse(text: &str) -> FeaResult<Self> {
        let mut lines = Lines::new(text);
        let mut sections: Vec<Section> = Vec::new();
        let mut step: Option<Step> = None;

        while let Some((line, raw)) = lines.next_line() {
            let trimmed = raw.trim();
            let target = match step.as_mut() {
                Some(step) => &mut step.cards,
                None => &mut sections,
            };
            if let Some(comment) = trimmed.strip_prefix("**") {
                target.push(Section::Comment(comment.to_string()));
                continue;
            }
            let Some(keyword) = Keyword::parse(trimmed) else {
                if !trimmed.is_empty() {
                    warn!(line, text = trimmed, "Data line outside any card ignored");
                }
                continue;
            };

            if keyword.is("STEP") {
                if step.is_some() {
                    return Err(bad(&keyword, line, "nested *STEP"));
                }
                step = Some(Step {
                    keyword,
                    cards: Vec::new(),
                });
                continue;
            }
            if keyword.is("END STEP") {
                let done = step
                    .take()
                    .ok_or_else(|| bad(&keyword, line, "no open *STEP"))?;
                sections.push(Section::Step(done));
                continue;
            }

            let data = lines.data_block();
            if MATERIAL_PROPERTIES.contains(&keyword.name.as_str()) {
                if let Some(Section::Material(material)) = target.last_mut() {
                    material.properties.push(RawCard {
                        keyword,
                        data: data.iter().map(|(_, t)| (*t).to_string()).collect(),
                    });
                    continue;
                }
            }
            let section = parse_card(keyword, line, &data)?;
            debug!(line, entries = data.len(), "Parsed card");
            target.push(section);
        }

        if let Some(open) = step {
            warn!("Deck ends inside *STEP; closing it");
            sections.push(Section::Step(open));
        }
        Ok(Self { sections })
    }

    /// Read and parse a deck file.
    ///
    /// # Errors
    ///
    /// [`FeaError::FileNotFound`] / [`FeaError::Unreadable`] for I/O
    /// failures, otherwise as [`Deck::parse`].
    pub fn load<P: AsRef<Path>>(path: P) -> FeaResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| FeaError::open(path, e))?;
        let deck = Self::parse(&text)?;
        info!(
            path = %path.display(),
            nodes = deck.nodes().count(),
            elements = deck.elements().count(),
            "Loaded structural deck"
        );
        Ok(deck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::SetKind;
    use approx::assert_relative_eq;

    const DECK: &str = "\
** Model
*NODE, NSET=NALL
1, 0.0, 0.0, 0.0
2, 1.0, 0.0, 0.0
3, 1.0, 1.0, 0.0
4, 0.0, 1.0, 0.5
*ELEMENT, TYPE=S6, ELSET=ESkin
10, 1, 2, 3, 4,
 2, 3
*ELSET, ELSET=Wing
10,
*NSET, NSET=Root, GENERATE
1, 4, 3
*SHELL SECTION, ELSET=ESkin, MATERIAL=Al, OFFSET=-0.5
0.02
**Materials
*MATERIAL, NAME=Al
*ELASTIC
7.0e10, 0.33
*DENSITY
2700.
*EQUATION
2
1, 3, 1.0, 2, 3, -1.0
*STEP
*STATIC
*DLOAD
10, P1, -250.0
*CLOAD
4, 3, 12.5
*BOUNDARY
1, 1, 6
Root, 1, 3, 0.0
*END STEP
";

    #[test]
    fn parses_every_card() {
        let deck = Deck::parse(DECK).unwrap();
        assert_eq!(deck.nodes().count(), 4);
        let (card, element) = deck.elements().next().unwrap();
        assert_eq!(card.element_type(), Some("S6"));
        assert_eq!(element.nodes, vec![1, 2, 3, 4, 2, 3]);
        assert_eq!(deck.set_members(SetKind::Node, "root"), vec![1, 4]);
        assert_eq!(deck.set_members(SetKind::Element, "Wing"), vec![10]);

        let material = deck
            .model()
            .find_map(|s| match s {
                Section::Material(m) => Some(m),
                _ => None,
            })
            .unwrap();
        assert_eq!(material.name(), Some("Al"));
        assert_eq!(material.properties.len(), 2);

        let equation = deck
            .model()
            .find_map(|s| match s {
                Section::Equation(c) => Some(&c.entries[0]),
                _ => None,
            })
            .unwrap();
        assert_eq!(equation.terms.len(), 2);
        assert_relative_eq!(equation.terms[1].coefficient, -1.0);

        let step = deck.steps().next().unwrap();
        assert_eq!(step.cards.len(), 4);
        match &step.cards[3] {
            Section::Boundary(card) => {
                assert_eq!(card.entries[1].target, IdRef::Set("Root".into()));
                assert_eq!(card.entries[1].last, Some(3));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn blank_line_ends_block() {
        let deck = Deck::parse("*NODE\n1, 0, 0, 0\n\n2, 1, 0, 0\n").unwrap();
        assert_eq!(deck.nodes().count(), 1);
    }

    #[test]
    fn bad_node_names_keyword_and_line() {
        let err = Deck::parse("*NODE\n1, 0, zero, 0\n").unwrap_err();
        match err {
            FeaError::MalformedDeck { keyword, line, .. } => {
                assert_eq!(keyword, "*NODE");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unbalanced_steps() {
        assert!(matches!(
            Deck::parse("*END STEP\n"),
            Err(FeaError::MalformedDeck { .. })
        ));
        assert!(matches!(
            Deck::parse("*STEP\n*STEP\n"),
            Err(FeaError::MalformedDeck { .. })
        ));
    }

    #[test]
    fn shell_section_needs_thickness() {
        let err = Deck::parse("*SHELL SECTION, ELSET=A, MATERIAL=B\n*NODE\n").unwrap_err();
        assert!(err.to_string().contains("SHELL SECTION"));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Deck::load(dir.path().join("none.inp")),
            Err(FeaError::FileNotFound { .. })
        ));
    }
}
