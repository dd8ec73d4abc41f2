//! [`Deck`] back to deck text.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::deck::{Deck, Section, SetEntry};
use crate::error::{FeaError, FeaResult};

/// Entries per data line; the solver reads at most 16.
const PER_LINE: usize = 16;

fn write_ids<W: Write>(out: &mut W, ids: &[String]) -> std::io::Result<()> {
    let lines: Vec<&[String]> = ids.chunks(PER_LINE).collect();
    for (i, chunk) in lines.iter().enumerate() {
        let continued = if i + 1 < lines.len() { "," } else { "" };
        writeln!(out, "{}{continued}", chunk.join(", "))?;
    }
    Ok(())
}

fn write_section<W: Write>(out: &mut W, section: &Section) -> std::io::Result<()> {
    match section {
        Section::Comment(text) => writeln!(out, "**{text}")?,
        Section::Nodes(card) => {
            writeln!(out, "{}", card.keyword)?;
            for n in &card.entries {
                let p = n.position;
                writeln!(out, "{}, {:?}, {:?}, {:?}", n.id, p.x, p.y, p.z)?;
            }
        }
        Section::Elements(card) => {
            writeln!(out, "{}", card.keyword)?;
            for e in &card.entries {
                let fields: Vec<String> = std::iter::once(e.id)
                    .chain(e.nodes.iter().copied())
                    .map(|id| id.to_string())
                    .collect();
                write_ids(out, &fields)?;
            }
        }
        Section::Set(card) => {
            writeln!(out, "{}", card.keyword)?;
            let mut members = Vec::new();
            for entry in &card.entries {
                match entry {
                    SetEntry::Id(id) => members.push(id.to_string()),
                    SetEntry::Set(name) => members.push(name.clone()),
                    SetEntry::Range([start, end, step]) => {
                        writeln!(out, "{start}, {end}, {step}")?;
                    }
                }
            }
            for chunk in members.chunks(PER_LINE) {
                writeln!(out, "{},", chunk.join(", "))?;
            }
        }
        Section::ShellSection(shell) => {
            writeln!(out, "{}", shell.keyword)?;
            writeln!(out, "{:?}", shell.thickness)?;
        }
        Section::Material(material) => {
            writeln!(out, "{}", material.keyword)?;
            for card in &material.properties {
                writeln!(out, "{}", card.keyword)?;
                for line in &card.data {
                    writeln!(out, "{line}")?;
                }
            }
        }
        Section::Dload(card) => {
            writeln!(out, "{}", card.keyword)?;
            for d in &card.entries {
                write!(out, "{}, {}, {:?}", d.target, d.label, d.magnitude)?;
                for v in &d.extra {
                    write!(out, ", {v:?}")?;
                }
                writeln!(out)?;
            }
        }
        Section::Cload(card) => {
            writeln!(out, "{}", card.keyword)?;
            for c in &card.entries {
                writeln!(out, "{}, {}, {:?}", c.target, c.dof, c.value)?;
            }
        }
        Section::Boundary(card) => {
            writeln!(out, "{}", card.keyword)?;
            for b in &card.entries {
                write!(out, "{}, {}", b.target, b.first)?;
                match (b.last, b.value) {
                    (Some(last), Some(value)) => write!(out, ", {last}, {value:?}")?,
                    (Some(last), None) => write!(out, ", {last}")?,
                    (None, Some(value)) => write!(out, ", {}, {value:?}", b.first)?,
                    (None, None) => {}
                }
                writeln!(out)?;
            }
        }
        Section::Equation(card) => {
            writeln!(out, "{}", card.keyword)?;
            for eq in &card.entries {
                writeln!(out, "{}", eq.terms.len())?;
                // Four terms fill the 12 entries a line may hold.
                for chunk in eq.terms.chunks(4) {
                    let terms: Vec<String> = chunk
                        .iter()
                        .map(|t| format!("{}, {}, {:?}", t.node, t.dof, t.coefficient))
                        .collect();
                    writeln!(out, "{}", terms.join(", "))?;
                }
            }
        }
        Section::Step(step) => {
            writeln!(out, "{}", step.keyword)?;
            for card in &step.cards {
                write_section(out, card)?;
            }
            writeln!(out, "*END STEP")?;
        }
        Section::Raw(card) => {
            writeln!(out, "{}", card.keyword)?;
            for line in &card.data {
                writeln!(out, "{line}")?;
            }
        }
    }
    Ok(())
}

impl Deck {
    /// Write the deck in the grammar [`Deck::parse`] reads.
    ///
    /// Floats use the shortest text that reads back to the same value.
    ///
    /// # Errors
    ///
    /// [`FeaError::Io`] on stream failure.
    pub fn write_to<W: Write>(&self, out: &mut W) -> FeaResult<()> {
        for section in &self.sections {
            write_section(out, section)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Render the deck as text.
    #[must_use]
    pub fn to_inp_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Write the deck to `path`.
    ///
    /// # Errors
    ///
    /// [`FeaError::Unreadable`] if the file cannot be created,
    /// [`FeaError::Io`] on write failure.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> FeaResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| FeaError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_to(&mut BufWriter::new(file))?;
        info!(path = %path.display(), sections = self.sections.len(), "Wrote structural deck");
        Ok(())
    }
}
