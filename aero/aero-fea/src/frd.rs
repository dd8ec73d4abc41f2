//! Solver results file (`.frd`): geometry, displacements and stresses.
//!
//! The file is fixed-column text. Each block opens with a header line
//! (`2C` nodes, `3C` elements, `-4 DISP`, `-4 STRESS`) and closes with
//! `-3`. Records start with `-1`; element connectivity continues on `-2`
//! lines. Adjacent numbers may touch, e.g. `1.0E+00-2.5E-01`.

use std::path::Path;

use aero_types::{Point3, Vector3};
use hashbrown::HashMap;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::deck::FeaNode;
use crate::error::{FeaError, FeaResult};
use crate::stress::stress_magnitude;

/// Element topology codes used by the results file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FrdElementType {
    /// 8-node brick.
    Hex8,
    /// 6-node wedge.
    Penta6,
    /// 4-node tetrahedron.
    Tet4,
    /// 20-node brick.
    Hex20,
    /// 15-node wedge.
    Penta15,
    /// 10-node tetrahedron.
    Tet10,
    /// 3-node triangle.
    Tri3,
    /// 6-node triangle.
    Tri6,
    /// 4-node quadrilateral.
    Quad4,
    /// 8-node quadrilateral.
    Quad8,
    /// 2-node beam.
    Beam2,
    /// 3-node beam.
    Beam3,
    /// Any other code.
    Other(u32),
}

impl FrdElementType {
    /// Decode a type code.
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Hex8,
            2 => Self::Penta6,
            3 => Self::Tet4,
            4 => Self::Hex20,
            5 => Self::Penta15,
            6 => Self::Tet10,
            7 => Self::Tri3,
            8 => Self::Tri6,
            9 => Self::Quad4,
            10 => Self::Quad8,
            11 => Self::Beam2,
            12 => Self::Beam3,
            other => Self::Other(other),
        }
    }

    /// Number of corner nodes, which come first in the connectivity.
    #[must_use]
    pub const fn corner_count(self) -> Option<usize> {
        match self {
            Self::Hex8 | Self::Hex20 => Some(8),
            Self::Penta6 | Self::Penta15 => Some(6),
            Self::Tet4 | Self::Tet10 | Self::Quad4 | Self::Quad8 => Some(4),
            Self::Tri3 | Self::Tri6 => Some(3),
            Self::Beam2 | Self::Beam3 => Some(2),
            Self::Other(_) => None,
        }
    }
}

/// An element of the results mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrdElement {
    /// Element id, matching the deck.
    pub id: u32,
    /// Topology.
    pub kind: FrdElementType,
    /// Node ids, corners first.
    pub nodes: Vec<u32>,
}

impl FrdElement {
    /// Corner node ids, or `None` for unknown types or short connectivity.
    #[must_use]
    pub fn corners(&self) -> Option<&[u32]> {
        self.nodes.get(..self.kind.corner_count()?)
    }
}

/// Thickness and mid-surface area of an expanded shell element.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElementGeometry {
    /// Distance between the two faces.
    pub thickness: f64,
    /// Area of the first face.
    pub area: f64,
}

impl ElementGeometry {
    /// `area · thickness`.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.area * self.thickness
    }
}

/// Parsed results: the expanded mesh plus the first displacement and
/// stress blocks.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrdResults {
    /// Nodes in file order.
    pub nodes: Vec<FeaNode>,
    /// Elements in file order.
    pub elements: Vec<FrdElement>,
    /// Nodal displacement.
    pub displacements: HashMap<u32, Vector3<f64>>,
    /// Nodal stress `[sxx, syy, szz, sxy, syz, szx]`.
    pub stresses: HashMap<u32, [f64; 6]>,
    positions: HashMap<u32, Point3<f64>>,
}

/// Whitespace split that also separates touching signed numbers.
fn split_fields(line: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for token in line.split_whitespace() {
        let bytes = token.as_bytes();
        let mut start = 0;
        for i in 1..bytes.len() {
            let sign = matches!(bytes[i], b'-' | b'+');
            let after_mantissa = bytes[i - 1].is_ascii_digit() || bytes[i - 1] == b'.';
            if sign && after_mantissa {
                out.push(&token[start..i]);
                start = i;
            }
        }
        out.push(&token[start..]);
    }
    out
}

fn values<const N: usize>(fields: &[&str], section: &str) -> FeaResult<[f64; N]> {
    let mut out = [0.0; N];
    if fields.len() < N {
        return Err(FeaError::results(section));
    }
    for (slot, field) in out.iter_mut().zip(fields) {
        *slot = field.parse().map_err(|_| FeaError::results(section))?;
    }
    Ok(out)
}

/// Values after the record marker and id.
fn tail<'a, 'b>(record: &'b [&'a str]) -> &'b [&'a str] {
    record.get(2..).unwrap_or_default()
}

fn id(field: Option<&&str>, section: &str) -> FeaResult<u32> {
    field
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| FeaError::results(section))
}

/// Lines of one block, after its header and up to its `-3`.
fn block<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    is_header: impl Fn(&[&str]) -> bool,
    section: &str,
) -> FeaResult<Vec<Vec<&'a str>>> {
    lines
        .by_ref()
        .find(|l| is_header(&split_fields(l)))
        .ok_or_else(|| FeaError::results(section))?;
    let mut records = Vec::new();
    for line in lines.by_ref() {
        let fields = split_fields(line);
        match fields.first().copied() {
            Some("-3") => return Ok(records),
            Some("-1" | "-2") => records.push(fields),
            _ => {}
        }
    }
    Err(FeaError::results(section))
}

fn result_block<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    name: &str,
) -> FeaResult<Vec<Vec<&'a str>>> {
    block(
        lines,
        |f| f.first() == Some(&"-4") && f.get(1) == Some(&name),
        name,
    )
}

impl FrdResults {
    /// Parse results text.
    ///
    /// # Errors
    ///
    /// [`FeaError::MalformedResults`] naming the first missing or
    /// unreadable block: `2C`, `3C`, `DISP` or `STRESS`.
    pub fn parse(text: &str) -> FeaResult<Self> {
        let mut lines = text.lines();

        let node_records = block(&mut lines, |f| f.first() == Some(&"2C"), "2C")?;
        let mut nodes = Vec::with_capacity(node_records.len());
        for r in &node_records {
            let [x, y, z] = values::<3>(tail(r), "2C")?;
            nodes.push(FeaNode::new(id(r.get(1), "2C")?, Point3::new(x, y, z)));
        }

        let element_records = block(&mut lines, |f| f.first() == Some(&"3C"), "3C")?;
        let mut elements: Vec<FrdElement> = Vec::new();
        for r in &element_records {
            if r[0] == "-1" {
                elements.push(FrdElement {
                    id: id(r.get(1), "3C")?,
                    kind: FrdElementType::from_code(id(r.get(2), "3C")?),
                    nodes: Vec::new(),
                });
            } else {
                let element = elements.last_mut().ok_or_else(|| FeaError::results("3C"))?;
                for field in &r[1..] {
                    element.nodes.push(id(Some(field), "3C")?);
                }
            }
        }

        let mut displacements = HashMap::with_capacity(nodes.len());
        for r in result_block(&mut lines, "DISP")?.iter().filter(|r| r[0] == "-1") {
            let [dx, dy, dz] = values::<3>(tail(r), "DISP")?;
            displacements.insert(id(r.get(1), "DISP")?, Vector3::new(dx, dy, dz));
        }

        let mut stresses = HashMap::with_capacity(nodes.len());
        for r in result_block(&mut lines, "STRESS")?.iter().filter(|r| r[0] == "-1") {
            stresses.insert(id(r.get(1), "STRESS")?, values::<6>(tail(r), "STRESS")?);
        }

        let positions = nodes.iter().map(|n| (n.id, n.position)).collect();
        debug!(
            nodes = nodes.len(),
            elements = elements.len(),
            stresses = stresses.len(),
            "Parsed results"
        );
        Ok(Self {
            nodes,
            elements,
            displacements,
            stresses,
            positions,
        })
    }

    /// Read and parse a results file.
    ///
    /// # Errors
    ///
    /// [`FeaError::FileNotFound`] / [`FeaError::Unreadable`] for I/O
    /// failures, otherwise as [`FrdResults::parse`].
    pub fn load<P: AsRef<Path>>(path: P) -> FeaResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| FeaError::open(path, e))?;
        let results = Self::parse(&text)?;
        info!(
            path = %path.display(),
            nodes = results.nodes.len(),
            elements = results.elements.len(),
            "Loaded results"
        );
        Ok(results)
    }

    /// Position of a node.
    #[must_use]
    pub fn position(&self, node: u32) -> Option<Point3<f64>> {
        self.positions.get(&node).copied()
    }

    /// Largest displacement magnitude, 0 without displacements.
    #[must_use]
    pub fn max_displacement(&self) -> f64 {
        self.displacements
            .values()
            .map(Vector3::norm)
            .fold(0.0, f64::max)
    }

    /// Principal-stress magnitude at a node.
    #[must_use]
    pub fn node_stress(&self, node: u32) -> Option<f64> {
        self.stresses.get(&node).copied().map(stress_magnitude)
    }

    /// Mean principal-stress magnitude over an element's corner nodes.
    #[must_use]
    pub fn element_stress(&self, element: &FrdElement) -> Option<f64> {
        let corners = element.corners()?;
        let sum = corners
            .iter()
            .map(|n| self.node_stress(*n))
            .sum::<Option<f64>>()?;
        #[allow(clippy::cast_precision_loss)]
        Some(sum / corners.len() as f64)
    }

    /// Thickness and area of a wedge or brick element.
    ///
    /// Shell elements are expanded into solids through the thickness; the
    /// first half of the corners lies on one face and the second half on
    /// the other. Thickness is the length of the mean corner-to-corner
    /// vector. Area is that of the first face: `½|(p2-p0)×(p1-p0)|` for a
    /// wedge, `|(p2-p3)×(p0-p3)|` for a brick. Other types give `None`.
    #[must_use]
    pub fn element_geometry(&self, element: &FrdElement) -> Option<ElementGeometry> {
        let corners = element.corners()?;
        let p: Vec<Point3<f64>> = corners
            .iter()
            .map(|n| self.position(*n))
            .collect::<Option<_>>()?;
        let half = match element.kind {
            FrdElementType::Penta6 | FrdElementType::Penta15 => 3,
            FrdElementType::Hex8 | FrdElementType::Hex20 => 4,
            _ => return None,
        };

        let through: Vector3<f64> = (0..half).map(|k| p[k] - p[k + half]).sum();
        #[allow(clippy::cast_precision_loss)]
        let thickness = (through / half as f64).norm();
        let area = if half == 3 {
            0.5 * (p[2] - p[0]).cross(&(p[1] - p[0])).norm()
        } else {
            (p[2] - p[3]).cross(&(p[0] - p[3])).norm()
        };
        Some(ElementGeometry { thickness, area })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fmt::Write as _;

    /// One 6-node wedge of thickness `t` over the unit right triangle, with
    /// uniaxial stress `sxx` at every node.
    pub(crate) fn wedge_frd(t: f64, sxx: f64) -> String {
        let corners = [
            (0.0, 0.0, t),
            (1.0, 0.0, t),
            (0.0, 1.0, t),
            (0.0, 0.0, 0.0),
            (1.0, 0.0, 0.0),
            (0.0, 1.0, 0.0),
        ];
        let mut s = String::from("    1C\n    2C                             6                                     1\n");
        for (i, (x, y, z)) in corners.iter().enumerate() {
            let _ = writeln!(s, " -1{:10}{:12.5E}{:12.5E}{:12.5E}", i + 1, x, y, z);
        }
        s.push_str(" -3\n    3C                             1                                     1\n");
        s.push_str(" -1         1    2    0    1\n -2         1         2         3         4         5         6\n -3\n");
        s.push_str("    1PSTEP                         1           1           1\n");
        s.push_str(" -4  DISP        4    1\n -5  D1          1    2    1    0\n");
        for i in 1..=6 {
            let _ = writeln!(s, " -1{i:10} 1.00000E-03-2.00000E-03 0.00000E+00");
        }
        s.push_str(" -3\n -4  STRESS      6    1\n -5  SXX         1    4    1    1\n");
        for i in 1..=6 {
            let _ = writeln!(
                s,
                " -1{i:10}{sxx:12.5E} 0.00000E+00 0.00000E+00 0.00000E+00 0.00000E+00 0.00000E+00"
            );
        }
        s.push_str(" -3\n 9999\n");
        s
    }

    #[test]
    fn touching_numbers_split() {
        assert_eq!(
            split_fields(" -1         3 1.00000E-03-2.00000E-03-4.5"),
            vec!["-1", "3", "1.00000E-03", "-2.00000E-03", "-4.5"]
        );
    }

    #[test]
    fn wedge_geometry_and_stress() {
        let results = FrdResults::parse(&wedge_frd(0.02, 1.5e6)).unwrap();
        assert_eq!(results.nodes.len(), 6);
        let element = &results.elements[0];
        assert_eq!(element.kind, FrdElementType::Penta6);
        let geometry = results.element_geometry(element).unwrap();
        assert_relative_eq!(geometry.thickness, 0.02, epsilon = 1e-9);
        assert_relative_eq!(geometry.area, 0.5, epsilon = 1e-9);
        assert_relative_eq!(results.element_stress(element).unwrap(), 1.5e6, max_relative = 1e-9);
        assert_relative_eq!(
            results.displacements[&4].y,
            -2.0e-3,
            epsilon = 1e-12
        );
        assert_relative_eq!(results.max_displacement(), 5.0e-6_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn brick_geometry() {
        let mut results = FrdResults::default();
        let pts = [
            (0.0, 0.0, 1.0),
            (2.0, 0.0, 1.0),
            (2.0, 3.0, 1.0),
            (0.0, 3.0, 1.0),
            (0.0, 0.0, 0.0),
            (2.0, 0.0, 0.0),
            (2.0, 3.0, 0.0),
            (0.0, 3.0, 0.0),
        ];
        for (i, (x, y, z)) in (1u32..).zip(pts) {
            results.positions.insert(i, Point3::new(x, y, z));
        }
        let element = FrdElement {
            id: 1,
            kind: FrdElementType::Hex20,
            nodes: (1..=20).collect(),
        };
        let g = results.element_geometry(&element).unwrap();
        assert_relative_eq!(g.thickness, 1.0);
        assert_relative_eq!(g.area, 6.0);
        assert_relative_eq!(g.volume(), 6.0);
    }

    #[test]
    fn missing_stress_block() {
        let text = wedge_frd(0.01, 1.0);
        let cut = text.find(" -4  STRESS").unwrap();
        match FrdResults::parse(&text[..cut]) {
            Err(FeaError::MalformedResults { section }) => assert_eq!(section, "STRESS"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_node_block() {
        assert!(matches!(
            FrdResults::parse("    1C\n 9999\n"),
            Err(FeaError::MalformedResults { .. })
        ));
    }
}
