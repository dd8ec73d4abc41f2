//! File-level operations, one per command of the post-processing tool.
//!
//! Every function takes base names without extensions and appends the
//! conventional suffixes: `<name>.adb`, `<name>.cuts`, `<name>.slc`,
//! `<name>.inp`, `<name>.frd`, `<name>.sized`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use aero_adb::AdbFile;
use aero_fea::{
    AnalysisKind, AnalysisParams, DEFAULT_SKIN_ELSET, Deck, FrdResults, MergeParams,
    Optimization, Renumbering, SizingParams, analysis_deck, format_sized, merge_decks, optimize,
    renumber,
};
use aero_interp::{InterpMesh, InterpParams, LoadSample, Transfer, interpolate};
use aero_slice::{CaseLabel, ScalarKind, SliceParams, load_cuts, slice_planes, write_slice_blocks};
use aero_topology::build_topology;
use tracing::{info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{AeroError, AeroResult};

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn inp(base: &Path) -> PathBuf {
    with_suffix(base, ".inp")
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> AeroError + '_ {
    move |source| AeroError::Write {
        path: path.to_path_buf(),
        source,
    }
}

// =============================================================================
// Slicing
// =============================================================================

/// Counts from [`slice_database`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SliceSummary {
    /// Cases written.
    pub cases: usize,
    /// Planes per case.
    pub planes: usize,
    /// Points over all cases and planes.
    pub points: usize,
}

/// Slice every case of `<name>.adb` by the planes of `<name>.cuts` into
/// `<name>.slc`.
///
/// The sliced scalar is the area-weighted nodal Cp. Vortex-lattice
/// databases label the column `dCp`, others `Cp`.
///
/// # Errors
///
/// Database, cuts-file and slicing errors, or [`AeroError::Write`] when the
/// output cannot be written.
pub fn slice_database<P: AsRef<Path>>(name: P, params: &SliceParams) -> AeroResult<SliceSummary> {
    let name = name.as_ref();
    let planes = load_cuts(with_suffix(name, ".cuts"))?;
    let mut db = AdbFile::open(name)?;
    let mesh = db.mesh().mesh.clone();
    let kind = if db.mesh().header.model.is_vortex_lattice() {
        ScalarKind::PressureJump
    } else {
        ScalarKind::Pressure
    };
    let topology = build_topology(&mesh.faces());

    let path = with_suffix(name, ".slc");
    let file = File::create(&path).map_err(write_error(&path))?;
    let mut out = BufWriter::new(file);
    let mut summary = SliceSummary {
        planes: planes.len(),
        ..SliceSummary::default()
    };
    while let Some(case) = db.next_case()? {
        let nodal = case.nodal_cp(&mesh);
        let blocks = slice_planes(&mesh.nodes, topology.edges(), &nodal, &planes, params)?;
        let label = CaseLabel {
            index: case.index,
            mach: case.mach,
            alpha: case.alpha,
            beta: case.beta,
            comment: case.comment.clone(),
        };
        write_slice_blocks(&mut out, &label, kind, &blocks).map_err(write_error(&path))?;
        summary.cases += 1;
        summary.points += blocks.iter().map(|b| b.points.len()).sum::<usize>();
    }
    out.flush().map_err(write_error(&path))?;

    info!(
        path = %path.display(),
        cases = summary.cases,
        points = summary.points,
        "Wrote slices"
    );
    Ok(summary)
}

// =============================================================================
// Load transfer
// =============================================================================

/// Parameters for [`interpolate_to_deck`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransferParams {
    /// Case to transfer, 1-based.
    pub case: usize,
    /// Element set of the wetted skin.
    pub elset: String,
    /// Matching settings; `None` picks a preset from the database model.
    pub interp: Option<InterpParams>,
    /// Label, dynamic pressure, clamping tolerance and id offsets. The
    /// analysis kind is ignored; both decks are written.
    pub analysis: AnalysisParams,
    /// Load scale of each side of a mirrored vortex-lattice surface.
    pub lifting_surface_scale: f64,
}

impl Default for TransferParams {
    fn default() -> Self {
        Self {
            case: 1,
            elset: DEFAULT_SKIN_ELSET.to_string(),
            interp: None,
            analysis: AnalysisParams::default(),
            lifting_surface_scale: 0.5,
        }
    }
}

impl TransferParams {
    /// Select the case.
    #[must_use]
    pub const fn with_case(mut self, case: usize) -> Self {
        self.case = case;
        self
    }

    /// Select the skin set.
    #[must_use]
    pub fn with_elset(mut self, elset: impl Into<String>) -> Self {
        self.elset = elset.into();
        self
    }

    /// Override the matching settings.
    #[must_use]
    pub fn with_interp(mut self, interp: InterpParams) -> Self {
        self.interp = Some(interp);
        self
    }

    /// Set the analysis parameters.
    #[must_use]
    pub fn with_analysis(mut self, analysis: AnalysisParams) -> Self {
        self.analysis = analysis;
        self
    }
}

/// Transfer one case of `<aero>.adb` onto the skin of `<deck>.inp` and
/// write `<deck>.static.inp` and `<deck>.buckle.inp`.
///
/// Vortex-lattice sources are mirrored into an upper and lower surface
/// first. Destination elements without a donor get zero pressure in the
/// written decks; they are listed in the returned [`Transfer::misses`].
///
/// # Errors
///
/// Database, deck and interpolation errors.
pub fn interpolate_to_deck<P: AsRef<Path>, Q: AsRef<Path>>(
    aero: P,
    deck: Q,
    params: &TransferParams,
) -> AeroResult<Transfer> {
    let deck_base = deck.as_ref();
    let mut db = AdbFile::open(aero)?;
    let case = db.goto_case(params.case)?;
    let loaded = db.mesh();

    let loads: Vec<LoadSample> = case
        .cp
        .iter()
        .zip(&case.cp_unsteady)
        .zip(&case.gamma)
        .map(|((&cp, &unsteady), &gamma)| LoadSample::new(cp, unsteady, gamma))
        .collect();
    let mut source =
        InterpMesh::new(loaded.mesh.nodes.clone(), loaded.mesh.faces()).with_loads(loads);
    let vortex_lattice = loaded.header.model.is_vortex_lattice();
    if vortex_lattice {
        source = source.with_lifting_surface_mirror(params.lifting_surface_scale);
    }
    let interp = params.interp.clone().unwrap_or_else(|| {
        if vortex_lattice {
            InterpParams::vortex_lattice()
        } else {
            InterpParams::panel()
        }
    });

    let model = Deck::load(inp(deck_base))?;
    let skin = model.surface_mesh(&params.elset)?;
    let transfer = interpolate(&source, &skin, &interp)?;
    if !transfer.is_complete() {
        warn!(
            misses = transfer.miss_count(),
            "Writing zero pressure for elements without a donor"
        );
    }
    let pressures: Vec<(u32, f64)> = skin
        .element_ids
        .iter()
        .copied()
        .zip(transfer.loads_or_zero().iter().map(|l| l.cp))
        .collect();

    for kind in [AnalysisKind::Static, AnalysisKind::Buckle] {
        let analysis = AnalysisParams {
            kind,
            ..params.analysis.clone()
        };
        let path = with_suffix(deck_base, &format!(".{}.inp", kind.tag()));
        analysis_deck(&model, &pressures, &analysis).save(&path)?;
    }

    info!(
        case = params.case,
        elements = pressures.len(),
        misses = transfer.miss_count(),
        "Transferred loads to structural deck"
    );
    Ok(transfer)
}

// =============================================================================
// Deck editing
// =============================================================================

/// Merge `<first>.inp` and `<second>.inp` into `<output>.inp`.
///
/// Empty source names in `params` are filled from the base names.
///
/// # Errors
///
/// Deck read and write errors.
pub fn merge_deck_files<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
    first: P,
    second: Q,
    output: R,
    params: &MergeParams,
) -> AeroResult<Deck> {
    let (first, second) = (first.as_ref(), second.as_ref());
    let a = Deck::load(inp(first))?;
    let b = Deck::load(inp(second))?;
    let mut params = params.clone();
    for (source, base) in params.sources.iter_mut().zip([first, second]) {
        if source.is_empty() {
            *source = base.display().to_string();
        }
    }
    let merged = merge_decks(&a, &b, &params);
    merged.save(inp(output.as_ref()))?;
    Ok(merged)
}

/// Renumber `<name>.inp` densely into `<name>.renum.inp`.
///
/// # Errors
///
/// Deck read and write errors.
pub fn renumber_deck_file<P: AsRef<Path>>(name: P) -> AeroResult<Renumbering> {
    let name = name.as_ref();
    let deck = Deck::load(inp(name))?;
    let (dense, map) = renumber(&deck);
    dense.save(with_suffix(name, ".renum.inp"))?;
    Ok(map)
}

/// Drop elements that repeat a node, `<input>.inp` to `<output>.inp`.
///
/// Returns the dropped element ids.
///
/// # Errors
///
/// Deck read and write errors.
pub fn clean_deck_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> AeroResult<Vec<u32>> {
    let mut deck = Deck::load(inp(input.as_ref()))?;
    let dropped = deck.clean_degenerate_elements();
    deck.save(inp(output.as_ref()))?;
    Ok(dropped)
}

/// Scale every face pressure, `<input>.inp` to `<output>.inp`.
///
/// Returns the number of scaled loads.
///
/// # Errors
///
/// Deck read and write errors.
pub fn scale_deck_pressures<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    factor: f64,
) -> AeroResult<usize> {
    let mut deck = Deck::load(inp(input.as_ref()))?;
    let scaled = deck.scale_pressures(factor);
    deck.save(inp(output.as_ref()))?;
    Ok(scaled)
}

// =============================================================================
// Sizing
// =============================================================================

/// Size the shell thickness of `elset` in `<name>.inp` from the stresses in
/// `<results>.frd`.
///
/// Writes the stress-sized thickness to `<name>.sized` and the regrouped
/// deck, built from the smoothed thickness, to `<output>.inp`.
///
/// # Errors
///
/// Deck and results errors, or [`AeroError::Write`] for the `.sized` file.
pub fn optimize_deck_file<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
    name: P,
    results: Q,
    output: R,
    params: &SizingParams,
    elset: &str,
) -> AeroResult<Optimization> {
    let name = name.as_ref();
    let deck = Deck::load(inp(name))?;
    let results = FrdResults::load(with_suffix(results.as_ref(), ".frd"))?;
    let optimization = optimize(&deck, &results, params, elset)?;

    let sized = with_suffix(name, ".sized");
    std::fs::write(&sized, format_sized(&optimization.sized)).map_err(write_error(&sized))?;
    optimization.deck.save(inp(output.as_ref()))?;
    info!(
        path = %sized.display(),
        elements = optimization.sized.len(),
        "Wrote sized thickness"
    );
    Ok(optimization)
}
