#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Pairdiff Library
//!
//! This library compares the per-residue-pair energy breakdowns of a
//! wild-type and a variant protein structure. Every interacting pair is
//! classified into one of six change types, on all interactions as well as on
//! salt bridges, disulfides and four hydrogen bond classes, and the results
//! are summarized into Polars DataFrames.
//!
//! # Example
//!
//! ```no_run
//! use pairdiff::{analyze, load_energy_table, load_mutations, AnalysisInput, ProgressReporter};
//! use std::path::Path;
//!
//! let input = AnalysisInput::new(
//!     load_energy_table(Path::new("variant.csv"), "variant")?,
//!     load_energy_table(Path::new("wild_type.csv"), "wild_type")?,
//!     load_mutations(Path::new("mutations.csv"))?,
//! );
//! let report = analyze(&input, &ProgressReporter::new())?;
//! println!("{}", report.summary().overview_df()?);
//! # Ok::<(), pairdiff::PairdiffError>(())
//! ```

mod analysis;
mod classify;
mod depth;
mod error;
mod filters;
mod mutations;
mod progress;
mod residues;
mod summary;
mod table;
mod utils;

// Re-export key public types
pub use analysis::{analyze, analyze_parallel, AnalysisInput, AnalysisReport, CHECKPOINTS};
pub use classify::{
    change_types_df, classify, classify_with, ChangeType, Classification, DuplicatePolicy,
};
pub use depth::{buried_hbonds, buried_to_df, residue_depth_df, BuriedBond};
pub use error::{PairdiffError, Result};
pub use filters::{salt_bridges, sulfide_bonds, InteractionKind};
pub use mutations::{find_mutations, structure_sequence, Mutation, MutationSet};
pub use progress::{ProgressCallback, ProgressReporter};
pub use residues::{ChainExt, ResidueExt};
pub use summary::{summarize, Metric, SummaryTable};
pub use table::{
    EnergyRow, EnergyTable, PairKey, DSLF_FA13, HBOND_BB_SC, HBOND_LR_BB, HBOND_SC, HBOND_SR_BB,
    ID_COLUMNS, REQUIRED_TERMS, STANDARD_TERMS, TOTAL,
};
pub use utils::{
    convert_outfile, drop_missing_partners, load_depth, load_energy_table, load_mutations,
    load_structure, run_with_threads, write_df_to_file, DataFrameFileType, MISSING_PARTNER,
};
