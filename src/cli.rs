pub(crate) mod analyze;
pub(crate) mod buried;
pub(crate) mod depth;
pub(crate) mod mutations;

use clap::Args as ClapArgs;
use pairdiff::{
    find_mutations, load_energy_table, load_mutations, load_structure, AnalysisInput,
    DuplicatePolicy, MutationSet, PairdiffError, Result,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Energy tables and mutated positions shared by the analysis subcommands.
#[derive(ClapArgs, Debug, Clone)]
pub(crate) struct InputArgs {
    /// Energy breakdown of the wild-type structure (CSV, or `.out` silent file)
    #[arg(short = 'w', long = "wild-type")]
    wild_type: PathBuf,

    /// Energy breakdown of the variant structure (CSV, or `.out` silent file)
    #[arg(short = 'm', long = "variant")]
    variant: PathBuf,

    /// CSV file with a `Position` column listing the mutated residues
    #[arg(long, conflicts_with_all = ["wild_pdb", "variant_pdb"])]
    mutations: Option<PathBuf>,

    /// Wild-type structure to read the mutated positions from
    #[arg(long = "wild-pdb", requires = "variant_pdb")]
    wild_pdb: Option<PathBuf>,

    /// Variant structure to read the mutated positions from
    #[arg(long = "variant-pdb", requires = "wild_pdb")]
    variant_pdb: Option<PathBuf>,

    /// Use the first wild-type row of a residue pair listed more than once
    /// instead of failing
    #[arg(long = "first-match", default_value_t = false)]
    first_match: bool,
}

impl InputArgs {
    /// Load both energy tables and the mutation set.
    pub(crate) fn load(&self) -> Result<AnalysisInput> {
        let wild_type = load_energy_table(&self.wild_type, "wild_type")?;
        let variant = load_energy_table(&self.variant, "variant")?;
        let mutations = match (&self.mutations, &self.wild_pdb, &self.variant_pdb) {
            (Some(path), _, _) => load_mutations(path)?,
            (None, Some(wild_pdb), Some(variant_pdb)) => {
                mutations_from_structures(wild_pdb, variant_pdb)?
            }
            _ => {
                warn!("No mutations given, every pair is treated as away from a mutated residue");
                MutationSet::default()
            }
        };
        debug!(
            "Mutated positions: {:?}",
            mutations.positions().collect::<Vec<_>>()
        );

        let policy = match self.first_match {
            true => DuplicatePolicy::FirstMatch,
            false => DuplicatePolicy::Reject,
        };
        Ok(AnalysisInput::new(variant, wild_type, mutations).with_duplicate_policy(policy))
    }
}

/// Read both structures and compare their sequences.
pub(crate) fn mutations_from_structures(
    wild_pdb: &Path,
    variant_pdb: &Path,
) -> Result<MutationSet> {
    let wild_type = read_structure(wild_pdb)?;
    let variant = read_structure(variant_pdb)?;
    find_mutations(&wild_type, &variant)
}

fn read_structure(path: &Path) -> Result<pdbtbx::PDB> {
    let input_path = path.canonicalize()?;
    let input_file = input_path.to_string_lossy().to_string();
    let (pdb, pdb_warnings) = load_structure(&input_file)?;
    for e in &pdb_warnings {
        match e.level() {
            pdbtbx::ErrorLevel::BreakingError => error!("{e}"),
            pdbtbx::ErrorLevel::InvalidatingError => error!("{e}"),
            _ => warn!("{e}"),
        }
    }
    Ok(pdb)
}

/// Resolve and create the output directory.
pub(crate) fn prepare_output_dir(output: &Path) -> Result<PathBuf> {
    let output_path = std::path::absolute(output)?;
    std::fs::create_dir_all(&output_path)?;
    debug!("Results will be saved to {}", output_path.display());
    Ok(output_path)
}

/// Log a failed subcommand.
pub(crate) fn report_error(e: &PairdiffError) {
    error!("{e}");
}
