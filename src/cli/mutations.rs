use super::{mutations_from_structures, prepare_output_dir, report_error};
use clap::Parser;
use pairdiff::{write_df_to_file, DataFrameFileType, Result};
use std::path::PathBuf;
use tracing::{info, trace};

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    /// Wild-type PDB or mmCIF file
    #[arg(short = 'w', long = "wild-type")]
    wild_type: PathBuf,

    /// Variant PDB or mmCIF file
    #[arg(short = 'm', long = "variant")]
    variant: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Name of the output file
    #[arg(short = 'f', long = "filename", default_value_t = String::from("mutations"))]
    filename: String,

    /// Output file type
    #[arg(short = 't', long, default_value_t = DataFrameFileType::Csv)]
    output_format: DataFrameFileType,
}

pub(crate) fn run(args: &Args) {
    trace!("{args:?}");
    if let Err(e) = execute(args) {
        report_error(&e);
    }
}

fn execute(args: &Args) -> Result<()> {
    let mutations = mutations_from_structures(&args.wild_type, &args.variant)?;
    let output_path = prepare_output_dir(&args.output)?;
    let output_file = output_path.join(&args.filename);

    let mut df_mutations = mutations.to_df()?;
    info!(
        "Found {} mutated position(s)\n{}",
        mutations.len(),
        df_mutations
    );
    write_df_to_file(&mut df_mutations, &output_file, args.output_format)?;
    info!(
        "Results saved to {}",
        output_file.with_extension(args.output_format.to_string()).display()
    );
    Ok(())
}
