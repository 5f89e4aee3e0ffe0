use super::{prepare_output_dir, report_error};
use clap::Parser;
use pairdiff::{
    load_depth, load_energy_table, residue_depth_df, write_df_to_file, DataFrameFileType, Result,
};
use std::path::PathBuf;
use tracing::{info, trace};

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    /// Energy breakdown of the structure (CSV, or `.out` silent file)
    #[arg(short, long)]
    energy: PathBuf,

    /// Residue depths of the same structure (`resi,depth` CSV, or a JSON object)
    #[arg(short, long)]
    depth: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Name of the output file
    #[arg(short = 'f', long = "filename", default_value_t = String::from("residue_depth"))]
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
    let table = load_energy_table(&args.energy, "structure")?;
    let depth = load_depth(&args.depth)?;

    let output_path = prepare_output_dir(&args.output)?;
    let output_file = output_path.join(&args.filename);
    let mut df_depth = residue_depth_df(&table, &depth)?;
    info!("Net interaction energy against depth\n{df_depth}");
    write_df_to_file(&mut df_depth, &output_file, args.output_format)?;
    info!(
        "Results saved to {}",
        output_file
            .with_extension(args.output_format.to_string())
            .display()
    );
    Ok(())
}
