use super::{prepare_output_dir, report_error, InputArgs};
use clap::Parser;
use pairdiff::{
    analyze, buried_hbonds, buried_to_df, load_depth, write_df_to_file, DataFrameFileType,
    ProgressReporter, Result,
};
use std::path::PathBuf;
use tracing::{info, trace, warn};

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    #[command(flatten)]
    input: InputArgs,

    /// CSV file with `resi` and `depth` columns
    #[arg(short, long)]
    depth: PathBuf,

    /// Residues deeper than this are considered buried
    #[arg(long, default_value_t = 4.0)]
    threshold: f64,

    /// Report gained hydrogen bonds (types E and F) instead of lost ones (C and D)
    #[arg(long, default_value_t = false)]
    gained: bool,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Name of the output file
    #[arg(short = 'f', long = "filename", default_value_t = String::from("buried_hbonds"))]
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
    let input = args.input.load()?;
    let depth = load_depth(&args.depth)?;
    let report = analyze(&input, &ProgressReporter::new())?;

    let bonds = buried_hbonds(&report, &depth, args.threshold, !args.gained)?;
    if bonds.is_empty() {
        warn!("No hydrogen bond change involves a residue deeper than {}", args.threshold);
    }

    let output_path = prepare_output_dir(&args.output)?;
    let output_file = output_path.join(&args.filename);
    let mut df_buried = buried_to_df(&bonds)?;
    info!("Buried hydrogen bond changes\n{df_buried}");
    write_df_to_file(&mut df_buried, &output_file, args.output_format)?;
    info!(
        "Results saved to {}",
        output_file.with_extension(args.output_format.to_string()).display()
    );
    Ok(())
}
