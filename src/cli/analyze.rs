use super::{prepare_output_dir, report_error, InputArgs};
use clap::Parser;
use pairdiff::{
    analyze, analyze_parallel, change_types_df, run_with_threads, write_df_to_file, AnalysisReport,
    DataFrameFileType, ProgressReporter, Result,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    #[command(flatten)]
    input: InputArgs,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Output file type
    #[arg(short = 't', long, default_value_t = DataFrameFileType::Csv)]
    output_format: DataFrameFileType,

    /// Run the seven classifications in parallel
    #[arg(short, long, default_value_t = false)]
    parallel: bool,

    /// Number of threads to use for parallel processing (0 for all cores)
    #[arg(short = 'j', long = "num-threads", default_value_t = 0)]
    num_threads: usize,

    /// Only write the summary tables, not the per change type tables
    #[arg(long = "summary-only", default_value_t = false)]
    summary_only: bool,
}

pub(crate) fn run(args: &Args) {
    trace!("{args:?}");
    if let Err(e) = execute(args) {
        report_error(&e);
    }
}

fn execute(args: &Args) -> Result<()> {
    let input = args.input.load()?;
    let output_path = prepare_output_dir(&args.output)?;
    info!(
        "Net interaction energy: wild-type {:.3}, variant {:.3}",
        input.wild_type.net_energy(),
        input.variant.net_energy()
    );

    let progress = ProgressReporter::with_callback(Box::new(|p| debug!("Analysis {p}% done")));
    let report = match args.parallel {
        true => run_with_threads(args.num_threads, || {
            debug!("Using {} thread(s)", rayon::current_num_threads());
            analyze_parallel(&input, &progress)
        })?,
        false => analyze(&input, &progress)?,
    };

    let mut df_overview = report.summary().overview_df()?;
    info!("Interaction changes\n{df_overview}");
    write_df_to_file(
        &mut df_overview,
        &output_path.join("overview"),
        args.output_format,
    )?;
    write_df_to_file(
        &mut report.summary().to_df()?,
        &output_path.join("summary"),
        args.output_format,
    )?;
    write_df_to_file(
        &mut input.mutations.to_df()?,
        &output_path.join("mutations"),
        args.output_format,
    )?;

    write_df_to_file(
        &mut change_types_df()?,
        &output_path.join("change_types"),
        args.output_format,
    )?;

    if !args.summary_only {
        write_change_tables(&report, &output_path, args.output_format)?;
    }
    info!("Results saved to {}", output_path.display());
    Ok(())
}

/// One file per non-empty change type of every classification, named `<kind>_<change>`.
fn write_change_tables(
    report: &AnalysisReport,
    output_path: &Path,
    file_type: DataFrameFileType,
) -> Result<()> {
    for (kind, classification) in report.iter() {
        for (change, table) in classification.iter() {
            if table.is_empty() {
                continue;
            }
            let file_name = format!("{}_{}", kind.key(), change.key());
            write_df_to_file(&mut table.to_df()?, &output_path.join(&file_name), file_type)?;
            debug!("Wrote {} row(s) to {file_name}", table.len());
        }
    }
    Ok(())
}
