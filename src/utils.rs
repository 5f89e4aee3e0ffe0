use crate::error::{PairdiffError, Result};
use crate::mutations::MutationSet;
use crate::residues::ResidueExt;
use crate::table::{parse_position, positions, EnergyTable};
use pdbtbx::*;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Value of `resi2` for one-body rows that have no interaction partner.
pub const MISSING_PARTNER: &str = "--";

/// Columns of the breakdown output that are dropped on conversion.
const OUTFILE_DROPPED: [&str; 3] = ["SCORE:", "pose_id", "description"];

/// Run `op` on a dedicated rayon pool of `num_threads` threads (0 for all cores).
pub fn run_with_threads<T: Send>(num_threads: usize, op: impl FnOnce() -> T + Send) -> T {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
    {
        Ok(pool) => pool.install(op),
        Err(e) => {
            warn!("Failed to build a thread pool ({e}), using the global pool");
            op()
        }
    }
}

/// Open an atomic data file with [`pdbtbx`] and remove non-amino-acid residues.
pub fn load_structure(input_file: &str) -> Result<(PDB, Vec<PDBError>)> {
    let (mut pdb, errors) = pdbtbx::ReadOptions::default()
        .set_only_atomic_coords(true)
        .set_level(pdbtbx::StrictnessLevel::Loose)
        .read(input_file)
        .map_err(|errors| PairdiffError::Structure {
            path: input_file.to_string(),
            message: errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        })?;

    // Remove waters, ligands and ions
    pdb.remove_residues_by(|res| res.resn().is_none());

    Ok((pdb, errors))
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Drop the rows whose `resi2` is missing or the [`MISSING_PARTNER`] sentinel.
pub fn drop_missing_partners(df: &DataFrame, table: &str) -> Result<DataFrame> {
    let partner = df
        .column("resi2")
        .map_err(|_| PairdiffError::MissingColumn {
            table: table.to_string(),
            column: "resi2".to_string(),
        })?
        .cast(&DataType::String)?;
    let mask: BooleanChunked = partner
        .str()?
        .into_iter()
        .map(|v| matches!(v.map(str::trim), Some(s) if !s.is_empty() && s != MISSING_PARTNER))
        .collect();
    Ok(df.filter(&mask)?)
}

/// Load an energy table from a CSV file, or from the raw breakdown output if
/// the file has an `.out` extension.
///
/// One-body rows without a partner residue are dropped before the residue
/// positions are read as integers.
pub fn load_energy_table(path: &Path, name: &str) -> Result<EnergyTable> {
    let raw = match path.extension().and_then(|e| e.to_str()) {
        Some("out") => convert_outfile(&std::fs::read_to_string(path)?)?,
        _ => read_csv(path)?,
    };
    let df = drop_missing_partners(&raw, name)?;
    if df.height() < raw.height() {
        debug!(
            "Dropped {} row(s) without a partner residue from '{name}'",
            raw.height() - df.height()
        );
    }
    let table = EnergyTable::from_df(&df, name)?;
    debug!(
        "Loaded {} pairwise interactions with {} energy terms into '{name}'",
        table.len(),
        table.term_names().len()
    );
    Ok(table)
}

/// Load the mutated positions from a CSV file with a `Position` column.
pub fn load_mutations(path: &Path) -> Result<MutationSet> {
    MutationSet::from_df(&read_csv(path)?)
}

/// Load per-residue depths from a CSV file with `resi` and `depth` columns.
///
/// Files with a `.json` extension may instead hold a single object mapping
/// positions to depths, e.g. `{"1": 3.2, "2": 4.7}`.
pub fn load_depth(path: &Path) -> Result<BTreeMap<i64, f64>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => depth_from_json(path),
        _ => depth_from_df(&read_csv(path)?),
    }
}

fn depth_from_json(path: &Path) -> Result<BTreeMap<i64, f64>> {
    let file = std::fs::File::open(path)?;
    let df = JsonReader::new(file)
        .with_json_format(JsonFormat::Json)
        .finish()?;
    if df.column("resi").is_ok() {
        return depth_from_df(&df);
    }

    // One column per position, a single row of depths
    let mut depth = BTreeMap::new();
    for column in df.get_columns() {
        let name = column.name().as_str().trim();
        let position = parse_position(name).ok_or_else(|| PairdiffError::InvalidPosition {
            table: "depth".to_string(),
            column: "resi".to_string(),
            value: name.to_string(),
        })?;
        let value = column
            .cast(&DataType::Float64)?
            .f64()?
            .get(0)
            .ok_or_else(invalid_depth)?;
        depth.insert(position, value);
    }
    Ok(depth)
}

fn invalid_depth() -> PairdiffError {
    PairdiffError::InvalidTerm {
        table: "depth".to_string(),
        column: "depth".to_string(),
    }
}

/// Read a `resi` / `depth` table. Positions must be integers and every depth a number.
pub(crate) fn depth_from_df(df: &DataFrame) -> Result<BTreeMap<i64, f64>> {
    let missing = |column: &str| PairdiffError::MissingColumn {
        table: "depth".to_string(),
        column: column.to_string(),
    };
    let resi = positions(df.column("resi").map_err(|_| missing("resi"))?, "depth", "resi")?;
    let depth = df
        .column("depth")
        .map_err(|_| missing("depth"))?
        .cast(&DataType::Float64)?;
    let depth = depth
        .f64()?
        .into_iter()
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(invalid_depth)?;
    Ok(resi.into_iter().zip(depth).collect())
}

/// Convert the silent-file output of `residue_energy_breakdown` into a DataFrame.
///
/// Only the `SCORE:` lines are read. The first one is the header; the
/// `SCORE:`, `pose_id` and `description` columns are dropped. All values are
/// kept as strings and typed when the table is built.
pub fn convert_outfile(text: &str) -> Result<DataFrame> {
    let mut lines = text
        .lines()
        .filter(|l| l.trim_start().starts_with("SCORE:"))
        .map(|l| l.split_whitespace().collect::<Vec<&str>>());
    let header = lines
        .next()
        .ok_or_else(|| PairdiffError::MalformedOutfile("no SCORE: header line".to_string()))?;

    let mut values: Vec<Vec<String>> = vec![Vec::new(); header.len()];
    for (i, fields) in lines.enumerate() {
        if fields.len() != header.len() {
            return Err(PairdiffError::MalformedOutfile(format!(
                "line {} has {} fields, the header has {}",
                i + 2,
                fields.len(),
                header.len()
            )));
        }
        for (column, field) in values.iter_mut().zip(fields) {
            column.push(field.to_string());
        }
    }

    let columns: Vec<Column> = header
        .iter()
        .zip(values)
        .filter(|(name, _)| !OUTFILE_DROPPED.contains(*name))
        .map(|(name, column)| Series::new((*name).into(), column).into())
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Write a DataFrame to a file of the given type, replacing its extension.
pub fn write_df_to_file(
    df: &mut DataFrame,
    file_path: &Path,
    file_type: DataFrameFileType,
) -> Result<()> {
    let file_suffix = file_type.to_string();
    let mut file = std::fs::File::create(file_path.with_extension(file_suffix))?;
    match file_type {
        DataFrameFileType::Csv => {
            CsvWriter::new(&mut file).finish(df)?;
        }
        DataFrameFileType::Parquet => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
        DataFrameFileType::Json => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::Json)
                .finish(df)?;
        }
        DataFrameFileType::NDJson => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::JsonLines)
                .finish(df)?;
        }
    }
    Ok(())
}

/// File format for writing DataFrames.
#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum DataFrameFileType {
    /// Comma-separated values
    Csv,
    /// Parquet columnar storage
    Parquet,
    /// Standard JSON
    Json,
    /// Newline-delimited JSON
    NDJson,
}

impl std::fmt::Display for DataFrameFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DataFrameFileType::Csv => write!(f, "csv"),
            DataFrameFileType::Parquet => write!(f, "parquet"),
            DataFrameFileType::Json => write!(f, "json"),
            DataFrameFileType::NDJson => write!(f, "ndjson"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{HBOND_SC, TOTAL};

    fn test_data(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data").join(name)
    }

    #[test]
    fn loads_csv_and_drops_one_body_rows() {
        let table = load_energy_table(&test_data("energy_wild.csv"), "wild_type").unwrap();
        assert_eq!(table.len(), 4);
        assert!(table.rows().iter().all(|r| r.resi2 > 0));
        assert_eq!(table.rows()[0].restype1, "LYS");
        assert_eq!(table.rows()[0].pdbid1, "4A");
        assert_eq!(table.term_names().last().map(|s| s.as_str()), Some(TOTAL));
        let first = &table.rows()[0];
        assert!((table.value(first, HBOND_SC).unwrap() + 1.2).abs() < 1e-9);
    }

    #[test]
    fn loads_breakdown_outfile() {
        let table = load_energy_table(&test_data("energy_variant.out"), "variant").unwrap();
        let csv = load_energy_table(&test_data("energy_variant.csv"), "variant").unwrap();
        assert_eq!(table, csv);
    }

    #[test]
    fn outfile_with_ragged_lines_is_rejected() {
        let text = "SCORE: pose_id resi1 total description\nSCORE: x 1 0.5\n";
        assert!(matches!(
            convert_outfile(text),
            Err(PairdiffError::MalformedOutfile(_))
        ));
        assert!(convert_outfile("nothing here").is_err());
    }

    #[test]
    fn sentinel_rows_are_dropped() {
        let df = df!(
            "resi1" => ["1", "2", "3"],
            "resi2" => ["--", "5", ""],
        )
        .unwrap();
        let kept = drop_missing_partners(&df, "variant").unwrap();
        assert_eq!(kept.height(), 1);
    }

    #[test]
    fn loads_mutations_and_depth() {
        let mutations = load_mutations(&test_data("mutations.csv")).unwrap();
        assert_eq!(mutations.positions().collect::<Vec<_>>(), vec![3, 5]);

        let depth = load_depth(&test_data("depth_wild.csv")).unwrap();
        assert_eq!(depth.len(), 6);
        assert!((depth[&3] - 4.1).abs() < 1e-9);
    }

    #[test]
    fn depth_from_json_object_matches_csv() {
        let json = load_depth(&test_data("depth_wild.json")).unwrap();
        let csv = load_depth(&test_data("depth_wild.csv")).unwrap();
        assert_eq!(json.keys().collect::<Vec<_>>(), csv.keys().collect::<Vec<_>>());
        for (resi, depth) in &csv {
            assert!((json[resi] - depth).abs() < 1e-9);
        }
    }

    #[test]
    fn depth_positions_must_be_integers() {
        let df = df!("resi" => [1.0f64, 3.5], "depth" => [2.0, 4.0]).unwrap();
        let err = depth_from_df(&df).unwrap_err();
        assert!(matches!(
            err,
            PairdiffError::InvalidPosition { ref table, ref value, .. }
                if table == "depth" && value == "3.5"
        ));

        let df = df!("resi" => ["1", "abc"], "depth" => [2.0, 4.0]).unwrap();
        assert!(matches!(
            depth_from_df(&df),
            Err(PairdiffError::InvalidPosition { ref value, .. }) if value == "abc"
        ));

        let df = df!("resi" => [1i64, 2], "depth" => ["2.0", "deep"]).unwrap();
        assert!(matches!(
            depth_from_df(&df),
            Err(PairdiffError::InvalidTerm { .. })
        ));
    }

    #[test]
    fn writes_every_format() {
        let mut df = df!("a" => [1i64, 2], "b" => [0.5, -0.5]).unwrap();
        let dir = std::env::temp_dir().join(format!("pairdiff-write-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for file_type in [
            DataFrameFileType::Csv,
            DataFrameFileType::Parquet,
            DataFrameFileType::Json,
            DataFrameFileType::NDJson,
        ] {
            let path = dir.join("out");
            write_df_to_file(&mut df, &path, file_type).unwrap();
            assert!(path.with_extension(file_type.to_string()).exists());
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
