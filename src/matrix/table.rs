//! Row/column labelled delimited table, the cached form of a matrix.
//!
//! ```text
//! ,Nairobi,Nyeri,Meru
//! Nairobi,0,151,226
//! Nyeri,151,0,137
//! Meru,226,137,0
//! ```
//!
//! The diagonal is written as `0` and ignored on read. A missing edge is
//! an empty cell (`inf` is accepted too). Quoting follows RFC 4180 through
//! the `csv` crate, so names may contain the delimiter or quotes and are
//! kept exactly as written.

use super::distance::{DistanceMatrix, DistanceMatrixBuilder};
use super::options::MatrixOptions;
use crate::error::{Result, TspError};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Writes `matrix` as a labelled table.
pub fn write_table<W: Write>(matrix: &DistanceMatrix, writer: &mut W, delimiter: char) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter_byte(delimiter)?)
        .from_writer(writer);

    csv_writer.write_record(std::iter::once("").chain(matrix.names().iter().map(String::as_str)))?;

    let n = matrix.node_count();
    for i in 0..n {
        let mut record = Vec::with_capacity(n + 1);
        record.push(matrix.name(i).to_string());
        for j in 0..n {
            let cost = matrix.cost(i, j);
            record.push(if i == j {
                "0".to_string()
            } else if cost.is_finite() {
                cost.to_string()
            } else {
                String::new()
            });
        }
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Reads a labelled table. Rows may appear in any order but every column
/// name needs exactly one row, and every row must be as wide as the header.
pub fn read_table<R: Read>(reader: R, delimiter: char, options: MatrixOptions) -> Result<DistanceMatrix> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte(delimiter)?)
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.is_empty() {
        return Err(TspError::invalid_input("empty table"));
    }
    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let n = names.len();
    let mut builder = DistanceMatrixBuilder::new(&names)?.with_options(options);
    let mut seen = vec![false; n];

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let row_name = record.get(0).unwrap_or_default();
        let i = names
            .iter()
            .position(|name| name == row_name)
            .ok_or_else(|| TspError::UnknownNode(row_name.to_string()))?;
        if seen[i] {
            return Err(TspError::invalid_input(format!(
                "line {line}: duplicate row '{row_name}'"
            )));
        }
        seen[i] = true;

        for (j, cell) in record.iter().skip(1).enumerate() {
            if i == j {
                continue;
            }
            let value = parse_cell(cell)
                .ok_or_else(|| TspError::invalid_input(format!("line {line}: bad distance '{cell}'")))?;
            builder.edge_by_index(i, j, value)?;
        }
    }

    if let Some(missing) = seen.iter().position(|&s| !s) {
        return Err(TspError::invalid_input(format!(
            "no row for column '{}'",
            names[missing]
        )));
    }

    builder.build()
}

impl DistanceMatrix {
    /// Writes the matrix to a comma-delimited file.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        write_table(self, &mut file, ',')
    }

    /// Reads a comma-delimited file written by [`save_csv`](Self::save_csv)
    /// or by a spreadsheet or dataframe export of the same shape.
    pub fn load_csv(path: impl AsRef<Path>, options: MatrixOptions) -> Result<Self> {
        read_table(File::open(path)?, ',', options)
    }
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    u8::try_from(delimiter)
        .ok()
        .filter(|&b| b.is_ascii() && !matches!(b, b'"' | b'\n' | b'\r'))
        .ok_or_else(|| TspError::invalid_input(format!("unusable table delimiter '{delimiter}'")))
}

fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("inf") || cell.eq_ignore_ascii_case("infinity") {
        return Some(f64::INFINITY);
    }
    cell.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::SymmetryPolicy;

    const TABLE: &str = ",Nairobi,Nyeri,Meru\n\
                         Nairobi,0,151,226\n\
                         Nyeri,151,0,137\n\
                         Meru,226,137,0\n";

    #[test]
    fn test_read_table() {
        let m = read_table(TABLE.as_bytes(), ',', MatrixOptions::default()).unwrap();
        assert_eq!(m.node_count(), 3);
        assert_eq!(m.cost(m.index_of("Meru").unwrap(), 1), 137.0);
        assert!(m.cost(0, 0).is_infinite());
    }

    #[test]
    fn test_write_then_read_keeps_missing_edges() {
        let table = ",A,B,C\nA,0,2.5,\nB,2.5,0,3\nC,,3,0\n";
        let m = read_table(table.as_bytes(), ',', MatrixOptions::default()).unwrap();
        assert!(!m.has_edge(0, 2));

        let mut out = Vec::new();
        write_table(&m, &mut out, ',').unwrap();
        let written = String::from_utf8(out).unwrap();
        assert_eq!(written, table);

        let again = read_table(written.as_bytes(), ',', MatrixOptions::default()).unwrap();
        assert_eq!(again, m);
    }

    #[test]
    fn test_quoted_and_shuffled_rows() {
        let table = "\"\";\"A\";\"B\"\n\"B\";4;0\n\"A\";0;inf\n";
        let options = MatrixOptions::default().with_symmetry(SymmetryPolicy::Shorter);
        let m = read_table(table.as_bytes(), ';', options).unwrap();
        assert_eq!(m.names(), &["A", "B"]);
        assert_eq!(m.cost(0, 1), 4.0);
    }

    #[test]
    fn test_reads_quoted_name_containing_delimiter() {
        let table = ",\"Nairobi, KE\",Nyeri\n\"Nairobi, KE\",0.0,151.0\nNyeri,151.0,0.0\n";
        let m = read_table(table.as_bytes(), ',', MatrixOptions::default()).unwrap();
        assert_eq!(m.names(), &["Nairobi, KE", "Nyeri"]);
        assert_eq!(m.edge_by_name("Nairobi, KE", "Nyeri").unwrap(), 151.0);
    }

    #[test]
    fn test_awkward_names_round_trip() {
        let names = ["Nairobi, KE", "Mama \"Ngina\" Drive", " Meru "];
        let rows = vec![
            vec![0.0, 12.0, 226.0],
            vec![12.0, 0.0, f64::INFINITY],
            vec![226.0, f64::INFINITY, 0.0],
        ];
        let m = DistanceMatrix::from_rows(&names, &rows, MatrixOptions::default()).unwrap();

        let mut out = Vec::new();
        write_table(&m, &mut out, ',').unwrap();
        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("\"Nairobi, KE\""));
        assert!(written.contains("\"Mama \"\"Ngina\"\" Drive\""));

        let loaded = read_table(written.as_bytes(), ',', MatrixOptions::default()).unwrap();
        assert_eq!(loaded, m);
        assert_eq!(loaded.name(2), " Meru ");
        assert!(!loaded.has_edge(1, 2));
    }

    #[test]
    fn test_rejects_malformed_tables() {
        let empty: &[u8] = b"";
        assert!(read_table(empty, ',', MatrixOptions::default()).is_err());

        let bad_value = ",A,B\nA,0,x\nB,1,0\n";
        assert!(matches!(
            read_table(bad_value.as_bytes(), ',', MatrixOptions::default()),
            Err(TspError::InvalidInput(_))
        ));

        let short_row = ",A,B\nA,0\nB,1,0\n";
        assert!(matches!(
            read_table(short_row.as_bytes(), ',', MatrixOptions::default()),
            Err(TspError::Csv(_))
        ));

        let missing_row = ",A,B\nA,0,1\n";
        assert!(read_table(missing_row.as_bytes(), ',', MatrixOptions::default()).is_err());

        let duplicate_row = ",A,B\nA,0,1\nA,0,1\n";
        assert!(matches!(
            read_table(duplicate_row.as_bytes(), ',', MatrixOptions::default()),
            Err(TspError::InvalidInput(_))
        ));

        let unknown_row = ",A,B\nA,0,1\nQ,1,0\n";
        assert!(matches!(
            read_table(unknown_row.as_bytes(), ',', MatrixOptions::default()),
            Err(TspError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        let m = read_table(TABLE.as_bytes(), ',', MatrixOptions::default()).unwrap();
        let mut out = Vec::new();
        assert!(write_table(&m, &mut out, '→').is_err());
        assert!(read_table(TABLE.as_bytes(), '"', MatrixOptions::default()).is_err());
    }
}
