use crate::IoError;
use csv::{ReaderBuilder, StringRecord, Trim};
use ndarray::{Array1, Array2};
use std::io::Read;

/// Reads a labelled dataset from a CSV file
///
/// See `parse_csv_xy` for the expected layout.
///
/// # Parameters
///
/// * `path` - Path of the CSV file
///
/// # Returns
///
/// - `Ok((Array2<f64>, Array1<usize>))` - Features with shape (n_samples, n_features) and the class label of each sample
/// - `Err(IoError::StdIoError)` - If the file cannot be opened or read
/// - `Err(IoError::ParseError)` - If the contents are malformed
pub fn read_csv_xy(path: &str) -> Result<(Array2<f64>, Array1<usize>), IoError> {
    let reader = IoError::load_in_buf_reader(path)?;
    parse_csv_xy(reader)
}

/// Parses a labelled dataset from CSV text
///
/// The first record is a header and is skipped. Every following record holds the class
/// label in the first column and the numeric features in the remaining columns. Cells may
/// be quoted and surrounding whitespace is ignored. Empty lines are skipped. All rows must
/// have the same number of columns as the first data row.
///
/// # Parameters
///
/// * `reader` - Source of CSV text
///
/// # Returns
///
/// - `Ok((Array2<f64>, Array1<usize>))` - Features with shape (n_samples, n_features) and the class label of each sample
/// - `Err(IoError::StdIoError)` - If reading fails
/// - `Err(IoError::ParseError)` - If a cell is not a number, a label is not a non-negative
///   integer, a row has the wrong number of columns, or there are no data rows
///
/// # Example
/// ```rust
/// use flexnn::utility::parse_csv_xy;
///
/// let csv = "label,pixel0,pixel1\n1,0,255\n\"0\",\"128\",64\n";
/// let (x, y) = parse_csv_xy(csv.as_bytes()).unwrap();
/// assert_eq!(x.shape(), &[2, 2]);
/// assert_eq!(y.to_vec(), vec![1, 0]);
/// ```
pub fn parse_csv_xy<R: Read>(reader: R) -> Result<(Array2<f64>, Array1<usize>), IoError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut n_columns = 0;
    let mut features = Vec::new();
    let mut labels = Vec::new();
    let mut record = StringRecord::new();

    while csv_reader.read_record(&mut record)? {
        let line_number = record.position().map_or(0, |position| position.line());

        // Whitespace-only line
        if record.iter().all(str::is_empty) {
            continue;
        }

        if n_columns == 0 {
            if record.len() < 2 {
                return Err(IoError::ParseError(format!(
                    "Line {}: expected a label and at least one feature column",
                    line_number
                )));
            }
            n_columns = record.len();
        } else if record.len() != n_columns {
            return Err(IoError::ParseError(format!(
                "Line {}: expected {} columns, found {}",
                line_number,
                n_columns,
                record.len()
            )));
        }

        labels.push(parse_label(&record[0], line_number)?);
        for cell in record.iter().skip(1) {
            let value = cell.parse::<f64>().map_err(|e| {
                IoError::ParseError(format!(
                    "Line {}: invalid number '{}': {}",
                    line_number, cell, e
                ))
            })?;
            features.push(value);
        }
    }

    if labels.is_empty() {
        return Err(IoError::ParseError("CSV contains no data rows".to_string()));
    }

    let x = Array2::from_shape_vec((labels.len(), n_columns - 1), features)
        .map_err(|e| IoError::ParseError(format!("Failed to build feature matrix: {}", e)))?;

    Ok((x, Array1::from_vec(labels)))
}

/// Parses a class label cell, accepting integral floats such as `3.0`
fn parse_label(cell: &str, line_number: u64) -> Result<usize, IoError> {
    let value = cell.parse::<f64>().map_err(|e| {
        IoError::ParseError(format!(
            "Line {}: invalid label '{}': {}",
            line_number, cell, e
        ))
    })?;

    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(IoError::ParseError(format!(
            "Line {}: label must be a non-negative integer, got '{}'",
            line_number, cell
        )));
    }

    // `as` would saturate at usize::MAX
    if value >= usize::MAX as f64 {
        return Err(IoError::ParseError(format!(
            "Line {}: label '{}' is too large",
            line_number, cell
        )));
    }

    Ok(value as usize)
}
