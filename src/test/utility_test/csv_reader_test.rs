use super::*;
use std::io::Write;

#[test]
fn test_parse_csv_xy_basic() {
    let csv = "label,a,b,c\n2,0,128,255\n0,1.5,-2,3e2\n";

    let (x, y) = parse_csv_xy(csv.as_bytes()).unwrap();

    assert_eq!(x, array![[0.0, 128.0, 255.0], [1.5, -2.0, 300.0]]);
    assert_eq!(y, array![2, 0]);
}

#[test]
fn test_parse_csv_xy_skips_blank_lines_and_spaces() {
    let csv = "label,a,b\n\n1, 2, 3\n  \n0,4 ,5\n\n";

    let (x, y) = parse_csv_xy(csv.as_bytes()).unwrap();

    assert_eq!(x, array![[2.0, 3.0], [4.0, 5.0]]);
    assert_eq!(y, array![1, 0]);
}

#[test]
fn test_parse_csv_xy_quoted_cells() {
    let csv = "\"label\",\"a\",\"b\"\n\"1\",\"2\",\"3\"\n0,\" 4.5 \",6\n";

    let (x, y) = parse_csv_xy(csv.as_bytes()).unwrap();

    assert_eq!(x, array![[2.0, 3.0], [4.5, 6.0]]);
    assert_eq!(y, array![1, 0]);
}

#[test]
fn test_parse_csv_xy_integral_float_labels() {
    let csv = "label,a\n2.0,1\n0.0,2\n";

    let (_, y) = parse_csv_xy(csv.as_bytes()).unwrap();

    assert_eq!(y, array![2, 0]);
}

#[test]
fn test_parse_csv_xy_rejects_bad_labels() {
    for csv in [
        "label,a\n1.5,1\n",
        "label,a\n-1,1\n",
        "label,a\ncat,1\n",
        "label,a\ninf,1\n",
        "label,a\n1e30,1\n",
        "label,a\n18446744073709551616,1\n",
    ] {
        assert!(
            matches!(parse_csv_xy(csv.as_bytes()), Err(IoError::ParseError(_))),
            "expected a parse error for {:?}",
            csv
        );
    }
}

#[test]
fn test_parse_csv_xy_malformed_rows() {
    // Ragged row
    assert!(matches!(
        parse_csv_xy("label,a,b\n1,2,3\n0,4\n".as_bytes()),
        Err(IoError::ParseError(_))
    ));
    // Non-numeric feature
    assert!(matches!(
        parse_csv_xy("label,a,b\n1,2,x\n".as_bytes()),
        Err(IoError::ParseError(_))
    ));
    // Empty cell
    assert!(matches!(
        parse_csv_xy("label,a,b\n1,,3\n".as_bytes()),
        Err(IoError::ParseError(_))
    ));
    // Label without features
    assert!(matches!(
        parse_csv_xy("label\n1\n".as_bytes()),
        Err(IoError::ParseError(_))
    ));
}

#[test]
fn test_parse_csv_xy_no_data_rows() {
    assert!(matches!(
        parse_csv_xy("label,a,b\n".as_bytes()),
        Err(IoError::ParseError(_))
    ));
    assert!(matches!(
        parse_csv_xy("".as_bytes()),
        Err(IoError::ParseError(_))
    ));
}

#[test]
fn test_read_csv_xy_from_file() {
    let path = std::env::temp_dir().join(format!("flexnn_csv_reader_{}.csv", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "label,pixel0,pixel1").unwrap();
        writeln!(file, "1,0,255").unwrap();
        writeln!(file, "0,51,102").unwrap();
    }

    let result = read_csv_xy(path.to_str().unwrap());
    std::fs::remove_file(&path).unwrap();

    let (x, y) = result.unwrap();
    assert_eq!(x.dim(), (2, 2));
    assert_eq!(x[[1, 1]], 102.0);
    assert_eq!(y, array![1, 0]);
}

#[test]
fn test_read_csv_xy_missing_file() {
    let result = read_csv_xy("definitely/not/a/real/path.csv");

    assert!(matches!(result, Err(IoError::StdIoError(_))));
}
