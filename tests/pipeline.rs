use tempfile::tempdir;
use vblot::convert::convert_file;
use vblot::distances::calc_distances;
use vblot::finalize::finalize_distances;
use vblot::numeric::assert_float_eq;
use vblot::prelude::*;

/// Cut sites and integration sites through to blot positions.
#[test]
fn test_distances_to_blot_positions() {
    let dir = tempdir().unwrap();
    let path = |name: &str| dir.path().join(name).to_str().unwrap().to_string();

    calc_distances(
        "tests/data/cut_sites.csv",
        "tests/data/integration_sites.csv",
        &path("distances.csv"),
    )
    .unwrap();
    finalize_distances(
        "tests/data/fragment_lengths.csv",
        "tests/data/directions.csv",
        &path("distances.csv"),
        &path("fragments.csv.gz"),
    )
    .unwrap();

    let curve = SizeCurve::from_csv("tests/data/size_position.csv").unwrap();
    convert_file(&path("fragments.csv.gz"), &curve, &path("positions.csv")).unwrap();

    let fragments = Table::from_csv(&path("fragments.csv.gz")).unwrap();
    let positions = Table::from_csv(&path("positions.csv")).unwrap();
    assert_eq!(positions.headers, fragments.headers);

    let col = positions.require_column("EcoRI_H").unwrap();
    // IS1's heavy EcoRI fragment is 5600 bp
    assert_eq!(fragments.rows[0][col], "5600");
    let position: f64 = positions.rows[0][col].parse().unwrap();
    assert_float_eq(position, curve.position_at(5600.0), 1e-9);
    assert_float_eq(curve.size_at(position).unwrap(), 5600.0, 1e-6);

    // missing fragments stay missing
    assert_eq!(positions.rows[2][col], "N/A");
}

#[test]
fn test_plot_requires_chromosome() {
    let err = EnzymeTable::from_csv("tests/data/enzyme_sizes_no_chrom.csv").unwrap_err();
    assert!(err.to_string().contains("Chromosome"));
}

#[test]
fn test_insufficient_reference_curve() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("curve.csv");
    std::fs::write(&path, "Size,Position\n1000,5\n").unwrap();
    let err = SizeCurve::from_csv(path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, BlotError::InsufficientReferenceData(1)));
}
