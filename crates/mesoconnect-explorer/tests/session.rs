// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! Integration tests: explorer sessions over MAT-files on disk

use std::path::Path;

use mesoconnect_config::MesoconnectConfig;
use mesoconnect_explorer::{Explorer, ExplorerError, SessionEnd, PROMPT};
use mesoconnect_matfile::{CellArray, CharArray, MatArray, MatFileWriter, NumericArray};

fn write_fixtures(dir: &Path) {
    let abbrevs = ["RSPd", "VISp", "MOp", "ACA"];
    let names = [
        "Retrosplenial area, dorsal part",
        "Primary visual area",
        "Primary motor area",
        "Anterior cingulate area",
    ];
    let structures = MatArray::Cell(CellArray {
        dims: vec![abbrevs.len(), 2],
        cells: abbrevs
            .iter()
            .chain(&names)
            .map(|s| MatArray::Char(CharArray::from_text(s)))
            .collect(),
    });
    let mut writer = MatFileWriter::new().compressed(true);
    writer.add("structures", structures);
    writer.save(dir.join("allen_structures.mat")).unwrap();

    // Rows: RSPd, VISp, RSPd; columns: VISp, MOp, ACA, RSPd
    let mut writer = MatFileWriter::new().compressed(true);
    writer
        .add(
            "connections",
            MatArray::Numeric(NumericArray::from_rows(&[
                vec![0.35, 0.05, 0.6, 0.0],
                vec![0.0, 0.2, 0.1, 0.45],
                vec![0.5, 0.15, 0.25, 0.0],
            ])),
        )
        .add("input", MatArray::Cell(CellArray::column_of_strings(&["RSPd", "VISp", "RSPd"])))
        .add("outputs", MatArray::Cell(CellArray::row_of_strings(&["VISp", "MOp", "ACA", "RSPd"])));
    writer.save(dir.join("allen_normalized_projs.mat")).unwrap();
}

fn config(dir: &Path) -> MesoconnectConfig {
    let mut config = MesoconnectConfig::default();
    config.data.dir = dir.to_path_buf();
    config
}

fn session(config: &MesoconnectConfig, input: &str) -> String {
    let explorer = Explorer::from_config(config).unwrap();
    let mut out = Vec::new();
    explorer.run(input.as_bytes(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_interactive_session_outputs() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let mut config = config(dir.path());
    config.report.num_regions_listed = 2;

    let out = session(&config, "RSPd\nQ\n");
    assert!(out.contains("RSPd, VISp"));
    assert!(out.contains("you entered Retrosplenial area, dorsal part"));
    // Rank 1 of both injection sites, then rank 2
    assert!(out.contains(
        "OUTPUTS:\n0.60 \t Anterior cingulate area\n0.50 \t Primary visual area\n\
         0.35 \t Primary visual area\n0.25 \t Anterior cingulate area\n"
    ));
    assert_eq!(out.matches(PROMPT).count(), 2);
}

#[test]
fn test_interactive_session_inputs() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let mut config = config(dir.path());
    config.report.print_inputs = true;

    let out = session(&config, "VISp\n");
    assert!(out.contains("you entered Primary visual area\n\nINPUTS:\n0.50 \t Retrosplenial area, dorsal part\n"));
    assert!(!out.contains("OUTPUTS:"));
}

#[test]
fn test_unknown_region_then_quit() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let config = config(dir.path());

    let explorer = Explorer::from_config(&config).unwrap();
    let mut out = Vec::new();
    let summary = explorer
        .run_interactive("XYZ\nMOp\nQ\n".as_bytes(), &mut out)
        .unwrap();
    assert_eq!(summary.not_found, 2);
    assert_eq!(summary.queries, 0);
    assert_eq!(summary.end, SessionEnd::Quit);

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("Abbreviation not found: XYZ"));
    // MOp has a name but no injection row
    assert!(out.contains("Region not found: MOp"));
}

#[test]
fn test_single_query_mode() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let mut config = config(dir.path());
    config.session.interactive = false;
    config.report.num_regions_listed = 1;

    let out = session(&config, "");
    assert_eq!(
        out,
        "OUTPUTS:\n0.60 \t Anterior cingulate area\n0.50 \t Primary visual area\n"
    );
}

#[test]
fn test_missing_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let err = Explorer::from_config(&config(&dir.path().join("absent"))).unwrap_err();
    assert!(matches!(err, ExplorerError::Atlas(_)));
}
