use std::fs;
use std::path::{Path, PathBuf};

use cslstyle::fixture::DEFAULT_MAX_LINE_LENGTH;
use cslstyle::{
    Error, Fixture, FixtureMode, FixtureOptions, LoadOptions, Style, read_fixture,
};

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

#[test]
fn read_data_fixture() {
    let fixture = read_fixture(data("bibliography_simple.txt")).unwrap();

    assert_eq!(fixture.mode, FixtureMode::Bibliography);
    assert_eq!(
        fixture.result,
        "<div class=\"csl-bib-body\">\n  \
         <div class=\"csl-entry\">Doe, J. (1965). His anonymous life</div>\n\
         </div>\n"
    );
    assert!(fixture.input.starts_with("[\n    {\n"));
    assert!(fixture.input.ends_with("]\n"));
    assert_eq!(fixture.bibentries, None);
    assert_eq!(fixture.citations, None);

    let style = Style::from_xml_with(&fixture.csl, LoadOptions::default().strict()).unwrap();
    assert_eq!(style.info.id, "bibliography-simple");
    assert!(style.bibliography.is_some());
}

#[test]
fn strict_rejects_unknown_blocks() {
    let path = data("bibliography_simple.txt");
    match Fixture::from_path_with(&path, FixtureOptions::default().strict()) {
        Err(Error::Validation(issues)) => {
            assert_eq!(issues[0].code, "fixture-unknown-block");
            assert!(issues[0].message.contains("VERSION"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn scratch_fixtures() {
    let dir = tempfile::tempdir().unwrap();

    let path = dir.path().join("empty-result.txt");
    fs::write(
        &path,
        ">>===== MODE =====>>\ncitation\n<<===== MODE =====<<\n\
         >>===== RESULT =====>>\n<<===== RESULT =====<<\n\
         >>===== CITATION-ITEMS =====>>\n[[{\"id\": \"ITEM-1\"}]]\n<<===== CITATION-ITEMS =====<<\n",
    )
    .unwrap();
    let fixture = read_fixture(&path).unwrap();
    assert_eq!(fixture.mode, FixtureMode::Citation);
    assert_eq!(fixture.result, "");
    assert_eq!(fixture.citation_items.as_deref(), Some("[[{\"id\": \"ITEM-1\"}]]\n"));

    let path = dir.path().join("unterminated.txt");
    fs::write(&path, ">>===== INPUT =====>>\n[]\n\n").unwrap();
    let fixture = read_fixture(&path).unwrap();
    assert_eq!(fixture.input, "[]\n\n");

    let path = dir.path().join("empty.txt");
    fs::write(&path, "").unwrap();
    assert_eq!(read_fixture(&path).unwrap(), Fixture::default());
}

#[test]
fn long_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("long.txt");
    let long = "x".repeat(DEFAULT_MAX_LINE_LENGTH + 1);
    fs::write(&path, format!("# header\n>>===== INPUT =====>>\n{long}\n")).unwrap();

    match read_fixture(&path) {
        Err(Error::Scan { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected scan error, got {other:?}"),
    }

    let options = FixtureOptions::default().max_line_length(DEFAULT_MAX_LINE_LENGTH * 2);
    let fixture = Fixture::from_path_with(&path, options).unwrap();
    assert_eq!(fixture.input.len(), long.len() + 1);
}

#[test]
fn directory_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(read_fixture(dir.path()), Err(Error::NotFound { .. })));
    assert!(matches!(
        cslstyle::load_style(dir.path()),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn missing_fixture() {
    assert!(matches!(
        read_fixture(data("no-such-fixture.txt")),
        Err(Error::NotFound { .. })
    ));
}
