//! Reader for CSL processor test-suite fixtures.
//!
//! A fixture is a plain text file made of named blocks:
//!
//! ```text
//! >>===== MODE =====>>
//! citation
//! <<===== MODE =====<<
//! ```
//!
//! Text outside of blocks is ignored. The block contents are kept verbatim,
//! one `\n`-terminated line per source line.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use log::{debug, trace};

use crate::validate::{ValidationIssue, ValidationMode};
use crate::{Error, Result};

/// Opens a block; the block name follows.
pub const START_MARKER: &str = ">>=====";
/// Optional decoration after the block name of a start marker.
pub const START_MARKER_CLOSE: &str = "=====>>";
/// Closes the current block.
pub const END_MARKER: &str = "<<=====";
/// Longest line accepted by default, in bytes.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Which output the fixture exercises.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FixtureMode {
    /// Render citations.
    #[default]
    Citation,
    /// Render a bibliography.
    Bibliography,
}

/// A parsed test-suite fixture.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct Fixture {
    /// Which output the fixture exercises.
    pub mode: FixtureMode,
    /// The expected output.
    pub result: String,
    /// The CSL style source.
    pub csl: String,
    /// The input items as CSL-JSON.
    pub input: String,
    /// Which items go into the bibliography.
    pub bibentries: Option<String>,
    /// Bibliography selection criteria.
    pub bibsection: Option<String>,
    /// Cite items of the citations to render.
    pub citation_items: Option<String>,
    /// Citations to render, with their note positions.
    pub citations: Option<String>,
}

/// Options for reading fixtures.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FixtureOptions {
    /// In strict mode unknown block names are an error.
    pub validation: ValidationMode,
    /// Lines longer than this many bytes fail the read.
    pub max_line_length: usize,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        Self {
            validation: ValidationMode::default(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl FixtureOptions {
    /// Reject unknown block names.
    pub fn strict(mut self) -> Self {
        self.validation = ValidationMode::Strict;
        self
    }

    /// Set the longest accepted line, in bytes.
    pub fn max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }
}

/// Read a fixture file with the default options.
pub fn read_fixture(path: impl AsRef<Path>) -> Result<Fixture> {
    Fixture::from_path(path)
}

/// The name of a fixture block.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum BlockKind {
    /// `MODE`
    Mode,
    /// `RESULT`
    Result,
    /// `CSL`
    Csl,
    /// `INPUT`
    Input,
    /// `BIBENTRIES`
    BibEntries,
    /// `BIBSECTION`
    BibSection,
    /// `CITATION-ITEMS`
    CitationItems,
    /// `CITATIONS`
    Citations,
    /// Any other name.
    Unrecognized(String),
}

impl BlockKind {
    /// Classify a block name. Names are case-sensitive.
    pub fn from_name(name: &str) -> Self {
        match name {
            "MODE" => Self::Mode,
            "RESULT" => Self::Result,
            "CSL" => Self::Csl,
            "INPUT" => Self::Input,
            "BIBENTRIES" => Self::BibEntries,
            "BIBSECTION" => Self::BibSection,
            "CITATION-ITEMS" => Self::CitationItems,
            "CITATIONS" => Self::Citations,
            other => Self::Unrecognized(other.to_owned()),
        }
    }

    /// The block name as written in a fixture.
    pub fn name(&self) -> &str {
        match self {
            Self::Mode => "MODE",
            Self::Result => "RESULT",
            Self::Csl => "CSL",
            Self::Input => "INPUT",
            Self::BibEntries => "BIBENTRIES",
            Self::BibSection => "BIBSECTION",
            Self::CitationItems => "CITATION-ITEMS",
            Self::Citations => "CITATIONS",
            Self::Unrecognized(name) => name,
        }
    }
}

enum ScanState {
    Outside,
    InBlock(BlockKind),
}

/// Accumulates block contents while scanning.
#[derive(Default)]
struct Builder {
    fixture: Fixture,
    mode: String,
}

impl Builder {
    fn open(&mut self, kind: &BlockKind) {
        let slot = match kind {
            BlockKind::BibEntries => &mut self.fixture.bibentries,
            BlockKind::BibSection => &mut self.fixture.bibsection,
            BlockKind::CitationItems => &mut self.fixture.citation_items,
            BlockKind::Citations => &mut self.fixture.citations,
            _ => return,
        };
        slot.get_or_insert_with(String::new);
    }

    fn buffer(&mut self, kind: &BlockKind) -> Option<&mut String> {
        Some(match kind {
            BlockKind::Mode => &mut self.mode,
            BlockKind::Result => &mut self.fixture.result,
            BlockKind::Csl => &mut self.fixture.csl,
            BlockKind::Input => &mut self.fixture.input,
            BlockKind::BibEntries => self.fixture.bibentries.get_or_insert_with(String::new),
            BlockKind::BibSection => self.fixture.bibsection.get_or_insert_with(String::new),
            BlockKind::CitationItems => {
                self.fixture.citation_items.get_or_insert_with(String::new)
            }
            BlockKind::Citations => self.fixture.citations.get_or_insert_with(String::new),
            BlockKind::Unrecognized(_) => return None,
        })
    }

    fn finish(mut self) -> Fixture {
        if self.mode.trim() == "bibliography" {
            self.fixture.mode = FixtureMode::Bibliography;
        }
        self.fixture
    }
}

impl Fixture {
    /// Read a fixture file with the default options.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_path_with(path, FixtureOptions::default())
    }

    /// Read a fixture file.
    pub fn from_path_with(path: impl AsRef<Path>, options: FixtureOptions) -> Result<Self> {
        let path = path.as_ref();
        let not_found = |source| Error::NotFound {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(not_found)?;
        if file.metadata().map_err(not_found)?.is_dir() {
            return Err(not_found(io::Error::new(
                io::ErrorKind::IsADirectory,
                "is a directory",
            )));
        }
        let fixture = Self::from_reader(BufReader::new(file), options)?;
        debug!("read fixture {} ({:?})", path.display(), fixture.mode);
        Ok(fixture)
    }

    /// Read a fixture from any buffered reader.
    pub fn from_reader<R: BufRead>(mut reader: R, options: FixtureOptions) -> Result<Self> {
        let mut builder = Builder::default();
        let mut state = ScanState::Outside;
        let mut raw = String::new();
        let mut line_no = 0;
        // Room for the longest accepted line and its `\r\n`.
        let bound = u64::try_from(options.max_line_length)
            .unwrap_or(u64::MAX)
            .saturating_add(2);

        loop {
            raw.clear();
            line_no += 1;
            let read = reader
                .by_ref()
                .take(bound)
                .read_line(&mut raw)
                .map_err(|source| Error::Scan { line: line_no, source })?;
            if read == 0 {
                break;
            }

            let line = raw.strip_suffix('\n').unwrap_or(&raw);
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.len() > options.max_line_length {
                return Err(Error::Scan {
                    line: line_no,
                    source: io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("line is longer than {} bytes", options.max_line_length),
                    ),
                });
            }

            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix(START_MARKER) {
                let name = rest.strip_suffix(START_MARKER_CLOSE).unwrap_or(rest).trim();
                let kind = BlockKind::from_name(name);
                if let BlockKind::Unrecognized(name) = &kind {
                    if options.validation == ValidationMode::Strict {
                        return Err(Error::Validation(vec![ValidationIssue::new(
                            "fixture-unknown-block",
                            format!("line {line_no}"),
                            format!("unknown block `{name}`"),
                        )]));
                    }
                    trace!("skipping unknown fixture block {name:?} at line {line_no}");
                } else {
                    trace!("fixture block {} opens at line {line_no}", kind.name());
                }
                builder.open(&kind);
                state = ScanState::InBlock(kind);
                continue;
            }

            if trimmed.starts_with(END_MARKER) {
                state = ScanState::Outside;
                continue;
            }

            if let ScanState::InBlock(kind) = &state {
                if let Some(buffer) = builder.buffer(kind) {
                    buffer.push_str(line);
                    buffer.push('\n');
                }
            }
        }

        if let ScanState::InBlock(kind) = &state {
            trace!("fixture block {} is not closed", kind.name());
        }
        Ok(builder.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Result<Fixture> {
        Fixture::from_reader(text.as_bytes(), FixtureOptions::default())
    }

    #[test]
    fn blocks_are_collected() {
        let fixture = read(
            "# comment outside\n\
             >>===== MODE =====>>\n\
             bibliography\n\
             <<===== MODE =====<<\n\
             \n\
             >>===== RESULT =====>>\n\
             <div>Doe</div>\n\
             \n\
             \x20 indented\n\
             <<===== RESULT =====<<\n",
        )
        .unwrap();

        assert_eq!(fixture.mode, FixtureMode::Bibliography);
        assert_eq!(fixture.result, "<div>Doe</div>\n\n  indented\n");
        assert_eq!(fixture.csl, "");
        assert_eq!(fixture.bibentries, None);
    }

    #[test]
    fn start_marker_switches_blocks() {
        let fixture = read(
            ">>===== RESULT\r\n\
             a\r\n\
             >>===== CITATIONS =====>>\r\n\
             b\r\n",
        )
        .unwrap();

        assert_eq!(fixture.result, "a\n");
        assert_eq!(fixture.citations.as_deref(), Some("b\n"));
        assert_eq!(fixture.mode, FixtureMode::Citation);
    }

    #[test]
    fn empty_optional_block_is_present() {
        let fixture = read(">>===== BIBSECTION =====>>\n<<===== BIBSECTION =====<<\n").unwrap();
        assert_eq!(fixture.bibsection.as_deref(), Some(""));
        assert_eq!(fixture.citation_items, None);
    }

    #[test]
    fn block_names() {
        for name in [
            "MODE",
            "RESULT",
            "CSL",
            "INPUT",
            "BIBENTRIES",
            "BIBSECTION",
            "CITATION-ITEMS",
            "CITATIONS",
        ] {
            let kind = BlockKind::from_name(name);
            assert!(!matches!(kind, BlockKind::Unrecognized(_)));
            assert_eq!(kind.name(), name);
        }
        assert_eq!(BlockKind::from_name("mode"), BlockKind::Unrecognized("mode".into()));
    }

    #[test]
    fn line_limit() {
        let text = format!(">>===== INPUT =====>>\n{}\n", "x".repeat(100));
        let options = FixtureOptions::default().max_line_length(64);
        match Fixture::from_reader(text.as_bytes(), options) {
            Err(Error::Scan { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected scan error, got {other:?}"),
        }
        assert!(Fixture::from_reader(text.as_bytes(), FixtureOptions::default()).is_ok());
    }

    #[test]
    fn long_line_is_not_buffered() {
        let header = ">>===== INPUT =====>>\n";
        let text = format!("{header}{}\n", "x".repeat(10_000));
        let mut cursor = io::Cursor::new(text.as_bytes());
        let options = FixtureOptions::default().max_line_length(64);

        assert!(matches!(
            Fixture::from_reader(&mut cursor, options),
            Err(Error::Scan { line: 2, .. })
        ));
        assert_eq!(cursor.position(), (header.len() + 66) as u64);
    }

    #[test]
    fn line_at_the_limit() {
        let line = "x".repeat(64);
        let options = FixtureOptions::default().max_line_length(64);
        let text = format!(">>===== INPUT =====>>\r\n{line}\r\n");
        let fixture = Fixture::from_reader(text.as_bytes(), options).unwrap();
        assert_eq!(fixture.input, format!("{line}\n"));
    }

    #[test]
    fn invalid_utf8_is_a_scan_error() {
        let bytes: &[u8] = b">>===== RESULT =====>>\n\xff\xfe\n";
        assert!(matches!(
            Fixture::from_reader(bytes, FixtureOptions::default()),
            Err(Error::Scan { line: 2, .. })
        ));
    }
}
