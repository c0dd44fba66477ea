use std::path::Path;

use cslstyle::{
    CitationFormat, Condition, Error, InfoLinkRel, LoadOptions, NameAnd, RenderingNode, Style,
    StyleClass, TermForm, TermLocalization, load_style, validate_style,
};

const APA: &str = "tests/data/apa-6th-edition.csl";

fn apa() -> Style {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(APA);
    load_style(path).unwrap()
}

#[test]
fn apa_metadata() {
    let style = apa();
    assert_eq!(style.class, Some(StyleClass::InText));
    assert_eq!(style.version, "1.0");
    assert_eq!(style.info.title, "American Psychological Association 6th edition");
    assert_eq!(style.info.title_short, "APA");
    assert_eq!(style.info.authors[0].name, "Simon Kornblith");
    assert_eq!(style.info.contributors.len(), 3);
    assert_eq!(style.info.contributors[1].name, "Curtis M. Humphrey");
    assert_eq!(style.info.citation_format(), Some(CitationFormat::AuthorDate));
    assert_eq!(
        style.info.link(InfoLinkRel::Zelf).map(|l| l.href.as_str()),
        Some("http://www.zotero.org/styles/apa")
    );
    assert!(style.info.rights.as_ref().unwrap().license.contains("by-sa"));
}

#[test]
fn apa_locale_and_macros() {
    let style = apa();
    assert_eq!(style.macros[0].name, "container-contributors-booklike");

    let locale = style.get_locale("en").unwrap();
    let first = &locale.terms.terms[0];
    assert_eq!(first.single, "ed. & trans.");
    assert_eq!(
        first.localization(),
        TermLocalization::Multiple { single: "ed. & trans.", multiple: "eds. & trans." }
    );
    assert_eq!(
        locale.term("translator", TermForm::Short).unwrap().localization(),
        TermLocalization::Single("trans.")
    );

    let author = style.get_macro("author").unwrap();
    let names = author.elements.names().next().unwrap();
    let name = names.name.as_ref().unwrap();
    assert_eq!(name.name_attributes.and, Some(NameAnd::Symbol));
    assert_eq!(names.substitute.as_ref().unwrap().elements.len(), 2);
}

#[test]
fn apa_citation() {
    let style = apa();
    let citation = &style.citation;
    assert_eq!(citation.layout.affixes.prefix, "(");
    assert_eq!(citation.layout.affixes.suffix, ")");
    assert_eq!(citation.name_attributes.et_al_min, Some(6));
    assert_eq!(citation.name_attributes.et_al_subsequent_min, Some(3));
    assert!(citation.disambiguate_add_givenname);
    assert_eq!(citation.sort.as_ref().unwrap().keys.len(), 2);
}

#[test]
fn apa_bibliography_nesting() {
    let style = apa();
    let bibliography = style.bibliography.as_ref().unwrap();
    assert!(bibliography.hanging_indent);
    assert_eq!(bibliography.entry_spacing, Some(0));
    assert_eq!(bibliography.name_attributes.et_al_use_last, Some(true));

    let layout = &bibliography.layout.elements;
    let tags: Vec<_> = layout.iter().map(RenderingNode::tag).collect();
    assert_eq!(tags, ["group", "text"]);

    let outer = layout.groups().next().unwrap();
    let inner = outer.elements.groups().next().unwrap();
    let tags: Vec<_> = inner.elements.iter().map(RenderingNode::tag).collect();
    assert_eq!(tags, ["text", "choose", "text", "text"]);

    let choose = inner.elements.chooses().next().unwrap();
    assert_eq!(
        choose.if_.conditions,
        [Condition::IsUncertainDate(vec!["issued".into()])]
    );
    let group = choose.if_.elements.groups().next().unwrap();
    let text = group.elements.texts().next().unwrap();
    assert_eq!(text.term, "circa");
    assert_eq!(text.form, Some(TermForm::Short));
    assert!(choose.else_.is_some());
}

#[test]
fn apa_is_valid() {
    let style = apa();
    assert!(validate_style(&style).is_empty());

    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(APA);
    let strict = Style::from_path_with(path, LoadOptions::default().strict()).unwrap();
    assert_eq!(strict, style);
}

#[test]
fn missing_file() {
    match load_style("tests/data/no-such-style.csl") {
        Err(Error::NotFound { path, .. }) => {
            assert!(path.ends_with("no-such-style.csl"));
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.csl");
    std::fs::write(&path, "<style><info><title>Broken</info></style>").unwrap();
    assert!(matches!(load_style(&path), Err(Error::MalformedDocument(_))));

    std::fs::write(&path, b"<style>\xff</style>").unwrap();
    assert!(matches!(load_style(&path), Err(Error::MalformedDocument(_))));
}

#[test]
fn strict_load_reports_all_issues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("incomplete.csl");
    std::fs::write(
        &path,
        r#"<style xmlns="http://purl.org/net/xbiblio/csl" version="1.0">
            <info><title>Incomplete</title></info>
            <citation><layout><text macro="nowhere"/></layout></citation>
        </style>"#,
    )
    .unwrap();

    assert!(load_style(&path).is_ok());
    match Style::from_path_with(&path, LoadOptions::default().strict()) {
        Err(Error::Validation(issues)) => {
            let codes: Vec<_> = issues.iter().map(|i| i.code).collect();
            assert_eq!(codes, ["info-id", "undefined-macro"]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}
