//! Structural checks for decoded styles.
//!
//! Decoding is lenient: it accepts any well-formed document whose elements
//! have the right shapes. [`validate_style`] reports the problems that a
//! processor would trip over later, each with a stable code and the path of
//! the offending element.

use std::collections::BTreeSet;
use std::fmt;

use crate::{Choose, Layout, RenderingElement, RenderingNode, Sort, Style};

/// Whether loading checks the decoded document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValidationMode {
    /// Decode only.
    #[default]
    Lenient,
    /// Reject documents with validation issues.
    Strict,
}

/// A structural problem in a style or fixture.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ValidationIssue {
    /// Stable machine-readable code, e.g. `undefined-macro`.
    pub code: &'static str,
    /// Human-readable description.
    pub message: String,
    /// Slash-separated element path, e.g. `citation/layout/group[0]/text[1]`.
    pub path: String,
}

impl ValidationIssue {
    pub(crate) fn new(
        code: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self { code, message: message.into(), path: path.into() }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)
    }
}

/// Check a decoded style. An empty list means the style is valid.
pub fn validate_style(style: &Style) -> Vec<ValidationIssue> {
    let mut checker = Checker {
        macros: style.macros.iter().map(|m| m.name.as_str()).collect(),
        issues: Vec::new(),
    };

    if style.info.id.trim().is_empty() {
        checker.push("info-id", "info/id", "style has no identifier");
    }
    if style.info.title.trim().is_empty() {
        checker.push("info-title", "info/title", "style has no title");
    }

    let mut seen = BTreeSet::new();
    for (i, m) in style.macros.iter().enumerate() {
        let path = format!("macro[{i}]");
        if !seen.insert(m.name.as_str()) {
            checker.push("duplicate-macro", &path, format!("macro `{}` is defined twice", m.name));
        }
        checker.elements(&m.elements, &path);
    }

    checker.layout(&style.citation.layout, "citation/layout");
    if let Some(sort) = &style.citation.sort {
        checker.sort(sort, "citation/sort");
    }
    if let Some(bibliography) = &style.bibliography {
        checker.layout(&bibliography.layout, "bibliography/layout");
        if let Some(sort) = &bibliography.sort {
            checker.sort(sort, "bibliography/sort");
        }
    }

    checker.issues
}

struct Checker<'a> {
    macros: BTreeSet<&'a str>,
    issues: Vec<ValidationIssue>,
}

impl Checker<'_> {
    fn push(&mut self, code: &'static str, path: &str, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(code, path, message));
    }

    fn macro_ref(&mut self, name: &str, path: &str) {
        if !self.macros.contains(name) {
            self.push("undefined-macro", path, format!("macro `{name}` is not defined"));
        }
    }

    fn layout(&mut self, layout: &Layout, path: &str) {
        if layout.elements.is_empty() {
            self.push("layout-empty", path, "layout has no rendering elements");
        }
        self.elements(&layout.elements, path);
    }

    fn sort(&mut self, sort: &Sort, path: &str) {
        for (i, key) in sort.keys.iter().enumerate() {
            if !key.macro_.is_empty() {
                self.macro_ref(&key.macro_, &format!("{path}/key[{i}]"));
            }
        }
    }

    fn elements(&mut self, elements: &RenderingElement, parent: &str) {
        for (i, node) in elements.iter().enumerate() {
            let path = format!("{parent}/{}[{i}]", node.tag());
            match node {
                RenderingNode::Text(text) => match text.target_count() {
                    0 => self.push(
                        "text-target",
                        &path,
                        "text needs one of variable, macro, term or value",
                    ),
                    1 => {
                        if !text.macro_.is_empty() {
                            self.macro_ref(&text.macro_, &path);
                        }
                    }
                    _ => self.push(
                        "text-target",
                        &path,
                        "text sets more than one of variable, macro, term and value",
                    ),
                },
                RenderingNode::Names(names) => {
                    if names.variables.is_empty() {
                        self.push("names-variable", &path, "names has no variable");
                    }
                    if let Some(substitute) = &names.substitute {
                        self.elements(&substitute.elements, &format!("{path}/substitute"));
                    }
                }
                RenderingNode::Choose(choose) => self.choose(choose, &path),
                RenderingNode::Group(group) => self.elements(&group.elements, &path),
                RenderingNode::Date(_) | RenderingNode::Label(_) | RenderingNode::Number(_) => {}
            }
        }
    }

    fn choose(&mut self, choose: &Choose, path: &str) {
        for (i, branch) in choose.branches().enumerate() {
            let path = match i {
                0 => format!("{path}/if"),
                n => format!("{path}/else-if[{}]", n - 1),
            };
            if branch.conditions.is_empty() {
                self.push("choose-condition", &path, "branch has no condition");
            }
            self.elements(&branch.elements, &path);
        }
        if let Some(else_) = &choose.else_ {
            self.elements(&else_.elements, &format!("{path}/else"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issues(xml: &str) -> Vec<ValidationIssue> {
        validate_style(&Style::from_xml(xml).unwrap())
    }

    fn codes(issues: &[ValidationIssue]) -> Vec<&'static str> {
        issues.iter().map(|i| i.code).collect()
    }

    #[test]
    fn valid_style() {
        let issues = issues(
            r#"<style>
                <info><id>x</id><title>X</title></info>
                <macro name="author"><names variable="author"/></macro>
                <citation>
                    <sort><key macro="author"/></sort>
                    <layout><text macro="author"/></layout>
                </citation>
            </style>"#,
        );
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn empty_style() {
        let issues = issues("<style/>");
        assert_eq!(codes(&issues), ["info-id", "info-title", "layout-empty"]);
        assert_eq!(issues[2].path, "citation/layout");
    }

    #[test]
    fn nested_problems_carry_paths() {
        let issues = issues(
            r#"<style>
                <info><id>x</id><title>X</title></info>
                <macro name="a"><text value="a"/></macro>
                <macro name="a"><text value="b"/></macro>
                <citation>
                    <layout>
                        <text variable="title"/>
                        <group>
                            <text font-style="italic"/>
                            <choose>
                                <if><names prefix=" "/></if>
                                <else-if variable="issued"><text macro="b"/></else-if>
                            </choose>
                        </group>
                    </layout>
                </citation>
                <bibliography>
                    <sort><key macro="c"/></sort>
                    <layout><text term="in" value="x"/></layout>
                </bibliography>
            </style>"#,
        );

        let found: Vec<_> = issues.iter().map(|i| (i.code, i.path.as_str())).collect();
        assert_eq!(
            found,
            [
                ("duplicate-macro", "macro[1]"),
                ("text-target", "citation/layout/group[1]/text[0]"),
                ("choose-condition", "citation/layout/group[1]/choose[1]/if"),
                ("names-variable", "citation/layout/group[1]/choose[1]/if/names[0]"),
                ("undefined-macro", "citation/layout/group[1]/choose[1]/else-if[0]/text[0]"),
                ("text-target", "bibliography/layout/text[0]"),
                ("undefined-macro", "bibliography/sort/key[0]"),
            ]
        );
    }

    #[test]
    fn issue_display() {
        let issue = ValidationIssue::new("info-id", "info/id", "style has no identifier");
        assert_eq!(issue.to_string(), "[info-id] info/id: style has no identifier");
    }
}
