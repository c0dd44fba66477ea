//! A library for loading CSL styles and CSL test-suite fixtures.
//!
//! [`Style`] is the document model of a CSL 1.0.1 style. Load one with
//! [`Style::from_path`] or [`Style::from_xml`]. [`Fixture`] reads the
//! block-tagged text files of the CSL processor test suite.
//!
//! ```no_run
//! let style = cslstyle::load_style("styles/apa.csl")?;
//! println!("{}", style.info.title);
//! # Ok::<(), cslstyle::Error>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

use std::fmt;
use std::fs;
use std::path::Path;

use log::debug;
use quick_xml::de::DeError;
use quick_xml::events::Event;
use serde::de::{Error as _, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use util::{
    collect_children, deserialize_bool, deserialize_bool_option, deserialize_space_separated,
    deserialize_u32_option,
};

mod error;
pub mod fixture;
mod util;
pub mod validate;

pub use error::{Error, Result};
pub use fixture::{Fixture, FixtureMode, FixtureOptions, read_fixture};
pub use validate::{ValidationIssue, ValidationMode, validate_style};

/// How a style is loaded.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LoadOptions {
    /// Whether the decoded style is checked for structural problems.
    pub validation: ValidationMode,
}

impl LoadOptions {
    /// Reject styles that fail [`validate_style`].
    pub fn strict(mut self) -> Self {
        self.validation = ValidationMode::Strict;
        self
    }

    /// Set the validation mode.
    pub fn validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }
}

/// Load a CSL style from a file without validating it.
pub fn load_style(path: impl AsRef<Path>) -> Result<Style> {
    Style::from_path(path)
}

/// A CSL style.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Style {
    /// The XML namespace, normally `http://purl.org/net/xbiblio/csl`.
    #[serde(rename = "@xmlns", default)]
    pub xmlns: String,
    /// How the citations are displayed.
    #[serde(rename = "@class")]
    pub class: Option<StyleClass>,
    /// The CSL version the style is compatible with.
    #[serde(rename = "@version", default)]
    pub version: String,
    /// The locale used if the user didn't specify one.
    #[serde(rename = "@default-locale", default)]
    pub default_locale: String,
    /// How to treat the non-dropping name particle.
    #[serde(rename = "@demote-non-dropping-particle")]
    pub demote_non_dropping_particle: Option<DemoteNonDroppingParticle>,
    /// Specifies how to reformat page ranges.
    #[serde(rename = "@page-range-format")]
    pub page_range_format: Option<PageRangeFormat>,
    /// Whether to use a hyphen when initializing a name.
    #[serde(
        rename = "@initialize-with-hyphen",
        default,
        deserialize_with = "deserialize_bool_option"
    )]
    pub initialize_with_hyphen: Option<bool>,
    /// The style's metadata.
    #[serde(default)]
    pub info: Info,
    /// Override localized strings.
    #[serde(rename = "locale", default)]
    pub locales: Vec<Locale>,
    /// Reusable formatting rules.
    #[serde(rename = "macro", default)]
    pub macros: Vec<Macro>,
    /// How notes or in-text citations are displayed.
    #[serde(default)]
    pub citation: Citation,
    /// How the bibliography is displayed.
    pub bibliography: Option<Bibliography>,
    /// Name options for the whole style.
    #[serde(flatten)]
    pub name_attributes: InheritableNameAttributes,
}

impl Style {
    /// Decode a style from its XML source.
    pub fn from_xml(xml: &str) -> Result<Self> {
        Self::from_xml_with(xml, LoadOptions::default())
    }

    /// Decode a style from its XML source, validating it if requested.
    pub fn from_xml_with(xml: &str, options: LoadOptions) -> Result<Self> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        check_root(xml)?;
        let style: Self = quick_xml::de::from_str(xml)?;
        if options.validation == ValidationMode::Strict {
            let issues = validate_style(&style);
            if !issues.is_empty() {
                return Err(Error::Validation(issues));
            }
        }
        Ok(style)
    }

    /// Load a style from a file without validating it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_path_with(path, LoadOptions::default())
    }

    /// Load a style from a file.
    pub fn from_path_with(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| Error::NotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let xml = std::str::from_utf8(&bytes).map_err(DeError::custom)?;
        let style = Self::from_xml_with(xml, options)?;
        debug!(
            "loaded style {:?} from {} ({} macros, {} locales)",
            style.info.id,
            path.display(),
            style.macros.len(),
            style.locales.len()
        );
        Ok(style)
    }

    /// Find a macro by name.
    pub fn get_macro(&self, name: &str) -> Option<&Macro> {
        self.macros.iter().find(|m| m.name == name)
    }

    /// Find the inline locale for a language tag. An empty tag matches
    /// locales without `xml:lang`.
    pub fn get_locale(&self, lang: &str) -> Option<&Locale> {
        self.locales.iter().find(|l| l.lang == lang)
    }
}

/// The serde deserializer does not look at the root element's name.
fn check_root(xml: &str) -> Result<(), DeError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                return if e.local_name().as_ref() == b"style" {
                    Ok(())
                } else {
                    Err(DeError::custom(format!(
                        "expected <style> as root element, found <{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    )))
                };
            }
            Event::Eof => return Err(DeError::custom("document has no root element")),
            _ => {}
        }
    }
}

/// How the citations are displayed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleClass {
    /// Citations are inlined in the text.
    InText,
    /// Citations are displayed in foot- or endnotes.
    Note,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// How to reformat page ranges.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageRangeFormat {
    /// “321–28”
    /// Aliases: `chicago-15`
    #[serde(alias = "chicago-15")]
    Chicago,
    /// “321–28”
    #[serde(rename = "chicago-16")]
    Chicago16,
    /// “321–328”
    Expanded,
    /// “321–8”
    Minimal,
    /// “321–28”
    MinimalTwo,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// How to treat the non-dropping name particle when sorting.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DemoteNonDroppingParticle {
    /// Treat as part of the first name.
    Never,
    /// Treat as part of the first name except when sorting.
    SortOnly,
    /// Treat as part of the family name.
    DisplayAndSort,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// Citation style metadata.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Info {
    /// The title of the style.
    #[serde(default)]
    pub title: String,
    /// A shortened version of the title.
    #[serde(rename = "title-short", default)]
    pub title_short: String,
    /// A unique identifier for the style. May be a URL or an UUID.
    #[serde(default)]
    pub id: String,
    /// The authors of the style.
    #[serde(rename = "author", default)]
    pub authors: Vec<PersonalDetails>,
    /// Contributors to the style.
    #[serde(rename = "contributor", default)]
    pub contributors: Vec<PersonalDetails>,
    /// Citation format and academic fields.
    #[serde(rename = "category", default)]
    pub categories: Vec<Category>,
    /// A short description of the style.
    #[serde(default)]
    pub summary: String,
    /// When the style was initially published.
    #[serde(default)]
    pub published: String,
    /// When the style was last updated.
    #[serde(default)]
    pub updated: String,
    /// Under which license the style is published.
    pub rights: Option<Rights>,
    /// Links with more information about the style.
    #[serde(rename = "link", default)]
    pub links: Vec<InfoLink>,
    /// The ISSN for the source of the style's publication.
    #[serde(default)]
    pub issn: Vec<String>,
    /// The eISSN for the source of the style's publication.
    #[serde(default)]
    pub eissn: String,
    /// The ISSN-L for the source of the style's publication.
    #[serde(default)]
    pub issnl: String,
}

impl Info {
    /// The citation format declared in the categories, if any.
    pub fn citation_format(&self) -> Option<CitationFormat> {
        self.categories.iter().find_map(|c| c.citation_format)
    }

    /// Retrieve the first link with the given relation.
    pub fn link(&self, rel: InfoLinkRel) -> Option<&InfoLink> {
        self.links.iter().find(|link| link.rel == Some(rel))
    }
}

/// A person affiliated with the style or a locale. Used for authors,
/// contributors and translators alike.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct PersonalDetails {
    /// The person's name.
    #[serde(default)]
    pub name: String,
    /// The person's email address.
    #[serde(default)]
    pub email: String,
    /// A URI for the person.
    #[serde(default)]
    pub uri: String,
}

/// A `cs:category` entry.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Category {
    /// Which format the citations are in.
    #[serde(rename = "@citation-format")]
    pub citation_format: Option<CitationFormat>,
    /// Which academic field the style is used in.
    #[serde(rename = "@field", default)]
    pub field: String,
}

/// What type of in-text citation is used.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CitationFormat {
    /// “… (Doe, 1999)”
    AuthorDate,
    /// “… (Doe)”
    Author,
    /// “… \[1\]”
    Numeric,
    /// “… \[doe99\]”
    Label,
    /// The citation appears as a foot- or endnote.
    Note,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// A link with more information about the style.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct InfoLink {
    /// The link's URL.
    #[serde(rename = "@href", default)]
    pub href: String,
    /// How the link relates to the style.
    #[serde(rename = "@rel")]
    pub rel: Option<InfoLinkRel>,
    /// The link's locale.
    #[serde(rename = "@xml:lang", default)]
    pub lang: String,
    /// A human-readable description of the link.
    #[serde(rename = "$text", default)]
    pub description: String,
}

/// How a link relates to the style.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InfoLinkRel {
    /// Website of the style.
    #[serde(rename = "self")]
    Zelf,
    /// URL from which the style is derived.
    Template,
    /// URL of the style's documentation.
    Documentation,
    /// Parent of a dependent style.
    IndependentParent,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// A license description.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Rights {
    /// The license's name.
    #[serde(rename = "$text", default)]
    pub text: String,
    /// The license's URL.
    #[serde(rename = "@license", default)]
    pub license: String,
    /// The license string's locale.
    #[serde(rename = "@xml:lang", default)]
    pub lang: String,
}

/// Supplemental localization data in a citation style.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Locale {
    /// Which languages or dialects this data applies to.
    #[serde(rename = "@xml:lang", alias = "@lang", default)]
    pub lang: String,
    /// Character data directly inside the element.
    #[serde(rename = "$text", default)]
    pub text: String,
    /// Metadata of the locale.
    pub info: Option<LocaleInfo>,
    /// The terms used in the locale.
    #[serde(default)]
    pub terms: Terms,
    /// How to format dates in the locale.
    #[serde(rename = "date", default)]
    pub dates: Vec<LocaleDate>,
    /// Style options for the locale.
    #[serde(rename = "style-options")]
    pub style_options: Option<LocaleOptions>,
}

impl Locale {
    /// Find a term by name and form. The first match in document order wins.
    pub fn term(&self, name: &str, form: TermForm) -> Option<&Term> {
        self.terms
            .terms
            .iter()
            .find(|t| t.name == name && t.form.unwrap_or_default() == form)
    }
}

/// Metadata of a locale.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct LocaleInfo {
    /// The translators of the locale.
    #[serde(rename = "translator", default)]
    pub translators: Vec<PersonalDetails>,
    /// The license under which the locale is published.
    pub rights: Option<Rights>,
    /// When the locale was last updated.
    #[serde(default)]
    pub updated: String,
}

/// Term localization container.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Terms {
    /// The terms in document order.
    #[serde(rename = "term", default)]
    pub terms: Vec<Term>,
}

/// A localized term.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Term {
    /// The term key.
    #[serde(rename = "@name", default)]
    pub name: String,
    /// The variant of this term translation.
    #[serde(rename = "@form")]
    pub form: Option<TermForm>,
    /// Specify when this ordinal term is used.
    #[serde(rename = "@match")]
    pub match_: Option<OrdinalMatch>,
    /// Specify for which grammatical gender this term has to get corresponding ordinals.
    #[serde(rename = "@gender")]
    pub gender: Option<GrammarGender>,
    /// Specify which grammatical gender this ordinal term matches.
    #[serde(rename = "@gender-form")]
    pub gender_form: Option<GrammarGender>,
    /// The inline localization.
    #[serde(rename = "$text", default)]
    pub text: String,
    /// The singular variant.
    #[serde(default)]
    pub single: String,
    /// The plural variant.
    #[serde(default)]
    pub multiple: String,
}

impl Term {
    /// The localization, either inline or as a singular/plural pair.
    pub fn localization(&self) -> TermLocalization<'_> {
        if self.single.is_empty() && self.multiple.is_empty() {
            TermLocalization::Single(&self.text)
        } else {
            TermLocalization::Multiple {
                single: &self.single,
                multiple: &self.multiple,
            }
        }
    }
}

/// A localized term form, with possible singular and plural variants.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TermLocalization<'a> {
    /// A single variant.
    Single(&'a str),
    /// A singular and plural variant.
    Multiple {
        /// The singular variant.
        single: &'a str,
        /// The plural variant.
        multiple: &'a str,
    },
}

/// The variant of a term translation.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermForm {
    /// The default variant.
    #[default]
    Long,
    /// The short noun variant.
    Short,
    /// The related verb.
    Verb,
    /// The related verb (short form).
    VerbShort,
    /// The symbol variant.
    Symbol,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// Specify when which ordinal term is used.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrdinalMatch {
    /// Match the last digit for ordinal terms between zero and nine and the
    /// last two otherwise.
    LastDigit,
    /// Always match on the last two non-zero digits.
    LastTwoDigits,
    /// Match on the exact number.
    WholeNumber,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// A grammatical gender. Use `None` for neutral.
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrammarGender {
    Feminine,
    Masculine,
    #[serde(other)]
    Unknown,
}

/// A localized date format.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct LocaleDate {
    /// Which of the two localized formats this defines.
    #[serde(rename = "@form")]
    pub form: Option<DateForm>,
    /// Delimiter between the date parts.
    #[serde(rename = "@delimiter", default)]
    pub delimiter: String,
    /// The date parts in output order.
    #[serde(rename = "date-part", default)]
    pub parts: Vec<DatePart>,
}

/// Options for the locale.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct LocaleOptions {
    /// Only use ordinals for the first day in a month.
    #[serde(
        rename = "@limit-day-ordinals-to-day-1",
        default,
        deserialize_with = "deserialize_bool_option"
    )]
    pub limit_day_ordinals_to_day_1: Option<bool>,
    /// Whether to place punctuation inside of quotation marks.
    #[serde(
        rename = "@punctuation-in-quote",
        default,
        deserialize_with = "deserialize_bool_option"
    )]
    pub punctuation_in_quote: Option<bool>,
}

/// Formatting instructions for in-text or note citations.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Citation {
    /// How items are sorted within the citation.
    pub sort: Option<Sort>,
    /// The citation's formatting rules.
    #[serde(default)]
    pub layout: Layout,
    /// How to collapse cites with similar items.
    #[serde(rename = "@collapse")]
    pub collapse: Option<Collapse>,
    /// Expand names that are ambiguous in short form.
    #[serde(
        rename = "@disambiguate-add-givenname",
        default,
        deserialize_with = "deserialize_bool"
    )]
    pub disambiguate_add_givenname: bool,
    /// When to expand names that are ambiguous in short form.
    #[serde(rename = "@givenname-disambiguation-rule")]
    pub givenname_disambiguation_rule: Option<DisambiguationRule>,
    /// Disambiguate by adding more names that would otherwise be hidden by et al.
    #[serde(
        rename = "@disambiguate-add-names",
        default,
        deserialize_with = "deserialize_bool"
    )]
    pub disambiguate_add_names: bool,
    /// Disambiguate by adding an alphabetical suffix to the year.
    #[serde(
        rename = "@disambiguate-add-year-suffix",
        default,
        deserialize_with = "deserialize_bool"
    )]
    pub disambiguate_add_year_suffix: bool,
    /// Group items in cite by name.
    #[serde(rename = "@cite-group-delimiter")]
    pub cite_group_delimiter: Option<String>,
    /// Delimiter between year suffixes.
    #[serde(rename = "@year-suffix-delimiter")]
    pub year_suffix_delimiter: Option<String>,
    /// Delimiter after a collapsed cite group.
    #[serde(rename = "@after-collapse-delimiter")]
    pub after_collapse_delimiter: Option<String>,
    /// Distance in notes within which a cite counts as `near-note`.
    #[serde(
        rename = "@near-note-distance",
        default,
        deserialize_with = "deserialize_u32_option"
    )]
    pub near_note_distance: Option<u32>,
    /// Name options for the citation.
    #[serde(flatten)]
    pub name_attributes: InheritableNameAttributes,
}

impl Citation {
    /// CSL's default for `near-note-distance`.
    pub const DEFAULT_NEAR_NOTE_DISTANCE: u32 = 5;

    /// Return the `near_note_distance`, falling back to CSL's default.
    pub fn get_near_note_distance(&self) -> u32 {
        self.near_note_distance
            .unwrap_or(Self::DEFAULT_NEAR_NOTE_DISTANCE)
    }

    /// Return the `year_suffix_delimiter`, falling back to the layout delimiter.
    pub fn get_year_suffix_delimiter(&self) -> &str {
        self.year_suffix_delimiter
            .as_deref()
            .unwrap_or(&self.layout.delimiter)
    }

    /// Return the `after_collapse_delimiter`, falling back to the layout delimiter.
    pub fn get_after_collapse_delimiter(&self) -> &str {
        self.after_collapse_delimiter
            .as_deref()
            .unwrap_or(&self.layout.delimiter)
    }
}

/// When to expand names that are ambiguous in short form.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisambiguationRule {
    /// Expand to disambiguate both cites and names.
    AllNames,
    /// Expand to disambiguate cites and names but only use initials.
    AllNamesWithInitials,
    /// Same as `AllNames` but only disambiguate the first person in a citation.
    PrimaryName,
    /// Same as `AllNamesWithInitials` but only disambiguate the first person in a citation.
    PrimaryNameWithInitials,
    /// Expand to disambiguate cites but not names.
    ByCite,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// How to collapse cites with similar items.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collapse {
    /// Collapse items with increasing ranges for numeric styles.
    CitationNumber,
    /// Collapse items with the same authors and different years by omitting the author.
    Year,
    /// Same as `Year`, but equal years are omitted as well.
    YearSuffix,
    /// Same as `YearSuffix`, but also collapse the suffixes into a range.
    YearSuffixRanged,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// Formatting instructions for the bibliography.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Bibliography {
    /// How items are sorted within the bibliography.
    pub sort: Option<Sort>,
    /// The bibliography's formatting rules.
    #[serde(default)]
    pub layout: Layout,
    /// Render the bibliography in a hanging indent.
    #[serde(rename = "@hanging-indent", default, deserialize_with = "deserialize_bool")]
    pub hanging_indent: bool,
    /// When set, the second field is aligned.
    #[serde(rename = "@second-field-align")]
    pub second_field_align: Option<SecondFieldAlign>,
    /// Vertical line distance, as a multiple of the regular line height.
    #[serde(rename = "@line-spacing", default, deserialize_with = "deserialize_u32_option")]
    pub line_spacing: Option<u32>,
    /// Vertical distance between entries, as a multiple of the regular line height.
    #[serde(rename = "@entry-spacing", default, deserialize_with = "deserialize_u32_option")]
    pub entry_spacing: Option<u32>,
    /// When set, subsequent identical names are replaced with this.
    #[serde(rename = "@subsequent-author-substitute")]
    pub subsequent_author_substitute: Option<String>,
    /// How to replace subsequent identical names.
    #[serde(rename = "@subsequent-author-substitute-rule")]
    pub subsequent_author_substitute_rule: Option<SubsequentAuthorSubstituteRule>,
    /// Name options for the bibliography.
    #[serde(flatten)]
    pub name_attributes: InheritableNameAttributes,
}

/// How to position the first field if the second field is aligned in a bibliography.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecondFieldAlign {
    /// Put the first field in the margin and align with the margin.
    Margin,
    /// Flush the first field with the margin.
    Flush,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// How to replace subsequent identical names in a bibliography.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubsequentAuthorSubstituteRule {
    /// When all names match, replace.
    CompleteAll,
    /// When all names match, replace each name.
    CompleteEach,
    /// Each maching name is replaced.
    PartialEach,
    /// Only the first matching name is replaced.
    PartialFirst,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// How to sort elements in a bibliography or citation.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Sort {
    /// The sorting keys, primary key first.
    #[serde(rename = "key", default)]
    pub keys: Vec<SortKey>,
}

/// A sorting key. Either `variable` or `macro_` is set.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct SortKey {
    /// The variable to sort by.
    #[serde(rename = "@variable", default)]
    pub variable: String,
    /// The macro whose output to sort by.
    #[serde(rename = "@macro", default)]
    pub macro_: String,
    /// In which direction to sort.
    #[serde(rename = "@sort", default)]
    pub direction: SortDirection,
    /// Override `et-al-min` and `et-al-subsequent-min` for macros.
    #[serde(rename = "@names-min", default, deserialize_with = "deserialize_u32_option")]
    pub names_min: Option<u32>,
    /// Override `et-al-use-first` and `et-al-subsequent-use-first` for macros.
    #[serde(
        rename = "@names-use-first",
        default,
        deserialize_with = "deserialize_u32_option"
    )]
    pub names_use_first: Option<u32>,
    /// Override `et-al-use-last` for macros.
    #[serde(
        rename = "@names-use-last",
        default,
        deserialize_with = "deserialize_bool_option"
    )]
    pub names_use_last: Option<bool>,
}

/// The direction to sort in.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortDirection {
    /// Sort in ascending order.
    #[default]
    Ascending,
    /// Sort in descending order.
    Descending,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// A formatting rule.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Layout {
    /// Add prefix and suffix.
    #[serde(flatten)]
    pub affixes: Affixes,
    /// Set the formatting style.
    #[serde(flatten)]
    pub formatting: Formatting,
    /// Delimit pieces of the output.
    #[serde(rename = "@delimiter", default)]
    pub delimiter: String,
    /// Parts of the rule.
    #[serde(flatten)]
    pub elements: RenderingElement,
}

/// The ordered children of an element that contains formatting instructions.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct RenderingElement {
    /// The children in document order.
    pub nodes: Vec<RenderingNode>,
}

macro_rules! kind_view {
    ($(#[$doc:meta] $fn:ident => $variant:ident($ty:ty);)*) => {
        $(
            #[$doc]
            pub fn $fn(&self) -> impl Iterator<Item = &$ty> + '_ {
                self.nodes.iter().filter_map(|node| match node {
                    RenderingNode::$variant(inner) => Some(inner),
                    _ => None,
                })
            }
        )*
    };
}

impl RenderingElement {
    /// Whether there are no children.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The number of children.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate over the children in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, RenderingNode> {
        self.nodes.iter()
    }

    kind_view! {
        /// The `cs:names` children in document order.
        names => Names(Names);
        /// The `cs:date` children in document order.
        dates => Date(Date);
        /// The `cs:label` children in document order.
        labels => Label(Label);
        /// The `cs:text` children in document order.
        texts => Text(Text);
        /// The `cs:number` children in document order.
        numbers => Number(Number);
        /// The `cs:choose` children in document order.
        chooses => Choose(Choose);
        /// The `cs:group` children in document order.
        groups => Group(Group);
    }
}

impl<'a> IntoIterator for &'a RenderingElement {
    type Item = &'a RenderingNode;
    type IntoIter = std::slice::Iter<'a, RenderingNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl<'de> Deserialize<'de> for RenderingElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NodeVisitor;

        impl<'de> Visitor<'de> for NodeVisitor {
            type Value = RenderingElement;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("rendering elements")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut nodes = Vec::new();
                while let Some(key) = map.next_key::<String>()? {
                    let node = match key.as_str() {
                        "names" => RenderingNode::Names(map.next_value()?),
                        "date" => RenderingNode::Date(map.next_value()?),
                        "label" => RenderingNode::Label(map.next_value()?),
                        "text" => RenderingNode::Text(map.next_value()?),
                        "number" => RenderingNode::Number(map.next_value()?),
                        "choose" => RenderingNode::Choose(map.next_value()?),
                        "group" => RenderingNode::Group(map.next_value()?),
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                            continue;
                        }
                    };
                    nodes.push(node);
                }
                Ok(RenderingElement { nodes })
            }
        }

        deserializer.deserialize_map(NodeVisitor)
    }
}

/// Possible parts of a formatting rule.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum RenderingNode {
    /// Format a list of names.
    Names(Names),
    /// Format a date.
    Date(Date),
    /// Prints a label for a variable.
    Label(Label),
    /// Insert a term or variable.
    Text(Text),
    /// Format a number.
    Number(Number),
    /// Conditional rendering.
    Choose(Choose),
    /// Container for rendering elements.
    Group(Group),
}

impl RenderingNode {
    /// The element name of the node.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Names(_) => "names",
            Self::Date(_) => "date",
            Self::Label(_) => "label",
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Choose(_) => "choose",
            Self::Group(_) => "group",
        }
    }
}

/// Print a term or variable.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Text {
    /// Prints the value of a variable.
    #[serde(rename = "@variable", default)]
    pub variable: String,
    /// Prints the text output of a macro.
    #[serde(rename = "@macro", default)]
    pub macro_: String,
    /// Prints a localized term.
    #[serde(rename = "@term", default)]
    pub term: String,
    /// Prints a given string.
    #[serde(rename = "@value", default)]
    pub value: String,
    /// Which form of the variable or term to print.
    #[serde(rename = "@form")]
    pub form: Option<TermForm>,
    /// Whether to use the plural form of the term.
    #[serde(rename = "@plural", default, deserialize_with = "deserialize_bool")]
    pub plural: bool,
    /// Whether to wrap this text in quotes.
    #[serde(rename = "@quotes", default, deserialize_with = "deserialize_bool")]
    pub quotes: bool,
    /// Remove periods from the output.
    #[serde(rename = "@strip-periods", default, deserialize_with = "deserialize_bool")]
    pub strip_periods: bool,
    /// Transform the text case.
    #[serde(rename = "@text-case")]
    pub text_case: Option<TextCase>,
    /// Set layout level.
    #[serde(rename = "@display")]
    pub display: Option<Display>,
    /// Character data inside the element.
    #[serde(rename = "$text", default)]
    pub cdata: String,
    /// Override formatting style.
    #[serde(flatten)]
    pub formatting: Formatting,
    /// Add prefix and suffix.
    #[serde(flatten)]
    pub affixes: Affixes,
}

impl Text {
    /// What this element prints. Checked in the order variable, macro, term,
    /// value; `None` if none of them is set.
    pub fn target(&self) -> Option<TextTarget<'_>> {
        if !self.variable.is_empty() {
            Some(TextTarget::Variable(&self.variable))
        } else if !self.macro_.is_empty() {
            Some(TextTarget::Macro(&self.macro_))
        } else if !self.term.is_empty() {
            Some(TextTarget::Term(&self.term))
        } else if !self.value.is_empty() {
            Some(TextTarget::Value(&self.value))
        } else {
            None
        }
    }

    /// How many of variable, macro, term and value are set. CSL requires
    /// exactly one.
    pub fn target_count(&self) -> usize {
        [&self.variable, &self.macro_, &self.term, &self.value]
            .iter()
            .filter(|s| !s.is_empty())
            .count()
    }
}

/// Various kinds of text targets.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextTarget<'a> {
    /// Prints the value of a variable.
    Variable(&'a str),
    /// Prints the text output of a macro.
    Macro(&'a str),
    /// Prints a localized term.
    Term(&'a str),
    /// Prints a given string.
    Value(&'a str),
}

/// Formats a date.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Date {
    /// The date to format.
    #[serde(rename = "@variable", default)]
    pub variable: String,
    /// How the localized date should be formatted.
    #[serde(rename = "@form")]
    pub form: Option<DateForm>,
    /// Which parts of the localized date should be included.
    #[serde(rename = "@date-parts")]
    pub date_parts: Option<DateParts>,
    /// Delimit pieces of the output.
    #[serde(rename = "@delimiter", default)]
    pub delimiter: String,
    /// Transform the text case.
    #[serde(rename = "@text-case")]
    pub text_case: Option<TextCase>,
    /// Set layout level.
    #[serde(rename = "@display")]
    pub display: Option<Display>,
    /// Override formatting style.
    #[serde(flatten)]
    pub formatting: Formatting,
    /// Add prefix and suffix.
    #[serde(flatten)]
    pub affixes: Affixes,
    /// Override the default date parts. Also specifies the order of the parts
    /// if `form` is `None`.
    #[serde(flatten, deserialize_with = "date_part_children")]
    pub parts: Vec<DatePart>,
}

fn date_part_children<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<DatePart>, D::Error> {
    collect_children(d, "date-part")
}

/// Localized date formats.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateForm {
    /// “12-15-2005”
    Numeric,
    /// “December 15, 2005”
    Text,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// Which parts of a date should be included.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[allow(missing_docs)]
#[serde(rename_all = "kebab-case")]
pub enum DateParts {
    Year,
    YearMonth,
    #[default]
    YearMonthDay,
    #[serde(other)]
    Unknown,
}

/// Override the default date parts.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct DatePart {
    /// Kind of the date part.
    #[serde(rename = "@name")]
    pub name: Option<DatePartName>,
    /// How the part is formatted.
    #[serde(rename = "@form")]
    pub form: Option<DatePartForm>,
    /// The string used to delimit two date parts.
    #[serde(rename = "@range-delimiter")]
    pub range_delimiter: Option<String>,
    /// Remove periods from the date part.
    #[serde(rename = "@strip-periods", default, deserialize_with = "deserialize_bool")]
    pub strip_periods: bool,
    /// Transform the text case.
    #[serde(rename = "@text-case")]
    pub text_case: Option<TextCase>,
    /// Override formatting style.
    #[serde(flatten)]
    pub formatting: Formatting,
    /// Add prefix and suffix.
    #[serde(flatten)]
    pub affixes: Affixes,
}

impl DatePart {
    /// CSL's default range delimiter.
    pub const DEFAULT_RANGE_DELIMITER: &str = "–";

    /// Return the `range_delimiter`, falling back to an en dash.
    pub fn get_range_delimiter(&self) -> &str {
        self.range_delimiter
            .as_deref()
            .unwrap_or(Self::DEFAULT_RANGE_DELIMITER)
    }
}

/// The kind of a date part.
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatePartName {
    Day,
    Month,
    Year,
    #[serde(other)]
    Unknown,
}

/// How a date part is formatted. Which forms apply depends on the part.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatePartForm {
    /// Day or month: “1”
    Numeric,
    /// Day or month: “01”
    NumericLeadingZeros,
    /// Day: “1st”
    Ordinal,
    /// Month: “January”, year: “2005”
    Long,
    /// Month: “Jan.”, year: “05”
    Short,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// Renders a number.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Number {
    /// The variable whose value is used.
    #[serde(rename = "@variable", default)]
    pub variable: String,
    /// How the number is formatted.
    #[serde(rename = "@form")]
    pub form: Option<NumberForm>,
    /// Transform the text case.
    #[serde(rename = "@text-case")]
    pub text_case: Option<TextCase>,
    /// Set layout level.
    #[serde(rename = "@display")]
    pub display: Option<Display>,
    /// Override formatting style.
    #[serde(flatten)]
    pub formatting: Formatting,
    /// Add prefix and suffix.
    #[serde(flatten)]
    pub affixes: Affixes,
}

/// How a number is formatted.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberForm {
    /// “1”
    #[default]
    Numeric,
    /// “1st”
    Ordinal,
    /// “first”
    LongOrdinal,
    /// “I”
    Roman,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// Renders a list of names.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Names {
    /// The name variables to render.
    #[serde(rename = "@variable", default, deserialize_with = "deserialize_space_separated")]
    pub variables: Vec<String>,
    /// Delimiter between the name lists of different variables.
    #[serde(rename = "@delimiter", default)]
    pub delimiter: String,
    /// Set layout level.
    #[serde(rename = "@display")]
    pub display: Option<Display>,
    /// How the names are formatted.
    pub name: Option<Name>,
    /// Configuration of the et al. abbreviation.
    #[serde(rename = "et-al")]
    pub et_al: Option<EtAl>,
    /// Labels for the names.
    #[serde(flatten, deserialize_with = "label_children")]
    pub labels: Vec<Label>,
    /// Substitutions in case the variables are empty.
    pub substitute: Option<Substitute>,
    /// Name options for this element.
    #[serde(flatten)]
    pub name_attributes: InheritableNameAttributes,
    /// Override formatting style.
    #[serde(flatten)]
    pub formatting: Formatting,
    /// Add prefix and suffix.
    #[serde(flatten)]
    pub affixes: Affixes,
}

fn label_children<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Label>, D::Error> {
    collect_children(d, "label")
}

/// Configuration of how to print names.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Name {
    /// Delimiter between names.
    #[serde(rename = "@delimiter", default)]
    pub delimiter: String,
    /// Which name parts to display for personal names.
    #[serde(rename = "@form")]
    pub form: Option<NameForm>,
    /// Formatting for the given and family name parts.
    #[serde(flatten, deserialize_with = "name_part_children")]
    pub parts: Vec<NamePart>,
    /// Name options for this element.
    #[serde(flatten)]
    pub name_attributes: InheritableNameAttributes,
    /// Override formatting style.
    #[serde(flatten)]
    pub formatting: Formatting,
    /// Add prefix and suffix.
    #[serde(flatten)]
    pub affixes: Affixes,
}

fn name_part_children<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<NamePart>, D::Error> {
    collect_children(d, "name-part")
}

/// Name options that cascade from the style through citation or
/// bibliography and `cs:names` down to `cs:name`. The value at the nearest
/// scope wins; `None` means the attribute is not set at this scope.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(default)]
pub struct InheritableNameAttributes {
    /// Delimiter between second-to-last and last name.
    #[serde(rename = "@and")]
    pub and: Option<NameAnd>,
    /// Delimiter before et al.
    #[serde(rename = "@delimiter-precedes-et-al")]
    pub delimiter_precedes_et_al: Option<DelimiterBehavior>,
    /// Whether to use the delimiter before the last name.
    #[serde(rename = "@delimiter-precedes-last")]
    pub delimiter_precedes_last: Option<DelimiterBehavior>,
    /// Minimum number of names to use et al.
    #[serde(rename = "@et-al-min", deserialize_with = "deserialize_u32_option")]
    pub et_al_min: Option<u32>,
    /// Maximum number of names to use before et al.
    #[serde(rename = "@et-al-use-first", deserialize_with = "deserialize_u32_option")]
    pub et_al_use_first: Option<u32>,
    /// Whether to print the last name after an ellipsis.
    #[serde(rename = "@et-al-use-last", deserialize_with = "deserialize_bool_option")]
    pub et_al_use_last: Option<bool>,
    /// Minimum number of names to use et al. for repeated citations.
    #[serde(rename = "@et-al-subsequent-min", deserialize_with = "deserialize_u32_option")]
    pub et_al_subsequent_min: Option<u32>,
    /// Maximum number of names to use before et al. for repeated citations.
    #[serde(
        rename = "@et-al-subsequent-use-first",
        deserialize_with = "deserialize_u32_option"
    )]
    pub et_al_subsequent_use_first: Option<u32>,
    /// Whether to initialize given names when `initialize-with` is set.
    #[serde(rename = "@initialize", deserialize_with = "deserialize_bool_option")]
    pub initialize: Option<bool>,
    /// String to initialize the given name with.
    #[serde(rename = "@initialize-with")]
    pub initialize_with: Option<String>,
    /// Whether to turn the name around.
    #[serde(rename = "@name-as-sort-order")]
    pub name_as_sort_order: Option<NameAsSortOrder>,
    /// Delimiter between family and given name in sort order.
    #[serde(rename = "@sort-separator")]
    pub sort_separator: Option<String>,
    /// Inherited as `form` by `cs:name`.
    #[serde(rename = "@name-form")]
    pub name_form: Option<NameForm>,
    /// Inherited as `delimiter` by `cs:name`.
    #[serde(rename = "@name-delimiter")]
    pub name_delimiter: Option<String>,
    /// Inherited as `delimiter` by `cs:names`.
    #[serde(rename = "@names-delimiter")]
    pub names_delimiter: Option<String>,
}

impl InheritableNameAttributes {
    /// Whether no attribute is set at this scope.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// How to render the delimiter before the last name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameAnd {
    /// Use the string "and".
    Text,
    /// Use the ampersand character.
    Symbol,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// When delimiters shall be inserted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DelimiterBehavior {
    /// Only used for lists with more than one (`-precedes-et-al`) or two
    /// (`-precedes-last`) names.
    Contextual,
    /// Only use if the preceeding name is inverted (per `name-as-sort-order`).
    AfterInvertedName,
    /// Always use the delimiter for this condition.
    Always,
    /// Never use the delimiter for this condition.
    Never,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// How many name parts to print.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameForm {
    /// Print all name parts
    #[default]
    Long,
    /// Print only the family name part and non-dropping-particle.
    Short,
    /// Count the total number of names.
    Count,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// In which order to print the names.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameAsSortOrder {
    /// Only the first name is turned around.
    First,
    /// All names are turned around.
    All,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// How to format a given name part.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct NamePart {
    /// Which part this applies to.
    #[serde(rename = "@name")]
    pub name: Option<NamePartName>,
    /// Transform the text case.
    #[serde(rename = "@text-case")]
    pub text_case: Option<TextCase>,
    /// Override formatting style.
    #[serde(flatten)]
    pub formatting: Formatting,
    /// Add prefix and suffix.
    #[serde(flatten)]
    pub affixes: Affixes,
}

/// The parts of a personal name that can be formatted separately.
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamePartName {
    Given,
    Family,
    #[serde(other)]
    Unknown,
}

/// Configure the et al. abbreviation.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct EtAl {
    /// Which term to use.
    #[serde(rename = "@term", default)]
    pub term: EtAlTerm,
    /// Override formatting style.
    #[serde(flatten)]
    pub formatting: Formatting,
}

/// Which term to use for et al.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
pub enum EtAlTerm {
    /// “et al.”
    #[default]
    #[serde(rename = "et-al", alias = "et al")]
    EtAl,
    /// “and others”
    #[serde(rename = "and others", alias = "and-others")]
    AndOthers,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// What to do if the name variables are empty.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Substitute {
    /// The rendering elements to try instead, in order.
    #[serde(flatten)]
    pub elements: RenderingElement,
}

/// Print a label for a variable.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Label {
    /// The variable for which to print the label. Empty inside `cs:names`.
    #[serde(rename = "@variable", default)]
    pub variable: String,
    /// What variant of label is chosen.
    #[serde(rename = "@form")]
    pub form: Option<TermForm>,
    /// How to pluralize the label.
    #[serde(rename = "@plural")]
    pub plural: Option<LabelPluralize>,
    /// Remove periods from the output.
    #[serde(rename = "@strip-periods", default, deserialize_with = "deserialize_bool")]
    pub strip_periods: bool,
    /// Transform the text case.
    #[serde(rename = "@text-case")]
    pub text_case: Option<TextCase>,
    /// Override formatting style.
    #[serde(flatten)]
    pub formatting: Formatting,
    /// Add prefix and suffix.
    #[serde(flatten)]
    pub affixes: Affixes,
}

/// How to pluralize a label.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPluralize {
    /// Match plurality of the variable.
    Contextual,
    /// Always use the plural form.
    Always,
    /// Always use the singular form.
    Never,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// A group of formatting instructions that is only shown if no variable is
/// referenced or at least one referenced variable is populated.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Group {
    /// Delimit pieces of the output.
    #[serde(rename = "@delimiter", default)]
    pub delimiter: String,
    /// Set layout level.
    #[serde(rename = "@display")]
    pub display: Option<Display>,
    /// Override formatting style.
    #[serde(flatten)]
    pub formatting: Formatting,
    /// Add prefix and suffix.
    #[serde(flatten)]
    pub affixes: Affixes,
    /// The formatting instructions.
    #[serde(flatten)]
    pub elements: RenderingElement,
}

/// A conditional group of formatting instructions. The first matching
/// branch in document order is used.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Choose {
    /// The first branch.
    #[serde(rename = "if", default)]
    pub if_: If,
    /// Branches tried if the previous ones did not match.
    #[serde(flatten, deserialize_with = "else_if_children")]
    pub else_if: Vec<If>,
    /// The formatting instructions to use if no branch matches.
    #[serde(rename = "else")]
    pub else_: Option<Else>,
}

impl Choose {
    /// The `if` branch followed by all `else-if` branches.
    pub fn branches(&self) -> impl Iterator<Item = &If> + '_ {
        std::iter::once(&self.if_).chain(&self.else_if)
    }
}

fn else_if_children<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<If>, D::Error> {
    collect_children(d, "else-if")
}

/// A branch of a conditional: `cs:if` or `cs:else-if`.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct If {
    /// How to handle the set of tests.
    #[serde(rename = "@match", default)]
    pub match_: ChooseMatch,
    /// The tests, from attributes and `<condition>` children, in document
    /// order.
    #[serde(flatten, deserialize_with = "branch_conditions")]
    pub conditions: Vec<Condition>,
    /// The formatting instructions to use if the branch matches.
    #[serde(flatten)]
    pub elements: RenderingElement,
}

/// The fallback branch of a conditional.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Else {
    /// The formatting instructions.
    #[serde(flatten)]
    pub elements: RenderingElement,
}

/// A single test of a conditional branch.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Condition {
    /// Other than this choose, two elements would result in the same
    /// rendering.
    Disambiguate(bool),
    /// The variables contain numeric data.
    IsNumeric(Vec<String>),
    /// The date variables contain approximate dates.
    IsUncertainDate(Vec<String>),
    /// The locator matches one of the given types.
    Locator(Vec<String>),
    /// The position of this cite among the cites to the same item.
    Position(Vec<String>),
    /// The item is of one of the given types.
    Type(Vec<String>),
    /// The variables are non-empty.
    Variable(Vec<String>),
}

impl Condition {
    fn from_attribute(name: &str, value: &str) -> Option<Self> {
        let list = || value.split_whitespace().map(str::to_owned).collect();
        Some(match name {
            "@disambiguate" => Self::Disambiguate(value.trim().eq_ignore_ascii_case("true")),
            "@is-numeric" => Self::IsNumeric(list()),
            "@is-uncertain-date" => Self::IsUncertainDate(list()),
            "@locator" => Self::Locator(list()),
            "@position" => Self::Position(list()),
            "@type" => Self::Type(list()),
            "@variable" => Self::Variable(list()),
            _ => return None,
        })
    }
}

/// Tests written as attributes come first, then those of `<condition>`
/// children in document order.
fn branch_conditions<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Condition>, D::Error> {
    d.deserialize_map(ConditionVisitor { children: true })
}

/// The tests of one `<condition>` element.
struct ConditionElement(Vec<Condition>);

impl<'de> Deserialize<'de> for ConditionElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_map(ConditionVisitor { children: false })
            .map(ConditionElement)
    }
}

struct ConditionVisitor {
    children: bool,
}

impl<'de> Visitor<'de> for ConditionVisitor {
    type Value = Vec<Condition>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("condition attributes")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut conditions = Vec::new();
        let mut nested = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            if key.starts_with('@') && key != "@match" {
                let value: String = map.next_value()?;
                conditions.extend(Condition::from_attribute(&key, &value));
            } else if self.children && key == "condition" {
                let ConditionElement(tests) = map.next_value()?;
                nested.extend(tests);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        conditions.append(&mut nested);
        Ok(conditions)
    }
}

/// How to handle the set of tests in a conditional branch.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChooseMatch {
    /// All tests must match.
    #[default]
    All,
    /// At least one test must match.
    Any,
    /// No test must match.
    None,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// A reusable set of formatting instructions.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Macro {
    /// The name of the macro.
    #[serde(rename = "@name", default)]
    pub name: String,
    /// The formatting instructions.
    #[serde(flatten)]
    pub elements: RenderingElement,
}

/// Formatting properties.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Formatting {
    /// Set the font style.
    #[serde(rename = "@font-style")]
    pub font_style: Option<FontStyle>,
    /// Choose normal or small caps.
    #[serde(rename = "@font-variant")]
    pub font_variant: Option<FontVariant>,
    /// Set the font weight.
    #[serde(rename = "@font-weight")]
    pub font_weight: Option<FontWeight>,
    /// Choose underlining.
    #[serde(rename = "@text-decoration")]
    pub text_decoration: Option<TextDecoration>,
    /// Choose vertical alignment.
    #[serde(rename = "@vertical-align")]
    pub vertical_align: Option<VerticalAlign>,
}

/// Font style.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Normal font style.
    Normal,
    /// Italic font style.
    Italic,
    /// Oblique font style.
    Oblique,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// Font variant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontVariant {
    /// Normal font variant.
    Normal,
    /// Small caps font variant.
    SmallCaps,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// Font weight.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Normal font weight.
    Normal,
    /// Bold font weight.
    Bold,
    /// Light font weight.
    Light,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// Text decoration.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDecoration {
    /// No text decoration.
    None,
    /// Underline text decoration.
    Underline,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// Vertical alignment.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    /// Baseline alignment.
    Baseline,
    /// Superscript vertical alignment.
    Sup,
    /// Subscript vertical alignment.
    Sub,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// Prefixes and suffixes.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Affixes {
    /// The prefix.
    #[serde(rename = "@prefix", default)]
    pub prefix: String,
    /// The suffix.
    #[serde(rename = "@suffix", default)]
    pub suffix: String,
}

impl Affixes {
    /// Whether neither prefix nor suffix is set.
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.suffix.is_empty()
    }
}

/// On which layout level to display the output.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    /// Block stretching from margin to margin.
    Block,
    /// Put in the left margin.
    LeftMargin,
    /// Align on page after `LeftMargin`.
    RightInline,
    /// `Block` and indented.
    Indent,
    /// Any other value.
    #[serde(other)]
    Unknown,
}

/// How to format text.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextCase {
    /// lowecase.
    Lowercase,
    /// UPPERCASE.
    Uppercase,
    /// Capitalize the first word.
    CapitalizeFirst,
    /// Capitalize All Words.
    CapitalizeAll,
    /// Sentence case. *Deprecated*.
    SentenceCase,
    /// Title case. Only applies to English.
    TitleCase,
    /// Any other value.
    #[serde(other)]
    Unknown,
}
