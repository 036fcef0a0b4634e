//! Feature structures extracted from source files.
//!
//! A [`FileFeatures`] value is the raw, per-file feature bag produced by a
//! [`FeatureExtractor`](super::FeatureExtractor). [`FeatureBag`] is the
//! merged view over every file of one language that the pattern analyzers
//! consume.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::walker::ProjectLayout;

/// Frequency table keyed by an observed label.
///
/// Backed by a `BTreeMap` so iteration order (and therefore tie-breaking)
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally(BTreeMap<String, usize>);

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of `label`.
    pub fn add(&mut self, label: &str) {
        self.add_n(label, 1);
    }

    /// Record `n` observations of `label`.
    pub fn add_n(&mut self, label: &str, n: usize) {
        if n == 0 {
            return;
        }
        *self.0.entry(label.to_string()).or_insert(0) += n;
    }

    pub fn get(&self, label: &str) -> usize {
        self.0.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn merge(&mut self, other: &Tally) {
        for (label, count) in &other.0 {
            self.add_n(label, *count);
        }
    }

    /// The most frequent label. Ties go to the label that sorts first.
    pub fn dominant(&self) -> Option<(&str, usize)> {
        let mut best: Option<(&str, usize)> = None;
        for (label, &count) in &self.0 {
            if count == 0 {
                continue;
            }
            match best {
                Some((_, best_count)) if best_count >= count => {}
                _ => best = Some((label.as_str(), count)),
            }
        }
        best
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<'a> FromIterator<&'a str> for Tally {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for label in iter {
            tally.add(label);
        }
        tally
    }
}

/// Control flow information for cyclomatic complexity calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlFlowInfo {
    /// Number of if/elif/else-if branches.
    pub if_count: usize,
    /// Number of for/while/loop statements.
    pub loop_count: usize,
    /// Number of case/match arms.
    pub case_count: usize,
    /// Number of catch/except clauses.
    pub catch_count: usize,
    /// Number of ternary / conditional expressions.
    pub ternary_count: usize,
    /// Number of extra boolean operands (`a and b and c` contributes 2).
    pub bool_op_count: usize,
}

impl ControlFlowInfo {
    /// Calculate cyclomatic complexity.
    ///
    /// CC = 1 + decision_points
    pub fn cyclomatic_complexity(&self) -> u32 {
        let decision_points = self.if_count
            + self.loop_count
            + self.case_count
            + self.catch_count
            + self.ternary_count
            + self.bool_op_count;

        1 + decision_points as u32
    }
}

/// A function or method found in a file.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionFacts {
    pub name: String,
    /// Line of the signature (1-indexed).
    pub start_line: usize,
    /// Number of lines spanned by the whole definition.
    pub line_count: usize,
    pub control_flow: ControlFlowInfo,
    /// Whether a doc comment / docstring is attached.
    pub documented: bool,
    /// Whether parameters or return type carry annotations. `None` for
    /// languages where annotations are mandatory.
    pub annotated: Option<bool>,
}

impl FunctionFacts {
    pub fn complexity(&self) -> u32 {
        self.control_flow.cyclomatic_complexity()
    }
}

/// A class-like declaration (class, struct, enum, trait, interface, type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFacts {
    pub name: String,
    pub start_line: usize,
    pub documented: bool,
}

/// Category of an identifier for naming analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentifierKind {
    Function,
    Class,
    Variable,
    Constant,
    File,
}

impl IdentifierKind {
    pub const ALL: [IdentifierKind; 5] = [
        IdentifierKind::Function,
        IdentifierKind::Class,
        IdentifierKind::Variable,
        IdentifierKind::Constant,
        IdentifierKind::File,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierKind::Function => "function",
            IdentifierKind::Class => "class",
            IdentifierKind::Variable => "variable",
            IdentifierKind::Constant => "constant",
            IdentifierKind::File => "file",
        }
    }

    /// Name of the naming pattern learned for this category.
    pub fn pattern_name(&self) -> &'static str {
        match self {
            IdentifierKind::Function => "function_naming",
            IdentifierKind::Class => "class_naming",
            IdentifierKind::Variable => "variable_naming",
            IdentifierKind::Constant => "constant_naming",
            IdentifierKind::File => "file_naming",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier lists by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identifiers {
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub variables: Vec<String>,
    pub constants: Vec<String>,
    pub files: Vec<String>,
}

impl Identifiers {
    pub fn get(&self, kind: IdentifierKind) -> &[String] {
        match kind {
            IdentifierKind::Function => &self.functions,
            IdentifierKind::Class => &self.classes,
            IdentifierKind::Variable => &self.variables,
            IdentifierKind::Constant => &self.constants,
            IdentifierKind::File => &self.files,
        }
    }

    pub fn push(&mut self, kind: IdentifierKind, name: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        match kind {
            IdentifierKind::Function => self.functions.push(name),
            IdentifierKind::Class => self.classes.push(name),
            IdentifierKind::Variable => self.variables.push(name),
            IdentifierKind::Constant => self.constants.push(name),
            IdentifierKind::File => self.files.push(name),
        }
    }

    pub fn extend(&mut self, other: &Identifiers) {
        self.functions.extend(other.functions.iter().cloned());
        self.classes.extend(other.classes.iter().cloned());
        self.variables.extend(other.variables.iter().cloned());
        self.constants.extend(other.constants.iter().cloned());
        self.files.extend(other.files.iter().cloned());
    }

    pub fn len(&self) -> usize {
        IdentifierKind::ALL.iter().map(|k| self.get(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An import/dependency statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// Module path as written (`os.path`, `./util`, `std::fmt`).
    pub module: String,
    /// `from x import *`, `import * as x`, `use x::*`, `import . "x"`.
    pub wildcard: bool,
    /// Relative to the importing file (`from . import x`, `./util`, `super::x`).
    pub relative: bool,
    pub line: usize,
}

/// Counts of string literal delimiters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteTally {
    pub single: usize,
    pub double: usize,
}

impl QuoteTally {
    pub fn total(&self) -> usize {
        self.single + self.double
    }

    pub fn merge(&mut self, other: &QuoteTally) {
        self.single += other.single;
        self.double += other.double;
    }

    pub fn as_tally(&self) -> Tally {
        let mut tally = Tally::new();
        tally.add_n("single", self.single);
        tally.add_n("double", self.double);
        tally
    }
}

/// Leading-whitespace statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndentationTally {
    /// Non-blank lines indented with spaces.
    pub space_lines: usize,
    /// Non-blank lines indented with tabs.
    pub tab_lines: usize,
    /// Histogram of indentation increases between consecutive lines, in columns.
    pub steps: Tally,
}

impl IndentationTally {
    pub fn merge(&mut self, other: &IndentationTally) {
        self.space_lines += other.space_lines;
        self.tab_lines += other.tab_lines;
        self.steps.merge(&other.steps);
    }

    pub fn as_tally(&self) -> Tally {
        let mut tally = Tally::new();
        tally.add_n("spaces", self.space_lines);
        tally.add_n("tabs", self.tab_lines);
        tally
    }
}

/// Line length statistics over non-blank lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStats {
    pub lines: usize,
    pub total_length: usize,
    pub max_length: usize,
}

impl LineStats {
    pub fn average(&self) -> f64 {
        if self.lines == 0 {
            return 0.0;
        }
        self.total_length as f64 / self.lines as f64
    }

    pub fn merge(&mut self, other: &LineStats) {
        self.lines += other.lines;
        self.total_length += other.total_length;
        self.max_length = self.max_length.max(other.max_length);
    }
}

/// All features extracted from a single file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileFeatures {
    /// Path relative to the project root.
    pub path: String,
    pub language: String,
    pub total_lines: usize,
    pub is_test_file: bool,
    pub functions: Vec<FunctionFacts>,
    pub classes: Vec<ClassFacts>,
    pub identifiers: Identifiers,
    pub imports: Vec<ImportRecord>,
    pub quotes: QuoteTally,
    pub indentation: IndentationTally,
    pub line_stats: LineStats,
    /// Doc comment delimiters attached to functions/classes (`"""`, `///`, `/**`).
    pub doc_delimiters: Tally,
    /// Doc comment formats (`google`, `numpy`, `sphinx`, `jsdoc`, `plain`).
    pub doc_formats: Tally,
    /// Test frameworks referenced by the file.
    pub test_frameworks: Tally,
}

impl FileFeatures {
    /// Create empty features for a file.
    pub fn empty(path: &str, language: &str) -> Self {
        Self {
            path: path.to_string(),
            language: language.to_string(),
            total_lines: 0,
            is_test_file: false,
            functions: Vec::new(),
            classes: Vec::new(),
            identifiers: Identifiers::default(),
            imports: Vec::new(),
            quotes: QuoteTally::default(),
            indentation: IndentationTally::default(),
            line_stats: LineStats::default(),
            doc_delimiters: Tally::new(),
            doc_formats: Tally::new(),
            test_frameworks: Tally::new(),
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> Option<&str> {
        std::path::Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
    }

    pub fn documented_items(&self) -> usize {
        self.functions.iter().filter(|f| f.documented).count()
            + self.classes.iter().filter(|c| c.documented).count()
    }

    pub fn documentable_items(&self) -> usize {
        self.functions.len() + self.classes.len()
    }
}

/// Merged features for one language, consumed by the pattern analyzers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureBag {
    pub language: String,
    pub identifiers: Identifiers,
    pub quotes: QuoteTally,
    pub indentation: IndentationTally,
    /// `annotated` / `unannotated` function counts.
    pub annotations: Tally,
    /// `absolute` / `relative` import counts.
    pub import_styles: Tally,
    pub doc_delimiters: Tally,
    pub doc_formats: Tally,
    pub documented_items: usize,
    pub documentable_items: usize,
    pub layout: ProjectLayout,
}

impl FeatureBag {
    /// Reduce per-file features into one bag.
    ///
    /// Every aggregate is a sum, so the result does not depend on file order.
    pub fn from_files(language: &str, files: &[FileFeatures], layout: &ProjectLayout) -> Self {
        let mut bag = FeatureBag {
            language: language.to_string(),
            layout: layout.clone(),
            ..Default::default()
        };

        for file in files {
            bag.identifiers.extend(&file.identifiers);
            bag.quotes.merge(&file.quotes);
            bag.indentation.merge(&file.indentation);
            bag.doc_delimiters.merge(&file.doc_delimiters);
            bag.doc_formats.merge(&file.doc_formats);
            bag.documented_items += file.documented_items();
            bag.documentable_items += file.documentable_items();

            for func in &file.functions {
                match func.annotated {
                    Some(true) => bag.annotations.add("annotated"),
                    Some(false) => bag.annotations.add("unannotated"),
                    None => {}
                }
            }
            for import in &file.imports {
                bag.import_styles
                    .add(if import.relative { "relative" } else { "absolute" });
            }
        }

        bag
    }

    /// Fraction of functions and classes carrying documentation.
    pub fn documentation_coverage(&self) -> Option<f64> {
        if self.documentable_items == 0 {
            return None;
        }
        Some(self.documented_items as f64 / self.documentable_items as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclomatic_complexity() {
        let mut cf = ControlFlowInfo::default();
        assert_eq!(cf.cyclomatic_complexity(), 1);

        cf.if_count = 3;
        cf.loop_count = 1;
        assert_eq!(cf.cyclomatic_complexity(), 5);

        cf.bool_op_count = 2;
        assert_eq!(cf.cyclomatic_complexity(), 7);
    }

    #[test]
    fn test_tally_dominant_breaks_ties_by_label() {
        let tally: Tally = ["b", "a", "b", "a"].into_iter().collect();
        assert_eq!(tally.dominant(), Some(("a", 2)));
        assert_eq!(tally.total(), 4);
        assert_eq!(Tally::new().dominant(), None);
    }

    #[test]
    fn test_feature_bag_counts_annotations_and_imports() {
        let mut file = FileFeatures::empty("a.py", "python");
        file.functions.push(FunctionFacts {
            name: "f".into(),
            start_line: 1,
            line_count: 2,
            control_flow: ControlFlowInfo::default(),
            documented: true,
            annotated: Some(true),
        });
        file.imports.push(ImportRecord {
            module: ".util".into(),
            wildcard: false,
            relative: true,
            line: 1,
        });

        let bag = FeatureBag::from_files("python", &[file], &ProjectLayout::default());
        assert_eq!(bag.annotations.get("annotated"), 1);
        assert_eq!(bag.import_styles.get("relative"), 1);
        assert_eq!(bag.documentation_coverage(), Some(1.0));
    }
}
