//! Core types for positions, offenses and lint results.

use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};

use crate::syntax::NodeId;

/// Severity level for offenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown severity `{other}`. Valid values: error, warning, info"
            )),
        }
    }
}

/// A point in the source. Lines are 1-based, columns 0-based (in characters).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (0-indexed).
    pub column: usize,
}

impl Position {
    /// First position of any document.
    pub const START: Self = Self { line: 1, column: 0 };

    /// Creates a position.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position reached after reading `text` from here.
    #[must_use]
    pub fn advance(self, text: &str) -> Self {
        text.chars().fold(self, |pos, c| {
            if c == '\n' {
                Self::new(pos.line + 1, 0)
            } else {
                Self::new(pos.line, pos.column + 1)
            }
        })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open source span: `start` is inclusive, `end` exclusive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Location {
    /// First position covered.
    pub start: Position,
    /// Position just past the span.
    pub end: Position,
}

impl Location {
    /// Creates a location, swapping the ends if they were given reversed.
    #[must_use]
    pub fn new(start: Position, end: Position) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// Span covering `text` when it starts at `start`.
    #[must_use]
    pub fn spanning(start: Position, text: &str) -> Self {
        Self::new(start, start.advance(text))
    }

    /// Smallest span covering both locations.
    #[must_use]
    pub fn join(self, other: Self) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Whether `pos` lies inside the span.
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Whether `other` lies entirely inside this span.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether `line` is one of the lines this span touches.
    #[must_use]
    pub fn touches_line(&self, line: usize) -> bool {
        self.start.line <= line && line <= self.end.line
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// How safe an automatic fix is to apply unattended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixSafety {
    /// Preserves page semantics.
    Safe,
    /// May change behaviour; requires explicit opt-in.
    Unsafe,
}

impl std::fmt::Display for FixSafety {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "safe"),
            Self::Unsafe => write!(f, "unsafe"),
        }
    }
}

/// The node an autofix would rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixTarget {
    /// Node handed to the rule's `autofix`.
    pub node: NodeId,
    /// Safety class of the fix.
    pub safety: FixSafety,
}

/// A single diagnostic finding produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offense {
    /// Rule name (e.g., "html-tag-name-lowercase").
    pub rule: String,
    /// Human-readable message.
    pub message: String,
    /// Severity of this offense.
    pub severity: Severity,
    /// Primary location of the offense.
    pub location: Location,
    /// Autofix target, when the rule can correct this offense.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixTarget>,
}

impl Offense {
    /// Creates a new offense.
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
            severity,
            location,
            fix: None,
        }
    }

    /// Marks this offense as correctable by rewriting `node`.
    #[must_use]
    pub fn with_fix(mut self, node: NodeId, safety: FixSafety) -> Self {
        self.fix = Some(FixTarget { node, safety });
        self
    }

    /// Whether the offense carries an autofix target.
    #[must_use]
    pub fn is_fixable(&self) -> bool {
        self.fix.is_some()
    }

    /// Formats the offense for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} at {}:{}\n",
            self.rule, self.location.start.line, self.location.start.column,
        );
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if let Some(fix) = &self.fix {
            let _ = writeln!(output, "  = help: {} autofix available", fix.safety);
        }
        output
    }
}

impl std::fmt::Display for Offense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.location.start.line,
            self.location.start.column,
            self.severity,
            self.rule,
            self.message
        )
    }
}

/// Sorts offenses by start position, keeping insertion order for ties.
pub fn sort_offenses(offenses: &mut [Offense]) {
    offenses.sort_by_key(|o| (o.location.start.line, o.location.start.column));
}

/// Byte offset of `pos` in `source`, clamped to the source length.
#[must_use]
pub fn byte_offset(source: &str, pos: Position) -> usize {
    let mut line = 1;
    let mut column = 0;
    for (offset, c) in source.char_indices() {
        if line == pos.line && column == pos.column {
            return offset;
        }
        if c == '\n' {
            if line == pos.line {
                return offset;
            }
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    source.len()
}

/// An [`Offense`] bound to its source text for rich `miette` rendering.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct OffenseDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[source_code]
    source_code: miette::NamedSource<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl OffenseDiagnostic {
    /// Builds a diagnostic for `offense` found in `source`.
    #[must_use]
    pub fn new(offense: &Offense, file_name: &str, source: &str) -> Self {
        let start = byte_offset(source, offense.location.start);
        let end = byte_offset(source, offense.location.end).max(start);
        Self {
            message: format!("[{}] {}", offense.rule, offense.message),
            help: offense
                .fix
                .map(|fix| format!("run with --fix to apply the {} autofix", fix.safety)),
            source_code: miette::NamedSource::new(file_name, source.to_string()),
            span: SourceSpan::from((start, end - start)),
            label_message: offense.rule.clone(),
        }
    }
}

/// Result of linting a single document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// Offenses left after suppression, in location order.
    pub offenses: Vec<Offense>,
    /// Number of offenses silenced by `herb:disable` comments.
    pub suppressed_count: usize,
    /// Directives that suppressed nothing.
    pub unnecessary_directives: Vec<Offense>,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offenses and unnecessary-directive reports merged in location order.
    #[must_use]
    pub fn all_offenses(&self) -> Vec<&Offense> {
        let mut all: Vec<&Offense> = self
            .offenses
            .iter()
            .chain(&self.unnecessary_directives)
            .collect();
        all.sort_by_key(|o| (o.location.start.line, o.location.start.column));
        all
    }

    /// Total number of reported findings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offenses.len() + self.unnecessary_directives.len()
    }

    /// Whether nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_offenses_at(Severity::Error)
    }

    /// Checks if any finding meets or exceeds the given severity threshold.
    #[must_use]
    pub fn has_offenses_at(&self, severity: Severity) -> bool {
        self.all_offenses().iter().any(|o| o.severity >= severity)
    }

    /// Number of unsuppressed offenses that carry an autofix target.
    #[must_use]
    pub fn fixable_count(&self) -> usize {
        self.offenses.iter().filter(|o| o.is_fixable()).count()
    }

    /// Counts findings by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let all = self.all_offenses();
        let count = |severity| all.iter().filter(|o| o.severity == severity).count();
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offense_at(line: usize, column: usize, rule: &str) -> Offense {
        let start = Position::new(line, column);
        Offense::new(
            rule,
            Severity::Error,
            Location::new(start, Position::new(line, column + 1)),
            "message",
        )
    }

    #[test]
    fn advance_tracks_newlines() {
        let end = Position::START.advance("ab\ncd");
        assert_eq!(end, Position::new(2, 2));
    }

    #[test]
    fn location_is_half_open() {
        let loc = Location::new(Position::new(1, 2), Position::new(1, 5));
        assert!(loc.contains(Position::new(1, 2)));
        assert!(loc.contains(Position::new(1, 4)));
        assert!(!loc.contains(Position::new(1, 5)));
    }

    #[test]
    fn location_normalizes_reversed_ends() {
        let loc = Location::new(Position::new(3, 0), Position::new(1, 0));
        assert!(loc.start <= loc.end);
    }

    #[test]
    fn sort_is_stable_for_equal_positions() {
        let mut offenses = vec![
            offense_at(2, 0, "b"),
            offense_at(1, 4, "first"),
            offense_at(1, 4, "second"),
            offense_at(1, 0, "a"),
        ];
        sort_offenses(&mut offenses);
        let rules: Vec<&str> = offenses.iter().map(|o| o.rule.as_str()).collect();
        assert_eq!(rules, ["a", "first", "second", "b"]);
    }

    #[test]
    fn byte_offset_handles_multibyte_text() {
        let source = "é\n<p>";
        assert_eq!(byte_offset(source, Position::new(2, 1)), 4);
        assert_eq!(byte_offset(source, Position::new(1, 1)), 2);
        assert_eq!(byte_offset(source, Position::new(9, 0)), source.len());
    }

    #[test]
    fn severity_parses_from_config_strings() {
        assert_eq!("warning".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Error));
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn result_counts_include_unnecessary_directives() {
        let mut result = LintResult::new();
        result.offenses.push(offense_at(1, 0, "a"));
        let mut unused = offense_at(2, 0, "herb-disable-comment-unnecessary");
        unused.severity = Severity::Warning;
        result.unnecessary_directives.push(unused);

        assert_eq!(result.count_by_severity(), (1, 1, 0));
        assert!(result.has_errors());
        assert_eq!(result.all_offenses().len(), 2);
    }
}
