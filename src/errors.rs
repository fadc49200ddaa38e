// File: src/errors.rs
//
// Error handling and reporting for the yy interpreter.
// Provides one structured error type covering every stage (lexing, parsing,
// evaluation) with source location information and pretty-printed messages.

use colored::Colorize;
use std::fmt;

/// Source location information for tracking where code appears in a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Placeholder for errors raised without a tracked position
    pub fn unknown() -> Self {
        Self { line: 0, column: 0 }
    }

    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The fault taxonomy surfaced by `execute()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid character or unterminated string/interpolation
    LexError,
    /// Token stream doesn't form a valid program
    ParseError,
    /// Unbound identifier on lookup or plain assignment
    ReferenceError,
    /// Operator or builtin argument of the wrong type (outside yolo mode)
    TypeError,
    /// Function called with the wrong number of arguments
    ArityError,
    /// Array or string subscript out of bounds
    IndexError,
    /// `/` or `%` with a zero divisor, yolo mode included
    DivideByZero,
    /// Explicit `yikes(...)` in the program
    UserAbort,
    /// Evaluation budget exhausted, likely an unconditioned loop
    ResourceExceeded,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::LexError => write!(f, "Lex Error"),
            ErrorKind::ParseError => write!(f, "Parse Error"),
            ErrorKind::ReferenceError => write!(f, "Reference Error"),
            ErrorKind::TypeError => write!(f, "Type Error"),
            ErrorKind::ArityError => write!(f, "Arity Error"),
            ErrorKind::IndexError => write!(f, "Index Error"),
            ErrorKind::DivideByZero => write!(f, "Division By Zero"),
            ErrorKind::UserAbort => write!(f, "Yikes"),
            ErrorKind::ResourceExceeded => write!(f, "Resource Exceeded"),
        }
    }
}

/// A structured error with location information
#[derive(Debug, Clone)]
pub struct YyError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: SourceLocation,
    pub source_line: Option<String>,
    pub suggestion: Option<String>,
}

impl YyError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Self { kind, message: message.into(), location, source_line: None, suggestion: None }
    }

    /// Runtime faults mostly originate without a tracked position
    pub fn runtime(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, SourceLocation::unknown())
    }

    pub fn lex(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::LexError, message, location)
    }

    pub fn parse(expected: &str, found: &str, location: SourceLocation) -> Self {
        Self::new(
            ErrorKind::ParseError,
            format!("expected {}, found {}", expected, found),
            location,
        )
    }

    pub fn reference(name: &str) -> Self {
        Self::runtime(ErrorKind::ReferenceError, format!("identifier not found: {}", name))
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::runtime(ErrorKind::TypeError, message)
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// Attaches the offending source line, looked up from the original text.
    /// A no-op when the location is unknown or the line is already attached.
    pub fn with_source_text(mut self, source: &str) -> Self {
        if self.source_line.is_none() && self.location.is_known() {
            self.source_line =
                source.lines().nth(self.location.line - 1).map(|l| l.to_string());
        }
        self
    }
}

impl fmt::Display for YyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind_str = format!("{}", self.kind);
        write!(f, "{}: {}", kind_str.red().bold(), self.message.bold())?;

        if self.location.is_known() {
            let location_str = format!("  --> {}", self.location);
            write!(f, "\n{}", location_str.bright_blue())?;
        }

        if let Some(ref source) = self.source_line {
            let line_num = self.location.line;
            let col_num = self.location.column;

            write!(f, "\n   {}", "|".bright_blue())?;
            write!(
                f,
                "\n{} {} {}",
                format!("{:3}", line_num).bright_blue(),
                "|".bright_blue(),
                source
            )?;
            write!(
                f,
                "\n   {} {}{}",
                "|".bright_blue(),
                " ".repeat(col_num.saturating_sub(1)),
                "^".red().bold()
            )?;
        }

        if let Some(ref suggestion) = self.suggestion {
            write!(
                f,
                "\n   {} {}",
                "=".bright_green(),
                format!("did you mean '{}'?", suggestion).bright_green()
            )?;
        }

        Ok(())
    }
}

impl std::error::Error for YyError {}

/// Computes the Levenshtein distance between two strings,
/// used for "did you mean?" suggestions on unbound identifiers
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    for (i, row) in matrix.iter_mut().enumerate().take(len1 + 1) {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            matrix[i][j] = std::cmp::min(
                std::cmp::min(matrix[i - 1][j] + 1, matrix[i][j - 1] + 1),
                matrix[i - 1][j - 1] + cost,
            );
        }
    }

    matrix[len1][len2]
}

/// Find the closest match from a list of candidates.
/// Returns None if no candidate is within editing distance 3.
pub fn find_closest_match<'a, I>(target: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        let distance = levenshtein_distance(target, candidate);
        if distance <= 3 && distance < best_distance {
            best_distance = distance;
            best_match = Some(candidate.to_string());
        }
    }

    best_match
}
