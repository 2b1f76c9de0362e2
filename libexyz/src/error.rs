//! Error types for extended XYZ parsing.

use thiserror::Error;

/// Result type for extended XYZ operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying the file name and line number for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
    /// Zero-based line of the text being parsed, when it comes from a file.
    pub line: Option<usize>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
            line: None,
        }
    }

    /// The same context, pointing at another line.
    pub fn at_line(&self, line: usize) -> Self {
        Self {
            filename: self.filename.clone(),
            line: Some(line),
        }
    }

    /// Format a location suffix for error messages.
    pub fn loc_suffix(&self, col: usize) -> String {
        match (&self.filename, self.line) {
            (Some(name), Some(line)) => format!(" at {}:{} of <{}>", line + 1, col + 1, name),
            (Some(name), None) => format!(" at column {} of <{}>", col + 1, name),
            (None, Some(line)) => format!(" at {}:{}", line + 1, col + 1),
            (None, None) => format!(" at column {}", col + 1),
        }
    }
}

/// Error type for extended XYZ parsing and writing.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Line feed or carriage return inside a comment line.
    #[error("New line character inside the comment line{0}")]
    NewlineInComment(String),

    /// NUL byte inside a comment line.
    #[error("NUL character inside the comment line{0}")]
    NulInComment(String),

    #[error("Expected a key{0}")]
    ExpectedKey(String),

    #[error("Expected '=' after key{0}")]
    ExpectedEquals(String),

    /// No value grammar matched.
    #[error("Expected a value{0}")]
    ExpectedValue(String),

    #[error("Expected whitespace between key=value pairs{0}")]
    ExpectedWhitespace(String),

    #[error("Unterminated string{0}")]
    UnterminatedString(String),

    #[error("Bad character in string{0}")]
    BadCharInString(String),

    #[error("Quoted string can not end with '\\'{0}")]
    TrailingBackslash(String),

    #[error("Integer out of range{0}")]
    IntegerOverflow(String),

    /// Missing closing delimiter of an array.
    #[error("Expected '{0}' to finish the array{1}")]
    UnterminatedArray(char, String),

    #[error("Expected ',' between array values{0}")]
    ExpectedComma(String),

    #[error("Expected whitespace between array values{0}")]
    ExpectedSpaceInArray(String),

    #[error("Empty arrays are not supported{0}")]
    EmptyArray(String),

    #[error("Rows of a 2D array must have the same length{0}")]
    RaggedArray(String),

    #[error("Can not mix nested arrays and values{0}")]
    MixedNesting(String),

    #[error("Arrays with more than two dimensions are not supported{0}")]
    TooManyDimensions(String),

    #[error("Failed to allocate memory{0}")]
    OutOfMemory(String),

    #[error("Expected a string value for Properties{0}")]
    ExpectedPropertiesString(String),

    #[error("Multiple Properties in comment line{0}")]
    DuplicateProperties(String),

    #[error("Expected an identifier in Properties{0}")]
    ExpectedIdentifier(String),

    #[error("Expected ':' in Properties{0}")]
    ExpectedColon(String),

    #[error("Expected one of L/S/R/I in Properties, got \"{0}\"{1}")]
    InvalidPropertyType(String, String),

    #[error("Expected a column count in Properties{0}")]
    InvalidPropertyCount(String),

    #[error("Negative column count {0} in Properties{1}")]
    NegativePropertyCount(i64, String),

    #[error("Expected the number of atoms{0}")]
    MissingAtomCount(String),

    #[error("Invalid number of atoms \"{0}\"{1}")]
    InvalidAtomCount(String, String),

    #[error("Not enough lines in file for XYZ format{0}")]
    NotEnoughLines(String),

    #[error("Too many columns in Properties{0}")]
    TooManyColumns(String),

    /// Atom line with the wrong number of columns.
    #[error("Expected {0} values in atom line, got {1}{2}")]
    AtomColumnCount(usize, usize, String),

    /// Atom value that does not match its declared type.
    #[error("Invalid {1} value \"{0}\"{2}")]
    InvalidAtomValue(String, &'static str, String),

    #[error("Array of shape {0}x{1} can not hold {2} values")]
    InvalidShape(usize, usize, usize),

    #[error("Can not write non-finite real {0}")]
    NonFiniteReal(f64),

    #[error("Can not write string {0:?}")]
    UnrepresentableString(String),

    #[error("Info key can not be named Properties")]
    ReservedKey,

    #[error("Invalid property key {0:?}")]
    InvalidPropertyKey(String),

    #[error("Array {0:?} has {1} rows, expected {2}")]
    ArrayRowMismatch(String, usize, usize),

    #[error("Array {0:?} does not match the declared properties")]
    PropertyMismatch(String),

    #[error("Frame with {0} atoms declares no properties")]
    MissingProperties(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic parse error.
    #[error("{0}")]
    Generic(String),
}

impl ParseError {
    /// Create an error with location information.
    pub fn with_location(self, ctx: &ParseContext, col: usize) -> Self {
        let suffix = ctx.loc_suffix(col);
        match self {
            ParseError::NewlineInComment(_) => ParseError::NewlineInComment(suffix),
            ParseError::NulInComment(_) => ParseError::NulInComment(suffix),
            ParseError::ExpectedKey(_) => ParseError::ExpectedKey(suffix),
            ParseError::ExpectedEquals(_) => ParseError::ExpectedEquals(suffix),
            ParseError::ExpectedValue(_) => ParseError::ExpectedValue(suffix),
            ParseError::ExpectedWhitespace(_) => ParseError::ExpectedWhitespace(suffix),
            ParseError::UnterminatedString(_) => ParseError::UnterminatedString(suffix),
            ParseError::BadCharInString(_) => ParseError::BadCharInString(suffix),
            ParseError::TrailingBackslash(_) => ParseError::TrailingBackslash(suffix),
            ParseError::IntegerOverflow(_) => ParseError::IntegerOverflow(suffix),
            ParseError::UnterminatedArray(c, _) => ParseError::UnterminatedArray(c, suffix),
            ParseError::ExpectedComma(_) => ParseError::ExpectedComma(suffix),
            ParseError::ExpectedSpaceInArray(_) => ParseError::ExpectedSpaceInArray(suffix),
            ParseError::EmptyArray(_) => ParseError::EmptyArray(suffix),
            ParseError::RaggedArray(_) => ParseError::RaggedArray(suffix),
            ParseError::MixedNesting(_) => ParseError::MixedNesting(suffix),
            ParseError::TooManyDimensions(_) => ParseError::TooManyDimensions(suffix),
            ParseError::OutOfMemory(_) => ParseError::OutOfMemory(suffix),
            ParseError::ExpectedPropertiesString(_) => {
                ParseError::ExpectedPropertiesString(suffix)
            }
            ParseError::DuplicateProperties(_) => ParseError::DuplicateProperties(suffix),
            ParseError::ExpectedIdentifier(_) => ParseError::ExpectedIdentifier(suffix),
            ParseError::ExpectedColon(_) => ParseError::ExpectedColon(suffix),
            ParseError::InvalidPropertyType(text, _) => {
                ParseError::InvalidPropertyType(text, suffix)
            }
            ParseError::InvalidPropertyCount(_) => ParseError::InvalidPropertyCount(suffix),
            ParseError::NegativePropertyCount(n, _) => {
                ParseError::NegativePropertyCount(n, suffix)
            }
            ParseError::MissingAtomCount(_) => ParseError::MissingAtomCount(suffix),
            ParseError::InvalidAtomCount(text, _) => ParseError::InvalidAtomCount(text, suffix),
            ParseError::NotEnoughLines(_) => ParseError::NotEnoughLines(suffix),
            ParseError::TooManyColumns(_) => ParseError::TooManyColumns(suffix),
            ParseError::AtomColumnCount(expected, got, _) => {
                ParseError::AtomColumnCount(expected, got, suffix)
            }
            ParseError::InvalidAtomValue(text, kind, _) => {
                ParseError::InvalidAtomValue(text, kind, suffix)
            }
            ParseError::Generic(msg) => ParseError::Generic(format!("{}{}", msg, suffix)),
            // Writer and I/O errors have no position in a line.
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loc_suffix() {
        assert_eq!(ParseContext::default().loc_suffix(4), " at column 5");
        let ctx = ParseContext::new(Some("traj.xyz"));
        assert_eq!(ctx.loc_suffix(0), " at column 1 of <traj.xyz>");
        assert_eq!(ctx.at_line(1).loc_suffix(6), " at 2:7 of <traj.xyz>");
        assert_eq!(ParseContext::default().at_line(9).loc_suffix(0), " at 10:1");
    }

    #[test]
    fn test_with_location_replaces_suffix() {
        let ctx = ParseContext::default();
        let err = ParseError::UnterminatedArray(']', String::new()).with_location(&ctx, 3);
        assert_eq!(err.to_string(), "Expected ']' to finish the array at column 4");
        let err = err.with_location(&ctx, 0);
        assert_eq!(err.to_string(), "Expected ']' to finish the array at column 1");
    }
}
