//! Byte classifiers for the comment line grammar.
//!
//! Every token boundary in the grammar is decided by one of these
//! predicates. They operate on single bytes; anything outside ASCII falls in
//! no class at all.

/// Space or tab. Newlines never appear inside a comment line.
pub fn is_whitespace(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

pub fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

/// ASCII letters, digits and underscore.
pub fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Characters allowed in an unquoted string.
pub fn is_bare_string_char(c: u8) -> bool {
    is_ident_char(c)
        || matches!(
            c,
            b'@' | b'`'
                | b'!'
                | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'/'
                | b':'
                | b';'
                | b'<'
                | b'|'
                | b'>'
                | b'^'
                | b'~'
                | b'?'
                | b'\''
        )
}

/// Characters allowed between the quotes of a quoted string. The quote
/// itself only appears escaped.
pub fn is_quoted_string_char(c: u8) -> bool {
    is_bare_string_char(c)
        || matches!(
            c,
            b' ' | b'\t' | b'\\' | b'=' | b']' | b'[' | b'}' | b'{' | b','
        )
}

/// Whether `c` terminates a value. `None` is the end of input.
///
/// Inside an array a value can also stop on `,` (next bracketed element),
/// `]` (end of a bracketed array) or `"` (end of a legacy quoted array).
pub fn is_end_of_value(c: Option<u8>, inside_array: bool) -> bool {
    match c {
        None => true,
        Some(c) => is_whitespace(c) || (inside_array && matches!(c, b',' | b']' | b'"')),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_excludes_newlines() {
        assert!(is_whitespace(b' '));
        assert!(is_whitespace(b'\t'));
        assert!(!is_whitespace(b'\n'));
        assert!(!is_whitespace(b'\r'));
    }

    #[test]
    fn test_bare_string_chars() {
        for c in b"!#$%&'()*+-./0123456789:;<>?@ABCXYZ^_`abcxyz|~".iter() {
            assert!(is_bare_string_char(*c), "{}", *c as char);
        }
        for c in b" \t\"\\=[]{},".iter() {
            assert!(!is_bare_string_char(*c), "{}", *c as char);
        }
    }

    #[test]
    fn test_quoted_string_chars() {
        for c in b" \t\\=[]{},".iter() {
            assert!(is_quoted_string_char(*c));
        }
        assert!(!is_quoted_string_char(b'"'));
        assert!(!is_quoted_string_char(b'\n'));
        assert!(!is_quoted_string_char(0xC3));
    }

    #[test]
    fn test_end_of_value() {
        assert!(is_end_of_value(None, false));
        assert!(is_end_of_value(Some(b' '), false));
        assert!(!is_end_of_value(Some(b','), false));
        assert!(is_end_of_value(Some(b','), true));
        assert!(is_end_of_value(Some(b']'), true));
        assert!(is_end_of_value(Some(b'"'), true));
        assert!(!is_end_of_value(Some(b'}'), true));
    }
}
