/*
 * Character Codes
 *
 * Character constants and classifiers shared by the lexer and the page scanner
 */
#![allow(non_upper_case_globals)]

// Special characters
pub const EOF: char = '\0';
pub const TAB: char = '\t';
pub const LF: char = '\n';
pub const CR: char = '\r';
pub const SPACE: char = ' ';
pub const NBSP: char = '\u{00A0}';
pub const NEL: char = '\u{0085}';

// Punctuation
pub const BANG: char = '!';
pub const DQ: char = '"';
pub const HASH: char = '#';
pub const PERCENT: char = '%';
pub const AMPERSAND: char = '&';
pub const SQ: char = '\'';
pub const LPAREN: char = '(';
pub const RPAREN: char = ')';
pub const STAR: char = '*';
pub const PLUS: char = '+';
pub const COMMA: char = ',';
pub const MINUS: char = '-';
pub const PERIOD: char = '.';
pub const SLASH: char = '/';
pub const COLON: char = ':';
pub const LT: char = '<';
pub const EQ: char = '=';
pub const GT: char = '>';

// Brackets
pub const LBRACKET: char = '[';
pub const BACKSLASH: char = '\\';
pub const RBRACKET: char = ']';
pub const CARET: char = '^';
pub const UNDERSCORE: char = '_';
pub const BT: char = '`';
/// Prime quote, reserved for whitespace-sensitive literals
pub const PRIME: char = '\u{2032}';

// Braces
pub const LBRACE: char = '{';
pub const BAR: char = '|';
pub const RBRACE: char = '}';
pub const TILDA: char = '~';

// Letters
pub const A: char = 'A';
pub const Z: char = 'Z';
pub const a: char = 'a';
pub const e: char = 'e';
pub const z: char = 'z';

// Digits
pub const ZERO: char = '0';
pub const NINE: char = '9';

/// Check if character is whitespace
pub fn is_whitespace(ch: char) -> bool {
    ch == SPACE || (TAB..=CR).contains(&ch) || ch == NBSP || ch == NEL
}

/// Check if character is a digit
pub fn is_digit(ch: char) -> bool {
    (ZERO..=NINE).contains(&ch)
}

/// Check if character is ASCII letter
pub fn is_ascii_letter(ch: char) -> bool {
    (a..=z).contains(&ch) || (A..=Z).contains(&ch)
}

/// Check if character is newline
pub fn is_new_line(ch: char) -> bool {
    ch == LF || ch == CR
}

/// Check if character opens a string literal
pub fn is_quote(ch: char) -> bool {
    ch == SQ || ch == DQ || ch == BT || ch == PRIME
}

/// Check if character can start an operator
pub fn is_operator_start(ch: char) -> bool {
    matches!(
        ch,
        LT | GT | EQ | BANG | PLUS | MINUS | STAR | SLASH | PERCENT | BAR | AMPERSAND | CARET | TILDA
    )
}

/// Check if character can start an identifier
pub fn is_identifier_start(ch: char) -> bool {
    is_ascii_letter(ch) || ch == UNDERSCORE
}

/// Check if character can be part of an identifier
pub fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || is_digit(ch)
}
