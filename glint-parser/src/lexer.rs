use std::fmt;

use glint_source::{LexicalError, Position};
use logos::Logos;

#[derive(Debug, Logos, Clone, PartialEq)]
pub enum TokenKind {
    // literals
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse())]
    Number(f64),
    #[regex(r#""[^"]*""#, |lex| lex.slice()[1..lex.slice().len() - 1].to_string())]
    Str(String),

    // identifiers
    /// Keywords are lexed as identifiers first and reclassified by [`keyword`].
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // punctuation
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,

    // operators
    #[token("-")]
    Minus, // NOTE: can also be unary
    #[token("+")]
    Plus,
    #[token("/")]
    Slash,
    #[token("*")]
    Star,
    #[token("!")]
    Bang,
    #[token("!=")]
    BangEqual,
    #[token("=")]
    Equal,
    #[token("==")]
    EqualEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,

    // keywords
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    // misc
    #[regex(r"[ \t\r\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)] // single line comments
    #[error]
    Error,

    /// Only generated once the last line has been scanned.
    Eof,
}

/// Looks `ident` up in the keyword table.
pub fn keyword(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "and" => TokenKind::And,
        "class" => TokenKind::Class,
        "else" => TokenKind::Else,
        "false" => TokenKind::False,
        "fun" => TokenKind::Fun,
        "for" => TokenKind::For,
        "if" => TokenKind::If,
        "nil" => TokenKind::Nil,
        "or" => TokenKind::Or,
        "print" => TokenKind::Print,
        "return" => TokenKind::Return,
        "super" => TokenKind::Super,
        "this" => TokenKind::This,
        "true" => TokenKind::True,
        "var" => TokenKind::Var,
        "while" => TokenKind::While,
        _ => return None,
    };
    Some(kind)
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            TokenKind::Number(val) => return write!(f, "number `{}`", val),
            TokenKind::Str(val) => return write!(f, "string \"{}\"", val),
            TokenKind::Identifier(ident) => return write!(f, "identifier `{}`", ident),
            TokenKind::Error => return write!(f, "invalid token"),
            TokenKind::Eof => return write!(f, "end of input"),
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Semicolon => ";",
            TokenKind::Minus => "-",
            TokenKind::Plus => "+",
            TokenKind::Slash => "/",
            TokenKind::Star => "*",
            TokenKind::Bang => "!",
            TokenKind::BangEqual => "!=",
            TokenKind::Equal => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::And => "and",
            TokenKind::Class => "class",
            TokenKind::Else => "else",
            TokenKind::False => "false",
            TokenKind::Fun => "fun",
            TokenKind::For => "for",
            TokenKind::If => "if",
            TokenKind::Nil => "nil",
            TokenKind::Or => "or",
            TokenKind::Print => "print",
            TokenKind::Return => "return",
            TokenKind::Super => "super",
            TokenKind::This => "this",
            TokenKind::True => "true",
            TokenKind::Var => "var",
            TokenKind::While => "while",
        };
        write!(f, "`{}`", symbol)
    }
}

/// A lexed token with its location in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
    /// Length of the lexeme in bytes.
    pub len: usize,
}

/// Splits `source` into tokens, line by line. The returned stream always ends with a single
/// [`TokenKind::Eof`] token positioned one line past the last line.
#[tracing::instrument(level = "debug", skip_all)]
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexicalError> {
    let mut tokens = Vec::new();
    let mut line_count = 0;

    for (index, line) in source.lines().enumerate() {
        line_count = index + 1;
        let mut lexer = TokenKind::lexer(line);

        while let Some(kind) = lexer.next() {
            let span = lexer.span();
            let position = Position::new(line_count, span.start + 1);
            let kind = match kind {
                TokenKind::Error => {
                    return Err(LexicalError {
                        lexeme: lexer.slice().to_string(),
                        position,
                    })
                }
                TokenKind::Identifier(ident) => keyword(&ident).unwrap_or(TokenKind::Identifier(ident)),
                kind => kind,
            };
            tokens.push(Token {
                kind,
                position,
                len: span.len(),
            });
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        position: Position::new(line_count + 1, 1),
        len: 0,
    });
    tracing::debug!(count = tokens.len(), "tokenized source");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_arithmetic_expression() {
        use TokenKind::*;
        assert_eq!(
            kinds("11 + (-2) * (6 + 5)"),
            vec![
                Number(11.0),
                Plus,
                LeftParen,
                Minus,
                Number(2.0),
                RightParen,
                Star,
                LeftParen,
                Number(6.0),
                Plus,
                Number(5.0),
                RightParen,
                Eof,
            ]
        );
    }

    #[test]
    fn test_lexemes_can_be_reconstructed() {
        let source = "var answer = 4.25; // the answer\nprint \"hi there\" != answer;";
        let lines: Vec<&str> = source.lines().collect();
        let lexemes: Vec<&str> = tokenize(source)
            .unwrap()
            .iter()
            .filter(|token| token.kind != TokenKind::Eof)
            .map(|token| {
                let line = lines[token.position.line - 1];
                let start = token.position.column - 1;
                &line[start..start + token.len]
            })
            .collect();
        assert_eq!(
            lexemes,
            vec!["var", "answer", "=", "4.25", ";", "print", "\"hi there\"", "!=", "answer", ";"]
        );
    }

    #[test]
    fn test_keywords_are_reclassified() {
        use TokenKind::*;
        assert_eq!(
            kinds("or orange this thistle _var"),
            vec![
                Or,
                Identifier("orange".to_string()),
                This,
                Identifier("thistle".to_string()),
                Identifier("_var".to_string()),
                Eof,
            ]
        );
    }

    #[test]
    fn test_two_character_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("! != = == > >= < <="),
            vec![Bang, BangEqual, Equal, EqualEqual, Greater, GreaterEqual, Less, LessEqual, Eof]
        );
    }

    #[test]
    fn test_string_literal() {
        let tokens = tokenize(r#"print "a b";"#).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Str("a b".to_string()));
        assert_eq!(tokens[1].len, 5);
    }

    #[test]
    fn test_comment_only_lines() {
        use TokenKind::*;
        assert_eq!(kinds("// nothing here\n   \n1 // one"), vec![Number(1.0), Eof]);
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("var a;\n  print a;").unwrap();
        let positions: Vec<(usize, usize)> = tokens
            .iter()
            .map(|token| (token.position.line, token.position.column))
            .collect();
        assert_eq!(
            positions,
            vec![(1, 1), (1, 5), (1, 6), (2, 3), (2, 9), (2, 10), (3, 1)]
        );
    }

    #[test]
    fn test_eof_only() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert_eq!(tokens[0].position, Position::new(1, 1));
    }

    #[test]
    fn test_unmatched_character() {
        let err = tokenize("var a = 1;\nvar b = a @ 2;").unwrap_err();
        assert_eq!(err.position, Position::new(2, 11));
        assert_eq!(err.lexeme, "@");
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("print \"abc;").unwrap_err();
        assert_eq!(err.position.line, 1);
        assert_eq!(err.position.column, 7);
    }
}
