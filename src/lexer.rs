// File: src/lexer.rs
//
// Lexical analyzer (tokenizer) for the yy language.
// Converts source text into a stream of tokens for parsing.
//
// Supports:
// - Keywords: true, false, null, yif, yels, yall, yoyo, yolo, yeet, yikes
// - Identifiers and number literals (integer and float)
// - Double-quoted strings with escape sequences and {expr} interpolation
// - Operators: + - * / % == != < > <= >= && || ! << := = += -= *= /= .. %{
// - Punctuation: ( ) { } [ ] , : \
// - Line comments starting with //

use crate::errors::{SourceLocation, YyError};

/// One piece of an interpolated string. Expression spans are kept as raw
/// source text; the parser lexes and parses them recursively.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Text(String),
    Expr(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Number(f64),
    Str(String),
    TemplateStr(Vec<TemplatePart>),
    Keyword(String),
    Operator(String),
    Punctuation(char),
    Eof,
}

impl TokenKind {
    /// Human-readable description used in parse error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => format!("identifier '{}'", name),
            TokenKind::Number(_) => "number".to_string(),
            TokenKind::Str(_) | TokenKind::TemplateStr(_) => "string".to_string(),
            TokenKind::Keyword(k) => format!("'{}'", k),
            TokenKind::Operator(op) => format!("'{}'", op),
            TokenKind::Punctuation(c) => format!("'{}'", c),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

const KEYWORDS: &[&str] =
    &["true", "false", "null", "yif", "yels", "yall", "yoyo", "yolo", "yeet", "yikes"];

/// Tokenizes yy source code into a vector of tokens ending with Eof.
///
/// Fails with a LexError on invalid characters and on unterminated strings
/// or interpolation spans.
pub fn tokenize(source: &str) -> Result<Vec<Token>, YyError> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Lexer { chars: source.chars().collect(), pos: 0, line: 1, column: 1 }
    }

    fn run(mut self) -> Result<Vec<Token>, YyError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            let start = self.location();
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.bump();
                }
                '/' if self.peek_at(1) == Some('/') => {
                    while let Some(ch) = self.peek() {
                        if ch == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                '"' => {
                    let kind = self.scan_string(start)?;
                    tokens.push(Token { kind, line: start.line, column: start.column });
                }
                '0'..='9' => {
                    let kind = self.scan_number(start)?;
                    tokens.push(Token { kind, line: start.line, column: start.column });
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let mut ident = String::new();
                    while let Some(ch) = self.peek() {
                        if ch.is_ascii_alphanumeric() || ch == '_' {
                            ident.push(ch);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    let kind = if KEYWORDS.contains(&ident.as_str()) {
                        TokenKind::Keyword(ident)
                    } else {
                        TokenKind::Identifier(ident)
                    };
                    tokens.push(Token { kind, line: start.line, column: start.column });
                }
                _ => {
                    let kind = self.scan_operator(start)?;
                    tokens.push(Token { kind, line: start.line, column: start.column });
                }
            }
        }

        tokens.push(Token { kind: TokenKind::Eof, line: self.line, column: self.column });
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    /// Consumes the second character of a two-char operator when it matches
    fn two_char(&mut self, next: char, op: &str, single: &str) -> TokenKind {
        if self.peek() == Some(next) {
            self.bump();
            TokenKind::Operator(op.to_string())
        } else {
            TokenKind::Operator(single.to_string())
        }
    }

    fn scan_operator(&mut self, start: SourceLocation) -> Result<TokenKind, YyError> {
        let c = match self.bump() {
            Some(c) => c,
            None => return Ok(TokenKind::Eof),
        };

        let kind = match c {
            '(' | ')' | '{' | '}' | '[' | ']' | ',' | '\\' => TokenKind::Punctuation(c),
            ':' => {
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::Operator(":=".to_string())
                } else {
                    TokenKind::Punctuation(':')
                }
            }
            '=' => self.two_char('=', "==", "="),
            '!' => self.two_char('=', "!=", "!"),
            '>' => self.two_char('=', ">=", ">"),
            '<' => match self.peek() {
                Some('=') => {
                    self.bump();
                    TokenKind::Operator("<=".to_string())
                }
                Some('<') => {
                    self.bump();
                    TokenKind::Operator("<<".to_string())
                }
                _ => TokenKind::Operator("<".to_string()),
            },
            '+' => self.two_char('=', "+=", "+"),
            '-' => self.two_char('=', "-=", "-"),
            '*' => self.two_char('=', "*=", "*"),
            '/' => self.two_char('=', "/=", "/"),
            '%' => {
                if self.peek() == Some('{') {
                    self.bump();
                    TokenKind::Operator("%{".to_string())
                } else {
                    TokenKind::Operator("%".to_string())
                }
            }
            '&' => {
                if self.peek() == Some('&') {
                    self.bump();
                    TokenKind::Operator("&&".to_string())
                } else {
                    return Err(YyError::lex("unexpected character '&'", start));
                }
            }
            '|' => {
                if self.peek() == Some('|') {
                    self.bump();
                    TokenKind::Operator("||".to_string())
                } else {
                    return Err(YyError::lex("unexpected character '|'", start));
                }
            }
            '.' => {
                if self.peek() == Some('.') {
                    self.bump();
                    TokenKind::Operator("..".to_string())
                } else {
                    return Err(YyError::lex("unexpected character '.'", start));
                }
            }
            other => {
                return Err(YyError::lex(format!("unexpected character {:?}", other), start));
            }
        };
        Ok(kind)
    }

    fn scan_number(&mut self, start: SourceLocation) -> Result<TokenKind, YyError> {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }

        // A '.' only belongs to the number when a digit follows;
        // "0..10" is a range over two integer literals.
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.bump();
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    text.push(ch);
                    self.bump();
                } else {
                    break;
                }
            }
        }

        let value = text
            .parse::<f64>()
            .map_err(|_| YyError::lex(format!("invalid number literal '{}'", text), start))?;
        Ok(TokenKind::Number(value))
    }

    fn scan_string(&mut self, start: SourceLocation) -> Result<TokenKind, YyError> {
        self.bump(); // opening quote

        let mut parts: Vec<TemplatePart> = Vec::new();
        let mut text = String::new();

        loop {
            let ch = match self.bump() {
                Some(ch) => ch,
                None => return Err(YyError::lex("unterminated string", start)),
            };

            match ch {
                '"' => break,
                '\\' => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('\\') => text.push('\\'),
                    Some('"') => text.push('"'),
                    Some('{') => text.push('{'),
                    Some('}') => text.push('}'),
                    Some(other) => text.push(other),
                    None => return Err(YyError::lex("unterminated string", start)),
                },
                '{' => {
                    if !text.is_empty() {
                        parts.push(TemplatePart::Text(std::mem::take(&mut text)));
                    }
                    parts.push(TemplatePart::Expr(self.scan_interpolation(start)?));
                }
                other => text.push(other),
            }
        }

        if parts.is_empty() {
            return Ok(TokenKind::Str(text));
        }
        if !text.is_empty() {
            parts.push(TemplatePart::Text(text));
        }
        Ok(TokenKind::TemplateStr(parts))
    }

    /// Collects the raw source of one `{expr}` span, tracking brace depth and
    /// skipping over nested string literals so their braces don't count.
    fn scan_interpolation(&mut self, start: SourceLocation) -> Result<String, YyError> {
        let mut src = String::new();
        let mut depth = 1usize;

        loop {
            let ch = match self.bump() {
                Some(ch) => ch,
                None => return Err(YyError::lex("unterminated interpolation", start)),
            };

            match ch {
                '{' => {
                    depth += 1;
                    src.push(ch);
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(src);
                    }
                    src.push(ch);
                }
                '"' => {
                    src.push('"');
                    loop {
                        let inner = match self.bump() {
                            Some(inner) => inner,
                            None => {
                                return Err(YyError::lex("unterminated interpolation", start))
                            }
                        };
                        src.push(inner);
                        match inner {
                            '\\' => {
                                if let Some(escaped) = self.bump() {
                                    src.push(escaped);
                                }
                            }
                            '"' => break,
                            _ => {}
                        }
                    }
                }
                other => src.push(other),
            }
        }
    }
}
