use std::iter::FusedIterator;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

pub type ScanResult<A> = Result<A, ScanError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenContents<'a> {
    // One-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Asterisk,
    // One- or two-character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    // Literals
    Identifier(&'a str),
    String(&'a str),
    Number(&'a str),
    // Keywords
    And,
    Class,
    Else,
    False,
    For,
    Fun,
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
    Eof,
}

/// A single lexeme. `lexeme` is the exact source slice, quotes included for strings.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Token<'a> {
    pub contents: TokenContents<'a>,
    pub lexeme: &'a str,
    pub line: usize,
}

impl<'a> Token<'a> {
    pub fn new(contents: TokenContents<'a>, lexeme: &'a str, line: usize) -> Self {
        Self {
            contents,
            lexeme,
            line,
        }
    }

    pub fn eof(line: usize) -> Self {
        Self::new(TokenContents::Eof, "", line)
    }

    pub fn is_eof(&self) -> bool {
        self.contents == TokenContents::Eof
    }
}

pub struct Scanner<'a> {
    source: &'a str,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    pub fn iter(&self) -> SourceIterator<'a> {
        SourceIterator::new(self.source)
    }
}

/// Lazily scans one token per call to `next`. Lexical errors are yielded as `Err` items
/// and scanning carries on afterwards; the stream ends with exactly one `Eof` token.
pub struct SourceIterator<'a> {
    source: &'a str,
    graphemes: Vec<(usize, &'a str)>,
    start: usize,
    current: usize,
    line: usize,
    finished: bool,
}

impl<'a> SourceIterator<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            graphemes: source.grapheme_indices(true).collect(),
            start: 0,
            current: 0,
            line: 1,
            finished: false,
        }
    }

    fn byte_offset(&self, grapheme: usize) -> usize {
        self.graphemes
            .get(grapheme)
            .map_or(self.source.len(), |(offset, _)| *offset)
    }

    fn lexeme(&self) -> &'a str {
        &self.source[self.byte_offset(self.start)..self.byte_offset(self.current)]
    }

    fn get_and_advance(&mut self) -> Option<&'a str> {
        let (_, res) = *self.graphemes.get(self.current)?;
        self.current += 1;
        Some(res)
    }

    fn peek(&self) -> Option<&'a str> {
        self.graphemes.get(self.current).map(|(_, g)| *g)
    }

    fn peek_peek(&self) -> Option<&'a str> {
        self.graphemes.get(self.current + 1).map(|(_, g)| *g)
    }

    fn advance_if_matches(&mut self, c: &str) -> bool {
        if self.peek() == Some(c) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                " " | "\t" | "\r" => {
                    let _ = self.get_and_advance();
                }
                "\n" | "\r\n" => {
                    let _ = self.get_and_advance();
                    self.line += 1;
                }
                "/" if self.peek_peek() == Some("/") => {
                    while let Some(c) = self.peek() {
                        if is_newline(c) {
                            break;
                        }
                        let _ = self.get_and_advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn make_token(&self, contents: TokenContents<'a>) -> Token<'a> {
        Token::new(contents, self.lexeme(), self.line)
    }

    fn string(&mut self) -> ScanResult<Token<'a>> {
        let starting_line = self.line;
        while let Some(c) = self.get_and_advance() {
            if c == "\"" {
                let lexeme = self.lexeme();
                let contents = TokenContents::String(&lexeme[1..lexeme.len() - 1]);
                return Ok(Token::new(contents, lexeme, starting_line));
            }
            if is_newline(c) {
                self.line += 1;
            }
        }

        Err(ScanError::UnterminatedString { line: self.line })
    }

    fn skip_digits(&mut self) {
        while self.peek().map_or(false, is_digit) {
            let _ = self.get_and_advance();
        }
    }

    fn number(&mut self) -> Token<'a> {
        self.skip_digits();
        if self.peek() == Some(".") && self.peek_peek().map_or(false, is_digit) {
            // Consume .
            let _ = self.get_and_advance();
            self.skip_digits();
        }

        let lexeme = self.lexeme();
        self.make_token(TokenContents::Number(lexeme))
    }

    fn identifier(&mut self) -> Token<'a> {
        while self
            .peek()
            .map_or(false, |c| is_letter_or_underscore(c) || is_digit(c))
        {
            let _ = self.get_and_advance();
        }

        let identifier = self.lexeme();
        use TokenContents::*;
        self.make_token(match identifier {
            "and" => And,
            "class" => Class,
            "else" => Else,
            "false" => False,
            "for" => For,
            "fun" => Fun,
            "if" => If,
            "nil" => Nil,
            "or" => Or,
            "print" => Print,
            "return" => Return,
            "super" => Super,
            "this" => This,
            "true" => True,
            "var" => Var,
            "while" => While,
            identifier => Identifier(identifier),
        })
    }

    fn one_or_two(
        &mut self,
        second: &str,
        two: TokenContents<'a>,
        one: TokenContents<'a>,
    ) -> Token<'a> {
        if self.advance_if_matches(second) {
            self.make_token(two)
        } else {
            self.make_token(one)
        }
    }

    fn match_token(&mut self, c: &'a str) -> ScanResult<Token<'a>> {
        use TokenContents::*;
        let token = match c {
            "(" => self.make_token(LeftParen),
            ")" => self.make_token(RightParen),
            "{" => self.make_token(LeftBrace),
            "}" => self.make_token(RightBrace),
            ";" => self.make_token(Semicolon),
            "," => self.make_token(Comma),
            "." => self.make_token(Dot),
            "-" => self.make_token(Minus),
            "+" => self.make_token(Plus),
            "/" => self.make_token(Slash),
            "*" => self.make_token(Asterisk),
            "!" => self.one_or_two("=", BangEqual, Bang),
            "=" => self.one_or_two("=", EqualEqual, Equal),
            "<" => self.one_or_two("=", LessEqual, Less),
            ">" => self.one_or_two("=", GreaterEqual, Greater),
            "\"" => return self.string(),
            c if is_digit(c) => self.number(),
            c if is_letter_or_underscore(c) => self.identifier(),
            c => {
                return Err(ScanError::UnexpectedCharacter {
                    grapheme: c.to_string(),
                    line: self.line,
                })
            }
        };
        Ok(token)
    }
}

fn is_newline(c: &str) -> bool {
    matches!(c, "\n" | "\r\n")
}

fn is_digit(c: &str) -> bool {
    matches!(c.as_bytes(), [b] if b.is_ascii_digit())
}

fn is_letter_or_underscore(c: &str) -> bool {
    matches!(c.as_bytes(), [b] if b.is_ascii_alphabetic() || *b == b'_')
}

impl<'a> Iterator for SourceIterator<'a> {
    type Item = ScanResult<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        self.skip_whitespace();
        self.start = self.current;
        match self.get_and_advance() {
            Some(c) => Some(self.match_token(c)),
            None => {
                self.finished = true;
                Some(Ok(Token::eof(self.line)))
            }
        }
    }
}

impl<'a> FusedIterator for SourceIterator<'a> {}

#[derive(Error, Debug, PartialEq, Clone)]
pub enum ScanError {
    #[error("[line {line}] Error: Unexpected character.")]
    UnexpectedCharacter { grapheme: String, line: usize },
    #[error("[line {line}] Error: Unterminated string.")]
    UnterminatedString { line: usize },
}

impl ScanError {
    pub fn line(&self) -> usize {
        match self {
            ScanError::UnexpectedCharacter { line, .. } | ScanError::UnterminatedString { line } => {
                *line
            }
        }
    }
}
