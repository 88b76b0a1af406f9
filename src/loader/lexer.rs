//! Tokenizer for the `schema.rb` subset.

use super::LoadError;
use once_cell::sync::Lazy;
use regex::Regex;

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*[?!]?").unwrap());

/// Integer or float literal, `2024_01_15` style separators allowed
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d[\d_]*(?:(\.)\d[\d_]*)?(?:[eE][+-]?\d+)?").unwrap()
});

/// `%w[a b]` / `%i[a b]` word arrays
static WORD_LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%([wWiI])[\[(]([^\])]*)[\])]").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    Symbol(String),
    /// Keyword argument name (`null:`)
    Label(String),
    Int(i64),
    Float(f64),
    /// Lambda literal kept as source text
    Lambda(String),
    /// `%w[]` (strings) or `%i[]` (symbols)
    WordList { words: Vec<String>, symbols: bool },
    Comma,
    Dot,
    ColonColon,
    HashRocket,
    Minus,
    Pipe,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Newline,
}

impl Token {
    /// Short description used in syntax errors
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("`{}`", s),
            Token::Str(s) => format!("string {:?}", s),
            Token::Symbol(s) => format!("symbol :{}", s),
            Token::Label(s) => format!("`{}:`", s),
            Token::Int(n) => format!("number {}", n),
            Token::Float(n) => format!("number {}", n),
            Token::Lambda(_) => "lambda".to_string(),
            Token::WordList { .. } => "word list".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Dot => "`.`".to_string(),
            Token::ColonColon => "`::`".to_string(),
            Token::HashRocket => "`=>`".to_string(),
            Token::Minus => "`-`".to_string(),
            Token::Pipe => "`|`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::LBrace => "`{`".to_string(),
            Token::RBrace => "`}`".to_string(),
            Token::Newline => "end of line".to_string(),
        }
    }
}

/// Token with the 1-based line it starts on
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    tokens: Vec<Spanned>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Spanned>, LoadError> {
        while let Some(c) = self.peek_char() {
            match c {
                ' ' | '\t' | '\r' => self.pos += 1,
                '\n' | ';' => {
                    self.push(Token::Newline);
                    self.pos += 1;
                    if c == '\n' {
                        self.line += 1;
                    }
                }
                '\\' if self.rest().starts_with("\\\n") => {
                    self.pos += 2;
                    self.line += 1;
                }
                '#' => self.skip_comment(),
                '"' | '\'' => {
                    let line = self.line;
                    let s = self.read_string(c)?;
                    self.push_string_or_label(s, line);
                }
                ':' => self.read_colon()?,
                '-' if self.rest().starts_with("->") => self.read_lambda()?,
                '-' => {
                    self.push(Token::Minus);
                    self.pos += 1;
                }
                '=' if self.rest().starts_with("=>") => {
                    self.push(Token::HashRocket);
                    self.pos += 2;
                }
                '%' => self.read_word_list()?,
                ',' => self.single(Token::Comma),
                '.' => self.single(Token::Dot),
                '|' => self.single(Token::Pipe),
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                '[' => self.single(Token::LBracket),
                ']' => self.single(Token::RBracket),
                '{' => self.single(Token::LBrace),
                '}' => self.single(Token::RBrace),
                c if c.is_ascii_digit() => self.read_number()?,
                c if c.is_ascii_alphabetic() || c == '_' => self.read_ident(),
                other => {
                    return Err(LoadError::new(
                        self.line,
                        format!("unexpected character {:?}", other),
                    ))
                }
            }
        }
        Ok(self.tokens)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(Spanned {
            token,
            line: self.line,
        });
    }

    fn single(&mut self, token: Token) {
        self.push(token);
        self.pos += 1;
    }

    fn skip_comment(&mut self) {
        match self.rest().find('\n') {
            Some(offset) => self.pos += offset,
            None => self.pos = self.src.len(),
        }
    }

    /// `name:` directly followed by a colon that does not start `::`
    fn at_label_colon(&self) -> bool {
        self.rest().starts_with(':') && !self.rest().starts_with("::")
    }

    fn read_ident(&mut self) {
        let ident = match IDENT_RE.find(self.rest()) {
            Some(m) => m.as_str().to_string(),
            None => return,
        };
        self.pos += ident.len();

        if self.at_label_colon() {
            self.pos += 1;
            self.push(Token::Label(ident));
        } else {
            self.push(Token::Ident(ident));
        }
    }

    fn push_string_or_label(&mut self, s: String, line: usize) {
        if self.at_label_colon() {
            self.pos += 1;
            self.push_at(Token::Label(s), line);
        } else {
            self.push_at(Token::Str(s), line);
        }
    }

    fn read_number(&mut self) -> Result<(), LoadError> {
        let (text, is_float) = match NUMBER_RE.captures(self.rest()) {
            Some(caps) => {
                let text = caps[0].to_string();
                let is_float = caps.get(1).is_some() || text.contains(['e', 'E']);
                (text, is_float)
            }
            None => return Err(LoadError::new(self.line, "malformed number")),
        };
        self.pos += text.len();

        let digits = text.replace('_', "");
        let token = if is_float {
            digits.parse().map(Token::Float).ok()
        } else {
            digits.parse().map(Token::Int).ok()
        };
        match token {
            Some(token) => {
                self.push(token);
                Ok(())
            }
            None => Err(LoadError::new(
                self.line,
                format!("number out of range: {}", text),
            )),
        }
    }

    fn read_string(&mut self, quote: char) -> Result<String, LoadError> {
        let start_line = self.line;
        self.pos += 1;
        let mut value = String::new();
        let mut chars = self.rest().char_indices();

        while let Some((offset, c)) = chars.next() {
            match c {
                c if c == quote => {
                    self.pos += offset + 1;
                    return Ok(value);
                }
                '\\' => {
                    let escaped = match chars.next() {
                        Some((_, e)) => e,
                        None => break,
                    };
                    match (quote, escaped) {
                        ('"', 'n') => value.push('\n'),
                        ('"', 't') => value.push('\t'),
                        (_, '\\') => value.push('\\'),
                        (q, e) if e == q => value.push(e),
                        (_, e) => {
                            value.push('\\');
                            value.push(e);
                        }
                    }
                    if escaped == '\n' {
                        self.line += 1;
                    }
                }
                '\n' => {
                    self.line += 1;
                    value.push(c);
                }
                c => value.push(c),
            }
        }

        Err(LoadError::new(start_line, "unterminated string literal"))
    }

    fn read_colon(&mut self) -> Result<(), LoadError> {
        if self.rest().starts_with("::") {
            self.push(Token::ColonColon);
            self.pos += 2;
            return Ok(());
        }

        self.pos += 1;
        match self.peek_char() {
            Some('"') => {
                let line = self.line;
                let s = self.read_string('"')?;
                self.push_at(Token::Symbol(s), line);
                Ok(())
            }
            Some(_) => match IDENT_RE.find(self.rest()) {
                Some(m) => {
                    let name = m.as_str().to_string();
                    self.pos += name.len();
                    self.push(Token::Symbol(name));
                    Ok(())
                }
                None => Err(LoadError::new(self.line, "unexpected `:`")),
            },
            None => Err(LoadError::new(self.line, "unexpected `:` at end of input")),
        }
    }

    /// Capture `-> { ... }` verbatim, honoring nested braces and strings
    fn read_lambda(&mut self) -> Result<(), LoadError> {
        let src = self.src;
        let start = self.pos;
        let start_line = self.line;
        let bytes = src.as_bytes();
        let mut i = self.pos + 2;
        let mut depth = 0usize;
        let mut quote: Option<u8> = None;

        while i < bytes.len() {
            let b = bytes[i];
            match quote {
                Some(q) => {
                    if b == b'\\' {
                        i += 1;
                    } else if b == q {
                        quote = None;
                    }
                }
                None => match b {
                    b'"' | b'\'' => quote = Some(b),
                    b'{' => depth += 1,
                    b'}' => {
                        if depth == 0 {
                            break;
                        }
                        depth -= 1;
                        if depth == 0 {
                            let raw = src[start..=i].to_string();
                            self.line += raw.matches('\n').count();
                            self.pos = i + 1;
                            self.push_at(Token::Lambda(raw), start_line);
                            return Ok(());
                        }
                    }
                    b'\n' if depth == 0 => break,
                    _ => {}
                },
            }
            i += 1;
        }

        Err(LoadError::new(start_line, "unterminated lambda"))
    }

    fn push_at(&mut self, token: Token, line: usize) {
        self.tokens.push(Spanned { token, line });
    }

    fn read_word_list(&mut self) -> Result<(), LoadError> {
        let (kind, body, len) = match WORD_LIST_RE.captures(self.rest()) {
            Some(caps) => (caps[1].to_lowercase(), caps[2].to_string(), caps[0].len()),
            None => return Err(LoadError::new(self.line, "unexpected `%`")),
        };
        self.pos += len;
        let words = body.split_whitespace().map(str::to_string).collect();
        self.push(Token::WordList {
            words,
            symbols: kind == "i",
        });
        self.line += body.matches('\n').count();
        Ok(())
    }
}
