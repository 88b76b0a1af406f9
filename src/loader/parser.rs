//! Statement parser for the `schema.rb` subset.
//!
//! Every statement is a method call: an optional receiver path
//! (`ActiveRecord::Schema[7.1].`, `t.`), a method name, arguments with or
//! without parentheses and an optional `do |params| ... end` block.

use super::lexer::{Spanned, Token};
use super::LoadError;
use crate::schema::{DirectiveArgs, OptionValue, Options};

/// One method call from the schema source
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Line the statement starts on
    pub line: usize,
    /// Receiver segments, e.g. `["ActiveRecord", "Schema[7.1]"]` or `["t"]`
    pub receiver: Vec<String>,
    pub method: String,
    pub args: DirectiveArgs,
    pub block: Option<Block>,
}

impl Statement {
    /// Receiver and method as a dotted path
    pub fn qualified_name(&self) -> String {
        if self.receiver.is_empty() {
            self.method.clone()
        } else {
            format!("{}.{}", self.receiver.join("."), self.method)
        }
    }
}

/// `do |params| ... end` block
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub params: Vec<String>,
    pub body: Vec<Statement>,
}

/// Deepest accepted nesting of blocks, lists, hashes and call arguments
const MAX_DEPTH: usize = 256;

pub struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    pub fn parse_program(&mut self) -> Result<Vec<Statement>, LoadError> {
        self.parse_statements(None)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|s| s.line)
            .unwrap_or(1)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos).map(|s| &s.token);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(s)) if s == keyword)
    }

    fn skip_newlines(&mut self) {
        while self.peek() == Some(&Token::Newline) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), LoadError> {
        match self.peek() {
            Some(token) if token == expected => {
                self.pos += 1;
                Ok(())
            }
            other => Err(self.unexpected(other, &expected.describe())),
        }
    }

    fn descend(&mut self, line: usize) -> Result<(), LoadError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(LoadError::new(line, "nesting too deep"));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn unexpected(&self, found: Option<&Token>, expected: &str) -> LoadError {
        let found = found
            .map(Token::describe)
            .unwrap_or_else(|| "end of input".to_string());
        LoadError::new(self.line(), format!("expected {}, found {}", expected, found))
    }

    /// Statements until end of input, or until `end` when inside a block
    /// opened on `block_line`
    fn parse_statements(&mut self, block_line: Option<usize>) -> Result<Vec<Statement>, LoadError> {
        let mut statements = Vec::new();

        loop {
            self.skip_newlines();
            match (self.peek(), block_line) {
                (None, None) => break,
                (None, Some(line)) => {
                    return Err(LoadError::new(line, "block is missing its `end`"));
                }
                (Some(Token::Ident(s)), Some(_)) if s == "end" => {
                    self.pos += 1;
                    break;
                }
                (Some(Token::Ident(s)), None) if s == "end" => {
                    return Err(LoadError::new(self.line(), "unexpected `end`"));
                }
                _ => statements.push(self.parse_statement()?),
            }
        }

        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Statement, LoadError> {
        let line = self.line();
        let mut segments = vec![self.parse_ident("a method call")?];

        loop {
            match self.peek() {
                Some(Token::ColonColon) | Some(Token::Dot) => {
                    self.pos += 1;
                    segments.push(self.parse_ident("a name")?);
                }
                // `Schema[7.1]`: the index stays part of the segment name.
                // After a method name `[` starts the arguments (`t.index ["a"]`).
                Some(Token::LBracket) if segments.last().is_some_and(|s| is_constant(s)) => {
                    self.pos += 1;
                    let index = self.parse_value()?;
                    self.expect(&Token::RBracket)?;
                    if let Some(last) = segments.last_mut() {
                        last.push_str(&format!("[{}]", index));
                    }
                }
                _ => break,
            }
        }

        let method = segments.pop().unwrap_or_default();
        let args = match self.peek() {
            Some(Token::LParen) => {
                self.pos += 1;
                let args = self.parse_arguments(Some(&Token::RParen))?;
                self.expect(&Token::RParen)?;
                args
            }
            Some(token) if starts_argument(token) => self.parse_arguments(None)?,
            _ => DirectiveArgs::default(),
        };

        let block = if self.at_keyword("do") {
            let block_line = self.line();
            self.pos += 1;
            self.descend(block_line)?;
            let params = self.parse_block_params()?;
            let body = self.parse_statements(Some(block_line))?;
            self.ascend();
            Some(Block { params, body })
        } else {
            None
        };

        match self.peek() {
            None | Some(Token::Newline) => {}
            Some(Token::Ident(s)) if s == "end" => {}
            other => return Err(self.unexpected(other, "end of statement")),
        }

        Ok(Statement {
            line,
            receiver: segments,
            method,
            args,
            block,
        })
    }

    fn parse_ident(&mut self, expected: &str) -> Result<String, LoadError> {
        match self.peek() {
            Some(Token::Ident(s)) if s != "do" && s != "end" => {
                self.pos += 1;
                Ok(s.clone())
            }
            other => Err(self.unexpected(other, expected)),
        }
    }

    fn parse_block_params(&mut self) -> Result<Vec<String>, LoadError> {
        let mut params = Vec::new();
        if self.peek() != Some(&Token::Pipe) {
            return Ok(params);
        }
        self.pos += 1;

        while self.peek() != Some(&Token::Pipe) {
            params.push(self.parse_ident("a block parameter")?);
            if self.peek() == Some(&Token::Comma) {
                self.pos += 1;
            }
        }
        self.pos += 1;
        Ok(params)
    }

    /// Comma separated arguments. Inside parentheses newlines are allowed
    /// anywhere; without them only after a comma.
    fn parse_arguments(&mut self, closing: Option<&Token>) -> Result<DirectiveArgs, LoadError> {
        let mut args = DirectiveArgs::default();

        loop {
            if closing.is_some() {
                self.skip_newlines();
                if self.peek() == closing {
                    break;
                }
            }

            self.parse_argument(&mut args.positional, &mut args.options)?;

            if closing.is_some() {
                self.skip_newlines();
            }
            if self.peek() == Some(&Token::Comma) {
                self.pos += 1;
                self.skip_newlines();
            } else {
                break;
            }
        }

        Ok(args)
    }

    /// One argument: `key: value`, `key => value` or a positional value
    fn parse_argument(
        &mut self,
        positional: &mut Vec<OptionValue>,
        options: &mut Options,
    ) -> Result<(), LoadError> {
        if let Some(Token::Label(key)) = self.peek() {
            self.pos += 1;
            self.skip_newlines();
            let value = self.parse_value()?;
            options.insert(key.clone(), value);
            return Ok(());
        }

        let value = self.parse_value()?;
        if self.peek() == Some(&Token::HashRocket) {
            self.pos += 1;
            self.skip_newlines();
            let key = hash_key(&value);
            options.insert(key, self.parse_value()?);
        } else {
            positional.push(value);
        }
        Ok(())
    }

    fn parse_value(&mut self) -> Result<OptionValue, LoadError> {
        let line = self.line();
        self.descend(line)?;
        let value = self.parse_value_inner(line)?;
        self.ascend();
        Ok(value)
    }

    fn parse_value_inner(&mut self, line: usize) -> Result<OptionValue, LoadError> {
        let token = match self.advance() {
            Some(token) => token,
            None => return Err(LoadError::new(line, "expected a value, found end of input")),
        };

        let value = match token {
            Token::Str(s) => OptionValue::Str(s.clone()),
            Token::Symbol(s) => OptionValue::Symbol(s.clone()),
            Token::Int(n) => OptionValue::Int(*n),
            Token::Float(n) => OptionValue::Float(*n),
            Token::Lambda(raw) => OptionValue::Raw(raw.clone()),
            Token::WordList { words, symbols } => OptionValue::List(
                words
                    .iter()
                    .map(|w| {
                        if *symbols {
                            OptionValue::Symbol(w.clone())
                        } else {
                            OptionValue::Str(w.clone())
                        }
                    })
                    .collect(),
            ),
            Token::Minus => match self.advance() {
                Some(Token::Int(n)) => OptionValue::Int(-n),
                Some(Token::Float(n)) => OptionValue::Float(-n),
                other => return Err(self.unexpected(other, "a number after `-`")),
            },
            Token::Ident(s) => match s.as_str() {
                "true" => OptionValue::Bool(true),
                "false" => OptionValue::Bool(false),
                "nil" => OptionValue::Nil,
                _ => self.parse_expression(s)?,
            },
            Token::LBracket => {
                let mut items = Vec::new();
                loop {
                    self.skip_newlines();
                    if self.peek() == Some(&Token::RBracket) {
                        break;
                    }
                    items.push(self.parse_value()?);
                    self.skip_newlines();
                    if self.peek() == Some(&Token::Comma) {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                self.expect(&Token::RBracket)?;
                OptionValue::List(items)
            }
            Token::LBrace => {
                let args = self.parse_arguments(Some(&Token::RBrace))?;
                self.expect(&Token::RBrace)?;
                if !args.positional.is_empty() {
                    return Err(LoadError::new(line, "hash entries need a key"));
                }
                OptionValue::Hash(args.options)
            }
            other => {
                self.pos -= 1;
                return Err(self.unexpected(Some(other), "a value"));
            }
        };

        Ok(value)
    }

    /// Constant or method-call expression used as a value (`Float::INFINITY`,
    /// `BigDecimal("1.5")`), kept as source-like text
    fn parse_expression(&mut self, first: &str) -> Result<OptionValue, LoadError> {
        let mut text = first.to_string();
        loop {
            match self.peek() {
                Some(Token::ColonColon) => {
                    self.pos += 1;
                    text.push_str("::");
                    text.push_str(&self.parse_ident("a constant name")?);
                }
                Some(Token::Dot) => {
                    self.pos += 1;
                    text.push('.');
                    text.push_str(&self.parse_ident("a method name")?);
                }
                Some(Token::LParen) => {
                    self.pos += 1;
                    let args = self.parse_arguments(Some(&Token::RParen))?;
                    self.expect(&Token::RParen)?;
                    text.push_str(&format!("({})", args));
                }
                _ => break,
            }
        }
        Ok(OptionValue::Raw(text))
    }
}

/// Constant names (`Schema`) start with an uppercase letter
fn is_constant(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
}

/// Tokens that can begin an unparenthesized argument list
fn starts_argument(token: &Token) -> bool {
    match token {
        Token::Str(_)
        | Token::Symbol(_)
        | Token::Label(_)
        | Token::Int(_)
        | Token::Float(_)
        | Token::Lambda(_)
        | Token::WordList { .. }
        | Token::Minus
        | Token::LBracket => true,
        Token::Ident(s) => s != "do" && s != "end",
        _ => false,
    }
}

fn hash_key(value: &OptionValue) -> String {
    match value.as_name() {
        Some(name) => name.to_string(),
        None => value.to_string(),
    }
}
