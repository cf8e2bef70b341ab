//! Parser for the action syntax used in `.krew.yaml` templates.
//!
//! Only the subset plugin manifests use is understood:
//!
//! - `{{ .Field }}` and `{{ "literal" }}`
//! - `{{ function arg arg... }}` where args are fields or string literals
//! - `{{/* comment */}}`
//! - `{{-` and `-}}` trim markers
//!
//! Pipelines, variables, conditionals and ranges are rejected.

/// Start of an action.
const OPEN: &str = "{{";

/// End of an action.
const CLOSE: &str = "}}";

/// A parsed piece of the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node<'a> {
    /// Text copied to the output as-is.
    Text(&'a str),
    /// An action; `offset` is the byte position of its `{{`.
    Action { offset: usize, action: Action },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Comment,
    Value(Operand),
    Call { name: String, args: Vec<Operand> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Operand {
    /// `.Name`, without the dot.
    Field(String),
    /// A quoted or raw string.
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParseError {
    pub offset: usize,
    pub reason: String,
}

impl ParseError {
    fn new(offset: usize, reason: impl Into<String>) -> Self {
        Self {
            offset,
            reason: reason.into(),
        }
    }
}

/// Split a template into text and actions.
pub(crate) fn parse(text: &str) -> Result<Vec<Node<'_>>, ParseError> {
    let mut nodes = Vec::new();
    let mut pos = 0;
    let mut trim_next = false;

    while let Some(rel) = text[pos..].find(OPEN) {
        let start = pos + rel;
        let mut cursor = start + OPEN.len();

        let mut literal = &text[pos..start];
        if trim_next {
            literal = literal.trim_start();
        }

        let trim_left = is_trim_marker(&text[cursor..]);
        if trim_left {
            literal = literal.trim_end();
            cursor += 1;
        }

        if !literal.is_empty() {
            nodes.push(Node::Text(literal));
        }

        let mut lexer = Lexer::new(text, cursor);
        let (action, trim_right) = lexer.action(start)?;
        nodes.push(Node::Action {
            offset: start,
            action,
        });

        pos = lexer.pos;
        trim_next = trim_right;
    }

    let mut rest = &text[pos..];
    if trim_next {
        rest = rest.trim_start();
    }
    if !rest.is_empty() {
        nodes.push(Node::Text(rest));
    }

    Ok(nodes)
}

/// `-` followed by whitespace right after `{{`.
fn is_trim_marker(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_whitespace)
}

#[derive(Debug)]
enum Word {
    Ident(String),
    Operand(Operand),
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str, pos: usize) -> Self {
        Self { src, pos }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Skip whitespace, returning whether any was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let before = self.pos;
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
        self.pos > before
    }

    /// Consume the close delimiter if it is next. Returns `Some(trim)` on success.
    fn close(&mut self, after_space: bool) -> Option<bool> {
        if after_space && self.rest().starts_with("-}}") {
            self.pos += 1 + CLOSE.len();
            return Some(true);
        }
        if self.rest().starts_with(CLOSE) {
            self.pos += CLOSE.len();
            return Some(false);
        }
        None
    }

    /// Parse one action body up to and including its close delimiter.
    fn action(&mut self, open: usize) -> Result<(Action, bool), ParseError> {
        let mut after_space = self.skip_whitespace();

        if self.rest().starts_with("/*") {
            let body = self.pos + 2;
            let end = self.src[body..]
                .find("*/")
                .ok_or_else(|| ParseError::new(open, "unclosed comment"))?;
            self.pos = body + end + 2;
            let after_space = self.skip_whitespace();
            let trim = self
                .close(after_space)
                .ok_or_else(|| ParseError::new(self.pos, "comment ends with */ but action is not closed"))?;
            return Ok((Action::Comment, trim));
        }

        let mut words = Vec::new();
        let trim = loop {
            if let Some(trim) = self.close(after_space) {
                break trim;
            }

            let offset = self.pos;
            let word = match self.peek() {
                None => return Err(ParseError::new(open, "unclosed action")),
                Some('"') => Word::Operand(Operand::Literal(self.quoted()?)),
                Some('`') => Word::Operand(Operand::Literal(self.raw()?)),
                Some('.') => {
                    self.pos += 1;
                    let name = self.identifier();
                    if name.is_empty() {
                        return Err(ParseError::new(offset, "bare '.' is not supported"));
                    }
                    Word::Operand(Operand::Field(name))
                }
                Some(c) if c.is_alphabetic() || c == '_' => Word::Ident(self.identifier()),
                Some(c) => {
                    return Err(ParseError::new(
                        offset,
                        format!("unexpected {:?} in action", c),
                    ))
                }
            };
            words.push((offset, word));

            after_space = self.skip_whitespace();
            if !after_space && !self.rest().starts_with(CLOSE) {
                return Err(ParseError::new(self.pos, "missing space between arguments"));
            }
        };

        Ok((build(open, words)?, trim))
    }

    fn identifier(&mut self) -> String {
        let len = self
            .rest()
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(self.rest().len());
        let ident = self.rest()[..len].to_string();
        self.pos += len;
        ident
    }

    fn quoted(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();

        loop {
            let c = self
                .peek()
                .ok_or_else(|| ParseError::new(start, "unterminated quoted string"))?;
            self.pos += c.len_utf8();

            match c {
                '"' => return Ok(value),
                '\n' => return Err(ParseError::new(start, "newline in quoted string")),
                '\\' => {
                    let escaped = self
                        .peek()
                        .ok_or_else(|| ParseError::new(start, "unterminated quoted string"))?;
                    self.pos += escaped.len_utf8();
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '"' => '"',
                        '\\' => '\\',
                        other => {
                            return Err(ParseError::new(
                                self.pos,
                                format!("unknown escape sequence \\{}", other),
                            ))
                        }
                    });
                }
                other => value.push(other),
            }
        }
    }

    fn raw(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let body = start + 1;
        let len = self.src[body..]
            .find('`')
            .ok_or_else(|| ParseError::new(start, "unterminated raw string"))?;
        self.pos = body + len + 1;
        Ok(self.src[body..body + len].to_string())
    }
}

/// Turn the words of one action into an [`Action`].
fn build(open: usize, words: Vec<(usize, Word)>) -> Result<Action, ParseError> {
    let mut words = words.into_iter();

    let Some((_, first)) = words.next() else {
        return Err(ParseError::new(open, "missing value for command"));
    };

    match first {
        Word::Ident(name) => {
            let args = words
                .map(|(offset, word)| match word {
                    Word::Operand(operand) => Ok(operand),
                    Word::Ident(ident) => Err(ParseError::new(
                        offset,
                        format!("{} cannot be used as an argument", ident),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Action::Call { name, args })
        }
        Word::Operand(operand) => match words.next() {
            None => Ok(Action::Value(operand)),
            Some((offset, _)) => Err(ParseError::new(offset, "unexpected argument after value")),
        },
    }
}
