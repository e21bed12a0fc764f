use crate::error::ScriptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TokenKind {
    Ident,
    Number,
    Str,
    Template,
    Regex,
    Punct,
    Eof,
}

/// A token together with the whitespace and comments in front of it.
#[derive(Debug, Clone, Copy)]
pub(super) struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub leading: &'a str,
    /// Byte offset of `text` in the source.
    pub start: usize,
}

impl Token<'_> {
    pub fn newline_before(&self) -> bool {
        self.leading.contains('\n')
    }
}

pub(super) struct Lexed<'a> {
    pub tokens: Vec<Token<'a>>,
    /// For every bracket token, the index of its counterpart.
    pub matching: Vec<Option<usize>>,
}

// Longest first where prefixes overlap. `>` is always a single token so that
// nested type arguments (`Array<Array<T>>`) close one level at a time.
const PUNCTUATORS: &[&str] = &[
    "...", "===", "!==", "**=", "<<=", "&&=", "||=", "??=", "=>", "==", "!=", "<=", "&&", "||",
    "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "**", "<<", "{", "}",
    "(", ")", "[", "]", ";", ",", "<", ">", "+", "-", "*", "/", "%", "&", "|", "^", "!", "~", "?",
    ":", "=", ".",
];

/// Keywords after which a `/` starts a regular expression rather than a division.
const REGEX_AFTER_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

pub(super) fn tokenize(source: &str) -> Result<Lexed<'_>, ScriptError> {
    Lexer {
        source,
        pos: 0,
        tokens: Vec::new(),
        matching: Vec::new(),
        brackets: Vec::new(),
    }
    .run()
}

/// Builds a transpile error pointing at a byte offset (1-based line and column).
pub(super) fn error_at(source: &str, offset: usize, message: impl Into<String>) -> ScriptError {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    ScriptError::Transpile {
        message: message.into(),
        line,
        column,
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$' || c == '#'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether an operator following `token` applies to a finished operand.
fn ends_value(token: &Token<'_>) -> bool {
    match token.kind {
        TokenKind::Ident => !REGEX_AFTER_KEYWORDS.contains(&token.text),
        TokenKind::Number | TokenKind::Str | TokenKind::Template | TokenKind::Regex => true,
        TokenKind::Punct => matches!(token.text, ")" | "]"),
        TokenKind::Eof => false,
    }
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token<'a>>,
    matching: Vec<Option<usize>>,
    /// Open brackets and the index of their token.
    brackets: Vec<(char, usize)>,
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> Result<Lexed<'a>, ScriptError> {
        loop {
            let trivia_start = self.pos;
            self.skip_trivia()?;
            let leading = &self.source[trivia_start..self.pos];
            let start = self.pos;

            let Some(c) = self.peek() else {
                if let Some(&(open, at)) = self.brackets.last() {
                    return Err(self.error(self.tokens[at].start, format!("'{}' was never closed", open)));
                }
                self.push(TokenKind::Eof, start, leading);
                break;
            };

            let kind = if is_ident_start(c) {
                self.scan_ident();
                TokenKind::Ident
            } else if c.is_ascii_digit()
                || (c == '.' && self.peek_nth(1).is_some_and(|d| d.is_ascii_digit()))
            {
                self.scan_number();
                TokenKind::Number
            } else if c == '"' || c == '\'' {
                self.scan_string(c)?;
                TokenKind::Str
            } else if c == '`' {
                self.scan_template()?;
                TokenKind::Template
            } else if c == '/' && self.regex_allowed() {
                self.scan_regex()?;
                TokenKind::Regex
            } else {
                self.scan_punct()?;
                TokenKind::Punct
            };

            self.push(kind, start, leading);
            if kind == TokenKind::Punct {
                self.track_bracket()?;
            }
        }

        Ok(Lexed {
            tokens: self.tokens,
            matching: self.matching,
        })
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> ScriptError {
        error_at(self.source, offset, message)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn push(&mut self, kind: TokenKind, start: usize, leading: &'a str) {
        self.tokens.push(Token {
            kind,
            text: &self.source[start..self.pos],
            leading,
            start,
        });
        self.matching.push(None);
    }

    fn skip_trivia(&mut self) -> Result<(), ScriptError> {
        if self.pos == 0 && self.rest().starts_with("#!") {
            self.skip_line();
        }
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_nth(1) == Some('/') => self.skip_line(),
                Some('/') if self.peek_nth(1) == Some('*') => {
                    let start = self.pos;
                    match self.rest()[2..].find("*/") {
                        Some(end) => self.pos += end + 4,
                        None => return Err(self.error(start, "Unterminated comment")),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_line(&mut self) {
        match self.rest().find('\n') {
            Some(n) => self.pos += n,
            None => self.pos = self.source.len(),
        }
    }

    fn scan_ident(&mut self) {
        self.bump();
        while self.peek().is_some_and(is_ident_part) {
            self.bump();
        }
    }

    fn scan_number(&mut self) {
        let hex = self.rest().starts_with("0x") || self.rest().starts_with("0X");
        let mut prev = '\0';
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '+' || c == '-') && (prev == 'e' || prev == 'E') && !hex;
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                self.bump();
                prev = c;
            } else {
                break;
            }
        }
    }

    fn scan_string(&mut self, quote: char) -> Result<(), ScriptError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error(start, "Unterminated string literal")),
                Some('\\') => {
                    if self.bump() == Some('\r') && self.peek() == Some('\n') {
                        self.bump();
                    }
                }
                Some(c) if c == quote => return Ok(()),
                Some(_) => {}
            }
        }
    }

    fn scan_template(&mut self) -> Result<(), ScriptError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                None => return Err(self.error(start, "Unterminated template literal")),
                Some('\\') => {
                    self.bump();
                }
                Some('`') => return Ok(()),
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    self.scan_template_expression(start)?;
                }
                Some(_) => {}
            }
        }
    }

    /// Skips a `${ ... }` substitution, including nested strings and templates.
    fn scan_template_expression(&mut self, template_start: usize) -> Result<(), ScriptError> {
        let mut depth = 1usize;
        loop {
            self.skip_trivia()?;
            match self.peek() {
                None => return Err(self.error(template_start, "Unterminated template literal")),
                Some('{') => {
                    self.bump();
                    depth += 1;
                }
                Some('}') => {
                    self.bump();
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(quote @ ('"' | '\'')) => self.scan_string(quote)?,
                Some('`') => self.scan_template()?,
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn scan_regex(&mut self) -> Result<(), ScriptError> {
        let start = self.pos;
        self.bump();
        let mut in_class = false;
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(self.error(start, "Unterminated regular expression"));
                }
                Some('\\') => {
                    self.bump();
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some(_) => {}
            }
        }
        while self.peek().is_some_and(is_ident_part) {
            self.bump();
        }
        Ok(())
    }

    fn regex_allowed(&self) -> bool {
        let mut previous = self.tokens.iter().rev();
        match previous.next() {
            None => true,
            // Postfix `i++ / 2` divides.
            Some(token) if token.kind == TokenKind::Punct && matches!(token.text, "++" | "--") => {
                !previous.next().is_some_and(ends_value)
            }
            Some(token) => match token.kind {
                TokenKind::Punct => !matches!(token.text, ")" | "]" | "}"),
                TokenKind::Ident => REGEX_AFTER_KEYWORDS.contains(&token.text),
                _ => false,
            },
        }
    }

    fn scan_punct(&mut self) -> Result<(), ScriptError> {
        let rest = self.rest();
        // `a?.5:b` is a conditional, not optional chaining.
        if rest.starts_with("?.") && rest[2..].starts_with(|c: char| c.is_ascii_digit()) {
            self.pos += 1;
            return Ok(());
        }
        match PUNCTUATORS.iter().find(|p| rest.starts_with(**p)) {
            Some(p) => {
                self.pos += p.len();
                Ok(())
            }
            None => {
                let c = self.peek().unwrap_or(' ');
                Err(self.error(self.pos, format!("Invalid character '{}'", c)))
            }
        }
    }

    fn track_bracket(&mut self) -> Result<(), ScriptError> {
        let index = self.tokens.len() - 1;
        let token = self.tokens[index];
        match token.text {
            "(" | "[" | "{" => {
                let open = token.text.chars().next().unwrap_or('(');
                self.brackets.push((open, index));
            }
            ")" | "]" | "}" => {
                let close = token.text.chars().next().unwrap_or(')');
                let expected = match close {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match self.brackets.pop() {
                    Some((open, at)) if open == expected => {
                        self.matching[at] = Some(index);
                        self.matching[index] = Some(at);
                    }
                    Some((open, _)) => {
                        let wanted = match open {
                            '(' => ')',
                            '[' => ']',
                            _ => '}',
                        };
                        return Err(self.error(
                            token.start,
                            format!("Expected '{}' but found '{}'", wanted, close),
                        ));
                    }
                    None => return Err(self.error(token.start, format!("Unexpected '{}'", close))),
                }
            }
            _ => {}
        }
        Ok(())
    }
}
