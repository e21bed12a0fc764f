use super::lexer::{self, Token, TokenKind};
use crate::error::ScriptError;
use ahash::AHashSet;
use std::ops::Range;

/// Class member and parameter modifiers that only exist in TypeScript.
const TS_MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "readonly",
    "abstract",
    "declare",
    "override",
];

/// Tokens that may precede a member name in a class body.
const MEMBER_PREFIXES: &[&str] = &["static", "async", "get", "set", "*"];

/// Words that cannot name a method, so `word (...) {` is never a method head.
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "with", "return", "typeof", "instanceof", "in", "of",
    "new", "delete", "void", "throw", "case", "do", "else", "await", "yield", "function", "class",
    "const", "let", "var", "import", "export", "extends", "super",
];

/// Keywords that never end an expression.
const NON_VALUE_KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "export", "extends", "finally", "for", "function", "if", "import", "in", "instanceof",
    "let", "new", "return", "switch", "throw", "try", "typeof", "var", "void", "while", "with",
    "yield", "await", "of", "static",
];

const TYPE_PREFIXES: &[&str] = &["keyof", "typeof", "readonly", "unique", "infer", "asserts"];

/// Keywords that may follow `declare`.
const DECLARABLE: &[&str] = &[
    "const",
    "let",
    "var",
    "function",
    "class",
    "module",
    "namespace",
    "global",
    "enum",
    "abstract",
    "interface",
    "type",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Top,
    Block,
    ClassBody,
    Params,
    Paren,
    Bracket,
    ModuleClause,
}

/// Where a `let`/`const`/`var` declaration currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decl {
    ExpectName,
    /// Inside a destructuring pattern that closes at the given token.
    InPattern(usize),
    AfterName,
    Initializer,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    /// `?` of conditional expressions still waiting for their `:`.
    ternaries: usize,
    decl: Option<Decl>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            ternaries: 0,
            decl: None,
        }
    }
}

pub(super) fn strip_types(source: &str) -> Result<String, ScriptError> {
    let lexed = lexer::tokenize(source)?;
    let mut stripper = Stripper {
        source,
        tokens: &lexed.tokens,
        matching: &lexed.matching,
        keep: vec![true; lexed.tokens.len()],
        frames: vec![Frame::new(FrameKind::Top)],
        class_bodies: AHashSet::new(),
    };
    stripper.run()?;
    Ok(stripper.emit())
}

/// Marks TypeScript-only tokens for removal in a single forward pass.
struct Stripper<'s, 'l> {
    source: &'s str,
    tokens: &'l [Token<'s>],
    matching: &'l [Option<usize>],
    keep: Vec<bool>,
    /// Bracket nesting at the current token. Never empty.
    frames: Vec<Frame>,
    /// `{` tokens that open a class body.
    class_bodies: AHashSet<usize>,
}

impl<'s> Stripper<'s, '_> {
    fn run(&mut self) -> Result<(), ScriptError> {
        let mut i = 0;
        while i < self.eof() {
            if !self.keep[i] {
                i += 1;
                continue;
            }
            i = self.step(i)?;
        }
        Ok(())
    }

    /// Kept tokens verbatim. Removed tokens leave only the line breaks in front of them.
    fn emit(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        for (index, token) in self.tokens.iter().enumerate() {
            if self.keep[index] || token.kind == TokenKind::Eof {
                out.push_str(token.leading);
                out.push_str(token.text);
            } else {
                out.extend(token.leading.chars().filter(|c| *c == '\n'));
            }
        }
        out
    }

    fn step(&mut self, i: usize) -> Result<usize, ScriptError> {
        if self.at_statement_start(i) {
            if let Some(next) = self.strip_statement(i)? {
                return Ok(next);
            }
        }
        match self.tokens[i].kind {
            TokenKind::Ident => self.ident(i),
            TokenKind::Punct => self.punct(i),
            _ => Ok(i + 1),
        }
    }

    // Token helpers

    fn eof(&self) -> usize {
        self.tokens.len() - 1
    }

    fn text(&self, i: usize) -> &'s str {
        self.tokens.get(i).map_or("", |t| t.text)
    }

    fn kind(&self, i: usize) -> TokenKind {
        self.tokens.get(i).map_or(TokenKind::Eof, |t| t.kind)
    }

    fn is(&self, i: usize, text: &str) -> bool {
        matches!(self.kind(i), TokenKind::Punct | TokenKind::Ident) && self.text(i) == text
    }

    fn is_ident(&self, i: usize) -> bool {
        self.kind(i) == TokenKind::Ident
    }

    fn newline_before(&self, i: usize) -> bool {
        self.tokens.get(i).is_some_and(|t| t.newline_before())
    }

    fn close_of(&self, i: usize) -> usize {
        self.matching.get(i).copied().flatten().unwrap_or(i)
    }

    fn prev_kept(&self, i: usize) -> Option<usize> {
        (0..i).rev().find(|&j| self.keep[j])
    }

    fn remove(&mut self, range: Range<usize>) {
        let end = range.end.min(self.eof());
        for k in range.start..end {
            self.keep[k] = false;
        }
    }

    fn error_at(&self, i: usize, message: impl Into<String>) -> ScriptError {
        let offset = self.tokens[i.min(self.eof())].start;
        lexer::error_at(self.source, offset, message)
    }

    fn expect(&self, i: usize, text: &str) -> Result<usize, ScriptError> {
        if self.is(i, text) {
            Ok(i + 1)
        } else {
            Err(self.error_at(i, format!("'{}' expected", text)))
        }
    }

    fn frame(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    fn frame_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Whether the token can end an expression (and so precede `as`, `!`, ...).
    fn is_value_end(&self, i: usize) -> bool {
        match self.kind(i) {
            TokenKind::Ident => !NON_VALUE_KEYWORDS.contains(&self.text(i)),
            TokenKind::Number | TokenKind::Str | TokenKind::Template | TokenKind::Regex => true,
            TokenKind::Punct => match self.text(i) {
                ")" | "]" => true,
                // Postfix only.
                "++" | "--" => self
                    .prev_kept(i)
                    .is_some_and(|p| !self.is(p, "++") && !self.is(p, "--") && self.is_value_end(p)),
                _ => false,
            },
            TokenKind::Eof => false,
        }
    }

    fn starts_type(&self, i: usize) -> bool {
        match self.kind(i) {
            TokenKind::Ident | TokenKind::Str | TokenKind::Number | TokenKind::Template => true,
            TokenKind::Punct => matches!(self.text(i), "{" | "[" | "(" | "<" | "-" | "|" | "&"),
            _ => false,
        }
    }

    fn is_method_name(&self, i: usize) -> bool {
        self.is_ident(i) && !CONTROL_KEYWORDS.contains(&self.text(i))
    }

    // Statements that vanish entirely

    fn at_statement_start(&self, i: usize) -> bool {
        if !matches!(self.frame().kind, FrameKind::Top | FrameKind::Block) || !self.is_ident(i) {
            return false;
        }
        match self.prev_kept(i) {
            None => true,
            Some(p) => {
                (self.kind(p) == TokenKind::Punct && matches!(self.text(p), ";" | "{" | "}"))
                    || self.newline_before(i)
            }
        }
    }

    fn strip_statement(&mut self, i: usize) -> Result<Option<usize>, ScriptError> {
        let exported = self.is(i, "export");
        let j = if exported { i + 1 } else { i };

        let end = match self.text(j) {
            "interface"
                if self.is_ident(j + 1)
                    && (self.is(j + 2, "{") || self.is(j + 2, "extends") || self.is(j + 2, "<")) =>
            {
                let open = self.find_brace(j + 2)?;
                self.close_of(open) + 1
            }
            "type" if self.is_ident(j + 1) && (self.is(j + 2, "=") || self.is(j + 2, "<")) => {
                self.type_alias_end(j + 2)?
            }
            "type" if exported && self.is(j + 1, "{") => {
                let mut k = self.close_of(j + 1) + 1;
                if self.is(k, "from") && self.kind(k + 1) == TokenKind::Str {
                    k += 2;
                }
                if self.is(k, ";") {
                    k += 1;
                }
                k
            }
            "import" if !exported && self.is(j + 1, "type") && self.is_type_import(j + 2) => {
                let mut k = j + 2;
                while k < self.eof() && self.kind(k) != TokenKind::Str {
                    k = if self.is(k, "{") { self.close_of(k) + 1 } else { k + 1 };
                }
                if k >= self.eof() {
                    return Err(self.error_at(j, "Module specifier expected"));
                }
                k += 1;
                if self.is(k, ";") {
                    k += 1;
                }
                k
            }
            "declare" if DECLARABLE.contains(&self.text(j + 1)) => self.declaration_end(j + 1)?,
            "abstract" if self.is(j + 1, "class") => {
                self.remove(j..j + 1);
                return Ok(Some(j + 1));
            }
            "enum" if self.is_ident(j + 1) && self.is(j + 2, "{") => {
                return Err(self.error_at(j, "Enums are not supported in task scripts"));
            }
            "const" if self.is(j + 1, "enum") => {
                return Err(self.error_at(j, "Enums are not supported in task scripts"));
            }
            _ => return Ok(None),
        };

        self.remove(i..end);
        Ok(Some(end))
    }

    fn is_type_import(&self, k: usize) -> bool {
        if self.is(k, "{") || self.is(k, "*") {
            return true;
        }
        // `import type from "x"` imports a default export named `type`.
        self.is_ident(k) && !(self.is(k, "from") && self.kind(k + 1) == TokenKind::Str)
    }

    /// `k` points just past the alias name.
    fn type_alias_end(&self, mut k: usize) -> Result<usize, ScriptError> {
        if self.is(k, "<") {
            k = self.skip_angle(k)?;
        }
        k = self.expect(k, "=")?;
        k = self.skip_type(k)?;
        if self.is(k, ";") {
            k += 1;
        }
        Ok(k)
    }

    /// End of an ambient declaration. `k` points at the keyword after `declare`.
    fn declaration_end(&self, k: usize) -> Result<usize, ScriptError> {
        let mut m = k + 1;
        match self.text(k) {
            "const" | "let" | "var" => {
                loop {
                    if self.is(m, "{") || self.is(m, "[") {
                        m = self.close_of(m) + 1;
                    } else if self.is_ident(m) {
                        m += 1;
                    } else {
                        return Err(self.error_at(m, "Identifier expected"));
                    }
                    if self.is(m, ":") {
                        m = self.skip_type(m + 1)?;
                    }
                    if self.is(m, ",") {
                        m += 1;
                        continue;
                    }
                    break;
                }
            }
            "function" => {
                if self.is_ident(m) {
                    m += 1;
                }
                if self.is(m, "<") {
                    m = self.skip_angle(m)?;
                }
                if !self.is(m, "(") {
                    return Err(self.error_at(m, "'(' expected"));
                }
                m = self.close_of(m) + 1;
                if self.is(m, ":") {
                    m = self.skip_type(m + 1)?;
                }
            }
            "type" => return self.type_alias_end(m + 1),
            _ => {
                let open = self.find_brace(m)?;
                m = self.close_of(open) + 1;
            }
        }
        if self.is(m, ";") {
            m += 1;
        }
        Ok(m)
    }

    fn find_brace(&self, k: usize) -> Result<usize, ScriptError> {
        let mut m = k;
        while m < self.eof() {
            if self.is(m, "{") {
                return Ok(m);
            }
            m = if self.is(m, "<") {
                self.skip_angle(m)?
            } else if self.is(m, "(") || self.is(m, "[") {
                self.close_of(m) + 1
            } else {
                m + 1
            };
        }
        Err(self.error_at(k, "'{' expected"))
    }

    // Identifiers

    fn ident(&mut self, i: usize) -> Result<usize, ScriptError> {
        let text = self.text(i);
        if self
            .prev_kept(i)
            .is_some_and(|p| self.is(p, ".") || self.is(p, "?."))
        {
            return Ok(i + 1);
        }

        match self.frame().kind {
            FrameKind::ClassBody => {
                if let Some(next) = self.class_member(i)? {
                    return Ok(next);
                }
            }
            FrameKind::Params if TS_MODIFIERS.contains(&text) && self.is_ident(i + 1) => {
                return Err(self.error_at(i, "Parameter properties are not supported"));
            }
            _ => {}
        }

        match text {
            "let" | "const" | "var"
                if self.is_ident(i + 1) || self.is(i + 1, "{") || self.is(i + 1, "[") =>
            {
                self.frame_mut().decl = Some(Decl::ExpectName);
                return Ok(i + 1);
            }
            "function" => {
                self.function_generics(i)?;
                return Ok(i + 1);
            }
            "class" => {
                self.class_heading(i)?;
                return Ok(i + 1);
            }
            "as" | "satisfies" => {
                if let Some(next) = self.assertion(i)? {
                    return Ok(next);
                }
            }
            _ => {}
        }

        let frame = self.frame_mut();
        match frame.decl {
            Some(Decl::ExpectName) => frame.decl = Some(Decl::AfterName),
            // `for (const x of xs)`
            Some(Decl::AfterName) => frame.decl = None,
            _ => {}
        }
        Ok(i + 1)
    }

    fn function_generics(&mut self, i: usize) -> Result<(), ScriptError> {
        let mut k = i + 1;
        if self.is(k, "*") {
            k += 1;
        }
        if self.is_ident(k) {
            k += 1;
        }
        if self.is(k, "<") {
            let end = self.skip_angle(k)?;
            self.remove(k..end);
        }
        Ok(())
    }

    fn class_heading(&mut self, i: usize) -> Result<(), ScriptError> {
        let mut k = i + 1;
        if self.is_ident(k) && !matches!(self.text(k), "extends" | "implements") {
            k += 1;
            if self.is(k, "<") {
                let end = self.skip_angle(k)?;
                self.remove(k..end);
                k = end;
            }
        }
        if self.is(k, "extends") {
            k += 1;
            while k < self.eof() && !self.is(k, "{") && !self.is(k, "implements") {
                if self.is(k, "<") && self.is_ident(k - 1) {
                    let end = self.skip_angle(k)?;
                    self.remove(k..end);
                    k = end;
                } else if self.is(k, "(") || self.is(k, "[") {
                    k = self.close_of(k) + 1;
                } else {
                    k += 1;
                }
            }
        }
        if self.is(k, "implements") {
            let start = k;
            k += 1;
            loop {
                k = self.skip_type(k)?;
                if self.is(k, ",") {
                    k += 1;
                } else {
                    break;
                }
            }
            self.remove(start..k);
        }
        if self.is(k, "{") {
            self.class_bodies.insert(k);
        }
        Ok(())
    }

    fn class_member(&mut self, i: usize) -> Result<Option<usize>, ScriptError> {
        let Some(prev) = self.prev_kept(i) else {
            return Ok(None);
        };
        let member_start = (self.kind(prev) == TokenKind::Punct
            && matches!(self.text(prev), "{" | ";" | "}"))
            || MEMBER_PREFIXES.contains(&self.text(prev))
            || (self.newline_before(i) && self.is_value_end(prev));
        if !member_start {
            return Ok(None);
        }

        if TS_MODIFIERS.contains(&self.text(i))
            && (self.is_ident(i + 1)
                || matches!(self.kind(i + 1), TokenKind::Str | TokenKind::Number)
                || self.is(i + 1, "[")
                || self.is(i + 1, "*"))
        {
            self.remove(i..i + 1);
            return Ok(Some(i + 1));
        }

        let mut k = i + 1;
        let marker = if self.is(k, "?") || self.is(k, "!") {
            k += 1;
            Some(k - 1)
        } else {
            None
        };
        if self.is(k, "<") {
            let end = self.skip_angle(k)?;
            if self.is(end, "(") {
                self.remove(k..end);
                k = end;
            }
        }
        if self.is(k, ":") {
            let end = self.skip_type(k + 1)?;
            self.remove(marker.unwrap_or(k)..end);
            return Ok(Some(end));
        }
        if let Some(m) = marker {
            if self.is(k, "(") || self.is(k, "=") || self.is(k, ";") {
                self.remove(m..m + 1);
            }
        }
        Ok(None)
    }

    /// `expr as Type`, `expr as const`, `expr satisfies Type`.
    fn assertion(&mut self, i: usize) -> Result<Option<usize>, ScriptError> {
        if self.frame().kind == FrameKind::ModuleClause {
            return Ok(None);
        }
        let Some(prev) = self.prev_kept(i) else {
            return Ok(None);
        };
        if !(self.is_value_end(prev) || self.is(prev, "}")) || !self.starts_type(i + 1) {
            return Ok(None);
        }
        let end = if self.text(i) == "as" && self.is(i + 1, "const") {
            i + 2
        } else {
            self.skip_type(i + 1)?
        };
        self.remove(i..end);
        Ok(Some(end))
    }

    // Punctuation

    fn punct(&mut self, i: usize) -> Result<usize, ScriptError> {
        match self.text(i) {
            "(" => {
                let kind = if self.is_param_list(i) {
                    FrameKind::Params
                } else {
                    FrameKind::Paren
                };
                self.open(i, kind);
            }
            "[" => self.open(i, FrameKind::Bracket),
            "{" => {
                let kind = if self.class_bodies.contains(&i) {
                    FrameKind::ClassBody
                } else if self.opens_module_clause(i) {
                    FrameKind::ModuleClause
                } else {
                    FrameKind::Block
                };
                self.open(i, kind);
            }
            ")" | "]" | "}" => return self.close(i),
            "<" => return self.angle(i),
            ":" => return self.colon(i),
            "?" => return Ok(self.question(i)),
            "!" => {
                // Non-null assertion and definite assignment: `a!.b`, `let x!: T`.
                let glued = self.tokens[i].leading.is_empty();
                if glued && self.prev_kept(i).is_some_and(|p| self.is_value_end(p)) {
                    self.remove(i..i + 1);
                }
            }
            "=" => {
                let frame = self.frame_mut();
                if frame.decl == Some(Decl::AfterName) {
                    frame.decl = Some(Decl::Initializer);
                }
            }
            "," => {
                let frame = self.frame_mut();
                if matches!(frame.decl, Some(Decl::AfterName | Decl::Initializer)) {
                    frame.decl = Some(Decl::ExpectName);
                }
            }
            ";" => {
                let frame = self.frame_mut();
                frame.decl = None;
                frame.ternaries = 0;
            }
            _ => {}
        }
        Ok(i + 1)
    }

    fn open(&mut self, i: usize, kind: FrameKind) {
        let close = self.close_of(i);
        let pattern = self.is(i, "{") || self.is(i, "[");
        let parent = self.frame_mut();
        if pattern && parent.decl == Some(Decl::ExpectName) {
            parent.decl = Some(Decl::InPattern(close));
        }
        self.frames.push(Frame::new(kind));
    }

    fn close(&mut self, i: usize) -> Result<usize, ScriptError> {
        let closed = if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        };
        let parent = self.frame_mut();
        if parent.decl == Some(Decl::InPattern(i)) {
            parent.decl = Some(Decl::AfterName);
        }
        // Return type annotation.
        if closed.is_some_and(|f| f.kind == FrameKind::Params) && self.is(i + 1, ":") {
            let end = self.skip_type(i + 2)?;
            self.remove(i + 1..end);
            return Ok(end);
        }
        Ok(i + 1)
    }

    fn colon(&mut self, i: usize) -> Result<usize, ScriptError> {
        let (kind, ternaries, decl) = {
            let frame = self.frame();
            (frame.kind, frame.ternaries, frame.decl)
        };
        if ternaries > 0 {
            self.frame_mut().ternaries -= 1;
            return Ok(i + 1);
        }
        if kind == FrameKind::Params || decl == Some(Decl::AfterName) {
            let end = self.skip_type(i + 1)?;
            self.remove(i..end);
            return Ok(end);
        }
        Ok(i + 1)
    }

    /// `<` in expression position.
    ///
    /// After an operand it is either a comparison or the type arguments of a call,
    /// a tagged template or a `new` expression. Anywhere else it can only open the
    /// type parameters of an arrow function or an angle-bracket assertion.
    fn angle(&mut self, i: usize) -> Result<usize, ScriptError> {
        let after_operand = self
            .prev_kept(i)
            .is_some_and(|p| self.is_value_end(p) && !self.is(p, "async"));
        if after_operand {
            if let Some(end) = self.type_arguments(i) {
                if self.is(end, "(")
                    || self.kind(end) == TokenKind::Template
                    || self.after_new_callee(i)
                {
                    self.remove(i..end);
                    return Ok(end);
                }
            }
            return Ok(i + 1);
        }

        let end = self.skip_angle(i)?;
        if self.is(end, "(") && self.is_param_list(end) {
            self.remove(i..end);
            return Ok(end);
        }
        // `<T>value` asserts like `value as T`.
        if let Some(end) = self.type_arguments(i) {
            self.remove(i..end);
            return Ok(end);
        }
        Err(self.error_at(i, "Expression expected"))
    }

    /// Reads `<A, B<C>>` at `i` as a type argument list. Returns the index after `>`.
    fn type_arguments(&self, i: usize) -> Option<usize> {
        let mut k = i + 1;
        loop {
            k = self.skip_type(k).ok()?;
            if self.is(k, ">") {
                return Some(k + 1);
            }
            if !self.is(k, ",") {
                return None;
            }
            k += 1;
        }
    }

    /// Whether the `<` at `i` follows the constructor of a `new` expression.
    fn after_new_callee(&self, i: usize) -> bool {
        let mut name = self.prev_kept(i);
        while let Some(n) = name.filter(|&n| self.is_ident(n)) {
            match self.prev_kept(n) {
                Some(p) if self.is(p, ".") => name = self.prev_kept(p),
                Some(p) => return self.is(p, "new"),
                None => return false,
            }
        }
        false
    }

    fn question(&mut self, i: usize) -> usize {
        if self.frame().kind == FrameKind::Params
            && self.prev_kept(i).is_some_and(|p| self.is_ident(p))
            && [":", ",", ")", "="].iter().any(|t| self.is(i + 1, t))
        {
            // Optional parameter marker.
            self.remove(i..i + 1);
            return i + 1;
        }
        self.frame_mut().ternaries += 1;
        i + 1
    }

    /// Decides whether the `(` at `i` opens a parameter list.
    fn is_param_list(&self, i: usize) -> bool {
        let close = self.close_of(i);
        if self.is(close + 1, "=>") {
            return true;
        }

        let prev = self.prev_kept(i);
        if let Some(p) = prev {
            if self.is(p, "function") || self.is(p, "catch") {
                return true;
            }
            let before = self.prev_kept(p);
            let named = self.is_ident(p) && before.is_some_and(|b| self.is(b, "function"));
            let named_generator = self.is_ident(p)
                && before.is_some_and(|b| {
                    self.is(b, "*") && self.prev_kept(b).is_some_and(|f| self.is(f, "function"))
                });
            let anonymous_generator =
                self.is(p, "*") && before.is_some_and(|b| self.is(b, "function"));
            if named || named_generator || anonymous_generator {
                return true;
            }
        }

        let method_like = prev.is_some_and(|p| self.is_method_name(p))
            && matches!(self.frame().kind, FrameKind::Block | FrameKind::ClassBody);

        if self.is(close + 1, ":") && self.frame().ternaries == 0 {
            if let Ok(end) = self.skip_type(close + 2) {
                if self.is(end, "=>") || (method_like && self.is(end, "{")) {
                    return true;
                }
            }
        }
        method_like && self.is(close + 1, "{")
    }

    fn opens_module_clause(&self, i: usize) -> bool {
        let Some(p) = self.prev_kept(i) else {
            return false;
        };
        if self.is(p, "import") || self.is(p, "export") {
            return true;
        }
        // `import name, { a as b }`
        self.is(p, ",")
            && self
                .prev_kept(p)
                .and_then(|q| self.prev_kept(q))
                .is_some_and(|r| self.is(r, "import"))
    }

    // Types

    /// Skips a full type starting at `k`. Returns the index of the first token after it.
    fn skip_type(&self, k: usize) -> Result<usize, ScriptError> {
        let mut k = k;
        if self.is(k, "|") || self.is(k, "&") {
            k += 1;
        }
        k = self.skip_type_operand(k)?;
        loop {
            if self.is(k, "|") || self.is(k, "&") {
                k = self.skip_type_operand(k + 1)?;
            } else if self.is(k, "extends") && !self.newline_before(k) {
                // Conditional type.
                k = self.skip_type_operand(k + 1)?;
                k = self.expect(k, "?")?;
                k = self.skip_type(k)?;
                k = self.expect(k, ":")?;
                k = self.skip_type(k)?;
            } else {
                return Ok(k);
            }
        }
    }

    fn skip_type_operand(&self, k: usize) -> Result<usize, ScriptError> {
        let mut k = k;
        while self.is_ident(k)
            && TYPE_PREFIXES.contains(&self.text(k))
            && self.starts_type(k + 1)
            && !self.is(k + 1, "<")
        {
            k += 1;
        }
        if self.is(k, "new") && (self.is(k + 1, "(") || self.is(k + 1, "<")) {
            k += 1;
        }

        match self.kind(k) {
            TokenKind::Ident => {
                k += 1;
                while self.is(k, ".") && self.is_ident(k + 1) {
                    k += 2;
                }
                // Type predicate: `value is Foo`.
                if self.is(k, "is") && !self.newline_before(k) {
                    return self.skip_type(k + 1);
                }
            }
            TokenKind::Str | TokenKind::Number | TokenKind::Template => k += 1,
            TokenKind::Punct => match self.text(k) {
                "-" if self.kind(k + 1) == TokenKind::Number => k += 2,
                "{" | "[" => k = self.close_of(k) + 1,
                "(" => {
                    let close = self.close_of(k);
                    if self.is(close + 1, "=>") {
                        return self.skip_type(close + 2);
                    }
                    k = close + 1;
                }
                "<" => {
                    let params = self.skip_angle(k)?;
                    if !self.is(params, "(") {
                        return Err(self.error_at(params, "'(' expected"));
                    }
                    let arrow = self.expect(self.close_of(params) + 1, "=>")?;
                    return self.skip_type(arrow);
                }
                _ => return Err(self.error_at(k, "Type expected")),
            },
            _ => return Err(self.error_at(k, "Type expected")),
        }

        loop {
            if self.newline_before(k) {
                return Ok(k);
            }
            if self.is(k, "<") {
                k = self.skip_angle(k)?;
            } else if self.is(k, "[") {
                k = self.close_of(k) + 1;
            } else if self.is(k, ".") && self.is_ident(k + 1) {
                k += 2;
            } else {
                return Ok(k);
            }
        }
    }

    /// Skips a `<...>` type argument or parameter list starting at `k`.
    fn skip_angle(&self, k: usize) -> Result<usize, ScriptError> {
        let mut depth = 0usize;
        let mut m = k;
        loop {
            match self.kind(m) {
                TokenKind::Eof => return Err(self.error_at(k, "Unterminated type argument list")),
                TokenKind::Punct => match self.text(m) {
                    "<" => depth += 1,
                    ">" => {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(m + 1);
                        }
                    }
                    "(" | "[" | "{" => m = self.close_of(m),
                    ";" | ")" | "]" | "}" => {
                        return Err(self.error_at(k, "Unterminated type argument list"));
                    }
                    _ => {}
                },
                _ => {}
            }
            m += 1;
        }
    }
}
