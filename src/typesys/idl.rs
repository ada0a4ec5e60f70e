// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Parser for the ROS2 IDL definition dialect.
//!
//! Supports the OMG IDL subset emitted by rosidl: `module`, `struct`,
//! `const`, `sequence<T>` / `sequence<T, N>`, fixed arrays `T name[N]`,
//! bounded strings, annotations (`@default` is captured, the rest are
//! skipped), `//` and `/* ... */` comments, and ignored preprocessor lines.

use std::collections::BTreeMap;

use crate::core::error::{BagError, ParseErrorKind, Result};

use super::ast::{normalize_msgtype, BaseType, ConstDef, FieldDef, FieldType, MsgDef};

/// Parse an `.idl` definition. `name` is only used for error context; the
/// defined type names come from the module/struct structure.
pub fn parse_idl(text: &str, name: &str) -> Result<BTreeMap<String, MsgDef>> {
    let tokens = lex(text)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        context: name.to_string(),
        structs: Vec::new(),
        constants: BTreeMap::new(),
    };
    parser.parse_definitions(&mut Vec::new(), true)?;

    let mut defs = BTreeMap::new();
    for mut def in parser.structs {
        // rosidl places constants in a sibling `<Name>_Constants` module.
        if let Some(consts) = parser.constants.remove(&format!("{}_Constants", def.name)) {
            def.constants = consts;
        }
        defs.insert(def.name.clone(), def);
    }
    Ok(defs)
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Number(String),
    Str(String),
    Punct(char),
    /// `::` scope separator
    Scope,
}

impl Tok {
    fn text(&self) -> String {
        match self {
            Tok::Ident(s) | Tok::Number(s) => s.clone(),
            Tok::Str(s) => s.clone(),
            Tok::Punct(c) => c.to_string(),
            Tok::Scope => "::".to_string(),
        }
    }
}

fn lex(text: &str) -> Result<Vec<Tok>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c.is_whitespace() {
            i += 1;
            continue;
        }
        // Line comments and preprocessor directives run to end of line.
        if c == '/' && bytes.get(i + 1) == Some(&b'/') || c == '#' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }
        if c == '/' && bytes.get(i + 1) == Some(&b'*') {
            let Some(end) = text[i + 2..].find("*/") else {
                return Err(BagError::parse(
                    ParseErrorKind::UnterminatedComment,
                    format!("offset {i}"),
                ));
            };
            i += 2 + end + 2;
            continue;
        }
        if c == '"' {
            let mut out = String::new();
            i += 1;
            let mut closed = false;
            while i < bytes.len() {
                let ch = bytes[i] as char;
                if ch == '\\' && i + 1 < bytes.len() {
                    out.push(bytes[i + 1] as char);
                    i += 2;
                    continue;
                }
                if ch == '"' {
                    closed = true;
                    i += 1;
                    break;
                }
                out.push(ch);
                i += 1;
            }
            if !closed {
                return Err(BagError::parse(
                    ParseErrorKind::UnknownToken,
                    "unterminated string literal".to_string(),
                ));
            }
            tokens.push(Tok::Str(out));
            continue;
        }
        if c == '\'' {
            // Character literal; stored as its text.
            let start = i + 1;
            let mut j = start;
            while j < bytes.len() && bytes[j] != b'\'' {
                j += 1;
            }
            tokens.push(Tok::Str(text[start..j].to_string()));
            i = j + 1;
            continue;
        }
        if c == ':' && bytes.get(i + 1) == Some(&b':') {
            tokens.push(Tok::Scope);
            i += 2;
            continue;
        }
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len()
                && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_')
            {
                i += 1;
            }
            tokens.push(Tok::Ident(text[start..i].to_string()));
            continue;
        }
        if c.is_ascii_digit() || (c == '.' && matches!(bytes.get(i + 1), Some(b) if b.is_ascii_digit()))
        {
            let start = i;
            while i < bytes.len()
                && ((bytes[i] as char).is_ascii_alphanumeric()
                    || bytes[i] == b'.'
                    || ((bytes[i] == b'-' || bytes[i] == b'+')
                        && matches!(bytes[i - 1], b'e' | b'E')))
            {
                i += 1;
            }
            tokens.push(Tok::Number(text[start..i].to_string()));
            continue;
        }
        if "{}<>,;=[]()@+-*".contains(c) {
            tokens.push(Tok::Punct(c));
            i += 1;
            continue;
        }
        return Err(BagError::parse(
            ParseErrorKind::UnknownToken,
            format!("{c:?} at offset {i}"),
        ));
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
    context: String,
    structs: Vec<MsgDef>,
    /// Constants keyed by the scope they were declared in.
    constants: BTreeMap<String, Vec<ConstDef>>,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn err(&self, kind: ParseErrorKind) -> BagError {
        let near = self
            .peek()
            .map_or_else(|| "end of input".to_string(), Tok::text);
        BagError::parse(kind, format!("{} near {near:?}", self.context))
    }

    fn expect_punct(&mut self, c: char) -> Result<()> {
        match self.next() {
            Some(Tok::Punct(p)) if p == c => Ok(()),
            _ => Err(self.err(ParseErrorKind::UnknownToken)),
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.next() {
            Some(Tok::Ident(s)) => Ok(s),
            _ => Err(self.err(ParseErrorKind::UnknownToken)),
        }
    }

    /// Parse definitions until end of input (`top` true) or a closing brace.
    fn parse_definitions(&mut self, scope: &mut Vec<String>, top: bool) -> Result<()> {
        loop {
            match self.peek() {
                None => {
                    if top {
                        return Ok(());
                    }
                    return Err(self.err(ParseErrorKind::UnknownToken));
                }
                Some(Tok::Punct('}')) => {
                    if top {
                        return Err(self.err(ParseErrorKind::UnknownToken));
                    }
                    return Ok(());
                }
                Some(Tok::Punct('@')) => {
                    self.skip_annotation()?;
                }
                Some(Tok::Punct(';')) => {
                    self.pos += 1;
                }
                Some(Tok::Ident(word)) => match word.as_str() {
                    "module" => self.parse_module(scope)?,
                    "struct" => self.parse_struct(scope)?,
                    "const" => self.parse_const(scope)?,
                    "typedef" => self.skip_to_semicolon(),
                    _ => return Err(self.err(ParseErrorKind::UnknownToken)),
                },
                Some(_) => return Err(self.err(ParseErrorKind::UnknownToken)),
            }
        }
    }

    fn parse_module(&mut self, scope: &mut Vec<String>) -> Result<()> {
        self.pos += 1; // module
        let name = self.expect_ident()?;
        self.expect_punct('{')?;
        scope.push(name);
        self.parse_definitions(scope, false)?;
        scope.pop();
        self.expect_punct('}')?;
        if matches!(self.peek(), Some(Tok::Punct(';'))) {
            self.pos += 1;
        }
        Ok(())
    }

    fn parse_struct(&mut self, scope: &mut Vec<String>) -> Result<()> {
        self.pos += 1; // struct
        let name = self.expect_ident()?;
        let fqn = scoped_name(scope, &name);
        self.expect_punct('{')?;

        let mut def = MsgDef::new(fqn);
        while !matches!(self.peek(), Some(Tok::Punct('}'))) {
            self.parse_member(&mut def)?;
        }
        self.expect_punct('}')?;
        if matches!(self.peek(), Some(Tok::Punct(';'))) {
            self.pos += 1;
        }
        self.structs.push(def);
        Ok(())
    }

    fn parse_member(&mut self, def: &mut MsgDef) -> Result<()> {
        let mut default = None;
        while matches!(self.peek(), Some(Tok::Punct('@'))) {
            if let Some(value) = self.skip_annotation()? {
                default = Some(value);
            }
        }

        let ty = self.parse_type_spec()?;
        loop {
            let fname = self.expect_ident()?;
            let fty = if matches!(self.peek(), Some(Tok::Punct('['))) {
                self.pos += 1;
                let n = self.expect_number()?;
                self.expect_punct(']')?;
                FieldType::Array(Box::new(ty.clone()), n)
            } else {
                ty.clone()
            };
            def.fields.push(FieldDef {
                name: fname,
                ty: fty,
                default: default.clone(),
            });
            match self.next() {
                Some(Tok::Punct(',')) => continue,
                Some(Tok::Punct(';')) => return Ok(()),
                _ => return Err(self.err(ParseErrorKind::BadField)),
            }
        }
    }

    fn parse_const(&mut self, scope: &mut Vec<String>) -> Result<()> {
        self.pos += 1; // const
        let ty = self.parse_type_spec()?;
        let FieldType::Base(base) = ty else {
            return Err(self.err(ParseErrorKind::BadConstant));
        };
        let name = self.expect_ident()?;
        self.expect_punct('=')?;

        let mut value = String::new();
        loop {
            match self.next() {
                Some(Tok::Punct(';')) => break,
                Some(tok) => value.push_str(&tok.text()),
                None => return Err(self.err(ParseErrorKind::BadConstant)),
            }
        }

        let key = scope.join("/");
        self.constants
            .entry(key)
            .or_default()
            .push(ConstDef { name, ty: base, value });
        Ok(())
    }

    /// Skip an annotation, returning the captured value for `@default`.
    fn skip_annotation(&mut self) -> Result<Option<String>> {
        self.expect_punct('@')?;
        let name = self.expect_ident()?;
        if !matches!(self.peek(), Some(Tok::Punct('('))) {
            return Ok(None);
        }
        self.pos += 1;

        let mut depth = 1usize;
        let mut body: Vec<Tok> = Vec::new();
        loop {
            match self.next() {
                Some(Tok::Punct('(')) => {
                    depth += 1;
                    body.push(Tok::Punct('('));
                }
                Some(Tok::Punct(')')) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    body.push(Tok::Punct(')'));
                }
                Some(tok) => body.push(tok),
                None => return Err(self.err(ParseErrorKind::UnknownToken)),
            }
        }

        if name != "default" {
            return Ok(None);
        }
        // @default(value=<literal>)
        let mut iter = body.iter();
        while let Some(tok) = iter.next() {
            if matches!(tok, Tok::Ident(id) if id == "value") {
                if matches!(iter.next(), Some(Tok::Punct('='))) {
                    let value: String = iter.map(Tok::text).collect();
                    return Ok(Some(value));
                }
            }
        }
        Ok(None)
    }

    fn parse_type_spec(&mut self) -> Result<FieldType> {
        let word = self.expect_ident()?;
        match word.as_str() {
            "sequence" => {
                self.expect_punct('<')?;
                let elem = self.parse_type_spec()?;
                let bound = if matches!(self.peek(), Some(Tok::Punct(','))) {
                    self.pos += 1;
                    Some(self.expect_number()?)
                } else {
                    None
                };
                self.expect_punct('>')?;
                Ok(FieldType::Sequence(Box::new(elem), bound))
            }
            "string" | "wstring" => {
                if matches!(self.peek(), Some(Tok::Punct('<'))) {
                    self.pos += 1;
                    let _bound = self.expect_number()?;
                    self.expect_punct('>')?;
                }
                Ok(FieldType::Base(BaseType::String))
            }
            "unsigned" => {
                let next = self.expect_ident()?;
                match next.as_str() {
                    "short" => Ok(FieldType::Base(BaseType::UInt16)),
                    "long" => {
                        if matches!(self.peek(), Some(Tok::Ident(id)) if id == "long") {
                            self.pos += 1;
                            Ok(FieldType::Base(BaseType::UInt64))
                        } else {
                            Ok(FieldType::Base(BaseType::UInt32))
                        }
                    }
                    _ => Err(self.err(ParseErrorKind::UnknownToken)),
                }
            }
            "long" => {
                if matches!(self.peek(), Some(Tok::Ident(id)) if id == "long") {
                    self.pos += 1;
                    Ok(FieldType::Base(BaseType::Int64))
                } else if matches!(self.peek(), Some(Tok::Ident(id)) if id == "double") {
                    self.pos += 1;
                    Ok(FieldType::Base(BaseType::Float64))
                } else {
                    Ok(FieldType::Base(BaseType::Int32))
                }
            }
            _ => {
                if matches!(self.peek(), Some(Tok::Scope)) {
                    // Scoped name, e.g. builtin_interfaces::msg::Time.
                    let mut parts = vec![word];
                    while matches!(self.peek(), Some(Tok::Scope)) {
                        self.pos += 1;
                        parts.push(self.expect_ident()?);
                    }
                    return Ok(FieldType::Message(normalize_msgtype(&parts.join("/"))));
                }
                if let Some(base) = BaseType::try_from_name(&word) {
                    return Ok(FieldType::Base(base));
                }
                Ok(FieldType::Message(normalize_msgtype(&word)))
            }
        }
    }

    fn expect_number(&mut self) -> Result<usize> {
        match self.next() {
            Some(Tok::Number(n)) => n
                .parse()
                .map_err(|_| self.err(ParseErrorKind::UnknownToken)),
            _ => Err(self.err(ParseErrorKind::UnknownToken)),
        }
    }

    fn skip_to_semicolon(&mut self) {
        while !matches!(self.next(), Some(Tok::Punct(';')) | None) {}
    }
}

fn scoped_name(scope: &[String], name: &str) -> String {
    let mut parts: Vec<&str> = scope.iter().map(String::as_str).collect();
    parts.push(name);
    normalize_msgtype(&parts.join("/"))
}
