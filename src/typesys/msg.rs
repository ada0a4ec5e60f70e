// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Parser for the `.msg` definition dialect.
//!
//! The dialect is line-oriented: one field or constant per line, `#`
//! comments, and concatenated definitions separated by lines of `=`
//! characters followed by a `MSG: <name>` header, as found in rosbag1
//! connection records. Default values and sequence bounds are recognised and
//! recorded but not enforced.

use std::collections::BTreeMap;

use crate::core::error::{BagError, ParseErrorKind, Result};

use super::ast::{normalize_msgtype, BaseType, ConstDef, FieldDef, FieldType, MsgDef};

/// Parse a `.msg` definition, including any embedded sibling definitions.
///
/// `name` is the type name of the primary definition; relative type
/// references resolve against its package.
pub fn parse_msg(text: &str, name: &str) -> Result<BTreeMap<String, MsgDef>> {
    let primary = normalize_msgtype(name);
    let sections = split_sections(text, &primary)?;

    // Bare names resolve to any definition embedded in the same text.
    let mut short_names: BTreeMap<String, String> = BTreeMap::new();
    for (secname, _) in &sections {
        if let Some(short) = secname.rsplit('/').next() {
            short_names.insert(short.to_string(), secname.clone());
        }
    }

    let mut defs = BTreeMap::new();
    for (secname, lines) in sections {
        let mut def = MsgDef::new(secname.clone());
        for (lineno, line) in lines {
            parse_line(line, lineno, &secname, &short_names, &mut def)?;
        }
        defs.insert(secname, def);
    }
    Ok(defs)
}

/// A separator is a line of three or more `=` characters and nothing else.
fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '=')
}

type Section<'a> = (String, Vec<(usize, &'a str)>);

/// Split concatenated definitions into named sections.
fn split_sections<'a>(text: &'a str, primary: &str) -> Result<Vec<Section<'a>>> {
    let mut sections: Vec<Section<'a>> = vec![(primary.to_string(), Vec::new())];
    let mut expect_header = false;

    for (lineno, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if is_separator(trimmed) {
            expect_header = true;
            continue;
        }
        if expect_header {
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some(rest) = trimmed.strip_prefix("MSG:") else {
                return Err(BagError::parse(
                    ParseErrorKind::MissingType,
                    format!("line {}", lineno + 1),
                ));
            };
            sections.push((normalize_msgtype(rest.trim()), Vec::new()));
            expect_header = false;
            continue;
        }
        if let Some((_, lines)) = sections.last_mut() {
            lines.push((lineno, line));
        }
    }
    Ok(sections)
}

/// Parse a single definition line into a field or constant.
fn parse_line(
    line: &str,
    lineno: usize,
    owner: &str,
    short_names: &BTreeMap<String, String>,
    def: &mut MsgDef,
) -> Result<()> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(());
    }
    let location = format!("line {}", lineno + 1);

    let Some(split) = trimmed.find(char::is_whitespace) else {
        return Err(BagError::parse(ParseErrorKind::BadField, location));
    };
    let typespec = &trimmed[..split];
    let rest = trimmed[split..].trim_start();

    // `NAME=value` after the type marks a constant. The check looks only at
    // the part before the first `=` so string values may contain `=`.
    if let Some(eq) = rest.find('=') {
        let cname = rest[..eq].trim();
        if is_identifier(cname) {
            let value = &rest[eq + 1..];
            return parse_constant(typespec, cname, value, &location, def);
        }
    }

    // Field line; `#` starts a comment anywhere past the type.
    let rest = strip_comment(rest).trim_end();
    let mut words = rest.splitn(2, char::is_whitespace);
    let fname = words.next().unwrap_or("");
    if !is_identifier(fname) {
        return Err(BagError::parse(ParseErrorKind::BadField, location));
    }
    let default = words
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    let ty = parse_typespec(typespec, owner, short_names, &location)?;
    def.fields.push(FieldDef {
        name: fname.to_string(),
        ty,
        default,
    });
    Ok(())
}

fn parse_constant(
    typespec: &str,
    cname: &str,
    value: &str,
    location: &str,
    def: &mut MsgDef,
) -> Result<()> {
    let Some(ty) = BaseType::try_from_name(typespec) else {
        return Err(BagError::parse(
            ParseErrorKind::BadConstant,
            location.to_string(),
        ));
    };

    // String constants keep everything to the end of the line; other
    // constants may carry a trailing comment.
    let value = if ty == BaseType::String {
        value.trim().to_string()
    } else {
        strip_comment(value).trim().to_string()
    };
    if value.is_empty() && ty != BaseType::String {
        return Err(BagError::parse(
            ParseErrorKind::BadConstant,
            location.to_string(),
        ));
    }

    def.constants.push(ConstDef {
        name: cname.to_string(),
        ty,
        value,
    });
    Ok(())
}

/// Parse a type specifier with optional array suffix, e.g. `float64[36]`,
/// `int32[]`, `uint8[<=10]`, `string<=5`.
fn parse_typespec(
    spec: &str,
    owner: &str,
    short_names: &BTreeMap<String, String>,
    location: &str,
) -> Result<FieldType> {
    let (base, suffix) = match spec.find('[') {
        Some(pos) => {
            let Some(inner) = spec[pos..].strip_prefix('[').and_then(|s| s.strip_suffix(']'))
            else {
                return Err(BagError::parse(
                    ParseErrorKind::BadField,
                    location.to_string(),
                ));
            };
            (&spec[..pos], Some(inner))
        }
        None => (spec, None),
    };

    let elem = resolve_base(base, owner, short_names, location)?;
    match suffix {
        None => Ok(elem),
        Some("") => Ok(FieldType::Sequence(Box::new(elem), None)),
        Some(inner) => {
            if let Some(bound) = inner.strip_prefix("<=") {
                let n = bound.trim().parse().map_err(|_| {
                    BagError::parse(ParseErrorKind::BadField, location.to_string())
                })?;
                Ok(FieldType::Sequence(Box::new(elem), Some(n)))
            } else {
                let n = inner.trim().parse().map_err(|_| {
                    BagError::parse(ParseErrorKind::BadField, location.to_string())
                })?;
                Ok(FieldType::Array(Box::new(elem), n))
            }
        }
    }
}

/// Resolve a scalar type name to a primitive or a fully-qualified message
/// reference.
fn resolve_base(
    base: &str,
    owner: &str,
    short_names: &BTreeMap<String, String>,
    location: &str,
) -> Result<FieldType> {
    // Bounded strings reduce to plain strings; the bound is not enforced.
    let base = base.split_once("<=").map_or(base, |(b, _)| b);
    if base.is_empty() {
        return Err(BagError::parse(
            ParseErrorKind::MissingType,
            location.to_string(),
        ));
    }

    match base {
        "time" => return Ok(FieldType::Message("builtin_interfaces/msg/Time".into())),
        "duration" => {
            return Ok(FieldType::Message("builtin_interfaces/msg/Duration".into()))
        }
        _ => {}
    }
    if let Some(prim) = BaseType::try_from_name(base) {
        return Ok(FieldType::Base(prim));
    }
    if !base
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '/')
    {
        return Err(BagError::parse(
            ParseErrorKind::UnknownToken,
            location.to_string(),
        ));
    }

    if let Some(full) = short_names.get(base) {
        return Ok(FieldType::Message(full.clone()));
    }
    if base == "Header" {
        return Ok(FieldType::Message("std_msgs/msg/Header".into()));
    }
    if base.contains('/') {
        return Ok(FieldType::Message(normalize_msgtype(base)));
    }
    let pkg = owner.split('/').next().unwrap_or(owner);
    Ok(FieldType::Message(format!("{pkg}/msg/{base}")))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn strip_comment(s: &str) -> &str {
    match s.find('#') {
        Some(pos) => &s[..pos],
        None => s,
    }
}
