// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ROS1 message definition and md5sum generation.
//!
//! rosbag1 connection records carry the concatenated ROS1 definition text
//! and its canonical md5sum. The hash is recursive: nested message types are
//! replaced by their own md5 before hashing, constants are hashed as
//! `type name=value` lines, and `std_msgs/msg/Header` gains the ROS1-only
//! `uint32 seq` field.

use crate::core::error::Result;

use super::ast::{denormalize_msgtype, FieldDef, FieldType};
use super::registry::TypeRegistry;

/// Render `builtin_interfaces` stamps with their ROS1 alias names.
fn ros1_alias(name: &str) -> Option<&'static str> {
    match name {
        "builtin_interfaces/msg/Time" => Some("time"),
        "builtin_interfaces/msg/Duration" => Some("duration"),
        _ => None,
    }
}

/// Generate the concatenated ROS1 definition text and md5sum for a type.
pub fn generate_msgdef(typename: &str, registry: &TypeRegistry) -> Result<(String, String)> {
    let mut subdefs: Vec<(String, (String, String))> = Vec::new();
    let (deftext, md5sum) = gendefhash(typename, &mut subdefs, registry)?;

    let mut msgdef = deftext;
    for (name, (text, _)) in &subdefs {
        msgdef.push_str(&"=".repeat(80));
        msgdef.push_str("\nMSG: ");
        msgdef.push_str(&denormalize_msgtype(name));
        msgdef.push('\n');
        msgdef.push_str(text);
    }
    Ok((msgdef, md5sum))
}

/// Generate definition text and hash for one type, collecting nested
/// definitions into `subdefs` in first-visit order.
fn gendefhash(
    typename: &str,
    subdefs: &mut Vec<(String, (String, String))>,
    registry: &TypeRegistry,
) -> Result<(String, String)> {
    let def = registry.lookup(typename)?;

    let mut deftext: Vec<String> = Vec::new();
    let mut hashtext: Vec<String> = Vec::new();

    for con in &def.constants {
        let line = format!("{} {}={}", con.ty.name(), con.name, con.value);
        deftext.push(line.clone());
        hashtext.push(line);
    }

    for field in &def.fields {
        match &field.ty {
            FieldType::Base(base) => {
                let line = format!("{} {}", base.name(), field.name);
                deftext.push(line.clone());
                hashtext.push(line);
            }
            FieldType::Message(subname) => {
                if let Some(alias) = ros1_alias(subname) {
                    let line = format!("{alias} {}", field.name);
                    deftext.push(line.clone());
                    hashtext.push(line);
                } else {
                    let subhash = subdef_hash(subname, subdefs, registry)?;
                    deftext.push(format!(
                        "{} {}",
                        denormalize_msgtype(subname),
                        field.name
                    ));
                    hashtext.push(format!("{subhash} {}", field.name));
                }
            }
            FieldType::Array(elem, len) => {
                render_array(field, elem, &len.to_string(), &mut deftext, &mut hashtext, subdefs, registry)?;
            }
            FieldType::Sequence(elem, bound) => {
                let count = bound.map_or(String::new(), |n| n.to_string());
                render_array(field, elem, &count, &mut deftext, &mut hashtext, subdefs, registry)?;
            }
        }
    }

    if typename == "std_msgs/msg/Header" {
        deftext.insert(0, "uint32 seq".to_string());
        hashtext.insert(0, "uint32 seq".to_string());
    }

    deftext.push(String::new());
    let digest = md5::compute(hashtext.join("\n").as_bytes());
    Ok((deftext.join("\n"), format!("{digest:x}")))
}

/// Render an array or sequence field line. The hash line for message
/// elements carries the element md5 without the bracket suffix.
#[allow(clippy::too_many_arguments)]
fn render_array(
    field: &FieldDef,
    elem: &FieldType,
    count: &str,
    deftext: &mut Vec<String>,
    hashtext: &mut Vec<String>,
    subdefs: &mut Vec<(String, (String, String))>,
    registry: &TypeRegistry,
) -> Result<()> {
    match elem {
        FieldType::Base(base) => {
            let line = format!("{}[{count}] {}", base.name(), field.name);
            deftext.push(line.clone());
            hashtext.push(line);
        }
        FieldType::Message(subname) => {
            if let Some(alias) = ros1_alias(subname) {
                let line = format!("{alias}[{count}] {}", field.name);
                deftext.push(line.clone());
                hashtext.push(line);
            } else {
                let subhash = subdef_hash(subname, subdefs, registry)?;
                deftext.push(format!(
                    "{}[{count}] {}",
                    denormalize_msgtype(subname),
                    field.name
                ));
                hashtext.push(format!("{subhash} {}", field.name));
            }
        }
        // Nested arrays do not occur in ROS definitions.
        FieldType::Array(inner, _) | FieldType::Sequence(inner, _) => {
            return render_array(field, inner, count, deftext, hashtext, subdefs, registry);
        }
    }
    Ok(())
}

/// Get the md5 of a nested type, generating and recording its definition on
/// first visit.
fn subdef_hash(
    subname: &str,
    subdefs: &mut Vec<(String, (String, String))>,
    registry: &TypeRegistry,
) -> Result<String> {
    if let Some((_, (_, hash))) = subdefs.iter().find(|(name, _)| name == subname) {
        if !hash.is_empty() {
            return Ok(hash.clone());
        }
    } else {
        // Placeholder first, matching first-visit ordering.
        subdefs.push((subname.to_string(), (String::new(), String::new())));
        let generated = gendefhash(subname, subdefs, registry)?;
        if let Some(entry) = subdefs.iter_mut().find(|(name, _)| name == subname) {
            entry.1 = generated;
        }
    }
    let (_, (_, hash)) = subdefs
        .iter()
        .find(|(name, _)| name == subname)
        .expect("subdef recorded above");
    Ok(hash.clone())
}
