// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Conversion between rosbag1 and rosbag2.
//!
//! A reader of one format is paired with a writer of the other; messages
//! are transcoded byte-level, never through typed values. Types found in
//! rosbag1 connection records are parsed and auto-registered; rosbag2
//! inputs require every type to resolve from the registry.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::connection::{Connection, ConnectionExt};
use crate::core::error::{BagError, Result};
use crate::serde::transcode::{cdr_to_ros1, ros1_to_cdr};
use crate::typesys::msg::parse_msg;
use crate::typesys::msgdef::generate_msgdef;
use crate::typesys::registry::{default_registry, TypeRegistry};
use crate::{rosbag1, rosbag2};

/// QoS profile offered for topics that were latched in rosbag1.
/// `durability: 1` is transient-local.
const LATCH: &str = "\
- history: 3
  depth: 0
  reliability: 1
  durability: 1
  deadline:
    sec: 2147483647
    nsec: 4294967295
  lifespan:
    sec: 2147483647
    nsec: 4294967295
  liveliness: 1
  liveliness_lease_duration:
    sec: 2147483647
    nsec: 4294967295
  avoid_ros_namespace_conventions: false
";

/// Convert between rosbag1 and rosbag2 using the default registry.
///
/// A `.bag` source upgrades to a rosbag2 directory; a directory source
/// downgrades to a `.bag` file. The destination defaults to the source
/// stem and must not exist.
pub fn convert(src: &Path, dst: Option<&Path>) -> Result<()> {
    convert_with_registry(src, dst, default_registry())
}

/// Convert with an explicit type registry.
pub fn convert_with_registry(
    src: &Path,
    dst: Option<&Path>,
    registry: &TypeRegistry,
) -> Result<()> {
    let upgrade = src.extension().is_some_and(|ext| ext == "bag");
    let dst: PathBuf = match dst {
        Some(dst) => dst.to_path_buf(),
        None => {
            if upgrade {
                src.with_extension("")
            } else {
                src.with_extension("bag")
            }
        }
    };
    if dst.exists() {
        return Err(BagError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("output path {} exists already", dst.display()),
        )));
    }

    info!(src = %src.display(), dst = %dst.display(), upgrade, "converting bag");
    if upgrade {
        convert_1to2(src, &dst, registry)
    } else {
        convert_2to1(src, &dst, registry)
    }
}

/// Upgrade a rosbag1 file to a rosbag2 directory.
fn convert_1to2(src: &Path, dst: &Path, registry: &TypeRegistry) -> Result<()> {
    let mut reader = rosbag1::Reader::open(src)?;
    let mut writer = rosbag2::Writer::new(dst)?;
    writer.open()?;

    // Register every type found in the connection records, then map each
    // source connection to a target connection.
    let mut types = BTreeMap::new();
    for conn in reader.connections() {
        if let ConnectionExt::Rosbag1 { msgdef, .. } = &conn.ext {
            types.extend(parse_msg(msgdef, &conn.msgtype)?);
        }
    }
    registry.register(types)?;

    let mut connmap: HashMap<usize, Connection> = HashMap::new();
    for conn in reader.connections().cloned().collect::<Vec<_>>() {
        let qos = if conn.is_latching() { LATCH } else { "" };
        let existing = writer
            .connections()
            .iter()
            .find(|have| {
                have.topic == conn.topic
                    && have.msgtype == conn.msgtype
                    && matches!(
                        &have.ext,
                        ConnectionExt::Rosbag2 { offered_qos_profiles, .. }
                            if offered_qos_profiles == qos
                    )
            })
            .cloned();
        let target = match existing {
            Some(target) => target,
            None => writer.add_connection(&conn.topic, &conn.msgtype, "cdr", qos)?,
        };
        connmap.insert(conn.id, target);
    }

    for message in reader.messages(None, None, None)? {
        let (conn, timestamp, data) = message?;
        let data = ros1_to_cdr(&data, &conn.msgtype, registry)?;
        let target = connmap
            .get(&conn.id)
            .ok_or_else(|| BagError::unknown_type(&conn.msgtype))?;
        writer.write(target, timestamp, &data)?;
    }

    writer.close()
}

/// Downgrade a rosbag2 directory to a rosbag1 file.
fn convert_2to1(src: &Path, dst: &Path, registry: &TypeRegistry) -> Result<()> {
    let mut reader = rosbag2::Reader::new(src)?;
    reader.open()?;
    let mut writer = rosbag1::Writer::new(dst)?;
    writer.open()?;

    let mut connmap: HashMap<usize, Connection> = HashMap::new();
    for conn in reader.connections().to_vec() {
        let (msgdef, md5sum) = generate_msgdef(&conn.msgtype, registry).map_err(|err| {
            match err {
                BagError::TypeNotFound { type_name } => BagError::UnknownType { type_name },
                other => other,
            }
        })?;
        let latching = u8::from(conn.is_latching());

        let existing = writer
            .connections()
            .iter()
            .find(|have| {
                have.topic == conn.topic
                    && matches!(
                        &have.ext,
                        ConnectionExt::Rosbag1 { md5sum: have_md5, latching: have_latch, .. }
                            if *have_md5 == md5sum && *have_latch == latching
                    )
            })
            .cloned();
        let target = match existing {
            Some(target) => target,
            None => writer.add_connection(
                &conn.topic,
                &conn.msgtype,
                Some((msgdef, md5sum)),
                None,
                latching,
                registry,
            )?,
        };
        connmap.insert(conn.id, target);
    }

    for message in reader.messages(None, None, None)? {
        let (conn, timestamp, data) = message?;
        let data = cdr_to_ros1(&data, &conn.msgtype, registry)?;
        let target = connmap
            .get(&conn.id)
            .ok_or_else(|| BagError::unknown_type(&conn.msgtype))?;
        writer.write(target, timestamp, &data)?;
    }

    reader.close();
    writer.close()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_profile_is_transient_local() {
        assert!(LATCH.contains("durability: 1"));
    }

    #[test]
    fn test_destination_derivation_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("input.bag");
        std::fs::write(&src, b"").unwrap();
        let dst = dir.path().join("input");
        std::fs::create_dir(&dst).unwrap();
        let err = convert(&src, None).unwrap_err();
        assert!(matches!(err, BagError::Io(_)));
    }
}
