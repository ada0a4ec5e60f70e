// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # rosbags
//!
//! Read, write, and convert the two robotics log-file formats: **rosbag1**
//! (legacy single-file record stream) and **rosbag2** (directory with a
//! metadata document and sqlite storage), together with the ROS message
//! type system and wire codecs they rely on.
//!
//! The crate is organized in layers sharing one data model, the type
//! registry:
//! - [`typesys`] - `.msg`/`.idl` definition parsers, parse trees, registry
//! - [`serde`] - CDR and ROS1 codecs plus direct byte-level transcoding
//! - [`rosbag1`] / [`rosbag2`] - container readers and writers
//! - [`convert`] - cross-format conversion composing the layers above
//!
//! ## Example: reading a rosbag1 file
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use rosbags::rosbag1::Reader;
//!
//! let mut reader = Reader::open("input.bag")?;
//! for message in reader.messages(None, None, None)? {
//!     let (connection, timestamp, data) = message?;
//!     println!("{} @ {timestamp}: {} bytes", connection.topic, data.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: decoding message bytes
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use rosbags::serde::deserialize_cdr;
//! use rosbags::typesys::default_registry;
//!
//! # let raw: Vec<u8> = vec![];
//! let value = deserialize_cdr(&raw, "std_msgs/msg/String", default_registry())?;
//! println!("{:?}", value.get("data"));
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod core;
pub mod rosbag1;
pub mod rosbag2;
pub mod serde;
pub mod typesys;

pub use crate::core::{BagError, Connection, ConnectionExt, ParseErrorKind, Result, Value};
pub use crate::serde::Endianness;
pub use crate::typesys::{default_registry, TypeRegistry};
