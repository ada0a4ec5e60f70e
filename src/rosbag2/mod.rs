// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag2 container: metadata document, sqlite storage, reader and writer.

pub mod metadata;
pub mod reader;
pub mod writer;

pub use metadata::BagMetadata;
pub use reader::{Messages, Reader};
pub use writer::{CompressionMode, Writer};
