// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types shared by every layer: errors, message values, connections.

pub mod connection;
pub mod error;
pub mod value;

pub use connection::{Connection, ConnectionExt};
pub use error::{BagError, ParseErrorKind, Result};
pub use value::Value;
