// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `rosbags-convert` - convert between rosbag1 and rosbag2.
//!
//! A `.bag` source is upgraded to a rosbag2 directory; a directory source
//! is downgraded to a `.bag` file. Exit codes: 0 on success, 1 on
//! conversion errors, 2 on usage errors.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use rosbags::convert::convert;

/// Convert between rosbag1 and rosbag2.
#[derive(Parser)]
#[command(name = "rosbags-convert")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert between rosbag1 and rosbag2", long_about = None)]
struct Cli {
    /// Source path to read from
    src: PathBuf,

    /// Destination path; derived from the source stem when omitted
    #[arg(long)]
    dst: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if !cli.src.exists() {
        eprintln!("ERROR: {} does not exist.", cli.src.display());
        process::exit(2);
    }

    if let Err(err) = convert(&cli.src, cli.dst.as_deref()) {
        eprintln!("ERROR: {err}");
        process::exit(1);
    }
}
