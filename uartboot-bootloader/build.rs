// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let workspace_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap())
        .parent()
        .unwrap()
        .to_path_buf();
    let linker_dir = workspace_dir.join("linker_scripts");

    let linker_script = fs::read_to_string(linker_dir.join("bootloader_rp2040.x"))
        .expect("Failed to read bootloader_rp2040.x");
    fs::write(out_dir.join("memory.x"), linker_script).expect("Failed to write memory.x");

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg=-Tlink.x");
    println!("cargo:rustc-link-arg=-Tdefmt.x");
    println!(
        "cargo:rerun-if-changed={}",
        linker_dir.join("bootloader_rp2040.x").display()
    );
    println!("cargo:rerun-if-changed=build.rs");

    // The get-version reply is a single byte.
    let version_file = workspace_dir.join("VERSION");
    let version = fs::read_to_string(&version_file).expect("Failed to read VERSION file");
    let version: u8 = version
        .trim()
        .parse()
        .expect("VERSION must hold a number between 0 and 255");
    fs::write(
        out_dir.join("version.rs"),
        format!("pub const BOOTLOADER_VERSION: u8 = {version};\n"),
    )
    .expect("Failed to write version.rs");
    println!("cargo:rerun-if-changed={}", version_file.display());
}
