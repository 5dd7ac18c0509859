//! Build script for bootsound
//!
//! Stamps the binary with a one-line build id (`BUILD_ID`) that the worker
//! logs at startup, so a boot log identifies the exact image that played.

use std::path::Path;
use std::process::Command;

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn main() {
    let hash = git_short_hash().unwrap_or_else(|| "nogit".to_string());
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");

    println!("cargo:rustc-env=BUILD_ID={}-{}-{}", hash, profile, stamp);

    // Re-stamp on new commits rather than on every build
    println!("cargo:rerun-if-changed=build.rs");
    let head = Path::new("../.git/HEAD");
    if head.exists() {
        println!("cargo:rerun-if-changed={}", head.display());
    }
}
