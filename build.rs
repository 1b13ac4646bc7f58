//! Build script for pr-manager: embeds a human-readable version string.
//!
//! The string has the shape `<pkg-version> (<git-version>) <rustc-version>`.
//! `<git-version>` comes from `git describe --tags --always --dirty` when a
//! tag is reachable; otherwise it is synthesised as
//! `v<pkg-version>-<YYYYmmddHHMMSS>-<sha12>[+dirty]`, using the commit time
//! for clean trees and the build time for dirty ones. Any component that
//! cannot be determined is omitted.

use std::{env, process::Command};

use chrono::{DateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

fn main() {
    for path in ["src", "build.rs", "Cargo.toml", "Cargo.lock"] {
        println!("cargo:rerun-if-changed={path}");
    }

    let pkg_version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
    let info = [
        Some(pkg_version.clone()),
        describe_revision(&pkg_version).map(|v| format!("({v})")),
        run("rustc", &["--version"]),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={info}");
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn git(args: &[&str]) -> Option<String> {
    run("git", args)
}

fn describe_revision(pkg_version: &str) -> Option<String> {
    match git(&["describe", "--tags", "--always", "--dirty"]) {
        // A bare hash means no tag is reachable.
        Some(desc) if desc.contains('v') || desc.contains("-g") => Some(desc),
        _ => Some(pseudo_version(pkg_version)),
    }
}

/// `None` when git is unavailable. `.cargo-ok` is written by `cargo install
/// --git` into the checkout and does not count as a change.
fn worktree_dirty() -> Option<bool> {
    git(&["status", "--porcelain"]).map(|status| {
        status
            .lines()
            .filter_map(|line| line.get(3..))
            .any(|path| path != ".cargo-ok")
    })
}

fn pseudo_version(pkg_version: &str) -> String {
    let sha = git(&["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let dirty = worktree_dirty();
    let now = || Utc::now().format(TIMESTAMP_FORMAT).to_string();

    let stamp = match dirty {
        Some(false) => git(&["log", "-1", "--format=%ct"])
            .and_then(|secs| secs.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|at| at.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(now),
        Some(true) | None => now(),
    };
    let suffix = if dirty == Some(true) { "+dirty" } else { "" };

    format!("v{pkg_version}-{stamp}-{sha}{suffix}")
}
