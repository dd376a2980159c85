use std::env;
use std::process::Command;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let commit = env::var("GITHUB_SHA")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| run_git(&["rev-parse", "HEAD"]))
        .map(|full| shorten_commit(&full))
        .unwrap_or_else(|| "unknown".to_string());

    let build_date = run_git(&["log", "-1", "--format=%cI"])
        .or_else(source_date)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=FLIPDOTFLUT_BUILD_COMMIT={}", commit);
    println!("cargo:rustc-env=FLIPDOTFLUT_BUILD_DATE={}", build_date);
}

fn run_git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if value.is_empty() { None } else { Some(value) }
}

/// Reproducible builds pin the date through `SOURCE_DATE_EPOCH`; otherwise
/// fall back to the build time.
fn source_date() -> Option<String> {
    let date = match env::var("SOURCE_DATE_EPOCH").ok().and_then(|v| v.parse::<i64>().ok()) {
        Some(epoch) => OffsetDateTime::from_unix_timestamp(epoch).ok()?,
        None => OffsetDateTime::now_utc(),
    };
    date.format(&Rfc3339).ok()
}

fn shorten_commit(full: &str) -> String {
    full.chars().take(7).collect()
}
