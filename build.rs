use std::process::Command;

/// Short description of the checked out revision, `None` outside a git tree.
fn git_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let revision = String::from_utf8(output.stdout).ok()?;
    let revision = revision.trim();
    (!revision.is_empty()).then(|| revision.to_string())
}

fn main() {
    let revision = git_revision().unwrap_or_else(|| "unknown".to_string());
    let package_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();

    // GIT_HASH is reported by `GET /`, SONG_LIBRARY_VERSION by `--version`.
    println!("cargo:rustc-env=GIT_HASH={}", revision);
    println!(
        "cargo:rustc-env=SONG_LIBRARY_VERSION={}+{}",
        package_version, revision
    );

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
}
