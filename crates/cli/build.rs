use std::process::Command;

/// Short commit hash of the checkout, or "unknown" outside a git tree.
fn git_commit() -> String {
    Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/heads");

    // Shown by `listwash --version` and in the JSON `meta` block.
    println!("cargo:rustc-env=LISTWASH_COMMIT={}", git_commit());
    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=LISTWASH_TARGET={}", target);
}
