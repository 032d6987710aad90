use std::process::Command;

fn main() {
    capture_toolchain_version();
    capture_git_info();

    let release_tag = std::env::var("STRATA_RELEASE_TAG").unwrap_or_else(|_| "DEVELOPMENT".to_string());
    println!("cargo:rustc-env=STRATA_RELEASE_TAG={}", release_tag);
    println!("cargo:rustc-env=STRATA_BUILD_TIMESTAMP={}", chrono::Utc::now().to_rfc3339());

    println!("cargo:rerun-if-env-changed=STRATA_RELEASE_TAG");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Record the rustc that compiled this binary, checked again at startup
fn capture_toolchain_version() {
    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=STRATA_RUSTC_VERSION={}", version);
}

fn capture_git_info() {
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .current_dir(".")
        .output()
    {
        if output.status.success() {
            let hash = String::from_utf8_lossy(&output.stdout);
            println!("cargo:rustc-env=STRATA_COMMIT_ID={}", hash.trim());
            return;
        }
    }
    println!("cargo:rustc-env=STRATA_COMMIT_ID=unknown");
}
