fn main() {
    // Stamped into the mutation report header
    println!(
        "cargo:rustc-env=SEED_VULNS_BUILD_TIMESTAMP={}",
        chrono::Utc::now().to_rfc3339()
    );
    println!("cargo:rerun-if-changed=.git/HEAD");

    if let Ok(output) = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    {
        if output.status.success() {
            let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
            println!("cargo:rustc-env=SEED_VULNS_GIT_HASH={hash}");
        }
    }
}
