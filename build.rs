//! Embeds the version string reported by `confgraph version`.

use std::process::Command;

fn main() {
    // CONFGRAPH_VERSION from the release pipeline wins over git describe.
    if let Ok(version) = std::env::var("CONFGRAPH_VERSION") {
        println!("cargo:rustc-env=CONFGRAPH_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=CONFGRAPH_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=CONFGRAPH_VERSION");
}
