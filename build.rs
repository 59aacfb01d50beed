use std::process::Command;

fn main() {
    // A release pipeline can pin the version through DOTFORGE_VERSION;
    // local builds describe the checkout instead.
    if let Ok(version) = std::env::var("DOTFORGE_VERSION") {
        println!("cargo:rustc-env=DOTFORGE_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !version.is_empty() {
            println!("cargo:rustc-env=DOTFORGE_VERSION={version}");
        }
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=DOTFORGE_VERSION");
}
