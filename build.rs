// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("buildinfo-snapshot")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Conary Contributors")
        .about("Find the earliest snapshot.debian.org snapshot containing a build environment")
        .arg(Arg::new("buildinfo").required(true).help("Path to the .buildinfo file"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("TOML configuration file"),
        )
        .arg(Arg::new("api_url").long("api-url").help("Snapshot machine-readable API base URL"))
        .arg(Arg::new("mirror_url").long("mirror-url").help("Snapshot mirror base URL"))
        .arg(
            Arg::new("archive")
                .short('a')
                .long("archive")
                .help("Archive name (debian, debian-ports, debian-security, ...)"),
        )
        .arg(Arg::new("suite").short('s').long("suite").help("Suite whose index is verified"))
        .arg(Arg::new("area").long("area").help("Archive area whose index is verified"))
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .help("HTTP timeout in seconds (0 disables)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Show debug output"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Only show warnings and errors"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("buildinfo-snapshot.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
