// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn flag(id: &'static str, short: char, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .short(short)
        .long(long)
        .action(ArgAction::SetTrue)
        .help(help)
}

fn build_cli() -> Command {
    Command::new("cbrxz")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Normalize comic book archives: repack CBR/RAR as CBZ, copy everything else")
        .arg(Arg::new("source").required(true).help("Source file or directory"))
        .arg(
            Arg::new("destination")
                .required(true)
                .help("Destination directory (created if absent)"),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("PATH")
                .help("Base directory for destination paths; must contain SOURCE"),
        )
        .arg(flag("rar_only", 'R', "rar-only", "Only process .cbr and .rar files"))
        .arg(flag(
            "replace",
            'F',
            "replace",
            "Overwrite files that already exist in the destination",
        ))
        .arg(flag(
            "dry_run",
            'N',
            "dry-run",
            "Log what would be done without writing anything",
        ))
        .arg(
            Arg::new("exclude")
                .long("exclude")
                .value_name("GLOB")
                .action(ArgAction::Append)
                .help("Skip files whose name matches this glob (repeatable)"),
        )
        .arg(
            Arg::new("log_level")
                .long("log-level")
                .value_parser(["DEBUG", "INFO", "WARNING", "ERROR"])
                .default_value("INFO")
                .help("Logging verbosity (RUST_LOG overrides)"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

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

    let man_path = man_dir.join("cbrxz.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
