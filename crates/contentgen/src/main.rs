//! `contentgen` binary.

fn main() {
    std::process::exit(contentgen_cli::run_cli(std::env::args_os()));
}
