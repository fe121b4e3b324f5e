use clap::Parser;
use ratchet::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
