use clap::Parser;
use stockscope::cli::{run, Cli};
use stockscope::logging::setup_logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);
    run(cli)
}
