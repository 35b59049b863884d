use anyhow::Result;
use clap::Parser;
use testpick::{cli::Cli, logging, workflow};

fn main() -> Result<()> {
    let cli_args = Cli::parse();
    logging::init_logging(cli_args.log_file.as_deref(), cli_args.log_level)?;

    // The terminal is already restored once the workflow returns.
    let code = workflow::run_testpick(cli_args)?;
    std::process::exit(code);
}
