use clap::Parser;
use datasolver::adapter::inbound::cli::{self, command::Cli};

fn main() -> miette::Result<()> {
    let _ = dotenvy::dotenv();
    cli::execute(Cli::parse())
}
