use anyhow::Result;
use caseframes_cli::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::FmtSubscriber;

mod commands;

fn run(cli: &Cli) -> Result<()> {
    let options = cli.load_options()?;
    match &cli.command {
        Commands::Inspect { case, json } => commands::inspect::handle(case, *json, &options),
        Commands::Convert {
            case,
            to,
            output,
            per_unit,
            reset_index,
        } => commands::convert::handle(case, *to, output, *per_unit, *reset_index, &options),
        Commands::Columns { field } => commands::columns::handle(field, &options),
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging disabled: {err}");
    }

    if let Err(err) = run(&cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
