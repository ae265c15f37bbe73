use clap::Parser;

use tlc::cli::Cli;
use tlc::config::Scheme;
use tlc::{GenerateOptions, generate};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let scheme = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Scheme::from_json_str(&text)?
        }
        None => Scheme::default(),
    };

    generate(
        &cli.inputs,
        &cli.output,
        &scheme,
        &GenerateOptions {
            strict_crc: cli.strict_crc,
        },
    )?;

    Ok(())
}
