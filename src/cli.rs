//! CLI surface: a single `generate` action built around `clap::Parser`.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "tlc")]
#[command(about = "Compiles a TL schema into generated Rust source", long_about = None)]
pub struct Cli {
    /// One or more `.tl` schema files, in the order they should be read.
    pub inputs: Vec<PathBuf>,

    /// Output path stem; artifacts are written as `<stem>.rs`,
    /// `<stem>-conversion-from.rs`, `<stem>-conversion-to.rs`,
    /// `<stem>-dump-to-text.rs` and `<stem>.timestamp`.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// JSON scheme-configuration file. When omitted, a built-in default
    /// scheme is used.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Raise log verbosity.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Promote CRC mismatches that aren't listed in `typeIdExceptions`
    /// from a warn-and-drop to a fatal error.
    #[arg(long = "strict-crc")]
    pub strict_crc: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_minimal_invocation() {
        let cli = Cli::parse_from(["tlc", "scheme.tl", "-o", "out/generated"]);
        assert_eq!(cli.inputs, vec![PathBuf::from("scheme.tl")]);
        assert_eq!(cli.output, PathBuf::from("out/generated"));
        assert!(!cli.strict_crc);
    }

    #[test]
    fn accepts_multiple_inputs_and_strict_crc() {
        let cli = Cli::parse_from(["tlc", "a.tl", "b.tl", "-o", "out", "--strict-crc"]);
        assert_eq!(cli.inputs.len(), 2);
        assert!(cli.strict_crc);
    }
}
