//! mackerel-macro cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rewrite a template fragment locally
    ///
    /// Reads the fragment from stdin unless --input-file is given
    #[command(alias = "preview")]
    Transform(TransformCommand),

    /// Replay a macro request event and print the macro response
    Handle(HandleCommand),
}

#[derive(Parser, Debug)]
pub struct TransformCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    #[clap(flatten)]
    pub config: ConfigArgs,
}

#[derive(Parser, Debug)]
pub struct HandleCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub config: ConfigArgs,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Read from a file instead of stdin
    #[clap(short = 'f', long = "input-file")]
    pub file: Option<PathBuf>,

    /// Input format
    ///
    /// YAML may use the short form of intrinsic functions (!Ref, !GetAtt, ...).
    /// They are expanded to their long form (Ref, Fn::GetAtt, ...).
    #[arg(short = 'I', long = "input-format", default_value_t)]
    pub input_format: Format,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub output_format: Format,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// ARN of the custom resource provider, injected as ServiceToken
    #[clap(long = "service-token", env = "LAMBDA_ARN")]
    pub service_token: String,
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Json => f.write_str("json"),
            Format::Yaml => f.write_str("yaml"),
        }
    }
}
