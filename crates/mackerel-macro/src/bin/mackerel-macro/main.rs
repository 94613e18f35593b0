mod cli;
mod yaml;

use anyhow::Context;
use mackerel_macro::config::MacroConfig;
use mackerel_macro::handler::{handle, MacroRequest};
use serde_json::Value;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("MACKEREL_MACRO_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let command_result = match cli.command {
        cli::Command::Transform(transform_cli) => transform(transform_cli),
        cli::Command::Handle(handle_cli) => replay(handle_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn transform(cli: cli::TransformCommand) -> anyhow::Result<()> {
    let config = MacroConfig::new(cli.config.service_token)?;
    let fragment = load(&cli.input)?;

    let fragment = mackerel_macro::transform::transform(fragment, &config)
        .context("Fragment was rejected")?;

    output(&cli.output, &fragment)?;
    Ok(())
}

/// Runs a macro request through the same handler the Lambda function uses
pub fn replay(cli: cli::HandleCommand) -> anyhow::Result<()> {
    let config = MacroConfig::new(cli.config.service_token)?;
    let event = load(&cli.input)?;

    let request: MacroRequest =
        serde_json::from_value(event).context("Input is not a macro request")?;
    let response = handle(request, &config);

    serde_json::to_writer_pretty(std::io::stdout(), &response)?;
    println!();
    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<Value> {
    let contents = match &input.file {
        Some(file_path) => std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read {}", file_path.display()))?,
        None => std::io::read_to_string(std::io::stdin())?,
    };

    let value: Value = match input.input_format {
        cli::Format::Json => serde_json::from_str(&contents).context("Unable to parse json")?,
        cli::Format::Yaml => yaml::from_str(&contents).context("Unable to parse yaml")?,
    };

    Ok(value)
}

fn output(output: &cli::OutputArgs, value: &Value) -> anyhow::Result<()> {
    match output.output_format {
        cli::Format::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::Format::Json => {
            serde_json::to_writer_pretty(std::io::stdout(), value)?;
            println!();
        }
    };

    Ok(())
}
