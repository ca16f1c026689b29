use anyhow::Context;
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};
use uliquid::Template;

/// Renders a Liquid template file to stdout; recovered errors go to stderr.
#[derive(Debug, Parser)]
#[command(name = "uliquid", version)]
struct Cli {
    /// Path to the template file
    template: PathBuf,

    /// Variables bound at the template root, as key=value
    #[arg(value_parser = parse_binding)]
    bindings: Vec<(String, String)>,
}

fn parse_binding(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("'{}' is not of the form key=value", arg))
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = cli.template.display();
    let bindings: HashMap<String, String> = cli.bindings.into_iter().collect();

    let source = std::fs::read_to_string(&cli.template)
        .with_context(|| format!("reading template {}", path))?;
    let template = Template::parse(&source).with_context(|| format!("parsing {}", path))?;
    debug!(nodes = template.root().len(), "template parsed");

    let (output, errors) = template.render(&bindings)?;
    print!("{}", output);
    for error in errors {
        eprintln!("{}", error);
    }
    Ok(())
}
