use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::Shell;
use log::{LevelFilter, debug, error, info, warn};

use plantmaid::{
    Config, Error, FlowDirection, KindSetting, Result, convert_markdown, detect_kind,
    generate_with, parse,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Mermaid diagram text
    #[default]
    Mermaid,
    /// The parsed diagram model as pretty-printed JSON
    Model,
}

/// Convert PlantUML diagrams to Mermaid
#[derive(Parser, Debug)]
#[command(name = "plantmaid")]
#[command(version)]
#[command(about = "Convert PlantUML component, class and sequence diagrams to Mermaid", long_about = None)]
struct Args {
    /// Input PlantUML or Markdown file (use "-" for stdin)
    #[arg(value_name = "INPUT", default_value = "-")]
    input: PathBuf,

    /// Output file path (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Diagram kind: auto, component, class or sequence
    #[arg(short, long, value_name = "KIND")]
    kind: Option<KindSetting>,

    /// Path to a config file (TOML or YAML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Flowchart direction: TD, BT, LR or RL
    #[arg(short, long, value_name = "DIRECTION")]
    direction: Option<FlowDirection>,

    /// Emit labels and message text without Mermaid escaping
    #[arg(long)]
    raw_labels: bool,

    /// Keep declared lifeline labels as `participant Alias as Label`
    #[arg(long)]
    participant_labels: bool,

    /// Treat the input as Markdown and convert its PlantUML code blocks
    #[arg(long)]
    markdown: bool,

    /// What to write
    #[arg(long, value_enum, default_value_t = Emit::Mermaid)]
    emit: Emit,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "plantmaid", &mut io::stdout());
        return;
    }

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!(args:?; "Parsed arguments");

    if let Err(err) = run(&args) {
        error!("{err}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    debug!(config:?; "Effective configuration");

    let source = read_input(&args.input)?;
    if source.trim().is_empty() {
        return Err(Error::EmptyInput);
    }

    let options = config.mermaid_options();
    let output = if args.markdown {
        if args.emit == Emit::Model {
            warn!("--emit model has no effect on Markdown input");
        }
        convert_markdown(&source, &options)
    } else {
        let kind = config.kind.fixed().unwrap_or_else(|| detect_kind(&source));
        info!(kind = kind.as_str(); "Converting diagram");
        let model = parse(kind, &source);
        match args.emit {
            Emit::Mermaid => generate_with(&model, &options),
            Emit::Model => serde_json::to_string_pretty(&model)?,
        }
    };

    write_output(args.output.as_deref(), &output)
}

/// Config file values, with command-line flags taking precedence.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(kind) = args.kind {
        config.kind = kind;
    }
    if let Some(direction) = args.direction {
        config.direction = direction;
    }
    if args.raw_labels {
        config.escape_labels = false;
    }
    if args.participant_labels {
        config.participant_labels = true;
    }

    Ok(config)
}

fn read_input(input: &Path) -> Result<String> {
    if input.to_str() == Some("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(Error::Stdin)?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).map_err(|source| Error::Read {
            path: input.to_path_buf(),
            source,
        })
    }
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, format!("{text}\n")).map_err(|source| Error::Write {
                path: path.to_path_buf(),
                source,
            })?;
            eprintln!("Mermaid saved to: {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
