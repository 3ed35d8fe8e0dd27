//! Component Tags CLI
//!
//! Usage:
//!   component-tags [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>   Component configuration (TOML format)
//!   -x, --context <FILE>  Template variables (TOML format)
//!   -d, --debug           Log component rendering to stderr
//!   -l, --list            List registered tags
//!   -h, --help            Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::Level;

use component_tags::{Config, Context, Engine, Error, Map, Value};

#[derive(Parser)]
#[command(name = "component-tags")]
#[command(about = "Render templates that use component tags")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Component configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Template variables (TOML format)
    #[arg(short = 'x', long)]
    context: Option<PathBuf>,

    /// Log component rendering to stderr
    #[arg(short, long)]
    debug: bool,

    /// List registered tags and exit
    #[arg(short, long)]
    list: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::WARN })
        .with_writer(io::stderr)
        .init();

    let engine = match &cli.config {
        Some(path) => match Config::from_file(path).and_then(Config::into_engine) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("Error loading configuration '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Engine::new(),
    };
    let engine = Arc::new(engine);

    if cli.list {
        for name in engine.library().names() {
            match engine.library().component_type(name) {
                Some(component) => println!("{} (component {})", name, component.name()),
                None => println!("{}", name),
            }
        }
        return;
    }

    // If no input file and stdin is a terminal (interactive), show usage
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let mut ctx = match &cli.context {
        Some(path) => match load_context(path) {
            Ok(ctx) => ctx,
            Err(e) => {
                eprintln!("Error loading context '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Context::new(),
    };

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    process::exit(1);
                }
            }
        }
    };

    let filename = cli
        .input
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    match engine.render_str(&source, &mut ctx) {
        Ok(output) => print!("{}", output),
        Err(Error::Parse(e)) => {
            eprint!("{}", e.format(&source, &filename));
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn load_context(path: &Path) -> Result<Context, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&content)?;
    let values: Map = table
        .into_iter()
        .map(|(key, value)| (key, Value::from(value)))
        .collect();
    Ok(Context::from_map(values))
}

fn print_intro() {
    println!(
        r#"Component Tags - render templates that use component tags

USAGE:
    component-tags [OPTIONS] [FILE]
    echo '<template>' | component-tags --config components.toml

OPTIONS:
    -c, --config     Component configuration (TOML file)
    -x, --context    Template variables (TOML file)
    -d, --debug      Log component rendering to stderr
    -l, --list       List registered tags
    -h, --help       Print help

QUICK START:
    echo '{{% button color="secondary" %}}Save{{% endbutton %}}' \
        | component-tags --config components.toml"#
    );
}
