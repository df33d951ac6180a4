use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use xtext_web_client::config::{load_options, user_options_path};
use xtext_web_client::{MockTransport, ServiceOptions, ServiceResult, create_editor};

/// Inspect how editor service options are resolved and wired
#[derive(Parser)]
#[command(name = "xtext-web-client")]
#[command(version)]
#[command(about = "Inspect how editor service options are resolved and wired")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an options file and print the resulting service wiring
    Resolve {
        /// Options file (.toml or .json); defaults to the user options file
        file: Option<PathBuf>,

        /// Print only the resolved options as JSON
        #[arg(long)]
        options_only: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { file, options_only } => {
            let path = file.or_else(user_options_path).unwrap_or_else(|| {
                eprintln!("Error: Could not determine the options file. Please pass one.");
                std::process::exit(1);
            });

            if let Err(e) = resolve(&path, options_only) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn resolve(path: &Path, options_only: bool) -> ServiceResult<()> {
    let options: ServiceOptions = load_options(path)?;
    let transport = MockTransport::new();
    let context = create_editor(options, Rc::new(transport.clone()))?;

    let resolved = context.options().borrow().clone();
    let rendered = serde_json::to_string_pretty(&resolved)
        .unwrap_or_else(|e| format!("<unserializable options: {}>", e));
    println!("{}", rendered);
    if options_only {
        return Ok(());
    }

    let services = context
        .dispatcher()
        .map(|dispatcher| dispatcher.services())
        .unwrap_or_default();
    println!();
    println!("Services:");
    for kind in services {
        println!("  {}", kind);
    }

    println!();
    println!("Requests sent during configuration:");
    while let Some(request) = transport.next_request() {
        println!("  {:?} {}", request.settings.method, request.url);
    }
    Ok(())
}
