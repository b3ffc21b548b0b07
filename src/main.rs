use clap::Parser as ClapParser;
use jsonpath_lang::cli::{self, CliError, QueryOptions};
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "jsonpath")]
#[command(about = "Search JSON documents with a JSONPath expression, printing one match per line")]
#[command(version)]
struct Cli {
    /// The path expression to evaluate
    expression: String,

    /// JSON files to search (reads stdin if none are given)
    files: Vec<PathBuf>,

    /// Only accept the core grammar (no filters, sorting, arithmetic, or named operators)
    #[arg(long)]
    core: bool,

    /// Label matches by this member instead of by key or index
    #[arg(long, value_name = "FIELD")]
    auto_id: Option<String>,

    /// Print each match's full path before its value
    #[arg(short, long)]
    paths: bool,

    /// Pretty-print mappings and sequences
    #[arg(long)]
    pretty: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let options = QueryOptions {
        expression: cli.expression,
        core: cli.core,
        auto_id: cli.auto_id,
        show_paths: cli.paths,
        pretty: cli.pretty,
    };

    let lines = if cli.files.is_empty() {
        if atty::is(atty::Stream::Stdin) {
            return Err(CliError::NoInput);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        cli::execute_query(&options, &buffer)?
    } else {
        cli::execute_files(&options, &cli.files)?
    };

    for line in lines {
        println!("{}", line);
    }
    Ok(())
}
