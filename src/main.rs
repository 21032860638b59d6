use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use orgmacro::Expander;

#[derive(Parser)]
#[command(version, about = "Line-oriented text macro expander")]
struct Cli {
    /// Input file (standard input if omitted)
    file: Option<PathBuf>,

    /// Fail a line whose expansion does not settle after N rewrites
    /// (by default the rewrite loop is unbounded)
    #[arg(long, value_name = "N")]
    max_passes: Option<usize>,
}

fn main() {
    let cli = Cli::parse();

    let mut expander = Expander::new();
    if let Some(limit) = cli.max_passes {
        expander = expander.with_pass_limit(limit);
    }

    let output = BufWriter::new(io::stdout().lock());
    let result = match &cli.file {
        Some(path) => match File::open(path) {
            Ok(file) => expander.expand(BufReader::new(file), output),
            Err(e) => {
                eprintln!("orgmacro: cannot open {}: {e}", path.display());
                process::exit(1);
            }
        },
        None => expander.expand(io::stdin().lock(), output),
    };

    if let Err(e) = result {
        eprintln!("orgmacro: {e}");
        process::exit(1);
    }
}
