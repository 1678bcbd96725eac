//! Binary entry point for the hopper graph-preparation tools.
#![forbid(unsafe_code)]

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hopper::{
    csr::{self, InspectReport},
    invec,
    logging::init_logging,
    partition::{self, SplitReport},
    prepare::{self, PrepareOptions, PrepareReport},
};

#[derive(Parser, Debug)]
#[command(
    name = "hopper",
    version,
    about = "Graph input preparation for the compressed-graph encoder",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[arg(
        long,
        global = true,
        default_value = "warn",
        help = "Log filter used when RUST_LOG is unset"
    )]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Encode a graph-text file into a CSR binary")]
    Encode {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },

    #[command(about = "Decode and print a CSR binary file")]
    Inspect {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(long, help = "Also list every node's adjacency")]
        adjacency: bool,
    },

    #[command(about = "Split a graph-text file into row-aligned partitions")]
    Split {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(value_name = "BLOCKS")]
        blocks: u32,
    },

    #[command(about = "Write a fixed-pattern test vector for the encoder")]
    Invec {
        #[arg(value_name = "NNODES")]
        nnodes: u64,

        #[arg(
            long,
            value_name = "PATH",
            help = "Output path (defaults to invec{NNODES})"
        )]
        out: Option<PathBuf>,
    },

    #[command(about = "Split, then encode every partition to CSR")]
    Prepare {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(value_name = "BLOCKS")]
        blocks: u32,

        #[arg(
            long,
            value_name = "BIN",
            help = "External encoder to run on each partition's CSR file"
        )]
        encoder: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| cli.log_level.clone());
    init_logging(&filter)?;

    match cli.command {
        Command::Encode { input, output } => {
            csr::encode_file(&input, &output)?;
            println!("Encoded {} into {}", input.display(), output.display());
        }
        Command::Inspect { input, adjacency } => {
            let report = csr::inspect(&input, adjacency)?;
            emit(&cli.format, &report, |fmt| print_inspect_text(fmt, &report))?;
        }
        Command::Split { input, blocks } => {
            let report = partition::split(&input, blocks)?;
            emit(&cli.format, &report, |fmt| print_split_text(fmt, &report))?;
        }
        Command::Invec { nnodes, out } => {
            let path = out.unwrap_or_else(|| invec::default_path(nnodes));
            invec::write(nnodes, &path)?;
            println!("Wrote {nnodes} values to {}", path.display());
        }
        Command::Prepare {
            input,
            blocks,
            encoder,
        } => {
            let opts = PrepareOptions { encoder };
            let report = prepare::run(&input, blocks, &opts)?;
            emit(&cli.format, &report, |fmt| print_prepare_text(fmt, &report))?;
        }
    }

    Ok(())
}

fn emit<T, F>(format: &OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: serde::Serialize,
    F: Fn(OutputFormat),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(OutputFormat::Text),
    }
    Ok(())
}

fn print_inspect_text(_: OutputFormat, report: &InspectReport) {
    println!("File: {}", report.path);
    println!(
        "Header: edge_width_tag={} node_width_tag={} nnodes={}",
        report.edge_width_tag, report.node_width_tag, report.nnodes
    );
    println!("Edges: {}", report.edge_count);
    println!("Offsets: {:?}", report.offsets);
    if report.expected_len == report.actual_len {
        println!("Size: {} bytes", report.actual_len);
    } else {
        println!(
            "Size: {} bytes on disk, {} expected from contents",
            report.actual_len, report.expected_len
        );
    }
    if let Some(adjacency) = &report.adjacency {
        for (node, targets) in adjacency.iter().enumerate() {
            println!("{node}: {targets:?}");
        }
    }
}

fn print_split_text(_: OutputFormat, report: &SplitReport) {
    println!(
        "Split {} rows into {} blocks of {} rows",
        report.rows, report.blocks, report.row_block_size
    );
    for path in &report.outputs {
        println!("  {path}");
    }
}

fn print_prepare_text(_: OutputFormat, report: &PrepareReport) {
    println!(
        "Prepared {} partitions of {} rows in {:.2} ms",
        report.blocks, report.rows, report.duration_ms
    );
    for part in &report.partitions {
        match &part.encoded {
            Some(encoded) => println!(
                "  tid={}: {} => {} => {}",
                part.tid, part.graph_text, part.csr, encoded
            ),
            None => println!("  tid={}: {} => {}", part.tid, part.graph_text, part.csr),
        }
    }
}
