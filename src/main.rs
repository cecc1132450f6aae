use clap::{Parser, Subcommand};
use std::path::PathBuf;

use flbtool::flb3;
use flbtool::report::ConsoleReport;

#[derive(Parser, Debug)]
#[command(about = "Split and rebuild FLB3 network adapter firmware containers")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract all the components of an FLB3 file
    Extract {
        /// FLB3 file to extract
        #[arg(long)]
        input: PathBuf,
        /// Directory where the per-chunk artifacts will be written
        #[arg(long)]
        output_directory: PathBuf,
    },
    /// Merge the contents of a directory into a single FLB3 file
    Rebuild {
        /// Directory to read per-chunk artifacts out of
        #[arg(long)]
        input_directory: PathBuf,
        /// File to write the rebuilt container to
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("flbtool FLB3 firmware container tool");
    let args = Args::parse();
    let mut report = ConsoleReport;

    match args.command {
        Command::Extract {
            input,
            output_directory,
        } => {
            println!("Input file: {}", input.display());
            println!("Output folder: {}\n", output_directory.display());
            flb3::extract_flb3(&input, &output_directory, &mut report)?;
        }
        Command::Rebuild {
            input_directory,
            output,
        } => {
            println!("Input folder: {}", input_directory.display());
            println!("Output file: {}\n", output.display());
            flb3::rebuild_flb3(&input_directory, &output, &mut report)?;
        }
    }

    Ok(())
}
