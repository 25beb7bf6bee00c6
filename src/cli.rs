use clap::Parser;

use crate::config::InspectOptions;
use crate::zip::DEFAULT_MAX_ENTRY_SIZE;

#[derive(Parser, Debug)]
#[command(name = "nupeek")]
#[command(version)]
#[command(about = "Inspect the contents of a NuGet package", long_about = None)]
#[command(after_help = "Examples:\n  \
  nupeek Foo.1.2.3.nupkg                 show metadata and special files\n  \
  nupeek --tree Foo.1.2.3.nupkg          also print the file tree\n  \
  nupeek --json Foo.1.2.3.nupkg | jq .   dump everything as JSON\n  \
  nupeek Foo.1.2.3.nupkg README.md       print one entry to stdout")]
pub struct Cli {
    /// Path to the .nupkg file
    #[arg(value_name = "PACKAGE")]
    pub package: String,

    /// Archive path of a single entry to extract
    #[arg(value_name = "ENTRY")]
    pub entry: Option<String>,

    /// Print the package as JSON
    #[arg(long, conflicts_with = "entry")]
    pub json: bool,

    /// Print the file tree
    #[arg(short = 't', long, conflicts_with = "entry")]
    pub tree: bool,

    /// Write the extracted entry to FILE instead of stdout
    #[arg(short = 'o', long, value_name = "FILE", requires = "entry")]
    pub output: Option<String>,

    /// Largest entry, in bytes, that will be read into memory
    #[arg(long, value_name = "BYTES", env = "NUPEEK_MAX_ENTRY_SIZE", default_value_t = DEFAULT_MAX_ENTRY_SIZE)]
    pub max_entry_size: u64,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn options(&self) -> InspectOptions {
        InspectOptions::default().with_max_entry_size(self.max_entry_size)
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
