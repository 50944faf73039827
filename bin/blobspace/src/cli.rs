//! CLI for checking blob wasted space.

use crate::{analysis, render, ABOUT};
use alloy_primitives::B256;
use blobspace_calc::{CalcOptions, PrefixMode, Validation};
use blobspace_source::{
    explorer::{DEFAULT_BLOB_API_URL, DEFAULT_ETHERSCAN_API_URL},
    BlobRequest, BlobSelection, ExplorerClient, ExplorerConfig,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use eyre::WrapErr;
use std::{io::Read, path::PathBuf, time::Duration};
use tracing::instrument;

const ENV_ETHERSCAN_API_KEY: &str = "ETHERSCAN_API_KEY";

/// Output format of the reports.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// A table per blob
    #[default]
    Text,
    /// JSON array
    Json,
}

/// Measure the zero filled share of eip4844 blobs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Strip the 0x prefix before counting instead of subtracting 2 from the raw counts.
    #[arg(long, global = true)]
    corrected: bool,

    /// Reject input without 0x prefix, with non hex characters or an odd number of digits.
    #[arg(long, global = true)]
    strict: bool,

    /// Etherscan compatible API endpoint used to look up transactions. The API key is read from
    /// the `ETHERSCAN_API_KEY` environment variable.
    #[arg(long, global = true, default_value = DEFAULT_ETHERSCAN_API_URL)]
    etherscan_api_url: String,

    /// Blob data endpoint. Blobs are fetched from `<url>/<versioned hash>`.
    #[arg(long, global = true, default_value = DEFAULT_BLOB_API_URL)]
    blob_api_url: String,

    /// Timeout of a single explorer request, in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    http_timeout_secs: u64,

    #[clap(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze blob data given directly
    Data(DataArgs),
    /// Fetch and analyze a blob by its versioned hash
    BlobHash(BlobHashArgs),
    /// Fetch and analyze the blobs of a transaction
    TxHash(TxHashArgs),
    /// Explain how wasted space is measured
    About,
}

#[derive(Args, Debug)]
struct DataArgs {
    /// Hex encoded blob data. Read from --file, or stdin, when omitted.
    data: Option<String>,

    /// File holding the blob data.
    #[arg(long, short, conflicts_with = "data")]
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BlobHashArgs {
    /// Blob versioned hash
    hash: B256,
}

#[derive(Args, Debug)]
struct TxHashArgs {
    /// Transaction hash
    hash: B256,

    /// Position of the blob to analyze in the transaction. All blobs when omitted.
    #[arg(long, short)]
    index: Option<usize>,
}

impl Cli {
    /// Run the CLI
    pub async fn run() -> eyre::Result<()> {
        let cli = Self::parse();
        let output = cli.execute(std::io::stdin().lock()).await?;
        println!("{output}");
        Ok(())
    }

    /// Run the parsed command and return what should be printed. `stdin` is only read by `data`
    /// without an argument or file.
    #[instrument(skip_all)]
    pub async fn execute(&self, stdin: impl Read) -> eyre::Result<String> {
        let Some(request) = self.request(stdin)? else {
            return Ok(ABOUT.to_string());
        };

        let explorer = ExplorerClient::new(self.explorer_config())?;
        let analyses = analysis::analyze(&explorer, request, self.calc_options()).await?;

        match self.output {
            OutputFormat::Text => Ok(render::text(&analyses)),
            OutputFormat::Json => render::json(&analyses.reports).map_err(Into::into),
        }
    }

    /// The request to resolve. `None` for commands that don't analyze anything.
    pub fn request(&self, stdin: impl Read) -> eyre::Result<Option<BlobRequest>> {
        let request = match &self.commands {
            Commands::Data(args) => BlobRequest::Data(args.read_data(stdin)?),
            Commands::BlobHash(args) => BlobRequest::BlobHash(args.hash),
            Commands::TxHash(args) => BlobRequest::Transaction {
                tx_hash: args.hash,
                selection: args.index.map_or(BlobSelection::All, BlobSelection::Index),
            },
            Commands::About => return Ok(None),
        };

        Ok(Some(request))
    }

    /// Calculator options selected by the flags.
    pub const fn calc_options(&self) -> CalcOptions {
        CalcOptions {
            prefix_mode: if self.corrected { PrefixMode::Corrected } else { PrefixMode::Compat },
            validation: if self.strict { Validation::Strict } else { Validation::Permissive },
        }
    }

    /// Explorer endpoints selected by the flags and environment.
    pub fn explorer_config(&self) -> ExplorerConfig {
        ExplorerConfig {
            etherscan_api_url: self.etherscan_api_url.clone(),
            etherscan_api_key: std::env::var(ENV_ETHERSCAN_API_KEY).ok().filter(|k| !k.is_empty()),
            blob_api_url: self.blob_api_url.clone(),
            timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }

    /// Selected output format.
    pub const fn output(&self) -> OutputFormat {
        self.output
    }
}

impl DataArgs {
    fn read_data(&self, mut stdin: impl Read) -> eyre::Result<String> {
        let data = match (&self.data, &self.file) {
            (Some(data), _) => data.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .wrap_err_with(|| format!("reading blob data from {}", path.display()))?,
            (None, None) => {
                let mut data = String::new();
                stdin.read_to_string(&mut data).wrap_err("reading blob data from stdin")?;
                data
            }
        };

        Ok(data.trim().to_string())
    }
}
