use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ethfs_protocol::UploadType;

#[derive(Parser, Debug)]
#[command(
    name = "ethfs-cli",
    version,
    about = "Upload files and directories to on-chain flat directories"
)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG is set.
    #[arg(short = 'v', long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy a flat directory contract from its init code.
    Create(CreateArgs),
    /// Remove a file from a flat directory.
    Remove(FileArgs),
    /// Set the file served for the directory root.
    Default(FileArgs),
    /// Download a file into the current directory.
    Download(DownloadArgs),
    /// Return the directory's unused storage deposit.
    Refund(RefundArgs),
    /// Upload a file or directory.
    Upload(UploadArgs),
}

#[derive(Args, Debug, Clone)]
pub struct NetworkArgs {
    #[arg(short = 'c', long = "chain-id")]
    pub chain_id: Option<u64>,

    /// Provider URL; defaults to the built-in endpoint of the chain.
    #[arg(short = 'r', long)]
    pub rpc: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct KeyArgs {
    #[arg(
        short = 'p',
        long = "private-key",
        env = "ETHFS_PRIVATE_KEY",
        hide_env_values = true
    )]
    pub private_key: String,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// File holding the hex-encoded contract init code.
    #[arg(long, value_name = "PATH")]
    pub code: PathBuf,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Args, Debug)]
pub struct FileArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Flat directory address, `0x...` or `shortName:0x...`.
    #[arg(short = 'a', long)]
    pub address: String,

    /// File name inside the directory.
    #[arg(short = 'f', long)]
    pub file: String,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    #[arg(short = 'a', long)]
    pub address: String,

    #[arg(short = 'f', long)]
    pub file: String,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Args, Debug)]
pub struct RefundArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    #[arg(short = 'a', long)]
    pub address: String,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    #[arg(short = 'a', long)]
    pub address: String,

    /// File or directory to upload.
    #[arg(short = 'f', long)]
    pub file: PathBuf,

    /// `calldata` (1) or `blob` (2); picked from the contract when omitted.
    #[arg(short = 't', long = "type")]
    pub upload_type: Option<UploadType>,

    /// Raise fee caps by this many percent.
    #[arg(short = 'g', long = "gas-inc-pct", default_value_t = 0)]
    pub gas_inc_pct: u32,

    /// Files uploaded concurrently.
    #[arg(short = 's', long = "thread-pool-size")]
    pub thread_pool_size: Option<usize>,

    /// Estimate the cost and ask for confirmation first.
    #[arg(short = 'e', long, default_value_t = false)]
    pub estimate: bool,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const ADDR: &str = "0x804C520d3c084C805E37A35E90057Ac32831F96f";

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_upload_flags() {
        let cli = Cli::parse_from([
            "ethfs-cli", "upload", "-p", KEY, "-a", ADDR, "-f", "./dist", "-t", "2", "-g", "10",
            "-s", "4", "-e", "-c", "11155111",
        ]);
        let Command::Upload(args) = cli.command else {
            panic!("expected upload");
        };
        assert_eq!(args.upload_type, Some(UploadType::Blob));
        assert_eq!(args.gas_inc_pct, 10);
        assert_eq!(args.thread_pool_size, Some(4));
        assert!(args.estimate);
        assert_eq!(args.network.chain_id, Some(11155111));
        assert_eq!(args.network.rpc, None);
    }

    #[test]
    fn rejects_unknown_upload_type() {
        let err = Cli::try_parse_from([
            "ethfs-cli", "upload", "-p", KEY, "-a", ADDR, "-f", ".", "-t", "ipfs",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn download_needs_no_key() {
        let cli = Cli::parse_from(["ethfs-cli", "download", "-a", ADDR, "-f", "index.html"]);
        assert!(matches!(cli.command, Command::Download(_)));
    }
}
