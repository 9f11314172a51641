//! Subcommand handlers.

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use ethers::prelude::{Address, Http, Middleware, Provider, U256};
use ethers::utils::{format_ether, to_checksum};
use ethfs_protocol::{DirectoryCall, TxOptions, is_private_key, parse_directory_address};
use ethfs_transfer::validate_file_name;
use ethfs_uploader::{
    BlobClient, DirectoryClient, EstimateReport, UploadError, UploadSummary, Uploader,
    enumerate_files, excerpt,
};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::cli::{
    Command, CreateArgs, DownloadArgs, FileArgs, KeyArgs, NetworkArgs, RefundArgs, UploadArgs,
};
use crate::blob::AlloyBlobClient;
use crate::client::{self, EthSigner, EthersClient};
use crate::config::{CliConfig, resolve_chain_id};

pub async fn run(command: Command, config: &CliConfig) -> anyhow::Result<()> {
    match command {
        Command::Create(args) => create(args, config).await,
        Command::Remove(args) => remove(args, config).await,
        Command::Default(args) => set_default(args, config).await,
        Command::Download(args) => download(args, config).await,
        Command::Refund(args) => refund(args, config).await,
        Command::Upload(args) => upload(args, config).await,
    }
}

async fn create(args: CreateArgs, config: &CliConfig) -> anyhow::Result<()> {
    check_key(&args.key)?;
    let code = std::fs::read_to_string(&args.code)
        .with_context(|| format!("failed to read init code from {}", args.code.display()))?;
    let init_code = decode_hex(&code).context("init code is not valid hex")?;

    let (provider, chain_id, _) = open_network(&args.network, None, config).await?;
    let signer = client::signer(provider, &args.key.private_key, chain_id)?;
    let address = client::deploy(&signer, init_code).await?;

    println!("FlatDirectory Address: {}", to_checksum(&address, None));
    Ok(())
}

async fn remove(args: FileArgs, config: &CliConfig) -> anyhow::Result<()> {
    let directory = open_directory(&args.key, &args.address, &args.network, config).await?;
    println!("Removing file {}", args.file);
    let call = DirectoryCall::Remove {
        name: args.file.as_bytes().to_vec(),
    };
    send_and_confirm(&directory, call).await?;
    println!("Remove success!");
    Ok(())
}

async fn set_default(args: FileArgs, config: &CliConfig) -> anyhow::Result<()> {
    let directory = open_directory(&args.key, &args.address, &args.network, config).await?;
    let call = DirectoryCall::SetDefault {
        name: args.file.as_bytes().to_vec(),
    };
    send_and_confirm(&directory, call).await?;
    println!("Set default success!");
    Ok(())
}

async fn refund(args: RefundArgs, config: &CliConfig) -> anyhow::Result<()> {
    let directory = open_directory(&args.key, &args.address, &args.network, config).await?;
    send_and_confirm(&directory, DirectoryCall::Refund).await?;
    println!("Refund success!");
    Ok(())
}

async fn download(args: DownloadArgs, config: &CliConfig) -> anyhow::Result<()> {
    validate_file_name(&args.file)?;
    let target = parse_directory_address(&args.address)?;
    let contract = parse_address(&target.address)?;
    let (provider, chain_id, _) = open_network(&args.network, target.chain_id, config).await?;
    let directory = EthersClient::new(Arc::new(provider), contract, chain_id);

    let name = args.file.as_bytes();
    let chunk_count = directory.read_count_chunks(name).await?;
    if chunk_count == 0 {
        anyhow::bail!("file {} does not exist in the directory", args.file);
    }

    let save_path = std::env::current_dir()?.join(&args.file);
    if let Err(e) = write_chunks(&directory, name, chunk_count, &save_path).await {
        let _ = tokio::fs::remove_file(&save_path).await;
        return Err(e.context(format!("download of {} failed", args.file)));
    }

    println!("Success: file path is {}", save_path.display());
    Ok(())
}

async fn write_chunks(
    directory: &EthersClient<Provider<Http>>,
    name: &[u8],
    chunk_count: u64,
    save_path: &Path,
) -> anyhow::Result<()> {
    if let Some(parent) = save_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut out = tokio::fs::File::create(save_path).await?;
    for chunk_id in 0..chunk_count {
        let (data, found) = directory.read_chunk(name, chunk_id).await?;
        if !found {
            anyhow::bail!("chunk {chunk_id} is missing");
        }
        out.write_all(&data).await?;
        debug!(chunk = chunk_id, bytes = data.len(), "chunk downloaded");
    }
    out.flush().await?;
    Ok(())
}

async fn upload(args: UploadArgs, config: &CliConfig) -> anyhow::Result<()> {
    check_key(&args.key)?;
    let target = parse_directory_address(&args.address)?;
    // Unreadable paths abort before any network activity.
    let files = enumerate_files(&args.file)
        .with_context(|| format!("the file or folder {} cannot be read", args.file.display()))?;
    if files.is_empty() {
        anyhow::bail!("no files found under {}", args.file.display());
    }

    let (provider, chain_id, rpc_url) =
        open_network(&args.network, target.chain_id, config).await?;
    let signer = client::signer(provider, &args.key.private_key, chain_id)?;
    let contract = parse_address(&target.address)?;
    let directory: Arc<dyn DirectoryClient> =
        Arc::new(EthersClient::new(Arc::new(signer), contract, chain_id));
    let blobs: Arc<dyn BlobClient> = Arc::new(AlloyBlobClient::connect(
        &rpc_url,
        &args.key.private_key,
        contract.0,
        chain_id,
    )?);

    let uploader = Uploader::create(
        directory,
        Some(blobs),
        args.upload_type,
        config.retry_policy(),
    )
    .await
    .context("failed to initialize the uploader, check the parameters and network")?;
    let concurrency = config.thread_pool_size(args.thread_pool_size, chain_id);
    info!(
        files = files.len(),
        concurrency,
        upload_type = %uploader.upload_type(),
        "upload prepared"
    );

    if args.estimate {
        let report = uploader
            .estimate_cost(files.clone(), args.gas_inc_pct, concurrency)
            .await?;
        if !proceed_after_estimate(&report, || confirm("Continue?")).await? {
            return Ok(());
        }
        println!();
    }

    let results = uploader.upload(files, args.gas_inc_pct, concurrency).await;
    let summary = UploadSummary::from_results(&results);
    print_summary(&summary);

    if !summary.is_success() {
        anyhow::bail!(
            "{} file(s) failed to upload",
            summary.partially_failed.len() + summary.failed.len()
        );
    }
    Ok(())
}

fn check_key(key: &KeyArgs) -> anyhow::Result<()> {
    if !is_private_key(&key.private_key) {
        anyhow::bail!("invalid private key");
    }
    Ok(())
}

/// Connects to the provider and settles the chain id. Also returns the
/// provider URL.
async fn open_network(
    network: &NetworkArgs,
    prefix_chain_id: Option<u64>,
    config: &CliConfig,
) -> anyhow::Result<(Provider<Http>, u64, String)> {
    let expected = network
        .chain_id
        .or(prefix_chain_id)
        .unwrap_or_else(|| config.default_chain_id());
    let rpc_url = config.rpc_url(network.rpc.as_deref(), expected)?;
    let provider = client::provider(&rpc_url)?;

    let rpc_chain_id = provider
        .get_chainid()
        .await
        .with_context(|| format!("failed to query chain id from {rpc_url}"))?;
    let chain_id = resolve_chain_id(
        network.chain_id,
        prefix_chain_id,
        client::u256_to_u64(rpc_chain_id)?,
    )?;

    info!(chain_id, provider = %rpc_url, "connected");
    Ok((provider, chain_id, rpc_url))
}

async fn open_directory(
    key: &KeyArgs,
    address: &str,
    network: &NetworkArgs,
    config: &CliConfig,
) -> anyhow::Result<EthersClient<EthSigner>> {
    check_key(key)?;
    let target = parse_directory_address(address)?;
    let contract = parse_address(&target.address)?;
    let (provider, chain_id, _) = open_network(network, target.chain_id, config).await?;
    let signer = client::signer(provider, &key.private_key, chain_id)?;
    Ok(EthersClient::new(Arc::new(signer), contract, chain_id))
}

async fn send_and_confirm(
    directory: &EthersClient<EthSigner>,
    call: DirectoryCall,
) -> anyhow::Result<()> {
    let tx_hash = directory.send(call, TxOptions::default()).await?;
    println!("FlatDirectory: Tx hash is {tx_hash}");
    let receipt = directory.wait_receipt(tx_hash).await?;
    if !receipt.success {
        return Err(UploadError::Reverted { tx_hash }.into());
    }
    Ok(())
}

fn parse_address(address: &str) -> anyhow::Result<Address> {
    address
        .parse::<Address>()
        .map_err(|e| anyhow::anyhow!("invalid address {address}: {e}"))
}

fn decode_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    Ok(hex::decode(digits)?)
}

fn eth(wei: u128) -> String {
    format_ether(U256::from(wei))
}

fn print_estimate(report: &EstimateReport) {
    let totals = &report.totals;
    println!();
    println!("Info: The number of files is {}", totals.total_file_count);
    println!("Info: Expected to send {} transactions", totals.total_tx_count);
    println!(
        "Info: Storage cost is expected to be {} ETH",
        eth(totals.total_storage_cost)
    );
    println!(
        "Info: Gas cost is expected to be {} ETH",
        eth(totals.total_gas_cost)
    );
    println!("Info: The total cost is {} ETH", eth(totals.total_cost()));

    for failure in &report.failures {
        println!();
        println!("{}", excerpt(&failure.to_string()));
        match failure.file() {
            Some(file) => println!("Estimate gas failed, the failure file is {file}"),
            None => println!("Estimate gas failed"),
        }
    }
}

/// Shows the estimate and asks whether to upload. Files that could not be
/// estimated are listed but do not stop the upload.
async fn proceed_after_estimate<F, Fut>(report: &EstimateReport, ask: F) -> anyhow::Result<bool>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    print_estimate(report);
    if !report.is_complete() {
        warn!(failed = report.failures.len(), "some files could not be estimated");
    }
    ask().await
}

fn print_summary(summary: &UploadSummary) {
    println!();
    for (file, chunk_id) in &summary.partially_failed {
        println!("ERROR: {file} uploaded failed. The chunkId is {chunk_id}");
    }
    for file in &summary.failed {
        println!("ERROR: {file} uploaded failed.");
    }
    println!("Total File Count: {}", summary.total_file_count);
    println!("Total Upload Chunk Count: {}", summary.total_upload_count);
    println!(
        "Total Upload Data Size: {} KB",
        format_kb(summary.total_upload_size)
    );
    println!(
        "Total Storage Cost: {} ETH",
        eth(summary.total_storage_cost)
    );
}

fn format_kb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0)
}

/// Asks a yes/no question on stdin; an empty answer means yes.
async fn confirm(question: &str) -> anyhow::Result<bool> {
    let question = question.to_string();
    let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
        print!("{question} (y/n) ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    })
    .await??;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "")
}
