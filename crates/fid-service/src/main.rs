//! Command-line entry point for the FID recovery tool.
//!
//! Wires configuration, session storage, the registry client, and the
//! signing pipeline into a set of commands that mirror the recovery flow:
//! look up the account, pick a target address, produce the EIP-712
//! authorization, and submit it to the registry.

use clap::{Parser, Subcommand, ValueEnum};
use fid_codec::RegistryOperation;
use fid_config::{Config, SessionBackend};
use fid_core::{FlowError, SignatureProducer, SubmitKind, Submission, SubmissionStatus};
use fid_registry::{AlloyRegistry, ConfirmationPolicy, RegistryService};
use fid_session::{FileStorage, MemoryStorage, SessionStore};
use fid_signer::{EphemeralWallet, LocalWallet};
use fid_types::parse_address;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod profile;

use profile::ProfileClient;

/// Command-line arguments for the recovery tool.
#[derive(Parser, Debug)]
#[command(author, version, about = "Transfer or recover a Farcaster ID with EIP-712 signatures", long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Look up a Farcaster profile and load it into the session
	Lookup {
		/// Look up by FID
		#[arg(long)]
		fid: Option<u64>,
		/// Look up by username
		#[arg(long)]
		username: Option<String>,
		/// Look up by custody address
		#[arg(long)]
		custody: Option<String>,
	},
	/// Generate a fresh wallet (mnemonic and address) without signing
	Wallet,
	/// Generate a fresh wallet and self-sign a transfer of the FID to it
	PrepareTransfer {
		/// FID to transfer; defaults to the session's FID
		#[arg(long)]
		fid: Option<u64>,
	},
	/// Produce a transfer or recovery signature with the active signer
	Sign {
		#[arg(value_enum)]
		kind: OperationKind,
		/// FID to operate on; defaults to the session's FID
		#[arg(long)]
		fid: Option<u64>,
		/// Target address; defaults to the session's target
		#[arg(long)]
		to: Option<String>,
		/// Hex private key of the signing account
		#[arg(long, env = "FID_PRIVATE_KEY", hide_env_values = true)]
		private_key: Option<String>,
		/// BIP-39 mnemonic of the signing account
		#[arg(long, env = "FID_MNEMONIC", hide_env_values = true)]
		mnemonic: Option<String>,
	},
	/// Submit the stored signature to the registry
	Submit {
		#[arg(value_enum)]
		kind: OperationKind,
		/// Custody address the FID is recovered from (recover only);
		/// defaults to the session profile's custody address
		#[arg(long)]
		from: Option<String>,
		/// Hex private key of the submitting account
		#[arg(long, env = "FID_PRIVATE_KEY", hide_env_values = true)]
		private_key: Option<String>,
		/// BIP-39 mnemonic of the submitting account
		#[arg(long, env = "FID_MNEMONIC", hide_env_values = true)]
		mnemonic: Option<String>,
	},
	/// Change the recovery address of the submitting wallet's FID
	SetRecovery {
		/// The new recovery address
		recovery: String,
		/// Hex private key of the custody account
		#[arg(long, env = "FID_PRIVATE_KEY", hide_env_values = true)]
		private_key: Option<String>,
		/// BIP-39 mnemonic of the custody account
		#[arg(long, env = "FID_MNEMONIC", hide_env_values = true)]
		mnemonic: Option<String>,
	},
	/// Show on-chain custody, recovery, and nonce state for an FID
	Status {
		/// FID to inspect; defaults to the session's FID
		#[arg(long)]
		fid: Option<u64>,
	},
	/// Inspect or edit the persisted session
	Session {
		#[command(subcommand)]
		action: SessionAction,
	},
}

#[derive(Subcommand, Debug)]
enum SessionAction {
	/// Print the persisted session record
	Show,
	/// Set the target address for the flow
	SetTarget { address: String },
	/// Clear the persisted session
	Clear,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OperationKind {
	Transfer,
	Recover,
}

impl From<OperationKind> for RegistryOperation {
	fn from(kind: OperationKind) -> Self {
		match kind {
			OperationKind::Transfer => RegistryOperation::Transfer,
			OperationKind::Recover => RegistryOperation::Recover,
		}
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	let config = Config::from_file(&args.config)?;
	tracing::debug!(
		chain_id = config.registry.chain_id,
		registry = %config.registry.address,
		"Loaded configuration"
	);

	let store = build_store(&config);
	store.hydrate().await;

	match args.command {
		Command::Lookup {
			fid,
			username,
			custody,
		} => lookup(&config, &store, fid, username, custody).await,
		Command::Wallet => wallet(),
		Command::PrepareTransfer { fid } => prepare_transfer(&config, &store, fid).await,
		Command::Sign {
			kind,
			fid,
			to,
			private_key,
			mnemonic,
		} => sign(&config, &store, kind, fid, to, private_key, mnemonic).await,
		Command::Submit {
			kind,
			from,
			private_key,
			mnemonic,
		} => submit(&config, &store, kind, from, private_key, mnemonic).await,
		Command::SetRecovery {
			recovery,
			private_key,
			mnemonic,
		} => set_recovery(&config, recovery, private_key, mnemonic).await,
		Command::Status { fid } => status(&config, &store, fid).await,
		Command::Session { action } => session_command(&store, action).await,
	}
}

/// Builds the session store over the configured backend.
fn build_store(config: &Config) -> SessionStore {
	match config.session.backend {
		SessionBackend::File => SessionStore::new(Box::new(FileStorage::new(PathBuf::from(
			&config.session.storage_path,
		)))),
		SessionBackend::Memory => SessionStore::new(Box::new(MemoryStorage::new())),
	}
}

/// Connects the registry client. Read-only commands pass a throwaway
/// signer; the wallet only matters for writes.
fn build_registry(
	config: &Config,
	signer: alloy_signer_local::PrivateKeySigner,
) -> Result<Arc<RegistryService>, Box<dyn std::error::Error>> {
	let contract = registry_address(config)?;
	let client = AlloyRegistry::connect(
		&config.registry.rpc_url,
		config.registry.chain_id,
		contract,
		signer,
	)?;
	Ok(Arc::new(RegistryService::new(
		Box::new(client),
		ConfirmationPolicy {
			confirmations: config.submission.confirmations,
			poll_interval: Duration::from_secs(config.submission.poll_interval_secs),
			timeout: Duration::from_secs(config.submission.timeout_secs),
		},
	)))
}

fn registry_address(config: &Config) -> Result<alloy_primitives::Address, Box<dyn std::error::Error>> {
	parse_address(&config.registry.address)
		.ok_or_else(|| format!("invalid registry address: {}", config.registry.address).into())
}

/// Resolves the signing wallet from the key flags.
fn load_wallet(
	private_key: Option<String>,
	mnemonic: Option<String>,
) -> Result<LocalWallet, Box<dyn std::error::Error>> {
	if let Some(key) = private_key {
		return Ok(LocalWallet::from_private_key(&key)?);
	}
	if let Some(phrase) = mnemonic {
		return Ok(LocalWallet::from_mnemonic(&phrase)?);
	}
	Err("no signing key: pass --private-key / --mnemonic or set FID_PRIVATE_KEY / FID_MNEMONIC".into())
}

async fn lookup(
	config: &Config,
	store: &SessionStore,
	fid: Option<u64>,
	username: Option<String>,
	custody: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
	let profiles = config
		.profiles
		.as_ref()
		.ok_or("profile lookups need a [profiles] section in the configuration")?;
	let client = ProfileClient::new(profiles);

	let user = match (fid, username, custody) {
		(Some(fid), None, None) => client.user_by_fid(fid).await?,
		(None, Some(username), None) => client.user_by_username(&username).await?,
		(None, None, Some(custody)) => client.user_by_custody(&custody).await?,
		_ => return Err("pass exactly one of --fid, --username, --custody".into()),
	};

	println!(
		"@{} ({}): fid {}, custody {}",
		user.username, user.display_name, user.fid, user.custody_address
	);
	println!(
		"followers {}, following {}, status {}{}",
		user.follower_count,
		user.following_count,
		user.active_status,
		if user.power_badge { ", power badge" } else { "" }
	);

	store.set_user(user).await?;
	Ok(())
}

fn wallet() -> Result<(), Box<dyn std::error::Error>> {
	let wallet = EphemeralWallet::generate()?;
	println!("Address:  {}", wallet.address().to_checksum(None));
	println!("Mnemonic: {}", wallet.mnemonic());
	println!();
	println!("The mnemonic is shown once and cannot be recovered if lost.");
	println!("Write it down before using the address for anything.");
	Ok(())
}

async fn prepare_transfer(
	config: &Config,
	store: &SessionStore,
	fid: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
	let session = store.snapshot().await;
	let fid = fid
		.or(session.fid)
		.ok_or("no FID: run lookup first or pass --fid")?;

	let registry = build_registry(config, alloy_signer_local::PrivateKeySigner::random())?;
	let producer = SignatureProducer::new(
		registry,
		config.registry.chain_id,
		registry_address(config)?,
	);

	let prepared = producer.prepare_ephemeral_transfer(fid).await?;
	let new_custody = prepared.new_custody_address.to_checksum(None);

	store.set_to_address(&new_custody).await?;
	store
		.record_signature(prepared.signature.clone(), prepared.deadline)
		.await?;

	println!("New custody address: {}", new_custody);
	println!("Mnemonic:            {}", prepared.mnemonic.as_str());
	println!("Deadline:            {}", prepared.deadline);
	println!("Signature:           {}", prepared.signature);
	println!();
	println!("The mnemonic is shown once and cannot be recovered if lost.");
	println!("Store it securely before submitting the transfer; it is the");
	println!("only key to the new custody address.");
	Ok(())
}

async fn sign(
	config: &Config,
	store: &SessionStore,
	kind: OperationKind,
	fid: Option<u64>,
	to: Option<String>,
	private_key: Option<String>,
	mnemonic: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
	let wallet = load_wallet(private_key, mnemonic)?;

	if let Some(to) = &to {
		store.set_to_address(to).await?;
	}
	if let Some(fid) = fid {
		store.set_fid(fid).await?;
	}

	let session = store.snapshot().await;
	let fid = session
		.fid
		.ok_or("no FID: run lookup first or pass --fid")?;
	let target = session
		.to_address
		.clone()
		.ok_or("no target address: pass --to or run `session set-target`")?;

	let registry = build_registry(config, alloy_signer_local::PrivateKeySigner::random())?;
	let producer = SignatureProducer::new(
		registry,
		config.registry.chain_id,
		registry_address(config)?,
	);

	// Reusing the session deadline keeps a second signature compatible with
	// the first; only an explicit `session clear` starts a fresh window.
	match producer
		.sign(kind.into(), fid, &target, &wallet, session.timestamp)
		.await
	{
		Ok(authorization) => {
			store
				.record_signature(authorization.signature.clone(), authorization.deadline)
				.await?;
			println!("Signer:    {}", wallet.address().to_checksum(None));
			println!("Deadline:  {}", authorization.deadline);
			println!("Signature: {}", authorization.signature);
			Ok(())
		}
		Err(FlowError::UserRejected) => {
			// Not an error; nothing was saved.
			println!("Signing request was declined; the session is unchanged.");
			Ok(())
		}
		Err(e) => Err(e.into()),
	}
}

async fn submit(
	config: &Config,
	store: &SessionStore,
	kind: OperationKind,
	from: Option<String>,
	private_key: Option<String>,
	mnemonic: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
	let wallet = load_wallet(private_key, mnemonic)?;
	let session = store.snapshot().await;

	let submit_kind = match kind {
		OperationKind::Transfer => SubmitKind::Transfer,
		OperationKind::Recover => {
			let from = from
				.or_else(|| session.user.as_ref().map(|u| u.custody_address.clone()))
				.ok_or("recovery needs --from or a custody address in the session")?;
			let from = parse_address(&from).ok_or(FlowError::InvalidAddress)?;
			SubmitKind::Recover { from }
		}
	};

	let registry = build_registry(config, wallet.provider_signer())?;
	let submission = Submission::new(registry);

	let mut status_rx = submission.subscribe();
	let printer = tokio::spawn(async move {
		while status_rx.changed().await.is_ok() {
			let status = status_rx.borrow_and_update().clone();
			match &status {
				SubmissionStatus::Submitting => tracing::info!("Submitting transaction"),
				SubmissionStatus::Broadcast(hash) => {
					tracing::info!(tx_hash = %hash, "Transaction broadcast")
				}
				SubmissionStatus::Confirming(hash) => {
					tracing::info!(tx_hash = %hash, "Submitted, awaiting confirmation")
				}
				SubmissionStatus::Confirmed(receipt) => {
					tracing::info!(block = receipt.block_number, "Transaction confirmed");
					break;
				}
				SubmissionStatus::Failed(message) => {
					tracing::error!(%message, "Transaction failed");
					break;
				}
				SubmissionStatus::Idle => {}
			}
		}
	});

	let result = submission.submit(&session, submit_kind).await;
	printer.abort();

	match result {
		Ok(receipt) => {
			println!(
				"Confirmed in block {} (tx {})",
				receipt.block_number, receipt.hash
			);
			Ok(())
		}
		Err(FlowError::StaleSignature) => Err(
			"the stored signature was produced for a different target address; run `sign` again"
				.into(),
		),
		Err(e) => Err(e.into()),
	}
}

async fn set_recovery(
	config: &Config,
	recovery: String,
	private_key: Option<String>,
	mnemonic: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
	let wallet = load_wallet(private_key, mnemonic)?;
	let recovery = parse_address(&recovery).ok_or(FlowError::InvalidAddress)?;

	let registry = build_registry(config, wallet.provider_signer())?;
	let hash = registry.submit_change_recovery(recovery).await?;
	tracing::info!(tx_hash = %hash, "Submitted, awaiting confirmation");

	let receipt = registry.wait_for_confirmation(&hash).await?;
	if receipt.success {
		println!(
			"Recovery address set to {} in block {}",
			recovery.to_checksum(None),
			receipt.block_number
		);
		Ok(())
	} else {
		Err("changeRecoveryAddress transaction reverted".into())
	}
}

async fn status(
	config: &Config,
	store: &SessionStore,
	fid: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
	let session = store.snapshot().await;
	let fid = fid
		.or(session.fid)
		.ok_or("no FID: run lookup first or pass --fid")?;

	let registry = build_registry(config, alloy_signer_local::PrivateKeySigner::random())?;
	let custody = registry.custody_of(fid).await?;
	let recovery = registry.recovery_of(fid).await?;
	let nonce = registry.nonce_of(custody).await?;

	println!("FID:              {}", fid);
	println!("Custody address:  {}", custody.to_checksum(None));
	println!("Recovery address: {}", recovery.to_checksum(None));
	println!("Custody nonce:    {}", nonce);
	Ok(())
}

async fn session_command(
	store: &SessionStore,
	action: SessionAction,
) -> Result<(), Box<dyn std::error::Error>> {
	match action {
		SessionAction::Show => {
			let session = store.snapshot().await;
			println!("{}", serde_json::to_string_pretty(&session)?);
		}
		SessionAction::SetTarget { address } => {
			if !fid_types::is_valid_address(&address) {
				tracing::warn!(
					"{} is not a well-formed address; signing will refuse it",
					address
				);
			}
			store.set_to_address(&address).await?;
			println!("Target address set to {}", address);
		}
		SessionAction::Clear => {
			store.clear().await?;
			println!("Session cleared");
		}
	}
	Ok(())
}
