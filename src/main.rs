use clap::{Arg, ArgAction, ArgMatches, Command};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{env, fs};

use claudesync::config::METADATA_DIR;
use claudesync::conflict::Conflict;
use claudesync::logging::init_tracing;
use claudesync::remote::RemoteStore;
use claudesync::{
	AutoCrlf, Config, FileAction, FolderRemoteStore, ProjectRef, StateStore, SyncBuilder,
	SyncCallbacks, SyncError,
};

///////////////////////
// Utility functions //
///////////////////////

/// Default document store: ~/.claudesync/store
fn default_store_dir() -> Result<PathBuf, Box<dyn Error>> {
	match env::var("HOME") {
		Ok(home) => Ok(PathBuf::from(home).join(METADATA_DIR).join("store")),
		Err(_e) => Err("Could not determine HOME directory! Use --store.".into()),
	}
}

fn store_dir(matches: &ArgMatches) -> Result<PathBuf, Box<dyn Error>> {
	match matches.get_one::<String>("store") {
		Some(dir) => Ok(PathBuf::from(dir)),
		None => default_store_dir(),
	}
}

/// Config for a project root: file, then environment, then command line
fn load_config(root: &Path, sub: &ArgMatches) -> Result<Config, Box<dyn Error>> {
	let mut config = match sub.get_one::<String>("config") {
		Some(file) => Config::load_file(Path::new(file))?,
		None => Config::load_for_root(root)?,
	};
	config.local_path = Some(root.to_path_buf());
	config.apply_env()?;

	if let Some(org) = sub.get_one::<String>("org") {
		config.organization_id = Some(org.clone());
	}
	if let Some(project) = sub.get_one::<String>("project") {
		config.project_id = Some(project.clone());
	}
	if sub.get_flag("two-way") {
		config.two_way_sync = true;
	}
	if sub.get_flag("prune") {
		config.prune_remote_files = true;
	}
	if sub.get_flag("no-prune") {
		config.prune_remote_files = false;
	}
	if let Some(delay) = sub.get_one::<String>("delay") {
		config.upload_delay =
			delay.parse().map_err(|_| SyncError::config(format!("Invalid delay: {}", delay)))?;
	}
	if let Some(autocrlf) = sub.get_one::<String>("autocrlf") {
		config.autocrlf = autocrlf.parse::<AutoCrlf>()?;
	}
	Ok(config)
}

/// Prints each file action on stderr
struct CliProgress;

impl SyncCallbacks for CliProgress {
	fn on_file_done(&self, path: &str, action: FileAction) {
		eprintln!("{:>14}  {}", action, path);
	}

	fn on_error(&self, path: &str, error: &SyncError) {
		eprintln!("{:>14}  {}: {}", "failed", path, error);
	}

	fn on_conflict(&self, conflict: &Conflict) {
		eprintln!(
			"{:>14}  {} (local {}, remote {}, keeping {:?})",
			"conflict",
			conflict.path,
			conflict.local,
			conflict.remote,
			conflict.winner()
		);
	}
}

fn project_args(command: Command) -> Command {
	command
		.arg(Arg::new("org").long("org").value_name("ORG_ID").help("Organization id"))
		.arg(Arg::new("project").long("project").value_name("PROJECT_ID").help("Project id"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	let matches = Command::new("claudesync")
		.version("0.1.0")
		.author("Szilard Hajba <szilard@symbion.hu>")
		.about("Keep a local directory and a remote project in sync")
		.subcommand_required(true)
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("FILE")
				.global(true)
				.help("Config file (TOML or JSON)"),
		)
		.arg(
			Arg::new("store")
				.short('s')
				.long("store")
				.value_name("DIR")
				.global(true)
				.help("Document store directory"),
		)
		.subcommand(
			project_args(Command::new("sync").about("Sync a directory"))
				.arg(Arg::new("dir").required(true))
				.arg(Arg::new("two-way").long("two-way").action(ArgAction::SetTrue).help("Two-way sync"))
				.arg(
					Arg::new("prune")
						.long("prune")
						.action(ArgAction::SetTrue)
						.conflicts_with("no-prune")
						.help("Delete remote files missing locally"),
				)
				.arg(
					Arg::new("no-prune")
						.long("no-prune")
						.action(ArgAction::SetTrue)
						.help("Keep remote files missing locally"),
				)
				.arg(
					Arg::new("delay")
						.long("delay")
						.value_name("SECONDS")
						.help("Delay between remote operations"),
				)
				.arg(
					Arg::new("autocrlf")
						.long("autocrlf")
						.value_name("MODE")
						.value_parser(["true", "input", "false"])
						.help("Line ending conversion"),
				),
		)
		.subcommand(project_args(Command::new("ls").about("List remote documents")))
		.subcommand(
			Command::new("state")
				.about("Print the two-way sync snapshot")
				.arg(Arg::new("dir").required(true)),
		)
		.get_matches();

	if let Some(sub) = matches.subcommand_matches("sync") {
		let dir = sub.get_one::<String>("dir").ok_or("sync: directory argument required")?;
		let root = fs::canonicalize(dir)?;
		let config = load_config(&root, sub)?;
		init_tracing(&config.log_level);

		let store = Arc::new(FolderRemoteStore::new(store_dir(sub)?));
		let report = SyncBuilder::from_config(config)
			.store(store)
			.callbacks(Arc::new(CliProgress))
			.sync()
			.await?;
		eprintln!("{}", report);
	} else if let Some(sub) = matches.subcommand_matches("ls") {
		init_tracing("warn");
		let mut config = Config::default();
		config.apply_env()?;
		let org = sub.get_one::<String>("org").cloned().or(config.organization_id);
		let project = sub.get_one::<String>("project").cloned().or(config.project_id);
		let (org, project) = match (org, project) {
			(Some(org), Some(project)) => (org, project),
			_ => return Err("ls: --org and --project are required".into()),
		};

		let store = FolderRemoteStore::new(store_dir(sub)?);
		for entry in store.list_files(&ProjectRef::new(org, project)).await? {
			println!("{}  {}  {}", entry.created_at.to_rfc3339(), entry.uuid, entry.file_name);
		}
	} else if let Some(sub) = matches.subcommand_matches("state") {
		init_tracing("warn");
		let dir = sub.get_one::<String>("dir").ok_or("state: directory argument required")?;
		let state = StateStore::for_root(Path::new(dir)).load().await?;
		println!("{}", serde_json::to_string_pretty(&state)?);
	}

	Ok(())
}

// vim: ts=4
