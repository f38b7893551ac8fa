use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
	#[command(subcommand)]
	pub cmd: Cmd,
	/// read the config from this path instead of the default
	#[arg(short, long, global = true)]
	pub config: Option<PathBuf>,
	/// output in json format
	#[arg(short, long, global = true)]
	pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Cmd {
	/// load and validate the config
	Check,
	/// look up the action bound to a key, like "mod shift Return"
	Key { mapping: String },
	/// look up the action bound to a mouse button, like "client_win" "mod left"
	Button {
		click: String,
		mapping: String,
		/// index of the clicked tag, for tag bar clicks
		#[arg(long)]
		tag: Option<usize>,
	},
	/// resolve the window rules for a window
	Rule {
		#[arg(long)]
		class: Option<String>,
		#[arg(long)]
		instance: Option<String>,
		#[arg(long)]
		title: Option<String>,
	},
	/// show a layout, the default layout if no index is given
	Layout { index: Option<usize> },
	/// list the tags
	Tags,
	/// list the key bindings
	Binds,
	/// list the button bindings
	Buttons,
	/// list the named commands
	Commands,
	/// spawn a named command
	Spawn {
		name: String,
		/// index of the focused monitor
		#[arg(short, long, default_value_t = 0)]
		monitor: usize,
		/// only print the argument vector
		#[arg(long)]
		dry_run: bool,
	},
}
