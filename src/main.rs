use self::{
	cli::{Cli, Cmd},
	term::Term,
};
use clap::Parser;
use serde::Serialize;
use std::{fmt::Display, io::Write};
use tagwm::spawn::spawn;
use tagwm_config::{
	Config, TagMask,
	bind::Mapping,
	button::ButtonMapping,
	layout::LayoutEntry,
	windowrules::Placement,
};

mod cli;
mod term;
mod trace;

fn main() -> Term {
	let cli = Cli::parse();
	// only spawning keeps a log file, queries log to stderr
	trace::setup(matches!(cli.cmd, Cmd::Spawn { dry_run: false, .. }));

	let config = match Config::init(cli.config.as_deref()) {
		Ok(config) => config,
		Err(err) => return Term::Config(err),
	};

	let out = Output { json: cli.json };
	let result = match cli.cmd {
		Cmd::Check => {
			let summary = Summary::new(&config);
			out.print(&summary, &summary)
		}
		Cmd::Key { mapping } => {
			let mapping = match mapping.parse::<Mapping>() {
				Ok(mapping) => mapping,
				Err(err) => return Term::InvalidInput(err.to_string()),
			};
			let mods = mapping.mods.flatten(config.modkey);

			let action = config.bind.find_action(mods, mapping.key);
			match action {
				Some(action) => out.print(action, action),
				None => out.print(&action, &"no binding"),
			}
		}
		Cmd::Button { click, mapping, tag } => {
			if let Some(tag) = tag.filter(|&tag| config.tags.label(tag).is_none()) {
				return Term::InvalidInput(format!(
					"tag {tag} out of range, there are {} tags",
					config.tags.len()
				));
			}

			let mapping = match format!("{click} {mapping}").parse::<ButtonMapping>() {
				Ok(mapping) => mapping,
				Err(err) => return Term::InvalidInput(err.to_string()),
			};
			let mods = mapping.mods.flatten(config.modkey);

			let action = config.buttons.find_action(mapping.click, mods, mapping.button, tag);
			match &action {
				Some(action) => out.print(action, action),
				None => out.print(&action, &"no binding"),
			}
		}
		Cmd::Rule { class, instance, title } => {
			// a new window lands on the first tag of a fresh monitor
			let view = TagMask::tag(0);
			let placement = config.windowrules.apply(
				class.as_deref(),
				instance.as_deref(),
				title.as_deref(),
				view,
				config.tags.mask(),
			);

			out.print(&placement, &PrettyPlacement(&placement))
		}
		Cmd::Layout { index } => {
			let index = index.unwrap_or(0);
			let Some(layout) = config.layout.layouts.active(index) else {
				return Term::InvalidInput(format!(
					"layout {index} out of range, there are {} layouts",
					config.layout.layouts.len()
				));
			};

			let layout = IndexedLayout { index, layout };
			out.print(&layout, &layout)
		}
		Cmd::Tags => {
			let tags = (config.tags.iter().enumerate())
				.map(|(index, label)| Tag {
					index,
					label,
					mask: TagMask::tag(index),
				})
				.collect::<Vec<_>>();

			out.list(&tags)
		}
		Cmd::Binds => {
			let binds = (config.bind.iter())
				.map(|bind| Entry {
					key: &bind.mapping,
					value: &bind.action,
				})
				.collect::<Vec<_>>();
			out.list(&binds)
		}
		Cmd::Buttons => {
			let buttons = (config.buttons.iter())
				.map(|bind| Entry {
					key: &bind.mapping,
					value: &bind.action,
				})
				.collect::<Vec<_>>();
			out.list(&buttons)
		}
		Cmd::Commands => {
			let commands = (config.commands.iter())
				.map(|(name, command)| Entry {
					key: name,
					value: command,
				})
				.collect::<Vec<_>>();

			out.list(&commands)
		}
		Cmd::Spawn { name, monitor, dry_run } => {
			let Some(command) = config.commands.get(&name) else {
				return Term::UnknownCommand(name);
			};

			if dry_run {
				let argv = command.argv(monitor);
				out.print(&argv, &argv.join(" "))
			} else if let Err(err) = spawn(command, monitor) {
				return Term::Spawn(name, err);
			} else {
				Ok(())
			}
		}
	};

	match result {
		Ok(()) => Term::Ok,
		Err(err) => Term::Json(err),
	}
}

struct Output {
	json: bool,
}

impl Output {
	fn print<T: Serialize + ?Sized, D: Display + ?Sized>(&self, json: &T, pretty: &D) -> Result<(), serde_json::Error> {
		if self.json {
			stringify(json)
		} else {
			println!("{pretty}");
			Ok(())
		}
	}

	fn list<T: Serialize + Display>(&self, items: &[T]) -> Result<(), serde_json::Error> {
		if self.json {
			stringify(items)
		} else {
			for item in items {
				println!("{item}");
			}
			Ok(())
		}
	}
}

fn stringify<T: Serialize + ?Sized>(v: &T) -> Result<(), serde_json::Error> {
	let mut stdout = std::io::stdout().lock();

	let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
	let mut json_serializer = serde_json::Serializer::with_formatter(&mut stdout, formatter);

	v.serialize(&mut json_serializer)?;
	writeln!(stdout).map_err(serde_json::Error::io)
}

#[derive(Serialize)]
struct Summary {
	modkey: String,
	tags: usize,
	layouts: usize,
	rules: usize,
	commands: usize,
	binds: usize,
	buttons: usize,
}

impl Summary {
	fn new(config: &Config) -> Self {
		Summary {
			modkey: config.modkey.to_string(),
			tags: config.tags.len(),
			layouts: config.layout.layouts.len(),
			rules: config.windowrules.iter().count(),
			commands: config.commands.iter().count(),
			binds: config.bind.len(),
			buttons: config.buttons.len(),
		}
	}
}

impl Display for Summary {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "config ok")?;
		writeln!(f, "  modkey: {}", self.modkey)?;
		writeln!(f, "  tags: {}", self.tags)?;
		writeln!(f, "  layouts: {}", self.layouts)?;
		writeln!(f, "  rules: {}", self.rules)?;
		writeln!(f, "  commands: {}", self.commands)?;
		writeln!(f, "  binds: {}", self.binds)?;
		write!(f, "  buttons: {}", self.buttons)
	}
}

struct PrettyPlacement<'a>(&'a Placement);

impl Display for PrettyPlacement<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let placement = self.0;
		writeln!(f, "tags: {}", placement.tags)?;
		writeln!(f, "floating: {}", placement.floating)?;
		match placement.monitor {
			Some(monitor) => write!(f, "monitor: {monitor}"),
			None => write!(f, "monitor: selected"),
		}
	}
}

#[derive(Serialize)]
struct IndexedLayout<'a> {
	index: usize,
	#[serde(flatten)]
	layout: &'a LayoutEntry,
}

impl Display for IndexedLayout<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let arrange = match self.layout.arrange {
			Some(arrange) => format!("{arrange:?}").to_lowercase(),
			None => "floating".to_owned(),
		};
		write!(f, "{}: {} ({arrange})", self.index, self.layout.symbol)
	}
}

#[derive(Serialize)]
struct Tag<'a> {
	index: usize,
	label: &'a str,
	mask: TagMask,
}

impl Display for Tag<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {} ({:#x})", self.index, self.label, self.mask.bits())
	}
}

#[derive(Serialize)]
struct Entry<K, V> {
	key: K,
	value: V,
}

impl<K: Display, V: Display> Display for Entry<K, V> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}", self.key, self.value)
	}
}
