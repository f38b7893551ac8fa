use crate::appearance::Appearance;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, de::Visitor};
use std::fmt::{Debug, Display};

/// placeholder for the focused monitor in config files
pub const MONITOR_SLOT: &str = "{monitor}";

/// one element of an argument vector
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum ArgSlot {
	Literal(String),
	/// replaced with the index of the focused monitor when spawning
	Monitor,
}

impl Debug for ArgSlot {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ArgSlot::Literal(literal) => Debug::fmt(literal, f),
			ArgSlot::Monitor => f.write_str(MONITOR_SLOT),
		}
	}
}

impl Display for ArgSlot {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ArgSlot::Literal(literal) => f.write_str(literal),
			ArgSlot::Monitor => f.write_str(MONITOR_SLOT),
		}
	}
}

impl Serialize for ArgSlot {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for ArgSlot {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_str(ArgSlotVis)
	}
}

struct ArgSlotVis;

impl Visitor<'_> for ArgSlotVis {
	type Value = ArgSlot;

	fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("a command argument")
	}

	fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
		if v == MONITOR_SLOT {
			Ok(ArgSlot::Monitor)
		} else {
			Ok(ArgSlot::Literal(v.to_owned()))
		}
	}
}

/// an external program invocation, `argv[0]` is the program
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Command(Vec<ArgSlot>);

impl Command {
	pub fn new<I, S>(args: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let args = args.into_iter().map(|arg| ArgSlot::Literal(arg.into())).collect();
		Command(args)
	}

	pub fn from_slots(slots: Vec<ArgSlot>) -> Self {
		Command(slots)
	}

	/// run `cmd` through `/bin/sh -c`
	pub fn shell(cmd: impl Into<String>) -> Self {
		Command::new(["/bin/sh".to_owned(), "-c".to_owned(), cmd.into()])
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn slots(&self) -> &[ArgSlot] {
		&self.0
	}

	/// build a fresh argument vector for the focused `monitor`
	///
	/// all elements except the monitor slots are copied unchanged
	pub fn argv(&self, monitor: usize) -> Vec<String> {
		self.0
			.iter()
			.map(|slot| match slot {
				ArgSlot::Literal(literal) => literal.clone(),
				ArgSlot::Monitor => monitor.to_string(),
			})
			.collect()
	}
}

impl Display for Command {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for (i, slot) in self.0.iter().enumerate() {
			if i != 0 {
				f.write_str(" ")?;
			}
			write!(f, "{slot}")?;
		}

		Ok(())
	}
}

/// named commands, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commands(IndexMap<String, Command>);

impl Default for Commands {
	fn default() -> Self {
		Commands::with_appearance(&Appearance::default())
	}
}

impl Commands {
	/// the default commands, the launcher follows the font and colors of `appearance`
	pub fn with_appearance(appearance: &Appearance) -> Self {
		let normal = appearance.colors.normal;
		let selected = appearance.colors.selected;

		let launcher = Command::from_slots(vec![
			ArgSlot::Literal("dmenu_run".to_owned()),
			ArgSlot::Literal("-m".to_owned()),
			ArgSlot::Monitor,
			ArgSlot::Literal("-fn".to_owned()),
			ArgSlot::Literal(appearance.launcher_font.clone()),
			ArgSlot::Literal("-l".to_owned()),
			ArgSlot::Literal("20".to_owned()),
			ArgSlot::Literal("-nb".to_owned()),
			ArgSlot::Literal(normal.bg.to_string()),
			ArgSlot::Literal("-nf".to_owned()),
			ArgSlot::Literal(normal.fg.to_string()),
			ArgSlot::Literal("-sb".to_owned()),
			ArgSlot::Literal(selected.bg.to_string()),
			ArgSlot::Literal("-sf".to_owned()),
			ArgSlot::Literal(selected.fg.to_string()),
		]);

		let commands = [
			("launcher", launcher),
			("terminal", Command::new(["st"])),
			("editor", Command::new(["st", "-e", "nvim"])),
			("browser", Command::new(["brave"])),
			("file_manager", Command::new(["pcmanfm"])),
			("mixer", Command::new(["pulsemixer"])),
			// volume
			("volume_up", Command::new(["/usr/bin/pactl", "set-sink-volume", "0", "+5%"])),
			("volume_down", Command::new(["/usr/bin/pactl", "set-sink-volume", "0", "-5%"])),
			("volume_mute", Command::new(["/usr/bin/pactl", "set-sink-mute", "0", "toggle"])),
			// media
			("play_pause", Command::new(["/usr/bin/playerctl", "play-pause"])),
			("next", Command::new(["/usr/bin/playerctl", "next"])),
			("prev", Command::new(["/usr/bin/playerctl", "previous"])),
			// brightness
			("brightness_up", Command::new(["/usr/bin/xbacklight", "-inc", "20"])),
			("brightness_down", Command::new(["/ust/bin/xbacklight", "-dec", "20"])),
		];

		let commands = commands
			.into_iter()
			.map(|(name, command)| (name.to_owned(), command))
			.collect();
		Commands(commands)
	}

	/// add the commands of `other`, replacing commands of the same name in place
	pub fn merge(&mut self, other: Commands) {
		self.0.extend(other.0);
	}

	pub fn get(&self, name: &str) -> Option<&Command> {
		self.0.get(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Command)> {
		self.0.iter().map(|(name, command)| (name.as_str(), command))
	}
}

#[cfg(test)]
mod tests {
	use super::{ArgSlot, Command, Commands};
	use pretty_assertions::assert_eq;

	#[test]
	fn launcher_monitor_substitution() {
		let commands = Commands::default();
		let launcher = commands.get("launcher").unwrap();

		let first = launcher.argv(0);
		let second = launcher.argv(1);

		assert_eq!(first.len(), second.len());
		assert_eq!(first[2], "0");
		assert_eq!(second[2], "1");

		let differing = first
			.iter()
			.zip(&second)
			.enumerate()
			.filter(|(_, (a, b))| a != b)
			.map(|(i, _)| i)
			.collect::<Vec<_>>();
		assert_eq!(differing, vec![2]);

		// the command itself is never patched
		assert_eq!(launcher.slots()[2], ArgSlot::Monitor);
	}

	#[test]
	fn launcher_uses_scheme_colors() {
		let commands = Commands::default();
		let argv = commands.get("launcher").unwrap().argv(0);

		assert_eq!(
			argv,
			vec![
				"dmenu_run",
				"-m",
				"0",
				"-fn",
				"Misc Termsyn:size=10",
				"-l",
				"20",
				"-nb",
				"#282828",
				"-nf",
				"#cccccc",
				"-sb",
				"#928374",
				"-sf",
				"#eeeeee",
			]
		);
	}

	#[test]
	fn shell() {
		let command = Command::shell("echo hi | wc -c");
		assert_eq!(command.argv(0), vec!["/bin/sh", "-c", "echo hi | wc -c"]);
	}

	#[test]
	fn deserialize_monitor_slot() {
		let command = serde_json::from_str::<Command>(r#"["rofi", "-m", "{monitor}"]"#).unwrap();
		assert_eq!(
			command.slots(),
			&[
				ArgSlot::Literal("rofi".to_owned()),
				ArgSlot::Literal("-m".to_owned()),
				ArgSlot::Monitor,
			]
		);
		assert_eq!(command.argv(3), vec!["rofi", "-m", "3"]);
		assert_eq!(command.to_string(), "rofi -m {monitor}");
	}

	#[test]
	fn merge_keeps_positions() {
		let mut commands = Commands::default();
		let file = serde_json::from_str::<Commands>(r#"{ "terminal": ["alacritty"], "screenshot": ["maim"] }"#).unwrap();
		commands.merge(file);

		assert_eq!(commands.get("terminal").unwrap().argv(0), vec!["alacritty"]);
		assert_eq!(commands.get("editor").unwrap().argv(0), vec!["st", "-e", "nvim"]);

		let names = commands.iter().map(|(name, _)| name).collect::<Vec<_>>();
		assert_eq!(names[1], "terminal");
		assert_eq!(names.last(), Some(&"screenshot"));
	}

	#[test]
	fn declaration_order() {
		let commands = Commands::default();
		let names = commands.iter().map(|(name, _)| name).take(3).collect::<Vec<_>>();
		assert_eq!(names, vec!["launcher", "terminal", "editor"]);
	}
}
