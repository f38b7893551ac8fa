use error::MayfigError;
use serde::Deserialize;
use std::{
	fmt::Display,
	path::{Path, PathBuf},
	sync::LazyLock,
};

pub mod appearance;
pub mod bind;
pub mod button;
pub mod command;
pub mod error;
pub mod layout;
pub mod tags;
pub mod windowrules;

pub use self::{
	appearance::Appearance,
	bind::{Action, Binds, Keysym, Modifiers},
	button::Buttons,
	command::{Command, Commands},
	error::{Error, ValidationError},
	layout::Layout,
	tags::{TagMask, Tags},
	windowrules::WindowRules,
};

/// the complete bindings and policy table
///
/// built once, validated once and read-only afterwards
#[derive(Debug, PartialEq)]
pub struct Config {
	pub modkey: Modifiers,
	pub appearance: Appearance,
	pub tags: Tags,
	pub windowrules: WindowRules,
	pub layout: Layout,
	pub commands: Commands,
	pub bind: Binds,
	pub buttons: Buttons,
}

/// the config as written in the file, before the bindings are resolved
#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct ConfigFile {
	modkey: Modifiers,
	appearance: Appearance,
	tags: Tags,
	windowrules: WindowRules,
	layout: Layout,
	/// merged over the default commands
	commands: Option<Commands>,
	/// append the generated tag bindings to a custom `bind` table
	tag_keys: bool,
	bind: Option<Binds>,
	buttons: Option<Buttons>,
}

impl Default for ConfigFile {
	fn default() -> Self {
		ConfigFile {
			modkey: Modifiers::SUPER,
			appearance: Appearance::default(),
			tags: Tags::default(),
			windowrules: WindowRules::default(),
			layout: Layout::default(),
			commands: None,
			tag_keys: true,
			bind: None,
			buttons: None,
		}
	}
}

impl ConfigFile {
	fn resolve(self) -> Config {
		let mut commands = Commands::with_appearance(&self.appearance);
		if let Some(file) = self.commands {
			commands.merge(file);
		}

		let bind = match self.bind {
			Some(mut bind) => {
				if self.tag_keys {
					bind.extend(Binds::tag_keys(Modifiers::MOD, &self.tags));
				}
				bind
			}
			None => Binds::with_defaults(&commands, &self.tags),
		};
		let buttons = self.buttons.unwrap_or_else(|| Buttons::with_defaults(&commands));

		Config {
			modkey: self.modkey,
			appearance: self.appearance,
			tags: self.tags,
			windowrules: self.windowrules,
			layout: self.layout,
			commands,
			bind: bind.flatten_mod(self.modkey),
			buttons: buttons.flatten_mod(self.modkey),
		}
	}
}

impl Default for Config {
	fn default() -> Self {
		ConfigFile::default().resolve()
	}
}

pub static CONFIG_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
	let mut config = dirs::config_dir().unwrap_or_else(std::env::temp_dir);
	config.push("tagwm.mf");

	config
});

impl Config {
	/// read the config at `path`, or the default config path
	///
	/// falls back to the built-in table if the file doesn't exist
	pub fn init(path: Option<&Path>) -> Result<Self, Error> {
		let path = path.unwrap_or(CONFIG_PATH.as_path());

		match Config::read(path) {
			Ok(config) => Ok(config),
			Err(Error::NotFound(path)) => {
				tracing::info!("config {} not found, using defaults", path.display());

				let config = Config::default();
				config.validate()?;
				Ok(config)
			}
			Err(e) => Err(e),
		}
	}

	pub fn read(path: &Path) -> Result<Self, Error> {
		let file = match std::fs::read_to_string(path) {
			Ok(file) => file,
			Err(err) if matches!(err.kind(), std::io::ErrorKind::NotFound) => {
				return Err(Error::NotFound(path.to_owned()));
			}
			Err(err) => return Err(Error::IoError(path.to_owned(), err)),
		};

		// workaround for https://github.com/rust-lang/annotate-snippets-rs/issues/25
		let file = file.replace('\t', "    ");

		let config = mayfig::from_str::<ConfigFile>(&file).map_err(|error| MayfigError {
			error: error.into(),
			path: path.to_owned(),
			file,
		})?;

		let config = config.resolve();
		config.validate()?;

		tracing::debug!(
			binds = config.bind.len(),
			buttons = config.buttons.len(),
			"read config {}",
			path.display()
		);
		Ok(config)
	}

	/// check the invariants the window manager relies on
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.modkey.is_empty() {
			return Err(ValidationError::EmptyModkey);
		}

		if self.tags.is_empty() {
			return Err(ValidationError::NoTags);
		} else if self.tags.len() > tags::MAX_TAGS {
			return Err(ValidationError::TooManyTags(self.tags.len()));
		}

		let layouts = &self.layout.layouts;
		if layouts.is_empty() {
			return Err(ValidationError::NoLayouts);
		}

		let mfact = self.layout.tiling.mfact;
		if !layout::Tiling::MFACT_RANGE.contains(&mfact) {
			return Err(ValidationError::Mfact(mfact));
		}

		let tag_mask = self.tags.mask();
		for (rule, windowrule) in self.windowrules.iter().enumerate() {
			let beyond = windowrule.tags & !tag_mask;
			if !beyond.is_empty() {
				return Err(ValidationError::RuleTags {
					rule,
					mask: windowrule.tags.bits(),
				});
			}
		}

		for (name, command) in self.commands.iter() {
			if command.is_empty() {
				return Err(ValidationError::EmptyCommand(name.to_owned()));
			}
		}

		let check = |binding: &dyn Display, action: &Action| match action {
			Action::SetLayout(Some(index)) if *index >= layouts.len() => Err(ValidationError::LayoutOutOfRange {
				binding: binding.to_string(),
				index: *index,
				len: layouts.len(),
			}),
			Action::Spawn(command) if command.is_empty() => Err(ValidationError::EmptyCommand(binding.to_string())),
			_ => Ok(()),
		};

		for bind in self.bind.iter() {
			check(&bind.mapping, &bind.action)?;
		}
		for bind in self.buttons.iter() {
			check(&bind.mapping, &bind.action)?;
		}

		Ok(())
	}
}
