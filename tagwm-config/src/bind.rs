use crate::{
	command::Commands,
	tags::{MAX_TAGS, TagMask, Tags},
};
use bitflags::bitflags;
use serde::{Deserialize, Serialize, de::Visitor};
use std::{
	fmt::{Debug, Display},
	str::FromStr,
};
use xkbcommon::xkb::{self, KEYSYM_CASE_INSENSITIVE, keysyms::KEY_NoSymbol};

mod action;

pub use action::Action;
pub use xkbcommon::xkb::Keysym;

bitflags! {
	/// modifier state, using the bit values of the x11 state mask
	#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
	pub struct Modifiers: u16 {
		const SHIFT = 1 << 0;
		const LOCK = 1 << 1;
		const CTRL = 1 << 2;
		/// mod1
		const ALT = 1 << 3;
		const MOD2 = 1 << 4;
		const MOD3 = 1 << 5;
		/// mod4
		const SUPER = 1 << 6;
		const MOD5 = 1 << 7;

		/// placeholder for the configured modkey
		const MOD = 1 << 15;
	}
}

impl Debug for Modifiers {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		Debug::fmt(&self.0, f)
	}
}

impl Display for Modifiers {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut first = true;
		for (name, _) in self.iter_names() {
			if !first {
				f.write_str(" ")?;
			}
			f.write_str(&name.to_ascii_lowercase())?;
			first = false;
		}

		Ok(())
	}
}

impl Modifiers {
	/// the modifiers that take part in binding lookups
	pub const REAL: Modifiers = Modifiers::SHIFT
		.union(Modifiers::CTRL)
		.union(Modifiers::ALT)
		.union(Modifiers::MOD2)
		.union(Modifiers::MOD3)
		.union(Modifiers::SUPER)
		.union(Modifiers::MOD5);

	/// strip caps lock and num lock from an x11 modifier state
	pub fn clean(state: u16, numlock: Modifiers) -> Modifiers {
		let state = Modifiers::from_bits_truncate(state);
		state & !(numlock | Modifiers::LOCK) & Modifiers::REAL
	}

	/// replace the [`Modifiers::MOD`] placeholder with `modkey`
	pub fn flatten(self, modkey: Modifiers) -> Modifiers {
		if self.contains(Modifiers::MOD) {
			(self - Modifiers::MOD) | modkey
		} else {
			self
		}
	}

	fn add(&mut self, r#mod: &str) -> bool {
		let modifier = if r#mod.eq_ignore_ascii_case("mod") {
			Modifiers::MOD
		} else if r#mod.eq_ignore_ascii_case("ctrl") || r#mod.eq_ignore_ascii_case("control") {
			Modifiers::CTRL
		} else if r#mod.eq_ignore_ascii_case("alt") || r#mod.eq_ignore_ascii_case("mod1") {
			Modifiers::ALT
		} else if r#mod.eq_ignore_ascii_case("shift") {
			Modifiers::SHIFT
		} else if r#mod.eq_ignore_ascii_case("super")
			|| r#mod.eq_ignore_ascii_case("meta")
			|| r#mod.eq_ignore_ascii_case("logo")
			|| r#mod.eq_ignore_ascii_case("mod4")
		{
			Modifiers::SUPER
		} else if r#mod.eq_ignore_ascii_case("mod2") {
			Modifiers::MOD2
		} else if r#mod.eq_ignore_ascii_case("mod3") {
			Modifiers::MOD3
		} else if r#mod.eq_ignore_ascii_case("mod5") {
			Modifiers::MOD5
		} else {
			return false;
		};

		*self |= modifier;
		true
	}

	/// parse whitespace separated modifier names, like `"super shift"`
	pub fn parse(v: &str) -> Result<Modifiers, MappingError> {
		let mut mods = Modifiers::empty();
		for split in v.split_whitespace() {
			if !mods.add(split) {
				return Err(MappingError::InvalidModifier(split.to_owned()));
			}
		}

		Ok(mods)
	}
}

impl<'de> Deserialize<'de> for Modifiers {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_str(ModifiersVis)
	}
}

struct ModifiersVis;

impl Visitor<'_> for ModifiersVis {
	type Value = Modifiers;

	fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("modifier names")
	}

	fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
		let mods = Modifiers::parse(v).map_err(serde::de::Error::custom)?;
		if mods.is_empty() {
			return Err(serde::de::Error::custom("the modkey can't be empty"));
		} else if mods.contains(Modifiers::MOD) {
			return Err(serde::de::Error::custom("the modkey can't reference itself"));
		}

		Ok(mods)
	}
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
	#[error("invalid key {0:?}")]
	InvalidKey(String),
	#[error("invalid modifier {0:?}")]
	InvalidModifier(String),
	#[error("duplicate key definition at {0:?}")]
	DuplicateKey(String),
	#[error("missing key")]
	MissingKey,
}

/// a modifier and key combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mapping {
	pub mods: Modifiers,
	pub key: Keysym,
}

impl Mapping {
	pub fn new(mods: Modifiers, key: Keysym) -> Self {
		Mapping { mods, key }
	}
}

impl FromStr for Mapping {
	type Err = MappingError;

	/// parse a mapping like `"mod shift Return"`, the key is looked up case-insensitively
	fn from_str(v: &str) -> Result<Self, Self::Err> {
		let mut mods = Modifiers::default();
		let mut key = None;

		for split in v.split_whitespace() {
			if !mods.add(split) {
				let keysym = xkb::keysym_from_name(split, KEYSYM_CASE_INSENSITIVE);

				if keysym.raw() == KEY_NoSymbol {
					return Err(MappingError::InvalidKey(split.to_owned()));
				} else if key.is_some() {
					return Err(MappingError::DuplicateKey(split.to_owned()));
				}

				key = Some(keysym);
			}
		}

		let Some(key) = key else {
			return Err(MappingError::MissingKey);
		};

		Ok(Mapping { mods, key })
	}
}

impl Display for Mapping {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if !self.mods.is_empty() {
			write!(f, "{} ", self.mods)?;
		}
		f.write_str(&xkb::keysym_get_name(self.key))
	}
}

impl Serialize for Mapping {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Mapping {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		deserializer.deserialize_str(MappingVisitor)
	}
}

struct MappingVisitor;

impl Visitor<'_> for MappingVisitor {
	type Value = Mapping;

	fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("a valid key map")
	}

	fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
	where
		E: serde::de::Error,
	{
		v.parse().map_err(serde::de::Error::custom)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyBinding {
	pub mapping: Mapping,
	pub action: Action,
}

impl KeyBinding {
	pub fn new(mods: Modifiers, key: Keysym, action: Action) -> Self {
		KeyBinding {
			mapping: Mapping { mods, key },
			action,
		}
	}
}

/// ordered key bindings, the first exact match wins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binds(Vec<KeyBinding>);

impl Binds {
	pub fn new(binds: Vec<KeyBinding>) -> Self {
		Binds(binds)
	}

	/// the default key bindings
	///
	/// spawn bindings take their commands from `commands`, and the tag
	/// bindings are generated for every tag in `tags`
	pub fn with_defaults(commands: &Commands, tags: &Tags) -> Self {
		let spawn = |name: &str| Action::Spawn(commands.get(name).cloned().unwrap_or_default());

		let m = Modifiers::MOD;
		let ms = Modifiers::MOD | Modifiers::SHIFT;
		let mc = Modifiers::MOD | Modifiers::CTRL;
		let none = Modifiers::empty();

		let mut binds = vec![
			KeyBinding::new(m, Keysym::d, spawn("launcher")),
			KeyBinding::new(m, Keysym::o, spawn("editor")),
			KeyBinding::new(m, Keysym::m, spawn("file_manager")),
			KeyBinding::new(ms, Keysym::Return, spawn("terminal")),
			KeyBinding::new(m, Keysym::a, spawn("mixer")),
			KeyBinding::new(m, Keysym::b, Action::ToggleBar),
			KeyBinding::new(m, Keysym::j, Action::FocusStack(1)),
			KeyBinding::new(m, Keysym::k, Action::FocusStack(-1)),
			KeyBinding::new(m, Keysym::i, Action::IncNMaster(1)),
			KeyBinding::new(ms, Keysym::i, Action::IncNMaster(-1)),
			KeyBinding::new(m, Keysym::p, spawn("browser")),
			KeyBinding::new(m, Keysym::h, Action::SetMfact(-0.05)),
			KeyBinding::new(m, Keysym::l, Action::SetMfact(0.05)),
			KeyBinding::new(m, Keysym::Return, Action::Zoom),
			KeyBinding::new(m, Keysym::Tab, Action::View(None)),
			KeyBinding::new(ms, Keysym::q, Action::KillClient),
			KeyBinding::new(m, Keysym::t, Action::SetLayout(Some(0))),
			KeyBinding::new(ms, Keysym::f, Action::SetLayout(Some(1))),
			KeyBinding::new(m, Keysym::f, Action::ToggleFullscreen),
			KeyBinding::new(m, Keysym::space, Action::SetLayout(None)),
			KeyBinding::new(ms, Keysym::space, Action::ToggleFloating),
			KeyBinding::new(m, Keysym::_0, Action::View(Some(TagMask::ALL))),
			KeyBinding::new(ms, Keysym::_0, Action::Tag(Some(TagMask::ALL))),
			KeyBinding::new(m, Keysym::comma, Action::FocusMon(-1)),
			KeyBinding::new(m, Keysym::period, Action::FocusMon(1)),
			KeyBinding::new(ms, Keysym::comma, Action::TagMon(-1)),
			KeyBinding::new(ms, Keysym::period, Action::TagMon(1)),
		];

		binds.extend(Binds::tag_keys(m, tags));

		binds.extend([
			KeyBinding::new(ms, Keysym::x, Action::Quit),
			KeyBinding::new(mc, Keysym::space, spawn("play_pause")),
			KeyBinding::new(none, Keysym::XF86_AudioPrev, spawn("prev")),
			KeyBinding::new(none, Keysym::XF86_AudioNext, spawn("next")),
			KeyBinding::new(none, Keysym::XF86_AudioLowerVolume, spawn("volume_down")),
			KeyBinding::new(none, Keysym::XF86_AudioMute, spawn("volume_mute")),
			KeyBinding::new(none, Keysym::XF86_AudioRaiseVolume, spawn("volume_up")),
			KeyBinding::new(ms, Keysym::F10, spawn("brightness_up")),
			KeyBinding::new(ms, Keysym::F9, spawn("brightness_down")),
		]);

		Binds(binds)
	}

	/// generate the four bindings of every tag
	///
	/// `modkey` views the tag, `modkey ctrl` toggles its visibility, `modkey shift`
	/// moves the focused window to it and `modkey ctrl shift` toggles it on the
	/// focused window.
	pub fn tag_keys(modkey: Modifiers, tags: &Tags) -> Vec<KeyBinding> {
		let mut binds = Vec::with_capacity(tags.len() * 4);

		for index in 0..tags.len().min(MAX_TAGS) {
			let key = tag_key(index);
			let mask = Some(TagMask::tag(index));

			binds.extend([
				KeyBinding::new(modkey, key, Action::View(mask)),
				KeyBinding::new(modkey | Modifiers::CTRL, key, Action::ToggleView(mask)),
				KeyBinding::new(modkey | Modifiers::SHIFT, key, Action::Tag(mask)),
				KeyBinding::new(
					modkey | Modifiers::CTRL | Modifiers::SHIFT,
					key,
					Action::ToggleTag(mask),
				),
			]);
		}

		binds
	}

	/// look up the action bound to exactly `mods` and `keysym`
	pub fn find_action(&self, mods: Modifiers, keysym: Keysym) -> Option<&Action> {
		self.0
			.iter()
			.find(|bind| bind.mapping.mods == mods && bind.mapping.key == keysym)
			.map(|bind| &bind.action)
	}

	/// replace every [`Modifiers::MOD`] placeholder with `modkey`
	pub fn flatten_mod(mut self, modkey: Modifiers) -> Self {
		for bind in &mut self.0 {
			bind.mapping.mods = bind.mapping.mods.flatten(modkey);
		}

		self
	}

	pub fn extend(&mut self, binds: impl IntoIterator<Item = KeyBinding>) {
		self.0.extend(binds);
	}

	pub fn iter(&self) -> impl Iterator<Item = &KeyBinding> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// the key of the tag at `index`, `1`-`9` followed by the function keys
fn tag_key(index: usize) -> Keysym {
	// both ranges are contiguous in the keysym table
	if index < 9 {
		Keysym::new(Keysym::_1.raw() + index as u32)
	} else {
		Keysym::new(Keysym::F1.raw() + (index - 9) as u32)
	}
}

impl<'de> Deserialize<'de> for Binds {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_map(BindsVis)
	}
}

struct BindsVis;

impl<'v> Visitor<'v> for BindsVis {
	type Value = Binds;

	fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("key bindings")
	}

	fn visit_map<A: serde::de::MapAccess<'v>>(self, mut map: A) -> Result<Self::Value, A::Error> {
		let mut binds = Vec::new();
		while let Some((mapping, action)) = map.next_entry()? {
			binds.push(KeyBinding { mapping, action });
		}

		Ok(Binds(binds))
	}
}

#[cfg(test)]
mod tests {
	use super::{Action, Binds, KeyBinding, Mapping, MappingError, Modifiers};
	use crate::{
		command::Commands,
		tags::{TagMask, Tags},
	};
	use pretty_assertions::assert_eq;
	use xkbcommon::xkb::Keysym;

	fn defaults() -> Binds {
		Binds::with_defaults(&Commands::default(), &Tags::default()).flatten_mod(Modifiers::SUPER)
	}

	#[test]
	fn unbound_key_is_none() {
		let binds = defaults();

		assert_eq!(binds.find_action(Modifiers::SUPER, Keysym::z), None);
		assert_eq!(binds.find_action(Modifiers::empty(), Keysym::d), None);
		assert_eq!(binds.find_action(Modifiers::ALT, Keysym::d), None);
	}

	#[test]
	fn modifiers_match_exactly() {
		let binds = defaults();
		let terminal = Modifiers::SUPER | Modifiers::SHIFT;

		assert!(binds.find_action(terminal, Keysym::Return).is_some());
		assert_eq!(binds.find_action(terminal | Modifiers::CTRL, Keysym::Return), None);
		assert_eq!(binds.find_action(Modifiers::SUPER, Keysym::Return), Some(&Action::Zoom));
	}

	#[test]
	fn first_binding_wins() {
		let binds = Binds::new(vec![
			KeyBinding::new(Modifiers::SUPER, Keysym::q, Action::Quit),
			KeyBinding::new(Modifiers::SUPER, Keysym::q, Action::KillClient),
		]);

		assert_eq!(binds.find_action(Modifiers::SUPER, Keysym::q), Some(&Action::Quit));
	}

	#[test]
	fn media_keys_have_no_modifiers() {
		let binds = defaults();
		let Some(Action::Spawn(command)) = binds.find_action(Modifiers::empty(), Keysym::XF86_AudioMute) else {
			panic!("media key not bound");
		};

		assert_eq!(command.argv(0), vec!["/usr/bin/pactl", "set-sink-mute", "0", "toggle"]);
	}

	#[test]
	fn tag_keys_are_generated() {
		for count in [1, 9, 12] {
			let tags = Tags::new((0..count).map(|i| i.to_string()).collect());
			let binds = Binds::tag_keys(Modifiers::SUPER, &tags);
			assert_eq!(binds.len(), 4 * count);

			for (index, quad) in binds.chunks(4).enumerate() {
				let mask = Some(TagMask::tag(index));
				let key = quad[0].mapping.key;

				assert!(quad.iter().all(|bind| bind.mapping.key == key));
				assert_eq!(quad[0], KeyBinding::new(Modifiers::SUPER, key, Action::View(mask)));
				assert_eq!(
					quad[1],
					KeyBinding::new(Modifiers::SUPER | Modifiers::CTRL, key, Action::ToggleView(mask))
				);
				assert_eq!(
					quad[2],
					KeyBinding::new(Modifiers::SUPER | Modifiers::SHIFT, key, Action::Tag(mask))
				);
				assert_eq!(
					quad[3],
					KeyBinding::new(
						Modifiers::SUPER | Modifiers::CTRL | Modifiers::SHIFT,
						key,
						Action::ToggleTag(mask)
					)
				);
			}
		}
	}

	#[test]
	fn tag_key_symbols() {
		let tags = Tags::new((0..11).map(|i| i.to_string()).collect());
		let binds = Binds::tag_keys(Modifiers::SUPER, &tags);
		let keys = binds.chunks(4).map(|quad| quad[0].mapping.key).collect::<Vec<_>>();

		assert_eq!(keys[0], Keysym::_1);
		assert_eq!(keys[8], Keysym::_9);
		assert_eq!(keys[9], Keysym::F1);
		assert_eq!(keys[10], Keysym::F2);
	}

	#[test]
	fn default_table_shape() {
		let binds = defaults();
		// 27 before the tag keys, 36 tag keys, 9 after
		assert_eq!(binds.len(), 27 + 36 + 9);

		let tag = binds.find_action(Modifiers::SUPER | Modifiers::SHIFT, Keysym::_9);
		assert_eq!(tag, Some(&Action::Tag(Some(TagMask::tag(8)))));

		let all = binds.find_action(Modifiers::SUPER, Keysym::_0);
		assert_eq!(all, Some(&Action::View(Some(TagMask::ALL))));

		assert!(binds.iter().all(|bind| !bind.mapping.mods.contains(Modifiers::MOD)));
	}

	#[test]
	fn parse_mapping() {
		let mapping = "mod shift Return".parse::<Mapping>().unwrap();
		assert_eq!(mapping, Mapping::new(Modifiers::MOD | Modifiers::SHIFT, Keysym::Return));

		let mapping = "Super Control comma".parse::<Mapping>().unwrap();
		assert_eq!(mapping, Mapping::new(Modifiers::SUPER | Modifiers::CTRL, Keysym::comma));

		let mapping = "XF86AudioMute".parse::<Mapping>().unwrap();
		assert_eq!(mapping, Mapping::new(Modifiers::empty(), Keysym::XF86_AudioMute));
	}

	#[test]
	fn parse_mapping_errors() {
		assert_eq!(
			"mod notakey".parse::<Mapping>(),
			Err(MappingError::InvalidKey("notakey".to_owned()))
		);
		assert_eq!(
			"mod a b".parse::<Mapping>(),
			Err(MappingError::DuplicateKey("b".to_owned()))
		);
		assert_eq!("mod shift".parse::<Mapping>(), Err(MappingError::MissingKey));
	}

	#[test]
	fn clean_mask() {
		let numlock = Modifiers::MOD2;
		// super, caps lock and num lock
		let state = (Modifiers::SUPER | Modifiers::LOCK | Modifiers::MOD2).bits();

		assert_eq!(Modifiers::clean(state, numlock), Modifiers::SUPER);
		// button masks above the modifier bits are dropped
		assert_eq!(Modifiers::clean(0x100 | 0x1, numlock), Modifiers::SHIFT);
	}

	#[test]
	fn modkey_names() {
		let modkey = serde_json::from_str::<Modifiers>(r#""mod1""#).unwrap();
		assert_eq!(modkey, Modifiers::ALT);

		assert!(serde_json::from_str::<Modifiers>(r#""""#).is_err());
		assert!(serde_json::from_str::<Modifiers>(r#""  ""#).is_err());
		assert!(serde_json::from_str::<Modifiers>(r#""mod""#).is_err());
	}

	#[test]
	fn flatten() {
		let mods = Modifiers::MOD | Modifiers::SHIFT;
		assert_eq!(mods.flatten(Modifiers::ALT), Modifiers::ALT | Modifiers::SHIFT);
		assert_eq!(Modifiers::CTRL.flatten(Modifiers::ALT), Modifiers::CTRL);
	}

	#[test]
	fn display_mapping() {
		let mapping = Mapping::new(Modifiers::SUPER | Modifiers::SHIFT, Keysym::Return);
		assert_eq!(mapping.to_string(), "shift super Return");
	}

	#[test]
	fn deserialize_in_order() {
		let json = r#"{ "super q": "quit", "super q ": "kill_client", "alt Return": { "spawn": ["st"] } }"#;
		let binds = serde_json::from_str::<Binds>(json).unwrap();

		assert_eq!(binds.len(), 3);
		assert_eq!(binds.find_action(Modifiers::SUPER, Keysym::q), Some(&Action::Quit));
	}
}
