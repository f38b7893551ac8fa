use crate::{
	bind::{Action, MappingError, Modifiers},
	command::Commands,
	tags::{MAX_TAGS, TagMask},
};
use serde::{Deserialize, Serialize, de::Visitor};
use std::{fmt::Display, str::FromStr};

/// the region of the screen a click lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Click {
	TagBar,
	LtSymbol,
	StatusText,
	WinTitle,
	ClientWin,
	RootWin,
}

impl Click {
	const ALL: [(&'static str, Click); 6] = [
		("tag_bar", Click::TagBar),
		("lt_symbol", Click::LtSymbol),
		("status_text", Click::StatusText),
		("win_title", Click::WinTitle),
		("client_win", Click::ClientWin),
		("root_win", Click::RootWin),
	];

	pub fn name(self) -> &'static str {
		Click::ALL
			.iter()
			.find(|(_, click)| *click == self)
			.map_or("", |(name, _)| *name)
	}
}

impl FromStr for Click {
	type Err = ButtonError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Click::ALL
			.iter()
			.find(|(name, _)| name.eq_ignore_ascii_case(s))
			.map(|(_, click)| *click)
			.ok_or_else(|| ButtonError::InvalidClick(s.to_owned()))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
	Left = 1,
	Middle = 2,
	Right = 3,
	ScrollUp = 4,
	ScrollDown = 5,
}

impl MouseButton {
	const ALL: [(&'static str, MouseButton); 5] = [
		("left", MouseButton::Left),
		("middle", MouseButton::Middle),
		("right", MouseButton::Right),
		("scroll_up", MouseButton::ScrollUp),
		("scroll_down", MouseButton::ScrollDown),
	];

	/// the x11 button number
	pub fn number(self) -> u8 {
		self as u8
	}

	pub fn from_number(number: u8) -> Option<Self> {
		MouseButton::ALL
			.iter()
			.map(|(_, button)| *button)
			.find(|button| button.number() == number)
	}

	pub fn name(self) -> &'static str {
		MouseButton::ALL
			.iter()
			.find(|(_, button)| *button == self)
			.map_or("", |(name, _)| *name)
	}

	fn parse(s: &str) -> Option<Self> {
		if let Some(button) = MouseButton::ALL
			.iter()
			.find(|(name, _)| name.eq_ignore_ascii_case(s))
		{
			return Some(button.1);
		}

		let number = s.strip_prefix("button").unwrap_or(s);
		number.parse().ok().and_then(MouseButton::from_number)
	}
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ButtonError {
	#[error("invalid click region {0:?}")]
	InvalidClick(String),
	#[error("duplicate button definition at {0:?}")]
	DuplicateButton(String),
	#[error("missing mouse button")]
	MissingButton,
	#[error(transparent)]
	Modifier(#[from] MappingError),
}

/// a click region, modifier and button combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonMapping {
	pub click: Click,
	pub mods: Modifiers,
	pub button: MouseButton,
}

impl ButtonMapping {
	pub fn new(click: Click, mods: Modifiers, button: MouseButton) -> Self {
		ButtonMapping { click, mods, button }
	}
}

impl FromStr for ButtonMapping {
	type Err = ButtonError;

	/// parse a mapping like `"client_win mod left"`, the click region comes first
	fn from_str(v: &str) -> Result<Self, Self::Err> {
		let mut split = v.split_whitespace();
		let Some(click) = split.next() else {
			return Err(ButtonError::InvalidClick(String::new()));
		};
		let click = click.parse::<Click>()?;

		let mut mods = Modifiers::empty();
		let mut button = None;

		for word in split {
			if let Some(b) = MouseButton::parse(word) {
				if button.is_some() {
					return Err(ButtonError::DuplicateButton(word.to_owned()));
				}
				button = Some(b);
			} else {
				mods |= Modifiers::parse(word)?;
			}
		}

		let Some(button) = button else {
			return Err(ButtonError::MissingButton);
		};

		Ok(ButtonMapping { click, mods, button })
	}
}

impl Display for ButtonMapping {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} ", self.click.name())?;
		if !self.mods.is_empty() {
			write!(f, "{} ", self.mods)?;
		}
		f.write_str(self.button.name())
	}
}

impl Serialize for ButtonMapping {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for ButtonMapping {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_str(ButtonMappingVis)
	}
}

struct ButtonMappingVis;

impl Visitor<'_> for ButtonMappingVis {
	type Value = ButtonMapping;

	fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("a valid button map")
	}

	fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
		v.parse().map_err(serde::de::Error::custom)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonBinding {
	pub mapping: ButtonMapping,
	pub action: Action,
}

impl ButtonBinding {
	pub fn new(click: Click, mods: Modifiers, button: MouseButton, action: Action) -> Self {
		ButtonBinding {
			mapping: ButtonMapping { click, mods, button },
			action,
		}
	}
}

/// ordered mouse button bindings, the first exact match wins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buttons(Vec<ButtonBinding>);

impl Buttons {
	pub fn new(buttons: Vec<ButtonBinding>) -> Self {
		Buttons(buttons)
	}

	/// the default button bindings, spawn bindings take their commands from `commands`
	pub fn with_defaults(commands: &Commands) -> Self {
		let terminal = commands.get("terminal").cloned().unwrap_or_default();

		let m = Modifiers::MOD;
		let none = Modifiers::empty();

		Buttons(vec![
			ButtonBinding::new(Click::LtSymbol, none, MouseButton::Left, Action::SetLayout(None)),
			ButtonBinding::new(Click::LtSymbol, none, MouseButton::Right, Action::SetLayout(Some(2))),
			ButtonBinding::new(Click::StatusText, none, MouseButton::Middle, Action::Spawn(terminal)),
			ButtonBinding::new(Click::ClientWin, m, MouseButton::Left, Action::MoveMouse),
			ButtonBinding::new(Click::ClientWin, m, MouseButton::Middle, Action::ToggleFloating),
			ButtonBinding::new(Click::ClientWin, m, MouseButton::Right, Action::ResizeMouse),
			ButtonBinding::new(Click::TagBar, none, MouseButton::Left, Action::View(None)),
			ButtonBinding::new(Click::TagBar, none, MouseButton::Right, Action::ToggleView(None)),
			ButtonBinding::new(Click::TagBar, m, MouseButton::Left, Action::Tag(None)),
			ButtonBinding::new(Click::TagBar, m, MouseButton::Right, Action::ToggleTag(None)),
		])
	}

	/// look up the action bound to exactly `mods` and `button` in `click`
	///
	/// on the tag bar, `clicked_tag` is the index of the tag under the pointer,
	/// and fills in tag actions that don't carry their own mask
	pub fn find_action(
		&self,
		click: Click,
		mods: Modifiers,
		button: MouseButton,
		clicked_tag: Option<usize>,
	) -> Option<Action> {
		let bind = self.0.iter().find(|bind| {
			bind.mapping.click == click && bind.mapping.mods == mods && bind.mapping.button == button
		})?;

		let action = bind.action.clone();
		match (click, clicked_tag) {
			(Click::TagBar, Some(tag)) if tag < MAX_TAGS => Some(action.with_default_tags(TagMask::tag(tag))),
			_ => Some(action),
		}
	}

	/// replace every [`Modifiers::MOD`] placeholder with `modkey`
	pub fn flatten_mod(mut self, modkey: Modifiers) -> Self {
		for bind in &mut self.0 {
			bind.mapping.mods = bind.mapping.mods.flatten(modkey);
		}

		self
	}

	pub fn iter(&self) -> impl Iterator<Item = &ButtonBinding> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<'de> Deserialize<'de> for Buttons {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_map(ButtonsVis)
	}
}

struct ButtonsVis;

impl<'v> Visitor<'v> for ButtonsVis {
	type Value = Buttons;

	fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("button bindings")
	}

	fn visit_map<A: serde::de::MapAccess<'v>>(self, mut map: A) -> Result<Self::Value, A::Error> {
		let mut buttons = Vec::new();
		while let Some((mapping, action)) = map.next_entry()? {
			buttons.push(ButtonBinding { mapping, action });
		}

		Ok(Buttons(buttons))
	}
}

#[cfg(test)]
mod tests {
	use super::{ButtonBinding, ButtonError, ButtonMapping, Buttons, Click, MouseButton};
	use crate::{
		bind::{Action, MappingError, Modifiers},
		command::Commands,
		tags::TagMask,
	};
	use pretty_assertions::assert_eq;

	fn defaults() -> Buttons {
		Buttons::with_defaults(&Commands::default()).flatten_mod(Modifiers::SUPER)
	}

	#[test]
	fn click_context_is_part_of_the_key() {
		let buttons = defaults();

		let layout = buttons.find_action(Click::LtSymbol, Modifiers::empty(), MouseButton::Right, None);
		assert_eq!(layout, Some(Action::SetLayout(Some(2))));

		let title = buttons.find_action(Click::WinTitle, Modifiers::empty(), MouseButton::Right, None);
		assert_eq!(title, None);

		let moved = buttons.find_action(Click::ClientWin, Modifiers::SUPER, MouseButton::Left, None);
		assert_eq!(moved, Some(Action::MoveMouse));

		let plain = buttons.find_action(Click::ClientWin, Modifiers::empty(), MouseButton::Left, None);
		assert_eq!(plain, None);
	}

	#[test]
	fn tag_bar_fills_clicked_tag() {
		let buttons = defaults();

		let view = buttons.find_action(Click::TagBar, Modifiers::empty(), MouseButton::Left, Some(3));
		assert_eq!(view, Some(Action::View(Some(TagMask::tag(3)))));

		let tag = buttons.find_action(Click::TagBar, Modifiers::SUPER, MouseButton::Right, Some(0));
		assert_eq!(tag, Some(Action::ToggleTag(Some(TagMask::tag(0)))));

		// outside the tag bar the mask stays unset
		let custom = Buttons::new(vec![ButtonBinding::new(
			Click::RootWin,
			Modifiers::empty(),
			MouseButton::Left,
			Action::View(None),
		)]);
		let root = custom.find_action(Click::RootWin, Modifiers::empty(), MouseButton::Left, Some(3));
		assert_eq!(root, Some(Action::View(None)));
	}

	#[test]
	fn explicit_mask_is_kept() {
		let buttons = Buttons::new(vec![ButtonBinding::new(
			Click::TagBar,
			Modifiers::empty(),
			MouseButton::Middle,
			Action::View(Some(TagMask::ALL)),
		)]);

		let view = buttons.find_action(Click::TagBar, Modifiers::empty(), MouseButton::Middle, Some(1));
		assert_eq!(view, Some(Action::View(Some(TagMask::ALL))));
	}

	#[test]
	fn first_binding_wins() {
		let buttons = Buttons::new(vec![
			ButtonBinding::new(Click::RootWin, Modifiers::empty(), MouseButton::Left, Action::Zoom),
			ButtonBinding::new(Click::RootWin, Modifiers::empty(), MouseButton::Left, Action::Quit),
		]);

		let action = buttons.find_action(Click::RootWin, Modifiers::empty(), MouseButton::Left, None);
		assert_eq!(action, Some(Action::Zoom));
	}

	#[test]
	fn parse_mapping() {
		let mapping = "client_win mod shift left".parse::<ButtonMapping>().unwrap();
		assert_eq!(
			mapping,
			ButtonMapping::new(
				Click::ClientWin,
				Modifiers::MOD | Modifiers::SHIFT,
				MouseButton::Left
			)
		);

		let mapping = "tag_bar button3".parse::<ButtonMapping>().unwrap();
		assert_eq!(
			mapping,
			ButtonMapping::new(Click::TagBar, Modifiers::empty(), MouseButton::Right)
		);

		assert_eq!(
			"title left".parse::<ButtonMapping>(),
			Err(ButtonError::InvalidClick("title".to_owned()))
		);
		assert_eq!(
			"root_win super".parse::<ButtonMapping>(),
			Err(ButtonError::MissingButton)
		);
		assert_eq!(
			"root_win left 2".parse::<ButtonMapping>(),
			Err(ButtonError::DuplicateButton("2".to_owned()))
		);
		assert_eq!(
			"root_win hyper left".parse::<ButtonMapping>(),
			Err(ButtonError::Modifier(MappingError::InvalidModifier("hyper".to_owned())))
		);
	}

	#[test]
	fn display_mapping() {
		let mapping = ButtonMapping::new(Click::ClientWin, Modifiers::SUPER, MouseButton::Middle);
		assert_eq!(mapping.to_string(), "client_win super middle");
	}

	#[test]
	fn button_numbers() {
		assert_eq!(MouseButton::from_number(3), Some(MouseButton::Right));
		assert_eq!(MouseButton::from_number(9), None);
		assert_eq!(MouseButton::ScrollDown.number(), 5);
	}
}
