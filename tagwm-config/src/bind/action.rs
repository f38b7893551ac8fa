use crate::{command::Command, tags::TagMask};
use serde::{
	Deserialize, Serialize,
	de::{EnumAccess, IgnoredAny, IntoDeserializer, MapAccess, VariantAccess, Visitor},
};
use std::{fmt::Display, marker::PhantomData};

/// an action the window manager performs when a binding fires
///
/// tag actions without an explicit mask act on the previous tagset,
/// or, for tag bar buttons, on the tag under the pointer.
///
/// actions whose argument is optional may be written without it,
/// so both `"view"` and `{ "view": 4 }` deserialize.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	/// spawn a detached process
	Spawn(Command),

	ToggleBar,
	/// toggle the gaps between windows
	ToggleGaps,

	/// move focus through the client stack
	FocusStack(i32),
	/// change the number of clients in the master area
	#[serde(rename = "inc_nmaster")]
	IncNMaster(i32),
	/// change the master area factor
	SetMfact(f32),
	/// move the focused client to the master area
	Zoom,

	View(Option<TagMask>),
	ToggleView(Option<TagMask>),
	Tag(Option<TagMask>),
	ToggleTag(Option<TagMask>),

	KillClient,
	/// select a layout by index, or swap back to the previous layout
	SetLayout(Option<usize>),
	ToggleFullscreen,
	ToggleFloating,

	/// focus another monitor
	FocusMon(i32),
	/// move the focused client to another monitor
	TagMon(i32),

	MoveMouse,
	ResizeMouse,

	Quit,
}

impl Action {
	/// fill an unset tag mask with `mask`
	pub fn with_default_tags(self, mask: TagMask) -> Action {
		match self {
			Action::View(None) => Action::View(Some(mask)),
			Action::ToggleView(None) => Action::ToggleView(Some(mask)),
			Action::Tag(None) => Action::Tag(Some(mask)),
			Action::ToggleTag(None) => Action::ToggleTag(Some(mask)),
			action => action,
		}
	}
}

#[derive(Deserialize)]
#[serde(variant_identifier, rename_all = "snake_case")]
enum ActionName {
	Spawn,
	ToggleBar,
	ToggleGaps,
	FocusStack,
	#[serde(rename = "inc_nmaster")]
	IncNMaster,
	SetMfact,
	Zoom,
	View,
	ToggleView,
	Tag,
	ToggleTag,
	#[serde(alias = "close")]
	KillClient,
	SetLayout,
	ToggleFullscreen,
	ToggleFloating,
	FocusMon,
	TagMon,
	MoveMouse,
	ResizeMouse,
	Quit,
}

/// where the argument of an action comes from
trait Args<'v> {
	type Error: serde::de::Error;

	fn arg<T: Deserialize<'v>>(self) -> Result<T, Self::Error>;
	fn unit(self) -> Result<(), Self::Error>;
}

/// a bare action name, optional arguments are [`None`]
struct NoArgs<E>(PhantomData<E>);

impl<'v, E: serde::de::Error> Args<'v> for NoArgs<E> {
	type Error = E;

	fn arg<T: Deserialize<'v>>(self) -> Result<T, E> {
		T::deserialize(().into_deserializer())
	}

	fn unit(self) -> Result<(), E> {
		Ok(())
	}
}

/// the value of a single entry map like `{ "view": 4 }`
struct MapArgs<A>(A);

impl<'v, A: MapAccess<'v>> Args<'v> for MapArgs<A> {
	type Error = A::Error;

	fn arg<T: Deserialize<'v>>(mut self) -> Result<T, A::Error> {
		self.0.next_value()
	}

	fn unit(mut self) -> Result<(), A::Error> {
		self.0.next_value::<IgnoredAny>().map(|_| ())
	}
}

/// the variant data of a self-describing enum
struct VariantArgs<V>(V);

impl<'v, V: VariantAccess<'v>> Args<'v> for VariantArgs<V> {
	type Error = V::Error;

	fn arg<T: Deserialize<'v>>(self) -> Result<T, V::Error> {
		self.0.newtype_variant()
	}

	fn unit(self) -> Result<(), V::Error> {
		self.0.unit_variant()
	}
}

impl ActionName {
	fn with_args<'v, A: Args<'v>>(self, args: A) -> Result<Action, A::Error> {
		let action = match self {
			ActionName::Spawn => Action::Spawn(args.arg()?),

			ActionName::ToggleBar => args.unit().map(|()| Action::ToggleBar)?,
			ActionName::ToggleGaps => args.unit().map(|()| Action::ToggleGaps)?,

			ActionName::FocusStack => Action::FocusStack(args.arg()?),
			ActionName::IncNMaster => Action::IncNMaster(args.arg()?),
			ActionName::SetMfact => Action::SetMfact(args.arg()?),
			ActionName::Zoom => args.unit().map(|()| Action::Zoom)?,

			ActionName::View => Action::View(args.arg()?),
			ActionName::ToggleView => Action::ToggleView(args.arg()?),
			ActionName::Tag => Action::Tag(args.arg()?),
			ActionName::ToggleTag => Action::ToggleTag(args.arg()?),

			ActionName::KillClient => args.unit().map(|()| Action::KillClient)?,
			ActionName::SetLayout => Action::SetLayout(args.arg()?),
			ActionName::ToggleFullscreen => args.unit().map(|()| Action::ToggleFullscreen)?,
			ActionName::ToggleFloating => args.unit().map(|()| Action::ToggleFloating)?,

			ActionName::FocusMon => Action::FocusMon(args.arg()?),
			ActionName::TagMon => Action::TagMon(args.arg()?),

			ActionName::MoveMouse => args.unit().map(|()| Action::MoveMouse)?,
			ActionName::ResizeMouse => args.unit().map(|()| Action::ResizeMouse)?,

			ActionName::Quit => args.unit().map(|()| Action::Quit)?,
		};

		Ok(action)
	}
}

impl<'de> Deserialize<'de> for Action {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_any(ActionVis)
	}
}

struct ActionVis;

impl<'v> Visitor<'v> for ActionVis {
	type Value = Action;

	fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("an action")
	}

	fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
		let name = ActionName::deserialize(v.into_deserializer())?;
		name.with_args(NoArgs(PhantomData))
	}

	fn visit_map<A: MapAccess<'v>>(self, mut map: A) -> Result<Self::Value, A::Error> {
		let Some(name) = map.next_key::<ActionName>()? else {
			return Err(serde::de::Error::invalid_length(0, &self));
		};
		let action = name.with_args(MapArgs(&mut map))?;

		if map.next_key::<IgnoredAny>()?.is_some() {
			return Err(serde::de::Error::custom("expected a single action"));
		}

		Ok(action)
	}

	fn visit_enum<A: EnumAccess<'v>>(self, data: A) -> Result<Self::Value, A::Error> {
		let (name, variant) = data.variant::<ActionName>()?;
		name.with_args(VariantArgs(variant))
	}
}

impl Display for Action {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		fn tags(f: &mut std::fmt::Formatter<'_>, name: &str, mask: &Option<TagMask>) -> std::fmt::Result {
			match mask {
				Some(mask) => write!(f, "{name} {mask}"),
				None => f.write_str(name),
			}
		}

		match self {
			Action::Spawn(command) => write!(f, "spawn {command}"),

			Action::ToggleBar => f.write_str("toggle_bar"),
			Action::ToggleGaps => f.write_str("toggle_gaps"),

			Action::FocusStack(i) => write!(f, "focus_stack {i:+}"),
			Action::IncNMaster(i) => write!(f, "inc_nmaster {i:+}"),
			Action::SetMfact(mfact) => write!(f, "set_mfact {mfact:+}"),
			Action::Zoom => f.write_str("zoom"),

			Action::View(mask) => tags(f, "view", mask),
			Action::ToggleView(mask) => tags(f, "toggle_view", mask),
			Action::Tag(mask) => tags(f, "tag", mask),
			Action::ToggleTag(mask) => tags(f, "toggle_tag", mask),

			Action::KillClient => f.write_str("kill_client"),
			Action::SetLayout(Some(layout)) => write!(f, "set_layout {layout}"),
			Action::SetLayout(None) => f.write_str("set_layout"),
			Action::ToggleFullscreen => f.write_str("toggle_fullscreen"),
			Action::ToggleFloating => f.write_str("toggle_floating"),

			Action::FocusMon(i) => write!(f, "focus_mon {i:+}"),
			Action::TagMon(i) => write!(f, "tag_mon {i:+}"),

			Action::MoveMouse => f.write_str("move_mouse"),
			Action::ResizeMouse => f.write_str("resize_mouse"),

			Action::Quit => f.write_str("quit"),
		}
	}
}
