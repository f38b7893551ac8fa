use crate::spawn::spawn;
use tagwm_config::{
	Action, Config, Keysym, Modifiers,
	button::{Click, MouseButton},
};

/// what became of a dispatched action
#[derive(Debug, PartialEq)]
pub enum Handled {
	/// the action was a spawn and has been carried out
	Spawned,
	/// the spawn failed, the error has been logged
	Failed,
	/// the action has to be carried out by the window manager
	Forward(Action),
}

/// resolves input against the bindings of a [`Config`]
#[derive(Debug)]
pub struct Dispatcher<'a> {
	config: &'a Config,
	/// the modifier num lock is mapped to
	numlock: Modifiers,
}

impl<'a> Dispatcher<'a> {
	pub fn new(config: &'a Config, numlock: Modifiers) -> Self {
		Dispatcher { config, numlock }
	}

	/// dispatch a key press with the raw x11 modifier `state`
	///
	/// returns [`None`] if nothing is bound
	pub fn key(&self, state: u16, keysym: Keysym, monitor: usize) -> Option<Handled> {
		let mods = Modifiers::clean(state, self.numlock);
		let action = self.config.bind.find_action(mods, keysym)?;

		Some(handle_action(action.clone(), monitor))
	}

	/// dispatch a button press in `click`, with the tag under the pointer if any
	///
	/// a `clicked_tag` beyond the configured tags never matches a binding
	pub fn button(
		&self,
		click: Click,
		state: u16,
		button: MouseButton,
		clicked_tag: Option<usize>,
		monitor: usize,
	) -> Option<Handled> {
		if clicked_tag.is_some_and(|tag| self.config.tags.label(tag).is_none()) {
			return None;
		}

		let mods = Modifiers::clean(state, self.numlock);
		let action = self.config.buttons.find_action(click, mods, button, clicked_tag)?;

		Some(handle_action(action, monitor))
	}
}

/// carry out spawn actions, and hand everything else back
pub fn handle_action(action: Action, monitor: usize) -> Handled {
	match action {
		Action::Spawn(command) => match spawn(&command, monitor) {
			Ok(()) => Handled::Spawned,
			Err(err) => {
				tracing::warn!("failed to spawn {command}: {err}");
				Handled::Failed
			}
		},
		action => Handled::Forward(action),
	}
}

#[cfg(test)]
mod tests {
	use super::{Dispatcher, Handled, handle_action};
	use pretty_assertions::assert_eq;
	use tagwm_config::{
		Action, Command, Config, Keysym, Modifiers, TagMask,
		button::{Click, MouseButton},
	};

	#[test]
	fn forward_non_spawn() {
		assert_eq!(handle_action(Action::Zoom, 0), Handled::Forward(Action::Zoom));
	}

	#[test]
	fn failed_spawn_is_not_fatal() {
		let command = Command::new(["/nonexistent/tagwm-test-program"]);
		assert_eq!(handle_action(Action::Spawn(command), 0), Handled::Failed);
	}

	#[test]
	fn numlock_is_ignored() {
		let config = Config::default();
		let dispatcher = Dispatcher::new(&config, Modifiers::MOD2);

		let state = (Modifiers::SUPER | Modifiers::MOD2 | Modifiers::LOCK).bits();
		let handled = dispatcher.key(state, Keysym::Return, 0);
		assert_eq!(handled, Some(Handled::Forward(Action::Zoom)));

		let unbound = dispatcher.key(Modifiers::SUPER.bits(), Keysym::z, 0);
		assert_eq!(unbound, None);
	}

	#[test]
	fn tag_bar_click() {
		let config = Config::default();
		let dispatcher = Dispatcher::new(&config, Modifiers::MOD2);

		let handled = dispatcher.button(Click::TagBar, 0, MouseButton::Right, Some(2), 0);
		assert_eq!(
			handled,
			Some(Handled::Forward(Action::ToggleView(Some(TagMask::tag(2)))))
		);

		// nine tags, so there is no tag at index 20
		let handled = dispatcher.button(Click::TagBar, 0, MouseButton::Left, Some(20), 0);
		assert_eq!(handled, None);

		let handled = dispatcher.button(Click::TagBar, 0, MouseButton::Left, Some(8), 0);
		assert_eq!(handled, Some(Handled::Forward(Action::View(Some(TagMask::tag(8))))));
	}
}
