use owo_colors::OwoColorize;
use std::{fmt::Display, io::Write as _, process::Termination};

pub enum Term {
	/// tagwm exited successfully
	Ok,
	/// the config couldn't be loaded
	Config(tagwm_config::Error),
	/// the queried binding or layout couldn't be parsed
	InvalidInput(String),
	/// there is no command with that name
	UnknownCommand(String),
	/// spawning a command failed
	Spawn(String, std::io::Error),
	/// serializing output failed
	Json(serde_json::Error),
}

impl Termination for Term {
	fn report(self) -> std::process::ExitCode {
		if let Term::Ok = self {
			std::process::ExitCode::SUCCESS
		} else {
			let mut stderr = anstream::stderr();
			let _ = write!(stderr, "{}", self);

			std::process::ExitCode::FAILURE
		}
	}
}

impl Display for Term {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Term::Ok => Ok(()),
			Term::Config(err) => writeln!(f, "{err}"),
			Term::InvalidInput(err) => {
				writeln!(f, "{}: {}", "error".red().bold(), "invalid input".bold())?;
				writeln!(f, "  {} {err}", "::".blue().bold())
			}
			Term::UnknownCommand(name) => {
				writeln!(f, "{}: {}", "error".red().bold(), "unknown command".bold())?;
				writeln!(f, "  {} no command named {name:?}", "::".blue().bold())?;
				writeln!(f, "  {} see `tagwm commands`", "::".blue().bold())
			}
			Term::Spawn(command, err) => {
				writeln!(f, "{}: {}", "error".red().bold(), "failed to spawn".bold())?;
				writeln!(f, "  {} {command}: {err}", "::".blue().bold())
			}
			Term::Json(err) => {
				writeln!(f, "{}: {}", "error".red().bold(), "failed to serialize".bold())?;
				writeln!(f, "  {} {err}", "::".blue().bold())
			}
		}
	}
}
