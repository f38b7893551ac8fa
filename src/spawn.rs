use std::{
	io,
	os::unix::process::CommandExt,
	process::{Command, Stdio},
};
use tagwm_config::command;

/// spawn `command` as a disowned child on the focused `monitor`
///
/// returns once the intermediate child exited, the program itself is never waited on
pub fn spawn(command: &command::Command, monitor: usize) -> io::Result<()> {
	let argv = command.argv(monitor);
	let Some((program, args)) = argv.split_first() else {
		return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty command"));
	};

	tracing::debug!(?argv, "spawn");

	let mut command = Command::new(program);
	command.args(args);
	command.stdin(Stdio::null());
	command.stdout(Stdio::null());
	command.stderr(Stdio::null());

	// SAFETY: the hook only calls the async-signal-safe fork, setsid and _exit
	unsafe {
		// double fork, so the child is reparented and never becomes a zombie
		command.pre_exec(|| {
			match libc::fork() {
				-1 => return Err(io::Error::last_os_error()),
				0 => (),
				_ => libc::_exit(0),
			}

			if libc::setsid() == -1 {
				return Err(io::Error::last_os_error());
			}

			Ok(())
		});
	}

	command.spawn()?.wait()?;

	Ok(())
}
