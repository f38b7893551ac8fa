use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use owo_colors::OwoColorize;
use std::{fmt::Display, path::PathBuf};

#[derive(Debug)]
pub struct MayfigError {
	pub error: Box<mayfig::Error>,
	pub path: PathBuf,
	pub file: String,
}

/// a table that deserialized, but can't be used
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
	#[error("the modkey is empty")]
	EmptyModkey,
	#[error("no tags configured")]
	NoTags,
	#[error("{0} tags configured, but at most 32 fit into a tag mask")]
	TooManyTags(usize),
	#[error("no layouts configured")]
	NoLayouts,
	#[error("binding {binding:?} references layout {index}, but only {len} layouts exist")]
	LayoutOutOfRange { binding: String, index: usize, len: usize },
	#[error("mfact {0} is outside of 0.05..=0.95")]
	Mfact(f32),
	#[error("window rule {rule} assigns tags {mask:#b} beyond the configured tags")]
	RuleTags { rule: usize, mask: u32 },
	#[error("command {0:?} is empty")]
	EmptyCommand(String),
}

#[derive(Debug)]
pub enum Error {
	IoError(PathBuf, std::io::Error),
	NotFound(PathBuf),
	Mayfig(MayfigError),
	Invalid(ValidationError),
}

impl Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::IoError(path, err) => write!(
				f,
				"{}: {} ({err})",
				"error".bright_red().bold(),
				format_args!("failed to read config {}", path.display()).bold()
			),
			Error::NotFound(path) => write!(
				f,
				"{}: {}",
				"error".bright_red().bold(),
				format_args!("config {} not found", path.display()).bold(),
			),
			Error::Mayfig(mayfig) => write!(f, "{mayfig}"),
			Error::Invalid(err) => write!(
				f,
				"{}: {}",
				"error".bright_red().bold(),
				format_args!("invalid config: {err}").bold(),
			),
		}
	}
}

impl std::error::Error for Error {}

impl Display for MayfigError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let code = self.error.code().to_string();
		let path = self.path.to_string_lossy();

		let message = if let Some(span) = self.error.span() {
			Level::ERROR.primary_title(&code).element(
				Snippet::source(&self.file)
					.path(&path)
					.fold(true)
					.annotation(AnnotationKind::Primary.span(span.range())),
			)
		} else {
			Group::with_title(Level::ERROR.primary_title(&code))
		};

		let renderer = Renderer::styled();
		write!(f, "{}", renderer.render(&[message]))?;

		Ok(())
	}
}

impl From<MayfigError> for Error {
	fn from(value: MayfigError) -> Self {
		Error::Mayfig(value)
	}
}

impl From<ValidationError> for Error {
	fn from(value: ValidationError) -> Self {
		Error::Invalid(value)
	}
}

impl std::error::Error for MayfigError {}
