use std::fs::{self, File};
use tracing::Subscriber;
use tracing_subscriber::{
	EnvFilter, Layer, fmt,
	layer::{Filter, SubscriberExt},
	registry::LookupSpan,
	util::SubscriberInitExt,
};

fn iso8601() -> String {
	let time = jiff::Zoned::now();
	time.strftime("%Y-%m-%dT%H-%M-%S tagwm").to_string()
}

const DEFAULT_LOG_FILTER: &str = "warn,tagwm=debug,tagwm_config=debug";

fn default_filter<F>() -> impl Filter<F> {
	let directives = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned());
	EnvFilter::builder().parse_lossy(directives)
}

fn log_file(ext: &str) -> Option<File> {
	let local = dirs::data_dir().unwrap_or_else(std::env::temp_dir);

	let dir = local.join("tagwm");
	fs::create_dir_all(&dir).ok()?;

	let date = iso8601();
	let path = dir.join(date + ext);

	File::create(path).ok()
}

fn with_file<F>() -> Option<impl Layer<F>>
where
	F: Subscriber + for<'span> LookupSpan<'span>,
{
	let file = log_file(".log")?;

	let layer = fmt::layer()
		.with_writer(file)
		.with_ansi(false)
		.with_filter(default_filter());
	Some(layer)
}

/// install the global subscriber, `to_file` additionally logs into a new file
pub fn setup(to_file: bool) {
	let registry = tracing_subscriber::registry();

	let stderr = fmt::layer()
		.with_writer(std::io::stderr)
		.with_filter(default_filter());
	let registry = registry.with(stderr);

	// an Option<Layer> is a no-op layer if the log file couldn't be created
	let file = if to_file { with_file() } else { None };
	let registry = registry.with(file);

	registry.init();

	log_panics::init();
}
