use tracing_subscriber::EnvFilter;

/// Default filter for a `-v` count. `RUST_LOG` takes precedence when set.
fn default_directives(verbose: u8) -> &'static str {
	match verbose {
		0 => "warn",
		1 => "warn,qc=debug",
		_ => "debug,qc=trace",
	}
}

/// Installs the stderr subscriber. Stdout is reserved for command results.
pub fn init(verbose: u8) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
		.try_init();
}

#[cfg(test)]
mod tests {
	use std::io;
	use std::sync::{Arc, Mutex};

	use super::*;

	#[derive(Clone, Default)]
	struct Captured(Arc<Mutex<Vec<u8>>>);

	impl io::Write for Captured {
		fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
			self.0.lock().unwrap().extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn verbosity_raises_client_level() {
		assert_eq!(default_directives(0), "warn");
		assert!(default_directives(1).contains("qc=debug"));
		assert!(default_directives(5).contains("qc=trace"));
	}

	#[test]
	fn directives_parse() {
		for verbose in 0..3 {
			assert!(EnvFilter::try_new(default_directives(verbose)).is_ok());
		}
	}

	#[test]
	fn component_targets_are_filterable() {
		let captured = Captured::default();
		let writer = captured.clone();
		let subscriber = tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::new("warn,qc.transport=debug"))
			.with_writer(move || writer.clone())
			.with_ansi(false)
			.finish();
		tracing::subscriber::with_default(subscriber, || {
			tracing::debug!(target: "qc.transport", "request sent");
			tracing::debug!(target: "qc.router", "transition queued");
		});

		let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
		assert!(output.contains("request sent"));
		assert!(!output.contains("transition queued"));
	}
}
