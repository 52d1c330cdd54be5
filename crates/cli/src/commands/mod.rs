mod batch;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use qc::detect::ScanUpload;
use qc::router::RouteTarget;
use qc::session::{FileSessionStore, MemorySessionStore};
use qc::{App, ClientConfig, SessionStore};
use qc_protocol::{Credentials, RecentIssuesQuery, Registration};
use serde_json::{Value, json};
use tracing::debug;

use crate::cli::{Cli, Commands, Op};
use crate::error::Result;
use crate::output::{DiagnosticLevel, EffectiveConfig, ResultBuilder, SessionSummary, print_result};

/// Runs the parsed command line. Returns whether the command succeeded.
pub async fn dispatch(cli: Cli) -> Result<bool> {
	let app = start_app(&cli)?;
	match cli.command {
		Commands::Batch => {
			batch::run_batch(&app).await?;
			Ok(true)
		}
		Commands::Op(op) => {
			let result = run_one(&app, op, None)
				.await
				.config(EffectiveConfig {
					api_root: app.transport().api_root().to_string(),
					timeout_ms: app.transport().timeout().as_millis() as u64,
					state_file: cli.state_file.clone(),
				})
				.build();
			print_result(&result, cli.format);
			Ok(result.ok)
		}
	}
}

/// Layers configuration: file or environment first, then command-line flags.
fn load_config(cli: &Cli) -> Result<ClientConfig> {
	let mut config = match &cli.config {
		Some(path) => ClientConfig::load(path)?,
		None => ClientConfig::from_env()?,
	};
	if let Some(base_url) = &cli.base_url {
		config.base_url = base_url.clone();
	}
	if let Some(timeout_ms) = cli.timeout_ms {
		config.timeout_ms = timeout_ms;
	}
	Ok(config)
}

fn open_store(state_file: Option<&Path>) -> Arc<dyn SessionStore> {
	match state_file {
		Some(path) => Arc::new(FileSessionStore::open(path)),
		None => Arc::new(MemorySessionStore::new()),
	}
}

fn start_app(cli: &Cli) -> Result<App> {
	let config = load_config(cli)?;
	debug!(target: "qc.cli", base_url = %config.base_url, timeout_ms = config.timeout_ms, "starting client");
	let app = App::builder(config).store(open_store(cli.state_file.as_deref())).start()?;
	Ok(app)
}

/// Executes one operation, then performs any transition it queued.
pub(crate) async fn run_one(app: &App, op: Op, id: Option<String>) -> ResultBuilder<Value> {
	let started = Instant::now();
	let command = op.name();
	let outcome = execute(app, op).await;

	let mut builder = ResultBuilder::new(command).id(id).started_at(started);
	match app.settle().await {
		Ok(Some(nav)) => {
			builder = builder.diagnostic_with_source(DiagnosticLevel::Warning, format!("session lost; moved to {}", nav.path), "router");
		}
		Ok(None) => {}
		Err(err) => {
			builder = builder.diagnostic_with_source(DiagnosticLevel::Error, format!("pending navigation failed: {err}"), "router");
		}
	}

	builder = match outcome {
		Ok(data) => builder.data(data),
		Err(err) => builder.command_error(err.to_command_error()),
	};
	builder.session(session_summary(app))
}

fn session_summary(app: &App) -> SessionSummary {
	let session = app.session();
	SessionSummary {
		state: session.authenticated,
		user: session.profile.map(|p| p.username),
		location: app.router().current(),
	}
}

async fn execute(app: &App, op: Op) -> Result<Value> {
	let value = match op {
		Op::Login { username, password } => {
			let identity = app.auth().login(&Credentials::new(username, password)).await?;
			serde_json::to_value(identity)?
		}
		Op::Logout => serde_json::to_value(app.auth().logout().await?)?,
		Op::Whoami => serde_json::to_value(app.auth().current().await?)?,
		Op::Status => {
			let session = app.session();
			json!({
				"state": session.authenticated,
				"profile": session.profile,
				"location": app.router().current(),
				"history": app.router().history(),
			})
		}
		Op::Register {
			username,
			password,
			email,
			full_name,
			hospital,
			department,
		} => {
			let registration = Registration {
				username,
				password,
				email,
				full_name,
				hospital,
				department,
			};
			serde_json::to_value(app.auth().register(&registration).await?)?
		}
		Op::Open { path } => serde_json::to_value(app.navigate(&path).await?)?,
		Op::Routes => {
			let routes: Vec<Value> = app
				.router()
				.table()
				.routes()
				.iter()
				.map(|route| {
					let target = match route.target {
						RouteTarget::View(view) => json!({ "view": view.to_string() }),
						RouteTarget::Redirect(to) => json!({ "redirect": to }),
					};
					json!({ "path": route.path, "access": route.access, "target": target })
				})
				.collect();
			Value::Array(routes)
		}
		Op::Detect {
			modality,
			file,
			patient_name,
			exam_id,
		} => {
			let mut upload = ScanUpload::from_path(&file).await?;
			if let Some(name) = patient_name {
				upload = upload.with_patient_name(name);
			}
			if let Some(exam_id) = exam_id {
				upload = upload.with_exam_id(exam_id);
			}
			let report = app.detect(modality, &upload).await?;
			json!({
				"modality": modality,
				"mode": app.detection().mode_for(modality),
				"file": upload.file_name,
				"passed": report.passed(),
				"report": report,
			})
		}
		Op::History { limit } => serde_json::to_value(app.quality().hemorrhage_history(limit).await?)?,
		Op::SummaryStats => serde_json::to_value(app.summary().stats().await?)?,
		Op::SummaryTrend { days } => serde_json::to_value(app.summary().trend(days).await?)?,
		Op::SummaryDistribution => serde_json::to_value(app.summary().distribution().await?)?,
		Op::SummaryRecent { page, limit, query, status } => {
			let query = RecentIssuesQuery { page, limit, query, status };
			serde_json::to_value(app.summary().recent(&query).await?)?
		}
	};
	Ok(value)
}

