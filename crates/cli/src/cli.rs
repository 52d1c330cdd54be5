use std::path::PathBuf;

use clap::{Parser, Subcommand};
use qc_protocol::Modality;
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "qc")]
#[command(about = "Drive the medical imaging QC service from the command line")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v debug, -vv trace)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	pub verbose: u8,

	/// Output format
	#[arg(short = 'f', long, global = true, value_enum, default_value_t = OutputFormat::Json)]
	pub format: OutputFormat,

	/// Service origin, without the API prefix
	#[arg(long, global = true, env = "QC_API_BASE_URL")]
	pub base_url: Option<String>,

	/// JSON client configuration file
	#[arg(long, global = true, value_name = "FILE", env = "QC_CONFIG")]
	pub config: Option<PathBuf>,

	/// Persist the session hint and cookie across invocations
	#[arg(long, global = true, value_name = "FILE", env = "QC_STATE_FILE")]
	pub state_file: Option<PathBuf>,

	/// Request timeout in milliseconds
	#[arg(long, global = true, env = "QC_TIMEOUT_MS")]
	pub timeout_ms: Option<u64>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Run operations read as NDJSON from stdin against one shared session
	Batch,

	#[command(flatten)]
	Op(Op),
}

/// A single client operation.
///
/// Parsed from command-line arguments, or from a batch line of the form
/// `{"id": "1", "command": "<name>", "args": {...}}`.
#[derive(Subcommand, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "kebab-case")]
pub enum Op {
	/// Sign in and mark the session authenticated
	Login {
		#[arg(short, long)]
		username: String,
		#[arg(short, long, env = "QC_PASSWORD", hide_env_values = true)]
		password: String,
	},

	/// Sign out and mark the session unauthenticated
	Logout,

	/// Ask the server who the current session belongs to
	Whoami,

	/// Show the local session hint and router location without calling the server
	Status,

	/// Create an account (does not sign in)
	Register {
		#[arg(short, long)]
		username: String,
		#[arg(short, long, env = "QC_PASSWORD", hide_env_values = true)]
		password: String,
		#[arg(short, long)]
		email: String,
		#[arg(long)]
		#[serde(alias = "fullName")]
		full_name: String,
		#[arg(long)]
		#[serde(default)]
		hospital: Option<String>,
		#[arg(long)]
		#[serde(default)]
		department: Option<String>,
	},

	/// Navigate to a route through the access guard
	Open { path: String },

	/// List the route table
	Routes,

	/// Run quality detection on a scan file
	Detect {
		/// head, chest-non-contrast, chest-contrast, coronary-cta or hemorrhage
		modality: Modality,
		file: PathBuf,
		#[arg(long)]
		#[serde(default, alias = "patientName")]
		patient_name: Option<String>,
		#[arg(long)]
		#[serde(default, alias = "examId")]
		exam_id: Option<String>,
	},

	/// Recent hemorrhage analyses of the current user
	History {
		#[arg(short, long)]
		#[serde(default)]
		limit: Option<u32>,
	},

	/// Headline QC statistics
	SummaryStats,

	/// Daily issue counts
	SummaryTrend {
		#[arg(short, long)]
		#[serde(default)]
		days: Option<u32>,
	},

	/// Issue counts per category
	SummaryDistribution,

	/// Paged list of recent issues
	SummaryRecent {
		#[arg(long)]
		#[serde(default)]
		page: Option<u32>,
		#[arg(long)]
		#[serde(default)]
		limit: Option<u32>,
		#[arg(short, long)]
		#[serde(default)]
		query: Option<String>,
		#[arg(short, long)]
		#[serde(default)]
		status: Option<String>,
	},
}

impl Op {
	/// Name used in the `command` field of results.
	pub fn name(&self) -> &'static str {
		match self {
			Op::Login { .. } => "login",
			Op::Logout => "logout",
			Op::Whoami => "whoami",
			Op::Status => "status",
			Op::Register { .. } => "register",
			Op::Open { .. } => "open",
			Op::Routes => "routes",
			Op::Detect { .. } => "detect",
			Op::History { .. } => "history",
			Op::SummaryStats => "summary-stats",
			Op::SummaryTrend { .. } => "summary-trend",
			Op::SummaryDistribution => "summary-distribution",
			Op::SummaryRecent { .. } => "summary-recent",
		}
	}
}
