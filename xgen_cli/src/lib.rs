use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Generate UI markup from class facts and fix common markup problems.",
	long_about = "xgen turns the members of a class into UI markup using configurable profiles, \
	              and analyzes existing markup files for common problems it can fix \
	              automatically.\n\nQuick start:\n  xgen init                 Create an xgen.toml \
	              file\n  xgen generate person.json Generate markup for a class\n  xgen analyze    \
	              Report markup problems\n  xgen fix --dry-run        Preview automatic fixes"
)]
pub struct XgenCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output and debug logging.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize xgen in a project by creating a sample `xgen.toml`.
	///
	/// If a config file already exists this command leaves it untouched and
	/// exits successfully.
	Init,
	/// Generate markup for the members of a class.
	///
	/// Reads class facts from a JSON file (`{"name": "Person", "members":
	/// [...]}`) and prints the markup produced by the active profile. With
	/// `--member`, only the named members are generated and the class
	/// grouping element is left out.
	Generate {
		/// JSON file describing the class and its members. Relative paths
		/// are resolved against the project root.
		class: PathBuf,

		/// Name of the profile to use. Overrides `active_profile`.
		#[arg(long)]
		profile: Option<String>,

		/// Pick the profile declared for this project type, e.g. `uwp`.
		#[arg(long)]
		project_type: Option<String>,

		/// Only generate these members. May be repeated.
		#[arg(long = "member", short = 'm')]
		members: Vec<String>,

		/// Text prepended to every line after the first.
		#[arg(long, default_value = "")]
		left_padding: String,

		/// Output format. `json` includes the profile name and summary.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Analyze markup files and report problems.
	///
	/// Exits with a non-zero status code when any error-level diagnostic is
	/// reported. Severities can be changed per directory with an
	/// `xgen-analysis.json` file.
	Analyze {
		/// Project type passed to analyzers that only apply to some
		/// platforms. Defaults to `project_type` from the config.
		#[arg(long)]
		project_type: Option<String>,

		/// Also show hidden and internal diagnostics.
		#[arg(long, default_value_t = false)]
		all: bool,

		/// Output format for analysis results.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Apply every available automatic fix to the project's markup files.
	Fix {
		/// Project type passed to analyzers. Defaults to `project_type` from
		/// the config.
		#[arg(long)]
		project_type: Option<String>,

		/// Print a diff for each file instead of writing changes.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
	/// List the available generation profiles.
	Profiles {
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Check every profile for unknown placeholders and unreachable mappings.
	Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
