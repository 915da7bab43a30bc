use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use serde::Serialize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;
use xgen_cli::Commands;
use xgen_cli::OutputFormat;
use xgen_cli::XgenCli;
use xgen_core::AnalyzerRegistry;
use xgen_core::ClassDescriptor;
use xgen_core::FileDiagnostics;
use xgen_core::GeneratedOutput;
use xgen_core::Generator;
use xgen_core::MarkupDiagnostic;
use xgen_core::ScanOptions;
use xgen_core::Severity;
use xgen_core::SeverityOverrides;
use xgen_core::XgenConfig;
use xgen_core::analyze_project;
use xgen_core::compute_fixes;
use xgen_core::write_fixes;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "XGEN_LOG";

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,cyan) => {
		if color_enabled() {
			format!("{}", $text.cyan())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
	let args = XgenCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Generate {
			class,
			profile,
			project_type,
			members,
			left_padding,
			format,
		}) => {
			run_generate(
				&args,
				&GenerateRequest {
					class,
					profile: profile.as_deref(),
					project_type: project_type.as_deref(),
					members,
					left_padding,
					format: *format,
				},
			)
		}
		Some(Commands::Analyze {
			project_type,
			all,
			format,
		}) => run_analyze(&args, project_type.as_deref(), *all, *format),
		Some(Commands::Fix {
			project_type,
			dry_run,
		}) => run_fix(&args, project_type.as_deref(), *dry_run),
		Some(Commands::Profiles { format }) => run_profiles(&args, *format),
		Some(Commands::Validate) => run_validate(&args),
		None => {
			eprintln!("No subcommand specified. Run `xgen --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<xgen_core::XgenError>() {
			Ok(xgen_err) => {
				let report: miette::Report = (*xgen_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `XGEN_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose { "xgen_core=debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.try_init()
		.ok();
}

fn resolve_root(args: &XgenCli) -> PathBuf {
	let root = args
		.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
	tracing::debug!(root = %root.display(), "resolved project root");
	root
}

const SAMPLE_CONFIG: &str = r#"# xgen configuration

# Profile used by `xgen generate` when `--profile` is not given.
# active_profile = "UWP"

# Picks the profile declared for this project type when no profile is named.
# Also passed to analyzers that only apply to some platforms.
# project_type = "uwp"

# Extra profile files (json, toml or yaml), relative to this file.
# profile_paths = ["profiles/team.yaml"]

# Spaces per nesting level in generated markup.
indent = 2

[analysis]
include = ["**/*.xaml"]
exclude = ["bin/", "obj/"]

# Inline profiles replace shipped profiles with the same name.
# [[profiles]]
# name = "Minimal"
# class_grouping = "StackPanel"
# fallback_output = "<TextBlock Text=\"{Binding $name$}\" />"
#
# [[profiles.mappings]]
# type = "string"
# if_read_only = false
# output = "<TextBox Header=\"$namewithspaces$\" Text=\"{Binding $name$, Mode=TwoWay}\" />"
"#;

fn run_init(args: &XgenCli) -> CliResult {
	let root = resolve_root(args);

	if let Some(existing) = XgenConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join("xgen.toml");
	std::fs::write(&config_path, SAMPLE_CONFIG)?;
	println!("Created {}", config_path.display());
	println!();
	println!("Next steps:");
	println!("  1. Run `xgen profiles` to see the available profiles");
	println!("  2. Run `xgen generate <class.json>` to generate markup");
	println!("  3. Run `xgen analyze` to check your markup files");

	Ok(())
}

struct GenerateRequest<'a> {
	class: &'a Path,
	profile: Option<&'a str>,
	project_type: Option<&'a str>,
	members: &'a [String],
	left_padding: &'a str,
	format: OutputFormat,
}

fn run_generate(args: &XgenCli, request: &GenerateRequest<'_>) -> CliResult {
	let root = resolve_root(args);
	let config = XgenConfig::load_or_default(&root)?;
	let class_path = if request.class.is_absolute() {
		request.class.to_path_buf()
	} else {
		root.join(request.class)
	};
	let class = ClassDescriptor::load(&class_path)?;

	let options = config
		.generation_options()
		.with_left_padding(request.left_padding);
	let generator = Generator::new(config.profile_set(&root)?)?.with_options(options);
	let selection = config.selection(request.profile, request.project_type);

	let generated = if request.members.is_empty() {
		generator.generate_for_class(selection, Some(&class))?
	} else {
		for name in request.members {
			if !class.members.iter().any(|member| &member.name == name) {
				eprintln!(
					"{} `{}` has no member named `{name}`",
					colored!("warning:", yellow),
					class.name
				);
			}
		}

		let selected: Vec<_> = class
			.members
			.iter()
			.filter(|member| request.members.contains(&member.name))
			.cloned()
			.collect();
		generator.generate_for_selection(selection, &selected)?
	};

	print_generated(args, generated.as_ref(), request.format);
	Ok(())
}

fn print_generated(args: &XgenCli, generated: Option<&GeneratedOutput>, format: OutputFormat) {
	match (format, generated) {
		(OutputFormat::Json, None) => println!("{}", serde_json::json!({ "generated": false })),
		(OutputFormat::Json, Some(generated)) => {
			let output = serde_json::json!({
				"generated": true,
				"profile": generated.profile,
				"summary": generated.summary,
				"output": generated.output,
			});
			println!("{output}");
		}
		(OutputFormat::Text, None) => eprintln!("Nothing to generate: no accessible members."),
		(OutputFormat::Text, Some(generated)) => {
			println!("{}", generated.output);
			if args.verbose {
				eprintln!(
					"Generated {} using profile `{}`",
					generated.summary, generated.profile
				);
			}
		}
	}
}

#[derive(Serialize)]
struct DiagnosticEntry<'a> {
	file: String,
	code: &'a str,
	severity: Severity,
	message: &'a str,
	line: usize,
	column: usize,
	internal: bool,
	fixable: bool,
}

fn run_analyze(
	args: &XgenCli,
	project_type: Option<&str>,
	all: bool,
	format: OutputFormat,
) -> CliResult {
	let root = resolve_root(args);
	let config = XgenConfig::load(&root)?;
	let options = ScanOptions::from_config(config.as_ref())?;
	let project_type =
		project_type.or_else(|| config.as_ref().and_then(|c| c.project_type.as_deref()));
	let registry = AnalyzerRegistry::with_defaults();
	let overrides = SeverityOverrides::new();

	let results = analyze_project(&root, &options, &registry, project_type, &overrides)?;
	let visible = |diagnostic: &&MarkupDiagnostic| all || diagnostic.is_shown_by_default();
	let has_errors = results
		.iter()
		.flat_map(|result| &result.diagnostics)
		.any(MarkupDiagnostic::is_error);

	match format {
		OutputFormat::Json => {
			let entries: Vec<DiagnosticEntry<'_>> = results
				.iter()
				.flat_map(|result| {
					let file = make_relative(&result.file, &root);
					result
						.diagnostics
						.iter()
						.filter(visible)
						.map(move |diagnostic| {
							DiagnosticEntry {
								file: file.clone(),
								code: &diagnostic.code,
								severity: diagnostic.severity,
								message: &diagnostic.message,
								line: diagnostic.line,
								column: diagnostic.column,
								internal: diagnostic.internal,
								fixable: diagnostic.fix.is_some(),
							}
						})
				})
				.collect();
			println!(
				"{}",
				serde_json::json!({ "ok": !has_errors, "diagnostics": entries })
			);
		}
		OutputFormat::Text => print_diagnostics(&results, &root, &visible),
	}

	if has_errors {
		process::exit(1);
	}

	Ok(())
}

fn print_diagnostics(
	results: &[FileDiagnostics],
	root: &Path,
	visible: &dyn Fn(&&MarkupDiagnostic) -> bool,
) {
	let mut problems = 0;
	let mut files = 0;

	for result in results {
		let shown: Vec<_> = result.diagnostics.iter().filter(visible).collect();
		if shown.is_empty() {
			continue;
		}

		files += 1;
		let rel = make_relative(&result.file, root);
		for diagnostic in shown {
			problems += 1;
			let severity = match diagnostic.severity {
				Severity::Error => colored!("error", red),
				Severity::Warning => colored!("warning", yellow),
				Severity::Suggestion | Severity::Hidden => colored!(diagnostic.severity, cyan),
			};
			let fixable = if diagnostic.fix.is_some() {
				" (fixable)"
			} else {
				""
			};
			println!(
				"{rel}:{}:{} {severity} [{}] {}{fixable}",
				diagnostic.line, diagnostic.column, diagnostic.code, diagnostic.message
			);
		}
	}

	if problems == 0 {
		println!("No problems found.");
	} else {
		println!();
		println!(
			"{}",
			colored!(format!("{problems} problem(s) in {files} file(s)"), bold)
		);
	}
}

fn run_fix(args: &XgenCli, project_type: Option<&str>, dry_run: bool) -> CliResult {
	let root = resolve_root(args);
	let config = XgenConfig::load(&root)?;
	let options = ScanOptions::from_config(config.as_ref())?;
	let project_type =
		project_type.or_else(|| config.as_ref().and_then(|c| c.project_type.as_deref()));
	let registry = AnalyzerRegistry::with_defaults();
	let overrides = SeverityOverrides::new();

	let fixes = compute_fixes(&root, &options, &registry, project_type, &overrides)?;
	if fixes.is_empty() {
		println!("No fixes to apply.");
		return Ok(());
	}

	if dry_run {
		println!("Dry run: would fix {} file(s):", fixes.len());
		for fix in &fixes {
			println!();
			println!("{}", colored!(make_relative(&fix.file, &root), bold));
			for change in &fix.changes {
				println!("  * {change}");
			}
			print_diff(&fix.original, &fix.updated);
		}
		return Ok(());
	}

	write_fixes(&fixes)?;
	println!("Fixed {} file(s).", fixes.len());
	for fix in &fixes {
		println!("  {}", make_relative(&fix.file, &root));
		if args.verbose {
			for change in &fix.changes {
				println!("    * {change}");
			}
		}
	}

	Ok(())
}

fn run_profiles(args: &XgenCli, format: OutputFormat) -> CliResult {
	let root = resolve_root(args);
	let config = XgenConfig::load_or_default(&root)?;
	let generator = Generator::new(config.profile_set(&root)?)?;
	let active = generator
		.profile(config.selection(None, None))
		.ok()
		.map(|profile| profile.name.clone());

	match format {
		OutputFormat::Json => {
			let entries: Vec<serde_json::Value> = generator
				.profiles()
				.iter()
				.map(|profile| {
					serde_json::json!({
						"name": profile.name,
						"description": profile.description,
						"project_type": profile.project_type,
						"class_grouping": profile.class_grouping,
						"mappings": profile.mappings.len(),
						"active": active.as_deref() == Some(profile.name.as_str()),
					})
				})
				.collect();
			println!("{}", serde_json::Value::Array(entries));
		}
		OutputFormat::Text => {
			for profile in generator.profiles().iter() {
				let marker = if active.as_deref() == Some(profile.name.as_str()) {
					colored!("*", green)
				} else {
					" ".to_string()
				};
				let project_type = profile
					.project_type
					.as_deref()
					.map(|project_type| format!(" [{project_type}]"))
					.unwrap_or_default();
				println!(
					"{marker} {}{project_type} ({} mapping(s))",
					colored!(profile.name, bold),
					profile.mappings.len()
				);
				if args.verbose && !profile.description.is_empty() {
					println!("    {}", profile.description);
				}
			}
		}
	}

	Ok(())
}

fn run_validate(args: &XgenCli) -> CliResult {
	let root = resolve_root(args);
	let config = XgenConfig::load_or_default(&root)?;
	let profiles = config.profile_set(&root)?;
	let issues = profiles.validate();

	if issues.is_empty() {
		println!("All {} profile(s) are valid.", profiles.len());
		return Ok(());
	}

	for issue in &issues {
		eprintln!("{} {issue}", colored!("error:", red));
	}
	eprintln!();
	eprintln!("{} issue(s) found.", issues.len());
	process::exit(1);
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for hunk in diff.unified_diff().context_radius(2).iter_hunks() {
		println!("{}", colored!(hunk.header(), cyan));
		for change in hunk.iter_changes() {
			let line = change.to_string_lossy();
			let line = line.trim_end_matches('\n');
			match change.tag() {
				ChangeTag::Delete => println!("{}", colored!(format!("-{line}"), red)),
				ChangeTag::Insert => println!("{}", colored!(format!("+{line}"), green)),
				ChangeTag::Equal => println!(" {line}"),
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
