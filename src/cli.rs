//! Command-line interface for rulesnip.

use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::detect::{collect_files, DetectorRegistry, Runner};
use crate::report;
use crate::rules::{self, RuleSet};
use crate::tokenize::{format_tokens, tokenize};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Default rule file names to search for.
const DEFAULT_RULE_NAMES: &[&str] = &["rulesnip.yaml", "rules.yaml", "rules.csv"];

/// Rule-driven extraction of annotated Java code snippets.
///
/// rulesnip walks a Java source tree, matches every declaration, statement
/// and expression against a rule set, and emits the code fragments each rule
/// cares about, tagged with the rule, for a downstream reviewer.
#[derive(Parser)]
#[command(name = "rulesnip")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Whether the selected command asked for debug logging.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Commands::Extract(args) => args.verbose,
            _ => false,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract rule-annotated snippets from Java sources
    #[command(visible_alias = "run")]
    Extract(ExtractArgs),
    /// Create a new rule file from a template
    Init(InitArgs),
    /// Print the word tokens of identifiers
    Tokenize(TokenizeArgs),
}

/// Arguments for the extract command.
#[derive(Parser)]
pub struct ExtractArgs {
    /// Path to scan (file or directory)
    pub path: PathBuf,

    /// Path to the rule file, YAML or CSV (default: auto-discover)
    #[arg(short, long)]
    pub rules: Option<PathBuf>,

    /// Output format: json or pretty
    #[arg(short, long, default_value = "json")]
    pub format: String,

    /// Write the JSON report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Show a progress bar on stderr
    #[arg(long)]
    pub progress: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "rulesnip.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "minimal")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// Arguments for the tokenize command.
#[derive(Parser)]
pub struct TokenizeArgs {
    /// Identifiers to split
    #[arg(required = true)]
    pub names: Vec<String>,
}

/// Available rule-set templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

static TEMPLATES: &[Template] = &[
    Template {
        name: "minimal",
        description: "A few naming, exception and logging rules to start from",
        content: include_str!("templates/minimal.yaml"),
    },
    Template {
        name: "full",
        description: "Every built-in rule with all settings spelled out",
        content: include_str!("templates/full.yaml"),
    },
];

/// Discover a rule file in `dir`.
fn discover_rules(dir: &Path) -> anyhow::Result<PathBuf> {
    for name in DEFAULT_RULE_NAMES {
        let path = dir.join(name);
        if path.exists() {
            return Ok(path);
        }
    }
    anyhow::bail!(
        "no rule file found (looked for {})",
        DEFAULT_RULE_NAMES.join(", ")
    )
}

/// Run the extract command.
pub fn run_extract(args: &ExtractArgs) -> anyhow::Result<i32> {
    if !report::FORMATS.contains(&args.format.as_str()) {
        eprintln!(
            "Error: invalid format {:?}, must be one of: {}",
            args.format,
            report::FORMATS.join(", ")
        );
        return Ok(EXIT_ERROR);
    }

    let rules_path = match &args.rules {
        Some(p) => p.clone(),
        None => match discover_rules(Path::new(".")) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!("Run 'rulesnip init' to create a rule file");
                return Ok(EXIT_ERROR);
            }
        },
    };

    let rule_set = match RuleSet::parse_file(&rules_path) {
        Ok(set) => set,
        Err(e) => {
            eprintln!("Error loading rules: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let registry = match DetectorRegistry::with_defaults(&rule_set.settings) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: invalid rules: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    if let Err(e) = rules::validate(&rule_set, &registry.detector_names()) {
        eprintln!("Error: invalid rules: {}", e);
        return Ok(EXIT_ERROR);
    }
    debug!(rules = rule_set.rules.len(), path = %rules_path.display(), "loaded rules");

    let runner = Runner::from_rule_set(&rule_set)?.show_progress(args.progress);
    let files = match collect_files(&args.path, runner.source_frontend(), &rule_set.settings) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: cannot scan {}: {}", args.path.display(), e);
            return Ok(EXIT_ERROR);
        }
    };
    if files.is_empty() {
        warn!(path = %args.path.display(), "no Java files to scan");
    }

    let result = runner.run(&files)?;

    match args.format.as_str() {
        "pretty" => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            report::write_pretty(
                &mut out,
                &args.path.to_string_lossy(),
                &rules_path.to_string_lossy(),
                &result,
            )?;
            if let Some(output) = &args.output {
                report::write_json(&result, Some(output))?;
            }
        }
        _ => report::write_json(&result, args.output.as_deref())?,
    }

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.list {
        return list_templates();
    }

    let template = match TEMPLATES.iter().find(|t| t.name == args.template) {
        Some(t) => t,
        None => {
            eprintln!("Error: unknown template {:?}", args.template);
            eprintln!("Run 'rulesnip init --list' to see available templates");
            return Ok(EXIT_ERROR);
        }
    };

    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, template.content) {
        eprintln!("Error: failed to write rules: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {} from template '{}'", args.output.display(), template.name);
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to match your review guidelines", args.output.display());
    println!("  2. Run: rulesnip extract . --rules {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let name = if template.name == "minimal" {
            format!("{} (default)", template.name)
        } else {
            template.name.to_string()
        };
        println!("  {:<20} {}", name, template.description);
    }

    println!();
    println!("Usage:");
    println!("  rulesnip init --template <name>");

    Ok(EXIT_SUCCESS)
}

/// Run the tokenize command: one `name [tokens]` line per identifier.
pub fn run_tokenize(args: &TokenizeArgs) -> anyhow::Result<i32> {
    for name in &args.names {
        println!("{} {}", name, format_tokens(&tokenize(name)));
    }
    Ok(EXIT_SUCCESS)
}
