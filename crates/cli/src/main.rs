use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use comic_renamer_core::{
    app_paths, available_fields, load_settings, load_settings_from, parse_records,
    save_settings, validate_template, RenameSettings,
};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "comic-renamer-cli")]
#[command(about = "Preview comic archive filenames derived from tag metadata")]
struct Cli {
    /// Log engine decisions (truncation, reserved names, unknown fields) to stderr
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Render(RenderArgs),
    /// List the placeholders a template may use
    Fields,
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    /// Write the default settings to the per-user settings file
    Init {
        /// Overwrite an existing settings file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// JSON file holding one metadata record or an array of them
    #[arg(long)]
    metadata: PathBuf,
    /// Settings file; defaults to the per-user settings location
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    template: Option<String>,
    #[arg(long, default_value = "cbz")]
    ext: String,
    #[arg(long)]
    padding: Option<usize>,
    #[arg(long, default_value_t = false)]
    strict: bool,
    #[arg(long, default_value_t = false)]
    no_smart_cleanup: bool,
    #[arg(long, default_value_t = false)]
    move_to_dir: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render(args) => cmd_render(args),
        Commands::Fields => cmd_fields(),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
            ConfigAction::Init { force } => cmd_config_init(force),
        },
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let mut settings = match &args.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings()?,
    };
    apply_overrides(&mut settings, &args);
    validate_template(&settings.template)?;

    let raw = fs::read_to_string(&args.metadata)
        .with_context(|| format!("could not read metadata file: {}", args.metadata.display()))?;
    let records = parse_records(&raw)
        .with_context(|| format!("could not parse metadata file: {}", args.metadata.display()))?;

    let renamer = settings.to_renamer()?;
    let names = renamer
        .determine_names(&records, &args.ext)
        .into_iter()
        .map(|result| {
            result.map(|name| match (&settings.dir, settings.move_to_dir) {
                (Some(dir), true) => dir.join(name).display().to_string(),
                _ => name,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Table => {
            for (record, name) in records.iter().zip(&names) {
                println!(
                    "{} #{} -> {}",
                    record.series.as_deref().unwrap_or("?"),
                    record.issue.as_deref().unwrap_or("?"),
                    name
                );
            }
        }
    }

    Ok(())
}

fn apply_overrides(settings: &mut RenameSettings, args: &RenderArgs) {
    if let Some(template) = &args.template {
        settings.template = template.clone();
    }
    if let Some(padding) = args.padding {
        settings.issue_number_padding = padding;
    }
    if args.strict {
        settings.strict = true;
    }
    if args.no_smart_cleanup {
        settings.use_smart_string_cleanup = false;
    }
    if args.move_to_dir {
        settings.move_to_dir = true;
    }
}

fn cmd_fields() -> Result<()> {
    for name in available_fields() {
        println!("{{{name}}}");
    }
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let settings = load_settings()?;
    let paths = app_paths()?;
    println!("settings file: {}", paths.settings_path.display());
    println!("{}", toml::to_string_pretty(&settings)?);
    Ok(())
}

fn cmd_config_init(force: bool) -> Result<()> {
    let paths = app_paths()?;
    if paths.settings_path.exists() && !force {
        bail!(
            "settings file already exists: {} (use --force to overwrite)",
            paths.settings_path.display()
        );
    }
    save_settings(&RenameSettings::default())?;
    println!("wrote default settings: {}", paths.settings_path.display());
    Ok(())
}
