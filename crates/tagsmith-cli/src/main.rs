use serde::Serialize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tagsmith::render::SheetStats;
use tagsmith::{
    EmbeddedFontDescriptor, GenerateError, GenerationConfig, Generator, NameEntry, OutputMode,
    TemplateDocument, TemplateSizeConfig, UnitSystem, format_display, from_display,
    parse_name_list,
};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Tagsmith(tagsmith::Error),
    Generate(GenerateError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Tagsmith(err) => write!(f, "{err}"),
            CliError::Generate(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<tagsmith::Error> for CliError {
    fn from(value: tagsmith::Error) -> Self {
        Self::Tagsmith(value)
    }
}

impl From<tagsmith::ParseError> for CliError {
    fn from(value: tagsmith::ParseError) -> Self {
        Self::Tagsmith(value.into())
    }
}

impl From<GenerateError> for CliError {
    fn from(value: GenerateError) -> Self {
        Self::Generate(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    Bounds,
    #[default]
    Stats,
    Sheet,
    Separate,
    Pages,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    template: Option<String>,
    names: Option<String>,
    config: Option<String>,
    font: Option<String>,
    font_family: Option<String>,
    unit: Option<UnitSystem>,
    tag_width: Option<f64>,
    tag_height: Option<f64>,
    fill_to_capacity: bool,
    out: Option<String>,
    pretty: bool,
    verbose: bool,
}

fn usage() -> &'static str {
    "tagsmith-cli\n\
\n\
USAGE:\n\
  tagsmith-cli bounds --template <svg> [--unit mm|in] [--pretty]\n\
  tagsmith-cli stats --template <svg> --names <path|-> [OPTIONS] [--pretty]\n\
  tagsmith-cli sheet --template <svg> --names <path|-> [OPTIONS] [--out <file>]\n\
  tagsmith-cli separate --template <svg> --names <path|-> [OPTIONS] --out <dir>\n\
  tagsmith-cli pages --template <svg> --names <path|-> [OPTIONS] --out <dir>\n\
\n\
OPTIONS:\n\
  --config <json>          generation config (camelCase JSON, partial documents allowed)\n\
  --font <file>            embed a .ttf/.otf/.woff/.woff2 font\n\
  --font-family <name>     font family name (renames an embedded font)\n\
  --unit mm|in             unit for --tag-width/--tag-height and printed sizes\n\
  --tag-width <n>          tag width (height follows when the aspect is locked)\n\
  --tag-height <n>         tag height (width follows when the aspect is locked)\n\
  --fill                   fill every slot of the sheet, repeating names\n\
  --verbose                debug logging (RUST_LOG overrides)\n\
\n\
NOTES:\n\
  - Names are one per line, optionally `name,second line` CSV; '-' reads stdin.\n\
  - sheet prints SVG to stdout unless --out is given.\n\
  - separate writes NNN-<name>.svg files; pages writes name-tags-sheet-NNN.svg files.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut command_seen = false;

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        let mut value = || it.next().cloned().ok_or(CliError::Usage(usage()));
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "bounds" | "stats" | "sheet" | "separate" | "pages" if !command_seen => {
                command_seen = true;
                args.command = match a.as_str() {
                    "bounds" => Command::Bounds,
                    "stats" => Command::Stats,
                    "sheet" => Command::Sheet,
                    "separate" => Command::Separate,
                    _ => Command::Pages,
                };
            }
            "--template" => args.template = Some(value()?),
            "--names" => args.names = Some(value()?),
            "--config" => args.config = Some(value()?),
            "--font" => args.font = Some(value()?),
            "--font-family" => args.font_family = Some(value()?),
            "--unit" => {
                args.unit = Some(
                    value()?
                        .parse::<UnitSystem>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--tag-width" => args.tag_width = Some(parse_length(&value()?)?),
            "--tag-height" => args.tag_height = Some(parse_length(&value()?)?),
            "--out" => args.out = Some(value()?),
            "--fill" => args.fill_to_capacity = true,
            "--pretty" => args.pretty = true,
            "--verbose" | "-v" => args.verbose = true,
            _ => return Err(CliError::Usage(usage())),
        }
    }

    if args.template.is_none() {
        return Err(CliError::Usage(usage()));
    }
    if args.command != Command::Bounds && args.names.is_none() {
        return Err(CliError::Usage(usage()));
    }
    if matches!(args.command, Command::Separate | Command::Pages) && args.out.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn parse_length(raw: &str) -> Result<f64, CliError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(CliError::Usage(usage())),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_text(path: &str) -> Result<String, CliError> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_files(dir: &Path, files: &[(String, String)]) -> Result<(), CliError> {
    std::fs::create_dir_all(dir)?;
    for (file_name, svg) in files {
        let path = dir.join(file_name);
        std::fs::write(&path, svg)?;
        println!("{}", path.display());
    }
    Ok(())
}

/// Loads the config file and applies command-line overrides on top of it.
fn build_config(args: &Args, template: &TemplateDocument) -> Result<GenerationConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => GenerationConfig::from_json_str(&read_text(path)?)?,
        None => GenerationConfig::default(),
    };
    if let Some(unit) = args.unit {
        config.unit_system = unit;
    }
    if args.fill_to_capacity {
        config.sheet.fill_to_capacity = true;
    }

    let bounds = template.bounds();
    let mut size = config
        .template_size
        .unwrap_or_else(|| TemplateSizeConfig::from_bounds(bounds));
    if let Some(w) = args.tag_width {
        size.set_width(from_display(w, config.unit_system), Some(bounds));
    }
    if let Some(h) = args.tag_height {
        size.set_height(from_display(h, config.unit_system), Some(bounds));
    }
    config.template_size = Some(size);

    if let Some(path) = args.font.as_deref() {
        let bytes = std::fs::read(path)?;
        let file_name = Path::new(path)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(path);
        match EmbeddedFontDescriptor::from_font_file(file_name, &bytes) {
            Ok(font) => config.text.set_embedded_font(font),
            Err(err @ tagsmith::Error::UnsupportedFontFormat { .. }) => {
                tracing::warn!(%err, "ignoring font");
            }
            Err(err) => return Err(err.into()),
        }
    }
    if let Some(family) = args.font_family.as_deref() {
        config.text.set_font_family(family);
    }
    Ok(config)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BoundsOut {
    width_mm: f64,
    height_mm: f64,
    width: String,
    height: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsOut {
    #[serde(flatten)]
    stats: SheetStats,
    truncated: usize,
    pages_needed: usize,
    tag_width: String,
    tag_height: String,
}

fn run(args: Args) -> Result<(), CliError> {
    let template_path = args.template.as_deref().ok_or(CliError::Usage(usage()))?;
    let template = TemplateDocument::parse(read_text(template_path)?)?;

    if args.command == Command::Bounds {
        let unit = args.unit.unwrap_or_default();
        let bounds = template.bounds();
        return write_json(
            &BoundsOut {
                width_mm: bounds.width,
                height_mm: bounds.height,
                width: format_display(bounds.width, unit),
                height: format_display(bounds.height, unit),
            },
            args.pretty,
        );
    }

    let names: Vec<NameEntry> = match args.names.as_deref() {
        Some(path) => parse_name_list(&read_text(path)?),
        None => Vec::new(),
    };
    let config = build_config(&args, &template)?;
    let unit = config.unit_system;
    let generator = Generator::new().with_config(config);

    match args.command {
        Command::Bounds => Ok(()),
        Command::Stats => {
            let stats = generator.sheet_stats(&template, &names);
            let size = generator.tag_size(&template);
            write_json(
                &StatsOut {
                    stats,
                    truncated: stats.truncated(),
                    pages_needed: stats.pages_needed(),
                    tag_width: format_display(size.width, unit),
                    tag_height: format_display(size.height, unit),
                },
                args.pretty,
            )
        }
        Command::Sheet => {
            let (svg, stats) = generator.generate_sheet(Some(&template), &names)?;
            if stats.truncated() > 0 && !stats.fill_to_capacity {
                eprintln!(
                    "note: {} of {} names fit on one sheet; {} left off (see `pages`)",
                    stats.max_tags,
                    stats.names_count,
                    stats.truncated()
                );
            }
            match args.out.as_deref() {
                None | Some("-") => print!("{svg}"),
                Some(path) => std::fs::write(path, svg)?,
            }
            Ok(())
        }
        Command::Separate => {
            let mut generator = generator;
            generator.config.output_mode = OutputMode::Separate;
            let files = generator.generate(Some(&template), &names)?.into_files();
            write_files(&out_dir(&args)?, &files)
        }
        Command::Pages => {
            let files = generator
                .generate_pages(Some(&template), &names)?
                .into_iter()
                .map(|f| (f.file_name, f.svg))
                .collect::<Vec<_>>();
            write_files(&out_dir(&args)?, &files)
        }
    }
}

fn out_dir(args: &Args) -> Result<PathBuf, CliError> {
    args.out
        .as_deref()
        .map(PathBuf::from)
        .ok_or(CliError::Usage(usage()))
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => {}
        Err(err @ CliError::Generate(GenerateError::NoTemplate | GenerateError::NoNames)) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
