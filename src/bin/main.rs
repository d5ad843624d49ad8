use clap::{Arg, ArgAction, Command};
use internship2pdf::builders::{ContractBuilder, DocumentBuilder, Generator, ReceiptBuilder};
use internship2pdf::config::{self, AppSettings, ConfigSource};
use internship2pdf::dto::{ContractRequest, ReceiptRequest};
use internship2pdf::pdf::{PdfEngine, PdfRenderer};
use internship2pdf::styling::Style;
use internship2pdf::validation::{self, ValidationIssue};
use internship2pdf::GenerationError;
use log::{debug, error, info};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

const LOCAL_CONFIG_FILE: &str = "internship2pdf.toml";

#[derive(Debug)]
enum AppError {
    FileReadError {
        path: String,
        source: std::io::Error,
    },
    PayloadError {
        path: String,
        message: String,
    },
    ValidationError {
        path: String,
        issues: Vec<ValidationIssue>,
    },
    GenerationError {
        path: String,
        source: GenerationError,
    },
    PathError(String),
    BatchFailed {
        failed: usize,
        total: usize,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::FileReadError { path, source } => {
                write!(f, "Error reading {}: {}", path, source)
            }
            AppError::PayloadError { path, message } => {
                write!(f, "Invalid payload in {}: {}", path, message)
            }
            AppError::ValidationError { path, issues } => {
                write!(f, "{} has {} validation issue(s)", path, issues.len())?;
                for issue in issues {
                    write!(f, "\n  - {}", issue)?;
                }
                Ok(())
            }
            AppError::GenerationError { path, source } => {
                write!(f, "Generation failed for {}: {}", path, source)
            }
            AppError::PathError(message) => write!(f, "Path error: {}", message),
            AppError::BatchFailed { failed, total } => {
                write!(f, "{} of {} document(s) failed", failed, total)
            }
        }
    }
}

/// Verbosity level for output
#[derive(Debug, Clone, Copy, PartialEq)]
enum Verbosity {
    Quiet,   // No output except errors
    Normal,  // Standard output
    Verbose, // Detailed output
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DocumentKind {
    Receipt,
    Contract,
}

impl DocumentKind {
    fn from_arg(value: &str) -> DocumentKind {
        match value {
            "contract" => DocumentKind::Contract,
            _ => DocumentKind::Receipt,
        }
    }
}

/// What happened to one input.
#[derive(Debug)]
enum Outcome {
    Checked { input: String, filename: String },
    Written { input: String, path: PathBuf, size: usize },
}

/// Everything a batch needs besides the generator.
struct BatchOptions<'a> {
    output_dir: &'a Path,
    style: &'a Style,
    dry_run: bool,
}

/// Loads the settings from `--config`, `./internship2pdf.toml`, the per-user configuration, or
/// the defaults, then applies the `--preset` and `--logo` overrides.
fn load_settings(matches: &clap::ArgMatches) -> AppSettings {
    let mut settings = if let Some(path) = matches.get_one::<String>("config") {
        config::load_config_from_source(ConfigSource::File(path))
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        config::load_config_from_source(ConfigSource::File(LOCAL_CONFIG_FILE))
    } else {
        match config::default_config_path().filter(|p| p.exists()) {
            Some(path) => match path.to_str() {
                Some(p) => config::load_config_from_source(ConfigSource::File(p)),
                None => AppSettings::default(),
            },
            None => config::load_config_from_source(ConfigSource::Default),
        }
    };

    if let Some(preset) = matches.get_one::<String>("preset") {
        if let Some(style) = Style::preset(preset) {
            settings.style = style;
        }
    }
    if let Some(logo) = matches.get_one::<String>("logo") {
        settings.logo = Some(PathBuf::from(logo));
    }
    settings
}

fn get_output_dir(matches: &clap::ArgMatches) -> Result<PathBuf, AppError> {
    let current_dir = std::env::current_dir().map_err(|e| AppError::PathError(e.to_string()))?;

    Ok(matches
        .get_one::<String>("output")
        .map(|p| current_dir.join(p))
        .unwrap_or(current_dir))
}

fn read_payload<T: DeserializeOwned>(path: &str) -> Result<T, AppError> {
    let content = fs::read_to_string(path).map_err(|source| AppError::FileReadError {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| AppError::PayloadError {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn process_one<B, R>(
    generator: &Generator<B, R>,
    input: &str,
    validate: fn(&B::Request) -> Vec<ValidationIssue>,
    options: &BatchOptions,
) -> Result<Outcome, AppError>
where
    B: DocumentBuilder,
    B::Request: DeserializeOwned,
    R: PdfRenderer,
{
    let request: B::Request = read_payload(input)?;

    let issues = validate(&request);
    if !issues.is_empty() {
        return Err(AppError::ValidationError {
            path: input.to_string(),
            issues,
        });
    }

    if options.dry_run {
        let document = generator
            .build_document(&request)
            .map_err(|source| AppError::GenerationError {
                path: input.to_string(),
                source,
            })?;
        debug!("{} assembles into {} sections", input, document.section_count());
        return Ok(Outcome::Checked {
            input: input.to_string(),
            filename: Generator::<B, R>::filename(generator.builder().record_number(&request)),
        });
    }

    let wrap = |source: GenerationError| AppError::GenerationError {
        path: input.to_string(),
        source,
    };
    let generated = generator
        .generate(&request, Some(options.style))
        .map_err(wrap)?;
    let size = generated.content.as_ref().map_or(0, Vec::len);
    let path = generated.write_to(options.output_dir).map_err(wrap)?;
    Ok(Outcome::Written {
        input: input.to_string(),
        path,
        size,
    })
}

/// Processes every input in parallel. Results keep the order of `inputs`.
fn process_batch<B, R>(
    generator: &Generator<B, R>,
    inputs: &[String],
    validate: fn(&B::Request) -> Vec<ValidationIssue>,
    options: &BatchOptions,
) -> Vec<Result<Outcome, AppError>>
where
    B: DocumentBuilder + Sync,
    B::Request: DeserializeOwned,
    R: PdfRenderer,
{
    inputs
        .par_iter()
        .map(|input| process_one(generator, input, validate, options))
        .collect()
}

fn format_size(bytes: usize) -> String {
    let size_kb = bytes as f64 / 1024.0;
    if size_kb < 1024.0 {
        format!("{:.1} KB", size_kb)
    } else {
        format!("{:.2} MB", size_kb / 1024.0)
    }
}

fn run(matches: clap::ArgMatches) -> Result<(), AppError> {
    let verbosity = if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    let dry_run = matches.get_flag("dry-run");
    let kind = DocumentKind::from_arg(
        matches
            .get_one::<String>("kind")
            .map(String::as_str)
            .unwrap_or("receipt"),
    );
    let inputs: Vec<String> = matches
        .get_many::<String>("input")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let settings = load_settings(&matches);
    let output_dir = get_output_dir(&matches)?;
    if !dry_run {
        fs::create_dir_all(&output_dir).map_err(|e| {
            AppError::PathError(format!("cannot create {}: {}", output_dir.display(), e))
        })?;
    }

    if verbosity == Verbosity::Verbose {
        info!("Generating {} document(s) of kind {:?}", inputs.len(), kind);
        info!("   Font family: {}", settings.style.fonts.family.name());
        if let Some(logo) = &settings.logo {
            info!("   Logo: {}", logo.display());
        }
        info!("   Output: {}", output_dir.display());
    }

    let engine = PdfEngine::new();
    let builder_options = settings.builder_options();
    let options = BatchOptions {
        output_dir: &output_dir,
        style: &settings.style,
        dry_run,
    };

    let results = match kind {
        DocumentKind::Receipt => process_batch(
            &Generator::new(ReceiptBuilder::new(builder_options), &engine),
            &inputs,
            validation::validate_receipt as fn(&ReceiptRequest) -> Vec<ValidationIssue>,
            &options,
        ),
        DocumentKind::Contract => process_batch(
            &Generator::new(ContractBuilder::new(builder_options), &engine),
            &inputs,
            validation::validate_contract as fn(&ContractRequest) -> Vec<ValidationIssue>,
            &options,
        ),
    };

    let total = results.len();
    let mut failed = 0;
    for result in results {
        match result {
            Ok(Outcome::Checked { input, filename }) => {
                if verbosity != Verbosity::Quiet {
                    println!("✓ {} is valid and would produce {}", input, filename);
                }
            }
            Ok(Outcome::Written { input, path, size }) => {
                if verbosity != Verbosity::Quiet {
                    println!("✅ Saved {} to {}", input, path.display());
                    if verbosity == Verbosity::Verbose {
                        println!("   Size: {}", format_size(size));
                    }
                }
            }
            Err(e) => {
                failed += 1;
                error!("[X] {}", e);
            }
        }
    }

    if dry_run && verbosity != Verbosity::Quiet {
        println!("✓ Dry-run complete. No PDF generated.");
    }
    if failed > 0 {
        return Err(AppError::BatchFailed { failed, total });
    }
    Ok(())
}

fn build_cli() -> Command {
    Command::new("internship2pdf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate internship application receipts and contracts as PDF")
        .after_help(
            "EXAMPLES:\n  \
            internship2pdf -i postulacion.json -o out\n  \
            internship2pdf --kind contract -i contrato.json --preset professional\n  \
            internship2pdf -i a.json -i b.json --logo logo.png --verbose\n  \
            internship2pdf -i postulacion.json --dry-run\n",
        )
        .arg(
            Arg::new("kind")
                .short('k')
                .long("kind")
                .value_name("KIND")
                .value_parser(["receipt", "contract"])
                .default_value("receipt")
                .help("Kind of document to generate"),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("JSON_FILE")
                .action(ArgAction::Append)
                .help("JSON payload to render (repeat for several documents)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT_DIR")
                .help("Directory receiving the generated PDFs (default: current directory)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("CONFIG_FILE")
                .help("Path to a TOML styling configuration"),
        )
        .arg(
            Arg::new("preset")
                .long("preset")
                .value_name("PRESET")
                .value_parser(["default", "professional"])
                .help("Style preset, replacing the configured style"),
        )
        .arg(
            Arg::new("logo")
                .long("logo")
                .value_name("IMAGE")
                .help("Logo drawn in the letterhead of every page"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output with detailed information")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress all output except errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Validate and assemble the documents without generating PDFs")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("get-default-configuration")
                .long("get-default-configuration")
                .help("Print a default internship2pdf.toml to stdout and exit")
                .action(ArgAction::SetTrue),
        )
}

fn main() {
    // Initialize logger with environment variable control (RUST_LOG)
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let mut cmd = build_cli();
    let matches = cmd.clone().get_matches();

    if matches.get_flag("get-default-configuration") {
        println!("{}", config::default_config_toml());
        process::exit(0);
    }

    if !matches.contains_id("input") {
        let _ = cmd.print_help();
        println!();
        process::exit(1);
    }

    if let Err(e) = run(matches) {
        error!("[X] {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    fn valid_receipt_json() -> &'static str {
        r#"{
            "estudiante": { "nombre": "Ana", "apellido": "Gómez", "dni": "12345678" },
            "universidad": { "nombre": "X" },
            "carrera": { "nombre": "Ingeniería en Sistemas" },
            "empresa": { "nombre": "TechCorp SA" },
            "proyecto": { "nombre": "Sistema de Gestión", "fecha_inicio": "2024-03-01" },
            "puesto": { "nombre": "Desarrollador", "horas_dedicadas": 20 },
            "postulacion": { "numero": 42, "fecha": "2024-02-20T14:30:00Z" }
        }"#
    }

    #[test]
    fn test_output_dir_default_and_custom() {
        let matches = build_cli().get_matches_from(["internship2pdf", "-i", "a.json"]);
        let current = std::env::current_dir().unwrap();
        assert_eq!(get_output_dir(&matches).unwrap(), current);

        let matches = build_cli().get_matches_from(["internship2pdf", "-i", "a.json", "-o", "out"]);
        assert!(get_output_dir(&matches).unwrap().ends_with("out"));
    }

    #[test]
    fn test_repeated_inputs_and_kind() {
        let matches = build_cli().get_matches_from([
            "internship2pdf",
            "--kind",
            "contract",
            "-i",
            "a.json",
            "-i",
            "b.json",
        ]);
        let inputs: Vec<&String> = matches.get_many::<String>("input").unwrap().collect();
        assert_eq!(inputs.len(), 2);
        assert_eq!(
            DocumentKind::from_arg(matches.get_one::<String>("kind").unwrap()),
            DocumentKind::Contract
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = build_cli().try_get_matches_from(["internship2pdf", "--kind", "invoice"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_preset_and_logo_override_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[document]\nlogo = \"from-config.png\"\n").unwrap();

        let matches = build_cli().get_matches_from([
            "internship2pdf",
            "-c",
            config_path.to_str().unwrap(),
            "--preset",
            "professional",
            "--logo",
            "cli.png",
        ]);
        let settings = load_settings(&matches);
        assert_eq!(settings.style, Style::professional());
        assert_eq!(settings.logo, Some(PathBuf::from("cli.png")));
    }

    #[test]
    fn test_read_payload_accepts_spanish_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.json");
        fs::write(&path, valid_receipt_json()).unwrap();
        let request: ReceiptRequest = read_payload(path.to_str().unwrap()).unwrap();
        assert_eq!(request.application.number, 42);
        assert!(validation::validate_receipt(&request).is_empty());
    }

    #[test]
    fn test_read_payload_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            read_payload::<ReceiptRequest>(path.to_str().unwrap()),
            Err(AppError::PayloadError { .. })
        ));
        assert!(matches!(
            read_payload::<ReceiptRequest>("/no/such/file.json"),
            Err(AppError::FileReadError { .. })
        ));
    }

    #[test]
    fn test_dry_run_batch_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        fs::write(&good, valid_receipt_json()).unwrap();
        fs::write(&bad, r#"{ "postulacion": { "numero": 0 } }"#).unwrap();
        let inputs = vec![
            good.to_str().unwrap().to_string(),
            bad.to_str().unwrap().to_string(),
        ];

        let engine = PdfEngine::new();
        let generator = Generator::new(ReceiptBuilder::default(), &engine);
        let style = Style::default();
        let options = BatchOptions {
            output_dir: dir.path(),
            style: &style,
            dry_run: true,
        };
        let results = process_batch(
            &generator,
            &inputs,
            validation::validate_receipt as fn(&ReceiptRequest) -> Vec<ValidationIssue>,
            &options,
        );

        assert!(matches!(
            &results[0],
            Ok(Outcome::Checked { filename, .. }) if filename == "receipt_42.pdf"
        ));
        assert!(matches!(
            &results[1],
            Err(AppError::ValidationError { issues, .. }) if !issues.is_empty()
        ));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
