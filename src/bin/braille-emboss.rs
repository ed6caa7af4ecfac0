//! CLI binary for braille-emboss.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and writes results.

use anyhow::{Context, Result};
use braille_emboss::gcode::{gcode_filename, gcode_page_filename};
use braille_emboss::{
    convert, convert_batch, convert_input, gcode_for_page, gcode_for_pages, write_gcode, ConversionConfig,
    ConversionOutput, ConversionProgressCallback, GcodeOverrides, Grade, LlmCleaner, PageLayout, ParagraphJoin,
    PrinterSettings, ProgressCallback, TranslatorKind,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const SPINNER_TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress for batch runs. Documents may finish out of order.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(SPINNER_TICKS);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&index))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_documents} documents…"))
        ));
    }

    fn on_document_start(&self, index: usize, _total: usize, input: &str) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(index, Instant::now());
        }
        self.bar.set_message(input.to_string());
    }

    fn on_document_complete(&self, index: usize, total: usize, pages: usize) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} Document {:>3}/{:<3}  {:<10}  {}",
            green("✓"),
            index,
            total,
            dim(&format!("{pages:>4} pages")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Document {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let failed = total.saturating_sub(success_count);
        self.bar.finish_and_clear();
        if failed == 0 {
            eprintln!("{} {} documents converted", green("✔"), bold(&success_count.to_string()));
        } else {
            eprintln!(
                "{} {}/{} documents converted  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Grade 2 Braille on stdout
  braille-emboss notes.txt

  # Grade 1, written to a file
  braille-emboss --grade 1 notes.txt -o notes.brl

  # Read from stdin
  cat notes.txt | braille-emboss -

  # Embossing programs for every page, into ./gcode/
  braille-emboss notes.txt --gcode gcode/

  # Only page 2, slower and with a deeper press
  braille-emboss notes.txt --gcode out/ --page 2 --feed-rate 3000 --head-down-z -2.5

  # Use an external translation service, falling back to the built-in tables
  braille-emboss --translator remote --translator-url http://localhost:5001 --fallback notes.txt

  # AI cleanup before formatting
  braille-emboss --cleanup --document-type textbook chapter.txt

  # Several documents at once into a directory
  braille-emboss a.txt b.txt https://example.com/c.txt -o braille/

REMOTE TRANSLATION SERVICE:
  POST {url}/convert   {"text": "...", "grade": 2, "table": "en-us-g2.ctb"}
  GET  {url}/health

PRINTER SETTINGS (--printer-settings, JSON, all keys optional):
  paper_width 292.1  paper_height 279.4  margin 10  letter_width 2.5
  dot_radius 0.5  letter_padding 3.5  line_padding 2.5
  head_down_z -2  head_up_z 10  feed_rate 5000
  invert_x  invert_y  mirror_x  mirror_y  delta   (booleans, default false)

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (for --cleanup)
  ANTHROPIC_API_KEY       Anthropic API key (for --cleanup)
  EDGEQUAKE_LLM_PROVIDER  Override cleanup provider
  EDGEQUAKE_MODEL         Override cleanup model ID
  RUST_LOG                Override the log filter
"#;

/// Convert text to Unicode Braille and embossing G-code.
#[derive(clap::Parser, Debug)]
#[command(
    name = "braille-emboss",
    version,
    about = "Convert text to paginated Unicode Braille and embossing G-code",
    long_about = "Clean, format and translate text files, stdin or URLs into Grade 1 or Grade 2 \
Unicode Braille, split it into fixed-size pages, and optionally emit G-code that presses each \
dot with a 3D printer.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Text files, HTTP/HTTPS URLs, or `-` for stdin.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (one input) or directory (several inputs). Default: stdout.
    #[arg(short, long, env = "BRAILLE_OUTPUT")]
    output: Option<PathBuf>,

    /// Braille grade: 1 (uncontracted) or 2 (contracted).
    #[arg(long, env = "BRAILLE_GRADE", default_value_t = 2,
          value_parser = clap::value_parser!(u8).range(1..=2))]
    grade: u8,

    /// Column budget for formatted lines.
    #[arg(long, env = "BRAILLE_COLUMNS", default_value_t = 40)]
    columns: usize,

    /// Lines per Braille page.
    #[arg(long, env = "BRAILLE_LINES_PER_PAGE", default_value_t = 25)]
    lines_per_page: usize,

    /// How to rejoin paragraphs broken into short lines.
    #[arg(long, env = "BRAILLE_JOIN", value_enum, default_value = "short-lines")]
    join: JoinArg,

    /// Translation engine.
    #[arg(long, env = "BRAILLE_TRANSLATOR", value_enum, default_value = "embedded")]
    translator: TranslatorArg,

    /// Base URL of the remote translation service.
    #[arg(long, env = "BRAILLE_TRANSLATOR_URL", required_if_eq("translator", "remote"))]
    translator_url: Option<String>,

    /// Remote translation timeout in seconds.
    #[arg(long, env = "BRAILLE_TRANSLATOR_TIMEOUT", default_value_t = 30)]
    translator_timeout: u64,

    /// Use the built-in tables when the remote service is unavailable.
    #[arg(long, env = "BRAILLE_FALLBACK")]
    fallback: bool,

    /// Run AI cleanup between normalisation and formatting.
    #[arg(long, env = "BRAILLE_CLEANUP")]
    cleanup: bool,

    /// LLM provider for --cleanup: openai, anthropic, gemini, ollama, …
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID for --cleanup.
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Document-type hint for --cleanup (e.g. textbook, letter, recipe).
    #[arg(long, env = "BRAILLE_DOCUMENT_TYPE", default_value = "general")]
    document_type: String,

    /// Write G-code programs into this directory.
    #[arg(long, env = "BRAILLE_GCODE_DIR")]
    gcode: Option<PathBuf>,

    /// Printer settings JSON file.
    #[arg(long, env = "BRAILLE_PRINTER_SETTINGS")]
    printer_settings: Option<PathBuf>,

    /// Override the printer feed rate.
    #[arg(long, allow_hyphen_values = true)]
    feed_rate: Option<String>,

    /// Override the Z height that presses a dot.
    #[arg(long, allow_hyphen_values = true)]
    head_down_z: Option<String>,

    /// Override the Z height between dots.
    #[arg(long, allow_hyphen_values = true)]
    head_up_z: Option<String>,

    /// Emit G-code for this page only (1-based).
    #[arg(long, requires = "gcode")]
    page: Option<usize>,

    /// Documents converted at once when several inputs are given.
    #[arg(short, long, env = "BRAILLE_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "BRAILLE_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Output structured JSON (ConversionOutput) instead of Braille text.
    #[arg(long, env = "BRAILLE_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "BRAILLE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BRAILLE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "BRAILLE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum JoinArg {
    Off,
    ShortLines,
    Always,
}

impl From<JoinArg> for ParagraphJoin {
    fn from(v: JoinArg) -> Self {
        match v {
            JoinArg::Off => ParagraphJoin::Off,
            JoinArg::ShortLines => ParagraphJoin::ShortLines,
            JoinArg::Always => ParagraphJoin::Always,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq)]
enum TranslatorArg {
    Embedded,
    Remote,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = <Cli as clap::Parser>::parse();
    let batch = cli.inputs.len() > 1;

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs in batch mode.
    let show_progress = batch && !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let printer = load_printer_settings(&cli).await?;

    // ── Single document ──────────────────────────────────────────────────
    if !batch {
        let input = &cli.inputs[0];
        let result = if input == "-" {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin (must be UTF-8)")?;
            convert(&text, &config).await
        } else {
            convert_input(input, &config).await
        };
        let output = result.with_context(|| format!("Conversion of '{input}' failed"))?;

        emit_document(&cli, input, &output, cli.output.as_deref())?;
        emit_gcode(&cli, input, &output, &printer)?;
        if !cli.quiet {
            print_summary(input, &output);
        }
        return Ok(());
    }

    // ── Batch ────────────────────────────────────────────────────────────
    if cli.inputs.iter().any(|i| i == "-") {
        anyhow::bail!("stdin ('-') can only be used as the sole input");
    }
    let items = convert_batch(&cli.inputs, &config).await;

    let mut failed = 0usize;
    for item in &items {
        match &item.result {
            Ok(output) => {
                let target = cli
                    .output
                    .as_ref()
                    .map(|dir| dir.join(format!("{}.brl", document_stem(&item.input))));
                emit_document(&cli, &item.input, output, target.as_deref())?;
                emit_gcode(&cli, &item.input, output, &printer)?;
                if !cli.quiet && !show_progress {
                    print_summary(&item.input, output);
                }
            }
            Err(e) => {
                failed += 1;
                if !show_progress {
                    eprintln!("{} {}: {}", red("✗"), item.input, e);
                }
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} documents failed", items.len());
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let grade = Grade::try_from(cli.grade).context("Invalid grade")?;
    let layout = PageLayout::new(cli.columns, cli.lines_per_page).context("Invalid page layout")?;

    let translator = match cli.translator {
        TranslatorArg::Embedded => TranslatorKind::Embedded,
        TranslatorArg::Remote => TranslatorKind::Remote {
            url: cli
                .translator_url
                .clone()
                .context("--translator-url is required with --translator remote")?,
        },
    };

    let mut builder = ConversionConfig::builder()
        .grade(grade)
        .column_budget(cli.columns)
        .page_layout(layout)
        .paragraph_join(cli.join.clone().into())
        .translator(translator)
        .translator_timeout_secs(cli.translator_timeout)
        .fallback_to_embedded(cli.fallback)
        .document_type(cli.document_type.clone())
        .concurrency(cli.concurrency)
        .download_timeout_secs(cli.download_timeout);

    if cli.cleanup {
        let cleaner = LlmCleaner::from_env(cli.provider.as_deref(), cli.model.as_deref())
            .context("AI cleanup requested but no LLM provider is configured")?
            .with_column_budget(cli.columns);
        builder = builder.cleaner(Arc::new(cleaner));
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

async fn load_printer_settings(cli: &Cli) -> Result<PrinterSettings> {
    match &cli.printer_settings {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read printer settings from {:?}", path))?;
            PrinterSettings::from_json(&json).context("Invalid printer settings")
        }
        None => Ok(PrinterSettings::default()),
    }
}

fn overrides(cli: &Cli) -> Result<GcodeOverrides> {
    let mut o = GcodeOverrides::default();
    for (name, value) in [
        ("feed_rate", &cli.feed_rate),
        ("head_down_z", &cli.head_down_z),
        ("head_up_z", &cli.head_up_z),
    ] {
        if let Some(v) = value {
            o.set(name, v)?;
        }
    }
    Ok(o)
}

/// Write the Braille text (or JSON) to `target`, or stdout when `None`.
fn emit_document(cli: &Cli, input: &str, output: &ConversionOutput, target: Option<&Path>) -> Result<()> {
    let body = if cli.json {
        serde_json::to_string_pretty(output).context("Failed to serialise output")?
    } else {
        output.braille_text.clone()
    };

    match target {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
            }
            std::fs::write(path, body.as_bytes()).with_context(|| format!("Failed to write {:?}", path))?;
            if !cli.quiet {
                eprintln!("{}  {}  →  {}", green("✔"), input, bold(&path.display().to_string()));
            }
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(body.as_bytes()).context("Failed to write to stdout")?;
            if !body.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }
    Ok(())
}

fn emit_gcode(cli: &Cli, input: &str, output: &ConversionOutput, printer: &PrinterSettings) -> Result<()> {
    let Some(dir) = &cli.gcode else {
        return Ok(());
    };
    if output.pagination.total_pages == 0 {
        eprintln!("{} {}: no Braille pages, no G-code written", cyan("⚠"), input);
        return Ok(());
    }
    let name = if input == "-" { "stdin" } else { input };
    let overrides = overrides(cli)?;

    let programs = match cli.page {
        Some(n) => vec![(
            n,
            gcode_for_page(&output.pagination, n, printer, &overrides).context("G-code generation failed")?,
        )],
        None => gcode_for_pages(&output.pagination, printer, &overrides)
            .context("G-code generation failed")?
            .into_iter()
            .enumerate()
            .map(|(i, p)| (i + 1, p))
            .collect(),
    };

    let single = programs.len() == 1 && output.pagination.total_pages == 1;
    for (page, program) in &programs {
        let file = if single {
            gcode_filename(name)
        } else {
            gcode_page_filename(name, *page)
        };
        let path = dir.join(file);
        write_gcode(program, &path).with_context(|| format!("Failed to write {:?}", path))?;
        if !cli.quiet {
            eprintln!(
                "   {} page {}  {}  {}",
                dim("G-code"),
                page,
                dim(&format!("{} dots, ~{:.0}s", program.press_count(), program.estimated_seconds)),
                path.display()
            );
        }
    }
    Ok(())
}

fn print_summary(input: &str, output: &ConversionOutput) {
    let s = &output.stats;
    eprintln!(
        "{}  {}  {} pages  {} cells  {}  {}ms",
        green("✔"),
        input,
        output.pagination.total_pages,
        s.braille_cells,
        dim(&format!("{} via {}", output.grade, s.translator_used)),
        s.total_ms,
    );
    if s.fell_back {
        eprintln!("   {} remote translator unavailable, used embedded tables", cyan("⚠"));
    }
    if let Some(ref e) = s.cleanup_error {
        eprintln!("   {} AI cleanup skipped: {}", cyan("⚠"), e);
    }
    if s.corrections > 0 {
        eprintln!("   {} {} over-long lines force-broken", dim("·"), s.corrections);
    }
}

fn document_stem(input: &str) -> String {
    let last = input.trim_end_matches('/').rsplit('/').next().unwrap_or(input);
    Path::new(last)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document")
        .to_string()
}
