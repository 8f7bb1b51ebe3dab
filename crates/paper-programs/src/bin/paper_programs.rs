//! paper-programs CLI: batch detection and dot-code utilities.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};

use paper_programs::dotcode::{digits_to_string, parse_digits};
use paper_programs::frames::FileFrames;
use paper_programs::io::{DetectConfig, DetectReport, FrameReport};
use paper_programs::{run_detection_loop, CodeScheme, DotCodeDecoder, PaperCorner};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "paper-programs")]
#[command(about = "Locate paper programs by their colored dot-chain corners")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON log lines (requires the `tracing` feature).
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect programs in the frames listed by a JSON config.
    Detect(DetectArgs),

    /// Print the corner chains of one program.
    Encode {
        #[arg(long)]
        program: u32,
        #[arg(long, value_enum, default_value_t = SchemeArg::Chain7)]
        scheme: SchemeArg,
    },

    /// Decode a chain of digits, head first (e.g. 0123301).
    Decode {
        #[arg(long)]
        digits: String,
        #[arg(long, value_enum, default_value_t = SchemeArg::Chain7)]
        scheme: SchemeArg,
    },

    /// Print code table statistics and the first programs.
    Table {
        #[arg(long, value_enum, default_value_t = SchemeArg::Chain7)]
        scheme: SchemeArg,
        /// Number of programs to list.
        #[arg(long, default_value = "8")]
        head: u32,
    },
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Path to the JSON config.
    #[arg(long)]
    config: PathBuf,

    /// Report path; overrides `output_path` from the config.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchemeArg {
    /// 7-dot chains, 4 colors, shuffled table.
    Chain7,
    /// Legacy 5-dot chains, 5 colors.
    Chain5,
}

impl From<SchemeArg> for CodeScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Chain7 => CodeScheme::Chain7,
            SchemeArg::Chain5 => CodeScheme::Chain5,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_log);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> CliResult<()> {
    match command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Encode { program, scheme } => run_encode(program, scheme),
        Commands::Decode { digits, scheme } => run_decode(&digits, scheme),
        Commands::Table { scheme, head } => run_table(scheme, head),
    }
}

fn init_logging(verbose: u8, json: bool) {
    let level = paper_programs::core::verbosity_level(verbose);

    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init();
        paper_programs::core::init_tracing(level, json);
    }

    #[cfg(not(feature = "tracing"))]
    {
        let _ = paper_programs::core::init_with_level(level);
        if json {
            log::warn!("--json-log needs the `tracing` feature; using plain logs");
        }
    }
}

// ── detect ────────────────────────────────────────────────────────────

fn run_detect(args: &DetectArgs) -> CliResult<()> {
    let config = DetectConfig::load_json(&args.config)?;
    let mut detector = config.build_detector()?;
    let paths = config.frame_paths(&args.config);
    let out = args.out.clone().unwrap_or_else(|| config.output_path());

    let mut report = DetectReport::new(&args.config);
    report.frames = paths
        .iter()
        .enumerate()
        .map(|(i, p)| FrameReport::new(i, p))
        .collect();

    let mut source = FileFrames::new(paths.iter().cloned());
    let stats = run_detection_loop(&mut detector, &mut source, |index, result| {
        if let Some(frame) = report.frames.get_mut(index) {
            frame.set_result(result.clone());
        }
    });
    for frame in report.frames.iter_mut().filter(|f| f.result.is_none()) {
        frame.set_error("frame could not be loaded or processed");
    }

    write_report(&report, &out)?;
    let programs = report.programs();
    println!(
        "{} frames, {} failed, programs {:?}",
        stats.frames, stats.failed, programs
    );
    println!("report: {}", out.display());
    Ok(())
}

fn write_report(report: &DetectReport, out: &Path) -> CliResult<()> {
    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    report.write_json(out)?;
    Ok(())
}

// ── encode / decode ───────────────────────────────────────────────────

fn run_encode(program: u32, scheme: SchemeArg) -> CliResult<()> {
    let decoder = DotCodeDecoder::new(scheme.into())?;
    for corner in PaperCorner::ALL {
        let digits = decoder.encode(program, corner)?;
        println!("{} {}", corner.short_name(), digits_to_string(&digits));
    }
    Ok(())
}

fn run_decode(text: &str, scheme: SchemeArg) -> CliResult<()> {
    let decoder = DotCodeDecoder::new(scheme.into())?;
    let digits = parse_digits(text).ok_or_else(|| format!("not a digit string: {text:?}"))?;
    let found = decoder
        .decode_digits(&digits)
        .ok_or_else(|| format!("{text} is not a valid {scheme:?} chain"))?;
    println!("program {} corner {}", found.program, found.corner.short_name());
    Ok(())
}

// ── table ─────────────────────────────────────────────────────────────

fn run_table(scheme: SchemeArg, head: u32) -> CliResult<()> {
    let decoder = DotCodeDecoder::new(scheme.into())?;
    println!("{scheme:?} dot code");
    println!("  colors:       {}", decoder.alphabet_size());
    println!("  chain length: {}", decoder.chain_len());
    println!("  programs:     {}", decoder.program_count());

    for program in 0..head.min(decoder.program_count()) {
        let chains = PaperCorner::ALL
            .iter()
            .map(|&c| decoder.encode(program, c).map(|d| digits_to_string(&d)))
            .collect::<Result<Vec<_>, _>>()?;
        println!("{program:>6} {}", chains.join(" "));
    }
    Ok(())
}
