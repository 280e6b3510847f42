//! dctloc CLI — demo harness for coefficient-pair localization.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use dctloc::{
    search_block_column, transform, Block, ColumnReport, DctBasis, SampleTriple, BLOCK_SIZE,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "dctloc")]
#[command(
    about = "Localize which two DCT coefficients of an 8x8 image block were corrupted, \
             from three known-good reference samples"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate the corrupted coefficient pair from a reference and a corrupted image.
    Locate(CliLocateArgs),

    /// Synthesize a corrupted image, then locate the injected pair.
    Simulate(CliSimulateArgs),

    /// Print the 8x8 basis matrix and its orthonormality residual.
    BasisInfo,
}

#[derive(Debug, Clone, Args)]
struct CliBlockArgs {
    /// Pixel x of the block's top-left corner (multiple of 8 for aligned tiling).
    #[arg(long, default_value = "0")]
    block_x: u32,

    /// Pixel y of the block's top-left corner.
    #[arg(long, default_value = "0")]
    block_y: u32,

    /// Block column to sample, in [0, 8).
    #[arg(long, default_value = "2")]
    column: usize,

    /// First reference sample row.
    #[arg(long, default_value = "2")]
    u: usize,

    /// Second reference sample row.
    #[arg(long, default_value = "4")]
    v: usize,

    /// Third reference sample row, predicted from the first two.
    #[arg(long, default_value = "7")]
    w: usize,
}

#[derive(Debug, Clone, Args)]
struct CliLocateArgs {
    /// Path to the uncorrupted reference image.
    #[arg(long)]
    reference: PathBuf,

    /// Path to the possibly corrupted image.
    #[arg(long)]
    corrupted: PathBuf,

    /// Path to write the search report (JSON). Defaults to stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    block: CliBlockArgs,
}

#[derive(Debug, Clone, Args)]
struct CliSimulateArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// First injected coefficient as "row,col" in transform domain.
    #[arg(long, default_value = "3,4", value_parser = parse_coeff)]
    coeff_a: (usize, usize),

    /// Second injected coefficient as "row,col".
    #[arg(long, default_value = "5,6", value_parser = parse_coeff)]
    coeff_b: (usize, usize),

    /// Value written at the first injected coefficient.
    #[arg(long, default_value = "1e6")]
    magnitude_a: f64,

    /// Value written at the second injected coefficient.
    #[arg(long, default_value = "2e7")]
    magnitude_b: f64,

    /// Optional path to save the corrupted image (every tile corrupted).
    #[arg(long)]
    save_corrupted: Option<PathBuf>,

    /// Path to write the search report (JSON). Defaults to stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    block: CliBlockArgs,
}

fn parse_coeff(s: &str) -> Result<(usize, usize), String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"row,col\", got {:?}", s))?;
    let row: usize = row.trim().parse().map_err(|e| format!("bad row: {}", e))?;
    let col: usize = col.trim().parse().map_err(|e| format!("bad col: {}", e))?;
    if row >= BLOCK_SIZE || col >= BLOCK_SIZE {
        return Err(format!("coefficient ({}, {}) outside 8x8 block", row, col));
    }
    Ok((row, col))
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Locate(args) => run_locate(&args),
        Commands::Simulate(args) => run_simulate(&args),
        Commands::BasisInfo => run_basis_info(),
    }
}

// ── locate ─────────────────────────────────────────────────────────────

fn load_gray(path: &Path) -> CliResult<image::GrayImage> {
    let img = image::open(path)
        .map_err(|e| -> CliError { format!("failed to open {}: {}", path.display(), e).into() })?;
    Ok(img.to_luma8())
}

fn extract_block(img: &image::GrayImage, x0: u32, y0: u32) -> CliResult<Block> {
    Block::from_gray_region(img, x0, y0).ok_or_else(|| -> CliError {
        format!(
            "8x8 block at ({}, {}) does not fit a {}x{} image",
            x0,
            y0,
            img.width(),
            img.height()
        )
        .into()
    })
}

fn write_report(report: &ColumnReport, out: Option<&Path>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    match out {
        Some(path) => {
            std::fs::write(path, &json)?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_locate(args: &CliLocateArgs) -> CliResult<()> {
    let basis = DctBasis::new();
    let triple = SampleTriple::new(args.block.u, args.block.v, args.block.w)?;

    tracing::info!("Loading reference image: {}", args.reference.display());
    let reference_img = load_gray(&args.reference)?;
    tracing::info!("Loading corrupted image: {}", args.corrupted.display());
    let corrupted_img = load_gray(&args.corrupted)?;

    let reference = extract_block(&reference_img, args.block.block_x, args.block.block_y)?;
    let corrupted = extract_block(&corrupted_img, args.block.block_x, args.block.block_y)?;

    let report = search_block_column(&basis, &reference, &corrupted, triple, args.block.column)?;
    log_candidates(&report);
    write_report(&report, args.out.as_deref())
}

// ── simulate ───────────────────────────────────────────────────────────

fn run_simulate(args: &CliSimulateArgs) -> CliResult<()> {
    let basis = DctBasis::new();
    let triple = SampleTriple::new(args.block.u, args.block.v, args.block.w)?;
    let (row_a, col_a) = args.coeff_a;
    let (row_b, col_b) = args.coeff_b;
    if row_a == row_b {
        tracing::warn!(
            "both injections target frequency row {}; the column errors span a single \
             basis vector and the pair is not separable",
            row_a
        );
    }

    tracing::info!("Loading image: {}", args.image.display());
    let gray = load_gray(&args.image)?;
    let (w, h) = gray.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    // Corrupt every aligned 8x8 tile in the transform domain, like the
    // original capture would have been tampered with.
    let n = BLOCK_SIZE as u32;
    let mut corrupted_img = gray.clone();
    let mut searched_block: Option<Block> = None;
    for y0 in (0..h - h % n).step_by(BLOCK_SIZE) {
        for x0 in (0..w - w % n).step_by(BLOCK_SIZE) {
            let block = extract_block(&gray, x0, y0)?;
            let mut coeffs = transform::forward(&basis, &block);
            coeffs.set(row_a, col_a, args.magnitude_a);
            coeffs.set(row_b, col_b, args.magnitude_b);
            let corrupted = transform::inverse(&basis, &coeffs);
            corrupted.write_to_gray(&mut corrupted_img, x0, y0);
            if (x0, y0) == (args.block.block_x, args.block.block_y) {
                searched_block = Some(corrupted);
            }
        }
    }

    if let Some(path) = &args.save_corrupted {
        corrupted_img.save(path)?;
        tracing::info!("Corrupted image written to {}", path.display());
    }

    // Search on the unclamped block; clamping to u8 is display-only and
    // would swamp the observed errors.
    let corrupted = searched_block.ok_or_else(|| -> CliError {
        format!(
            "block at ({}, {}) was not among the corrupted tiles",
            args.block.block_x, args.block.block_y
        )
        .into()
    })?;
    let reference = extract_block(&gray, args.block.block_x, args.block.block_y)?;

    let report = search_block_column(&basis, &reference, &corrupted, triple, args.block.column)?;
    log_candidates(&report);
    write_report(&report, args.out.as_deref())
}

fn log_candidates(report: &ColumnReport) {
    tracing::info!(
        "{} candidate pair(s) for column {} with rows ({}, {}, {})",
        report.candidates.len(),
        report.column,
        report.triple.u,
        report.triple.v,
        report.triple.w
    );
    for pair in &report.candidates {
        tracing::info!("  candidate: ({}, {})", pair.k, pair.p);
    }
}

// ── basis-info ─────────────────────────────────────────────────────────

fn run_basis_info() -> CliResult<()> {
    let basis = DctBasis::new();

    println!("dctloc orthonormal basis ({0}x{0})", BLOCK_SIZE);
    for f in 0..BLOCK_SIZE {
        let row: Vec<String> = (0..BLOCK_SIZE)
            .map(|x| format!("{:9.5}", basis.value(f, x)))
            .collect();
        println!("  [{}]", row.join(", "));
    }

    let m = basis.matrix();
    let gram = m * m.transpose();
    let residual = (gram - dctloc::BasisMatrix::identity()).abs().max();
    println!("  orthonormality residual: {:.3e}", residual);

    Ok(())
}
