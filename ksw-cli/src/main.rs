use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use ksw_core::align::types::DEFAULT_BAND_WIDTH;
use ksw_core::align::{validate, AlignmentParams, Aligner, CoordFormat, ScoringMatrix};
use ksw_core::io::{OutputOptions, PairReader, ResultWriter};

#[derive(Parser, Debug)]
#[command(name = "ksw")]
#[command(about = "Pairwise nucleotide alignment of query/target line pairs")]
#[command(version)]
#[command(long_about = "
Reads alternating query and target lines from stdin and writes one
tab-separated record per pair: score, four coordinate columns and,
optionally, the CIGAR and both sequences.

Modes: 0 local, 1 glocal (whole query, part of the target),
2 extension from the start of both sequences, 3 global.

Examples:
  ksw -M 3 -c < pairs.txt
  ksw -M 2 -z 20 -0 10 -O -H < pairs.txt
")]
struct Cli {
    /// Alignment mode [0-3]
    #[arg(short = 'M', long, default_value_t = 0, allow_negative_numbers = true)]
    mode: i32,

    /// Backend: banded or vectorized (default depends on the mode)
    #[arg(short = 'B', long)]
    backend: Option<String>,

    /// Match score
    #[arg(short = 'a', long = "match", default_value_t = 1, allow_negative_numbers = true)]
    match_score: i32,

    /// Mismatch penalty
    #[arg(short = 'b', long, default_value_t = 3, allow_negative_numbers = true)]
    mismatch: i32,

    /// Gap open penalty
    #[arg(short = 'q', long, default_value_t = 5, allow_negative_numbers = true)]
    gap_open: i32,

    /// Gap extension penalty
    #[arg(short = 'r', long, default_value_t = 2, allow_negative_numbers = true)]
    gap_extend: i32,

    /// Band width
    #[arg(short = 'w', long, default_value_t = DEFAULT_BAND_WIDTH, allow_negative_numbers = true)]
    band_width: i32,

    /// Z-drop for extension (banded only)
    #[arg(short = 'z', long, allow_negative_numbers = true)]
    zdrop: Option<i32>,

    /// Start score for extension
    #[arg(short = '0', long, default_value_t = 0, allow_negative_numbers = true)]
    start_score: i32,

    /// Scoring matrix file (16 or 25 comma/tab separated integers)
    #[arg(short = 'm', long)]
    matrix: Option<PathBuf>,

    /// Right-align gaps (banded only)
    #[arg(short = 'R', long)]
    right_align_gaps: bool,

    /// Print offset/length instead of start/end coordinates
    #[arg(short = 'O', long)]
    offset_length: bool,

    /// Print the CIGAR
    #[arg(short = 'c', long)]
    cigar: bool,

    /// Print the query and target sequences
    #[arg(short = 's', long)]
    sequences: bool,

    /// Print a header line
    #[arg(short = 'H', long)]
    header: bool,

    /// Verbose logging to stderr (repeat for more)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn params(&self) -> AlignmentParams {
        AlignmentParams {
            match_score: self.match_score,
            mismatch: self.mismatch,
            gap_open: self.gap_open,
            gap_extend: self.gap_extend,
            band_width: self.band_width,
            zdrop: self.zdrop,
            right_align_gaps: self.right_align_gaps,
            start_score: self.start_score,
        }
    }

    fn output_options(&self) -> OutputOptions {
        OutputOptions {
            cigar: self.cigar,
            sequences: self.sequences,
            header: self.header,
            coord_format: if self.offset_length {
                CoordFormat::OffsetLength
            } else {
                CoordFormat::StartEnd
            },
        }
    }
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = validate(cli.mode, cli.backend.as_deref(), cli.params())?;

    let matrix = match &cli.matrix {
        Some(path) => ScoringMatrix::from_file(path)?,
        None => {
            let params = config.params();
            let match_score = i8::try_from(params.match_score).context("match score")?;
            let mismatch = i8::try_from(params.mismatch).context("mismatch penalty")?;
            ScoringMatrix::build(match_score, mismatch)
        }
    };
    debug!("scoring matrix: {:?}", matrix.as_slice());

    let options = cli.output_options();
    let mut aligner = Aligner::new(matrix, config);
    let mut writer =
        ResultWriter::new(io::stdout().lock(), options).context("writing header")?;

    let mut pairs = 0usize;
    for pair in PairReader::new(io::stdin().lock()) {
        let pair = pair.context("reading input pairs")?;
        let result = aligner.align(&pair.query, &pair.target, options.cigar)?;
        writer.write(&result, &pair).context("writing results")?;
        pairs += 1;
    }
    info!(
        "aligned {} pairs ({} workspace reallocations)",
        pairs,
        aligner.workspace().grow_events()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
