use clap::Parser;
use gasma::{AlignStats, GasmaArgs, GasmaError, LogTracer};
use log::{info, warn};
use pa_types::*;
use serde::Serialize;

#[derive(Parser)]
#[clap(author, about)]
pub struct Cli {
    /// The first sequence. Omit both to align random pairs.
    #[clap(requires = "b")]
    a: Option<String>,
    /// The second sequence.
    b: Option<String>,

    /// Length of generated sequences
    #[clap(short, default_value_t = 1000, help_heading = "Input generation")]
    n: usize,

    /// Error rate of generated sequences
    #[clap(short, default_value_t = 0.05, help_heading = "Input generation")]
    e: f32,

    /// Seed of the first generated pair
    #[clap(long, default_value_t = 31415, help_heading = "Input generation")]
    seed: u64,

    /// Number of generated pairs
    #[clap(long, default_value_t = 1, help_heading = "Input generation")]
    samples: u64,

    /// Also compute the exact edit distance
    #[clap(long)]
    check: bool,

    /// Print one JSON object per pair
    #[clap(long)]
    json: bool,

    #[clap(flatten)]
    args: GasmaArgs,
}

#[derive(Serialize)]
struct Report<'a> {
    args: &'a GasmaArgs,
    cost: Cost,
    energy: Option<Cost>,
    distance: Option<Cost>,
    coverage: f64,
    leaps: usize,
    cigar: String,
    seconds: f64,
    stats: AlignStats,
}

impl Cli {
    fn inputs(&self) -> Vec<(Sequence, Sequence)> {
        match (&self.a, &self.b) {
            (Some(a), Some(b)) => vec![(a.as_bytes().to_vec(), b.as_bytes().to_vec())],
            _ => (0..self.samples)
                .map(|i| pa_generate::uniform_seeded(self.n, self.e, self.seed + i))
                .collect(),
        }
    }
}

fn main() -> Result<(), GasmaError> {
    env_logger::init();
    let cli = Cli::parse();
    let aligner = cli.args.build_with_tracer(LogTracer);
    info!("{}", cli.args.to_string());

    let mut total = AlignStats::default();
    let mut excess = 0;
    let start = instant::Instant::now();
    for (a, b) in cli.inputs() {
        let pair_start = instant::Instant::now();
        let (aln, stats) = aligner.align(&a, &b)?;
        let seconds = pair_start.elapsed().as_secs_f64();
        let distance = cli
            .check
            .then(|| triple_accel::levenshtein_exp(&a, &b) as Cost);
        if let Some(d) = distance {
            excess += aln.cost - d;
        }
        total += stats;

        let report = Report {
            args: &cli.args,
            cost: aln.cost,
            energy: aln.energy,
            distance,
            coverage: aln.walk.coverage(),
            leaps: aln.walk.num_leaps(),
            cigar: aln.walk.cigar(),
            seconds,
            stats,
        };
        if cli.json {
            match serde_json::to_string(&report) {
                Ok(line) => println!("{line}"),
                Err(err) => warn!("could not serialize the report: {err}"),
            }
        } else {
            print!("cost {:>6}", report.cost);
            if let Some(d) = distance {
                print!(" dist {d:>6}");
            }
            println!(
                " leaps {:>4} coverage {:>5.3} t {:>9.6}s {}",
                report.leaps, report.coverage, seconds, report.cigar
            );
        }
    }

    info!(
        "{} pairs in {:.3}s: {} highways, {} chosen, {} steps, {} energy levels",
        total.sample_size,
        start.elapsed().as_secs_f64(),
        total.highways,
        total.chosen,
        total.steps,
        total.energy_levels,
    );
    if cli.check && total.sample_size > 0 {
        info!(
            "mean excess over the edit distance: {:.3}",
            excess as f64 / total.sample_size as f64
        );
    }
    Ok(())
}
