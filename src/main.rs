//! Command-line front end for the subword search engine.
//!
//! # Usage
//!
//! ```bash
//! # Branch-and-bound search over words of length 20 on 8 workers:
//! subword search parallel-pruned 20 --threads 8
//!
//! # Randomized descent, reproducible:
//! subword search descent 40 --radius 2 --samples 500 --seed 1
//!
//! # Exact record of one word, and one count:
//! subword word 0010110111010
//! subword count 0010110111010 0110
//!
//! # Logging is controlled via RUST_LOG (tracing-subscriber EnvFilter):
//! RUST_LOG=subword=debug subword search pruned 16
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use subword::cache::SubwordCache;
use subword::counter::SubwordCounter;
use subword::search::{self, SearchConfig, SearchMode};
use subword::validate::validate_engine;
use subword::word::Word;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Find binary words whose most frequent subword is as rare as possible.
#[derive(Parser, Debug)]
#[command(name = "subword", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search all words of length N for the smallest maximal occurrence count.
    Search {
        /// Search strategy.
        #[arg(value_enum)]
        mode: Mode,

        /// Word length.
        n: usize,

        /// Upper estimate of the optimum; only words at or below it are reported.
        #[arg(long)]
        hint: Option<u64>,

        /// Worker count for partitioned modes (power of two) [default: cores]
        #[arg(short, long)]
        threads: Option<usize>,

        /// Largest number of simultaneous flips in a descent neighbourhood.
        #[arg(long, default_value_t = 2)]
        radius: usize,

        /// Unimproving perturbations before a descent perturbs harder.
        #[arg(long, default_value_t = 1_000)]
        samples: u64,

        /// Seed for descent.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Histogram of the maximal occurrence count over all words of length N.
    Histogram {
        /// Word length.
        n: usize,
    },
    /// Exact maximal occurrence count of one word and its witnesses.
    Word {
        /// Word as a 0/1 string.
        word: Word,
    },
    /// Occurrences of SUBWORD in WORD.
    Count {
        /// Word as a 0/1 string.
        word: Word,
        /// Subword as a 0/1 string.
        subword: Word,
    },
    /// Best one-letter extension of a word under the fast score.
    Insert {
        /// Word as a 0/1 string.
        word: Word,
    },
    /// Run the built-in self-checks.
    Validate,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Every primitive word, in order.
    Exhaustive,
    /// Branch-and-bound over prefixes.
    Pruned,
    /// Randomized neighbourhood descent.
    Descent,
    /// Exhaustive search on a worker pool.
    Parallel,
    /// Branch-and-bound on a worker pool.
    ParallelPruned,
}

impl From<Mode> for SearchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Exhaustive => SearchMode::Exhaustive,
            Mode::Pruned => SearchMode::Pruned,
            Mode::Descent => SearchMode::Descent,
            Mode::Parallel => SearchMode::Parallel,
            Mode::ParallelPruned => SearchMode::ParallelPruned,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("subword=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cache = SubwordCache::new();

    match cli.command {
        Command::Search {
            mode,
            n,
            hint,
            threads,
            radius,
            samples,
            seed,
        } => {
            let mut cfg = SearchConfig {
                hint,
                radius,
                samples,
                seed,
                ..SearchConfig::for_length(n)
            };
            if let Some(threads) = threads {
                cfg.threads = threads;
            }
            let mode = SearchMode::from(mode);
            let best = search::evaluate_mode(mode, &cfg, &cache).with_context(|| format!("{mode} search failed"))?;
            if best.is_empty() {
                println!("n={n} no word at or below {}", best.occurrences);
            } else {
                println!("n={n} occurrences={} words={}", best.occurrences, best.records.len());
                for record in &best.records {
                    println!("{record}");
                }
            }
        }
        Command::Histogram { n } => {
            for (occurrences, words) in search::histogram(n, &cache)? {
                println!("{occurrences} {words}");
            }
        }
        Command::Word { word } => {
            println!("{}", search::evaluate_word(&word, &cache));
        }
        Command::Count { word, subword } => {
            println!("{}", SubwordCounter::new(&cache).count(&word, &subword));
        }
        Command::Insert { word } => match search::insertion_heuristic(&word, &cache)? {
            Some((extended, score)) => println!("{extended} score={score}"),
            None => println!("no extension of {word} scores below twice its own"),
        },
        Command::Validate => {
            validate_engine().context("validation failed")?;
            println!("Validation OK: counter and search drivers agree with brute force.");
        }
    }
    Ok(())
}
