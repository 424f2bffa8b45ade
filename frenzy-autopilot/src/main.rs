//! Command line front end: run bots, verify tapes, sweep seeds and keep
//! the high-score table.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use frenzy_autopilot::benchmark::{resolve_bots, run_benchmark, BenchmarkConfig};
use frenzy_autopilot::bots::describe_bots;
use frenzy_autopilot::runner::{run_bot, write_tape};
use frenzy_autopilot::store::ScoreStore;
use frenzy_autopilot::util::{parse_seed, parse_seed_csv, parse_seed_file, seed_to_hex};
use frenzy_core::constants::{BOARD_HEIGHT_DEFAULT_PX, BOARD_WIDTH_DEFAULT_PX, MAX_TAPE_CLICKS};
use frenzy_core::sim::GameConfig;
use frenzy_core::{verify_tape, HighScores};

#[derive(Parser)]
#[command(
    name = "frenzy-autopilot",
    about = "Headless Color Frenzy sessions: bots, click tapes, verification and score keeping",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every bot in the roster
    ListBots,
    /// Run one bot through one session and write its click tape
    Generate {
        /// Bot id, as printed by list-bots
        #[arg(long)]
        bot: String,
        /// Session seed, decimal or 0x-prefixed hex
        #[arg(long, default_value = "0xDEADBEEF")]
        seed: String,
        /// Board width in pixels
        #[arg(long, default_value_t = BOARD_WIDTH_DEFAULT_PX)]
        width: u32,
        /// Board height in pixels
        #[arg(long, default_value_t = BOARD_HEIGHT_DEFAULT_PX)]
        height: u32,
        /// Tape output path (default tapes/<bot>-<seed>-score<score>.tape)
        #[arg(long)]
        out: Option<PathBuf>,
        /// High-score table location (default FRENZY_SCORES_PATH or frenzy_scores.json)
        #[arg(long)]
        scores_path: Option<PathBuf>,
        /// Skip recording the final score in the high-score table
        #[arg(long)]
        no_record: bool,
    },
    /// Check a tape and print the session journal it attests to
    Verify {
        /// Tape file to verify
        #[arg(long)]
        input: PathBuf,
        /// Reject tapes recording more clicks than this
        #[arg(long, default_value_t = MAX_TAPE_CLICKS)]
        max_clicks: u32,
    },
    /// Sweep bots across seeds and rank them by average score
    Benchmark {
        /// Comma-separated bot ids (default: the whole roster)
        #[arg(long)]
        bots: Option<String>,
        /// Comma-separated seeds, decimal or 0x-prefixed hex
        #[arg(long)]
        seeds: Option<String>,
        /// File with one seed per line, # comments allowed
        #[arg(long)]
        seed_file: Option<PathBuf>,
        /// First seed of a generated series (ignored with --seeds/--seed-file)
        #[arg(long)]
        seed_start: Option<String>,
        /// Length of the generated seed series
        #[arg(long, default_value_t = 12)]
        seed_count: usize,
        /// Board width in pixels
        #[arg(long, default_value_t = BOARD_WIDTH_DEFAULT_PX)]
        width: u32,
        /// Board height in pixels
        #[arg(long, default_value_t = BOARD_HEIGHT_DEFAULT_PX)]
        height: u32,
        /// Report directory (default benchmarks/run-<unix time>)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// How many of the best tapes to keep
        #[arg(long, default_value_t = 3)]
        save_top: usize,
        /// Worker threads for the sweep (default: all cores)
        #[arg(long)]
        jobs: Option<usize>,
    },
    /// Show the high-score table, optionally recording a score first
    Scores {
        /// High-score table location (default FRENZY_SCORES_PATH or frenzy_scores.json)
        #[arg(long)]
        scores_path: Option<PathBuf>,
        /// Score to record before printing
        #[arg(long)]
        record: Option<u32>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::ListBots => {
            for (id, description) in describe_bots() {
                println!("{id:<14} {description}");
            }
            Ok(())
        }
        Commands::Generate {
            bot,
            seed,
            width,
            height,
            out,
            scores_path,
            no_record,
        } => {
            let seed = parse_seed(&seed)?;
            let board = GameConfig::new(width, height);
            let artifact = run_bot(&bot, seed, board)?;
            let metrics = &artifact.metrics;

            let path = out.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "tapes/{bot}-{}-score{}.tape",
                    seed_to_hex(seed),
                    metrics.final_score
                ))
            });
            write_tape(&path, &artifact.tape)?;

            println!("bot={}", metrics.bot_id);
            println!("seed={}", seed_to_hex(seed));
            println!("board={}x{}", metrics.board_width, metrics.board_height);
            println!("score={}", metrics.final_score);
            println!("level={}", metrics.level_reached);
            println!(
                "clicks={} hits={} misses={} expired={}",
                metrics.clicks, metrics.hits, metrics.misses, metrics.expired
            );
            println!("rng_state={}", seed_to_hex(metrics.final_rng_state));
            println!("tape={} bytes={}", path.display(), artifact.tape.len());

            if !no_record {
                let store = ScoreStore::from_env_or(scores_path);
                let (changed, scores) = store.record(metrics.final_score)?;
                println!("scores_path={}", store.path().display());
                println!("score_recorded={changed}");
                if changed {
                    print_score_table(&scores);
                }
            }
            Ok(())
        }
        Commands::Verify { input, max_clicks } => {
            let bytes = fs::read(&input)
                .with_context(|| format!("failed reading {}", input.display()))?;
            let journal =
                verify_tape(&bytes, max_clicks).map_err(|err| anyhow!("tape rejected: {err}"))?;
            println!("tape={} bytes={}", input.display(), bytes.len());
            println!("seed={}", seed_to_hex(journal.seed));
            println!("board={}x{}", journal.board_width, journal.board_height);
            println!("clicks={}", journal.click_count);
            println!("score={}", journal.final_score);
            println!("rng_state={}", seed_to_hex(journal.final_rng_state));
            println!("checksum={}", seed_to_hex(journal.tape_checksum));
            println!("verdict=ok");
            Ok(())
        }
        Commands::Benchmark {
            bots,
            seeds,
            seed_file,
            seed_start,
            seed_count,
            width,
            height,
            out_dir,
            save_top,
            jobs,
        } => {
            let bots = resolve_bots(bots.as_deref())?;
            let seeds = resolve_seeds(
                seeds.as_deref(),
                seed_file.as_deref(),
                seed_start.as_deref(),
                seed_count,
            )?;
            let out_dir = out_dir
                .unwrap_or_else(|| PathBuf::from(format!("benchmarks/run-{}", timestamp_suffix())));

            println!("bots={}", bots.join(","));
            println!(
                "seeds={}",
                seeds.iter().map(|seed| seed_to_hex(*seed)).collect::<Vec<_>>().join(",")
            );
            println!("out_dir={}", out_dir.display());

            let report = run_benchmark(BenchmarkConfig {
                bots,
                seeds,
                board: GameConfig::new(width, height),
                out_dir: out_dir.clone(),
                save_top,
                jobs,
            })?;

            println!("runs={}", report.run_count);
            for (rank, entry) in report.bot_rankings.iter().enumerate() {
                println!(
                    "#{} {} avg={:.1} max={} min={} hit_rate={:.2} best_seed={}",
                    rank + 1,
                    entry.bot_id,
                    entry.avg_score,
                    entry.max_score,
                    entry.min_score,
                    entry.avg_hit_rate,
                    entry.best_seed_hex
                );
            }
            for tape in &report.saved_tapes {
                println!("saved={}", tape.path);
            }
            println!("summary={}", out_dir.join("summary.json").display());
            Ok(())
        }
        Commands::Scores {
            scores_path,
            record,
        } => {
            let store = ScoreStore::from_env_or(scores_path);
            println!("scores_path={}", store.path().display());
            let scores = match record {
                Some(score) => {
                    let (changed, scores) = store.record(score)?;
                    println!("score_recorded={changed}");
                    scores
                }
                None => store.load(),
            };
            print_score_table(&scores);
            Ok(())
        }
    }
}

fn print_score_table(scores: &HighScores) {
    if scores.is_empty() {
        println!("high_scores=none");
        return;
    }
    for (place, score) in scores.entries().iter().enumerate() {
        println!("high_score_{}={score}", place + 1);
    }
}

fn resolve_seeds(
    seeds: Option<&str>,
    seed_file: Option<&Path>,
    seed_start: Option<&str>,
    seed_count: usize,
) -> Result<Vec<u32>> {
    if let Some(csv) = seeds {
        return parse_seed_csv(csv);
    }
    if let Some(path) = seed_file {
        return parse_seed_file(path);
    }
    if seed_count == 0 {
        return Err(anyhow!("--seed-count must be at least 1"));
    }
    let start = match seed_start {
        Some(text) => parse_seed(text)?,
        None => 0xDEAD_BEEF,
    };
    let mut series = Vec::with_capacity(seed_count);
    let mut next = start;
    for _ in 0..seed_count {
        series.push(next);
        next = next.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    }
    Ok(series)
}

fn timestamp_suffix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
