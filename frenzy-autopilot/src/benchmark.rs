//! Seed sweeps across the roster, with CSV and JSON reporting.
//!
//! Every run in a sweep is a full 60 second session replayed through the
//! deterministic core, so rankings are exactly reproducible from the
//! seed list.

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use frenzy_core::sim::GameConfig;

use crate::bots::bot_ids;
use crate::runner::{run_bot, RunArtifact, RunMetrics};
use crate::util::seed_to_hex;

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub bots: Vec<String>,
    pub seeds: Vec<u32>,
    pub board: GameConfig,
    pub out_dir: PathBuf,
    pub save_top: usize,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub bot_id: String,
    pub seed: u32,
    pub seed_hex: String,
    pub final_score: u32,
    pub level_reached: u32,
    pub clicks: u32,
    pub hits: u32,
    pub misses: u32,
    pub expired: u32,
    pub hit_rate: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotAggregate {
    pub bot_id: String,
    pub runs: usize,
    pub avg_score: f64,
    pub max_score: u32,
    pub min_score: u32,
    pub avg_hit_rate: f64,
    pub best_seed_hex: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedTape {
    pub bot_id: String,
    pub seed_hex: String,
    pub final_score: u32,
    pub path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub bots: Vec<String>,
    pub seeds: Vec<String>,
    pub run_count: usize,
    pub bot_rankings: Vec<BotAggregate>,
    pub runs: Vec<RunRecord>,
    pub saved_tapes: Vec<SavedTape>,
}

/// Expands the CLI's bot selection; `None` fields the whole roster.
pub fn resolve_bots(selection: Option<&str>) -> Result<Vec<String>> {
    let known = bot_ids();
    let Some(csv) = selection else {
        return Ok(known.iter().map(|id| id.to_string()).collect());
    };
    let mut bots = Vec::new();
    for token in csv.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if !known.contains(&token) {
            return Err(anyhow!(
                "unknown bot '{token}'. available: {}",
                known.join(", ")
            ));
        }
        bots.push(token.to_string());
    }
    if bots.is_empty() {
        return Err(anyhow!("no bots parsed from --bots"));
    }
    Ok(bots)
}

pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.bots.is_empty() {
        return Err(anyhow!("benchmark needs at least one bot"));
    }
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark needs at least one seed"));
    }
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating directory {}", config.out_dir.display()))?;

    let sweep: Vec<(String, u32)> = config
        .bots
        .iter()
        .flat_map(|bot| config.seeds.iter().map(move |seed| (bot.clone(), *seed)))
        .collect();

    let board = config.board;
    let run_one = |(bot_id, seed): &(String, u32)| -> Result<RunArtifact> {
        run_bot(bot_id, *seed, board).with_context(|| {
            format!("benchmark run failed for bot={bot_id} seed={}", seed_to_hex(*seed))
        })
    };

    let artifacts: Vec<RunArtifact> = match config.jobs {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("failed building rayon pool")?;
            pool.install(|| sweep.par_iter().map(run_one).collect::<Result<Vec<_>>>())?
        }
        None => sweep.par_iter().map(run_one).collect::<Result<Vec<_>>>()?,
    };

    let runs: Vec<RunRecord> = artifacts
        .iter()
        .map(|artifact| record_from(&artifact.metrics))
        .collect();

    let mut bot_rankings: Vec<BotAggregate> = config
        .bots
        .iter()
        .map(|bot| {
            let bot_runs: Vec<&RunRecord> =
                runs.iter().filter(|run| &run.bot_id == bot).collect();
            aggregate(bot, &bot_runs)
        })
        .collect();
    bot_rankings.sort_by(|a, b| {
        b.avg_score
            .total_cmp(&a.avg_score)
            .then_with(|| b.max_score.cmp(&a.max_score))
            .then_with(|| a.bot_id.cmp(&b.bot_id))
    });

    let saved_tapes = save_top_tapes(&config.out_dir, &artifacts, config.save_top)?;

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default(),
        bots: config.bots.clone(),
        seeds: config.seeds.iter().map(|seed| seed_to_hex(*seed)).collect(),
        run_count: runs.len(),
        bot_rankings,
        runs,
        saved_tapes,
    };

    write_runs_csv(&config.out_dir.join("runs.csv"), &report.runs)?;
    write_rankings_csv(&config.out_dir.join("rankings.csv"), &report.bot_rankings)?;
    let json = serde_json::to_vec_pretty(&report).context("failed encoding summary.json")?;
    let summary_path = config.out_dir.join("summary.json");
    fs::write(&summary_path, json)
        .with_context(|| format!("failed writing {}", summary_path.display()))?;

    Ok(report)
}

fn record_from(metrics: &RunMetrics) -> RunRecord {
    RunRecord {
        bot_id: metrics.bot_id.clone(),
        seed: metrics.seed,
        seed_hex: seed_to_hex(metrics.seed),
        final_score: metrics.final_score,
        level_reached: metrics.level_reached,
        clicks: metrics.clicks,
        hits: metrics.hits,
        misses: metrics.misses,
        expired: metrics.expired,
        hit_rate: hit_rate(metrics.hits, metrics.misses),
    }
}

fn hit_rate(hits: u32, misses: u32) -> f64 {
    let resolved = hits + misses;
    if resolved == 0 {
        0.0
    } else {
        f64::from(hits) / f64::from(resolved)
    }
}

fn aggregate(bot_id: &str, runs: &[&RunRecord]) -> BotAggregate {
    let mut total_score = 0u64;
    let mut total_hit_rate = 0.0;
    let mut max_score = 0;
    let mut min_score = u32::MAX;
    let mut best_seed_hex = String::new();
    for run in runs {
        total_score += u64::from(run.final_score);
        total_hit_rate += run.hit_rate;
        min_score = min_score.min(run.final_score);
        if best_seed_hex.is_empty() || run.final_score > max_score {
            max_score = run.final_score;
            best_seed_hex = run.seed_hex.clone();
        }
    }
    let count = runs.len().max(1) as f64;
    BotAggregate {
        bot_id: bot_id.to_string(),
        runs: runs.len(),
        avg_score: total_score as f64 / count,
        max_score,
        min_score: if runs.is_empty() { 0 } else { min_score },
        avg_hit_rate: total_hit_rate / count,
        best_seed_hex,
    }
}

fn save_top_tapes(
    out_dir: &Path,
    artifacts: &[RunArtifact],
    save_top: usize,
) -> Result<Vec<SavedTape>> {
    if save_top == 0 {
        return Ok(Vec::new());
    }
    let tapes_dir = out_dir.join("tapes");
    fs::create_dir_all(&tapes_dir)
        .with_context(|| format!("failed creating directory {}", tapes_dir.display()))?;

    let mut order: Vec<usize> = (0..artifacts.len()).collect();
    order.sort_by(|&left, &right| {
        let (left, right) = (&artifacts[left].metrics, &artifacts[right].metrics);
        right
            .final_score
            .cmp(&left.final_score)
            .then_with(|| left.bot_id.cmp(&right.bot_id))
            .then_with(|| left.seed.cmp(&right.seed))
    });

    let mut saved = Vec::new();
    for (rank, &index) in order.iter().take(save_top).enumerate() {
        let artifact = &artifacts[index];
        let metrics = &artifact.metrics;
        let seed_hex = seed_to_hex(metrics.seed);
        let file = tapes_dir.join(format!(
            "{:02}-{}-{}-score{}.tape",
            rank + 1,
            metrics.bot_id,
            seed_hex,
            metrics.final_score
        ));
        fs::write(&file, &artifact.tape)
            .with_context(|| format!("failed writing {}", file.display()))?;
        saved.push(SavedTape {
            bot_id: metrics.bot_id.clone(),
            seed_hex,
            final_score: metrics.final_score,
            path: file.display().to_string(),
        });
    }
    Ok(saved)
}

fn write_runs_csv(path: &Path, runs: &[RunRecord]) -> Result<()> {
    let mut csv = String::from("bot,seed,score,level,clicks,hits,misses,expired,hit_rate\n");
    for run in runs {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{:.3}\n",
            run.bot_id,
            run.seed_hex,
            run.final_score,
            run.level_reached,
            run.clicks,
            run.hits,
            run.misses,
            run.expired,
            run.hit_rate
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}

fn write_rankings_csv(path: &Path, rankings: &[BotAggregate]) -> Result<()> {
    let mut csv =
        String::from("rank,bot,runs,avg_score,max_score,min_score,avg_hit_rate,best_seed\n");
    for (rank, entry) in rankings.iter().enumerate() {
        csv.push_str(&format!(
            "{},{},{},{:.2},{},{},{:.3},{}\n",
            rank + 1,
            entry.bot_id,
            entry.runs,
            entry.avg_score,
            entry.max_score,
            entry.min_score,
            entry.avg_hit_rate,
            entry.best_seed_hex
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}
