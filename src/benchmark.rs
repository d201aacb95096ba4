use crate::bots::bot_ids;
use crate::runner::{run_bot, write_trajectory, RunArtifact, RunConfig, RunMetrics};
use crate::util::{mean, seed_to_hex, std_dev};
use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub bots: Vec<String>,
    pub seeds: Vec<u32>,
    pub run: RunConfig,
    pub out_dir: PathBuf,
    pub save_top: usize,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub bot_id: String,
    pub seed: u32,
    pub seed_hex: String,
    pub termination_step: u32,
    pub total_reward: f64,
    pub remaining_pallets: usize,
    pub collected_pallets: usize,
    pub completed: bool,
    pub exploring_steps: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotAggregate {
    pub bot_id: String,
    pub runs: usize,
    pub avg_reward: f64,
    pub std_reward: f64,
    pub max_reward: f64,
    pub avg_remaining_pallets: f64,
    pub std_remaining_pallets: f64,
    pub avg_termination_step: f64,
    pub completion_rate: f64,
    pub avg_exploring_steps: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedTrajectoryRecord {
    pub rank: usize,
    pub bot_id: String,
    pub seed: u32,
    pub seed_hex: String,
    pub reward: f64,
    pub steps: u32,
    pub path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub max_steps: u32,
    pub state_size: usize,
    pub world_size: usize,
    pub n_pallets: usize,
    pub jobs: Option<usize>,
    pub bots: Vec<String>,
    pub seeds: Vec<u32>,
    pub run_count: usize,
    pub bot_rankings: Vec<BotAggregate>,
    pub runs: Vec<RunRecord>,
    pub saved_trajectories: Vec<SavedTrajectoryRecord>,
}

pub fn resolve_bots(input: Option<&str>) -> Result<Vec<String>> {
    match input {
        None => Ok(bot_ids().iter().map(|id| (*id).to_string()).collect()),
        Some(raw) => {
            let mut bots = Vec::new();
            for token in raw.split(',') {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                bots.push(token.to_string());
            }
            if bots.is_empty() {
                return Err(anyhow!("--bots resolved to empty list"));
            }
            Ok(bots)
        }
    }
}

/// Plays every bot against every seed and aggregates per-bot statistics.
/// Each game owns its engine, bot and RNG, so runs proceed in parallel.
pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }
    if config.bots.is_empty() {
        return Err(anyhow!("benchmark requires at least one bot"));
    }
    if let Some(jobs) = config.jobs {
        if jobs == 0 {
            return Err(anyhow!("benchmark --jobs must be >= 1 when provided"));
        }
    }
    for bot in &config.bots {
        if !bot_ids().contains(&bot.as_str()) {
            let available = bot_ids().join(", ");
            return Err(anyhow!("unknown bot '{bot}'. available: {available}"));
        }
    }
    config.run.game.validate().context("invalid game config")?;
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    tracing::info!(
        bots = config.bots.len(),
        seeds = config.seeds.len(),
        max_steps = config.run.max_steps,
        "starting benchmark"
    );

    let run_jobs: Vec<(String, u32)> = config
        .bots
        .iter()
        .flat_map(|bot| config.seeds.iter().map(move |seed| (bot.clone(), *seed)))
        .collect();

    let run_one = |(bot_id, seed): &(String, u32)| -> Result<RunArtifact> {
        run_bot(bot_id, *seed, &config.run)
            .with_context(|| format!("benchmark run failed for bot={bot_id} seed={seed:#x}"))
    };

    let run_results: Vec<Result<RunArtifact>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| run_jobs.par_iter().map(run_one).collect())
    } else {
        run_jobs.par_iter().map(run_one).collect()
    };

    let mut runs = Vec::with_capacity(run_results.len());
    for result in run_results {
        runs.push(result?);
    }

    let mut grouped: BTreeMap<String, Vec<&RunMetrics>> = BTreeMap::new();
    for run in &runs {
        grouped
            .entry(run.metrics.bot_id.clone())
            .or_default()
            .push(&run.metrics);
    }

    let mut rankings: Vec<BotAggregate> = grouped
        .into_iter()
        .map(|(bot_id, bot_runs)| aggregate(bot_id, &bot_runs))
        .collect();
    rankings.sort_by(|a, b| {
        b.avg_reward
            .total_cmp(&a.avg_reward)
            .then_with(|| a.avg_remaining_pallets.total_cmp(&b.avg_remaining_pallets))
            .then_with(|| a.avg_termination_step.total_cmp(&b.avg_termination_step))
    });

    let mut run_records: Vec<RunRecord> = runs
        .iter()
        .map(|run| RunRecord {
            bot_id: run.metrics.bot_id.clone(),
            seed: run.metrics.seed,
            seed_hex: seed_to_hex(run.metrics.seed),
            termination_step: run.metrics.termination_step,
            total_reward: run.metrics.total_reward,
            remaining_pallets: run.metrics.remaining_pallets,
            collected_pallets: run.metrics.collected_pallets,
            completed: run.metrics.completed,
            exploring_steps: run.metrics.exploring_steps,
        })
        .collect();
    run_records.sort_by(|a, b| {
        b.total_reward
            .total_cmp(&a.total_reward)
            .then_with(|| a.termination_step.cmp(&b.termination_step))
            .then_with(|| a.bot_id.cmp(&b.bot_id))
    });

    let mut saved_trajectories = Vec::new();
    if config.save_top > 0 {
        save_top_trajectories(&config.out_dir, &runs, config.save_top, &mut saved_trajectories)?;
    }

    write_runs_csv(&config.out_dir.join("runs.csv"), &run_records)?;
    write_rankings_csv(&config.out_dir.join("rankings.csv"), &rankings)?;

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        max_steps: config.run.max_steps,
        state_size: config.run.game.state_size,
        world_size: config.run.game.world_size,
        n_pallets: config.run.game.n_pallets,
        jobs: config.jobs,
        bots: config.bots,
        seeds: config.seeds,
        run_count: run_records.len(),
        bot_rankings: rankings,
        runs: run_records,
        saved_trajectories,
    };

    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary json")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;

    tracing::info!(
        runs = report.run_count,
        out_dir = %config.out_dir.display(),
        "benchmark finished"
    );

    Ok(report)
}

fn aggregate(bot_id: String, runs: &[&RunMetrics]) -> BotAggregate {
    let rewards: Vec<f64> = runs.iter().map(|r| r.total_reward).collect();
    let remaining: Vec<f64> = runs.iter().map(|r| r.remaining_pallets as f64).collect();
    let steps: Vec<f64> = runs.iter().map(|r| r.termination_step as f64).collect();
    let exploring: Vec<f64> = runs.iter().map(|r| r.exploring_steps as f64).collect();
    let completed = runs.iter().filter(|r| r.completed).count();

    BotAggregate {
        bot_id,
        runs: runs.len(),
        avg_reward: mean(&rewards),
        std_reward: std_dev(&rewards),
        max_reward: rewards.iter().cloned().fold(0.0, f64::max),
        avg_remaining_pallets: mean(&remaining),
        std_remaining_pallets: std_dev(&remaining),
        avg_termination_step: mean(&steps),
        completion_rate: completed as f64 / runs.len().max(1) as f64,
        avg_exploring_steps: mean(&exploring),
    }
}

fn save_top_trajectories(
    out_dir: &Path,
    runs: &[RunArtifact],
    count: usize,
    saved: &mut Vec<SavedTrajectoryRecord>,
) -> Result<()> {
    let save_dir = out_dir.join("top-reward");
    fs::create_dir_all(&save_dir)
        .with_context(|| format!("failed creating {}", save_dir.display()))?;

    let mut by_bot: BTreeMap<&str, Vec<&RunArtifact>> = BTreeMap::new();
    for run in runs {
        by_bot.entry(run.metrics.bot_id.as_str()).or_default().push(run);
    }

    for (bot_id, mut bot_runs) in by_bot {
        bot_runs.sort_by(|a, b| {
            b.metrics
                .total_reward
                .total_cmp(&a.metrics.total_reward)
                .then_with(|| a.metrics.termination_step.cmp(&b.metrics.termination_step))
                .then_with(|| a.metrics.seed.cmp(&b.metrics.seed))
        });

        for (idx, run) in bot_runs.into_iter().take(count).enumerate() {
            let rank = idx + 1;
            let filename = format!(
                "rank{rank:02}-{bot_id}-seed{:08x}-reward{}-steps{}.json",
                run.metrics.seed, run.metrics.total_reward, run.metrics.termination_step
            );
            let path = save_dir.join(filename);
            write_trajectory(&path, run)?;

            saved.push(SavedTrajectoryRecord {
                rank,
                bot_id: bot_id.to_string(),
                seed: run.metrics.seed,
                seed_hex: seed_to_hex(run.metrics.seed),
                reward: run.metrics.total_reward,
                steps: run.metrics.termination_step,
                path: path.to_string_lossy().into_owned(),
            });
        }
    }

    Ok(())
}

fn write_runs_csv(path: &Path, rows: &[RunRecord]) -> Result<()> {
    let mut csv = String::from(
        "bot_id,seed_hex,seed,termination_step,total_reward,remaining_pallets,collected_pallets,completed,exploring_steps\n",
    );
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            row.bot_id,
            row.seed_hex,
            row.seed,
            row.termination_step,
            row.total_reward,
            row.remaining_pallets,
            row.collected_pallets,
            row.completed,
            row.exploring_steps
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}

fn write_rankings_csv(path: &Path, rows: &[BotAggregate]) -> Result<()> {
    let mut csv = String::from(
        "rank,bot_id,runs,avg_reward,std_reward,max_reward,avg_remaining_pallets,std_remaining_pallets,avg_termination_step,completion_rate,avg_exploring_steps\n",
    );
    for (idx, row) in rows.iter().enumerate() {
        csv.push_str(&format!(
            "{},{},{},{:.3},{:.3},{},{:.3},{:.3},{:.2},{:.4},{:.2}\n",
            idx + 1,
            row.bot_id,
            row.runs,
            row.avg_reward,
            row.std_reward,
            row.max_reward,
            row.avg_remaining_pallets,
            row.std_remaining_pallets,
            row.avg_termination_step,
            row.completion_rate,
            row.avg_exploring_steps
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}
