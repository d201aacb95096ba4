use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use pallet_autopilot::benchmark::{resolve_bots, run_benchmark, BenchmarkConfig};
use pallet_autopilot::bots::{bot_ids, bot_manifest_entries, create_bot, describe_bots};
use pallet_autopilot::config::PolicyConfig;
use pallet_autopilot::game::{
    GameConfig, DEFAULT_AGENT_SPEED, DEFAULT_PALLETS, DEFAULT_PICKUP_RADIUS,
};
use pallet_autopilot::runner::{run_bot, write_trajectory, RunConfig, DEFAULT_MAX_STEPS};
use pallet_autopilot::util::{
    parse_seed, parse_seed_csv, parse_seed_file, seed_sequence, seed_to_hex, DEFAULT_SEED_START,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(name = "pallet-autopilot")]
#[command(about = "Closest-pallet autopilot and multi-game evaluation harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct GameArgs {
    /// View size handed to the bot (defaults to PALLET_STATE_SIZE or 64)
    #[arg(long)]
    state_size: Option<usize>,
    /// World side length (defaults to the view size)
    #[arg(long)]
    world_size: Option<usize>,
    #[arg(long, default_value_t = DEFAULT_PALLETS)]
    pallets: usize,
    #[arg(long, default_value_t = DEFAULT_AGENT_SPEED)]
    speed: f64,
    #[arg(long, default_value_t = DEFAULT_PICKUP_RADIUS)]
    pickup_radius: f64,
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: u32,
}

impl GameArgs {
    fn run_config(self) -> Result<RunConfig> {
        let policy = PolicyConfig::from_env();
        let state_size = self.state_size.unwrap_or(policy.state_size);
        let game = GameConfig {
            state_size,
            world_size: self.world_size.unwrap_or(state_size),
            n_pallets: self.pallets,
            agent_speed: self.speed,
            pickup_radius: self.pickup_radius,
        };
        game.validate()?;
        Ok(RunConfig {
            game,
            max_steps: self.max_steps,
        })
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available bots
    ListBots,
    /// Export the bot roster with resolved policy configs
    RosterManifest {
        #[arg(long, default_value_t = 64)]
        state_size: usize,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Play a single game and report its outcome
    Play {
        #[arg(long, default_value = "closest")]
        bot: String,
        #[arg(long)]
        seed: String,
        #[command(flatten)]
        game: GameArgs,
        /// Write the action trajectory as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run many games per bot and report aggregate statistics
    Benchmark {
        #[arg(long)]
        bots: Option<String>,
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_file: Option<PathBuf>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 100)]
        seed_count: u32,
        #[command(flatten)]
        game: GameArgs,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        save_top: usize,
        #[arg(long)]
        jobs: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli { command } = Cli::parse();

    match command {
        Commands::ListBots => {
            for (id, description) in describe_bots() {
                println!("{id:20} {description}");
            }
        }
        Commands::RosterManifest { state_size, output } => {
            let manifest = bot_manifest_entries(state_size);
            let encoded = serde_json::to_vec_pretty(&manifest)?;
            if let Some(path) = output {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, encoded)?;
                println!("wrote={}", path.display());
                println!("bots={}", manifest.len());
            } else {
                println!("{}", String::from_utf8_lossy(&encoded));
            }
        }
        Commands::Play {
            bot,
            seed,
            game,
            output,
        } => {
            let run_config = game.run_config()?;
            if create_bot(&bot, run_config.game.state_size).is_none() {
                let available = bot_ids().join(", ");
                return Err(anyhow!("unknown bot '{bot}'. available: {available}"));
            }
            let seed = parse_seed(&seed)?;
            let artifact = run_bot(&bot, seed, &run_config)?;

            println!("bot={}", artifact.metrics.bot_id);
            println!("seed={}", seed_to_hex(seed));
            println!("steps={}", artifact.metrics.termination_step);
            println!("reward={}", artifact.metrics.total_reward);
            println!("collected={}", artifact.metrics.collected_pallets);
            println!("remaining={}", artifact.metrics.remaining_pallets);
            println!("completed={}", artifact.metrics.completed);
            println!("exploring_steps={}", artifact.metrics.exploring_steps);
            if let Some(path) = output {
                write_trajectory(&path, &artifact)?;
                println!("output={}", path.display());
            }
        }
        Commands::Benchmark {
            bots,
            seeds,
            seed_file,
            seed_start,
            seed_count,
            game,
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
            let run = game.run_config()?;
            let out_dir = out_dir
                .unwrap_or_else(|| PathBuf::from(format!("benchmarks/{}", timestamp_suffix())));

            let report = run_benchmark(BenchmarkConfig {
                bots,
                seeds,
                run,
                out_dir: out_dir.clone(),
                save_top,
                jobs,
            })?;

            println!("runs={}", report.run_count);
            println!(
                "jobs={}",
                report
                    .jobs
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
            println!("out_dir={}", out_dir.display());
            println!("rankings:");
            for (idx, bot) in report.bot_rankings.iter().enumerate() {
                println!(
                    "  {}. {}  avg_reward={:.2} std_reward={:.2} avg_remaining={:.2} std_remaining={:.2} avg_steps={:.1} completed={:.0}% exploring={:.1}",
                    idx + 1,
                    bot.bot_id,
                    bot.avg_reward,
                    bot.std_reward,
                    bot.avg_remaining_pallets,
                    bot.std_remaining_pallets,
                    bot.avg_termination_step,
                    bot.completion_rate * 100.0,
                    bot.avg_exploring_steps,
                );
            }
            if !report.saved_trajectories.is_empty() {
                println!("saved trajectories:");
                for saved in report.saved_trajectories.iter().take(10) {
                    println!(
                        "  [#{:02}] {} {} reward={} steps={} {}",
                        saved.rank,
                        saved.bot_id,
                        saved.seed_hex,
                        saved.reward,
                        saved.steps,
                        saved.path,
                    );
                }
            }
        }
    }

    Ok(())
}

fn resolve_seeds(
    seeds: Option<&str>,
    seed_file: Option<&Path>,
    seed_start: Option<&str>,
    seed_count: u32,
) -> Result<Vec<u32>> {
    if let Some(path) = seed_file {
        return parse_seed_file(path);
    }

    if let Some(csv) = seeds {
        return parse_seed_csv(csv);
    }

    let start = if let Some(start) = seed_start {
        parse_seed(start)?
    } else {
        DEFAULT_SEED_START
    };
    Ok(seed_sequence(start, seed_count))
}

fn timestamp_suffix() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{now}")
}
