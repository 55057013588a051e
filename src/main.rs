use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use galaxy::{bench_forces, Config, ConfigError, TreeEngine, Units};

#[derive(Parser, Debug)]
#[command(about = "Barnes-Hut N-body galaxy simulation")]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(default_value = "galaxy.yaml")]
    config: PathBuf,

    /// Run the direct-vs-tree force timing sweep and exit.
    #[arg(long)]
    bench: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    if args.bench {
        bench_forces();
        return Ok(());
    }

    let quit = Arc::new(AtomicBool::new(false));
    {
        let quit = quit.clone();
        ctrlc::set_handler(move || quit.store(true, Ordering::SeqCst))?;
    }

    let cfg = Config::from_path(&args.config)?;
    let units = Units::from_config(&cfg)?;

    match cfg.simulation.dim {
        2 => run_sim::<2>(&cfg, &units, &quit),
        3 => run_sim::<3>(&cfg, &units, &quit),
        dim => Err(ConfigError::UnsupportedDimension(dim).into()),
    }
}

fn run_sim<const D: usize>(cfg: &Config, units: &Units, quit: &AtomicBool) -> Result<()> {
    let mut engine = TreeEngine::<D>::from_config(cfg, units)?;
    let t_end = cfg.simulation.integration.t_end;

    while engine.step() {
        if quit.load(Ordering::SeqCst) {
            log::info!("interrupted at t = {}", engine.time);
            break;
        }
        if t_end.is_some_and(|t| engine.time >= t) {
            log::info!("reached t_end at t = {}", engine.time);
            break;
        }
    }
    Ok(())
}
