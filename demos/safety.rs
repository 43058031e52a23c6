//! Safety controller for a water tank with uncertain demand.
//!
//! The tank level is discretised into `levels` cells, the pump into `rates`
//! settings. Each step the level rises by the pump rate and drops by a demand
//! somewhere in `demand_min..=demand_max`, chosen by the environment. The
//! controller must keep the level inside `[low, high]` forever.

use clap::Parser;
use log::info;

use synth_rs::invariance::solve_invariance_game;
use synth_rs::transition::TransitionBuilder;
use synth_rs::types::{AbsType, Input, State};

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of discrete tank levels.
    #[arg(long, value_name = "INT", default_value = "40")]
    levels: usize,

    /// Number of pump settings (0 means off).
    #[arg(long, value_name = "INT", default_value = "5")]
    rates: usize,

    /// Smallest demand per step.
    #[arg(long, value_name = "INT", default_value = "1")]
    demand_min: usize,

    /// Largest demand per step.
    #[arg(long, value_name = "INT", default_value = "3")]
    demand_max: usize,

    /// Lowest safe level.
    #[arg(long, value_name = "INT", default_value = "5")]
    low: usize,

    /// Highest safe level.
    #[arg(long, value_name = "INT", default_value = "30")]
    high: usize,

    /// Log level.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log: simplelog::LevelFilter,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();
    println!("args = {:?}", args);

    if args.demand_min > args.demand_max {
        color_eyre::eyre::bail!("demand_min must not exceed demand_max");
    }
    if args.levels == 0 {
        color_eyre::eyre::bail!("need at least one level");
    }

    let top = args.levels as i64 - 1;
    let mut builder = TransitionBuilder::new(args.levels, args.rates);
    for level in 0..args.levels {
        for rate in 0..args.rates {
            for demand in args.demand_min..=args.demand_max {
                let next = (level as i64 + rate as i64 - demand as i64).clamp(0, top);
                builder.add(
                    State::new(level as AbsType),
                    Input::new(rate as AbsType),
                    State::new(next as AbsType),
                )?;
            }
        }
    }
    let tf = builder.build()?;
    println!("tf = {:?}", tf);

    let safe = args.low as AbsType..args.high as AbsType + 1;
    let domain = solve_invariance_game(&tf, &safe)?;

    info!("Winning levels: {} of {}", domain.len(), tf.no_states());
    info!("Admissible memoryless controllers: {}", domain.count_controllers());

    println!("Valid pump rates per level:");
    for state in tf.states().rev() {
        let inputs = domain.inputs(state);
        if inputs.is_empty() {
            println!("  {:>3}: -", state.id());
        } else {
            let rates: Vec<String> = inputs.iter().map(|j| j.id().to_string()).collect();
            println!("  {:>3}: {}", state.id(), rates.join(" "));
        }
    }

    let time_total = time_total.elapsed();
    println!("Total time: {:.3} s", time_total.as_secs_f64());

    Ok(())
}
