//! Reach-avoid controller for a robot on a grid with slippery floor.
//!
//! Every cell of a `width x height` grid is an abstract state. The robot has
//! five inputs (stay, north, east, south, west); with `--slip` a move may also
//! overshoot by one cell, which the controller must account for. The robot has
//! to reach the top-right corner while avoiding a wall in the middle.

use std::path::PathBuf;

use clap::Parser;
use log::info;

use synth_rs::reach::ReachabilityGame;
use synth_rs::transition::{TransitionBuilder, TransitionFunction};
use synth_rs::types::{AbsType, Input, State};

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Grid width.
    #[arg(long, value_name = "INT", default_value = "12")]
    width: usize,

    /// Grid height.
    #[arg(long, value_name = "INT", default_value = "8")]
    height: usize,

    /// Moves may overshoot by one cell.
    #[arg(long)]
    slip: bool,

    /// Write the abstraction and controller as a DOT file.
    #[arg(long, value_name = "FILE")]
    dot: Option<PathBuf>,

    /// Log level.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log: simplelog::LevelFilter,
}

const MOVES: [(i64, i64); 5] = [(0, 0), (0, 1), (1, 0), (0, -1), (-1, 0)];
const ARROWS: [char; 5] = ['o', '^', '>', 'v', '<'];

struct Grid {
    width: usize,
    height: usize,
}

impl Grid {
    fn state(&self, x: usize, y: usize) -> State {
        State::new((y * self.width + x) as AbsType)
    }

    fn cell(&self, state: State) -> (usize, usize) {
        (state.index() % self.width, state.index() / self.width)
    }

    fn clamp(&self, x: i64, y: i64) -> (usize, usize) {
        (
            x.clamp(0, self.width as i64 - 1) as usize,
            y.clamp(0, self.height as i64 - 1) as usize,
        )
    }

    fn is_wall(&self, x: usize, y: usize) -> bool {
        x == self.width / 2 && y < self.height * 3 / 4
    }

    fn abstraction(&self, slip: bool) -> color_eyre::Result<TransitionFunction> {
        let mut builder = TransitionBuilder::new(self.width * self.height, MOVES.len());
        for y in 0..self.height {
            for x in 0..self.width {
                let pre = self.state(x, y);
                for (j, &(dx, dy)) in MOVES.iter().enumerate() {
                    let input = Input::new(j as AbsType);
                    let (nx, ny) = self.clamp(x as i64 + dx, y as i64 + dy);
                    builder.add(pre, input, self.state(nx, ny))?;
                    if slip && (dx, dy) != (0, 0) {
                        let (sx, sy) = self.clamp(x as i64 + 2 * dx, y as i64 + 2 * dy);
                        builder.add(pre, input, self.state(sx, sy))?;
                    }
                }
            }
        }
        Ok(builder.build()?)
    }
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

    let grid = Grid {
        width: args.width,
        height: args.height,
    };
    let tf = grid.abstraction(args.slip)?;
    println!("tf = {:?}", tf);

    let goal = grid.state(grid.width - 1, grid.height - 1);
    let result = ReachabilityGame::new(&tf)
        .avoid(&|s: State| {
            let (x, y) = grid.cell(s);
            grid.is_wall(x, y)
        })
        .solve(&[goal][..])?;

    info!(
        "Winning states: {} of {}",
        result.domain.len(),
        tf.no_states()
    );

    println!("Controller (o = stay, # = wall, . = losing):");
    for y in (0..grid.height).rev() {
        let row: String = (0..grid.width)
            .map(|x| {
                let s = grid.state(x, y);
                match result.domain.witness(s) {
                    _ if grid.is_wall(x, y) => '#',
                    Some(j) => ARROWS[j.index()],
                    None => '.',
                }
            })
            .collect();
        println!("  {}", row);
    }

    println!("Steps to goal:");
    for y in (0..grid.height).rev() {
        let row: Vec<String> = (0..grid.width)
            .map(|x| match result.value.get(grid.state(x, y)) {
                Some(v) => format!("{:>3}", v),
                None => "  -".to_string(),
            })
            .collect();
        println!("  {}", row.join(""));
    }

    if let Some(path) = &args.dot {
        std::fs::write(path, tf.to_dot(Some(&result.domain))?)?;
        info!("Wrote {}", path.display());
    }

    let time_total = time_total.elapsed();
    println!("Total time: {:.3} s", time_total.as_secs_f64());

    Ok(())
}
