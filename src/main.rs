//! Plinko Draw entry point
//!
//! Headless driver: runs a drop or a batch test on a synthetic 60 Hz clock
//! and prints the result.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use plinko_draw::consts::FRAME_DT;
    use plinko_draw::entries::{Entry, expand_weighted, shuffled};
    use plinko_draw::sim::DistributionStats;
    use plinko_draw::{DrawListener, PhysicsSettings, Simulator};

    const USAGE: &str = "usage: plinko-draw [--seed N] [--settings FILE] [--randomize] \
                         [--batch BALLS --slots N [--json]] NAME[:WEIGHT]...";

    #[derive(Debug, Default)]
    struct Args {
        seed: Option<u64>,
        settings: Option<PathBuf>,
        randomize: bool,
        batch: Option<usize>,
        slots: usize,
        json: bool,
        entries: Vec<Entry>,
    }

    fn parse_args() -> Result<Args, String> {
        let mut args = Args {
            slots: 10,
            ..Args::default()
        };
        let mut it = std::env::args().skip(1);
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--seed" => args.seed = Some(number(&arg, it.next())?),
                "--batch" => args.batch = Some(number(&arg, it.next())?),
                "--slots" => args.slots = number(&arg, it.next())?,
                "--settings" => {
                    args.settings = Some(it.next().ok_or("--settings needs a path")?.into())
                }
                "--randomize" => args.randomize = true,
                "--json" => args.json = true,
                "-h" | "--help" => return Err(USAGE.to_string()),
                flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
                text => args.entries.extend(Entry::parse(text)),
            }
        }
        Ok(args)
    }

    fn number<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
        value
            .as_deref()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| format!("{flag} needs a number"))
    }

    #[derive(Default)]
    struct Outcome {
        winner: Option<String>,
        results: Option<Vec<u32>>,
    }

    struct Printer(Rc<RefCell<Outcome>>);

    impl DrawListener for Printer {
        fn on_displayed_winner_change(&mut self, name: &str) {
            log::debug!("Ball settling over {}", name);
        }

        fn on_complete(&mut self, winner: &str) {
            self.0.borrow_mut().winner = Some(winner.to_string());
        }

        fn on_test_complete(&mut self, results: &[u32]) {
            self.0.borrow_mut().results = Some(results.to_vec());
        }
    }

    fn print_stats(stats: &DistributionStats) {
        println!(
            "{} balls over {} slots (expected {:.2}% each)",
            stats.total,
            stats.num_slots(),
            stats.expected_percentage
        );
        for (slot, ((count, pct), dev)) in stats
            .counts
            .iter()
            .zip(&stats.percentages)
            .zip(&stats.deviations)
            .enumerate()
        {
            println!("  slot {slot:>2}: {count:>6}  {pct:>6.2}%  ({dev:+.2})");
        }
        println!(
            "std dev {:.2}, max deviation {:.2} pp",
            stats.std_dev,
            stats.max_deviation()
        );
    }

    pub fn run() -> Result<(), String> {
        let args = parse_args()?;

        let mut sim = match args.seed {
            Some(seed) => Simulator::new(seed),
            None => Simulator::from_entropy(),
        };
        log::info!("Seed: {}", sim.seed());

        let mut host_rng = sim.host_rng();
        let settings = if args.randomize {
            PhysicsSettings::randomize(&mut host_rng)
        } else if let Some(path) = &args.settings {
            PhysicsSettings::load(path)
        } else {
            PhysicsSettings::default()
        };

        let outcome = Rc::new(RefCell::new(Outcome::default()));
        let listener = Box::new(Printer(outcome.clone()));

        if let Some(balls) = args.batch {
            sim.start_batch(args.slots, balls, &settings, listener, 0.0)
                .map_err(|e| e.to_string())?;
        } else {
            let display = shuffled(&expand_weighted(&args.entries), &mut host_rng);
            sim.start_single(&display, &settings, listener, 0.0)
                .map_err(|e| format!("{e}\n{USAGE}"))?;
        }

        let end = sim.run_to_completion(0.0, FRAME_DT);
        log::debug!("Run finished at t={:.2}s", end);

        let outcome = outcome.borrow();
        if let Some(results) = &outcome.results {
            let stats = DistributionStats::from_counts(results);
            if args.json {
                let json = serde_json::to_string_pretty(&stats).map_err(|e| e.to_string())?;
                println!("{json}");
            } else {
                print_stats(&stats);
            }
        } else if let Some(winner) = &outcome.winner {
            println!("{winner}");
        } else {
            return Err("run ended without a result".to_string());
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = native::run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library and drive `Simulator::frame` themselves
}
