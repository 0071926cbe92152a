use creature_arena::{BattleCard, BattleRunner, Ruleset, TurnRng};
use std::path::Path;
use std::process::ExitCode;

const DEFAULT_SEED: u64 = 7;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let seed = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<u64>() {
            Ok(seed) => seed,
            Err(_) => {
                eprintln!("usage: creature-arena [seed]");
                return ExitCode::FAILURE;
            }
        },
        None => DEFAULT_SEED,
    };

    let data_path = Path::new("data");
    let ruleset = match Ruleset::load(data_path) {
        Ok(ruleset) => ruleset,
        Err(e) => {
            eprintln!("Error loading ruleset: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let card = match BattleCard::load(&data_path.join("demo_battle.ron")) {
        Ok(card) => card,
        Err(e) => {
            eprintln!("Error loading demo battle: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runner = match BattleRunner::new(&ruleset) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = runner.simulate(&card.challenger, &card.defender, TurnRng::from_seed(seed));

    println!("Battle log (seed {}):", seed);
    for line in &report.log {
        println!("  {}", line);
    }

    println!();
    println!("Highlights:");
    for highlight in &report.highlights {
        println!("  * {}", highlight);
    }

    println!();
    match report.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing report: {}", e);
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
