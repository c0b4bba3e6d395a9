//! Example: random agents playing chess against each other
//!
//! Run with `cargo run --example random_selfplay -- [games] [--render]`.
//! `RUST_LOG=debug` shows every move.

use chess_rl_env::{
    AdversarialEnvironment, ChessEnv, ChessEnvConfig, Environment, GameResult, RenderMode,
    TrackedEnvironment,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let render = args.iter().any(|a| a == "--render");
    let num_games: usize = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(|a| a.parse::<usize>())
        .transpose()?
        .unwrap_or(5);

    let config = ChessEnvConfig {
        seed: Some(2024),
        render_size: 256,
        ..ChessEnvConfig::default()
    };
    let mut env = TrackedEnvironment::new(ChessEnv::new(config));

    let mut tally = [0usize; 3];
    for game in 0..num_games {
        env.reset()?;
        let mut plies = 0;

        loop {
            let action = env.action_space().sample()?;
            let step = env.step(action)?;
            plies += 1;
            if step.done {
                break;
            }
        }

        let result = env.env.game_result();
        match result {
            Some(GameResult::WhiteWins) => tally[0] += 1,
            Some(GameResult::BlackWins) => tally[1] += 1,
            Some(GameResult::Draw) | None => tally[2] += 1,
        }
        println!(
            "Game {}: {} after {} plies, final position {}",
            game + 1,
            result.map_or_else(|| "*".to_string(), |r| r.to_string()),
            plies,
            env.env.string_representation()
        );

        if render {
            env.render(RenderMode::Human)?;
        }
    }

    println!(
        "\nWhite wins: {}, Black wins: {}, Draws: {}",
        tally[0], tally[1], tally[2]
    );

    env.close()?;
    Ok(())
}
