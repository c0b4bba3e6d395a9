//! Properties over randomly played games

use std::collections::HashSet;

use chess_rl_env::{
    action_to_move, move_to_action, piece_configuration, ActionSpace, AdversarialEnvironment,
    ChessAction, ChessEnv, ChessEnvConfig, ChessMove, ChessRules, Environment, ObservationSpace,
};
use proptest::prelude::*;

/// Play `plies` seeded random moves, stopping early at a terminal position.
fn random_env(seed: u64, plies: usize) -> ChessEnv {
    let mut env = ChessEnv::new(ChessEnvConfig {
        seed: Some(seed),
        ..ChessEnvConfig::default()
    });
    for _ in 0..plies {
        if env.game_result().is_some() {
            break;
        }
        let action = env.action_space().sample().unwrap();
        env.step(action).unwrap();
    }
    env
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn codec_round_trips_every_legal_move(seed in any::<u64>(), plies in 0usize..120) {
        let env = random_env(seed, plies);
        for mv in env.board().legal_moves() {
            let decoded = action_to_move(move_to_action(&mv)).unwrap();
            prop_assert_eq!(decoded, mv);
        }
    }

    #[test]
    fn legal_actions_match_engine_moves(seed in any::<u64>(), plies in 0usize..120) {
        let env = random_env(seed, plies);
        let decoded: HashSet<ChessMove> = env
            .legal_actions()
            .into_iter()
            .map(|action| action_to_move(action).unwrap())
            .collect();
        let engine: HashSet<ChessMove> = env.board().legal_moves().into_iter().collect();
        prop_assert_eq!(decoded, engine);
        prop_assert_eq!(env.legal_actions().len(), env.board().legal_moves().len());
    }

    #[test]
    fn observations_stay_in_range(seed in any::<u64>(), plies in 0usize..120) {
        let env = random_env(seed, plies);
        let obs = env.canonical_observation();
        prop_assert_eq!(obs.grid().dim(), (8, 8));
        prop_assert!(obs.grid().iter().all(|v| (-6..=6).contains(v)));
        prop_assert!(env.observation_space().contains(&obs));

        // same pieces, same count, whatever the orientation
        let raw = piece_configuration(env.board());
        let count = |grid: &ndarray::Array2<i8>| grid.iter().filter(|v| **v != 0).count();
        prop_assert_eq!(count(obs.grid()), count(&raw));
    }

    #[test]
    fn fen_round_trip_preserves_actions(seed in any::<u64>(), plies in 0usize..80) {
        let env = random_env(seed, plies);
        let mut copy = ChessEnv::new(ChessEnvConfig::default());
        copy.set_string_representation(&env.string_representation()).unwrap();

        let original: HashSet<ChessAction> = env.legal_actions().into_iter().collect();
        let reloaded: HashSet<ChessAction> = copy.legal_actions().into_iter().collect();
        prop_assert_eq!(original, reloaded);
        prop_assert_eq!(copy.canonical_observation(), env.canonical_observation());
    }

    #[test]
    fn sampled_actions_are_legal(seed in any::<u64>(), plies in 0usize..60) {
        let env = random_env(seed, plies);
        if env.game_result().is_none() {
            let space = env.action_space();
            let action = space.sample().unwrap();
            prop_assert!(space.contains(&action));
        }
    }
}
