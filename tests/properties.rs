//! Property tests for the invariants every engine must keep

use std::collections::{HashSet, VecDeque};

use glam::Vec2;
use proptest::prelude::*;

use playroom::games::jigsaw::{JigsawDifficulty, JigsawEngine};
use playroom::games::jumping::{Player, apply_physics};
use playroom::games::math::{MathOperation, MathProblem, build_options as math_options};
use playroom::games::maze::{Maze, generate_maze};
use playroom::games::words::{WordLanguage, build_options as word_options, pick_target_letter};
use playroom::sim::{seeded_rng, unique_options};
use playroom::{ConfigError, ScoreBoard};

/// Path cells reachable from the start
fn flood(maze: &Maze) -> HashSet<(usize, usize)> {
    let mut seen = HashSet::from([maze.start]);
    let mut queue = VecDeque::from([maze.start]);
    while let Some(cell) = queue.pop_front() {
        for next in maze.neighbours(cell) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

proptest! {
    #[test]
    fn prop_options_are_unique_and_contain_answer(
        seed in any::<u64>(),
        lo in -50i32..50,
        span in 0i32..60,
        count in 2usize..6,
        pick in 0i32..60,
    ) {
        let hi = lo + span;
        let correct = lo + pick.min(span);
        let mut rng = seeded_rng(seed, 0);
        match unique_options(&mut rng, correct, count, lo, hi) {
            Ok(options) => {
                prop_assert_eq!(options.len(), count);
                prop_assert_eq!(options.iter().filter(|v| **v == correct).count(), 1);
                let distinct: HashSet<_> = options.iter().collect();
                prop_assert_eq!(distinct.len(), count);
                prop_assert!(options.iter().all(|v| (lo..=hi).contains(v)));
            }
            Err(ConfigError::RangeTooSmall { .. }) => {
                prop_assert!(((span + 1) as usize) < count);
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    #[test]
    fn prop_math_options_have_one_correct(
        seed in any::<u64>(),
        left in 0i32..=50,
        right in 0i32..=50,
        subtract in any::<bool>(),
        count in 2usize..=5,
    ) {
        let problem = if subtract {
            MathProblem::new(left.max(right), left.min(right), MathOperation::Subtract)
        } else {
            MathProblem::new(left, right, MathOperation::Add)
        };
        let mut rng = seeded_rng(seed, 6);
        let options = math_options(&mut rng, &problem, count, (0, 50)).unwrap();
        prop_assert_eq!(options.len(), count);
        prop_assert_eq!(options.iter().filter(|o| o.is_correct).count(), 1);
        prop_assert!(options.iter().any(|o| o.value == problem.answer()));
    }

    #[test]
    fn prop_word_options_have_one_match(
        seed in any::<u64>(),
        greek in any::<bool>(),
        count in 2usize..=5,
    ) {
        let language = if greek { WordLanguage::Greek } else { WordLanguage::English };
        let mut rng = seeded_rng(seed, 7);
        let letter = pick_target_letter(&mut rng, language.words()).unwrap();
        let options = word_options(&mut rng, letter, language.words(), count).unwrap();
        prop_assert_eq!(options.len(), count);
        prop_assert_eq!(options.iter().filter(|o| o.is_correct).count(), 1);
        let distinct: HashSet<_> = options.iter().map(|o| o.word).collect();
        prop_assert_eq!(distinct.len(), count);
    }

    #[test]
    fn prop_maze_is_connected_and_perfect(seed in any::<u64>(), half in 2usize..=12) {
        let size = half * 2 + 1;
        let mut rng = seeded_rng(seed, 3);
        let maze = generate_maze(&mut rng, size);

        prop_assert_eq!(maze.size(), size);
        prop_assert!(maze.is_path(maze.start.0, maze.start.1));
        prop_assert!(maze.is_path(maze.end.0, maze.end.1));

        let reachable = flood(&maze);
        prop_assert!(reachable.contains(&maze.end));
        prop_assert_eq!(reachable.len(), maze.path_count());

        // a spanning tree over half*half rooms has half*half - 1 passages
        prop_assert_eq!(maze.path_count(), 2 * half * half - 1);
    }

    #[test]
    fn prop_high_score_never_decreases(ops in prop::collection::vec(0u8..3, 0..200)) {
        let mut board = ScoreBoard::new();
        let mut best = 0;
        for op in ops {
            match op {
                0 => board.record_point(),
                1 => board.add(3),
                _ => board.reset_score(),
            }
            prop_assert!(board.high_score >= best);
            prop_assert!(board.high_score >= board.score);
            best = board.high_score;
        }
    }

    #[test]
    fn prop_grounded_player_stays_grounded(frames in 1usize..5000) {
        let mut player = Player::default();
        for _ in 0..frames {
            player = apply_physics(player);
        }
        prop_assert_eq!(player, Player::default());
    }

    #[test]
    fn prop_jigsaw_drop_on_placed_piece_is_noop(seed in any::<u64>(), x in 0.0f32..1.0, y in 0.0f32..1.0) {
        let mut game = JigsawEngine::new(JigsawDifficulty::Medium, seed);
        let target = game.cell_center(game.state().pieces[0].correct);
        prop_assert!(game.end_drag(0, target));

        let before = game.snapshot();
        prop_assert!(!game.end_drag(0, Vec2::new(x, y)));
        prop_assert_eq!(&*before, game.state());
    }
}
