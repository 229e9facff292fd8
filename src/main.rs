//! Playroom headless demo
//!
//! Loads settings, builds the arcade and plays a short scripted session
//! through the same input surface a renderer would use.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::collections::{HashMap, VecDeque};

    use glam::Vec2;

    use playroom::consts::DEMO_FRAME;
    use playroom::games::jumping::{PLAYER_LEFT, PLAYER_RIGHT};
    use playroom::games::maze::Maze;
    use playroom::{Arcade, GameKind, Settings};

    /// Cells from start to end, shortest first
    pub fn solve_maze(maze: &Maze) -> Vec<(usize, usize)> {
        let mut came_from: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
        let mut queue = VecDeque::from([maze.start]);
        came_from.insert(maze.start, maze.start);

        while let Some(cell) = queue.pop_front() {
            if cell == maze.end {
                break;
            }
            for next in maze.neighbours(cell) {
                if !came_from.contains_key(&next) {
                    came_from.insert(next, cell);
                    queue.push_back(next);
                }
            }
        }

        let mut path = vec![maze.end];
        let mut cell = maze.end;
        while cell != maze.start {
            match came_from.get(&cell) {
                Some(prev) => cell = *prev,
                None => return Vec::new(),
            }
            path.push(cell);
        }
        path.reverse();
        path
    }

    fn play_runner(arcade: &mut Arcade) {
        arcade.select(GameKind::Jumping);
        arcade.start_game();
        for _ in 0..3000 {
            let state = arcade.jumping().state();
            if state.is_game_over() {
                break;
            }
            let incoming = state
                .obstacles
                .iter()
                .any(|o| o.x < PLAYER_RIGHT + 0.06 && o.right() > PLAYER_LEFT);
            if incoming {
                arcade.on_tap(Vec2::ZERO);
            }
            arcade.advance(DEMO_FRAME);
        }
        let state = arcade.jumping().state();
        log::info!(
            "Runner: {} obstacles cleared over {} frames",
            state.scores.score,
            state.frame
        );
    }

    fn play_maze(arcade: &mut Arcade) {
        arcade.select(GameKind::Maze);
        let maze = arcade.maze().state().maze.clone();
        let route = solve_maze(&maze);
        let mut points = route.iter().map(|cell| maze.cell_center(*cell));
        if let Some(first) = points.next() {
            arcade.on_drag_start(first);
        }
        for point in points {
            arcade.on_drag_move(point);
        }
        arcade.on_drag_end(maze.cell_center(maze.end));
        log::info!(
            "Maze {}x{}: {} cells traced, solved = {}",
            maze.size(),
            maze.size(),
            route.len(),
            arcade.maze().state().is_solved()
        );
    }

    fn play_jigsaw(arcade: &mut Arcade) {
        arcade.select(GameKind::Jigsaw);
        let count = arcade.jigsaw().state().pieces.len();
        for index in 0..count {
            let cell = arcade.jigsaw().state().pieces[index].correct;
            let target = arcade.jigsaw().cell_center(cell);
            arcade.jigsaw_mut().end_drag(index, target);
        }
        let state = arcade.jigsaw().state();
        log::info!(
            "Jigsaw level {} ({}): {}/{} placed",
            state.level,
            state.image.0,
            state.placed_count(),
            state.pieces.len()
        );
    }

    fn play_quizzes(arcade: &mut Arcade) {
        arcade.select(GameKind::Math);
        arcade.start_game();
        for _ in 0..5 {
            let state = arcade.math().state();
            let problem = state.problem;
            let answer = problem.answer();
            arcade.select_answer(answer);
            log::debug!("{problem} -> {answer}");
            for _ in 0..20 {
                arcade.advance(DEMO_FRAME);
            }
        }
        log::info!("Math: score {}", arcade.math().state().scores.score);

        arcade.select(GameKind::Words);
        arcade.start_game();
        for _ in 0..5 {
            let word = arcade
                .words()
                .state()
                .options
                .iter()
                .find(|o| o.is_correct)
                .map(|o| o.word);
            if let Some(word) = word {
                arcade.select_word(word);
            }
            for _ in 0..15 {
                arcade.advance(DEMO_FRAME);
            }
        }
        let words = arcade.words().state();
        log::info!(
            "Words ({}): score {}, {}s left",
            words.target_letter,
            words.scores.score,
            words.remaining_secs
        );

        arcade.select(GameKind::Counting);
        let count = arcade.counting().state().object_count;
        arcade.select_answer(count);
        log::info!("Counting: {count} objects, score {}", arcade.counting().state().scores.score);

        arcade.select(GameKind::Letters);
        arcade.on_drag_start(Vec2::new(0.3, 0.2));
        for i in 1..12 {
            arcade.on_drag_move(Vec2::new(0.3, 0.2 + i as f32 * 0.05));
        }
        arcade.letters_mut().check_drawing();
        let letters = arcade.letters().state();
        log::info!("Letters: traced '{}', {:?}", letters.character, letters.phase);
    }

    pub fn run() -> Result<(), playroom::ConfigError> {
        let settings = Settings::load();
        let mut arcade = Arcade::new(settings)?;

        play_runner(&mut arcade);
        play_maze(&mut arcade);
        play_jigsaw(&mut arcade);
        play_quizzes(&mut arcade);

        arcade.close();
        for kind in GameKind::ALL {
            let scores = arcade.game(kind).scores();
            log::info!(
                "{:<16} score {:>3}  best {:>3}",
                kind.title(),
                scores.score,
                scores.high_score
            );
        }
        log::info!("Pending timers after close: {}", arcade.pending_timers());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Playroom (headless) starting...");

    if let Err(err) = demo::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The host drives the engines directly on the web
}
