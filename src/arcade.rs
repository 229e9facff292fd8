//! Composition root
//!
//! `Arcade` owns one engine per game and routes host input and frame time to
//! whichever game is on screen. Leaving a game pauses it, which cancels its
//! timers, so nothing runs in the background.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_FRAME_ELAPSED;
use crate::error::ConfigError;
use crate::games::counting::CountingDifficulty;
use crate::games::drawing::{Color, DrawingTool, StampKind};
use crate::games::jigsaw::JigsawDifficulty;
use crate::games::math::{MathOperation, MathRange};
use crate::games::maze::MazeDifficulty;
use crate::games::words::WordLanguage;
use crate::games::{
    CountingEngine, DrawingEngine, GameKind, JigsawEngine, JumpingEngine, LettersEngine,
    MathEngine, MazeEngine, MiniGame, WordsEngine,
};
use crate::settings::Settings;
use crate::sim::Viewport;

/// A settings-dialog change, addressed to one game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value")]
pub enum SettingChange {
    CountingDifficulty(CountingDifficulty),
    LettersGreek(bool),
    MazeDifficulty(MazeDifficulty),
    JigsawDifficulty(JigsawDifficulty),
    MathRange(MathRange),
    MathOptionCount(usize),
    MathToggleOperation(MathOperation),
    WordsLanguage(WordLanguage),
    WordsTimer(u32),
    WordsOptionCount(usize),
    DrawingTool(DrawingTool),
    DrawingColor(Color),
    DrawingStamp(StampKind),
    DrawingStrokeWidth(f32),
}

impl SettingChange {
    /// Game the change belongs to
    pub fn game(&self) -> GameKind {
        match self {
            SettingChange::CountingDifficulty(_) => GameKind::Counting,
            SettingChange::LettersGreek(_) => GameKind::Letters,
            SettingChange::MazeDifficulty(_) => GameKind::Maze,
            SettingChange::JigsawDifficulty(_) => GameKind::Jigsaw,
            SettingChange::MathRange(_)
            | SettingChange::MathOptionCount(_)
            | SettingChange::MathToggleOperation(_) => GameKind::Math,
            SettingChange::WordsLanguage(_)
            | SettingChange::WordsTimer(_)
            | SettingChange::WordsOptionCount(_) => GameKind::Words,
            SettingChange::DrawingTool(_)
            | SettingChange::DrawingColor(_)
            | SettingChange::DrawingStamp(_)
            | SettingChange::DrawingStrokeWidth(_) => GameKind::Drawing,
        }
    }
}

pub struct Arcade {
    counting: CountingEngine,
    letters: LettersEngine,
    maze: MazeEngine,
    jigsaw: JigsawEngine,
    jumping: JumpingEngine,
    math: MathEngine,
    words: WordsEngine,
    drawing: DrawingEngine,
    settings: Settings,
    active: Option<GameKind>,
    last_selected: Option<GameKind>,
}

impl Arcade {
    /// Build every engine from validated settings
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let seed = settings.session_seed();
        log::info!("Arcade seed {seed}");

        Ok(Self {
            counting: CountingEngine::new(settings.counting.difficulty, seed),
            letters: LettersEngine::new(settings.letters.include_greek, seed),
            maze: MazeEngine::new(settings.maze.difficulty, seed),
            jigsaw: JigsawEngine::new(settings.jigsaw.difficulty, seed),
            jumping: JumpingEngine::new(seed),
            math: MathEngine::new(
                settings.math.range,
                settings.math.operations.clone(),
                settings.math.option_count,
                seed,
            )?,
            words: WordsEngine::new(
                settings.words.language,
                settings.words.timer_secs,
                settings.words.option_count,
                seed,
            )?,
            drawing: DrawingEngine::new(),
            settings,
            active: None,
            last_selected: None,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn active(&self) -> Option<GameKind> {
        self.active
    }

    /// Most recently opened game, kept after it is closed
    pub fn last_selected(&self) -> Option<GameKind> {
        self.last_selected
    }

    pub fn game(&self, kind: GameKind) -> &dyn MiniGame {
        match kind {
            GameKind::Counting => &self.counting,
            GameKind::Letters => &self.letters,
            GameKind::Maze => &self.maze,
            GameKind::Jigsaw => &self.jigsaw,
            GameKind::Jumping => &self.jumping,
            GameKind::Math => &self.math,
            GameKind::Words => &self.words,
            GameKind::Drawing => &self.drawing,
        }
    }

    pub fn game_mut(&mut self, kind: GameKind) -> &mut dyn MiniGame {
        match kind {
            GameKind::Counting => &mut self.counting,
            GameKind::Letters => &mut self.letters,
            GameKind::Maze => &mut self.maze,
            GameKind::Jigsaw => &mut self.jigsaw,
            GameKind::Jumping => &mut self.jumping,
            GameKind::Math => &mut self.math,
            GameKind::Words => &mut self.words,
            GameKind::Drawing => &mut self.drawing,
        }
    }

    fn active_game(&mut self) -> Option<&mut dyn MiniGame> {
        let kind = self.active?;
        Some(self.game_mut(kind))
    }

    /// Bring a game on screen, pausing the one it replaces
    pub fn select(&mut self, kind: GameKind) {
        if self.active == Some(kind) {
            return;
        }
        if let Some(previous) = self.active_game() {
            previous.pause();
        }
        log::debug!("Selected {}", kind.title());
        self.active = Some(kind);
        self.last_selected = Some(kind);
        self.game_mut(kind).resume();
    }

    /// Back to the menu
    pub fn close(&mut self) {
        if let Some(game) = self.active_game() {
            game.pause();
        }
        self.active = None;
    }

    /// Start the active game's run, for games that have one
    pub fn start_game(&mut self) {
        match self.active {
            Some(GameKind::Math) => self.math.start_game(),
            Some(GameKind::Words) => self.words.start_game(),
            Some(GameKind::Jumping) => self.jumping.start_game(),
            _ => {}
        }
    }

    /// Answer the active quiz with a number. Counting and math take one.
    pub fn select_answer(&mut self, value: i32) {
        match self.active {
            Some(GameKind::Counting) => self.counting.select_answer(value),
            Some(GameKind::Math) => self.math.select_option(value),
            _ => {}
        }
    }

    /// Answer the words quiz
    pub fn select_word(&mut self, word: &str) {
        if self.active == Some(GameKind::Words) {
            self.words.select_word(word);
        }
    }

    pub fn toggle_settings(&mut self) {
        if let Some(game) = self.active_game() {
            game.toggle_settings();
        }
    }

    pub fn reset_round(&mut self) {
        if let Some(game) = self.active_game() {
            game.reset_round();
        }
    }

    /// Pause the active game in place, without leaving it
    pub fn pause(&mut self) {
        if let Some(game) = self.active_game() {
            game.pause();
        }
    }

    pub fn resume(&mut self) {
        if let Some(game) = self.active_game() {
            game.resume();
        }
    }

    /// Advance the active game. Long frames (tab switches, debugger stops)
    /// are clamped so timers don't fire in a burst.
    pub fn advance(&mut self, elapsed: Duration) {
        let elapsed = elapsed.min(MAX_FRAME_ELAPSED);
        if let Some(game) = self.active_game() {
            game.advance(elapsed);
        }
    }

    pub fn on_tap(&mut self, pos: Vec2) {
        if let Some(game) = self.active_game() {
            game.on_tap(pos);
        }
    }

    pub fn on_drag_start(&mut self, pos: Vec2) {
        if let Some(game) = self.active_game() {
            game.on_drag_start(pos);
        }
    }

    pub fn on_drag_move(&mut self, pos: Vec2) {
        if let Some(game) = self.active_game() {
            game.on_drag_move(pos);
        }
    }

    pub fn on_drag_end(&mut self, pos: Vec2) {
        if let Some(game) = self.active_game() {
            game.on_drag_end(pos);
        }
    }

    /// Every game shares the canvas, so all of them learn the new size
    pub fn resize(&mut self, viewport: Viewport) {
        for kind in GameKind::ALL {
            self.game_mut(kind).resize(viewport);
        }
    }

    /// Apply a settings-dialog change and remember it
    pub fn apply_setting(&mut self, change: SettingChange) -> Result<(), ConfigError> {
        match change {
            SettingChange::CountingDifficulty(d) => {
                self.counting.change_difficulty(d);
                self.settings.counting.difficulty = d;
            }
            SettingChange::LettersGreek(on) => {
                self.letters.set_include_greek(on);
                self.settings.letters.include_greek = on;
            }
            SettingChange::MazeDifficulty(d) => {
                self.maze.change_difficulty(d);
                self.settings.maze.difficulty = d;
            }
            SettingChange::JigsawDifficulty(d) => {
                self.jigsaw.change_difficulty(d);
                self.settings.jigsaw.difficulty = d;
            }
            SettingChange::MathRange(range) => {
                self.math.change_range(range);
                self.settings.math.range = range;
            }
            SettingChange::MathOptionCount(count) => {
                self.math.change_option_count(count)?;
                self.settings.math.option_count = count;
            }
            SettingChange::MathToggleOperation(op) => {
                self.math.toggle_operation(op);
                self.settings.math.operations = self.math.state().operations.clone();
            }
            SettingChange::WordsLanguage(language) => {
                self.words.change_language(language)?;
                self.settings.words.language = language;
            }
            SettingChange::WordsTimer(secs) => {
                self.words.change_timer(secs)?;
                self.settings.words.timer_secs = secs;
            }
            SettingChange::WordsOptionCount(count) => {
                self.words.change_option_count(count)?;
                self.settings.words.option_count = count;
            }
            SettingChange::DrawingTool(tool) => self.drawing.select_tool(tool),
            SettingChange::DrawingColor(color) => self.drawing.select_color(color),
            SettingChange::DrawingStamp(stamp) => self.drawing.select_stamp(stamp),
            SettingChange::DrawingStrokeWidth(width) => self.drawing.set_stroke_width(width),
        }
        Ok(())
    }

    /// Armed timers across every game
    pub fn pending_timers(&self) -> usize {
        GameKind::ALL
            .into_iter()
            .map(|kind| self.game(kind).pending_timers())
            .sum()
    }

    pub fn counting(&self) -> &CountingEngine {
        &self.counting
    }

    pub fn counting_mut(&mut self) -> &mut CountingEngine {
        &mut self.counting
    }

    pub fn letters(&self) -> &LettersEngine {
        &self.letters
    }

    pub fn letters_mut(&mut self) -> &mut LettersEngine {
        &mut self.letters
    }

    pub fn maze(&self) -> &MazeEngine {
        &self.maze
    }

    pub fn maze_mut(&mut self) -> &mut MazeEngine {
        &mut self.maze
    }

    pub fn jigsaw(&self) -> &JigsawEngine {
        &self.jigsaw
    }

    pub fn jigsaw_mut(&mut self) -> &mut JigsawEngine {
        &mut self.jigsaw
    }

    pub fn jumping(&self) -> &JumpingEngine {
        &self.jumping
    }

    pub fn jumping_mut(&mut self) -> &mut JumpingEngine {
        &mut self.jumping
    }

    pub fn math(&self) -> &MathEngine {
        &self.math
    }

    pub fn math_mut(&mut self) -> &mut MathEngine {
        &mut self.math
    }

    pub fn words(&self) -> &WordsEngine {
        &self.words
    }

    pub fn words_mut(&mut self) -> &mut WordsEngine {
        &mut self.words
    }

    pub fn drawing(&self) -> &DrawingEngine {
        &self.drawing
    }

    pub fn drawing_mut(&mut self) -> &mut DrawingEngine {
        &mut self.drawing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::RoundPhase;

    fn arcade() -> Arcade {
        let settings = Settings {
            seed: Some(2024),
            ..Settings::default()
        };
        Arcade::new(settings).unwrap()
    }

    #[test]
    fn test_switching_games_pauses_previous() {
        let mut arcade = arcade();
        arcade.select(GameKind::Jumping);
        arcade.start_game();
        assert_eq!(arcade.pending_timers(), 1);

        arcade.select(GameKind::Words);
        assert_eq!(arcade.jumping().state().phase, RoundPhase::Paused);
        assert_eq!(arcade.pending_timers(), 0);

        arcade.select(GameKind::Jumping);
        assert_eq!(arcade.jumping().state().phase, RoundPhase::Active);
        assert_eq!(arcade.pending_timers(), 1);

        arcade.close();
        assert_eq!(arcade.active(), None);
        assert_eq!(arcade.last_selected(), Some(GameKind::Jumping));
        assert_eq!(arcade.pending_timers(), 0);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut arcade = arcade();
        arcade.select(GameKind::Jumping);
        arcade.start_game();
        arcade.advance(Duration::from_secs(30));
        // 100 ms at 16 ms per frame
        assert_eq!(arcade.jumping().state().frame, 6);
    }

    #[test]
    fn test_only_active_game_gets_time() {
        let mut arcade = arcade();
        arcade.select(GameKind::Words);
        arcade.start_game();
        arcade.select(GameKind::Counting);
        for _ in 0..50 {
            arcade.advance(Duration::from_millis(100));
        }
        assert_eq!(arcade.words().state().remaining_secs, 30);
    }

    #[test]
    fn test_settings_are_applied_and_recorded() {
        let mut arcade = arcade();
        arcade
            .apply_setting(SettingChange::MazeDifficulty(MazeDifficulty::Hard))
            .unwrap();
        assert_eq!(arcade.maze().state().maze.size(), 19);
        assert_eq!(arcade.settings().maze.difficulty, MazeDifficulty::Hard);

        assert!(arcade
            .apply_setting(SettingChange::WordsTimer(0))
            .is_err());
        assert_eq!(arcade.settings().words.timer_secs, 30);

        arcade
            .apply_setting(SettingChange::MathToggleOperation(MathOperation::Add))
            .unwrap();
        assert_eq!(arcade.settings().math.operations.len(), 1);
        assert_eq!(SettingChange::WordsTimer(10).game(), GameKind::Words);
    }

    #[test]
    fn test_setting_change_json_shape() {
        let change: SettingChange =
            serde_json::from_str(r#"{ "key": "JigsawDifficulty", "value": "Easy" }"#).unwrap();
        assert_eq!(change, SettingChange::JigsawDifficulty(JigsawDifficulty::Easy));
    }

    #[test]
    fn test_answers_only_reach_active_game() {
        let mut arcade = arcade();
        let count = arcade.counting().state().object_count;
        arcade.select_answer(count);
        assert_eq!(arcade.counting().state().phase, RoundPhase::Active);

        arcade.select(GameKind::Math);
        arcade.select_answer(count);
        assert_eq!(arcade.counting().state().phase, RoundPhase::Active);

        arcade.select(GameKind::Counting);
        arcade.select_answer(count);
        assert_eq!(arcade.counting().state().phase, RoundPhase::Correct);
    }

    #[test]
    fn test_pause_and_settings_route_to_active_game() {
        let mut arcade = arcade();
        arcade.select(GameKind::Jumping);
        arcade.start_game();
        arcade.pause();
        assert_eq!(arcade.jumping().state().phase, RoundPhase::Paused);
        assert_eq!(arcade.pending_timers(), 0);
        arcade.resume();
        assert_eq!(arcade.jumping().state().phase, RoundPhase::Active);

        arcade.select(GameKind::Maze);
        arcade.toggle_settings();
        assert!(arcade.maze().state().show_settings);
        assert!(!arcade.jigsaw().state().show_settings);
    }

    #[test]
    fn test_drags_only_reach_active_game() {
        let mut arcade = arcade();
        arcade.select(GameKind::Drawing);
        arcade.on_drag_start(Vec2::new(0.1, 0.1));
        arcade.on_drag_move(Vec2::new(0.2, 0.2));
        arcade.on_drag_end(Vec2::new(0.2, 0.2));
        assert_eq!(arcade.drawing().state().elements.len(), 1);
        assert!(arcade.letters().state().strokes.is_empty());
    }
}
