//! Words quiz
//!
//! A target letter is drawn for the whole game; each question offers a few
//! words and the child picks the one starting with that letter before the
//! countdown runs out.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{GameKind, Mascot, MiniGame};
use crate::error::ConfigError;
use crate::highscores::ScoreBoard;
use crate::sim::{
    GameRng, Published, RoundId, RoundPhase, Scheduler, Timed, TimerSlot, drive, seeded_rng,
};

/// Pause between an answer and the next set of words
pub const REFRESH_DELAY: Duration = Duration::from_millis(200);
/// Countdown resolution
pub const TICK: Duration = Duration::from_secs(1);
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 5;
pub const DEFAULT_OPTIONS: usize = 3;
pub const DEFAULT_TIMER_SECS: u32 = 30;
pub const MIN_TIMER_SECS: u32 = 5;
pub const MAX_TIMER_SECS: u32 = 300;
/// Canvas heights below this use the compact layout
pub const SHORT_HEIGHT: f32 = 560.0;

const ENGLISH_WORDS: &[&str] = &[
    "Apple", "Ant", "Airplane", "Alligator", "Ball", "Bear", "Banana", "Bicycle", "Cat", "Cake",
    "Car", "Cloud", "Dog", "Duck", "Dragon", "Drum", "Elephant", "Eagle", "Earth", "Egg", "Fish",
    "Flower", "Frog", "Fox", "Giraffe", "Goat", "Guitar", "Grapes", "Hat", "Horse", "House",
    "Honey", "Ice", "Igloo", "Island", "Insect", "Jelly", "Jacket", "Juice", "Jungle", "Kite",
    "Koala", "Key", "Kangaroo",
];

const GREEK_WORDS: &[&str] = &[
    "Αρκούδα", "Αγελάδα", "Αστέρι", "Αυγό", "Βάρκα", "Βάτραχος", "Βουνό", "Βιβλίο", "Γάτα",
    "Γέφυρα", "Γράμμα", "Γλάρος", "Δάσος", "Δελφίνι", "Δέντρο", "Δράκος", "Ελέφαντας", "Ελάφι",
    "Εικόνα", "Ελιά", "Ζέβρα", "Ζαχαρωτό", "Ζουζούνι", "Ζωγραφιά", "Ηλιοτρόπιο", "Ημέρα", "Ηχώ",
    "Ηφαίστειο", "Θάλασσα", "Θησαυρός", "Θάμνος", "Θρόνος",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WordLanguage {
    English,
    #[default]
    Greek,
}

impl WordLanguage {
    pub fn label(self) -> &'static str {
        match self {
            WordLanguage::English => "English",
            WordLanguage::Greek => "Greek",
        }
    }

    pub fn words(self) -> &'static [&'static str] {
        match self {
            WordLanguage::English => ENGLISH_WORDS,
            WordLanguage::Greek => GREEK_WORDS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordOption {
    pub word: &'static str,
    pub is_correct: bool,
}

/// Upper-cased first character, Unicode aware
fn first_upper(word: &str) -> Option<char> {
    word.chars().next().and_then(|c| c.to_uppercase().next())
}

/// Case-insensitive first-letter match
pub fn starts_with_letter(word: &str, letter: char) -> bool {
    match word.chars().next() {
        Some(first) => first.to_uppercase().eq(letter.to_uppercase()),
        None => false,
    }
}

/// First letter of a random non-blank word, upper-cased
pub fn pick_target_letter<R: Rng>(rng: &mut R, words: &[&str]) -> Option<char> {
    let candidates: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| !w.trim().is_empty())
        .collect();
    if candidates.is_empty() {
        return None;
    }
    first_upper(candidates[rng.random_range(0..candidates.len())])
}

/// One word starting with `letter` plus `count - 1` distinct words that don't
pub fn build_options<R: Rng>(
    rng: &mut R,
    letter: char,
    words: &[&'static str],
    count: usize,
) -> Result<Vec<WordOption>, ConfigError> {
    let (correct, mut wrong): (Vec<&'static str>, Vec<&'static str>) =
        words.iter().copied().partition(|w| starts_with_letter(w, letter));

    let needed = count.saturating_sub(1);
    if correct.is_empty() || wrong.len() < needed {
        return Err(ConfigError::NotEnoughWords {
            available: wrong.len(),
            requested: needed,
        });
    }

    let answer = correct[rng.random_range(0..correct.len())];
    wrong.shuffle(rng);
    wrong.truncate(needed);
    wrong.push(answer);
    wrong.shuffle(rng);

    Ok(wrong
        .into_iter()
        .map(|word| WordOption {
            word,
            is_correct: starts_with_letter(word, letter),
        })
        .collect())
}

/// Largest option count every letter of `language` can satisfy
pub fn max_option_count(language: WordLanguage) -> usize {
    let words = language.words();
    words
        .iter()
        .filter_map(|w| first_upper(w))
        .map(|letter| words.iter().filter(|w| !starts_with_letter(w, letter)).count() + 1)
        .min()
        .unwrap_or(0)
}

pub fn check_option_count(language: WordLanguage, count: usize) -> Result<(), ConfigError> {
    if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&count) {
        return Err(ConfigError::InvalidOptionCount {
            count,
            min: MIN_OPTIONS,
            max: MAX_OPTIONS,
        });
    }
    let limit = max_option_count(language);
    if count > limit {
        return Err(ConfigError::NotEnoughWords {
            available: limit.saturating_sub(1),
            requested: count - 1,
        });
    }
    Ok(())
}

pub fn check_timer(secs: u32) -> Result<(), ConfigError> {
    if !(MIN_TIMER_SECS..=MAX_TIMER_SECS).contains(&secs) {
        return Err(ConfigError::InvalidTimer {
            secs,
            min: MIN_TIMER_SECS,
            max: MAX_TIMER_SECS,
        });
    }
    Ok(())
}

/// Compact-layout classification for the quiz screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordsLayout {
    pub is_short_height: bool,
    /// Height the option list may use
    pub options_max_height: f32,
}

impl WordsLayout {
    pub fn for_height(height: f32) -> Self {
        let is_short_height = height < SHORT_HEIGHT;
        Self {
            is_short_height,
            options_max_height: if is_short_height {
                height * 0.45
            } else {
                height
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordsState {
    pub round_id: RoundId,
    pub target_letter: char,
    pub options: Vec<WordOption>,
    pub remaining_secs: u32,
    pub timer_secs: u32,
    pub option_count: usize,
    pub language: WordLanguage,
    pub phase: RoundPhase,
    pub is_refreshing: bool,
    pub last_result_correct: Option<bool>,
    pub mascot: Mascot,
    pub show_settings: bool,
    pub scores: ScoreBoard,
}

impl WordsState {
    pub fn is_game_active(&self) -> bool {
        self.phase == RoundPhase::Active
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == RoundPhase::GameOver
    }
}

#[derive(Debug, Clone)]
pub enum WordsEvent {
    Countdown,
    Refresh(RoundId),
}

pub struct WordsEngine {
    state: Published<WordsState>,
    rng: GameRng,
    timers: Scheduler<WordsEvent>,
    countdown_slot: TimerSlot,
    refresh_slot: TimerSlot,
}

impl WordsEngine {
    pub fn new(
        language: WordLanguage,
        timer_secs: u32,
        option_count: usize,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        check_timer(timer_secs)?;
        check_option_count(language, option_count)?;
        let mut rng = seeded_rng(seed, GameKind::Words.stream());
        let (target_letter, options) = Self::deal_letter(&mut rng, language, option_count)?;
        let mascot = Mascot::random(&mut rng);

        Ok(Self {
            state: Published::new(WordsState {
                round_id: 1,
                target_letter,
                options,
                remaining_secs: timer_secs,
                timer_secs,
                option_count,
                language,
                phase: RoundPhase::NotStarted,
                is_refreshing: false,
                last_result_correct: None,
                mascot,
                show_settings: false,
                scores: ScoreBoard::new(),
            }),
            rng,
            timers: Scheduler::new(),
            countdown_slot: TimerSlot::new(),
            refresh_slot: TimerSlot::new(),
        })
    }

    pub fn state(&self) -> &WordsState {
        self.state.get()
    }

    pub fn snapshot(&self) -> Arc<WordsState> {
        self.state.snapshot()
    }

    fn deal_letter(
        rng: &mut GameRng,
        language: WordLanguage,
        option_count: usize,
    ) -> Result<(char, Vec<WordOption>), ConfigError> {
        let words = language.words();
        let letter = pick_target_letter(rng, words).ok_or(ConfigError::NotEnoughWords {
            available: 0,
            requested: 1,
        })?;
        let options = build_options(rng, letter, words, option_count)?;
        Ok((letter, options))
    }

    /// New letter and words, clock refilled, score zeroed; game left inactive
    fn reset_game_state(&mut self) {
        let current = self.state.get();
        let (language, option_count) = (current.language, current.option_count);
        let mut next = current.clone();
        match Self::deal_letter(&mut self.rng, language, option_count) {
            Ok((letter, options)) => {
                next.target_letter = letter;
                next.options = options;
            }
            Err(err) => log::error!("words deal: {err}"),
        }
        next.round_id += 1;
        next.scores.reset_score();
        next.remaining_secs = next.timer_secs;
        next.phase = RoundPhase::NotStarted;
        next.last_result_correct = None;
        next.is_refreshing = false;
        next.mascot = Mascot::next_after(next.mascot, &mut self.rng);
        self.state.replace(next);
    }

    pub fn start_game(&mut self) {
        self.cancel_timers();
        self.reset_game_state();
        self.state.update(|s| s.phase = RoundPhase::Active);
        self.timers
            .arm_repeating(&mut self.countdown_slot, TICK, WordsEvent::Countdown);
        log::debug!(
            "words game started: letter {} for {}s",
            self.state.get().target_letter,
            self.state.get().timer_secs
        );
    }

    pub fn stop_game(&mut self) {
        self.cancel_timers();
        self.state.update(|s| {
            s.phase = RoundPhase::NotStarted;
            s.is_refreshing = false;
        });
    }

    fn cancel_timers(&mut self) {
        self.timers.cancel(&mut self.countdown_slot);
        self.timers.cancel(&mut self.refresh_slot);
    }

    pub fn select_word(&mut self, word: &str) {
        let current = self.state.get();
        if !current.is_game_active() || current.is_refreshing {
            return;
        }
        let Some(option) = current.options.iter().find(|o| o.word == word).copied() else {
            return;
        };
        let round_id = current.round_id;

        self.state.update(|s| {
            if option.is_correct {
                s.scores.record_point();
            }
            s.last_result_correct = Some(option.is_correct);
            s.is_refreshing = true;
        });
        self.timers.arm_once(
            &mut self.refresh_slot,
            REFRESH_DELAY,
            WordsEvent::Refresh(round_id),
        );
    }

    fn countdown(&mut self) {
        if !self.state.get().is_game_active() {
            self.timers.cancel(&mut self.countdown_slot);
            return;
        }
        self.state
            .update(|s| s.remaining_secs = s.remaining_secs.saturating_sub(1));
        if self.state.get().remaining_secs == 0 {
            self.end_game();
        }
    }

    fn end_game(&mut self) {
        self.cancel_timers();
        self.state.update(|s| {
            s.phase = RoundPhase::GameOver;
            s.is_refreshing = false;
        });
        log::info!(
            "words game over: score {} (best {})",
            self.state.get().scores.score,
            self.state.get().scores.high_score
        );
    }

    /// Same letter, new words
    fn refresh_round(&mut self) {
        let current = self.state.get();
        let (letter, language, count) =
            (current.target_letter, current.language, current.option_count);
        let mut next = current.clone();
        match build_options(&mut self.rng, letter, language.words(), count) {
            Ok(options) => next.options = options,
            Err(err) => log::error!("words refresh: {err}"),
        }
        next.round_id += 1;
        next.is_refreshing = false;
        next.mascot = Mascot::next_after(next.mascot, &mut self.rng);
        self.state.replace(next);
    }

    pub fn toggle_settings(&mut self) {
        self.state.update(|s| s.show_settings = !s.show_settings);
    }

    fn apply_setting<F: FnOnce(&mut WordsState)>(&mut self, edit: F) {
        self.stop_game();
        self.state.update(|s| {
            edit(s);
            s.show_settings = false;
        });
        self.reset_game_state();
    }

    pub fn change_language(&mut self, language: WordLanguage) -> Result<(), ConfigError> {
        check_option_count(language, self.state.get().option_count)?;
        log::info!("words language -> {}", language.label());
        self.apply_setting(|s| s.language = language);
        Ok(())
    }

    pub fn change_timer(&mut self, secs: u32) -> Result<(), ConfigError> {
        check_timer(secs)?;
        log::info!("words timer -> {secs}s");
        self.apply_setting(|s| s.timer_secs = secs);
        Ok(())
    }

    pub fn change_option_count(&mut self, count: usize) -> Result<(), ConfigError> {
        check_option_count(self.state.get().language, count)?;
        log::info!("words option count -> {count}");
        self.apply_setting(|s| s.option_count = count);
        Ok(())
    }
}

impl Timed for WordsEngine {
    type Event = WordsEvent;

    fn timers(&mut self) -> &mut Scheduler<WordsEvent> {
        &mut self.timers
    }

    fn on_timer(&mut self, event: WordsEvent) {
        match event {
            WordsEvent::Countdown => self.countdown(),
            WordsEvent::Refresh(id) if id == self.state.get().round_id => self.refresh_round(),
            WordsEvent::Refresh(id) => log::trace!("stale refresh for round {id}"),
        }
    }
}

impl MiniGame for WordsEngine {
    fn kind(&self) -> GameKind {
        GameKind::Words
    }

    fn toggle_settings(&mut self) {
        WordsEngine::toggle_settings(self);
    }

    fn advance(&mut self, elapsed: Duration) {
        drive(self, elapsed);
    }

    fn pause(&mut self) {
        self.cancel_timers();
        if self.state.get().is_game_active() {
            self.state.update(|s| s.phase = RoundPhase::Paused);
        }
    }

    fn resume(&mut self) {
        if self.state.get().phase != RoundPhase::Paused {
            return;
        }
        self.state.update(|s| s.phase = RoundPhase::Active);
        self.timers
            .arm_repeating(&mut self.countdown_slot, TICK, WordsEvent::Countdown);
        if self.state.get().is_refreshing {
            self.refresh_round();
        }
    }

    fn scores(&self) -> ScoreBoard {
        self.state.get().scores
    }

    fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    fn version(&self) -> u64 {
        self.state.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn engine(language: WordLanguage) -> WordsEngine {
        WordsEngine::new(language, 30, 3, 4242).unwrap()
    }

    #[test]
    fn test_letter_matching_is_case_insensitive_and_unicode() {
        assert!(starts_with_letter("apple", 'A'));
        assert!(starts_with_letter("Apple", 'a'));
        assert!(starts_with_letter("αρκούδα", 'Α'));
        assert!(starts_with_letter("Ηχώ", 'η'));
        assert!(!starts_with_letter("Βάρκα", 'Α'));
        assert!(!starts_with_letter("", 'A'));
    }

    #[test]
    fn test_options_have_exactly_one_match() {
        let mut rng = Pcg32::seed_from_u64(8);
        for language in [WordLanguage::English, WordLanguage::Greek] {
            for _ in 0..50 {
                let letter = pick_target_letter(&mut rng, language.words()).unwrap();
                let options = build_options(&mut rng, letter, language.words(), 4).unwrap();
                assert_eq!(options.len(), 4);
                assert_eq!(options.iter().filter(|o| o.is_correct).count(), 1);
                let mut words: Vec<_> = options.iter().map(|o| o.word).collect();
                words.sort();
                words.dedup();
                assert_eq!(words.len(), 4);
            }
        }
    }

    #[test]
    fn test_too_few_distractors_is_config_error() {
        let mut rng = Pcg32::seed_from_u64(8);
        let words: &[&'static str] = &["Ant", "Apple", "Ball"];
        assert!(build_options(&mut rng, 'A', words, 2).is_ok());
        assert!(matches!(
            build_options(&mut rng, 'A', words, 3),
            Err(ConfigError::NotEnoughWords { available: 1, requested: 2 })
        ));
    }

    #[test]
    fn test_countdown_reaches_game_over() {
        let mut game = engine(WordLanguage::English);
        game.change_timer(5).unwrap();
        game.start_game();
        assert_eq!(game.state().remaining_secs, 5);

        game.advance(Duration::from_millis(2500));
        assert_eq!(game.state().remaining_secs, 3);

        game.advance(Duration::from_secs(3));
        assert!(game.state().is_game_over());
        assert_eq!(game.state().remaining_secs, 0);
        assert_eq!(game.pending_timers(), 0);
    }

    #[test]
    fn test_correct_word_scores_and_refreshes_same_letter() {
        let mut game = engine(WordLanguage::Greek);
        game.start_game();
        let letter = game.state().target_letter;
        let round = game.state().round_id;
        let right = game
            .state()
            .options
            .iter()
            .find(|o| o.is_correct)
            .unwrap()
            .word;

        game.select_word(right);
        assert_eq!(game.state().scores.score, 1);
        assert!(game.state().is_refreshing);

        game.advance(REFRESH_DELAY);
        assert_eq!(game.state().round_id, round + 1);
        assert_eq!(game.state().target_letter, letter);
        assert!(!game.state().is_refreshing);
    }

    #[test]
    fn test_stop_cancels_everything() {
        let mut game = engine(WordLanguage::English);
        game.start_game();
        let right = game
            .state()
            .options
            .iter()
            .find(|o| o.is_correct)
            .unwrap()
            .word;
        game.select_word(right);
        assert_eq!(game.pending_timers(), 2);

        game.stop_game();
        assert_eq!(game.pending_timers(), 0);
        let remaining = game.state().remaining_secs;
        game.advance(Duration::from_secs(10));
        assert_eq!(game.state().remaining_secs, remaining);
    }

    #[test]
    fn test_pause_freezes_clock_and_resume_restarts_it() {
        let mut game = engine(WordLanguage::English);
        game.start_game();
        game.advance(Duration::from_secs(2));
        game.pause();
        game.advance(Duration::from_secs(20));
        assert_eq!(game.state().remaining_secs, 28);
        assert_eq!(game.state().phase, RoundPhase::Paused);

        game.resume();
        game.advance(Duration::from_secs(1));
        assert_eq!(game.state().remaining_secs, 27);
    }

    #[test]
    fn test_settings_validation() {
        let mut game = engine(WordLanguage::English);
        assert!(game.change_timer(0).is_err());
        assert!(game.change_option_count(6).is_err());
        assert!(game.change_option_count(5).is_ok());
        assert!(max_option_count(WordLanguage::English) >= MAX_OPTIONS);
        assert!(max_option_count(WordLanguage::Greek) >= MAX_OPTIONS);
    }

    #[test]
    fn test_layout_classifier() {
        assert!(WordsLayout::for_height(500.0).is_short_height);
        assert_eq!(WordsLayout::for_height(500.0).options_max_height, 225.0);
        assert!(!WordsLayout::for_height(800.0).is_short_height);
    }
}
