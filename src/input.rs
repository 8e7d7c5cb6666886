//! Discrete commands and the cheat-sequence detector.

use crate::clock::Clock;
use crate::game::Game;
use crate::highscore::ScoreStore;

pub const CHEAT_SEQUENCE: [char; 4] = ['D', 'O', 'M', 'I'];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDropStart,
    SoftDropStop,
    CheatKeystroke(char),
    Retry,
}

/// The last four keystrokes in a ring buffer.
#[derive(Clone, Copy, Debug, Default)]
pub struct CheatDetector {
    keys: [char; 4],
    head: usize,
    len: usize,
}

impl CheatDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a keystroke (case-insensitive) and reports whether the buffer
    /// now ends with [`CHEAT_SEQUENCE`].
    pub fn push(&mut self, key: char) -> bool {
        self.keys[self.head] = key.to_ascii_uppercase();
        self.head = (self.head + 1) % self.keys.len();
        self.len = (self.len + 1).min(self.keys.len());
        self.matches()
    }

    fn matches(&self) -> bool {
        self.len == self.keys.len()
            && CHEAT_SEQUENCE
                .iter()
                .enumerate()
                .all(|(i, key)| self.keys[(self.head + i) % self.keys.len()] == *key)
    }
}

impl<C: Clock, S: ScoreStore> Game<C, S> {
    /// Applies one command. After game over only `Retry` does anything.
    pub fn handle(&mut self, command: Command) {
        if self.is_game_over() && command != Command::Retry {
            return;
        }
        match command {
            Command::MoveLeft => {
                self.move_left();
            }
            Command::MoveRight => {
                self.move_right();
            }
            Command::Rotate => {
                self.rotate();
            }
            Command::SoftDropStart => self.soft_drop_start(),
            Command::SoftDropStop => self.soft_drop_stop(),
            Command::CheatKeystroke(key) => {
                if self.cheat_keys.push(key) {
                    self.activate_cheat();
                }
            }
            Command::Retry => self.retry(),
        }
    }
}
