//! Best-score bookkeeping and the key/value store it persists to.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

pub const BEST_SCORE_KEY: &str = "best_score";
pub const BEST_LEVEL_KEY: &str = "best_level";

/// Durable key/value storage. Values are opaque to the store.
pub trait ScoreStore {
    fn get(&self, key: &str) -> Option<u64>;
    fn set(&mut self, key: &str, value: u64) -> io::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: u64) -> io::Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// `key=value` lines in a plain text file. The whole file is rewritten on
/// every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, u64>,
}

impl FileStore {
    /// A missing or unreadable file starts empty; malformed lines are skipped.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = fs::read_to_string(&path)
            .map(|text| parse(&text))
            .unwrap_or_default();
        Self { path, values }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

fn parse(text: &str) -> BTreeMap<String, u64> {
    text.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.trim().parse().ok()?))
        })
        .collect()
}

impl ScoreStore for FileStore {
    fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: u64) -> io::Result<()> {
        self.values.insert(key.to_string(), value);
        let body: String = self
            .values
            .iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect();
        fs::write(&self.path, body)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Best {
    pub score: u64,
    pub level: u32,
}

/// Best of this process (survives retry) and best of all time (from the store).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Highscores {
    pub run: Best,
    pub all_time: Best,
}

impl Highscores {
    pub fn load<S: ScoreStore + ?Sized>(store: &S) -> Self {
        let all_time = Best {
            score: store.get(BEST_SCORE_KEY).unwrap_or(0),
            level: store
                .get(BEST_LEVEL_KEY)
                .and_then(|level| u32::try_from(level).ok())
                .unwrap_or(0),
        };
        Self {
            run: Best::default(),
            all_time,
        }
    }

    /// Folds a score in. Writes to the store only when the all-time best
    /// moves; write failures are dropped. Returns whether the all-time best
    /// was beaten.
    pub fn record<S: ScoreStore + ?Sized>(&mut self, score: u64, level: u32, store: &mut S) -> bool {
        if score > self.run.score {
            self.run = Best { score, level };
        }
        if score <= self.all_time.score {
            return false;
        }
        self.all_time = Best { score, level };
        let _ = store.set(BEST_SCORE_KEY, score);
        let _ = store.set(BEST_LEVEL_KEY, u64::from(level));
        true
    }
}
