//! Highscore bookkeeping and the file-backed store.
//!
//! File tests share one path under the temp dir, so they run serially.

use std::fs;
use std::path::PathBuf;

use serial_test::serial;

use blockfall::clock::TimerQueue;
use blockfall::game::{Game, SequencePieceProvider};
use blockfall::highscore::{
    Best, FileStore, Highscores, MemoryStore, ScoreStore, BEST_LEVEL_KEY, BEST_SCORE_KEY,
};
use blockfall::shapes::ShapeKind;

fn store_path() -> PathBuf {
    std::env::temp_dir().join("blockfall-highscore-test.txt")
}

fn fresh_path() -> PathBuf {
    let path = store_path();
    let _ = fs::remove_file(&path);
    path
}

mod bookkeeping {
    use super::*;

    #[test]
    fn record_raises_run_and_all_time() {
        let mut store = MemoryStore::new();
        let mut scores = Highscores::load(&store);

        assert!(scores.record(120, 2, &mut store));

        assert_eq!(scores.run, Best { score: 120, level: 2 });
        assert_eq!(scores.all_time, Best { score: 120, level: 2 });
        assert_eq!(store.get(BEST_SCORE_KEY), Some(120));
        assert_eq!(store.get(BEST_LEVEL_KEY), Some(2));
    }

    #[test]
    fn lower_score_leaves_store_alone() {
        let mut store = MemoryStore::new();
        store.set(BEST_SCORE_KEY, 900).unwrap();
        store.set(BEST_LEVEL_KEY, 4).unwrap();
        let mut scores = Highscores::load(&store);

        assert!(!scores.record(300, 1, &mut store));

        assert_eq!(scores.run, Best { score: 300, level: 1 });
        assert_eq!(scores.all_time, Best { score: 900, level: 4 });
        assert_eq!(store.get(BEST_SCORE_KEY), Some(900));
    }

    #[test]
    fn equal_score_is_not_a_new_best() {
        let mut store = MemoryStore::new();
        let mut scores = Highscores::load(&store);
        scores.record(50, 0, &mut store);

        assert!(!scores.record(50, 3, &mut store));
        assert_eq!(scores.all_time.level, 0);
    }
}

mod file_store {
    use super::*;

    #[test]
    #[serial]
    fn missing_file_starts_empty() {
        let store = FileStore::open(fresh_path());

        assert_eq!(store.get(BEST_SCORE_KEY), None);
    }

    #[test]
    #[serial]
    fn values_survive_reopening() {
        let path = fresh_path();
        let mut store = FileStore::open(&path);
        store.set(BEST_SCORE_KEY, 4321).unwrap();
        store.set(BEST_LEVEL_KEY, 7).unwrap();

        let reopened = FileStore::open(&path);

        assert_eq!(reopened.get(BEST_SCORE_KEY), Some(4321));
        assert_eq!(reopened.get(BEST_LEVEL_KEY), Some(7));
        let _ = fs::remove_file(&path);
    }

    #[test]
    #[serial]
    fn malformed_lines_are_skipped() {
        let path = fresh_path();
        fs::write(&path, "best_score=77\ngarbage\nbest_level=nope\n").unwrap();

        let store = FileStore::open(&path);

        assert_eq!(store.get(BEST_SCORE_KEY), Some(77));
        assert_eq!(store.get(BEST_LEVEL_KEY), None);
        let _ = fs::remove_file(&path);
    }

    #[test]
    #[serial]
    fn game_loads_all_time_best_from_file() {
        let path = fresh_path();
        fs::write(&path, "best_level=3\nbest_score=2500\n").unwrap();

        let game = Game::with_provider(
            TimerQueue::new(),
            FileStore::open(&path),
            Box::new(SequencePieceProvider::upright(&[ShapeKind::O])),
        );

        assert_eq!(game.highscores().all_time, Best { score: 2500, level: 3 });
        assert_eq!(game.store().path(), path.as_path());
        let _ = fs::remove_file(&path);
    }
}
