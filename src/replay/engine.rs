use std::collections::BTreeMap;

use tracing::debug;

use super::applier::apply;
use crate::model::*;

// 前の局へ戻る際, 局開始直後にいる場合はさらに1つ前の局へ移動するための余白
pub const KYOKU_BACK_MARGIN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayConfig {
    // 盤面のスナップショットを保存する間隔 (0: 保存しない)
    // 巻き戻し時は直前のスナップショットから再生し直す
    pub snapshot_interval: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: 64,
        }
    }
}

// 牌譜の再生エンジン
// cursor = i は先頭からi個のイベントを適用済みの状態を表す (0: 初期状態)
// 巻き戻しは逆操作ではなく先頭(またはスナップショット)からの再計算で行う
#[derive(Debug)]
pub struct ReplayEngine {
    events: Vec<Event>,
    cursor: Index,
    current: BoardState,
    config: ReplayConfig,
    snapshots: BTreeMap<Index, BoardState>, // cursor -> 盤面
}

impl ReplayEngine {
    pub fn new(events: Vec<Event>) -> Self {
        Self::with_config(events, ReplayConfig::default())
    }

    pub fn with_config(events: Vec<Event>, config: ReplayConfig) -> Self {
        Self {
            events,
            cursor: 0,
            current: BoardState::default(),
            config,
            snapshots: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn current(&self) -> &BoardState {
        &self.current
    }

    #[inline]
    pub fn cursor(&self) -> Index {
        self.cursor
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[inline]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn step_forward(&mut self) -> bool {
        let Some(ev) = self.events.get(self.cursor) else {
            return false;
        };
        debug!(index = self.cursor, kind = %ev.kind(), "apply event");
        apply(&mut self.current, ev);
        self.cursor += 1;
        self.save_snapshot();
        true
    }

    pub fn step_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.rewind(self.cursor - 1);
        true
    }

    pub fn jump_to(&mut self, index: Index) {
        let index = index.min(self.events.len());
        if index < self.cursor {
            self.rewind(index);
        } else {
            self.forward_to(index);
        }
    }

    // 指定したプレイヤーの次(または前)の手番(ツモ,打牌,鳴き,槓)のイベント位置へ移動
    // 該当するイベントがない場合は移動しない
    pub fn step_turn(&mut self, forward: bool, seat: Seat) -> bool {
        let is_turn = |e: &Event| e.actor() == Some(seat) && e.kind().is_turn_action();
        let found = if forward {
            (self.cursor + 1..self.events.len()).find(|&i| is_turn(&self.events[i]))
        } else {
            (0..self.cursor).rev().find(|&i| is_turn(&self.events[i]))
        };
        let target = found.unwrap_or(self.cursor);
        self.jump_to(target);
        found.is_some()
    }

    pub fn kyoku_checkpoints(&self) -> Vec<Checkpoint> {
        self.events
            .iter()
            .enumerate()
            .filter_map(|(index, ev)| match ev {
                Event::StartKyoku(e) => Some(Checkpoint {
                    index,
                    round: e.round(),
                    honba: e.honba,
                }),
                _ => None,
            })
            .collect()
    }

    // cursor以前で最も新しい局の開始位置
    pub fn active_checkpoint(&self) -> Option<Checkpoint> {
        self.kyoku_checkpoints()
            .into_iter()
            .take_while(|cp| cp.index <= self.cursor)
            .last()
    }

    pub fn next_kyoku(&mut self) -> bool {
        let next = self
            .kyoku_checkpoints()
            .into_iter()
            .find(|cp| cp.index > self.cursor);
        match next {
            Some(cp) => {
                self.jump_to(cp.index);
                true
            }
            None => false,
        }
    }

    pub fn prev_kyoku(&mut self) -> bool {
        let prev = self
            .kyoku_checkpoints()
            .into_iter()
            .take_while(|cp| cp.index + KYOKU_BACK_MARGIN < self.cursor)
            .last();
        let cursor = self.cursor;
        self.jump_to(prev.map_or(0, |cp| cp.index));
        self.cursor != cursor
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.current = BoardState::default();
    }

    // target以前で最も新しいスナップショット(なければ初期状態)から再生し直す
    fn rewind(&mut self, target: Index) {
        match self.snapshots.range(..=target).next_back() {
            Some((&i, stg)) => {
                self.cursor = i;
                self.current = stg.clone();
            }
            None => self.reset(),
        }
        self.forward_to(target);
    }

    fn forward_to(&mut self, target: Index) {
        while self.cursor < target {
            if !self.step_forward() {
                break;
            }
        }
    }

    fn save_snapshot(&mut self) {
        let k = self.config.snapshot_interval;
        if k != 0 && self.cursor % k == 0 && !self.snapshots.contains_key(&self.cursor) {
            self.snapshots.insert(self.cursor, self.current.clone());
        }
    }
}

#[cfg(test)]
fn sample_engine(snapshot_interval: usize) -> ReplayEngine {
    let text = include_str!("../../tests/data/sample.mjson");
    let events = crate::convert::mjai::parse_log(text).unwrap();
    ReplayEngine::with_config(events, ReplayConfig { snapshot_interval })
}

#[test]
fn test_empty_log() {
    let mut eng = ReplayEngine::new(vec![]);
    assert!(eng.is_empty());
    assert!(!eng.step_forward());
    assert!(!eng.step_backward());
    eng.jump_to(10);
    assert_eq!(eng.cursor(), 0);
    assert!(!eng.step_turn(true, 0));
    assert!(!eng.next_kyoku());
    assert!(!eng.prev_kyoku());
    assert!(eng.kyoku_checkpoints().is_empty());
    assert_eq!(eng.active_checkpoint(), None);
    assert_eq!(*eng.current(), BoardState::default());
}

#[test]
fn test_draw_then_discard_scenario() {
    let hand = tiles_from_symbols(&[
        "2m", "3m", "4m", "1p", "1p", "1p", "9p", "9p", "1s", "2s", "3s", "E", "E",
    ]);
    let mut eng = ReplayEngine::new(vec![
        Event::start_kyoku(
            2,
            0,
            0,
            0,
            Tile::new("1m"),
            [25000; SEAT],
            [hand.clone(), vec![], vec![], vec![]],
        ),
        Event::tsumo(0, Tile::new("5m")),
        Event::dahai(0, Tile::new("5m"), true),
    ]);
    while eng.step_forward() {}
    let stg = eng.current();
    assert_eq!(eng.cursor(), 3);
    assert_eq!(stg.players[0].hand, hand);
    assert_eq!(
        stg.players[0].discards,
        vec![DiscardEntry {
            tile: Tile::new("5m"),
            is_riichi: false
        }]
    );
    assert_eq!(stg.dora_markers, tiles_from_symbols(&["1m"]));
    assert_eq!(stg.current_actor, 0);
    assert_eq!(stg.round, 1);
}

#[test]
fn test_step_backward_rederives() {
    for k in [0, 1, 4, 64] {
        let mut eng = sample_engine(k);
        eng.jump_to(14);
        let mut expected = sample_engine(0);
        expected.jump_to(13);

        assert!(eng.step_backward());
        assert_eq!(eng.cursor(), 13);
        assert_eq!(eng.current(), expected.current());
    }
}

#[test]
fn test_jump_to_clamps() {
    let mut eng = sample_engine(8);
    eng.jump_to(1000);
    assert_eq!(eng.cursor(), eng.len());
    assert!(!eng.step_forward());
    assert!(matches!(eng.current().last_event, Some(Event::EndGame(_))));
    eng.jump_to(0);
    assert_eq!(eng.cursor(), 0);
    assert_eq!(*eng.current(), BoardState::default());
}

#[test]
fn test_step_turn() {
    let mut eng = sample_engine(64);
    assert!(eng.step_turn(true, 2));
    assert_eq!(eng.cursor(), 6); // tsumo
    assert!(eng.step_turn(true, 2));
    assert_eq!(eng.cursor(), 7); // ankan
    assert!(eng.step_turn(true, 2));
    assert_eq!(eng.cursor(), 9); // tsumo (嶺上)
    assert!(eng.step_turn(true, 2));
    assert_eq!(eng.cursor(), 11); // reachは対象外
    assert!(eng.step_turn(false, 2));
    assert_eq!(eng.cursor(), 9);

    // 鳴き
    assert!(eng.step_turn(true, 3));
    assert_eq!(eng.cursor(), 13);

    eng.jump_to(41);
    assert!(!eng.step_turn(true, 2));
    assert_eq!(eng.cursor(), 41);
    assert!(!eng.step_turn(true, 3));
    assert_eq!(eng.cursor(), 41);

    eng.jump_to(2);
    assert!(!eng.step_turn(false, 0));
    assert_eq!(eng.cursor(), 2);
}

#[test]
fn test_kyoku_checkpoints() {
    let eng = sample_engine(64);
    let cps = eng.kyoku_checkpoints();
    assert_eq!(
        cps,
        vec![
            Checkpoint {
                index: 1,
                round: 0,
                honba: 0
            },
            Checkpoint {
                index: 24,
                round: 1,
                honba: 0
            },
            Checkpoint {
                index: 37,
                round: 1,
                honba: 1
            },
        ]
    );
    assert_eq!(cps[2].to_string(), "E2 - 1 Honba");
}

#[test]
fn test_kyoku_navigation() {
    let mut eng = sample_engine(64);
    assert_eq!(eng.active_checkpoint(), None);
    assert!(eng.next_kyoku());
    assert_eq!(eng.cursor(), 1);
    assert_eq!(eng.active_checkpoint().map(|cp| cp.index), Some(1));
    assert!(eng.next_kyoku());
    assert_eq!(eng.cursor(), 24);
    assert!(eng.next_kyoku());
    assert_eq!(eng.cursor(), 37);
    assert!(!eng.next_kyoku());
    assert_eq!(eng.cursor(), 37);

    // 局開始直後からは1つ前の局へ
    eng.jump_to(40);
    assert!(eng.prev_kyoku());
    assert_eq!(eng.cursor(), 24);
    eng.jump_to(43);
    assert!(eng.prev_kyoku());
    assert_eq!(eng.cursor(), 37);
    eng.jump_to(5);
    assert!(eng.prev_kyoku());
    assert_eq!(eng.cursor(), 0);
    assert!(!eng.prev_kyoku());
}

#[test]
fn test_snapshot_cache_matches_full_replay() {
    let mut cached = sample_engine(4);
    let mut plain = sample_engine(0);
    for &i in &[43, 10, 30, 3, 42, 0, 21, 22, 7] {
        cached.jump_to(i);
        plain.jump_to(i);
        assert_eq!(cached.cursor(), plain.cursor());
        assert_eq!(cached.current(), plain.current(), "index {}", i);
    }
}
