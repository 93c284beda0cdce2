use mahjong_replay::{
    convert::mjai::parse_log,
    model::*,
    replay::{validate, ReplayConfig, ReplayEngine},
};
use rand::{rngs::StdRng, Rng, SeedableRng};

const SAMPLE: &str = include_str!("data/sample.mjson");

fn sample_events() -> Vec<Event> {
    parse_log(SAMPLE).unwrap()
}

fn engine_at(k: usize) -> ReplayEngine {
    let mut eng = ReplayEngine::with_config(sample_events(), ReplayConfig { snapshot_interval: 0 });
    eng.jump_to(k);
    eng
}

fn discard(sym: &str, is_riichi: bool) -> DiscardEntry {
    DiscardEntry {
        tile: Tile::new(sym),
        is_riichi,
    }
}

#[test]
fn test_sample_is_valid() {
    assert!(validate(&sample_events()).is_ok());
}

#[test]
fn test_jump_equals_sequential_steps() {
    let n = sample_events().len();
    let mut seq = ReplayEngine::new(sample_events());
    for k in 0..=n {
        let eng = engine_at(k);
        assert_eq!(eng.cursor(), seq.cursor());
        assert_eq!(eng.current(), seq.current(), "cursor {}", k);
        seq.step_forward();
    }
}

#[test]
fn test_round_trip_seek() {
    let n = sample_events().len();
    let mut rng = StdRng::seed_from_u64(20240101);
    for interval in [0, 1, 5, 64] {
        let mut eng =
            ReplayEngine::with_config(sample_events(), ReplayConfig { snapshot_interval: interval });
        for _ in 0..50 {
            let i = rng.gen_range(0..=n);
            let j = rng.gen_range(0..=n);
            eng.jump_to(i);
            eng.jump_to(j);
            eng.jump_to(i);
            assert_eq!(eng.current(), engine_at(i).current(), "i: {}, j: {}", i, j);
        }
    }
}

#[test]
fn test_cursor_bounds() {
    let n = sample_events().len();
    let mut rng = StdRng::seed_from_u64(7);
    let mut eng = ReplayEngine::new(sample_events());
    for _ in 0..500 {
        match rng.gen_range(0..7) {
            0 => {
                eng.step_forward();
            }
            1 => {
                eng.step_backward();
            }
            2 => eng.jump_to(rng.gen_range(0..n * 3)),
            3 => {
                eng.step_turn(rng.gen(), rng.gen_range(0..SEAT));
            }
            4 => {
                eng.next_kyoku();
            }
            5 => {
                eng.prev_kyoku();
            }
            _ => eng.jump_to(usize::MAX),
        }
        assert!(eng.cursor() <= n);
        assert_eq!(eng.current(), engine_at(eng.cursor()).current());
    }
}

#[test]
fn test_riichi_stake() {
    // step 1の直前(10)とstep 2の直後(13)
    let before = engine_at(10);
    let after = engine_at(13);
    assert_eq!(after.current().kyotaku, before.current().kyotaku + 1);
    assert_eq!(
        after.current().players[2].score,
        before.current().players[2].score - RIICHI_STAKE
    );
    assert!(after.current().players[2].riichi);

    // 宣言牌の打牌直後(12)はまだ支払っていない
    let declared = engine_at(12);
    let pl = &declared.current().players[2];
    assert_eq!(pl.discards, vec![discard("9m", true)]);
    assert!(!pl.pending_riichi);
    assert!(!pl.riichi);
    assert_eq!(pl.score, 25000);
    assert_eq!(declared.current().kyotaku, 0);
}

#[test]
fn test_stolen_riichi_discard() {
    let eng = engine_at(14);
    let stg = eng.current();
    let victim = &stg.players[2];
    assert!(victim.discards.is_empty());
    assert!(victim.pending_riichi);
    assert!(victim.riichi);
    assert_eq!(victim.score, 24000);

    let caller = &stg.players[3];
    assert_eq!(caller.hand.len(), 11);
    assert_eq!(caller.melds.len(), 1);
    assert_eq!(caller.melds[0].kind, MeldKind::Pon);
    assert_eq!(caller.melds[0].tiles, tiles_from_symbols(&["9m", "9m", "9m"]));
    assert_eq!(caller.melds[0].from, 2);
    assert_eq!(stg.current_actor, 3);

    // 次の打牌が宣言牌として記録される
    let eng = engine_at(21);
    let victim = &eng.current().players[2];
    assert_eq!(victim.discards, vec![discard("2s", true)]);
    assert!(!victim.pending_riichi);
}

#[test]
fn test_hand_size_after_dahai() {
    let events = sample_events();
    let mut eng = ReplayEngine::new(events.clone());
    for ev in &events {
        let before = eng.current().clone();
        eng.step_forward();
        if let Event::Dahai(e) = ev {
            let s = e.actor.unwrap();
            assert_eq!(
                eng.current().players[s].hand.len() + 1,
                before.players[s].hand.len(),
                "cursor {}",
                eng.cursor()
            );
        }
    }
}

#[test]
fn test_hands_sorted_after_dahai() {
    let eng = engine_at(21);
    let hand = &eng.current().players[0].hand;
    assert_eq!(
        *hand,
        tiles_from_symbols(&["1m", "2m", "3m", "4p", "5p", "5pr", "6p", "7s", "8s", "9s", "E", "C", "C"])
    );
    assert_eq!(eng.current().players[0].discards, vec![discard("E", false)]);
}

#[test]
fn test_round_settlement() {
    let eng = engine_at(23);
    assert_eq!(eng.current().get_scores(), [24000, 24000, 19000, 33000]);

    let eng = engine_at(36);
    let stg = eng.current();
    assert_eq!(stg.get_scores(), [25500, 22500, 17500, 34500]);
    assert_eq!(stg.round, 1);
    assert_eq!(stg.dora_markers, tiles_from_symbols(&["W"]));
    assert_eq!(stg.players[0].melds[0].from, 3);
    assert!(stg.players[3].discards.is_empty());
}

#[test]
fn test_new_kyoku_resets_round_state() {
    let eng = engine_at(43);
    let stg = eng.current();
    assert_eq!((stg.round, stg.honba, stg.kyotaku), (1, 1, 0));
    assert_eq!(stg.dora_markers, tiles_from_symbols(&["2s"]));
    assert_eq!(stg.current_actor, 2);
    for pl in &stg.players {
        assert!(pl.melds.is_empty());
        assert!(!pl.riichi && !pl.pending_riichi);
    }
    assert!(matches!(stg.last_event, Some(Event::EndGame(_))));
}

#[test]
fn test_snapshot_json() {
    let eng = engine_at(14);
    let v = serde_json::to_value(eng.current()).unwrap();
    assert_eq!(v["kyotaku"], 1);
    assert_eq!(v["players"][2]["pending_riichi"], true);
    assert_eq!(v["players"][3]["melds"][0]["kind"], "pon");
    assert_eq!(v["last_event"]["type"], "pon");
}
