use tracing::warn;

use crate::model::*;
use crate::util::misc::vec_remove_first;

// イベントを1つ盤面に適用する
// 牌譜の先頭から順番に適用することが前提 (同じイベントの二重適用や順序の入れ替えは不可)
// 不正なイベントでもpanicせず, 実行できない処理を飛ばす
pub fn apply(stg: &mut BoardState, event: &Event) {
    match event {
        Event::StartGame(_) => {}
        Event::StartKyoku(e) => event_start_kyoku(stg, e),
        Event::Tsumo(e) => event_tsumo(stg, e),
        Event::Dahai(e) => event_dahai(stg, e),
        Event::Pon(e) => event_call(stg, e, MeldKind::Pon),
        Event::Chi(e) => event_call(stg, e, MeldKind::Chi),
        Event::Daiminkan(e) => event_call(stg, e, MeldKind::Daiminkan),
        Event::Kakan(e) => event_self_kan(stg, e, MeldKind::Kakan),
        Event::Ankan(e) => event_self_kan(stg, e, MeldKind::Ankan),
        Event::Reach(e) => event_reach(stg, e),
        Event::ReachAccepted(e) => event_reach_accepted(stg, e),
        Event::Dora(e) => event_dora(stg, e),
        Event::Hora(e) => update_scores(stg, e.scores.as_deref()),
        Event::Ryukyoku(e) => update_scores(stg, e.scores.as_deref()),
        Event::EndKyoku(_) | Event::EndGame(_) | Event::Other => {}
    }
    stg.last_event = Some(event.clone());
}

fn event_start_kyoku(stg: &mut BoardState, event: &EventStartKyoku) {
    stg.round = event.round();
    stg.honba = event.honba;
    stg.kyotaku = event.kyotaku;
    stg.dora_markers = event.dora_marker.iter().cloned().collect();
    stg.current_actor = event.oya;

    for (s, pl) in stg.players.iter_mut().enumerate() {
        pl.hand = event.tehais.get(s).cloned().unwrap_or_default();
        pl.discards.clear();
        pl.melds.clear();
        pl.riichi = false;
        pl.pending_riichi = false;
        if let Some(&score) = event.scores.get(s) {
            pl.score = score;
        }
    }
}

fn event_tsumo(stg: &mut BoardState, event: &EventTsumo) {
    let (Some(s), Some(t)) = (event.actor, &event.pai) else {
        return;
    };
    if !is_seat(s) {
        return;
    }

    // ツモ牌はソートせず末尾に追加 (表示側で打牌待ちの判定に使用)
    stg.players[s].hand.push(t.clone());
    stg.current_actor = s;
}

fn event_dahai(stg: &mut BoardState, event: &EventDahai) {
    let (Some(s), Some(t)) = (event.actor, &event.pai) else {
        return;
    };
    if !is_seat(s) {
        return;
    }

    let pl = &mut stg.players[s];
    remove_from_hand(&mut pl.hand, s, t);
    sort_hand(&mut pl.hand);

    // リーチ宣言中であればこの打牌が宣言牌
    let is_riichi = pl.pending_riichi;
    pl.pending_riichi = false;
    pl.discards.push(DiscardEntry {
        tile: t.clone(),
        is_riichi,
    });
    stg.current_actor = s;
}

fn event_call(stg: &mut BoardState, event: &EventCall, kind: MeldKind) {
    let (Some(s), Some(target), Some(t), Some(consumed)) =
        (event.actor, event.target, &event.pai, &event.consumed)
    else {
        return;
    };
    if !is_seat(s) || !is_seat(target) {
        return;
    }

    let pl = &mut stg.players[s];
    for c in consumed {
        remove_from_hand(&mut pl.hand, s, c);
    }
    let mut tiles = consumed.clone();
    tiles.push(t.clone());
    pl.melds.push(MeldRecord {
        kind,
        tiles,
        from: target,
    });
    stg.current_actor = s;

    // 鳴かれた牌を捨て牌から取り除く
    // リーチ宣言牌が鳴かれた場合は次の打牌を宣言牌として扱う
    let pl_target = &mut stg.players[target];
    match pl_target.discards.pop() {
        Some(d) => {
            if d.is_riichi {
                pl_target.pending_riichi = true;
            }
        }
        None => warn!("{}: seat {} has no discard to call", kind, target),
    }
}

fn event_self_kan(stg: &mut BoardState, event: &EventSelfKan, kind: MeldKind) {
    let (Some(s), Some(consumed)) = (event.actor, &event.consumed) else {
        return;
    };
    if !is_seat(s) {
        return;
    }

    let pl = &mut stg.players[s];
    for c in consumed {
        remove_from_hand(&mut pl.hand, s, c);
    }
    pl.melds.push(MeldRecord {
        kind,
        tiles: consumed.clone(),
        from: s,
    });
}

fn event_reach(stg: &mut BoardState, event: &EventReach) {
    let Some(s) = event.actor else {
        return;
    };
    if !is_seat(s) {
        return;
    }

    match &event.step {
        None | Some(ReachStep::Declare) => stg.players[s].pending_riichi = true,
        Some(ReachStep::Accept) => accept_riichi(stg, s),
        Some(ReachStep::Other(v)) => warn!("unknown reach step {:?} for seat {}", v, s),
    }
}

fn event_reach_accepted(stg: &mut BoardState, event: &EventReachAccepted) {
    if let Some(s) = event.actor.filter(|&s| is_seat(s)) {
        accept_riichi(stg, s);
    }
}

fn event_dora(stg: &mut BoardState, event: &EventDora) {
    if let Some(t) = &event.dora_marker {
        stg.dora_markers.push(t.clone());
    }
}

// リーチ成立 (供託とリーチ棒の支払いは宣言時ではなくここで行う)
fn accept_riichi(stg: &mut BoardState, s: Seat) {
    let pl = &mut stg.players[s];
    pl.riichi = true;
    pl.score -= RIICHI_STAKE;
    stg.kyotaku += 1;
}

// 和了・流局の精算後の持ち点で上書き
fn update_scores(stg: &mut BoardState, scores: Option<&[Score]>) {
    let Some(scores) = scores else {
        return;
    };
    for (pl, &score) in stg.players.iter_mut().zip(scores) {
        pl.score = score;
    }
}

fn remove_from_hand(hand: &mut Vec<Tile>, s: Seat, t: &Tile) {
    if !vec_remove_first(hand, t) {
        warn!("seat {}: tile {} not found in hand", s, t);
    }
}

#[cfg(test)]
fn tiles(syms: &[&str]) -> Vec<Tile> {
    tiles_from_symbols(syms)
}

#[cfg(test)]
fn new_kyoku() -> Event {
    Event::start_kyoku(
        1,
        0,
        0,
        0,
        Tile::new("1m"),
        [25000; SEAT],
        [
            tiles(&["1m", "2m", "3m", "4p", "5p", "6p", "7s", "8s", "9s", "E", "E", "C", "C"]),
            tiles(&["2m", "2m", "3p", "3p", "5s", "5s", "5sr", "9m", "9p", "S", "W", "N", "P"]),
            tiles(&["4m", "5m", "6m", "1p", "1p", "2s", "3s", "4s", "7p", "8p", "F", "F", "F"]),
            tiles(&["?"; 13]),
        ],
    )
}

#[cfg(test)]
fn replay(events: &[Event]) -> BoardState {
    let mut stg = BoardState::default();
    for e in events {
        apply(&mut stg, e);
    }
    stg
}

#[test]
fn test_start_kyoku_reset() {
    let mut stg = replay(&[new_kyoku(), Event::tsumo(0, Tile::new("5m"))]);
    stg.players[1].riichi = true;
    stg.players[1].discards.push(DiscardEntry {
        tile: Tile::new("1s"),
        is_riichi: true,
    });

    let ev = Event::start_kyoku(
        3,
        2,
        1,
        2,
        Tile::new("P"),
        [24000, 26000, 23000, 27000],
        Default::default(),
    );
    apply(&mut stg, &ev);
    assert_eq!(stg.round, 2);
    assert_eq!(stg.honba, 2);
    assert_eq!(stg.kyotaku, 1);
    assert_eq!(stg.current_actor, 2);
    assert_eq!(stg.dora_markers, tiles(&["P"]));
    assert_eq!(stg.get_scores(), [24000, 26000, 23000, 27000]);
    for pl in &stg.players {
        assert!(pl.hand.is_empty() && pl.discards.is_empty() && pl.melds.is_empty());
        assert!(!pl.riichi && !pl.pending_riichi);
    }
    assert_eq!(stg.last_event, Some(ev));
}

#[test]
fn test_tsumo_dahai() {
    let stg = replay(&[
        new_kyoku(),
        Event::tsumo(0, Tile::new("5m")),
        Event::dahai(0, Tile::new("5m"), true),
    ]);
    let pl = &stg.players[0];
    assert_eq!(pl.hand, replay(&[new_kyoku()]).players[0].hand);
    assert_eq!(
        pl.discards,
        vec![DiscardEntry {
            tile: Tile::new("5m"),
            is_riichi: false
        }]
    );
    assert_eq!(stg.dora_markers, tiles(&["1m"]));
    assert_eq!(stg.current_actor, 0);
}

#[test]
fn test_tsumo_appends_and_dahai_sorts() {
    let mut stg = replay(&[new_kyoku(), Event::tsumo(1, Tile::new("1m"))]);
    assert_eq!(stg.players[1].hand.last(), Some(&Tile::new("1m")));
    assert_eq!(stg.current_actor, 1);

    apply(&mut stg, &Event::dahai(1, Tile::new("P"), false));
    let hand = &stg.players[1].hand;
    assert_eq!(hand.len(), 13);
    assert_eq!(
        *hand,
        tiles(&["1m", "2m", "2m", "9m", "3p", "3p", "9p", "5s", "5s", "5sr", "S", "W", "N"])
    );
}

#[test]
fn test_dahai_missing_tile() {
    let mut stg = replay(&[new_kyoku()]);
    let before = stg.players[0].hand.len();
    apply(&mut stg, &Event::dahai(0, Tile::new("9z"), false));
    assert_eq!(stg.players[0].hand.len(), before);
    assert_eq!(stg.players[0].discards.len(), 1);
}

#[test]
fn test_reach_declare_then_discard() {
    let stg = replay(&[
        new_kyoku(),
        Event::tsumo(2, Tile::new("9s")),
        Event::reach(2, ReachStep::Declare),
        Event::dahai(2, Tile::new("9s"), true),
    ]);
    let pl = &stg.players[2];
    assert_eq!(
        pl.discards.last(),
        Some(&DiscardEntry {
            tile: Tile::new("9s"),
            is_riichi: true
        })
    );
    assert!(!pl.pending_riichi);
    assert!(!pl.riichi);
    assert_eq!(pl.score, 25000);
    assert_eq!(stg.kyotaku, 0);
}

#[test]
fn test_reach_stake() {
    let mut stg = replay(&[new_kyoku(), Event::tsumo(2, Tile::new("9s"))]);
    let score = stg.players[2].score;
    let kyotaku = stg.kyotaku;
    apply(&mut stg, &Event::reach(2, ReachStep::Declare));
    assert_eq!(stg.players[2].score, score);
    apply(&mut stg, &Event::dahai(2, Tile::new("9s"), true));
    apply(&mut stg, &Event::reach(2, ReachStep::Accept));
    assert!(stg.players[2].riichi);
    assert_eq!(stg.players[2].score, score - 1000);
    assert_eq!(stg.kyotaku, kyotaku + 1);

    apply(&mut stg, &Event::reach_accepted(3));
    assert!(stg.players[3].riichi);
    assert_eq!(stg.players[3].score, 24000);
    assert_eq!(stg.kyotaku, kyotaku + 2);
}

#[test]
fn test_reach_without_step() {
    let reach: Event = serde_json::from_str(r#"{"type":"reach","actor":2}"#).unwrap();
    let mut stg = replay(&[new_kyoku(), Event::tsumo(2, Tile::new("9s")), reach]);
    assert!(stg.players[2].pending_riichi);

    apply(&mut stg, &Event::dahai(2, Tile::new("9s"), true));
    let pl = &stg.players[2];
    assert_eq!(pl.discards.last().map(|d| d.is_riichi), Some(true));
    assert!(!pl.pending_riichi);
    assert!(!pl.riichi);

    apply(&mut stg, &Event::reach_accepted(2));
    assert!(stg.players[2].riichi);
    assert_eq!(stg.players[2].score, 24000);
    assert_eq!(stg.kyotaku, 1);
}

#[test]
fn test_reach_unknown_step_is_ignored() {
    let reach: Event = serde_json::from_str(r#"{"type":"reach","actor":2,"step":"3"}"#).unwrap();
    let mut stg = replay(&[new_kyoku(), Event::tsumo(2, Tile::new("9s"))]);
    let before = stg.clone();
    apply(&mut stg, &reach);
    assert_eq!(stg.players, before.players);
    assert_eq!(stg.kyotaku, before.kyotaku);
}

#[test]
fn test_pon_steals_riichi_discard() {
    let stg = replay(&[
        new_kyoku(),
        Event::tsumo(0, Tile::new("S")),
        Event::reach(0, ReachStep::Declare),
        Event::dahai(0, Tile::new("S"), true),
        Event::reach(0, ReachStep::Accept),
        Event::pon(1, 0, Tile::new("S"), tiles(&["S", "W"])),
    ]);
    let victim = &stg.players[0];
    assert!(victim.discards.is_empty());
    assert!(victim.pending_riichi);
    assert!(victim.riichi);
    assert_eq!(victim.score, 24000);

    let caller = &stg.players[1];
    assert_eq!(caller.hand.len(), 11);
    assert_eq!(
        caller.melds,
        vec![MeldRecord {
            kind: MeldKind::Pon,
            tiles: tiles(&["S", "W", "S"]),
            from: 0,
        }]
    );
    assert_eq!(stg.current_actor, 1);
}

#[test]
fn test_chi_and_daiminkan() {
    let stg = replay(&[
        new_kyoku(),
        Event::tsumo(0, Tile::new("3m")),
        Event::dahai(0, Tile::new("3m"), true),
        Event::chi(1, 0, Tile::new("3m"), tiles(&["2m", "2m"])),
        Event::dahai(1, Tile::new("9m"), false),
        Event::daiminkan(3, 1, Tile::new("9m"), tiles(&["?", "?", "?"])),
    ]);
    assert!(stg.players[0].discards.is_empty());
    assert!(stg.players[1].discards.is_empty());
    assert!(!stg.players[0].pending_riichi);
    assert_eq!(stg.players[1].melds[0].kind, MeldKind::Chi);
    assert_eq!(stg.players[3].hand.len(), 10);
    assert_eq!(stg.players[3].melds[0].tiles, tiles(&["?", "?", "?", "9m"]));
    assert_eq!(stg.players[3].melds[0].from, 1);
    assert_eq!(stg.current_actor, 3);
}

#[test]
fn test_call_without_target_is_skipped() {
    let mut stg = replay(&[new_kyoku()]);
    let before = stg.clone();
    let ev: Event =
        serde_json::from_str(r#"{"type":"pon","actor":1,"pai":"S","consumed":["S","S"]}"#).unwrap();
    apply(&mut stg, &ev);
    assert_eq!(stg.players, before.players);
    assert_eq!(stg.last_event, Some(ev));
}

#[test]
fn test_ankan_kakan() {
    let stg = replay(&[
        new_kyoku(),
        Event::tsumo(2, Tile::new("F")),
        Event::ankan(2, tiles(&["F", "F", "F", "F"])),
    ]);
    let pl = &stg.players[2];
    assert_eq!(pl.hand.len(), 10);
    assert_eq!(
        pl.melds,
        vec![MeldRecord {
            kind: MeldKind::Ankan,
            tiles: tiles(&["F", "F", "F", "F"]),
            from: 2,
        }]
    );
    // 暗槓は手番を変更しない
    assert_eq!(stg.current_actor, 2);

    let stg = replay(&[
        new_kyoku(),
        Event::tsumo(1, Tile::new("3p")),
        Event::kakan(1, Tile::new("3p"), tiles(&["3p", "3p", "3p"])),
    ]);
    assert_eq!(stg.players[1].melds[0].kind, MeldKind::Kakan);
    assert_eq!(stg.players[1].melds[0].from, 1);
    assert_eq!(stg.players[1].hand.len(), 11);
}

#[test]
fn test_dora_and_settlement() {
    let stg = replay(&[
        new_kyoku(),
        Event::dora(Tile::new("5pr")),
        Event::tsumo(0, Tile::new("3m")),
        Event::reach(0, ReachStep::Declare),
        Event::dahai(0, Tile::new("3m"), true),
        Event::reach(0, ReachStep::Accept),
        Event::hora(1, 0, Tile::new("3m"), [16000, 35000, 25000, 24000]),
    ]);
    assert_eq!(stg.dora_markers, tiles(&["1m", "5pr"]));
    assert_eq!(stg.get_scores(), [16000, 35000, 25000, 24000]);

    let mut stg = stg;
    apply(&mut stg, &Event::ryukyoku([17000, 34000, 25000, 24000]));
    assert_eq!(stg.get_scores(), [17000, 34000, 25000, 24000]);
}

#[test]
fn test_out_of_range_seat_is_skipped() {
    let mut stg = replay(&[new_kyoku()]);
    let before = stg.clone();
    apply(&mut stg, &Event::tsumo(7, Tile::new("1m")));
    apply(&mut stg, &Event::dahai(4, Tile::new("1m"), false));
    apply(&mut stg, &Event::pon(1, 9, Tile::new("S"), tiles(&["S", "S"])));
    apply(&mut stg, &Event::reach(5, ReachStep::Accept));
    assert_eq!(stg.players, before.players);
    assert_eq!(stg.kyotaku, before.kyotaku);
}
