use tracing::info;

use super::applier::apply;
use crate::error::{ReplayError, ReplayResult};
use crate::model::*;
use crate::util::misc::vec_count;

// 厳格モード: 再生前に牌譜の整合性を検査する
// 通常の再生(lenient)には影響しない
pub fn validate(events: &[Event]) -> ReplayResult {
    let mut stg = BoardState::default();
    for (i, e) in events.iter().enumerate() {
        check(&stg, e, i)?;
        apply(&mut stg, e);
    }
    info!("validated {} events", events.len());
    Ok(())
}

// 不整合をすべて列挙 (検出後もそのまま再生を続ける)
pub fn find_violations(events: &[Event]) -> Vec<ReplayError> {
    let mut stg = BoardState::default();
    let mut res = vec![];
    for (i, e) in events.iter().enumerate() {
        if let Err(err) = check(&stg, e, i) {
            res.push(err);
        }
        apply(&mut stg, e);
    }
    res
}

// eventをstgに適用する前の事前条件を検査 (stgは変更しない)
pub fn check(stg: &BoardState, event: &Event, index: Index) -> ReplayResult {
    check_event(stg, event).map_err(|reason| ReplayError::Invalid { index, reason })
}

fn check_event(stg: &BoardState, event: &Event) -> Result<(), String> {
    match event {
        Event::StartKyoku(e) => {
            seat(Some(e.oya), "oya")?;
            required(&e.dora_marker, "dora_marker")?;
            if e.tehais.len() != SEAT {
                return Err(format!("tehais must have {} hands", SEAT));
            }
            if e.scores.len() != SEAT {
                return Err(format!("scores must have {} entries", SEAT));
            }
        }
        Event::Tsumo(e) => {
            seat(e.actor, "actor")?;
            required(&e.pai, "pai")?;
        }
        Event::Dahai(e) => {
            let s = seat(e.actor, "actor")?;
            let t = required(&e.pai, "pai")?;
            in_hand(stg, s, std::slice::from_ref(t))?;
        }
        Event::Pon(e) | Event::Chi(e) | Event::Daiminkan(e) => {
            let s = seat(e.actor, "actor")?;
            let target = seat(e.target, "target")?;
            let t = required(&e.pai, "pai")?;
            let consumed = required(&e.consumed, "consumed")?;
            if s == target {
                return Err(format!("seat {} calls own discard", s));
            }
            in_hand(stg, s, consumed)?;
            match stg.players[target].discards.last() {
                Some(d) if &d.tile == t => {}
                Some(d) => {
                    return Err(format!(
                        "last discard of seat {} is {}, not {}",
                        target, d.tile, t
                    ))
                }
                None => return Err(format!("seat {} has no discard to call", target)),
            }
        }
        Event::Kakan(e) | Event::Ankan(e) => {
            let s = seat(e.actor, "actor")?;
            let consumed = required(&e.consumed, "consumed")?;
            in_hand(stg, s, consumed)?;
        }
        Event::Reach(e) => {
            let s = seat(e.actor, "actor")?;
            match &e.step {
                None | Some(ReachStep::Declare) => {
                    let pl = &stg.players[s];
                    if pl.riichi || pl.pending_riichi {
                        return Err(format!("seat {} is already in riichi", s));
                    }
                }
                Some(ReachStep::Accept) => riichi_acceptable(stg, s)?,
                Some(ReachStep::Other(v)) => return Err(format!("unknown reach step: {}", v)),
            }
        }
        Event::ReachAccepted(e) => {
            let s = seat(e.actor, "actor")?;
            riichi_acceptable(stg, s)?;
        }
        Event::Dora(e) => {
            required(&e.dora_marker, "dora_marker")?;
        }
        Event::Hora(e) => scores(&e.scores)?,
        Event::Ryukyoku(e) => scores(&e.scores)?,
        Event::StartGame(_) | Event::EndKyoku(_) | Event::EndGame(_) | Event::Other => {}
    }
    Ok(())
}

fn seat(s: Option<Seat>, name: &str) -> Result<Seat, String> {
    match s {
        Some(s) if is_seat(s) => Ok(s),
        Some(s) => Err(format!("{} out of range: {}", name, s)),
        None => Err(format!("{} missing", name)),
    }
}

fn required<'a, T>(v: &'a Option<T>, name: &str) -> Result<&'a T, String> {
    v.as_ref().ok_or_else(|| format!("{} missing", name))
}

fn scores(v: &Option<Vec<Score>>) -> Result<(), String> {
    let v = required(v, "scores")?;
    if v.len() != SEAT {
        return Err(format!("scores must have {} entries", SEAT));
    }
    Ok(())
}

// リーチ成立は宣言牌の打牌直後のみ
fn riichi_acceptable(stg: &BoardState, s: Seat) -> Result<(), String> {
    let pl = &stg.players[s];
    if pl.riichi {
        return Err(format!("seat {} is already in riichi", s));
    }
    if pl.pending_riichi {
        return Err(format!("seat {} accepts riichi before discarding", s));
    }
    if !pl.discards.last().is_some_and(|d| d.is_riichi) {
        return Err(format!("seat {} accepts riichi without declaring", s));
    }
    Ok(())
}

// 手牌に必要な枚数がそろっているか
fn in_hand(stg: &BoardState, s: Seat, tiles: &[Tile]) -> Result<(), String> {
    let hand = &stg.players[s].hand;
    for t in tiles {
        if vec_count(hand, t) < vec_count(tiles, t) {
            return Err(format!("seat {}: tile {} not in hand", s, t));
        }
    }
    Ok(())
}

#[cfg(test)]
fn sample_log() -> Vec<Event> {
    let hand = |syms: &[&str]| tiles_from_symbols(syms);
    vec![
        Event::start_game(),
        Event::start_kyoku(
            1,
            0,
            0,
            0,
            Tile::new("1m"),
            [25000; SEAT],
            [
                hand(&["1m", "2m", "3m", "4p", "5p", "6p", "7s", "8s", "9s", "E", "E", "C", "C"]),
                hand(&["2m", "4m", "3p", "3p", "5s", "5s", "5sr", "9m", "9p", "S", "W", "N", "P"]),
                hand(&["4m", "5m", "6m", "1p", "1p", "2s", "3s", "4s", "7p", "8p", "F", "F", "F"]),
                hand(&["1s", "1s", "2p", "2p", "6s", "6s", "7m", "7m", "8m", "8m", "N", "N", "S"]),
            ],
        ),
        Event::tsumo(0, Tile::new("3m")),
        Event::dahai(0, Tile::new("3m"), true),
        Event::chi(1, 0, Tile::new("3m"), hand(&["2m", "4m"])),
        Event::dahai(1, Tile::new("P"), false),
        Event::tsumo(2, Tile::new("F")),
        Event::ankan(2, hand(&["F", "F", "F", "F"])),
        Event::dora(Tile::new("6s")),
        Event::reach(2, ReachStep::Declare),
        Event::dahai(2, Tile::new("8p"), false),
        Event::reach(2, ReachStep::Accept),
        Event::ryukyoku([25000, 25000, 24000, 25000]),
        Event::EndKyoku(EventMarker {}),
        Event::EndGame(EventMarker {}),
    ]
}

#[test]
fn test_validate_ok() {
    let events = sample_log();
    assert!(validate(&events).is_ok());
    assert!(find_violations(&events).is_empty());
}

#[test]
fn test_validate_missing_tile() {
    let mut events = sample_log();
    events[3] = Event::dahai(0, Tile::new("9p"), true);
    match validate(&events) {
        Err(ReplayError::Invalid { index, reason }) => {
            assert_eq!(index, 3);
            assert!(reason.contains("9p"), "{}", reason);
        }
        r => panic!("unexpected result: {:?}", r),
    }
}

#[test]
fn test_validate_call_mismatch() {
    let mut events = sample_log();
    events[4] = Event::chi(1, 0, Tile::new("4m"), tiles_from_symbols(&["2m", "4m"]));
    let errs = find_violations(&events);
    assert_eq!(errs.len(), 1);
    assert!(matches!(errs[0], ReplayError::Invalid { index: 4, .. }));
}

#[test]
fn test_validate_missing_fields() {
    let ev: Event = serde_json::from_str(r#"{"type":"ankan","actor":1}"#).unwrap();
    let err = check(&BoardState::default(), &ev, 10).unwrap_err();
    assert_eq!(err.to_string(), "invalid event at index 10: consumed missing");

    let ev = Event::tsumo(4, Tile::new("1m"));
    let err = check(&BoardState::default(), &ev, 0).unwrap_err();
    assert_eq!(err.to_string(), "invalid event at index 0: actor out of range: 4");
}

#[test]
fn test_validate_riichi_accept_without_declare() {
    let mut events = sample_log();
    events.truncate(4);
    events.push(Event::reach_accepted(0));
    let errs = find_violations(&events);
    assert_eq!(errs.len(), 1);
    match &errs[0] {
        ReplayError::Invalid { index, reason } => {
            assert_eq!(*index, 4);
            assert!(reason.contains("without declaring"), "{}", reason);
        }
        e => panic!("unexpected error: {:?}", e),
    }
}

#[test]
fn test_validate_riichi_accept_before_discard() {
    let mut events = sample_log();
    events.truncate(4);
    events.push(Event::tsumo(0, Tile::new("3m")));
    events.push(Event::reach(0, ReachStep::Declare));
    events.push(Event::reach(0, ReachStep::Accept));
    match validate(&events) {
        Err(ReplayError::Invalid { index, reason }) => {
            assert_eq!(index, 6);
            assert!(reason.contains("before discarding"), "{}", reason);
        }
        r => panic!("unexpected result: {:?}", r),
    }

    // 宣言前の捨て牌だけでは成立しない
    events.truncate(4);
    events.push(Event::tsumo(0, Tile::new("4m")));
    events.push(Event::dahai(0, Tile::new("4m"), true));
    events.push(Event::reach_accepted(0));
    let errs = find_violations(&events);
    assert_eq!(errs.len(), 1);
    assert!(matches!(errs[0], ReplayError::Invalid { index: 6, .. }));
}

#[test]
fn test_validate_unknown_reach_step() {
    let ev: Event = serde_json::from_str(r#"{"type":"reach","actor":0,"step":"3"}"#).unwrap();
    let err = check(&BoardState::default(), &ev, 2).unwrap_err();
    assert_eq!(err.to_string(), "invalid event at index 2: unknown reach step: 3");
}
