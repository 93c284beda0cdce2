use std::path::Path;

use tracing::info;

use crate::error::{ReplayError, ReplayResult};
use crate::model::Event;

// mjai形式の牌譜を読み込む
// JSON配列と1行1イベントのJSON Lines形式の両方に対応
pub fn parse_log(text: &str) -> ReplayResult<Vec<Event>> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).map_err(|e| ReplayError::Parse {
            line: e.line(),
            source: e,
        });
    }

    let mut events = vec![];
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let ev = serde_json::from_str(line).map_err(|e| ReplayError::Parse {
            line: i + 1,
            source: e,
        })?;
        events.push(ev);
    }
    Ok(events)
}

pub fn load_log(path: &Path) -> ReplayResult<Vec<Event>> {
    let contents = std::fs::read_to_string(path)?;
    let events = parse_log(&contents)?;
    info!("loaded {} events from {:?}", events.len(), path);
    Ok(events)
}

#[cfg(test)]
const SAMPLE: &str = include_str!("../../tests/data/sample.mjson");

#[test]
fn test_parse_json_lines() {
    let events = parse_log(SAMPLE).unwrap();
    assert_eq!(events.len(), 43);
    match &events[0] {
        Event::StartGame(e) => assert_eq!(e.names, vec!["A", "B", "C", "D"]),
        ev => panic!("unexpected event: {:?}", ev),
    }
    assert!(matches!(events[42], Event::EndGame(_)));
}

#[test]
fn test_parse_json_array() {
    let lines: Vec<&str> = SAMPLE.lines().filter(|l| !l.trim().is_empty()).collect();
    let array = format!("[\n{}\n]", lines.join(",\n"));
    assert_eq!(parse_log(&array).unwrap(), parse_log(SAMPLE).unwrap());
}

#[test]
fn test_parse_blank_lines_and_errors() {
    let text = "\n{\"type\":\"start_game\"}\n\n{\"type\":\"tsumo\",\"actor\":0,\"pai\":\"1m\"}\n";
    assert_eq!(parse_log(text).unwrap().len(), 2);
    assert!(parse_log("").unwrap().is_empty());

    let text = "{\"type\":\"start_game\"}\n{\"type\":\"tsumo\",\"actor\":\"x\"}\n";
    match parse_log(text) {
        Err(ReplayError::Parse { line, .. }) => assert_eq!(line, 2),
        r => panic!("unexpected result: {:?}", r),
    }
}

#[test]
fn test_parse_unknown_reach_step() {
    let text = "{\"type\":\"start_game\"}\n{\"type\":\"reach\",\"actor\":0,\"step\":\"3\"}\n{\"type\":\"tsumo\",\"actor\":0,\"pai\":\"1m\"}\n";
    let events = parse_log(text).unwrap();
    assert_eq!(events.len(), 3);
    let step = crate::model::ReachStep::Other("3".to_string());
    assert_eq!(events[1], Event::reach(0, step));
}

#[test]
fn test_load_log_missing_file() {
    let r = load_log(Path::new("tests/data/no_such_file.mjson"));
    assert!(matches!(r, Err(ReplayError::Io(_))));
}
