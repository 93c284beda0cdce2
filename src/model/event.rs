use super::*;
use crate::util::misc::vec_to_string;

// mjai形式の牌譜イベント
// 欠損したフィールドはOptionで受けて, 状態遷移側でその処理を飛ばす
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    StartGame(EventStartGame),         // ゲーム開始
    StartKyoku(EventStartKyoku),       // 局開始
    Tsumo(EventTsumo),                 // ツモ
    Dahai(EventDahai),                 // 打牌
    Pon(EventCall),                    // ポン
    Chi(EventCall),                    // チー
    Daiminkan(EventCall),              // 大明槓
    Kakan(EventSelfKan),               // 加槓
    Ankan(EventSelfKan),               // 暗槓
    Reach(EventReach),                 // リーチ宣言 (step 1) / 成立 (step 2)
    ReachAccepted(EventReachAccepted), // リーチ成立 (reach step 2の別表記)
    Dora(EventDora),                   // 新ドラ
    Hora(EventHora),                   // 和了
    Ryukyoku(EventRyukyoku),           // 流局
    EndKyoku(EventMarker),             // 局終了
    EndGame(EventMarker),              // ゲーム終了
    #[serde(other)]
    Other, // 未対応のイベント (状態は変化しない)
}

impl Event {
    #[inline]
    pub fn start_game() -> Self {
        Self::StartGame(EventStartGame::default())
    }

    #[inline]
    pub fn start_kyoku(
        kyoku: usize,
        honba: usize,
        kyotaku: usize,
        oya: Seat,
        dora_marker: Tile,
        scores: [Score; SEAT],
        tehais: [Vec<Tile>; SEAT],
    ) -> Self {
        Self::StartKyoku(EventStartKyoku {
            bakaze: None,
            kyoku,
            honba,
            kyotaku,
            oya,
            dora_marker: Some(dora_marker),
            scores: scores.to_vec(),
            tehais: tehais.to_vec(),
        })
    }

    #[inline]
    pub fn tsumo(actor: Seat, pai: Tile) -> Self {
        Self::Tsumo(EventTsumo {
            actor: Some(actor),
            pai: Some(pai),
        })
    }

    #[inline]
    pub fn dahai(actor: Seat, pai: Tile, tsumogiri: bool) -> Self {
        Self::Dahai(EventDahai {
            actor: Some(actor),
            pai: Some(pai),
            tsumogiri,
        })
    }

    #[inline]
    pub fn pon(actor: Seat, target: Seat, pai: Tile, consumed: Vec<Tile>) -> Self {
        Self::Pon(EventCall::new(actor, target, pai, consumed))
    }

    #[inline]
    pub fn chi(actor: Seat, target: Seat, pai: Tile, consumed: Vec<Tile>) -> Self {
        Self::Chi(EventCall::new(actor, target, pai, consumed))
    }

    #[inline]
    pub fn daiminkan(actor: Seat, target: Seat, pai: Tile, consumed: Vec<Tile>) -> Self {
        Self::Daiminkan(EventCall::new(actor, target, pai, consumed))
    }

    #[inline]
    pub fn kakan(actor: Seat, pai: Tile, consumed: Vec<Tile>) -> Self {
        Self::Kakan(EventSelfKan {
            actor: Some(actor),
            pai: Some(pai),
            consumed: Some(consumed),
        })
    }

    #[inline]
    pub fn ankan(actor: Seat, consumed: Vec<Tile>) -> Self {
        Self::Ankan(EventSelfKan {
            actor: Some(actor),
            pai: None,
            consumed: Some(consumed),
        })
    }

    #[inline]
    pub fn reach(actor: Seat, step: ReachStep) -> Self {
        Self::Reach(EventReach {
            actor: Some(actor),
            step: Some(step),
        })
    }

    #[inline]
    pub fn reach_accepted(actor: Seat) -> Self {
        Self::ReachAccepted(EventReachAccepted { actor: Some(actor) })
    }

    #[inline]
    pub fn dora(dora_marker: Tile) -> Self {
        Self::Dora(EventDora {
            dora_marker: Some(dora_marker),
        })
    }

    #[inline]
    pub fn hora(actor: Seat, target: Seat, pai: Tile, scores: [Score; SEAT]) -> Self {
        Self::Hora(EventHora {
            actor: Some(actor),
            target: Some(target),
            pai: Some(pai),
            scores: Some(scores.to_vec()),
        })
    }

    #[inline]
    pub fn ryukyoku(scores: [Score; SEAT]) -> Self {
        Self::Ryukyoku(EventRyukyoku {
            reason: None,
            scores: Some(scores.to_vec()),
        })
    }

    pub fn kind(&self) -> EventKind {
        use EventKind as K;
        match self {
            Self::StartGame(_) => K::StartGame,
            Self::StartKyoku(_) => K::StartKyoku,
            Self::Tsumo(_) => K::Tsumo,
            Self::Dahai(_) => K::Dahai,
            Self::Pon(_) => K::Pon,
            Self::Chi(_) => K::Chi,
            Self::Daiminkan(_) => K::Daiminkan,
            Self::Kakan(_) => K::Kakan,
            Self::Ankan(_) => K::Ankan,
            Self::Reach(_) => K::Reach,
            Self::ReachAccepted(_) => K::ReachAccepted,
            Self::Dora(_) => K::Dora,
            Self::Hora(_) => K::Hora,
            Self::Ryukyoku(_) => K::Ryukyoku,
            Self::EndKyoku(_) => K::EndKyoku,
            Self::EndGame(_) => K::EndGame,
            Self::Other => K::Other,
        }
    }

    pub fn actor(&self) -> Option<Seat> {
        match self {
            Self::Tsumo(e) => e.actor,
            Self::Dahai(e) => e.actor,
            Self::Pon(e) | Self::Chi(e) | Self::Daiminkan(e) => e.actor,
            Self::Kakan(e) | Self::Ankan(e) => e.actor,
            Self::Reach(e) => e.actor,
            Self::ReachAccepted(e) => e.actor,
            Self::Hora(e) => e.actor,
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt<T: fmt::Display>(v: &Option<T>) -> String {
            v.as_ref().map_or("-".to_string(), |v| v.to_string())
        }

        let kind = self.kind();
        match self {
            Self::StartKyoku(e) => write!(
                f,
                "{} {} honba: {}, kyotaku: {}, oya: {}, dora: {}",
                kind,
                round_name(e.round()),
                e.honba,
                e.kyotaku,
                e.oya,
                opt(&e.dora_marker),
            ),
            Self::Tsumo(e) => write!(f, "{} {} {}", kind, opt(&e.actor), opt(&e.pai)),
            Self::Dahai(e) => write!(
                f,
                "{} {} {}{}",
                kind,
                opt(&e.actor),
                opt(&e.pai),
                if e.tsumogiri { " (tsumogiri)" } else { "" },
            ),
            Self::Pon(e) | Self::Chi(e) | Self::Daiminkan(e) => write!(
                f,
                "{} {}<-{} {} {}",
                kind,
                opt(&e.actor),
                opt(&e.target),
                opt(&e.pai),
                e.consumed.as_deref().map_or("-".to_string(), vec_to_string),
            ),
            Self::Kakan(e) | Self::Ankan(e) => write!(
                f,
                "{} {} {}",
                kind,
                opt(&e.actor),
                e.consumed.as_deref().map_or("-".to_string(), vec_to_string),
            ),
            Self::Reach(e) => write!(f, "{} {} step: {}", kind, opt(&e.actor), opt(&e.step)),
            Self::ReachAccepted(e) => write!(f, "{} {}", kind, opt(&e.actor)),
            Self::Dora(e) => write!(f, "{} {}", kind, opt(&e.dora_marker)),
            Self::Hora(e) => write!(
                f,
                "{} {}<-{} {} scores: {}",
                kind,
                opt(&e.actor),
                opt(&e.target),
                opt(&e.pai),
                e.scores.as_deref().map_or("-".to_string(), vec_to_string),
            ),
            Self::Ryukyoku(e) => write!(
                f,
                "{} {} scores: {}",
                kind,
                opt(&e.reason),
                e.scores.as_deref().map_or("-".to_string(), vec_to_string),
            ),
            _ => write!(f, "{}", kind),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventStartGame {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
}

fn default_kyoku() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventStartKyoku {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bakaze: Option<Tile>, // 場風 (表示用, 状態には反映しない)
    #[serde(default = "default_kyoku")]
    pub kyoku: usize, // 局 (1始まり)
    #[serde(default)]
    pub honba: usize, // 本場
    #[serde(default)]
    pub kyotaku: usize, // 供託(リーチ棒)
    #[serde(default)]
    pub oya: Seat, // 親の座席
    #[serde(default)]
    pub dora_marker: Option<Tile>, // 最初のドラ表示牌
    #[serde(default)]
    pub scores: Vec<Score>, // 各プレイヤーの持ち点
    #[serde(default)]
    pub tehais: Vec<Vec<Tile>>, // 各プレイヤーの配牌
}

impl EventStartKyoku {
    // 0始まりの通し局番号
    #[inline]
    pub fn round(&self) -> usize {
        self.kyoku.saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTsumo {
    pub actor: Option<Seat>,
    pub pai: Option<Tile>, // ツモ牌 (他家視点では伏せ牌)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDahai {
    pub actor: Option<Seat>,
    pub pai: Option<Tile>,
    #[serde(default)]
    pub tsumogiri: bool, // ツモ切り
}

// ポン, チー, 大明槓 (他家の捨て牌を取得する鳴き)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCall {
    pub actor: Option<Seat>,
    pub target: Option<Seat>,        // 捨て牌を鳴かれたプレイヤー
    pub pai: Option<Tile>,           // 鳴いた牌
    pub consumed: Option<Vec<Tile>>, // 手牌から消費される牌
}

impl EventCall {
    fn new(actor: Seat, target: Seat, pai: Tile, consumed: Vec<Tile>) -> Self {
        Self {
            actor: Some(actor),
            target: Some(target),
            pai: Some(pai),
            consumed: Some(consumed),
        }
    }
}

// 加槓, 暗槓
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSelfKan {
    pub actor: Option<Seat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pai: Option<Tile>,
    pub consumed: Option<Vec<Tile>>, // 槓を構成する牌
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventReach {
    pub actor: Option<Seat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<ReachStep>, // 省略時は宣言(step 1)として扱う
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventReachAccepted {
    pub actor: Option<Seat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDora {
    pub dora_marker: Option<Tile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventHora {
    #[serde(default)]
    pub actor: Option<Seat>,
    #[serde(default)]
    pub target: Option<Seat>,
    #[serde(default)]
    pub pai: Option<Tile>,
    #[serde(default)]
    pub scores: Option<Vec<Score>>, // 精算後の持ち点
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRyukyoku {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub scores: Option<Vec<Score>>, // 精算後の持ち点
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMarker {}

// [ReachStep]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReachStep {
    Declare,       // "1": 宣言
    Accept,        // "2": 成立 (供託とリーチ棒の支払い)
    Other(String), // 未知の値 (適用時は無視)
}

impl fmt::Display for ReachStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReachStep::Declare => write!(f, "1"),
            ReachStep::Accept => write!(f, "2"),
            ReachStep::Other(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for ReachStep {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// 牌譜によって文字列("1")と数値(1)の両方の表記がある
impl<'de> Deserialize<'de> for ReachStep {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Num(u64),
        }

        let s = match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s,
            Raw::Num(n) => n.to_string(),
        };
        match s.as_str() {
            "1" => Ok(ReachStep::Declare),
            "2" => Ok(ReachStep::Accept),
            _ => Ok(ReachStep::Other(s)),
        }
    }
}

// [EventKind]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StartGame,
    StartKyoku,
    Tsumo,
    Dahai,
    Pon,
    Chi,
    Daiminkan,
    Kakan,
    Ankan,
    Reach,
    ReachAccepted,
    Dora,
    Hora,
    Ryukyoku,
    EndKyoku,
    EndGame,
    Other,
}

impl EventKind {
    // 手番送りの対象となるイベント (ツモ, 打牌, 鳴き, 槓)
    #[inline]
    pub fn is_turn_action(&self) -> bool {
        use EventKind::*;
        matches!(self, Tsumo | Dahai | Pon | Chi | Daiminkan | Kakan | Ankan)
    }

    pub fn as_str(&self) -> &'static str {
        use EventKind::*;
        match self {
            StartGame => "start_game",
            StartKyoku => "start_kyoku",
            Tsumo => "tsumo",
            Dahai => "dahai",
            Pon => "pon",
            Chi => "chi",
            Daiminkan => "daiminkan",
            Kakan => "kakan",
            Ankan => "ankan",
            Reach => "reach",
            ReachAccepted => "reach_accepted",
            Dora => "dora",
            Hora => "hora",
            Ryukyoku => "ryukyoku",
            EndKyoku => "end_kyoku",
            EndGame => "end_game",
            Other => "other",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[test]
fn test_event_from_mjai() {
    let msgs = [
        r#"{"type":"start_game","names":["a","b","c","d"]}"#,
        r#"{"type":"tsumo","actor":0,"pai":"6s"}"#,
        r#"{"type":"dahai","actor":0,"pai":"6s","tsumogiri":true}"#,
        r#"{"type":"chi","actor":0,"target":3,"pai":"4p","consumed":["5p","6p"]}"#,
        r#"{"type":"pon","actor":0,"target":1,"pai":"5sr","consumed":["5s","5s"]}"#,
        r#"{"type":"kakan","actor":0,"pai":"6m","consumed":["6m","6m","6m","6m"]}"#,
        r#"{"type":"daiminkan","actor":3,"target":1,"pai":"5m","consumed":["5m","5m","5mr"]}"#,
        r#"{"type":"ankan","actor":1,"consumed":["N","N","N","N"]}"#,
        r#"{"type":"reach","actor":1,"step":"1"}"#,
        r#"{"type":"reach","actor":1,"step":2}"#,
        r#"{"type":"reach_accepted","actor":1}"#,
        r#"{"type":"dora","dora_marker":"C"}"#,
        r#"{"type":"hora","actor":1,"target":0,"pai":"7s","scores":[24000,26000,25000,25000]}"#,
        r#"{"type":"ryukyoku","scores":[25000,25000,25000,25000]}"#,
        r#"{"type":"end_kyoku"}"#,
        r#"{"type":"end_game"}"#,
        r#"{"type":"none"}"#,
    ];
    let kinds = [
        EventKind::StartGame,
        EventKind::Tsumo,
        EventKind::Dahai,
        EventKind::Chi,
        EventKind::Pon,
        EventKind::Kakan,
        EventKind::Daiminkan,
        EventKind::Ankan,
        EventKind::Reach,
        EventKind::Reach,
        EventKind::ReachAccepted,
        EventKind::Dora,
        EventKind::Hora,
        EventKind::Ryukyoku,
        EventKind::EndKyoku,
        EventKind::EndGame,
        EventKind::Other,
    ];

    for (msg, kind) in msgs.iter().zip(kinds.iter()) {
        let ev: Event = serde_json::from_str(msg).unwrap();
        assert_eq!(ev.kind(), *kind, "{}", msg);
    }
}

#[test]
fn test_event_start_kyoku_defaults() {
    let ev: Event = serde_json::from_str(r#"{"type":"start_kyoku","oya":2}"#).unwrap();
    match ev {
        Event::StartKyoku(e) => {
            assert_eq!(e.kyoku, 1);
            assert_eq!(e.round(), 0);
            assert_eq!(e.honba, 0);
            assert_eq!(e.kyotaku, 0);
            assert_eq!(e.oya, 2);
            assert!(e.dora_marker.is_none());
            assert!(e.tehais.is_empty());
        }
        _ => panic!("unexpected event: {:?}", ev),
    }
}

#[test]
fn test_event_reach_step() {
    let ev: Event = serde_json::from_str(r#"{"type":"reach","actor":2,"step":"2"}"#).unwrap();
    assert_eq!(ev, Event::reach(2, ReachStep::Accept));
    let ev: Event = serde_json::from_str(r#"{"type":"reach","actor":2}"#).unwrap();
    assert_eq!(ev.actor(), Some(2));
    let ev: Event = serde_json::from_str(r#"{"type":"reach","actor":2,"step":"3"}"#).unwrap();
    assert_eq!(ev, Event::reach(2, ReachStep::Other("3".to_string())));
    let ev: Event = serde_json::from_str(r#"{"type":"reach","actor":2,"step":3}"#).unwrap();
    assert_eq!(ev, Event::reach(2, ReachStep::Other("3".to_string())));

    let s = serde_json::to_string(&Event::reach(2, ReachStep::Declare)).unwrap();
    assert!(s.contains(r#""step":"1""#), "{}", s);
}

#[test]
fn test_event_missing_fields() {
    let ev: Event = serde_json::from_str(r#"{"type":"daiminkan","actor":1,"pai":"3m"}"#).unwrap();
    match &ev {
        Event::Daiminkan(e) => {
            assert_eq!(e.target, None);
            assert_eq!(e.consumed, None);
        }
        _ => panic!("unexpected event: {:?}", ev),
    }
    assert!(ev.kind().is_turn_action());
    assert!(!EventKind::Reach.is_turn_action());
}
