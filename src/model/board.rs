use super::*;
use crate::util::misc::vec_to_string;

// 盤面全体 (再生エンジンが唯一所有する可変状態)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardState {
    pub players: [PlayerState; SEAT], // 各プレイヤー情報 (座席順固定)
    pub dora_markers: Vec<Tile>,      // ドラ表示牌
    pub round: usize,                 // 0始まりの通し局番号 (場風*4 + 局)
    pub honba: usize,                 // 本場
    pub kyotaku: usize,               // 供託(リーチ棒)
    pub current_actor: Seat,          // 最後に行動したプレイヤー
    pub last_event: Option<Event>,    // 直前に適用したイベント (表示用)
}

impl BoardState {
    pub fn get_scores(&self) -> [Score; SEAT] {
        let mut scores = [0; SEAT];
        for s in 0..SEAT {
            scores[s] = self.players[s].score;
        }
        scores
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "round: {}, honba: {}, kyotaku: {}, current_actor: {}",
            round_name(self.round),
            self.honba,
            self.kyotaku,
            self.current_actor,
        )?;
        write!(f, "dora_markers: {}", vec_to_string(&self.dora_markers))?;
        if let Some(ev) = &self.last_event {
            write!(f, ", last_event: {}", ev)?;
        }
        writeln!(f)?;

        let boader = "-".to_string().repeat(80);
        write!(f, "{}", boader)?;
        for (s, p) in self.players.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "seat: {}, {}", s, p)?;
            write!(f, "{}", boader)?;
        }
        writeln!(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerState {
    pub hand: Vec<Tile>,             // 手牌 (打牌時にソート, ツモ牌は末尾)
    pub discards: Vec<DiscardEntry>, // 捨て牌 (鳴かれた牌は取り除かれる)
    pub melds: Vec<MeldRecord>,      // 鳴き一覧
    pub score: Score,                // 持ち点
    pub riichi: bool,                // リーチ成立済み
    pub pending_riichi: bool,        // リーチ宣言済みで宣言牌の打牌待ち
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            hand: vec![],
            discards: vec![],
            melds: vec![],
            score: INITIAL_SCORE,
            riichi: false,
            pending_riichi: false,
        }
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "score: {}, riichi: {}, pending_riichi: {}",
            self.score, self.riichi, self.pending_riichi,
        )?;
        writeln!(f, "hand: {}", vec_to_string(&self.hand))?;
        writeln!(f, "melds: {}", vec_to_string(&self.melds))?;
        write!(f, "discards: {}", vec_to_string(&self.discards))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscardEntry {
    pub tile: Tile,
    pub is_riichi: bool, // リーチ宣言牌
}

impl fmt::Display for DiscardEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_riichi {
            write!(f, "{}*", self.tile)
        } else {
            write!(f, "{}", self.tile)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeldKind {
    Chi,
    Pon,
    Daiminkan,
    Kakan,
    Ankan,
}

impl fmt::Display for MeldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MeldKind::Chi => "chi",
            MeldKind::Pon => "pon",
            MeldKind::Daiminkan => "daiminkan",
            MeldKind::Kakan => "kakan",
            MeldKind::Ankan => "ankan",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeldRecord {
    pub kind: MeldKind,
    pub tiles: Vec<Tile>,
    pub from: Seat, // 鳴いた相手の座席 (加槓・暗槓は自分)
}

impl fmt::Display for MeldRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts: Vec<String> = self.tiles.iter().map(|t| t.to_string()).collect();
        write!(f, "{}({})<-{}", self.kind, ts.join("|"), self.from)
    }
}

// 局の開始位置 (局単位のジャンプ用)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Checkpoint {
    pub index: Index, // start_kyokuイベントの牌譜上の位置
    pub round: usize,
    pub honba: usize,
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} Honba", round_name(self.round), self.honba)
    }
}

// 通し局番号を"E1", "S3"のような表記に変換
pub fn round_name(round: usize) -> String {
    const WINDS: [char; 4] = ['E', 'S', 'W', 'N'];
    format!("{}{}", WINDS[round / SEAT % SEAT], round % SEAT + 1)
}

#[test]
fn test_round_name() {
    assert_eq!(round_name(0), "E1");
    assert_eq!(round_name(3), "E4");
    assert_eq!(round_name(4), "S1");
    assert_eq!(round_name(9), "W2");
    assert_eq!(round_name(15), "N4");
}

#[test]
fn test_board_default() {
    let b = BoardState::default();
    assert_eq!(b.get_scores(), [INITIAL_SCORE; SEAT]);
    assert_eq!(b.kyotaku, 0);
    assert!(b.dora_markers.is_empty());
    assert!(b.last_event.is_none());
    for p in &b.players {
        assert!(p.hand.is_empty() && p.discards.is_empty() && p.melds.is_empty());
        assert!(!p.riichi && !p.pending_riichi);
    }
}
