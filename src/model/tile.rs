use serde::{de, ser};

use super::*;

// 牌譜上の牌シンボルをそのまま保持する
// 比較・重複判定は文字列の完全一致で行う (赤5mrと通常5mは別の牌)
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Tile(String);

// 手牌ソート用の順位 (伏せ牌・解釈できないシンボルは最後尾)
pub type Rank = usize;
pub const RANK_UNKNOWN: Rank = TYPE * 20;

impl Tile {
    pub fn new(sym: &str) -> Self {
        Self(sym.to_string())
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        self.decode().is_none()
    }

    // 赤5
    #[inline]
    pub fn is_red(&self) -> bool {
        matches!(self.decode(), Some((_, _, true)))
    }

    // (種別, 数字, 赤フラグ)に分解
    // mjaiの字牌表記(E,S,W,N,P,F,C)は1z~7zとして扱う
    pub fn decode(&self) -> Option<(Type, Tnum, bool)> {
        let s = self.0.as_str();
        let honor = match s {
            "E" => Some(WE),
            "S" => Some(WS),
            "W" => Some(WW),
            "N" => Some(WN),
            "P" => Some(DW),
            "F" => Some(DG),
            "C" => Some(DR),
            _ => None,
        };
        if let Some(ni) = honor {
            return Some((TZ, ni, false));
        }

        let cs: Vec<char> = s.chars().collect();
        if cs.len() < 2 || cs.len() > 3 {
            return None;
        }
        let ni = cs[0].to_digit(10)? as Tnum;
        let ti = match cs[1] {
            'm' => TM,
            'p' => TP,
            's' => TS,
            'z' => TZ,
            _ => return None,
        };
        match (ti, ni, cs.get(2).copied()) {
            (TZ, 1..=7, None) => Some((ti, ni, false)),
            (TZ, _, _) => None,
            (_, 0, None) => Some((ti, 5, true)), // 0m表記の赤5
            (_, 1..=9, None) => Some((ti, ni, false)),
            (_, 5, Some('r')) => Some((ti, 5, true)),
            _ => None,
        }
    }

    // 萬子 < 筒子 < 索子 < 字牌, 同種内は数字の昇順
    // 赤5は同じ種別の通常5の直後
    pub fn rank(&self) -> Rank {
        match self.decode() {
            Some((ti, ni, red)) => ti * 20 + ni * 2 + red as Rank,
            None => RANK_UNKNOWN,
        }
    }
}

// 打牌後の手牌の並べ替え (安定ソートなので同順位の牌の並びは保たれる)
pub fn sort_hand(hand: &mut [Tile]) {
    hand.sort_by_key(|t| t.rank());
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl ser::Serialize for Tile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

struct TileVisitor;

impl<'de> de::Visitor<'de> for TileVisitor {
    type Value = Tile;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("tile symbol")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Tile::new(v))
    }
}

impl<'de> de::Deserialize<'de> for Tile {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_str(TileVisitor)
    }
}

pub fn tiles_from_symbols(syms: &[&str]) -> Vec<Tile> {
    syms.iter().map(|&s| Tile::new(s)).collect()
}

#[test]
fn test_tile_rank_order() {
    let order = [
        "1m", "5m", "5mr", "9m", "1p", "5p", "0p", "1s", "5sr", "9s", "E", "2z", "W", "7z", "?",
    ];
    let tiles = tiles_from_symbols(&order);
    for w in tiles.windows(2) {
        assert!(w[0].rank() <= w[1].rank(), "{} > {}", w[0], w[1]);
    }
    assert!(Tile::new("5mr").rank() == Tile::new("5m").rank() + 1);
    assert!(Tile::new("6m").rank() > Tile::new("5mr").rank());
}

#[test]
fn test_tile_identity() {
    assert_ne!(Tile::new("5m"), Tile::new("5mr"));
    assert_ne!(Tile::new("E"), Tile::new("1z"));
    assert_eq!(Tile::new("E").rank(), Tile::new("1z").rank());
    assert!(Tile::new("5pr").is_red());
    assert!(Tile::new("0s").is_red());
    assert!(!Tile::new("5p").is_red());
}

#[test]
fn test_tile_unknown() {
    for sym in ["?", "back", "8z", "0z", "6mr", "x", ""] {
        let t = Tile::new(sym);
        assert!(t.is_unknown(), "{}", sym);
        assert_eq!(t.rank(), RANK_UNKNOWN);
    }
}

#[test]
fn test_sort_hand() {
    let mut hand = tiles_from_symbols(&["?", "C", "5sr", "5s", "1p", "9m", "5mr", "5m"]);
    sort_hand(&mut hand);
    assert_eq!(
        hand,
        tiles_from_symbols(&["5m", "5mr", "9m", "1p", "5s", "5sr", "C", "?"])
    );
}
