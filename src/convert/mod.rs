// 牌譜フォーマットの変換
pub mod mjai;
