// 構造的な意味合いや一貫性を保つために以下のclippy警告は無効化
#![allow(clippy::needless_range_loop)]

pub mod convert;
pub mod error;
pub mod model;
pub mod replay;
pub mod util;
