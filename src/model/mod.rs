// 麻雀のデータモデル
mod board;
mod define;
mod event;
mod tile;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::{board::*, define::*, event::*, tile::*};
