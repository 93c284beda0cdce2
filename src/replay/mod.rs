// 牌譜の再生と盤面の再構築
mod applier;
mod engine;
mod validate;

pub use self::{applier::apply, engine::*, validate::*};
