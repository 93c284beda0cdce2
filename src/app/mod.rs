// mainから直接呼び出すアプリケーションの動作モード(R, V)のモジュール

mod replay;
mod validate;

pub use replay::ReplayApp;
pub use validate::ValidateApp;
