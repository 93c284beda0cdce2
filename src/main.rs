#![warn(rust_2018_idioms)]

mod app;

use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    init_logger(args.iter().any(|a| a == "-d"));
    if args.len() < 2 {
        error!("mode not specified");
        return;
    }

    let args2 = args[2..].to_vec();
    match args[1].as_str() {
        "R" => {
            // Replay (牌譜リプレイモード)
            app::ReplayApp::new(args2).run();
        }
        "V" => {
            // Validate (牌譜検査モード)
            app::ValidateApp::new(args2).run();
        }
        m => {
            error!("unknown mode: {}", m)
        }
    }
}

// ログは標準エラーに出力 (標準出力は盤面表示用)
fn init_logger(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
