use std::path::Path;

use mahjong_replay::{
    convert::mjai::load_log,
    model::*,
    replay::{ReplayConfig, ReplayEngine},
    util::misc::*,
};
use tracing::{error, info};

#[derive(Debug)]
pub struct ReplayApp {
    file_path: String,
    skip: String,
    snapshot_interval: usize,
    json: bool,
    interactive: bool,
}

impl ReplayApp {
    pub fn new(args: Vec<String>) -> Self {
        use std::process::exit;

        let mut app = Self {
            file_path: String::new(),
            skip: String::new(),
            snapshot_interval: ReplayConfig::default().snapshot_interval,
            json: false,
            interactive: false,
        };

        let mut it = args.iter();
        while let Some(s) = it.next() {
            match s.as_str() {
                "-f" => app.file_path = next_value(&mut it, s),
                "-s" => app.skip = next_value(&mut it, s),
                "-k" => app.snapshot_interval = next_value(&mut it, s),
                "-j" => app.json = true,
                "-i" => app.interactive = true,
                "-d" => {} // main側でログレベルに反映済み
                opt => {
                    error!("unknown option: {}", opt);
                    exit(0);
                }
            }
        }

        if app.file_path.is_empty() {
            error!("file(-f) not specified");
            exit(0);
        }

        app
    }

    pub fn run(&mut self) {
        let events = load_log(Path::new(&self.file_path)).unwrap_or_else(error_exit);
        let config = ReplayConfig {
            snapshot_interval: self.snapshot_interval,
        };
        let mut eng = ReplayEngine::with_config(events, config);

        // スキップ位置の情報をパース (場風*4+局, 本場)
        let mut skips: Vec<usize> = if self.skip.is_empty() {
            vec![]
        } else {
            self.skip
                .split(',')
                .map(|s| s.trim().parse().unwrap_or_else(error_exit))
                .collect()
        };
        while skips.len() < 2 {
            skips.push(0);
        }
        let rh = (skips[0], skips[1]);
        if rh != (0, 0) {
            match eng
                .kyoku_checkpoints()
                .into_iter()
                .find(|cp| (cp.round, cp.honba) >= rh)
            {
                Some(cp) => {
                    info!("skip to {} (index: {})", cp, cp.index);
                    eng.jump_to(cp.index);
                }
                None => error!("kyoku not found: {:?}", rh),
            }
        }

        if self.interactive {
            run_prompt(&mut eng);
        } else {
            self.run_through(&mut eng);
        }
    }

    fn run_through(&self, eng: &mut ReplayEngine) {
        loop {
            let i = eng.cursor();
            if !eng.step_forward() {
                break;
            }
            println!("[{}] {}", i, eng.events()[i]);
        }
        println!();
        print_board(eng, self.json);
    }
}

fn print_board(eng: &ReplayEngine, json: bool) {
    if json {
        match serde_json::to_string_pretty(eng.current()) {
            Ok(s) => println!("{}", s),
            Err(e) => error!("{}", e),
        }
    } else {
        println!("cursor: {}/{}", eng.cursor(), eng.len());
        print!("{}", eng.current());
    }
}

fn print_checkpoints(eng: &ReplayEngine) {
    let active = eng.active_checkpoint().map(|cp| cp.index);
    for cp in eng.kyoku_checkpoints() {
        let mark = if Some(cp.index) == active { "*" } else { " " };
        println!("{} {:>5} {}", mark, cp.index, cp);
    }
}

const HELP: &str = "\
n: step forward, b: step backward
t <seat>: next turn, T <seat>: previous turn
k: next kyoku, K: previous kyoku
j <index>: jump, c: checkpoints, p: print board, q: quit";

fn run_prompt(eng: &mut ReplayEngine) {
    println!("{}", HELP);
    while let Some(line) = prompt() {
        let cmd: Vec<&str> = line.split_whitespace().collect();
        let arg = |i: usize| cmd.get(i).and_then(|s| s.parse::<usize>().ok());
        let moved = match cmd.first().copied() {
            None => eng.step_forward(), // 空行は1ステップ進める
            Some("n") => eng.step_forward(),
            Some("b") => eng.step_backward(),
            Some(c @ ("t" | "T")) => match arg(1) {
                Some(s) if is_seat(s) => eng.step_turn(c == "t", s),
                _ => {
                    println!("seat(0~3) required");
                    false
                }
            },
            Some("k") => eng.next_kyoku(),
            Some("K") => eng.prev_kyoku(),
            Some("j") => match arg(1) {
                Some(i) => {
                    eng.jump_to(i);
                    true
                }
                None => {
                    println!("index required");
                    false
                }
            },
            Some("c") => {
                print_checkpoints(eng);
                false
            }
            Some("p") => {
                print_board(eng, false);
                false
            }
            Some("q") => break,
            Some(c) => {
                println!("unknown command: {}\n{}", c, HELP);
                false
            }
        };

        if moved {
            match &eng.current().last_event {
                Some(ev) => println!("[{}] {}", eng.cursor(), ev),
                None => println!("[{}] (initial state)", eng.cursor()),
            }
        }
    }
}
