use std::path::Path;

use mahjong_replay::{convert::mjai::load_log, replay::find_violations, util::misc::*};
use tracing::{error, info};

#[derive(Debug)]
pub struct ValidateApp {
    file_path: String,
}

impl ValidateApp {
    pub fn new(args: Vec<String>) -> Self {
        use std::process::exit;

        let mut app = Self {
            file_path: String::new(),
        };

        let mut it = args.iter();
        while let Some(s) = it.next() {
            match s.as_str() {
                "-f" => app.file_path = next_value(&mut it, s),
                "-d" => {}
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
        let errs = find_violations(&events);
        if errs.is_empty() {
            info!("{}: ok ({} events)", self.file_path, events.len());
            return;
        }

        for e in &errs {
            println!("{}", e);
        }
        error_exit(format!("{}: {} invalid events", self.file_path, errs.len()))
    }
}
