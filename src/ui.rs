// src/ui.rs

use crate::{constants, events::UnitId, symbols};
use colored::*;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::{
    collections::HashMap,
    io::{self, Write},
};

pub fn print_header(title: &str) {
    println!("\n{}", "═".repeat(constants::UI_WIDTH));
    println!(" {}", title.cyan().bold());
    println!("{}", "═".repeat(constants::UI_WIDTH));
}

pub fn print_sub_header(title: &str) {
    println!("\n--- {} ---", title.bold());
}

pub fn box_message(title: &str, content: &[&str], color_func: fn(ColoredString) -> ColoredString) {
    println!("\n┌{}┐", "─".repeat(constants::UI_WIDTH - 2));
    println!("  {}", color_func(title.bold()));
    println!("├{}┤", "─".repeat(constants::UI_WIDTH - 2));
    for line in content {
        println!("  {}", line);
    }
    println!("└{}┘", "─".repeat(constants::UI_WIDTH - 2));
}

/// 交互模式的输入提示，不阻塞
pub fn print_prompt(message: &str) {
    print!("\n>>> {}: ", message);
    let _ = io::stdout().flush();
}

pub fn new_tasks_progress_bar(total: u64, prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template("{prefix:.cyan.bold} [{bar:40.green/white}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb.set_prefix(prefix.to_string());
    pb
}

/// 控制器独占的终端输出。批量任务有进度条时，文本行经由进度条上方打印。
pub struct Console {
    multi: MultiProgress,
    bars: HashMap<UnitId, ProgressBar>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: HashMap::new(),
        }
    }

    pub fn line(&self, text: &str) {
        if self.bars.is_empty() || self.multi.is_hidden() {
            println!("{}", text);
        } else if self.multi.println(text).is_err() {
            println!("{}", text);
        }
    }

    pub fn ok(&self, msg: &str) {
        self.line(&format!("{} {}", *symbols::OK, msg));
    }

    pub fn info(&self, msg: &str) {
        self.line(&format!("{} {}", *symbols::INFO, msg));
    }

    pub fn warn(&self, msg: &str) {
        self.line(&format!("{} {}", *symbols::WARN, msg.yellow()));
    }

    pub fn error(&self, msg: &str) {
        self.line(&format!("{} {}", *symbols::ERROR, msg.red()));
    }

    /// 以红色方框显示错误，相当于图形界面中的错误对话框
    pub fn error_box(&self, title: &str, content: &[&str]) {
        if self.bars.is_empty() {
            box_message(title, content, |s| s.red());
        } else {
            self.error(&format!("{}: {}", title, content.join(" ")));
        }
    }

    pub fn has_bar(&self, unit: UnitId) -> bool {
        self.bars.contains_key(&unit)
    }

    pub fn start_bar(&mut self, unit: UnitId, total: usize) {
        let pb = self
            .multi
            .add(new_tasks_progress_bar(total as u64, &format!("批量 {}", unit)));
        self.bars.insert(unit, pb);
    }

    pub fn update_bar(&self, unit: UnitId, completed: usize, total: usize) {
        if let Some(pb) = self.bars.get(&unit) {
            pb.set_length(total as u64);
            pb.set_position(completed as u64);
        }
    }

    pub fn finish_bar(&mut self, unit: UnitId) {
        if let Some(pb) = self.bars.remove(&unit) {
            pb.finish_and_clear();
            self.multi.remove(&pb);
        }
    }
}
