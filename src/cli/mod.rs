//! 命令行输出

mod printer;

pub use printer::{render_mask, PrintMode, Printer};
