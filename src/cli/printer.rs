//! 结果打印器
//!
//! 提供表格和垂直格式的求解结果输出

use crate::algorithm::FlowResult;
use crate::import::{format_capacity, ImportStats};
use crate::network::{EdgeId, FlowNetwork};
use crate::segmentation::Segmentation;
use prettytable::{format, row, Table};

/// 打印模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintMode {
    /// 表格模式
    Table,
    /// 垂直模式
    Vertical,
}

/// 结果打印器
pub struct Printer {
    mode: PrintMode,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(PrintMode::Table)
    }
}

impl Printer {
    pub fn new(mode: PrintMode) -> Self {
        Self { mode }
    }

    /// 设置打印模式
    pub fn set_mode(&mut self, mode: PrintMode) {
        self.mode = mode;
    }

    /// 打印最大流求解摘要
    pub fn print_flow_result(
        &self,
        solver: &str,
        network: &FlowNetwork,
        result: &FlowResult,
    ) -> String {
        let stats = &result.stats;
        let mut pairs = vec![
            ("Solver", solver.to_string()),
            ("Nodes", network.node_count().to_string()),
            ("Edges", network.edge_count().to_string()),
            ("Max Flow", format_capacity(result.max_flow)),
            ("Termination", result.termination.to_string()),
            ("Source Side", result.source_side_count().to_string()),
            ("Augmentations", stats.augmentations.to_string()),
            ("Duration (ms)", format!("{:.3}", stats.duration_ms())),
        ];
        if stats.tree_growths > 0 || stats.orphans_processed > 0 {
            pairs.push(("Tree Growths", stats.tree_growths.to_string()));
            pairs.push(("Orphans", stats.orphans_processed.to_string()));
            pairs.push(("Adoptions", stats.adoptions.to_string()));
            pairs.push(("Freed Nodes", stats.nodes_freed.to_string()));
        } else {
            pairs.push(("Search Passes", stats.search_passes.to_string()));
        }
        self.format_pairs(&pairs)
    }

    /// 打印割边列表
    pub fn print_cut_edges(&self, network: &FlowNetwork, cut: &[EdgeId]) -> String {
        if cut.is_empty() {
            return "Empty cut\n".to_string();
        }

        let columns = ["Edge", "From", "To", "Capacity", "Flow"];
        let rows: Vec<Vec<String>> = cut
            .iter()
            .map(|&id| {
                let edge = network.edge(id);
                vec![
                    id.index().to_string(),
                    edge.from().to_string(),
                    edge.to().to_string(),
                    format_capacity(edge.capacity()),
                    edge.flow().to_string(),
                ]
            })
            .collect();

        let output = match self.mode {
            PrintMode::Table => format_table(&columns, &rows),
            PrintMode::Vertical => format_vertical(&columns, &rows),
        };
        format!("{}\n{} edge(s) in cut\n", output, rows.len())
    }

    /// 打印分割摘要
    pub fn print_segmentation(&self, segmentation: &Segmentation) -> String {
        let total = segmentation.mask.len();
        let foreground = segmentation.foreground_count();
        let ratio = if total == 0 {
            0.0
        } else {
            foreground as f64 * 100.0 / total as f64
        };
        let pairs = [
            ("Size", format!("{}x{}", segmentation.width, segmentation.height)),
            ("Solver", segmentation.solver.to_string()),
            ("Max Flow", format_capacity(segmentation.max_flow)),
            ("Termination", segmentation.termination.to_string()),
            ("Foreground", format!("{} ({:.1}%)", foreground, ratio)),
            ("Augmentations", segmentation.stats.augmentations.to_string()),
            ("Duration (ms)", format!("{:.3}", segmentation.stats.duration_ms())),
        ];
        self.format_pairs(&pairs)
    }

    /// 打印导入统计
    pub fn print_import_stats(&self, stats: &ImportStats) -> String {
        let pairs = [
            ("Nodes", stats.nodes.to_string()),
            ("Edges Imported", stats.edges_imported.to_string()),
            ("Errors", stats.errors.to_string()),
            ("Duration (ms)", stats.duration_ms.to_string()),
        ];
        self.format_pairs(&pairs)
    }

    fn format_pairs(&self, pairs: &[(&str, String)]) -> String {
        match self.mode {
            PrintMode::Table => {
                let mut table = Table::new();
                table.set_format(*format::consts::FORMAT_BOX_CHARS);
                table.set_titles(row!["Property", "Value"]);
                for (key, value) in pairs {
                    table.add_row(row![key, value]);
                }
                table.to_string()
            }
            PrintMode::Vertical => {
                let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
                pairs
                    .iter()
                    .map(|(k, v)| format!("{:>width$}: {}\n", k, v, width = width))
                    .collect()
            }
        }
    }
}

/// 以字符画显示前景掩码（`#` 前景，`.` 背景）
pub fn render_mask(segmentation: &Segmentation) -> String {
    let mut output = String::with_capacity((segmentation.width + 1) * segmentation.height);
    for row in 0..segmentation.height {
        for col in 0..segmentation.width {
            output.push(if segmentation.is_foreground(row, col) { '#' } else { '.' });
        }
        output.push('\n');
    }
    output
}

/// 表格格式
fn format_table(columns: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(columns.iter().collect());
    for row_data in rows {
        table.add_row(row_data.iter().collect());
    }
    table.to_string()
}

/// 垂直格式
fn format_vertical(columns: &[&str], rows: &[Vec<String>]) -> String {
    let max_col_width = columns.iter().map(|c| c.len()).max().unwrap_or(0);
    let mut output = String::new();

    for (i, row_data) in rows.iter().enumerate() {
        output.push_str(&format!(
            "*************************** {}. row ***************************\n",
            i + 1
        ));
        for (j, col) in columns.iter().enumerate() {
            let value = row_data.get(j).map(|s| s.as_str()).unwrap_or("");
            output.push_str(&format!("{:>width$}: {}\n", col, value, width = max_col_width));
        }
    }

    output
}
