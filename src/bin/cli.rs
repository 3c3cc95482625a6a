//! flowcut 命令行工具
//!
//! 求解边列表文件的最大流 / 最小割，或对 JSON 分割请求执行图割分割

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use flowcut::algorithm::{cut_edges, verify, Termination};
use flowcut::cli::{render_mask, PrintMode, Printer};
use flowcut::config::EngineConfig;
use flowcut::import::{EdgeListImporter, SegmentationRequest};
use flowcut::segmentation::{Segmentation, Segmenter};
use flowcut::types::SolverKind;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "flowcut")]
#[command(version, about = "最大流 / 最小割求解与图割分割工具")]
struct Cli {
    /// 配置文件（JSON）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 求解算法，覆盖配置文件: ek, bk
    #[arg(long, global = true)]
    solver: Option<SolverKind>,

    /// 增广次数上限，覆盖配置文件
    #[arg(long, global = true)]
    max_augmentations: Option<u64>,

    /// 输出详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    /// 禁用彩色输出
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 计算边列表的最大流与最小割
    Maxflow {
        /// 输入文件路径
        #[arg(short, long)]
        input: PathBuf,

        /// 输入格式
        #[arg(short, long, value_enum, default_value_t = InputFormat::Csv)]
        format: InputFormat,

        /// 源点
        #[arg(short, long)]
        source: usize,

        /// 汇点
        #[arg(short = 't', long)]
        sink: usize,

        /// 节点数（缺省时取最大节点 ID + 1）
        #[arg(long)]
        nodes: Option<usize>,

        /// 校验流量守恒与容量约束
        #[arg(long)]
        verify: bool,

        /// 列出割边
        #[arg(long)]
        cut_edges: bool,

        /// 以 JSON 输出结果
        #[arg(long)]
        json: bool,

        /// 垂直显示
        #[arg(long)]
        vertical: bool,
    },

    /// 对 JSON 分割请求执行图割分割
    Segment {
        /// 分割请求（JSON）
        #[arg(short, long)]
        input: PathBuf,

        /// 结果输出路径（JSON）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 以字符画显示前景掩码
        #[arg(long)]
        show_mask: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Csv,
    Jsonl,
}

#[derive(Serialize)]
struct SegmentOutput<'a> {
    #[serde(flatten)]
    segmentation: &'a Segmentation,
    #[serde(skip_serializing_if = "Option::is_none")]
    tinted: Option<Vec<u32>>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "flowcut=debug" } else { "flowcut=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(solver) = cli.solver {
        config.solver = solver;
    }
    if cli.max_augmentations.is_some() {
        config.max_augmentations = cli.max_augmentations;
    }

    match cli.command {
        Commands::Maxflow {
            input,
            format,
            source,
            sink,
            nodes,
            verify: check,
            cut_edges: list_cut,
            json,
            vertical,
        } => {
            let mut importer = EdgeListImporter::new(source, sink);
            if let Some(n) = nodes {
                importer = importer.with_node_count(n);
            }
            let (network, stats) = match format {
                InputFormat::Csv => importer.import_csv(&input),
                InputFormat::Jsonl => importer.import_jsonl(&input),
            }
            .with_context(|| format!("导入失败: {}", input.display()))?;

            let printer = Printer::new(if vertical {
                PrintMode::Vertical
            } else {
                PrintMode::Table
            });
            if !json {
                println!("{}", "导入完成".green().bold());
                print!("{}", printer.print_import_stats(&stats));
                if stats.errors > 0 {
                    println!("{}", format!("跳过 {} 条无效记录", stats.errors).yellow());
                }
            }

            info!(solver = %config.solver, "开始求解");
            let mut solver = config.solver.build(network, config.solver_options());
            let result = solver.solve().clone();

            if check {
                verify(solver.network(), &result).context("流量校验失败")?;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!(
                    "{}",
                    printer.print_flow_result(solver.name(), solver.network(), &result)
                );
                if check {
                    println!("{}", "校验通过".green());
                }
                if list_cut {
                    let cut = cut_edges(solver.network(), &result.min_cut);
                    print!("{}", printer.print_cut_edges(solver.network(), &cut));
                }
                report_termination(result.termination);
            }
        }

        Commands::Segment {
            input,
            output,
            show_mask,
        } => {
            let request = SegmentationRequest::from_file(&input)
                .with_context(|| format!("读取分割请求失败: {}", input.display()))?;
            let image = request.image()?;

            let segmenter = Segmenter::from_config(&config);
            let segmentation =
                segmenter.segment(&image, &request.object_seeds, &request.background_seeds)?;

            print!("{}", Printer::default().print_segmentation(&segmentation));
            if show_mask {
                print!("{}", render_mask(&segmentation));
            }
            report_termination(segmentation.termination);

            if let Some(path) = output {
                let tinted = match &request.rgb {
                    Some(rgb) => Some(segmentation.tint_foreground(rgb)?),
                    None => None,
                };
                let body = serde_json::to_string_pretty(&SegmentOutput {
                    segmentation: &segmentation,
                    tinted,
                })?;
                std::fs::write(&path, body)
                    .with_context(|| format!("写入结果失败: {}", path.display()))?;
                println!("{} {}", "结果已写入".green(), path.display());
            }
        }
    }

    Ok(())
}

fn report_termination(termination: Termination) {
    match termination {
        Termination::Exhausted => {}
        Termination::UnboundedPath => println!(
            "{}",
            "警告: 存在全部由无穷容量边组成的路径，流量无界".yellow().bold()
        ),
        Termination::IterationLimit => println!(
            "{}",
            "警告: 达到增广次数上限，结果不是最大流".yellow().bold()
        ),
    }
}
