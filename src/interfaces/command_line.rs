use crate::config::{parse_algorithms, parse_fitness_evaluations, BudgetConfig, SearchConfig};
use crate::data::Ordering;
use crate::experiment::AlgorithmResults;
use crate::interfaces::{Interface, Message};
use crate::objectives::metric::Summary;
use crate::Error;
use chrono::Local;
use clap::{Parser, Subcommand};
use csv::WriterBuilder;
use std::collections::BTreeMap;
use std::fs::{create_dir_all, write, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 命令行参数的定义
#[derive(Parser, Clone, Debug)]
#[command(name = "测试用例排序")]
#[command(author, version, about, long_about)]
#[command(propagate_version = true)]
pub struct CommandLineArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// 命令行中所有可用的子命令
#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// 计算手动给出的排列的 APLC
    Evaluate {
        /// 覆盖矩阵文件
        matrix: PathBuf,
        /// 测试用例的排列，形如 1:2:0
        #[arg(short, long)]
        ordering: Ordering,
    },
    /// 用优化方法搜索 APLC 尽可能高的排列
    Optimize(OptimizeArgs),
}

#[derive(clap::Args, Clone, Debug)]
pub struct OptimizeArgs {
    /// 覆盖矩阵文件
    pub matrix: PathBuf,
    /// 优化方法，可选 RS、RW、SA，用冒号分隔，默认为 SA:RS
    #[arg(short, long)]
    pub algorithms: Option<String>,
    /// 目标函数计算次数的上限，默认为 1000
    #[arg(short, long, allow_hyphen_values = true, value_parser = parse_fitness_evaluations)]
    pub fitness_evaluations: Option<u64>,
    /// 搜索时间的上限，可以是秒数或 HH:MM:SS
    #[arg(short, long)]
    pub time: Option<String>,
    /// 每种优化方法的重复次数，默认为 30
    #[arg(short, long)]
    pub repetitions: Option<usize>,
    /// 随机数种子
    #[arg(short, long)]
    pub seed: Option<u64>,
    /// 搜索配置文件
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// 输出目录，默认为 output-<时间>
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
    /// 不在命令行中输出搜索过程，而是写入输出目录下的 log.txt
    #[arg(short, long)]
    pub quiet: bool,
    /// 以 JSON 行的形式输出消息
    #[arg(long)]
    pub json: bool,
}

impl OptimizeArgs {
    /// 读取配置文件，并用命令行中给出的值覆盖
    pub fn search_config(&self) -> Result<SearchConfig, Error> {
        let base = match &self.config {
            Some(path) => SearchConfig::from_path(path)?,
            None => SearchConfig::default(),
        };
        let budget = (self.fitness_evaluations.is_some() || self.time.is_some()).then(|| {
            BudgetConfig {
                fitness_evaluations: self.fitness_evaluations,
                time: self.time.clone(),
            }
        });
        Ok(base.merge(SearchConfig {
            algorithms: self.algorithms.as_deref().map(parse_algorithms).transpose()?,
            budget,
            repetitions: self.repetitions,
            seed: self.seed,
            annealing: None,
        }))
    }
}

/// 消息的输出方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputMode {
    pub quiet: bool,
    pub json: bool,
}

/// 通过命令行来使用的入口，实现了界面特征
pub struct CommandLine {
    pub mode: OutputMode,
    pub output_dir: PathBuf,
    // 安静模式下一直打开的 log.txt
    log: Option<File>,
}

impl CommandLine {
    pub fn new(mode: OutputMode, maybe_output_dir: Option<PathBuf>) -> Result<Self, Error> {
        let output_dir = maybe_output_dir.unwrap_or_else(|| {
            let time = Local::now().format("%m-%d+%H_%M_%S").to_string();
            PathBuf::from(format!("output-{time}"))
        });
        create_dir_all(&output_dir)?;
        let log = if mode.quiet {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(output_dir.join("log.txt"))?;
            Some(file)
        } else {
            None
        };
        Ok(Self {
            mode,
            output_dir,
            log,
        })
    }

    /// 只向标准输出写消息，不创建输出目录
    pub fn console(json: bool) -> Self {
        Self {
            mode: OutputMode { quiet: false, json },
            output_dir: PathBuf::from("."),
            log: None,
        }
    }

    fn writer(&self) -> Box<dyn Write + '_> {
        match &self.log {
            Some(file) => Box::new(file),
            None => Box::new(std::io::stdout().lock()),
        }
    }

    fn write_message(&self, message: &Message) -> Result<(), Error> {
        let mut writer = self.writer();
        if self.mode.json {
            writeln!(writer, "{}", serde_json::to_string(message)?)?;
            writer.flush()?;
            return Ok(());
        }
        match message {
            Message::AlgorithmStarted {
                algorithm,
                repetitions,
                stopping_condition,
            } => writeln!(
                writer,
                "开始运行{}（{algorithm}），共重复 {repetitions} 次，停止条件为 {stopping_condition}",
                algorithm.name()
            )?,
            Message::Repetition {
                algorithm,
                index,
                ordering,
                aplc,
                seconds,
            } => writeln!(
                writer,
                "{algorithm} 第 {index} 次：APLC = {aplc:.6}，用时 {seconds:.3} 秒\n   > {}",
                ordering.join(" ")
            )?,
            Message::Summary { algorithm, summary } => {
                write!(writer, "{} 的 APLC 统计如下：\n{summary}", algorithm.name())?
            }
            Message::Aplc {
                ordering,
                aplc,
                subject,
            } => {
                if let Some(subject) = subject {
                    writeln!(writer, "被测对象：{subject}")?;
                }
                writeln!(writer, "排列：{}", ordering.join(" "))?;
                writeln!(writer, "APLC = {aplc}")?
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// 把每种优化方法每次重复的 APLC 写入 results.csv
    pub fn export_csv(&self, results: &[AlgorithmResults]) -> Result<PathBuf, Error> {
        let path = self.output_dir.join("results.csv");
        write_results_csv(&path, results)?;
        info!("APLC 结果保存在 {} 中", path.display());
        Ok(path)
    }

    /// 把每种优化方法的统计量写入 summary.yaml
    pub fn export_summary(&self, results: &[AlgorithmResults]) -> Result<PathBuf, Error> {
        let path = self.output_dir.join("summary.yaml");
        let summaries: BTreeMap<String, Summary> = results
            .iter()
            .filter_map(|r| Some((r.algorithm.to_string(), r.summary()?)))
            .collect();
        write(&path, serde_yaml::to_string(&summaries)?)?;
        info!("统计量保存在 {} 中", path.display());
        Ok(path)
    }
}

/// 表头为 `Algorithm,1,2,…,r`，每种优化方法一行
pub fn write_results_csv(path: &Path, results: &[AlgorithmResults]) -> Result<(), Error> {
    let columns = results
        .iter()
        .map(|r| r.repetitions.len())
        .max()
        .unwrap_or(0);
    let mut writer = WriterBuilder::new().flexible(true).from_path(path)?;
    let header = std::iter::once("Algorithm".to_string())
        .chain((1..=columns).map(|i| i.to_string()));
    writer.write_record(header)?;
    for result in results {
        let row = std::iter::once(result.algorithm.to_string())
            .chain(result.repetitions.iter().map(|r| r.aplc.to_string()));
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

impl Interface for CommandLine {
    fn post(&self, message: Message) {
        if let Err(error) = self.write_message(&message) {
            warn!("无法输出消息：{error}");
        }
    }
}

