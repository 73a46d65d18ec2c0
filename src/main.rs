//! testorder: 测试用例排序［命令行版］
//!
//! 用户提供覆盖矩阵文件，本程序能够计算给定排列的 APLC，或者用随机搜索、随机游走、退火算法搜索 APLC 尽可能高的排列。

use clap::Parser;
use testorder::data::{CoverageSource, MatrixFile};
use testorder::experiment::{evaluate_ordering, Experiment};
use testorder::interfaces::command_line::OutputMode;
use testorder::{Command, CommandLine, CommandLineArgs, Error, Interface, Message, OptimizeArgs};
use tracing::{info, Level};

fn optimize(args: OptimizeArgs) -> Result<(), Error> {
    let settings = args.search_config()?.resolve()?;
    let source = MatrixFile::new(&args.matrix);
    let experiment = Experiment::from_source(&source, settings)?;
    let mode = OutputMode {
        quiet: args.quiet,
        json: args.json,
    };
    let cli = CommandLine::new(mode, args.output)?;
    info!(
        "覆盖矩阵 {} 共有 {} 个测试用例、{} 个代码单元",
        source.subject(),
        experiment.matrix().rows(),
        experiment.matrix().columns()
    );
    let results = experiment.run(&cli)?;
    cli.export_csv(&results)?;
    cli.export_summary(&results)?;
    Ok(())
}

/// 日志写到标准错误，标准输出只留给消息；安静模式下只记录警告和错误
fn init_logging(args: &CommandLineArgs) {
    let level = match &args.command {
        Command::Optimize(options) if options.quiet => Level::WARN,
        _ => Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn main() -> Result<(), Error> {
    let args = CommandLineArgs::parse();
    init_logging(&args);
    match args.command {
        Command::Evaluate { matrix, ordering } => {
            let source = MatrixFile::new(&matrix);
            let coverage = source.coverage_matrix()?;
            let test_cases = source.test_cases()?;
            let aplc = evaluate_ordering(&coverage, &ordering)?;
            let cli = CommandLine::console(false);
            let names = ordering.names(&test_cases);
            cli.post(Message::Aplc {
                ordering: names.into_iter().map(String::from).collect(),
                aplc,
                subject: Some(source.subject()),
            });
        }
        Command::Optimize(args) => optimize(args)?,
    }
    Ok(())
}
