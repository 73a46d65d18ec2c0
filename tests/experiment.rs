use std::cell::RefCell;
use std::fs::{create_dir_all, read_to_string, remove_dir_all, write};
use std::path::PathBuf;
use testorder::config::{Algorithm, Settings};
use testorder::data::{CoverageMatrix, CoverageSource, MatrixFile, Ordering};
use testorder::experiment::{evaluate_ordering, Experiment};
use testorder::interfaces::command_line::{write_results_csv, OutputMode};
use testorder::interfaces::Silent;
use testorder::{CommandLine, Error, Interface, Message};

/// 记录所有消息的界面
#[derive(Default)]
struct Recorder {
    messages: RefCell<Vec<Message>>,
}

impl Interface for Recorder {
    fn post(&self, message: Message) {
        self.messages.borrow_mut().push(message);
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("testorder-{}-{name}", std::process::id()));
    create_dir_all(&dir).unwrap();
    dir
}

const MATRIX: &str = "\
# 名称\t覆盖情况
t1\tX\t_\tX\t_\t_\t_\t_\t_\t_\t_
t2\tX\tX\tX\t_\tX\t_\t_\t_\t_\t_
t3\t1\t1\t1\t1\t1\t1\t0\t0\t0\t0
t4\t_\tX\t_\tX\t_\t_\t_\t_\t_\t_
t5\tfalse\tfalse\tfalse\tfalse\tfalse\tfalse\ttrue\ttrue\ttrue\ttrue
";

fn matrix_file(name: &str) -> (PathBuf, MatrixFile) {
    let dir = scratch_dir(name);
    let path = dir.join("bridge.tsv");
    write(&path, MATRIX).unwrap();
    (dir, MatrixFile::new(&path))
}

fn settings(algorithms: Vec<Algorithm>, repetitions: usize, seed: u64) -> Settings {
    Settings {
        algorithms,
        max_evaluations: Some(60),
        repetitions,
        seed: Some(seed),
        ..Settings::default()
    }
}

#[test]
fn 读取覆盖矩阵文件() {
    let (dir, source) = matrix_file("read");
    let matrix = source.coverage_matrix().unwrap();
    assert_eq!(matrix.rows(), 5);
    assert_eq!(matrix.columns(), 10);
    assert_eq!(matrix.dead_columns(), 0);
    assert!(matrix.covers(2, 5));
    assert!(!matrix.covers(3, 0));
    assert_eq!(source.test_cases().unwrap(), ["t1", "t2", "t3", "t4", "t5"]);
    assert_eq!(source.subject(), "bridge");
    let aplc = evaluate_ordering(&matrix, &Ordering::identity(5)).unwrap();
    assert!((aplc - 0.46).abs() < 1e-9);
    remove_dir_all(dir).unwrap();
}

#[test]
fn 覆盖矩阵文件格式错误() {
    let dir = scratch_dir("malformed");
    let path = dir.join("bad.tsv");
    write(&path, "t1\tX\t?\n").unwrap();
    let result = MatrixFile::new(&path).coverage_matrix();
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    write(&path, "t1\tX\tX\nt2\tX\n").unwrap();
    let result = MatrixFile::new(&path).coverage_matrix();
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    let missing = MatrixFile::new(dir.join("missing.tsv")).coverage_matrix();
    assert!(missing.is_err());
    remove_dir_all(dir).unwrap();
}

#[test]
fn 名称与矩阵行数不符() {
    let matrix = CoverageMatrix::new(vec![vec![true], vec![false]]).unwrap();
    let result = Experiment::new(matrix, vec!["only".to_string()], Settings::default());
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    let dead = CoverageMatrix::new(vec![vec![false], vec![false]]).unwrap();
    let names = vec!["a".to_string(), "b".to_string()];
    let result = Experiment::new(dead, names, Settings::default());
    assert!(matches!(result, Err(Error::DegenerateInput)));
}

#[test]
fn 运行实验并报告() {
    let (dir, source) = matrix_file("run");
    let algorithms = vec![Algorithm::SimulatedAnnealing, Algorithm::RandomWalk];
    let experiment = Experiment::from_source(&source, settings(algorithms, 3, 11)).unwrap();
    let recorder = Recorder::default();
    let results = experiment.run(&recorder).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].algorithm, Algorithm::SimulatedAnnealing);
    assert_eq!(results[1].algorithm, Algorithm::RandomWalk);
    for result in &results {
        assert_eq!(result.repetitions.len(), 3);
        for repetition in &result.repetitions {
            let expected = evaluate_ordering(experiment.matrix(), &repetition.ordering).unwrap();
            assert_eq!(repetition.aplc, expected);
            assert!(repetition.seconds >= 0.0);
        }
        let summary = result.summary().unwrap();
        assert!(summary.min <= summary.avg + 1e-12);
        assert!(summary.avg <= summary.max + 1e-12);
        assert_eq!(result.best().unwrap().aplc, summary.max);
    }

    let messages = recorder.messages.borrow();
    // 每种优化方法：开始、三次重复、统计
    assert_eq!(messages.len(), 2 * 5);
    assert!(matches!(
        messages[0],
        Message::AlgorithmStarted {
            algorithm: Algorithm::SimulatedAnnealing,
            repetitions: 3,
            ..
        }
    ));
    let Message::Repetition {
        index, ordering, ..
    } = &messages[1]
    else {
        panic!("应为重复的结果");
    };
    assert_eq!(*index, 1);
    assert_eq!(ordering.len(), 5);
    assert!(ordering.iter().all(|name| name.starts_with('t')));
    assert!(matches!(messages[4], Message::Summary { .. }));
    remove_dir_all(dir).unwrap();
}

#[test]
fn 固定种子的实验可以复现() {
    let (dir, source) = matrix_file("seed");
    let run = || {
        let experiment =
            Experiment::from_source(&source, settings(vec![Algorithm::RandomSearch], 4, 5))
                .unwrap();
        experiment
            .run(&Silent)
            .unwrap()
            .into_iter()
            .flat_map(|r| r.repetitions)
            .map(|r| (r.ordering, r.aplc))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
    remove_dir_all(dir).unwrap();
}

#[test]
fn 导出结果() {
    let (dir, source) = matrix_file("export");
    let algorithms = vec![Algorithm::RandomSearch, Algorithm::SimulatedAnnealing];
    let experiment = Experiment::from_source(&source, settings(algorithms, 2, 3)).unwrap();
    let results = experiment.run(&Silent).unwrap();

    let path = dir.join("direct.csv");
    write_results_csv(&path, &results).unwrap();
    let content = read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Algorithm,1,2");
    assert!(lines[1].starts_with("RS,"));
    assert!(lines[2].starts_with("SA,"));
    assert_eq!(lines[1].split(',').count(), 3);
    let value: f64 = lines[1].split(',').nth(1).unwrap().parse().unwrap();
    assert_eq!(value, results[0].repetitions[0].aplc);

    let mode = OutputMode {
        quiet: true,
        json: true,
    };
    let cli = CommandLine::new(mode, Some(dir.join("output"))).unwrap();
    assert!(cli.export_csv(&results).unwrap().exists());
    let summary = read_to_string(cli.export_summary(&results).unwrap()).unwrap();
    assert!(summary.contains("RS:"));
    assert!(summary.contains("SA:"));
    assert!(summary.contains("avg:"));

    // 安静模式下消息写入 log.txt
    cli.post(Message::Aplc {
        ordering: vec!["t1".to_string()],
        aplc: 0.5,
        subject: None,
    });
    let log = read_to_string(dir.join("output").join("log.txt")).unwrap();
    let line: serde_json::Value = serde_json::from_str(log.trim()).unwrap();
    assert_eq!(line["type"], "aplc");
    assert_eq!(line["aplc"], 0.5);
    assert!(line.get("subject").is_none());
    // 后续消息追加到同一个文件
    cli.post(Message::Aplc {
        ordering: vec!["t2".to_string()],
        aplc: 0.25,
        subject: None,
    });
    drop(cli);
    let log = read_to_string(dir.join("output").join("log.txt")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["aplc"], 0.25);
    remove_dir_all(dir).unwrap();
}

#[test]
fn 时间预算() {
    let (dir, source) = matrix_file("time");
    let settings = Settings {
        algorithms: vec![Algorithm::RandomSearch],
        max_time: Some(std::time::Duration::from_millis(20)),
        repetitions: 2,
        seed: Some(1),
        ..Settings::default()
    };
    let experiment = Experiment::from_source(&source, settings).unwrap();
    let results = experiment.run(&Silent).unwrap();
    assert_eq!(results[0].repetitions.len(), 2);
    assert!(results[0].repetitions.iter().all(|r| r.seconds >= 0.02));
    remove_dir_all(dir).unwrap();
}
