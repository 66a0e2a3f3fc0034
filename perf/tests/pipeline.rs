use std::path::{Path, PathBuf};

use dds_perf::{CheckArgs, CompareArgs, Kind, RequirementsArgs, Metric};
use dds_perf::{check_experiments, compare_experiments, determine_requirements};
use dds_perf::config::Config;
use dds_perf::error::Error;
use dds_perf::process::{process_latency, process_throughput};

fn write(dir: &Path, name: &str, data: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let p = dir.join(name);
    std::fs::write(&p, data).unwrap();
    p
}

const LATENCY_RAW: &str = "Payload [Bytes],Latency [us]\n\
    16,1.0\n16,2.0\n16,3.0\n\
    1024,10.0\n1024,12.0\n1024,11.0\n";

fn latency_history(root: &Path) -> PathBuf {
    let history = root.join("history");

    for run in &["2021-01-01", "2021-01-02", "2021-01-03"] {
        let dir = history.join(run);
        let raw = write(&dir, "measurements_intraprocess_reliable.csv", LATENCY_RAW);
        process_latency(&raw, &dir.join("measurements_intraprocess_reliable_summary.csv")).unwrap();
    }

    history
}

#[test]
fn latency_process_requirements_check() {
    let d = tempfile::tempdir().unwrap();
    let config = Config::default();

    let history = latency_history(d.path());
    let requirements = d.path().join("latency_requirements.csv");

    let table = determine_requirements(Kind::Latency, &RequirementsArgs {
        experiments_results: history.clone(),
        output_file: requirements.clone(),
    }, &config).unwrap();
    assert_eq!(table.rows.len(), 2);

    let data = std::fs::read_to_string(&requirements).unwrap();
    let lines: Vec<_> = data.lines().collect();
    assert_eq!(lines, vec![
        "Experiment type,Bytes,Median,99%,Max",
        "intraprocess_reliable,16,2.000,2.980,3.000",
        "intraprocess_reliable,1024,11.000,11.980,12.000",
    ]);

    // A run identical to the history passes every check
    let run = history.join("2021-01-02");
    let summary = check_experiments(Kind::Latency, &CheckArgs {
        requirements: requirements.clone(),
        experiment_directory: run.clone(),
    }, &config).unwrap();

    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.passed_checks(), 6);
    assert_eq!(summary.total_checks(), 6);
    assert!(run.join("checks_intraprocess_reliable.csv").is_file());
}

#[test]
fn latency_check_failures() {
    let d = tempfile::tempdir().unwrap();
    let config = Config::default();

    let history = latency_history(d.path());
    let requirements = d.path().join("latency_requirements.csv");
    determine_requirements(Kind::Latency, &RequirementsArgs {
        experiments_results: history,
        output_file: requirements.clone(),
    }, &config).unwrap();

    let run = d.path().join("run");
    write(&run, "measurements_intraprocess_reliable_summary.csv",
        "Bytes,Median,99%,Max\n16,2.500,2.000,3.500\n1024,10.000,11.000,12.000\n");

    let summary = check_experiments(Kind::Latency, &CheckArgs {
        requirements,
        experiment_directory: run.clone(),
    }, &config).unwrap();

    assert_eq!(summary.outcomes[0].status, 0b101);
    assert_eq!(summary.exit_code(), 1);
    assert_eq!(summary.passed_checks(), 4);

    let report = std::fs::read_to_string(run.join("checks_intraprocess_reliable.csv")).unwrap();
    let lines: Vec<_> = report.lines().collect();
    assert_eq!(lines[0], "Check,Bytes,Requirement,Experiment,Difference,Percentage over requirement,Status");
    assert_eq!(lines[1], "Median,16,2.000,2.500,0.500,25.000,failed");
    assert_eq!(lines[2], "Median,1024,11.000,10.000,1.000,-9.091,passed");
}

#[test]
fn check_missing_experiment_directory() {
    let d = tempfile::tempdir().unwrap();

    let r = check_experiments(Kind::Latency, &CheckArgs {
        requirements: d.path().join("latency_requirements.csv"),
        experiment_directory: d.path().join("missing"),
    }, &Config::default());

    assert!(matches!(r, Err(Error::NotADirectory(_))));
}

#[test]
fn throughput_process_requirements_check() {
    let d = tempfile::tempdir().unwrap();
    let config = Config::default();
    let history = d.path().join("history");

    for (run, max) in &[("a", "18.000"), ("b", "20.000")] {
        let dir = history.join(run);
        let raw = write(&dir, "throughput_interprocess_best_effort_shm.csv", &format!(
            "Payload [Bytes],Sent [samples],Received [samples],Lost [samples],Publication throughput [Mb/s],Subscription throughput [Mb/s]\n\
             16,100,100,0,10.000,10.000\n\
             16,200,200,0,20.000,{}\n", max));
        process_throughput(&raw, &dir.join("throughput_interprocess_best_effort_shm_summary.csv")).unwrap();
    }

    let requirements = d.path().join("throughput_requirements.csv");
    determine_requirements(Kind::Throughput, &RequirementsArgs {
        experiments_results: history,
        output_file: requirements.clone(),
    }, &config).unwrap();

    let data = std::fs::read_to_string(&requirements).unwrap();
    assert_eq!(data.lines().nth(1), Some("interprocess_best_effort_shm,16,0.000,19.980"));

    let run = d.path().join("run");
    write(&run, "throughput_interprocess_best_effort_shm_summary.csv",
        "Payload [Bytes],Sent [samples],Received [samples],Lost [samples],Publication throughput [Mb/s],Subscription throughput [Mb/s]\n\
         16,200,195,5,20.000,25.000\n");

    // Lost samples against a zero requirement fail, throughput above passes
    let summary = check_experiments(Kind::Throughput, &CheckArgs {
        requirements,
        experiment_directory: run,
    }, &config).unwrap();

    assert_eq!(summary.outcomes[0].status, 1);
    assert_eq!(summary.passed_checks(), 1);
    assert_eq!(summary.exit_code(), 1);
}

#[test]
fn compare_against_reference() {
    let d = tempfile::tempdir().unwrap();
    let header = "Bytes,Samples,Max,Min,Mean,Median,Stdev,Mean jitter,Max jitter,90%,99%,99.99%\n";

    let reference = d.path().join("reference");
    write(&reference, "measurements_interprocess_reliable_summary.csv",
        &format!("{}16,100,30.000,1.000,5.000,4.000,1.000,0.500,3.000,8.000,20.000,29.000\n", header));
    write(&reference, "measurements_interprocess_reliable_tcp_summary.csv",
        &format!("{}16,100,30.000,1.000,5.000,4.000,1.000,0.500,3.000,8.000,20.000,29.000\n", header));

    let results = d.path().join("results");
    write(&results, "measurements_interprocess_reliable_summary.csv",
        &format!("{}16,100,31.000,1.000,5.000,4.200,1.000,0.500,3.000,8.000,21.000,29.000\n", header));
    write(&results, "measurements_interprocess_reliable_tcp_summary.csv",
        &format!("{}16,100,40.000,1.000,5.000,4.000,1.000,0.500,3.000,8.000,20.000,29.000\n", header));

    let output = d.path().join("comparison");
    let args = CompareArgs {
        reference: reference.clone(),
        results: results.clone(),
        output_dir: output.clone(),
        fail_threshold: None,
        columns: vec![],
    };

    let summary = compare_experiments(&args, &Config::default()).unwrap();

    assert_eq!(summary.outcomes.len(), 2);
    assert_eq!(summary.passed(), 1);
    assert_eq!(summary.exit_code(), 1);
    assert!(output.join("interprocess_reliable_comparison.csv").is_file());
    assert!(output.join("interprocess_reliable_tcp_comparison.csv").is_file());

    // Only compare the passing column with a looser threshold
    let args = CompareArgs {
        fail_threshold: Some(0.5),
        columns: vec![Metric::Median],
        ..args
    };
    let summary = compare_experiments(&args, &Config::default()).unwrap();
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn compare_requires_reference() {
    let d = tempfile::tempdir().unwrap();

    let reference = d.path().join("reference");
    std::fs::create_dir_all(&reference).unwrap();

    let results = d.path().join("results");
    write(&results, "measurements_intraprocess_reliable_summary.csv", "Bytes,Min,Median,Max,99%\n16,1,2,3,3\n");

    let r = compare_experiments(&CompareArgs {
        reference,
        results,
        output_dir: d.path().join("comparison"),
        fail_threshold: None,
        columns: vec![],
    }, &Config::default());

    assert!(matches!(r, Err(Error::MissingReference(_))));
}

#[test]
fn compare_unlisted_experiment() {
    let d = tempfile::tempdir().unwrap();
    let name = "measurements_interprocess_reliable_fastdds_summary.csv";

    let reference = d.path().join("reference");
    write(&reference, name, "Bytes,Min,Median,Max,99%\n16,1.000,2.000,4.000,3.000\n");

    let results = d.path().join("results");
    write(&results, name, "Bytes,Min,Median,Max,99%\n16,1.000,2.000,4.000,3.000\n");

    let output = d.path().join("comparison");
    let summary = compare_experiments(&CompareArgs {
        reference,
        results,
        output_dir: output.clone(),
        fail_threshold: None,
        columns: vec![],
    }, &Config::default()).unwrap();

    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.outcomes[0].experiment, "interprocess_reliable_fastdds");
    assert!(output.join("interprocess_reliable_fastdds_comparison.csv").is_file());
}
