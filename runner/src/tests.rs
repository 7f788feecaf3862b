use scheduler::{simulate, AtomicKind, Pid, PolicyConfig};

use crate::report::{format_report, gantt, process_table, Columns};
use crate::{build_workload, parse_simulation, ProcessEntry};

const RR_FILE: &str = r#"{
    "policy": { "kind": "rr", "quantum": 2 },
    "processes": [
        { "id": 1, "arrival": 0, "burst": 5 },
        { "id": 2, "arrival_time": 1, "burst_time": 4 }
    ]
}"#;

#[test]
fn file_policy_is_used() {
    let sim = parse_simulation(RR_FILE, None, None).unwrap();

    assert_eq!(sim.policy, PolicyConfig::RoundRobin { quantum: 2 });
    assert_eq!(sim.workload.len(), 2);
    assert_eq!(sim.workload[1].burst, 4);
}

#[test]
fn cli_policy_overrides_the_file() {
    let sim = parse_simulation(RR_FILE, Some(AtomicKind::Sjf), None).unwrap();
    assert_eq!(sim.policy, PolicyConfig::Sjf);

    let sim = parse_simulation(RR_FILE, Some(AtomicKind::RoundRobin), Some(3)).unwrap();
    assert_eq!(sim.policy, PolicyConfig::RoundRobin { quantum: 3 });

    assert!(parse_simulation(RR_FILE, Some(AtomicKind::RoundRobin), None).is_err());
}

#[test]
fn missing_policy_is_an_error() {
    let text = r#"{ "processes": [{ "arrival": 0, "burst": 1 }] }"#;
    assert!(parse_simulation(text, None, None).is_err());
}

#[test]
fn missing_ids_are_allocated() {
    let entries: Vec<ProcessEntry> = serde_json::from_str(
        r#"[
            { "arrival": 0, "burst": 1 },
            { "id": 1, "arrival": 0, "burst": 1 },
            { "arrival": 2, "burst": 3, "priority": 2 }
        ]"#,
    )
    .unwrap();

    let workload = build_workload(entries);
    let ids: Vec<Pid> = workload.iter().map(|w| w.id).collect();

    assert_eq!(ids, vec![Pid::new(2), Pid::new(1), Pid::new(3)]);
    assert_eq!(workload[2].priority, 2);
}

#[test]
fn report_renders_table_gantt_and_metrics() {
    let sim = parse_simulation(RR_FILE, None, None).unwrap();
    let report = simulate(&sim.workload, &sim.policy).unwrap();

    let chart = gantt(&report);
    let lines: Vec<&str> = chart.lines().collect();
    assert_eq!(lines[1], "|  P1|  P2|  P1|  P2|  P1|");
    assert_eq!(lines[3], "0    2    4    6    8    9 ");

    let table = process_table(&report, Columns::default());
    assert!(table.contains("|  PID|   AT|   BT|   CT|  TAT|   WT|"));
    assert!(table.contains("|   P1|    0|    5|    9|    9|    4|"));

    let text = format_report(&report, Columns::default());
    assert!(text.starts_with("===== Round Robin (RR) | q=2 ====="));
    assert!(text.contains("CPU Utilization: 100.00%"));
    assert!(text.contains("Average TAT: 8.00"));
}

#[test]
fn multilevel_frames_show_their_layer() {
    let text = r#"{
        "policy": { "kind": "mlfq", "quanta": [2], "terminal": "fcfs" },
        "processes": [{ "arrival": 0, "burst": 3 }]
    }"#;
    let sim = parse_simulation(text, None, None).unwrap();
    let report = simulate(&sim.workload, &sim.policy).unwrap();

    let chart = gantt(&report);
    assert_eq!(chart.lines().nth(1), Some("|P1:0|P1:1|"));

    let text = format_report(&report, Columns::default());
    assert!(text.contains("Layer 1: First Come First Serve (FCFS)"));
}

#[test]
fn report_serializes_to_json() {
    let sim = parse_simulation(RR_FILE, None, None).unwrap();
    let report = simulate(&sim.workload, &sim.policy).unwrap();

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["makespan"], 9);
    assert_eq!(json["trail"][0]["name"]["process"], 1);
    assert_eq!(json["processes"][0]["waiting"], 4);
    assert_eq!(json["processes"][1]["waiting"], 3);
    assert!(json.get("layers").is_none());
}
