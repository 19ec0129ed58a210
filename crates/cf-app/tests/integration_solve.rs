//! End-to-end solves of the demo projects through the service layer.

use std::path::{Path, PathBuf};

use cf_app::{
    RunProgressEvent, RunStage, SolveOverrides, SolveRequest, load_project, run_solve,
    run_solve_with_progress, solve_project_network,
};
use cf_solver::CancelToken;

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

#[test]
fn through_reach_converges_with_equal_flows() {
    let path = demo("three_node_chain.yaml");
    let report = run_solve(&SolveRequest {
        project_path: &path,
        network_id: "through",
        overrides: SolveOverrides::default(),
        cancel: None,
    })
    .unwrap();

    assert!(report.converged);
    assert_eq!(report.status, "converged");
    assert_eq!(report.settings.max_iterations, 200);

    let q1 = report.gate("g1").unwrap().flow_m3s;
    let q3 = report.gate("g3").unwrap().flow_m3s;
    assert!(q1 > 0.0);
    assert!((q1 - q3).abs() < 0.2);
    assert_eq!(report.node("source").unwrap().level_m, 221.0);
    assert_eq!(report.node("tail").unwrap().level_m, 218.0);
    assert_eq!(report.gate("g2").unwrap().from_node_id, "m1");
}

#[test]
fn iteration_override_limits_the_chain() {
    let project = load_project(&demo("three_node_chain.yaml")).unwrap();
    let overrides = SolveOverrides {
        max_iterations: Some(50),
        ..SolveOverrides::default()
    };
    let report = solve_project_network(&project, "chain", &overrides).unwrap();

    assert!(!report.converged);
    assert_eq!(report.status, "max_iterations_exceeded");
    assert_eq!(report.iterations, 50);
}

#[test]
fn opening_override_closes_a_gate() {
    let project = load_project(&demo("three_node_chain.yaml")).unwrap();
    let overrides = SolveOverrides {
        dt_relax_s: Some(20.0),
        max_iterations: Some(500),
        openings: vec![("g2".to_string(), 0.0)],
        ..SolveOverrides::default()
    };
    let report = solve_project_network(&project, "through", &overrides).unwrap();

    assert!(report.converged);
    let g2 = report.gate("g2").unwrap();
    assert_eq!(g2.opening, 0.0);
    assert_eq!(g2.flow_m3s, 0.0);
    // Stored project is unchanged.
    assert_eq!(project.network("through").unwrap().gates[1].opening, 1.0);
}

#[test]
fn bad_override_is_rejected_before_solving() {
    let project = load_project(&demo("three_node_chain.yaml")).unwrap();

    let unknown_gate = SolveOverrides {
        openings: vec![("nope".to_string(), 0.5)],
        ..SolveOverrides::default()
    };
    assert!(matches!(
        solve_project_network(&project, "through", &unknown_gate),
        Err(cf_app::AppError::InvalidInput(_))
    ));

    let bad_opening = SolveOverrides {
        openings: vec![("g1".to_string(), 2.0)],
        ..SolveOverrides::default()
    };
    assert!(matches!(
        solve_project_network(&project, "through", &bad_opening),
        Err(cf_app::AppError::Solver(_))
    ));

    let bad_dt = SolveOverrides {
        dt_relax_s: Some(0.0),
        ..SolveOverrides::default()
    };
    assert!(solve_project_network(&project, "through", &bad_dt).is_err());
}

#[test]
fn district_networks_converge() {
    let project = load_project(&demo("district.yaml")).unwrap();
    for id in ["main", "spur"] {
        let report = solve_project_network(&project, id, &SolveOverrides::default()).unwrap();
        assert!(report.converged, "{} ended as {}", id, report.status);
    }

    let main = solve_project_network(&project, "main", &SolveOverrides::default()).unwrap();
    // Parallel check gates share the same head difference.
    let check = main.gate("check1").unwrap().flow_m3s;
    let bypass = main.gate("check1b").unwrap().flow_m3s;
    assert!(check > 0.0 && bypass > 0.0);
    assert!(check > bypass);
}

#[test]
fn progress_stages_are_reported() {
    let path = demo("three_node_chain.yaml");
    let request = SolveRequest {
        project_path: &path,
        network_id: "through",
        overrides: SolveOverrides::default(),
        cancel: None,
    };
    let mut events: Vec<RunProgressEvent> = Vec::new();
    let report = run_solve_with_progress(&request, Some(&mut |e| events.push(e))).unwrap();

    let stages: Vec<RunStage> = events.iter().map(|e| e.stage).collect();
    assert_eq!(stages.first(), Some(&RunStage::LoadingProject));
    assert_eq!(stages.last(), Some(&RunStage::Completed));
    assert!(stages.contains(&RunStage::CompilingNetwork));

    let iterations = events.iter().filter(|e| e.iteration.is_some()).count();
    assert_eq!(iterations, report.iterations);
    assert!(report.timing.total_time_s >= report.timing.solve_time_s);
}

#[test]
fn cancelled_run_reports_cancelled() {
    let path = demo("three_node_chain.yaml");
    let token = CancelToken::new();
    token.cancel();
    let report = run_solve(&SolveRequest {
        project_path: &path,
        network_id: "through",
        overrides: SolveOverrides::default(),
        cancel: Some(token),
    })
    .unwrap();

    assert_eq!(report.status, "cancelled");
    assert_eq!(report.iterations, 0);
}

#[test]
fn report_serializes() {
    let project = load_project(&demo("three_node_chain.yaml")).unwrap();
    let report = solve_project_network(&project, "through", &SolveOverrides::default()).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["network_id"], "through");
    assert_eq!(json["gates"].as_array().unwrap().len(), 3);

    let yaml = serde_yaml::to_string(&report).unwrap();
    assert!(yaml.contains("status: converged"));
}
