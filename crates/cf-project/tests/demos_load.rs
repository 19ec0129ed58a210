use std::path::PathBuf;

#[test]
fn demos_load_and_validate() {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let root = crate_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root");

    let demos = [
        ("demos/three_node_chain.yaml", 2),
        ("demos/district.yaml", 2),
    ];

    for (rel, networks) in demos {
        let path = root.join(rel);
        let project = cf_project::load_yaml(&path)
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e));
        assert_eq!(project.networks.len(), networks, "{}", rel);
    }
}

#[test]
fn district_spur_overrides_solver() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/district.yaml");
    let project = cf_project::load_yaml(&root).unwrap();
    let spur = project.network("spur").unwrap();
    let solver = cf_project::effective_solver(&project, spur);
    assert_eq!(solver.dt_relax_s, 20.0);
    assert_eq!(solver.max_iterations, 500);

    let main = project.network("main").unwrap();
    assert_eq!(cf_project::effective_solver(&project, main), project.solver);
}
