#![cfg(unix)]

// Lives in its own test binary: it changes the process working directory,
// which must not race with the other suites.

use std::fs;

use simreel::{ProjectLayout, RunOptions, pipeline};

#[test]
fn pipeline_runs_the_simulation_from_a_relative_root() {
    use std::os::unix::fs::PermissionsExt as _;

    let dir = tempfile::tempdir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let release = dir.path().join("proj/build/Release");
    fs::create_dir_all(&release).unwrap();
    fs::write(dir.path().join("proj/settings.cpp"), "bool DO_VIDEO = true;\n").unwrap();

    // The simulation leaves a marker in its own directory when it actually ran.
    let exe = release.join("XPBDPallet");
    fs::write(&exe, "#!/bin/sh\ntouch sim_ran\n").unwrap();
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();

    let mut layout = ProjectLayout::from_root(std::path::Path::new("proj"));
    layout.build_command = vec!["true".to_string()];

    let opts = RunOptions {
        video: false,
        ..RunOptions::default()
    };
    let produced = pipeline::run(&layout, &opts).unwrap();

    assert_eq!(produced, None);
    assert!(release.join("sim_ran").exists(), "simulation never ran");
}
