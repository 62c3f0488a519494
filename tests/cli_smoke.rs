use std::path::PathBuf;
use std::process::Command;

fn simreel_exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_simreel")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "simreel.exe"
            } else {
                "simreel"
            });
            p
        })
}

#[test]
fn cli_exits_nonzero_with_diagnostic_on_first_stage_failure() {
    let dir = tempfile::tempdir().unwrap();
    // A settings file without the capture flag fails the very first stage,
    // before any build tool is needed.
    std::fs::write(dir.path().join("settings.cpp"), "int STEPS = 10;\n").unwrap();

    let output = Command::new(simreel_exe())
        .arg("--root")
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("DO_VIDEO"), "stderr was: {stderr}");
    assert!(stderr.contains("settings.cpp"), "stderr was: {stderr}");
}
