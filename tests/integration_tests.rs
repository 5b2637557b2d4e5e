use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Helper function to run plotcanvas with the given arguments
fn run_plotcanvas(args: &[&str]) -> Result<String, String> {
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--bin", "plotcanvas", "--"])
        .args(args)
        .output()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

fn temp_output(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("plotcanvas-{}-{}", std::process::id(), name))
}

#[test]
fn test_end_to_end_pdf() {
    let out = temp_output("panels.pdf");
    let result = run_plotcanvas(&["test/two_panels.json", "-o", out.to_str().unwrap()]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());

    let bytes = fs::read(&out).expect("Output was not written");
    assert!(bytes.starts_with(b"%PDF-1.4"), "Output is not a PDF");
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("(time \\(s\\)) Tj"));
    assert!(text.trim_end().ends_with("%%EOF"));
    let _ = fs::remove_file(out);
}

#[test]
fn test_end_to_end_eps_from_extension() {
    let out = temp_output("panels.eps");
    let result = run_plotcanvas(&["test/two_panels.json", "-o", out.to_str().unwrap()]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());

    let text = fs::read_to_string(&out).expect("Output was not written");
    assert!(text.starts_with("%!PS-Adobe-3.0 EPSF-3.0"));
    assert!(text.contains("%%BoundingBox: 0 0 "));
    let _ = fs::remove_file(out);
}

#[test]
fn test_explicit_format_flag() {
    let out = temp_output("flagged.out");
    let result = run_plotcanvas(&[
        "test/two_panels.json",
        "-o",
        out.to_str().unwrap(),
        "-f",
        "eps",
    ]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());

    let text = fs::read_to_string(&out).expect("Output was not written");
    assert!(text.starts_with("%!PS-Adobe"));
    let _ = fs::remove_file(out);
}

#[test]
fn test_unknown_reference_fails() {
    let out = temp_output("bad.pdf");
    let result = run_plotcanvas(&["test/bad_reference.json", "-o", out.to_str().unwrap()]);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("nowhere"));
    assert!(!out.exists());
}

#[test]
fn test_missing_layout_fails() {
    let result = run_plotcanvas(&["test/does_not_exist.json"]);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Failed to read layout"));
}
