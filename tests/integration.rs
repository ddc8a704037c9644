use std::path::{Path, PathBuf};
use std::process::Command;

fn texflat_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_texflat"));
    cmd.current_dir(dir);
    cmd
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

fn flatten(dir: &Path, args: &[&str]) -> std::process::Output {
    texflat_cmd(dir).args(args).output().unwrap()
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn single_file_passes_through_with_comments_stripped() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "Hello % note\nWorld\n");

    let out = flatten(dir.path(), &["main.tex", "flat.tex"]);
    assert!(
        out.status.success(),
        "flatten failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(read(&dir.path().join("flat.tex")), "Hello \nWorld\n");

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("No files were deleted"));
}

#[test]
fn directive_is_spliced_in_place() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "pre \\input{chapter} post\n");
    write_file(dir.path(), "chapter.tex", "CHAPTER");

    let out = flatten(dir.path(), &["main.tex", "flat.tex"]);
    assert!(out.status.success());
    assert_eq!(read(&dir.path().join("flat.tex")), "pre CHAPTER post\n");
}

#[test]
fn nested_subdirectory_includes_resolve_relative_to_their_file() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "\\input{chapters/one}\n");
    write_file(dir.path(), "chapters/one.tex", "ONE \\input{two}\n");
    write_file(dir.path(), "chapters/two.tex", "TWO");

    let out = flatten(dir.path(), &["main.tex", "flat.tex"]);
    assert!(
        out.status.success(),
        "flatten failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(read(&dir.path().join("flat.tex")), "ONE TWO\n\n");
}

#[test]
fn diamond_inclusion_expands_the_shared_file_twice() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "\\input{a}\n\\input{b}\n");
    write_file(dir.path(), "a.tex", "\\input{shared}");
    write_file(dir.path(), "b.tex", "\\input{shared}");
    write_file(dir.path(), "shared.tex", "S");

    let out = flatten(dir.path(), &["main.tex", "flat.tex"]);
    assert!(out.status.success());
    assert_eq!(read(&dir.path().join("flat.tex")), "S\nS\n");
}

#[test]
fn include_cycle_fails_and_names_the_chain() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "a.tex", "\\input{b}\n");
    write_file(dir.path(), "b.tex", "\\input{a}\n");

    let out = flatten(dir.path(), &["a.tex", "flat.tex"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.path().join("flat.tex").exists());

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Include Cycle"), "stderr: {stderr}");
    assert!(stderr.contains("a.tex"));
    assert!(stderr.contains("b.tex"));
}

#[test]
fn commented_directive_is_never_resolved() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "text % \\input{ghost}\n");

    // ghost.tex does not exist; success proves the directive was not followed.
    let out = flatten(dir.path(), &["main.tex", "flat.tex"]);
    assert!(
        out.status.success(),
        "flatten failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(read(&dir.path().join("flat.tex")), "text \n");
}

#[test]
fn long_blank_runs_collapse_to_two_empty_lines() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "A\n\n\n\n\nB\n");

    let out = flatten(dir.path(), &["main.tex", "flat.tex"]);
    assert!(out.status.success());
    assert_eq!(read(&dir.path().join("flat.tex")), "A\n\n\nB\n");
}

#[test]
fn short_blank_runs_are_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "A\n\nB\n");

    let out = flatten(dir.path(), &["main.tex", "flat.tex"]);
    assert!(out.status.success());
    assert_eq!(read(&dir.path().join("flat.tex")), "A\n\nB\n");
}

#[test]
fn bib_dir_flag_resolves_includes_missing_next_to_their_source() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "\\input{refs}\n");
    write_file(dir.path(), "bib/refs.tex", "REFS");

    let out = flatten(dir.path(), &["main.tex", "flat.tex", "--bib-dir", "bib"]);
    assert!(
        out.status.success(),
        "flatten failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(read(&dir.path().join("flat.tex")), "REFS\n");
}

#[test]
fn unresolved_include_fails_and_lists_the_candidates() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "\\input{missing}\n");

    let out = flatten(dir.path(), &["main.tex", "flat.tex"]);
    assert_eq!(out.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Unresolved Include"), "stderr: {stderr}");
    assert!(stderr.contains("missing.tex"));
}

#[test]
fn delete_tex_removes_flattened_sources_and_keeps_the_output() {
    let dir = tempfile::tempdir().unwrap();
    let main = write_file(dir.path(), "main.tex", "\\input{chapter}\n");
    let chapter = write_file(dir.path(), "chapter.tex", "CHAPTER");

    let out = flatten(dir.path(), &["main.tex", "flat.tex", "--delete-tex"]);
    assert!(
        out.status.success(),
        "flatten failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(!main.exists());
    assert!(!chapter.exists());
    assert_eq!(read(&dir.path().join("flat.tex")), "CHAPTER\n");

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Deleted: chapter.tex"), "stderr: {stderr}");
    assert!(stderr.contains("TeX files: 2 deleted."));
}

#[test]
fn keep_prefixes_survive_delete_tex() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), ".texflat.toml", "keep = [\"preamble\"]\n");
    let main = write_file(dir.path(), "main.tex", "\\input{preamble}\nbody\n");
    let preamble = write_file(dir.path(), "preamble.tex", "PRE");

    let out = flatten(dir.path(), &["main.tex", "flat.tex", "--delete-tex"]);
    assert!(
        out.status.success(),
        "flatten failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(preamble.exists());
    assert!(!main.exists());
}

#[test]
fn delete_unused_pdf_spares_referenced_assets() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "main.tex",
        "\\includegraphics[width=\\linewidth]{used}\n",
    );
    let used = write_file(dir.path(), "used.pdf", "%PDF");
    let orphan = write_file(dir.path(), "orphan.pdf", "%PDF");

    let out = flatten(dir.path(), &["main.tex", "flat.tex", "--delete-unused-pdf"]);
    assert!(
        out.status.success(),
        "flatten failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(used.exists());
    assert!(!orphan.exists());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Deleted: orphan.pdf"), "stderr: {stderr}");

    // A second pass finds nothing left to delete.
    let again = flatten(dir.path(), &["main.tex", "flat.tex", "--delete-unused-pdf"]);
    assert!(again.status.success());
    let stderr = String::from_utf8_lossy(&again.stderr);
    assert!(
        stderr.contains("No unused PDF files found to delete."),
        "stderr: {stderr}"
    );
}

#[test]
fn custom_graphics_dirs_still_resolve_assets_at_the_project_root() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), ".texflat.toml", "graphics_dirs = [\"figures\"]\n");
    write_file(dir.path(), "main.tex", "\\includegraphics{plots/fig}\n");
    let used = write_file(dir.path(), "plots/fig.pdf", "%PDF");

    let out = flatten(dir.path(), &["main.tex", "flat.tex", "--delete-unused-pdf"]);
    assert!(
        out.status.success(),
        "flatten failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(used.exists(), "referenced root-level PDF was deleted");
}

#[cfg(unix)]
#[test]
fn failed_deletion_reports_the_file_and_exits_with_code_two() {
    use std::os::unix::fs::PermissionsExt as _;

    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "\\input{chapters/one}\n\\input{two}\n");
    let locked = write_file(dir.path(), "chapters/one.tex", "ONE");
    let two = write_file(dir.path(), "two.tex", "TWO");

    let chapters = dir.path().join("chapters");
    std::fs::set_permissions(&chapters, std::fs::Permissions::from_mode(0o555)).unwrap();
    // Root ignores directory write bits; the failure cannot be produced then.
    if std::fs::write(chapters.join("canary"), "").is_ok() {
        std::fs::remove_file(chapters.join("canary")).unwrap();
        std::fs::set_permissions(&chapters, std::fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let out = flatten(dir.path(), &["main.tex", "flat.tex", "--delete-tex"]);
    std::fs::set_permissions(&chapters, std::fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(out.status.code(), Some(2));
    assert!(locked.exists());
    assert!(!two.exists());
    assert!(!dir.path().join("main.tex").exists());
    assert_eq!(read(&dir.path().join("flat.tex")), "ONE\nTWO\n");

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("Cannot delete chapters/one.tex"),
        "stderr: {stderr}"
    );
    assert!(
        stderr.contains("TeX files: 2 deleted, 1 failed."),
        "stderr: {stderr}"
    );
}

#[test]
fn json_report_describes_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "\\input{chapter}\n");
    write_file(dir.path(), "chapter.tex", "CHAPTER");

    let out = flatten(dir.path(), &["main.tex", "flat.tex", "--json"]);
    assert!(
        out.status.success(),
        "flatten failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["inlined"].as_array().unwrap().len(), 2);
    assert_eq!(report["input"], "main.tex");
    assert_eq!(report["output"], "flat.tex");
    assert!(report["tex_deletions"].is_null());
    assert!(report["pdf_deletions"].is_null());
}

#[test]
fn input_as_output_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "body\n");

    let out = flatten(dir.path(), &["main.tex", "main.tex"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Input Is Output"), "stderr: {stderr}");
    assert_eq!(read(&dir.path().join("main.tex")), "body\n");
}

#[cfg(unix)]
#[test]
fn symlinked_output_aliasing_the_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "body\n");
    std::os::unix::fs::symlink("main.tex", dir.path().join("out.tex")).unwrap();

    let out = flatten(dir.path(), &["main.tex", "out.tex"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Input Is Output"), "stderr: {stderr}");
    assert_eq!(read(&dir.path().join("main.tex")), "body\n");
}

#[test]
fn output_parent_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "body\n");

    let out = flatten(dir.path(), &["main.tex", "build/out/flat.tex"]);
    assert!(
        out.status.success(),
        "flatten failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(read(&dir.path().join("build/out/flat.tex")), "body\n");
}

#[test]
fn watch_conflicts_with_deletion_flags() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "main.tex", "body\n");

    let out = flatten(
        dir.path(),
        &["main.tex", "flat.tex", "--watch", "--delete-tex"],
    );
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("cannot be used with"), "stderr: {stderr}");
}
