use head_require::core::{FileKind, FileScanner};
use std::fs;
use std::path::Path;

fn touch<P: AsRef<Path>>(p: P) {
    let p = p.as_ref();
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, "import os\n").unwrap();
}

#[test]
fn scanner_keeps_python_and_notebooks_only() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();

    touch(root.join("app.py"));
    touch(root.join("pkg/analysis.ipynb"));
    touch(root.join("pkg/readme.md"));
    touch(root.join("pkg/_private.py"));
    touch(root.join("pkg/__init__.py"));

    let files = FileScanner::new().scan_directory(root).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|f| f.path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(names, vec!["app.py", "pkg/analysis.ipynb"]);
    assert_eq!(files[0].kind, FileKind::Python);
    assert_eq!(files[1].kind, FileKind::Notebook);
}

#[test]
fn scanner_prunes_hidden_underscore_and_environment_dirs() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();

    touch(root.join("main.py"));
    touch(root.join(".git/hook.py"));
    touch(root.join("__pycache__/main.py"));
    touch(root.join("_build/gen.py"));
    touch(root.join("env/lib/site.py"));
    touch(root.join("venv/lib/site.py"));
    touch(root.join("myenv/lib/site.py"));
    touch(root.join("src/core.py"));

    let files = FileScanner::new()
        .with_excluded_dir("myenv")
        .scan_directory(root)
        .unwrap();

    let names: Vec<_> = files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["main.py", "core.py"]);
}

#[test]
fn scanner_accepts_hidden_root() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path().join(".project");
    touch(root.join("run.py"));

    let files = FileScanner::new().scan_directory(&root).unwrap();
    assert_eq!(files.len(), 1);
}

#[test]
fn scanner_rejects_missing_root() {
    let dir = tempfile::TempDir::new().unwrap();
    assert!(FileScanner::new()
        .scan_directory(&dir.path().join("missing"))
        .is_err());
}

#[cfg(unix)]
#[test]
fn scanner_keeps_symlinked_files_but_not_linked_directories() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path().join("project");
    let outside = dir.path().join("outside");

    touch(root.join("real.py"));
    touch(outside.join("shared.py"));
    touch(outside.join("lib/deep.py"));
    fs::create_dir_all(root.join("app")).unwrap();
    std::os::unix::fs::symlink(outside.join("shared.py"), root.join("app/link.py")).unwrap();
    std::os::unix::fs::symlink(outside.join("lib"), root.join("linked_lib")).unwrap();

    let files = FileScanner::new().scan_directory(&root).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|f| f.path.strip_prefix(&root).unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, vec!["app/link.py", "real.py"]);
}
