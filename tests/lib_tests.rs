use clap::Parser;
use repo_check::engine::tools::{check_roots_are_dirs, has_ancestor_in, home_dir};
use repo_check::engine::{
    Cli, absolutize, expand_home, is_hidden_name, normalize_path, normalize_roots,
    path_relative_to, setup_opts,
};
use repo_check::probe::{parse_left_right, upstream_remote_name};
use repo_check::report::{Renderer, display_name, render_json, sync_label};
use repo_check::utils::settings_file::{SettingsSection, parse_bool, parse_legacy_settings};
use repo_check::utils::{
    SettingsFile, ensure_settings_file, load_settings_file, parse_ignore_entries, parse_settings,
};
use repo_check::{
    BranchState, Candidate, DirtyPolicy, Opts, ProbeResult, RemoteState, RowStatus, ScanRow,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

// --- path tools ---

#[test]
fn test_path_relative_under_base() {
    let base = PathBuf::from("/ws");
    assert_eq!(
        path_relative_to(Path::new("/ws/api/core"), &base),
        Some(PathBuf::from("api/core"))
    );
    assert_eq!(path_relative_to(Path::new("/other"), &base), None);
}

#[test]
fn test_normalize_path_lexical() {
    assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
    assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
    assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
}

#[test]
fn test_absolutize_relative_against_base() {
    let base = Path::new("/ws");
    assert_eq!(absolutize(Path::new("docs"), base), PathBuf::from("/ws/docs"));
    assert_eq!(absolutize(Path::new("./a/../b"), base), PathBuf::from("/ws/b"));
    assert_eq!(absolutize(Path::new("/abs/p"), base), PathBuf::from("/abs/p"));
}

#[test]
fn test_expand_home() {
    assert_eq!(expand_home(Path::new("/tmp/x")), PathBuf::from("/tmp/x"));
    assert_eq!(expand_home(Path::new("a/~")), PathBuf::from("a/~"));
    if let Some(home) = home_dir() {
        assert_eq!(expand_home(Path::new("~/code")), home.join("code"));
        assert_eq!(expand_home(Path::new("~")), home);
    }
}

#[test]
fn test_normalize_roots_dedup_and_default() {
    let cwd = Path::new("/cwd");
    let roots = vec![
        PathBuf::from("a"),
        PathBuf::from("/abs"),
        PathBuf::from("a/./"),
        PathBuf::new(),
    ];
    assert_eq!(
        normalize_roots(&roots, cwd),
        vec![PathBuf::from("/cwd/a"), PathBuf::from("/abs")]
    );
    assert_eq!(normalize_roots(&[], cwd), vec![PathBuf::from("/cwd")]);
}

#[test]
fn test_check_roots_are_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("file.txt");
    std::fs::write(&file, "x").unwrap();
    assert!(check_roots_are_dirs(&[dir.path().to_path_buf()]).is_ok());
    let err = check_roots_are_dirs(&[dir.path().to_path_buf(), file]).unwrap_err();
    assert!(err.to_string().starts_with("Not a directory"));
    assert!(check_roots_are_dirs(&[dir.path().join("missing")]).is_err());
}

#[test]
fn test_hidden_and_ancestor() {
    assert!(is_hidden_name(OsStr::new(".scratch")));
    assert!(!is_hidden_name(OsStr::new("web")));
    let all = vec![PathBuf::from("/ws"), PathBuf::from("/ws/group")];
    assert!(has_ancestor_in(Path::new("/ws/group"), &all));
    assert!(!has_ancestor_in(Path::new("/ws"), &all));
    assert!(!has_ancestor_in(Path::new("/wsx"), &all));
}

// --- git output parsing ---

#[test]
fn test_parse_left_right() {
    assert_eq!(parse_left_right("3\t1"), Some((3, 1)));
    assert_eq!(parse_left_right("0 0\n"), Some((0, 0)));
    assert_eq!(parse_left_right("3"), None);
    assert_eq!(parse_left_right("a b"), None);
    assert_eq!(parse_left_right("1 2 3"), None);
    assert_eq!(parse_left_right(""), None);
}

#[test]
fn test_upstream_remote_name() {
    assert_eq!(upstream_remote_name("origin/main"), Some("origin"));
    assert_eq!(upstream_remote_name("fork/feature/x"), Some("fork"));
    assert_eq!(upstream_remote_name("main"), None);
    assert_eq!(upstream_remote_name("/main"), None);
}

// --- rendering ---

fn upstream(ahead: u64, behind: u64) -> RemoteState {
    RemoteState::Remote {
        upstream: Some("origin/main".to_string()),
        ahead,
        behind,
    }
}

fn row(rel: &str, level: usize, status: RowStatus) -> ScanRow {
    ScanRow {
        candidate: Candidate {
            path: Path::new("/ws").join(rel),
            root: PathBuf::from("/ws"),
            rel_path: PathBuf::from(rel),
            level,
        },
        status,
    }
}

fn repo(branch: &str, dirty: bool, remote: RemoteState) -> RowStatus {
    RowStatus::Done(ProbeResult::Repository {
        branch: BranchState::Named(branch.to_string()),
        dirty,
        remote,
    })
}

#[test]
fn test_sync_label() {
    assert_eq!(sync_label(&upstream(0, 0)), "in-sync");
    assert_eq!(sync_label(&upstream(2, 0)), "ahead 2");
    assert_eq!(sync_label(&upstream(0, 4)), "behind 4");
    assert_eq!(sync_label(&upstream(3, 1)), "ahead 3, behind 1");
    assert_eq!(sync_label(&RemoteState::NoRemote), "no-upstream");
    let untracked = RemoteState::Remote {
        upstream: None,
        ahead: 0,
        behind: 0,
    };
    assert_eq!(sync_label(&untracked), "no-upstream");
    assert!(!untracked.is_in_sync());
    assert!(upstream(0, 0).is_in_sync());
    assert!(!upstream(1, 0).is_in_sync());
}

#[test]
fn test_display_name_nesting() {
    let top = row("api", 0, RowStatus::Pending);
    let child = row("api/core", 1, RowStatus::Pending);
    let grandchild = row("api/core/gen", 2, RowStatus::Pending);
    assert_eq!(display_name(&top.candidate), "api");
    assert_eq!(display_name(&child.candidate), "└─ core");
    assert_eq!(display_name(&grandchild.candidate), "   └─ gen");
    assert!(child.candidate.is_nested());
}

#[test]
fn test_render_lines_plain() {
    let rows = vec![
        row("api", 0, repo("main", false, upstream(0, 0))),
        row("docs", 0, RowStatus::Done(ProbeResult::NotRepository)),
        row("web", 0, repo("dev", true, upstream(2, 0))),
        row("lib", 0, repo("main", false, RemoteState::NoRemote)),
        row("tmp", 0, RowStatus::Done(ProbeResult::error("git status failed"))),
        row("new", 0, RowStatus::Pending),
    ];
    let lines = Renderer::new(false, "origin").render_lines(&rows);
    let words: Vec<Vec<&str>> = lines.iter().map(|l| l.split_whitespace().collect()).collect();
    assert_eq!(words[0], ["api", "main", "clean", "origin", "in-sync"]);
    assert_eq!(words[1], ["docs", "not-init"]);
    assert_eq!(words[2], ["web", "dev", "dirty", "origin", "ahead", "2"]);
    assert_eq!(words[3], ["lib", "main", "clean", "no-remote", "no-upstream"]);
    assert_eq!(words[4], ["tmp", "unknown", "error"]);
    assert_eq!(words[5], ["new", "pending"]);

    // Columns line up: branch column starts after the widest name plus the gap.
    assert!(lines[0].starts_with("api   main"));
    assert!(lines[1].starts_with("docs  not-init"));
    assert!(lines.iter().all(|l| !l.ends_with(' ')));
}

#[test]
fn test_render_json_shape() {
    let rows = vec![
        row("docs", 0, RowStatus::Done(ProbeResult::NotRepository)),
        row("new", 0, RowStatus::Pending),
        row("api", 0, repo("main", true, upstream(1, 0))),
    ];
    let json = render_json(&rows).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v[0]["status"]["state"], "done");
    assert_eq!(v[0]["status"]["result"]["status"], "not_repository");
    assert_eq!(v[1]["status"]["state"], "pending");
    let api = &v[2]["status"]["result"];
    assert_eq!(api["status"], "repository");
    assert_eq!(api["branch"]["name"], "main");
    assert_eq!(api["dirty"], true);
    assert_eq!(api["remote"]["ahead"], 1);
    assert_eq!(v[2]["candidate"]["rel_path"], "api");
}

// --- settings ---

fn origin() -> &'static Path {
    Path::new("config.toml")
}

#[test]
fn test_parse_settings_all_keys() {
    let text = r#"
[settings]
paths = ["~/code", "/srv/repos"]
exclude_hidden = true
max_workers = 8
depth = 2
timeout_secs = 5
include_untracked = false
remote = "upstream"
fetch = true
descend_into_repos = true
"#;
    let sec = parse_settings(text, origin()).settings;
    assert_eq!(
        sec,
        SettingsSection {
            paths: Some(vec!["~/code".to_string(), "/srv/repos".to_string()]),
            exclude_hidden: Some(true),
            max_workers: Some(8),
            depth: Some(2),
            timeout_secs: Some(5),
            include_untracked: Some(false),
            remote: Some("upstream".to_string()),
            fetch: Some(true),
            descend_into_repos: Some(true),
        }
    );
}

#[test]
fn test_parse_settings_skips_bad_keys() {
    let text = r#"
[settings]
max_workers = "eight"
depth = 0
remote = ""
colour = "always"
exclude_hidden = true
"#;
    let sec = parse_settings(text, origin()).settings;
    assert_eq!(
        sec,
        SettingsSection {
            exclude_hidden: Some(true),
            ..Default::default()
        }
    );
}

#[test]
fn test_parse_settings_invalid_toml_is_empty() {
    let sec = parse_settings("[settings\nx = ", origin()).settings;
    assert_eq!(sec, SettingsSection::default());
    let sec = parse_settings("settings = 3", origin()).settings;
    assert_eq!(sec, SettingsSection::default());
}

#[test]
fn test_parse_bool_words() {
    assert_eq!(parse_bool("Yes"), Some(true));
    assert_eq!(parse_bool(" off "), Some(false));
    assert_eq!(parse_bool("1"), Some(true));
    assert_eq!(parse_bool("maybe"), None);
}

#[test]
fn test_parse_legacy_settings() {
    let text = "\
# old format
path=/a
path = ~/b
path=
exclude_hidden=yes
max_workers=0
garbage line
";
    let sec = parse_legacy_settings(text);
    assert_eq!(sec.paths, Some(vec!["/a".to_string(), "~/b".to_string()]));
    assert_eq!(sec.exclude_hidden, Some(true));
    assert_eq!(sec.max_workers, None);
}

#[test]
fn test_ensure_settings_file_writes_defaults_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repo-check").join("config.toml");
    assert!(ensure_settings_file(&path, None).unwrap());
    assert!(!ensure_settings_file(&path, None).unwrap());
    let sec = load_settings_file(&path).unwrap().settings;
    assert_eq!(sec.depth, Some(1));
    assert_eq!(sec.remote.as_deref(), Some("origin"));
    assert_eq!(sec.include_untracked, Some(true));
    assert_eq!(sec.paths, None);
    assert_eq!(sec.max_workers, None);
    assert_eq!(sec.descend_into_repos, Some(true));
}

#[test]
fn test_ensure_settings_file_imports_legacy() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = dir.path().join("config");
    std::fs::write(&legacy, "path=/a\npath=~/b\nexclude_hidden=true\nmax_workers=4\n").unwrap();
    let path = dir.path().join("config.toml");
    assert!(ensure_settings_file(&path, Some(&legacy)).unwrap());
    let sec = load_settings_file(&path).unwrap().settings;
    assert_eq!(sec.paths, Some(vec!["/a".to_string(), "~/b".to_string()]));
    assert_eq!(sec.exclude_hidden, Some(true));
    assert_eq!(sec.max_workers, Some(4));
    assert_eq!(sec.depth, Some(1));
}

#[test]
fn test_load_settings_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_settings_file(&dir.path().join("nope.toml")).is_none());
}

#[test]
fn test_parse_ignore_entries() {
    let text = "# ignored folders\n\n  docs  \n/abs/path\n#tmp\n~/scratch\n";
    assert_eq!(parse_ignore_entries(text), ["docs", "/abs/path", "~/scratch"]);
}

// --- option precedence ---

#[test]
fn test_setup_opts_defaults() {
    let cli = Cli::parse_from(["repo-check"]);
    let opts = setup_opts(&cli, None);
    let defaults = Opts::default();
    assert!(opts.roots.is_empty());
    assert_eq!(opts.depth, 1);
    assert_eq!(opts.max_workers, None);
    assert_eq!(opts.remote, defaults.remote);
    assert!(opts.include_untracked);
    assert!(opts.descend_into_repos);
    assert!(!opts.json);
}

#[test]
fn test_setup_opts_cli_overrides_file() {
    let file = SettingsFile {
        settings: SettingsSection {
            paths: Some(vec!["/from/file".to_string()]),
            exclude_hidden: Some(true),
            depth: Some(2),
            remote: Some("upstream".to_string()),
            max_workers: Some(16),
            ..Default::default()
        },
    };
    let cli = Cli::parse_from([
        "repo-check",
        "--depth",
        "3",
        "-p",
        "/x",
        "-j",
        "2",
        "--include-untracked",
        "false",
        "--fetch",
    ]);
    let opts = setup_opts(&cli, Some(&file));
    assert_eq!(opts.roots, vec![PathBuf::from("/x")]);
    assert_eq!(opts.depth, 3);
    assert_eq!(opts.max_workers, Some(2));
    assert!(opts.exclude_hidden);
    assert_eq!(opts.remote, "upstream");
    assert!(!opts.include_untracked);
    assert!(opts.fetch);

    let probe = opts.probe_opts();
    assert_eq!(probe.dirty_policy, DirtyPolicy::TrackedOnly);
    assert_eq!(probe.remote, "upstream");
    assert_eq!(probe.timeout, Duration::from_secs(opts.timeout_secs));
    let discover = opts.discover_opts(vec!["docs".to_string()]);
    assert_eq!(discover.depth, 3);
    assert_eq!(discover.ignore, ["docs"]);
}

#[test]
fn test_setup_opts_file_paths_used_without_flag() {
    let file = SettingsFile {
        settings: SettingsSection {
            paths: Some(vec!["/a".to_string(), "".to_string(), "/b".to_string()]),
            ..Default::default()
        },
    };
    let opts = setup_opts(&Cli::parse_from(["repo-check", "-v"]), Some(&file));
    assert_eq!(opts.roots, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    assert!(opts.verbose);
}

#[test]
fn test_cli_rejects_zero() {
    assert!(Cli::try_parse_from(["repo-check", "--depth", "0"]).is_err());
    assert!(Cli::try_parse_from(["repo-check", "-j", "0"]).is_err());
    assert!(Cli::try_parse_from(["repo-check", "--timeout", "0"]).is_err());
}
