//! Integration tests for crate-index-cache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn crate_index_cache(config_dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("crate-index-cache");
        cmd.env("CRATE_INDEX_CACHE_CONFIG", config_dir.join("config.toml"))
            .env("CI", "true");
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        crate_index_cache(temp.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("index cache"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        crate_index_cache(temp.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("crate-index-cache"));
    }

    #[test]
    fn status_runs() {
        // git may be missing on the host, but status should not panic
        let temp = TempDir::new().unwrap();
        let _ = crate_index_cache(temp.path()).arg("status").assert();
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        crate_index_cache(temp.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        crate_index_cache(temp.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[fetch]"));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        crate_index_cache(temp.path())
            .args(["config", "init"])
            .assert()
            .success();
        let written = fs::read_to_string(temp.path().join("config.toml")).unwrap();
        assert!(written.contains("downloads_dir"));
    }

    #[test]
    fn invalid_config_fails() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.toml"), "[fetch\n").unwrap();
        crate_index_cache(temp.path())
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn unpack_rejects_foreign_scheme() {
        let temp = TempDir::new().unwrap();
        crate_index_cache(temp.path())
            .args(["unpack", "https://example.com/index", "--dest"])
            .arg(temp.path().join("out"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid source URL"));
    }

    #[test]
    fn unpack_rejects_unknown_option() {
        let temp = TempDir::new().unwrap();
        crate_index_cache(temp.path())
            .args(["unpack", "crateindex://example.com/index;depth=1", "--dest"])
            .arg(temp.path().join("out"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("depth"));
    }

    #[test]
    fn unpack_without_sources_fails() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        crate_index_cache(temp.path())
            .args([
                "unpack",
                "crateindex://example.com/index;rev=0123abcd0123abcd0123abcd0123abcd0123abcd",
                "--dest",
            ])
            .arg(&out)
            .arg("--downloads")
            .arg(temp.path().join("downloads"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("No up to date source found"))
            .stderr(predicate::str::contains("shallow clone not enabled"));
        assert!(!out.join("git").exists());
    }

    #[test]
    fn inspect_cache_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("serde");
        let mut bytes = b"\x01abc123\x00".to_vec();
        bytes.extend_from_slice(b"1.0.0\x00{\"name\":\"serde\",\"vers\":\"1.0.0\"}\x00");
        bytes.extend_from_slice(b"1.0.1\x00{\"name\":\"serde\",\"vers\":\"1.0.1\"}\x00");
        fs::write(&file, bytes).unwrap();

        crate_index_cache(temp.path())
            .arg("inspect")
            .arg(&file)
            .assert()
            .success()
            .stdout(predicate::str::contains("Revision: abc123"))
            .stdout(predicate::str::contains("Total: 2 record(s)"));

        crate_index_cache(temp.path())
            .arg("inspect")
            .arg(&file)
            .args(["--format", "plain"])
            .assert()
            .success()
            .stdout("1.0.0\n1.0.1\n");

        crate_index_cache(temp.path())
            .arg("inspect")
            .arg(&file)
            .args(["--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"revision\": \"abc123\""));
    }

    #[test]
    fn inspect_corrupt_file_fails() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("bad");
        fs::write(&file, b"\x02nope\x00").unwrap();

        crate_index_cache(temp.path())
            .arg("inspect")
            .arg(&file)
            .assert()
            .failure();
    }

    #[test]
    fn inspect_missing_path_fails() {
        let temp = TempDir::new().unwrap();
        crate_index_cache(temp.path())
            .arg("inspect")
            .arg(temp.path().join("nothing"))
            .assert()
            .failure();
    }
}

mod git_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use std::fs;
    use std::path::Path;
    use std::process::Command as StdCommand;
    use tempfile::TempDir;

    fn git_available() -> bool {
        StdCommand::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = StdCommand::new("git")
            .args(["-c", "user.name=Index Bot", "-c", "user.email=bot@example.com"])
            .args(["-c", "init.defaultBranch=master", "-c", "commit.gpgsign=false"])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Build an upstream index and mirror it into `downloads/git2/<name>`
    fn seed_mirror(root: &Path) -> String {
        let upstream = root.join("upstream");
        fs::create_dir_all(upstream.join("se/rd")).unwrap();
        fs::write(upstream.join("config.json"), "{\"dl\":\"https://example.com\"}\n").unwrap();
        fs::write(
            upstream.join("se/rd/serde"),
            "{\"name\": \"serde\", \"vers\": \"1.0.0\"}\n{\"name\": \"serde\", \"vers\": \"1.0.1\"}\n",
        )
        .unwrap();

        git(&upstream, &["init", "--quiet"]);
        git(&upstream, &["add", "."]);
        git(&upstream, &["commit", "--quiet", "-m", "index"]);
        let rev = git(&upstream, &["rev-parse", "HEAD"]);

        let git2 = root.join("downloads/git2");
        fs::create_dir_all(&git2).unwrap();
        git(
            &git2,
            &[
                "clone",
                "--quiet",
                "--mirror",
                upstream.to_str().unwrap(),
                "example.com.index",
            ],
        );
        rev
    }

    fn crate_index_cache(root: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("crate-index-cache");
        cmd.env("CRATE_INDEX_CACHE_CONFIG", root.join("config.toml"))
            .env("CI", "true");
        cmd
    }

    #[test]
    fn unpack_from_mirror() {
        if !git_available() {
            eprintln!("git not installed, skipping");
            return;
        }

        let temp = TempDir::new().unwrap();
        let rev = seed_mirror(temp.path());
        let out = temp.path().join("out");

        crate_index_cache(temp.path())
            .args(["unpack", "crateindex://example.com/index;protocol=file;lfs=0", "--dest"])
            .arg(&out)
            .arg("--downloads")
            .arg(temp.path().join("downloads"))
            .args(["--rev", &rev])
            .assert()
            .success();

        let dest = out.join("git");
        assert!(dest.join(".last-updated").is_file());
        assert!(!dest.join(".cache/config.json").exists());

        let cache = fs::read(dest.join(".cache/se/rd/serde")).unwrap();
        let mut expected = vec![0x01];
        expected.extend_from_slice(rev.as_bytes());
        expected.push(0);
        expected.extend_from_slice(b"1.0.0\x00{\"name\":\"serde\",\"vers\":\"1.0.0\"}\x00");
        expected.extend_from_slice(b"1.0.1\x00{\"name\":\"serde\",\"vers\":\"1.0.1\"}\x00");
        assert_eq!(cache, expected);
    }

    #[test]
    fn unpack_expands_abbreviated_revision() {
        if !git_available() {
            eprintln!("git not installed, skipping");
            return;
        }

        let temp = TempDir::new().unwrap();
        let rev = seed_mirror(temp.path());
        let out = temp.path().join("out");

        crate_index_cache(temp.path())
            .args(["unpack", "crateindex://example.com/index;lfs=0", "--dest"])
            .arg(&out)
            .arg("--downloads")
            .arg(temp.path().join("downloads"))
            .args(["--rev", &rev[..8]])
            .assert()
            .success();

        let cache = fs::read(out.join("git/.cache/se/rd/serde")).unwrap();
        assert_eq!(cache[0], 0x01);
        assert_eq!(&cache[1..41], rev.as_bytes());
        assert_eq!(cache[41], 0);
    }

    #[test]
    fn unpack_resolves_branch() {
        if !git_available() {
            eprintln!("git not installed, skipping");
            return;
        }

        let temp = TempDir::new().unwrap();
        seed_mirror(temp.path());
        let out = temp.path().join("out");

        crate_index_cache(temp.path())
            .args([
                "unpack",
                "crateindex://example.com/index;branch=master;lfs=0;destsuffix=registry/index",
                "--dest",
            ])
            .arg(&out)
            .arg("--downloads")
            .arg(temp.path().join("downloads"))
            .assert()
            .success();

        assert!(out.join("registry/index/.last-updated").is_file());
        assert!(out.join("registry/index/.cache/se/rd/serde").is_file());
    }
}
