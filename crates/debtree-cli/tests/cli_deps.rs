use assert_cmd::Command;
use debtree_archive::testing::write_package;
use predicates::prelude::*;
use tempfile::TempDir;

fn debtree_cmd() -> Command {
    let mut cmd = Command::cargo_bin("debtree").unwrap();
    cmd.env("HOME", env!("CARGO_TARGET_TMPDIR")).env_remove("DEBTREE_CONFIG");
    cmd
}

fn fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_package(
        tmp.path(),
        "python-debtools",
        "0.3-1",
        Some("python (>= 2.7), python (<< 2.8), python-stdeb"),
    )
    .unwrap();
    write_package(tmp.path(), "python-stdeb", "0.8.5", Some("python")).unwrap();
    write_package(tmp.path(), "python", "2.7.18", None).unwrap();
    tmp
}

#[test]
fn test_deps_single_package() {
    let tmp = fixture();

    debtree_cmd()
        .arg("deps")
        .arg("--dir")
        .arg(tmp.path())
        .arg("python-debtools")
        .assert()
        .success()
        .stdout(
            "python-debtools\n===============\n\n  * python (>= 2.7, << 2.8)\n  * python-stdeb\n",
        )
        .stderr(predicate::str::contains("Resolved 1 packages"));
}

#[test]
fn test_deps_recursive_install_order() {
    let tmp = fixture();

    debtree_cmd()
        .args(["deps", "-r", "--sort", "install", "--dir"])
        .arg(tmp.path())
        .arg("python-debtools")
        .assert()
        .success()
        .stdout(
            "python\n======\n\n\
             \npython-stdeb\n============\n\n  * python\n\
             \npython-debtools\n===============\n\n  * python (>= 2.7, << 2.8)\n  * python-stdeb\n",
        );
}

#[test]
fn test_deps_skips_installed() {
    let tmp = fixture();
    let listing = tmp.path().join("dpkg.txt");
    std::fs::write(&listing, "ii  python  2.7.18-1  amd64  interactive high-level language\n").unwrap();

    debtree_cmd()
        .args(["deps", "-r", "-i"])
        .arg(&listing)
        .arg("--dir")
        .arg(tmp.path())
        .arg("python-debtools")
        .assert()
        .success()
        .stdout(predicate::str::contains("python-stdeb\n============"))
        .stdout(predicate::str::contains("python\n======").not());
}

#[test]
fn test_deps_why() {
    let tmp = fixture();

    debtree_cmd()
        .args(["deps", "-r", "--why", "python", "--dir"])
        .arg(tmp.path())
        .arg("python-debtools")
        .assert()
        .success()
        .stdout("python-debtools -> python (>= 2.7, << 2.8)\npython-stdeb -> python\n");
}

#[test]
fn test_deps_no_recursive_overrides_config() {
    let tmp = fixture();
    let config = tmp.path().join("config.toml");
    std::fs::write(&config, "[resolve]\nrecursive = true\n").unwrap();

    debtree_cmd()
        .arg("--config")
        .arg(&config)
        .args(["deps", "--no-recursive", "--dir"])
        .arg(tmp.path())
        .arg("python-stdeb")
        .assert()
        .success()
        .stdout("python-stdeb\n============\n\n  * python\n")
        .stderr(predicate::str::contains("Resolved 1 packages"));
}

#[test]
fn test_deps_why_json() {
    let tmp = fixture();

    debtree_cmd()
        .args(["deps", "-r", "--why", "python", "--format", "json", "--dir"])
        .arg(tmp.path())
        .arg("python-debtools")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"python-stdeb\": []"))
        .stdout(predicate::str::contains("\"op\": \">=\""));
}

#[test]
fn test_deps_json() {
    let tmp = fixture();

    debtree_cmd()
        .args(["deps", "--format", "json", "--dir"])
        .arg(tmp.path())
        .arg("python-stdeb")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"python-stdeb\""))
        .stdout(predicate::str::contains("\"python\": []"));
}

#[cfg(unix)]
#[test]
fn test_deps_failed_download() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("config.toml");
    std::fs::write(
        &config,
        "[fetch]\ncommand = [\"sh\", \"-c\", \"echo 'E: Unable to locate package' >&2; exit 100\"]\n",
    )
    .unwrap();

    debtree_cmd()
        .arg("--config")
        .arg(&config)
        .args(["deps", "--dir"])
        .arg(tmp.path())
        .arg("nosuchpkg")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Package 'nosuchpkg' is unavailable"));
}

#[test]
fn test_deps_local_file_argument() {
    let tmp = fixture();
    let deb = tmp.path().join("python-stdeb_0.8.5_all.deb");

    debtree_cmd()
        .arg("deps")
        .arg(&deb)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("python-stdeb\n"));
}

#[test]
fn test_deps_without_packages_fails() {
    debtree_cmd().arg("deps").assert().failure();
}
