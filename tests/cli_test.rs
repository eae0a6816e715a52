// tests/cli_test.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

// 辅助函数，避免重复
fn main_command() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

#[test]
fn test_help_flag() {
    let mut cmd = main_command();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("显示此帮助信息并退出"))
        .stdout(predicate::str::contains("--workers"));
}

#[test]
fn test_list_mode_prints_links_from_text() {
    let mut cmd = main_command();
    cmd.args([
        "--list",
        "--text",
        "Check this: https://disk.yandex.ru/d/xyz, and also https://yadi.sk/d/abc.",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("识别到 2 个链接"))
        .stdout(predicate::str::contains("https://disk.yandex.ru/d/xyz"))
        .stdout(predicate::str::contains("https://yadi.sk/d/abc"));
}

#[test]
fn test_list_mode_reads_html_file() {
    let tmp = tempdir().unwrap();
    let page = tmp.path().join("page.html");
    fs::write(
        &page,
        r#"<p><a href="https://disk.yandex.com/i/photo&amp;x=1">photo</a> <a href="https://example.com/">other</a></p>"#,
    )
    .unwrap();

    let mut cmd = main_command();
    cmd.arg("-l").arg(&page);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("https://disk.yandex.com/i/photo&x=1"))
        .stdout(predicate::str::contains("example.com").not());
}

#[test]
fn test_list_mode_reads_stdin() {
    let mut cmd = main_command();
    cmd.arg("-l").write_stdin("see [file](https://yadi.sk/d/fromstdin)\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("https://yadi.sk/d/fromstdin"));
}

#[test]
fn test_no_links_is_an_error() {
    let mut cmd = main_command();
    cmd.args(["--text", "nothing to see here https://example.com/page"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("未在输入中找到任何 Yandex.Disk 链接"));
}

#[test]
fn test_unsupported_input_file_is_rejected() {
    let tmp = tempdir().unwrap();
    let doc = tmp.path().join("links.pdf");
    fs::write(&doc, "https://yadi.sk/d/abc").unwrap();

    let mut cmd = main_command();
    cmd.arg("-l").arg(&doc);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("不支持的文件类型"));
}

#[test]
fn test_workers_must_be_a_number() {
    let mut cmd = main_command();
    cmd.args(["-l", "-w", "many", "--text", "https://yadi.sk/d/abc"]);
    cmd.assert().failure();
}
