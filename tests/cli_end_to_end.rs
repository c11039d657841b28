use assert_cmd::Command;
use predicates::str::contains;

const CONTENT_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/content");
const INTRO_ANCHOR: &str = "24601bcaae6e170b381367ec4f4475786c6dbef5e8332f8903779c76d298d304";

fn quire() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("quire"));
    cmd.env_remove("QUIRE_CONFIG_FILE").env("RUST_LOG", "error");
    cmd
}

#[test]
fn render_prints_page_json() {
    let assert = quire()
        .args(["render", "tech", "intro", "--store-root", CONTENT_ROOT])
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let page: serde_json::Value = serde_json::from_str(&output).expect("json output");
    assert_eq!(page["title"], "Getting started");
    assert_eq!(page["toc"][0]["anchor"], INTRO_ANCHOR);
}

#[test]
fn render_html_format() {
    quire()
        .args([
            "render",
            "tech",
            "intro",
            "--format",
            "html",
            "--store-root",
            CONTENT_ROOT,
        ])
        .assert()
        .success()
        .stdout(contains(format!("<h2 id=\"{INTRO_ANCHOR}\">Intro</h2>")));
}

#[test]
fn toc_prints_nested_entries() {
    let assert = quire()
        .args(["toc", "tech", "intro", "--store-root", CONTENT_ROOT])
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let toc: serde_json::Value = serde_json::from_str(&output).expect("json output");
    assert_eq!(toc[0]["text"], "Intro");
    assert_eq!(toc[0]["children"][0]["text"], "Setup");
}

#[test]
fn render_file_accepts_bare_documents() {
    let file = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/bare_document.json");
    quire()
        .args(["render-file", file, "--format", "html"])
        .assert()
        .success()
        .stdout(contains(
            "<a href=\"https://example.com/page\" rel=\"noopener noreferrer\" \
             data-link-kind=\"external\">the page</a>",
        ));
}

#[test]
fn missing_article_exits_with_not_found_status() {
    quire()
        .args(["render", "tech", "missing", "--store-root", CONTENT_ROOT])
        .assert()
        .code(2);
}

#[test]
fn invalid_timezone_is_a_configuration_error() {
    quire()
        .args([
            "render",
            "tech",
            "intro",
            "--store-root",
            CONTENT_ROOT,
            "--render-timezone",
            "Mars/Olympus",
        ])
        .assert()
        .code(78);
}

#[test]
fn invalid_document_exits_with_data_error_status() {
    let file = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/invalid_document.json");
    quire()
        .args(["render-file", file])
        .assert()
        .code(65)
        .stderr(contains("missing required field `url`"));
}

#[test]
fn environment_sets_toc_levels() {
    let assert = quire()
        .env("QUIRE__RENDER__TOC_LEVELS", "2")
        .args(["toc", "tech", "intro", "--store-root", CONTENT_ROOT])
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let toc: serde_json::Value = serde_json::from_str(&output).expect("json output");
    assert_eq!(toc[0]["text"], "Intro");
    assert!(toc[0]["children"].as_array().is_some_and(Vec::is_empty));
}
