use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const STATEMENT: &str = "\
BANCO EXEMPLO S.A. - EXTRATO
01/03/2024   0012 DEB ISSQN   45,10D
01/03/2024   SALDO DO DIA   9.000,00C
02/03/2024   DP DIN LOT   1.800,00 C
03/03/2024   TARIFA AVULSA   9,90D
";

fn genesis(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("genesis").unwrap();
    cmd.env("HOME", home).env_remove("GENESIS_LOG");
    cmd
}

fn write_settings(home: &Path, json: &str) {
    let dir = home.join(".config").join("genesis");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("settings.json"), json).unwrap();
}

fn write_workbook(path: &Path, rows: &[&[&str]]) {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            sheet.write_string(r as u32, c as u16, *value).unwrap();
        }
    }
    workbook.save(path).unwrap();
}

#[test]
fn parse_with_embedded_codes_writes_outputs() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("out");
    let text = home.path().join("marco.txt");
    std::fs::write(&text, STATEMENT).unwrap();

    genesis(home.path())
        .args(["parse", text.to_str().unwrap(), "--embedded-codes", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("DEB ISSQN"))
        .stdout(predicate::str::contains("3 record(s), 2 classified, 1 line(s) ignored"))
        .stdout(predicate::str::contains("TARIFA AVULSA"));

    let entries: Vec<_> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 2);
    let txt = entries
        .iter()
        .find(|p| p.extension().is_some_and(|e| e == "txt"))
        .unwrap();
    assert!(txt
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("marco_"));
    let content = std::fs::read_to_string(txt).unwrap();
    assert_eq!(
        content,
        "01/03/2024;9;215;45,10;10;DEB ISSQN;1;;;\n\
         02/03/2024;9;289;1.800,00;10;DP DIN LOT;1;;;\n\
         03/03/2024;0;0;9,90;0;TARIFA AVULSA;1;;;\n"
    );

    let log = std::fs::read_to_string(home.path().join(".config/genesis/processing.log")).unwrap();
    assert!(log.contains("WARN"));
    assert!(log.contains("BANCO EXEMPLO"));
}

#[test]
fn parse_without_reference_table_fails() {
    let home = tempfile::tempdir().unwrap();
    let text = home.path().join("page.txt");
    std::fs::write(&text, STATEMENT).unwrap();

    genesis(home.path())
        .args(["parse", text.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No reference table configured"));
}

#[test]
fn parse_with_reference_workbook() {
    let home = tempfile::tempdir().unwrap();
    let base = home.path().join("base.xlsx");
    write_workbook(&base, &[
        &["Histórico", "Cód. Conta Debito", "Cód. Conta Credito", "Cód. Histórico"],
        &["tarifa avulsa", "101", "202", "303"],
    ]);
    let text = home.path().join("page.txt");
    std::fs::write(&text, STATEMENT).unwrap();

    genesis(home.path())
        .args(["parse", text.to_str().unwrap(), "--reference-table", base.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("303"))
        .stdout(predicate::str::contains("3 record(s), 1 classified"));
}

#[test]
fn check_table_reports_missing_columns() {
    let home = tempfile::tempdir().unwrap();
    let base = home.path().join("base.xlsx");
    write_workbook(&base, &[&["Histórico", "Cód. Histórico"], &["TARIFA", "10"]]);

    genesis(home.path())
        .args(["check-table", base.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cód. Conta Debito, Cód. Conta Credito"));
}

#[test]
fn convert_rewrites_workbook() {
    let home = tempfile::tempdir().unwrap();
    let input = home.path().join("extrato.xlsx");
    let output = home.path().join("convertido.xlsx");
    write_workbook(&input, &[
        &["01/03/2024", "PAGAMENTO", "1.500,00D"],
        &["02/03/2024", "DEPOSITO", "800,00C"],
    ]);

    genesis(home.path())
        .args(["convert", input.to_str().unwrap(), "--output", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 row(s), 2 amount(s) converted"));
    assert!(output.exists());
}

#[test]
fn process_continues_past_failing_files() {
    let home = tempfile::tempdir().unwrap();
    write_settings(
        home.path(),
        r#"{"raster_tool_path": "/nonexistent/pdftoppm", "ocr_binary_path": "/nonexistent/tesseract", "code_source": "embedded"}"#,
    );
    let out = home.path().join("out");

    genesis(home.path())
        .args(["process", "a.pdf", "b.pdf", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("File 1/2: error processing a.pdf"))
        .stdout(predicate::str::contains("File 2/2: error processing b.pdf"))
        .stdout(predicate::str::contains("0 processed, 2 failed"));
    assert!(out.is_dir());
}

#[test]
fn status_shows_missing_tools() {
    let home = tempfile::tempdir().unwrap();
    write_settings(home.path(), r#"{"ocr_binary_path": "/nonexistent/tesseract"}"#);

    genesis(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("/nonexistent/tesseract"))
        .stdout(predicate::str::contains("missing"));
}
