use assert_cmd::Command;
use assert_fs::prelude::*;
use family_ledger::{cli::SCRIPT_ENV, utils::paths::HOME_ENV};
use predicates::str::contains;

fn script(home: &assert_fs::TempDir, input: String) -> assert_cmd::assert::Assert {
    Command::cargo_bin("family_ledger_cli")
        .unwrap()
        .env(SCRIPT_ENV, "1")
        .env(HOME_ENV, home.path())
        .env("NO_COLOR", "1")
        .write_stdin(input)
        .assert()
}

#[test]
fn script_mode_runs_household_month() {
    let home = assert_fs::TempDir::new().unwrap();
    let export = home.child("export.json");
    let input = format!(
        "# March household\n\
         month 2025-03\n\
         base 2000 1500 0\n\
         income add 2025-03-05 300 Bonus\n\
         fixed add Rent 800\n\
         fixed add \"Car loan\" 150 loans 2025-02\n\
         expense add 2025-03-10 Food 50 Market\n\
         envelope add Food 55\n\
         goal add Holidays 1000 400\n\
         summary\n\
         export {}\n\
         exit\n",
        export.path().display()
    );

    script(&home, input)
        .success()
        .stdout(contains("March 2025 (2025-03)"))
        .stdout(contains("3.800,00 EUR"))
        .stdout(contains("2.950,00 EUR"))
        .stdout(contains("near limit"))
        .stdout(contains("Holidays"));

    home.child("ledger.json").assert(contains("\"Holidays\""));
    export.assert(contains("\"ingresosPuntuales\""));
}

#[test]
fn failing_commands_do_not_stop_the_script() {
    let home = assert_fs::TempDir::new().unwrap();
    let input = "expense add 2025-13-45 Food 5\n\
                 expense add 2025-03-01 Food abc\n\
                 sumary\n\
                 envelope add Fuel 40\n\
                 envelope list\n"
        .to_string();

    script(&home, input)
        .success()
        .stdout(contains("[x]"))
        .stdout(contains("`abc` is not a valid amount"))
        .stdout(contains("Did you mean `summary`?"))
        .stdout(contains("Fuel"));
}

#[test]
fn csv_import_and_config_changes_apply() {
    let home = assert_fs::TempDir::new().unwrap();
    let statement = home.child("statement.csv");
    statement
        .write_str("fecha;categoria;importe\n2025-03-01;Food;12,50\n2025-03-02;Fuel;40\n")
        .unwrap();
    let input = format!(
        "config set currency USD\n\
         config set locale en-US\n\
         month 2025-03\n\
         import-csv {} overwrite\n\
         expense list\n\
         categories\n\
         config show\n",
        statement.path().display()
    );

    script(&home, input)
        .success()
        .stdout(contains("Imported 2 expense(s)"))
        .stdout(contains("52.50 USD"))
        .stdout(contains("Fuel"));

    home.child("config.json").assert(contains("\"USD\""));
}

#[test]
fn backup_and_restore_commands() {
    let home = assert_fs::TempDir::new().unwrap();
    let input = "goal add Bike 500\n\
                 backup create before reset\n\
                 reset\n\
                 goal list\n\
                 backup list\n"
        .to_string();

    script(&home, input)
        .success()
        .stdout(contains("Backup written"))
        .stdout(contains("All data deleted."))
        .stdout(contains("No savings goals."))
        .stdout(contains("_before-reset.json"));
}

#[test]
fn unknown_ids_report_the_record_kind() {
    let home = assert_fs::TempDir::new().unwrap();
    let input = "goal deposit zzz 10\n\
                 envelope remove zzz\n\
                 fixed end zzz none\n"
        .to_string();

    script(&home, input)
        .success()
        .stdout(contains("Savings goal not found: zzz"))
        .stdout(contains("Envelope not found: zzz"))
        .stdout(contains("Fixed expense not found: zzz"));
}
