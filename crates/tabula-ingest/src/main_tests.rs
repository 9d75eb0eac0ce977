//! Tests for argument handling in the `tabula` binary.

use super::*;
use std::io::Write;

fn load_args(extra: &[&str]) -> LoadArgs {
    let mut argv = vec!["tabula", "inspect", "data.csv"];
    argv.extend_from_slice(extra);
    match Cli::try_parse_from(argv).expect("parse").command {
        Commands::Inspect { load, .. } => load,
        _ => unreachable!("inspect subcommand"),
    }
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("tempfile");
    writeln!(file, "{contents}").expect("write");
    file
}

#[test]
fn test_inference_is_on_without_config() {
    let options =
        load_options(Path::new("/nonexistent/tabula-test.toml"), &load_args(&[])).expect("options");

    assert!(options.infer_types);
}

#[test]
fn test_config_can_turn_inference_off() {
    let file = config_file("[load]\ninfer_types = false");

    let options = load_options(file.path(), &load_args(&[])).expect("options");

    assert!(!options.infer_types);
}

#[test]
fn test_raw_strings_flag_turns_inference_off() {
    let file = config_file("[load]\ninfer_types = true");

    let options = load_options(file.path(), &load_args(&["--raw-strings"])).expect("options");

    assert!(!options.infer_types);
}

#[test]
fn test_apply_leaves_unset_options_alone() {
    let mut options = LoadOptions {
        infer_types: false,
        use_threading: true,
        ..LoadOptions::default()
    };

    load_args(&[]).apply(&mut options);

    assert!(!options.infer_types);
    assert!(options.use_threading);
    assert_eq!(options.file_format, FileFormat::Auto);
}

#[test]
fn test_export_has_no_sort_flag() {
    let result = Cli::try_parse_from([
        "tabula", "export", "data.csv", "-o", "out.csv", "--sort", "age",
    ]);
    assert!(result.is_err());

    let cli = Cli::try_parse_from(["tabula", "export", "data.csv", "-o", "out.csv", "-f", "age > 3"])
        .expect("parse");
    assert!(matches!(cli.command, Commands::Export { filter: Some(_), .. }));
}
