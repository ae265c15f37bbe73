//! End-to-end coverage driving the public `tlc::generate` entry point
//! against real temp files rather than any single module in isolation.

use std::fs;

use tlc::config::Scheme;
use tlc::{GenerateOptions, generate};

fn schema(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

// S1: a plain schema with boxed constructors compiles to a model file
// containing one struct per constructor and an enum for the shared
// abstract type.
#[test]
fn s1_basic_schema_produces_structs_and_an_enum() {
    let dir = tempfile::tempdir().unwrap();
    let input = schema(
        dir.path(),
        "scheme.tl",
        "boolTrue#997275b5 = Bool;\nboolFalse#bc799737 = Bool;\n",
    );
    let stem = dir.path().join("out/generated");

    let report = generate(
        &[input],
        &stem,
        &Scheme::default(),
        &GenerateOptions { strict_crc: false },
    )
    .unwrap();

    assert_eq!(report.warnings.total(), 0);
    let text = fs::read_to_string(tlc::output::output_path(&stem, ".rs")).unwrap();
    assert!(text.contains("pub struct BoolTrue"));
    assert!(text.contains("pub struct BoolFalse"));
    assert!(text.contains("pub enum Bool"));
}

// S2: methods under ---functions--- get RemoteCall impls with the right
// response type.
#[test]
fn s2_rpc_methods_get_remote_call_impls() {
    let dir = tempfile::tempdir().unwrap();
    let input = schema(
        dir.path(),
        "scheme.tl",
        "pong msg_id:long ping_id:long = Pong;\n---functions---\nping ping_id:long = Pong;\n",
    );
    let stem = dir.path().join("generated");

    generate(&[input], &stem, &Scheme::default(), &GenerateOptions { strict_crc: false }).unwrap();

    let text = fs::read_to_string(tlc::output::output_path(&stem, ".rs")).unwrap();
    assert!(text.contains("impl tl_runtime::RemoteCall for Ping"));
    assert!(text.contains("type Response = Pong;"));
}

// S3: a CRC mismatch not covered by typeIdExceptions is dropped with a
// warning, and the rest of the schema still compiles.
#[test]
fn s3_unexempted_crc_mismatch_warns_and_drops_the_declaration() {
    let dir = tempfile::tempdir().unwrap();
    let input = schema(
        dir.path(),
        "scheme.tl",
        "boolTrue#deadbeef = Bool;\nboolFalse#bc799737 = Bool;\n",
    );
    let stem = dir.path().join("generated");

    let report = generate(&[input], &stem, &Scheme::default(), &GenerateOptions { strict_crc: false }).unwrap();

    assert_eq!(report.warnings.crc_mismatches, 1);
    let text = fs::read_to_string(tlc::output::output_path(&stem, ".rs")).unwrap();
    assert!(!text.contains("BoolTrue"));
    assert!(text.contains("BoolFalse"));
}

// S4: the same mismatch is fatal once --strict-crc is requested.
#[test]
fn s4_strict_crc_turns_the_mismatch_into_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = schema(dir.path(), "scheme.tl", "boolTrue#deadbeef = Bool;\n");
    let stem = dir.path().join("generated");

    let err = generate(&[input], &stem, &Scheme::default(), &GenerateOptions { strict_crc: true }).unwrap_err();
    assert!(matches!(err, tlc::GenError::Semantic { .. }));
}

// S5: a field documented as "for bots only" is dropped from the emitted
// struct, and a declaration whose own doc-comment says the same is
// skipped entirely.
#[test]
fn s5_bots_only_tags_are_honored() {
    let dir = tempfile::tempdir().unwrap();
    let input = schema(
        dir.path(),
        "scheme.tl",
        "// @description Internal bot helper ; for bots only.\nsecretHelper = Helper;\nhelperWithSecret secret:string = Helper;\n",
    );
    let stem = dir.path().join("generated");

    generate(&[input], &stem, &Scheme::default(), &GenerateOptions { strict_crc: false }).unwrap();

    let text = fs::read_to_string(tlc::output::output_path(&stem, ".rs")).unwrap();
    assert!(!text.contains("SecretHelper"));
    assert!(text.contains("HelperWithSecret"));
}

// S6: re-running the pipeline over byte-identical input is idempotent: no
// file is rewritten, but the timestamp sentinel is always touched.
#[test]
fn s6_rerunning_over_unchanged_input_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let input = schema(dir.path(), "scheme.tl", "boolTrue#997275b5 = Bool;\n");
    let stem = dir.path().join("generated");
    let opts = GenerateOptions { strict_crc: false };

    let first = generate(&[input.clone()], &stem, &Scheme::default(), &opts).unwrap();
    assert_eq!(first.written.len(), 1);

    let model_path = tlc::output::output_path(&stem, ".rs");
    let modified_before = fs::metadata(&model_path).unwrap().modified().unwrap();

    let second = generate(&[input], &stem, &Scheme::default(), &opts).unwrap();
    assert!(second.written.is_empty());
    let modified_after = fs::metadata(&model_path).unwrap().modified().unwrap();
    assert_eq!(modified_before, modified_after);
    assert!(tlc::output::output_path(&stem, ".timestamp").exists());
}

#[test]
fn layer_directive_is_threaded_through_to_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = schema(dir.path(), "scheme.tl", "// LAYER 181\nboolTrue#997275b5 = Bool;\n");
    let stem = dir.path().join("generated");

    let report = generate(&[input], &stem, &Scheme::default(), &GenerateOptions { strict_crc: false }).unwrap();
    assert_eq!(report.layer, 181);
}
