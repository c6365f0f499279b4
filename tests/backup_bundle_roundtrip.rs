
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir};

/// Copies a bundle zip entry by entry, passing one named entry through a
/// rewrite function. Used to build corrupted bundles from a genuine export.
fn rewrite_bundle(src: &Path, dst: &Path, entry_name: &str, rewrite: impl Fn(Vec<u8>) -> Vec<u8>) {
    let mut archive = zip::ZipArchive::new(File::open(src).unwrap()).unwrap();
    let mut out = zip::ZipWriter::new(File::create(dst).unwrap());
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let name = entry.name().to_string();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        if name == entry_name {
            bytes = rewrite(bytes);
        }
        out.start_file(name, zip::write::FileOptions::default()).unwrap();
        out.write_all(&bytes).unwrap();
    }
    out.finish().unwrap();
}

#[test]
fn export_then_import_into_fresh_workspace() {
    let source = temp_dir("rosterd-bundle-src");
    let target = temp_dir("rosterd-bundle-dst");
    let bundle = source.join("out").join("roster.rosterbundle");

    let (_child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": source.to_string_lossy() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "persons.add",
        json!({ "name": "Alice Pauline" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "lessons.schedule",
        json!({
            "person": 1,
            "start": "14:00",
            "end": "15:00",
            "date": "2025-09-20",
            "subject": "Maths"
        }),
    );

    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "backup.export",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(exported["bundleFormat"], "rosterd-bundle-v1");
    assert_eq!(exported["entryCount"], 3);
    let exported_sha = exported["rosterSha256"].as_str().unwrap().to_string();

    // switch to an empty workspace and pull the bundle in
    request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "workspace.select",
        json!({ "path": target.to_string_lossy() }),
    );
    let imported = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "backup.import",
        json!({ "inPath": bundle.to_string_lossy() }),
    );
    assert_eq!(imported["bundleFormatDetected"], "rosterd-bundle-v1");
    assert_eq!(imported["rosterSha256"], exported_sha.as_str());
    assert_eq!(imported["personCount"], 1);

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "lessons.list",
        json!({ "person": 1 }),
    );
    assert_eq!(listed["lessonCount"], 1);
    assert_eq!(listed["lessons"][0]["subject"], "Maths");
}

#[test]
fn import_rejects_tampered_roster_payload() {
    let source = temp_dir("rosterd-bundle-tamper-src");
    let target = temp_dir("rosterd-bundle-tamper-dst");
    let bundle = source.join("out").join("roster.rosterbundle");
    let tampered = source.join("out").join("tampered.rosterbundle");

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": source.to_string_lossy() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "persons.add",
        json!({ "name": "Alice Pauline" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "backup.export",
        json!({ "outPath": bundle.to_string_lossy() }),
    );

    // edit the roster payload but keep the original manifest and its digest
    rewrite_bundle(&bundle, &tampered, "data/roster.json", |bytes| {
        String::from_utf8(bytes)
            .unwrap()
            .replace("Alice Pauline", "Mallory")
            .into_bytes()
    });

    request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "workspace.select",
        json!({ "path": target.to_string_lossy() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "persons.add",
        json!({ "name": "Benson Meier" }),
    );
    let code = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "backup.import",
        json!({ "inPath": tampered.to_string_lossy() }),
    );
    assert_eq!(code, "import_failed");

    // the committed roster is untouched, in memory and on disk
    let listed = request_ok(&mut stdin, &mut reader, "7", "persons.list", json!({}));
    assert_eq!(listed["personCount"], 1);
    assert_eq!(listed["persons"][0]["name"], "Benson Meier");
    request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "workspace.select",
        json!({ "path": target.to_string_lossy() }),
    );
    let reloaded = request_ok(&mut stdin, &mut reader, "9", "persons.list", json!({}));
    assert_eq!(reloaded["persons"][0]["name"], "Benson Meier");
}

#[test]
fn import_rejects_unknown_bundle_format_tag() {
    let workspace = temp_dir("rosterd-bundle-format");
    let bundle = workspace.join("out").join("roster.rosterbundle");
    let mislabeled = workspace.join("out").join("mislabeled.rosterbundle");

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "persons.add",
        json!({ "name": "Alice Pauline" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "backup.export",
        json!({ "outPath": bundle.to_string_lossy() }),
    );

    rewrite_bundle(&bundle, &mislabeled, "manifest.json", |bytes| {
        let mut manifest: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        manifest["format"] = json!("rosterd-bundle-v999");
        serde_json::to_vec_pretty(&manifest).unwrap()
    });

    let code = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "backup.import",
        json!({ "inPath": mislabeled.to_string_lossy() }),
    );
    assert_eq!(code, "import_failed");
}

#[test]
fn import_rejects_non_bundle_files() {
    let workspace = temp_dir("rosterd-bundle-bad");
    let not_a_bundle = workspace.join("notes.txt");
    std::fs::write(&not_a_bundle, "hello").unwrap();

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let code = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "backup.import",
        json!({ "inPath": not_a_bundle.to_string_lossy() }),
    );
    assert_eq!(code, "import_failed");
}

#[test]
fn export_without_roster_fails() {
    let workspace = temp_dir("rosterd-bundle-empty");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    // no mutation has happened, so no roster.json exists yet
    let code = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "backup.export",
        json!({ "outPath": workspace.join("out.zip").to_string_lossy() }),
    );
    assert_eq!(code, "export_failed");
}
