// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

use super::{
    write_temp_file, StateFolder, StoreError, WriteDurability, HISTORY_FILENAME,
    LIBRARY_FILENAME,
};
use crate::bridge::{Artifact, ArtifactSink};
use crate::model::history::VersionLog;
use crate::model::library::{NodeLibrary, SavedCell};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("nereid-drawio-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

struct StateFolderTestCtx {
    _tmp: TempDir,
    state_dir: std::path::PathBuf,
    folder: StateFolder,
}

impl StateFolderTestCtx {
    fn new(prefix: &str) -> Self {
        let tmp = TempDir::new(prefix);
        // Not created up front: the first save must create it.
        let state_dir = tmp.path().join("state");
        let folder = StateFolder::new(&state_dir);
        Self { _tmp: tmp, state_dir, folder }
    }
}

#[fixture]
fn ctx() -> StateFolderTestCtx {
    StateFolderTestCtx::new("state-folder")
}

fn saved(id: &str, name: &str) -> SavedCell {
    let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).single().unwrap();
    SavedCell::new(id.parse().unwrap(), name, format!(r#"<mxCell id="{id}"/>"#), at)
}

#[rstest]
fn missing_blobs_load_as_empty(ctx: StateFolderTestCtx) {
    assert!(ctx.folder.load_history(20).unwrap().is_empty());
    assert!(ctx.folder.load_library().unwrap().is_empty());
    assert!(!ctx.state_dir.exists());
}

#[rstest]
fn history_round_trips_as_svg_xml_pairs(ctx: StateFolderTestCtx) {
    let mut history = VersionLog::new(20);
    history.append("data:image/svg+xml;base64,AAA", "<mxfile/>");
    history.append("data:image/svg+xml;base64,BBB", "<root/>");

    ctx.folder.save_history(&history).unwrap();

    let text = std::fs::read_to_string(ctx.state_dir.join(HISTORY_FILENAME)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json[0]["svg"], "data:image/svg+xml;base64,AAA");
    assert_eq!(json[1]["xml"], "<root/>");
    assert_eq!(json[0].as_object().unwrap().len(), 2);

    let loaded = ctx.folder.load_history(20).unwrap();
    let pairs = loaded
        .iter()
        .map(|v| (v.preview(), v.document_text()))
        .collect::<Vec<_>>();
    assert_eq!(
        pairs,
        vec![
            ("data:image/svg+xml;base64,AAA", "<mxfile/>"),
            ("data:image/svg+xml;base64,BBB", "<root/>"),
        ]
    );
}

#[rstest]
fn library_round_trips_with_camel_case_timestamp(ctx: StateFolderTestCtx) {
    let mut library = NodeLibrary::new();
    library.insert_all([saved("a", "Start"), saved("b", "End")]);

    ctx.folder.save_library(&library).unwrap();

    let text = std::fs::read_to_string(ctx.state_dir.join(LIBRARY_FILENAME)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json[0]["id"], "a");
    assert_eq!(json[0]["name"], "Start");
    assert!(json[0]["savedAt"].as_str().unwrap().starts_with("2026-03-04T05:06:07"));

    assert_eq!(ctx.folder.load_library().unwrap(), library);
}

#[rstest]
fn reads_timestamps_written_by_browsers(ctx: StateFolderTestCtx) {
    std::fs::create_dir_all(&ctx.state_dir).unwrap();
    std::fs::write(
        ctx.state_dir.join(LIBRARY_FILENAME),
        r#"[{"id":"n1","name":"Node","xml":"<mxCell id=\"n1\"/>","savedAt":"2025-11-02T10:20:30.456Z"}]"#,
    )
    .unwrap();

    let library = ctx.folder.load_library().unwrap();
    let cell = library.get("n1").unwrap();
    assert_eq!(cell.name(), "Node");
    assert_eq!(cell.saved_at().timestamp_millis(), 1_762_078_830_456);
}

#[rstest]
#[case(HISTORY_FILENAME, "{ not json")]
#[case(HISTORY_FILENAME, r#"[{"svg": 1}]"#)]
#[case(LIBRARY_FILENAME, r#"[{"id":"","name":"x","xml":"","savedAt":"2025-01-01T00:00:00Z"}]"#)]
#[case(LIBRARY_FILENAME, r#"[{"id":"a","name":"x","xml":"","savedAt":"yesterday"}]"#)]
fn corrupt_blobs_are_errors_but_load_leniently_as_empty(
    ctx: StateFolderTestCtx,
    #[case] file_name: &str,
    #[case] contents: &str,
) {
    std::fs::create_dir_all(&ctx.state_dir).unwrap();
    std::fs::write(ctx.state_dir.join(file_name), contents).unwrap();

    if file_name == HISTORY_FILENAME {
        assert!(matches!(
            ctx.folder.load_history(20),
            Err(StoreError::Corrupt { .. })
        ));
        assert!(ctx.folder.load_history_lenient(20).is_empty());
    } else {
        assert!(matches!(
            ctx.folder.load_library(),
            Err(StoreError::Corrupt { .. })
        ));
        assert!(ctx.folder.load_library_lenient().is_empty());
    }
}

#[rstest]
fn durable_writes_produce_the_same_files(ctx: StateFolderTestCtx) {
    let folder = ctx.folder.clone().with_durability(WriteDurability::Durable);
    assert_eq!(folder.durability(), WriteDurability::Durable);

    let mut history = VersionLog::new(2);
    history.append("p", "x");
    folder.save_history(&history).unwrap();

    assert_eq!(ctx.folder.load_history(2).unwrap().len(), 1);
    let leftovers = std::fs::read_dir(&ctx.state_dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
        .count();
    assert_eq!(leftovers, 0);
}

#[rstest]
fn artifacts_land_in_exports_dir(ctx: StateFolderTestCtx) {
    let mut sink = ctx.folder.clone();
    sink.deliver(Artifact {
        file_name: "diagram.png".to_owned(),
        media_type: "image/png",
        bytes: vec![0x89, b'P', b'N', b'G'],
    })
    .unwrap();

    let written = std::fs::read(ctx.folder.exports_dir().join("diagram.png")).unwrap();
    assert_eq!(written, vec![0x89, b'P', b'N', b'G']);
}

#[rstest]
#[case("../escape.xml")]
#[case("nested/name.xml")]
#[case("")]
#[case("..")]
fn export_names_must_be_plain_file_names(ctx: StateFolderTestCtx, #[case] name: &str) {
    assert!(matches!(
        ctx.folder.write_export(name, b"x"),
        Err(StoreError::InvalidFileName { .. })
    ));
}

#[cfg(unix)]
#[rstest]
fn refuses_to_write_through_symlink(ctx: StateFolderTestCtx) {
    std::fs::create_dir_all(&ctx.state_dir).unwrap();
    let target = ctx.state_dir.join("elsewhere.json");
    std::fs::write(&target, "[]").unwrap();
    std::os::unix::fs::symlink(&target, ctx.state_dir.join(HISTORY_FILENAME)).unwrap();

    let err = ctx.folder.save_history(&VersionLog::new(1)).unwrap_err();
    assert!(matches!(err, StoreError::SymlinkRefused { .. }));
}

#[rstest]
fn failed_temp_write_removes_the_temp_file(ctx: StateFolderTestCtx) {
    std::fs::create_dir_all(&ctx.state_dir).unwrap();
    let tmp_path = ctx.state_dir.join(".nereid-drawio.tmp.diagram-history.json.1");

    let err = write_temp_file(&tmp_path, |file| {
        std::io::Write::write_all(file, b"[")?;
        Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
    })
    .unwrap_err();

    assert!(matches!(err, StoreError::Io { ref path, .. } if path == &tmp_path));
    assert!(!tmp_path.exists());
    assert_eq!(std::fs::read_dir(&ctx.state_dir).unwrap().count(), 0);
}
