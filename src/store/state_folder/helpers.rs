// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// State folder persistence helpers: json conversion and safe filesystem writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryEntryJson {
    #[serde(default)]
    svg: String,
    xml: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedNodeJson {
    id: CellId,
    name: String,
    xml: String,
    saved_at: DateTime<Utc>,
}

fn history_to_json(history: &VersionLog) -> Vec<HistoryEntryJson> {
    history
        .iter()
        .map(|version| HistoryEntryJson {
            svg: version.preview().to_owned(),
            xml: version.document_text().to_owned(),
        })
        .collect()
}

fn history_from_json(capacity: usize, entries: Vec<HistoryEntryJson>) -> VersionLog {
    VersionLog::from_entries(
        capacity,
        entries.into_iter().map(|entry| (entry.svg, entry.xml)),
    )
}

fn library_to_json(library: &NodeLibrary) -> Vec<SavedNodeJson> {
    library
        .iter()
        .map(|cell| SavedNodeJson {
            id: cell.id().clone(),
            name: cell.name().to_owned(),
            xml: cell.xml().to_owned(),
            saved_at: cell.saved_at(),
        })
        .collect()
}

fn library_from_json(entries: Vec<SavedNodeJson>) -> NodeLibrary {
    NodeLibrary::from_cells(
        entries
            .into_iter()
            .map(|entry| SavedCell::new(entry.id, entry.name, entry.xml, entry.saved_at))
            .collect(),
    )
}

/// `Ok(None)` when the file does not exist.
fn read_json<T>(path: &Path) -> Result<Option<T>, StoreError>
where
    T: for<'de> Deserialize<'de>,
{
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize>(
    root: &Path,
    path: &Path,
    value: &T,
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(root, path, format!("{text}\n").as_bytes(), durability)
}

/// Export names are single path components; anything that could escape `exports/` is refused.
fn validate_file_name(name: &str) -> Result<(), StoreError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(StoreError::InvalidFileName {
            name: name.to_owned(),
        }),
    }
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

/// Creates `tmp_path` and fills it; the file is removed again when filling fails.
fn write_temp_file<F>(tmp_path: &Path, fill: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut fs::File) -> io::Result<()>,
{
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.to_path_buf(),
            source,
        })?;

    if let Err(source) = fill(&mut file) {
        drop(file);
        let _ = fs::remove_file(tmp_path);
        return Err(StoreError::Io {
            path: tmp_path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

fn write_atomic(
    root: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, "path has no parent"),
        });
    };
    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, "path has no file name"),
        });
    };

    fs::create_dir_all(root).map_err(|source| StoreError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    fs::create_dir_all(parent).map_err(|source| StoreError::Io {
        path: parent.to_path_buf(),
        source,
    })?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".nereid-drawio.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    write_temp_file(&tmp_path, |file| {
        file.write_all(contents)?;
        if durability == WriteDurability::Durable {
            file.sync_all()?;
        }
        Ok(())
    })?;

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}
