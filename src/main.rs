// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! nereid-drawio CLI entrypoint.
//!
//! Offline commands work on files and the state folder. `watch` speaks the embed protocol over
//! stdio: host messages in on stdin (one JSON object per line), surface commands out on stdout.

use std::error::Error;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, Mutex};
use tracing_subscriber::EnvFilter;

use nereid_drawio::bridge::{pump, ChannelSurface, EditorBridge, SurfaceEvent};
use nereid_drawio::config::EngineConfig;
use nereid_drawio::format::drawio::{convert_to_legal_xml, extract_node_by_id, extract_nodes};
use nereid_drawio::model::{Document, Session};
use nereid_drawio::ops;
use nereid_drawio::store::{StateFolder, WriteDurability};

const STATE_DIR_ENV: &str = "NEREID_DRAWIO_STATE";
const DEFAULT_STATE_DIR: &str = ".nereid-drawio";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--state <dir>] [--durable-writes] <command> [args]\n\nCommands:\n  sanitize <file>               repair a fragment and print it root-wrapped\n  merge <base> <fragment>       merge a fragment into a document and print the result\n  extract <file> [<id>]         print one cell, or every non-structural cell\n  delete <file> <id>            remove a cell with its descendants and attached edges\n  history list|clear            list or clear saved versions\n  history show|delete <index>   print or delete one version (0 = oldest)\n  library list|clear            list or clear saved nodes\n  library save <file>           save every non-structural cell of a document\n  library delete|export <id>    delete a saved node, or write it to <state>/exports\n  watch [<file>]                bridge a rendering surface over stdio\n\nThe state folder defaults to ${STATE_DIR_ENV}, then `{DEFAULT_STATE_DIR}`.\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\nLogging is controlled by RUST_LOG (default `warn`)."
    );
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HistoryCommand {
    List,
    Clear,
    Show(usize),
    Delete(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LibraryCommand {
    List,
    Clear,
    Save(String),
    Delete(String),
    Export(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Sanitize { file: String },
    Merge { base: String, fragment: String },
    Extract { file: String, id: Option<String> },
    Delete { file: String, id: String },
    History(HistoryCommand),
    Library(LibraryCommand),
    Watch { file: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    state_dir: Option<String>,
    durable_writes: bool,
    command: Command,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut state_dir = None;
    let mut durable_writes = false;

    let name = loop {
        let arg = args.next().ok_or(())?;
        match arg.as_str() {
            "--state" => {
                if state_dir.is_some() {
                    return Err(());
                }
                state_dir = Some(args.next().ok_or(())?);
            }
            "--durable-writes" => {
                if durable_writes {
                    return Err(());
                }
                durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => break arg,
        }
    };

    let rest = args.collect::<Vec<_>>();
    if rest.iter().any(|arg| arg.starts_with("--")) {
        return Err(());
    }
    let command = parse_command(&name, rest)?;

    Ok(CliOptions {
        state_dir,
        durable_writes,
        command,
    })
}

fn parse_command(name: &str, args: Vec<String>) -> Result<Command, ()> {
    let mut args = args.into_iter();
    let command = match name {
        "sanitize" => Command::Sanitize {
            file: args.next().ok_or(())?,
        },
        "merge" => Command::Merge {
            base: args.next().ok_or(())?,
            fragment: args.next().ok_or(())?,
        },
        "extract" => Command::Extract {
            file: args.next().ok_or(())?,
            id: args.next(),
        },
        "delete" => Command::Delete {
            file: args.next().ok_or(())?,
            id: args.next().ok_or(())?,
        },
        "history" => {
            let sub = args.next().ok_or(())?;
            Command::History(match sub.as_str() {
                "list" => HistoryCommand::List,
                "clear" => HistoryCommand::Clear,
                "show" => HistoryCommand::Show(parse_index(args.next())?),
                "delete" => HistoryCommand::Delete(parse_index(args.next())?),
                _ => return Err(()),
            })
        }
        "library" => {
            let sub = args.next().ok_or(())?;
            Command::Library(match sub.as_str() {
                "list" => LibraryCommand::List,
                "clear" => LibraryCommand::Clear,
                "save" => LibraryCommand::Save(args.next().ok_or(())?),
                "delete" => LibraryCommand::Delete(args.next().ok_or(())?),
                "export" => LibraryCommand::Export(args.next().ok_or(())?),
                _ => return Err(()),
            })
        }
        "watch" => Command::Watch { file: args.next() },
        _ => return Err(()),
    };

    if args.next().is_some() {
        return Err(());
    }
    Ok(command)
}

fn parse_index(raw: Option<String>) -> Result<usize, ()> {
    raw.ok_or(())?.parse().map_err(|_| ())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber installed by an embedding process wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn state_folder(options: &CliOptions) -> StateFolder {
    let dir = options
        .state_dir
        .clone()
        .or_else(|| std::env::var(STATE_DIR_ENV).ok().filter(|dir| !dir.is_empty()))
        .unwrap_or_else(|| DEFAULT_STATE_DIR.to_owned());
    let folder = StateFolder::new(dir);
    if options.durable_writes {
        folder.with_durability(WriteDurability::Durable)
    } else {
        folder
    }
}

fn read_file(path: &str) -> Result<String, Box<dyn Error>> {
    std::fs::read_to_string(path).map_err(|err| format!("cannot read {path}: {err}").into())
}

fn run(options: CliOptions) -> Result<(), Box<dyn Error>> {
    let folder = state_folder(&options);
    let config = EngineConfig::default().with_durability(folder.durability());

    match options.command {
        Command::Sanitize { file } => {
            println!("{}", convert_to_legal_xml(&read_file(&file)?)?);
        }
        Command::Merge { base, fragment } => {
            let fragment = convert_to_legal_xml(&read_file(&fragment)?)?;
            println!("{}", ops::replace_nodes(&read_file(&base)?, &fragment)?);
        }
        Command::Extract { file, id: Some(id) } => {
            let xml = extract_node_by_id(&read_file(&file)?, &id)
                .ok_or_else(|| format!("no cell with id {id} in {file}"))?;
            println!("{xml}");
        }
        Command::Extract { file, id: None } => {
            for node in extract_nodes(&read_file(&file)?)? {
                println!("{}\t{}", node.id, node.xml);
            }
        }
        Command::Delete { file, id } => {
            let mut document = Document::parse(&read_file(&file)?)?;
            let removed = ops::delete_cell(&mut document, &id)?;
            tracing::info!(removed = removed.len(), "deleted cells");
            println!("{}", document.to_xml());
        }
        Command::History(command) => run_history(command, Session::from_config(&config, Some(folder)))?,
        Command::Library(command) => run_library(command, Session::from_config(&config, Some(folder)))?,
        Command::Watch { file } => run_watch(config, folder, file)?,
    }
    Ok(())
}

fn run_history(command: HistoryCommand, mut session: Session) -> Result<(), Box<dyn Error>> {
    match command {
        HistoryCommand::List => {
            for (index, version) in session.history().iter().enumerate() {
                let cells = Document::parse(version.document_text())
                    .map(|document| document.non_structural_cells().count().to_string())
                    .unwrap_or_else(|_| "?".to_owned());
                println!("{index}\t#{}\t{cells} cells", version.sequence());
            }
        }
        HistoryCommand::Clear => session.clear_history()?,
        HistoryCommand::Show(index) => {
            let version = session
                .history()
                .get(index)
                .ok_or_else(|| format!("no history version at index {index}"))?;
            println!("{}", version.document_text());
        }
        HistoryCommand::Delete(index) => {
            session
                .delete_version(index)?
                .ok_or_else(|| format!("no history version at index {index}"))?;
        }
    }
    Ok(())
}

fn run_library(command: LibraryCommand, mut session: Session) -> Result<(), Box<dyn Error>> {
    match command {
        LibraryCommand::List => {
            for cell in session.library().iter() {
                println!(
                    "{}\t{}\t{}",
                    cell.id(),
                    cell.name(),
                    cell.saved_at().to_rfc3339_opts(SecondsFormat::Millis, true)
                );
            }
        }
        LibraryCommand::Clear => session.clear_library()?,
        LibraryCommand::Save(file) => {
            session.set_document_text(read_file(&file)?)?;
            let inserted = session.save_current_nodes(Utc::now())?;
            println!("saved {inserted} new node(s)");
        }
        LibraryCommand::Delete(id) => {
            session
                .remove_saved_node(&id)?
                .ok_or_else(|| format!("no saved node with id {id}"))?;
        }
        LibraryCommand::Export(id) => {
            let cell = session
                .library()
                .get(&id)
                .ok_or_else(|| format!("no saved node with id {id}"))?;
            let folder = session
                .folder()
                .ok_or("library export needs a state folder")?;
            let path = folder.write_export(&cell.export_file_name(), cell.xml().as_bytes())?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn run_watch(
    config: EngineConfig,
    folder: StateFolder,
    file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let initial = file.as_deref().map(read_file).transpose()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let (surface, mut commands) = ChannelSurface::new();
        let session = Session::from_config(&config, Some(folder.clone()));
        let mut bridge = EditorBridge::new(surface, session, config).with_sink(folder);

        if let Some(text) = initial {
            bridge.load_document(&text);
            // The reply is recorded by the pump; nobody waits on it here.
            let _ = bridge.request_export();
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let reader = async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                match SurfaceEvent::from_message(&line) {
                    Some(event) => {
                        if events_tx.send(event).is_err() {
                            break;
                        }
                    }
                    None => tracing::debug!(%line, "ignoring host message"),
                }
            }
            Ok::<(), std::io::Error>(())
        };
        let writer = async move {
            let mut stdout = tokio::io::stdout();
            while let Some(command) = commands.recv().await {
                stdout.write_all(command.to_message().as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        // The pump owns the only handle, so the surface (and the writer) close when it returns.
        let (read_result, handled, write_result) =
            tokio::join!(reader, pump(Arc::new(Mutex::new(bridge)), events_rx), writer);
        tracing::info!(handled, "surface closed");
        read_result?;
        write_result?;
        Ok::<(), Box<dyn Error>>(())
    })
}

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "nereid-drawio".to_owned());

    let options = match parse_options(args) {
        Ok(options) => options,
        Err(()) => {
            print_usage(&program);
            std::process::exit(2);
        }
    };

    init_tracing();

    if let Err(err) = run(options) {
        eprintln!("nereid-drawio: {err}");
        std::process::exit(1);
    }
}
