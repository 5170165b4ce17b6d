use crate::{
    app::App,
    config::{self, AppConfig, Language},
    game::{Game, GameTitleOutcome},
    library::{split_list, Mod, ModDraft, ModOrder},
    logging::{self, Verbosity},
    reconcile::{self, AddOutcome, RefreshOutcome, SaveOutcome, SaveRejection},
    relations::{self, Highlight, HighlightMode},
};
use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "json" => Some(OutputFormat::Json),
            "text" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct GlobalOptions {
    format: OutputFormat,
    database: Option<PathBuf>,
    verbosity: Verbosity,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            database: None,
            verbosity: Verbosity::Normal,
        }
    }
}

#[derive(Debug, PartialEq)]
enum CliCommand {
    GamesList,
    GamesAdd(String),
    GamesRename { old: String, new: String },
    GamesDelete(String),
    ModsList { game: String, order: ModOrder },
    ModsAdd { game: String, descriptor: PathBuf },
    ModsNew { game: String, edits: ModEdits },
    ModsImport { game: String, folder: PathBuf },
    ModsEdit {
        game: String,
        title: String,
        at: Option<PathBuf>,
        edits: ModEdits,
    },
    ModsRefresh { game: String, title: Option<String> },
    ModsDelete {
        game: String,
        title: String,
        at: Option<PathBuf>,
    },
    Highlight { mode: HighlightMode, game: String, query: String },
    ConfigLanguage(Option<Language>),
    Paths,
    Help,
    Version,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ModEdits {
    title: Option<String>,
    tags: Option<String>,
    version: Option<String>,
    game_version: Option<String>,
    requires: Option<String>,
    incompatible: Option<String>,
    comment: Option<String>,
    path: Option<String>,
    image: Option<String>,
}

impl ModEdits {
    fn apply(&self, draft: &mut ModDraft) {
        if let Some(title) = &self.title {
            draft.title = title.clone();
        }
        if let Some(tags) = &self.tags {
            draft.tags = split_list(tags);
        }
        if let Some(version) = &self.version {
            draft.mod_version = version.clone();
        }
        if let Some(game_version) = &self.game_version {
            draft.supported_game_version = game_version.clone();
        }
        if let Some(requires) = &self.requires {
            draft.required_mods = split_list(requires);
        }
        if let Some(incompatible) = &self.incompatible {
            draft.incompatible_mods = split_list(incompatible);
        }
        if let Some(comment) = &self.comment {
            draft.commentary = comment.clone();
        }
        if let Some(path) = &self.path {
            draft.filepath = PathBuf::from(path);
        }
        if let Some(image) = &self.image {
            draft.image_path = if image.is_empty() {
                None
            } else {
                Some(PathBuf::from(image))
            };
        }
    }
}

pub fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, global) = parse_args(&args)?;
    logging::init(global.verbosity);
    match command {
        CliCommand::Help => {
            print_help();
            Ok(())
        }
        CliCommand::Version => {
            println!("modledger v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliCommand::ConfigLanguage(language) => configure_language(language, global.format),
        command => {
            let mut app = App::initialize(global.database)?;
            run_command(&mut app, command, global.format)
        }
    }
}

fn parse_args(args: &[String]) -> Result<(CliCommand, GlobalOptions)> {
    if matches!(args.first().map(|s| s.as_str()), Some("--help" | "-h" | "help") | None) {
        return Ok((CliCommand::Help, GlobalOptions::default()));
    }
    if matches!(args.first().map(|s| s.as_str()), Some("--version" | "-V" | "version")) {
        return Ok((CliCommand::Version, GlobalOptions::default()));
    }

    let (global, tokens) = parse_global_options(args)?;
    let command = parse_subcommand(&tokens)?;
    Ok((command, global))
}

fn parse_global_options(args: &[String]) -> Result<(GlobalOptions, Vec<String>)> {
    let mut global = GlobalOptions::default();
    let mut tokens = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--format=") {
            global.format = parse_format(value)?;
            continue;
        }
        match arg.as_str() {
            "--format" => {
                let value = iter.next().ok_or_else(|| anyhow!("--format requires a value"))?;
                global.format = parse_format(value)?;
            }
            "--db" => {
                let value = iter.next().ok_or_else(|| anyhow!("--db requires a path"))?;
                global.database = Some(PathBuf::from(value));
            }
            "-q" | "--quiet" => global.verbosity = Verbosity::Quiet,
            "--verbose" => global.verbosity = Verbosity::Verbose,
            "--verbosity" => {
                let level = iter
                    .next()
                    .ok_or_else(|| anyhow!("--verbosity requires a level"))?;
                global.verbosity =
                    Verbosity::parse(level).ok_or_else(|| anyhow!("Unknown verbosity: {level}"))?;
            }
            value if value.starts_with("--db=") => {
                global.database = Some(PathBuf::from(value.trim_start_matches("--db=")));
            }
            value if value.len() > 1 && value.starts_with('-') && value[1..].chars().all(|ch| ch == 'v') => {
                global.verbosity = if value.len() > 2 {
                    Verbosity::Debug
                } else {
                    Verbosity::Verbose
                };
            }
            _ => tokens.push(arg.to_string()),
        }
    }
    Ok((global, tokens))
}

fn parse_format(value: &str) -> Result<OutputFormat> {
    OutputFormat::parse(value).ok_or_else(|| anyhow!("Unknown format: {value} (use 'text' or 'json')"))
}

fn positional<'a>(tokens: &'a [String], index: usize, what: &str) -> Result<&'a str> {
    tokens
        .get(index)
        .map(|value| value.as_str())
        .ok_or_else(|| anyhow!("missing {what}"))
}

fn parse_subcommand(tokens: &[String]) -> Result<CliCommand> {
    let Some(head) = tokens.first() else {
        return Ok(CliCommand::Help);
    };
    let sub = tokens.get(1).map(|value| value.as_str()).unwrap_or("list");
    match head.as_str() {
        "games" => match sub {
            "list" => Ok(CliCommand::GamesList),
            "add" => Ok(CliCommand::GamesAdd(
                positional(tokens, 2, "game title")?.to_string(),
            )),
            "rename" => Ok(CliCommand::GamesRename {
                old: positional(tokens, 2, "current game title")?.to_string(),
                new: positional(tokens, 3, "new game title")?.to_string(),
            }),
            "delete" => Ok(CliCommand::GamesDelete(
                positional(tokens, 2, "game title")?.to_string(),
            )),
            _ => bail!("Unknown games command: {sub} (use 'list', 'add', 'rename', or 'delete')"),
        },
        "mods" => parse_mods(sub, tokens),
        "highlight" => {
            let mode = HighlightMode::parse(sub).ok_or_else(|| {
                anyhow!("Unknown highlight mode: {sub} (use 'tags', 'version', or 'relations')")
            })?;
            Ok(CliCommand::Highlight {
                mode,
                game: positional(tokens, 2, "game title")?.to_string(),
                query: positional(tokens, 3, "highlight query")?.to_string(),
            })
        }
        "config" => match sub {
            "language" | "lang" => {
                let language = match tokens.get(2) {
                    Some(value) => Some(
                        Language::parse(value)
                            .ok_or_else(|| anyhow!("Unknown language: {value} (use 'EN' or 'RU')"))?,
                    ),
                    None => None,
                };
                Ok(CliCommand::ConfigLanguage(language))
            }
            _ => bail!("Unknown config command: {sub} (use 'language')"),
        },
        "paths" => Ok(CliCommand::Paths),
        "help" => Ok(CliCommand::Help),
        "version" => Ok(CliCommand::Version),
        _ => bail!("Unknown command: {head} (see 'modledger help')"),
    }
}

fn parse_mods(sub: &str, tokens: &[String]) -> Result<CliCommand> {
    let game = positional(tokens, 2, "game title")?.to_string();
    match sub {
        "list" => {
            let mut order = ModOrder::Insertion;
            let mut iter = tokens.iter().skip(3);
            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--sort" => {
                        let value = iter.next().ok_or_else(|| anyhow!("--sort requires a value"))?;
                        order = parse_order(value)?;
                    }
                    value if value.starts_with("--sort=") => {
                        order = parse_order(value.trim_start_matches("--sort="))?;
                    }
                    other => bail!("Unexpected argument: {other}"),
                }
            }
            Ok(CliCommand::ModsList { game, order })
        }
        "add" => Ok(CliCommand::ModsAdd {
            game,
            descriptor: PathBuf::from(positional(tokens, 3, "descriptor path")?),
        }),
        "new" => Ok(CliCommand::ModsNew {
            game,
            edits: parse_edits(tokens.get(3..).unwrap_or(&[]))?,
        }),
        "import" => Ok(CliCommand::ModsImport {
            game,
            folder: PathBuf::from(positional(tokens, 3, "folder path")?),
        }),
        "edit" => {
            let title = positional(tokens, 3, "mod title")?.to_string();
            let (at, rest) = take_match_path(tokens.get(4..).unwrap_or(&[]))?;
            Ok(CliCommand::ModsEdit {
                game,
                title,
                at,
                edits: parse_edits(&rest)?,
            })
        }
        "refresh" => Ok(CliCommand::ModsRefresh {
            game,
            title: tokens.get(3).cloned(),
        }),
        "delete" => {
            let title = positional(tokens, 3, "mod title")?.to_string();
            let (at, rest) = take_match_path(tokens.get(4..).unwrap_or(&[]))?;
            if let Some(other) = rest.first() {
                bail!("Unexpected argument: {other}");
            }
            Ok(CliCommand::ModsDelete { game, title, at })
        }
        _ => bail!(
            "Unknown mods command: {sub} (use 'list', 'add', 'new', 'import', 'edit', 'refresh', or 'delete')"
        ),
    }
}

fn parse_order(value: &str) -> Result<ModOrder> {
    ModOrder::parse(value).ok_or_else(|| anyhow!("Unknown sort key: {value}"))
}

// `--match-path` picks between mods sharing a title; `--path` edits the folder.
fn take_match_path(args: &[String]) -> Result<(Option<PathBuf>, Vec<String>)> {
    let mut at = None;
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--match-path" {
            let value = iter
                .next()
                .ok_or_else(|| anyhow!("--match-path requires a value"))?;
            at = Some(PathBuf::from(value));
        } else {
            rest.push(arg.to_string());
        }
    }
    Ok((at, rest))
}

fn parse_edits(args: &[String]) -> Result<ModEdits> {
    let mut edits = ModEdits::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let slot = match flag.as_str() {
            "--title" => &mut edits.title,
            "--tags" => &mut edits.tags,
            "--version" => &mut edits.version,
            "--game-version" => &mut edits.game_version,
            "--requires" => &mut edits.requires,
            "--incompatible" => &mut edits.incompatible,
            "--comment" => &mut edits.comment,
            "--path" => &mut edits.path,
            "--image" => &mut edits.image,
            other => bail!("Unknown mod field: {other}"),
        };
        let value = iter
            .next()
            .ok_or_else(|| anyhow!("{flag} requires a value"))?;
        *slot = Some(value.to_string());
    }
    Ok(edits)
}

fn run_command(app: &mut App, command: CliCommand, format: OutputFormat) -> Result<()> {
    let language = app.config.language;
    match command {
        CliCommand::GamesList => list_games(app, format),
        CliCommand::GamesAdd(title) => match app.create_game(&title)? {
            GameTitleOutcome::Accepted => {
                println!("{}", notice(language, Notice::GameAdded, &title));
                Ok(())
            }
            outcome => bail!("{}", title_rejection(language, &outcome, &title)),
        },
        CliCommand::GamesRename { old, new } => {
            let handle = app.game_handle(&old)?;
            match app
                .games
                .rename(handle, &new, &app.store)
                .context("rename game")?
            {
                GameTitleOutcome::Accepted => {
                    println!("{}", notice(language, Notice::GameRenamed, &new));
                    Ok(())
                }
                outcome => bail!("{}", title_rejection(language, &outcome, &new)),
            }
        }
        CliCommand::GamesDelete(title) => {
            let handle = app.game_handle(&title)?;
            app.games
                .delete(handle, &app.store)
                .context("delete game")?;
            println!("{}", notice(language, Notice::GameDeleted, &title));
            Ok(())
        }
        CliCommand::ModsList { game, order } => {
            let handle = app.game_handle(&game)?;
            let game = app
                .games
                .by_handle(handle)
                .ok_or_else(|| anyhow!("Unknown game: {game}"))?;
            list_mods(game, order, format)
        }
        CliCommand::ModsAdd { game, descriptor } => add_mod(app, &game, &descriptor),
        CliCommand::ModsNew { game, edits } => {
            let store = app.store.clone();
            let target = app.game_mut(&game)?;
            let index = reconcile::add_blank(target)?;
            let mut draft = target.mods[index].draft();
            edits.apply(&mut draft);
            let outcome = reconcile::save_mod(target, index, draft, None, &store)?;
            report_save(language, &target.mods[index].title, outcome)
        }
        CliCommand::ModsImport { game, folder } => import_mods(app, &game, &folder, format),
        CliCommand::ModsEdit {
            game,
            title,
            at,
            edits,
        } => {
            let store = app.store.clone();
            let target = app.game_mut(&game)?;
            let index = mod_index(target, &title, at.as_deref())?;
            let mut draft = target.mods[index].draft();
            edits.apply(&mut draft);
            let outcome = reconcile::save_mod(target, index, draft, None, &store)?;
            report_save(language, &target.mods[index].title, outcome)
        }
        CliCommand::ModsRefresh { game, title } => refresh_mods(app, &game, title.as_deref()),
        CliCommand::ModsDelete { game, title, at } => {
            let store = app.store.clone();
            let target = app.game_mut(&game)?;
            let index = mod_index(target, &title, at.as_deref())?;
            reconcile::delete_mod(target, index, &store)?;
            println!("{}", notice(language, Notice::ModDeleted, &title));
            Ok(())
        }
        CliCommand::Highlight { mode, game, query } => {
            let handle = app.game_handle(&game)?;
            let game = app
                .games
                .by_handle(handle)
                .ok_or_else(|| anyhow!("Unknown game: {game}"))?;
            print_highlights(game, mode, &query, format)
        }
        CliCommand::Paths => list_paths(app, format),
        CliCommand::ConfigLanguage(_) | CliCommand::Help | CliCommand::Version => Ok(()),
    }
}

fn mod_index(game: &Game, title: &str, at: Option<&Path>) -> Result<usize> {
    game.mod_index(title, at).ok_or_else(|| match at {
        Some(path) => anyhow!(
            "Unknown mod in {}: {title} at {}",
            game.title,
            path.display()
        ),
        None => anyhow!("Unknown mod in {}: {title}", game.title),
    })
}

#[derive(Serialize)]
struct GameListItem {
    title: String,
    mods: usize,
    saved: usize,
}

fn list_games(app: &App, format: OutputFormat) -> Result<()> {
    if app.games.is_empty() && format == OutputFormat::Text {
        println!("No games yet (add one with 'modledger games add <title>')");
        return Ok(());
    }
    let items: Vec<GameListItem> = app
        .games
        .games()
        .iter()
        .filter(|game| game.is_titled())
        .map(|game| GameListItem {
            title: game.title.clone(),
            mods: game.mod_count(),
            saved: game.saved_mod_count(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Text => {
            for item in items {
                println!("{:>4} {}", item.mods, item.title);
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ModListItem<'a> {
    title: &'a str,
    mod_version: &'a str,
    supported_game_version: &'a str,
    tags: &'a [String],
    required_mods: &'a [String],
    incompatible_mods: &'a [String],
    commentary: &'a str,
    filepath: String,
    image_path: Option<String>,
    saved: bool,
}

impl<'a> ModListItem<'a> {
    fn from_mod(entry: &'a Mod) -> Self {
        Self {
            title: &entry.title,
            mod_version: &entry.mod_version,
            supported_game_version: &entry.supported_game_version,
            tags: &entry.tags,
            required_mods: &entry.required_mods,
            incompatible_mods: &entry.incompatible_mods,
            commentary: &entry.commentary,
            filepath: entry.filepath.display().to_string(),
            image_path: entry
                .image_path
                .as_ref()
                .map(|path| path.display().to_string()),
            saved: entry.saved,
        }
    }
}

fn list_mods(game: &Game, order: ModOrder, format: OutputFormat) -> Result<()> {
    // Reordering needs at least two mods; otherwise keep insertion order.
    let order = if game.filters_enabled() {
        order
    } else {
        ModOrder::Insertion
    };
    let sorted = order.sort(&game.mods);
    match format {
        OutputFormat::Json => {
            let items: Vec<ModListItem> = sorted.into_iter().map(ModListItem::from_mod).collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Text => {
            println!(
                "{}: {} mod(s), {} saved",
                game.title,
                game.mod_count(),
                game.saved_mod_count()
            );
            for entry in sorted {
                let saved = if entry.saved { "x" } else { " " };
                println!(
                    "[{saved}] {title:<32} {version:<10} {supported:<10} {tags}",
                    title = entry.title,
                    version = entry.mod_version,
                    supported = entry.supported_game_version,
                    tags = entry.tags.join(", ")
                );
            }
        }
    }
    Ok(())
}

fn add_mod(app: &mut App, game: &str, descriptor: &Path) -> Result<()> {
    let language = app.config.language;
    let store = app.store.clone();
    let target = app.game_mut(game)?;
    match reconcile::add_from_descriptor(target, descriptor)? {
        AddOutcome::Added { index, title } => {
            let draft = target.mods[index].draft();
            let outcome = reconcile::save_mod(target, index, draft, None, &store)?;
            report_save(language, &title, outcome)
        }
        AddOutcome::AlreadyAdded { title } => {
            println!("{}", notice(language, Notice::AlreadyAdded, &title));
            Ok(())
        }
        AddOutcome::NoTitle => {
            println!(
                "{}",
                notice(language, Notice::NoTitle, &descriptor.display().to_string())
            );
            Ok(())
        }
    }
}

fn report_save(language: Language, title: &str, outcome: SaveOutcome) -> Result<()> {
    match outcome {
        SaveOutcome::Inserted | SaveOutcome::Updated => {
            println!("{}", notice(language, Notice::Saved, title));
            Ok(())
        }
        SaveOutcome::Rejected(SaveRejection::EmptyTitle) => {
            bail!("{}", notice(language, Notice::EmptyTitle, ""))
        }
        SaveOutcome::Rejected(SaveRejection::Duplicate { title }) => {
            bail!("{}", notice(language, Notice::Duplicate, &title))
        }
    }
}

#[derive(Serialize)]
struct ImportOutput {
    added: Vec<String>,
    already_added: Vec<String>,
    untitled: Vec<String>,
    failed: Vec<String>,
    not_saved: Vec<String>,
}

fn import_mods(app: &mut App, game: &str, folder: &Path, format: OutputFormat) -> Result<()> {
    let store = app.store.clone();
    let target = app.game_mut(game)?;
    let report = reconcile::import_folder(target, folder)?;
    let not_saved = reconcile::save_all(target, &store)?;

    let output = ImportOutput {
        added: report.added,
        already_added: report.already_added,
        untitled: report
            .untitled
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
        failed: report
            .failures
            .iter()
            .map(|failure| format!("{}: {}", failure.path.display(), failure.reason))
            .collect(),
        not_saved,
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("Imported {} mod(s) into {game}", output.added.len());
            for title in &output.already_added {
                println!("  already added: {title}");
            }
            for path in &output.untitled {
                println!("  no title: {path}");
            }
            for failure in &output.failed {
                println!("  failed: {failure}");
            }
            for title in &output.not_saved {
                println!("  not saved: {title}");
            }
        }
    }
    Ok(())
}

fn refresh_mods(app: &mut App, game: &str, title: Option<&str>) -> Result<()> {
    let language = app.config.language;
    let store = app.store.clone();
    let target = app.game_mut(game)?;
    let Some(title) = title else {
        let not_updated = reconcile::refresh_all(target, &store)?;
        if not_updated.is_empty() {
            println!("{}", notice(language, Notice::AllUpdated, game));
        } else {
            println!(
                "{}",
                notice(language, Notice::NotUpdated, &not_updated.join(", "))
            );
        }
        return Ok(());
    };

    let index = mod_index(target, title, None)?;
    match reconcile::refresh_from_descriptor(target, index, &store)? {
        RefreshOutcome::Unreadable => bail!("{}", notice(language, Notice::NotUpdated, title)),
        RefreshOutcome::NoDescriptor => {
            println!("{}", notice(language, Notice::NoDescriptor, title));
            Ok(())
        }
        RefreshOutcome::Saved { save, .. } => {
            report_save(language, &target.mods[index].title, save)
        }
    }
}

#[derive(Serialize)]
struct HighlightItem<'a> {
    title: &'a str,
    highlight: Highlight,
}

fn print_highlights(
    game: &Game,
    mode: HighlightMode,
    query: &str,
    format: OutputFormat,
) -> Result<()> {
    if !game.filters_enabled() {
        bail!("Highlighting needs at least two mods in {}", game.title);
    }
    let highlights = relations::highlight(mode, &game.mods, query)?;
    let items: Vec<HighlightItem> = game
        .mods
        .iter()
        .zip(highlights)
        .map(|(entry, highlight)| HighlightItem {
            title: &entry.title,
            highlight,
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Text => {
            for item in items {
                let marker = match item.highlight {
                    Highlight::Related => "+",
                    Highlight::Incompatible => "!",
                    Highlight::Neutral => " ",
                };
                println!("{marker} {:<12} {}", item.highlight.label(), item.title);
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct PathsOutput {
    config: String,
    database: String,
}

fn list_paths(app: &App, format: OutputFormat) -> Result<()> {
    let output = PathsOutput {
        config: config::config_path()?.display().to_string(),
        database: app.store.path().display().to_string(),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("Config: {}", output.config);
            println!("Database: {}", output.database);
        }
    }
    Ok(())
}

fn configure_language(language: Option<Language>, format: OutputFormat) -> Result<()> {
    let mut config = AppConfig::load_or_create()?;
    if let Some(language) = language {
        config.language = language;
        config.save()?;
    }
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "language": config.language.code()
                }))?
            );
        }
        OutputFormat::Text => println!("{}", config.language.code()),
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Notice {
    GameAdded,
    GameRenamed,
    GameDeleted,
    GameExists,
    EmptyGameTitle,
    Saved,
    AlreadyAdded,
    NoTitle,
    Duplicate,
    EmptyTitle,
    ModDeleted,
    NoDescriptor,
    NotUpdated,
    AllUpdated,
}

fn notice(language: Language, notice: Notice, subject: &str) -> String {
    match language {
        Language::English => match notice {
            Notice::GameAdded => format!("Game '{subject}' added"),
            Notice::GameRenamed => format!("Game renamed to '{subject}'"),
            Notice::GameDeleted => format!("Game '{subject}' deleted"),
            Notice::GameExists => format!("A game named '{subject}' already exists"),
            Notice::EmptyGameTitle => "Game title cannot be empty".to_string(),
            Notice::Saved => format!("'{subject}' saved"),
            Notice::AlreadyAdded => format!("'{subject}' is already added"),
            Notice::NoTitle => format!("No mod title in {subject}"),
            Notice::Duplicate => {
                format!("'{subject}' has the same title and path as another saved mod")
            }
            Notice::EmptyTitle => "Mod title cannot be empty".to_string(),
            Notice::ModDeleted => format!("'{subject}' deleted"),
            Notice::NoDescriptor => format!("No descriptor found for '{subject}'"),
            Notice::NotUpdated => format!("Not updated: {subject}"),
            Notice::AllUpdated => format!("All mods of '{subject}' updated"),
        },
        Language::Russian => match notice {
            Notice::GameAdded => format!("Игра '{subject}' добавлена"),
            Notice::GameRenamed => format!("Игра переименована в '{subject}'"),
            Notice::GameDeleted => format!("Игра '{subject}' удалена"),
            Notice::GameExists => format!("Игра '{subject}' уже существует"),
            Notice::EmptyGameTitle => "Название игры не может быть пустым".to_string(),
            Notice::Saved => format!("'{subject}' сохранён"),
            Notice::AlreadyAdded => format!("'{subject}' уже добавлен"),
            Notice::NoTitle => format!("В {subject} нет названия мода"),
            Notice::Duplicate => {
                format!("'{subject}' совпадает по названию и пути с другим сохранённым модом")
            }
            Notice::EmptyTitle => "Название мода не может быть пустым".to_string(),
            Notice::ModDeleted => format!("'{subject}' удалён"),
            Notice::NoDescriptor => format!("Дескриптор для '{subject}' не найден"),
            Notice::NotUpdated => format!("Не обновлены: {subject}"),
            Notice::AllUpdated => format!("Все моды '{subject}' обновлены"),
        },
    }
}

fn title_rejection(language: Language, outcome: &GameTitleOutcome, title: &str) -> String {
    match outcome {
        GameTitleOutcome::Empty => notice(language, Notice::EmptyGameTitle, title),
        GameTitleOutcome::Duplicate(existing) => notice(language, Notice::GameExists, existing),
        GameTitleOutcome::Accepted => notice(language, Notice::GameAdded, title),
        GameTitleOutcome::NotPending | GameTitleOutcome::UnknownGame => {
            format!("Game '{title}' cannot be named right now")
        }
    }
}

fn print_help() {
    println!("modledger v{}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  modledger games list                          List games");
    println!("  modledger games add <title>                   Add a game");
    println!("  modledger games rename <old> <new>            Rename a game");
    println!("  modledger games delete <title>                Delete a game and its mods");
    println!("  modledger mods list <game> [--sort <key>]     List mods (insertion | name | version)");
    println!("  modledger mods add <game> <descriptor>        Add a mod from a descriptor file");
    println!("  modledger mods new <game> [fields]            Add a mod by hand");
    println!("  modledger mods import <game> <folder>         Add every mod found in a folder");
    println!("  modledger mods edit <game> <title> [fields]   Edit and save a mod");
    println!("  modledger mods refresh <game> [<title>]       Re-read descriptors");
    println!("  modledger mods delete <game> <title>          Delete a mod");
    println!("    (edit and delete take --match-path <folder> when titles repeat)");
    println!("  modledger highlight tags <game> <a,b>         Mark mods with any of the tags");
    println!("  modledger highlight version <game> <version>  Mark mods for a game version");
    println!("  modledger highlight relations <game> <mod>    Mark requirements and conflicts");
    println!("  modledger config language [EN|RU]            Show or set the language");
    println!("  modledger paths                               Show config and database paths");
    println!();
    println!("Mod fields:");
    println!("  --title, --tags, --version, --game-version, --requires,");
    println!("  --incompatible, --comment, --path, --image");
    println!("  (tags, requires and incompatible take comma-separated lists)");
    println!();
    println!("Global options:");
    println!("  --format <json|text>            Output format");
    println!("  --db <path>                     Use another catalogue database");
    println!("  -q, --quiet                     Errors only");
    println!("  -v, -vv                         Increase verbosity");
    println!("  --verbosity <level>             quiet | normal | verbose | debug");
    println!("  -h, --help                      Show help");
    println!("  -V, --version                   Show version");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_no_arguments_shows_help() {
        let (command, _) = parse_args(&[]).unwrap();
        assert_eq!(command, CliCommand::Help);
    }

    #[test]
    fn test_global_options_anywhere() {
        let (command, global) =
            parse_args(&args(&["games", "-vv", "list", "--db", "/tmp/x.sqlite", "--format=json"]))
                .unwrap();
        assert_eq!(command, CliCommand::GamesList);
        assert_eq!(global.format, OutputFormat::Json);
        assert_eq!(global.database, Some(PathBuf::from("/tmp/x.sqlite")));
        assert_eq!(global.verbosity, Verbosity::Debug);
    }

    #[test]
    fn test_quiet_and_single_verbose() {
        let (_, global) = parse_args(&args(&["paths", "-q"])).unwrap();
        assert_eq!(global.verbosity, Verbosity::Quiet);
        let (_, global) = parse_args(&args(&["paths", "-v"])).unwrap();
        assert_eq!(global.verbosity, Verbosity::Verbose);
    }

    #[test]
    fn test_mod_edit_flags() {
        let (command, _) = parse_args(&args(&[
            "mods",
            "edit",
            "Stellaris",
            "Better UI",
            "--version",
            "2.0",
            "--tags",
            "UI,Fixes",
        ]))
        .unwrap();
        let CliCommand::ModsEdit {
            game,
            title,
            at,
            edits,
        } = command
        else {
            panic!("expected mods edit");
        };
        assert_eq!(game, "Stellaris");
        assert_eq!(title, "Better UI");
        assert_eq!(at, None);

        let mut draft = ModDraft {
            title: "Better UI".to_string(),
            ..ModDraft::default()
        };
        edits.apply(&mut draft);
        assert_eq!(draft.mod_version, "2.0");
        assert_eq!(draft.tags, vec!["UI", "Fixes"]);
        assert_eq!(draft.title, "Better UI");
    }

    #[test]
    fn test_match_path_selects_and_path_still_edits() {
        let (command, _) = parse_args(&args(&[
            "mods",
            "edit",
            "Stellaris",
            "A",
            "--path",
            "/new",
            "--match-path",
            "/p2",
        ]))
        .unwrap();
        let CliCommand::ModsEdit { at, edits, .. } = command else {
            panic!("expected mods edit");
        };
        assert_eq!(at, Some(PathBuf::from("/p2")));
        assert_eq!(edits.path.as_deref(), Some("/new"));

        let (command, _) =
            parse_args(&args(&["mods", "delete", "Stellaris", "A", "--match-path", "/p1"]))
                .unwrap();
        assert_eq!(
            command,
            CliCommand::ModsDelete {
                game: "Stellaris".to_string(),
                title: "A".to_string(),
                at: Some(PathBuf::from("/p1")),
            }
        );
        assert!(parse_args(&args(&["mods", "delete", "Stellaris", "A", "extra"])).is_err());
    }

    #[test]
    fn test_empty_image_clears_it() {
        let edits = parse_edits(&args(&["--image", ""])).unwrap();
        let mut draft = ModDraft {
            image_path: Some(PathBuf::from("/x.png")),
            ..ModDraft::default()
        };
        edits.apply(&mut draft);
        assert_eq!(draft.image_path, None);
    }

    #[test]
    fn test_mods_list_sort() {
        let (command, _) =
            parse_args(&args(&["mods", "list", "Stellaris", "--sort", "version"])).unwrap();
        assert_eq!(
            command,
            CliCommand::ModsList {
                game: "Stellaris".to_string(),
                order: ModOrder::SupportedVersion,
            }
        );
    }

    #[test]
    fn test_highlight_and_refresh() {
        let (command, _) =
            parse_args(&args(&["highlight", "relations", "Stellaris", "Better UI"])).unwrap();
        assert_eq!(
            command,
            CliCommand::Highlight {
                mode: HighlightMode::Relations,
                game: "Stellaris".to_string(),
                query: "Better UI".to_string(),
            }
        );
        let (command, _) = parse_args(&args(&["mods", "refresh", "Stellaris"])).unwrap();
        assert_eq!(
            command,
            CliCommand::ModsRefresh {
                game: "Stellaris".to_string(),
                title: None,
            }
        );
    }

    #[test]
    fn test_config_language() {
        let (command, _) = parse_args(&args(&["config", "language", "ru"])).unwrap();
        assert_eq!(command, CliCommand::ConfigLanguage(Some(Language::Russian)));
        assert!(parse_args(&args(&["config", "language", "fr"])).is_err());
    }

    #[test]
    fn test_usage_errors() {
        assert!(parse_args(&args(&["games", "add"])).is_err());
        assert!(parse_args(&args(&["mods", "edit", "Stellaris", "A", "--bogus", "x"])).is_err());
        assert!(parse_args(&args(&["mods", "edit", "Stellaris", "A", "--title"])).is_err());
        assert!(parse_args(&args(&["unknown"])).is_err());
        assert!(parse_args(&args(&["paths", "--format", "xml"])).is_err());
    }

    #[test]
    fn test_notices_follow_language() {
        assert_eq!(notice(Language::English, Notice::Saved, "A"), "'A' saved");
        assert_eq!(notice(Language::Russian, Notice::Saved, "A"), "'A' сохранён");
    }
}
