use crate::assembler::assemble_page;
use crate::catalog::Catalog;
use crate::client::DataSource;
use crate::list::{format_row, type_badge};
use crate::prelude::{eprintln, println, *};
use crate::{show, types};
use colored::Colorize;
use pokecat_core::assemble::{build_list_output, AssembledPage, ListOutput, ModeKind};
use pokecat_core::generation::{Generation, GenerationCounter, Tagged};
use pokecat_core::query::{total_pages, QueryState};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const HELP: &str = "\
Commands:
  next, n            next page
  prev, p            previous page
  page <n>           jump to page n
  search <text>      filter by name (no text clears the filter)
  type <name>        filter by type (no name clears the filter)
  clear              clear both filters
  show <id|name>     show one entry
  types              list the available types
  reload             run the current query again
  help               this message
  quit, q            leave";

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct BrowseOptions {
    /// Number of entries per page
    #[arg(short, long, env = "POKECAT_LIMIT", default_value = "20")]
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
    Page(i64),
    Search(Option<String>),
    Type(Option<String>),
    Clear,
    Show(String),
    Types,
    Reload,
    Help,
    Quit,
}

/// Parse one input line. Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    let command = match word.to_lowercase().as_str() {
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "page" => {
            let raw = argument.ok_or_else(|| Error::MissingArgument("page".to_string()))?;
            let page = raw
                .parse::<i64>()
                .map_err(|_| Error::InvalidPage(raw.clone()))?;
            Command::Page(page)
        }
        "search" => Command::Search(argument),
        "type" => Command::Type(argument),
        "clear" => Command::Clear,
        "show" => Command::Show(argument.ok_or_else(|| Error::MissingArgument("show".to_string()))?),
        "types" => Command::Types,
        "reload" => Command::Reload,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(Error::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

/// Query state after `command`, or `None` when it leaves the state as is.
///
/// Page moves are clamped to `1..=last_page` when the page count is known.
pub fn next_state(state: &QueryState, command: &Command, page_count: Option<usize>) -> Option<QueryState> {
    let last_page = page_count.map(|count| count.max(1) as i64);
    let clamp = |page: i64| {
        let page = page.max(1);
        last_page.map_or(page, |last| page.min(last))
    };

    let next = match command {
        Command::Next => state.with_page(clamp(state.page.saturating_add(1))),
        Command::Prev => state.with_page(clamp(state.page.saturating_sub(1))),
        Command::Page(page) => state.with_page(clamp(*page)),
        Command::Search(text) => state.with_name_filter(text.as_deref()),
        Command::Type(name) => state.with_category_filter(name.as_deref()),
        Command::Clear => QueryState::cleared(),
        _ => return None,
    };

    (next != *state).then_some(next)
}

struct Session<S> {
    catalog: Arc<Catalog<S>>,
    generations: GenerationCounter,
    sender: mpsc::UnboundedSender<Tagged<AssembledPage>>,
    page_size: usize,
}

impl<S: DataSource + 'static> Session<S> {
    /// Assemble `state` in the background under a fresh generation.
    fn start(&self, state: &QueryState) -> Generation {
        let generation = self.generations.advance();
        log::debug!("Starting generation {} for {:?}", generation.value(), state);

        let catalog = Arc::clone(&self.catalog);
        let sender = self.sender.clone();
        let state = state.clone();
        let page_size = self.page_size;

        tokio::spawn(async move {
            assemble_page(&*catalog, &state, page_size, |snapshot| {
                // The receiver only goes away when the session ends.
                let _ = sender.send(Tagged {
                    generation,
                    value: snapshot.clone(),
                });
            })
            .await;
        });

        generation
    }
}

pub async fn run<S: DataSource + 'static>(
    options: BrowseOptions,
    catalog: Arc<Catalog<S>>,
    global: crate::Global,
) -> Result<()> {
    if options.limit == 0 {
        return Err(eyre!("--limit must be at least 1"));
    }

    let (sender, mut receiver) = mpsc::unbounded_channel();
    let session = Session {
        catalog,
        generations: GenerationCounter::new(),
        sender,
        page_size: options.limit,
    };

    let mut state = QueryState::default();
    let mut page_count: Option<usize> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "{} {}",
        "POKECAT BROWSER".bright_cyan().bold(),
        "(type 'help' for commands)".bright_black()
    );
    session.start(&state);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };

                let command = match parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => {
                        prompt();
                        continue;
                    }
                    Err(err) => {
                        eprintln!("{} {}", "Error:".red().bold(), err);
                        prompt();
                        continue;
                    }
                };

                match command {
                    Command::Quit => break,
                    Command::Help => {
                        println!("{HELP}");
                        prompt();
                    }
                    Command::Show(input) => {
                        match show::show_data(&*session.catalog, &input).await {
                            Ok(view) => print!("{}", show::format_detail_text(&view)),
                            Err(err) => eprintln!("{} {}", "Error:".red().bold(), err),
                        }
                        prompt();
                    }
                    Command::Types => {
                        match types::types_data(&*session.catalog).await {
                            Ok(entries) => {
                                let badges: Vec<String> =
                                    entries.iter().map(|e| type_badge(&e.name).to_string()).collect();
                                println!("{}", badges.join(" "));
                            }
                            Err(err) => eprintln!(
                                "{} {} (browsing without a type filter still works)",
                                "Types unavailable:".yellow().bold(),
                                err
                            ),
                        }
                        prompt();
                    }
                    Command::Reload => {
                        page_count = None;
                        session.start(&state);
                    }
                    command => match next_state(&state, &command, page_count) {
                        Some(next) => {
                            state = next;
                            page_count = None;
                            session.start(&state);
                        }
                        None => {
                            println!("{}", "Nothing to change.".bright_black());
                            prompt();
                        }
                    },
                }
            }
            Some(tagged) = receiver.recv() => {
                let Some(page) = session.generations.accept(tagged) else {
                    log::debug!("Discarding a page from a superseded query");
                    continue;
                };

                if page.is_loading {
                    if global.verbose {
                        eprintln!("{} {} entries ready", "...".bright_black(), page.rows.len());
                    }
                    continue;
                }

                page_count = Some(total_pages(page.total_count, session.page_size));
                let output = build_list_output(&state, page, session.page_size);
                print!("{}", format_browse_page(&output));
                prompt();
            }
        }
    }

    Ok(())
}

fn prompt() {
    print!("{} ", ">".bright_cyan().bold());
    std::io::stdout().flush().ok();
}

/// Compact page rendering for the interactive session.
fn format_browse_page(output: &ListOutput) -> String {
    let mut result = String::new();
    let page = &output.page;
    let pagination = &output.pagination;

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    let mut title = format!(
        "Page {} of {} ({} total)",
        pagination.current_page,
        pagination.total_pages.max(1),
        pagination.total_items
    );
    if let Some(search) = &output.query.name_filter {
        title.push_str(&format!(" | search: {search}"));
    }
    if let Some(category) = &output.query.category_filter {
        title.push_str(&format!(" | type: {category}"));
    }
    result.push_str(&format!("{}\n", title.bright_cyan().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if let Some(cause) = &page.error_cause {
        result.push_str(&format!(
            "\n{} {} {}\n",
            "Some entries could not be loaded:".red().bold(),
            cause.to_string().red(),
            "(try 'reload')".bright_black()
        ));
    }

    if page.rows.is_empty() {
        result.push_str(&format!("\n{}\n", "No entries on this page.".yellow()));
    }
    for row in &page.rows {
        result.push_str(&format_row(row));
    }

    if page.mode == ModeKind::Category && output.query.name_filter.is_some() {
        result.push_str(&format!(
            "\n{}\n",
            format!("{} of {} shown", page.rows.len(), pagination.total_items).bright_black()
        ));
    }

    let mut hints = Vec::new();
    if pagination.prev_page_command.is_some() {
        hints.push("prev");
    }
    if pagination.next_page_command.is_some() {
        hints.push("next");
    }
    hints.extend(["page <n>", "search <text>", "type <name>", "show <id>", "help"]);
    result.push_str(&format!("\n{}\n", hints.join(" | ").bright_black()));

    result
}
