use crate::assembler::assemble_page;
use crate::catalog::Catalog;
use crate::client::DataSource;
use crate::prelude::{eprintln, println, *};
use colored::{ColoredString, Colorize};
use pokecat_core::assemble::{build_list_output, ListOutput, ModeKind};
use pokecat_core::colors::{hex_to_rgb, type_color, type_text_color};
use pokecat_core::pokemon::DisplayRow;
use pokecat_core::query::QueryState;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ListOptions {
    /// Page number (1-indexed)
    #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
    pub page: i64,

    /// Number of entries per page
    #[arg(short, long, env = "POKECAT_LIMIT", default_value = "20")]
    pub limit: usize,

    /// Only list entries whose name contains this text (case-insensitive)
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only list entries of this type (e.g. fire, water, electric)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub category: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run<S: DataSource + 'static>(
    options: ListOptions,
    catalog: &Catalog<S>,
    global: crate::Global,
) -> Result<()> {
    if options.limit == 0 {
        return Err(eyre!("--limit must be at least 1"));
    }

    let state = QueryState::new(
        options.page,
        options.search.as_deref(),
        options.category.as_deref(),
    );

    if global.verbose {
        eprintln!("Fetching page {} from {}...", state.page, global.base_url);
    }

    let output = list_page_data(catalog, &state, options.limit, global.verbose).await;

    if options.json {
        output_json(&output)?;
    } else if !output.page.source_failed {
        output_formatted(&output);
    }

    exit_status(&output)
}

/// Only an id-source failure fails the command; detail failures are reported
/// in the output and drop their rows.
fn exit_status(output: &ListOutput) -> Result<()> {
    match (&output.page.error_cause, output.page.source_failed) {
        (Some(cause), true) => Err(eyre!("Failed to load the catalog: {}", cause)),
        _ => Ok(()),
    }
}

/// Assemble one page of the catalog into a structured [`ListOutput`].
pub async fn list_page_data<S: DataSource + 'static>(
    catalog: &Catalog<S>,
    state: &QueryState,
    page_size: usize,
    verbose: bool,
) -> ListOutput {
    let page = assemble_page(catalog, state, page_size, |snapshot| {
        if verbose && snapshot.is_loading {
            eprintln!("{} {} entries ready", "...".bright_black(), snapshot.rows.len());
        }
    })
    .await;

    build_list_output(state, page, page_size)
}

/// Colored label for a type, using its palette color.
pub fn type_badge(type_name: &str) -> ColoredString {
    let (br, bg, bb) = hex_to_rgb(type_color(type_name)).unwrap_or((136, 136, 136));
    let (fr, fg, fb) = hex_to_rgb(type_text_color(type_name)).unwrap_or((255, 255, 255));
    format!(" {type_name} ")
        .on_truecolor(br, bg, bb)
        .truecolor(fr, fg, fb)
        .bold()
}

pub(crate) fn format_row(row: &DisplayRow) -> String {
    let mut result = String::new();

    let badges: Vec<String> = row.categories.iter().map(|c| type_badge(c).to_string()).collect();
    result.push_str(&format!(
        "\n{} {} {}\n",
        format!("[#{}]", row.id).yellow().bold(),
        row.name.white().bold(),
        badges.join(" ")
    ));

    if let Some(image_url) = &row.image_url {
        result.push_str(&format!(
            "    {}: {}\n",
            "Image".green(),
            image_url.cyan().underline()
        ));
    }

    result.push_str(&format!(
        "    {}: {}\n",
        "Details".green(),
        format!("pokecat show {}", row.id).cyan()
    ));

    result
}

fn format_list_json(output: &ListOutput) -> Result<String> {
    serde_json::to_string_pretty(output).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

/// Convert list output to formatted text with colors
fn format_list_text(output: &ListOutput) -> String {
    let mut result = String::new();
    let page = &output.page;
    let pagination = &output.pagination;
    let total_pages = pagination.total_pages.max(1);

    // Header
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{}\n",
        format!(
            "POKEMON CATALOG (Page {} of {})",
            pagination.current_page, total_pages
        )
        .bright_cyan()
        .bold()
    ));
    if let Some(search) = &output.query.name_filter {
        result.push_str(&format!("{}: {}\n", "Search".green(), search.bright_white()));
    }
    if let Some(category) = &output.query.category_filter {
        result.push_str(&format!("{}: {}\n", "Type".green(), type_badge(category)));
    }
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if let Some(cause) = &page.error_cause {
        result.push_str(&format!(
            "\n{} {}\n",
            "Some entries could not be loaded:".red().bold(),
            cause.to_string().red()
        ));
    }

    if page.rows.is_empty() {
        result.push_str(&format!("\n{}\n", "No entries on this page.".yellow()));
    } else {
        for row in &page.rows {
            result.push_str(&format_row(row));
        }
    }

    // Navigation section
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_yellow()));
    result.push_str(&format!("{}\n", "NAVIGATION".bright_yellow().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_yellow()));

    result.push_str(&format!(
        "\n{} {} {} {} ({} {})\n",
        "Showing page".bright_white(),
        pagination.current_page.to_string().bright_cyan().bold(),
        "of".bright_white(),
        total_pages.to_string().bright_cyan().bold(),
        pagination.total_items.to_string().bright_cyan().bold(),
        "total entries".bright_white(),
    ));

    if page.mode == ModeKind::Category && output.query.name_filter.is_some() {
        result.push_str(&format!(
            "{}\n",
            format!(
                "{} of {} shown; the total counts every entry of this type",
                page.rows.len(),
                pagination.total_items
            )
            .bright_black()
        ));
    }

    result.push_str(&format!("\n{}:\n", "To navigate".bright_white().bold()));
    if let Some(next) = &pagination.next_page_command {
        result.push_str(&format!("  {}: {}\n", "Next page".green(), next.cyan()));
    }
    if let Some(prev) = &pagination.prev_page_command {
        result.push_str(&format!("  {}: {}\n", "Previous page".green(), prev.cyan()));
    }

    result.push_str(&format!("\n{}:\n", "To filter".bright_white().bold()));
    result.push_str(&format!(
        "  {}\n",
        "pokecat list --search <text> --type <type>".cyan()
    ));
    result.push_str(&format!("  {}: {}\n", "Types".green(), "pokecat types".cyan()));

    result.push_str(&format!("\n{}:\n", "To view details".bright_white().bold()));
    result.push_str(&format!("  {}\n", "pokecat show <id|name>".cyan()));
    if let Some(first) = page.rows.first() {
        result.push_str(&format!(
            "  {}: {}\n",
            "Example".green(),
            format!("pokecat show {}", first.name).cyan()
        ));
    }

    result.push_str(&format!(
        "\n{}:\n",
        "To get JSON output".bright_white().bold()
    ));
    result.push_str(&format!("  {}\n", "pokecat list --json".cyan()));

    result.push('\n');
    result
}

fn output_json(output: &ListOutput) -> Result<()> {
    let json = format_list_json(output)?;
    println!("{}", json);
    Ok(())
}

fn output_formatted(output: &ListOutput) {
    print!("{}", format_list_text(output));
}
