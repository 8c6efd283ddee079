use crate::catalog::Catalog;
use crate::client::DataSource;
use crate::list::type_badge;
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use pokecat_core::colors::{hex_to_rgb, type_color};
use pokecat_core::pokemon::{DetailView, EntityRef};

const STAT_BAR_WIDTH: usize = 30;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ShowOptions {
    /// Pokémon id, name or resource url (e.g. "25", "pikachu" or "https://pokeapi.co/api/v2/pokemon/25/")
    #[arg(value_name = "ID_OR_NAME")]
    pub pokemon: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run<S: DataSource + 'static>(
    options: ShowOptions,
    catalog: &Catalog<S>,
    global: crate::Global,
) -> Result<()> {
    if global.verbose {
        eprintln!("Fetching details for: {}", options.pokemon);
    }

    let view = show_data(catalog, &options.pokemon).await?;

    if options.json {
        output_json(&view)?;
    } else {
        print!("{}", format_detail_text(&view));
    }

    Ok(())
}

/// Fetch one entity and shape it for the detail screen.
pub async fn show_data<S: DataSource + 'static>(
    catalog: &Catalog<S>,
    input: &str,
) -> Result<DetailView> {
    let entity = EntityRef::parse(input).ok_or_else(|| Error::InvalidReference(input.to_string()))?;

    let detail = catalog
        .entity(&entity)
        .await
        .map_err(|e| eyre!("Failed to load '{}': {}", input, e))?;

    Ok(DetailView::from(detail.as_ref()))
}

/// Horizontal bar scaled to the highest possible base stat.
pub fn stat_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn format_detail_json(view: &DetailView) -> Result<String> {
    serde_json::to_string_pretty(view).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

pub fn format_detail_text(view: &DetailView) -> String {
    let mut result = String::new();
    let accent = view
        .types
        .first()
        .and_then(|t| hex_to_rgb(type_color(t)))
        .unwrap_or((136, 136, 136));

    // Header
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{} {}\n",
        format!("#{}", view.id).yellow().bold(),
        view.name.to_uppercase().bright_cyan().bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    let badges: Vec<String> = view.types.iter().map(|t| type_badge(t).to_string()).collect();
    result.push_str(&format!("\n{}: {}\n", "Types".green(), badges.join(" ")));

    if let Some(image_url) = &view.image_url {
        result.push_str(&format!(
            "{}: {}\n",
            "Image".green(),
            image_url.cyan().underline()
        ));
    }

    result.push_str(&format!(
        "{}: {} | {}: {}\n",
        "Height".green(),
        format!("{:.1} m", view.height_m).bright_white(),
        "Weight".green(),
        format!("{:.1} kg", view.weight_kg).bright_white()
    ));

    // Stats
    result.push_str(&format!("\n{}\n", "BASE STATS".bright_yellow().bold()));
    let name_width = view.stats.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for stat in &view.stats {
        result.push_str(&format!(
            "  {:<width$}  {}  {}\n",
            stat.name,
            format!("{:>3}", stat.value).bright_white().bold(),
            stat_bar(stat.percent, STAT_BAR_WIDTH).truecolor(accent.0, accent.1, accent.2),
            width = name_width
        ));
    }
    result.push_str(&format!(
        "  {:<width$}  {}\n",
        "total",
        format!("{:>3}", view.stat_total).bright_white().bold(),
        width = name_width
    ));

    // Abilities
    result.push_str(&format!("\n{}\n", "ABILITIES".bright_yellow().bold()));
    if view.abilities.is_empty() {
        result.push_str(&format!("  {}\n", "none".bright_black()));
    }
    for ability in &view.abilities {
        if ability.hidden {
            result.push_str(&format!(
                "  {} {}\n",
                ability.name.white(),
                "(hidden)".bright_black()
            ));
        } else {
            result.push_str(&format!("  {}\n", ability.name.white()));
        }
    }

    result.push_str(&format!(
        "\n{}: {}\n",
        "Back to the list".green(),
        "pokecat list".cyan()
    ));

    result.push('\n');
    result
}

fn output_json(view: &DetailView) -> Result<()> {
    println!("{}", format_detail_json(view)?);
    Ok(())
}
