use clap::Parser;
use panel_optimizer::packer::{PackOptions, Packer, UnplaceablePolicy};
use panel_optimizer::render;
use panel_optimizer::types::{Layout, PanelRequest, Rect};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "panel_optimizer",
    about = "Packs rectangular panels onto fixed-size stock sheets"
)]
struct Cli {
    /// Stock sheet dimensions (WxH, e.g. 2440x1220)
    #[arg(long, value_parser = parse_dimensions)]
    stock: Rect,

    /// Panels as WxH:qty (e.g. 800x600:3 400x300:5)
    #[arg(long = "panels", num_args = 1.., value_parser = parse_panel)]
    panels: Vec<PanelRequest>,

    /// Show ASCII layout of each sheet
    #[arg(long)]
    layout: bool,

    /// Print the layout as JSON instead of text
    #[arg(long, conflicts_with = "layout")]
    json: bool,

    /// Use the recursive fill with sheet caching
    #[arg(long)]
    memoize: bool,

    /// Report panels larger than the stock instead of failing
    #[arg(long)]
    skip_unplaceable: bool,

    /// Log packing progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_dimensions(s: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected WxH", s));
    }
    let width = parts[0]
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let height = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid height in '{}'", s))?;
    if width == 0 || height == 0 {
        return Err(format!("dimensions must be non-zero in '{}'", s));
    }
    Ok(Rect::new(width, height))
}

fn parse_panel(s: &str) -> Result<PanelRequest, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(format!("invalid panel '{}', expected WxH:qty", s));
    }
    let rect = parse_dimensions(parts[0])?;
    let quantity = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    if quantity == 0 {
        return Err(format!("quantity must be non-zero in '{}'", s));
    }
    Ok(PanelRequest::new(rect.width, rect.height, quantity))
}

fn print_text(layout: &Layout, show_layout: bool) {
    for (i, sheet) in layout.sheets.iter().enumerate() {
        println!("Sheet {}:", i + 1);
        for p in &sheet.panels {
            let rot = if p.rotated { " [rotated]" } else { "" };
            println!("  {} @ ({}, {}){}", p.rect, p.x, p.y, rot);
        }
        if show_layout {
            print!("{}", render::render_sheet(sheet));
        }
        println!();
    }

    if !layout.rejected.is_empty() {
        println!("Rejected (larger than stock {}):", layout.stock);
        for p in &layout.rejected {
            println!("  {}", p.rect);
        }
        println!();
    }

    println!(
        "Summary: {} sheet{} of {}, {} panel{} placed, {:.1}% waste",
        layout.sheet_count(),
        if layout.sheet_count() == 1 { "" } else { "s" },
        layout.stock,
        layout.panel_count(),
        if layout.panel_count() == 1 { "" } else { "s" },
        layout.total_waste_percent(),
    );
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let options = PackOptions {
        memoize: cli.memoize,
        unplaceable: if cli.skip_unplaceable {
            UnplaceablePolicy::Reject
        } else {
            UnplaceablePolicy::Fail
        },
    };

    let layout = Packer::new(cli.stock, cli.panels)
        .with_options(options)
        .solve()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    if cli.json {
        match serde_json::to_string_pretty(&layout) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_text(&layout, cli.layout);
    }
}
