mod logger;

use anyhow::Result;
use card_sheets::{
    CardSize, ConsolePrompt, Disambiguator, FirstCandidate, Layout, LayoutCatalog, NoBack,
    OffsetStore, OutputKind, PaperSize, SheetAssets, SheetOptions,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use logger::StderrLogger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cardsheets", about = "Print-ready card sheets from card images", version)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out card images on printable sheets
    Generate(GenerateArgs),

    /// Save or show the duplex registration offset
    Offset {
        /// Horizontal shift of back pages in pixels at 300 PPI
        #[arg(long, allow_negative_numbers = true, required_unless_present = "show")]
        x: Option<i32>,

        /// Vertical shift of back pages in pixels at 300 PPI
        #[arg(long, allow_negative_numbers = true, required_unless_present = "show")]
        y: Option<i32>,

        /// Print the stored offset instead of saving one
        #[arg(long, conflicts_with_all = ["x", "y"])]
        show: bool,

        /// Folder holding offset_data.json
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Start from options saved as JSON; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective options as JSON
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Custom layout catalog (JSON)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Folder containing the card fronts [default: game/front]
    #[arg(long)]
    front_dir: Option<PathBuf>,

    /// Folder containing one or more card backs [default: game/back]
    #[arg(long)]
    back_dir: Option<PathBuf>,

    /// Folder containing backs for double-sided cards [default: game/double_sided]
    #[arg(long)]
    double_sided_dir: Option<PathBuf>,

    /// Output PDF file, or output folder with --images [default: game/output/game.pdf]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write numbered PNG files instead of a PDF
    #[arg(long)]
    images: bool,

    /// Paper size [default: letter]
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Card size [default: standard]
    #[arg(long, value_enum)]
    card: Option<CardArg>,

    /// Zero-based card positions to leave empty (comma separated)
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    skip: Vec<i64>,

    /// Crop the outer portion of front and double-sided images. Examples: 3mm, 0.125in, 6.5
    #[arg(long)]
    crop: Option<String>,

    /// Reduce artifacts produced by rounded corners in card images [default: 0]
    #[arg(long)]
    extend_corners: Option<u32>,

    /// Pixels per inch of the output [default: 300]
    #[arg(long)]
    ppi: Option<u32>,

    /// JPEG quality of PDF pages, 1-100 [default: 75]
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Only print the card fronts
    #[arg(long)]
    fronts_only: bool,

    /// Shift back pages by the saved offset
    #[arg(long)]
    load_offset: bool,

    /// Label each sheet with a name
    #[arg(long)]
    name: Option<String>,

    /// Folder with registration templates and the label font [default: assets]
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Folder holding offset_data.json [default: data]
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// What to do when a back folder holds several images
    #[arg(long, default_value = "prompt", value_enum)]
    backs: BacksArg,

    /// Show statistics only, don't generate sheets
    #[arg(long)]
    stats_only: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    Letter,
    Tabloid,
    A4,
    A3,
    Archb,
}

#[derive(Clone, Copy, ValueEnum)]
enum CardArg {
    Standard,
    Japanese,
    Poker,
    PokerHalf,
    Bridge,
    BridgeSquare,
    Domino,
    DominoSquare,
}

#[derive(Clone, Copy, ValueEnum)]
enum BacksArg {
    /// Ask on the terminal
    Prompt,
    /// Take the first image by name
    First,
    /// Leave those cards without a back
    None,
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::Letter => Self::Letter,
            PaperArg::Tabloid => Self::Tabloid,
            PaperArg::A4 => Self::A4,
            PaperArg::A3 => Self::A3,
            PaperArg::Archb => Self::ArchB,
        }
    }
}

impl From<CardArg> for CardSize {
    fn from(arg: CardArg) -> Self {
        match arg {
            CardArg::Standard => Self::Standard,
            CardArg::Japanese => Self::Japanese,
            CardArg::Poker => Self::Poker,
            CardArg::PokerHalf => Self::PokerHalf,
            CardArg::Bridge => Self::Bridge,
            CardArg::BridgeSquare => Self::BridgeSquare,
            CardArg::Domino => Self::Domino,
            CardArg::DominoSquare => Self::DominoSquare,
        }
    }
}

impl BacksArg {
    fn disambiguator(self) -> Box<dyn Disambiguator + Send> {
        match self {
            BacksArg::Prompt => Box::new(ConsolePrompt::stdio()),
            BacksArg::First => Box::new(FirstCandidate),
            BacksArg::None => Box::new(NoBack),
        }
    }
}

impl GenerateArgs {
    /// Override `options` with every flag that was given
    fn apply(&self, options: &mut SheetOptions) {
        if let Some(dir) = &self.front_dir {
            options.front_dir = dir.clone();
        }
        if let Some(dir) = &self.back_dir {
            options.back_dir = dir.clone();
        }
        if let Some(dir) = &self.double_sided_dir {
            options.double_sided_dir = dir.clone();
        }
        if let Some(output) = &self.output {
            options.output_path = output.clone();
        }
        if self.images {
            options.output_kind = OutputKind::Images;
        }
        if let Some(paper) = self.paper {
            options.paper_size = paper.into();
        }
        if let Some(card) = self.card {
            options.card_size = card.into();
        }
        if !self.skip.is_empty() {
            options.skip = self.skip.clone();
        }
        if let Some(crop) = &self.crop {
            options.crop = Some(crop.clone());
        }
        if let Some(extend_corners) = self.extend_corners {
            options.extend_corners = extend_corners;
        }
        if let Some(ppi) = self.ppi {
            options.ppi = ppi;
        }
        if let Some(quality) = self.quality {
            options.quality = quality;
        }
        if self.fronts_only {
            options.fronts_only = true;
        }
        if self.load_offset {
            options.load_offset = true;
        }
        if let Some(name) = &self.name {
            options.name = Some(name.clone());
        }
        if let Some(dir) = &self.assets_dir {
            options.assets_dir = dir.clone();
        }
        if let Some(dir) = &self.data_dir {
            options.data_dir = dir.clone();
        }
    }
}

async fn generate(args: GenerateArgs) -> Result<()> {
    let mut options = match &args.config {
        Some(path) => SheetOptions::load(path).await?,
        None => SheetOptions::default(),
    };
    args.apply(&mut options);
    options.validate()?;

    if let Some(path) = &args.save_config {
        options.save(path).await?;
        println!("Saved options → {}", path.display());
    }

    let catalog = match &args.catalog {
        Some(path) => LayoutCatalog::load(path).await?,
        None => LayoutCatalog::builtin()?,
    };
    let layout = Layout::resolve(&catalog, options.paper_size, options.card_size, &options.skip)?;

    let cards = card_sheets::load_cards(
        options.card_dirs(),
        options.fronts_only,
        args.backs.disambiguator(),
    )
    .await?;

    // Calculate and show statistics
    let stats = card_sheets::calculate_statistics(&cards, &layout, options.fronts_only);
    println!("Sheet Statistics:");
    println!("  Template: {}", layout.template);
    println!("  Cards per page: {}", stats.cards_per_page);
    println!("  Single-sided cards: {}", stats.single_sided_cards);
    println!("  Double-sided cards: {}", stats.double_sided_cards);
    if stats.ignored_cards > 0 {
        println!("  Ignored cards: {}", stats.ignored_cards);
    }
    if !cards.unmatched_backs().is_empty() {
        println!(
            "  Double-sided backs without fronts: {}",
            cards.unmatched_backs().len()
        );
    }
    println!("  Output pages: {}", stats.output_pages);

    if args.stats_only {
        return Ok(());
    }

    let assets = SheetAssets::load(&options.assets_dir, options.paper_size, options.ppi).await?;
    let pages = card_sheets::generate_sheets(cards, layout, options.clone(), assets).await?;
    if pages.is_empty() {
        println!("No pages were generated");
        return Ok(());
    }

    let page_count = pages.len();
    match options.output_kind {
        OutputKind::Pdf => {
            card_sheets::save_pdf(pages, &options.output_path, options.ppi, options.quality)
                .await?;
        }
        OutputKind::Images => {
            card_sheets::save_images(pages, &options.output_path).await?;
        }
    }
    println!(
        "Generated {} pages → {}",
        page_count,
        options.output_path.display()
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    StderrLogger::new(level).init()?;

    match cli.command {
        Commands::Generate(args) => generate(args).await?,

        Commands::Offset {
            x,
            y,
            show,
            data_dir,
        } => {
            let store = OffsetStore::new(&data_dir);
            match (x, y) {
                (Some(x), Some(y)) if !show => {
                    store.save(x, y).await?;
                    println!("Offset data saved → {}", store.path().display());
                }
                _ => {
                    let offset = store.load().await?;
                    println!("x offset: {}, y offset: {}", offset.x_offset, offset.y_offset);
                }
            }
        }
    }

    Ok(())
}
