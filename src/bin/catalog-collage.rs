use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

use catalog_collage::{
    BusyFlag, CollageConfig, FilterMode, FilterState, FsFetcher, GroupBy, OwnershipStore,
    group_products,
};

#[derive(Parser, Debug)]
#[command(name = "catalog-collage", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose the filtered catalog into a PNG collage.
    Render(RenderArgs),
    /// List every tag in the catalog (the filter vocabulary).
    Tags(CatalogArgs),
    /// Show how the filtered catalog groups into series.
    Groups(GroupsArgs),
    /// Show or change the owned product set.
    Own(OwnArgs),
}

#[derive(Args, Debug)]
struct CatalogArgs {
    /// Proto-style schema declaring the root message.
    #[arg(long)]
    schema: PathBuf,

    /// Textproto catalog data.
    #[arg(long)]
    data: PathBuf,

    /// JSON configuration; defaults apply to anything it omits.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Active tag (repeatable).
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Extra filter dimension as NAME=TAG[,TAG...] (repeatable).
    #[arg(long = "dimension", value_parser = parse_dimension)]
    dimensions: Vec<(String, Vec<String>)>,

    /// How active tags combine; defaults to the configured mode.
    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,

    /// Lay products out as one flat grid instead of series sections.
    #[arg(long)]
    flat: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    #[command(flatten)]
    filter: FilterArgs,

    /// Root directory for relative image paths (defaults to the data file's directory).
    #[arg(long)]
    images_root: Option<PathBuf>,

    /// Owned product ids file.
    #[arg(long, default_value = catalog_collage::DEFAULT_OWNERSHIP_FILE)]
    owned: PathBuf,

    /// Output PNG path; a timestamped name inside --out-dir is used when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Directory for the generated file name.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Also print the PNG as a data URL on stdout.
    #[arg(long)]
    data_url: bool,
}

#[derive(Args, Debug)]
struct GroupsArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(Args, Debug)]
struct OwnArgs {
    /// Owned product ids file.
    #[arg(long, default_value = catalog_collage::DEFAULT_OWNERSHIP_FILE)]
    owned: PathBuf,

    /// Product ids to toggle, in order.
    #[arg(long = "toggle")]
    toggle: Vec<String>,

    /// Forget every owned id (removes the file).
    #[arg(long, conflicts_with = "toggle")]
    clear: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    /// Every active tag must be present.
    All,
    /// Per dimension, any active tag must be present.
    Any,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Tags(args) => cmd_tags(args),
        Command::Groups(args) => cmd_groups(args),
        Command::Own(args) => cmd_own(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_dimension(s: &str) -> Result<(String, Vec<String>), String> {
    let (name, tags) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=TAG[,TAG...], got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("dimension name must be non-empty".to_owned());
    }
    let tags = tags
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect();
    Ok((name.to_owned(), tags))
}

fn read_config(path: Option<&Path>) -> anyhow::Result<CollageConfig> {
    match path {
        Some(p) => CollageConfig::load(p).with_context(|| format!("load config '{}'", p.display())),
        None => Ok(CollageConfig::default()),
    }
}

fn load(args: &CatalogArgs) -> anyhow::Result<(CollageConfig, catalog_collage::LoadedCatalog)> {
    let config = read_config(args.config.as_deref())?;
    let loaded = catalog_collage::load_catalog_from_paths(&args.schema, &args.data, &config)
        .with_context(|| format!("load catalog '{}'", args.data.display()))?;
    Ok((config, loaded))
}

fn apply_filter_args(args: &FilterArgs, config: &mut CollageConfig) -> FilterState {
    if args.flat {
        config.group_by = GroupBy::None;
    }
    let mode = match args.mode {
        Some(ModeChoice::All) => FilterMode::AllTags,
        Some(ModeChoice::Any) => FilterMode::AnyPerDimension,
        None => config.filter_mode,
    };
    let mut state = FilterState {
        mode,
        ..FilterState::default()
    };
    if !args.tags.is_empty() {
        state = state.with_dimension("tags", args.tags.iter().cloned());
    }
    for (name, tags) in &args.dimensions {
        state = state.with_dimension(name.clone(), tags.iter().cloned());
    }
    state
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (mut config, loaded) = load(&args.catalog)?;
    let filter = apply_filter_args(&args.filter, &mut config);

    let store = OwnershipStore::new(&args.owned);
    let ownership = store.load();

    let images_root = args.images_root.clone().unwrap_or_else(|| {
        args.catalog
            .data
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let fetcher = FsFetcher::new(images_root);

    let output = catalog_collage::render_collage_blocking(
        &loaded.index,
        &filter,
        &ownership,
        &config,
        &fetcher,
        &BusyFlag::new(),
    )?;

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| args.out_dir.join(&output.filename));
    catalog_collage::write_png(&out, &output.png)?;

    if args.data_url {
        println!("{}", catalog_collage::to_data_url(&output.png));
    }
    eprintln!(
        "wrote {} ({}, {} drawn, {} placeholders)",
        out.display(),
        output.progress.label(),
        output.report.drawn,
        output.report.placeholders
    );
    Ok(())
}

fn cmd_tags(args: CatalogArgs) -> anyhow::Result<()> {
    let (_, loaded) = load(&args)?;
    for tag in loaded.index.all_tags() {
        println!("{tag}");
    }
    Ok(())
}

fn cmd_groups(args: GroupsArgs) -> anyhow::Result<()> {
    let (mut config, loaded) = load(&args.catalog)?;
    let filter = apply_filter_args(&args.filter, &mut config);

    let selected = loaded.index.select(&filter, config.vendor.as_deref());
    if selected.is_empty() {
        println!("no matching products");
        return Ok(());
    }
    for group in group_products(selected.iter().copied(), &config.series, config.group_by) {
        println!(
            "{} ({})",
            group.title().unwrap_or("All products"),
            group.members.len()
        );
        for p in &group.members {
            println!("  {}\t{}", p.product_id, p.display_title());
        }
    }
    Ok(())
}

fn cmd_own(args: OwnArgs) -> anyhow::Result<()> {
    let store = OwnershipStore::new(&args.owned);
    if args.clear {
        store.clear()?;
        eprintln!("cleared {}", store.path().display());
        return Ok(());
    }

    let mut owned = store.load();
    for id in &args.toggle {
        let now_owned = store.toggle(&mut owned, id)?;
        eprintln!("{id}: {}", if now_owned { "owned" } else { "not owned" });
    }
    for id in owned.iter() {
        println!("{id}");
    }
    Ok(())
}
