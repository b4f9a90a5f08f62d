use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::GrayImage;
use lgm_core::Image;
use lgm_graph::{DenseGraph, GroupId, PairwiseGraph};
use lgm_layered::{EdgeKind, EdgeTypes, GroupSelector, LayeredConfig, LayeredGraph, edge_count};
use lgm_train::{ContrastPottsModel, DEFAULT_CONTRAST_BETA, SampleCollector, potts_potential};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Dark and bright.
const FILL_STATES: usize = 2;

#[derive(Parser, Debug)]
#[command(name = "lgm_gallery")]
#[command(about = "Build layered grid models on external fixtures")]
struct Cli {
    /// Log filter, e.g. `info` or `lgm_layered=debug`.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(name = "topology")]
    Topology(TopologyArgs),
    #[command(name = "fill")]
    Fill(FillArgs),
    #[command(name = "sample")]
    Sample(SampleArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum EdgeFamily {
    Grid,
    Diag,
    Link,
}

#[derive(Args, Debug, Clone)]
struct GraphArgs {
    #[arg(long, default_value_t = 1)]
    layers: u16,
    #[arg(long, value_enum, value_delimiter = ',', default_value = "grid")]
    edge_types: Vec<EdgeFamily>,
    #[arg(long, default_value = "docs/fig/raw")]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct TopologyArgs {
    #[command(flatten)]
    graph: GraphArgs,
    #[arg(long, required = true)]
    width: usize,
    #[arg(long, required = true)]
    height: usize,
}

#[derive(Args, Debug, Clone)]
struct FillArgs {
    #[command(flatten)]
    graph: GraphArgs,
    #[arg(long, required = true)]
    input: PathBuf,
    /// JSON file overriding the flags below.
    #[arg(long)]
    model: Option<PathBuf>,
    #[arg(long, default_value_t = 10.0)]
    smoothing: f32,
    #[arg(long, default_value_t = 1.0)]
    weight: f32,
    /// Line `A,B,C` (A*x + B*y + C = 0) whose crossing edges are regrouped.
    #[arg(long, value_parser = parse_line, allow_hyphen_values = true)]
    line: Option<[f32; 3]>,
    #[arg(long, default_value_t = 2)]
    group: GroupId,
    /// Potts diagonal set on the regrouped edges.
    #[arg(long, default_value_t = 1.0)]
    group_val: f32,
}

#[derive(Args, Debug, Clone)]
struct SampleArgs {
    #[command(flatten)]
    graph: GraphArgs,
    #[arg(long, required = true)]
    input: PathBuf,
    /// Label image; pixel values are the class labels.
    #[arg(long, required = true)]
    truth: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ModelFile {
    layers: Option<u16>,
    edge_types: Option<Vec<EdgeFamily>>,
    smoothing: Option<f32>,
    weight: Option<f32>,
    line: Option<[f32; 3]>,
    group: Option<GroupId>,
    group_val: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
struct GroupCountDto {
    group: GroupId,
    count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
struct KindCounts {
    horizontal: usize,
    vertical: usize,
    diagonal: usize,
    link: usize,
}

#[derive(Debug, Clone, Serialize)]
struct MetaTopology {
    width: usize,
    height: usize,
    layers: usize,
    edge_types: String,
    num_nodes: usize,
    num_edges: usize,
    expected_edges: usize,
    kinds: KindCounts,
}

#[derive(Debug, Clone, Serialize)]
struct MetaFill {
    width: usize,
    height: usize,
    layers: usize,
    edge_types: String,
    num_nodes: usize,
    num_edges: usize,
    smoothing: f32,
    weight: f32,
    contrast_beta: f32,
    line: Option<[f32; 3]>,
    regrouped: usize,
    groups: Vec<GroupCountDto>,
}

#[derive(Debug, Clone, Serialize)]
struct MetaSample {
    width: usize,
    height: usize,
    layers: usize,
    edge_types: String,
    num_features: usize,
    edge_samples: usize,
    link_samples: usize,
    num_labels: usize,
    /// Row-major co-occurrence counts over within-layer samples.
    label_pair_counts: Vec<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.cmd {
        Command::Topology(args) => run_topology(args),
        Command::Fill(args) => run_fill(args),
        Command::Sample(args) => run_sample(args),
    }
}

fn init_logging(filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_new(filter).with_context(|| format!("parsing log filter '{filter}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

fn run_topology(args: TopologyArgs) -> Result<()> {
    let case_dir = prepare_case(&args.graph.out, "topology")?;
    let cfg = layered_config(args.graph.layers, &args.graph.edge_types, FILL_STATES);

    let mut store = DenseGraph::new();
    let mut g = LayeredGraph::new(&mut store, cfg).context("validating graph config")?;
    g.build_graph(args.width, args.height)
        .with_context(|| format!("building {}x{} graph", args.width, args.height))?;

    let kinds = count_kinds(&g)?;
    let expected = edge_count(args.width, args.height, g.layers(), g.edge_types());
    if expected != g.graph().num_edges() {
        bail!(
            "edge count mismatch: closed form {}, built {}.",
            expected,
            g.graph().num_edges()
        );
    }
    info!(
        "topology {}x{}x{} ({}): {} nodes, {} edges",
        args.width,
        args.height,
        g.layers(),
        g.edge_types(),
        g.graph().num_nodes(),
        g.graph().num_edges()
    );

    write_json(
        case_dir.join("meta.json"),
        &MetaTopology {
            width: args.width,
            height: args.height,
            layers: g.layers(),
            edge_types: g.edge_types().to_string(),
            num_nodes: g.graph().num_nodes(),
            num_edges: g.graph().num_edges(),
            expected_edges: expected,
            kinds,
        },
    )
}

fn run_fill(args: FillArgs) -> Result<()> {
    ensure_file_exists(&args.input, "input")?;
    let file: ModelFile = match &args.model {
        Some(path) => {
            ensure_file_exists(path, "model")?;
            read_json(path)?
        }
        None => ModelFile::default(),
    };

    let layers = file.layers.unwrap_or(args.graph.layers);
    let families = file.edge_types.unwrap_or(args.graph.edge_types.clone());
    let smoothing = file.smoothing.unwrap_or(args.smoothing);
    let weight = file.weight.unwrap_or(args.weight);
    let line = file.line.or(args.line);
    let group = file.group.unwrap_or(args.group);
    let group_val = file.group_val.unwrap_or(args.group_val);

    let case_dir = prepare_case(&args.graph.out, "fill")?;
    copy_into(&args.input, &case_dir.join("input.png"))?;
    let (features, luma) = load_input(&args.input)?;
    let scores = intensity_scores(&luma)?;

    let cfg = layered_config(layers, &families, FILL_STATES);
    let mut store = DenseGraph::new();
    let mut g = LayeredGraph::new(&mut store, cfg).context("validating graph config")?;

    g.set_graph(&scores.as_view())
        .context("filling node potentials")?;
    g.fill_edges(
        &ContrastPottsModel,
        None,
        &features,
        &[smoothing, DEFAULT_CONTRAST_BETA],
        weight,
        1.0,
    )
    .context("filling edge potentials")?;

    let mut regrouped = 0;
    if let Some([a, b, c]) = line {
        regrouped = g
            .define_edge_group(a, b, c, group)
            .with_context(|| format!("regrouping edges crossing {a}*x + {b}*y + {c} = 0"))?;
        g.set_edges(
            GroupSelector::Group(group),
            &potts_potential(group_val, FILL_STATES),
        )
        .with_context(|| format!("setting potentials of group {group}"))?;
        if regrouped == 0 {
            warn!("line {a}*x + {b}*y + {c} = 0 does not cross the image");
        }
    }

    let (width, height) = (luma.width(), luma.height());
    save_luma_raw(
        case_dir.join("unary.png"),
        width,
        height,
        base_layer_argmax(g.graph(), width * height),
    )?;

    let groups = group_histogram(g.graph());
    info!(
        "filled {}x{} model: {} edges, {} regrouped",
        width,
        height,
        g.graph().num_edges(),
        regrouped
    );

    write_json(
        case_dir.join("meta.json"),
        &MetaFill {
            width,
            height,
            layers: g.layers(),
            edge_types: g.edge_types().to_string(),
            num_nodes: g.graph().num_nodes(),
            num_edges: g.graph().num_edges(),
            smoothing,
            weight,
            contrast_beta: DEFAULT_CONTRAST_BETA,
            line,
            regrouped,
            groups,
        },
    )
}

fn run_sample(args: SampleArgs) -> Result<()> {
    ensure_file_exists(&args.input, "input")?;
    ensure_file_exists(&args.truth, "truth")?;

    let case_dir = prepare_case(&args.graph.out, "sample")?;
    let (features, _) = load_input(&args.input)?;
    let (_, labels) = load_input(&args.truth)?;
    if features.size() != labels.size() {
        bail!(
            "truth dimensions {:?} do not match input dimensions {:?}.",
            labels.size(),
            features.size()
        );
    }

    let cfg = layered_config(args.graph.layers, &args.graph.edge_types, FILL_STATES);
    let mut store = DenseGraph::new();
    let mut g = LayeredGraph::new(&mut store, cfg).context("validating graph config")?;
    g.build_graph(features.width(), features.height())
        .context("building graph")?;

    let mut edges = SampleCollector::new();
    let mut links = SampleCollector::new();
    g.add_feature_vecs_split(&mut edges, &mut links, &features, &labels.as_view())
        .context("extracting edge samples")?;

    let num_labels = labels.data().iter().max().map_or(0, |&m| m as usize + 1);
    let mut rows = Vec::with_capacity(g.graph().num_edges());
    let (mut next_edge, mut next_link) = (edges.samples().iter(), links.samples().iter());
    for (id, _) in g.graph().edges() {
        let kind = g.edge_kind(id)?;
        let sample = if kind.is_link() {
            next_link.next()
        } else {
            next_edge.next()
        }
        .with_context(|| format!("no sample recorded for edge {id}"))?;
        rows.push(format!(
            "{id},{},{},{},{},{}",
            kind_name(kind),
            sample.gt1,
            sample.gt2,
            join_features(&sample.f1),
            join_features(&sample.f2)
        ));
    }
    write_csv(case_dir.join("samples.csv"), "edge,kind,gt1,gt2,f1,f2", &rows)?;

    info!(
        "extracted {} edge and {} link samples over {} labels",
        edges.len(),
        links.len(),
        num_labels
    );

    write_json(
        case_dir.join("meta.json"),
        &MetaSample {
            width: features.width(),
            height: features.height(),
            layers: g.layers(),
            edge_types: g.edge_types().to_string(),
            num_features: features.channels(),
            edge_samples: edges.len(),
            link_samples: links.len(),
            num_labels,
            label_pair_counts: edges.label_pair_counts(num_labels),
        },
    )
}

fn layered_config(layers: u16, families: &[EdgeFamily], num_states: usize) -> LayeredConfig {
    let mut types = EdgeTypes::NONE;
    for family in families {
        types |= match family {
            EdgeFamily::Grid => EdgeTypes::GRID,
            EdgeFamily::Diag => EdgeTypes::DIAG,
            EdgeFamily::Link => EdgeTypes::LINK,
        };
    }
    LayeredConfig::default()
        .with_layers(layers)
        .with_edge_types(types)
        .with_num_states(num_states)
}

fn count_kinds(g: &LayeredGraph<'_, DenseGraph>) -> Result<KindCounts> {
    let mut counts = KindCounts::default();
    for (id, _) in g.graph().edges() {
        match g.edge_kind(id)? {
            EdgeKind::Horizontal => counts.horizontal += 1,
            EdgeKind::Vertical => counts.vertical += 1,
            EdgeKind::Diagonal => counts.diagonal += 1,
            EdgeKind::Link => counts.link += 1,
        }
    }
    Ok(counts)
}

fn kind_name(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Horizontal => "horizontal",
        EdgeKind::Vertical => "vertical",
        EdgeKind::Diagonal => "diagonal",
        EdgeKind::Link => "link",
    }
}

fn group_histogram(graph: &DenseGraph) -> Vec<GroupCountDto> {
    let mut counts = BTreeMap::new();
    for (_, rec) in graph.edges() {
        *counts.entry(rec.group).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(group, count)| GroupCountDto { group, count })
        .collect()
}

/// Two scores per pixel: darkness then brightness, both in `[0, 1]`.
fn intensity_scores(luma: &Image<u8>) -> Result<Image<f32>> {
    let data = luma
        .data()
        .iter()
        .flat_map(|&v| {
            let bright = v as f32 / 255.0;
            [1.0 - bright, bright]
        })
        .collect();
    Image::from_vec(luma.width(), luma.height(), FILL_STATES, data)
        .context("constructing intensity scores")
}

/// Base-layer nodes rendered black (dark wins) or white (bright wins).
fn base_layer_argmax(graph: &DenseGraph, layer_size: usize) -> Vec<u8> {
    (0..layer_size)
        .map(|id| match graph.node_potential(id) {
            Some(p) if p[1] > p[0] => 255,
            _ => 0,
        })
        .collect()
}

fn join_features(f: &[u8]) -> String {
    f.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_line(s: &str) -> Result<[f32; 3], String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    <[f32; 3]>::try_from(parts)
        .map_err(|p| format!("expected three comma-separated values A,B,C, got {}", p.len()))
}

fn prepare_case(out: &Path, case_name: &str) -> Result<PathBuf> {
    let case_dir = out.join(case_name);
    fs::create_dir_all(&case_dir)
        .with_context(|| format!("creating output directory {}", case_dir.display()))?;
    Ok(case_dir)
}

fn copy_into(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .map(|_| ())
        .with_context(|| format!("copying {} -> {}", from.display(), to.display()))
}

/// RGB feature vectors and the luma plane of the image at `path`.
fn load_input(path: &Path) -> Result<(Image<u8>, Image<u8>)> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let rgb = dyn_img.to_rgb8();
    let luma = dyn_img.to_luma8();
    let (w, h) = rgb.dimensions();

    let features = Image::from_vec(w as usize, h as usize, 3, rgb.into_raw())
        .with_context(|| format!("constructing feature image from {}", path.display()))?;
    let luma = Image::from_vec(w as usize, h as usize, 1, luma.into_raw())
        .with_context(|| format!("constructing luma image from {}", path.display()))?;
    Ok((features, luma))
}

fn save_luma_raw(path: PathBuf, width: usize, height: usize, data: Vec<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(width as u32, height as u32, data)
        .context("constructing GrayImage from raw bytes")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn write_csv(path: PathBuf, header: &str, rows: &[String]) -> Result<()> {
    let mut file =
        fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    writeln!(file, "{header}").context("writing csv header")?;
    for row in rows {
        writeln!(file, "{row}").context("writing csv row")?;
    }
    Ok(())
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
