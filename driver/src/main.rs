use anyhow::Context;
use aperturecore::load_losses;
use clap::Parser;
use generator::dump::{write_dump, GeneratorConfig};
use gui_bridge::bridge::{gui_bind_address, GuiBridge};
use gui_bridge::model::VisualizationModel;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Beam-pipe aperture envelope sweep driver")]
struct Args {
    /// Aperture dump file
    file: PathBuf,
    /// Number of viewing angles over [0, 90] degrees
    #[arg(short, long, default_value_t = 10)]
    angles: usize,
    /// Radial cutoff; points at or beyond it are dropped (0 disables)
    #[arg(short, long, default_value_t = 50.0)]
    cutoff: f64,
    /// Loss dump to overlay on the envelope
    #[arg(short, long)]
    loss_file: Option<PathBuf>,
    /// Include horizontal and vertical aperture offsets
    #[arg(short, long, default_value_t = false)]
    offset: bool,
    /// Plotting style handed to the renderer: point, line or surf
    #[arg(short, long, default_value = "line")]
    style: String,
    /// Mirror the envelope across H and/or V
    #[arg(long, default_value = "")]
    mirror: String,
    /// With both mirrors, also emit the doubly reflected quadrant
    #[arg(long, default_value_t = false)]
    full_symmetry: bool,
    /// Load a workflow config from YAML (overrides the sweep flags)
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Write the renderer payload as JSON
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write a synthetic dump with this many sections to FILE first
    #[arg(long)]
    generate: Option<usize>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Keep the HTTP bridge alive for a renderer
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = 9000)]
    port: u16,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(sections) = args.generate {
        let generator = GeneratorConfig {
            sections,
            seed: args.seed,
            ..Default::default()
        };
        write_dump(&args.file, &generator)?;
    }

    let workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(
            args.angles,
            args.cutoff,
            args.offset,
            &args.mirror,
            args.full_symmetry,
            &args.style,
        )
    };

    let runner = Runner::new(workflow_config);
    let result = runner.execute(&args.file)?;

    println!(
        "{} -> {} records loaded, {} after filters, {} entries, {} points, {} rejected",
        args.file.display(),
        result.loaded_records,
        result.profile.len(),
        result.sweep.entries.len(),
        result.sweep.point_count(),
        result.sweep.rejected.len()
    );
    for rejected in &result.sweep.rejected {
        println!(
            "  unknown shape '{}' for {} at s = {}",
            rejected.code, rejected.name, rejected.s
        );
    }

    let losses = match &args.loss_file {
        Some(path) => {
            let table = load_losses(path)
                .with_context(|| format!("loading loss dump {}", path.display()))?;
            println!("{} -> {} loss events", path.display(), table.len());
            table.overlay_points()
        }
        None => Vec::new(),
    };

    let model = VisualizationModel::new(
        Some(args.file.display().to_string()),
        result.style,
        result.sweep,
    )
    .with_losses(losses);

    if let Some(path) = &args.output {
        let file = File::create(path)
            .with_context(|| format!("creating output {}", path.display()))?;
        serde_json::to_writer(BufWriter::new(file), &model)
            .with_context(|| format!("writing output {}", path.display()))?;
    }

    let gui_bridge = GuiBridge::new(Arc::new(runner), Arc::new(result.profile));
    gui_bridge.publish(&model)?;

    if args.serve {
        let address = gui_bind_address(args.port);
        gui_bridge.serve(address);
        gui_bridge.publish_status(&format!("HTTP bridge on {address} (Ctrl+C to stop)..."));
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
