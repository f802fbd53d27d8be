use clap::{ArgAction, Parser, Subcommand};
use photo_report::export::{self, ExportRequest, PostExportPolicy};
use photo_report::layout::{PageGeometry, plan_pages};
use photo_report::logging::{self, LogConfig};
use photo_report::render::{FsAssetLoader, PdfSink};
use photo_report::session::{EditOp, ReportSession};
use photo_report::types::OrderingCriterion;
use photo_report::{config, output, scan};
use std::path::{Path, PathBuf};
use tracing::info;

fn version_string() -> &'static str {
    let build_id = env!("PHOTO_REPORT_BUILD_ID");
    if build_id.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("dev@{build_id}").into_boxed_str())
    }
}

/// Inputs and ordering shared by every command that loads images.
#[derive(clap::Args, Clone)]
struct OrderArgs {
    /// Image files or directories (walked recursively)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Order applied after loading: manual, name, or date (overrides report.toml)
    #[arg(long)]
    order: Option<OrderingCriterion>,

    /// Edit replayed after ordering; repeatable, applied in order
    #[arg(long = "op", value_name = "EDIT")]
    ops: Vec<EditOp>,
}

#[derive(Parser)]
#[command(name = "photo-report")]
#[command(about = "Order photos and export them as a paginated A4 photo report")]
#[command(long_about = "\
Order photos and export them as a paginated A4 photo report

Every page carries a header (left logo, title, right logo, rule), up to six
photos in two columns of 80x75mm cells, and a \"Página p de N\" footer.

Ordering:

  --order manual|name|date     initial order (date = newest first)
  --op drag:FROM:TO            move the image at FROM to TO
  --op click:I                 click image I (select, deselect, or move the
                               selected image to I)
  --op remove:I                remove image I
  --op sort:name|date|manual   re-sort

Positions in --op are 0-based; listings show them 1-based.

Run 'photo-report gen-config' to generate a documented report.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing report.toml (also the base for logo paths)
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// More diagnostics on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the images in report order
    List(OrderArgs),
    /// Print where every image lands on which page
    Plan {
        #[command(flatten)]
        order: OrderArgs,
        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the report as a PDF
    Export {
        #[command(flatten)]
        order: OrderArgs,
        /// Base file name of the report (.pdf is added); defaults to report.toml
        #[arg(long)]
        name: Option<String>,
        /// Header title (overrides report.toml)
        #[arg(long)]
        title: Option<String>,
        /// Directory the PDF is written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Keep the collection after a successful export
        #[arg(long)]
        keep: bool,
    },
    /// Print a stock report.toml with all options documented
    GenConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&LogConfig::from_verbosity(cli.verbose, cli.quiet))?;

    match cli.command {
        Command::List(order) => {
            let session = load_session(&cli.config, &order)?;
            output::print_collection(session.engine());
        }
        Command::Plan { order, json } => {
            let session = load_session(&cli.config, &order)?;
            let layout = plan_pages(session.collection().len(), &PageGeometry::a4_photo_report());
            if json {
                println!(
                    "{}",
                    output::format_layout_json(&layout, session.collection())?
                );
            } else {
                output::print_layout(&layout, session.collection());
            }
        }
        Command::Export {
            order,
            name,
            title,
            out_dir,
            keep,
        } => {
            let report_config = config::load_config(&cli.config)?;
            let mut session = session_from(&report_config, &order)?;
            if keep {
                session.set_post_export_policy(PostExportPolicy::Keep);
            }

            let base_name = name.unwrap_or_else(|| report_config.report.filename.clone());
            let mut request = ExportRequest::from_config(&report_config, &cli.config, base_name);
            if let Some(title) = title {
                request = request.with_title(title);
            }

            let job = session.begin_export(request)?;
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_export_event(&event) {
                        println!("{}", line);
                    }
                }
            });

            let mut sink = PdfSink::new().with_title(job.title());
            let result = async {
                let document = job.run(&FsAssetLoader::new(), &mut sink, Some(tx)).await?;
                let path = export::write_artifact(&document, &out_dir).await?;
                Ok::<_, export::ExportError>((document, path))
            }
            .await;
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            let (document, path) = session.finish_export(result)?;
            output::print_export_summary(&document, &path);
            info!(
                remaining = session.collection().len(),
                "session finished"
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_session(
    config_dir: &Path,
    order: &OrderArgs,
) -> Result<ReportSession, Box<dyn std::error::Error>> {
    let report_config = config::load_config(config_dir)?;
    session_from(&report_config, order)
}

/// Scan the inputs into a fresh session, then apply ordering and edits.
fn session_from(
    report_config: &config::ReportConfig,
    order: &OrderArgs,
) -> Result<ReportSession, Box<dyn std::error::Error>> {
    let mut session = ReportSession::from_config(report_config);
    let candidates = scan::scan_inputs(&order.inputs)?;
    let found = candidates.len();
    let added = session.add(candidates)?;
    if added < found {
        info!(duplicates = found - added, "duplicate images ignored");
    }

    session.apply_criterion(order.order.unwrap_or(report_config.ordering.criterion))?;
    for op in &order.ops {
        session.apply(*op)?;
    }
    Ok(session)
}
