use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use webpress::batch::{self, BatchError, DocumentStore};
use webpress::convert::Converter;
use webpress::ledger::Ledger;
use webpress::output;
use webpress::settings::{ConversionSettings, stock_settings_toml};
use webpress::site::SiteContext;

/// Release builds report the crate version; anything else reports the
/// commit it was built from.
fn version_string() -> &'static str {
    static VERSION: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION
        .get_or_init(|| {
            if env!("ON_RELEASE_TAG") == "true" {
                env!("CARGO_PKG_VERSION").to_string()
            } else {
                match env!("GIT_HASH") {
                    "" => "dev@unknown".to_string(),
                    hash => format!("dev@{hash}"),
                }
            }
        })
        .as_str()
}

#[derive(Parser)]
#[command(name = "webpress")]
#[command(about = "Convert site images to WebP and rewrite the documents that use them")]
#[command(long_about = "\
Convert site images to WebP and rewrite the documents that use them

Webpress converts JPEG/PNG files to WebP and rewrites image references in
HTML documents with a dual-source fallback, so consumers that cannot render
WebP still get the original file:

  <img src=\"photo.jpg\">
    becomes
  <picture><source type=\"image/webp\" srcset=\"photo.webp\"><img src=\"photo.jpg\"></picture>

The WebP file replaces the raster extension (photo.jpg → photo.webp) and is
written next to the source. Originals are kept unless keep_original = false.

Batch runs walk a directory of HTML documents, convert every internal image
they reference, rewrite the documents in place, and record per-document
status in a SQLite ledger. Re-running a batch is cheap and safe: up-to-date
conversions are skipped and already-rewritten references are left alone.

Run 'webpress gen-config' to generate a documented webpress.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Settings file
    #[arg(long, default_value = "webpress.toml", global = true)]
    settings: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert individual image files to WebP
    Convert {
        /// JPEG/PNG files to convert
        files: Vec<PathBuf>,
    },
    /// Convert and rewrite a directory of HTML documents
    Batch(BatchArgs),
    /// Show the conversion ledger
    Status {
        /// Ledger database file
        #[arg(long, default_value = "webpress.sqlite")]
        ledger: PathBuf,
    },
    /// Print a stock webpress.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct BatchArgs {
    /// Directory of HTML documents to rewrite in place
    #[arg(long, default_value = "documents")]
    documents: PathBuf,

    /// Directory holding the site's uploaded media files
    #[arg(long, default_value = "media")]
    media: PathBuf,

    /// The site's base URL, used to classify references as internal
    #[arg(long, default_value = "https://localhost")]
    base_url: String,

    /// Public URL path under which the media directory is served
    #[arg(long, default_value = "/media")]
    media_url_path: String,

    /// Ledger database file
    #[arg(long, default_value = "webpress.sqlite")]
    ledger: PathBuf,
}

/// Document store over a directory of HTML files.
///
/// Document ids are positions in the sorted file list, so they are stable
/// across runs as long as the file set is — which is what the ledger needs
/// for re-runs over the same tree.
struct HtmlDirStore {
    files: Vec<PathBuf>,
}

impl HtmlDirStore {
    fn open(dir: &Path) -> Result<Self, std::io::Error> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
            })
            .collect();
        files.sort();
        Ok(Self { files })
    }

    fn document_ids(&self) -> Vec<i64> {
        (1..=self.files.len() as i64).collect()
    }

    fn path_for(&self, document_id: i64) -> Result<&Path, BatchError> {
        usize::try_from(document_id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|index| self.files.get(index))
            .map(PathBuf::as_path)
            .ok_or_else(|| BatchError::Store(format!("no document {document_id}")))
    }
}

impl DocumentStore for HtmlDirStore {
    fn load_content(&self, document_id: i64) -> Result<String, BatchError> {
        let path = self.path_for(document_id)?;
        std::fs::read_to_string(path)
            .map_err(|e| BatchError::Store(format!("{}: {e}", path.display())))
    }

    fn store_content(&mut self, document_id: i64, content: &str) -> Result<(), BatchError> {
        let path = self.path_for(document_id)?.to_path_buf();
        std::fs::write(&path, content)
            .map_err(|e| BatchError::Store(format!("{}: {e}", path.display())))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert { files } => {
            let settings = ConversionSettings::load(&cli.settings)?;
            let converter = Converter::new(settings);
            for file in &files {
                let outcome = converter.convert_image(file);
                output::print_outcome(file, &outcome);
            }
        }
        Command::Batch(args) => {
            let settings = ConversionSettings::load(&cli.settings)?;
            let converter = Converter::new(settings);
            let ctx = SiteContext::new(&args.base_url, &args.media_url_path, &args.media);
            let ledger = Ledger::open(&args.ledger)?;
            let mut store = HtmlDirStore::open(&args.documents)?;
            let ids = store.document_ids();

            let summary = batch::process_batch(&ids, &mut store, &converter, &ctx, &ledger)?;
            output::print_batch_summary(&summary);
        }
        Command::Status { ledger } => {
            let ledger = Ledger::open(&ledger)?;
            let entries = ledger.all_entries()?;
            let stats = ledger.stats()?;
            output::print_status(&entries, &stats);
        }
        Command::GenConfig => {
            print!("{}", stock_settings_toml());
        }
    }

    Ok(())
}
