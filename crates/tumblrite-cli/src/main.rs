mod fetch;
mod source;

use std::io::Write;
use std::path::PathBuf;
use std::{fs, io, process};

use anyhow::Context;
use clap::Parser;
use env_logger::fmt::style::{AnsiColor, Color, Style};
use log::LevelFilter;

use tumblrite::scrape::MAX_SEARCH_PAGES;
use tumblrite::{tag_title, ArchiveService, MalformedPolicy, Options, PageTemplate, PostRecord};

use crate::source::{collect_inputs, load_records, RecordCache};

const PROGRAM: &str = "tumblrite";
const PROGRAM_STYLE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightYellow)));
const DEFAULT_TEMPLATE: &str = include_str!("template.html");
const DEFAULT_TITLE: &str = "Archive";

#[derive(Parser, Debug)]
#[command(
    name = "tumblrite",
    version,
    about = "Archive Tumblr posts into a single HTML page"
)]
struct Cli {
    /// NPF JSON files (one post or an array) or directories of them
    #[arg(required_unless_present = "search")]
    inputs: Vec<PathBuf>,

    /// Download the posts of a https://BLOG.tumblr.com/tagged/TAG search
    #[arg(long, value_name = "URL")]
    search: Option<String>,

    /// Search pages to read at most
    #[arg(long, default_value_t = MAX_SEARCH_PAGES)]
    max_pages: usize,

    /// Write the page here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page template with data-slot="post-list", "post" and "title" slots
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Page title
    #[arg(long, conflicts_with = "tag_url")]
    title: Option<String>,

    /// Derive the page title from a https://BLOG.tumblr.com/tagged/TAG address
    #[arg(long)]
    tag_url: Option<String>,

    /// Insert block text verbatim, ignoring inline formatting
    #[arg(long)]
    no_formatting: bool,

    /// Leave out avatar/name/permalink headers of reblogged posts
    #[arg(long)]
    no_reblog_headers: bool,

    /// Render blocks with improperly nested formatting as plain text
    #[arg(long)]
    plain_text_fallback: bool,

    /// Skip posts that fail to download or render instead of aborting the run
    #[arg(long)]
    skip_malformed: bool,

    /// Stop after this many posts
    #[arg(long)]
    max_posts: Option<usize>,

    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl From<&Cli> for Options {
    fn from(cli: &Cli) -> Self {
        let mut result = Options::default();

        if cli.no_formatting {
            result.use_formatting = false;
        }

        if cli.no_reblog_headers {
            result.include_reblog_headers = false;
        }

        if cli.plain_text_fallback {
            result.malformed_policy = MalformedPolicy::PlainText;
        }

        result
    }
}

impl Cli {
    fn page_title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }

        let Some(url) = self.tag_url.as_deref().or(self.search.as_deref()) else {
            return DEFAULT_TITLE.to_string();
        };

        tag_title(url).unwrap_or_else(|| {
            log::warn!("'{}' is not a tag search address, using default title", url);
            DEFAULT_TITLE.to_string()
        })
    }

    fn post_limit(&self) -> usize {
        self.max_posts.unwrap_or(usize::MAX)
    }

    fn log_level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::Error,
            (false, 0) => LevelFilter::Info,
            (false, 1) => LevelFilter::Debug,
            (false, _) => LevelFilter::Trace,
        }
    }
}

fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{style}{}{style:#}: {PROGRAM_STYLE}{}{PROGRAM_STYLE:#}: {}",
                record.level(),
                PROGRAM,
                record.args()
            )
        })
        .init();
}

fn load_template(cli: &Cli) -> anyhow::Result<PageTemplate> {
    let Some(path) = &cli.template else {
        return Ok(PageTemplate::parse(DEFAULT_TEMPLATE)?);
    };

    let html = fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    PageTemplate::parse(&html).with_context(|| format!("Unusable template {}", path.display()))
}

/// Records from the input files followed by those of the search, if any
fn gather_records(cli: &Cli) -> anyhow::Result<Vec<PostRecord>> {
    let files = collect_inputs(&cli.inputs)?;
    let mut records = load_records(&files)?;

    if let Some(search_url) = &cli.search {
        let limit = cli.post_limit().saturating_sub(records.len());
        let fetched = fetch::fetch_search(search_url, cli.max_pages, limit, cli.skip_malformed)?;
        records.extend(fetched);
    }

    Ok(records)
}

fn write_page(cli: &Cli, page: &str) -> anyhow::Result<()> {
    if let Some(path) = &cli.output {
        return fs::write(path, page).with_context(|| format!("Failed to write {}", path.display()));
    }

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(page.as_bytes())
        .context("Failed to write to stdout")
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let template = load_template(cli)?;
    let records = gather_records(cli)?;

    let mut cache = RecordCache::new();
    for record in &records {
        cache.insert(record);
    }
    log::debug!("Cached {} record(s)", cache.len());

    let limit = cli.post_limit();
    let total = records.len().min(limit);
    let service = ArchiveService::with_options(Options::from(cli));

    let mut posts = Vec::with_capacity(total);
    for (index, record) in records.iter().take(limit).enumerate() {
        log::info!("Rendering post {}/{} ({})", index + 1, total, record.id);
        let record = cache.resolve(record);

        match service.render_post(&record) {
            Ok(rendered) => posts.push(rendered.node),
            Err(err) if cli.skip_malformed => {
                log::warn!("Skipping post {}: {}", record.id, err);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to render post {}", record.id));
            }
        }
    }

    let page = template.render_to_string(&cli.page_title(), &posts);
    write_page(cli, &page)?;

    log::info!("Archived {} post(s)", posts.len());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    if let Err(err) = run(&cli) {
        log::error!("{:#}", err);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TAG_URL: &str = "https://staff.tumblr.com/tagged/cute+cats";

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tumblrite").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_program_name_is_bright_yellow() {
        let color = Color::Ansi(AnsiColor::BrightYellow);
        assert_eq!(PROGRAM_STYLE.get_fg_color(), Some(color));
        assert!(PROGRAM_STYLE.render().to_string().contains("93"));
    }

    #[test]
    fn test_default_options() {
        let options = Options::from(&parse(&["posts"]));
        assert!(options.use_formatting);
        assert!(options.include_reblog_headers);
        assert_eq!(options.malformed_policy, MalformedPolicy::Abort);
    }

    #[test]
    fn test_flags_map_to_options() {
        let cli = parse(&[
            "--no-formatting",
            "--no-reblog-headers",
            "--plain-text-fallback",
            "posts",
        ]);
        let options = Options::from(&cli);
        assert!(!options.use_formatting);
        assert!(!options.include_reblog_headers);
        assert_eq!(options.malformed_policy, MalformedPolicy::PlainText);
    }

    #[test]
    fn test_page_title() {
        assert_eq!(parse(&["posts"]).page_title(), "Archive");
        assert_eq!(parse(&["--title", "Mine", "posts"]).page_title(), "Mine");
        let tagged = parse(&["--tag-url", TAG_URL, "posts"]);
        assert_eq!(tagged.page_title(), "Cute Cats");
        assert!(Cli::try_parse_from(["tumblrite"]).is_err());
    }

    #[test]
    fn test_search_replaces_inputs() {
        let cli = parse(&["--search", TAG_URL]);
        assert!(cli.inputs.is_empty());
        assert_eq!(cli.max_pages, MAX_SEARCH_PAGES);
        assert_eq!(cli.page_title(), "Cute Cats");

        let cli = parse(&["--search", TAG_URL, "--max-pages", "2"]);
        assert_eq!(cli.max_pages, 2);

        let cli = parse(&["--search", TAG_URL, "--title", "Mine"]);
        assert_eq!(cli.page_title(), "Mine");
    }

    #[test]
    fn test_default_template_is_valid() {
        assert!(PageTemplate::parse(DEFAULT_TEMPLATE).is_ok());
    }

    #[test]
    fn test_run_writes_page() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("posts.json");
        let output = dir.path().join("out.html");
        fs::write(
            &input,
            r#"[
                {"id": "1", "content": [{"type": "text", "text": "hello", "formatting": [{"start": 0, "end": 5, "type": "bold"}]}]},
                {"id": "2", "content": [{"type": "text", "text": "abcdefgh", "formatting": [
                    {"start": 0, "end": 5, "type": "bold"}, {"start": 2, "end": 7, "type": "italic"}
                ]}]}
            ]"#,
        )
        .unwrap();

        let input_arg = input.to_string_lossy().into_owned();
        let output_arg = output.to_string_lossy().into_owned();

        let strict = parse(&["-o", &output_arg, &input_arg]);
        assert!(run(&strict).is_err());

        let lenient = parse(&[
            "--skip-malformed",
            "--title",
            "Test",
            "-o",
            &output_arg,
            &input_arg,
        ]);
        run(&lenient).unwrap();
        let page = fs::read_to_string(&output).unwrap();
        assert!(page.contains("<b>hello</b>"));
        assert!(!page.contains("abcdefgh"));
        assert!(page.contains("<title data-slot=\"title\">Test</title>"));
    }
}
