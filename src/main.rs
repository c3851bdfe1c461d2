//! vpdt CLI: inbound-document digest for the e-office portal.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use vpdt_digest::config::AppConfig;
use vpdt_digest::digest::Digest;
use vpdt_digest::paths::AppPaths;
use vpdt_digest::portal::{Credentials, HttpTransport, PortalClient};
use vpdt_digest::render;
use vpdt_digest::summary::{DocumentSummarizer, SummaryPipeline};

#[derive(Parser)]
#[command(name = "vpdt", version, about = "Inbound-document digest for the e-office portal")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/vpdt-digest/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the logged-in staff member's posts.
    Profile,

    /// List this year's pending inbound documents, newest first.
    Inbox,

    /// Search outbound documents and print their detail records.
    Outbound {
        /// Portal search field, e.g. `--filter nam=2024`. Repeatable.
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },

    /// Summarize the PDF attachments of inbox document N and save the audio.
    Summarize {
        /// Position in the inbox listing, starting at 1.
        index: usize,

        /// Where to write the MP3 (default: the cache directory).
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Log in, show the inbox and summarize documents on request (default).
    Interactive,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = AppPaths::resolve()?;
    let config_path = cli.config.unwrap_or_else(|| paths.config_file());
    let config = AppConfig::load_with_env(&config_path)?;
    let refresh_token = config.portal.require_refresh_token()?.to_string();

    let credentials = prompt_credentials()?;
    let mut digest = Digest::new(PortalClient::connect(config.portal.clone(), refresh_token));
    digest.open(credentials)?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Profile => {
            print!("{}", render::render_profiles(digest.profiles()));
        }

        Commands::Inbox => {
            print_inbox(&digest);
        }

        Commands::Outbound { filters } => {
            let details = digest.outbound(filters)?;
            print!("{}", render::render_outbound(&details));
        }

        Commands::Summarize { index, out } => {
            let summarizer = build_summarizer(&config)?;
            summarize_document(&digest, &summarizer, &paths, index, out)?;
        }

        Commands::Interactive => {
            interactive(&mut digest, &config, &paths)?;
        }
    }

    digest.close();
    Ok(())
}

fn interactive<T: HttpTransport>(
    digest: &mut Digest<T>,
    config: &AppConfig,
    paths: &AppPaths,
) -> Result<()> {
    print!("{}", render::render_profiles(digest.profiles()));
    print_inbox(digest);

    let stdin = std::io::stdin();
    loop {
        print!("Số văn bản để tóm tắt, r = làm mới, l = đăng nhập lại, q = thoát: ");
        std::io::stdout().flush().into_diagnostic()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).into_diagnostic()? == 0 {
            break;
        }

        match line.trim() {
            "" => continue,
            "q" => break,
            "r" => match digest.reauthenticate() {
                Ok(()) => print_inbox(digest),
                Err(e) => eprintln!("{:?}", miette::Report::new(e)),
            },
            "l" => {
                let result = prompt_credentials().and_then(|credentials| {
                    digest.relogin(credentials).map_err(miette::Report::new)
                });
                match result {
                    Ok(()) => {
                        print!("{}", render::render_profiles(digest.profiles()));
                        print_inbox(digest);
                    }
                    Err(report) => eprintln!("{report:?}"),
                }
            }
            other => match other.parse::<usize>() {
                Ok(index) => {
                    let result = build_summarizer(config).and_then(|summarizer| {
                        summarize_document(digest, &summarizer, paths, index, None)
                    });
                    if let Err(report) = result {
                        eprintln!("{report:?}");
                    }
                }
                Err(_) => println!("Không hiểu lệnh: {other}"),
            },
        }
    }
    Ok(())
}

fn print_inbox<T: HttpTransport>(digest: &Digest<T>) {
    if digest.documents().is_empty() {
        println!("Không có văn bản đến cần xử lý.");
        return;
    }
    for (i, doc) in digest.documents().iter().enumerate() {
        let links = digest.attachment_links(doc);
        print!("{}", render::render_document(i + 1, doc, &links));
    }
}

fn build_summarizer(config: &AppConfig) -> Result<DocumentSummarizer> {
    let timeout = Duration::from_secs(config.portal.timeout_secs);
    Ok(DocumentSummarizer::from_config(&config.summary, timeout)?)
}

fn summarize_document<T: HttpTransport>(
    digest: &Digest<T>,
    summarizer: &dyn SummaryPipeline,
    paths: &AppPaths,
    index: usize,
    out: Option<PathBuf>,
) -> Result<()> {
    let doc = digest.document(index)?;
    let urls = digest.attachment_urls(doc);
    if urls.is_empty() {
        println!("Văn bản không có tệp PDF đính kèm.");
        return Ok(());
    }

    let summary = summarizer.summarize(&urls)?;
    println!("{}", summary.text);
    for skipped in &summary.skipped {
        println!("(bỏ qua {}: {})", skipped.url, skipped.reason);
    }

    match summary.audio {
        Some(audio) => {
            let path = match out {
                Some(path) => path,
                None => {
                    paths.ensure_audio_dir()?;
                    let number = doc.document_number.as_deref().unwrap_or_default();
                    paths.summary_audio_file(number)
                }
            };
            std::fs::write(&path, audio).into_diagnostic()?;
            println!("Âm thanh: {}", path.display());
        }
        None => println!("(không tạo được âm thanh)"),
    }
    Ok(())
}

fn prompt_credentials() -> Result<Credentials> {
    eprint!("Tên đăng nhập: ");
    std::io::stderr().flush().into_diagnostic()?;
    let mut username = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut username)
        .into_diagnostic()?;
    let password = rpassword::prompt_password("Mật khẩu: ").into_diagnostic()?;

    let credentials = Credentials::new(username.trim(), password);
    if !credentials.is_complete() {
        miette::bail!("Vui lòng nhập tên đăng nhập và mật khẩu.");
    }
    Ok(credentials)
}

fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}
