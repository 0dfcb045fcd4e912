use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use html_script_extract::config::ExtractConfig;
use html_script_extract::workspace::collect_html_files;
use html_script_extract::{ScriptExtractor, ScriptFragment};

/// HTML文書からJavaScript断片を抽出してJSONで出力する
#[derive(Debug, Parser)]
#[command(name = "html-script-extract", version, about)]
struct Cli {
    /// HTMLファイル、またはHTMLファイルを探すディレクトリ
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// 非相対な src 参照の基準ディレクトリ（デフォルト: 各HTMLファイルの親ディレクトリ）
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// 設定ファイル（デフォルト: カレントディレクトリの htmlscripts.json）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSONを整形して出力
    #[arg(long)]
    pretty: bool,

    /// エラー以外のログを抑制
    #[arg(short, long)]
    quiet: bool,

    /// デバッグログを出力
    #[arg(short, long)]
    verbose: bool,
}

/// 1文書分の出力
#[derive(Debug, Serialize)]
struct DocumentReport {
    file: String,
    fragments: Vec<ScriptFragment>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("html-script-extract error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_env("HTML_SCRIPTS_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 全文書を処理し、すべて成功したかを返す
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let config = match &cli.config {
        Some(path) => ExtractConfig::read(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ExtractConfig::load_from_dir(Path::new(".")),
    };
    let matcher = config.create_path_matcher()?;

    let mut extractor = ScriptExtractor::new();
    if let Some(root) = cli.root.clone().or(config.root) {
        extractor = extractor.with_root(root);
    }

    let mut files = Vec::new();
    for path in &cli.paths {
        if path.is_dir() {
            files.extend(collect_html_files(path, Some(&matcher)));
        } else {
            files.push(path.clone());
        }
    }
    tracing::info!("Extracting scripts from {} HTML files", files.len());

    let mut reports = Vec::with_capacity(files.len());
    let mut all_ok = true;
    for file in &files {
        match extractor.extract(file) {
            Ok(parsed) => {
                let (document, fragments) = parsed.into_parts();
                reports.push(DocumentReport {
                    file: document.label(),
                    fragments,
                });
            }
            Err(e) => {
                all_ok = false;
                if e.is_limitation() {
                    tracing::error!("{}: analysis limitation: {}", file.display(), e);
                } else {
                    tracing::error!("{}: {}", file.display(), e);
                }
            }
        }
    }

    let json = if cli.pretty {
        serde_json::to_string_pretty(&reports)?
    } else {
        serde_json::to_string(&reports)?
    };
    println!("{}", json);

    Ok(all_ok)
}
