use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use pascalc::analyzer::{ScopeTable, Symbol};
use pascalc::compiler::check_source;
use pascalc::error::ErrorReporter;
use pascalc::lexer::{format_tokens, tokenize};

#[derive(Parser)]
#[command(name = "pascalc")]
#[command(author, version, about = "Pascal front end: parse and resolve declarations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 詳細出力を有効化
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Pascalソースを解析・解決し、エラーを報告
    Check {
        /// 検査するソースファイル
        input: PathBuf,
    },

    /// ソースファイルのレキシームを出力
    Tokens {
        input: PathBuf,
    },

    /// 型付きASTをJSONで出力
    Ast {
        input: PathBuf,

        /// JSONを整形して出力
        #[arg(long)]
        pretty: bool,
    },

    /// グローバルスコープと各ルーチンの仮引数・ローカルのテーブルを表示
    Symbols {
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // CLI引数の解析前にロガーを初期化
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // verboseフラグに基づいてログレベルを設定
    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    let result = match cli.command {
        Commands::Check { input } => check(input),
        Commands::Tokens { input } => tokens(input),
        Commands::Ast { input, pretty } => ast(input, pretty),
        Commands::Symbols { input } => symbols(input),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

/// ソースファイルの内容と診断表示用のレポーター
struct SourceFile {
    name: String,
    source: String,
    reporter: ErrorReporter,
}

impl SourceFile {
    fn read(input: &PathBuf) -> Result<Self> {
        let source = fs::read_to_string(input)
            .with_context(|| format!("Failed to read source file: {:?}", input))?;
        let name = input.display().to_string();
        let reporter = ErrorReporter::new(name.clone(), source.clone());
        Ok(Self {
            name,
            source,
            reporter,
        })
    }

    /// フロントエンドを実行し、失敗時は診断を表示
    fn check(&self) -> Result<pascalc::CheckedProgram> {
        match check_source(&self.name, &self.source) {
            Ok(checked) => Ok(checked),
            Err(e) => {
                self.reporter.emit(&e)?;
                anyhow::bail!("{} failed to check", self.name);
            }
        }
    }
}

fn check(input: PathBuf) -> Result<()> {
    log::info!("Checking {:?}", input);
    let file = SourceFile::read(&input)?;
    let checked = file.check()?;

    println!(
        "{}: {:?} ({} declarations, {} global symbols)",
        "ok".green().bold(),
        input,
        checked.program.declarations.len(),
        checked.globals.len()
    );
    Ok(())
}

fn tokens(input: PathBuf) -> Result<()> {
    let file = SourceFile::read(&input)?;
    match tokenize(&file.source) {
        Ok(lexemes) => {
            println!("{}", format_tokens(&lexemes));
            Ok(())
        }
        Err(e) => {
            file.reporter.emit(&e.into())?;
            anyhow::bail!("Lexical analysis failed");
        }
    }
}

fn ast(input: PathBuf, pretty: bool) -> Result<()> {
    let file = SourceFile::read(&input)?;
    let checked = file.check()?;

    let json = if pretty {
        serde_json::to_string_pretty(&checked.program)?
    } else {
        serde_json::to_string(&checked.program)?
    };
    println!("{}", json);
    Ok(())
}

fn symbols(input: PathBuf) -> Result<()> {
    let file = SourceFile::read(&input)?;
    let checked = file.check()?;

    println!("{}", format!("=== {} ===", checked.program.name).blue().bold());
    print_table(&checked.globals, 0);
    Ok(())
}

fn print_table(table: &ScopeTable, depth: usize) {
    let indent = "  ".repeat(depth);
    for symbol in table.iter() {
        println!("{}{}", indent, symbol);
        if let Symbol::Routine(routine) = symbol {
            if !routine.locals.is_empty() {
                println!("{}  {}", indent, "locals:".cyan());
                print_table(&routine.locals, depth + 2);
            }
        }
    }
}
