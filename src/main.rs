use std::path::{Path, PathBuf};

use clap::Parser;
use pageforge::{
    ChapterContent, Epub, ReadingPosition, ReadingSession, ReadingState, Result, render_document,
};

/// 📖 PageForge - 终端EPUB阅读工具
#[derive(Parser)]
#[command(name = "pageforge")]
#[command(about = "把EPUB章节渲染成适合终端阅读的纯文本")]
#[command(version)]
struct Args {
    /// EPUB文件路径
    #[arg(help = "要打开的EPUB文件路径")]
    epub_file: PathBuf,

    /// 显示书籍信息
    #[arg(short, long, help = "显示元数据与章节统计")]
    info: bool,

    /// 显示目录
    #[arg(short, long, help = "显示目录与虚拟章节列表")]
    toc: bool,

    /// 阅读指定章节
    #[arg(short, long, help = "阅读指定章节(序号从0开始)")]
    chapter: Option<usize>,

    /// 阅读指定虚拟章节
    #[arg(long = "virtual", help = "阅读指定虚拟章节(序号从0开始)")]
    virtual_chapter: Option<usize>,

    /// 排版宽度
    #[arg(short, long, default_value = "80", help = "排版宽度(0表示不换行)")]
    width: usize,

    /// 章节内容显示格式
    #[arg(long, value_enum, default_value = "formatted", help = "章节内容的显示格式")]
    format: ContentFormat,

    /// 日志级别
    #[arg(short, long, action = clap::ArgAction::Count, help = "重复使用以提高日志级别")]
    verbose: u8,
}

/// 章节内容显示格式
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ContentFormat {
    /// 原始HTML
    Raw,
    /// 未排版的纯文本
    Text,
    /// 排版后的文本
    Formatted,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&args) {
        eprintln!("❌ 错误: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let book = pageforge::open(&args.epub_file)?;

    if args.info {
        display_info(&book, &args.epub_file);
    }

    if args.toc {
        display_toc(&book);
    }

    if let Some(index) = args.chapter {
        let session = ReadingSession::new(book);
        display_chapter(&session, index, args.width, args.format)?;
        save_position(&args.epub_file, index, args.width);
        return Ok(());
    }

    if let Some(index) = args.virtual_chapter {
        let session = ReadingSession::new(book);
        display_virtual_chapter(&session, index, args.width)?;
        return Ok(());
    }

    // 没有指定任何操作时显示书籍信息
    if !args.info && !args.toc {
        display_info(&book, &args.epub_file);
    }

    Ok(())
}

/// 显示书籍元数据与章节统计
fn display_info(book: &Epub, path: &Path) {
    println!("📖 书籍信息:");

    let metadata = book.metadata();
    if let Some(title) = metadata.title() {
        println!("  书名: {}", title);
    }
    if let Some(creator) = metadata.creator() {
        println!("  作者: {}", creator);
    }
    if let Some(language) = metadata.language() {
        println!("  语言: {}", language);
    }
    if let Some(publisher) = metadata.publisher() {
        println!("  出版社: {}", publisher);
    }
    if let Some(date) = metadata.date() {
        println!("  出版日期: {}", date);
    }

    println!("  章节数: {}", book.chapter_count());
    if book.virtual_count() > 0 {
        println!("  虚拟章节数: {}", book.virtual_count());
    }

    let state = ReadingState::load(state_file_path());
    if let Some(book_state) = state_key(path).and_then(|key| state.get(&key).cloned()) {
        println!(
            "  上次读到: 第{}章 第{}行",
            book_state.position.chapter_index, book_state.position.row
        );
    }
}

/// 显示目录树与虚拟章节列表
fn display_toc(book: &Epub) {
    println!("🌳 目录:");
    for (index, node) in book.toc_nodes().iter().enumerate() {
        let indent = "  ".repeat(node.level + 1);
        if node.is_shadow {
            println!("{}{}. {} (目录外)", indent, index, node.title);
        } else if node.is_directory {
            println!("{}{}. {} (含子章节)", indent, index, node.title);
        } else {
            println!("{}{}. {}", indent, index, node.title);
        }
    }

    if book.virtual_count() > 0 {
        println!("\n🔗 虚拟章节:");
        for (index, range) in book.virtuals().iter().enumerate() {
            let title = book.get_virtual_title(index).unwrap_or("");
            println!(
                "  {}. {} ({}#{})",
                index, title, range.file_path, range.start_fragment
            );
        }
    }
}

/// 按指定格式显示一个章节
fn display_chapter(
    session: &ReadingSession,
    index: usize,
    width: usize,
    format: ContentFormat,
) -> Result<()> {
    let title = session.book().get_chapter_title(index)?;
    println!("📄 第{}章: {}\n", index, title);

    match format {
        ContentFormat::Raw => {
            let raw = session.book().get_chapter_content(index)?;
            println!("{}", raw);
        }
        ContentFormat::Text => {
            let raw = session.book().get_chapter_content(index)?;
            let document = render_document(&raw);
            println!("{}", document.text());
        }
        ContentFormat::Formatted => {
            let content = session.read_chapter(index, width)?;
            print_content(&content);
        }
    }

    Ok(())
}

/// 显示一个虚拟章节
fn display_virtual_chapter(session: &ReadingSession, index: usize, width: usize) -> Result<()> {
    let title = session.book().get_virtual_title(index).unwrap_or("");
    println!("🔗 虚拟章节{}: {}\n", index, title);

    let content = session.read_virtual_chapter(index, width)?;
    print_content(&content);
    Ok(())
}

fn print_content(content: &ChapterContent) {
    for line in &content.lines {
        println!("{}", line);
    }

    if !content.images.is_empty() {
        println!("\n🖼️  图片:");
        for (index, image) in content.images.iter().enumerate() {
            println!("  [{}] {}", index, image);
        }
    }
}

/// 记录最后阅读位置，失败时只记录日志
fn save_position(book_path: &Path, index: usize, width: usize) {
    let key = match state_key(book_path) {
        Some(key) => key,
        None => return,
    };

    let state_path = state_file_path();
    let mut state = ReadingState::load(&state_path);
    state.set_position(
        &key,
        ReadingPosition {
            chapter_index: index,
            width,
            row: 0,
            percent: 0.0,
        },
    );

    if let Err(e) = state.save(&state_path) {
        log::warn!("保存阅读状态失败: {}", e);
    }
}

/// 书籍在状态文件里的键(绝对路径)
fn state_key(path: &Path) -> Option<String> {
    let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    absolute.to_str().map(|s| s.to_string())
}

fn state_file_path() -> PathBuf {
    let base = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(".config").join("pageforge").join("state.yml")
}
