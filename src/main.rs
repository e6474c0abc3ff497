//! neotex command-line converter
//!
//! Reads an ANSI-art or neotex document from a file or stdin, runs it
//! through the tokenizer + virtual-terminal pipeline, and writes the
//! requested output shape to stdout (or, for neotex, optionally a file).

use std::io::{self, Read, Write};
use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use neotex::app::{Config, InputFormat, OutputFormat};
use neotex::core::VirtualTerminal;
use neotex::encoding::{self, Encoding};
use neotex::export;
use neotex::tokenizer::{AnsiTokenizer, NeotexTokenizer, Token, TokenStats};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match Config::parse(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if config.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let default_filter = if config.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let data = match &config.input {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data)?;
            data
        }
    };

    // Tokenize. Neotex metadata may override the configured width.
    let (tokens, stats, width) = match config.input_format {
        InputFormat::Ansi => {
            let utf8 = encoding::to_utf8(&data, config.input_encoding);
            let (tokens, stats) = AnsiTokenizer::new(utf8.as_bytes()).tokenize();
            (tokens, stats, config.width)
        }
        InputFormat::Neotex => {
            let tokenizer = NeotexTokenizer::new(&data, config.width)?;
            let width = tokenizer.width();
            let (tokens, stats) = tokenizer.tokenize();
            (tokens, stats, width)
        }
        InputFormat::Json => {
            let tokens: Vec<Token> = serde_json::from_slice(&data)?;
            let mut stats = TokenStats::new(data.len() as u64);
            stats.parsed_percent = 100.0;
            stats.finalize(&tokens);
            (tokens, stats, config.width)
        }
    };

    match config.output_format {
        OutputFormat::Ansi => {
            let term = process(config, &tokens, width, config.output_encoding);
            let rendered = export::ansi::render(&term);
            write_encoded(&rendered, config.output_encoding)?;
        }
        OutputFormat::PlainText => {
            let term = process(config, &tokens, width, config.output_encoding);
            let rendered = export::text::render(&term);
            write_encoded(&rendered, config.output_encoding)?;
        }
        OutputFormat::Neotex => {
            let term = process(config, &tokens, width, Encoding::Utf8);
            let document = export::neotex::export(&term).combine();
            match &config.save {
                Some(path) => std::fs::write(path, document + "\n")?,
                None => println!("{document}"),
            }
        }
        OutputFormat::Table => {
            if stats.pos_first_bad_sequence > 0 {
                println!("parsed: {:.1}%", stats.parsed_percent);
            }
            print!("{}", export::table::render(&tokens));
        }
        OutputFormat::Stats => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        }
    }

    Ok(())
}

fn process(
    config: &Config,
    tokens: &[Token],
    width: usize,
    output_encoding: Encoding,
) -> VirtualTerminal {
    let mut term = VirtualTerminal::new(width, config.lines, output_encoding, config.vga);
    term.apply(tokens);
    term
}

fn write_encoded(rendered: &str, target: Encoding) -> io::Result<()> {
    io::stdout().write_all(&encoding::from_utf8(rendered, target))
}

fn print_help() {
    println!(
        r#"neotex - ANSI art converter

USAGE:
    neotex [OPTIONS] [FILE]

Reads FILE (or stdin when piped) and writes the converted result to
stdout.

OPTIONS:
    --iformat <ansi|neotex|json>                 Input format (default: ansi)
    --iencoding <cp437|cp850|utf8|iso-8859-1>    Input encoding (default: utf8)
    --oformat <ansi|neotex|plaintext|table|stats|json>
                                                 Output format (default: ansi)
    --oencoding <cp437|cp850|utf8|iso-8859-1>    Output encoding (default: utf8)
    --width <N>                                  Terminal columns (default: 80)
    --lines <N>                                  Terminal rows (default: 1000)
    --vga                                        Emit exact VGA palette colors
    --save <PATH>                                Write neotex output to PATH
    -d, --debug                                  Verbose diagnostics on stderr
    -h, --help                                   Show this help

EXAMPLES:
    # Flatten a CP437 ANSI and view it in a modern terminal
    neotex --iencoding cp437 art.ans

    # Convert to the editor-friendly neotex format
    neotex --iencoding cp437 --oformat neotex art.ans

    # And back again
    neotex --iformat neotex --oencoding cp437 art.ntx > art.ans
"#
    );
}
