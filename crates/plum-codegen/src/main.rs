use std::io::Read;
use std::path::PathBuf;
use std::process;

use plum_codegen::{Document, GenerateError, Generator, GeneratorConfig};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

struct Args {
    vendor: String,
    language: Option<String>,
    config: Option<PathBuf>,
    document: bool,
    source_url: Option<String>,
    dump_ir: bool,
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let args = match parse_args(&args) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("error: {msg}");
            eprintln!();
            eprintln!("Usage: plum-codegen <vendor> [options] [<payload-file>|-]");
            eprintln!();
            eprintln!("Arguments:");
            eprintln!("  <vendor>            Vendor id: doudian, taobao, kuaishou, alipay, alibaba, weixin");
            eprintln!("  <payload-file>      Captured payload; stdin when omitted or '-'");
            eprintln!();
            eprintln!("Options:");
            eprintln!("  --language <lang>   Python or TypeScript [default: from config]");
            eprintln!("  --config <file>     JSON generator config");
            eprintln!("  --document          Input is an extracted page, not an API payload");
            eprintln!("  --source-url <url>  Page URL, kept as a header comment");
            eprintln!("  --dump-ir           Print the deduplicated models as JSON");
            process::exit(2);
        }
    };

    init_tracing();

    if let Err(e) = run(&args).await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match std::env::var("PLUM_LOG").as_deref() {
            Ok("debug") => "debug",
            Ok("info") => "info",
            Ok("error") => "error",
            _ => "warn",
        };
        EnvFilter::new(format!("plum_codegen={level}"))
    };

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init();
    }
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut vendor: Option<String> = None;
    let mut input: Option<PathBuf> = None;
    let mut parsed = Args {
        vendor: String::new(),
        language: None,
        config: None,
        document: false,
        source_url: None,
        dump_ir: false,
        input: None,
    };

    let mut i = 1; // skip argv[0]
    while i < args.len() {
        match args[i].as_str() {
            "--language" => {
                i += 1;
                parsed.language = Some(args.get(i).ok_or("--language requires a value")?.clone());
            }
            "--config" => {
                i += 1;
                parsed.config = Some(PathBuf::from(
                    args.get(i).ok_or("--config requires a value")?,
                ));
            }
            "--source-url" => {
                i += 1;
                parsed.source_url =
                    Some(args.get(i).ok_or("--source-url requires a value")?.clone());
            }
            "--document" => parsed.document = true,
            "--dump-ir" => parsed.dump_ir = true,
            "--help" | "-h" => return Err("".to_string()),
            "-" if vendor.is_some() && input.is_none() => input = Some(PathBuf::from("-")),
            arg if arg.starts_with('-') => return Err(format!("unknown flag: {arg}")),
            arg => {
                if vendor.is_none() {
                    vendor = Some(arg.to_string());
                } else if input.is_none() {
                    input = Some(PathBuf::from(arg));
                } else {
                    return Err(format!("unexpected argument: {arg}"));
                }
            }
        }
        i += 1;
    }

    parsed.vendor = vendor.ok_or("missing required argument: <vendor>")?;
    parsed.input = input.filter(|p| p.as_os_str() != "-");
    Ok(parsed)
}

async fn run(args: &Args) -> Result<(), GenerateError> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::from_env(),
    };
    if let Some(language) = &args.language {
        config.language = language.clone();
    }

    let text = read_input(args.input.as_deref())?;
    let generator = Generator::new(config)?;
    let vendor = generator.vendor(&args.vendor)?;
    let emitter = generator.emitter(&generator.config().language)?;

    let source_url = args.source_url.as_deref();
    let parsed = if args.document {
        let document = Document::from_json(&text)?;
        generator.parse_document(vendor, &document, source_url).await
    } else {
        generator.parse(vendor, &text, source_url).await
    };

    if args.dump_ir {
        let json = serde_json::to_string_pretty(&parsed?)?;
        println!("{json}");
        return Ok(());
    }

    let lines = match parsed {
        Ok(data) => generator.render(vendor, emitter, &data),
        Err(e) => {
            warn!(vendor = vendor.id(), error = %e, "generation failed");
            vec![emitter.comment(&e.to_string())]
        }
    };
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn read_input(path: Option<&std::path::Path>) -> Result<String, GenerateError> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| GenerateError::Config(format!("failed to read {}: {e}", path.display()))),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| GenerateError::Config(format!("failed to read stdin: {e}")))?;
            Ok(text)
        }
    }
}
