use std::io::{self, IsTerminal, Read};

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};

use qr_studio::content::{detect_kind, ContentFormatter, Escaping};
use qr_studio::qr::{check_capacity, ErrorCorrectionLevel};
use qr_studio::style::{PartialStyle, StyleResolver};
use qr_studio::types::{ContentKind, FieldMap, FieldValue};
use qr_studio::utils::{logging, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "qr-studio", version, about = "Build and inspect QR code payloads")]
struct Cli {
    /// Print debug logs to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the encodable payload for a content kind.
    Format(FormatArgs),
    /// Recover fields from a payload.
    Parse(ParseArgs),
    /// Guess the content kind of a payload.
    Detect(DetectArgs),
    /// Resolve a style with defaults and bounds applied.
    Style(StyleArgs),
    /// List content kinds and their fields.
    Kinds,
}

#[derive(Parser, Debug)]
struct FormatArgs {
    /// Content kind (text, url, email, phone, sms, wifi, vcard).
    #[arg(long)]
    kind: ContentKind,

    /// Field value as `name=value`; repeatable.
    #[arg(short = 'f', long = "field", value_parser = parse_field)]
    fields: Vec<(String, String)>,

    /// Backslash-escape delimiters inside WiFi and vCard values.
    #[arg(long)]
    escape: bool,

    /// Fail unless the payload fits one symbol at this error correction level.
    #[arg(long)]
    check: Option<ErrorCorrectionLevel>,

    /// Print `{kind, payload}` JSON instead of the bare payload.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ParseArgs {
    /// Content kind; detected from the payload when omitted.
    #[arg(long)]
    kind: Option<ContentKind>,

    /// Payload to parse; read from stdin when omitted.
    payload: Option<String>,

    /// Undo backslash escaping in WiFi and vCard values.
    #[arg(long)]
    escape: bool,
}

#[derive(Parser, Debug)]
struct DetectArgs {
    /// Payload to inspect; read from stdin when omitted.
    payload: Option<String>,
}

#[derive(Parser, Debug)]
struct StyleArgs {
    /// Partial style as camelCase JSON; flags below override it.
    #[arg(long)]
    json: Option<String>,

    #[arg(long)]
    size: Option<u32>,

    #[arg(long)]
    margin: Option<u32>,

    #[arg(long)]
    foreground: Option<String>,

    #[arg(long)]
    background: Option<String>,

    #[arg(long)]
    ecc: Option<ErrorCorrectionLevel>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ServiceConfig::from_env().context("read QR_STUDIO_* settings")?;
    if cli.verbose || config.debug_logging {
        logging::enable_debug();
    }

    match cli.cmd {
        Command::Format(args) => cmd_format(args),
        Command::Parse(args) => cmd_parse(args),
        Command::Detect(args) => cmd_detect(args),
        Command::Style(args) => cmd_style(args),
        Command::Kinds => cmd_kinds(),
    }
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got '{}'", raw)),
    }
}

fn escaping(escape: bool) -> Escaping {
    if escape {
        Escaping::Standard
    } else {
        Escaping::None
    }
}

fn payload_or_stdin(payload: Option<String>) -> anyhow::Result<String> {
    if let Some(payload) = payload {
        return Ok(payload);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        bail!("no payload given; pass it as an argument or pipe it on stdin");
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer).context("read payload from stdin")?;
    Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
}

fn cmd_format(args: FormatArgs) -> anyhow::Result<()> {
    let known = args.kind.field_names();
    let mut fields = FieldMap::new();
    for (name, value) in args.fields {
        if !known.contains(&name.as_str()) {
            qr_studio::log_warn!("cli", "Ignoring unknown field", kind = args.kind, field = name);
            continue;
        }
        fields.insert(name, FieldValue::from(value));
    }

    let payload = ContentFormatter::with_escaping(escaping(args.escape)).format(args.kind, &fields);

    if let Some(level) = args.check {
        check_capacity(&payload, level)
            .with_context(|| format!("payload does not fit at level {}", level))?;
    }

    if args.json {
        let out = serde_json::json!({ "kind": args.kind, "payload": payload });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", payload);
    }
    Ok(())
}

fn cmd_parse(args: ParseArgs) -> anyhow::Result<()> {
    let payload = payload_or_stdin(args.payload)?;
    let kind = args.kind.unwrap_or_else(|| detect_kind(&payload));
    let fields = ContentFormatter::with_escaping(escaping(args.escape)).parse(kind, &payload);

    let out = serde_json::json!({ "kind": kind, "fields": fields });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_detect(args: DetectArgs) -> anyhow::Result<()> {
    let payload = payload_or_stdin(args.payload)?;
    println!("{}", detect_kind(&payload));
    Ok(())
}

fn cmd_style(args: StyleArgs) -> anyhow::Result<()> {
    let mut partial: PartialStyle = match &args.json {
        Some(json) => serde_json::from_str(json).context("parse --json style")?,
        None => PartialStyle::default(),
    };

    if args.size.is_some() {
        partial.size = args.size;
    }
    if args.margin.is_some() {
        partial.margin = args.margin;
    }
    if args.foreground.is_some() {
        partial.foreground_color = args.foreground;
    }
    if args.background.is_some() {
        partial.background_color = args.background;
    }
    if args.ecc.is_some() {
        partial.error_correction_level = args.ecc;
    }

    let style = StyleResolver::new().resolve(&partial);
    println!("{}", serde_json::to_string_pretty(&style)?);
    Ok(())
}

fn cmd_kinds() -> anyhow::Result<()> {
    for kind in ContentKind::ALL {
        println!("{:<6} {:<14} {}", kind.as_str(), kind.label(), kind.field_names().join(", "));
    }
    Ok(())
}
