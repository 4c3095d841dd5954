//! CLI entry point for the EVE SPI capture decoder.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use eve_decoder::{parse_capture, ChipFamily, DecodedFrame, SpiDecoder};
use log::{debug, info};
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: eve-spi <command> [options]

Commands:
  decode <input> [--chip <family>] [--json] [--verbose]  Decode a capture listing
  tables [--chip <family>]                                Print the symbol tables

Options:
  -c, --chip <family>  Chip generation: ft81x (default), bt81x, eve, bt82x, eve5
      --json           Print one JSON object per frame (decode only)
  -v, --verbose        Log decoder activity to stderr (decode only)
  -h, --help           Show this help message

Examples:
  eve-spi decode capture.txt
  eve-spi decode capture.txt --chip bt82x --json
  eve-spi tables --chip bt82x
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Decode(DecodeArgs),
    Tables(TablesArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct DecodeArgs {
    input: PathBuf,
    chip: ChipFamily,
    json: bool,
    verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct TablesArgs {
    chip: ChipFamily,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "decode" => parse_decode_args(args)
            .map(Command::Decode)
            .map(ParseResult::Command),
        "tables" => parse_tables_args(args)
            .map(Command::Tables)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_chip(value: Option<OsString>) -> Result<ChipFamily, String> {
    let value = value.ok_or_else(|| "missing value for --chip".to_string())?;
    value
        .to_string_lossy()
        .parse()
        .map_err(|e: eve_decoder::UnknownChipFamily| e.to_string())
}

#[allow(clippy::while_let_on_iterator)]
fn parse_decode_args(mut args: impl Iterator<Item = OsString>) -> Result<DecodeArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut chip = ChipFamily::default();
    let mut json = false;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }

        if arg == "--json" {
            json = true;
            continue;
        }

        if arg == "--chip" || arg == "-c" {
            chip = parse_chip(args.next())?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(DecodeArgs {
        input,
        chip,
        json,
        verbose,
    })
}

#[allow(clippy::while_let_on_iterator)]
fn parse_tables_args(mut args: impl Iterator<Item = OsString>) -> Result<TablesArgs, String> {
    let mut chip = ChipFamily::default();

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--chip" || arg == "-c" {
            chip = parse_chip(args.next())?;
            continue;
        }

        return Err(format!("unexpected argument: {}", arg.to_string_lossy()));
    }

    Ok(TablesArgs { chip })
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn format_frame(frame: &DecodedFrame, chip: ChipFamily, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string(frame).map_err(|e| e.to_string());
    }
    Ok(format!(
        "{}..{} {}",
        frame.start_time,
        frame.end_time,
        frame.render(chip)
    ))
}

fn run_decode(args: &DecodeArgs) -> Result<(), i32> {
    init_logging(args.verbose);

    let text = match fs::read_to_string(&args.input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", args.input.display());
            return Err(1);
        }
    };

    let events = match parse_capture(&text) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("{}:{e}", args.input.display());
            return Err(1);
        }
    };
    debug!("parsed {} capture events", events.len());

    let mut decoder = SpiDecoder::new(args.chip);
    let frames = decoder.decode_all(&events);
    info!("decoded {} frames as {}", frames.len(), args.chip);

    for frame in &frames {
        match format_frame(frame, args.chip, args.json) {
            Ok(line) => println!("{line}"),
            Err(e) => {
                eprintln!("error: failed to serialize frame: {e}");
                return Err(1);
            }
        }
    }

    Ok(())
}

fn run_tables(args: &TablesArgs) {
    let symbols = args.chip.layout().symbols;
    for (name, table) in symbols.named() {
        if table.is_empty() {
            continue;
        }
        println!("{name} ({} entries)", table.len());
        for (key, symbol) in table.entries() {
            println!("  0x{key:08X}  {symbol}");
        }
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Decode(args))) => match run_decode(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::Tables(args))) => {
            run_tables(&args);
            0
        }
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use eve_decoder::FrameType;
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn os_args(args: &[&str]) -> impl Iterator<Item = OsString> {
        args.iter().map(OsString::from).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_decode_command() {
        let result = parse_decode_args(os_args(&[
            "capture.txt",
            "--chip",
            "bt82x",
            "--json",
            "-v",
        ]))
        .expect("valid decode args should parse");

        assert_eq!(
            result,
            DecodeArgs {
                input: PathBuf::from("capture.txt"),
                chip: ChipFamily::Bt82x,
                json: true,
                verbose: true,
            }
        );
    }

    #[test]
    fn decode_defaults_to_ft81x() {
        let result =
            parse_decode_args(os_args(&["capture.txt"])).expect("input alone should parse");
        assert_eq!(result.chip, ChipFamily::Ft81x);
        assert!(!result.json);
        assert!(!result.verbose);
    }

    #[test]
    fn chip_aliases_are_accepted() {
        let result = parse_tables_args(os_args(&["-c", "EVE5"])).expect("alias should parse");
        assert_eq!(result.chip, ChipFamily::Bt82x);

        let result = parse_tables_args(os_args(&["--chip", "bt81x"])).expect("alias should parse");
        assert_eq!(result.chip, ChipFamily::Ft81x);
    }

    #[test]
    fn rejects_unknown_chip() {
        let error = parse_decode_args(os_args(&["capture.txt", "--chip", "ft800"]))
            .expect_err("unknown chip should fail");
        assert!(error.contains("unknown chip family"));

        let error = parse_decode_args(os_args(&["capture.txt", "--chip"]))
            .expect_err("missing chip should fail");
        assert!(error.contains("missing value"));
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args(os_args(&["--help"])).expect("help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_unknown_command() {
        let error = parse_args(os_args(&["unknown"])).expect_err("unknown command should fail");
        assert!(error.contains("unknown command"));
    }

    #[test]
    fn decode_requires_single_input() {
        let error = parse_decode_args(std::iter::empty()).expect_err("missing input should fail");
        assert!(error.contains("missing input"));

        let error =
            parse_decode_args(os_args(&["a.txt", "b.txt"])).expect_err("two inputs should fail");
        assert!(error.contains("multiple input"));
    }

    #[test]
    fn tables_rejects_positional_arguments() {
        let error = parse_tables_args(os_args(&["capture.txt"]))
            .expect_err("tables takes no positional arguments");
        assert!(error.contains("unexpected argument"));
    }

    #[test]
    fn formats_text_and_json_lines() {
        let frame = DecodedFrame::new(
            "READ REG_ID",
            10,
            60,
            FrameType::Read {
                address: 0x0030_2000,
            },
        )
        .with_data("0x7C");

        let text = format_frame(&frame, ChipFamily::Ft81x, false).expect("text never fails");
        assert_eq!(text, "10..60 READ REG_ID from 0x302000 = 0x7C");

        let json = format_frame(&frame, ChipFamily::Ft81x, true).expect("frame serializes");
        assert!(json.contains("\"label\":\"READ REG_ID\""));
        assert!(json.contains("\"type\":\"read\""));
        assert!(json.contains("\"data\":\"0x7C\""));
    }
}
