//! Purpose: `least` CLI entry point; runs the assign/pluck/accumulate helpers over JSON.
//! Role: Binary crate root; parses args, feeds stdin records to a helper, prints JSON on stdout.
//! Invariants: stdout carries only the resulting JSON document.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod ingest;

use ingest::{parse_json_arg, read_json_file, read_json_stream};
use least::api::{
    Error, ErrorKind, PathDescriptor, accumulate, assign, pluck_and_assign, to_exit_code,
};

#[derive(Parser, Debug)]
#[command(
    name = "least",
    version,
    about = "Assign, pluck and accumulate values at nested JSON paths",
    after_help = "Paths use dotted keys with optional indices: `a.b`, `items[0].name`, `items.0.name`.\nSet RUST_LOG=debug for per-record diagnostics on stderr."
)]
struct Cli {
    /// Pretty-print the resulting JSON.
    #[arg(long, global = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write VALUE (JSON) into the target at PATH.
    Assign {
        path: String,
        value: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// For each JSON value on stdin, copy SOURCE_PATH into the target at TARGET_PATH.
    Pluck {
        source_path: String,
        target_path: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Collect the value at PATH from each JSON value on stdin into an array.
    Accumulate {
        path: String,
        /// How to render sources where PATH is missing.
        #[arg(long, value_enum, default_value_t = AbsentPolicy::Null)]
        absent: AbsentPolicy,
    },
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Initial target document (JSON). Defaults to `{}`.
    #[arg(long, conflicts_with = "target_file")]
    target: Option<String>,
    /// Read the initial target document from a file.
    #[arg(long, value_name = "FILE")]
    target_file: Option<PathBuf>,
}

impl TargetArgs {
    fn load(&self) -> Result<Value, Error> {
        match (&self.target, &self.target_file) {
            (Some(text), _) => parse_json_arg(text, "--target"),
            (None, Some(path)) => read_json_file(path),
            (None, None) => Ok(Value::Object(Map::new())),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum AbsentPolicy {
    Null,
    Skip,
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(code) => code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<i32, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(exit_code);
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `least --help`."));
            }
        },
    };

    let output = match cli.command {
        Command::Assign {
            path,
            value,
            target,
        } => run_assign(&path, &value, &target)?,
        Command::Pluck {
            source_path,
            target_path,
            target,
        } => run_pluck(&source_path, &target_path, &target, io::stdin().lock())?,
        Command::Accumulate { path, absent } => {
            run_accumulate(&path, absent, io::stdin().lock())?
        }
    };

    emit_json(&output, cli.pretty)?;
    Ok(0)
}

fn run_assign(path: &str, value: &str, target_args: &TargetArgs) -> Result<Value, Error> {
    let value = parse_json_arg(value, "VALUE")?;
    let mut target = target_args.load()?;
    assign(&mut target, path)?.apply(value)?;
    tracing::debug!(path, "assigned value");
    Ok(target)
}

fn run_pluck<R: io::Read>(
    source_path: &str,
    target_path: &str,
    target_args: &TargetArgs,
    input: R,
) -> Result<Value, Error> {
    let source_path = PathDescriptor::parse(source_path)?;
    let mut target = target_args.load()?;
    let mut plucker = pluck_and_assign(&source_path, &mut target, target_path)?;
    let records = read_json_stream(input, |index, source| {
        let value = plucker.read(&source);
        if value.is_none() {
            tracing::warn!(index, path = %source_path, "source path is absent");
        }
        plucker.write(value)?;
        tracing::debug!(index, "plucked record");
        Ok(())
    })?;
    drop(plucker);
    tracing::debug!(records, "pluck finished");
    Ok(target)
}

fn run_accumulate<R: io::Read>(path: &str, absent: AbsentPolicy, input: R) -> Result<Value, Error> {
    let step = accumulate(path)?;
    let mut accumulator = None;
    read_json_stream(input, |index, source| {
        let values = step.apply(accumulator.take(), &source);
        if matches!(values.last(), Some(None)) {
            tracing::warn!(index, path = %step.source_path(), "source path is absent");
        }
        tracing::debug!(index, accumulated = values.len(), "accumulated record");
        accumulator = Some(values);
        Ok(())
    })?;

    let values = accumulator
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match (value, absent) {
            (Some(value), _) => Some(value),
            (None, AbsentPolicy::Null) => Some(Value::Null),
            (None, AbsentPolicy::Skip) => None,
        })
        .collect();
    Ok(Value::Array(values))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_json(value: &Value, pretty: bool) -> Result<(), Error> {
    let encoded = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("json encode failed")
            .with_source(err)
    })?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{encoded}").map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write output")
            .with_source(err)
    })
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotContainer => "path crosses a non-container value".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(path) = err.path() {
        lines.push(format!("path: {path}"));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

#[cfg(test)]
mod tests {
    use super::{
        AbsentPolicy, Cli, Command, TargetArgs, error_json, run_accumulate, run_assign, run_pluck,
    };
    use clap::Parser;
    use least::api::{Error, ErrorKind};
    use serde_json::json;

    fn no_target() -> TargetArgs {
        TargetArgs {
            target: None,
            target_file: None,
        }
    }

    #[test]
    fn assign_writes_into_default_target() {
        let out = run_assign("a.b", "42", &no_target()).expect("assign");
        assert_eq!(out, json!({"a": {"b": 42}}));
    }

    #[test]
    fn assign_uses_supplied_target() {
        let target = TargetArgs {
            target: Some(r#"{"keep": true}"#.to_string()),
            target_file: None,
        };
        let out = run_assign("list[1]", r#""x""#, &target).expect("assign");
        assert_eq!(out, json!({"keep": true, "list": [null, "x"]}));
    }

    #[test]
    fn pluck_applies_every_record_in_order() {
        let input = b"{\"x\":{\"y\":\"hi\"}}\n{\"x\":{\"y\":\"bye\"}}\n";
        let out = run_pluck("x.y", "z", &no_target(), &input[..]).expect("pluck");
        assert_eq!(out, json!({"z": "bye"}));
    }

    #[test]
    fn pluck_writes_absent_through() {
        let target = TargetArgs {
            target: Some(r#"{"z": 1}"#.to_string()),
            target_file: None,
        };
        let out = run_pluck("missing", "z", &target, &b"{}"[..]).expect("pluck");
        assert_eq!(out, json!({}));
    }

    #[test]
    fn accumulate_renders_absent_per_policy() {
        let input = b"{\"v\":1} {} {\"v\":2}";
        let nulls = run_accumulate("v", AbsentPolicy::Null, &input[..]).expect("null");
        assert_eq!(nulls, json!([1, null, 2]));
        let skipped = run_accumulate("v", AbsentPolicy::Skip, &input[..]).expect("skip");
        assert_eq!(skipped, json!([1, 2]));
    }

    #[test]
    fn accumulate_of_empty_input_is_empty_array() {
        let out = run_accumulate("v", AbsentPolicy::Null, &b""[..]).expect("empty");
        assert_eq!(out, json!([]));
    }

    #[test]
    fn target_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "least",
            "assign",
            "a",
            "1",
            "--target",
            "{}",
            "--target-file",
            "t.json",
        ]);
        assert!(parsed.is_err());

        let parsed = Cli::try_parse_from(["least", "--pretty", "accumulate", "v", "--absent", "skip"])
            .expect("parse");
        assert!(parsed.pretty);
        assert!(matches!(
            parsed.command,
            Command::Accumulate {
                absent: AbsentPolicy::Skip,
                ..
            }
        ));
    }

    #[test]
    fn error_json_shape_is_stable() {
        let err = Error::new(ErrorKind::NotContainer)
            .with_message("cannot address `b` inside a number")
            .with_path("a.b")
            .with_hint("hint text");
        assert_eq!(
            error_json(&err),
            json!({"error": {
                "kind": "NotContainer",
                "message": "cannot address `b` inside a number",
                "hint": "hint text",
                "path": "a.b",
            }})
        );
    }
}
