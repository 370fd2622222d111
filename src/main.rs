// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::File;
use std::io::{self, Read, Write};
use std::process;

use pico_args::Arguments;

use flatsvg::{FilterValue, FlatSvg, PropertiesFilter};

const HELP: &str = "\
flatsvg flattens an SVG document into elements, paths or segments.

USAGE:
  flatsvg [OPTIONS] <in-svg> <out-svg>  # from file to file
  flatsvg [OPTIONS] <in-svg> -          # from file to stdout
  flatsvg [OPTIONS] - <out-svg>         # from stdin to file
  flatsvg [OPTIONS] - -                 # from stdin to stdout

OPTIONS:
  -h, --help                    Prints help information
  -V, --version                 Prints version information

  --mode MODE                   Selects the output view
                                [default: paths]
                                [possible values: elements, paths, segments]
  --preserve-arcs               Keeps elliptical arcs instead of approximating
                                them with cubic curves
  --filter KEY=VALUE[~TOL]      Writes only objects with a matching computed
                                style. A value is treated as a number when
                                possible. TOL sets the matching tolerance.
                                Can be set multiple times; all filters
                                must match
                                Examples: 'fill=red~0.1', 'opacity=0.5',
                                'stroke-dasharray=6 6'
  --list-errors                 Prints flattening errors and warnings
                                to the stderr

  --quiet                       Disables logging
  --verbose                     Enables debug logging

ARGS:
  <in-svg>                      Input file or '-' for stdin
  <out-svg>                     Output file or '-' for stdout
";

#[derive(Clone, Copy, PartialEq, Debug)]
enum Mode {
    Elements,
    Paths,
    Segments,
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "elements" => Ok(Mode::Elements),
            "paths" => Ok(Mode::Paths),
            "segments" => Ok(Mode::Segments),
            _ => Err(format!("invalid MODE value '{}'", s)),
        }
    }
}

#[derive(Debug)]
struct Args {
    mode: Mode,
    preserve_arcs: bool,
    filters: Vec<PropertiesFilter>,
    list_errors: bool,

    quiet: bool,
    verbose: bool,

    input: String,
    output: String,
}

fn collect_args() -> Result<Args, pico_args::Error> {
    let mut input = Arguments::from_env();

    if input.contains(["-h", "--help"]) {
        print!("{}", HELP);
        std::process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    Ok(Args {
        mode:           input.opt_value_from_str("--mode")?.unwrap_or(Mode::Paths),
        preserve_arcs:  input.contains("--preserve-arcs"),
        filters:        input.values_from_fn("--filter", parse_filter)?,
        list_errors:    input.contains("--list-errors"),

        quiet:          input.contains("--quiet"),
        verbose:        input.contains("--verbose"),

        input:          input.free_from_str()?,
        output:         input.free_from_str()?,
    })
}

fn parse_filter(s: &str) -> Result<PropertiesFilter, String> {
    let (key, value) = s.split_once('=').ok_or("expected KEY=VALUE")?;
    if key.is_empty() {
        return Err("filter key cannot be empty".to_string());
    }

    let (value, tolerance) = match value.rsplit_once('~') {
        Some((value, tol)) => {
            let tol: f64 = tol.parse().map_err(|_| "invalid tolerance")?;
            (value, Some(tol))
        }
        None => (value, None),
    };

    let value = match value.parse::<f64>() {
        Ok(n) => FilterValue::Number(n),
        Err(_) => FilterValue::String(value.to_string()),
    };

    let filter = PropertiesFilter::new(key, value);
    Ok(match tolerance {
        Some(tol) => filter.with_tolerance(tol),
        None => filter,
    })
}

#[derive(Clone, PartialEq, Debug)]
enum InputFrom<'a> {
    Stdin,
    File(&'a str),
}

#[derive(Clone, PartialEq, Debug)]
enum OutputTo<'a> {
    Stdout,
    File(&'a str),
}

fn main() {
    let args = match collect_args() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}.", e);
            process::exit(1);
        }
    };

    if !args.quiet {
        if let Ok(()) = log::set_logger(&LOGGER) {
            let level = if args.verbose {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Warn
            };
            log::set_max_level(level);
        }
    }

    if let Err(e) = process(args) {
        eprintln!("Error: {}.", e);
        std::process::exit(1);
    }
}

fn process(args: Args) -> Result<(), String> {
    let in_svg = match args.input.as_str() {
        "-" => InputFrom::Stdin,
        path => InputFrom::File(path),
    };

    let out_svg = match args.output.as_str() {
        "-" => OutputTo::Stdout,
        path => OutputTo::File(path),
    };

    let input_svg = match in_svg {
        InputFrom::Stdin => load_stdin(),
        InputFrom::File(path) => std::fs::read_to_string(path).map_err(|e| e.to_string()),
    }?;

    let opt = flatsvg::Options {
        preserve_arcs: args.preserve_arcs,
    };

    let svg = FlatSvg::from_str_with_options(&input_svg, &opt).map_err(|e| e.to_string())?;

    let s = if args.filters.is_empty() {
        match args.mode {
            Mode::Elements => svg.elements_as_svg(),
            Mode::Paths => svg.paths_as_svg(),
            Mode::Segments => svg.segments_as_svg(),
        }
    } else {
        let filters = &args.filters;
        let s = match args.mode {
            Mode::Elements => svg
                .filter_elements_by_style(filters, None)
                .map(|list| svg.write_elements(list)),
            Mode::Paths => svg
                .filter_paths_by_style(filters, None)
                .map(|list| svg.write_paths(list)),
            Mode::Segments => svg
                .filter_segments_by_style(filters, None)
                .map(|list| svg.write_segments(list)),
        };
        s.map_err(|e| e.to_string())?
    };

    if args.list_errors {
        for msg in svg.errors() {
            eprintln!("error: {}", msg);
        }

        for msg in svg.warnings() {
            eprintln!("warning: {}", msg);
        }
    }

    match out_svg {
        OutputTo::Stdout => {
            io::stdout()
                .write_all(s.as_bytes())
                .map_err(|_| "failed to write to the stdout".to_string())?;
        }
        OutputTo::File(path) => {
            let mut f =
                File::create(path).map_err(|_| "failed to create the output file".to_string())?;
            f.write_all(s.as_bytes())
                .map_err(|_| "failed to write to the output file".to_string())?;
        }
    }

    Ok(())
}

fn load_stdin() -> Result<String, String> {
    let mut buf = String::new();
    let stdin = io::stdin();
    let mut handle = stdin.lock();

    handle
        .read_to_string(&mut buf)
        .map_err(|_| "failed to read from stdin".to_string())?;

    Ok(buf)
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, record.args()),
                log::Level::Warn  => eprintln!("Warning (in {}:{}): {}", target, line, record.args()),
                log::Level::Info  => eprintln!("Info (in {}:{}): {}", target, line, record.args()),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, record.args()),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, record.args()),
            }
        }
    }

    fn flush(&self) {}
}
