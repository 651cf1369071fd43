// Copyright 2026 The Flowboard Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fs::File;
use std::io::{BufReader, Write};
use std::result::Result as StdResult;

use pico_args::Arguments;

use flowboard_engine::{build_program, json};

const VERSION: &str = "1.0";
const EXIT_FAILURE: i32 = 1;

macro_rules! die(
    ($($arg:tt)*) => { {
        eprintln!($($arg)*);
        std::process::exit(EXIT_FAILURE)
    } }
);

fn usage() -> ! {
    let argv0 = std::env::args()
        .next()
        .unwrap_or_else(|| "flowboard".to_string());
    die!(
        concat!(
            "flowboard {}: Compile stock-and-flow diagram snapshots into simulation programs.\n\
         \n\
         USAGE:\n",
            "    {} [SUBCOMMAND] [OPTION...] PATH\n",
            "\n\
         OPTIONS:\n",
            "    -h, --help       show this message\n",
            "    --output FILE    path to write the generated program\n",
            "\n\
         SUBCOMMANDS:\n",
            "    compile          Compile a diagram snapshot and print the program\n",
            "    check            Validate a diagram snapshot without printing\n",
        ),
        VERSION,
        argv0
    );
}

#[derive(Clone, Default, Debug)]
struct Args {
    path: Option<String>,
    output: Option<String>,
    is_check: bool,
}

fn parse_args() -> StdResult<Args, Box<dyn std::error::Error>> {
    let mut parsed = Arguments::from_env();
    if parsed.contains(["-h", "--help"]) {
        usage();
    }

    let subcommand = parsed.subcommand()?;
    if subcommand.is_none() {
        eprintln!("error: subcommand required");
        usage();
    }

    let mut args: Args = Default::default();

    let subcommand = subcommand.unwrap();
    if subcommand == "compile" {
    } else if subcommand == "check" {
        args.is_check = true;
    } else {
        eprintln!("error: unknown subcommand {}", subcommand);
        usage();
    }

    args.output = parsed.value_from_str("--output").ok();

    let free_arguments = parsed.finish();
    if free_arguments.is_empty() {
        eprintln!("error: input path required");
        usage();
    }

    args.path = free_arguments[0].to_str().map(|s| s.to_owned());

    Ok(args)
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {}", err);
            usage();
        }
    };
    let file_path = args.path.unwrap_or_else(|| "/dev/stdin".to_string());
    let file = match File::open(&file_path) {
        Ok(file) => file,
        Err(err) => die!("error opening '{}': {}", &file_path, err),
    };
    let mut reader = BufReader::new(file);

    let diagram = match json::parse(&mut reader) {
        Ok(diagram) => diagram,
        Err(err) => die!("snapshot '{}' error: {}", &file_path, err),
    };

    let program = match build_program(diagram) {
        Ok(program) => program,
        Err(err) => die!("compile error: {}", err),
    };

    if args.is_check {
        return;
    }

    match args.output {
        Some(output_path) => {
            let mut file = match File::create(&output_path) {
                Ok(file) => file,
                Err(err) => die!("error creating '{}': {}", &output_path, err),
            };
            if let Err(err) = file.write_all(program.as_bytes()) {
                die!("error writing '{}': {}", &output_path, err);
            }
        }
        None => {
            print!("{}", program);
        }
    }
}
