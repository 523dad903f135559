#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;
extern crate ansi_term;
extern crate env_logger;
extern crate mos6502;

use std::cell::RefCell;
use std::fs;
use std::process;
use std::rc::Rc;

use ansi_term::Colour;
use clap::{App, Arg};

use mos6502::assembler::{self, DEFAULT_START_ADDRESS};
use mos6502::peripherals::{Framebuffer, KeyInput, RandomSource, TextOutput};
use mos6502::{trace, Cpu};

const FRAMEBUFFER_START: u16 = 0x0200;
const FRAMEBUFFER_WIDTH: usize = 32;
const FRAMEBUFFER_HEIGHT: usize = 32;
const CHAR_OUT_PORT: u16 = 0x00fd;
const RNG_PORT: u16 = 0x00fe;
const KEY_IN_PORT: u16 = 0x00ff;

fn main() {
    env_logger::init();

    let matches = App::new("mos6502")
        .version(crate_version!())
        .about("Assembles and runs 6502 assembly programs")
        .arg(
            Arg::with_name("PROGRAM_FILE")
                .help("Path to a 6502 assembly source file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("start")
                .long("start")
                .takes_value(true)
                .value_name("HEX")
                .help("Load/start address in hex, e.g. 0600 (default: 0600)"),
        )
        .arg(
            Arg::with_name("debug")
                .long("debug")
                .help("Print a colorized trace line before every instruction"),
        )
        .get_matches();

    let path = matches.value_of("PROGRAM_FILE").unwrap();
    let start = match matches.value_of("start") {
        Some(hex) => match u16::from_str_radix(hex.trim_start_matches("0x").trim_start_matches('$'), 16) {
            Ok(addr) => addr,
            Err(e) => {
                error!("invalid --start value `{}`: {}", hex, e);
                process::exit(2);
            }
        },
        None => DEFAULT_START_ADDRESS,
    };

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            error!("failed to read {}: {}", path, e);
            process::exit(2);
        }
    };

    let assembled = match assembler::assemble(&source, start) {
        Ok(assembled) => assembled,
        Err(e) => {
            eprintln!("{}", Colour::Red.paint(e.to_string()));
            process::exit(1);
        }
    };

    let mut cpu = Cpu::new();
    cpu.load(&assembled.image, start);

    let framebuffer = Rc::new(RefCell::new(Framebuffer::new(
        FRAMEBUFFER_START,
        FRAMEBUFFER_WIDTH,
        FRAMEBUFFER_HEIGHT,
    )));
    cpu.map_io_range(
        FRAMEBUFFER_START,
        FRAMEBUFFER_START + (FRAMEBUFFER_WIDTH * FRAMEBUFFER_HEIGHT) as u16 - 1,
        framebuffer,
    );
    cpu.map_io(CHAR_OUT_PORT, Rc::new(RefCell::new(TextOutput::new())));
    cpu.map_io(RNG_PORT, Rc::new(RefCell::new(RandomSource::new())));
    cpu.map_io(KEY_IN_PORT, Rc::new(RefCell::new(KeyInput::new())));

    cpu.reset(start);

    let debug = matches.is_present("debug");

    loop {
        if debug {
            if let Some(line) = trace::trace_line(&cpu) {
                println!("{}", line);
            }
        }
        match cpu.step() {
            Ok(true) => continue,
            Ok(false) => break,
            Err(fault) => {
                eprintln!("{}", Colour::Red.paint(fault.to_string()));
                process::exit(2);
            }
        }
    }
}
