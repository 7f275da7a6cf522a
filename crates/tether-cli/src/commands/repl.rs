//! REPL command - interactive JavaScript shell.

use anyhow::Result;
use clap::Args;
use std::io::{self, BufRead, Write};
use tether::{Context, ContextConfig};

use crate::globals;

#[derive(Args)]
pub struct ReplCommand {
    /// Start in multiline mode
    #[arg(long, short = 'm')]
    pub multiline: bool,
}

/// What the shell should do with one line of input.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Eval(String),
    Buffered,
    Skip,
    Help,
    Clear,
    Collect,
    Entered,
    Cancelled,
    Unknown(String),
    Exit,
}

/// Line-level state: the pending multiline buffer.
#[derive(Debug)]
struct Session {
    buffer: String,
    multiline: bool,
}

impl Session {
    fn new(multiline: bool) -> Self {
        Self { buffer: String::new(), multiline }
    }

    fn prompt(&self) -> &'static str {
        if self.multiline { "...> " } else { "tether> " }
    }

    fn accept(&mut self, line: &str) -> Step {
        let line = line.trim_end();
        if self.multiline {
            return match line {
                ".end" => {
                    self.multiline = false;
                    Step::Eval(std::mem::take(&mut self.buffer))
                }
                ".cancel" => {
                    self.multiline = false;
                    self.buffer.clear();
                    Step::Cancelled
                }
                _ => {
                    self.buffer.push_str(line);
                    self.buffer.push('\n');
                    Step::Buffered
                }
            };
        }
        match line {
            "" => Step::Skip,
            ".exit" | ".quit" | ".q" => Step::Exit,
            ".help" | ".h" => Step::Help,
            ".clear" | ".cls" => Step::Clear,
            ".gc" => Step::Collect,
            ".multiline" | ".m" => {
                self.multiline = true;
                Step::Entered
            }
            command if command.starts_with('.') => Step::Unknown(command.to_string()),
            source => Step::Eval(source.to_string()),
        }
    }
}

impl ReplCommand {
    pub fn run(&self, config: ContextConfig) -> Result<()> {
        println!("Tether {} - JavaScript bridge shell", env!("CARGO_PKG_VERSION"));
        println!("Type .help for help, .exit to exit\n");

        let ctx = Context::with_config(config)?;
        globals::install(&ctx, &[])?;

        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut session = Session::new(self.multiline);

        loop {
            print!("{}", session.prompt());
            stdout.flush()?;

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    break;
                }
            }

            match session.accept(&line) {
                Step::Exit => break,
                Step::Eval(source) => eval_source(&ctx, &source),
                Step::Help => print_help(),
                Step::Clear => {
                    print!("\x1B[2J\x1B[1;1H");
                    stdout.flush()?;
                }
                Step::Collect => report_collection(&ctx),
                Step::Entered => {
                    println!("Entering multiline mode. Type .end to execute, .cancel to abort.")
                }
                Step::Cancelled => println!("Multiline input cancelled."),
                Step::Unknown(command) => {
                    println!("Unknown command: {}. Type .help for available commands.", command)
                }
                Step::Buffered | Step::Skip => {}
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }
}

fn eval_source(ctx: &Context, source: &str) {
    match ctx.evaluate(source) {
        Ok(value) if !value.is_undefined() => println!("{}", super::render(&value)),
        Ok(_) => {}
        Err(e) => eprintln!("error: {}", e),
    }
}

fn report_collection(ctx: &Context) {
    if let Err(e) = ctx.gc() {
        eprintln!("error: {}", e);
        return;
    }
    let stats = ctx.stats();
    println!(
        "native proxies: {}, engine proxies: {}",
        stats.native_proxies, stats.engine_proxies
    );
}

fn print_help() {
    println!("REPL Commands:");
    println!("  .help, .h      Show this help message");
    println!("  .exit, .q      Exit the REPL");
    println!("  .clear, .cls   Clear the screen");
    println!("  .multiline, .m Enter multiline mode");
    println!("  .end           Execute multiline input");
    println!("  .cancel        Cancel multiline input");
    println!("  .gc            Collect garbage and show proxy counts");
    println!();
    println!("Globals: print(...), tether.version, tether.args, env.NAME");
}
