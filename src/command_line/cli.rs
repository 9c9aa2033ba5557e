#![allow(clippy::cast_precision_loss)]

use clap::{Args, CommandFactory, Parser, Subcommand};
use sat_lisp::lisp::evaluator;
use sat_lisp::lisp::repl::{self, ReplOptions};
use sat_lisp::sat::assignment::Solutions;
use sat_lisp::sat::cnf::Cnf;
use sat_lisp::sat::dimacs::{parse_dimacs, parse_file, to_dimacs};
use sat_lisp::sat::dpll::Dpll;
use sat_lisp::sat::solver::{SolutionStats, Solver, SolverConfig};
use sat_lisp::sudoku::parse_sudoku_file;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface for the satlisp application.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "satlisp",
    version,
    about = "A DPLL SAT solver with a Sudoku front end and a Lisp REPL"
)]
pub(crate) struct Cli {
    /// An optional path argument. If provided without a subcommand,
    /// it's treated as the path to a DIMACS .cnf file to solve.
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `file`, `text`, `sudoku`, `lisp`).
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long = "path")]
        file: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula provided as plain text.
    Text {
        /// One clause per line, literals separated by whitespace, `-` or `!`
        /// for negation (e.g. "a -b\nb c"). A literal `\n` also separates lines.
        #[arg(short, long)]
        input: String,

        /// Read the input as DIMACS clauses instead (e.g. "1 -2 0\n2 3 0").
        #[arg(long, default_value_t = false)]
        dimacs: bool,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every `.cnf` and `.sudoku` file below a directory.
    Dir {
        /// Directory to walk.
        #[arg(long = "path")]
        dir: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a Sudoku puzzle.
    /// The Sudoku puzzle is converted into a CNF formula, which is then solved.
    Sudoku {
        /// Path to the Sudoku file: one row per line, `0` or `.` for blanks.
        #[arg(long = "path")]
        puzzle: PathBuf,

        /// Print the DIMACS encoding of the puzzle and save it as `<path>.cnf`.
        #[arg(short, long, default_value_t = false)]
        export_dimacs: bool,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Start the Lisp read-eval-print loop on standard input.
    Lisp {
        /// Echo the tokens and parsed expression of every line.
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Raise the log level to `debug`. `RUST_LOG` takes precedence.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check a found model against the original formula.
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
    pub(crate) verify: bool,

    /// Print problem and search statistics after solving.
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
    pub(crate) stats: bool,

    /// Print the satisfying assignment if the formula is satisfiable.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Keep clauses that contain a literal and its complement during
    /// redundancy removal.
    #[arg(long, default_value_t = false)]
    pub(crate) keep_tautologies: bool,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            debug: false,
            verify: true,
            stats: true,
            print_solution: false,
            keep_tautologies: false,
        }
    }
}

impl CommonOptions {
    pub(crate) const fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            eliminate_tautologies: !self.keep_tautologies,
        }
    }
}

impl Cli {
    /// Whether `--debug` was given at the top level or to the subcommand.
    pub(crate) fn debug_requested(&self) -> bool {
        self.common.debug
            || match &self.command {
                Some(
                    Commands::File { common, .. }
                    | Commands::Text { common, .. }
                    | Commands::Dir { common, .. }
                    | Commands::Sudoku { common, .. },
                ) => common.debug,
                _ => false,
            }
    }
}

/// Jemalloc figures in MiB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MemoryUsage {
    pub(crate) allocated: f64,
    pub(crate) resident: f64,
}

/// Reads the current allocator statistics. `None` if jemalloc refuses.
pub(crate) fn memory_usage() -> Option<MemoryUsage> {
    epoch::advance().ok()?;

    let allocated = stats::allocated::mib().and_then(|mib| mib.read()).ok()?;
    let resident = stats::resident::mib().and_then(|mib| mib.read()).ok()?;

    Some(MemoryUsage {
        allocated: allocated as f64 / (1024.0 * 1024.0),
        resident: resident as f64 / (1024.0 * 1024.0),
    })
}

/// Dispatches the parsed command line.
///
/// # Errors
///
/// A readable message for any input that could not be read or parsed, or a
/// model that fails verification.
pub(crate) fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        None => match cli.path {
            Some(path) => solve_file(&path, &cli.common),
            None => Err("No input given. Pass a DIMACS file or a subcommand; see --help.".into()),
        },
        Some(Commands::File { file, common }) => solve_file(&file, &common),
        Some(Commands::Text {
            input,
            dimacs,
            common,
        }) => {
            let time = Instant::now();
            let cnf = parse_text(&input, dimacs)?;
            let elapsed = time.elapsed();

            solve_and_report(&cnf, &common, None, elapsed)
        }
        Some(Commands::Dir { dir, common }) => solve_dir(&dir, &common),
        Some(Commands::Sudoku {
            puzzle,
            export_dimacs,
            common,
        }) => solve_sudoku(&puzzle, export_dimacs, &common),
        Some(Commands::Lisp { verbose }) => run_repl(verbose),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

/// Parses inline formula text, in DIMACS or the named textual form.
///
/// # Errors
///
/// The parse error, rendered.
pub(crate) fn parse_text(input: &str, dimacs: bool) -> Result<Cnf, String> {
    let input = input.replace("\\n", "\n");
    if dimacs {
        parse_dimacs(input.as_bytes()).map_err(|e| e.to_string())
    } else {
        input.parse::<Cnf>().map_err(|e| e.to_string())
    }
}

fn solve_file(path: &Path, common: &CommonOptions) -> Result<(), String> {
    let time = Instant::now();
    let cnf = parse_file(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let elapsed = time.elapsed();

    solve_and_report(&cnf, common, Some(path), elapsed)
}

/// Solves a directory of CNF files.
/// Every `.cnf` file below `path` is parsed, solved and reported; `.sudoku`
/// files go through `solve_sudoku`. Other files are skipped.
///
/// # Errors
///
/// If `path` is not a directory or any file fails to parse.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!("Provided path is not a directory: {}", path.display()));
    }

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }

        if file_path.extension().is_some_and(|ext| ext == "sudoku") {
            solve_sudoku(file_path, false, common)?;
            continue;
        }

        if file_path.extension().is_none_or(|ext| ext != "cnf") {
            log::info!("Skipping non-CNF file: {}", file_path.display());
            continue;
        }

        solve_file(file_path, common)?;
    }

    Ok(())
}

/// Checks `sol` against `cnf` and prints the outcome.
///
/// # Errors
///
/// If the model leaves a clause unsatisfied.
pub(crate) fn verify_solution(cnf: &Cnf, sol: Option<&Solutions>) -> Result<(), String> {
    match sol {
        Some(sol_values) => {
            let ok = cnf.verify(sol_values);
            println!("Verified: {ok:?}");
            if ok {
                Ok(())
            } else {
                Err("Solution failed verification!".into())
            }
        }
        None => {
            println!("UNSAT");
            Ok(())
        }
    }
}

/// Runs the DPLL solver on a copy of `cnf`.
///
/// Returns the model (if any), the time spent solving and the search counters.
pub(crate) fn solve(
    cnf: &Cnf,
    label: Option<&Path>,
    common: &CommonOptions,
) -> (Option<Solutions>, Duration, SolutionStats) {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }

    log::debug!(
        "{} variables, {} clauses, {} literal occurrences",
        cnf.num_vars(),
        cnf.len(),
        cnf.num_literals()
    );

    let time = Instant::now();

    let mut solver = Dpll::with_config(cnf.clone(), common.solver_config());
    let sol = solver.solve();

    let elapsed = time.elapsed();
    log::debug!("Solved in {elapsed:?}");

    (sol, elapsed, solver.stats())
}

/// Solves `cnf`, then verifies and reports according to `common`.
///
/// # Errors
///
/// If verification is on and the model is wrong.
pub(crate) fn solve_and_report(
    cnf: &Cnf,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<(), String> {
    let (sol, elapsed, solver_stats) = solve(cnf, label, common);

    if common.verify {
        verify_solution(cnf, sol.as_ref())?;
    }

    if common.stats {
        print_stats(
            parse_time,
            elapsed,
            cnf,
            &solver_stats,
            memory_usage(),
            common.print_solution,
            sol.as_ref(),
        );
    } else if common.print_solution {
        if let Some(sol_values) = &sol {
            println!("Solutions: {sol_values}");
        }
    }

    Ok(())
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
pub(crate) fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    cnf: &Cnf,
    s: &SolutionStats,
    memory: Option<MemoryUsage>,
    print_solution: bool,
    solutions: Option<&Solutions>,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars());
    stat_line("Clauses", cnf.len());
    stat_line("Literals", cnf.num_literals());

    println!("========================[ Search Statistics ]========================");
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line_with_rate("Backtracks", s.backtracks, elapsed_secs);
    stat_line("Max depth", s.max_depth);
    if let Some(memory) = memory {
        stat_line("Memory usage (MiB)", format!("{:.2}", memory.allocated));
        stat_line("Resident memory (MiB)", format!("{:.2}", memory.resident));
    }
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");

    if let Some(solutions_values) = solutions {
        if print_solution {
            println!("Solutions: {solutions_values}");
        }
    }

    if solutions.is_some() {
        println!("\nSATISFIABLE");
    } else {
        println!("\nUNSATISFIABLE");
    }
}

/// Solve a sudoku file.
///
/// # Errors
///
/// If the file is missing or malformed, the DIMACS export cannot be written,
/// or verification rejects the decoded board.
pub(crate) fn solve_sudoku(
    path: &Path,
    export_dimacs: bool,
    common: &CommonOptions,
) -> Result<(), String> {
    if !path.is_file() {
        return Err(format!("Provided path is not a file: {}", path.display()));
    }

    let time = Instant::now();
    let sudoku =
        parse_sudoku_file(path).map_err(|e| format!("Error parsing Sudoku file: {e}"))?;
    println!("Parsed Sudoku:\n{sudoku}");

    let cnf = sudoku.to_cnf();

    if export_dimacs {
        let dimacs = to_dimacs(&cnf);
        println!("DIMACS:\n{dimacs}");

        let dimacs_path = format!("{}.cnf", path.display());
        std::fs::write(&dimacs_path, dimacs)
            .map_err(|e| format!("Unable to write {dimacs_path}: {e}"))?;
        println!("DIMACS written to: {dimacs_path}");
    }

    let parse_time = time.elapsed();
    let (sol, elapsed, solver_stats) = solve(&cnf, Some(path), common);

    let solution_grid = sol.as_ref().map(|sol_values| sudoku.decode(sol_values));

    if common.verify {
        if let Some(grid) = &solution_grid {
            let ok = sudoku.is_solution(grid);
            println!("Verified: {ok:?}");
            if !ok {
                return Err("Decoded board is not a valid solution!".into());
            }
        }
    }

    if common.stats {
        print_stats(
            parse_time,
            elapsed,
            &cnf,
            &solver_stats,
            memory_usage(),
            common.print_solution,
            sol.as_ref(),
        );
    }

    match solution_grid {
        Some(grid) => println!("Solution:\n{grid}"),
        None => println!("No solution found"),
    }

    Ok(())
}

/// Runs the Lisp REPL over standard input and output, on a thread whose
/// stack can hold the evaluator's deepest allowed recursion.
///
/// # Errors
///
/// On I/O failure or if the REPL thread cannot be started.
pub(crate) fn run_repl(verbose: bool) -> Result<(), String> {
    let worker = thread::Builder::new()
        .name("lisp-repl".into())
        .stack_size(evaluator::STACK_SIZE)
        .spawn(move || {
            let stdin = io::stdin();
            let mut stdout = io::stdout().lock();
            repl::run(stdin.lock(), &mut stdout, ReplOptions { verbose }).map(drop)
        })
        .map_err(|e| format!("Unable to start the REPL thread: {e}"))?;

    worker
        .join()
        .map_err(|_| "REPL thread panicked".to_string())?
        .map_err(|e| format!("REPL I/O error: {e}"))
}
