//! Sudoku to CNF encoding.
//!
//! Cell `(row, col)` holding `num` is the variable `"{num}@{row},{col}"`, with
//! 0-based row and column and 1-based value. Every cell, row, column and block
//! gets an "exists" clause over the candidates and a "not both" clause for each
//! pair of them. Pre-filled cells become unit clauses.

use crate::logging::targets::SUDOKU;
use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::dpll::Dpll;
use crate::sat::literal::Literal;
use crate::sat::solver::{Solver, SolverConfig};
use itertools::Itertools;
use std::fmt::{self, Display};
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum SudokuError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("board is empty")]
    Empty,

    #[error("row {row} has {len} cells, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("board size {0} is not a perfect square")]
    NotPerfectSquare(usize),

    #[error("cell ({row}, {col}) holds {value}, expected 0..={max}")]
    ValueOutOfRange {
        row: usize,
        col: usize,
        value: usize,
        max: usize,
    },

    #[error("row {row}: invalid cell '{token}'")]
    Token { row: usize, token: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board(Vec<Vec<usize>>);

impl Board {
    #[must_use]
    pub const fn new(board: Vec<Vec<usize>>) -> Self {
        Self(board)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value at `(row, col)`; 0 is blank.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<usize> {
        self.0.get(row)?.get(col).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[usize]> {
        self.0.iter().map(Vec::as_slice)
    }

    /// Filled cells as `(row, col, value)`.
    pub fn givens(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.0.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &n)| n != 0)
                .map(move |(c, &n)| (r, c, n))
        })
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.0.iter().flatten().all(|&n| n != 0)
    }
}

impl From<Vec<Vec<usize>>> for Board {
    fn from(board: Vec<Vec<usize>>) -> Self {
        Self::new(board)
    }
}

impl<const N: usize> From<[[usize; N]; N]> for Board {
    fn from(board: [[usize; N]; N]) -> Self {
        Self::new(board.iter().map(|r| r.to_vec()).collect())
    }
}

impl From<Board> for Vec<Vec<usize>> {
    fn from(board: Board) -> Self {
        board.0
    }
}

/// Rows on separate lines, blocks separated by `|` and `-+-` rules, blanks as
/// `.`. The output parses back with `FromStr`.
impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.len();
        let block = n.isqrt().max(1);
        let width = n.to_string().len();

        let cell = |v: usize| {
            if v == 0 {
                format!("{:>width$}", ".")
            } else {
                format!("{v:>width$}")
            }
        };
        let rule = (0..n.div_ceil(block))
            .map(|_| "-".repeat(block * width + block - 1))
            .join("-+-");

        for (r, row) in self.rows().enumerate() {
            if r > 0 && r % block == 0 {
                writeln!(f, "{rule}")?;
            }
            let line = row
                .chunks(block)
                .map(|chunk| chunk.iter().map(|&v| cell(v)).join(" "))
                .join(" | ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = SudokuError;

    /// One row per line, whitespace separated values, `0` or `.` for blank.
    /// `|` tokens, rule lines made of `-` and `+`, blank lines and `#`
    /// comments are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rows = Vec::new();
        for line in s.lines().map(str::trim) {
            if line.is_empty()
                || line.starts_with('#')
                || line.chars().all(|c| matches!(c, '-' | '+' | ' '))
            {
                continue;
            }

            let row_idx = rows.len();
            let row = line
                .split_whitespace()
                .filter(|&tok| tok != "|")
                .map(|tok| match tok {
                    "." => Ok(0),
                    _ => tok.parse::<usize>().map_err(|_| SudokuError::Token {
                        row: row_idx,
                        token: tok.to_string(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }
        Ok(Self(rows))
    }
}

/// A valid Sudoku side length: a perfect square of at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Size(usize);

impl Size {
    /// # Errors
    ///
    /// Fails when `n` is zero or not a perfect square.
    pub fn new(n: usize) -> Result<Self, SudokuError> {
        if n == 0 {
            return Err(SudokuError::Empty);
        }
        let root = n.isqrt();
        if root * root == n {
            Ok(Self(n))
        } else {
            Err(SudokuError::NotPerfectSquare(n))
        }
    }

    #[must_use]
    pub const fn block_size(self) -> usize {
        self.0.isqrt()
    }
}

impl TryFrom<usize> for Size {
    type Error = SudokuError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Size> for usize {
    fn from(size: Size) -> Self {
        size.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub num: usize,
}

impl Variable {
    #[must_use]
    pub const fn new(row: usize, col: usize, num: usize) -> Self {
        Self { row, col, num }
    }

    #[must_use]
    pub fn name(&self) -> String {
        format!("{}@{},{}", self.num, self.row, self.col)
    }

    /// Inverse of [`Variable::name`].
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let (num, pos) = name.split_once('@')?;
        let (row, col) = pos.split_once(',')?;
        Some(Self::new(row.parse().ok()?, col.parse().ok()?, num.parse().ok()?))
    }
}

/// Interned variable names for one board size, so every literal over the same
/// cell value shares its name.
struct Names {
    size: usize,
    names: Vec<Rc<str>>,
}

impl Names {
    fn new(size: usize) -> Self {
        let names = (0..size)
            .cartesian_product(0..size)
            .cartesian_product(1..=size)
            .map(|((row, col), num)| Rc::from(Variable::new(row, col, num).name()))
            .collect();
        Self { size, names }
    }

    fn lit(&self, row: usize, col: usize, num: usize, polarity: bool) -> Literal {
        let idx = (row * self.size + col) * self.size + (num - 1);
        Literal::new(Rc::clone(&self.names[idx]), polarity)
    }
}

/// Adds the exists clause and the pairwise exclusions for one group of
/// candidate literals.
fn exactly_one(cnf: &mut Cnf, group: &[Literal]) {
    cnf.add_clause(group.iter().cloned().collect::<Clause>());
    for (a, b) in group.iter().tuple_combinations() {
        cnf.add_clause(vec![a.negated(), b.negated()]);
    }
}

fn generate_cell_clauses(cnf: &mut Cnf, names: &Names) {
    let n = names.size;
    for (row, col) in (0..n).cartesian_product(0..n) {
        let group: Vec<Literal> = (1..=n).map(|num| names.lit(row, col, num, true)).collect();
        exactly_one(cnf, &group);
    }
}

fn generate_row_clauses(cnf: &mut Cnf, names: &Names) {
    let n = names.size;
    for (row, num) in (0..n).cartesian_product(1..=n) {
        let group: Vec<Literal> = (0..n).map(|col| names.lit(row, col, num, true)).collect();
        exactly_one(cnf, &group);
    }
}

fn generate_col_clauses(cnf: &mut Cnf, names: &Names) {
    let n = names.size;
    for (col, num) in (0..n).cartesian_product(1..=n) {
        let group: Vec<Literal> = (0..n).map(|row| names.lit(row, col, num, true)).collect();
        exactly_one(cnf, &group);
    }
}

fn generate_block_clauses(cnf: &mut Cnf, names: &Names, block_size: usize) {
    let n = names.size;
    let origins = (0..n).step_by(block_size);
    for ((br, bc), num) in origins
        .clone()
        .cartesian_product(origins)
        .cartesian_product(1..=n)
    {
        let group: Vec<Literal> = (br..br + block_size)
            .cartesian_product(bc..bc + block_size)
            .map(|(row, col)| names.lit(row, col, num, true))
            .collect();
        exactly_one(cnf, &group);
    }
}

fn generate_pre_filled_clauses(cnf: &mut Cnf, names: &Names, board: &Board) {
    for (row, col, num) in board.givens() {
        cnf.add_clause(vec![names.lit(row, col, num, true)]);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sudoku {
    pub board: Board,
    pub size: Size,
}

impl Sudoku {
    /// # Errors
    ///
    /// Fails unless the board is N×N for a perfect square N with every value
    /// in `0..=N`.
    pub fn new(board: Board) -> Result<Self, SudokuError> {
        let size = Size::new(board.len())?;
        let n = usize::from(size);

        for (row, cells) in board.rows().enumerate() {
            if cells.len() != n {
                return Err(SudokuError::NotSquare {
                    row,
                    len: cells.len(),
                    expected: n,
                });
            }
            if let Some((col, &value)) = cells.iter().find_position(|&&v| v > n) {
                return Err(SudokuError::ValueOutOfRange {
                    row,
                    col,
                    value,
                    max: n,
                });
            }
        }

        Ok(Self { board, size })
    }

    #[must_use]
    pub fn to_cnf(&self) -> Cnf {
        let n = usize::from(self.size);
        let names = Names::new(n);
        let mut cnf = Cnf::default();

        generate_cell_clauses(&mut cnf, &names);
        generate_row_clauses(&mut cnf, &names);
        generate_col_clauses(&mut cnf, &names);
        generate_block_clauses(&mut cnf, &names, self.size.block_size());
        generate_pre_filled_clauses(&mut cnf, &names, &self.board);

        log::debug!(
            target: SUDOKU,
            "Encoded {n}x{n} board: {} variables, {} clauses",
            n * n * n,
            cnf.len()
        );
        cnf
    }

    /// Reads the board back from the positively assigned variables. Negative
    /// bindings, absent variables and names that are not cell variables are
    /// ignored; cells without a positive variable stay blank.
    #[must_use]
    pub fn decode(&self, assignment: &Assignment) -> Board {
        let n = usize::from(self.size);
        let mut board = vec![vec![0; n]; n];
        for var in assignment.positive_variables() {
            match Variable::parse(var) {
                Some(Variable { row, col, num }) if row < n && col < n && (1..=n).contains(&num) => {
                    board[row][col] = num;
                }
                _ => log::trace!(target: SUDOKU, "Ignoring variable {var}"),
            }
        }
        Board::new(board)
    }

    /// Solves with the default solver settings.
    #[must_use]
    pub fn solve(&self) -> Option<Board> {
        self.solve_with_config(SolverConfig::default())
    }

    #[must_use]
    pub fn solve_with_config(&self, config: SolverConfig) -> Option<Board> {
        let mut solver = Dpll::with_config(self.to_cnf(), config);
        solver.solve().map(|model| self.decode(&model))
    }

    /// Whether `solution` is a complete valid grid that keeps every given of
    /// this puzzle.
    #[must_use]
    pub fn is_solution(&self, solution: &Board) -> bool {
        let n = usize::from(self.size);
        let bs = self.size.block_size();

        if solution.len() != n || solution.rows().any(|r| r.len() != n) || !solution.is_complete()
        {
            return false;
        }
        if self
            .board
            .givens()
            .any(|(r, c, v)| solution.get(r, c) != Some(v))
        {
            return false;
        }

        let distinct = |cells: &mut dyn Iterator<Item = (usize, usize)>| {
            cells.filter_map(|(r, c)| solution.get(r, c)).all_unique()
        };
        let rows_ok = (0..n).all(|r| distinct(&mut (0..n).map(|c| (r, c))));
        let cols_ok = (0..n).all(|c| distinct(&mut (0..n).map(|r| (r, c))));
        let blocks_ok = (0..n)
            .step_by(bs)
            .cartesian_product((0..n).step_by(bs))
            .all(|(br, bc)| distinct(&mut (br..br + bs).cartesian_product(bc..bc + bs)));

        rows_ok && cols_ok && blocks_ok
    }
}

impl TryFrom<Board> for Sudoku {
    type Error = SudokuError;

    fn try_from(board: Board) -> Result<Self, Self::Error> {
        Self::new(board)
    }
}

impl From<Sudoku> for Board {
    fn from(sudoku: Sudoku) -> Self {
        sudoku.board
    }
}

impl FromStr for Sudoku {
    type Err = SudokuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.parse()?)
    }
}

impl Display for Sudoku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.board.fmt(f)
    }
}

/// Reads a board in the textual format accepted by `FromStr`.
///
/// # Errors
///
/// I/O errors and malformed boards.
pub fn parse_sudoku_file(path: impl AsRef<Path>) -> Result<Sudoku, SudokuError> {
    std::fs::read_to_string(path)?.parse()
}

pub const EXAMPLE_FOUR: [[usize; 4]; 4] = [[1, 0, 0, 4], [0, 4, 1, 0], [0, 1, 4, 0], [4, 0, 0, 1]];

pub const EXAMPLE_NINE: [[usize; 9]; 9] = [
    [5, 3, 0, 0, 7, 0, 0, 0, 0],
    [6, 0, 0, 1, 9, 5, 0, 0, 0],
    [0, 9, 8, 0, 0, 0, 0, 6, 0],
    [8, 0, 0, 0, 6, 0, 0, 0, 3],
    [4, 0, 0, 8, 0, 3, 0, 0, 1],
    [7, 0, 0, 0, 2, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 2, 8, 0],
    [0, 0, 0, 4, 1, 9, 0, 0, 5],
    [0, 0, 0, 0, 8, 0, 0, 7, 9],
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::propagation::propagate_to_fixpoint;

    const NINE_SOLVED: [[usize; 9]; 9] = [
        [5, 3, 4, 6, 7, 8, 9, 1, 2],
        [6, 7, 2, 1, 9, 5, 3, 4, 8],
        [1, 9, 8, 3, 4, 2, 5, 6, 7],
        [8, 5, 9, 7, 6, 1, 4, 2, 3],
        [4, 2, 6, 8, 5, 3, 7, 9, 1],
        [7, 1, 3, 9, 2, 4, 8, 5, 6],
        [9, 6, 1, 5, 3, 7, 2, 8, 4],
        [2, 8, 7, 4, 1, 9, 6, 3, 5],
        [3, 4, 5, 2, 8, 6, 1, 7, 9],
    ];

    #[test]
    fn test_variable_names() {
        let var = Variable::new(2, 7, 5);
        assert_eq!(var.name(), "5@2,7");
        assert_eq!(Variable::parse("5@2,7"), Some(var));
        assert_eq!(Variable::parse("5@2"), None);
        assert_eq!(Variable::parse("x"), None);
    }

    #[test]
    fn test_size() {
        assert_eq!(Size::new(9).unwrap().block_size(), 3);
        assert_eq!(Size::new(1).unwrap().block_size(), 1);
        assert!(matches!(Size::new(6), Err(SudokuError::NotPerfectSquare(6))));
        assert!(matches!(Size::new(0), Err(SudokuError::Empty)));
    }

    #[test]
    fn test_new_rejects_bad_boards() {
        let ragged = Board::new(vec![vec![0; 4], vec![0; 4], vec![0; 3], vec![0; 4]]);
        assert!(matches!(
            Sudoku::new(ragged),
            Err(SudokuError::NotSquare { row: 2, len: 3, expected: 4 })
        ));

        let out_of_range = Board::from([[0, 0, 0, 0], [0, 5, 0, 0], [0; 4], [0; 4]]);
        assert!(matches!(
            Sudoku::new(out_of_range),
            Err(SudokuError::ValueOutOfRange { row: 1, col: 1, value: 5, max: 4 })
        ));
    }

    #[test]
    fn test_clause_counts() {
        // 4 groups of n*n, each with one exists clause and C(n, 2) pairs.
        let sudoku = Sudoku::new(Board::from([[0; 4]; 4])).unwrap();
        let cnf = sudoku.to_cnf();
        assert_eq!(cnf.len(), 4 * 16 * (1 + 6));
        assert_eq!(cnf.num_vars(), 64);

        let with_givens = Sudoku::new(Board::from(EXAMPLE_FOUR)).unwrap();
        assert_eq!(with_givens.to_cnf().len(), cnf.len() + 8);
    }

    #[test]
    fn test_solve_four() {
        let sudoku = Sudoku::new(Board::from(EXAMPLE_FOUR)).unwrap();
        let solution = sudoku.solve().unwrap();
        assert!(sudoku.is_solution(&solution));
    }

    #[test]
    fn test_solve_nine() {
        let sudoku = Sudoku::new(Board::from(EXAMPLE_NINE)).unwrap();
        assert_eq!(sudoku.solve(), Some(Board::from(NINE_SOLVED)));
    }

    #[test]
    fn test_unsolvable() {
        let sudoku = Sudoku::new(Board::from([[1, 1, 0, 0], [0; 4], [0; 4], [0; 4]])).unwrap();
        assert_eq!(sudoku.solve(), None);
    }

    #[test]
    fn test_solved_board_decodes_by_propagation_alone() {
        let sudoku = Sudoku::new(Board::from(NINE_SOLVED)).unwrap();
        let (forced, reduced) = propagate_to_fixpoint(&sudoku.to_cnf());
        assert!(reduced.is_empty());
        assert_eq!(sudoku.decode(&forced), sudoku.board);
    }

    #[test]
    fn test_decode_ignores_negatives_and_foreign_names() {
        let sudoku = Sudoku::new(Board::from([[0; 4]; 4])).unwrap();
        let assignment: Assignment = [
            ("1@0,0", true),
            ("2@0,1", false),
            ("9@0,2", true),
            ("other", true),
        ]
        .into_iter()
        .collect();
        let board = sudoku.decode(&assignment);
        assert_eq!(board.get(0, 0), Some(1));
        assert_eq!(board.get(0, 1), Some(0));
        assert_eq!(board.get(0, 2), Some(0));
    }

    #[test]
    fn test_display_parses_back() {
        let board = Board::from(EXAMPLE_FOUR);
        let text = board.to_string();
        assert_eq!(text, "1 . | . 4\n. 4 | 1 .\n----+----\n. 1 | 4 .\n4 . | . 1\n");
        assert_eq!(text.parse::<Board>().unwrap(), board);
    }

    #[test]
    fn test_parse_rejects_bad_token() {
        let err = "1 2\n3 x\n".parse::<Board>().unwrap_err();
        assert!(matches!(err, SudokuError::Token { row: 1, ref token } if token == "x"));
    }

    #[test]
    fn test_is_solution_rejects_changed_given() {
        let sudoku = Sudoku::new(Board::from(EXAMPLE_NINE)).unwrap();
        let mut rows: Vec<Vec<usize>> = Board::from(NINE_SOLVED).into();
        rows[0].swap(0, 1);
        assert!(!sudoku.is_solution(&Board::new(rows)));
        assert!(sudoku.is_solution(&Board::from(NINE_SOLVED)));
    }
}
