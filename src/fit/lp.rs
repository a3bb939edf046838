use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Le,
    Ge,
}

/// A bounded continuous variable and its objective coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LpVariable {
    pub objective: f64,
    pub lower: f64,
    pub upper: f64,
}

/// `sum(coef * var) <comparison> rhs`, with variables referenced by index.
#[derive(Debug, Clone, PartialEq)]
pub struct LpConstraint {
    pub terms: Vec<(usize, f64)>,
    pub comparison: Comparison,
    pub rhs: f64,
}

/// Solver-neutral linear program.
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    pub direction: Direction,
    pub variables: Vec<LpVariable>,
    pub constraints: Vec<LpConstraint>,
}

impl LpProblem {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            variables: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn add_variable(&mut self, objective: f64, bounds: (f64, f64)) -> usize {
        self.variables.push(LpVariable {
            objective,
            lower: bounds.0,
            upper: bounds.1,
        });
        self.variables.len() - 1
    }

    pub fn add_constraint(&mut self, terms: Vec<(usize, f64)>, comparison: Comparison, rhs: f64) {
        self.constraints.push(LpConstraint {
            terms,
            comparison,
            rhs,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LpError {
    #[error("problem is infeasible")]
    Infeasible,
    #[error("problem is unbounded")]
    Unbounded,
    #[error("{0}")]
    Solver(String),
}

/// Solves a linear program, returning one value per variable.
///
/// Implementations must be safe to call from several threads at once.
pub trait LpSolver: Send + Sync {
    fn solve(&self, problem: &LpProblem) -> Result<Vec<f64>, LpError>;
}

/// Simplex solver backed by the pure-Rust `microlp` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl LpSolver for MicroLpSolver {
    fn solve(&self, problem: &LpProblem) -> Result<Vec<f64>, LpError> {
        let direction = match problem.direction {
            Direction::Maximize => microlp::OptimizationDirection::Maximize,
            Direction::Minimize => microlp::OptimizationDirection::Minimize,
        };
        let mut lp = microlp::Problem::new(direction);
        let vars: Vec<microlp::Variable> = problem
            .variables
            .iter()
            .map(|var| lp.add_var(var.objective, (var.lower, var.upper)))
            .collect();

        for constraint in &problem.constraints {
            let mut expr = microlp::LinearExpr::empty();
            for &(idx, coef) in &constraint.terms {
                let Some(&var) = vars.get(idx) else {
                    return Err(LpError::Solver(format!("constraint references unknown variable {idx}")));
                };
                expr.add(var, coef);
            }
            let op = match constraint.comparison {
                Comparison::Eq => microlp::ComparisonOp::Eq,
                Comparison::Le => microlp::ComparisonOp::Le,
                Comparison::Ge => microlp::ComparisonOp::Ge,
            };
            lp.add_constraint(expr, op, constraint.rhs);
        }

        match lp.solve() {
            Ok(solution) => Ok(vars.iter().map(|&var| solution[var]).collect()),
            Err(microlp::Error::Infeasible) => Err(LpError::Infeasible),
            Err(microlp::Error::Unbounded) => Err(LpError::Unbounded),
            #[allow(unreachable_patterns)]
            Err(other) => Err(LpError::Solver(other.to_string())),
        }
    }
}
