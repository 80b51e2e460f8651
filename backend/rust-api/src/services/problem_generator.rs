use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::error::GameError;
use crate::metrics::PROBLEMS_GENERATED_TOTAL;
use crate::models::level::{OperandRange, RangeTable, ResolvedLevel};
use crate::models::problem::MathProblem;
use crate::models::{Difficulty, Operation};

const CHOICE_COUNT: usize = 4;

/// Floor for the distractor offset ceiling. With fewer than three candidate
/// offsets an answer of 0 could not collect three distinct distractors.
const MIN_OFFSET_CEILING: i64 = 3;

/// Rejection-sampling rounds before the deterministic top-up kicks in.
const MAX_SAMPLING_ROUNDS: usize = 256;

/// Problem source owning its random generator.
///
/// Seed it for reproducible problem sequences.
#[derive(Debug, Clone)]
pub struct ProblemGenerator<R = StdRng> {
    rng: R,
}

impl ProblemGenerator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ProblemGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate(
        &mut self,
        operation: Operation,
        difficulty: Difficulty,
        ranges_a: &RangeTable,
        ranges_b: &RangeTable,
    ) -> Result<MathProblem, GameError> {
        generate_problem(&mut self.rng, operation, difficulty, ranges_a, ranges_b)
    }

    pub fn generate_for_level(
        &mut self,
        level: &ResolvedLevel<'_>,
        difficulty: Difficulty,
    ) -> Result<MathProblem, GameError> {
        self.generate(
            level.world.operation,
            difficulty,
            &level.sub_level.ranges_a,
            &level.sub_level.ranges_b,
        )
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

pub fn generate_problem<R: Rng + ?Sized>(
    rng: &mut R,
    operation: Operation,
    difficulty: Difficulty,
    ranges_a: &RangeTable,
    ranges_b: &RangeTable,
) -> Result<MathProblem, GameError> {
    let range_a = ranges_a.for_tier(difficulty);
    let range_b = ranges_b.for_tier(difficulty);
    range_a.validate()?;
    range_b.validate()?;

    let (operand_a, operand_b, answer) = match operation {
        Operation::Addition => {
            let a = draw(rng, range_a);
            let b = draw(rng, range_b);
            (a, b, a + b)
        }
        Operation::Subtraction => {
            let mut a = draw(rng, range_a);
            let ceiling = range_b.max.min(a);
            let mut b = if range_b.min <= ceiling {
                rng.random_range(range_b.min..=ceiling)
            } else {
                draw(rng, range_b)
            };
            // The subtrahend range can sit entirely above the minuend; the swap
            // keeps the result non-negative even though the minuend then leaves
            // its configured range.
            if b > a {
                std::mem::swap(&mut a, &mut b);
            }
            (a, b, a - b)
        }
        Operation::Multiplication => {
            let a = draw(rng, range_a);
            let b = draw(rng, range_b);
            (a, b, a * b)
        }
        Operation::Division => {
            // ranges_a is the quotient range; the dividend is derived.
            if range_b.max < 1 {
                return Err(GameError::InvalidRange(
                    "division needs a divisor range above zero".into(),
                ));
            }
            let divisor = draw(rng, OperandRange::new(range_b.min.max(1), range_b.max));
            let quotient = draw(rng, range_a);
            (divisor * quotient, divisor, quotient)
        }
    };

    PROBLEMS_GENERATED_TOTAL
        .with_label_values(&[operation.as_str(), difficulty.as_str()])
        .inc();

    Ok(MathProblem {
        question: format!("{} {} {}", operand_a, operation.symbol(), operand_b),
        answer,
        choices: generate_choices(rng, answer),
        operation,
        difficulty,
        operand_a,
        operand_b,
    })
}

/// Four distinct non-negative choices including `answer`, uniformly shuffled.
pub fn generate_choices<R: Rng + ?Sized>(rng: &mut R, answer: i64) -> Vec<i64> {
    let mut choices = Vec::with_capacity(CHOICE_COUNT);
    choices.push(answer);

    let ceiling = MIN_OFFSET_CEILING.max(answer.abs() + 2);
    let mut rounds = 0;
    while choices.len() < CHOICE_COUNT && rounds < MAX_SAMPLING_ROUNDS {
        rounds += 1;
        let offset = rng.random_range(1..=ceiling);
        let candidate = if rng.random_bool(0.5) {
            answer + offset
        } else {
            answer - offset
        };
        if candidate >= 0 && candidate != answer && !choices.contains(&candidate) {
            choices.push(candidate);
        }
    }

    if choices.len() < CHOICE_COUNT {
        tracing::debug!(
            "Distractor sampling exhausted for answer={}, topping up",
            answer
        );
        let mut candidate = (answer + 1).max(0);
        while choices.len() < CHOICE_COUNT {
            if candidate != answer && !choices.contains(&candidate) {
                choices.push(candidate);
            }
            candidate += 1;
        }
    }

    choices.shuffle(rng);
    choices
}

fn draw<R: Rng + ?Sized>(rng: &mut R, range: OperandRange) -> i64 {
    rng.random_range(range.min..=range.max)
}
